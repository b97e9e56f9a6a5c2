//! `berth remove` command

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};

use crate::cli::RemoveArgs;
use berth::core::package_list::SourceEntry;
use berth::core::MultiPackagesList;
use berth::ops::{remove, RemoveOptions};
use berth::util::shell::{Shell, Status};
use berth::util::BerthContext;

/// Ask a yes/no question on stdin. End of input means no.
fn ask(question: &str) -> bool {
    eprint!("{} (yes/no): ", question);
    let _ = io::stderr().flush();

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
    }
}

pub fn execute(args: RemoveArgs, shell: &Shell) -> Result<()> {
    let ctx = BerthContext::new()?;

    let skip_questions = args.confirm || args.dry_run;
    if !skip_questions && ctx.non_interactive() {
        bail!("interactive confirmation is disabled (core.non_interactive); use --confirm");
    }

    let opts = RemoveOptions {
        pattern: args.pattern,
        list_file: args.list,
        package_query: args.package_query,
        remote: args.remote,
        lru: args.lru,
        dry_run: args.dry_run,
    };

    let mut confirm = |question: &str| skip_questions || ask(question);
    let results = remove(&ctx, &opts, &mut confirm)?;

    if shell.is_json() {
        shell.print_json(&results.serialize());
    } else {
        print_summary(shell, &results, args.dry_run);
    }

    Ok(())
}

fn print_summary(shell: &Shell, results: &MultiPackagesList, dry_run: bool) {
    let (status, verb) = if dry_run {
        (Status::DryRun, "Would remove")
    } else {
        (Status::Removed, "Removed")
    };

    shell.print_line("Remove summary:");
    let mut revisions = 0;
    for (source, entry) in results.entries() {
        shell.print_line(source);
        let SourceEntry::Packages(list) = entry else {
            continue;
        };
        if list.is_empty() {
            shell.print_line("  Nothing removed");
            continue;
        }
        for (rrev, bundle) in list.refs() {
            let what = match &bundle.packages {
                None => format!("{} recipe and all binaries", verb),
                Some(packages) => {
                    let ids: Vec<&str> = packages.keys().map(String::as_str).collect();
                    format!("{} binaries: [{}]", verb, ids.join(", "))
                }
            };
            shell.print_line(format!("  {}: {}", rrev.repr_notime(), what));
            revisions += 1;
        }
    }
    shell.status(status, format!("{} recipe revision(s)", revisions));
}
