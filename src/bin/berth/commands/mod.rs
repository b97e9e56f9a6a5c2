//! Command implementations

pub mod cache;
pub mod completions;
pub mod list;
pub mod pkglist;
pub mod remove;

use berth::core::package_list::{PackagesList, SourceEntry};
use berth::core::recipe_ref::format_timestamp;
use berth::core::MultiPackagesList;
use berth::util::shell::Shell;

fn with_time(name: &str, timestamp: Option<i64>) -> String {
    match timestamp {
        Some(ts) => format!("{} ({})", name, format_timestamp(ts)),
        None => name.to_string(),
    }
}

/// Render a package list as an indented tree.
pub fn render_list(list: &PackagesList, indent: usize, out: &mut Vec<String>) {
    let pad = |level: usize| "  ".repeat(indent + level);

    for (reference, recipe) in list.recipes().iter() {
        out.push(format!("{}{}", pad(0), reference));
        if recipe.revisions.is_empty() {
            continue;
        }
        out.push(format!("{}revisions", pad(1)));
        for (revision, bundle) in recipe.revisions.iter() {
            out.push(format!("{}{}", pad(2), with_time(revision, bundle.timestamp)));
            let Some(packages) = &bundle.packages else {
                continue;
            };
            out.push(format!("{}packages", pad(3)));
            for (package_id, package) in packages.iter() {
                out.push(format!("{}{}", pad(4), package_id));
                if !package.revisions.is_empty() {
                    out.push(format!("{}revisions", pad(5)));
                    for (prev, prev_bundle) in package.revisions.iter() {
                        out.push(format!("{}{}", pad(6), with_time(prev, prev_bundle.timestamp)));
                    }
                }
                let Some(info) = &package.info else {
                    continue;
                };
                if info.settings.is_empty() && info.options.is_empty() {
                    continue;
                }
                out.push(format!("{}info", pad(5)));
                for (section, values) in [("settings", &info.settings), ("options", &info.options)] {
                    if values.is_empty() {
                        continue;
                    }
                    out.push(format!("{}{}", pad(6), section));
                    for (key, value) in values {
                        out.push(format!("{}{}: {}", pad(7), key, value));
                    }
                }
            }
        }
    }
}

/// Print a multi-source list: text tree or JSON document.
pub fn print_results(shell: &Shell, results: &MultiPackagesList) {
    if shell.is_json() {
        shell.print_json(&results.serialize());
        return;
    }

    for (source, entry) in results.entries() {
        shell.print_line(source);
        match entry {
            SourceEntry::Error { error } => shell.print_line(format!("  ERROR: {}", error)),
            SourceEntry::Packages(list) if list.is_empty() => {
                shell.print_line("  There are no matching recipe references")
            }
            SourceEntry::Packages(list) => {
                let mut lines = Vec::new();
                render_list(list, 1, &mut lines);
                for line in lines {
                    shell.print_line(line);
                }
            }
        }
    }
}
