//! `berth pkglist` command

use anyhow::Result;

use crate::cli::{PkglistArgs, PkglistCommands};
use crate::commands::print_results;
use berth::ops::merge_lists;
use berth::util::shell::{Shell, Status};

pub fn execute(args: PkglistArgs, shell: &Shell) -> Result<()> {
    match args.command {
        PkglistCommands::Merge(merge) => {
            let merged = merge_lists(&merge.list)?;
            shell.status(Status::Merged, format!("{} package lists", merge.list.len()));
            print_results(shell, &merged);
            Ok(())
        }
    }
}
