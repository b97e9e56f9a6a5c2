//! CLI definitions using clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use berth::ops::CacheFolder;
use berth::util::shell::ColorChoice;

/// berth - query and select recipe and package references
#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// When to use colors: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List recipes and packages in the local cache or remotes
    List(ListArgs),

    /// Remove recipes or packages from the local cache
    Remove(RemoveArgs),

    /// Inspect the local cache layout
    Cache(CacheArgs),

    /// Work with package list files
    Pkglist(PkglistArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Commands {
    /// Whether the command was asked for JSON output.
    pub fn json_output(&self) -> bool {
        let format = match self {
            Commands::List(args) => args.format,
            Commands::Remove(args) => args.format,
            Commands::Pkglist(args) => match &args.command {
                PkglistCommands::Merge(merge) => merge.format,
            },
            Commands::Cache(_) | Commands::Completions(_) => OutputFormat::Text,
        };
        format == OutputFormat::Json
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn parse_lru(text: &str) -> Result<Duration, String> {
    berth::util::dates::parse_duration(text).map_err(|e| e.to_string())
}

#[derive(Args)]
pub struct ListArgs {
    /// Pattern: name/version@user/channel#rrev:package_id#prev, '*' allowed
    pub pattern: String,

    /// Only packages matching a query, e.g. "os=Windows AND arch=x86"
    #[arg(short, long)]
    pub package_query: Option<String>,

    /// Remote names (or globs) to list from
    #[arg(short, long)]
    pub remote: Vec<String>,

    /// Also list the local cache when remotes are given
    #[arg(short, long)]
    pub cache: bool,

    /// Only references not used within this time, e.g. 2w, 30d, 12h
    #[arg(long, value_parser = parse_lru)]
    pub lru: Option<Duration>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// Pattern; revisions default to all of them
    pub pattern: Option<String>,

    /// Remove without asking for confirmation
    #[arg(short, long)]
    pub confirm: bool,

    /// Only packages matching a query
    #[arg(short, long)]
    pub package_query: Option<String>,

    /// Remote to remove from
    #[arg(short, long)]
    pub remote: Option<String>,

    /// Package list file to remove
    #[arg(short, long = "list", value_name = "FILE")]
    pub list: Option<PathBuf>,

    /// Only references not used within this time, e.g. 2w, 30d, 12h
    #[arg(long, value_parser = parse_lru)]
    pub lru: Option<Duration>,

    /// Show what would be removed without removing it
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show the cache path of a recipe or package reference
    Path(CachePathArgs),

    /// Remove source, build or download folders from the cache
    Clean(CacheCleanArgs),
}

/// Cache folder kinds.
#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum FolderArg {
    Export,
    ExportSource,
    Source,
    Package,
    Build,
}

impl From<FolderArg> for CacheFolder {
    fn from(arg: FolderArg) -> Self {
        match arg {
            FolderArg::Export => CacheFolder::Export,
            FolderArg::ExportSource => CacheFolder::ExportSource,
            FolderArg::Source => CacheFolder::Source,
            FolderArg::Package => CacheFolder::Package,
            FolderArg::Build => CacheFolder::Build,
        }
    }
}

#[derive(Args)]
pub struct CachePathArgs {
    /// Recipe reference or package reference
    pub reference: String,

    /// Folder to show (default: export for recipes, package for packages)
    #[arg(long, value_enum)]
    pub folder: Option<FolderArg>,
}

#[derive(Args)]
pub struct CacheCleanArgs {
    /// Pattern; revisions and package ids default to all of them
    pub pattern: String,

    /// Clean source folders
    #[arg(short, long)]
    pub source: bool,

    /// Clean build folders
    #[arg(short, long)]
    pub build: bool,

    /// Clean download folders
    #[arg(short, long)]
    pub download: bool,

    /// Only packages matching a query
    #[arg(short, long)]
    pub package_query: Option<String>,

    /// Clean recipe folders only, leaving packages alone
    #[arg(long, conflicts_with = "package_query")]
    pub only_recipe: bool,
}

#[derive(Args)]
pub struct PkglistArgs {
    #[command(subcommand)]
    pub command: PkglistCommands,
}

#[derive(Subcommand)]
pub enum PkglistCommands {
    /// Merge several package list files into one
    Merge(PkglistMergeArgs),
}

#[derive(Args)]
pub struct PkglistMergeArgs {
    /// Package list files to merge
    #[arg(short, long = "list", value_name = "FILE", required = true)]
    pub list: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
