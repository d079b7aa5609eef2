use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "sitedex",
    about = "Build a page manifest and search index for a markdown site"
)]
pub struct Cli {
    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Defaults to `build` in the current directory
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rebuild pages.json and search_index.json (full rebuild)
    Build(BuildArgs),
    /// Query an existing search_index.json
    Search(SearchArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Build --

#[derive(Debug, Default, Parser)]
pub struct BuildArgs {
    /// Site root directory (defaults to the current directory)
    pub root: Option<PathBuf>,

    /// Write search_index.json without indentation
    #[arg(long)]
    pub compact: bool,

    /// Keep filesystem enumeration order instead of sorting pages
    #[arg(long)]
    pub fs_order: bool,

    /// Skip paths matching this glob (relative to the root; repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query (prefix a word with `title:` or `body:` to
    /// restrict it to one field)
    pub query: String,

    /// Site root holding search_index.json
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Number of results to return
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "sitedex",
            &mut std::io::stdout(),
        );
    }
}
