use clap::Parser;
use sitedex::{
    BuildOptions,
    SearchHit,
    SearchIndex,
    SiteRoot,
    Written,
    build_site_index_with,
    error,
    site_root::{PAGES_FILE, SEARCH_INDEX_FILE},
    walker::{TraversalOrder, WalkOptions},
};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{BuildArgs, Cli, Command, SearchArgs};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("SITEDEX_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        None => cmd_build(&BuildArgs::default())?,
        Some(Command::Build(args)) => cmd_build(&args)?,
        Some(Command::Search(args)) => cmd_search(&args)?,
        Some(Command::Completions(args)) => args.generate(),
    }

    Ok(())
}

fn cmd_build(args: &BuildArgs) -> error::Result<()> {
    let site = SiteRoot::resolve(args.root.as_deref())?;
    let options = BuildOptions {
        walk: WalkOptions {
            order: if args.fs_order {
                TraversalOrder::Filesystem
            } else {
                TraversalOrder::Sorted
            },
            exclude: args.exclude.clone(),
        },
        pretty_index: !args.compact,
    };

    let report =
        build_site_index_with(&site, &options, |written| match written {
            Written::Manifest { pages } => {
                println!("{PAGES_FILE} updated ({pages} pages)")
            }
            Written::Index { documents } => {
                println!("{SEARCH_INDEX_FILE} updated ({documents} documents)")
            }
        })?;

    if !report.skipped.is_empty() {
        eprintln!(
            "Skipped {} document(s) that are listed in {PAGES_FILE} but not searchable:",
            report.skipped.len()
        );
        for skipped in &report.skipped {
            eprintln!("  {}: {}", skipped.path, skipped.error);
        }
    }

    Ok(())
}

fn cmd_search(args: &SearchArgs) -> error::Result<()> {
    let site = SiteRoot::resolve(args.root.as_deref())?;
    let index = SearchIndex::load(&site.search_index())?;

    let hits: Vec<SearchHit> =
        index.search(&args.query).into_iter().take(args.count).collect();

    if args.json {
        let out = serde_json::json!({
            "query": args.query,
            "result_count": hits.len(),
            "results": hits,
        });
        println!("{out}");
    } else if hits.is_empty() {
        println!("No results found.");
    } else {
        for (rank, hit) in hits.iter().enumerate() {
            println!("{:>3}. [{:.3}] {}", rank + 1, hit.score, hit.url);
        }
        println!("\n{} result(s)", hits.len());
    }

    Ok(())
}
