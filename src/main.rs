use anyhow::{Context, Result as AnyhowResult};
use clap::{Parser, Subcommand};
use manview::app::{run_event_loop, Viewer};
use manview::config::ViewerConfig;
use manview::find::{build_find_index_with, locate_find_match};
use manview::model::document::Document;
use manview::primitives::option_terms::parse_option_terms;
use manview::services::tracing_setup;
use std::path::{Path, PathBuf};

/// A terminal manual-page viewer
#[derive(Parser, Debug)]
#[command(name = "manview")]
#[command(about = "View structured manual pages in the terminal", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a JSON config file (default: <config_dir>/manview/config.json)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Path to log file (default: system temp dir)
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    /// Print batch results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    print_schema: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a page payload in the pager
    View {
        file: PathBuf,

        /// Anchor to jump to on open (heading, code block or option id)
        #[arg(long, value_name = "ID")]
        anchor: Option<String>,
    },
    /// Count case-insensitive matches of QUERY
    Count { file: PathBuf, query: String },
    /// Resolve the INDEX-th match of QUERY to a block
    Locate {
        file: PathBuf,
        query: String,
        index: usize,
    },
    /// Split a flag list like "-r, --recursive" into flags
    Options { flags: String },
}

fn load_config(path: Option<&Path>) -> AnyhowResult<ViewerConfig> {
    match path {
        Some(path) => ViewerConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(ViewerConfig::load_or_default()),
    }
}

fn load_document(path: &Path) -> AnyhowResult<Document> {
    Document::load(path).with_context(|| format!("cannot open page {}", path.display()))
}

fn page_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    if args.print_schema {
        let schema = schemars::schema_for!(ViewerConfig);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let config = load_config(args.config.as_deref())?;
    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(tracing_setup::default_log_path);
    tracing_setup::init_global(&log_file);

    match args.command {
        None => {
            anyhow::bail!("no command given; try `manview view PAGE.json` or `manview --help`")
        }
        Some(Command::View { file, anchor }) => {
            let document = load_document(&file)?;
            view(page_title(&file), document, config, anchor)
        }
        Some(Command::Count { file, query }) => {
            let document = load_document(&file)?;
            let index = build_find_index_with(&document.blocks, &query, config.min_query_len);
            if args.json {
                println!("{}", serde_json::json!({ "query": query, "total": index.total }));
            } else {
                println!("{}", index.total);
            }
            Ok(())
        }
        Some(Command::Locate { file, query, index }) => {
            let document = load_document(&file)?;
            let find = build_find_index_with(&document.blocks, &query, config.min_query_len);
            let location = locate_find_match(&find.prefix_by_block, index);
            match (location, args.json) {
                (Some(loc), true) => println!(
                    "{}",
                    serde_json::json!({
                        "blockIndex": loc.block_index,
                        "withinBlockIndex": loc.within_block_index,
                    })
                ),
                (Some(loc), false) => {
                    println!("block {} match {}", loc.block_index, loc.within_block_index)
                }
                (None, true) => println!("null"),
                (None, false) => anyhow::bail!(
                    "match {} out of range ({} matches for {:?})",
                    index,
                    find.total,
                    query
                ),
            }
            Ok(())
        }
        Some(Command::Options { flags }) => {
            let terms = parse_option_terms(&flags);
            if args.json {
                println!("{}", serde_json::to_string(&terms)?);
            } else {
                for term in terms {
                    println!("{term}");
                }
            }
            Ok(())
        }
    }
}

fn view(
    title: String,
    document: Document,
    config: ViewerConfig,
    anchor: Option<String>,
) -> AnyhowResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start runtime")?;
    let local = tokio::task::LocalSet::new();

    // Everything fallible happens before the terminal enters raw mode
    let (width, height) = crossterm::terminal::size().context("failed to read terminal size")?;
    tracing::info!("viewer starting at {}x{}", width, height);

    let mut viewer = Viewer::new(title, document, config, width, height);
    if let Some(anchor) = anchor {
        viewer.jump_to_anchor(&anchor);
    }

    let mut terminal = ratatui::init();
    let result = local.block_on(&runtime, run_event_loop(&mut viewer, &mut terminal));
    ratatui::restore();
    result
}
