use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use namex::index::stats::show_stats;
use namex::output;
use namex::utils::logging::{init_logging, Verbosity};
use namex::utils::{encode, get_config_path, AppConfig};
use namex::{SearchEngine, SearchResult};
use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "namex")]
#[command(about = "Multi-core approximate name search over delimited datasets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Search query (when no subcommand is given)
    query: Vec<String>,

    #[command(flatten)]
    format: FormatArgs,

    #[command(flatten)]
    engine: EngineArgs,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Overrides for the configured engine settings
#[derive(Args)]
struct EngineArgs {
    /// Delimited dataset to search (header line + `id,name` rows)
    #[arg(short, long, global = true)]
    source: Option<PathBuf>,

    /// Records per chunk
    #[arg(long, global = true)]
    chunk_size: Option<usize>,

    /// Worker threads (0 = all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Composite score a match must exceed
    #[arg(long, global = true)]
    threshold: Option<u8>,

    /// Weight of the fuzzy score (the phonetic weight becomes 1 - this)
    #[arg(long, global = true)]
    fuzzy_weight: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the dataset once
    Search {
        /// Name to look for
        #[arg(required = true)]
        query: Vec<String>,

        #[command(flatten)]
        format: FormatArgs,
    },
    /// Read queries from stdin, one per line, reloading the dataset when it changes
    Repl {
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Print the phonetic code of each name
    Encode {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Load the dataset and show statistics
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or initialize the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Clone, Copy)]
struct FormatArgs {
    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Order results by descending score
    #[arg(long)]
    sort: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(Verbosity::from_flags(cli.verbose, cli.quiet));

    match cli.command {
        Some(Commands::Encode { names }) => {
            for name in names {
                println!("{}\t{}", name, encode(&name));
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Search { query, format }) => {
            let config = effective_config(&cli.engine)?;
            run_search(&config, &query.join(" "), format)
        }
        Some(Commands::Repl { format }) => run_repl(&effective_config(&cli.engine)?, format),
        Some(Commands::Stats { json }) => run_stats(&effective_config(&cli.engine)?, json),
        Some(Commands::Config { action }) => run_config(&cli.engine, action),
        None => {
            if cli.query.is_empty() {
                bail!("No query given. Try 'namex --help'.");
            }
            let config = effective_config(&cli.engine)?;
            // The bare form always ranks its output
            let format = FormatArgs {
                sort: true,
                ..cli.format
            };
            run_search(&config, &cli.query.join(" "), format)
        }
    }
}

/// Merge config file, environment and command-line overrides
fn effective_config(args: &EngineArgs) -> Result<AppConfig> {
    let mut config = AppConfig::load()?;

    if let Some(source) = &args.source {
        config.source = Some(source.clone());
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(fuzzy) = args.fuzzy_weight {
        config.fuzzy_weight = fuzzy;
        config.phonetic_weight = 1.0 - fuzzy;
    }

    Ok(config)
}

fn open_engine(config: &AppConfig) -> Result<SearchEngine> {
    let Some(source) = &config.source else {
        bail!("No dataset given. Pass --source or set NAMEX_SOURCE.");
    };
    SearchEngine::new(source, config.engine_config())
        .with_context(|| format!("Failed to open {}", source.display()))
}

fn print(mut results: Vec<SearchResult>, format: FormatArgs) -> Result<()> {
    if format.sort {
        output::sort_for_display(&mut results);
    }
    if format.json {
        output::print_json(&results)?;
    } else {
        let color = !format.no_color && io::stdout().is_terminal();
        output::print_results(&results, color)?;
    }
    Ok(())
}

fn run_search(config: &AppConfig, query: &str, format: FormatArgs) -> Result<ExitCode> {
    let engine = open_engine(config)?;
    let results = output::with_spinner("Loading dataset...", || engine.search(query))?;

    let found = !results.is_empty();
    print(results, format)?;

    // Same convention as grep: 1 means nothing matched
    Ok(if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn run_repl(config: &AppConfig, format: FormatArgs) -> Result<ExitCode> {
    let engine = open_engine(config)?;
    let interactive = io::stdin().is_terminal();

    if interactive {
        eprintln!("Searching {} (Ctrl+D to exit)", engine.source_path().display());
    }

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read query")?;
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        match engine.search(query) {
            Ok(results) => {
                let count = results.len();
                print(results, format)?;
                if interactive {
                    eprintln!("{} match{}", count, if count == 1 { "" } else { "es" });
                }
            }
            Err(e) => eprintln!("Search failed: {}", e),
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_stats(config: &AppConfig, json: bool) -> Result<ExitCode> {
    let engine = open_engine(config)?;
    output::with_spinner("Loading dataset...", || engine.refresh())?;

    let stats = engine.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        show_stats(&stats);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_config(args: &EngineArgs, action: ConfigAction) -> Result<ExitCode> {
    match action {
        ConfigAction::Show => {
            let config = effective_config(args)?;
            if let Some(path) = get_config_path() {
                eprintln!("Config file: {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        // Does not read the existing file, so a broken one can be reset
        ConfigAction::Init => {
            let path = AppConfig::default().save()?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}
