use clap::Parser;
use docvault::cli::{Cli, Commands, LogFormat};
use docvault::commands::{self, Overrides};
use docvault::config::Config;
use docvault::format;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = Config::load()?;
    let mut overrides = Overrides {
        root: cli.root.clone(),
        ..Overrides::default()
    };

    match cli.command {
        Some(Commands::Search {
            query,
            limit,
            json,
            context_lines,
            extensions,
        }) => {
            overrides.context_lines = context_lines;
            overrides.extensions = extensions;

            let query = Commands::query_text(&query);
            let results = commands::search(&config, &overrides, &query, limit)?;

            if json {
                println!("{}", format::render_json(&results)?);
            } else {
                print!("{}", format::render_text(&query, &results));
            }
            Ok(())
        }
        Some(Commands::List { json }) => {
            let documents = commands::list(&config, &overrides)?;

            if json {
                println!("{}", format::render_json(&documents)?);
            } else if documents.is_empty() {
                println!("No documents found.");
            } else {
                for doc in &documents {
                    println!("{}  {}  ({})", doc.path, doc.title, doc.source_url);
                }
            }
            Ok(())
        }
        Some(Commands::Get { path }) => {
            print!("{}", commands::get(&config, &overrides, &path)?);
            Ok(())
        }
        #[cfg(feature = "mcp")]
        Some(Commands::Serve) => {
            tokio::runtime::Runtime::new()?.block_on(docvault::mcp::serve(config, overrides))
        }
        None => {
            Cli::parse_from(["docvault", "--help"]);
            Ok(())
        }
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docvault=warn",
        1 => "docvault=info",
        2 => "docvault=debug",
        _ => "docvault=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
