mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cexfind_search::{CexFind, SearchError};

use crate::output::{render_listings, RenderOptions};

const AFTER_HELP: &str =
    "Search for second-hand equipment, e.g.\n  cexfind [--strict] --query \"query 1\" [--query \"query 2\" ...]";

#[derive(Debug, Parser)]
#[command(name = "cexfind")]
#[command(about = "Search the retailer's stock of second-hand equipment")]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Search term; repeat for several, or separate terms with ';'
    #[arg(long = "query", required = true)]
    queries: Vec<String>,

    /// Only return items that strictly match the search terms
    #[arg(long)]
    strict: bool,

    /// Postcode to measure distances to stores from
    #[arg(long)]
    postcode: Option<String>,

    /// Show cash/exchange prices and stores
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn postcode(&self) -> &str {
        self.postcode.as_deref().map_or("", str::trim)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = cexfind_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let queries = match cexfind_core::check_queries(cli.queries.as_slice()) {
        Ok(queries) => queries,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    // Distances need the store list, so only wait for it when asked for them.
    let cex = if cli.postcode().is_empty() {
        CexFind::from_config(&config)?
    } else {
        CexFind::start(&config).await?
    };

    let outcome = cex.search(queries.as_slice(), cli.strict, cli.postcode()).await;
    let distances_available = cex.distances_available();
    cex.shutdown().await;

    let results = match outcome {
        Ok(results) => results,
        Err(e @ (SearchError::NoResults { .. } | SearchError::Postcode(_))) => {
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };
    if let Some(failures) = &results.query_errors {
        eprintln!("{failures}");
    }

    let options = RenderOptions {
        verbose: cli.verbose,
        with_postcode: !cli.postcode().is_empty(),
        distances_available,
    };
    print!("{}", render_listings(&results.listings, &options));
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests;
