//! IANA TLD CLI Application
//!
//! A command-line interface for scraping and querying IANA TLD delegation
//! data. This CLI application provides a user-friendly front-end to the
//! iana-tld-lib library: an eager mode that processes every delegated TLD
//! up front, and a lazy mode that looks up individual TLDs on demand.

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use console::style;
use iana_tld_lib::{ClientConfig, IanaClient, IanaError};
use std::io::Write;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Exit code used when a single TLD fetch exhausts its retry budget.
const EXIT_RETRY_EXHAUSTED: i32 = 101;

/// CLI arguments for iana-tld
#[derive(Parser, Debug)]
#[command(name = "iana-tld")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scrape and query IANA TLD delegation data")]
#[command(
    long_about = "Downloads the IANA root TLD list, scrapes per-TLD delegation pages into\nstructured records, and caches the results as a delimited text store plus a\nJSON index.\n\nWithout --all, the given TLDs are looked up lazily and cached in memory only."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// TLD names to look up (leading dot accepted, case-insensitive)
    #[arg(value_name = "TLDS", help_heading = "Lookup")]
    pub tlds: Vec<String>,

    /// Print the known-TLD set from the root list and exit
    #[arg(long = "list", help_heading = "Lookup")]
    pub list: bool,

    /// Print lookup results as JSON instead of the delimited line format
    #[arg(short = 'j', long = "json", help_heading = "Lookup")]
    pub json: bool,

    /// Scrape every known TLD up front and rebuild the stores
    #[arg(long = "all", help_heading = "Processing")]
    pub all: bool,

    /// Overwrite the results file without confirmation
    #[arg(short = 'y', long = "overwrite", help_heading = "Processing")]
    pub overwrite: bool,

    /// Never prompt; combined with --all this overwrites silently
    #[arg(long = "no-interactive", help_heading = "Processing")]
    pub no_interactive: bool,

    /// Re-download the root list even if the cached copy is fresh
    #[arg(long = "force-refresh", help_heading = "Processing")]
    pub force_refresh: bool,

    /// Base directory for all files
    #[arg(
        short = 'd',
        long = "dir",
        value_name = "PATH",
        default_value = "data",
        help_heading = "Files"
    )]
    pub dir: PathBuf,

    /// Emit each scraped record as a diagnostic line on stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = run(&args).await {
        eprintln!("{} {}", style("error:").red().bold(), err);
        process::exit(error_exit_code(&err));
    }
}

async fn run(args: &Args) -> Result<(), IanaError> {
    let config = ClientConfig::default()
        .with_directory(args.dir.clone())
        .with_verbose(args.verbose)
        .with_overwrite_results(args.overwrite)
        .with_interactive(!args.no_interactive)
        .with_eager(args.all)
        .with_force_refresh(args.force_refresh);

    let mut client = IanaClient::with_config(config);
    client.init().await?;

    if args.list {
        for tld in client.known_tlds() {
            println!("{}", tld);
        }
        return Ok(());
    }

    if args.all {
        run_eager(&mut client).await?;
    }

    for tld in &args.tlds {
        lookup_one(&mut client, tld, args.json).await?;
    }

    Ok(())
}

/// Run the full scrape, asking before clobbering an existing results file
/// when the configuration calls for it.
async fn run_eager(client: &mut IanaClient) -> Result<(), IanaError> {
    let config = client.config();
    let needs_confirmation =
        !config.overwrite_results && config.interactive && client.results_file_exists();

    if needs_confirmation && !confirm_overwrite(&client.results_path())? {
        eprintln!(
            "{}",
            style("Keeping existing results; re-exporting the JSON index only.").yellow()
        );
        return client.export_existing();
    }

    let total = client.known_tlds().len();
    eprintln!(
        "{} {} known TLDs...",
        style("Processing").green().bold(),
        total
    );
    client.run_eager().await
}

/// Prompt on stdin; only a "y"/"Y" answer proceeds with the overwrite.
fn confirm_overwrite(path: &std::path::Path) -> Result<bool, IanaError> {
    print!(
        "File {} already exists; overwrite? y/[N] ",
        style(path.display()).cyan()
    );
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

async fn lookup_one(client: &mut IanaClient, tld: &str, json: bool) -> Result<(), IanaError> {
    match client.lookup(tld).await? {
        Some(record) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{}", record.to_line());
            }
        }
        None => {
            println!("{}: {}", tld, style("not found in the root zone").yellow());
        }
    }
    Ok(())
}

/// Map library errors to the documented process exit codes.
fn error_exit_code(err: &IanaError) -> i32 {
    match err {
        IanaError::RetryExhausted { .. } => EXIT_RETRY_EXHAUSTED,
        _ => 1,
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_exhaustion_maps_to_101() {
        let err = IanaError::retry_exhausted("nl", "https://example.org/nl.html", 11);
        assert_eq!(error_exit_code(&err), 101);
        assert_eq!(error_exit_code(&IanaError::network("refused")), 1);
        assert_eq!(error_exit_code(&IanaError::store_format(2, "bad")), 1);
    }

    #[test]
    fn args_defaults() {
        let args = Args::parse_from(["iana-tld", "nl"]);
        assert_eq!(args.tlds, vec!["nl"]);
        assert_eq!(args.dir, PathBuf::from("data"));
        assert!(!args.all);
        assert!(!args.overwrite);
        assert!(!args.no_interactive);
        assert!(!args.force_refresh);
        assert!(!args.json);
    }
}
