use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use unicode_width::UnicodeWidthStr;

use bbt::config::app_config::{AppConfig, load_config};
use bbt::http_probe::driver::Prober;
use bbt::http_probe::result::ProbeResultSet;
use bbt::recon::crtsh::{crtsh_client, fetch_crtsh_subdomains};
use bbt::store::{OutputStore, Scope, load_scope};

const MAX_HOST_WIDTH: usize = 48;

#[derive(Debug, Parser)]
#[command(name = "bbt", version, about = "Polite passive recon: crt.sh subdomains and HTTP(S) liveness checks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Initialize a scope file and run passive collection (crt.sh).
    InitScope {
        main_domain: String,

        /// Additional in-scope domains (repeatable).
        #[arg(short = 's', long = "in-scope")]
        in_scope: Vec<String>,

        /// Output directory.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check which subdomains in a saved scope file are alive.
    CheckLive {
        scope_json: PathBuf,

        /// Output directory.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Max concurrent probes (keep low).
        #[arg(short, long)]
        workers: Option<usize>,

        /// Try http:// before https://.
        #[arg(long)]
        prefer_http: bool,
    },

    /// Probe the given hosts and print the results as JSON.
    Probe {
        #[arg(required = true)]
        hosts: Vec<String>,

        #[arg(short, long)]
        workers: Option<usize>,

        #[arg(long)]
        prefer_http: bool,
    },
}

/// Pads or truncates to `width` terminal columns.
fn to_fixed_width(input: &str, width: usize) -> String {
    use unicode_truncate::UnicodeTruncateStr;

    let (truncated, used) = input.unicode_truncate(width);
    format!("{truncated}{}", " ".repeat(width - used))
}

fn print_summary(results: &ProbeResultSet) {
    let width = results
        .iter()
        .map(|r| r.host.width())
        .max()
        .unwrap_or(10)
        .min(MAX_HOST_WIDTH);

    for result in results {
        let host = to_fixed_width(&result.host, width);
        match result.status_code {
            Some(status) => println!(
                "{host}  ✅ {status}  {:<16}  {}",
                result.server.as_deref().unwrap_or("-"),
                result.final_url.as_deref().unwrap_or("-"),
            ),
            None => println!(
                "{host}  ❌ ---  {}",
                result.error.as_deref().unwrap_or("no result")
            ),
        }
    }
    println!("{}/{} hosts alive", results.alive().count(), results.len());
}

async fn init_scope(
    config: &AppConfig,
    main_domain: String,
    in_scope: Vec<String>,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let store = OutputStore::open(out.unwrap_or_else(|| config.output_dir.clone()))
        .context("Failed to create output directory")?;

    let mut scope = Scope::new(main_domain.trim(), in_scope);
    println!(
        "Starting passive recon for {} (this may take a few seconds)...",
        scope.main_domain
    );

    let client = crtsh_client(&config.crtsh, &config.probe.user_agent)?;
    let subdomains = match fetch_crtsh_subdomains(&client, &config.crtsh, &scope.main_domain).await {
        Ok(subdomains) => subdomains,
        Err(e) => {
            log::error!("Error querying crt.sh: {e}");
            Default::default()
        }
    };
    scope.passive.crtsh_subdomains = subdomains.into_iter().collect();

    let path = store.save_scope(&scope).context("Failed to save scope")?;
    println!(
        "Found {} subdomains. Scope saved to: {}",
        scope.passive.crtsh_subdomains.len(),
        path.display()
    );
    Ok(())
}

async fn check_live(
    config: &AppConfig,
    scope_json: PathBuf,
    out: Option<PathBuf>,
    workers: Option<usize>,
    prefer_http: bool,
) -> anyhow::Result<()> {
    let scope = load_scope(&scope_json)
        .with_context(|| format!("Failed to read scope file {}", scope_json.display()))?;

    let hosts = scope.probe_targets();
    if hosts.is_empty() {
        println!("No subdomains found in scope file.");
        return Ok(());
    }

    let store = OutputStore::open(out.unwrap_or_else(|| config.output_dir.clone()))
        .context("Failed to create output directory")?;

    let mut settings = config.probe.clone();
    if let Some(workers) = workers {
        settings = settings.with_max_workers(workers);
    }
    if prefer_http {
        settings = settings.with_prefer_http(true);
    }

    let prober = Prober::new(settings);
    println!(
        "Probing {} hosts with {} workers (polite)...",
        hosts.len(),
        prober.settings().max_workers
    );

    let results = prober.check_hosts(hosts).await;
    let path = store
        .save_livecheck(&scope.main_domain, &results)
        .context("Failed to save live-check results")?;

    print_summary(&results);
    println!("Live-check results saved to {}", path.display());
    Ok(())
}

async fn probe(
    config: &AppConfig,
    hosts: Vec<String>,
    workers: Option<usize>,
    prefer_http: bool,
) -> anyhow::Result<()> {
    let mut settings = config.probe.clone();
    if let Some(workers) = workers {
        settings = settings.with_max_workers(workers);
    }
    if prefer_http {
        settings = settings.with_prefer_http(true);
    }

    let results = Prober::new(settings).check_hosts(&hosts).await;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config().context("Failed to load configuration")?;

    match cli.command {
        Command::InitScope {
            main_domain,
            in_scope,
            out,
        } => init_scope(&config, main_domain, in_scope, out).await,
        Command::CheckLive {
            scope_json,
            out,
            workers,
            prefer_http,
        } => check_live(&config, scope_json, out, workers, prefer_http).await,
        Command::Probe {
            hosts,
            workers,
            prefer_http,
        } => probe(&config, hosts, workers, prefer_http).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_fixed_width_pads_and_truncates() {
        assert_eq!(to_fixed_width("abc", 5), "abc  ");
        assert_eq!(to_fixed_width("abcdefgh", 5), "abcde");
    }

    #[test]
    fn test_to_fixed_width_counts_columns_not_bytes() {
        let umlaut = to_fixed_width("bücher.example", 16);
        assert_eq!(umlaut, "bücher.example  ");
        assert_eq!(umlaut.width(), 16);

        // two columns per ideograph; a glyph that does not fit is padded instead
        let cjk = to_fixed_width("例え.jp", 3);
        assert_eq!(cjk, "例 ");
        assert_eq!(cjk.width(), 3);
    }

    #[test]
    fn test_cli_parses_check_live() {
        let cli = Cli::try_parse_from(["bbt", "check-live", "out/x_scope.json", "-w", "4", "--prefer-http"])
            .expect("valid arguments");
        match cli.command {
            Command::CheckLive {
                scope_json,
                workers,
                prefer_http,
                out,
            } => {
                assert_eq!(scope_json, PathBuf::from("out/x_scope.json"));
                assert_eq!(workers, Some(4));
                assert!(prefer_http);
                assert_eq!(out, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_repeated_in_scope() {
        let cli = Cli::try_parse_from(["bbt", "init-scope", "example.com", "-s", "a.com", "-s", "b.com"])
            .expect("valid arguments");
        match cli.command {
            Command::InitScope { main_domain, in_scope, .. } => {
                assert_eq!(main_domain, "example.com");
                assert_eq!(in_scope, vec!["a.com", "b.com"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
