//! corp-loader: Build the local corporation registry from the OpenDART code feed.
//!
//! Reads the corpCode feed (plain XML, the zipped archive, or a fresh download),
//! flattens it into records and upserts them into the `companies` table.
//!
//! Usage:
//!   cargo run -p corp-loader -- --xml CORPCODE.xml
//!   cargo run -p corp-loader -- --zip corpCode.zip --db corpcode.db
//!   cargo run -p corp-loader -- --download --search 삼성
//!   cargo run -p corp-loader -- --xml CORPCODE.xml --dry-run

use corp_registry::{extract_feed, parse_feed, parse_feed_bytes, RegistryRecord, RegistryStore};
use opendart_client::OpenDartClient;

const DEFAULT_DB: &str = "corpcode.db";
const SAMPLE_SIZE: i64 = 5;

#[derive(Debug, PartialEq)]
enum FeedSource {
    Xml(String),
    Zip(String),
    Download,
}

#[derive(Debug, PartialEq)]
struct Options {
    source: FeedSource,
    db_path: String,
    dry_run: bool,
    search: Option<String>,
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .filter(|s| !s.starts_with("--"))
}

fn parse_options(args: &[String]) -> Option<Options> {
    let source = if let Some(path) = flag_value(args, "--xml") {
        FeedSource::Xml(path.to_string())
    } else if let Some(path) = flag_value(args, "--zip") {
        FeedSource::Zip(path.to_string())
    } else if args.iter().any(|a| a == "--download") {
        FeedSource::Download
    } else {
        return None;
    };

    Some(Options {
        source,
        db_path: flag_value(args, "--db").unwrap_or(DEFAULT_DB).to_string(),
        dry_run: args.iter().any(|a| a == "--dry-run"),
        search: flag_value(args, "--search").map(str::to_string),
    })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  corp-loader --xml PATH       Load a local CORPCODE.xml feed");
    eprintln!("  corp-loader --zip PATH       Load a local corpCode.zip archive");
    eprintln!("  corp-loader --download       Download the archive (needs OPENDART_API_KEY)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db PATH          SQLite DB path (default: {})", DEFAULT_DB);
    eprintln!("  --dry-run          Parse and report without writing to DB");
    eprintln!("  --search TERM      Run a sample search after loading");
}

async fn read_records(source: &FeedSource) -> anyhow::Result<Vec<RegistryRecord>> {
    let records = match source {
        FeedSource::Xml(path) => {
            tracing::info!("Reading feed from {}", path);
            let bytes = tokio::fs::read(path).await?;
            parse_feed_bytes(&bytes)?
        }
        FeedSource::Zip(path) => {
            tracing::info!("Reading archive from {}", path);
            let bytes = tokio::fs::read(path).await?;
            parse_feed(&extract_feed(&bytes)?)?
        }
        FeedSource::Download => {
            let client = OpenDartClient::from_env()?;
            let bytes = client.download_corp_codes().await?;
            parse_feed(&extract_feed(&bytes)?)?
        }
    };

    Ok(records)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corp_loader=info,corp_registry=info,opendart_client=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(options) = parse_options(&args) else {
        print_usage();
        std::process::exit(1);
    };

    let records = read_records(&options.source).await?;
    let with_code = records.iter().filter(|r| r.to_identity().is_some()).count();
    tracing::info!(
        "Parsed {} records ({} with corp_code)",
        records.len(),
        with_code
    );

    if options.dry_run {
        let listed = records
            .iter()
            .filter_map(RegistryRecord::to_identity)
            .filter(|c| c.is_listed())
            .count();
        println!("Dry run: {} records, {} usable, {} listed", records.len(), with_code, listed);
        return Ok(());
    }

    let store = RegistryStore::new(&format!("sqlite:{}", options.db_path)).await?;
    let summary = store.load(&records).await?;
    let stats = store.stats().await?;

    println!("Loaded {} companies into {} ({} skipped)", summary.loaded, options.db_path, summary.skipped);
    println!(
        "Registry: {} total, {} listed, {} unlisted",
        stats.total, stats.listed, stats.unlisted
    );

    let sample = store.listed_sample(SAMPLE_SIZE).await?;
    if !sample.is_empty() {
        println!("Sample listed companies:");
        for company in &sample {
            println!("  {} {} ({})", company.corp_code, company.corp_name, company.stock_code);
        }
    }

    if let Some(term) = options.search.as_deref() {
        let results = store.search(term, None).await?;
        println!("Search '{}': {} results", term, results.len());
        for company in &results {
            let listing = if company.is_listed() { company.stock_code.as_str() } else { "unlisted" };
            println!("  {} {} [{}]", company.corp_code, company.corp_name, listing);
        }
    }

    Ok(())
}
