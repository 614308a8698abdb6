use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use vitals_core::*;

#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "Health record store and query tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether the health store can be used
    Availability,

    /// Check (or request) the configured read/write permissions
    Permissions {
        /// Ask the store to grant the permissions instead of only checking
        #[arg(long)]
        request: bool,
    },

    /// Open the health store's settings (best effort)
    Settings,

    /// Insert a ready-made sample record
    Insert {
        #[arg(value_enum)]
        kind: SampleKind,
    },

    /// Insert records from a JSON file holding an array of record payloads
    Import { path: PathBuf },

    /// Print one stored record
    Get {
        record_type: RecordType,
        record_id: String,
    },

    /// Print one page of records
    Read {
        record_type: RecordType,

        /// Only records at or after this time (RFC 3339)
        #[arg(long)]
        after: Option<DateTime<Utc>>,

        /// Only records before this time (RFC 3339)
        #[arg(long)]
        before: Option<DateTime<Utc>>,

        /// Only records written by this origin (repeatable)
        #[arg(long = "origin")]
        origins: Vec<String>,

        /// Newest first
        #[arg(long)]
        descending: bool,

        #[arg(long)]
        page_size: Option<u32>,

        /// Token printed by a previous read
        #[arg(long)]
        page_token: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SampleKind {
    Steps,
    Weight,
    HeartRate,
    Sleep,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    vitals_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let store = JsonlHealthStore::new(&data_dir, config.data.data_origin.clone());
    let client = HealthClient::new(store);

    match cli.command {
        Commands::Availability => cmd_availability(&client).await,
        Commands::Permissions { request } => cmd_permissions(&client, &config, request).await,
        Commands::Settings => {
            client.open_settings().await;
            println!("Settings requested.");
            Ok(())
        }
        Commands::Insert { kind } => cmd_insert(&client, &config, kind).await,
        Commands::Import { path } => cmd_import(&client, &path).await,
        Commands::Get {
            record_type,
            record_id,
        } => {
            let record = client.read_record(record_type, &record_id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Commands::Read {
            record_type,
            after,
            before,
            origins,
            descending,
            page_size,
            page_token,
        } => {
            let filter = time_filter(after, before)?;
            let mut options = GetRecordsOptions::new(record_type, filter).with_data_origins(origins);
            if descending {
                options = options.with_ascending_order(false);
            }
            if let Some(size) = page_size.or(config.query.page_size) {
                options = options.with_page_size(size);
            }
            if let Some(token) = page_token {
                options = options.with_page_token(token);
            }
            let page = client.read_records(&options).await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
            Ok(())
        }
    }
}

async fn cmd_availability(client: &HealthClient<JsonlHealthStore>) -> Result<()> {
    let status = client.check_availability().await?;
    println!("{:?}", status);
    Ok(())
}

async fn cmd_permissions(
    client: &HealthClient<JsonlHealthStore>,
    config: &Config,
    request: bool,
) -> Result<()> {
    let wanted = config.permissions.to_request()?;
    let status = if request {
        client.request_permissions(&wanted).await?
    } else {
        client.check_permissions(&wanted).await?
    };

    println!("Granted: {}", status.granted_permissions.join(", "));
    println!("All permissions: {}", status.has_all_permissions);
    let missing = permissions::missing(&wanted, &status);
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|t| t.as_str()).collect();
        println!("Missing: {}", names.join(", "));
    }
    Ok(())
}

async fn cmd_insert(
    client: &HealthClient<JsonlHealthStore>,
    config: &Config,
    kind: SampleKind,
) -> Result<()> {
    client.ensure_available().await?;

    let now = Utc::now();
    let offset = config.records.zone_offset()?;
    let records = match kind {
        SampleKind::Steps => vec![demo::steps(now, offset)?],
        SampleKind::Weight => vec![demo::weight(now, offset)?],
        SampleKind::HeartRate => vec![demo::heart_rate(now, offset)?],
        SampleKind::Sleep => demo::sleep_sessions(now, offset)?,
    };

    let ids = client.insert_records(&records).await?;
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

async fn cmd_import(client: &HealthClient<JsonlHealthStore>, path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path)?;
    let payloads: Vec<serde_json::Value> = serde_json::from_str(&contents)?;

    let records = payloads
        .into_iter()
        .map(Record::from_json)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let ids = client.insert_records(&records).await?;
    println!("Imported {} records", ids.len());
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

fn time_filter(
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
) -> Result<TimeRangeFilter> {
    Ok(match (after, before) {
        (Some(start), Some(end)) => TimeRangeFilter::between(start, end)?,
        (Some(start), None) => TimeRangeFilter::after(start),
        (None, Some(end)) => TimeRangeFilter::before(end),
        (None, None) => TimeRangeFilter::after(DateTime::<Utc>::UNIX_EPOCH),
    })
}
