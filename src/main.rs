//! DentalChain CLI
//!
//! Command-line client for a running DentalChain API:
//! - Count, fetch and list records for a dentist or patient
//! - Look up dentist profiles
//! - Submit new records
//! - Check status

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dentalchain::api::dto::{RecordListResponse, RecordResponse, SubmitRecordResponse};
use dentalchain::config::generate_default_config;
use dentalchain::ledger::{Address, NewRecord, RecordStore, RecordSubmitter, Role};
use dentalchain::records::{IndexedRecord, RecordAggregator, RemoteRecordStore, WriteGateway};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "dentalchain")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dental records on a public ledger")]
#[command(long_about = "DentalChain client.\nRead dentist and patient records from the ledger and submit new ones through the DentalChain API.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8082", global = true)]
    pub api_url: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", global = true)]
    pub timeout: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Number of records in a dentist's or patient's list
    Count {
        /// dentist or patient
        role: Role,
        /// Owner address (0x...)
        address: Address,
    },

    /// Fetch one record by ledger index
    Record {
        /// dentist or patient
        role: Role,
        /// Owner address (0x...)
        address: Address,
        /// Position in the owner's list
        index: u64,
    },

    /// List all records, newest first
    List {
        /// dentist or patient
        role: Role,
        /// Owner address (0x...)
        address: Address,
    },

    /// Show a dentist's registration details
    Profile {
        /// Dentist address (0x...)
        address: Address,
    },

    /// Submit a new record as a dentist
    Add {
        /// Dentist address (signs the transaction)
        #[arg(long)]
        dentist: Address,
        /// Patient address
        #[arg(long)]
        patient: Address,
        /// Procedure performed
        #[arg(long)]
        procedure: String,
        /// Description
        #[arg(long)]
        description: String,
        /// Diagnosis
        #[arg(long)]
        diagnosis: String,
        /// Wait before listing again (ms)
        #[arg(long, default_value = "2000")]
        settle_ms: u64,
        /// Do not list the dentist's records after submitting
        #[arg(long)]
        no_refresh: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show API and ledger status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so table and JSON output stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dentalchain=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = Arc::new(
        RemoteRecordStore::new(&cli.api_url, Duration::from_secs(cli.timeout))
            .context("Failed to create API client")?,
    );

    match cli.command {
        Commands::Count { role, address } => {
            let count = store
                .record_count(role, &address)
                .await
                .with_context(|| format!("Failed to fetch {role} record count"))?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::json!({ "count": count })),
                OutputFormat::Table => println!("{} record(s) for {} {}", count, role, address),
            }
        }

        Commands::Record { role, address, index } => {
            let record = store
                .record_at(role, &address, index)
                .await
                .with_context(|| format!("Failed to fetch {role} record {index}"))?;

            let response = RecordResponse::new(role, IndexedRecord { index, record });
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
                OutputFormat::Table => print_record_detail(&response),
            }
        }

        Commands::List { role, address } => {
            let aggregator = RecordAggregator::new(Arc::clone(&store) as Arc<dyn RecordStore>);
            let records = aggregator
                .list_records(role, &address)
                .await
                .with_context(|| format!("Failed to list {role} records"))?;

            print_list(cli.format, RecordListResponse::new(role, address, records))?;
        }

        Commands::Profile { address } => {
            let profile = store
                .dentist_profile(&address)
                .await
                .context("Failed to load dentist information")?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
                OutputFormat::Table => {
                    println!("Dentist:   {}", address);
                    println!("Name:      {}", profile.name);
                    println!("License:   {}", profile.license_number);
                    println!("Clinic:    {}", profile.clinic_name);
                }
            }
        }

        Commands::Add {
            dentist,
            patient,
            procedure,
            description,
            diagnosis,
            settle_ms,
            no_refresh,
        } => {
            let gateway = WriteGateway::new(
                Arc::clone(&store) as Arc<dyn RecordSubmitter>,
                Duration::from_millis(settle_ms),
            );
            let record = NewRecord::new(patient, procedure.clone(), description, diagnosis);

            let pending = gateway
                .submit_record(&dentist, record)
                .await
                .context("Failed to add dental record")?;

            if cli.format == OutputFormat::Table {
                println!("Submitted transaction {}", pending.tx_hash);
                println!("Status: pending");
            }

            let mut list = None;
            if !no_refresh {
                if cli.format == OutputFormat::Table {
                    println!();
                    println!("Waiting {} ms for the transaction to settle...", settle_ms);
                }

                let aggregator = RecordAggregator::new(Arc::clone(&store) as Arc<dyn RecordStore>);
                let records = aggregator
                    .refresh_after(&pending, Role::Dentist, &dentist)
                    .await
                    .context("Failed to list dentist records")?;

                let visible = records
                    .iter()
                    .any(|r| r.record.counterparty == patient && r.record.procedure == procedure);
                let records = RecordListResponse::new(Role::Dentist, dentist, records);

                if cli.format == OutputFormat::Table {
                    print_list(cli.format, records)?;
                    if !visible {
                        println!();
                        println!("The new record is not visible yet; it appears once the transaction is mined.");
                    }
                } else {
                    list = Some(records);
                }
            }

            if cli.format == OutputFormat::Json {
                let output = AddOutput {
                    submission: pending.into(),
                    records: list,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            if let Some(path) = output {
                std::fs::write(&path, &config)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Config written to {:?}", path);
            } else {
                print!("{}", config);
            }
        }

        Commands::Status => match store.health().await {
            Ok(health) => {
                if cli.format == OutputFormat::Json {
                    println!("{}", serde_json::to_string_pretty(&health)?);
                    return Ok(());
                }

                println!("DentalChain v{}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("API Status: {}", health.status);
                println!();
                println!("Ledger:");
                println!("  Status:   {}", health.ledger.status);
                println!("  Network:  {} (chain id {})", health.ledger.network, health.ledger.chain_id);
                println!("  Contract: {}", health.ledger.contract_address);
                if let Some(error) = &health.ledger.error {
                    println!("  Error:    {}", error);
                }
                println!();
                println!("Uptime: {}", format_duration(health.uptime_seconds));
            }
            Err(e) => {
                eprintln!("Cannot connect to DentalChain API at {}", cli.api_url);
                eprintln!("Error: {}", e);
                eprintln!();
                eprintln!("Make sure the DentalChain API server is running:");
                eprintln!("  cargo run --bin dentalchain-api");
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

/// JSON output of `add`: the submission and, unless skipped, the refreshed list
#[derive(Serialize)]
struct AddOutput {
    submission: SubmitRecordResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<RecordListResponse>,
}

fn print_list(format: OutputFormat, list: RecordListResponse) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    if list.records.is_empty() {
        println!("No records found for {} {}", list.role, list.owner);
        return Ok(());
    }

    let counterparty = match list.role.counterparty() {
        Role::Dentist => "Dentist",
        Role::Patient => "Patient",
    };

    println!(
        "{:<6} {:<17} {:<43} {:<20} {}",
        "Index", "Date", counterparty, "Procedure", "Diagnosis"
    );
    println!("{}", "-".repeat(110));

    for record in &list.records {
        println!(
            "{:<6} {:<17} {:<43} {:<20} {}",
            record.index,
            format_date(record),
            record.counterparty.to_string(),
            truncate(&record.procedure, 20),
            record.diagnosis
        );
    }

    println!();
    println!("{} record(s)", list.total);
    Ok(())
}

fn print_record_detail(record: &RecordResponse) {
    println!("Index:        {}", record.index);
    println!("Date:         {}", format_date(record));
    println!("{:<13} {}", format!("{}:", capitalize(record.counterparty_role.as_str())), record.counterparty);
    println!("Procedure:    {}", record.procedure);
    println!("Description:  {}", record.description);
    println!("Diagnosis:    {}", record.diagnosis);
}

fn format_date(record: &RecordResponse) -> String {
    record
        .recorded_at
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| record.timestamp.to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
