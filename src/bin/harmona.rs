//! Harmona CLI - Command-line interface for the harmonization engine
//!
//! Commands:
//! - export: Run the full harmonization pass and write the unified table
//! - schema: Print the unified output schema
//! - doctor: Diagnose source export availability

use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use harmona::adapters::{
    DexcomAdapter, ElitehrvAdapter, PisonAdapter, SourceAdapter, StarfitAdapter, WhoopAdapter,
};
use harmona::{
    export, HarmonizeError, Harmonizer, HarmonizerConfig, HARMONA_VERSION, PRODUCER_NAME,
};

/// Harmona - harmonize multi-device daily health metrics
#[derive(Parser)]
#[command(name = "harmona")]
#[command(author = "Harmona Health")]
#[command(version = HARMONA_VERSION)]
#[command(about = "Harmonize device exports into one daily clinical table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full harmonization pass and write the unified table
    Export {
        /// Configuration file (JSON); flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory containing the source exports
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output table path (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Patient id stamped on every row
        #[arg(long)]
        patient_id: Option<String>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the unified output schema
    Schema {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose source export availability
    Doctor {
        /// Configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory containing the source exports
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), HarmonaCliError> {
    match cli.command {
        Commands::Export {
            config,
            data_dir,
            output,
            patient_id,
            json,
        } => cmd_export(config.as_deref(), data_dir, output, patient_id, json),

        Commands::Schema { json } => cmd_schema(json),

        Commands::Doctor {
            config,
            data_dir,
            json,
        } => cmd_doctor(config.as_deref(), data_dir, json),
    }
}

fn resolve_config(
    config_path: Option<&std::path::Path>,
    data_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    patient_id: Option<String>,
) -> Result<HarmonizerConfig, HarmonaCliError> {
    let mut config = match config_path {
        Some(path) => HarmonizerConfig::load(path)?,
        None => HarmonizerConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(path) = output {
        config.output_path = path;
    }
    if let Some(id) = patient_id {
        config.patient_id = id;
    }
    Ok(config)
}

fn cmd_export(
    config_path: Option<&std::path::Path>,
    data_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    patient_id: Option<String>,
    json: bool,
) -> Result<(), HarmonaCliError> {
    let config = resolve_config(config_path, data_dir, output, patient_id)?;
    let output_path = config.output_path.clone();

    let harmonizer = Harmonizer::new(config);
    let table = harmonizer.run();

    if output_path.to_string_lossy() == "-" {
        print!("{}", export::to_csv_string(&table.records)?);
    } else {
        export::write_csv_file(&table.records, &output_path)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&table.summary)?);
    } else {
        println!("Harmonization Summary");
        println!("=====================");
        println!("Records: {}", table.summary.record_count);
        match (table.summary.first_date, table.summary.last_date) {
            (Some(first), Some(last)) => println!("Date range: {first} to {last}"),
            _ => println!("Date range: (empty)"),
        }
        if let Some(quality) = table.summary.mean_quality_score {
            println!("Mean data quality: {quality:.1}%");
        }
        println!("\nSources:");
        for count in &table.summary.source_days {
            println!("  {:<10} {} days", count.source, count.days);
        }
    }

    Ok(())
}

fn cmd_schema(json: bool) -> Result<(), HarmonaCliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(&export::UNIFIED_COLUMNS)?);
    } else {
        println!("Unified Schema ({} columns)", export::UNIFIED_COLUMNS.len());
        println!();
        for column in export::UNIFIED_COLUMNS {
            println!("  {column}");
        }
    }
    Ok(())
}

fn cmd_doctor(
    config_path: Option<&std::path::Path>,
    data_dir: Option<PathBuf>,
    json: bool,
) -> Result<(), HarmonaCliError> {
    let config = resolve_config(config_path, data_dir, None, None)?;
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{PRODUCER_NAME} {HARMONA_VERSION}"),
    });

    checks.push(check_source(&WhoopAdapter, &config));
    checks.push(check_source(&StarfitAdapter, &config));
    checks.push(check_source(&ElitehrvAdapter, &config));
    checks.push(check_source(&DexcomAdapter, &config));
    checks.push(check_source(&PisonAdapter, &config));

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: HARMONA_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Harmona Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(HarmonaCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

/// Probe one source export: missing files warn (the pipeline degrades
/// them), schema problems are errors.
fn check_source<A: SourceAdapter>(adapter: &A, config: &HarmonizerConfig) -> DoctorCheck {
    let path = config.data_dir.join(A::EXPORT_PATH);
    let name = A::SOURCE.to_string();

    if !path.exists() {
        return DoctorCheck {
            name,
            status: CheckStatus::Warning,
            message: format!("export not found at {}", path.display()),
        };
    }

    match adapter.load(&path) {
        Ok(days) => DoctorCheck {
            name,
            status: CheckStatus::Ok,
            message: format!("{} days of data", days.len()),
        },
        Err(err) => DoctorCheck {
            name,
            status: CheckStatus::Error,
            message: err.to_string(),
        },
    }
}

// Error types

#[derive(Debug)]
enum HarmonaCliError {
    Io(io::Error),
    Harmonize(HarmonizeError),
    Json(serde_json::Error),
    DoctorFailed,
}

impl From<io::Error> for HarmonaCliError {
    fn from(e: io::Error) -> Self {
        HarmonaCliError::Io(e)
    }
}

impl From<HarmonizeError> for HarmonaCliError {
    fn from(e: HarmonizeError) -> Self {
        HarmonaCliError::Harmonize(e)
    }
}

impl From<serde_json::Error> for HarmonaCliError {
    fn from(e: serde_json::Error) -> Self {
        HarmonaCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HarmonaCliError> for CliError {
    fn from(e: HarmonaCliError) -> Self {
        match e {
            HarmonaCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HarmonaCliError::Harmonize(e) => CliError {
                code: "HARMONIZE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'harmona doctor' to probe the source exports".to_string()),
            },
            HarmonaCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            HarmonaCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
