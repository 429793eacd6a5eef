use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use log::{error, info, LevelFilter};

use rut_scraper_lib::host::chrome::{BrowserSource, ChromeHost};
use rut_scraper_lib::resume_manager::{Checkpoint, ProgressState};
use rut_scraper_lib::{input_loader, logger, HostContract, Pipeline, Settings};

/// Search every RUT in INPUT on the Oficina Judicial Virtual and export the
/// last year's results to one spreadsheet.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Newline-delimited RUTs (.csv/.txt) or a workbook (.xlsx/.xls).
    input: PathBuf,

    /// Output file (.xlsx or .csv). Defaults to a timestamped workbook.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// DevTools websocket URL of a logged-in Chrome to drive.
    #[arg(long)]
    connect: Option<String>,

    /// Launch the browser without a window (ignored with --connect).
    #[arg(long)]
    headless: bool,

    /// JSON host contract overriding element ids and link texts.
    #[arg(long)]
    contract: Option<PathBuf>,

    /// JSON settings (delays, readiness, output naming, checkpoint).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Continue from the checkpoint of an interrupted run.
    #[arg(long)]
    resume: bool,

    /// Do not write a checkpoint after each RUT.
    #[arg(long)]
    no_checkpoint: bool,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info });

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    info!("Starting RUT scraper v{}", env!("CARGO_PKG_VERSION"));

    let contract = match &cli.contract {
        Some(path) => HostContract::load(path)?,
        None => HostContract::default(),
    };
    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if cli.no_checkpoint {
        settings.checkpoint_path = None;
    }

    // 1. Load RUTs before touching the browser
    let queue = input_loader::load_identifiers(&cli.input)?;

    // 2. Previous progress
    let progress = match (&settings.checkpoint_path, cli.resume) {
        (Some(path), true) => Checkpoint::new(path).load()?,
        (None, true) => {
            return Err("--resume needs a checkpoint path (remove --no-checkpoint)".into());
        }
        _ => ProgressState::default(),
    };

    // 3. Host session
    let source = match cli.connect {
        Some(ws) => BrowserSource::Connect(ws),
        None => BrowserSource::Launch { headless: cli.headless },
    };
    let host = ChromeHost::open(source)?;
    host.ensure_on_host(&contract.expected_host, &contract.start_url)?;

    // 4. Search, filter, accumulate
    let pipeline = Pipeline::new(&host, &contract, &settings);
    let report = pipeline.run(&queue, progress, Local::now().date_naive())?;

    // 5. Export once
    let output = cli.output.unwrap_or_else(|| settings.output_path());
    pipeline.export(&report, &output)?;

    println!(
        "Searched {} RUTs ({} skipped), read {} pages, exported {} rows to {}",
        report.searched,
        report.skipped,
        report.pages_read,
        report.dataset.len(),
        output.display()
    );
    if !report.warnings.is_empty() {
        println!("{} warning(s):", report.warnings.len());
        for warning in &report.warnings {
            println!("  ⚠ {}", warning);
        }
    }
    Ok(())
}
