//! xlreport CLI - build a configured xlsx report

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use xlreport::ExcelReport;

#[derive(Parser)]
#[command(name = "xlreport")]
#[command(author, version, about = "Build a styled xlsx report from a YAML config")]
struct Cli {
    /// YAML report configuration
    config: PathBuf,

    /// Output directory; repeat for several (overrides `output.dir`)
    #[arg(short, long = "output-dir", value_name = "DIR")]
    output_dir: Vec<PathBuf>,

    /// Output file base name (overrides `output.name`)
    #[arg(short, long)]
    name: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(n_verbose: u8) {
    let c_level = match n_verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "xlreport={c_level},xlreport_io_fs={c_level},xlreport_io_xlsx={c_level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<bool> {
    let report = ExcelReport::from_file(&cli.config)
        .with_context(|| format!("Failed to build report from {}", cli.config.display()))?;

    for c_warning in report.warnings() {
        eprintln!("warning: {c_warning}");
    }

    let l_dirs = if cli.output_dir.is_empty() {
        report.config().output.dir.to_vec()
    } else {
        cli.output_dir.clone()
    };
    let c_file_name = match &cli.name {
        Some(c_name) => {
            let mut output = report.config().output.clone();
            output.name = c_name.clone();
            output.derive_file_name(&report.time_stamp())
        }
        None => report.file_name(),
    };

    let report_write = report.serialize_to(&l_dirs, &c_file_name);
    for err in &report_write.errors {
        eprintln!("error: {}: {}", err.path.display(), err.exception);
    }
    println!("{report_write}");
    Ok(report_write.is_success())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
