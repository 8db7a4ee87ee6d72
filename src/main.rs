use anyhow::Result;
use clap::Parser;
use rcs2git::cli::Args;
use rcs2git::config::Config;
use rcs2git::error::ExportError;
use rcs2git::export;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // stdout carries the import stream; all diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::new()?,
    };
    args.apply_to(&mut config);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match export::run(&args.paths, &config, &mut out) {
        Ok(report) => {
            out.flush()?;
            tracing::info!(
                "Exported {} commits and {} tags from {} RCS files ({} revisions)",
                report.commits,
                report.tags,
                report.files,
                report.revisions
            );
            if report.degraded_timestamps > 0 {
                tracing::warn!(
                    "{} revision(s) had unparsable dates and were stamped with the current time",
                    report.degraded_timestamps
                );
            }
            if report.missing_content > 0 {
                tracing::warn!(
                    "{} revision(s) had unavailable content and were emitted empty",
                    report.missing_content
                );
            }
            Ok(())
        }
        Err(ExportError::NoWorkFound) => {
            tracing::error!("No RCS histories found");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
