use chrono::Utc;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, Level};

use crate::cli::args::{Cli, Commands};
use crate::error::{ProcessingError, Result};
use crate::processors::{DerivationPipeline, IntegrityChecker, Ingestor, SiteProcessor};
use crate::readers::StoreReader;
use crate::settings::Settings;
use crate::writers::DerivedWriter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let settings = Settings::load(cli.config.as_deref())?;
    info!(
        input_dir = %settings.input_dir.display(),
        output_dir = %settings.output_dir.display(),
        "Settings loaded"
    );

    match cli.command {
        Commands::Run { site } => {
            let sites = Commands::sites(site);
            let processor = SiteProcessor::new(settings)?;
            let outcomes = processor.process_all(&sites, Utc::now()).await;

            let mut failed = 0;
            for (site, outcome) in &outcomes {
                match outcome {
                    Ok(report) => {
                        println!("\n{}", report.window.summary());
                        println!(
                            "Added {} rows, store holds {}",
                            report.ingest.merge.added_rows(),
                            report.ingest.merge.total_rows
                        );
                        println!("Derived data: {}", report.derived_path.display());
                        if let Some(published) = &report.published {
                            println!("Product metadata: {}", published.run_file.display());
                        }
                    }
                    Err(e) => {
                        failed += 1;
                        println!("\n{} failed: {}", site, e);
                    }
                }
            }

            if failed > 0 {
                return Err(ProcessingError::SitesFailed {
                    failed,
                    total: outcomes.len(),
                });
            }
        }

        Commands::Ingest { site, file } => {
            println!("Ingesting {} into {} store", file.display(), site);

            let raw = std::fs::read_to_string(&file)?;
            let report = Ingestor::new(&settings).ingest(site, &raw)?;

            println!(
                "Parsed {} of {} rows ({} malformed)",
                report.parse.parsed_rows, report.parse.data_rows, report.parse.dropped_rows
            );
            println!(
                "Added {} rows, {} duplicates, store holds {}",
                report.merge.added_rows(),
                report.merge.duplicate_rows,
                report.merge.total_rows
            );
        }

        Commands::Derive {
            site,
            output,
            no_export,
        } => {
            let window = DerivationPipeline::new(&settings).derive_window(site, Utc::now())?;
            println!("{}", window.summary());

            if !no_export {
                let path = output.unwrap_or_else(|| settings.derived_path(site));
                DerivedWriter::new().write(&window, &path)?;
                println!("Derived data written to {}", path.display());
            }
        }

        Commands::Validate { site } => {
            let checker = IntegrityChecker::new();
            let reader = StoreReader::new();
            let mut issues = 0;

            for site in Commands::sites(site) {
                let path = settings.store_path(site);
                let Some(table) = reader.read(&path)? else {
                    println!("No store for {} at {}", site, path.display());
                    continue;
                };

                let report = checker.check(site, &table)?;
                println!("\n{}", checker.generate_summary(&report));
                issues += report.violations.len();
            }

            if issues == 0 {
                println!("✅ All stores passed validation checks");
            } else {
                println!("⚠️  Found {} validation issues", issues);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    // Ignore a second initialisation, e.g. when called from tests
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }

    Ok(())
}
