use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::Site;

#[derive(Parser)]
#[command(name = "mesoplot")]
#[command(about = "Mesonet feed ingestion and chart data processor")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Config file [default: mesoplot.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, ingest, derive and publish for every site (or one)
    Run {
        #[arg(short, long, help = "Only process this site (Farm or Gardens)")]
        site: Option<Site>,
    },

    /// Merge a saved feed file into a site store without touching the network
    Ingest {
        #[arg(short, long)]
        site: Site,

        #[arg(short, long, help = "Feed text file in TOA5 format")]
        file: PathBuf,
    },

    /// Summarise the current window and optionally export it
    Derive {
        #[arg(short, long)]
        site: Site,

        #[arg(
            short,
            long,
            help = "Derived CSV path [default: <output_dir>/<Site>_derived.csv]"
        )]
        output: Option<PathBuf>,

        #[arg(long, default_value = "false", help = "Print the summary only")]
        no_export: bool,
    },

    /// Check stored tables for duplicates, ordering and implausible values
    Validate {
        #[arg(short, long)]
        site: Option<Site>,
    },
}

impl Commands {
    pub fn sites(site: Option<Site>) -> Vec<Site> {
        match site {
            Some(site) => vec![site],
            None => Site::ALL.to_vec(),
        }
    }
}
