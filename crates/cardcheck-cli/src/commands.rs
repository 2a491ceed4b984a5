use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cardcheck")]
#[command(
    about = "Verify that every media file on an SD card exists intact on one or more backup drives",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the verification (default when no subcommand is given)
    Check {
        /// Volume label to use as the source card, skipping the prompt
        #[arg(long)]
        source: Option<String>,

        /// Volume label to use as a backup drive, repeatable, skipping the prompt
        #[arg(long = "backup")]
        backups: Vec<String>,
    },
    /// List mounted volumes eligible for checking
    ListVolumes,
    /// Print configuration values
    PrintConfig,
}
