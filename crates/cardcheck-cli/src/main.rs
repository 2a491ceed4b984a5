mod commands;
mod logging;
mod progress;
mod select;

use std::path::Path;
use std::process;

use cardcheck_core::{AppConfig, CheckEngine, CheckReport, Volume};
use clap::Parser;
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match cardcheck_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Check { source, backups }) => {
            if let Err(err) = run_check(&config, source, backups) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::ListVolumes) => {
            let volumes = discover_volumes(&config)?;
            for volume in &volumes {
                println!("{} ({})", volume.label, volume.root.display());
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        None => {
            // Checking is the whole point of the tool, so bare `cardcheck`
            // runs it rather than printing help.
            if let Err(err) = run_check(&config, None, Vec::new()) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
    }

    Ok(())
}

fn run_check(
    config: &AppConfig,
    source_label: Option<String>,
    backup_labels: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let volumes = discover_volumes(config)?;
    if volumes.is_empty() {
        return Err(format!("No volumes found under {}", config.volumes_dir).into());
    }

    let source = match source_label {
        Some(label) => find_volume(&volumes, &label)?,
        None => select::pick_source(&volumes)?,
    };

    let backups = if backup_labels.is_empty() {
        select::pick_backups(&volumes, &source)?
    } else {
        resolve_backup_labels(&volumes, &source, &backup_labels)?
    };

    info!(
        "Source: {} — backups: {}",
        source.label,
        backups
            .iter()
            .map(|v| v.label.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    );

    let engine = CheckEngine::new(config.clone());
    let reporter = CliReporter::new();
    let report = engine.check(&source, &backups, &reporter)?;

    print_report(&report);

    if !report.is_clean() {
        process::exit(1);
    }
    Ok(())
}

fn discover_volumes(config: &AppConfig) -> Result<Vec<Volume>, Box<dyn std::error::Error>> {
    let volumes =
        cardcheck_core::volumes::list_volumes(Path::new(&config.volumes_dir), &config.ignore_volumes)?;
    Ok(volumes)
}

/// Resolve explicit `--backup` labels. The source volume cannot double as a
/// backup — a card would trivially "verify" against itself — and repeated
/// labels collapse to one.
fn resolve_backup_labels(
    volumes: &[Volume],
    source: &Volume,
    labels: &[String],
) -> Result<Vec<Volume>, Box<dyn std::error::Error>> {
    let mut backups: Vec<Volume> = Vec::new();
    for label in labels {
        let volume = find_volume(volumes, label)?;
        if volume.root == source.root {
            return Err(format!(
                "Backup volume '{}' is the same as the source volume",
                label
            )
            .into());
        }
        if !backups.contains(&volume) {
            backups.push(volume);
        }
    }
    Ok(backups)
}

fn find_volume(volumes: &[Volume], label: &str) -> Result<Volume, Box<dyn std::error::Error>> {
    volumes
        .iter()
        .find(|v| v.label == label)
        .cloned()
        .ok_or_else(|| format!("No mounted volume labelled '{}'", label).into())
}

fn print_report(report: &CheckReport) {
    println!();
    println!(
        "Checked {} media files from {} — {} verified, {} missing, {} corrupted, {} unreadable",
        report.files_checked,
        report.source_label,
        format!("{}", report.verified).green(),
        format!("{}", report.missing.len()).red(),
        format!("{}", report.corrupted.len()).red(),
        format!("{}", report.unreadable.len()).yellow(),
    );

    if report.is_clean() {
        println!(
            "{}",
            "Every file on the card is safely backed up.".green()
        );
        return;
    }

    if !report.missing.is_empty() {
        println!("{}", "Missing from every backup:".red().bold());
        for record in &report.missing {
            println!("  {} ({})", record.display_name, record.location.display());
        }
    }

    if !report.corrupted.is_empty() {
        println!("{}", "Present but corrupted — recheck the copy:".red().bold());
        for record in &report.corrupted {
            println!("  {} ({})", record.display_name, record.location.display());
        }
    }

    if !report.unreadable.is_empty() {
        println!("{}", "Unreadable on the card — could not verify:".yellow().bold());
        for file in &report.unreadable {
            println!("  {} ({})", file.location.display(), file.reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn vol(label: &str) -> Volume {
        Volume {
            label: label.to_string(),
            root: PathBuf::from(format!("/Volumes/{}", label)),
        }
    }

    #[test]
    fn test_backup_label_matching_source_is_rejected() {
        let volumes = vec![vol("SD_CARD"), vol("Backup")];
        let source = vol("SD_CARD");

        let result =
            resolve_backup_labels(&volumes, &source, &["SD_CARD".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_backup_labels_collapse_to_one() {
        let volumes = vec![vol("SD_CARD"), vol("Backup")];
        let source = vol("SD_CARD");

        let backups = resolve_backup_labels(
            &volumes,
            &source,
            &["Backup".to_string(), "Backup".to_string()],
        )
        .unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].label, "Backup");
    }

    #[test]
    fn test_unknown_backup_label_is_rejected() {
        let volumes = vec![vol("SD_CARD"), vol("Backup")];
        let source = vol("SD_CARD");

        let result =
            resolve_backup_labels(&volumes, &source, &["NoSuchDrive".to_string()]);
        assert!(result.is_err());
    }
}
