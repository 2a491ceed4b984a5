use cardcheck_core::Volume;
use colored::*;
use std::io::{self, Write};

/// Numbered stdin prompt: pick exactly one volume as the source card.
pub fn pick_source(volumes: &[Volume]) -> io::Result<Volume> {
    println!("Which is your SD card?");
    print_numbered(volumes);

    loop {
        let input = read_line("Source")?;
        match parse_choice(&input, volumes.len()) {
            Some(index) => return Ok(volumes[index].clone()),
            None => println!("Please enter a number between 1 and {}.", volumes.len()),
        }
    }
}

/// Numbered stdin prompt: pick one or more of the remaining volumes as
/// backups, comma separated. Re-prompts until at least one is chosen.
pub fn pick_backups(volumes: &[Volume], source: &Volume) -> io::Result<Vec<Volume>> {
    let candidates: Vec<Volume> = volumes
        .iter()
        .filter(|v| v.root != source.root)
        .cloned()
        .collect();

    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    println!(
        "Which are your backup drives? {}",
        "(comma-separated, e.g. 1,3)".dimmed()
    );
    print_numbered(&candidates);

    loop {
        let input = read_line("Backups")?;
        let mut picked = Vec::new();
        let mut valid = true;

        for part in input.split(',') {
            match parse_choice(part, candidates.len()) {
                Some(index) => {
                    let volume = &candidates[index];
                    if !picked.contains(volume) {
                        picked.push(volume.clone());
                    }
                }
                None => {
                    valid = false;
                    break;
                }
            }
        }

        if valid && !picked.is_empty() {
            return Ok(picked);
        }
        println!("Please select at least one backup drive by number.");
    }
}

fn print_numbered(volumes: &[Volume]) {
    for (i, volume) in volumes.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, volume.label, volume.root.display());
    }
}

fn read_line(prompt: &str) -> io::Result<String> {
    print!("{}: ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn parse_choice(input: &str, len: usize) -> Option<usize> {
    let number: usize = input.trim().parse().ok()?;
    if (1..=len).contains(&number) {
        Some(number - 1)
    } else {
        None
    }
}
