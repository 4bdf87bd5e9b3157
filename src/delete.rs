//! `stress delete`: confirm, then permanently remove one entry.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::service::StressLog;

/// Ask a yes/no question; anything but `y`/`yes` (any case) means no.
pub fn confirm(input: &mut impl BufRead, output: &mut impl Write, prompt: &str) -> Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// CLI entry point. Returns whether the entry was deleted.
pub async fn run_delete(log: &StressLog, id: &str, assume_yes: bool) -> Result<bool> {
    if !assume_yes {
        let stdin = std::io::stdin();
        let mut stderr = std::io::stderr();
        let prompt = format!("Delete entry {}?", id);
        if !confirm(&mut stdin.lock(), &mut stderr, &prompt)? {
            println!("Cancelled.");
            return Ok(false);
        }
    }

    log.delete_log(id).await?;
    println!("Deleted {}", id);
    Ok(true)
}
