//! Duration helpers: the same parsing the order form uses.

use clap::Subcommand;
use orderboard_core::duration::{adjust_duration, format_duration, parse_duration};
use serde_json::json;

use super::CliResult;

#[derive(Subcommand)]
pub enum DurationAction {
    /// Parse "1.5" or "1:30" and print it in both notations
    Parse {
        /// Duration text
        value: String,
    },
    /// Add hours to a duration, keeping its notation
    Adjust {
        /// Duration text
        value: String,
        /// Hours to add (negative to subtract)
        #[arg(long, allow_hyphen_values = true)]
        hours: f64,
    },
}

pub fn run(action: DurationAction) -> CliResult {
    match action {
        DurationAction::Parse { value } => {
            let minutes = parse_duration(&value)?;
            let out = json!({
                "minutes": minutes,
                "hours": format_duration(minutes, false),
                "clock": format_duration(minutes, true),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        DurationAction::Adjust { value, hours } => {
            println!("{}", adjust_duration(&value, hours)?);
        }
    }
    Ok(())
}
