//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};

/// wa-export - export a time window of chat history to JSONL or a text report.
#[derive(Parser, Debug)]
#[command(name = "wa-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Chat history snapshot file to read from.
    #[arg(short, long, default_value = "snapshot.json")]
    pub snapshot: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show whether the session is ready.
    Status,

    /// List all exportable chats.
    Chats,

    /// Export messages from a day (or part of one) to a file.
    Export {
        /// Day to export, as YYYY-MM-DD.
        #[arg(short, long)]
        date: String,

        /// Window start time within the day (HH:MM or HH:MM:SS).
        #[arg(long, default_value = "00:00:00")]
        from: String,

        /// Window end time within the day, inclusive (HH:MM or HH:MM:SS).
        #[arg(long, default_value = "23:59:59")]
        to: String,

        /// Chat to export (all chats if not specified). Bare numbers get
        /// the individual-contact suffix appended.
        #[arg(short, long)]
        chat: Option<String>,

        /// Output format: jsonl or text.
        #[arg(short, long, default_value = "jsonl")]
        format: String,

        /// Output directory (overrides the configured one).
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

/// Builds the UTC window for a local-time day slice.
///
/// # Errors
/// Returns a message when the date or a time does not parse.
pub fn build_window(
    date: &str,
    from: &str,
    to: &str,
) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date {date:?} (want YYYY-MM-DD): {e}"))?;

    let start = day.and_time(parse_time(from)?);
    let end = day.and_time(parse_time(to)?);

    let to_utc = |naive| {
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(|| format!("{naive} does not exist in the local timezone"))
    };

    Ok((to_utc(start)?, to_utc(end)?))
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| format!("Invalid time {s:?} (want HH:MM or HH:MM:SS): {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_day_window() {
        let (start, end) = build_window("2025-10-02", "00:00:00", "23:59:59").unwrap();
        assert!(start < end);
        assert_eq!((end - start).num_seconds(), 86_399);
    }

    #[test]
    fn test_minute_granularity_times() {
        let (start, end) = build_window("2025-10-02", "09:30", "10:45").unwrap();
        assert_eq!((end - start).num_seconds(), 75 * 60);
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(build_window("02/10/2025", "00:00", "23:59").is_err());
    }

    #[test]
    fn test_bad_time_is_rejected() {
        assert!(build_window("2025-10-02", "9am", "23:59").is_err());
    }
}
