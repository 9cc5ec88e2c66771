//! wa-export - export a bounded time window of chat history.
//!
//! Pages each chat's history backward through the messaging transport until
//! the requested window is covered, then writes the in-window messages to a
//! JSONL file or a human-readable report. The bundled transport reads a
//! captured snapshot file; a live session plugs in behind the same trait.

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::Exporter;
use cli::{build_window, Cli, Commands};
use domain::{ExportError, ExportSummary, ExtractionRequest, OutputFormat, Scope};
use infrastructure::{ensure_config_exists, load_config, ReplayTransport, SessionEvent, SessionGate};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> domain::Result<()> {
    ensure_config_exists()?;
    let mut config = load_config()?;

    let gate = Arc::new(SessionGate::new());
    let transport = Arc::new(ReplayTransport::open(&cli.snapshot)?);
    // A snapshot needs no pairing; it is ready the moment it parses.
    gate.apply(SessionEvent::Ready);

    match cli.command {
        Commands::Status => {
            let exporter = Exporter::new(gate, transport, config);
            cmd_status(&exporter);
        }
        Commands::Chats => {
            let exporter = Exporter::new(gate, transport, config);
            cmd_chats(&exporter).await?;
        }
        Commands::Export {
            date,
            from,
            to,
            chat,
            format,
            out_dir,
        } => {
            if let Some(dir) = out_dir {
                config.output.dir = dir;
            }
            let exporter = Exporter::new(gate, transport, config);
            cmd_export(&exporter, &date, &from, &to, chat, &format).await?;
        }
    }

    Ok(())
}

/// Session status command.
fn cmd_status(exporter: &Exporter) {
    let status = exporter.status();
    if status.ready {
        println!("{} session ready", "✓".green().bold());
    } else {
        println!("{} session not ready", "✗".red().bold());
    }
}

/// List chats command.
async fn cmd_chats(exporter: &Exporter) -> domain::Result<()> {
    let chats = exporter.list_chats().await?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Name", "Group"]);

    for chat in &chats {
        table.add_row(vec![
            chat.id.as_str(),
            chat.name.as_deref().unwrap_or("N/A"),
            if chat.is_group { "yes" } else { "no" },
        ]);
    }

    println!("{table}");
    println!("Total: {} chat(s)", chats.len());

    Ok(())
}

/// Export command: build the request, run it, report the summary.
async fn cmd_export(
    exporter: &Exporter,
    date: &str,
    from: &str,
    to: &str,
    chat: Option<String>,
    format: &str,
) -> domain::Result<()> {
    let (window_start, window_end) =
        build_window(date, from, to).map_err(ExportError::invalid_request)?;

    let format: OutputFormat = format
        .parse()
        .map_err(|e: String| ExportError::Config { message: e })?;

    let scope = chat.map_or(Scope::AllChats, Scope::SingleChat);

    let request = ExtractionRequest {
        scope,
        window_start,
        window_end,
        format,
    };

    let summary = exporter.extract(request).await?;
    print_summary(&summary);

    Ok(())
}

/// Prints the per-chat counts and the output location.
fn print_summary(summary: &ExportSummary) {
    for chat in &summary.chats {
        let mark = if chat.truncated {
            "⚠".yellow()
        } else {
            "✓".green()
        };
        let note = if chat.truncated {
            " (incomplete: fetch aborted)"
        } else {
            ""
        };
        println!(
            "{} {} — {} message(s){}",
            mark,
            chat.title.cyan(),
            chat.written,
            note
        );
    }

    println!(
        "\n{} Exported {} message(s) from {} chat(s) to {}",
        "✓".green().bold(),
        summary.total_written(),
        summary.chats.len(),
        summary.output_file.display()
    );
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
