//! `postbox` - deliver one HTML email over SMTP.
//!
//! Connection settings come from `SMTP_*` environment variables; the
//! outcome is printed to stdout as `{"ok": bool, "error": string}`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use postbox_smtp::{HtmlMessage, SmtpTransport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status for a message the server did not accept.
const EXIT_DELIVERY_FAILED: u8 = 1;

/// Exit status for bad arguments or configuration.
const EXIT_USAGE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "postbox", version)]
#[command(about = "Deliver one HTML email using SMTP_* environment settings", long_about = None)]
struct Args {
    /// Recipient address
    recipient: String,

    /// Subject line
    subject: String,

    /// HTML body file, or `-` for stdin
    #[arg(value_name = "HTML_FILE")]
    body: PathBuf,

    /// Optional Reply-To address
    reply_to: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "postbox=info,postbox_smtp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let (transport, message) = match prepare(&args) {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("postbox: {e:#}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let result = transport.send(&message).await;
    match serde_json::to_string(&result) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "could not encode result"),
    }

    if result.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_DELIVERY_FAILED)
    }
}

fn prepare(args: &Args) -> Result<(SmtpTransport, HtmlMessage)> {
    let config = config::from_env()?;
    let body = read_body(&args.body)?;

    let mut message = HtmlMessage::new(&args.recipient, &args.subject, body)?;
    if let Some(reply_to) = &args.reply_to {
        message = message.with_reply_to(reply_to);
    }

    Ok((SmtpTransport::new(config), message))
}

fn read_body(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("failed to read body from stdin")?;
        return Ok(body);
    }

    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
