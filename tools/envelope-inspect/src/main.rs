use clap::{Parser, Subcommand};
use envelope_inspect::commands;
use envelope_inspect::config::{Config, LogFormat};
use event_envelope::Codecs;
use std::io::{self, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "envelope-inspect")]
#[command(about = "Inspect wire-form event envelopes", long_about = None)]
struct Cli {
    /// Content types offered to codec negotiation (overrides ENVELOPE_ACCEPT)
    #[arg(long, value_delimiter = ',', global = true)]
    accept: Option<Vec<String>>,

    /// Log output format: pretty or json (overrides LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check the envelope structure
    Validate {
        /// Envelope file, or - for stdin
        input: String,
    },
    /// Print envelope metadata
    Show { input: String },
    /// Print the payload materialized through the codecs, keys sorted
    Payload { input: String },
    /// Write the payload encoded with the negotiated content type to stdout
    Encode { input: String },
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout carries command output
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = Config::from_env()?.with_overrides(cli.accept, cli.log_format);

    init_tracing(cfg.log_format);

    let codecs = Codecs::json();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Validate { input } => {
            let wire = commands::read_wire(&input)?;
            commands::validate(&wire)?;
            writeln!(out, "ok")?;
        }
        Command::Show { input } => {
            let envelope = commands::decode(commands::read_wire(&input)?)?;
            commands::show(&envelope, &mut out)?;
        }
        Command::Payload { input } => {
            let envelope = commands::decode(commands::read_wire(&input)?)?;
            commands::payload(envelope, codecs, &mut out)?;
        }
        Command::Encode { input } => {
            let envelope = commands::decode(commands::read_wire(&input)?)?;
            commands::encode(&envelope, &codecs, &cfg.accept_refs(), &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
