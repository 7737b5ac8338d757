use anyhow::Context;
use clap::Parser;
use snort2ndjson::config::Settings;
use snort2ndjson::convert::Converter;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "snort2ndjson")]
#[command(version = "0.1.0")]
#[command(about = "Convert Snort/Suricata rule files to newline-delimited JSON", long_about = None)]
struct Cli {
    /// Rules file to convert
    input: PathBuf,

    /// Output file (defaults to the input name with an .ndjson extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Omit the raw rule text from each record
    #[arg(long)]
    no_raw: bool,

    /// Only emit the rule with this SID
    #[arg(long, value_name = "SID")]
    sid: Option<String>,

    /// Verbose logging (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress most output)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(&cli)?;
    init_logging(&cli, &settings);

    info!("Starting snort2ndjson v{}", env!("CARGO_PKG_VERSION"));

    let converter = Converter::new(settings);
    let stats = converter
        .convert_file(&cli.input, cli.output.as_deref())
        .with_context(|| format!("Failed to convert {}", cli.input.display()))?;

    info!("Successfully processed {} rules", stats.processed);
    if stats.errors > 0 {
        info!(
            "Processed {} rules successfully, {} errors",
            stats.processed, stats.errors
        );
    }
    if stats.filtered > 0 {
        info!("Suppressed {} rules via SID filter", stats.filtered);
    }

    Ok(())
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = if let Some(config_path) = &cli.config {
        Settings::from_file(config_path).context("Failed to load configuration file")?
    } else {
        Settings::default()
    };

    // CLI flags override file settings.
    if cli.pretty {
        settings.pretty = true;
    }
    if cli.no_raw {
        settings.include_raw = false;
    }
    if cli.sid.is_some() {
        settings.sid_filter = cli.sid.clone();
    }

    settings.validate().context("Invalid configuration")?;
    Ok(settings)
}

fn init_logging(cli: &Cli, settings: &Settings) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => settings.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    // RUST_LOG takes precedence when explicitly set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("snort2ndjson={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
