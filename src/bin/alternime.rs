//! Command-line front end: convert a prepared workflow graph JSON into a
//! project archive.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alternime::expr::{ChatFallback, FallbackConfig, FormulaCompiler};
use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "alternime", version, about = "Convert Alteryx workflow graphs into KNIME projects")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a workflow graph JSON file into a .knwf archive.
    Convert(ConvertArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Workflow graph JSON produced by the extraction step.
    input: PathBuf,

    /// Output archive path.
    #[arg(short, long, default_value = "skeleton.knwf")]
    output: PathBuf,

    #[command(flatten)]
    fallback: FallbackArgs,
}

#[derive(Args)]
struct FallbackArgs {
    /// Chat endpoint used when a formula cannot be converted deterministically.
    #[arg(long = "fallback-url", env = "ALTERNIME_FALLBACK_URL", default_value = alternime::expr::fallback::DEFAULT_ENDPOINT)]
    url: String,

    /// Model requested from the fallback endpoint.
    #[arg(long = "fallback-model", env = "ALTERNIME_FALLBACK_MODEL", default_value = alternime::expr::fallback::DEFAULT_MODEL)]
    model: String,

    /// Fallback request timeout in seconds (0 uses the default).
    #[arg(long = "fallback-timeout", env = "ALTERNIME_FALLBACK_TIMEOUT", default_value_t = 30)]
    timeout_secs: u64,

    /// Never call the fallback service; unconvertible formulas become placeholders.
    #[arg(long)]
    no_fallback: bool,
}

impl FallbackArgs {
    fn compiler(&self) -> anyhow::Result<FormulaCompiler> {
        if self.no_fallback {
            return Ok(FormulaCompiler::offline());
        }
        let config = FallbackConfig::default()
            .with_endpoint(self.url.as_str())
            .with_model(self.model.as_str())
            .with_timeout(Duration::from_secs(self.timeout_secs));
        let client = ChatFallback::new(config).context("Failed to create fallback client")?;
        Ok(FormulaCompiler::new(Arc::new(client)))
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {e}"))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    Ok(())
}

fn convert(args: &ConvertArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let compiler = args.fallback.compiler()?;

    let archive = match alternime::convert_json(&json, &compiler) {
        Ok(archive) => archive,
        Err(errors) => {
            for error in &errors {
                tracing::error!(target: "alternime::cli", "{error}");
            }
            bail!("Conversion failed with {} error(s)", errors.len());
        }
    };

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut writer = archive
        .write_zip(BufWriter::new(file))
        .context("Failed to write archive")?;
    writer.flush().context("Failed to flush archive")?;

    tracing::info!(
        target: "alternime::cli",
        output = %args.output.display(),
        files = archive.files.len(),
        "Archive written"
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    match &cli.command {
        Command::Convert(args) => convert(args),
    }
}
