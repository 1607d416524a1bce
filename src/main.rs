// Entry point for the image-reducer command-line tool.
// The lib.rs file is the public API; this binary drives one session end to end.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use image_reducer_lib::{
    ImageCodec, OutputFormat, ReducerConfig, Session, SizeUnit, TargetSize, compress, open_image,
    save_result,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitArg {
    Kb,
    Mb,
}

impl From<UnitArg> for SizeUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Kb => SizeUnit::Kb,
            UnitArg::Mb => SizeUnit::Mb,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Jpeg,
    Png,
    Webp,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Webp => OutputFormat::Webp,
        }
    }
}

/// Reduce a JPEG, PNG or WebP image to a target file size.
#[derive(Debug, Parser)]
#[command(name = "image-reducer", version, about)]
struct Cli {
    /// Image to reduce (.jpg, .jpeg, .png or .webp)
    input: PathBuf,

    /// Target size, a positive whole number in --unit
    #[arg(short, long)]
    size: String,

    /// Unit of --size
    #[arg(short, long, value_enum, default_value = "kb")]
    unit: UnitArg,

    /// Output format; defaults to the input's format
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Output file or directory; defaults to compressed.<ext> in the current directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON config file overriding search settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log search rounds
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_ansi(true)          // Keep colored output
        .with_writer(std::io::stderr)
        .compact()                // Use compact formatter instead of pretty
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => ReducerConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ReducerConfig::default(),
    };
    debug!("Using {:?}", config);

    let encoder = Arc::new(ImageCodec::new(&config));
    let mut session = Session::new(config);

    open_image(&mut session, &cli.input)
        .await
        .with_context(|| format!("opening {}", cli.input.display()))?;

    if let Some(format) = cli.format {
        session.set_output_format(format.into())?;
    }

    let target = TargetSize::new(cli.size.clone(), cli.unit.into());
    let report = compress(&mut session, encoder, &target).await?;

    let destination = cli.output.clone().unwrap_or_else(|| PathBuf::from(&report.filename));
    let written = save_result(&session, &destination).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Original size:   {}", report.original_size_text);
        println!("Compressed size: {}", report.compressed_size_text);
        println!("Savings:         {}", report.savings_text);
        for advisory in &report.advisories {
            println!("Note: {advisory}");
        }
        println!("Saved to {}", written.display());
    }

    session.start_over()?;
    info!("Done");
    Ok(())
}
