use std::{
    fs::File,
    io::{BufReader, BufWriter, stderr},
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompresses an LZFSE stream
    Decompress(DecompressArgs),
}

#[derive(Args)]
struct DecompressArgs {
    /// Input file to decompress
    input: PathBuf,

    /// Output file, defaults to the input without its extension
    output: Option<PathBuf>,

    /// History window, as a power of two
    #[arg(long, default_value_t = lzfse_decompress::DEFAULT_WINDOW_LOG)]
    window_log: u8,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let file_appender = tracing_appender::rolling::never("target", "dump.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .without_time()
        .with_level(false);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(stderr)
        .with_ansi(true)
        .without_time()
        .with_level(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(file_layer)
        .with(stderr_layer)
        .init();

    match cli.command {
        Commands::Decompress(args) => {
            let output_path = match args.output {
                Some(it) => it,
                None => args
                    .input
                    .file_stem()
                    .filter(|stem| args.input.extension().is_some() && !stem.is_empty())
                    .ok_or_else(|| {
                        miette::miette!(
                            help = "Pass the output path explicitly.",
                            "Cannot derive an output name from {}",
                            args.input.display()
                        )
                    })?
                    .into(),
            };

            let input_file = File::open(&args.input).into_diagnostic()?;
            let reader = BufReader::new(input_file);

            let mut decoder =
                lzfse_decompress::Decoder::with_window_log(reader, args.window_log)?;

            let output_file = File::create(&output_path).into_diagnostic()?;
            let mut writer = BufWriter::new(output_file);

            let n_bytes = decoder.decode(&mut writer)?;
            tracing::info!("wrote {n_bytes} bytes to {}", output_path.display());
        }
    }
    Ok(())
}
