#![forbid(unused_must_use)]

//! Command-line front-end for [`e8z_core`]: `compress`/`decompress`
//! subcommands over arbitrary files, writing output to a temporary path and
//! renaming it into place only on success (spec.md §7: "no partial file").

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use e8z_core::{Mode, Options};

#[derive(clap::Parser)]
struct CommandWithFlags {
    /// Reduce logging to just warnings and errors.
    #[arg(long, short = 'q')]
    quiet: bool,

    /// Turn on debug-level logging.
    #[arg(long, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Compresses a file with the E8-lattice pipeline.
    Compress(CompressArgs),
    /// Decompresses a container produced by `compress`.
    Decompress(DecompressArgs),
}

#[derive(clap::Args)]
struct CompressArgs {
    /// Path to the input file.
    input: PathBuf,
    /// Path to write the compressed container to.
    output: PathBuf,

    /// Tokenizer mode.
    #[arg(long, value_enum, default_value_t = CliMode::Byte)]
    mode: CliMode,

    /// Horizon Batching frame size, in KiB.
    #[arg(long, default_value_t = e8z_core::frame::DEFAULT_FRAME_SIZE_KIB)]
    frame_size_kib: u32,

    /// Predictor context window length (0 disables prediction).
    #[arg(long, default_value_t = e8z_core::options::DEFAULT_PREDICTOR_CONTEXT)]
    predictor_context: u8,

    /// Skip computing and verifying the CRC32 integrity field.
    #[arg(long)]
    no_checksum: bool,
}

#[derive(clap::Args)]
struct DecompressArgs {
    /// Path to the compressed container.
    input: PathBuf,
    /// Path to write the decompressed output to.
    output: PathBuf,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum CliMode {
    Byte,
    Char,
    Word,
}

impl From<CliMode> for Mode {
    fn from(m: CliMode) -> Mode {
        match m {
            CliMode::Byte => Mode::Byte,
            CliMode::Char => Mode::Char,
            CliMode::Word => Mode::Word,
        }
    }
}

fn main() -> ExitCode {
    let args = CommandWithFlags::parse();
    configure_tracing(&args);

    let result = match &args.command {
        Command::Compress(a) => run_compress(a),
        Command::Decompress(a) => run_decompress(a),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("e8ztool: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// Errors surfaced at the CLI boundary: either a library error (which already
/// carries the documented exit code) or a bare I/O failure reading/writing a
/// file path, which also maps to the "I/O error" exit code.
#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Core(#[from] e8z_core::Error),
    #[error("{path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) => e.exit_code(),
            CliError::Io { .. } => 2,
        }
    }
}

fn run_compress(args: &CompressArgs) -> Result<(), CliError> {
    let input = read_file(&args.input)?;
    let options = Options {
        mode: args.mode.into(),
        frame_size_kib: args.frame_size_kib,
        predictor_context: args.predictor_context,
        self_learning: false,
        checksum: !args.no_checksum,
    };
    let compressed = e8z_core::compress(&input, &options)?;
    write_atomically(&args.output, &compressed)?;
    tracing::info!(
        input_bytes = input.len(),
        output_bytes = compressed.len(),
        "compressed {} -> {}",
        args.input.display(),
        args.output.display()
    );
    Ok(())
}

fn run_decompress(args: &DecompressArgs) -> Result<(), CliError> {
    let input = read_file(&args.input)?;
    let decompressed = e8z_core::decompress(&input)?;
    write_atomically(&args.output, &decompressed)?;
    tracing::info!(
        output_bytes = decompressed.len(),
        "decompressed {} -> {}",
        args.input.display(),
        args.output.display()
    );
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Io { path: path.to_path_buf(), source })
}

/// Writes `data` to a sibling temporary path and renames it over `path`, so a
/// crash or error midway never leaves a partial/corrupt file at `path`.
fn write_atomically(path: &Path, data: &[u8]) -> Result<(), CliError> {
    let tmp_path = path.with_extension("e8z-tmp");
    std::fs::write(&tmp_path, data).map_err(|source| CliError::Io { path: tmp_path.clone(), source })?;
    std::fs::rename(&tmp_path, path).map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
    Ok(())
}

fn configure_tracing(args: &CommandWithFlags) {
    use tracing_subscriber::filter::LevelFilter;

    let max_level = if args.quiet {
        LevelFilter::WARN
    } else if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::fmt().with_max_level(max_level).init();
}
