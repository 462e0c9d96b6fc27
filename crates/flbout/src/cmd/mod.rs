use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use flbout::decode::{DecoderConfig, DuplicateKeys, Utf8Mode, DEFAULT_MAX_DEPTH};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod stats;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a captured batch and print each event.
    Decode(DecodeArgs),
    /// Count events per body shape.
    Stats(StatsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Stats(args) => stats::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DuplicateKeysArg {
    LastWins,
    FirstWins,
    Reject,
}

impl From<DuplicateKeysArg> for DuplicateKeys {
    fn from(arg: DuplicateKeysArg) -> Self {
        match arg {
            DuplicateKeysArg::LastWins => DuplicateKeys::LastWins,
            DuplicateKeysArg::FirstWins => DuplicateKeys::FirstWins,
            DuplicateKeysArg::Reject => DuplicateKeys::Reject,
        }
    }
}

#[derive(Args, Debug)]
pub struct DecoderOptions {
    /// Maximum nesting depth of arrays and maps.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
    /// How repeated keys within one map are resolved.
    #[arg(long, value_name = "POLICY", default_value = "last-wins")]
    pub duplicate_keys: DuplicateKeysArg,
    /// Replace invalid UTF-8 in strings instead of failing.
    #[arg(long)]
    pub lossy_utf8: bool,
}

impl DecoderOptions {
    pub fn to_config(&self) -> DecoderConfig {
        DecoderConfig {
            max_depth: self.max_depth,
            duplicate_keys: self.duplicate_keys.into(),
            utf8: if self.lossy_utf8 {
                Utf8Mode::Lossy
            } else {
                Utf8Mode::Strict
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding a raw event batch.
    pub path: PathBuf,
    /// Stop after printing N events.
    #[arg(long)]
    pub limit: Option<usize>,
    #[command(flatten)]
    pub decoder: DecoderOptions,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// File holding a raw event batch.
    pub path: PathBuf,
    #[command(flatten)]
    pub decoder: DecoderOptions,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn read_batch(path: &std::path::Path) -> CliResult<Vec<u8>> {
    std::fs::read(path)
        .map_err(|err| crate::exit::io_error(&format!("failed reading {}", path.display()), err))
}
