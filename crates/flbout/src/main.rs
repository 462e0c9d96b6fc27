mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "flbout", version, about = "Fluent Bit event batch inspector")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Log level for decoder diagnostics; defaults to --log-level.
    #[arg(long, value_name = "LEVEL", global = true)]
    decoder_log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level, cli.decoder_log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::DuplicateKeysArg;
    use flbout::decode::{DuplicateKeys, Utf8Mode, DEFAULT_MAX_DEPTH};

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from(["flbout", "decode", "/tmp/batch.msgpack", "--limit", "5"])
            .expect("decode args should parse");

        match cli.command {
            Command::Decode(args) => {
                assert_eq!(args.limit, Some(5));
                assert_eq!(args.decoder.to_config().max_depth, DEFAULT_MAX_DEPTH);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn decoder_options_map_to_config() {
        let cli = Cli::try_parse_from([
            "flbout",
            "stats",
            "/tmp/batch.msgpack",
            "--max-depth",
            "8",
            "--duplicate-keys",
            "reject",
            "--lossy-utf8",
        ])
        .expect("stats args should parse");

        let Command::Stats(args) = cli.command else {
            panic!("expected stats command");
        };
        assert_eq!(args.decoder.duplicate_keys, DuplicateKeysArg::Reject);

        let config = args.decoder.to_config();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.duplicate_keys, DuplicateKeys::Reject);
        assert_eq!(config.utf8, Utf8Mode::Lossy);
    }

    #[test]
    fn rejects_unknown_duplicate_policy() {
        let err = Cli::try_parse_from([
            "flbout",
            "decode",
            "/tmp/batch.msgpack",
            "--duplicate-keys",
            "merge",
        ])
        .expect_err("unknown policy should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn decoder_log_level_is_optional() {
        let cli = Cli::try_parse_from(["flbout", "stats", "/tmp/batch.msgpack"])
            .expect("stats args should parse");
        assert_eq!(cli.decoder_log_level, None);

        let cli = Cli::try_parse_from([
            "flbout",
            "--decoder-log-level",
            "trace",
            "stats",
            "/tmp/batch.msgpack",
        ])
        .expect("decoder log level should parse");
        assert_eq!(cli.decoder_log_level, Some(LogLevel::Trace));
    }

    #[test]
    fn global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["flbout", "version", "--format", "json"])
            .expect("global flag should parse after subcommand");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }
}
