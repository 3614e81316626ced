mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use fifoglue_endpoint::{NamespaceConfig, Registry, DEFAULT_NAMESPACE_DIR};
use fifoglue_frame::FrameConfig;

use crate::cmd::Command;
use crate::exit::{frame_error, CliError, CliResult, USAGE};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "fifoglue", version, about = "Named FIFO messaging CLI")]
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

    /// Namespace directory holding the endpoint FIFOs.
    #[arg(
        long,
        value_name = "DIR",
        env = "FIFOGLUE_NAMESPACE",
        default_value = DEFAULT_NAMESPACE_DIR,
        global = true
    )]
    namespace: PathBuf,

    /// Frame size in bytes; every process in a namespace must agree.
    #[arg(long, value_name = "BYTES", env = "FIFOGLUE_FRAME_SIZE", global = true)]
    frame_size: Option<usize>,

    /// Messages buffered per endpoint before the listener stops reading.
    #[arg(long, value_name = "N", env = "FIFOGLUE_QUEUE_CAPACITY", global = true)]
    queue_capacity: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn registry(&self) -> CliResult<Registry> {
        let mut config = NamespaceConfig::new(&self.namespace);
        if let Some(frame_size) = self.frame_size {
            let frame = FrameConfig::with_frame_size(frame_size)
                .map_err(|err| frame_error("invalid --frame-size", err))?;
            config = config.with_frame(frame);
        }
        if let Some(queue_capacity) = self.queue_capacity {
            if queue_capacity == 0 {
                return Err(CliError::new(USAGE, "--queue-capacity must be at least 1"));
            }
            config = config.with_queue_capacity(queue_capacity);
        }
        Ok(Registry::new(config))
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cli
        .registry()
        .and_then(|registry| cmd::run(cli.command, &registry, format));

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

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "fifoglue",
            "send",
            "p2",
            "--header",
            "Header",
            "--data",
            "hello",
        ])
        .expect("send args should parse");

        assert!(matches!(cli.command, Command::Send(_)));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "fifoglue",
            "send",
            "p2",
            "--data",
            "hello",
            "--file",
            "/tmp/payload.txt",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn namespace_flag_overrides_default() {
        let cli = Cli::try_parse_from(["fifoglue", "--namespace", "/tmp/elsewhere", "list"])
            .expect("list args should parse");
        assert_eq!(cli.namespace, PathBuf::from("/tmp/elsewhere"));
        assert!(matches!(cli.command, Command::List(_)));
    }

    #[test]
    fn rejects_oversized_frame_size() {
        let cli = Cli::try_parse_from(["fifoglue", "--frame-size", "8192", "list"])
            .expect("args should parse");
        let err = cli.registry().expect_err("frame size above the atomic limit");
        assert_eq!(err.code, crate::exit::USAGE);
    }

    #[test]
    fn rejects_zero_queue_capacity() {
        let cli = Cli::try_parse_from(["fifoglue", "--queue-capacity", "0", "list"])
            .expect("args should parse");
        assert_eq!(cli.registry().expect_err("zero capacity").code, USAGE);
    }

    #[test]
    fn queue_capacity_flows_into_config() {
        let cli = Cli::try_parse_from(["fifoglue", "--queue-capacity", "16", "list"])
            .expect("args should parse");
        let registry = cli.registry().expect("registry should build");
        assert_eq!(registry.config().queue_capacity, 16);
    }

    #[test]
    fn parses_listen_with_count() {
        let cli = Cli::try_parse_from(["fifoglue", "listen", "p2", "--count", "3"])
            .expect("listen args should parse");
        assert!(matches!(cli.command, Command::Listen(ref args) if args.count == Some(3)));
    }
}
