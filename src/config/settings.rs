//! Configuration settings for IdlePipe
//!
//! Defines the CLI arguments, the validated pipe configuration
//! and the defaults for a supervised copy.

use crate::error::{IdlePipeError, Result};
use clap::{Parser, ValueEnum};
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Default read chunk size (64 KiB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// IdlePipe - pipe stdin to stdout with an idle watchdog
#[derive(Parser, Debug, Clone)]
#[command(name = "idlepipe")]
#[command(author = "IdlePipe Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pipe stdin to stdout, but terminate if nothing has been sent for some time")]
#[command(long_about = r#"
IdlePipe copies its standard input to its standard output and gives up
once no data has moved for longer than TIMEOUT.

Examples:
  producer | idlepipe 5s | consumer              # Abort a stalled pipe after 5s
  producer | idlepipe -b 4K 500ms > out.bin     # Small reads, short timeout
  tail -f log | idlepipe 1m -e "notify-send idle" # Run a command once it ends
"#)]
pub struct CliArgs {
    /// Duration until termination without activity, e.g., 5s or 250ms
    #[arg(value_name = "TIMEOUT", value_parser = parse_timeout)]
    pub timeout: Duration,

    /// Buffer size in bytes (e.g., 65536, 64K, 1M)
    #[arg(short = 'b', long = "buf", default_value = "64K", value_name = "SIZE")]
    pub buffer_size: String,

    /// Command to be executed afterwards
    #[arg(short = 'e', long = "cmd", value_name = "CMD")]
    pub cmd: Option<String>,

    /// Execute the command within "sh -c"
    #[arg(long = "sh")]
    pub sh_wrap: bool,

    /// Keep reading when the sink rejects a write
    #[arg(long)]
    pub ignore_write_errors: bool,

    /// Print a transfer summary to stderr when the pipe ends
    #[arg(long)]
    pub summary: bool,

    /// Output format for the summary
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,

    /// Logging to stderr (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Output format for reports
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

/// What the copy loop does when the sink fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WriteErrorPolicy {
    /// A failed write ends the pipe with a transfer error
    #[default]
    Terminate,
    /// A failed write is logged and the chunk is dropped; reading continues
    Ignore,
}

/// Validated configuration of a flow control unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipeConfig {
    /// Idle interval after which the pipe is declared stalled
    #[serde(serialize_with = "serialize_duration")]
    pub idle_timeout: Duration,
    /// Bytes requested per read from the source
    pub buffer_size: usize,
    /// Handling of sink failures
    pub write_errors: WriteErrorPolicy,
}

impl PipeConfig {
    /// Create a configuration, rejecting a zero timeout or buffer size
    pub fn new(idle_timeout: Duration, buffer_size: usize) -> Result<Self> {
        let config = Self {
            idle_timeout,
            buffer_size,
            write_errors: WriteErrorPolicy::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the write error policy
    pub fn with_write_errors(mut self, policy: WriteErrorPolicy) -> Self {
        self.write_errors = policy;
        self
    }

    /// Check the invariants every unit relies on
    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout.is_zero() {
            return Err(IdlePipeError::InvalidTimeout);
        }
        if self.buffer_size == 0 {
            return Err(IdlePipeError::InvalidBufferSize);
        }
        Ok(())
    }

    /// Build configuration from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let buffer_size = parse_size(&args.buffer_size).map_err(IdlePipeError::ConfigError)?;
        let buffer_size = usize::try_from(buffer_size).map_err(|_| {
            IdlePipeError::config(format!("Buffer size too large: {}", args.buffer_size))
        })?;

        let policy = if args.ignore_write_errors {
            WriteErrorPolicy::Ignore
        } else {
            WriteErrorPolicy::Terminate
        };

        Ok(Self::new(args.timeout, buffer_size)?.with_write_errors(policy))
    }
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(5),
            buffer_size: DEFAULT_BUFFER_SIZE,
            write_errors: WriteErrorPolicy::default(),
        }
    }
}

/// Write durations as humantime strings ("1m 30s")
fn serialize_duration<S>(value: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*value))
}

/// Parse an idle timeout such as "5s", "250ms" or "1m30s"
pub fn parse_timeout(raw: &str) -> std::result::Result<Duration, String> {
    let timeout = humantime::parse_duration(raw.trim())
        .map_err(|e| format!("Invalid duration '{}': {}", raw, e))?;

    if timeout.is_zero() {
        return Err("Timeout must be greater than zero".to_string());
    }

    Ok(timeout)
}

/// Parse size string (e.g., "64K", "1M", "65536")
pub fn parse_size(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("GB") || size.ends_with('G') {
        let num = size.trim_end_matches(|c| c == 'G' || c == 'B');
        (num, 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        let num = size.trim_end_matches(|c| c == 'M' || c == 'B');
        (num, 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        let num = size.trim_end_matches(|c| c == 'K' || c == 'B');
        (num, 1024u64)
    } else if size.ends_with('B') {
        let num = size.trim_end_matches('B');
        (num, 1u64)
    } else {
        // Assume bytes if no suffix
        (size.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    if !num.is_finite() || num < 0.0 {
        return Err(format!("Invalid size: {}", size));
    }

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("65536").unwrap(), 65536);
        assert_eq!(parse_size("64K").unwrap(), 65536);
        assert_eq!(parse_size("4kb").unwrap(), 4096);
        assert_eq!(parse_size("1M").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("2G").unwrap(), 2 * 1024 * 1024 * 1024);
        assert!(parse_size("").is_err());
        assert!(parse_size("lots").is_err());
        assert!(parse_size("-1K").is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_timeout("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_timeout("1m30s").unwrap(), Duration::from_secs(90));
        assert!(parse_timeout("0s").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_config_rejects_zero_values() {
        assert!(matches!(
            PipeConfig::new(Duration::ZERO, 4096),
            Err(IdlePipeError::InvalidTimeout)
        ));
        assert!(matches!(
            PipeConfig::new(Duration::from_millis(100), 0),
            Err(IdlePipeError::InvalidBufferSize)
        ));
        assert!(PipeConfig::new(Duration::from_millis(100), 1).is_ok());
    }

    #[test]
    fn test_config_from_cli() {
        let args = CliArgs::parse_from(["idlepipe", "-b", "4K", "--ignore-write-errors", "2s"]);
        let config = PipeConfig::from_cli(&args).unwrap();

        assert_eq!(config.idle_timeout, Duration::from_secs(2));
        assert_eq!(config.buffer_size, 4096);
        assert_eq!(config.write_errors, WriteErrorPolicy::Ignore);
    }

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::parse_from(["idlepipe", "500ms"]);
        let config = PipeConfig::from_cli(&args).unwrap();

        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.write_errors, WriteErrorPolicy::Terminate);
        assert!(args.cmd.is_none());
        assert!(!args.sh_wrap);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_cli_rejects_zero_buffer() {
        let args = CliArgs::parse_from(["idlepipe", "-b", "0", "1s"]);
        assert!(matches!(
            PipeConfig::from_cli(&args),
            Err(IdlePipeError::InvalidBufferSize)
        ));
    }

    #[test]
    fn test_config_serializes_human_duration() {
        let config = PipeConfig::new(Duration::from_secs(90), 4096).unwrap();
        let json: serde_json::Value = serde_json::to_value(config).unwrap();

        assert_eq!(json["idle_timeout"], "1m 30s");
        assert_eq!(json["buffer_size"], 4096);
        assert_eq!(json["write_errors"], "terminate");
    }
}
