use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use derive_more::Display;
use log::LevelFilter;

const APP_DIR: &str = env!("CARGO_PKG_NAME");

/// Mirror new Slack messages to Discord webhooks.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file (JSON or TOML)
    #[arg(short, long, env = "SLACKMIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the snapshot and the `reference/` lookup tables
    #[arg(short, long, env = "SLACKMIRROR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Render and log new messages without delivering or saving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Don't check Slack tokens before syncing
    #[arg(long)]
    pub skip_auth: bool,

    /// Log verbosity
    #[arg(short, long, value_name = "LEVEL", default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Args {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(|| {
            dirs::config_dir().map_or_else(
                || PathBuf::from("config.json"),
                |dir| dir.join(APP_DIR).join("config.json"),
            )
        })
    }

    pub fn data_path(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir().map_or_else(|| PathBuf::from("data"), |dir| dir.join(APP_DIR))
        })
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Display, PartialEq, Eq)]
pub enum LogLevel {
    #[display(fmt = "trace")]
    Trace,
    #[display(fmt = "debug")]
    Debug,
    #[display(fmt = "info")]
    Info,
    #[display(fmt = "warn")]
    Warn,
    #[display(fmt = "error")]
    Error,
    #[display(fmt = "off")]
    Off,
}

impl From<LogLevel> for LevelFilter {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::parse_from([
            "slackmirror",
            "--config",
            "bot.toml",
            "--data-dir",
            "state",
            "--dry-run",
            "-l",
            "debug",
        ]);

        assert_eq!(args.config_path(), PathBuf::from("bot.toml"));
        assert_eq!(args.data_path(), PathBuf::from("state"));
        assert!(args.dry_run);
        assert!(!args.skip_auth);
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    }

    #[test]
    fn log_level_displays_as_its_value_name() {
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Off.to_string(), "off");
    }
}
