use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use anyhow::{anyhow, bail, Context};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use log::debug;
use serde::Deserialize;

use crate::channel::DEFAULT_API_URL;

/// Where a mirrored channel lives in Slack.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ChannelConf {
    /// Slack channel id
    pub id: String,

    /// Name of the entry in `slack_keys` used to read the channel
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Reported in the status message after each sync
    #[serde(default)]
    pub revision: String,

    /// Channel name to Discord webhook URL
    #[serde(default)]
    pub mirrored_hooks: HashMap<String, String>,

    #[serde(default)]
    pub status_hook: Option<String>,

    #[serde(default, rename = "channel_confs")]
    pub channels: BTreeMap<String, ChannelConf>,

    /// Key name to Slack token
    #[serde(default)]
    pub slack_keys: BTreeMap<String, String>,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default = "default_slack_api_url")]
    pub slack_api_url: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_history_limit() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    1
}

fn default_slack_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Settings {
    /// Reads `path` (format picked from its extension), then applies
    /// `SLACKMIRROR_*` environment overrides, e.g. `SLACKMIRROR_STATUS_HOOK`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings: Self = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(true))
            .add_source(Environment::with_prefix("SLACKMIRROR").separator("__"))
            .build()
            .with_context(|| format!("Failed to read config file {}", path.display()))?
            .try_deserialize()
            .map_err(|e| {
                anyhow!(
                    "Failed to deserialize config file {}: {}",
                    path.display(),
                    e
                )
            })?;

        settings.validate()?;

        debug!(
            "loaded config revision {:?} with {} channels",
            settings.revision,
            settings.channels.len()
        );

        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, channel) in &self.channels {
            if !self.slack_keys.contains_key(&channel.key) {
                bail!(
                    "Channel {name} uses Slack key {:?}, which is not in slack_keys",
                    channel.key
                );
            }

            if !self.mirrored_hooks.contains_key(name) {
                bail!("Channel {name} has no entry in mirrored_hooks");
            }
        }

        self.tz()?;

        Ok(())
    }

    pub fn tz(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid timezone {:?}: {e}", self.timezone))
    }

    /// Asks for every Slack token left empty in the config.
    pub fn fill_missing_tokens(&mut self, prompt: impl Fn(&str) -> String) {
        for (name, token) in &mut self.slack_keys {
            if token.trim().is_empty() {
                *token = prompt(&format!("Enter Slack token for {name}: "));
            }
        }
    }
}
