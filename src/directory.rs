use std::{collections::HashMap, fs, path::Path};

use log::{debug, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub const USERS_FILE: &str = "users.json";
pub const CHANNELS_FILE: &str = "channels.json";
pub const USER_GROUPS_FILE: &str = "usergroups.json";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Profile {
    #[serde(default)]
    pub image_48: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct User {
    #[serde(default)]
    pub id: String,

    /// Handle shown after the `@`
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub real_name: String,

    #[serde(default)]
    pub profile: Profile,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ChannelInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Read-only id lookups for users, channels and user groups.
///
/// Every lookup is total: unknown ids resolve to empty strings.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: HashMap<String, User>,
    channels: HashMap<String, ChannelInfo>,
    groups: HashMap<String, String>,
}

impl Directory {
    pub fn new(
        users: HashMap<String, User>,
        channels: HashMap<String, ChannelInfo>,
        groups: HashMap<String, String>,
    ) -> Self {
        Self {
            users,
            channels,
            groups,
        }
    }

    /// Loads the three reference tables from `dir`. A table that is missing or
    /// unreadable is logged and left empty.
    pub fn load(dir: &Path) -> Self {
        let directory = Self {
            users: load_table(&dir.join(USERS_FILE)),
            channels: load_table(&dir.join(CHANNELS_FILE)),
            groups: load_table(&dir.join(USER_GROUPS_FILE)),
        };

        debug!(
            "loaded directory: {} users, {} channels, {} groups",
            directory.users.len(),
            directory.channels.len(),
            directory.groups.len()
        );

        directory
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    /// `(name, real_name)` of a user, both empty when the id is unknown.
    pub fn user_names(&self, user_id: &str) -> (&str, &str) {
        self.user(user_id).map_or(("", ""), |user| {
            (user.name.as_str(), user.real_name.as_str())
        })
    }

    pub fn avatar_url(&self, user_id: &str) -> Option<&str> {
        self.user(user_id)
            .map(|user| user.profile.image_48.as_str())
            .filter(|url| !url.is_empty())
    }

    pub fn channel_name(&self, channel_id: &str) -> &str {
        self.channels
            .get(channel_id)
            .map_or("", |channel| channel.name.as_str())
    }

    pub fn group_name(&self, group_id: &str) -> &str {
        self.groups.get(group_id).map_or("", String::as_str)
    }
}

fn load_table<T: DeserializeOwned>(path: &Path) -> HashMap<String, T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Could not read {}: {e}", path.display());
            return HashMap::new();
        }
    };

    serde_json::from_str(&contents).unwrap_or_else(|e| {
        warn!("Could not parse {}: {e}", path.display());
        HashMap::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_reference_tables() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(USERS_FILE),
            r#"{"U1": {"id": "U1", "name": "ada", "real_name": "Ada Lovelace", "profile": {"image_48": "https://img/ada.png"}}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join(CHANNELS_FILE),
            r#"{"C1": {"id": "C1", "name": "general"}}"#,
        )
        .unwrap();
        fs::write(dir.path().join(USER_GROUPS_FILE), r#"{"S1": "admins"}"#).unwrap();

        let directory = Directory::load(dir.path());

        assert_eq!(directory.user_names("U1"), ("ada", "Ada Lovelace"));
        assert_eq!(directory.avatar_url("U1"), Some("https://img/ada.png"));
        assert_eq!(directory.channel_name("C1"), "general");
        assert_eq!(directory.group_name("S1"), "admins");
    }

    #[test]
    fn missing_ids_resolve_to_empty_values() {
        let directory = Directory::default();

        assert_eq!(directory.user_names("U404"), ("", ""));
        assert_eq!(directory.avatar_url("U404"), None);
        assert_eq!(directory.channel_name("C404"), "");
        assert_eq!(directory.group_name("S404"), "");
    }

    #[test]
    fn missing_or_corrupt_files_yield_empty_tables() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(USERS_FILE), "not json").unwrap();

        let directory = Directory::load(dir.path());

        assert!(directory.user("U1").is_none());
        assert_eq!(directory.channel_name("C1"), "");
    }
}
