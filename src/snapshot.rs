use std::{
    collections::BTreeMap,
    fs,
    io::{BufWriter, ErrorKind, Write},
    path::Path,
};

use log::debug;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{conversations::Message, errors::SnapshotError};

pub const SNAPSHOT_FILE: &str = "last_msg_set.json";

/// Last fetched history per channel name, newest first as Slack returns it.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Snapshot {
    channels: BTreeMap<String, Vec<Message>>,
}

impl Snapshot {
    /// Reads a snapshot, treating a missing file as an empty one.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no snapshot at {}, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SnapshotError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the snapshot through a temporary file in the same directory so a
    /// crash never leaves a truncated file behind.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let io_error = |source: std::io::Error| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };

        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(io_error)?;

        let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer(&mut writer, self).map_err(|source| SnapshotError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
            writer.flush().map_err(io_error)?;
        }

        temp.persist(path).map_err(|source| SnapshotError::Persist {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }

    pub fn get(&self, channel: &str) -> &[Message] {
        self.channels.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Overwrites the channel's history with `messages`.
    pub fn replace(&mut self, channel: &str, messages: Vec<Message>) {
        self.channels.insert(channel.to_string(), messages);
    }
}
