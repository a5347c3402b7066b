use std::{path::PathBuf, sync::Arc};

use chrono_tz::Tz;
use derive_more::Display;
use indicatif::ProgressBar;
use log::{debug, error, info, warn};

use crate::{
    channel::SlackApi,
    conversations::Message,
    diff::new_messages,
    directory::Directory,
    errors::SnapshotError,
    render::{render, Rendered, SKIPPED_NOTICE},
    snapshot::Snapshot,
    terminal::{get_formatted_left_output, OutputColor},
    timestamp::format_local,
    webhook::Transport,
};

/// One mirrored channel: where to read it and where to post it.
pub struct ChannelRoute {
    pub name: String,
    pub channel_id: String,
    pub source: Arc<dyn SlackApi>,
    pub destination: Arc<dyn Transport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Display)]
#[display(
    fmt = "#{} ({} new of {} fetched, {} skipped, {} failed)",
    name,
    new,
    fetched,
    skipped,
    failed
)]
pub struct ChannelReport {
    pub name: String,
    pub fetched: usize,
    pub new: usize,
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub channels: Vec<ChannelReport>,

    /// Channels whose history could not be fetched
    pub unreachable: Vec<String>,

    /// Channels synced but not saved; their messages will be sent again
    pub unsaved: Vec<String>,
}

impl SyncReport {
    pub fn new_messages(&self) -> usize {
        self.channels.iter().map(|channel| channel.new).sum()
    }
}

pub struct Syncer {
    pub directory: Directory,
    pub snapshot: Snapshot,

    /// `None` keeps the snapshot in memory only
    pub snapshot_path: Option<PathBuf>,

    pub status: Option<Arc<dyn Transport>>,
    pub revision: String,
    pub timezone: Tz,
}

impl Syncer {
    pub async fn sync_all(&mut self, routes: &[ChannelRoute], pb: &ProgressBar) -> SyncReport {
        let mut report = SyncReport::default();

        for route in routes {
            pb.set_message(format!(": #{}", route.name));

            match route.source.history(&route.channel_id).await {
                Ok(fetched) => {
                    let channel_report = self.sync_channel(route, fetched).await;
                    pb.println(format!(
                        "{} {channel_report}",
                        get_formatted_left_output("Synced", &OutputColor::Green)
                    ));
                    report.channels.push(channel_report);

                    if let Err(e) = self.persist() {
                        error!("failed to save snapshot after #{}: {e}", route.name);
                        pb.println(format!(
                            "{} #{}: {e}",
                            get_formatted_left_output("Unsaved", &OutputColor::Red),
                            route.name
                        ));
                        self.post_status(&format!("D: Failure! ~ {e} ~ {}", route.name))
                            .await;
                        report.unsaved.push(route.name.clone());
                    }
                }
                Err(e) => {
                    error!(
                        "error reading data for channel {} ({}), skipping: {e}",
                        route.name, route.channel_id
                    );
                    pb.println(format!(
                        "{} #{}: {e}",
                        get_formatted_left_output("Failed", &OutputColor::Red),
                        route.name
                    ));
                    self.post_status(&format!("D: Failure! ~ {e} ~ {}", route.name))
                        .await;
                    report.unreachable.push(route.name.clone());
                }
            }

            pb.inc(1);
        }

        self.post_status(&format!(
            ":thumbsup: Slack data synced! `{}` Revision: {}",
            env!("CARGO_PKG_NAME"),
            self.revision
        ))
        .await;

        report
    }

    /// Delivers the messages of `fetched` missing from the snapshot, oldest
    /// first, then stores `fetched` as the channel's snapshot in memory.
    pub async fn sync_channel(
        &mut self,
        route: &ChannelRoute,
        fetched: Vec<Message>,
    ) -> ChannelReport {
        let mut report = ChannelReport {
            name: route.name.clone(),
            fetched: fetched.len(),
            ..ChannelReport::default()
        };

        let new = new_messages(&fetched, self.snapshot.get(&route.name));
        report.new = new.len();
        debug!("#{}: {} new of {} fetched", route.name, new.len(), fetched.len());

        // Slack returns newest first
        for message in new.iter().rev() {
            let delivery = match render(message, &self.directory) {
                Rendered::Record(record) => {
                    info!(
                        "#{}: mirroring message from {} ({})",
                        route.name,
                        record.author_label,
                        format_local(&message.ts, self.timezone)
                    );
                    route.destination.send_record(&record).await
                }
                Rendered::Skipped => {
                    warn!("#{}: message {} is too long, skipping", route.name, message.ts);
                    report.skipped += 1;
                    route.destination.send_content(SKIPPED_NOTICE).await
                }
            };

            match delivery {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    error!("#{}: failed to deliver message {}: {e}", route.name, message.ts);
                    report.failed += 1;
                }
            }
        }

        self.snapshot.replace(&route.name, fetched);

        report
    }

    /// Writes the snapshot to `snapshot_path`, if there is one.
    pub fn persist(&self) -> Result<(), SnapshotError> {
        match &self.snapshot_path {
            Some(path) => self.snapshot.save(path),
            None => Ok(()),
        }
    }

    async fn post_status(&self, content: &str) {
        let Some(status) = &self.status else {
            return;
        };

        if let Err(e) = status.send_content(content).await {
            warn!("failed to post status message: {e}");
        }
    }
}
