#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]

use std::{process, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use indicatif::ProgressStyle;
use slackmirror::{
    args::Args,
    channel::{SlackApi, SlackClient},
    directory::Directory,
    settings::Settings,
    snapshot::{Snapshot, SNAPSHOT_FILE},
    sync::{ChannelRoute, Syncer},
    terminal::{create_new_pb, get_formatted_left_output, prompt_password_input, OutputColor},
    webhook::{LogTransport, Transport, WebhookClient},
};

async fn start(args: Args, pb: &indicatif::ProgressBar) -> anyhow::Result<()> {
    let start_time = std::time::Instant::now();

    let config_path = args.config_path();
    let data_dir = args.data_path();

    let mut settings = Settings::load(&config_path)?;
    pb.suspend(|| settings.fill_missing_tokens(prompt_password_input));

    pb.println(format!(
        "{} {} ({} channels)",
        get_formatted_left_output("Loaded", &OutputColor::Green),
        config_path.display(),
        settings.channels.len()
    ));

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let clients: Vec<(String, Arc<SlackClient>)> = settings
        .slack_keys
        .iter()
        .map(|(name, token)| {
            let client = SlackClient::new(http.clone(), &settings.slack_api_url, token.clone())
                .with_paging(settings.history_limit, settings.max_pages);
            (name.clone(), Arc::new(client))
        })
        .collect();

    if !args.skip_auth {
        pb.set_message(": tokens");
        for (name, client) in &clients {
            client
                .validate()
                .await
                .map_err(|e| anyhow::anyhow!("Slack key {name} is not valid: {e}"))?;
        }
        pb.println(format!(
            "{} {} Slack tokens",
            get_formatted_left_output("Validated", &OutputColor::Green),
            clients.len()
        ));
    }

    let mut routes = Vec::new();
    for (name, channel) in &settings.channels {
        let Some((_, source)) = clients.iter().find(|(key, _)| *key == channel.key) else {
            anyhow::bail!("Channel {name} uses unknown Slack key {}", channel.key);
        };

        let destination: Arc<dyn Transport> = if args.dry_run {
            Arc::new(LogTransport {
                label: format!("dry-run #{name}"),
            })
        } else {
            let Some(url) = settings.mirrored_hooks.get(name) else {
                anyhow::bail!("Channel {name} has no mirrored hook");
            };
            Arc::new(WebhookClient::new(http.clone(), url))
        };

        routes.push(ChannelRoute {
            name: name.clone(),
            channel_id: channel.id.clone(),
            source: source.clone(),
            destination,
        });
    }

    let snapshot_path = data_dir.join(SNAPSHOT_FILE);
    let snapshot = Snapshot::load(&snapshot_path)?;
    let directory = Directory::load(&data_dir.join("reference"));

    let status: Option<Arc<dyn Transport>> = if args.dry_run {
        None
    } else {
        settings
            .status_hook
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| Arc::new(WebhookClient::new(http.clone(), url)) as Arc<dyn Transport>)
    };

    let mut syncer = Syncer {
        directory,
        snapshot,
        snapshot_path: (!args.dry_run).then_some(snapshot_path),
        status,
        revision: settings.revision.clone(),
        timezone: settings.tz()?,
    };

    pb.inc_length(routes.len() as u64);
    let report = syncer.sync_all(&routes, pb).await;

    for name in &report.unreachable {
        pb.println(format!(
            "{} #{name} was not reachable",
            get_formatted_left_output("Warning", &OutputColor::Yellow)
        ));
    }

    for name in &report.unsaved {
        pb.println(format!(
            "{} #{name} was synced but not saved and will be resent next run",
            get_formatted_left_output("Warning", &OutputColor::Yellow)
        ));
    }

    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{msg}} {} new messages in {}s",
                report.new_messages(),
                (start_time.elapsed().as_secs_f32() * 10.0).round() / 10.0
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.finish_with_message(get_formatted_left_output("Finished", &OutputColor::Green));

    Ok(())
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .format_timestamp_secs()
        .init();

    let pb = &create_new_pb(0, "Syncing");

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!(
                "{} {e}",
                get_formatted_left_output("Error", &OutputColor::Red)
            );
            process::exit(1);
        }
    };

    rt.block_on(async {
        if let Err(e) = start(args, pb).await {
            pb.abandon();

            eprintln!(
                "{} {e:#}",
                get_formatted_left_output("Error", &OutputColor::Red)
            );

            process::exit(1);
        }
    });
}
