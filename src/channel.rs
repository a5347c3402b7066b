use async_trait::async_trait;
use log::debug;

use crate::{
    auth::validate_token,
    conversations::{HistoryResponse, Message},
    errors::SlackError,
};

pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Source of channel history.
#[async_trait]
pub trait SlackApi: Send + Sync {
    async fn validate(&self) -> Result<(), SlackError>;

    /// Channel history, newest first.
    async fn history(&self, channel_id: &str) -> Result<Vec<Message>, SlackError>;
}

pub struct SlackClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    limit: u32,
    max_pages: u32,
}

impl SlackClient {
    /// `client` is shared with the other clients of a run.
    pub fn new(client: reqwest::Client, base_url: &str, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            limit: 100,
            max_pages: 1,
        }
    }

    /// Messages requested per page and how many pages to follow.
    #[must_use]
    pub fn with_paging(mut self, limit: u32, max_pages: u32) -> Self {
        self.limit = limit.max(1);
        self.max_pages = max_pages.max(1);
        self
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn validate(&self) -> Result<(), SlackError> {
        validate_token(&self.client, &self.base_url, &self.token).await
    }

    async fn history(&self, channel_id: &str) -> Result<Vec<Message>, SlackError> {
        let mut all_messages = Vec::new();
        let mut next_cursor: Option<String> = None;

        let mut page = 1;

        loop {
            let limit = self.limit.to_string();
            let mut params = vec![("channel", channel_id), ("limit", limit.as_str())];
            if let Some(cursor) = &next_cursor {
                params.push(("cursor", cursor.as_str()));
            }

            let channel_history: HistoryResponse = self
                .client
                .get(format!("{}/conversations.history", self.base_url))
                .bearer_auth(&self.token)
                .query(&params)
                .send()
                .await?
                .json()
                .await?;

            if !channel_history.ok {
                return Err(SlackError::Api(
                    channel_history
                        .error
                        .unwrap_or_else(|| "unknown_error".to_string()),
                ));
            }

            if let Some(messages) = channel_history.messages {
                all_messages.extend(messages);
            }

            if page >= self.max_pages {
                break;
            }

            let Some(response_metadata) = &channel_history.response_metadata else {
                break;
            };

            match response_metadata.next_cursor.as_str() {
                "" => break,
                cursor => next_cursor = Some(cursor.to_string()),
            }

            page += 1;
            debug!("fetching page {page} of {channel_id}");
        }

        Ok(all_messages)
    }
}
