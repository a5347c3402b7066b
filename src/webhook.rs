use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::{errors::WebhookError, render::OutboundRecord};

/// Discord rejects embed fields with an empty name.
const BLANK_FIELD_NAME: &str = "\u{200b}";

/// Destination for rendered messages.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_record(&self, record: &OutboundRecord) -> Result<(), WebhookError>;

    async fn send_content(&self, content: &str) -> Result<(), WebhookError>;
}

#[derive(Serialize, Debug)]
struct WebhookPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<Embed<'a>>,
}

#[derive(Serialize, Debug)]
struct Embed<'a> {
    author: EmbedAuthor<'a>,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<EmbedFooter<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<EmbedField<'a>>,
}

#[derive(Serialize, Debug)]
struct EmbedAuthor<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_url: Option<&'a str>,
}

#[derive(Serialize, Debug)]
struct EmbedFooter<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
struct EmbedField<'a> {
    name: &'a str,
    value: &'a str,
}

fn non_empty(text: &str) -> Option<&str> {
    (!text.is_empty()).then_some(text)
}

impl<'a> From<&'a OutboundRecord> for Embed<'a> {
    fn from(record: &'a OutboundRecord) -> Self {
        Self {
            author: EmbedAuthor {
                name: &record.author_label,
                icon_url: record.avatar_url.as_deref(),
            },
            timestamp: record.timestamp,
            description: non_empty(&record.body),
            footer: non_empty(&record.reaction_summary).map(|text| EmbedFooter { text }),
            fields: non_empty(&record.files_summary)
                .map(|value| EmbedField {
                    name: BLANK_FIELD_NAME,
                    value,
                })
                .into_iter()
                .collect(),
        }
    }
}

/// Posts to a Discord webhook URL.
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    async fn execute(&self, payload: &WebhookPayload<'_>) -> Result<(), WebhookError> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("wait", "true")])
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(WebhookError::Rejected { status, body })
    }
}

#[async_trait]
impl Transport for WebhookClient {
    async fn send_record(&self, record: &OutboundRecord) -> Result<(), WebhookError> {
        self.execute(&WebhookPayload {
            content: None,
            embeds: vec![Embed::from(record)],
        })
        .await
    }

    async fn send_content(&self, content: &str) -> Result<(), WebhookError> {
        self.execute(&WebhookPayload {
            content: Some(content),
            embeds: Vec::new(),
        })
        .await
    }
}

/// Logs what would have been sent. Used for dry runs.
pub struct LogTransport {
    pub label: String,
}

#[async_trait]
impl Transport for LogTransport {
    async fn send_record(&self, record: &OutboundRecord) -> Result<(), WebhookError> {
        info!(
            "[{}] {} at {}: {}",
            self.label,
            record.author_label,
            record.timestamp.to_rfc3339(),
            record.body
        );
        Ok(())
    }

    async fn send_content(&self, content: &str) -> Result<(), WebhookError> {
        info!("[{}] {content}", self.label);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record() -> OutboundRecord {
        OutboundRecord {
            body: "**hi**".to_string(),
            author_label: "@ada (Ada Lovelace)".to_string(),
            avatar_url: Some("https://img/ada.png".to_string()),
            reaction_summary: "*reactions: [+1 | 2]*".to_string(),
            files_summary: "file: a.txt uploaded by ada (Ada Lovelace )\n".to_string(),
            timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn embed_carries_every_rendered_field() {
        let record = record();
        let payload = WebhookPayload {
            content: None,
            embeds: vec![Embed::from(&record)],
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "embeds": [{
                    "author": {"name": "@ada (Ada Lovelace)", "icon_url": "https://img/ada.png"},
                    "timestamp": "2023-11-14T22:13:20Z",
                    "description": "**hi**",
                    "footer": {"text": "*reactions: [+1 | 2]*"},
                    "fields": [{"name": "\u{200b}", "value": "file: a.txt uploaded by ada (Ada Lovelace )\n"}]
                }]
            })
        );
    }

    #[test]
    fn empty_parts_are_left_out() {
        let record = OutboundRecord {
            body: String::new(),
            avatar_url: None,
            reaction_summary: String::new(),
            files_summary: String::new(),
            ..record()
        };

        assert_eq!(
            serde_json::to_value(Embed::from(&record)).unwrap(),
            json!({
                "author": {"name": "@ada (Ada Lovelace)"},
                "timestamp": "2023-11-14T22:13:20Z"
            })
        );
    }

    #[tokio::test]
    async fn posts_content_and_reports_rejections() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/webhooks/1/ok"))
            .and(query_param("wait", "true"))
            .and(body_json(json!({"content": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/webhooks/1/bad"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid form body"))
            .mount(&server)
            .await;

        let ok = WebhookClient::new(
            reqwest::Client::new(),
            &format!("{}/api/webhooks/1/ok", server.uri()),
        );
        ok.send_content("hello").await.unwrap();

        let bad = WebhookClient::new(
            reqwest::Client::new(),
            &format!("{}/api/webhooks/1/bad", server.uri()),
        );
        let err = bad.send_record(&record()).await.unwrap_err();
        assert!(matches!(
            err,
            WebhookError::Rejected { status, ref body }
                if status == reqwest::StatusCode::BAD_REQUEST && body == "invalid form body"
        ));
    }
}
