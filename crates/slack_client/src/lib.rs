//! Posts the finished digest to a Slack incoming webhook, one attachment
//! per section.

use anyhow::{Context, Result};
use async_trait::async_trait;
use models::{DisplayMessage, Tone};
use reqwest::{Client, Url};
use sales_pipeline::sources::DeliverySink;
use serde::Serialize;
use tracing::debug;

pub struct SlackClient {
    http: Client,
    webhook_url: Url,
}

impl SlackClient {
    pub fn new(webhook_url: &str) -> Result<Self> {
        let webhook_url = Url::parse(webhook_url)
            .with_context(|| format!("Invalid Slack webhook URL: {webhook_url}"))?;
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, webhook_url })
    }
}

#[async_trait]
impl DeliverySink for SlackClient {
    async fn send(&self, message: &DisplayMessage) -> Result<()> {
        let payload = WebhookPayload::from_message(message);

        debug!("POST {} ({} attachments)", self.webhook_url, payload.attachments.len());
        self.http
            .post(self.webhook_url.clone())
            .json(&payload)
            .send()
            .await
            .context("POST to Slack webhook failed")?
            .error_for_status()
            .context("Slack webhook returned non-success status")?;

        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload {
    attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize)]
struct Attachment {
    color: &'static str,
    author_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author_icon: Option<String>,
    fields: Vec<AttachmentField>,
}

#[derive(Debug, Serialize)]
struct AttachmentField {
    title: String,
    value: String,
    short: bool,
}

impl WebhookPayload {
    fn from_message(message: &DisplayMessage) -> Self {
        let attachments = message
            .sections
            .iter()
            .map(|section| Attachment {
                color: match section.tone {
                    Tone::Good => "good",
                    Tone::Bad => "danger",
                },
                author_name: section.name.clone(),
                author_icon: section.icon.clone(),
                fields: section
                    .fields
                    .iter()
                    .map(|field| AttachmentField {
                        title: field.label.clone(),
                        value: field.value.clone(),
                        short: true,
                    })
                    .collect(),
            })
            .collect();

        Self { attachments }
    }
}
