//! Transactional email over HTTP.
//!
//! Posts `{from, to, subject, html, text}` JSON with a bearer API key, the
//! shape accepted by Resend-style APIs.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::EmailConfig;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Email API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// A contact-form submission to notify the site owner about.
#[derive(Debug, Clone)]
pub struct ContactNotification {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[async_trait]
pub trait ContactNotifier: Send + Sync {
    async fn notify(&self, contact: &ContactNotification) -> Result<(), EmailError>;
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    html: String,
    text: String,
    reply_to: &'a str,
}

#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
    to: String,
}

impl EmailClient {
    /// Returns `None` when email is disabled or not fully configured.
    pub fn from_config(config: &EmailConfig) -> anyhow::Result<Option<Self>> {
        if !config.is_configured() {
            return Ok(None);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("Folio/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build email HTTP client: {e}"))?;

        Ok(Some(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from: config.from_address.clone(),
            to: config.notification_address.clone(),
        }))
    }
}

#[async_trait]
impl ContactNotifier for EmailClient {
    async fn notify(&self, contact: &ContactNotification) -> Result<(), EmailError> {
        let body = SendEmailRequest {
            from: &self.from,
            to: vec![&self.to],
            subject: format!("New Contact Message from {}", contact.name),
            html: render_html(contact),
            text: render_text(contact),
            reply_to: &contact.email,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

fn render_html(contact: &ContactNotification) -> String {
    let name = html_escape::encode_text(&contact.name);
    let email = html_escape::encode_text(&contact.email);
    let email_attr = html_escape::encode_double_quoted_attribute(&contact.email);
    let message = html_escape::encode_text(&contact.message);

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #6366f1;">New Contact Form Submission</h2>
  <hr style="border: 1px solid #e5e5e5;">
  <p><strong>From:</strong> {name}</p>
  <p><strong>Email:</strong> <a href="mailto:{email_attr}">{email}</a></p>
  <h3 style="color: #333;">Message:</h3>
  <div style="background: #f5f5f5; padding: 15px; border-radius: 8px; border-left: 4px solid #6366f1;">
    <p style="white-space: pre-wrap; margin: 0;">{message}</p>
  </div>
  <hr style="border: 1px solid #e5e5e5; margin-top: 20px;">
  <p style="color: #888; font-size: 12px;">Sent from your portfolio website contact form.</p>
</div>"#
    )
}

fn render_text(contact: &ContactNotification) -> String {
    format!(
        "New Contact Form Submission\n\nFrom: {}\nEmail: {}\n\nMessage:\n{}\n\n---\nSent from your portfolio website contact form.\n",
        contact.name, contact.email, contact.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactNotification {
        ContactNotification {
            name: "Ada <script>".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello & welcome\nsecond line".to_string(),
        }
    }

    #[test]
    fn test_html_is_escaped() {
        let html = render_html(&contact());
        assert!(html.contains("Ada &lt;script&gt;"));
        assert!(html.contains("Hello &amp; welcome"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_text_body_is_plain() {
        let text = render_text(&contact());
        assert!(text.contains("From: Ada <script>"));
        assert!(text.contains("Email: ada@example.com"));
        assert!(text.contains("Hello & welcome\nsecond line"));
    }

    #[test]
    fn test_unconfigured_client_is_none() {
        let config = EmailConfig::default();
        assert!(EmailClient::from_config(&config).unwrap().is_none());

        let config = EmailConfig {
            enabled: true,
            api_key: "key".to_string(),
            notification_address: "owner@example.com".to_string(),
            ..EmailConfig::default()
        };
        assert!(EmailClient::from_config(&config).unwrap().is_some());
    }
}
