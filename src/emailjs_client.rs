use std::env;

use eyre::{Result, eyre};
use serde_json::json;
use tracing::debug;

pub const EMAIL_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Fields collected by the /contact flow, forwarded verbatim as EmailJS
/// template parameters.
pub struct ContactForm {
    pub from_name: String,
    pub reply_to: String,
    pub message: String,
}

pub struct EmailJsClient {
    client: reqwest::Client,
}

impl EmailJsClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Forward a project brief to the EmailJS delivery endpoint. The three
    /// identifiers are read at call time; a missing one surfaces here as a
    /// send failure rather than being validated up front.
    pub async fn send(&self, form: &ContactForm) -> Result<()> {
        let service_id = env::var("EMAILJS_SERVICE_ID")
            .map_err(|_| eyre!("EMAILJS_SERVICE_ID environment variable not set"))?;
        let template_id = env::var("EMAILJS_TEMPLATE_ID")
            .map_err(|_| eyre!("EMAILJS_TEMPLATE_ID environment variable not set"))?;
        let public_key = env::var("EMAILJS_PUBLIC_KEY")
            .map_err(|_| eyre!("EMAILJS_PUBLIC_KEY environment variable not set"))?;

        let request_body = json!({
            "service_id": service_id,
            "template_id": template_id,
            "user_id": public_key,
            "template_params": {
                "from_name": form.from_name,
                "reply_to": form.reply_to,
                "message": form.message
            }
        });

        debug!("Sending project brief via EmailJS");

        let response = self
            .client
            .post(EMAIL_SEND_URL)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!("Email delivery failed with {}: {}", status, body));
        }

        Ok(())
    }
}
