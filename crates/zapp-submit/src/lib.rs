//! zapp-submit — Multipart HTTP submission of a finished observation.
//! The server expects one POST with the observation JSON, an optional
//! image, and form-auth credentials; the response body is surfaced
//! verbatim with no retry or structured parsing.

use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use zapp_common::{config::SubmissionConfig, CappedClient, Result, ZappError};
use zapp_model::{Observation, ValidationOptions};

/// Form-auth credentials sent as plain multipart fields, matching the
/// server's auth scheme. The password stays wrapped until the request is
/// built.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// The raw image selected for upload, with its original filename and
/// mime type preserved.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// What came back from the server: status and body, verbatim.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub status: u16,
    pub body: String,
    pub submitted_at: DateTime<Utc>,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct SubmitClient {
    client: CappedClient,
    config: SubmissionConfig,
    opts: ValidationOptions,
}

impl SubmitClient {
    pub fn new(client: CappedClient, config: SubmissionConfig, opts: ValidationOptions) -> Self {
        Self {
            client,
            config,
            opts,
        }
    }

    /// Serializes the multipart body: `data` (the observation JSON),
    /// optional `image`, and the credential fields.
    fn build_form(
        &self,
        observation: &Observation,
        image: Option<&ImageAttachment>,
        credentials: &Credentials,
    ) -> Result<Form> {
        let json = serde_json::to_vec(observation)?;
        let data = Part::bytes(json)
            .file_name("observation.json")
            .mime_str("application/json")?;
        let mut form = Form::new().part("data", data);

        if let Some(image) = image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.name.clone())
                .mime_str(&image.mime_type)?;
            form = form.part("image", part);
        }

        Ok(form
            .text("username", credentials.username.clone())
            .text("password", credentials.password.expose_secret().to_string()))
    }

    /// Submits the observation snapshot. Invalid data never leaves the
    /// client; an oversized image is refused before the request is built.
    #[instrument(skip_all)]
    pub async fn submit(
        &self,
        observation: &Observation,
        image: Option<&ImageAttachment>,
        credentials: &Credentials,
    ) -> Result<SubmitOutcome> {
        let report = observation.validate(&self.opts);
        if !report.is_valid() {
            for (path, message) in report.iter() {
                warn!(%path, %message, "refusing to submit invalid observation");
            }
            return Err(ZappError::InvalidObservation(report.len()));
        }

        if let Some(image) = image {
            if image.bytes.len() as u64 > self.config.max_image_bytes {
                return Err(ZappError::Submission(format!(
                    "image {} exceeds the {} byte upload limit",
                    image.name, self.config.max_image_bytes
                )));
            }
        }

        let form = self.build_form(observation, image, credentials)?;
        debug!(endpoint = %self.config.endpoint, "submitting observation");
        let response = self
            .client
            .post(&self.config.endpoint)?
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, "submission response received");
        Ok(SubmitOutcome {
            status,
            body,
            submitted_at: Utc::now(),
        })
    }
}
