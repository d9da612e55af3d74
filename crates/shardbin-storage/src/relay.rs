//! Bot-relay adapter.
//!
//! Commits a file by posting it to a bot-messaging API (Telegram Bot API
//! shape) and using the returned media file id as the durable reference.
//! Routing picks the endpoint from the declared content type; a rejected
//! photo submission gets exactly one fallback attempt as a generic document,
//! which recovers from the remote service's stricter photo-format validation.

use crate::traits::{AssembledFile, CommittedFile, StorageError, StorageResult};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use shardbin_core::StorageBackend;
use std::time::Duration;

/// Media endpoint of the remote messaging API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelayEndpoint {
    Photo,
    Audio,
    Video,
    Document,
}

impl RelayEndpoint {
    fn for_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            RelayEndpoint::Photo
        } else if content_type.starts_with("audio/") {
            RelayEndpoint::Audio
        } else if content_type.starts_with("video/") {
            RelayEndpoint::Video
        } else {
            RelayEndpoint::Document
        }
    }

    fn method(&self) -> &'static str {
        match self {
            RelayEndpoint::Photo => "sendPhoto",
            RelayEndpoint::Audio => "sendAudio",
            RelayEndpoint::Video => "sendVideo",
            RelayEndpoint::Document => "sendDocument",
        }
    }

    /// Multipart field carrying the file bytes.
    fn field(&self) -> &'static str {
        match self {
            RelayEndpoint::Photo => "photo",
            RelayEndpoint::Audio => "audio",
            RelayEndpoint::Video => "video",
            RelayEndpoint::Document => "document",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
    result: Option<RelayMessage>,
}

#[derive(Debug, Deserialize)]
struct RelayMessage {
    message_id: i64,
    photo: Option<Vec<PhotoSize>>,
    document: Option<MediaRef>,
    video: Option<MediaRef>,
    audio: Option<MediaRef>,
}

#[derive(Debug, Deserialize)]
struct PhotoSize {
    file_id: String,
    file_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct MediaRef {
    file_id: String,
}

/// Outcome of one endpoint call: the API either accepted the media or
/// rejected it with a reason. Transport failures are surfaced as errors.
enum SendOutcome {
    Accepted(RelayMessage),
    Rejected(String),
}

/// Bot-messaging backend adapter.
#[derive(Clone)]
pub struct BotRelay {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl BotRelay {
    pub fn new(
        bot_token: String,
        chat_id: String,
        api_base: String,
        timeout: Duration,
    ) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(BotRelay {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
        })
    }

    /// Post the file to the routed endpoint; on photo rejection, retry once
    /// as a generic document before giving up.
    pub async fn commit(&self, file: &AssembledFile) -> StorageResult<CommittedFile> {
        let endpoint = RelayEndpoint::for_content_type(&file.content_type);

        match self.send(endpoint, file).await? {
            SendOutcome::Accepted(message) => self.committed(file, &message),
            SendOutcome::Rejected(reason) if endpoint == RelayEndpoint::Photo => {
                tracing::warn!(
                    reason = %reason,
                    file_name = %file.file_name,
                    "Photo submission rejected, retrying as document"
                );
                match self.send(RelayEndpoint::Document, file).await? {
                    SendOutcome::Accepted(message) => self.committed(file, &message),
                    SendOutcome::Rejected(fallback_reason) => Err(StorageError::UploadFailed(
                        format!(
                            "photo rejected ({}), document fallback rejected ({})",
                            reason, fallback_reason
                        ),
                    )),
                }
            }
            SendOutcome::Rejected(reason) => Err(StorageError::UploadFailed(reason)),
        }
    }

    fn committed(
        &self,
        file: &AssembledFile,
        message: &RelayMessage,
    ) -> StorageResult<CommittedFile> {
        let file_id = extract_file_id(message).ok_or_else(|| {
            StorageError::UploadFailed("relay response carried no media file id".to_string())
        })?;

        tracing::info!(
            message_id = message.message_id,
            file_name = %file.file_name,
            size_bytes = file.data.len(),
            "Relay upload successful"
        );

        Ok(CommittedFile {
            file_key: format!("{}.{}", file_id, file.extension()),
            backend: StorageBackend::Relay,
            blob_key: None,
            relay_message_id: Some(message.message_id),
        })
    }

    async fn send(
        &self,
        endpoint: RelayEndpoint,
        file: &AssembledFile,
    ) -> StorageResult<SendOutcome> {
        let url = format!(
            "{}/bot{}/{}",
            self.api_base,
            self.bot_token,
            endpoint.method()
        );

        let part = Part::bytes(file.data.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| StorageError::UploadFailed(format!("invalid content type: {}", e)))?;
        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .part(endpoint.field(), part);

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    method = endpoint.method(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Relay transport failure"
                );
                StorageError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        let body: ApiResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(StorageError::UploadFailed(format!(
                    "unreadable relay response: {}",
                    e
                )));
            }
            Err(_) => {
                return Ok(SendOutcome::Rejected(format!(
                    "relay returned status {}",
                    status
                )));
            }
        };

        if status.is_success() && body.ok {
            match body.result {
                Some(message) => Ok(SendOutcome::Accepted(message)),
                None => Err(StorageError::UploadFailed(
                    "relay response missing result".to_string(),
                )),
            }
        } else {
            Ok(SendOutcome::Rejected(
                body.description
                    .unwrap_or_else(|| format!("relay returned status {}", status)),
            ))
        }
    }
}

/// File id from the richest media descriptor in the response. Photo
/// responses carry multiple resolutions; pick the largest by byte size.
fn extract_file_id(message: &RelayMessage) -> Option<String> {
    if let Some(photo) = &message.photo {
        return photo
            .iter()
            .max_by_key(|p| p.file_size.unwrap_or(0))
            .map(|p| p.file_id.clone());
    }
    if let Some(document) = &message.document {
        return Some(document.file_id.clone());
    }
    if let Some(video) = &message.video {
        return Some(video.file_id.clone());
    }
    if let Some(audio) = &message.audio {
        return Some(audio.file_id.clone());
    }
    None
}
