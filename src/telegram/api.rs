use crate::telegram::types::{ApiResponse, File, InlineKeyboardMarkup, Message, Update};
use crate::utils::error::{BotError, Result};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;

/// Thin Telegram Bot API client.
///
/// `base` is normally `https://api.telegram.org`; tests point it at a local
/// mock server instead.
#[derive(Debug, Clone)]
pub struct Bot {
    client: reqwest::Client,
    base: String,
    token: String,
}

impl Bot {
    pub fn new(base: impl Into<String>, token: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            client: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base, self.token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T> {
        tracing::debug!("calling {}", method);
        let response = self
            .client
            .post(self.method_url(method))
            .json(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Api {
                description: format!("HTTP {}: {}", status, body),
            });
        }

        let envelope: ApiResponse<T> = response.json().await?;
        unwrap_envelope(envelope)
    }

    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markdown: bool,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message> {
        let mut params = json!({ "chat_id": chat_id, "text": text });
        if markdown {
            params["parse_mode"] = json!("Markdown");
        }
        if let Some(kb) = keyboard {
            params["reply_markup"] = serde_json::to_value(kb)?;
        }
        self.call("sendMessage", params).await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        markdown: bool,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message> {
        let mut params = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        if markdown {
            params["parse_mode"] = json!("Markdown");
        }
        if let Some(kb) = keyboard {
            params["reply_markup"] = serde_json::to_value(kb)?;
        }
        self.call("editMessageText", params).await
    }

    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<bool> {
        let mut params = json!({ "callback_query_id": callback_query_id });
        if let Some(text) = text {
            params["text"] = json!(text);
        }
        if show_alert {
            params["show_alert"] = json!(true);
        }
        self.call("answerCallbackQuery", params).await
    }

    pub async fn get_file(&self, file_id: &str) -> Result<File> {
        self.call("getFile", json!({ "file_id": file_id })).await
    }

    /// Fetch a file previously resolved with `get_file` into `dest`.
    pub async fn download_file(&self, file_path: &str, dest: &Path) -> Result<()> {
        let url = format!("{}/file/bot{}/{}", self.base, self.token, file_path);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(BotError::Api {
                description: format!("file download failed: HTTP {}", response.status()),
            });
        }
        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        tracing::debug!("downloaded {} bytes to {}", bytes.len(), dest.display());
        Ok(())
    }

    pub async fn send_photo(&self, chat_id: i64, path: &Path, caption: &str) -> Result<Message> {
        let (file_name, bytes) = read_upload(path).await?;
        self.send_media("sendPhoto", "photo", "image/jpeg", chat_id, file_name, bytes, caption, false)
            .await
    }

    pub async fn send_video(&self, chat_id: i64, path: &Path, caption: &str) -> Result<Message> {
        let (file_name, bytes) = read_upload(path).await?;
        self.send_media("sendVideo", "video", "video/mp4", chat_id, file_name, bytes, caption, false)
            .await
    }

    /// Upload in-memory PNG bytes as a photo (used for QR codes).
    pub async fn send_photo_bytes(
        &self,
        chat_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
        caption: &str,
        markdown: bool,
    ) -> Result<Message> {
        self.send_media(
            "sendPhoto",
            "photo",
            "image/png",
            chat_id,
            file_name.to_string(),
            bytes,
            caption,
            markdown,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn send_media(
        &self,
        method: &str,
        field: &'static str,
        mime: &str,
        chat_id: i64,
        file_name: String,
        bytes: Vec<u8>,
        caption: &str,
        markdown: bool,
    ) -> Result<Message> {
        tracing::debug!("uploading {} bytes via {}", bytes.len(), method);
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)?;
        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part(field, part);
        if markdown {
            form = form.text("parse_mode", "Markdown");
        }

        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Api {
                description: format!("HTTP {}: {}", status, body),
            });
        }

        let envelope: ApiResponse<Message> = response.json().await?;
        unwrap_envelope(envelope)
    }
}

fn unwrap_envelope<T>(envelope: ApiResponse<T>) -> Result<T> {
    if !envelope.ok {
        return Err(BotError::Api {
            description: envelope
                .description
                .unwrap_or_else(|| "unknown error".to_string()),
        });
    }
    envelope.result.ok_or_else(|| BotError::Api {
        description: "missing result in response".to_string(),
    })
}

async fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload.bin".to_string());
    let bytes = tokio::fs::read(path).await?;
    Ok((file_name, bytes))
}
