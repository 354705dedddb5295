use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Telegram API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {description}")]
    Api { description: String },

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("ffmpeg exited with status {status}: {stderr}")]
    Ffmpeg { status: i32, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Missing configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl BotError {
    /// Short reply text shown in chat when a job fails.
    pub fn user_message(&self) -> String {
        match self {
            BotError::Ffmpeg { .. } => {
                "FFmpeg failed on this video. Try a smaller/standard MP4.".to_string()
            }
            BotError::Image(_) => {
                "Could not read this image. Try a standard JPEG or PNG.".to_string()
            }
            other => format!("Processing error: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
