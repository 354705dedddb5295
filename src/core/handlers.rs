use crate::core::donate::Wallets;
use crate::core::jobs::{JobStore, SelectOutcome};
use crate::domain::model::{CustomOpacityError, Job, Logo, MediaKind, Opacity};
use crate::domain::ports::Compositor;
use crate::telegram::api::Bot;
use crate::telegram::types::{
    CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message, Update,
};
use crate::utils::error::{BotError, Result};
use std::path::PathBuf;
use uuid::Uuid;

const START_TEXT: &str = "Welcome to $Ford Logo Bot 👋\n\n\
Send me an *image (≤2MB)* or *video (≤20MB)*.\n\
Then pick a logo and an opacity for THIS file. I'll return the watermarked result (down-center).";

const HELP_TEXT: &str = "How it works:\n\
1) Send photo/video.\n\
2) Choose logo.\n\
3) Choose opacity (40/60/80% or Custom).\n\
I'll send the result.\n\n\
Limits: images ≤ 2MB, videos ≤ 20MB.";

pub(crate) const EXPIRED_TEXT: &str = "This job expired. Please resend the file.";

/// Everything a handler needs, shared across update tasks.
pub struct App<C: Compositor> {
    pub bot: Bot,
    pub jobs: JobStore,
    pub compositor: C,
    pub wallets: Wallets,
    pub assets_dir: PathBuf,
    pub tmp_dir: PathBuf,
}

/// Media attachment pulled out of an incoming message.
struct MediaRef {
    kind: MediaKind,
    file_id: String,
    file_size: Option<u64>,
}

fn classify_media(msg: &Message) -> Option<MediaRef> {
    if let Some(photos) = &msg.photo {
        // size variants arrive smallest first; take the largest
        if let Some(best) = photos.last() {
            return Some(MediaRef {
                kind: MediaKind::Image,
                file_id: best.file_id.clone(),
                file_size: best.file_size,
            });
        }
    }
    if let Some(doc) = &msg.document {
        let is_image = doc
            .mime_type
            .as_deref()
            .map(|m| m.starts_with("image/"))
            .unwrap_or(false);
        if is_image {
            return Some(MediaRef {
                kind: MediaKind::Image,
                file_id: doc.file_id.clone(),
                file_size: doc.file_size,
            });
        }
    }
    if let Some(video) = &msg.video {
        return Some(MediaRef {
            kind: MediaKind::Video,
            file_id: video.file_id.clone(),
            file_size: video.file_size,
        });
    }
    if let Some(animation) = &msg.animation {
        return Some(MediaRef {
            kind: MediaKind::Video,
            file_id: animation.file_id.clone(),
            file_size: animation.file_size,
        });
    }
    None
}

fn logo_keyboard(job_id: Uuid) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![InlineKeyboardButton::callback(
                "Use Forward Industries",
                format!("job:{}:logo:forward", job_id),
            )],
            vec![InlineKeyboardButton::callback(
                "Use $FORD",
                format!("job:{}:logo:ford", job_id),
            )],
            vec![InlineKeyboardButton::callback(
                "Cancel",
                format!("job:{}:cancel", job_id),
            )],
        ],
    }
}

fn opacity_keyboard(job_id: Uuid) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![
                InlineKeyboardButton::callback("40%", format!("job:{}:op:40", job_id)),
                InlineKeyboardButton::callback("60%", format!("job:{}:op:60", job_id)),
                InlineKeyboardButton::callback("80%", format!("job:{}:op:80", job_id)),
            ],
            vec![InlineKeyboardButton::callback(
                "Custom…",
                format!("job:{}:op:custom", job_id),
            )],
            vec![InlineKeyboardButton::callback(
                "Cancel",
                format!("job:{}:cancel", job_id),
            )],
        ],
    }
}

impl<C: Compositor> App<C> {
    pub async fn handle_update(&self, update: Update) -> Result<()> {
        if let Some(message) = update.message {
            self.handle_message(message).await
        } else if let Some(callback) = update.callback_query {
            self.handle_callback(callback).await
        } else {
            Ok(())
        }
    }

    async fn handle_message(&self, msg: Message) -> Result<()> {
        if let Some(media) = classify_media(&msg) {
            return self.handle_media(&msg, media).await;
        }
        match msg.text.as_deref() {
            Some(text) if text.starts_with("/start") => {
                self.bot
                    .send_message(msg.chat.id, START_TEXT, true, None)
                    .await?;
                Ok(())
            }
            Some(text) if text.starts_with("/help") => {
                self.bot
                    .send_message(msg.chat.id, HELP_TEXT, false, None)
                    .await?;
                Ok(())
            }
            Some(text) if text.starts_with("/donate") => self.on_donate(&msg).await,
            Some(_) => self.on_text(&msg).await,
            None => Ok(()),
        }
    }

    async fn on_donate(&self, msg: &Message) -> Result<()> {
        if self.wallets.is_empty() {
            self.bot
                .send_message(msg.chat.id, "Donations are currently unavailable.", false, None)
                .await?;
            return Ok(());
        }
        let keyboard = self.wallets.keyboard();
        self.bot
            .send_message(
                msg.chat.id,
                "Choose a crypto to donate:",
                false,
                Some(&keyboard),
            )
            .await?;
        Ok(())
    }

    async fn handle_media(&self, msg: &Message, media: MediaRef) -> Result<()> {
        self.jobs.sweep_expired().await;

        if media
            .file_size
            .map(|size| size > media.kind.max_size())
            .unwrap_or(false)
        {
            tracing::info!(
                "rejecting oversize {:?} upload ({:?} bytes)",
                media.kind,
                media.file_size
            );
            self.bot
                .send_message(msg.chat.id, media.kind.reject_message(), false, None)
                .await?;
            return Ok(());
        }

        let user_id = match &msg.from {
            Some(user) => user.id,
            None => return Ok(()),
        };

        let file = self.bot.get_file(&media.file_id).await?;
        let file_path = file.file_path.ok_or_else(|| BotError::Api {
            description: "getFile returned no file_path".to_string(),
        })?;

        let job = Job::new(user_id, msg.chat.id, media.kind, &self.tmp_dir);
        self.bot.download_file(&file_path, &job.src).await?;
        tracing::info!("job {} accepted ({:?})", job.id, media.kind);

        let prompt = match media.kind {
            MediaKind::Image => "Choose the watermark for this image:",
            MediaKind::Video => "Choose the watermark for this video:",
        };
        let keyboard = logo_keyboard(job.id);
        self.jobs.insert(job).await;
        self.bot
            .send_message(msg.chat.id, prompt, false, Some(&keyboard))
            .await?;
        Ok(())
    }

    async fn handle_callback(&self, cb: CallbackQuery) -> Result<()> {
        let data = cb.data.clone().unwrap_or_default();
        if let Some(coin) = data.strip_prefix("donate:") {
            return self.on_donate_coin(&cb, coin).await;
        }
        if data.starts_with("job:") {
            return self.on_job_callback(&cb, &data).await;
        }
        self.alert(&cb, "Unknown action.").await
    }

    async fn on_donate_coin(&self, cb: &CallbackQuery, coin: &str) -> Result<()> {
        let Some(addr) = self.wallets.address(coin) else {
            return self.alert(cb, "Unavailable").await;
        };
        let Some(anchor) = &cb.message else {
            return self.ack(cb).await;
        };

        let payload = crate::core::donate::qr_payload(coin, addr);
        let png = crate::core::donate::qr_png(&payload)?;
        let file_name = format!("{}_donate.png", coin.replace(' ', "_"));
        let caption = crate::core::donate::donation_caption(coin, addr);

        self.bot
            .send_photo_bytes(anchor.chat.id, &file_name, png, &caption, true)
            .await?;
        self.ack(cb).await
    }

    async fn on_job_callback(&self, cb: &CallbackQuery, data: &str) -> Result<()> {
        let parts: Vec<&str> = data.split(':').collect();
        if parts.len() < 3 {
            return self.alert(cb, "Bad request").await;
        }
        let Ok(job_id) = Uuid::parse_str(parts[1]) else {
            return self.alert(cb, "Bad request").await;
        };
        let section = parts[2];
        let value = parts.get(3).copied();
        let anchor = cb.message.as_ref();

        if section == "cancel" {
            self.jobs.cancel(job_id).await;
            if let Some(m) = anchor {
                let _ = self
                    .bot
                    .edit_message_text(m.chat.id, m.message_id, "✖️ Canceled.", false, None)
                    .await;
            }
            return self.ack(cb).await;
        }

        match section {
            "logo" => {
                let Some(logo) = value.and_then(Logo::from_key) else {
                    return self.alert(cb, "Unknown logo.").await;
                };
                match self.jobs.set_logo(job_id, cb.from.id, logo).await {
                    SelectOutcome::Ok => {
                        if let Some(m) = anchor {
                            let text =
                                format!("Logo set to **{}**.\nNow choose opacity:", logo.label());
                            self.bot
                                .edit_message_text(
                                    m.chat.id,
                                    m.message_id,
                                    &text,
                                    true,
                                    Some(&opacity_keyboard(job_id)),
                                )
                                .await?;
                        }
                        self.ack(cb).await
                    }
                    SelectOutcome::Expired => self.alert(cb, EXPIRED_TEXT).await,
                    SelectOutcome::NotOwner => self.alert(cb, "Not your job.").await,
                }
            }
            "op" => match value {
                Some(v @ ("40" | "60" | "80")) => {
                    let Some(opacity) = Opacity::from_preset(v) else {
                        return self.alert(cb, "Unknown action.").await;
                    };
                    match self.jobs.set_opacity(job_id, cb.from.id, opacity).await {
                        SelectOutcome::Ok => {
                            self.toast(cb, "Opacity set.").await?;
                            self.process(job_id, anchor).await
                        }
                        SelectOutcome::Expired => self.alert(cb, EXPIRED_TEXT).await,
                        SelectOutcome::NotOwner => self.alert(cb, "Not your job.").await,
                    }
                }
                Some("custom") => match self.jobs.begin_custom(job_id, cb.from.id).await {
                    SelectOutcome::Ok => {
                        if let Some(m) = anchor {
                            self.bot
                                .edit_message_text(
                                    m.chat.id,
                                    m.message_id,
                                    "Send a number between **10** and **100** for opacity (e.g., `65` or `65%`).",
                                    true,
                                    None,
                                )
                                .await?;
                        }
                        self.ack(cb).await
                    }
                    SelectOutcome::Expired => self.alert(cb, EXPIRED_TEXT).await,
                    SelectOutcome::NotOwner => self.alert(cb, "Not your job.").await,
                },
                _ => self.alert(cb, "Unknown action.").await,
            },
            _ => self.alert(cb, "Unknown action.").await,
        }
    }

    /// Custom opacity numbers; any other free text is ignored.
    async fn on_text(&self, msg: &Message) -> Result<()> {
        let Some(user) = &msg.from else {
            return Ok(());
        };
        let Some(job_id) = self.jobs.waiting_job(user.id).await else {
            return Ok(());
        };
        if !self.jobs.contains(job_id).await {
            self.jobs.clear_waiting(user.id).await;
            return Ok(());
        }

        let text = msg.text.as_deref().unwrap_or_default();
        match Opacity::parse_custom(text) {
            Ok(opacity) => {
                // waiting state clears only once a valid number arrives
                self.jobs.clear_waiting(user.id).await;
                match self.jobs.set_opacity(job_id, user.id, opacity).await {
                    SelectOutcome::Ok => self.process(job_id, None).await,
                    _ => Ok(()),
                }
            }
            Err(CustomOpacityError::NotANumber) => {
                self.bot
                    .send_message(
                        msg.chat.id,
                        "Please send a number like `65` or `65%` (between 10 and 100).",
                        true,
                        None,
                    )
                    .await?;
                Ok(())
            }
            Err(CustomOpacityError::OutOfRange) => {
                self.bot
                    .send_message(
                        msg.chat.id,
                        "Please choose a value between **10** and **100**.",
                        true,
                        None,
                    )
                    .await?;
                Ok(())
            }
        }
    }

    async fn alert(&self, cb: &CallbackQuery, text: &str) -> Result<()> {
        self.bot
            .answer_callback_query(&cb.id, Some(text), true)
            .await?;
        Ok(())
    }

    async fn toast(&self, cb: &CallbackQuery, text: &str) -> Result<()> {
        self.bot
            .answer_callback_query(&cb.id, Some(text), false)
            .await?;
        Ok(())
    }

    async fn ack(&self, cb: &CallbackQuery) -> Result<()> {
        self.bot.answer_callback_query(&cb.id, None, false).await?;
        Ok(())
    }
}
