use crate::core::handlers::{App, EXPIRED_TEXT};
use crate::core::jobs::remove_file_quiet;
use crate::domain::model::MediaKind;
use crate::domain::ports::Compositor;
use crate::telegram::types::Message;
use crate::utils::error::{BotError, Result};
use uuid::Uuid;

impl<C: Compositor> App<C> {
    /// Run a ready job end to end: composite, send the result, clean up.
    /// `anchor` is the keyboard message edited with progress text, when the
    /// flow still has one (preset opacity path).
    pub(crate) async fn process(&self, job_id: Uuid, anchor: Option<&Message>) -> Result<()> {
        let Some(job) = self.jobs.take_ready(job_id).await else {
            if let Some(m) = anchor {
                let _ = self
                    .bot
                    .edit_message_text(m.chat.id, m.message_id, EXPIRED_TEXT, false, None)
                    .await;
            }
            return Ok(());
        };
        // take_ready only releases fully selected jobs
        let (Some(logo), Some(opacity)) = (job.logo, job.opacity) else {
            return Ok(());
        };

        if let Some(m) = anchor {
            let _ = self
                .bot
                .edit_message_text(m.chat.id, m.message_id, "⏳ Processing…", false, None)
                .await;
        }

        let dst = self
            .tmp_dir
            .join(format!("{}.{}", Uuid::new_v4(), job.kind.output_ext()));
        let logo_asset = logo.resolve_asset(&self.assets_dir);

        tracing::info!(
            "processing job {} ({:?}, logo {}, opacity {}%)",
            job.id,
            job.kind,
            logo.key(),
            opacity.percent()
        );

        let result = async {
            self.compositor
                .watermark(job.kind, &job.src, &dst, &logo_asset, opacity)
                .await?;
            match job.kind {
                MediaKind::Image => {
                    self.bot
                        .send_photo(job.chat_id, &dst, "✅ Watermarked")
                        .await?;
                }
                MediaKind::Video => {
                    self.bot
                        .send_video(job.chat_id, &dst, "✅ Watermarked")
                        .await?;
                }
            }
            Ok::<(), BotError>(())
        }
        .await;

        if let Err(err) = result {
            tracing::error!("job {} failed: {}", job.id, err);
            if let Some(m) = anchor {
                let _ = self
                    .bot
                    .edit_message_text(m.chat.id, m.message_id, &err.user_message(), false, None)
                    .await;
            }
        }

        remove_file_quiet(&job.src);
        remove_file_quiet(&dst);
        Ok(())
    }
}
