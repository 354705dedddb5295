use crate::core::image::composite_image;
use crate::core::video::composite_video;
use crate::domain::model::{MediaKind, Opacity};
use crate::domain::ports::Compositor;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Production compositor: images in-process, videos through ffmpeg.
#[derive(Debug, Default, Clone)]
pub struct MediaCompositor;

#[async_trait]
impl Compositor for MediaCompositor {
    async fn watermark(
        &self,
        kind: MediaKind,
        src: &Path,
        dst: &Path,
        logo_asset: &Path,
        opacity: Opacity,
    ) -> Result<()> {
        match kind {
            MediaKind::Image => {
                let src = src.to_path_buf();
                let dst = dst.to_path_buf();
                let logo = logo_asset.to_path_buf();
                tokio::task::spawn_blocking(move || composite_image(&src, &dst, &logo, opacity))
                    .await?
            }
            MediaKind::Video => composite_video(src, dst, logo_asset, opacity).await,
        }
    }
}
