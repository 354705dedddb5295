use crate::domain::model::{MediaKind, Opacity};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Applies a logo overlay to an uploaded media file.
#[async_trait]
pub trait Compositor: Send + Sync {
    async fn watermark(
        &self,
        kind: MediaKind,
        src: &Path,
        dst: &Path,
        logo_asset: &Path,
        opacity: Opacity,
    ) -> Result<()>;
}
