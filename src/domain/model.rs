use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Maximum accepted image upload size (2 MiB).
pub const IMG_MAX: u64 = 2 * 1024 * 1024;
/// Maximum accepted video upload size (20 MiB).
pub const VID_MAX: u64 = 20 * 1024 * 1024;
/// Pending jobs expire this long after the upload.
pub const JOB_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn max_size(self) -> u64 {
        match self {
            MediaKind::Image => IMG_MAX,
            MediaKind::Video => VID_MAX,
        }
    }

    /// Extension for the downloaded source temp file.
    pub fn src_ext(self) -> &'static str {
        match self {
            MediaKind::Image => "img",
            MediaKind::Video => "mp4",
        }
    }

    /// Extension for the watermarked output file.
    pub fn output_ext(self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }

    pub fn reject_message(self) -> &'static str {
        match self {
            MediaKind::Image => "❌ Image too large (limit 2MB). Please send a smaller file.",
            MediaKind::Video => "❌ Video too large (limit 20MB). Please send a smaller file.",
        }
    }
}

/// The fixed set of logo overlays shipped with the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logo {
    Forward,
    Ford,
}

impl Logo {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "forward" => Some(Logo::Forward),
            "ford" => Some(Logo::Ford),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Logo::Forward => "forward",
            Logo::Ford => "ford",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Logo::Forward => "Forward Industries",
            Logo::Ford => "$FORD",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Logo::Forward => "forward.png",
            Logo::Ford => "ford.png",
        }
    }

    /// Resolve the asset path, falling back to the Forward asset when the
    /// requested file is missing on disk.
    pub fn resolve_asset(self, assets_dir: &Path) -> PathBuf {
        let path = assets_dir.join(self.file_name());
        if path.exists() {
            path
        } else {
            assets_dir.join(Logo::Forward.file_name())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomOpacityError {
    NotANumber,
    OutOfRange,
}

/// Watermark opacity as a percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opacity(f32);

static CUSTOM_RE: OnceLock<Regex> = OnceLock::new();

fn custom_re() -> &'static Regex {
    CUSTOM_RE.get_or_init(|| Regex::new(r"(\d{1,3})").expect("literal regex"))
}

impl Opacity {
    pub fn from_percent(pct: f32) -> Self {
        Self(pct.clamp(0.0, 100.0))
    }

    /// One of the preset keyboard values.
    pub fn from_preset(value: &str) -> Option<Self> {
        match value {
            "40" => Some(Self(40.0)),
            "60" => Some(Self(60.0)),
            "80" => Some(Self(80.0)),
            _ => None,
        }
    }

    /// Parse a user-typed custom value like `65` or `65%`. Accepted range is
    /// 10..=100; anything else is rejected rather than clamped.
    pub fn parse_custom(text: &str) -> std::result::Result<Self, CustomOpacityError> {
        let caps = custom_re()
            .captures(text.trim())
            .ok_or(CustomOpacityError::NotANumber)?;
        let value: u32 = caps[1].parse().map_err(|_| CustomOpacityError::NotANumber)?;
        if !(10..=100).contains(&value) {
            return Err(CustomOpacityError::OutOfRange);
        }
        Ok(Self(value as f32))
    }

    pub fn percent(self) -> f32 {
        self.0
    }

    /// Pixel alpha for in-process image compositing.
    pub fn alpha255(self) -> u8 {
        (255.0 * (self.0 / 100.0)).round() as u8
    }

    /// 0.0..=1.0 factor for the ffmpeg colorchannelmixer filter.
    pub fn fraction(self) -> f32 {
        (self.0 / 100.0).clamp(0.0, 1.0)
    }
}

/// One upload interaction: the file on disk plus the user's selections.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub user_id: i64,
    pub chat_id: i64,
    pub kind: MediaKind,
    pub src: PathBuf,
    pub created_at: Instant,
    pub logo: Option<Logo>,
    pub opacity: Option<Opacity>,
}

impl Job {
    pub fn new(user_id: i64, chat_id: i64, kind: MediaKind, tmp_dir: &Path) -> Self {
        let id = Uuid::new_v4();
        let src = tmp_dir.join(format!("{}.{}", id, kind.src_ext()));
        Self {
            id,
            user_id,
            chat_id,
            kind,
            src,
            created_at: Instant::now(),
            logo: None,
            opacity: None,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) > JOB_TTL
    }

    pub fn is_ready(&self) -> bool {
        self.logo.is_some() && self.opacity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_limits() {
        assert_eq!(MediaKind::Image.max_size(), 2 * 1024 * 1024);
        assert_eq!(MediaKind::Video.max_size(), 20 * 1024 * 1024);
        assert!(MediaKind::Image.reject_message().contains("2MB"));
        assert!(MediaKind::Video.reject_message().contains("20MB"));
    }

    #[test]
    fn test_logo_keys_round_trip() {
        assert_eq!(Logo::from_key("forward"), Some(Logo::Forward));
        assert_eq!(Logo::from_key("ford"), Some(Logo::Ford));
        assert_eq!(Logo::from_key("tesla"), None);
        assert_eq!(Logo::Forward.key(), "forward");
    }

    #[test]
    fn test_logo_missing_asset_falls_back_to_forward() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(
            Logo::Ford.resolve_asset(dir.path()),
            dir.path().join("forward.png")
        );

        std::fs::write(dir.path().join("ford.png"), b"png").unwrap();
        assert_eq!(
            Logo::Ford.resolve_asset(dir.path()),
            dir.path().join("ford.png")
        );
    }

    #[test]
    fn test_opacity_presets() {
        assert_eq!(Opacity::from_preset("40").unwrap().percent(), 40.0);
        assert_eq!(Opacity::from_preset("60").unwrap().percent(), 60.0);
        assert_eq!(Opacity::from_preset("80").unwrap().percent(), 80.0);
        assert!(Opacity::from_preset("99").is_none());
    }

    #[test]
    fn test_opacity_parse_custom_accepts_percent_suffix() {
        assert_eq!(Opacity::parse_custom("65").unwrap().percent(), 65.0);
        assert_eq!(Opacity::parse_custom("65%").unwrap().percent(), 65.0);
        assert_eq!(Opacity::parse_custom("  30 ").unwrap().percent(), 30.0);
    }

    #[test]
    fn test_opacity_parse_custom_rejects_out_of_range() {
        assert_eq!(
            Opacity::parse_custom("5"),
            Err(CustomOpacityError::OutOfRange)
        );
        assert_eq!(
            Opacity::parse_custom("101"),
            Err(CustomOpacityError::OutOfRange)
        );
        assert_eq!(
            Opacity::parse_custom("lots"),
            Err(CustomOpacityError::NotANumber)
        );
    }

    #[test]
    fn test_opacity_conversions() {
        assert_eq!(Opacity::from_percent(100.0).alpha255(), 255);
        assert_eq!(Opacity::from_percent(0.0).alpha255(), 0);
        assert_eq!(Opacity::from_percent(40.0).alpha255(), 102);
        assert!((Opacity::from_percent(60.0).fraction() - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_job_expiry() {
        let dir = tempfile::TempDir::new().unwrap();
        let job = Job::new(1, 1, MediaKind::Image, dir.path());
        let now = Instant::now();
        assert!(!job.is_expired(now));
        assert!(job.is_expired(now + JOB_TTL + Duration::from_secs(1)));
    }
}
