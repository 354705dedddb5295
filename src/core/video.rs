use crate::domain::model::Opacity;
use crate::utils::error::{BotError, Result};
use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;

/// ffmpeg filter graph: scale the logo to 20% of the video width, apply the
/// chosen alpha, overlay bottom-center 20px above the edge.
pub fn overlay_filter(opacity: Opacity) -> String {
    format!(
        "[1][0]scale2ref=w=iw*0.20:h=oh*0.20[wm][v];\
         [wm]format=rgba,colorchannelmixer=aa={:.2}[wmf];\
         [v][wmf]overlay=(main_w-overlay_w)/2:main_h-overlay_h-20",
        opacity.fraction()
    )
}

/// Argument vector for the ffmpeg invocation. Video is re-encoded with
/// libx264; audio is stream-copied; faststart keeps the output playable
/// while still downloading.
pub fn ffmpeg_args(src: &Path, dst: &Path, logo: &Path, opacity: Opacity) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        src.into(),
        "-i".into(),
        logo.into(),
        "-filter_complex".into(),
        overlay_filter(opacity).into(),
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        "veryfast".into(),
        "-crf".into(),
        "23".into(),
        "-c:a".into(),
        "copy".into(),
        "-movflags".into(),
        "+faststart".into(),
        dst.into(),
    ]
}

pub async fn composite_video(src: &Path, dst: &Path, logo: &Path, opacity: Opacity) -> Result<()> {
    let args = ffmpeg_args(src, dst, logo, opacity);
    tracing::debug!("running ffmpeg for {}", src.display());

    let output = Command::new("ffmpeg").args(&args).output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.lines().collect();
        let tail = lines[lines.len().saturating_sub(5)..].join("\n");
        return Err(BotError::Ffmpeg {
            status: output.status.code().unwrap_or(-1),
            stderr: tail,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_overlay_filter_encodes_opacity() {
        let filter = overlay_filter(Opacity::from_percent(60.0));
        assert!(filter.contains("colorchannelmixer=aa=0.60"));
        assert!(filter.contains("scale2ref=w=iw*0.20"));
        assert!(filter.contains("overlay=(main_w-overlay_w)/2:main_h-overlay_h-20"));
    }

    #[test]
    fn test_ffmpeg_args_shape() {
        let src = PathBuf::from("/tmp/in.mp4");
        let dst = PathBuf::from("/tmp/out.mp4");
        let logo = PathBuf::from("/app/assets/ford.png");
        let args = ffmpeg_args(&src, &dst, &logo, Opacity::from_percent(80.0));

        let strings: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        assert_eq!(strings[0], "-y");
        assert_eq!(strings[1], "-i");
        assert_eq!(strings[2], "/tmp/in.mp4");
        assert_eq!(strings[4], "/app/assets/ford.png");
        assert!(strings.contains(&"libx264".to_string()));
        assert!(strings.contains(&"+faststart".to_string()));
        // audio is never re-encoded
        let copy_pos = strings.iter().position(|s| s == "-c:a").unwrap();
        assert_eq!(strings[copy_pos + 1], "copy");
        assert_eq!(strings.last().unwrap(), "/tmp/out.mp4");
    }
}
