use crate::media::MediaDescriptor;
use anyhow::{anyhow, bail, Context, Result};
use image::RgbaImage;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Decoding capability the client relies on. Everything beyond reporting
/// metadata and producing a still frame stays outside this crate.
pub trait FrameSource: Send + Sync {
    fn probe(&self, path: &Path) -> Result<MediaDescriptor>;

    /// Decode the frame shown at `seconds`, at native resolution.
    fn frame_at(&self, path: &Path, seconds: f64) -> Result<RgbaImage>;
}

/// [`FrameSource`] backed by the `ffprobe` and `ffmpeg` executables.
#[derive(Debug, Clone)]
pub struct FfmpegSource {
    ffprobe: PathBuf,
    ffmpeg: PathBuf,
}

impl Default for FfmpegSource {
    fn default() -> Self {
        Self::new("ffprobe", "ffmpeg")
    }
}

impl FfmpegSource {
    pub fn new(ffprobe: impl Into<PathBuf>, ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            ffmpeg: ffmpeg.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

pub(crate) fn parse_probe_output(json: &str) -> Result<MediaDescriptor> {
    let probe: ProbeOutput = serde_json::from_str(json).context("parse ffprobe output")?;
    let stream = probe
        .streams
        .first()
        .ok_or_else(|| anyhow!("no video stream found"))?;
    let width = stream.width.unwrap_or(0);
    let height = stream.height.unwrap_or(0);
    // Containers usually carry the duration; fall back to the stream's own.
    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(stream.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .unwrap_or(0.0);
    MediaDescriptor::new(duration, width, height)
        .ok_or_else(|| anyhow!("invalid video dimensions {width}x{height}"))
}

impl FrameSource for FfmpegSource {
    fn probe(&self, path: &Path) -> Result<MediaDescriptor> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height,duration:format=duration",
                "-of",
                "json",
            ])
            .arg(path)
            .output()
            .with_context(|| format!("run {}", self.ffprobe.display()))?;
        if !output.status.success() {
            bail!(
                "ffprobe failed for {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    fn frame_at(&self, path: &Path, seconds: f64) -> Result<RgbaImage> {
        let output = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-ss"])
            .arg(format!("{:.3}", seconds.max(0.0)))
            .arg("-i")
            .arg(path)
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"])
            .output()
            .with_context(|| format!("run {}", self.ffmpeg.display()))?;
        if !output.status.success() || output.stdout.is_empty() {
            bail!(
                "ffmpeg produced no frame at {seconds:.3}s: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        let img = image::load_from_memory(&output.stdout).context("decode frame")?;
        Ok(img.to_rgba8())
    }
}
