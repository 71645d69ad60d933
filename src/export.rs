use crate::remote::UploadHandle;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub const FALLBACK_BASE_NAME: &str = "subtitle";
pub const EXPORT_EXTENSION: &str = "srt";

#[derive(Debug)]
pub enum ExportError {
    /// The platform refused access (clipboard or target directory).
    Permission(String),
    Io(io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Permission(msg) => write!(f, "permission denied: {msg}"),
            ExportError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(e) => Some(e),
            ExportError::Permission(_) => None,
        }
    }
}

impl From<io::Error> for ExportError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::PermissionDenied {
            ExportError::Permission(e.to_string())
        } else {
            ExportError::Io(e)
        }
    }
}

/// Suggested file stem for an exported result: the asset handle without its
/// final extension.
pub fn export_base_name(handle: Option<&UploadHandle>) -> String {
    let Some(handle) = handle else {
        return FALLBACK_BASE_NAME.to_string();
    };
    let name = handle.as_str();
    // handles are server-chosen; keep only the last path component
    let name = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let stem = match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
    .trim();
    if stem.is_empty() {
        FALLBACK_BASE_NAME.to_string()
    } else {
        stem.to_string()
    }
}

/// File name the result is saved under.
pub fn export_file_name(base: &str) -> String {
    format!("{base}.{EXPORT_EXTENSION}")
}

/// Write `text` byte for byte to `<dir>/<base>.srt`, replacing any existing
/// file. Returns the written path.
pub fn export_as_file(text: &str, base: &str, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_file_name(base));
    write_export(text, &path)?;
    Ok(path)
}

/// Write `text` to an explicit path chosen by the user.
pub fn write_export(text: &str, path: &Path) -> Result<(), ExportError> {
    match std::fs::write(path, text.as_bytes()) {
        Ok(()) => {
            tracing::info!(path = %path.display(), bytes = text.len(), "result exported");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "export failed");
            Err(e.into())
        }
    }
}

/// Destination for clipboard writes.
pub trait ClipboardWriter {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()>;
}

/// The system clipboard.
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
        let mut cb = arboard::Clipboard::new()?;
        cb.set_text(text.to_string())?;
        Ok(())
    }
}

/// Copy `text` verbatim. Clipboard failures are reported as
/// [`ExportError::Permission`] so the caller can show a notice and carry on.
pub fn copy_to_clipboard(text: &str, clipboard: &mut dyn ClipboardWriter) -> Result<(), ExportError> {
    match clipboard.set_text(text) {
        Ok(()) => {
            tracing::info!(bytes = text.len(), "result copied to clipboard");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "clipboard write failed");
            Err(ExportError::Permission(format!("clipboard unavailable: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Default)]
    struct MemoryClipboard {
        text: Option<String>,
        deny: bool,
    }

    impl ClipboardWriter for MemoryClipboard {
        fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
            if self.deny {
                anyhow::bail!("access denied");
            }
            self.text = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn base_name_strips_last_extension() {
        let h = |s: &str| UploadHandle::new(s);
        assert_eq!(export_base_name(Some(&h("abc123.mp4"))), "abc123");
        assert_eq!(export_base_name(Some(&h("movie.final.mkv"))), "movie.final");
        assert_eq!(export_base_name(Some(&h("noext"))), "noext");
        assert_eq!(export_base_name(Some(&h(".hidden"))), "subtitle");
        assert_eq!(export_base_name(Some(&h("uploads/x.mp4"))), "x");
        assert_eq!(export_base_name(Some(&h(".mp4"))), "subtitle");
        assert_eq!(export_base_name(Some(&h("dir.v2/clip"))), "clip");
        assert_eq!(export_base_name(Some(&h(""))), "subtitle");
        assert_eq!(export_base_name(None), "subtitle");
    }

    #[test]
    fn export_writes_bytes_verbatim() {
        let dir = tempdir().unwrap();
        let text = "1\r\n00:00:01,000 --> 00:00:02,000\r\nHéllo ✓\r\n\r\n";
        let path = export_as_file(text, "abc123", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("abc123.srt"));
        assert_eq!(std::fs::read(&path).unwrap(), text.as_bytes());
    }

    #[test]
    fn empty_text_still_exports() {
        let dir = tempdir().unwrap();
        let path = export_as_file("", "subtitle", dir.path()).unwrap();
        assert_eq!(std::fs::metadata(path).unwrap().len(), 0);
    }

    #[test]
    fn export_into_missing_dir_is_io_error() {
        let dir = tempdir().unwrap();
        let err = export_as_file("x", "a", &dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }

    #[test]
    fn clipboard_receives_exact_text() {
        let mut cb = MemoryClipboard::default();
        copy_to_clipboard("line one\nline two", &mut cb).unwrap();
        assert_eq!(cb.text.as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn denied_clipboard_is_permission_error() {
        let mut cb = MemoryClipboard {
            deny: true,
            ..Default::default()
        };
        let err = copy_to_clipboard("x", &mut cb).unwrap_err();
        assert!(matches!(err, ExportError::Permission(_)));
        assert!(err.to_string().contains("access denied"));
    }
}
