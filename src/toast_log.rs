use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Append a timestamped notification line to `path`. Failures are ignored,
/// a missing log must never interrupt the UI.
pub fn append_toast_log(path: &Path, msg: &str) {
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{} - {}", Local::now().to_rfc3339(), msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn appends_one_line_per_notice() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notices.log");
        append_toast_log(&path, "Upload failed");
        append_toast_log(&path, "Subtitles extracted");
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - Upload failed"));
        assert!(lines[1].ends_with(" - Subtitles extracted"));
        let stamp = lines[0].split(" - ").next().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[test]
    fn unwritable_path_is_ignored() {
        let dir = tempdir().unwrap();
        append_toast_log(&dir.path().join("missing").join("x.log"), "ignored");
    }
}
