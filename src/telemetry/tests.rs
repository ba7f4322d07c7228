//! Tests for telemetry module

use super::*;
use crate::config::LogConfig;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use tracing::{debug, error, info, warn};
use tracing_subscriber::fmt::MakeWriter;

/// In-memory writer for asserting on log output
#[derive(Debug, Clone, Default)]
pub(crate) struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub(crate) fn sink(&self) -> LogSink {
        LogSink::from_writer(self.clone(), false)
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// ============================================================================
// Line Format Tests
// ============================================================================

#[test]
fn test_line_format() {
    let capture = Capture::default();
    capture.sink().in_scope(|| {
        info!("Found {} Parquet files.", 2);
        warn!("No files uploaded.");
        error!(file = "a.parquet", "Failed to process");
    });

    let output = capture.contents();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(" | INFO | Found 2 Parquet files."));
    assert!(lines[1].ends_with(" | WARN | No files uploaded."));
    assert!(lines[2].contains(" | ERROR | Failed to process"));
    assert!(lines[2].contains("a.parquet"));

    // "YYYY-MM-DD HH:MM:SS" prefix
    assert_eq!(lines[0].find(" | "), Some(19));
}

#[test]
fn test_debug_filtered_out() {
    let capture = Capture::default();
    capture.sink().in_scope(|| debug!("hidden"));
    assert!(capture.contents().is_empty());
}

#[tokio::test]
async fn test_scope_async() {
    let capture = Capture::default();
    let sink = capture.sink();
    let value = sink
        .scope(async {
            info!("inside");
            42
        })
        .await;

    assert_eq!(value, 42);
    assert!(capture.contents().contains("| INFO | inside"));

    // Nothing leaks outside the scope
    info!("outside");
    assert!(!capture.contents().contains("outside"));
}

#[test]
fn test_none_sink_discards() {
    LogSink::none().in_scope(|| info!("dropped"));
}

#[test]
fn test_separator() {
    assert_eq!(separator('-').len(), SEPARATOR_WIDTH);
    assert!(separator('=').chars().all(|c| c == '='));
}

// ============================================================================
// File Sink Tests
// ============================================================================

#[test]
fn test_file_sink_creates_log_dir() {
    let dir = tempdir().unwrap();
    let config = LogConfig {
        dir: dir.path().join("logs"),
        ..LogConfig::default()
    };

    let sink = LogSink::to_file(&config, "transform.log", false).unwrap();
    sink.in_scope(|| info!("Transformation complete"));

    let contents = std::fs::read_to_string(dir.path().join("logs/transform.log")).unwrap();
    assert!(contents.contains("| INFO | Transformation complete"));
}

// ============================================================================
// Rotation Tests
// ============================================================================

#[test]
fn test_rotation_keeps_backups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("upload.log");
    let mut writer = RotatingFileWriter::open(&path, 20, 2).unwrap();

    for line in ["0123456789\n", "abcdefghij\n", "ABCDEFGHIJ\n", "klmnopqrst\n"] {
        writer.write_all(line.as_bytes()).unwrap();
    }
    writer.flush().unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "klmnopqrst\n");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("upload.log.1")).unwrap(),
        "ABCDEFGHIJ\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("upload.log.2")).unwrap(),
        "abcdefghij\n"
    );
    assert!(!dir.path().join("upload.log.3").exists());
}

#[test]
fn test_rotation_without_backups_truncates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("download.log");
    let mut writer = RotatingFileWriter::open(&path, 15, 0).unwrap();

    writer.write_all(b"first line\n").unwrap();
    writer.write_all(b"second line\n").unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "second line\n");
    assert!(!dir.path().join("download.log.1").exists());
}

#[test]
fn test_rotation_appends_to_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pipeline.log");
    std::fs::write(&path, "previous run\n").unwrap();

    let mut writer = RotatingFileWriter::open(&path, 1_000, 2).unwrap();
    writer.write_all(b"this run\n").unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "previous run\nthis run\n"
    );
    assert_eq!(writer.path(), path);
}
