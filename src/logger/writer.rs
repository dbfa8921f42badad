//! Log writer module
//!
//! Duplicates every log line to the console and to a log file that is
//! truncated when the process starts.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Console stream a line is mirrored to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Thread-safe log writer
pub struct LogWriter {
    file: Mutex<File>,
}

impl LogWriter {
    fn new(path: &str) -> io::Result<Self> {
        Ok(Self {
            file: Mutex::new(open_log_file(path)?),
        })
    }

    /// Write one line to the console stream and the log file
    pub fn write_line(&self, stream: Stream, message: &str) {
        let line = timestamped(message);
        write_console(stream, &line);
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

/// Create (or truncate) the log file
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

fn write_console(stream: Stream, line: &str) {
    match stream {
        Stream::Stdout => println!("{line}"),
        Stream::Stderr => eprintln!("{line}"),
    }
}

fn timestamped(message: &str) -> String {
    format!("{} {message}", Local::now().format("%Y/%m/%d %H:%M:%S"))
}

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if the log file cannot be opened.
pub fn init(path: &str) -> io::Result<()> {
    let writer = LogWriter::new(path)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Write a line through the global writer, or straight to the console before `init`
pub fn write(stream: Stream, message: &str) {
    match LOG_WRITER.get() {
        Some(writer) => writer.write_line(stream, message),
        None => write_console(stream, &timestamped(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_is_truncated_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("server.log");
        let path = path.to_str().unwrap();

        std::fs::create_dir_all(dir.path().join("logs")).unwrap();
        std::fs::write(path, "stale line from a previous run\n").unwrap();

        let writer = LogWriter::new(path).unwrap();
        writer.write_line(Stream::Stdout, "fresh start");

        let content = std::fs::read_to_string(path).unwrap();
        assert!(!content.contains("stale line"));
        assert!(content.trim_end().ends_with("fresh start"));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("server.log");

        let writer = LogWriter::new(path.to_str().unwrap()).unwrap();
        writer.write_line(Stream::Stderr, "warning line");

        assert!(path.is_file());
    }
}
