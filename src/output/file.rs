//! File-backed log sink and header initializer.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{LogSink, OutputError, TimingMode};

fn io_error(path: &Path, source: std::io::Error) -> OutputError {
    OutputError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Make sure the log file exists and starts with a header.
///
/// An existing file is left untouched, whatever it contains. Any failure
/// other than "not found" while checking, and any failure while creating,
/// is returned to the caller, which treats it as fatal.
pub fn ensure_header(path: &Path, mode: TimingMode) -> Result<(), OutputError> {
    match fs::metadata(path) {
        Ok(_) => return Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(io_error(path, e)),
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| io_error(path, e))?;

    writeln!(file, "{}", mode.header()).map_err(|e| io_error(path, e))?;
    file.flush().map_err(|e| io_error(path, e))?;

    tracing::info!("Created log file {} with header", path.display());
    Ok(())
}

/// Appends to an existing log file, reopening it for every line.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl LogSink for FileSink {
    fn append(&self, line: &str) -> Result<(), OutputError> {
        // No `create`: a vanished log file surfaces as a write failure.
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| io_error(&self.path, e))?;

        writeln!(file, "{}", line).map_err(|e| io_error(&self.path, e))?;
        file.flush().map_err(|e| io_error(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_header_written_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.tsv");

        assert_ok!(ensure_header(&path, TimingMode::Split));
        assert_ok!(ensure_header(&path, TimingMode::Split));

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, format!("{}\n", TimingMode::Split.header()));
    }

    #[test]
    fn test_existing_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.tsv");
        fs::write(&path, "whatever was here\n").unwrap();

        assert_ok!(ensure_header(&path, TimingMode::Merged));

        assert_eq!(fs::read_to_string(&path).unwrap(), "whatever was here\n");
    }

    #[test]
    fn test_uncreatable_path_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("log.tsv");

        let err = assert_err!(ensure_header(&path, TimingMode::Split));
        assert!(err.to_string().contains("missing-dir"));
    }

    #[test]
    fn test_file_sink_appends_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.tsv");
        ensure_header(&path, TimingMode::Split).unwrap();

        let sink = FileSink::new(&path);
        assert_ok!(sink.append("a\tb"));
        assert_ok!(sink.append("c\td"));

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec![TimingMode::Split.header(), "a\tb", "c\td"]);
    }

    #[test]
    fn test_file_sink_does_not_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.tsv");

        let sink = FileSink::new(&path);
        assert_err!(sink.append("line"));
        assert!(!path.exists());
    }
}
