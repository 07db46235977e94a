//! Append-only session log.
//!
//! Each session writes one block: a header when it starts, its raw output as it
//! arrives, and a footer with the outcome when it ends. The log is best-effort;
//! if the file cannot be opened or written, the session carries on without it.

use crate::events::Outcome;
use crate::types::SessionId;
use chrono::{DateTime, Local};
use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    time::Duration,
};
use tracing::warn;

pub const SEPARATOR: &str = "===============================================";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct Header<'a> {
    pub started: DateTime<Local>,
    pub session: SessionId,
    pub command: &'a str,
    pub script: &'a str,
}

pub struct SessionLog {
    file: Option<File>,
}

impl SessionLog {
    /// Open `path` for appending and write the session header.
    pub fn open(path: &Path, header: &Header<'_>) -> Self {
        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(err) => {
                warn!(path = %path.display(), %err, "session log unavailable, running without it");
                None
            }
        };
        let mut log = Self { file };
        log.write_str(&format!(
            "{}\nStart: {}\nSession: {}\nCommand: {}\nScript: {}\n\n",
            SEPARATOR,
            header.started.format(TIMESTAMP_FORMAT),
            header.session,
            header.command,
            header.script,
        ));
        log
    }

    /// Append a raw output chunk as is.
    pub fn append(&mut self, chunk: &[u8]) {
        self.write(chunk);
    }

    /// Write the footer and release the file.
    pub fn close(mut self, outcome: &Outcome, duration: Duration) {
        self.write_str(&format!(
            "\nOutcome: {}\nDuration: {}s\n{}\n\n",
            outcome,
            duration.as_secs(),
            SEPARATOR
        ));
    }

    #[cfg(test)]
    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    fn write_str(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    fn write(&mut self, bytes: &[u8]) {
        if let Some(file) = self.file.as_mut() {
            let written = file.write_all(bytes).and_then(|_| file.flush());
            if let Err(err) = written {
                warn!(%err, "failed to write session log, dropping it for this session");
                self.file = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Failure;

    fn header<'a>(command: &'a str, script: &'a str) -> Header<'a> {
        Header {
            started: Local::now(),
            session: uuid::Uuid::new_v4(),
            command,
            script,
        }
    }

    #[test]
    fn writes_one_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let header = header("bash bin/4_GENOMES_MOVE.sh", "4. Genomes Move (Bash)");
        let mut log = SessionLog::open(&path, &header);
        assert!(log.is_enabled());
        log.append(b"moving ");
        log.append(b"genomes\n");
        log.close(&Outcome::Success, Duration::from_millis(3400));

        let contents = std::fs::read_to_string(&path).unwrap();
        let expected = format!(
            "{sep}\nStart: {start}\nSession: {session}\nCommand: bash bin/4_GENOMES_MOVE.sh\n\
             Script: 4. Genomes Move (Bash)\n\nmoving genomes\n\nOutcome: success\nDuration: 3s\n{sep}\n\n",
            sep = SEPARATOR,
            start = header.started.format(TIMESTAMP_FORMAT),
            session = header.session,
        );
        assert_eq!(contents, expected);
    }

    #[test]
    fn appends_without_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, "earlier contents\n").unwrap();

        SessionLog::open(&path, &header("a", "A")).close(&Outcome::Cancelled, Duration::ZERO);
        SessionLog::open(&path, &header("b", "B"))
            .close(&Outcome::Failed(Failure::ExitCode(4)), Duration::from_secs(61));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("earlier contents\n"));
        let first = contents.find("Command: a\n").unwrap();
        let second = contents.find("Command: b\n").unwrap();
        assert!(first < second);
        assert!(contents.contains("Outcome: cancelled\nDuration: 0s\n"));
        assert!(contents.contains("Outcome: error:4\nDuration: 61s\n"));
    }

    #[test]
    fn unavailable_store_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("log.txt");
        let mut log = SessionLog::open(&path, &header("a", "A"));
        assert!(!log.is_enabled());
        log.append(b"output nobody records\n");
        log.close(&Outcome::Success, Duration::ZERO);
        assert!(!path.exists());
    }
}
