//! Change-detection state persistence
//!
//! The only state carried between runs is a single watermark: the newest
//! upstream update timestamp seen by the last successful publish. It is
//! persisted as one ISO-8601 line in a state file so that values remain
//! comparable across runs. A missing file reads as the epoch, which makes
//! the first run always publish.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::constants::state;
use crate::errors::{StateError, StateResult};

/// Persisted watermark for one pipeline
#[derive(Debug)]
pub struct PipelineState {
    path: PathBuf,
    value: DateTime<Utc>,
}

impl PipelineState {
    /// Default state file location under the user config directory
    pub fn default_path() -> StateResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(state::STATE_DIR).join(state::STATE_FILE))
            .ok_or(StateError::NoStateDirectory)
    }

    /// Loads the state file, treating a missing file as the epoch
    pub fn load(path: PathBuf) -> StateResult<Self> {
        let value = match std::fs::read_to_string(&path) {
            Ok(raw) => parse_watermark(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DateTime::<Utc>::UNIX_EPOCH,
            Err(e) => return Err(StateError::Io(e)),
        };
        Ok(Self { path, value })
    }

    /// The current watermark
    pub fn get(&self) -> DateTime<Utc> {
        self.value
    }

    /// Persists a new watermark
    pub fn set(&mut self, value: DateTime<Utc>) -> StateResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(
            &self.path,
            value.to_rfc3339_opts(SecondsFormat::Micros, true),
        )?;
        self.value = value;
        Ok(())
    }

    /// Removes the state file, if present
    pub fn clear(&mut self) -> StateResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StateError::Io(e)),
        }
        self.value = DateTime::<Utc>::UNIX_EPOCH;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_watermark(raw: &str) -> StateResult<DateTime<Utc>> {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StateError::InvalidTimestamp {
            value: trimmed.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_as_epoch() {
        let dir = tempdir().unwrap();
        let state = PipelineState::load(dir.path().join("last-modified.txt")).unwrap();
        assert_eq!(state.get(), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_set_then_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("last-modified.txt");
        let watermark = DateTime::from_timestamp_micros(1_754_122_685_449_000).unwrap();

        let mut state = PipelineState::load(path.clone()).unwrap();
        state.set(watermark).unwrap();

        let reloaded = PipelineState::load(path).unwrap();
        assert_eq!(reloaded.get(), watermark);
    }

    #[test]
    fn test_garbage_state_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last-modified.txt");
        std::fs::write(&path, "yesterday-ish").unwrap();

        let err = PipelineState::load(path).unwrap_err();
        assert!(matches!(err, StateError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_clear_resets_to_epoch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last-modified.txt");
        let mut state = PipelineState::load(path.clone()).unwrap();
        state
            .set(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
            .unwrap();

        state.clear().unwrap();
        assert_eq!(state.get(), DateTime::<Utc>::UNIX_EPOCH);
        assert!(!path.exists());

        // Clearing an already-clear state is fine
        state.clear().unwrap();
    }
}
