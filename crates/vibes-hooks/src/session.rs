//! Context-aware deduplication of hook output within a session.

use crate::store::{MarkerKey, MarkerStore};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Default context growth after which a marker expires.
pub const DEFAULT_TOKEN_THRESHOLD: u64 = 50_000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
    cache_creation_input_tokens: u64,
    cache_read_input_tokens: u64,
}

impl Usage {
    fn total(&self) -> u64 {
        self.input_tokens
            + self.output_tokens
            + self.cache_creation_input_tokens
            + self.cache_read_input_tokens
    }
}

#[derive(Debug, Deserialize)]
struct Message {
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct TranscriptEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<Message>,
}

/// Context size from the last assistant usage entry of a JSONL transcript.
///
/// Unparseable lines are skipped. `None` if the file cannot be read or holds
/// no usage.
pub fn context_tokens(transcript: &Path) -> Option<u64> {
    let file = File::open(transcript).ok()?;
    let mut last = None;

    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(path = %transcript.display(), error = %err, "transcript read failed");
                return None;
            }
        };
        let Ok(entry) = serde_json::from_str::<TranscriptEntry>(line.trim()) else {
            continue;
        };
        if entry.kind.as_deref() != Some("assistant") {
            continue;
        }
        if let Some(usage) = entry.message.and_then(|m| m.usage) {
            last = Some(usage.total());
        }
    }

    last
}

/// Decides whether a marker still suppresses repeated output.
pub struct SessionGate<'a, S: MarkerStore + ?Sized> {
    store: &'a S,
    threshold: u64,
}

impl<'a, S: MarkerStore + ?Sized> SessionGate<'a, S> {
    pub fn new(store: &'a S, threshold: u64) -> Self {
        Self { store, threshold }
    }

    /// True while `key` is marked and the context grew by less than the
    /// threshold since. An exceeded marker is expired.
    ///
    /// Without a current context size only marker existence counts.
    pub fn is_fresh(&self, key: &MarkerKey, current_tokens: Option<u64>) -> bool {
        if !self.store.is_marked(key) {
            return false;
        }
        let Some(current) = current_tokens else {
            return true;
        };
        let Some(recorded) = self.store.tokens(key) else {
            return false;
        };

        let increase = current.saturating_sub(recorded);
        if increase < self.threshold {
            debug!(increase, threshold = self.threshold, "marker still valid");
            return true;
        }

        if let Err(err) = self.store.expire(key) {
            warn!(error = %err, "failed to expire marker");
        }
        debug!(increase, threshold = self.threshold, "marker expired");
        false
    }

    pub fn mark(&self, key: &MarkerKey, current_tokens: Option<u64>) {
        if let Err(err) = self.store.mark(key, current_tokens.unwrap_or(0)) {
            warn!(error = %err, "failed to write marker");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMarkerStore;
    use std::fs;
    use tempfile::tempdir;

    fn key() -> MarkerKey {
        MarkerKey::rule("Hook", "s", "rule")
    }

    #[test]
    fn test_context_tokens_uses_last_assistant_usage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        fs::write(
            &path,
            concat!(
                r#"{"type":"user","message":{"usage":{"input_tokens":999999}}}"#, "\n",
                r#"{"type":"assistant","message":{"usage":{"input_tokens":10,"output_tokens":5}}}"#, "\n",
                "garbage line\n",
                r#"{"type":"assistant","message":{"usage":{"input_tokens":100,"output_tokens":20,"cache_creation_input_tokens":3,"cache_read_input_tokens":7}}}"#, "\n",
                r#"{"type":"assistant","message":{"content":"no usage"}}"#, "\n",
            ),
        )
        .unwrap();

        assert_eq!(context_tokens(&path), Some(130));
    }

    #[test]
    fn test_context_tokens_missing_or_empty() {
        let dir = tempdir().unwrap();
        assert_eq!(context_tokens(&dir.path().join("none.jsonl")), None);
        let empty = dir.path().join("empty.jsonl");
        fs::write(&empty, "").unwrap();
        assert_eq!(context_tokens(&empty), None);
    }

    #[test]
    fn test_unmarked_is_not_fresh() {
        let store = MemoryMarkerStore::new();
        assert!(!SessionGate::new(&store, 100).is_fresh(&key(), Some(10)));
    }

    #[test]
    fn test_fresh_within_threshold() {
        let store = MemoryMarkerStore::new();
        let gate = SessionGate::new(&store, 100);
        gate.mark(&key(), Some(1_000));
        assert!(gate.is_fresh(&key(), Some(1_099)));
        assert!(store.expired().is_empty());
    }

    #[test]
    fn test_expires_past_threshold() {
        let store = MemoryMarkerStore::new();
        let gate = SessionGate::new(&store, 100);
        gate.mark(&key(), Some(1_000));

        assert!(!gate.is_fresh(&key(), Some(1_100)));
        assert!(!store.is_marked(&key()));
        assert_eq!(store.expired().len(), 1);
    }

    #[test]
    fn test_without_transcript_existence_decides() {
        let store = MemoryMarkerStore::new();
        let gate = SessionGate::new(&store, 1);
        gate.mark(&key(), None);
        assert!(gate.is_fresh(&key(), None));
    }

    #[test]
    fn test_context_shrink_keeps_marker() {
        let store = MemoryMarkerStore::new();
        let gate = SessionGate::new(&store, 100);
        gate.mark(&key(), Some(5_000));
        assert!(gate.is_fresh(&key(), Some(10)));
    }
}
