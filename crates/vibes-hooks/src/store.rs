//! Marker storage for per-session deduplication.

use crate::error::HookError;
use chrono::Local;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Identifies the marker left when a rule is reported for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerKey {
    pub hook: String,
    pub session_id: String,
    pub rule: String,
}

fn short_hash(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..8].to_string()
}

impl MarkerKey {
    pub fn rule(hook: &str, session_id: &str, rule: &str) -> Self {
        Self {
            hook: hook.to_string(),
            session_id: session_id.to_string(),
            rule: rule.to_string(),
        }
    }

    /// Stable file name for this marker.
    pub fn file_name(&self) -> String {
        format!(
            "claude_rule_{}_{}_{}",
            self.hook,
            self.session_id,
            short_hash(&self.rule)
        )
    }
}

/// Persisted marker contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerData {
    pub timestamp: String,
    /// Context size when the marker was written.
    #[serde(default)]
    pub tokens: u64,
    pub session_id: String,
    #[serde(default)]
    pub rule: String,
}

/// Storage for hook state.
pub trait MarkerStore {
    /// Keep a raw hook payload for later inspection.
    fn record(&self, label: &str, payload: &str) -> Result<(), HookError>;

    fn is_marked(&self, key: &MarkerKey) -> bool;

    /// Create or overwrite a marker with the current context size.
    fn mark(&self, key: &MarkerKey, tokens: u64) -> Result<(), HookError>;

    /// Tokens stored in a marker; `None` if missing or unreadable.
    fn tokens(&self, key: &MarkerKey) -> Option<u64>;

    /// Retire a marker while keeping its history.
    fn expire(&self, key: &MarkerKey) -> Result<(), HookError>;
}

/// Markers as JSON files in a directory.
#[derive(Debug, Clone)]
pub struct FsMarkerStore {
    dir: PathBuf,
    capture_dir: Option<PathBuf>,
}

impl FsMarkerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            capture_dir: None,
        }
    }

    /// Also save every raw payload passed to `record` under `dir`.
    pub fn with_capture(mut self, dir: impl Into<PathBuf>) -> Self {
        self.capture_dir = Some(dir.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &MarkerKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl MarkerStore for FsMarkerStore {
    fn record(&self, label: &str, payload: &str) -> Result<(), HookError> {
        let Some(dir) = &self.capture_dir else {
            return Ok(());
        };
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%6f");
        let path = dir.join(format!("{label}_{stamp}.json"));
        vibes_common_fs::write_string_atomic(&path, payload)?;
        debug!(path = %path.display(), "raw hook input saved");
        Ok(())
    }

    fn is_marked(&self, key: &MarkerKey) -> bool {
        self.path_for(key).is_file()
    }

    fn mark(&self, key: &MarkerKey, tokens: u64) -> Result<(), HookError> {
        let data = MarkerData {
            timestamp: Local::now().to_rfc3339(),
            tokens,
            session_id: key.session_id.clone(),
            rule: key.rule.clone(),
        };
        let path = self.path_for(key);
        vibes_common_fs::write_string_atomic(&path, &serde_json::to_string(&data)?)?;
        debug!(path = %path.display(), tokens, "marker created");
        Ok(())
    }

    fn tokens(&self, key: &MarkerKey) -> Option<u64> {
        let text = vibes_common_fs::read_to_string(self.path_for(key), 64 * 1024).ok()?;
        serde_json::from_str::<MarkerData>(&text).ok().map(|d| d.tokens)
    }

    fn expire(&self, key: &MarkerKey) -> Result<(), HookError> {
        let path = self.path_for(key);
        let expired = self.dir.join(format!(
            "{}.expired_{}",
            key.file_name(),
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        vibes_common_fs::rename(&path, &expired)?;
        info!(from = %path.display(), to = %expired.display(), "expired marker renamed");
        Ok(())
    }
}

/// In-process marker store.
#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    markers: Mutex<HashMap<String, u64>>,
    expired: Mutex<Vec<String>>,
    records: Mutex<Vec<(String, String)>>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// File names of expired markers, oldest first.
    pub fn expired(&self) -> Vec<String> {
        self.expired.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Recorded `(label, payload)` pairs.
    pub fn records(&self) -> Vec<(String, String)> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn record(&self, label: &str, payload: &str) -> Result<(), HookError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((label.to_string(), payload.to_string()));
        Ok(())
    }

    fn is_marked(&self, key: &MarkerKey) -> bool {
        self.markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key.file_name())
    }

    fn mark(&self, key: &MarkerKey, tokens: u64) -> Result<(), HookError> {
        self.markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.file_name(), tokens);
        Ok(())
    }

    fn tokens(&self, key: &MarkerKey) -> Option<u64> {
        self.markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key.file_name())
            .copied()
    }

    fn expire(&self, key: &MarkerKey) -> Result<(), HookError> {
        let name = key.file_name();
        if self
            .markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&name)
            .is_some()
        {
            self.expired.lock().unwrap_or_else(PoisonError::into_inner).push(name);
        }
        Ok(())
    }
}
