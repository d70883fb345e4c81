//! Hook registrations in the editor's `settings.json`.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

pub const SETTINGS_FILE: &str = "settings.json";
pub const LOCAL_SETTINGS_FILE: &str = "settings.local.json";

/// Hook events the editor emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookEvent {
    PreToolUse,
    PostToolUse,
    Notification,
    Stop,
    SubagentStop,
}

impl HookEvent {
    pub const ALL: [HookEvent; 5] = [
        Self::PreToolUse,
        Self::PostToolUse,
        Self::Notification,
        Self::Stop,
        Self::SubagentStop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreToolUse => "PreToolUse",
            Self::PostToolUse => "PostToolUse",
            Self::Notification => "Notification",
            Self::Stop => "Stop",
            Self::SubagentStop => "SubagentStop",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookEvent {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SettingsError::UnknownEvent(s.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct HookCommand {
    #[serde(rename = "type", default = "command_type")]
    kind: String,
    command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn command_type() -> String {
    "command".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct MatcherGroup {
    #[serde(default)]
    matcher: String,
    #[serde(default)]
    hooks: Vec<HookCommand>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SettingsDocument {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    hooks: BTreeMap<String, Vec<MatcherGroup>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// A registered hook command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookEntry {
    pub event: String,
    pub matcher: String,
    pub command: String,
    pub timeout: Option<u64>,
}

/// Reads and edits hook registrations, keeping unrelated settings intact.
#[derive(Debug, Clone)]
pub struct HookSettings {
    path: PathBuf,
}

impl HookSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `settings.json` (or `settings.local.json`) inside `claude_dir`.
    pub fn in_dir(claude_dir: &Path, local: bool) -> Self {
        let file = if local { LOCAL_SETTINGS_FILE } else { SETTINGS_FILE };
        Self::new(claude_dir.join(file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<SettingsDocument, SettingsError> {
        read_document(&self.path, false)
    }

    fn save(&self, doc: &SettingsDocument) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(doc)?;
        vibes_common_fs::write_string_atomic(&self.path, &format!("{text}\n"))?;
        debug!(path = %self.path.display(), "settings written");
        Ok(())
    }

    /// Registered hooks, optionally filtered by event.
    pub fn list(&self, event: Option<HookEvent>) -> Result<Vec<HookEntry>, SettingsError> {
        let doc = self.load()?;
        Ok(entries(&doc)
            .into_iter()
            .filter(|e| event.map_or(true, |ev| e.event == ev.as_str()))
            .collect())
    }

    /// Register a command. Returns `false` if it was already registered.
    pub fn add(
        &self,
        event: HookEvent,
        matcher: &str,
        command: &str,
        timeout: Option<u64>,
    ) -> Result<bool, SettingsError> {
        let mut doc = self.load()?;
        let added = insert(&mut doc, event.as_str(), matcher, command, timeout);
        if added {
            self.save(&doc)?;
            info!(%event, matcher, command, "hook added");
        }
        Ok(added)
    }

    /// Remove a command. Returns `false` if nothing matched.
    pub fn remove(&self, event: HookEvent, matcher: &str, command: &str) -> Result<bool, SettingsError> {
        let mut doc = self.load()?;
        let Some(groups) = doc.hooks.get_mut(event.as_str()) else {
            return Ok(false);
        };

        let mut removed = false;
        for group in groups.iter_mut().filter(|g| g.matcher == matcher) {
            let before = group.hooks.len();
            group.hooks.retain(|h| h.command != command);
            removed |= group.hooks.len() != before;
        }
        groups.retain(|g| !g.hooks.is_empty());
        if groups.is_empty() {
            doc.hooks.remove(event.as_str());
        }

        if removed {
            self.save(&doc)?;
            info!(%event, matcher, command, "hook removed");
        }
        Ok(removed)
    }

    /// Remove every hook of `event`, or all hooks. Returns the number removed.
    pub fn clear(&self, event: Option<HookEvent>) -> Result<usize, SettingsError> {
        let mut doc = self.load()?;
        let count = entries(&doc)
            .iter()
            .filter(|e| event.map_or(true, |ev| e.event == ev.as_str()))
            .count();

        match event {
            Some(ev) => {
                doc.hooks.remove(ev.as_str());
            }
            None => doc.hooks.clear(),
        }

        if count > 0 {
            self.save(&doc)?;
            info!(count, "hooks cleared");
        }
        Ok(count)
    }

    /// Merge hooks from another settings file. Returns the number added.
    pub fn import(&self, source: &Path) -> Result<usize, SettingsError> {
        let incoming = read_document(source, true)?;
        let mut doc = self.load()?;

        let added = entries(&incoming)
            .into_iter()
            .filter(|e| insert(&mut doc, &e.event, &e.matcher, &e.command, e.timeout))
            .count();

        if added > 0 {
            self.save(&doc)?;
        }
        info!(source = %source.display(), added, "hooks imported");
        Ok(added)
    }
}

fn read_document(path: &Path, required: bool) -> Result<SettingsDocument, SettingsError> {
    let text = match vibes_common_fs::read_to_string(path, vibes_common_fs::DEFAULT_MAX_SIZE) {
        Ok(text) => text,
        Err(e) if e.is_not_found() && !required => return Ok(SettingsDocument::default()),
        Err(e) if e.is_not_found() => return Err(SettingsError::NotFound(path.to_path_buf())),
        Err(e) => return Err(e.into()),
    };
    if text.trim().is_empty() {
        return Ok(SettingsDocument::default());
    }
    serde_json::from_str(&text).map_err(|source| SettingsError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn entries(doc: &SettingsDocument) -> Vec<HookEntry> {
    doc.hooks
        .iter()
        .flat_map(|(event, groups)| {
            groups.iter().flat_map(move |group| {
                group.hooks.iter().map(move |hook| HookEntry {
                    event: event.clone(),
                    matcher: group.matcher.clone(),
                    command: hook.command.clone(),
                    timeout: hook.timeout,
                })
            })
        })
        .collect()
}

fn insert(doc: &mut SettingsDocument, event: &str, matcher: &str, command: &str, timeout: Option<u64>) -> bool {
    let groups = doc.hooks.entry(event.to_string()).or_default();
    let index = match groups.iter().position(|g| g.matcher == matcher) {
        Some(index) => index,
        None => {
            groups.push(MatcherGroup {
                matcher: matcher.to_string(),
                ..MatcherGroup::default()
            });
            groups.len() - 1
        }
    };

    let group = &mut groups[index];
    if group.hooks.iter().any(|h| h.command == command) {
        return false;
    }
    group.hooks.push(HookCommand {
        kind: command_type(),
        command: command.to_string(),
        timeout,
        extra: Map::new(),
    });
    true
}
