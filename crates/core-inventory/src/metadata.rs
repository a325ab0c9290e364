//! Version provenance: a per-object trail of lifecycle events, kept
//! independent of file content and never consulted by catalog or diff logic.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lifecycle event kinds recorded against a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Ingest,
    Update,
    Verification,
    Export,
}

/// One provenance event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEvent {
    /// Kind of event
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// When it happened, UTC
    pub datetime: DateTime<Utc>,

    /// Free-text description
    pub description: String,
}

impl VersionEvent {
    /// Record an event happening now
    pub fn now<S: Into<String>>(event_type: EventType, description: S) -> Self {
        Self {
            event_type,
            datetime: Utc::now(),
            description: description.into(),
        }
    }
}

/// Event trail for one version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMetadataEntry {
    /// Version the events belong to
    pub version_id: u32,

    /// Events in the order they were recorded
    pub events: Vec<VersionEvent>,
}

impl VersionMetadataEntry {
    /// Create an entry with no events yet
    pub fn new(version_id: u32) -> Self {
        Self {
            version_id,
            events: Vec::new(),
        }
    }
}

/// Provenance document for a whole object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMetadata {
    /// Digital object identifier
    pub object_id: String,

    /// One entry per version, ascending
    pub entries: Vec<VersionMetadataEntry>,
}

impl VersionMetadata {
    /// Create an empty provenance document
    pub fn new<S: Into<String>>(object_id: S) -> Self {
        Self {
            object_id: object_id.into(),
            entries: Vec::new(),
        }
    }

    /// Append an event to a version's trail, creating the entry on first use
    pub fn record(&mut self, version_id: u32, event: VersionEvent) {
        match self.entries.iter_mut().find(|e| e.version_id == version_id) {
            Some(entry) => entry.events.push(event),
            None => {
                let mut entry = VersionMetadataEntry::new(version_id);
                entry.events.push(event);
                self.entries.push(entry);
                self.entries.sort_by_key(|e| e.version_id);
            }
        }
    }

    /// Events recorded for a version, if any
    pub fn events_for(&self, version_id: u32) -> Option<&[VersionEvent]> {
        self.entries
            .iter()
            .find(|e| e.version_id == version_id)
            .map(|e| e.events.as_slice())
    }

    /// Save as a JSON document
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from a JSON document; a missing file is an error so callers can
    /// distinguish "no provenance yet" explicitly.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::not_found(path));
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
