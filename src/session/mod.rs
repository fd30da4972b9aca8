//! Session-scoped document store
//!
//! Holds the current raw BRD text and whether it came from the demo
//! fallback. The value is only ever replaced wholesale, so readers always see
//! a complete document. Every write broadcasts a payload-free
//! [`DocumentChanged`] signal; observers re-read the store.

use crate::chat::{apply_injection, Injection};
use crate::document::{normalize, DocumentState};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Key under which the raw document is kept in a session snapshot.
pub const SESSION_DOCUMENT_KEY: &str = "structify.brd";

/// Key under which the demo flag is kept in a session snapshot.
pub const SESSION_DEMO_KEY: &str = "structify.brd_is_demo";

/// Capacity of the change channel. Signals carry no data, so a lagging
/// observer loses nothing by skipping some.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Where the current document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentOrigin {
    /// Output of a generation call.
    Live,
    /// The canned demonstration document.
    Demo,
}

/// Signal that the stored document changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentChanged;

#[derive(Debug, Clone)]
struct StoredDocument {
    raw: Arc<str>,
    origin: DocumentOrigin,
}

/// Serializable form of the session's two values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(rename = "structify.brd", default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(rename = "structify.brd_is_demo", default)]
    pub is_demo: bool,
}

/// The single shared holder of the raw document.
#[derive(Debug)]
pub struct SessionStore {
    current: RwLock<Option<StoredDocument>>,
    changes: broadcast::Sender<DocumentChanged>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            current: RwLock::new(None),
            changes,
        }
    }

    /// Current raw document, if any.
    pub fn raw(&self) -> Option<Arc<str>> {
        self.read(|doc| doc.map(|d| d.raw.clone()))
    }

    pub fn origin(&self) -> Option<DocumentOrigin> {
        self.read(|doc| doc.map(|d| d.origin))
    }

    pub fn is_demo(&self) -> bool {
        self.origin() == Some(DocumentOrigin::Demo)
    }

    pub fn has_document(&self) -> bool {
        self.read(|doc| doc.is_some())
    }

    /// Normalize the current document for display.
    pub fn normalize(&self) -> DocumentState {
        let raw = self.raw();
        normalize(raw.as_deref())
    }

    /// Replace the document.
    pub fn replace(&self, raw: impl Into<String>, origin: DocumentOrigin) {
        let raw: String = raw.into();
        tracing::info!(bytes = raw.len(), ?origin, "document replaced");
        self.write(|doc| {
            *doc = Some(StoredDocument {
                raw: Arc::from(raw),
                origin,
            })
        });
        self.notify();
    }

    /// Apply a chat injection and return the new raw text.
    ///
    /// With no document stored, the injection creates one (origin `Live`).
    /// The read-modify-write happens under a single write lock.
    pub fn apply_injection(&self, injection: &Injection) -> Arc<str> {
        let updated = self.write(|doc| {
            let (base, origin) = match doc.as_ref() {
                Some(d) => (d.raw.clone(), d.origin),
                None => (Arc::from(""), DocumentOrigin::Live),
            };
            let raw: Arc<str> = Arc::from(apply_injection(&base, &injection.section, &injection.text));
            *doc = Some(StoredDocument {
                raw: raw.clone(),
                origin,
            });
            raw
        });
        tracing::info!(section = %injection.section, "injection applied");
        self.notify();
        updated
    }

    /// Drop the document, as when the session ends.
    pub fn clear(&self) {
        let had_document = self.write(|doc| doc.take().is_some());
        if had_document {
            tracing::info!("document cleared");
            self.notify();
        }
    }

    /// Subscribe to change signals.
    pub fn subscribe(&self) -> broadcast::Receiver<DocumentChanged> {
        self.changes.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.read(|doc| match doc {
            Some(d) => SessionSnapshot {
                document: Some(d.raw.to_string()),
                is_demo: d.origin == DocumentOrigin::Demo,
            },
            None => SessionSnapshot::default(),
        })
    }

    /// Load a snapshot, replacing (or clearing) the current document.
    pub fn restore(&self, snapshot: SessionSnapshot) {
        match snapshot.document {
            Some(raw) => {
                let origin = if snapshot.is_demo {
                    DocumentOrigin::Demo
                } else {
                    DocumentOrigin::Live
                };
                self.replace(raw, origin);
            }
            None => self.clear(),
        }
    }

    fn read<T>(&self, f: impl FnOnce(Option<&StoredDocument>) -> T) -> T {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        f(guard.as_ref())
    }

    fn write<T>(&self, f: impl FnOnce(&mut Option<StoredDocument>) -> T) -> T {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn notify(&self) {
        // No receivers is fine: nothing is viewing the document.
        let _ = self.changes.send(DocumentChanged);
    }
}
