//! Persistent slot storage using redb.
//!
//! # Table design
//!
//! One table per [`Collection`], keyed by the natural key of a slot:
//! ```text
//! (user_id: &str, slot_number: u8)  ->  JSON-encoded StoredSlot
//! ```
//!
//! Tuple keys order by user first and slot number second, so a range scan
//! over `(user, 0)..=(user, u8::MAX)` returns one user's slots ascending.
//! An upsert is a single write transaction: insert overwrites any previous
//! value under the same key.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::types::{Collection, SlotIndex, UserId};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

const FLUTTER_WEBVIEW_CONFIGS: TableDefinition<(&str, u8), &[u8]> =
    TableDefinition::new("flutter_webview_configs");
const LOVABLE_PROMPTS: TableDefinition<(&str, u8), &[u8]> =
    TableDefinition::new("lovable_prompts");

fn table(collection: Collection) -> TableDefinition<'static, (&'static str, u8), &'static [u8]> {
    match collection {
        Collection::FlutterWebviewConfigs => FLUTTER_WEBVIEW_CONFIGS,
        Collection::LovablePrompts => LOVABLE_PROMPTS,
    }
}

fn store_err(e: impl std::fmt::Display) -> SlotError {
    SlotError::Store(e.to_string())
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A persisted slot as returned by a select. `slot_index` is the 1-based
/// slot number as stored; callers must range-check it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRow {
    pub slot_index: u8,
    pub text: String,
    pub label: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSlot {
    text: String,
    #[serde(default)]
    label: Option<String>,
    updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// SlotGateway
// ---------------------------------------------------------------------------

/// Row-level access to saved slots.
pub trait SlotGateway: Send + Sync {
    /// All rows for `user` in `collection`, ordered by slot number ascending.
    fn select_slots(
        &self,
        collection: Collection,
        user: &UserId,
    ) -> impl Future<Output = Result<Vec<SlotRow>>> + Send;

    /// Insert or overwrite the row keyed by `(user, slot)`.
    fn upsert_slot(
        &self,
        collection: Collection,
        user: &UserId,
        slot: SlotIndex,
        text: &str,
        label: Option<&str>,
    ) -> impl Future<Output = Result<()>> + Send;
}

// ---------------------------------------------------------------------------
// SlotDb
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SlotDb {
    db: Arc<Database>,
}

impl SlotDb {
    /// Open or create the redb database at `path`, creating every
    /// collection table if missing.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(store_err)?;
        let wt = db.begin_write().map_err(store_err)?;
        for collection in Collection::all() {
            wt.open_table(table(*collection)).map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        tracing::debug!(path = %path.display(), "slot database opened");
        Ok(Self { db: Arc::new(db) })
    }

    pub fn select_blocking(&self, collection: Collection, user: &UserId) -> Result<Vec<SlotRow>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let t = rt.open_table(table(collection)).map_err(store_err)?;

        let uid = user.as_str();
        let mut rows = Vec::new();
        for entry in t.range((uid, 0u8)..=(uid, u8::MAX)).map_err(store_err)? {
            let (k, v) = entry.map_err(store_err)?;
            let (_, slot_index) = k.value();
            let stored: StoredSlot = serde_json::from_slice(v.value())?;
            rows.push(SlotRow {
                slot_index,
                text: stored.text,
                label: stored.label,
            });
        }
        Ok(rows)
    }

    pub fn upsert_blocking(
        &self,
        collection: Collection,
        user: &UserId,
        slot: SlotIndex,
        text: &str,
        label: Option<&str>,
    ) -> Result<()> {
        let value = serde_json::to_vec(&StoredSlot {
            text: text.to_string(),
            label: label.map(str::to_string),
            updated_at: Utc::now(),
        })?;
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut t = wt.open_table(table(collection)).map_err(store_err)?;
            t.insert((user.as_str(), slot.number()), value.as_slice())
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    /// Number of rows stored for `user` in `collection`.
    pub fn count_blocking(&self, collection: Collection, user: &UserId) -> Result<usize> {
        Ok(self.select_blocking(collection, user)?.len())
    }
}

impl SlotGateway for SlotDb {
    async fn select_slots(&self, collection: Collection, user: &UserId) -> Result<Vec<SlotRow>> {
        let db = self.clone();
        let user = user.clone();
        tokio::task::spawn_blocking(move || db.select_blocking(collection, &user))
            .await
            .map_err(|e| SlotError::Store(format!("task join error: {e}")))?
    }

    async fn upsert_slot(
        &self,
        collection: Collection,
        user: &UserId,
        slot: SlotIndex,
        text: &str,
        label: Option<&str>,
    ) -> Result<()> {
        let db = self.clone();
        let user = user.clone();
        let text = text.to_string();
        let label = label.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            db.upsert_blocking(collection, &user, slot, &text, label.as_deref())
        })
        .await
        .map_err(|e| SlotError::Store(format!("task join error: {e}")))?
    }
}
