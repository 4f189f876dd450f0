use crate::error::{Result, SlotError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of editable slots on every editor page.
pub const SLOT_COUNT: usize = 20;

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// SessionToken
// ---------------------------------------------------------------------------

/// Opaque bearer token identifying one signed-in session.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// 32 random bytes, base64url without padding.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "SessionToken({prefix}…)")
    }
}

// ---------------------------------------------------------------------------
// SlotIndex
// ---------------------------------------------------------------------------

/// A position in `0..SLOT_COUNT`. The persisted slot number is `position + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(u8);

impl SlotIndex {
    pub fn new(position: usize) -> Result<Self> {
        if position < SLOT_COUNT {
            Ok(Self(position as u8))
        } else {
            Err(SlotError::InvalidSlot(format!(
                "position {position} is outside 0..{SLOT_COUNT}"
            )))
        }
    }

    /// Build from the 1-based slot number used in storage and URLs.
    pub fn from_number(number: usize) -> Result<Self> {
        if (1..=SLOT_COUNT).contains(&number) {
            Ok(Self((number - 1) as u8))
        } else {
            Err(SlotError::InvalidSlot(format!(
                "slot number {number} is outside 1..={SLOT_COUNT}"
            )))
        }
    }

    pub fn position(self) -> usize {
        self.0 as usize
    }

    pub fn number(self) -> u8 {
        self.0 + 1
    }

    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..SLOT_COUNT as u8).map(SlotIndex)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// The table an editor page persists its slots into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    FlutterWebviewConfigs,
    LovablePrompts,
}

impl Collection {
    pub fn all() -> &'static [Collection] {
        &[Collection::FlutterWebviewConfigs, Collection::LovablePrompts]
    }

    pub fn table_name(self) -> &'static str {
        match self {
            Collection::FlutterWebviewConfigs => "flutter_webview_configs",
            Collection::LovablePrompts => "lovable_prompts",
        }
    }

    /// Prefix of the positional default label, e.g. `Config 3`.
    pub fn label_prefix(self) -> &'static str {
        match self {
            Collection::FlutterWebviewConfigs => "Config",
            Collection::LovablePrompts => "Prompt",
        }
    }

    /// Lowercase noun used in user-facing messages.
    pub fn noun(self) -> &'static str {
        match self {
            Collection::FlutterWebviewConfigs => "config",
            Collection::LovablePrompts => "prompt",
        }
    }

    pub fn default_label(self, index: SlotIndex) -> String {
        format!("{} {}", self.label_prefix(), index.number())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}
