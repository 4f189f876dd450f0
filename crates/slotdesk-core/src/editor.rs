//! Slotted editor: twenty labeled text slots scoped to the current user.
//!
//! Each slot is one [`SlotState`] record holding its persisted fields and
//! its transient UI flags. The editor owns its slots exclusively; two
//! editors for the same user share nothing but the gateway.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::clipboard::Clipboard;
use crate::context::SessionSource;
use crate::error::{Result, SlotError};
use crate::notify::{ErrorPolicy, Notifier, Toast};
use crate::store::SlotGateway;
use crate::types::{Collection, SlotIndex, SLOT_COUNT};

pub const DEFAULT_SAVED_PULSE: Duration = Duration::from_millis(2000);

// ---------------------------------------------------------------------------
// SlotState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotState {
    pub text: String,
    pub label: Option<String>,
    /// Set by a copy and never cleared for the editor's lifetime.
    pub copied: bool,
    pub saving: bool,
    saved_until: Option<Instant>,
}

impl SlotState {
    /// True for a short pulse after a successful save.
    pub fn is_saved(&self) -> bool {
        self.saved_until.is_some_and(|until| Instant::now() < until)
    }
}

/// Serializable snapshot of one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    pub number: u8,
    pub label: Option<String>,
    pub display_label: String,
    pub text: String,
    pub copied: bool,
    pub saving: bool,
    pub saved: bool,
    pub editing_label: bool,
}

// ---------------------------------------------------------------------------
// SlotEditor
// ---------------------------------------------------------------------------

pub struct SlotEditor<G, S, N> {
    collection: Collection,
    gateway: G,
    session: S,
    notifier: N,
    slots: [SlotState; SLOT_COUNT],
    editing_label: Option<SlotIndex>,
    temp_label: String,
    saved_pulse: Duration,
    load_policy: ErrorPolicy,
}

impl<G, S, N> SlotEditor<G, S, N>
where
    G: SlotGateway,
    S: SessionSource,
    N: Notifier,
{
    pub fn new(collection: Collection, gateway: G, session: S, notifier: N) -> Self {
        Self {
            collection,
            gateway,
            session,
            notifier,
            slots: std::array::from_fn(|_| SlotState::default()),
            editing_label: None,
            temp_label: String::new(),
            saved_pulse: DEFAULT_SAVED_PULSE,
            load_policy: ErrorPolicy::Silent,
        }
    }

    pub fn with_saved_pulse(mut self, pulse: Duration) -> Self {
        self.saved_pulse = pulse;
        self
    }

    pub fn with_load_policy(mut self, policy: ErrorPolicy) -> Self {
        self.load_policy = policy;
        self
    }

    pub fn slots(&self) -> &[SlotState; SLOT_COUNT] {
        &self.slots
    }

    pub fn slot(&self, index: SlotIndex) -> &SlotState {
        &self.slots[index.position()]
    }

    pub fn editing_label(&self) -> Option<SlotIndex> {
        self.editing_label
    }

    pub fn temp_label(&self) -> &str {
        &self.temp_label
    }

    /// Label shown for a slot: its saved label, or the positional default.
    pub fn display_label(&self, index: SlotIndex) -> String {
        self.slot(index)
            .label
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.collection.default_label(index))
    }

    pub fn view(&self, index: SlotIndex) -> SlotView {
        let slot = self.slot(index);
        SlotView {
            number: index.number(),
            label: slot.label.clone(),
            display_label: self.display_label(index),
            text: slot.text.clone(),
            copied: slot.copied,
            saving: slot.saving,
            saved: slot.is_saved(),
            editing_label: self.editing_label == Some(index),
        }
    }

    pub fn views(&self) -> Vec<SlotView> {
        SlotIndex::all().map(|i| self.view(i)).collect()
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Populate slots from storage.
    ///
    /// Without a current user nothing happens. A failed select is logged,
    /// reported per the load policy, and leaves every slot at its default.
    pub async fn load(&mut self) -> Result<()> {
        let Some(user) = self.session.current_user().await else {
            return Ok(());
        };

        let rows = match self.gateway.select_slots(self.collection, &user).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(collection = %self.collection, error = %e, "error loading slots");
                self.load_policy.report(
                    &self.notifier,
                    Toast::error(
                        format!("Error loading {}s", self.collection.noun()),
                        e.to_string(),
                    ),
                );
                return Err(e);
            }
        };

        let mut texts: [String; SLOT_COUNT] = std::array::from_fn(|_| String::new());
        let mut labels: [Option<String>; SLOT_COUNT] = std::array::from_fn(|_| None);
        for row in rows {
            let Ok(index) = SlotIndex::from_number(row.slot_index as usize) else {
                tracing::debug!(slot = row.slot_index, "ignoring out-of-range row");
                continue;
            };
            texts[index.position()] = row.text;
            labels[index.position()] = row.label;
        }
        for ((slot, text), label) in self.slots.iter_mut().zip(texts).zip(labels) {
            slot.text = text;
            slot.label = label;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    pub fn edit_text(&mut self, index: SlotIndex, text: impl Into<String>) {
        self.slots[index.position()].text = text.into();
    }

    /// Persist one slot's text together with its current label.
    pub async fn save_text(&mut self, index: SlotIndex) -> Result<()> {
        let noun = self.collection.noun();
        let text = self.slots[index.position()].text.clone();
        if text.trim().is_empty() {
            self.notifier.notify(Toast::error(
                format!("Empty {noun}"),
                "Please enter some text before saving",
            ));
            return Err(SlotError::EmptyText);
        }

        let Some(user) = self.session.current_user().await else {
            self.notifier.notify(Toast::error(
                "Authentication required",
                format!("Please log in to save {noun}s"),
            ));
            return Err(SlotError::NotAuthenticated);
        };

        let label = self.slots[index.position()]
            .label
            .clone()
            .filter(|l| !l.is_empty());

        self.slots[index.position()].saving = true;
        let result = self
            .gateway
            .upsert_slot(self.collection, &user, index, &text, label.as_deref())
            .await;
        self.slots[index.position()].saving = false;

        match result {
            Ok(()) => {
                self.slots[index.position()].saved_until = Some(Instant::now() + self.saved_pulse);
                self.notifier.notify(Toast::success(
                    "Saved successfully",
                    format!("{} {} has been saved", self.collection.label_prefix(), index),
                ));
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    collection = %self.collection,
                    slot = %index,
                    error = %e,
                    "error saving slot"
                );
                self.notifier
                    .notify(Toast::error(format!("Error saving {noun}"), e.to_string()));
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Labels
    // -----------------------------------------------------------------------

    pub fn begin_label_edit(&mut self, index: SlotIndex) {
        self.editing_label = Some(index);
        self.temp_label = self.display_label(index);
    }

    pub fn set_temp_label(&mut self, label: impl Into<String>) {
        self.temp_label = label.into();
    }

    pub fn cancel_label_edit(&mut self) {
        self.editing_label = None;
        self.temp_label.clear();
    }

    /// Persist `temp_label` for `index`. On failure the edit stays open so
    /// the user can retry or cancel.
    pub async fn save_label(&mut self, index: SlotIndex) -> Result<()> {
        let noun = self.collection.noun();
        let Some(user) = self.session.current_user().await else {
            self.notifier.notify(Toast::error(
                "Authentication required",
                "Please log in to save labels",
            ));
            return Err(SlotError::NotAuthenticated);
        };

        let trimmed = self.temp_label.trim().to_string();
        let label = (!trimmed.is_empty()).then_some(trimmed);
        let text = self.slots[index.position()].text.clone();

        if let Err(e) = self
            .gateway
            .upsert_slot(self.collection, &user, index, &text, label.as_deref())
            .await
        {
            tracing::error!(
                collection = %self.collection,
                slot = %index,
                error = %e,
                "error saving label"
            );
            self.notifier
                .notify(Toast::error("Error saving label", e.to_string()));
            return Err(e);
        }

        self.slots[index.position()].label = label;
        self.cancel_label_edit();
        self.notifier.notify(Toast::success(
            "Label saved",
            format!("{} label has been updated", capitalize(noun)),
        ));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Copy
    // -----------------------------------------------------------------------

    pub fn copy(&mut self, index: SlotIndex, clipboard: &mut impl Clipboard) -> Result<()> {
        let slot = &mut self.slots[index.position()];
        if let Err(e) = clipboard.write_text(&slot.text) {
            tracing::warn!(slot = %index, error = %e, "clipboard write failed");
            self.notifier.notify(Toast::error("Copy failed", e.to_string()));
            return Err(e);
        }
        slot.copied = true;
        Ok(())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
