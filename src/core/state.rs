//! Converter session state and its persistence

use crate::core::amount::{sanitize, splice_paste};
use crate::core::cache::{CONVERTER_KEY, KeyValueStore, SELECTION_KEY, load_json, save_json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_FROM: &str = "USD";
pub const DEFAULT_TO: &str = "EUR";
pub const DEFAULT_AMOUNT: &str = "1";

/// What the user has selected. `amount` is the sanitized text exactly as
/// typed, not a parsed number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterState {
    pub from: String,
    pub to: String,
    pub amount: String,
}

impl Default for ConverterState {
    fn default() -> Self {
        Self {
            from: DEFAULT_FROM.to_string(),
            to: DEFAULT_TO.to_string(),
            amount: DEFAULT_AMOUNT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetFrom(String),
    SetTo(String),
    SetAmount(String),
    /// Inserts clipboard text over the byte range `start..end` of the amount.
    Paste {
        text: String,
        start: usize,
        end: usize,
    },
    Swap,
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl ConverterState {
    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::SetFrom(code) => Self {
                from: normalize_code(&code),
                ..self
            },
            Action::SetTo(code) => Self {
                to: normalize_code(&code),
                ..self
            },
            Action::SetAmount(raw) => Self {
                amount: sanitize(&raw),
                ..self
            },
            Action::Paste { text, start, end } => {
                let (amount, _) = splice_paste(&self.amount, start, end, &text);
                Self { amount, ..self }
            }
            Action::Swap => Self {
                from: self.to,
                to: self.from,
                amount: self.amount,
            },
        }
    }

    pub fn selection(&self) -> Selection {
        Selection {
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

/// Owns the converter state for one run and writes every change through
/// to the store.
pub struct ConverterSession {
    store: Arc<dyn KeyValueStore>,
    state: ConverterState,
}

impl ConverterSession {
    /// Restores the persisted state, falling back to the last selection and
    /// then to `defaults` when entries are missing or unreadable.
    pub async fn load(store: Arc<dyn KeyValueStore>, defaults: ConverterState) -> Self {
        let state = match load_json::<ConverterState>(store.as_ref(), CONVERTER_KEY).await {
            Some(state) => state,
            None => match load_json::<Selection>(store.as_ref(), SELECTION_KEY).await {
                Some(selection) => ConverterState {
                    from: selection.from,
                    to: selection.to,
                    amount: defaults.amount,
                },
                None => defaults,
            },
        };
        debug!(?state, "Restored converter state");
        Self { store, state }
    }

    pub fn state(&self) -> &ConverterState {
        &self.state
    }

    pub async fn dispatch(&mut self, action: Action) {
        let next = self.state.clone().reduce(action);
        if next == self.state {
            return;
        }
        let selection_changed = next.from != self.state.from || next.to != self.state.to;
        self.state = next;

        save_json(self.store.as_ref(), CONVERTER_KEY, &self.state).await;
        if selection_changed {
            save_json(self.store.as_ref(), SELECTION_KEY, &self.state.selection()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[test]
    fn test_reducer() {
        let state = ConverterState::default();

        let state = state.reduce(Action::SetFrom(" gbp ".to_string()));
        assert_eq!(state.from, "GBP");

        let state = state.reduce(Action::SetTo("jpy".to_string()));
        assert_eq!(state.to, "JPY");

        let state = state.reduce(Action::SetAmount("1 234,5abc".to_string()));
        assert_eq!(state.amount, "1234,5");

        let state = state.reduce(Action::Swap);
        assert_eq!(state.from, "JPY");
        assert_eq!(state.to, "GBP");
        assert_eq!(state.amount, "1234,5");
    }

    #[test]
    fn test_reducer_paste() {
        let state = ConverterState {
            amount: "15".to_string(),
            ..ConverterState::default()
        };
        let state = state.reduce(Action::Paste {
            text: "0.25".to_string(),
            start: 2,
            end: 2,
        });
        assert_eq!(state.amount, "150.25");
    }

    #[test]
    fn test_reducer_keeps_trailing_separator() {
        let state = ConverterState::default().reduce(Action::SetAmount("12.".to_string()));
        assert_eq!(state.amount, "12.");
    }

    #[tokio::test]
    async fn test_session_defaults_when_empty() {
        let store = Arc::new(MemoryStore::new());
        let session = ConverterSession::load(store, ConverterState::default()).await;
        assert_eq!(session.state(), &ConverterState::default());
    }

    #[tokio::test]
    async fn test_session_persists_changes() {
        let store = Arc::new(MemoryStore::new());
        let mut session = ConverterSession::load(store.clone(), ConverterState::default()).await;

        session.dispatch(Action::SetAmount("99.5".to_string())).await;
        session.dispatch(Action::SetTo("chf".to_string())).await;

        let saved: ConverterState = load_json(store.as_ref(), CONVERTER_KEY).await.unwrap();
        assert_eq!(
            saved,
            ConverterState {
                from: "USD".to_string(),
                to: "CHF".to_string(),
                amount: "99.5".to_string(),
            }
        );
        let selection: Selection = load_json(store.as_ref(), SELECTION_KEY).await.unwrap();
        assert_eq!(selection.to, "CHF");

        let restored = ConverterSession::load(store, ConverterState::default()).await;
        assert_eq!(restored.state(), &saved);
    }

    #[tokio::test]
    async fn test_session_falls_back_to_selection() {
        let store = Arc::new(MemoryStore::new());
        store.put(CONVERTER_KEY, "garbage".to_string()).await;
        store
            .put(SELECTION_KEY, r#"{"from":"SEK","to":"NOK"}"#.to_string())
            .await;

        let session = ConverterSession::load(store, ConverterState::default()).await;
        assert_eq!(session.state().from, "SEK");
        assert_eq!(session.state().to, "NOK");
        assert_eq!(session.state().amount, DEFAULT_AMOUNT);
    }
}
