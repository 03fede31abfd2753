//! Key bindings that turn terminal key presses into component intents.
//!
//! Render adapters own a key map (for example [`crate::paginator::PaginatorKeyMap`]
//! or [`crate::select::SelectKeyMap`]) made of [`Binding`]s. A binding matches a
//! [`KeyMsg`] when its key code is listed and, if the binding was declared with
//! modifiers, the modifiers are equal.

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// Help text attached to a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// Short key label, e.g. `"←/h"`.
    pub key: String,
    /// What the key does, e.g. `"prev page"`.
    pub desc: String,
}

/// A set of keys that trigger one intent.
#[derive(Debug, Clone)]
pub struct Binding {
    keys: Vec<(KeyCode, KeyModifiers)>,
    help: Help,
    enabled: bool,
}

impl Binding {
    /// Creates a binding from plain key codes (no modifiers).
    pub fn new(keys: Vec<KeyCode>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .map(|code| (code, KeyModifiers::NONE))
                .collect(),
            help: Help::default(),
            enabled: true,
        }
    }

    /// Creates a binding from key codes paired with required modifiers.
    pub fn with_modifiers(keys: Vec<(KeyCode, KeyModifiers)>) -> Self {
        Self {
            keys,
            help: Help::default(),
            enabled: true,
        }
    }

    /// Attaches help text.
    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
        self
    }

    /// Returns the help text.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// Whether the binding currently responds to key presses.
    pub fn enabled(&self) -> bool {
        self.enabled && !self.keys.is_empty()
    }

    /// Enables or disables the binding.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns true if `msg` is one of this binding's keys.
    ///
    /// Keys declared without modifiers also accept `SHIFT`, since terminals
    /// report upper-case letters and some symbols that way.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        if !self.enabled() {
            return false;
        }
        self.keys.iter().any(|(code, modifiers)| {
            *code == msg.key
                && (*modifiers == msg.modifiers
                    || (modifiers.is_empty() && msg.modifiers == KeyModifiers::SHIFT))
        })
    }
}

/// Exposes a component's bindings for help views.
pub trait KeyMap {
    /// Bindings shown in the compact help line.
    fn short_help(&self) -> Vec<&Binding>;

    /// Bindings grouped into help columns.
    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![self.short_help()]
    }
}

/// Returns true if any binding in `bindings` matches `msg`.
pub fn matches(msg: &KeyMsg, bindings: &[&Binding]) -> bool {
    bindings.iter().any(|b| b.matches(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: KeyCode, modifiers: KeyModifiers) -> KeyMsg {
        KeyMsg { key, modifiers }
    }

    #[test]
    fn test_plain_binding_matches_listed_keys() {
        let b = Binding::new(vec![KeyCode::Right, KeyCode::Char('l')]);
        assert!(b.matches(&press(KeyCode::Right, KeyModifiers::NONE)));
        assert!(b.matches(&press(KeyCode::Char('l'), KeyModifiers::NONE)));
        assert!(!b.matches(&press(KeyCode::Left, KeyModifiers::NONE)));
        assert!(!b.matches(&press(KeyCode::Char('l'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_modifier_binding_requires_modifier() {
        let b = Binding::with_modifiers(vec![(KeyCode::Char('u'), KeyModifiers::CONTROL)]);
        assert!(b.matches(&press(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert!(!b.matches(&press(KeyCode::Char('u'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_disabled_binding_never_matches() {
        let mut b = Binding::new(vec![KeyCode::Enter]).with_help("enter", "select");
        b.set_enabled(false);
        assert!(!b.matches(&press(KeyCode::Enter, KeyModifiers::NONE)));
        assert_eq!(b.help().desc, "select");
        assert!(!Binding::new(vec![]).enabled());
    }
}
