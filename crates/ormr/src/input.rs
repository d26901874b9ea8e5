//! Keyboard state as a map from logical key names to pressed flags.
//!
//! The engine never touches the host's event loop. Hosts feed raw key codes
//! into [`InputState::key_down`] / [`InputState::key_up`]; entity logic reads
//! the resulting name-to-bool map every process step and never writes it.

use std::collections::HashMap;

/// Browser-style key codes, for hosts that forward DOM-like events. Any
/// `u32` scheme works as long as `monitor_key` and the event feed agree.
pub mod keycode {
    pub const ESC: u32 = 27;
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
    pub const D: u32 = 68;
    pub const F: u32 = 70;
}

/// Pressed-state for every monitored key.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Raw code to logical name.
    bindings: HashMap<u32, String>,
    /// Logical name to pressed flag.
    keys: HashMap<String, bool>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a logical name for a raw key code. The key starts unpressed.
    pub fn monitor_key(&mut self, name: &str, code: u32) {
        self.bindings.insert(code, name.to_string());
        self.keys.insert(name.to_string(), false);
    }

    /// Host event: a raw key went down. Codes that were never monitored are
    /// ignored.
    pub fn key_down(&mut self, code: u32) {
        if let Some(name) = self.bindings.get(&code) {
            self.keys.insert(name.clone(), true);
        }
    }

    /// Host event: a raw key was released.
    pub fn key_up(&mut self, code: u32) {
        if let Some(name) = self.bindings.get(&code) {
            self.keys.insert(name.clone(), false);
        }
    }

    /// Current pressed state. `false` for names that were never monitored.
    pub fn pressed(&self, name: &str) -> bool {
        self.keys.get(name).copied().unwrap_or(false)
    }

    /// Set a key by name directly, bypassing the code binding. For synthetic
    /// input in tests and headless hosts.
    pub fn set_pressed(&mut self, name: &str, pressed: bool) {
        self.keys.insert(name.to_string(), pressed);
    }
}
