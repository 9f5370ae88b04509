use crate::error::Result;
use mlua::{Lua, LuaSerdeExt, Value};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Edge on which a debounced request fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebounceMode {
    /// Fire once after requests stop arriving for the delay
    #[default]
    Trailing,
    /// Fire on the first request, then suppress until quiet for the delay
    Leading,
}

/// How the first update after init is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialUpdate {
    #[default]
    Debounced,
    Immediate,
}

/// Lifecycle coordination settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub debounce_ms: u64,
    pub debounce_mode: DebounceMode,
    pub initial_update: InitialUpdate,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            debounce_mode: DebounceMode::Trailing,
            initial_update: InitialUpdate::Debounced,
        }
    }
}

impl ChartConfig {
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn with_debounce_mode(mut self, mode: DebounceMode) -> Self {
        self.debounce_mode = mode;
        self
    }

    pub fn with_initial_update(mut self, initial: InitialUpdate) -> Self {
        self.initial_update = initial;
        self
    }

    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read a config from a Lua table; `nil` yields the defaults
    pub fn from_lua(lua: &Lua, value: Value) -> Result<Self> {
        if value.is_nil() {
            return Ok(Self::default());
        }
        Ok(lua.from_value(value)?)
    }
}
