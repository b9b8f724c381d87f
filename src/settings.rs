//! Durable motor settings.
//!
//! Persistence mechanics live outside this crate behind the
//! [`SettingsStore`] key-value trait (namespace [`NAMESPACE`]). Settings are
//! loaded once at startup and written back only when a field actually
//! changes.

use heapless::FnvIndexMap;

/// Key-value namespace holding all motor settings.
pub const NAMESPACE: &str = "motor-settings";

/// Last commanded travel speed in mm/s.
pub const KEY_SPEED: &str = "speed";
/// Last commanded acceleration in mm/s².
pub const KEY_ACCELERATION: &str = "acc";
/// Power-on auto-homing preference.
pub const KEY_AUTO_HOME: &str = "ahome";
/// Converged current gradient from calibration.
pub const KEY_GRADIENT: &str = "gradient";
/// Calibrated current offset from calibration.
pub const KEY_OFFSET: &str = "offset";

/// Durable key-value capability provided by the host firmware.
///
/// Absent keys return `None`; writes of unchanged values are the caller's
/// responsibility to avoid (flash wear).
pub trait SettingsStore {
    /// Read a signed integer value.
    fn get_i32(&self, key: &str) -> Option<i32>;

    /// Write a signed integer value.
    fn put_i32(&mut self, key: &str, value: i32);

    /// Read a boolean value.
    fn get_bool(&self, key: &str) -> Option<bool>;

    /// Write a boolean value.
    fn put_bool(&mut self, key: &str, value: bool);

    /// Read a byte value.
    fn get_u8(&self, key: &str) -> Option<u8>;

    /// Write a byte value.
    fn put_u8(&mut self, key: &str, value: u8);
}

/// Durable user-tunable state, with defaults applied for absent keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistentSettings {
    /// Travel speed in mm/s (default 30).
    pub speed: i32,
    /// Acceleration in mm/s² (default 300).
    pub acceleration: i32,
    /// Home automatically after power-on calibration (default off).
    pub auto_home: bool,
    /// Converged current gradient, absent until first calibration.
    pub gradient: Option<u8>,
    /// Calibrated current offset, absent until first calibration.
    pub offset: Option<u8>,
}

impl Default for PersistentSettings {
    fn default() -> Self {
        Self {
            speed: 30,
            acceleration: 300,
            auto_home: false,
            gradient: None,
            offset: None,
        }
    }
}

impl PersistentSettings {
    /// Load settings from a store, substituting defaults for absent keys.
    pub fn load<S: SettingsStore>(store: &S) -> Self {
        let defaults = Self::default();
        Self {
            speed: store.get_i32(KEY_SPEED).unwrap_or(defaults.speed),
            acceleration: store
                .get_i32(KEY_ACCELERATION)
                .unwrap_or(defaults.acceleration),
            auto_home: store.get_bool(KEY_AUTO_HOME).unwrap_or(defaults.auto_home),
            gradient: store.get_u8(KEY_GRADIENT),
            offset: store.get_u8(KEY_OFFSET),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
    I32(i32),
    Bool(bool),
    U8(u8),
}

/// In-memory [`SettingsStore`] backed by a fixed-capacity map.
///
/// Useful for tests and for hosts without durable storage. Writes beyond
/// the key capacity are dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: FnvIndexMap<heapless::String<16>, Value, 16>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&mut self, key: &str, value: Value) {
        if let Ok(key) = heapless::String::try_from(key) {
            let _ = self.values.insert(key, value);
        }
    }

    fn get(&self, key: &str) -> Option<Value> {
        let key = heapless::String::<16>::try_from(key).ok()?;
        self.values.get(&key).copied()
    }
}

impl SettingsStore for MemoryStore {
    fn get_i32(&self, key: &str) -> Option<i32> {
        match self.get(key) {
            Some(Value::I32(v)) => Some(v),
            _ => None,
        }
    }

    fn put_i32(&mut self, key: &str, value: i32) {
        self.put(key, Value::I32(value));
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(Value::Bool(v)) => Some(v),
            _ => None,
        }
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        self.put(key, Value::Bool(value));
    }

    fn get_u8(&self, key: &str) -> Option<u8> {
        match self.get(key) {
            Some(Value::U8(v)) => Some(v),
            _ => None,
        }
    }

    fn put_u8(&mut self, key: &str, value: u8) {
        self.put(key, Value::U8(value));
    }
}
