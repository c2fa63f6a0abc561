//! Parameter storage
//!
//! Fixed-capacity table of the robot's tunables for one run. Parameter
//! groups register their current values, overrides are applied by name
//! (typed, or parsed from `NAME=VALUE` text), and the groups load
//! themselves back with `from_store`. Nothing is persisted.

use core::fmt;

use super::error::ParameterError;
use bitflags::bitflags;
use heapless::index_map::FnvIndexMap;
use heapless::String;

/// Maximum parameter name length
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters
pub const MAX_PARAMS: usize = 32;

bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Bench calibration constant rather than a tuning knob
        const CALIBRATION = 0b00000001;
    }
}

/// Parameter value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Float(f32),
}

impl ParamValue {
    /// Numeric view of the value, if it has one
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ParamValue::Int(v) => Some(*v as f32),
            ParamValue::Float(v) => Some(*v),
            ParamValue::Bool(_) => None,
        }
    }

    /// Integer view; floats are truncated toward zero
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) => Some(*v as i32),
            ParamValue::Bool(_) => None,
        }
    }

    /// Parse `text` as a value of the same kind as `self`
    ///
    /// Booleans accept `0`/`1`/`false`/`true`. Integers reject fractional
    /// text.
    pub fn parse_like(&self, text: &str) -> Option<ParamValue> {
        let text = text.trim();
        match self {
            ParamValue::Bool(_) => match text {
                "1" | "true" => Some(ParamValue::Bool(true)),
                "0" | "false" => Some(ParamValue::Bool(false)),
                _ => None,
            },
            ParamValue::Int(_) => text.parse().ok().map(ParamValue::Int),
            ParamValue::Float(_) => text.parse().ok().map(ParamValue::Float),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", u8::from(*v)),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: ParamValue,
    flags: ParamFlags,
}

/// Named parameter table
#[derive(Default)]
pub struct ParameterStore {
    entries: FnvIndexMap<String<PARAM_NAME_LEN>, Entry, MAX_PARAMS>,
}

fn make_key(name: &str) -> Result<String<PARAM_NAME_LEN>, ParameterError> {
    let mut key = String::<PARAM_NAME_LEN>::new();
    key.push_str(name)
        .map_err(|_| ParameterError::UnknownParameter)?;
    Ok(key)
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parameter with its starting value
    ///
    /// Registering a name twice keeps the first value and flags.
    pub fn register(
        &mut self,
        name: &str,
        value: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = make_key(name)?;
        if self.entries.contains_key(&key) {
            return Ok(());
        }
        self.entries
            .insert(key, Entry { value, flags })
            .map_err(|_| ParameterError::StoreFull)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        let key = make_key(name).ok()?;
        self.entries.get(&key).map(|entry| entry.value)
    }

    /// Numeric value of a parameter, or `default` if missing or boolean
    pub fn get_f32_or(&self, name: &str, default: f32) -> f32 {
        self.get(name)
            .and_then(|value| value.as_f32())
            .unwrap_or(default)
    }

    pub fn flags(&self, name: &str) -> Option<ParamFlags> {
        let key = make_key(name).ok()?;
        self.entries.get(&key).map(|entry| entry.flags)
    }

    /// Replace the value of a registered parameter
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        self.entry_mut(name)?.value = value;
        Ok(())
    }

    /// Replace the value of a registered parameter from text
    ///
    /// The text is parsed as the kind of value the parameter holds.
    /// Ranges are not checked here; the owning group's `from_store` does
    /// that.
    pub fn set_from_str(&mut self, name: &str, text: &str) -> Result<(), ParameterError> {
        let entry = self.entry_mut(name)?;
        entry.value = entry
            .value
            .parse_like(text)
            .ok_or(ParameterError::InvalidValue)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameters in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue, ParamFlags)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.value, entry.flags))
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut Entry, ParameterError> {
        let key = make_key(name)?;
        self.entries
            .get_mut(&key)
            .ok_or(ParameterError::UnknownParameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ParameterStore {
        let mut store = ParameterStore::new();
        store
            .register("AHRS_LPF_ALPHA", ParamValue::Float(0.8), ParamFlags::empty())
            .unwrap();
        store
            .register("MOT_PWM_FREQ", ParamValue::Int(1000), ParamFlags::empty())
            .unwrap();
        store
            .register("AHRS_MAG_OFS_X", ParamValue::Float(33.4), ParamFlags::CALIBRATION)
            .unwrap();
        store
    }

    #[test]
    fn test_register_keeps_first_value() {
        let mut store = store();
        store.set("AHRS_LPF_ALPHA", ParamValue::Float(0.5)).unwrap();
        store
            .register("AHRS_LPF_ALPHA", ParamValue::Float(0.8), ParamFlags::CALIBRATION)
            .unwrap();

        assert_eq!(store.get("AHRS_LPF_ALPHA"), Some(ParamValue::Float(0.5)));
        assert_eq!(store.flags("AHRS_LPF_ALPHA"), Some(ParamFlags::empty()));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_unknown_names_rejected() {
        let mut store = store();
        assert_eq!(
            store.set("MOT_PWM_FRQ", ParamValue::Int(1)),
            Err(ParameterError::UnknownParameter)
        );
        assert_eq!(
            store.set_from_str("A_NAME_LONGER_THAN_16", "1"),
            Err(ParameterError::UnknownParameter)
        );
        assert_eq!(
            store.register("A_NAME_LONGER_THAN_16", ParamValue::Int(1), ParamFlags::empty()),
            Err(ParameterError::UnknownParameter)
        );
    }

    #[test]
    fn test_set_from_str_parses_by_kind() {
        let mut store = store();
        store.set_from_str("AHRS_LPF_ALPHA", " 0.25 ").unwrap();
        store.set_from_str("MOT_PWM_FREQ", "20000").unwrap();

        assert_eq!(store.get("AHRS_LPF_ALPHA"), Some(ParamValue::Float(0.25)));
        assert_eq!(store.get("MOT_PWM_FREQ"), Some(ParamValue::Int(20000)));

        // Integer parameters reject fractional text
        assert_eq!(
            store.set_from_str("MOT_PWM_FREQ", "1.5"),
            Err(ParameterError::InvalidValue)
        );
        assert_eq!(
            store.set_from_str("AHRS_LPF_ALPHA", "fast"),
            Err(ParameterError::InvalidValue)
        );
        assert_eq!(store.get("MOT_PWM_FREQ"), Some(ParamValue::Int(20000)));
    }

    #[test]
    fn test_bool_parsing() {
        let flag = ParamValue::Bool(false);
        assert_eq!(flag.parse_like("1"), Some(ParamValue::Bool(true)));
        assert_eq!(flag.parse_like("false"), Some(ParamValue::Bool(false)));
        assert_eq!(flag.parse_like("yes"), None);
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(ParamValue::Int(3).as_f32(), Some(3.0));
        assert_eq!(ParamValue::Float(2.7).as_i32(), Some(2));
        assert_eq!(ParamValue::Bool(true).as_f32(), None);

        let store = store();
        assert_eq!(store.get_f32_or("MOT_PWM_FREQ", 0.0), 1000.0);
        assert_eq!(store.get_f32_or("MISSING", 2.5), 2.5);
    }

    #[test]
    fn test_iter_in_registration_order() {
        let store = store();
        let names: heapless::Vec<&str, MAX_PARAMS> = store.iter().map(|(name, _, _)| name).collect();
        assert_eq!(
            names.as_slice(),
            &["AHRS_LPF_ALPHA", "MOT_PWM_FREQ", "AHRS_MAG_OFS_X"]
        );

        let calibration = store
            .iter()
            .filter(|(_, _, flags)| flags.contains(ParamFlags::CALIBRATION))
            .count();
        assert_eq!(calibration, 1);
    }
}
