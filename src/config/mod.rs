// Configuration store
//
// Named, typed settings with compile-time defaults and TOML persistence.
// Values live for the whole process; they are mutated only by controller
// write-back and by external reloads. Malformed or missing persisted
// values silently degrade to their defaults; reading never fails.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// A current setting value.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Str(String),
    Float(f64),
    Uint(u32),
    Bool(bool),
}

/// A compile-time default for a setting.
#[derive(Debug, Clone, Copy)]
pub enum SettingDefault {
    Str(&'static str),
    Float(f64),
    Uint(u32),
    Bool(bool),
}

impl SettingDefault {
    fn to_value(self) -> SettingValue {
        match self {
            SettingDefault::Str(v) => SettingValue::Str(v.to_string()),
            SettingDefault::Float(v) => SettingValue::Float(v),
            SettingDefault::Uint(v) => SettingValue::Uint(v),
            SettingDefault::Bool(v) => SettingValue::Bool(v),
        }
    }
}

/// Registration record for one setting.
#[derive(Debug, Clone, Copy)]
pub struct SettingDescriptor {
    pub key: &'static str,
    pub default: SettingDefault,
}

/// Process-wide persisted settings.
pub struct ConfigStore {
    path: Option<PathBuf>,
    descriptors: &'static [SettingDescriptor],
    values: BTreeMap<&'static str, SettingValue>,
    write_count: u64,
}

impl ConfigStore {
    /// Create an in-memory store with every value at its default.
    pub fn new(descriptors: &'static [SettingDescriptor]) -> Self {
        let values = descriptors
            .iter()
            .map(|descriptor| (descriptor.key, descriptor.default.to_value()))
            .collect();
        Self {
            path: None,
            descriptors,
            values,
            write_count: 0,
        }
    }

    /// Load a store from `path`, or create one with defaults.
    ///
    /// If the file doesn't exist or can't be parsed, a default store is
    /// created and saved to the file.
    pub fn load_or_default(path: impl Into<PathBuf>, descriptors: &'static [SettingDescriptor]) -> Self {
        let path = path.into();
        Self::load(path.clone(), descriptors).unwrap_or_else(|_| {
            let mut store = Self::new(descriptors);
            store.path = Some(path);
            // Try to save the default config, but don't fail if we can't
            let _ = store.save();
            store
        })
    }

    /// Load a store from `path`.
    pub fn load(path: impl Into<PathBuf>, descriptors: &'static [SettingDescriptor]) -> Result<Self, io::Error> {
        let path = path.into();
        let contents = fs::read_to_string(&path)?;
        let table: toml::Table =
            toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut store = Self::new(descriptors);
        store.path = Some(path);
        store.overlay(&table);
        Ok(store)
    }

    /// Save all current values to the store's file.
    ///
    /// A store with no backing file saves nothing.
    pub fn save(&self) -> Result<(), io::Error> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut table = toml::Table::new();
        for (key, value) in &self.values {
            let entry = match value {
                SettingValue::Str(v) => toml::Value::String(v.clone()),
                SettingValue::Float(v) => toml::Value::Float(*v),
                SettingValue::Uint(v) => toml::Value::Integer(*v as i64),
                SettingValue::Bool(v) => toml::Value::Boolean(*v),
            };
            table.insert(key.to_string(), entry);
        }
        let contents = toml::to_string_pretty(&table)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)
    }

    /// Re-read the backing file over pristine defaults.
    ///
    /// Keys removed from the file revert to their defaults. Called by the
    /// external reload subsystem; the shell reconciles afterwards.
    pub fn reload(&mut self) -> Result<(), io::Error> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        let contents = fs::read_to_string(&path)?;
        let table: toml::Table =
            toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.values = self
            .descriptors
            .iter()
            .map(|descriptor| (descriptor.key, descriptor.default.to_value()))
            .collect();
        self.overlay(&table);
        Ok(())
    }

    /// Apply file contents over current values. Unknown keys and
    /// type-mismatched values are ignored.
    fn overlay(&mut self, table: &toml::Table) {
        for descriptor in self.descriptors {
            let Some(value) = table.get(descriptor.key) else {
                continue;
            };
            let parsed = match (descriptor.default, value) {
                (SettingDefault::Str(_), toml::Value::String(v)) => {
                    Some(SettingValue::Str(v.clone()))
                }
                (SettingDefault::Float(_), toml::Value::Float(v)) => Some(SettingValue::Float(*v)),
                (SettingDefault::Float(_), toml::Value::Integer(v)) => {
                    Some(SettingValue::Float(*v as f64))
                }
                (SettingDefault::Uint(_), toml::Value::Integer(v)) if *v >= 0 => {
                    Some(SettingValue::Uint(*v as u32))
                }
                (SettingDefault::Bool(_), toml::Value::Boolean(v)) => Some(SettingValue::Bool(*v)),
                _ => None,
            };
            match parsed {
                Some(parsed) => {
                    self.values.insert(descriptor.key, parsed);
                }
                None => {
                    tracing::debug!(key = descriptor.key, "ignoring malformed config value");
                }
            }
        }
    }

    fn descriptor(&self, key: &str) -> Option<&SettingDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.key == key)
    }

    /// String value of `key`, or its default on mismatch.
    pub fn str_value(&self, key: &str) -> &str {
        if let Some(SettingValue::Str(v)) = self.values.get(key) {
            return v;
        }
        match self.descriptor(key).map(|d| d.default) {
            Some(SettingDefault::Str(v)) => v,
            _ => "",
        }
    }

    /// Float value of `key`, or its default on mismatch.
    pub fn float_value(&self, key: &str) -> f64 {
        if let Some(SettingValue::Float(v)) = self.values.get(key) {
            return *v;
        }
        match self.descriptor(key).map(|d| d.default) {
            Some(SettingDefault::Float(v)) => v,
            _ => 0.0,
        }
    }

    /// Unsigned value of `key`, or its default on mismatch.
    pub fn uint_value(&self, key: &str) -> u32 {
        if let Some(SettingValue::Uint(v)) = self.values.get(key) {
            return *v;
        }
        match self.descriptor(key).map(|d| d.default) {
            Some(SettingDefault::Uint(v)) => v,
            _ => 0,
        }
    }

    /// Bool value of `key`, or its default on mismatch.
    pub fn bool_value(&self, key: &str) -> bool {
        if let Some(SettingValue::Bool(v)) = self.values.get(key) {
            return *v;
        }
        match self.descriptor(key).map(|d| d.default) {
            Some(SettingDefault::Bool(v)) => v,
            _ => false,
        }
    }

    /// Write a string value. Unregistered keys are ignored.
    pub fn set_str(&mut self, key: &str, value: &str) {
        self.set(key, SettingValue::Str(value.to_string()));
    }

    pub fn set_float(&mut self, key: &str, value: f64) {
        self.set(key, SettingValue::Float(value));
    }

    pub fn set_uint(&mut self, key: &str, value: u32) {
        self.set(key, SettingValue::Uint(value));
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, SettingValue::Bool(value));
    }

    fn set(&mut self, key: &str, value: SettingValue) {
        match self.descriptor(key) {
            Some(descriptor) => {
                self.values.insert(descriptor.key, value);
                self.write_count += 1;
            }
            None => tracing::warn!(key, "write to unregistered setting ignored"),
        }
    }

    /// Number of write-backs accepted since creation.
    pub fn write_count(&self) -> u64 {
        self.write_count
    }
}
