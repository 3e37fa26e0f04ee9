//! Configuration fields and the partial record each source layer produces.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Environment variable prefix for the environment layer.
pub const ENV_PREFIX: &str = "COPYTRADE_";

pub const DEFAULT_BASE_URL: &str = "http://copytrading.xforceglobal.com";
pub const DEFAULT_SYMBOLS: &str = "BTCUSDT,XRPUSDT,ETHUSDT";
pub const DEFAULT_PAST_HOURS: &str = "1";

/// One setting the relay needs.
///
/// Declaration order is the interactive prompt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Symbols,
    BaseUrl,
    Email,
    Password,
    PastHours,
    BitgetApiKey,
    BitgetApiSecret,
    BitgetApiPassword,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Symbols,
        Field::BaseUrl,
        Field::Email,
        Field::Password,
        Field::PastHours,
        Field::BitgetApiKey,
        Field::BitgetApiSecret,
        Field::BitgetApiPassword,
    ];

    /// Fields needed to talk to the backend, asked for up front.
    pub const SESSION: [Field; 5] = [
        Field::Symbols,
        Field::BaseUrl,
        Field::Email,
        Field::Password,
        Field::PastHours,
    ];

    /// Bitget credentials, only asked for once there is something to copy.
    pub const EXCHANGE: [Field; 3] = [
        Field::BitgetApiKey,
        Field::BitgetApiSecret,
        Field::BitgetApiPassword,
    ];

    /// Key in the settings file.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Symbols => "symbols",
            Field::BaseUrl => "base_url",
            Field::Email => "email",
            Field::Password => "password",
            Field::PastHours => "past_hours",
            Field::BitgetApiKey => "bitget_api_key",
            Field::BitgetApiSecret => "bitget_api_secret",
            Field::BitgetApiPassword => "bitget_api_password",
        }
    }

    pub fn env_var(&self) -> String {
        format!("{}{}", ENV_PREFIX, self.key().to_uppercase())
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Value used when no layer provides one.
    pub fn default_value(&self) -> Option<&'static str> {
        match self {
            Field::Symbols => Some(DEFAULT_SYMBOLS),
            Field::BaseUrl => Some(DEFAULT_BASE_URL),
            Field::PastHours => Some(DEFAULT_PAST_HOURS),
            _ => None,
        }
    }

    /// Whether terminal input for this field must be masked.
    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            Field::Password | Field::BitgetApiSecret | Field::BitgetApiPassword
        )
    }

    /// Question shown by the interactive layer.
    pub fn prompt(&self) -> String {
        match self {
            Field::Symbols => format!(
                "Enter symbols to read from the backend, comma divided. Default is [{}].",
                DEFAULT_SYMBOLS
            ),
            Field::BaseUrl => format!("Enter the base api URL. Default is [{}].", DEFAULT_BASE_URL),
            Field::Email => "Please enter the email:".to_string(),
            Field::Password => "Please enter the password:".to_string(),
            Field::PastHours => format!(
                "Enter past hours to read orders from and until now. Default is [{}].",
                DEFAULT_PAST_HOURS
            ),
            Field::BitgetApiKey => "Enter the bitget api key:".to_string(),
            Field::BitgetApiSecret => "Enter the bitget api secret:".to_string(),
            Field::BitgetApiPassword => "Enter the bitget api password:".to_string(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw values collected from one or more layers.
///
/// Empty strings are never stored, so "present" always means "non-empty".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialConfig {
    values: BTreeMap<Field, String>,
}

impl PartialConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer built from settings-file keys. Unknown keys are ignored.
    pub fn from_settings(section: &HashMap<String, String>) -> Self {
        let mut partial = Self::new();
        for (key, value) in section {
            if let Some(field) = Field::from_key(key) {
                partial.set(field, value);
            }
        }
        partial
    }

    /// Layer built from `COPYTRADE_*` variables.
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut partial = Self::new();
        for (name, value) in vars {
            if let Some(field) = Field::ALL.into_iter().find(|f| f.env_var() == name) {
                partial.set(field, &value);
            }
        }
        partial
    }

    #[cfg(test)]
    pub fn with(mut self, field: Field, value: &str) -> Self {
        self.set(field, value);
        self
    }

    /// Store a trimmed value; blank input clears the field.
    pub fn set(&mut self, field: Field, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value.to_string());
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Value from this layer, falling back to the field default.
    pub fn get_or_default(&self, field: Field) -> Option<&str> {
        self.get(field).or_else(|| field.default_value())
    }

    /// Fill fields this layer lacks from a lower-priority layer.
    pub fn or(mut self, lower: PartialConfig) -> Self {
        for (field, value) in lower.values {
            self.values.entry(field).or_insert(value);
        }
        self
    }

    /// Absent fields among `fields`, in the order given.
    pub fn missing_of(&self, fields: &[Field]) -> Vec<Field> {
        fields
            .iter()
            .copied()
            .filter(|f| !self.values.contains_key(f))
            .collect()
    }
}
