//! Validated relay configuration.

use std::fmt;

use crate::error::{RelayError, Result};

use super::fields::{Field, PartialConfig};
use super::secret::Secret;

/// Upper bound of the lookback window (one week).
pub const MAX_PAST_HOURS: u32 = 24 * 7;

/// Margin-market qualifier appended to symbols sent to the exchange.
pub const MARGIN_MARKET_SUFFIX: &str = "_UMCBL";

/// Lookback window in hours, always within `1..=168`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackHours(u32);

impl LookbackHours {
    /// Clamp any integer into the allowed window.
    pub fn clamped(hours: i64) -> Self {
        Self(hours.clamp(1, MAX_PAST_HOURS as i64) as u32)
    }

    /// Parse an integer of any magnitude and clamp it.
    pub fn parse(raw: &str) -> Result<Self> {
        let text = raw.trim();
        if let Ok(hours) = text.parse::<i64>() {
            return Ok(Self::clamped(hours));
        }

        // Too large for i64 but still a whole number: saturate by sign.
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Self::clamped(if negative { i64::MIN } else { i64::MAX }));
        }

        Err(RelayError::validation(format!("Invalid past hours value '{}'.", raw)))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LookbackHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Plain coin-pair symbols, e.g. `BTCUSDT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolList(Vec<String>);

impl SymbolList {
    /// Accepts letters and commas only; empty segments are dropped.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let valid = raw.chars().all(|c| c.is_ascii_alphabetic() || c == ',')
            && raw.chars().any(|c| c.is_ascii_alphabetic());
        if !valid {
            return Err(RelayError::validation(
                "Invalid symbol list has been provided. Symbol list should be list of coin pairs divided with comma.",
            ));
        }

        let symbols = raw
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self(symbols))
    }

    /// Comma-joined form used in the backend query string.
    pub fn joined(&self) -> String {
        self.0.join(",")
    }
}

/// Exchange symbol for a plain symbol, suffixed once.
pub fn exchange_symbol(symbol: &str) -> String {
    if symbol.ends_with(MARGIN_MARKET_SUFFIX) {
        symbol.to_string()
    } else {
        format!("{}{}", symbol, MARGIN_MARKET_SUFFIX)
    }
}

/// Check the backend URL scheme and drop a trailing slash.
pub fn parse_base_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if !raw.starts_with("http") {
        return Err(RelayError::validation(
            "Invalid URL scheme. Must be http or https.",
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Bitget API key, secret and passphrase.
#[derive(Debug, Clone)]
pub struct ExchangeCredentials {
    pub api_key: Secret,
    pub api_secret: Secret,
    pub api_passphrase: Secret,
}

impl ExchangeCredentials {
    /// Each of the three must be non-empty.
    pub fn new(api_key: Secret, api_secret: Secret, api_passphrase: Secret) -> Result<Self> {
        if api_key.is_empty() {
            return Err(RelayError::validation(
                "No bitget api key or invalid api key has been provided.",
            ));
        }
        if api_secret.is_empty() {
            return Err(RelayError::validation(
                "No bitget api secret or invalid api secret has been provided.",
            ));
        }
        if api_passphrase.is_empty() {
            return Err(RelayError::validation(
                "No bitget api password or invalid api password has been provided.",
            ));
        }

        Ok(Self {
            api_key,
            api_secret,
            api_passphrase,
        })
    }

    /// Credentials from merged layers; exchange fields have no defaults.
    pub fn from_partial(partial: &PartialConfig) -> Result<Self> {
        let secret = |field: Field| Secret::new(partial.get(field).unwrap_or_default());
        Self::new(
            secret(Field::BitgetApiKey),
            secret(Field::BitgetApiSecret),
            secret(Field::BitgetApiPassword),
        )
    }
}

/// Backend settings for one relay run.
///
/// Exchange credentials are resolved separately, once orders are known.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend account email
    pub email: String,

    /// Backend account password
    pub password: Secret,

    /// How far back to fetch parent orders
    pub past_hours: LookbackHours,

    /// Backend base URL without trailing slash
    pub base_url: String,

    /// Symbols to fetch parent orders for
    pub symbols: SymbolList,
}

impl Config {
    /// Build a config from merged layers, applying defaults for absent fields.
    pub fn from_partial(partial: &PartialConfig) -> Result<Self> {
        let value = |field: Field| {
            partial.get_or_default(field).ok_or_else(|| missing(field))
        };

        let symbols = SymbolList::parse(value(Field::Symbols)?)?;
        let base_url = parse_base_url(value(Field::BaseUrl)?)?;
        let email = value(Field::Email)?.to_string();
        let password = Secret::new(value(Field::Password)?);
        let past_hours = LookbackHours::parse(value(Field::PastHours)?)?;

        Ok(Self {
            email,
            password,
            past_hours,
            base_url,
            symbols,
        })
    }
}

/// Validate a single raw value the way `Config::from_partial` would.
pub fn check_field(field: Field, raw: &str) -> Result<()> {
    match field {
        Field::Symbols => SymbolList::parse(raw).map(|_| ()),
        Field::BaseUrl => parse_base_url(raw).map(|_| ()),
        Field::PastHours => LookbackHours::parse(raw).map(|_| ()),
        _ if raw.trim().is_empty() => Err(missing(field)),
        _ => Ok(()),
    }
}

/// Error for a field no layer provided.
pub fn missing(field: Field) -> RelayError {
    match field {
        Field::Email => RelayError::validation("Invalid email."),
        Field::Password => RelayError::validation("Invalid password."),
        Field::BitgetApiKey => {
            RelayError::validation("No bitget api key or invalid api key has been provided.")
        }
        Field::BitgetApiSecret => {
            RelayError::validation("No bitget api secret or invalid api secret has been provided.")
        }
        Field::BitgetApiPassword => RelayError::validation(
            "No bitget api password or invalid api password has been provided.",
        ),
        other => RelayError::validation(format!("Missing value for {}.", other)),
    }
}
