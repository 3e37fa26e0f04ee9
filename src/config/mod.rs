//! Relay configuration: settings file, environment, terminal prompts.

mod fields;
mod loader;
mod prompt;
mod secret;
mod settings;
mod settings_file;

pub use fields::{Field, PartialConfig, DEFAULT_BASE_URL, DEFAULT_PAST_HOURS, DEFAULT_SYMBOLS};
pub use loader::ConfigLoader;
pub use prompt::{Prompter, TerminalPrompter};
pub use secret::Secret;
pub use settings::{
    exchange_symbol, parse_base_url, Config, ExchangeCredentials, LookbackHours, SymbolList,
    MARGIN_MARKET_SUFFIX, MAX_PAST_HOURS,
};
pub use settings_file::{parse_section, read_section, DEFAULT_SECTION};
