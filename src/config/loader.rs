//! Layered configuration resolution: file, environment, terminal, defaults.

use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;

use super::fields::{Field, PartialConfig};
use super::prompt::Prompter;
use super::settings::{check_field, missing, Config, ExchangeCredentials};
use super::settings_file::{read_section, DEFAULT_SECTION};

/// Reads the non-interactive layers once and fills the rest from a prompter.
///
/// Backend settings and exchange credentials resolve in separate steps, so
/// the Bitget keys are only needed once there are orders to copy.
pub struct ConfigLoader {
    layers: PartialConfig,
}

impl ConfigLoader {
    /// Merge the settings file at `path` with `COPYTRADE_*` variables.
    ///
    /// File values win over the environment.
    pub fn from_sources(path: &Path) -> Result<Self> {
        let file = PartialConfig::from_settings(&read_section(path, DEFAULT_SECTION)?);
        let env = PartialConfig::from_env_vars(std::env::vars());
        Ok(Self::from_layers(file.or(env)))
    }

    pub fn from_layers(layers: PartialConfig) -> Self {
        Self { layers }
    }

    /// Backend settings without asking anything; absent fields fall back to defaults.
    pub fn resolve(&self) -> Result<Config> {
        Config::from_partial(&self.layers)
    }

    /// Ask for every absent backend setting, then resolve.
    pub fn resolve_interactive<P: Prompter>(&mut self, prompter: &mut P) -> Result<Config> {
        self.ask_for(&Field::SESSION, prompter)?;
        self.resolve()
    }

    /// Bitget credentials without asking anything.
    pub fn exchange_credentials(&self) -> Result<ExchangeCredentials> {
        ExchangeCredentials::from_partial(&self.layers)
    }

    /// Ask for every absent Bitget credential, then resolve.
    pub fn exchange_credentials_interactive<P: Prompter>(
        &mut self,
        prompter: &mut P,
    ) -> Result<ExchangeCredentials> {
        self.ask_for(&Field::EXCHANGE, prompter)?;
        self.exchange_credentials()
    }

    /// Prompt for the absent `fields`, validating each answer as it arrives.
    ///
    /// A blank answer keeps the field's default, or fails if it has none.
    fn ask_for<P: Prompter>(&mut self, fields: &[Field], prompter: &mut P) -> Result<()> {
        let absent = self.layers.missing_of(fields);
        if !absent.is_empty() {
            info!(fields = absent.len(), "Prompting for missing settings");
        }

        for field in absent {
            let question = field.prompt();
            let answer = if field.is_secret() {
                prompter.ask_secret(&question)?
            } else {
                prompter.ask(&question)?
            };

            if answer.is_empty() {
                if field.default_value().is_none() {
                    return Err(missing(field));
                }
                debug!(field = %field, "Using default");
                continue;
            }

            check_field(field, &answer)?;
            self.layers.set(field, &answer);
        }

        Ok(())
    }
}
