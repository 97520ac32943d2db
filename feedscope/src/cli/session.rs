//! Per-invocation context

use anyhow::Result;
use feedscope_core::{Auth, FeedscopeError};
use std::io::Write;

use crate::client::FeedbinClient;
use crate::config::{ConfigStore, Settings};
use crate::prompt::Interaction;

/// Everything a handler needs: resolved settings, the config store, a way
/// to ask the user questions, and where to write output.
///
/// Results go to `out`; notes that should not pollute piped output
/// (progress, "already exists") go to `err`.
pub struct Session<'a> {
    settings: Settings,
    store: ConfigStore,
    ui: &'a dyn Interaction,
    out: &'a mut dyn Write,
    err: &'a mut dyn Write,
}

impl<'a> Session<'a> {
    pub fn new(
        settings: Settings,
        ui: &'a dyn Interaction,
        out: &'a mut dyn Write,
        err: &'a mut dyn Write,
    ) -> Self {
        let store = ConfigStore::new(settings.config_path.clone());
        Self {
            settings,
            store,
            ui,
            out,
            err,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn ui(&self) -> &'a dyn Interaction {
        self.ui
    }

    /// Stored credentials, or [`FeedscopeError::MissingCredentials`]
    pub fn credentials(&self) -> Result<Auth> {
        self.store
            .credentials()?
            .ok_or_else(|| FeedscopeError::MissingCredentials.into())
    }

    /// Open an API client for this command
    pub fn client(&self, auth: Auth) -> Result<FeedbinClient> {
        Ok(FeedbinClient::new(&self.settings, auth)?)
    }

    /// Write a line of output
    pub fn print(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    /// Write a line to the diagnostic stream
    pub fn note(&mut self, text: &str) -> Result<()> {
        writeln!(self.err, "{}", text)?;
        Ok(())
    }

    /// Raw output stream, for generators that write directly
    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }
}
