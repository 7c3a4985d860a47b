//! Language-server plumbing: transport, typed client, and the per-language
//! client registry.

pub mod client;
pub mod transport;
pub mod types;

pub use client::Client;
pub use transport::LaunchSpec;

use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::model::Language;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Owns one analyzer process per language for the duration of an index run.
/// Clients are created lazily and all shut down together.
pub struct Manager {
    root_uri: String,
    launch: HashMap<Language, LaunchSpec>,
    clients: Mutex<HashMap<Language, Arc<Client>>>,
}

impl Manager {
    pub fn new(root_uri: String, launch: HashMap<Language, LaunchSpec>) -> Manager {
        Manager {
            root_uri,
            launch,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_configured(&self, language: Language) -> bool {
        self.launch.contains_key(&language)
    }

    /// Get or lazily create an initialized client for a language.
    pub fn client(&self, language: Language) -> Result<Arc<Client>> {
        if let Some(client) = self.clients.lock().unwrap().get(&language) {
            return Ok(Arc::clone(client));
        }

        let spec = self.launch.get(&language).ok_or_else(|| {
            EngineError::Launcher(format!("no analyzer configured for {language}"))
        })?;
        let client = Client::new(spec, self.root_uri.clone(), language)?;
        if let Err(err) = client.initialize() {
            client.shutdown();
            return Err(EngineError::Launcher(format!(
                "initialize {language} analyzer: {err}"
            )));
        }

        let client = Arc::new(client);
        self.clients
            .lock()
            .unwrap()
            .insert(language, Arc::clone(&client));
        Ok(client)
    }

    /// Post-initialize settle delay: some analyzers need time to finish
    /// workspace analysis before they can answer queries. The configured
    /// floor applies to every language.
    pub fn settle_delay(language: Language) -> Duration {
        let hint = match language {
            Language::Rust | Language::Java | Language::Swift | Language::Ocaml => 10,
            _ => 0,
        };
        Duration::from_secs(hint.max(Config::get().settle_floor_secs))
    }

    pub fn active_languages(&self) -> Vec<Language> {
        self.clients.lock().unwrap().keys().copied().collect()
    }

    /// Shut down every spawned analyzer. Safe to call more than once.
    pub fn shutdown_all(&self) {
        let clients: Vec<Arc<Client>> = self.clients.lock().unwrap().drain().map(|(_, c)| c).collect();
        for client in clients {
            client.shutdown();
        }
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.shutdown_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_launch_spec_is_launcher_error() {
        let manager = Manager::new("file:///tmp/p".into(), HashMap::new());
        let err = manager.client(Language::Go).unwrap_err();
        assert!(matches!(err, EngineError::Launcher(_)));
        assert!(!manager.is_configured(Language::Go));
    }

    #[test]
    fn settle_delay_hints() {
        assert_eq!(Manager::settle_delay(Language::Go), Duration::from_secs(0));
        assert_eq!(
            Manager::settle_delay(Language::Rust),
            Duration::from_secs(10)
        );
        assert_eq!(
            Manager::settle_delay(Language::Java),
            Duration::from_secs(10)
        );
    }
}
