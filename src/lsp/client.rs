//! Typed request surface over the JSON-RPC transport.

use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::lsp::transport::{LaunchSpec, Transport};
use crate::lsp::types::*;
use crate::model::Language;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

#[derive(Debug)]
pub struct Client {
    transport: Transport,
    next_id: AtomicI64,
    initialized: AtomicBool,
    language: Language,
    root_uri: String,
    timeout: Duration,
}

impl Client {
    pub fn new(spec: &LaunchSpec, root_uri: String, language: Language) -> Result<Client> {
        let transport = Transport::spawn(spec, language)?;
        Ok(Client {
            transport,
            next_id: AtomicI64::new(0),
            initialized: AtomicBool::new(false),
            language,
            root_uri,
            timeout: Duration::from_secs(Config::get().request_timeout_secs),
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_alive(&self) -> bool {
        self.transport.is_alive()
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(EngineError::NotInitialized)
        }
    }

    fn request_with_timeout<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.transport.request(id, method, params, timeout)?;
        serde_json::from_value(result)
            .map_err(|err| EngineError::Transport(format!("decode {method} response: {err}")))
    }

    /// Servers answer list requests with either an array or null.
    fn request_list<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Vec<T>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.transport.request(id, method, params, self.timeout)?;
        if result.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(result)
            .map_err(|err| EngineError::Transport(format!("decode {method} response: {err}")))
    }

    /// Initialize handshake followed by the `initialized` notification.
    /// Required before any document request.
    pub fn initialize(&self) -> Result<InitializeResult> {
        let params = json!({
            "processId": std::process::id(),
            "rootUri": self.root_uri,
            "capabilities": client_capabilities(),
        });
        let init_timeout = Duration::from_secs(Config::get().init_timeout_secs);
        let result: InitializeResult =
            self.request_with_timeout("initialize", params, init_timeout)?;
        self.transport.notify("initialized", json!({}))?;
        self.initialized.store(true, Ordering::SeqCst);
        Ok(result)
    }

    pub fn document_symbols(&self, uri: &str) -> Result<Vec<DocumentSymbol>> {
        self.ensure_initialized()?;
        self.request_list(
            "textDocument/documentSymbol",
            json!({ "textDocument": { "uri": uri } }),
        )
    }

    pub fn did_open(&self, uri: &str, text: &str) -> Result<()> {
        self.ensure_initialized()?;
        self.transport.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": {
                    "uri": uri,
                    "languageId": self.language.lsp_id(),
                    "version": 1,
                    "text": text,
                }
            }),
        )
    }

    pub fn did_close(&self, uri: &str) -> Result<()> {
        self.ensure_initialized()?;
        self.transport.notify(
            "textDocument/didClose",
            json!({ "textDocument": { "uri": uri } }),
        )
    }

    pub fn references(
        &self,
        uri: &str,
        pos: Position,
        include_declaration: bool,
    ) -> Result<Vec<Location>> {
        self.ensure_initialized()?;
        self.request_list(
            "textDocument/references",
            json!({
                "textDocument": { "uri": uri },
                "position": pos,
                "context": { "includeDeclaration": include_declaration },
            }),
        )
    }

    pub fn implementation(&self, uri: &str, pos: Position) -> Result<Vec<Location>> {
        self.ensure_initialized()?;
        self.request_list(
            "textDocument/implementation",
            json!({ "textDocument": { "uri": uri }, "position": pos }),
        )
    }

    pub fn prepare_call_hierarchy(
        &self,
        uri: &str,
        pos: Position,
    ) -> Result<Vec<CallHierarchyItem>> {
        self.ensure_initialized()?;
        self.request_list(
            "textDocument/prepareCallHierarchy",
            json!({ "textDocument": { "uri": uri }, "position": pos }),
        )
    }

    pub fn incoming_calls(
        &self,
        item: &CallHierarchyItem,
    ) -> Result<Vec<CallHierarchyIncomingCall>> {
        self.ensure_initialized()?;
        self.request_list("callHierarchy/incomingCalls", json!({ "item": item }))
    }

    pub fn outgoing_calls(
        &self,
        item: &CallHierarchyItem,
    ) -> Result<Vec<CallHierarchyOutgoingCall>> {
        self.ensure_initialized()?;
        self.request_list("callHierarchy/outgoingCalls", json!({ "item": item }))
    }

    pub fn prepare_type_hierarchy(
        &self,
        uri: &str,
        pos: Position,
    ) -> Result<Vec<TypeHierarchyItem>> {
        self.ensure_initialized()?;
        self.request_list(
            "textDocument/prepareTypeHierarchy",
            json!({ "textDocument": { "uri": uri }, "position": pos }),
        )
    }

    pub fn supertypes(&self, item: &TypeHierarchyItem) -> Result<Vec<TypeHierarchyItem>> {
        self.ensure_initialized()?;
        self.request_list("typeHierarchy/supertypes", json!({ "item": item }))
    }

    pub fn subtypes(&self, item: &TypeHierarchyItem) -> Result<Vec<TypeHierarchyItem>> {
        self.ensure_initialized()?;
        self.request_list("typeHierarchy/subtypes", json!({ "item": item }))
    }

    pub fn workspace_symbols(&self, query: &str) -> Result<Vec<SymbolInformation>> {
        self.ensure_initialized()?;
        self.request_list("workspace/symbol", json!({ "query": query }))
    }

    /// Graceful stop: shutdown request, exit notification, close pipes, reap.
    /// Errors are ignored throughout.
    pub fn shutdown(&self) {
        if self.initialized.load(Ordering::SeqCst) {
            let _: Result<Value> =
                self.request_with_timeout("shutdown", Value::Null, Duration::from_secs(5));
            let _ = self.transport.notify("exit", Value::Null);
        }
        self.transport.close();
    }
}
