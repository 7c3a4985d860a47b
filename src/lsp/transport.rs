//! Framed JSON-RPC transport to an external analyzer process.
//!
//! One child process per language. A single writer serializes outbound
//! frames; a background reader thread parses `Content-Length` frames and
//! routes responses by id to waiting callers. Child stderr passes through a
//! line filter that drops well-known analyzer noise.

use crate::error::{EngineError, Result};
use crate::model::Language;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{RecvTimeoutError, Sender, channel};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How to start an analyzer for one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchSpec {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug)]
pub struct Transport {
    language: Language,
    child: Mutex<Child>,
    stdin: Mutex<Option<ChildStdin>>,
    pending: Arc<Mutex<HashMap<i64, Sender<(Option<Value>, Option<RpcError>)>>>>,
    alive: Arc<AtomicBool>,
}

impl Transport {
    /// Spawn the analyzer process and start the reader threads.
    pub fn spawn(spec: &LaunchSpec, language: Language) -> Result<Transport> {
        let mut child = Command::new(&spec.command)
            .args(&spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                EngineError::Launcher(format!("{} ({}): {err}", spec.command, language))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Launcher("analyzer stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Launcher("analyzer stdout unavailable".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::Launcher("analyzer stderr unavailable".into()))?;

        let pending: Arc<Mutex<HashMap<i64, Sender<(Option<Value>, Option<RpcError>)>>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let alive = Arc::new(AtomicBool::new(true));

        {
            let pending = Arc::clone(&pending);
            let alive = Arc::clone(&alive);
            std::thread::spawn(move || {
                read_loop(BufReader::new(stdout), &pending, &alive);
            });
        }
        std::thread::spawn(move || {
            filter_stderr(BufReader::new(stderr), language);
        });

        Ok(Transport {
            language,
            child: Mutex::new(child),
            stdin: Mutex::new(Some(stdin)),
            pending,
            alive,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Send a request and wait up to `timeout` for the routed response.
    pub fn request(
        &self,
        id: i64,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value> {
        if !self.is_alive() {
            return Err(EngineError::Transport("analyzer process is gone".into()));
        }
        let (tx, rx) = channel();
        self.pending.lock().unwrap().insert(id, tx);

        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        if let Err(err) = self.write_frame(&body) {
            self.pending.lock().unwrap().remove(&id);
            return Err(err);
        }

        let outcome = rx.recv_timeout(timeout);
        self.pending.lock().unwrap().remove(&id);
        match outcome {
            Ok((result, None)) => Ok(result.unwrap_or(Value::Null)),
            Ok((_, Some(err))) if err.code == -32601 => Err(EngineError::Unsupported(format!(
                "{method}: {}",
                err.message
            ))),
            Ok((_, Some(err))) => Err(EngineError::Protocol {
                code: err.code,
                message: err.message,
            }),
            Err(RecvTimeoutError::Timeout) => Err(EngineError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(EngineError::Transport(
                "analyzer stream closed mid-request".into(),
            )),
        }
    }

    /// Send a notification; no response is expected.
    pub fn notify(&self, method: &str, params: Value) -> Result<()> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        self.write_frame(&body)
    }

    fn write_frame(&self, body: &Value) -> Result<()> {
        let data = serde_json::to_vec(body)
            .map_err(|err| EngineError::Transport(format!("encode frame: {err}")))?;
        let mut guard = self.stdin.lock().unwrap();
        let stdin = guard
            .as_mut()
            .ok_or_else(|| EngineError::Transport("analyzer stdin closed".into()))?;
        stdin
            .write_all(format!("Content-Length: {}\r\n\r\n", data.len()).as_bytes())
            .and_then(|_| stdin.write_all(&data))
            .and_then(|_| stdin.flush())
            .map_err(|err| EngineError::Transport(format!("write frame: {err}")))
    }

    /// Close stdin and reap the child. Errors are ignored; the caller has
    /// already sent shutdown/exit if it wanted a graceful stop.
    pub fn close(&self) {
        self.stdin.lock().unwrap().take();
        self.alive.store(false, Ordering::SeqCst);
        let mut child = self.child.lock().unwrap();
        if child.try_wait().ok().flatten().is_none() {
            let _ = child.kill();
        }
        let _ = child.wait();
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.close();
    }
}

fn read_loop<R: BufRead>(
    mut reader: R,
    pending: &Mutex<HashMap<i64, Sender<(Option<Value>, Option<RpcError>)>>>,
    alive: &AtomicBool,
) {
    loop {
        match read_frame(&mut reader) {
            Ok(Some(body)) => dispatch_frame(&body, pending),
            Ok(None) => break,
            Err(err) => {
                tracing::warn!("analyzer transport error: {err}");
                break;
            }
        }
    }
    alive.store(false, Ordering::SeqCst);
    // Dropping the senders fails every outstanding request.
    pending.lock().unwrap().clear();
}

fn dispatch_frame(
    body: &[u8],
    pending: &Mutex<HashMap<i64, Sender<(Option<Value>, Option<RpcError>)>>>,
) {
    let resp: RpcResponse = match serde_json::from_slice(body) {
        Ok(resp) => resp,
        Err(err) => {
            tracing::debug!("dropping unparseable frame: {err}");
            return;
        }
    };
    let Some(id) = resp.id else {
        // Server notification; nothing to route.
        return;
    };
    let sender = pending.lock().unwrap().remove(&id);
    match sender {
        Some(tx) => {
            let _ = tx.send((resp.result, resp.error));
        }
        None => {
            if let Some(method) = resp.method {
                // Server-to-client request we do not implement.
                tracing::debug!("ignoring server request {method} (id {id})");
            }
        }
    }
}

/// Read one `Content-Length`-framed message. `Ok(None)` is a clean EOF
/// before any header byte; everything else malformed is a transport error.
pub(crate) fn read_frame<R: BufRead>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    loop {
        let mut content_length: Option<usize> = None;
        let mut line = String::new();
        let mut saw_header = false;
        loop {
            line.clear();
            let n = reader
                .read_line(&mut line)
                .map_err(|err| EngineError::Transport(format!("read header: {err}")))?;
            if n == 0 {
                if saw_header {
                    return Err(EngineError::Transport("eof inside frame headers".into()));
                }
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                break;
            }
            saw_header = true;
            if let Some(rest) = trimmed.strip_prefix("Content-Length:") {
                let value = rest.trim().parse::<usize>().map_err(|_| {
                    EngineError::Transport(format!("malformed Content-Length header {trimmed:?}"))
                })?;
                content_length = Some(value);
            }
            // Other headers (Content-Type etc.) are permitted and ignored.
        }

        let Some(len) = content_length else {
            return Err(EngineError::Transport("frame missing Content-Length".into()));
        };
        if len == 0 {
            continue;
        }
        let mut body = vec![0u8; len];
        reader
            .read_exact(&mut body)
            .map_err(|_| EngineError::Transport("eof inside frame body".into()))?;
        return Ok(Some(body));
    }
}

fn filter_stderr<R: BufRead>(reader: R, language: Language) {
    for line in reader.lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() || is_stderr_noise(language, &line) {
            continue;
        }
        tracing::warn!("{language} analyzer: {line}");
    }
}

/// Well-known stderr chatter the common analyzers emit on every run.
fn is_stderr_noise(language: Language, line: &str) -> bool {
    match language {
        Language::Java => {
            line.contains("WARNING:")
                || line.contains("INFO:")
                || line.contains("sun.misc.Unsafe")
                || line.contains("incubator modules")
                || line.contains("spifly")
                || line.contains("logback")
        }
        Language::Ocaml => {
            line.contains("halting dune")
                || line.contains("closed merlin")
                || line.contains("{ pid")
                || line.contains("; initial_cwd")
                || line.trim_start().starts_with('"')
                || line.trim() == "}"
        }
        Language::Rust => {
            line.contains("ERROR unknown request")
                || line.contains("prepareTypeHierarchy")
                || line.contains("supertypes")
                || line.contains("subtypes")
        }
        _ => false,
    }
}
