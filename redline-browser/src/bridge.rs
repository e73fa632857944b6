//! JSON-line bridge to the Playwright sidecar
//!
//! The browser is controlled through a small Node script spoken to over
//! stdio: one JSON request per line in, one JSON response per line out,
//! matched by id. The sidecar's stderr is drained into tracing logs.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use redline_core::BrowserConfig;

/// Driver script shipped with the crate
const DRIVER_SCRIPT: &str = include_str!("../js/driver.js");

/// Result type for bridge operations
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Errors from the browser bridge transport
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The node sidecar could not be started
    #[error("failed to spawn driver: {0}")]
    Spawn(String),

    /// IO error on the bridge channel
    #[error("bridge IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The sidecar sent something that is not a response
    #[error("bridge protocol error: {0}")]
    Protocol(String),

    /// A page script threw or the driver rejected the request
    #[error("driver script error: {0}")]
    Script(String),

    /// The sidecar exited or closed its pipes
    #[error("bridge closed")]
    Closed,
}

impl From<BridgeError> for redline_core::Error {
    fn from(err: BridgeError) -> Self {
        redline_core::Error::Driver(err.to_string())
    }
}

/// One request to the sidecar
#[derive(Debug, Serialize)]
struct Request<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

/// One response from the sidecar
#[derive(Debug, Deserialize)]
struct Response {
    id: u64,
    ok: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

struct BridgeIo {
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Handle to a live browser page behind the Playwright sidecar
///
/// Methods take `&self`; the request/response pair is serialized behind an
/// internal lock, so a shared reference can be polled from closures.
pub struct PageBridge {
    child: Child,
    io: Mutex<BridgeIo>,
    next_id: AtomicU64,
    /// Temp copy of the embedded driver script, removed on drop
    driver_path: Option<PathBuf>,
}

impl PageBridge {
    /// Spawn the sidecar and launch the browser
    ///
    /// Uses the driver script from `config.driver_script` when set,
    /// otherwise materializes the embedded copy into a temp file.
    pub async fn launch(config: &BrowserConfig) -> BridgeResult<Self> {
        let (script, driver_path) = match &config.driver_script {
            Some(path) => (path.clone(), None),
            None => {
                let path = std::env::temp_dir()
                    .join(format!("redline-driver-{}.js", std::process::id()));
                std::fs::write(&path, DRIVER_SCRIPT)?;
                (path.clone(), Some(path))
            }
        };

        debug!(node = %config.node_path, script = %script.display(), "Spawning browser driver");

        let mut child = Command::new(&config.node_path)
            .arg(&script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    BridgeError::Spawn(format!(
                        "node executable not found at '{}'. Is Node.js installed?",
                        config.node_path
                    ))
                } else {
                    BridgeError::Spawn(e.to_string())
                }
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BridgeError::Spawn("driver stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BridgeError::Spawn("driver stdout not captured".to_string()))?;

        // Drain stderr into logs so driver output is visible but never
        // blocks the response channel.
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "redline_browser::driver", "{}", line);
                }
            });
        }

        let bridge = Self {
            child,
            io: Mutex::new(BridgeIo {
                stdin,
                stdout: BufReader::new(stdout),
            }),
            next_id: AtomicU64::new(1),
            driver_path,
        };

        bridge
            .call(
                "launch",
                json!({
                    "headless": config.headless,
                    "profileDir": config.profile_dir,
                }),
            )
            .await?;

        info!(headless = config.headless, "Browser launched");

        Ok(bridge)
    }

    /// Navigate the page to a URL
    pub async fn goto(&self, url: &str) -> BridgeResult<()> {
        debug!(url, "Navigating");
        self.call("goto", json!({ "url": url })).await?;
        Ok(())
    }

    /// Evaluate a script in the page and return its JSON result
    pub async fn eval(&self, script: &str) -> BridgeResult<Value> {
        self.call("eval", json!({ "script": script })).await
    }

    /// Close the browser and wait for the sidecar to exit
    pub async fn close(mut self) -> BridgeResult<()> {
        if let Err(e) = self.call("close", Value::Null).await {
            warn!(error = %e, "Driver close request failed, killing process");
            self.child.kill().await.ok();
            return Ok(());
        }
        self.child.wait().await?;
        Ok(())
    }

    async fn call(&self, method: &str, params: Value) -> BridgeResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = Request { id, method, params };
        let line = serde_json::to_string(&request)
            .map_err(|e| BridgeError::Protocol(e.to_string()))?;

        let mut io = self.io.lock().await;

        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.write_all(b"\n").await?;
        io.stdin.flush().await?;

        loop {
            let mut buf = String::new();
            let n = io.stdout.read_line(&mut buf).await?;
            if n == 0 {
                return Err(BridgeError::Closed);
            }

            let line = buf.trim();
            if line.is_empty() {
                continue;
            }

            let response: Response = serde_json::from_str(line)
                .map_err(|e| BridgeError::Protocol(format!("bad response '{}': {}", line, e)))?;

            if response.id != id {
                // Stale response from an earlier timed-out call; skip it.
                warn!(got = response.id, want = id, "Skipping stale driver response");
                continue;
            }

            if !response.ok {
                return Err(BridgeError::Script(
                    response.error.unwrap_or_else(|| "unknown driver error".to_string()),
                ));
            }

            return Ok(response.result);
        }
    }
}

impl Drop for PageBridge {
    fn drop(&mut self) {
        if let Some(path) = self.driver_path.take() {
            std::fs::remove_file(path).ok();
        }
    }
}

impl std::fmt::Debug for PageBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBridge")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

/// Script evaluation capability of a live page
///
/// The placement stages only ever evaluate scripts and inspect the status
/// objects that come back, so they take this capability instead of the
/// concrete bridge and can be exercised against scripted responses.
#[async_trait::async_trait]
pub(crate) trait Evaluate: Sync {
    /// Evaluate a script in the page and return its JSON result
    async fn eval_script(&self, script: &str) -> BridgeResult<Value>;
}

#[async_trait::async_trait]
impl Evaluate for PageBridge {
    async fn eval_script(&self, script: &str) -> BridgeResult<Value> {
        self.eval(script).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    /// Page stub replaying a fixed sequence of script responses
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedPage {
        responses: StdMutex<VecDeque<Value>>,
        pub(crate) scripts_seen: StdMutex<Vec<String>>,
    }

    impl ScriptedPage {
        pub(crate) fn replying(responses: impl IntoIterator<Item = Value>) -> Self {
            Self {
                responses: StdMutex::new(responses.into_iter().collect()),
                scripts_seen: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl Evaluate for ScriptedPage {
        async fn eval_script(&self, script: &str) -> BridgeResult<Value> {
            self.scripts_seen.lock().unwrap().push(script.to_string());
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| serde_json::json!({ "status": "malformed" })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_framing() {
        let request = Request {
            id: 7,
            method: "eval",
            params: json!({ "script": "1 + 1" }),
        };
        let line = serde_json::to_string(&request).unwrap();
        assert_eq!(
            line,
            r#"{"id":7,"method":"eval","params":{"script":"1 + 1"}}"#
        );
    }

    #[test]
    fn test_response_parse_ok() {
        let response: Response =
            serde_json::from_str(r#"{"id":3,"ok":true,"result":{"status":"ok"}}"#).unwrap();
        assert_eq!(response.id, 3);
        assert!(response.ok);
        assert_eq!(response.result["status"], "ok");
    }

    #[test]
    fn test_response_parse_error() {
        let response: Response =
            serde_json::from_str(r#"{"id":4,"ok":false,"error":"boom"}"#).unwrap();
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("boom"));
        assert!(response.result.is_null());
    }

    #[test]
    fn test_bridge_error_converts_to_driver_error() {
        let err: redline_core::Error = BridgeError::Closed.into();
        assert!(matches!(err, redline_core::Error::Driver(_)));
        assert!(err.to_string().contains("bridge closed"));
    }

    #[test]
    fn test_embedded_driver_script_present() {
        assert!(DRIVER_SCRIPT.contains("launchPersistentContext"));
        assert!(DRIVER_SCRIPT.contains("readline"));
    }
}
