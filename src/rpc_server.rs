//! SmartMark RPC Server — JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"token":"...","view_id":"...","title":"...","url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Push:     {"event":"view.changed", "view_id":"...", "render":{...}}

use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::time::Instant;

use serde_json::{json, Value};

use smartmark::app::App;
use smartmark::logging;
use smartmark::rpc_handler::{drain_notifications, handle_method};
use smartmark::services::config_engine::{default_data_dir, ConfigEngine, ConfigEngineTrait};

/// Fixed-window rate limiter over all requests.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn emit(out: &mut impl Write, value: &Value) -> io::Result<()> {
    writeln!(out, "{}", value)?;
    out.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = default_data_dir();
    let mut config = ConfigEngine::new(Some(data_dir.clone()));
    config.load()?;
    logging::init(&config.log_filter());
    tracing::info!(data_dir = %data_dir.display(), "smartmark-rpc starting");

    let app = App::with_config(config)?;
    let max_per_second = app.config.get_config().rate_limit_per_second;
    let app = Mutex::new(app);
    let mut rate_limiter = RateLimiter::new(max_per_second);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    emit(&mut out, &json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}))?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&mut out, &json!({"id": null, "error": format!("parse error: {}", e)}))?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            tracing::warn!("rate limit exceeded");
            emit(&mut out, &json!({"id": id, "error": "rate limit exceeded"}))?;
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&app, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => {
                tracing::debug!(method, error = %err, "request failed");
                json!({"id": id, "error": err})
            }
        };
        emit(&mut out, &response)?;

        for notification in drain_notifications(&app) {
            emit(&mut out, &notification)?;
        }
    }

    if let Ok(mut a) = app.lock() {
        a.shutdown();
    }
    Ok(())
}
