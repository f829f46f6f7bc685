// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Directory served as `/objects/<file>.ifc`.
    pub objects_dir: String,
    /// Maximum model file size in MB.
    pub max_file_size_mb: usize,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Number of worker threads for parallel bounds extraction.
    pub worker_threads: usize,
    /// Emit JSON log lines instead of human-readable ones.
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .unwrap_or(8080),
            objects_dir: std::env::var("OBJECTS_DIR").unwrap_or_else(|_| {
                // Docker image ships the models in /app/objects
                if std::path::Path::new("/.dockerenv").exists() {
                    "/app/objects".into()
                } else {
                    std::env::current_dir()
                        .ok()
                        .and_then(|dir| dir.join("objects").to_str().map(|s| s.to_string()))
                        .unwrap_or_else(|| "./objects".into())
                }
            }),
            max_file_size_mb: std::env::var("MAX_FILE_SIZE_MB")
                .unwrap_or_else(|_| "100".into())
                .parse()
                .unwrap_or(100),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".into())
                .parse()
                .unwrap_or(120),
            worker_threads: std::env::var("WORKER_THREADS")
                .unwrap_or_else(|_| num_cpus::get().to_string())
                .parse()
                .unwrap_or_else(|_| num_cpus::get()),
            log_json: std::env::var("LOG_FORMAT")
                .map(|format| format.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Model size limit in bytes.
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_size_mb as u64 * 1024 * 1024
    }
}
