//! Service configuration.

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to the `RocksDB` data directory (default: "/data/stock-ledger").
    pub data_dir: String,

    /// Base URL of the host commerce platform's admin API.
    pub platform_base_url: String,

    /// Bearer token for the platform API (optional).
    pub platform_api_key: Option<String>,

    /// Admin API key for destructive endpoints (rebuild, purge). When
    /// unset those endpoints reject every request.
    pub admin_api_key: Option<String>,

    /// Shared secret for verifying platform hook signatures (optional;
    /// unsigned hooks are accepted when unset).
    pub hook_secret: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Default number of orders examined per rebuild step.
    pub rebuild_batch_size: usize,

    /// Maximum orders scanned per reservation request. Scans past the cap
    /// silently truncate.
    pub reservation_scan_cap: usize,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/stock-ledger".into()),
            platform_base_url: std::env::var("PLATFORM_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8081".into()),
            platform_api_key: std::env::var("PLATFORM_API_KEY").ok(),
            admin_api_key: std::env::var("ADMIN_API_KEY").ok(),
            hook_secret: std::env::var("HOOK_SECRET").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            rebuild_batch_size: std::env::var("REBUILD_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(50),
            reservation_scan_cap: std::env::var("RESERVATION_SCAN_CAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
        }
    }
}
