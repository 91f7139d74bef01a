use std::env;

use tracing::info;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Telegram
    pub tg_api_id: i32,
    pub tg_api_hash: String,
    pub tg_channel: String,
    pub tg_session_file: String,

    // Threads (optional alternate sources, RSS takes precedence)
    pub threads_username: Option<String>,
    pub threads_rss: Option<String>,

    // Web trigger
    pub web_host: String,
    pub web_port: u16,
    pub basic_auth: Option<(String, String)>,

    // Headless render fallback
    pub browser_bin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        let basic_auth = match (opt_env("BASIC_AUTH_USER"), opt_env("BASIC_AUTH_PASS")) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        };

        Self {
            database_url: required_env("SUPABASE_URL"),
            tg_api_id: required_env("TG_API_ID")
                .parse()
                .expect("TG_API_ID must be a number"),
            tg_api_hash: required_env("TG_API_HASH"),
            tg_channel: required_env("TG_CHANNEL"),
            tg_session_file: env::var("TG_SESSION_FILE").unwrap_or_else(|_| "session".to_string()),
            threads_username: opt_env("THREADS_USERNAME")
                .map(|u| u.trim_start_matches('@').to_string()),
            threads_rss: opt_env("THREADS_RSS"),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "7860".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            basic_auth,
            browser_bin: opt_env("BROWSER_BIN"),
        }
    }

    /// Log which keys are set without echoing their values.
    pub fn log_redacted(&self) {
        info!(
            supabase_url = set_or_missing(!self.database_url.is_empty()),
            tg_api_id = "SET",
            tg_api_hash = set_or_missing(!self.tg_api_hash.is_empty()),
            tg_channel = self.tg_channel.as_str(),
            threads_username = set_or_missing(self.threads_username.is_some()),
            threads_rss = set_or_missing(self.threads_rss.is_some()),
            basic_auth = set_or_missing(self.basic_auth.is_some()),
            "config loaded"
        );
    }

    /// True when no Threads source is configured; the sync degrades to
    /// channel-only operation.
    pub fn threads_configured(&self) -> bool {
        self.threads_username.is_some() || self.threads_rss.is_some()
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

/// Treat unset and empty the same way; deployments often ship empty strings.
fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn set_or_missing(set: bool) -> &'static str {
    if set {
        "SET"
    } else {
        "MISSING"
    }
}
