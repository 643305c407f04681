//! Configuration loading from the environment.
//!
//! All settings are read once at startup; the resulting `Config` is immutable
//! for the lifetime of the process and is the only process-wide state.

use anyhow::{bail, Result};

/// Top-level application config.
#[derive(Debug, Clone)]
pub struct Config {
    /// Webhook server bind/port settings.
    pub server: ServerConfig,

    /// LINE Messaging API settings (access token, signing secret).
    pub line: LineConfig,

    /// Answer-generation service settings (credential, endpoint).
    pub answer: AnswerConfig,
}

/// Server bind and port.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the webhook HTTP server (default 3000, `PORT` env).
    pub port: u16,

    /// Bind address (default "0.0.0.0" — LINE must be able to reach the
    /// webhook, so the default is not loopback; `BIND` env).
    pub bind: String,
}

fn default_port() -> u16 {
    3000
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

/// LINE Messaging API config.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Channel access token (`LINE_CHANNEL_ACCESS`). Required; the process
    /// refuses to start without it.
    pub channel_access_token: String,

    /// Channel secret (`LINE_CHANNEL_SECRET`) for webhook signature
    /// verification. When unset, verification is skipped entirely — a
    /// local-development mode that is warned about loudly at startup.
    pub channel_secret: Option<String>,

    /// Override for the LINE API base URL (`LINE_API_BASE`). Used by tests
    /// to point the client at a local fake.
    pub api_base: Option<String>,
}

/// Answer-generation service config.
#[derive(Debug, Clone)]
pub struct AnswerConfig {
    /// Session cookie pairs parsed from `ANSWER_COOKIES` ("k=v; k2=v2").
    /// A parsed credential selects direct query mode and the advanced
    /// engine; absence (or an unparseable value, which degrades the same
    /// way) selects augmented mode with the default engine. Storing the
    /// parsed form keeps mode selection and the Cookie header the client
    /// actually sends from ever disagreeing.
    pub cookies: Option<Vec<(String, String)>>,

    /// Override for the answer service base URL (`ANSWER_BASE_URL`).
    pub base_url: Option<String>,
}

impl AnswerConfig {
    /// True when a usable service credential is configured (direct mode).
    pub fn has_credential(&self) -> bool {
        self.cookies.is_some()
    }
}

/// Read an env var, treating unset and blank the same way.
fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Load config from the environment. Fails when `LINE_CHANNEL_ACCESS` is
/// missing; everything else has a default or an explicit degraded mode.
pub fn load_config() -> Result<Config> {
    let channel_access_token = match env_nonempty("LINE_CHANNEL_ACCESS") {
        Some(t) => t,
        None => bail!(
            "LINE_CHANNEL_ACCESS environment variable is required. Get it from the LINE Developers Console: https://developers.line.biz/console/"
        ),
    };
    let channel_secret = env_nonempty("LINE_CHANNEL_SECRET");
    let cookies = env_nonempty("ANSWER_COOKIES")
        .as_deref()
        .and_then(crate::answer::parse_cookie_env);
    let port = env_nonempty("PORT")
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = env_nonempty("BIND").unwrap_or_else(default_bind);

    Ok(Config {
        server: ServerConfig { port, bind },
        line: LineConfig {
            channel_access_token,
            channel_secret,
            api_base: env_nonempty("LINE_API_BASE"),
        },
        answer: AnswerConfig {
            cookies,
            base_url: env_nonempty("ANSWER_BASE_URL"),
        },
    })
}
