//! Configuration
//!
//! 環境変数から読み込み、未指定の項目にはデフォルトを入れます。
//!
//! | var | default |
//! |---|---|
//! | `MEDIA_TOKEN_SECRET` | (required) |
//! | `MEDIA_PUBLIC_BASE_URL` | (required for `serve`) |
//! | `MEDIA_SIGN_TTL_SECS` | 60 |
//! | `MEDIA_REDIRECT_TTL_SECS` | 31536000 |
//! | `MEDIA_CLOCK_SKEW_SECS` | 0 |
//! | `RATE_LIMIT_IP_MAX` | 120 |
//! | `RATE_LIMIT_KEY_MAX` | 30 |
//! | `RATE_LIMIT_WINDOW_SECS` | 60 |
//! | `RATE_LIMIT_TIMEOUT_MS` | 500 |
//! | `VITRINE_BIND` | `0.0.0.0:8080` |
//! | `VITRINE_LOG_FORMAT` | `plain` |

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::observability::LogFormat;

pub const DEFAULT_SIGN_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_REDIRECT_TTL: Duration = Duration::from_secs(31_536_000);
pub const DEFAULT_IP_MAX: u32 = 120;
pub const DEFAULT_KEY_MAX: u32 = 30;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_LIMITER_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// HMAC key shared by the signer and the gateway.
///
/// Debug output never shows the key.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("SigningSecret(<unset>)")
        } else {
            f.write_str("SigningSecret(<redacted>)")
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub secret: SigningSecret,
    /// Public delivery base of the derivative bucket.
    pub public_base_url: Option<String>,
    /// Lifetime of freshly minted references.
    pub sign_ttl: Duration,
    /// `max-age` / `s-maxage` of the redirect.
    pub redirect_ttl: Duration,
    /// Allowed clock skew when checking `exp`.
    pub clock_skew: Duration,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            secret: SigningSecret::default(),
            public_base_url: None,
            sign_ttl: DEFAULT_SIGN_TTL,
            redirect_ttl: DEFAULT_REDIRECT_TTL,
            clock_skew: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub ip_max: u32,
    pub key_max: u32,
    pub window: Duration,
    /// Upper bound on each limiter call; exceeding it rejects the request.
    pub timeout: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            ip_max: DEFAULT_IP_MAX,
            key_max: DEFAULT_KEY_MAX,
            window: DEFAULT_WINDOW,
            timeout: DEFAULT_LIMITER_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub media: MediaConfig,
    pub rate_limit: RateLimitConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load through an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        // 鍵は trim しない（前後の空白も鍵の一部）
        let secret = lookup("MEDIA_TOKEN_SECRET")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("MEDIA_TOKEN_SECRET"))?;

        let media = MediaConfig {
            secret: SigningSecret::new(secret),
            public_base_url: get("MEDIA_PUBLIC_BASE_URL"),
            sign_ttl: secs(&get, "MEDIA_SIGN_TTL_SECS", DEFAULT_SIGN_TTL)?,
            redirect_ttl: secs(&get, "MEDIA_REDIRECT_TTL_SECS", DEFAULT_REDIRECT_TTL)?,
            clock_skew: secs(&get, "MEDIA_CLOCK_SKEW_SECS", Duration::ZERO)?,
        };

        let rate_limit = RateLimitConfig {
            ip_max: parsed(&get, "RATE_LIMIT_IP_MAX", DEFAULT_IP_MAX)?,
            key_max: parsed(&get, "RATE_LIMIT_KEY_MAX", DEFAULT_KEY_MAX)?,
            window: secs(&get, "RATE_LIMIT_WINDOW_SECS", DEFAULT_WINDOW)?,
            timeout: Duration::from_millis(parsed(
                &get,
                "RATE_LIMIT_TIMEOUT_MS",
                DEFAULT_LIMITER_TIMEOUT.as_millis() as u64,
            )?),
        };
        if rate_limit.window.is_zero() {
            return Err(ConfigError::Invalid {
                var: "RATE_LIMIT_WINDOW_SECS",
                value: "0".into(),
            });
        }

        let server = ServerConfig {
            bind: parsed(&get, "VITRINE_BIND", ServerConfig::default().bind)?,
            log_format: parsed(&get, "VITRINE_LOG_FORMAT", LogFormat::default())?,
        };

        Ok(Self {
            media,
            rate_limit,
            server,
        })
    }
}

fn parsed<G, T>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn secs<G>(get: &G, var: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    parsed(get, var, default.as_secs()).map(Duration::from_secs)
}
