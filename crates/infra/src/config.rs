//! Process configuration, read from the environment.
//!
//! | Variable                | Default        |
//! |-------------------------|----------------|
//! | `PORT`                  | `5000`         |
//! | `JWT_SECRET`            | dev secret     |
//! | `TOKEN_TTL_HOURS`       | `168`, at most `8784` |
//! | `USE_PERSISTENT_STORES` | `false`        |
//! | `DATABASE_URL`          | required when persistent |
//! | `DATABASE_MAX_CONNECTIONS` | `5`         |

use chrono::Duration;
use thiserror::Error;
use tracing::warn;

const DEV_JWT_SECRET: &str = "fineease-dev-secret";

/// Longest accepted session lifetime: one leap year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid {expected}: '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

/// Where the stores live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub persistence: Persistence,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = parse(&get, "PORT", "port number", 5000u16)?;
        let ttl_hours = parse(&get, "TOKEN_TTL_HOURS", "hour count between 1 and 8784", 168i64)?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&ttl_hours) {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_HOURS",
                expected: "hour count between 1 and 8784",
                value: ttl_hours.to_string(),
            });
        }

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let persistent = match get("USE_PERSISTENT_STORES").as_deref() {
            None => false,
            Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => true,
            Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => false,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    name: "USE_PERSISTENT_STORES",
                    expected: "boolean",
                    value: v.to_string(),
                });
            }
        };

        let persistence = if persistent {
            Persistence::Postgres {
                database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: parse(&get, "DATABASE_MAX_CONNECTIONS", "connection count", 5u32)?,
            }
        } else {
            Persistence::InMemory
        };

        Ok(Self {
            port,
            jwt_secret,
            token_ttl: Duration::hours(ttl_hours),
            persistence,
        })
    }
}

fn parse<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value: raw,
        }),
    }
}
