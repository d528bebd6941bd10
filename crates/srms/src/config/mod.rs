use crate::grading::GradingConfig;
use crate::identity::CalendarPolicy;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the result service and CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub grading: GradingConfig,
    pub lookup: LookupConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = GradingConfig::default();
        let grading = GradingConfig {
            pass_mark: parse_var("SRMS_PASS_MARK", defaults.pass_mark)?,
            d_grade_floor: parse_var("SRMS_D_GRADE_FLOOR", defaults.d_grade_floor)?,
            precision: parse_var("SRMS_PERCENT_PRECISION", defaults.precision)?,
            default_max_marks: defaults.default_max_marks,
        };
        if grading.precision > GradingConfig::MAX_PRECISION {
            return Err(ConfigError::OutOfRange {
                variable: "SRMS_PERCENT_PRECISION",
                value: grading.precision.to_string(),
            });
        }
        if grading.pass_mark > 100 {
            return Err(ConfigError::OutOfRange {
                variable: "SRMS_PASS_MARK",
                value: grading.pass_mark.to_string(),
            });
        }
        if grading.d_grade_floor > 100 {
            return Err(ConfigError::OutOfRange {
                variable: "SRMS_D_GRADE_FLOOR",
                value: grading.d_grade_floor.to_string(),
            });
        }

        let calendar_policy = match env::var("SRMS_CALENDAR_POLICY") {
            Ok(raw) => CalendarPolicy::parse(&raw).ok_or(ConfigError::InvalidCalendarPolicy {
                value: raw.clone(),
            })?,
            Err(_) => CalendarPolicy::default(),
        };

        let fetch_attempts: u32 = parse_var("SRMS_FETCH_ATTEMPTS", 3)?;
        if fetch_attempts == 0 {
            return Err(ConfigError::OutOfRange {
                variable: "SRMS_FETCH_ATTEMPTS",
                value: fetch_attempts.to_string(),
            });
        }

        let session_file = env::var("SRMS_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".srms-session.json"));

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            grading,
            lookup: LookupConfig {
                calendar_policy,
                fetch_attempts,
            },
            session: SessionConfig { path: session_file },
        })
    }
}

fn parse_var<T: FromStr>(variable: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { variable, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Identity verification and collaborator access settings.
#[derive(Debug, Clone, Copy)]
pub struct LookupConfig {
    pub calendar_policy: CalendarPolicy,
    pub fetch_attempts: u32,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            calendar_policy: CalendarPolicy::default(),
            fetch_attempts: 3,
        }
    }
}

/// Where the command line keeps the signed-in user between invocations.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub path: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidNumber {
        variable: &'static str,
        value: String,
    },
    OutOfRange {
        variable: &'static str,
        value: String,
    },
    InvalidCalendarPolicy {
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable, value } => {
                write!(f, "{variable} must be a non-negative integer (found '{value}')")
            }
            ConfigError::OutOfRange { variable, value } => {
                write!(f, "{variable} is out of range (found {value})")
            }
            ConfigError::InvalidCalendarPolicy { value } => write!(
                f,
                "SRMS_CALENDAR_POLICY must be 'lenient' or 'strict' (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::OutOfRange { .. }
            | ConfigError::InvalidCalendarPolicy { .. } => None,
        }
    }
}
