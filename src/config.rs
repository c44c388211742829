//! Process configuration, from CLI flags or environment variables.

use std::time::Duration;

use clap::Parser;

use crate::pin::DEVELOPMENT_ENVIRONMENT;

/// Configuration of one microplum process.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "microplum", about = "Pin-based service dispatch")]
pub struct Config {
    /// Application name, used as the broker message prefix
    #[arg(long, env = "APP_NAME", default_value = "microplum")]
    pub app: String,

    /// Version stamped on every pin that has none
    #[arg(long = "service-version", env = "VERSION", default_value = "v1")]
    pub version: String,

    /// Environment stamped on every pin that has none
    #[arg(long, env = "NODE_ENV", default_value = "production")]
    pub environment: String,

    /// Developer name; only applied in the `dev` environment
    #[arg(long, env = "DEVELOPER")]
    pub developer: Option<String>,

    /// Roles this process serves (comma separated)
    #[arg(long, env = "ROLES", value_delimiter = ',')]
    pub roles: Vec<String>,

    /// Broker URL (falls back to CLOUDAMQP_URL)
    #[arg(long, env = "AMQP_URI", default_value = DEFAULT_AMQP_URL)]
    pub amqp_url: String,

    /// User id attached to calls made without a caller
    #[arg(long, env = "DEBUG_USER_ID")]
    pub debug_user_id: Option<String>,

    /// Dispatch timeout in milliseconds
    #[arg(long, env = "ACT_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

pub const DEFAULT_AMQP_URL: &str = "amqp://localhost/microplum";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

impl Default for Config {
    fn default() -> Self {
        Self {
            app: "microplum".to_string(),
            version: "v1".to_string(),
            environment: "production".to_string(),
            developer: None,
            roles: Vec::new(),
            amqp_url: DEFAULT_AMQP_URL.to_string(),
            debug_user_id: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            verbose: false,
        }
    }
}

impl Config {
    /// Read configuration from the environment only, ignoring process args.
    pub fn from_env() -> Result<Self, clap::Error> {
        let mut config = Self::try_parse_from(["microplum"])?;
        if std::env::var_os("AMQP_URI").is_none() {
            if let Ok(url) = std::env::var("CLOUDAMQP_URL") {
                config.amqp_url = url;
            }
        }
        Ok(config)
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_developer(mut self, developer: impl Into<String>) -> Self {
        self.developer = Some(developer.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn is_development(&self) -> bool {
        self.environment == DEVELOPMENT_ENVIRONMENT
    }

    /// The developer to stamp on pins, if any.
    pub fn active_developer(&self) -> Option<&str> {
        self.developer.as_deref().filter(|_| self.is_development())
    }
}
