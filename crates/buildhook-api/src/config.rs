//! Configuration management for the buildhook service.

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use buildhook_runner::{RunnerConfig, DEFAULT_BUILD_TIMEOUT_SECONDS};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The service works out-of-the-box with the conventional production
/// paths. Create `config.toml` to customize, or use environment
/// variables for deployment-specific overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,

    // Required filesystem paths. All are pre-provisioned externally and
    // existence-checked by /health, never created by this service.
    /// Directory holding generated projects.
    ///
    /// Environment variable: `PROJECTS_DIR`
    #[serde(default = "default_projects_dir", alias = "PROJECTS_DIR")]
    pub projects_dir: PathBuf,
    /// Directory the external build process writes its log files into.
    ///
    /// Environment variable: `LOGS_DIR`
    #[serde(default = "default_logs_dir", alias = "LOGS_DIR")]
    pub logs_dir: PathBuf,
    /// Directory holding the helper scripts.
    ///
    /// Environment variable: `SCRIPTS_DIR`
    #[serde(default = "default_scripts_dir", alias = "SCRIPTS_DIR")]
    pub scripts_dir: PathBuf,
    /// Path of the Terraform generator script.
    ///
    /// Environment variable: `GENERATOR_SCRIPT`
    #[serde(default = "default_generator_script", alias = "GENERATOR_SCRIPT")]
    pub generator_script: PathBuf,
    /// Path of the build-and-upload executable invoked per build.
    ///
    /// Environment variable: `BUILD_SCRIPT`
    #[serde(default = "default_build_script", alias = "BUILD_SCRIPT")]
    pub build_script: PathBuf,

    // Builds
    /// Deadline for a single external build in seconds.
    ///
    /// Environment variable: `BUILD_TIMEOUT_SECONDS`
    #[serde(default = "default_build_timeout", alias = "BUILD_TIMEOUT_SECONDS")]
    pub build_timeout_seconds: u64,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment
    /// variable overrides.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to the runner crate's configuration type.
    pub fn to_runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            build_script: self.build_script.clone(),
            build_timeout: Duration::from_secs(self.build_timeout_seconds),
        }
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.build_timeout_seconds == 0 {
            anyhow::bail!("build_timeout_seconds must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            projects_dir: default_projects_dir(),
            logs_dir: default_logs_dir(),
            scripts_dir: default_scripts_dir(),
            generator_script: default_generator_script(),
            build_script: default_build_script(),
            build_timeout_seconds: default_build_timeout(),
            rust_log: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_projects_dir() -> PathBuf {
    PathBuf::from("/home/projectbuilder/projects")
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("/home/projectbuilder/logs")
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from("/home/projectbuilder/scripts")
}

fn default_generator_script() -> PathBuf {
    PathBuf::from("/home/projectbuilder/scripts/generate-terraform.sh")
}

fn default_build_script() -> PathBuf {
    PathBuf::from("/opt/project-builder/build-and-upload.sh")
}

fn default_build_timeout() -> u64 {
    DEFAULT_BUILD_TIMEOUT_SECONDS
}

fn default_log_level() -> String {
    "info,buildhook=debug,tower_http=debug".to_string()
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, env, sync::Mutex};

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct TestEnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
        vars: Vec<String>,
        originals: HashMap<String, Option<String>>,
    }

    impl TestEnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            Self { _lock: lock, vars: Vec::new(), originals: HashMap::new() }
        }

        fn set_var(&mut self, key: &str, value: &str) {
            if !self.vars.contains(&key.to_string()) {
                self.originals.insert(key.to_string(), env::var(key).ok());
                self.vars.push(key.to_string());
            }
            env::set_var(key, value);
        }
    }

    impl Drop for TestEnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                match self.originals.get(var) {
                    Some(Some(value)) => env::set_var(var, value),
                    Some(None) => env::remove_var(var),
                    None => {},
                }
            }
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 8081);
        assert_eq!(config.build_timeout_seconds, 300);
        assert_eq!(config.logs_dir, PathBuf::from("/home/projectbuilder/logs"));
    }

    #[test]
    fn env_variables_override_defaults() {
        let mut guard = TestEnvGuard::new();
        guard.set_var("PORT", "9999");
        guard.set_var("LOGS_DIR", "/tmp/buildhook-logs");

        let config = Config::load().expect("config should load");
        assert_eq!(config.port, 9999);
        assert_eq!(config.logs_dir, PathBuf::from("/tmp/buildhook-logs"));
    }

    #[test]
    fn zero_port_rejected() {
        let config = Config { port: 0, ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn runner_config_carries_script_and_timeout() {
        let config = Config { build_timeout_seconds: 60, ..Config::default() };
        let runner = config.to_runner_config();
        assert_eq!(runner.build_timeout, Duration::from_secs(60));
        assert_eq!(runner.build_script, config.build_script);
    }

    #[test]
    fn server_addr_parses_from_host_and_port() {
        let config = Config { host: "127.0.0.1".into(), port: 8081, ..Config::default() };
        let addr = config.parse_server_addr().expect("addr should parse");
        assert_eq!(addr.to_string(), "127.0.0.1:8081");
    }
}
