use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::WarrantError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub server: Server,
    pub policies: Policies,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policies {
    /// Directory of `.kdl` policy files, read once at startup. Default: policies
    pub dir: PathBuf,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for Policies {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("policies"),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> Result<Self, WarrantError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", Server::default().host)?
            .set_default("server.port", Server::default().port)?
            .set_default(
                "policies.dir",
                Policies::default().dir.to_string_lossy().to_string(),
            )?;

        // Optional file
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment overrides: WARRANT__SERVER__PORT=9090, etc.
        builder = builder.add_source(config::Environment::with_prefix("WARRANT").separator("__"));

        let cfg = builder.build()?;
        let mut s: Settings = cfg.try_deserialize()?;

        if s.policies.dir.is_relative() {
            s.policies.dir = std::env::current_dir()?.join(&s.policies.dir);
        }

        Ok(s)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_settings_load_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nonexistent.toml");

        let settings = Settings::load(config_path.to_str().unwrap())
            .expect("Failed to load settings");

        assert_eq!(settings.server.port, 8080);
        assert!(settings.policies.dir.is_absolute());
        assert!(settings.policies.dir.ends_with("policies"));
    }

    #[test]
    fn test_settings_load_from_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("test_config.toml");

        let config_content = r#"
[server]
port = 9090

[policies]
dir = "/etc/warrant/policies"
"#;
        fs::write(&config_path, config_content).expect("Failed to write config");

        let settings = Settings::load(config_path.to_str().unwrap())
            .expect("Failed to load settings");

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.policies.dir, PathBuf::from("/etc/warrant/policies"));
    }

    #[test]
    fn test_settings_env_override() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("test_config.toml");

        fs::write(&config_path, "[server]\nhost = \"127.0.0.1\"\n")
            .expect("Failed to write config");

        env::set_var("WARRANT__SERVER__HOST", "192.168.1.1");

        // Env should override file
        let settings = Settings::load(config_path.to_str().unwrap())
            .expect("Failed to load settings");
        assert_eq!(settings.server.host, "192.168.1.1");

        env::remove_var("WARRANT__SERVER__HOST");
    }

    #[test]
    fn test_settings_relative_policy_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("test_config.toml");
        fs::write(&config_path, "[policies]\ndir = \"relative/policies\"\n")
            .expect("Failed to write config");

        let settings = Settings::load(config_path.to_str().unwrap())
            .expect("Failed to load settings");

        assert!(settings.policies.dir.is_absolute());
        assert!(settings.policies.dir.ends_with("relative/policies"));
    }

    #[test]
    fn test_listen_addr() {
        let mut settings = Settings::default();
        settings.server.host = "localhost".to_string();
        settings.server.port = 3000;
        assert_eq!(settings.listen_addr(), "localhost:3000");
    }
}
