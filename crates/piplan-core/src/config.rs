use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_num_sprints")]
    pub default_num_sprints: u32,
    #[serde(default = "default_sprint_duration_days")]
    pub default_sprint_duration_days: u32,
}

fn default_num_sprints() -> u32 {
    5
}

fn default_sprint_duration_days() -> u32 {
    14
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_num_sprints: default_num_sprints(),
            default_sprint_duration_days: default_sprint_duration_days(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/piplan/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("piplan/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("piplan\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                if let Ok(content) = std::fs::read_to_string(&config_path) {
                    if let Ok(config) = toml::from_str(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.default_num_sprints, 5);
        assert_eq!(config.default_sprint_duration_days, 14);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str("default_num_sprints = 8").unwrap();
        assert_eq!(config.default_num_sprints, 8);
        assert_eq!(config.default_sprint_duration_days, 14);
    }
}
