mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config = parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if let Some(dir) = path.parent() {
        config.storage.resolve_relative_to(dir);
    }

    Ok(config)
}

/// Parse and validate configuration text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./portfolio.toml",
        "./config.toml",
        "~/.config/portfolio/config.toml",
        "/etc/portfolio/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if !(1..=100).contains(&config.storage.jpeg_quality) {
        anyhow::bail!(
            "JPEG quality must be between 1 and 100, got {}",
            config.storage.jpeg_quality
        );
    }

    if config.upload.max_file_size_mb == 0 {
        anyhow::bail!("Maximum upload size must be greater than 0");
    }

    if config.upload.max_request_size_mb < config.upload.max_file_size_mb {
        anyhow::bail!(
            "Maximum request size ({} MB) is smaller than the maximum file size ({} MB)",
            config.upload.max_request_size_mb,
            config.upload.max_file_size_mb
        );
    }

    if let Some(dir) = &config.server.static_dir {
        if !dir.exists() {
            tracing::warn!("Static directory does not exist: {:?}", dir);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.storage.database, PathBuf::from("portfolio.db"));
        assert_eq!(config.storage.jpeg_quality, 75);
        assert_eq!(config.upload.max_file_size_mb, 200);
        assert_eq!(config.profile.name, "[Actress Name]");
        assert_eq!(
            config.profile.filmography[0].to_string(),
            "Film Title 1 - Role - Year"
        );
    }

    #[test]
    fn test_partial_profile() {
        let config = parse_config(
            r#"
            [profile]
            name = "Jane Doe"
            filmography = [{ title = "Night Train", role = "Lead", year = "2021" }]

            [profile.contact]
            email = "jane@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.profile.name, "Jane Doe");
        assert_eq!(config.profile.filmography.len(), 1);
        assert_eq!(config.profile.contact.email, "jane@example.com");
        assert_eq!(config.profile.contact.agent_name, "[Agent Name]");
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(parse_config("[server]\nport = 0").is_err());
        assert!(parse_config("[storage]\njpeg_quality = 0").is_err());
        assert!(parse_config("[storage]\njpeg_quality = 101").is_err());
        assert!(parse_config("[upload]\nmax_file_size_mb = 0").is_err());
        assert!(parse_config("[upload]\nmax_file_size_mb = 50\nmax_request_size_mb = 10").is_err());
    }

    #[test]
    fn test_database_relative_to_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.toml");
        std::fs::write(&path, "[storage]\ndatabase = \"data/gallery.db\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.storage.database, dir.path().join("data/gallery.db"));
    }

    #[test]
    fn test_absolute_database_kept() {
        let mut storage = StorageConfig {
            database: PathBuf::from("/var/lib/portfolio.db"),
            jpeg_quality: 75,
        };
        storage.resolve_relative_to(Path::new("/etc/portfolio"));
        assert_eq!(storage.database, PathBuf::from("/var/lib/portfolio.db"));
    }

    #[test]
    fn test_missing_file() {
        assert!(load_config(Path::new("/nonexistent/portfolio.toml")).is_err());
    }
}
