use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub profile: ProfileConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served under `/static` (stylesheets, headshots)
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8501
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// SQLite database file. Relative paths are resolved against the
    /// directory of the config file they were read from.
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// JPEG quality used when re-encoding uploads (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_database() -> PathBuf {
    PathBuf::from("portfolio.db")
}
fn default_jpeg_quality() -> u8 {
    portfolio_imaging::DEFAULT_JPEG_QUALITY
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl StorageConfig {
    /// Anchor a relative database path at `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        if self.database.is_relative() {
            self.database = base.join(&self.database);
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Largest accepted file, in megabytes
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Largest accepted upload request (all files of one batch), in megabytes
    #[serde(default = "default_max_request_size_mb")]
    pub max_request_size_mb: u64,
}

fn default_max_file_size_mb() -> u64 {
    200
}
fn default_max_request_size_mb() -> u64 {
    1024
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
            max_request_size_mb: default_max_request_size_mb(),
        }
    }
}

impl UploadConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn max_request_size_bytes(&self) -> usize {
        usize::try_from(self.max_request_size_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

/// Text shown on the static pages.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfileConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_biography")]
    pub biography: String,

    #[serde(default = "default_filmography")]
    pub filmography: Vec<Credit>,

    #[serde(default)]
    pub contact: ContactConfig,
}

fn default_name() -> String {
    "[Actress Name]".to_string()
}
fn default_biography() -> String {
    "Here you can put the biography of the actress or any other details you want to share."
        .to_string()
}
fn default_filmography() -> Vec<Credit> {
    (1..=2)
        .map(|n| Credit {
            title: format!("Film Title {}", n),
            role: "Role".to_string(),
            year: "Year".to_string(),
        })
        .collect()
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            biography: default_biography(),
            filmography: default_filmography(),
            contact: ContactConfig::default(),
        }
    }
}

/// One filmography entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Credit {
    pub title: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub year: String,
}

impl std::fmt::Display for Credit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {} - {}", self.title, self.role, self.year)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContactConfig {
    #[serde(default = "default_email")]
    pub email: String,

    #[serde(default = "default_phone")]
    pub phone: String,

    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    #[serde(default = "default_agent_email")]
    pub agent_email: String,
}

fn default_email() -> String {
    "[actress_email@example.com]".to_string()
}
fn default_phone() -> String {
    "[(555) 123-4567]".to_string()
}
fn default_agent_name() -> String {
    "[Agent Name]".to_string()
}
fn default_agent_email() -> String {
    "[agent_contact@example.com]".to_string()
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            email: default_email(),
            phone: default_phone(),
            agent_name: default_agent_name(),
            agent_email: default_agent_email(),
        }
    }
}
