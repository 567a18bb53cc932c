//! Application configuration for the eduscol harvester.
//!
//! User config lives at `~/.eduscol/eduscol.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{EduscolError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "eduscol.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".eduscol";

// ---------------------------------------------------------------------------
// Config structs (matching eduscol.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Crawl settings.
    #[serde(default)]
    pub crawl: CrawlSection,

    /// Organizer settings.
    #[serde(default)]
    pub organize: OrganizeSection,

    /// Cycle identifier → document URLs not reachable through the crawl.
    #[serde(default = "default_static_resources")]
    pub static_resources: BTreeMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            crawl: CrawlSection::default(),
            organize: OrganizeSection::default(),
            static_resources: default_static_resources(),
        }
    }
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSection {
    /// Site root that carries the discipline navigation list.
    #[serde(default = "default_root_url")]
    pub root_url: String,

    /// Directory receiving `<discipline>/<label>.pdf` files.
    #[serde(default = "default_download_dir")]
    pub download_dir: String,

    /// Timeout for HTML page fetches.
    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    /// Timeout for document downloads.
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// Pause between successive disciplines.
    #[serde(default = "default_discipline_delay")]
    pub discipline_delay_ms: u64,

    /// Whether a harvest also fetches the `[static_resources]` documents.
    #[serde(default = "default_true")]
    pub include_static: bool,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            download_dir: default_download_dir(),
            page_timeout_secs: default_page_timeout(),
            download_timeout_secs: default_download_timeout(),
            discipline_delay_ms: default_discipline_delay(),
            include_static: true,
        }
    }
}

fn default_root_url() -> String {
    "https://eduscol.education.fr".into()
}
fn default_download_dir() -> String {
    "downloads".into()
}
fn default_page_timeout() -> u64 {
    10
}
fn default_download_timeout() -> u64 {
    20
}
fn default_discipline_delay() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

/// `[organize]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeSection {
    /// Tree of extracted `.txt` files, one directory per discipline or cycle.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Root of the `<niveau>/...` taxonomy tree.
    #[serde(default = "default_target_dir")]
    pub target_dir: String,
}

impl Default for OrganizeSection {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            target_dir: default_target_dir(),
        }
    }
}

fn default_source_dir() -> String {
    "data/programmes/txt".into()
}
fn default_target_dir() -> String {
    "data_structured".into()
}

/// Cycle documents published outside the crawlable program pages.
fn default_static_resources() -> BTreeMap<String, Vec<String>> {
    let entries: [(&str, &[&str]); 4] = [
        (
            "cycle1",
            &[
                "https://www.education.gouv.fr/sites/default/files/ensel135_annexe1.pdf",
                "https://www.education.gouv.fr/sites/default/files/ensel135_annexe2.pdf",
            ],
        ),
        (
            "cycle2",
            &["https://cache.media.education.gouv.fr/file/31/88/5/ensel714_annexe1_1312885.pdf"],
        ),
        (
            "cycle3",
            &["https://cache.media.education.gouv.fr/file/31/88/7/ensel714_annexe2_1312887.pdf"],
        ),
        (
            "cycle4",
            &["https://cache.media.education.gouv.fr/file/31/89/1/ensel714_annexe3_1312891.pdf"],
        ),
    ];

    entries
        .into_iter()
        .map(|(cycle, urls)| {
            (
                cycle.to_string(),
                urls.iter().map(|u| u.to_string()).collect(),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime harvest configuration.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Site root carrying the discipline list.
    pub root_url: String,
    /// Output directory for downloaded documents.
    pub download_dir: PathBuf,
    /// Timeout for HTML page fetches.
    pub page_timeout: Duration,
    /// Timeout for document downloads.
    pub download_timeout: Duration,
    /// Pause inserted between successive disciplines.
    pub discipline_delay: Duration,
    /// Also fetch the static cycle documents after the crawl.
    pub include_static: bool,
    /// Cycle identifier → document URLs.
    pub static_resources: BTreeMap<String, Vec<String>>,
}

impl HarvestConfig {
    /// Parse and validate the configured root URL.
    pub fn root(&self) -> Result<Url> {
        let url = Url::parse(&self.root_url).map_err(|e| {
            EduscolError::config(format!("invalid root_url '{}': {e}", self.root_url))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(EduscolError::config(format!(
                "root_url must be http(s), got scheme '{other}'"
            ))),
        }
    }
}

impl From<&AppConfig> for HarvestConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            root_url: config.crawl.root_url.clone(),
            download_dir: PathBuf::from(&config.crawl.download_dir),
            page_timeout: Duration::from_secs(config.crawl.page_timeout_secs),
            download_timeout: Duration::from_secs(config.crawl.download_timeout_secs),
            discipline_delay: Duration::from_millis(config.crawl.discipline_delay_ms),
            include_static: config.crawl.include_static,
            static_resources: config.static_resources.clone(),
        }
    }
}

/// Runtime organizer configuration.
#[derive(Debug, Clone)]
pub struct OrganizeConfig {
    /// Tree of extracted text files.
    pub source_dir: PathBuf,
    /// Root of the taxonomy tree.
    pub target_dir: PathBuf,
}

impl From<&AppConfig> for OrganizeConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            source_dir: PathBuf::from(&config.organize.source_dir),
            target_dir: PathBuf::from(&config.organize.target_dir),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.eduscol/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| EduscolError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.eduscol/eduscol.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| EduscolError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| EduscolError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| EduscolError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| EduscolError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| EduscolError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("root_url"));
        assert!(toml_str.contains("ensel714_annexe3_1312891.pdf"));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config: AppConfig = toml::from_str("").expect("parse empty");
        assert_eq!(config.crawl.root_url, "https://eduscol.education.fr");
        assert_eq!(config.crawl.page_timeout_secs, 10);
        assert_eq!(config.crawl.download_timeout_secs, 20);
        assert_eq!(config.static_resources.len(), 4);
        assert_eq!(config.static_resources["cycle1"].len(), 2);
    }

    #[test]
    fn static_resources_can_be_overridden() {
        let toml_str = r#"
[crawl]
download_dir = "/tmp/dl"
discipline_delay_ms = 0

[static_resources]
cycle9 = ["https://example.com/a.pdf"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.crawl.download_dir, "/tmp/dl");
        assert_eq!(config.static_resources.len(), 1);
        assert_eq!(config.static_resources["cycle9"], vec!["https://example.com/a.pdf"]);
    }

    #[test]
    fn harvest_config_from_app_config() {
        let app = AppConfig::default();
        let harvest = HarvestConfig::from(&app);
        assert_eq!(harvest.page_timeout, Duration::from_secs(10));
        assert_eq!(harvest.discipline_delay, Duration::from_millis(1000));
        assert_eq!(harvest.download_dir, PathBuf::from("downloads"));
        assert!(harvest.include_static);
        assert!(harvest.root().is_ok());
    }

    #[test]
    fn root_url_must_be_http() {
        let mut harvest = HarvestConfig::from(&AppConfig::default());
        harvest.root_url = "ftp://example.com".into();
        assert!(harvest.root().is_err());

        harvest.root_url = "not a url".into();
        let err = harvest.root().unwrap_err();
        assert!(err.to_string().contains("invalid root_url"));
    }

    #[test]
    fn load_config_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[crawl\nroot_url = 1").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn load_config_from_reads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eduscol.toml");
        std::fs::write(&path, "[organize]\ntarget_dir = \"out\"\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.organize.target_dir, "out");
        assert_eq!(config.organize.source_dir, "data/programmes/txt");
    }
}
