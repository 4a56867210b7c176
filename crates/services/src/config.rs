use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_DB_URL: &str = "sqlite://practice.sqlite3?mode=rwc";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the question generation backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl GeneratorConfig {
    /// Read `DECA_API_*` variables. Returns `None` when no API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let api_key = lookup("DECA_API_KEY")?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = lookup("DECA_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout = lookup("DECA_API_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);
        Some(Self {
            base_url,
            api_key: api_key.trim().to_owned(),
            timeout,
        })
    }
}

/// Process-level configuration for the practice services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PracticeConfig {
    pub db_url: String,
    pub generator: Option<GeneratorConfig>,
    pub require_answer_to_advance: bool,
}

impl PracticeConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_url = lookup("DECA_DB_URL")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let require_answer_to_advance = lookup("DECA_REQUIRE_ANSWER")
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
        Self {
            db_url,
            generator: GeneratorConfig::from_lookup(&lookup),
            require_answer_to_advance,
        }
    }
}

/// Turn `sqlite:relative.db` or a bare path into an absolute `sqlite://` URL
/// that creates the file when missing.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("sqlite::memory:") || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}?mode=rwc", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn generator_disabled_without_key() {
        assert_eq!(GeneratorConfig::from_lookup(lookup(&[])), None);
        assert_eq!(
            GeneratorConfig::from_lookup(lookup(&[("DECA_API_KEY", "  ")])),
            None
        );
    }

    #[test]
    fn generator_defaults_and_overrides() {
        let config = GeneratorConfig::from_lookup(lookup(&[("DECA_API_KEY", "k")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));

        let config = GeneratorConfig::from_lookup(lookup(&[
            ("DECA_API_KEY", "k"),
            ("DECA_API_BASE_URL", "https://example.test/api"),
            ("DECA_API_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://example.test/api");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn practice_config_reads_guard_flag() {
        let config = PracticeConfig::from_lookup(lookup(&[("DECA_REQUIRE_ANSWER", "Yes")]));
        assert!(config.require_answer_to_advance);
        assert_eq!(config.db_url, DEFAULT_DB_URL);
        assert!(config.generator.is_none());
    }

    #[test]
    fn sqlite_urls_are_normalized() {
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/a.db".into()),
            "sqlite:///tmp/a.db"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:/var/deca.db".into()),
            "sqlite:///var/deca.db?mode=rwc"
        );
    }

    #[test]
    fn relative_sqlite_paths_resolve_against_current_dir() {
        let cwd = env::current_dir().unwrap();
        let expected = format!("sqlite://{}?mode=rwc", cwd.join("practice.sqlite3").display());

        assert_eq!(normalize_sqlite_url("practice.sqlite3".into()), expected);
        assert_eq!(normalize_sqlite_url("sqlite:practice.sqlite3".into()), expected);

        let config = PracticeConfig::from_lookup(lookup(&[("DECA_DB_URL", "practice.sqlite3")]));
        assert_eq!(config.db_url, expected);
    }
}
