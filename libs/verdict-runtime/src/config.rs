// Language and runtime configuration
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;
use verdict_common::types::Language;

pub const DEFAULT_LANGUAGES_FILE: &str = "config/languages.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    pub display_name: String,
    /// Language identifier understood by the execution service.
    pub language_id: u32,
    pub file_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagesJson {
    languages: Vec<LanguageConfig>,
}

/// Maps each supported language to its execution-service settings.
#[derive(Debug, Clone)]
pub struct LanguageConfigManager {
    configs: HashMap<String, LanguageConfig>,
}

impl LanguageConfigManager {
    /// Load language configurations from a languages.json file
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Language config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let languages_json: LanguagesJson =
            serde_json::from_str(content).context("Failed to parse languages.json")?;

        let mut configs = HashMap::new();
        for lang in languages_json.languages {
            let language: Language = lang
                .name
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .with_context(|| format!("Invalid language entry '{}'", lang.name))?;
            configs.insert(language.to_string(), lang);
        }

        Ok(Self { configs })
    }

    /// Load with default path (config/languages.json)
    pub fn load_default() -> Result<Self> {
        Self::load(Path::new(DEFAULT_LANGUAGES_FILE))
    }

    /// Load from `path`, falling back to the built-in table when it is missing.
    pub fn load_or_builtin(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "Language config not found, using built-in defaults");
            Ok(Self::builtin())
        }
    }

    /// Judge0 CE language ids.
    pub fn builtin() -> Self {
        let entries = [
            (Language::JavaScript, "JavaScript (Node.js)", 63, "script.js"),
            (Language::Python, "Python 3", 71, "script.py"),
            (Language::Cpp, "C++ (GCC)", 54, "main.cpp"),
            (Language::Java, "Java (OpenJDK)", 62, "Main.java"),
            (Language::Ruby, "Ruby", 72, "script.rb"),
        ];
        let configs = entries
            .into_iter()
            .map(|(language, display_name, language_id, file_name)| {
                (
                    language.to_string(),
                    LanguageConfig {
                        name: language.to_string(),
                        display_name: display_name.to_string(),
                        language_id,
                        file_name: file_name.to_string(),
                    },
                )
            })
            .collect();
        Self { configs }
    }

    /// Get configuration for a specific language
    pub fn get_config(&self, language: Language) -> Result<&LanguageConfig> {
        let lang_name = language.to_string();
        self.configs
            .get(&lang_name)
            .ok_or_else(|| anyhow::anyhow!("No configuration found for language: {}", lang_name))
    }

    pub fn language_id(&self, language: Language) -> Option<u32> {
        self.configs
            .get(language.as_str())
            .map(|config| config.language_id)
    }

    /// Configured languages, sorted by name
    pub fn list_languages(&self) -> Vec<String> {
        let mut names: Vec<String> = self.configs.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Settings for talking to the execution service and bounding a grading run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub service_url: String,
    pub api_key: Option<String>,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub max_concurrency: usize,
    pub grading_timeout: Duration,
    pub score_sink_url: Option<String>,
    pub languages_file: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:2358".to_string(),
            api_key: None,
            poll_interval: Duration::from_millis(1000),
            max_poll_attempts: 20,
            max_concurrency: 4,
            grading_timeout: Duration::from_millis(120_000),
            score_sink_url: None,
            languages_file: PathBuf::from(DEFAULT_LANGUAGES_FILE),
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let number = |key: &str, default: u64| {
            text(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        Self {
            service_url: text("VERDICT_SERVICE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.service_url),
            api_key: text("VERDICT_API_KEY"),
            poll_interval: Duration::from_millis(number(
                "VERDICT_POLL_INTERVAL_MS",
                defaults.poll_interval.as_millis() as u64,
            )),
            max_poll_attempts: number(
                "VERDICT_MAX_POLL_ATTEMPTS",
                defaults.max_poll_attempts as u64,
            ) as u32,
            max_concurrency: (number("VERDICT_MAX_CONCURRENCY", defaults.max_concurrency as u64)
                as usize)
                .max(1),
            grading_timeout: Duration::from_millis(number(
                "VERDICT_GRADING_TIMEOUT_MS",
                defaults.grading_timeout.as_millis() as u64,
            )),
            score_sink_url: text("VERDICT_SCORE_SINK_URL"),
            languages_file: text("VERDICT_LANGUAGES_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.languages_file),
        }
    }
}
