// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::path::{Path, PathBuf};
use config::{Config, ConfigError, Environment, File};

use crate::knn::distance;

/// Configuration for the HTTP classification server
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to listen on
    pub port: u16,
    /// Name announced in the welcome message
    pub classifier_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            classifier_name: "classifier_skeleton".to_string(),
        }
    }
}

impl ServerConfig {
    /// `"<classifier_name> running on server <host>:<port>"`
    pub fn welcome_message(&self) -> String {
        format!("{} running on server {}:{}", self.classifier_name, self.host, self.port)
    }
}

/// Where the label table comes from
#[derive(Debug, Deserialize, Clone)]
pub struct LabelsConfig {
    /// URL the label file is downloaded from
    pub url: String,
    /// Directory the downloaded file is cached in
    pub cache_dir: PathBuf,
    /// Name of the cached file
    pub file_name: String,
    /// Local label file; when set no download happens
    pub file: Option<PathBuf>,
}

/// Configuration for top-k reporting
#[derive(Debug, Deserialize, Clone)]
pub struct ReporterConfig {
    /// Number of predictions to report
    pub top_k: usize,
}

/// Configuration for zero-shot tagging
#[derive(Debug, Deserialize, Clone)]
pub struct TaggerConfig {
    /// Registered classifier name, see `imtag classifiers`
    pub classifier: String,
    /// Number of registered labels returned per image
    pub neighbours: usize,
    /// Distance used for the nearest label search
    pub distance: String,
    /// Directory holding the skip-gram word vectors
    pub word_vectors: PathBuf,
    /// JSON file of registered labels
    pub label_store: PathBuf,
    /// Skip zero-shot tagging and print classifier output only
    pub raw_classifier_results: bool,
    /// Keep only predictions scoring above this, instead of the top k
    pub confidence: Option<f32>,
    /// Synset id to lemma mapping used to embed registered synset ids
    pub synsets: Option<PathBuf>,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Optional log directory
    pub file: Option<PathBuf>,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub labels: LabelsConfig,
    pub reporter: ReporterConfig,
    pub tagger: TaggerConfig,
    pub logging: LoggingConfig,
}

/// Implementation for loading and parsing configuration
impl Settings {
    /// Creates a new Settings instance by loading config from multiple sources
    /// in the following order of precedence (highest to lowest):
    /// 1. Environment variables prefixed with IMTAG_ (e.g. IMTAG_SERVER__PORT=8080)
    /// 2. Local config file (config/local.toml) if present
    /// 3. Default config file (config/default.toml)
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(
                format!("Failed to get current directory: {}", e)
            ))?
            .join("config");

        let default_config = config_dir.join("default.toml");
        if !default_config.exists() {
            return Err(ConfigError::Message(
                format!("Default configuration file not found at: {}", default_config.display())
            ));
        }

        Self::load(&default_config, Some(&config_dir.join("local.toml")))
    }

    /// Loads settings from an explicit file, still honouring IMTAG_ variables.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Message(
                format!("Configuration file not found at: {}", path.display())
            ));
        }
        Self::load(path, None)
    }

    fn load(primary: &Path, overlay: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::from(primary));
        if let Some(overlay) = overlay {
            builder = builder.add_source(File::from(overlay).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("IMTAG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "Port must be between 1 and 65535, got: 0".to_string()
            ));
        }

        if self.reporter.top_k == 0 {
            return Err(ConfigError::Message(
                "top_k must be greater than 0".to_string()
            ));
        }

        if self.tagger.neighbours == 0 {
            return Err(ConfigError::Message(
                "neighbours must be greater than 0".to_string()
            ));
        }

        if let Some(confidence) = self.tagger.confidence {
            validate_confidence(confidence)?;
        }

        if distance::by_name(&self.tagger.distance).is_none() {
            return Err(ConfigError::Message(
                format!("Unknown distance: {}. Must be one of: cosine, chi2, euclidean, manhattan",
                    self.tagger.distance)
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }
    }
}

/// Confidence thresholds must lie strictly between 0 and 1.
pub fn validate_confidence(confidence: f32) -> Result<(), ConfigError> {
    if confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Message(
            format!("confidence must be between 0 and 1, got: {}", confidence)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = r#"
[server]
host = "127.0.0.1"
port = 5000
classifier_name = "classifier_skeleton"

[labels]
url = "https://example.com/labels.txt"
cache_dir = "data"
file_name = "ImageNetLabels.txt"

[reporter]
top_k = 10

[tagger]
classifier = "VGG19"
neighbours = 5
distance = "cosine"
word_vectors = "data/skipGram"
label_store = "data/labelstore.json"
raw_classifier_results = false

[logging]
level = "info"
"#;

    fn write(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_from_file() {
        let (_dir, path) = write(SAMPLE);
        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.reporter.top_k, 10);
        assert!(settings.labels.file.is_none());
        assert!(settings.logging.file.is_none());
        assert!(settings.tagger.confidence.is_none());
        assert!(settings.tagger.synsets.is_none());
    }

    #[test]
    fn test_confidence_bounds() {
        let with = |c: &str| SAMPLE.replace("raw_classifier_results = false",
            &format!("raw_classifier_results = false\nconfidence = {}", c));

        let (_dir, path) = write(&with("0.25"));
        assert_eq!(Settings::from_file(&path).unwrap().tagger.confidence, Some(0.25));

        for bad in ["0.0", "1.0", "1.5"] {
            let (_dir, path) = write(&with(bad));
            assert!(Settings::from_file(&path).is_err(), "confidence {} accepted", bad);
        }
        assert!(validate_confidence(f32::NAN).is_err());
    }

    #[test]
    fn test_rejects_zero_top_k() {
        let (_dir, path) = write(&SAMPLE.replace("top_k = 10", "top_k = 0"));
        assert!(Settings::from_file(&path).is_err());
    }

    #[test]
    fn test_rejects_unknown_distance() {
        let (_dir, path) = write(&SAMPLE.replace("\"cosine\"", "\"hamming\""));
        assert!(Settings::from_file(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(Settings::from_file(Path::new("/no/such/settings.toml")).is_err());
    }

    #[test]
    fn test_welcome_message() {
        assert_eq!(
            ServerConfig::default().welcome_message(),
            "classifier_skeleton running on server 0.0.0.0:5000"
        );
    }
}
