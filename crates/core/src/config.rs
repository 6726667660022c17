use serde::Deserialize;
use std::path::Path;

/// Root application configuration. Loaded from an optional TOML config file
/// and environment variables with the prefix `RECOMMERCE__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub collaborative: CollaborativeConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub artifacts: ArtifactConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Path to the raw product listing export (CSV).
    #[serde(default = "default_data_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Seed for the shuffle and for model initialization.
    #[serde(default = "default_random_state")]
    pub random_state: u64,
}

/// Parameters of the biased matrix-factorization model.
#[derive(Debug, Clone, Deserialize)]
pub struct CollaborativeConfig {
    #[serde(default = "default_n_factors")]
    pub n_factors: usize,
    #[serde(default = "default_n_epochs")]
    pub n_epochs: usize,
    #[serde(default = "default_lr_all")]
    pub lr_all: f64,
    #[serde(default = "default_reg_all")]
    pub reg_all: f64,
    #[serde(default = "default_rating_min")]
    pub rating_min: f64,
    #[serde(default = "default_rating_max")]
    pub rating_max: f64,
    #[serde(default = "default_init_std")]
    pub init_std: f64,
}

/// Parameters of the content-based pipeline: which feature columns it
/// consumes and how the boosted regressor is shaped.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_numeric_features")]
    pub numeric_features: Vec<String>,
    #[serde(default = "default_text_feature")]
    pub text_feature: String,
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    /// Root directory for persisted models and datasets.
    #[serde(default = "default_artifact_dir")]
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

// Default functions
fn default_data_path() -> String {
    "data/amazon.csv".to_string()
}
fn default_test_size() -> f64 {
    0.2
}
fn default_random_state() -> u64 {
    42
}
fn default_n_factors() -> usize {
    80
}
fn default_n_epochs() -> usize {
    20
}
fn default_lr_all() -> f64 {
    0.005
}
fn default_reg_all() -> f64 {
    0.02
}
fn default_rating_min() -> f64 {
    0.0
}
fn default_rating_max() -> f64 {
    5.0
}
fn default_init_std() -> f64 {
    0.1
}
fn default_numeric_features() -> Vec<String> {
    vec![
        "discounted_price".to_string(),
        "discount_percentage".to_string(),
    ]
}
fn default_text_feature() -> String {
    "review_title".to_string()
}
fn default_max_features() -> usize {
    1000
}
fn default_n_estimators() -> usize {
    50
}
fn default_learning_rate() -> f64 {
    0.1
}
fn default_max_depth() -> usize {
    3
}
fn default_artifact_dir() -> String {
    "artifacts".to_string()
}
fn default_top_n() -> usize {
    10
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: default_test_size(),
            random_state: default_random_state(),
        }
    }
}

impl Default for CollaborativeConfig {
    fn default() -> Self {
        Self {
            n_factors: default_n_factors(),
            n_epochs: default_n_epochs(),
            lr_all: default_lr_all(),
            reg_all: default_reg_all(),
            rating_min: default_rating_min(),
            rating_max: default_rating_max(),
            init_std: default_init_std(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            numeric_features: default_numeric_features(),
            text_feature: default_text_feature(),
            max_features: default_max_features(),
            n_estimators: default_n_estimators(),
            learning_rate: default_learning_rate(),
            max_depth: default_max_depth(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: default_artifact_dir(),
        }
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            split: SplitConfig::default(),
            collaborative: CollaborativeConfig::default(),
            content: ContentConfig::default(),
            artifacts: ArtifactConfig::default(),
            recommend: RecommendConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional config file plus environment
    /// variable overrides.
    pub fn load(config_file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("RECOMMERCE")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.recommend.top_n, 10);
        assert!(config.split.test_size > 0.0 && config.split.test_size < 1.0);
        assert_eq!(config.content.text_feature, "review_title");
        assert!(config
            .content
            .numeric_features
            .contains(&"discounted_price".to_string()));
        assert!(config.collaborative.rating_max > config.collaborative.rating_min);
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let config = AppConfig::load(None).expect("load from env only");
        assert_eq!(config.artifacts.dir, "artifacts");
    }
}
