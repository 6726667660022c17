//! Artifact persistence: trained models and intermediate datasets as JSON
//! files under a fixed directory layout.
//!
//! Layout under the artifact root:
//!
//! ```text
//! Collaborative_Filtering/best_cf.json
//! Content_Based_Filtering/best_cbf.json
//! Data/final_df.json
//! Data/user_split.json
//! Data/train_data.json
//! Data/test_data.json
//! ```
//!
//! Remote transfer of this directory is somebody else's job; the store
//! only ever touches the local filesystem.

use recommerce_core::{RecError, RecResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn cf_model_path(&self) -> PathBuf {
        self.root.join("Collaborative_Filtering").join("best_cf.json")
    }

    pub fn cbf_model_path(&self) -> PathBuf {
        self.root
            .join("Content_Based_Filtering")
            .join("best_cbf.json")
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.root.join("Data").join("final_df.json")
    }

    pub fn user_split_path(&self) -> PathBuf {
        self.root.join("Data").join("user_split.json")
    }

    pub fn train_path(&self) -> PathBuf {
        self.root.join("Data").join("train_data.json")
    }

    pub fn test_path(&self) -> PathBuf {
        self.root.join("Data").join("test_data.json")
    }

    /// Serialize `value` to `path`, creating parent directories as needed.
    pub fn save<T: Serialize>(&self, value: &T, path: &Path) -> RecResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), value)?;
        info!(path = %path.display(), "Saved artifact");
        Ok(())
    }

    /// Load a model artifact. A missing or undeserializable file is
    /// `ModelUnavailable`; the caller decides whether to switch strategy.
    pub fn load_model<T: DeserializeOwned>(&self, path: &Path) -> RecResult<T> {
        let file = File::open(path).map_err(|e| {
            RecError::ModelUnavailable(format!("{}: {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| RecError::ModelUnavailable(format!("{}: {e}", path.display())))
    }

    /// Load a dataset artifact. Missing or corrupt data is `DataUnavailable`.
    pub fn load_data<T: DeserializeOwned>(&self, path: &Path) -> RecResult<T> {
        let file = File::open(path).map_err(|e| {
            RecError::DataUnavailable(format!("{}: {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| RecError::DataUnavailable(format!("{}: {e}", path.display())))
    }
}
