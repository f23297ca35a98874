//! On-disk model artifacts, one JSON file per symbol.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use stocksense_core::Symbol;
use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::forest::RandomForestRegressor;

/// Directory of `{SYMBOL}_model` artifacts.
///
/// Artifacts are never validated or expired; a present file is trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.dir.join(format!("{}_model", symbol.as_str()))
    }

    pub fn exists(&self, symbol: &Symbol) -> bool {
        self.path_for(symbol).is_file()
    }

    /// Write through a temp file in the same directory, then rename over the target.
    pub fn save(
        &self,
        symbol: &Symbol,
        model: &RandomForestRegressor,
    ) -> Result<PathBuf, StoreError> {
        let path = self.path_for(symbol);
        let encoded = serde_json::to_vec(model).map_err(StoreError::Encode)?;

        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let io_error = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        let mut file = NamedTempFile::new_in(&self.dir).map_err(io_error)?;
        file.write_all(&encoded).map_err(io_error)?;
        file.as_file().sync_all().map_err(io_error)?;
        file.persist(&path)
            .map_err(|error| io_error(error.error))?;

        tracing::debug!(
            %symbol,
            path = %path.display(),
            bytes = encoded.len(),
            "model artifact written"
        );
        Ok(path)
    }

    pub fn load(&self, symbol: &Symbol) -> Result<Option<RandomForestRegressor>, StoreError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let model = serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Decode { path, source })?;
        Ok(Some(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::ForestConfig;

    fn tiny_model() -> RandomForestRegressor {
        let config = ForestConfig {
            n_trees: 4,
            ..ForestConfig::default()
        };
        RandomForestRegressor::fit(
            &config,
            &[vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
            &[10.0, 20.0, 30.0, 40.0],
            &["x"],
        )
        .expect("fit succeeds")
    }

    fn symbol(value: &str) -> Symbol {
        Symbol::parse(value).expect("valid symbol")
    }

    #[test]
    fn artifact_path_uses_uppercase_symbol() {
        let store = ModelStore::new("models");
        assert_eq!(
            store.path_for(&symbol("reliance")),
            PathBuf::from("models").join("RELIANCE_model")
        );
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = ModelStore::new(temp.path().join("nested").join("models"));
        let model = tiny_model();

        assert!(!store.exists(&symbol("TCS")));
        let path = store.save(&symbol("TCS"), &model).expect("save succeeds");
        assert!(path.is_file());
        assert!(store.exists(&symbol("TCS")));

        let loaded = store
            .load(&symbol("TCS"))
            .expect("load succeeds")
            .expect("artifact present");
        assert_eq!(
            loaded.predict_one(&[2.5]).expect("prediction"),
            model.predict_one(&[2.5]).expect("prediction")
        );
    }

    #[test]
    fn missing_artifact_loads_as_none() {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = ModelStore::new(temp.path());
        assert!(store.load(&symbol("INFY")).expect("load succeeds").is_none());
    }

    #[test]
    fn corrupt_artifact_is_a_decode_error() {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = ModelStore::new(temp.path());
        fs::write(store.path_for(&symbol("INFY")), b"not json").expect("write");

        let error = store.load(&symbol("INFY")).expect_err("decode fails");
        assert!(matches!(error, StoreError::Decode { .. }));
    }

    #[test]
    fn second_save_overwrites() {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = ModelStore::new(temp.path());
        store.save(&symbol("TCS"), &tiny_model()).expect("first save");
        store.save(&symbol("TCS"), &tiny_model()).expect("second save");

        let entries = fs::read_dir(temp.path()).expect("read dir").count();
        assert_eq!(entries, 1, "temp files must not linger");
    }
}
