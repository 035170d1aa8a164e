//! Model artifact storage and readiness.
//!
//! The artifact lives at a single path. Readers load it fresh on every
//! call under a shared lock; install and delete take the exclusive lock,
//! so a reader never observes a half-written or half-deleted file.
//!
//! Readiness is explicit: callers either check [`ModelStore::readiness`],
//! try a single load, or wait with bounded exponential backoff.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::classifier::ModelArtifact;
use crate::error::{AllotError, Result};

/// Bounded exponential backoff used while waiting for a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessPolicy {
    /// First delay between load attempts.
    pub initial_backoff_ms: u64,
    /// Upper bound on any single delay.
    pub max_backoff_ms: u64,
    /// Delay growth factor per attempt.
    pub multiplier: f64,
    /// Total time to wait before giving up.
    pub deadline_ms: u64,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 100,
            max_backoff_ms: 2_000,
            multiplier: 2.0,
            deadline_ms: 10_000,
        }
    }
}

impl ReadinessPolicy {
    /// A policy that never waits.
    pub fn immediate() -> Self {
        Self {
            deadline_ms: 0,
            ..Self::default()
        }
    }

    /// Rejects policies whose delays would not grow or could not be slept.
    pub fn validate(&self) -> Result<()> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(AllotError::Config {
                message: format!(
                    "model.readiness.multiplier must be >= 1, got {}",
                    self.multiplier
                ),
            });
        }
        if self.initial_backoff_ms == 0 && self.deadline_ms > 0 {
            return Err(AllotError::Config {
                message: "model.readiness.initial_backoff_ms must be > 0".into(),
            });
        }
        Ok(())
    }

    /// Delay sequence, capped at `max_backoff_ms`. Unbounded; the caller
    /// enforces the deadline.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        let max = self.max_backoff_ms as f64;
        std::iter::successors(Some(self.initial_backoff_ms as f64), move |&ms| {
            Some((ms * self.multiplier).min(max))
        })
        .map(move |ms| Duration::from_millis(ms.min(max) as u64))
    }

    fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

/// Whether a model is available right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// An artifact file is present.
    Ready { generation: u64 },
    /// No artifact has been installed, or it was deleted.
    NotReady,
}

/// An artifact snapshot and the store generation it was read under.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// The artifact read from disk.
    pub artifact: ModelArtifact,
    /// Store generation the artifact was read under.
    pub generation: u64,
}

/// File-backed model artifact store.
#[derive(Debug)]
pub struct ModelStore {
    path: PathBuf,
    lock: RwLock<()>,
    generation: AtomicU64,
}

impl ModelStore {
    /// Creates a store for the artifact at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Artifact path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Incremented on every install and every effective delete.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether a loadable model is installed right now.
    pub fn readiness(&self) -> Readiness {
        let _guard = self.read_guard();
        if self.path.is_file() {
            Readiness::Ready {
                generation: self.generation(),
            }
        } else {
            Readiness::NotReady
        }
    }

    /// Loads the artifact once.
    ///
    /// # Errors
    /// - `NotReady` if no artifact file exists.
    /// - `Artifact` if the file is corrupt or inconsistent.
    pub fn try_load(&self) -> Result<LoadedModel> {
        let _guard = self.read_guard();
        let artifact = ModelArtifact::read_from(&self.path)?;
        Ok(LoadedModel {
            artifact,
            generation: self.generation(),
        })
    }

    /// Loads the artifact, retrying with backoff while it is absent.
    ///
    /// Only `NotReady` is retried. Gives up once `policy.deadline_ms` has
    /// elapsed, returning `NotReady` with the time actually waited.
    pub fn wait_for_model(&self, policy: &ReadinessPolicy) -> Result<LoadedModel> {
        let started = Instant::now();
        let deadline = policy.deadline();
        let mut delays = policy.delays();

        loop {
            match self.try_load() {
                Err(AllotError::NotReady { .. }) => {}
                other => return other,
            }

            let elapsed = started.elapsed();
            if elapsed >= deadline {
                return Err(AllotError::NotReady {
                    path: self.path.clone(),
                    waited_ms: elapsed.as_millis() as u64,
                });
            }
            let delay = delays
                .next()
                .unwrap_or(deadline)
                .min(deadline - elapsed);
            debug!(path = %self.path.display(), ?delay, "model not ready, retrying");
            std::thread::sleep(delay);
        }
    }

    /// Atomically replaces the stored artifact.
    ///
    /// Writes to a sibling temp file and renames it over the target, so
    /// concurrent readers see either the old or the new artifact.
    pub fn install(&self, artifact: &ModelArtifact) -> Result<u64> {
        artifact.validate()?;
        let _guard = self.write_guard();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        artifact.write_to(&tmp)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(path = %self.path.display(), generation, "model installed");
        Ok(generation)
    }

    /// Removes the artifact. Returns whether a file was removed.
    ///
    /// Deleting an absent artifact is not an error.
    pub fn delete(&self) -> Result<bool> {
        let _guard = self.write_guard();
        match fs::remove_file(&self.path) {
            Ok(()) => {
                let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
                info!(path = %self.path.display(), generation, "model deleted");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "delete requested but no model present");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    // The lock guards no data, only file access ordering.
    fn read_guard(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{BaggedTrees, DecisionTree};
    use crate::features::FeatureSchema;
    use std::sync::Arc;
    use std::thread;

    fn artifact() -> ModelArtifact {
        let model = BaggedTrees::new(1, vec![DecisionTree::leaf([1.0, 0.0, 0.0])]).unwrap();
        ModelArtifact::new(model, FeatureSchema::new(["alice"]).unwrap()).unwrap()
    }

    fn fast_policy(deadline_ms: u64) -> ReadinessPolicy {
        ReadinessPolicy {
            initial_backoff_ms: 5,
            max_backoff_ms: 20,
            multiplier: 2.0,
            deadline_ms,
        }
    }

    #[test]
    fn test_empty_store_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model.json"));
        assert_eq!(store.readiness(), Readiness::NotReady);
        assert!(matches!(
            store.try_load().unwrap_err(),
            AllotError::NotReady { .. }
        ));
    }

    #[test]
    fn test_install_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("nested").join("model.json"));
        let generation = store.install(&artifact()).unwrap();
        assert_eq!(generation, 1);
        assert_eq!(store.readiness(), Readiness::Ready { generation: 1 });

        let loaded = store.try_load().unwrap();
        assert_eq!(loaded.artifact, artifact());
        assert_eq!(loaded.generation, 1);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model.json"));
        store.install(&artifact()).unwrap();

        assert!(store.delete().unwrap());
        assert!(!store.delete().unwrap());
        assert_eq!(store.readiness(), Readiness::NotReady);
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn test_wait_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model.json"));
        let started = Instant::now();
        let err = store.wait_for_model(&fast_policy(40)).unwrap_err();
        assert!(err.is_retryable());
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_immediate_policy_does_not_sleep() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model.json"));
        let err = store
            .wait_for_model(&ReadinessPolicy::immediate())
            .unwrap_err();
        assert!(matches!(err, AllotError::NotReady { .. }));
    }

    #[test]
    fn test_wait_sees_model_installed_later() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ModelStore::new(dir.path().join("model.json")));

        let installer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                store.install(&artifact()).unwrap();
            })
        };
        let loaded = store.wait_for_model(&fast_policy(5_000)).unwrap();
        installer.join().unwrap();
        assert_eq!(loaded.generation, 1);
    }

    #[test]
    fn test_corrupt_artifact_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, "{ not json").unwrap();
        let store = ModelStore::new(&path);

        let started = Instant::now();
        let err = store.wait_for_model(&fast_policy(5_000)).unwrap_err();
        assert!(matches!(err, AllotError::Artifact { .. }));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_backoff_delays_capped() {
        let delays: Vec<u64> = fast_policy(0)
            .delays()
            .take(5)
            .map(|d| d.as_millis() as u64)
            .collect();
        assert_eq!(delays, [5, 10, 20, 20, 20]);
    }

    #[test]
    fn test_policy_validation() {
        assert!(ReadinessPolicy::default().validate().is_ok());
        let bad = ReadinessPolicy {
            multiplier: 0.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
