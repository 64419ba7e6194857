// Form state container with write-through session persistence.

use super::validation::ValidStep;
use crate::error::{WizardError, WizardResult};
use crate::models::state::{OrganizationInfo, ProblemDescription, StepData, UserInfo, WizardState};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Storage key the form state lives under.
pub const STORAGE_KEY: &str = "mediation-form";

/// Where the serialized form state goes. Values are JSON documents.
pub trait StateStorage {
    fn load(&self, key: &str) -> WizardResult<Option<String>>;
    fn save(&mut self, key: &str, value: &str) -> WizardResult<()>;
    fn clear(&mut self, key: &str) -> WizardResult<()>;
}

/// In-memory storage, for tests and for runs that must not touch the disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::default();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> WizardResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> WizardResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self, key: &str) -> WizardResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key in the session folder.
#[derive(Debug, Clone)]
pub struct SessionFileStorage {
    dir: PathBuf,
}

impl SessionFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> WizardResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(WizardError::Storage(format!("invalid storage key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl StateStorage for SessionFileStorage {
    fn load(&self, key: &str) -> WizardResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> WizardResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        // write-then-rename so a crash never leaves a truncated document behind
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn clear(&mut self, key: &str) -> WizardResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Owns the `WizardState`; every mutation is written through to the storage.
#[derive(Debug)]
pub struct FormStore<S: StateStorage> {
    state: WizardState,
    storage: S,
}

impl<S: StateStorage> FormStore<S> {
    /// Restore the persisted state. Missing or unreadable data yields the empty state.
    pub fn open(storage: S) -> Self {
        let state = match storage.load(STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<WizardState>(&json) {
                Ok(state) => {
                    debug!("[PHASE: store] [STEP: load] Restored persisted form state");
                    state
                }
                Err(e) => {
                    warn!(
                        "[PHASE: store] [STEP: load] Ignoring corrupt persisted form state: {}",
                        e
                    );
                    WizardState::default()
                }
            },
            Ok(None) => WizardState::default(),
            Err(e) => {
                warn!(
                    "[PHASE: store] [STEP: load] Failed to read persisted form state: {}",
                    e
                );
                WizardState::default()
            }
        };
        Self { state, storage }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Merge a validated step record into the state.
    pub fn commit(&mut self, step: ValidStep) -> WizardResult<()> {
        self.apply(step.into_inner())
    }

    pub fn apply(&mut self, data: StepData) -> WizardResult<()> {
        self.state.apply(data);
        self.persist()
    }

    pub fn update_user_info(&mut self, info: UserInfo) -> WizardResult<()> {
        self.apply(StepData::UserInfo(info))
    }

    pub fn update_problem_description(&mut self, problem: ProblemDescription) -> WizardResult<()> {
        self.apply(StepData::ProblemDescription(problem))
    }

    pub fn update_organization_info(&mut self, info: OrganizationInfo) -> WizardResult<()> {
        self.apply(StepData::OrganizationInfo(info))
    }

    /// Back to the empty state; the persisted copy is removed.
    pub fn reset(&mut self) -> WizardResult<()> {
        self.state = WizardState::default();
        self.storage.clear(STORAGE_KEY)
    }

    fn persist(&mut self) -> WizardResult<()> {
        let json = serde_json::to_string(&self.state)?;
        self.storage.save(STORAGE_KEY, &json)
    }
}
