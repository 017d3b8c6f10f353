//! Schema migrations - an ordered table of pure map transforms
//!
//! The transform registered at version `v` turns a payload written by
//! schema `v` into one readable by schema `v + 1`. Transforms receive and
//! return the whole state map, so they may add, remove or rename fields.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A JSON object, the shape every state payload takes on disk
pub type JsonMap = Map<String, Value>;

/// One migration step
pub type MigrationFn = Box<dyn Fn(JsonMap) -> JsonMap>;

/// Migration steps keyed by the schema version they migrate from
///
/// # Example
///
/// ```
/// use catchup_save::{JsonMap, MigrationChain};
///
/// let chain = MigrationChain::new()
///     .with(0, |mut state: JsonMap| {
///         if let Some(coins) = state.remove("coins") {
///             state.insert("gold".into(), coins);
///         }
///         state
///     });
/// assert!(chain.contains(0));
/// assert!(!chain.contains(1));
/// ```
#[derive(Default)]
pub struct MigrationChain {
    steps: BTreeMap<u32, MigrationFn>,
}

impl MigrationChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the step migrating from `from_version`, builder style
    pub fn with<F>(mut self, from_version: u32, step: F) -> Self
    where
        F: Fn(JsonMap) -> JsonMap + 'static,
    {
        self.register(from_version, step);
        self
    }

    /// Add the step migrating from `from_version`
    ///
    /// Returns true if it replaced a step already registered there.
    pub fn register<F>(&mut self, from_version: u32, step: F) -> bool
    where
        F: Fn(JsonMap) -> JsonMap + 'static,
    {
        self.steps.insert(from_version, Box::new(step)).is_some()
    }

    /// Check if a step migrates from `from_version`
    pub fn contains(&self, from_version: u32) -> bool {
        self.steps.contains_key(&from_version)
    }

    /// The step migrating from `from_version`
    pub fn get(&self, from_version: u32) -> Option<&MigrationFn> {
        self.steps.get(&from_version)
    }

    /// Versions with a registered step, ascending
    pub fn versions(&self) -> impl Iterator<Item = u32> + '_ {
        self.steps.keys().copied()
    }

    /// Number of registered steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if no steps are registered
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for MigrationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationChain")
            .field("versions", &self.versions().collect::<Vec<_>>())
            .finish()
    }
}
