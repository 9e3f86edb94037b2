//! Name-based resolution of fuzzable units.

use super::member::UnitDescriptor;
use crate::result::{SondearError, SondearResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of every unit the current process can fuzz.
///
/// Resolution failure is the "target cannot be resolved" case surfaced to
/// the command line as exit code 2.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    units: BTreeMap<String, Arc<UnitDescriptor>>,
}

impl TargetRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit under its qualified name. Re-registering a name
    /// replaces the previous descriptor.
    pub fn register(&mut self, unit: UnitDescriptor) {
        self.units.insert(unit.qualified_name(), Arc::new(unit));
    }

    /// Resolve a unit by namespace and simple name.
    pub fn resolve(&self, namespace: &str, name: &str) -> SondearResult<Arc<UnitDescriptor>> {
        let qualified = format!("{namespace}::{name}");
        self.units
            .get(&qualified)
            .cloned()
            .ok_or(SondearError::UnknownUnit { name: qualified })
    }

    /// Qualified names of every registered unit, sorted.
    #[must_use]
    pub fn unit_names(&self) -> Vec<&str> {
        self.units.keys().map(String::as_str).collect()
    }
}
