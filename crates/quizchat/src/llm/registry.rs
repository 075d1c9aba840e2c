//! Persona registry: nickname to provider + model.

use std::collections::HashMap;

use super::error::RegistryError;
use super::types::{ProviderEntry, ProviderKind};

/// Immutable roster of chat personas, keyed by exact nickname.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    entries: Vec<ProviderEntry>,
    index: HashMap<String, usize>,
}

impl PersonaRegistry {
    /// Build a registry, rejecting blank fields and duplicate nicknames.
    pub fn from_entries(entries: Vec<ProviderEntry>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            if entry.nickname.trim().is_empty() {
                return Err(RegistryError::EmptyNickname);
            }
            if entry.model_id.trim().is_empty() {
                return Err(RegistryError::EmptyModel(entry.nickname.clone()));
            }
            if index.insert(entry.nickname.clone(), i).is_some() {
                return Err(RegistryError::Duplicate(entry.nickname.clone()));
            }
        }

        Ok(Self { entries, index })
    }

    /// The roster shipped with the quiz deployment.
    pub fn default_entries() -> Vec<ProviderEntry> {
        vec![
            ProviderEntry::new("Peter", "llama3", ProviderKind::LocalInference),
            ProviderEntry::new("Sarah", "mistral", ProviderKind::LocalInference),
            ProviderEntry::new("James", "gemma", ProviderKind::LocalInference),
            ProviderEntry::new("Alex", "gpt-4o", ProviderKind::CloudCompletion),
        ]
    }

    /// Case-sensitive exact lookup.
    pub fn resolve(&self, nickname: &str) -> Option<&ProviderEntry> {
        self.index.get(nickname).map(|&i| &self.entries[i])
    }

    /// Nicknames in roster order.
    pub fn nicknames(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.nickname.as_str())
    }

    pub fn entries(&self) -> &[ProviderEntry] {
        &self.entries
    }

    /// Whether any persona is served by `kind`.
    pub fn uses(&self, kind: ProviderKind) -> bool {
        self.entries.iter().any(|e| e.provider_kind == kind)
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        let entries = Self::default_entries();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.nickname.clone(), i))
            .collect();
        Self { entries, index }
    }
}
