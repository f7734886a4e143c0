//! Annotation registry
//!
//! The authoritative record of what is marked, kept separately from the
//! markup in the document. Entries are keyed by id and stay in creation
//! order, which is also the order their text is exported in.

use crate::errors::RegistryError;
use crate::models::Annotation;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRegistry {
    annotations: IndexMap<String, Annotation>,
}

impl AnnotationRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an annotation. Ids must be unique.
    pub fn add(&mut self, annotation: Annotation) -> Result<(), RegistryError> {
        if self.annotations.contains_key(&annotation.id) {
            return Err(RegistryError::DuplicateId(annotation.id));
        }
        self.annotations.insert(annotation.id.clone(), annotation);
        Ok(())
    }

    /// Remove an annotation; absent ids are ignored
    pub fn remove_by_id(&mut self, id: &str) -> Option<Annotation> {
        self.annotations.shift_remove(id)
    }

    /// Remove everything, returning the removed entries in creation order
    pub fn remove_all(&mut self) -> Vec<Annotation> {
        self.annotations.drain(..).map(|(_, a)| a).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.annotations.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.annotations.contains_key(id)
    }

    pub fn text_of(&self, id: &str) -> Option<&str> {
        self.annotations.get(id).map(|a| a.text.as_str())
    }

    /// Text of every annotation in creation order
    pub fn snapshot_all_text(&self) -> Vec<String> {
        self.annotations.values().map(|a| a.text.clone()).collect()
    }

    /// Iterate annotations in creation order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Annotation> {
        self.annotations.values()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}
