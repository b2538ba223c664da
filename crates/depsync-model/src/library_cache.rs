//! Lazy lookup of the managed library backing each external dependency.

use std::collections::HashMap;

use depsync_core::scope::DependencyScope;

use crate::store::LibraryEntry;

/// Name prefix of every library this tool manages.
pub const LIBRARY_PREFIX: &str = "depsync: ";

/// Library name for a module revision's canonical `org:name:rev`.
pub fn library_name(canonical: &str) -> String {
    format!("{LIBRARY_PREFIX}{canonical}")
}

pub fn is_managed(name: &str) -> bool {
    name.starts_with(LIBRARY_PREFIX)
}

/// What a lookup had to do to provide a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryLookup {
    /// The library was already present, or created earlier in this pass.
    Existing,
    /// The library must be created.
    Created,
}

/// Libraries of one module during one reconciliation pass, keyed by name.
///
/// A library is created at most once per pass, on first use.
#[derive(Debug, Default)]
pub struct LibraryModelCache {
    scopes: HashMap<String, DependencyScope>,
}

impl LibraryModelCache {
    pub fn new<'l, I>(existing: I) -> Self
    where
        I: IntoIterator<Item = &'l LibraryEntry>,
    {
        Self {
            scopes: existing
                .into_iter()
                .map(|l| (l.name.clone(), l.scope))
                .collect(),
        }
    }

    /// Make sure `name` is known, remembering `scope` for a library that
    /// does not exist yet.
    pub fn get_or_create(&mut self, name: &str, scope: DependencyScope) -> LibraryLookup {
        if self.scopes.contains_key(name) {
            return LibraryLookup::Existing;
        }
        self.scopes.insert(name.to_string(), scope);
        LibraryLookup::Created
    }

    /// Current scope of a known library.
    pub fn scope(&self, name: &str) -> Option<DependencyScope> {
        self.scopes.get(name).copied()
    }

    /// Record a scope change; returns `false` when it is already `scope`.
    pub fn update_scope(&mut self, name: &str, scope: DependencyScope) -> bool {
        match self.scopes.get_mut(name) {
            Some(current) if *current == scope => false,
            Some(current) => {
                *current = scope;
                true
            }
            None => {
                self.scopes.insert(name.to_string(), scope);
                true
            }
        }
    }
}
