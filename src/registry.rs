use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use thiserror::Error;
use tracing::{debug, warn};

use crate::factory::MountFn;

/// Property names excluded from dynamic path creation.
///
/// These come from the JavaScript embedding surface, where walking a
/// caller-supplied dotted path through one of them would reach the object
/// prototype chain. The registry enforces the same denylist so entry-point
/// paths stay portable across both surfaces.
pub const DENYLISTED_SEGMENTS: &[&str] = &["__proto__", "prototype", "constructor"];

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("namespace path must be a non-empty string")]
    EmptyPath,
    #[error("namespace path segment {0:?} is reserved")]
    UnsafeSegment(String),
}

/// A value stored under a namespace segment: either a nested table or an
/// installed widget mount function.
pub enum NamespaceEntry {
    Table(NamespaceTable),
    Mount(MountFn),
}

pub type NamespaceTable = BTreeMap<String, NamespaceEntry>;

#[derive(Debug, Clone)]
pub struct RegisterOptions {
    /// Replace an existing entry under the final name. Defaults to true.
    pub overwrite: bool,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

/// Shared entry-point registry for independently packaged widgets.
///
/// Each widget's initialization routine receives the registry by reference
/// and installs its mount function under a dotted path, so widgets built
/// without a shared build step still expose discoverable entry points without
/// colliding. Mutations are last-writer-wins; registration is expected to
/// happen once per widget at host startup.
#[derive(Default)]
pub struct Registry {
    root: NamespaceTable,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `mount` under `name` at the table addressed by the dotted
    /// `path`, creating intermediate tables as needed.
    ///
    /// Empty path segments (leading, trailing or doubled dots) are ignored.
    /// An existing non-table value on the walk is replaced with a fresh
    /// table. A denylisted segment fails the whole call; tables created for
    /// segments walked before the offending one are kept.
    ///
    /// Returns the final table the name was installed into.
    pub fn register(
        &mut self,
        path: &str,
        name: &str,
        mount: MountFn,
        options: RegisterOptions,
    ) -> Result<&mut NamespaceTable, RegistryError> {
        if path.trim().is_empty() {
            return Err(RegistryError::EmptyPath);
        }

        let mut table = &mut self.root;
        for segment in path.split('.').filter(|segment| !segment.is_empty()) {
            if DENYLISTED_SEGMENTS.contains(&segment) {
                return Err(RegistryError::UnsafeSegment(segment.to_string()));
            }
            table = match table.entry(segment.to_string()) {
                Entry::Occupied(slot) => {
                    let slot = slot.into_mut();
                    if !matches!(slot, NamespaceEntry::Table(_)) {
                        warn!(segment, "replacing non-table namespace entry with a table");
                        *slot = NamespaceEntry::Table(NamespaceTable::new());
                    }
                    match slot {
                        NamespaceEntry::Table(table) => table,
                        NamespaceEntry::Mount(_) => unreachable!(),
                    }
                }
                Entry::Vacant(slot) => {
                    match slot.insert(NamespaceEntry::Table(NamespaceTable::new())) {
                        NamespaceEntry::Table(table) => table,
                        NamespaceEntry::Mount(_) => unreachable!(),
                    }
                }
            };
        }

        if !options.overwrite && table.contains_key(name) {
            debug!(path, name, "keeping existing namespace entry");
        } else {
            table.insert(name.to_string(), NamespaceEntry::Mount(mount));
            debug!(path, name, "registered widget mount function");
        }
        Ok(table)
    }

    /// Resolve a dotted path to whatever is stored there, if anything.
    pub fn entry(&self, path: &str) -> Option<&NamespaceEntry> {
        let mut segments = path.split('.').filter(|segment| !segment.is_empty()).peekable();
        let mut table = &self.root;
        while let Some(segment) = segments.next() {
            let entry = table.get(segment)?;
            if segments.peek().is_none() {
                return Some(entry);
            }
            match entry {
                NamespaceEntry::Table(nested) => table = nested,
                NamespaceEntry::Mount(_) => return None,
            }
        }
        None
    }

    /// Resolve a dotted path ending in a widget name to its mount function.
    pub fn mount_fn(&self, path: &str) -> Option<MountFn> {
        match self.entry(path)? {
            NamespaceEntry::Mount(mount) => Some(mount.clone()),
            NamespaceEntry::Table(_) => None,
        }
    }
}
