//! Audio routing targets and name resolution
//!
//! Targets are issued by an external discovery service (e.g. `wpctl status`).
//! The core only ever keys on [`TargetId`]; category and display name are
//! presentation metadata that may be missing for any given id.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Opaque identifier of an audio target
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id fits in a single field of a binding file
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && !self.0.chars().any(char::is_whitespace)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TargetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of audio endpoint a target represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Sink
    Output,
    /// Source
    Input,
    /// Application stream
    Application,
}

impl Category {
    /// Short label used as the bracketed display prefix
    pub fn label(&self) -> &'static str {
        match self {
            Category::Output => "OUT",
            Category::Input => "IN",
            Category::Application => "APP",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A discovered target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: TargetId,
    pub category: Category,
    pub name: String,
}

impl Target {
    pub fn new(id: TargetId, category: Category, name: impl Into<String>) -> Self {
        Self {
            id,
            category,
            name: name.into(),
        }
    }

    /// Display name with its category prefix, e.g. `[OUT] Speakers`
    pub fn display_name(&self) -> String {
        format!("[{}] {}", self.category.label(), self.name)
    }
}

/// Resolves a target id to its display name
pub trait NameResolver {
    fn resolve(&self, id: &TargetId) -> Option<String>;
}

/// Resolver that knows no targets
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTargets;

impl NameResolver for NoTargets {
    fn resolve(&self, _id: &TargetId) -> Option<String> {
        None
    }
}

/// Targets known to the current session, in discovery order
#[derive(Debug, Clone, Default)]
pub struct TargetDirectory {
    targets: Vec<Target>,
    index: HashMap<TargetId, usize>,
}

impl TargetDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a target, replacing any previous entry with the same id in place
    pub fn insert(&mut self, target: Target) {
        match self.index.get(&target.id) {
            Some(&slot) => self.targets[slot] = target,
            None => {
                self.index.insert(target.id.clone(), self.targets.len());
                self.targets.push(target);
            }
        }
    }

    pub fn get(&self, id: &TargetId) -> Option<&Target> {
        self.index.get(id).map(|&slot| &self.targets[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl FromIterator<Target> for TargetDirectory {
    fn from_iter<I: IntoIterator<Item = Target>>(iter: I) -> Self {
        let mut directory = Self::new();
        for target in iter {
            directory.insert(target);
        }
        directory
    }
}

impl NameResolver for TargetDirectory {
    fn resolve(&self, id: &TargetId) -> Option<String> {
        self.get(id).map(Target::display_name)
    }
}

/// Errors reported by a target discovery service
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The discovery command could not be started
    #[error("Failed to run discovery command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The discovery command ran but reported failure
    #[error("Discovery command `{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The command output was not readable
    #[error("Invalid discovery output: {0}")]
    InvalidOutput(String),
}

/// Source of the current set of targets
pub trait TargetDiscovery {
    fn discover(&self) -> Result<TargetDirectory, DiscoveryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_has_category_prefix() {
        let target = Target::new(TargetId::from("51"), Category::Output, "Speakers");
        assert_eq!(target.display_name(), "[OUT] Speakers");

        let target = Target::new(TargetId::from("77"), Category::Application, "Firefox");
        assert_eq!(target.display_name(), "[APP] Firefox");
    }

    #[test]
    fn test_directory_resolves_known_ids_only() {
        let directory: TargetDirectory = vec![
            Target::new("51".into(), Category::Output, "Speakers"),
            Target::new("60".into(), Category::Input, "Mic"),
        ]
        .into_iter()
        .collect();

        assert_eq!(directory.len(), 2);
        assert_eq!(directory.resolve(&"60".into()), Some("[IN] Mic".to_string()));
        assert_eq!(directory.resolve(&"99".into()), None);
        assert_eq!(NoTargets.resolve(&"51".into()), None);
    }

    #[test]
    fn test_id_validity() {
        assert!(TargetId::from("51").is_valid());
        assert!(TargetId::from("alsa_output.pci-0000").is_valid());
        assert!(!TargetId::from("").is_valid());
        assert!(!TargetId::from("foo bar").is_valid());
        assert!(!TargetId::from("tab\there").is_valid());
    }

    #[test]
    fn test_directory_insert_replaces_in_place() {
        let mut directory = TargetDirectory::new();
        directory.insert(Target::new("51".into(), Category::Output, "Old"));
        directory.insert(Target::new("52".into(), Category::Output, "Other"));
        directory.insert(Target::new("51".into(), Category::Output, "New"));

        let names: Vec<_> = directory.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["New", "Other"]);
    }
}
