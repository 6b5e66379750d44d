//! Visible grid columns of an editing session

use crate::domain::target::TargetId;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    #[error("Column index {index} out of range (have {len} columns)")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ColumnError>;

/// Ordered, duplicate-free list of targets shown as grid columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnList {
    columns: Vec<TargetId>,
}

impl ColumnList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `target` unless already present. Returns whether it was added.
    pub fn add(&mut self, target: TargetId) -> bool {
        if self.columns.contains(&target) {
            return false;
        }
        debug!(target = %target, "Column added");
        self.columns.push(target);
        true
    }

    pub fn remove(&mut self, index: usize) -> Result<TargetId> {
        if index >= self.columns.len() {
            return Err(ColumnError::IndexOutOfRange {
                index,
                len: self.columns.len(),
            });
        }
        let removed = self.columns.remove(index);
        debug!(index, target = %removed, "Column removed");
        Ok(removed)
    }

    /// Append every target not yet present, in order. Returns the number added.
    pub fn merge<I>(&mut self, targets: I) -> usize
    where
        I: IntoIterator<Item = TargetId>,
    {
        targets.into_iter().filter(|t| self.add(t.clone())).count()
    }

    pub fn contains(&self, target: &TargetId) -> bool {
        self.columns.contains(target)
    }

    pub fn position(&self, target: &TargetId) -> Option<usize> {
        self.columns.iter().position(|t| t == target)
    }

    pub fn get(&self, index: usize) -> Option<&TargetId> {
        self.columns.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetId> {
        self.columns.iter()
    }

    pub fn as_slice(&self) -> &[TargetId] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<TargetId> for ColumnList {
    fn from_iter<I: IntoIterator<Item = TargetId>>(iter: I) -> Self {
        let mut list = Self::new();
        list.merge(iter);
        list
    }
}
