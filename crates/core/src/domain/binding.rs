//! Binding matrix between (layer, fader) slots and audio targets
//!
//! A target may be bound to several faders across layers, but to at most one
//! fader within a single layer. [`BindingStore::toggle_binding`] is the only
//! mutation path and enforces that rule itself.

use crate::domain::target::TargetId;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised by binding operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("Fader {0} out of range (expected {min}..={max})", min = Fader::MIN, max = Fader::MAX)]
    FaderOutOfRange(i64),
}

pub type Result<T> = std::result::Result<T, BindingError>;

/// Independent binding namespace selected on the hardware
pub type Layer = u32;

/// One of the seven physical faders of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fader(u8);

impl Fader {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 7;
    pub const COUNT: usize = 7;

    pub fn new(index: i64) -> Result<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&index) {
            Ok(Self(index as u8))
        } else {
            Err(BindingError::FaderOutOfRange(index))
        }
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    /// All faders in ascending order
    pub fn all() -> impl Iterator<Item = Fader> {
        (Self::MIN..=Self::MAX).map(Fader)
    }
}

impl TryFrom<i64> for Fader {
    type Error = BindingError;

    fn try_from(index: i64) -> Result<Self> {
        Self::new(index)
    }
}

impl fmt::Display for Fader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Membership of a target in a slot after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingChange {
    Bound,
    Unbound,
}

impl BindingChange {
    pub fn is_bound(&self) -> bool {
        matches!(self, BindingChange::Bound)
    }
}

/// A single (layer, fader, target) binding
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingEntry {
    pub layer: Layer,
    pub fader: Fader,
    pub target: TargetId,
}

impl BindingEntry {
    pub fn new(layer: Layer, fader: Fader, target: TargetId) -> Self {
        Self {
            layer,
            fader,
            target,
        }
    }
}

/// Canonical (layer, fader) -> targets mapping
///
/// Slots with no targets are removed, so an absent key and an empty slot
/// never coexist. Targets within a slot keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingStore {
    slots: BTreeMap<(Layer, Fader), Vec<TargetId>>,
}

impl BindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `target` on `(layer, fader)`, unbinding it from every other
    /// fader of the same layer first.
    pub fn toggle_binding(&mut self, layer: Layer, fader: Fader, target: &TargetId) -> BindingChange {
        self.evict(layer, fader, target);

        let slot = self.slots.entry((layer, fader)).or_default();
        let change = match slot.iter().position(|t| t == target) {
            Some(pos) => {
                slot.remove(pos);
                BindingChange::Unbound
            }
            None => {
                slot.push(target.clone());
                BindingChange::Bound
            }
        };
        if slot.is_empty() {
            self.slots.remove(&(layer, fader));
        }

        debug!(layer, fader = fader.index(), target = %target, ?change, "Binding toggled");
        change
    }

    /// Targets bound to `(layer, fader)`; empty when nothing is bound
    pub fn query(&self, layer: Layer, fader: Fader) -> &[TargetId] {
        self.slots
            .get(&(layer, fader))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_bound(&self, layer: Layer, fader: Fader, target: &TargetId) -> bool {
        self.query(layer, fader).contains(target)
    }

    /// The fader `target` is bound to within `layer`, if any
    pub fn fader_of(&self, layer: Layer, target: &TargetId) -> Option<Fader> {
        self.slots
            .range((layer, Fader(Fader::MIN))..=(layer, Fader(Fader::MAX)))
            .find(|(_, targets)| targets.contains(target))
            .map(|(&(_, fader), _)| fader)
    }

    /// Every binding, ordered by layer, then fader, then insertion order
    pub fn entries(&self) -> impl Iterator<Item = BindingEntry> + '_ {
        self.slots.iter().flat_map(|(&(layer, fader), targets)| {
            targets
                .iter()
                .map(move |target| BindingEntry::new(layer, fader, target.clone()))
        })
    }

    /// Layers that currently hold at least one binding
    pub fn layers(&self) -> Vec<Layer> {
        let mut layers: Vec<Layer> = self.slots.keys().map(|&(layer, _)| layer).collect();
        layers.dedup();
        layers
    }

    /// Clear the store and bind every entry in order.
    ///
    /// A later entry for a target already bound elsewhere in the same layer
    /// moves it; repeating an identical entry is a no-op.
    pub fn replace<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = BindingEntry>,
    {
        self.slots.clear();
        for entry in entries {
            self.evict(entry.layer, entry.fader, &entry.target);
            let slot = self.slots.entry((entry.layer, entry.fader)).or_default();
            if !slot.contains(&entry.target) {
                slot.push(entry.target);
            }
        }
        debug!(bindings = self.len(), "Binding store replaced");
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Remove `target` from every fader of `layer` except `keep`.
    fn evict(&mut self, layer: Layer, keep: Fader, target: &TargetId) {
        let holders: Vec<Fader> = Fader::all()
            .filter(|&fader| fader != keep && self.is_bound(layer, fader, target))
            .collect();

        for fader in holders {
            if let Some(slot) = self.slots.get_mut(&(layer, fader)) {
                slot.retain(|t| t != target);
                if slot.is_empty() {
                    self.slots.remove(&(layer, fader));
                }
            }
            trace!(layer, fader = fader.index(), target = %target, "Evicted from fader");
        }
    }
}
