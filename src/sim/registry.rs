//! Ordered collection of live entities
//!
//! Traffic cars and dust puffs share the same registry. Removal happens
//! while scanning from the tail, so a removed slot is only ever refilled by
//! entities that were already visited.

use serde::{Deserialize, Serialize};

/// Verdict for one entity during a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    Keep,
    Remove,
    /// Stop scanning; this entity is kept
    Halt,
}

/// Entities that expire after a fixed lifetime on the simulation clock
pub trait Ephemeral {
    /// Simulation time the entity was created
    fn born_at(&self) -> f64;

    /// Age in seconds at `now`
    fn age(&self, now: f64) -> f64 {
        now - self.born_at()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRegistry<T> {
    entities: Vec<T>,
}

impl<T> Default for EntityRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntityRegistry<T> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Append a newly spawned entity
    pub fn push(&mut self, entity: T) {
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entities.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entities
    }

    /// Visit every entity from the tail toward the head, letting `visit`
    /// mutate it and decide whether it stays. Returns the number removed.
    pub fn sweep_rev<F>(&mut self, mut visit: F) -> usize
    where
        F: FnMut(&mut T) -> Sweep,
    {
        let mut removed = 0;
        for i in (0..self.entities.len()).rev() {
            match visit(&mut self.entities[i]) {
                Sweep::Keep => {}
                Sweep::Remove => {
                    self.entities.remove(i);
                    removed += 1;
                }
                Sweep::Halt => break,
            }
        }
        removed
    }
}

impl<T: Ephemeral> EntityRegistry<T> {
    /// Drop every entity whose age reached `lifetime`
    pub fn prune_expired(&mut self, now: f64, lifetime: f64) -> usize {
        self.sweep_rev(|e| {
            if e.age(now) >= lifetime {
                Sweep::Remove
            } else {
                Sweep::Keep
            }
        })
    }
}

impl<'a, T> IntoIterator for &'a EntityRegistry<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
