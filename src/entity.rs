use crate::color::Rgb;
use crate::error::{ConfigError, ConfigResult};
use crate::palette::ColorResolver;
use crate::physics::{self, Body, Boundary, Bounds, Contact};
use tracing::trace;

/// Remaining lifetime of an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Life {
    /// Health draining from `1.0` toward `0.0`; spent at or below zero.
    Fraction(f32),
    /// Frame counter; spent once `age >= ttl`.
    Ttl { age: u32, ttl: u32 },
}

impl Life {
    pub fn full() -> Self {
        Self::Fraction(1.0)
    }

    pub fn frames(ttl: u32) -> Self {
        Self::Ttl { age: 0, ttl }
    }

    pub fn is_spent(&self) -> bool {
        match *self {
            Self::Fraction(f) => f.is_nan() || f <= 0.0,
            Self::Ttl { age, ttl } => age >= ttl,
        }
    }

    /// Remaining share of life in `0.0..=1.0`.
    pub fn remaining(&self) -> f32 {
        match *self {
            Self::Fraction(f) => {
                if f.is_nan() {
                    0.0
                } else {
                    f.clamp(0.0, 1.0)
                }
            }
            Self::Ttl { age, ttl } => {
                if ttl == 0 {
                    0.0
                } else {
                    1.0 - (age.min(ttl) as f32 / ttl as f32)
                }
            }
        }
    }

    /// One frame of aging: fractional life loses `drain`, frame-counted life gains one tick.
    pub fn tick(&mut self, drain: f32) {
        match self {
            Self::Fraction(f) => *f -= drain,
            Self::Ttl { age, .. } => *age = age.saturating_add(1),
        }
    }
}

/// How an entity's color is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorKey {
    Index(u8),
    Rgb(Rgb),
}

impl ColorKey {
    pub fn resolve(&self, resolver: &dyn ColorResolver) -> Rgb {
        match *self {
            Self::Index(i) => resolver.color(i as i32, true),
            Self::Rgb(c) => c,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity<T> {
    pub body: Body,
    pub life: Life,
    pub color: ColorKey,
    pub alive: bool,
    pub payload: T,
}

impl<T> Entity<T> {
    pub fn new(body: Body, life: Life, color: ColorKey, payload: T) -> Self {
        Self {
            body,
            life,
            color,
            alive: true,
            payload,
        }
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn is_live(&self) -> bool {
        self.alive && !self.life.is_spent()
    }

    /// Advances the body one step; a `Kill` boundary hit marks the entity dead.
    pub fn integrate(&mut self, dt: f32, bounds: Bounds, boundary: Boundary) -> Contact {
        let contact = physics::step(&mut self.body, dt, bounds, boundary);
        if contact == Contact::Killed {
            self.alive = false;
        }
        contact
    }
}

/// What to do when spawning into a full pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overflow {
    /// Drop the new entity.
    Reject,
    /// Replace the longest-lived entity.
    EvictOldest,
}

/// Stable reference to a pool slot. Stale once the slot is freed or reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    seq: u64,
    entity: Option<Entity<T>>,
}

/// Fixed-capacity slot table of entities.
///
/// Storage is allocated once; spawning never grows it. Iteration runs in slot
/// order, and dead entities are only freed after a full pass.
#[derive(Clone, Debug)]
pub struct EntityPool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    occupied: usize,
    next_seq: u64,
    overflow: Overflow,
    evictions: u64,
    rejections: u64,
}

impl<T> EntityPool<T> {
    pub fn new(capacity: usize, overflow: Overflow) -> ConfigResult<Self> {
        if capacity == 0 || capacity > u32::MAX as usize {
            return Err(ConfigError::InvalidCapacity);
        }
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                seq: 0,
                entity: None,
            })
            .collect();
        // Reversed so the lowest free index is handed out first.
        let free = (0..capacity as u32).rev().collect();
        Ok(Self {
            slots,
            free,
            occupied: 0,
            next_seq: 0,
            overflow,
            evictions: 0,
            rejections: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entities. Killed or spent ones still waiting for a sweep
    /// are not counted.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Slots holding an entity, live or not.
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.slots.len()
    }

    pub fn overflow(&self) -> Overflow {
        self.overflow
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn rejections(&self) -> u64 {
        self.rejections
    }

    /// Places `entity` in a free slot. Dead entities still holding a slot are
    /// reclaimed before the overflow policy applies.
    pub fn spawn(&mut self, entity: Entity<T>) -> Option<Handle> {
        if self.free.is_empty() {
            self.sweep();
        }
        let index = match self.free.pop() {
            Some(i) => i,
            None => match self.overflow {
                Overflow::Reject => {
                    self.rejections += 1;
                    trace!(capacity = self.slots.len(), "entity pool full, spawn rejected");
                    return None;
                }
                Overflow::EvictOldest => {
                    let oldest = self.oldest_index()?;
                    self.release(oldest);
                    self.evictions += 1;
                    trace!(slot = oldest, "entity pool full, evicted oldest");
                    // `release` just pushed it; take it straight back.
                    self.free.pop()?
                }
            },
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        let slot = &mut self.slots[index as usize];
        slot.seq = seq;
        slot.entity = Some(entity);
        self.occupied += 1;
        Some(Handle {
            index,
            generation: slot.generation,
        })
    }

    fn oldest_index(&self) -> Option<u32> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.entity.is_some())
            .min_by_key(|(_, s)| s.seq)
            .map(|(i, _)| i as u32)
    }

    fn release(&mut self, index: u32) -> Option<Entity<T>> {
        let slot = &mut self.slots[index as usize];
        let entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.occupied -= 1;
        Some(entity)
    }

    fn slot_for(&self, h: Handle) -> Option<&Slot<T>> {
        self.slots
            .get(h.index as usize)
            .filter(|s| s.generation == h.generation)
    }

    pub fn get(&self, h: Handle) -> Option<&Entity<T>> {
        self.slot_for(h)?.entity.as_ref()
    }

    pub fn get_mut(&mut self, h: Handle) -> Option<&mut Entity<T>> {
        self.slots
            .get_mut(h.index as usize)
            .filter(|s| s.generation == h.generation)?
            .entity
            .as_mut()
    }

    pub fn remove(&mut self, h: Handle) -> Option<Entity<T>> {
        self.slot_for(h)?;
        self.release(h.index)
    }

    /// Visits every live entity. The visitor may kill entities (or let their life run
    /// out); those are freed only after the pass completes.
    pub fn for_each_live<F>(&mut self, mut visit: F)
    where
        F: FnMut(Handle, &mut Entity<T>),
    {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let generation = slot.generation;
            if let Some(e) = slot.entity.as_mut() {
                if e.is_live() {
                    visit(
                        Handle {
                            index: i as u32,
                            generation,
                        },
                        e,
                    );
                }
            }
        }
        self.sweep();
    }

    /// Frees every dead or spent entity; returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let mut removed = 0;
        for i in 0..self.slots.len() {
            let dead = self.slots[i]
                .entity
                .as_ref()
                .is_some_and(|e| !e.is_live());
            if dead {
                self.release(i as u32);
                removed += 1;
            }
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity<T>> {
        self.slots
            .iter()
            .filter_map(|s| s.entity.as_ref())
            .filter(|e| e.is_live())
    }

    pub fn clear(&mut self) {
        for i in 0..self.slots.len() {
            self.release(i as u32);
        }
    }
}
