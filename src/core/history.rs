//! Diff caches for incremental time-sample authoring.
//!
//! Writing geometry frame by frame would naively author one sample per frame
//! per attribute. Instead each tracked value remembers what it last authored
//! and when it was last compared, and only authors when the value changes.
//!
//! Because USD interpolates between samples, skipping frames is not enough:
//! if a value holds from frame 2 to 5 and changes at 6, a lone sample at 2
//! and one at 6 would make frames 3-5 drift toward the new value. So before
//! authoring a change, a *hold* sample re-stating the old value is written at
//! the last compared time, closing off the flat segment.

use std::collections::HashMap;

use glam::DMat4;
use tracing::{debug, trace};

use super::{AttributeKey, TimeCode};
use crate::util::{bits_eq, Result};

/// Values the diff cache can snapshot and compare.
pub trait Snapshot: Sized {
    /// Deep, independent copy suitable for retaining across frames.
    fn harden(&self) -> Self;

    /// Exact equality; NaNs with identical bits are equal.
    fn same_as(&self, other: &Self) -> bool;
}

impl Snapshot for DMat4 {
    fn harden(&self) -> Self {
        *self
    }

    fn same_as(&self, other: &Self) -> bool {
        bits_eq(self, other)
    }
}

/// Why a sample is being authored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleKind {
    /// Re-statement of the previous value at the last compared time.
    Hold,
    /// The new value at the current time.
    New,
}

/// Last authored value of one tracked attribute and its bookkeeping times.
#[derive(Clone, Debug)]
pub struct TrackedSample<V> {
    /// Time of the last authored sample.
    pub last_set: TimeCode,
    /// Time of the last write attempt, authored or not.
    pub last_compared: TimeCode,
    /// Hardened copy of the last authored value.
    pub hardened: V,
}

impl<V: Snapshot> TrackedSample<V> {
    /// Author the first sample of a value and start tracking it.
    pub fn first<F>(value: &V, time: TimeCode, mut author: F) -> Result<Self>
    where
        F: FnMut(&V, TimeCode, SampleKind) -> Result<()>,
    {
        author(value, time, SampleKind::New)?;
        Ok(Self {
            last_set: time,
            last_compared: time,
            hardened: value.harden(),
        })
    }

    /// Compare `value` at `time` against the tracked one and author what is
    /// needed. Returns `true` if a new sample was authored at `time`.
    ///
    /// If `author` fails the tracked state is left as it was. A hold sample
    /// that was already written stays authored, and a retry writes it again
    /// at the same time.
    pub fn update<F>(&mut self, value: &V, time: TimeCode, mut author: F) -> Result<bool>
    where
        F: FnMut(&V, TimeCode, SampleKind) -> Result<()>,
    {
        if value.same_as(&self.hardened) {
            self.last_compared = time;
            return Ok(false);
        }
        if self.last_compared != self.last_set {
            author(&self.hardened, self.last_compared, SampleKind::Hold)?;
        }
        author(value, time, SampleKind::New)?;
        self.hardened = value.harden();
        self.last_set = time;
        self.last_compared = time;
        Ok(true)
    }

    /// Author `value` unconditionally, without a hold sample.
    pub fn force<F>(&mut self, value: &V, time: TimeCode, mut author: F) -> Result<()>
    where
        F: FnMut(&V, TimeCode, SampleKind) -> Result<()>,
    {
        author(value, time, SampleKind::New)?;
        self.hardened = value.harden();
        self.last_set = time;
        self.last_compared = time;
        Ok(())
    }
}

/// Per-wrapper attribute history: at most one tracked sample per key.
#[derive(Debug)]
pub struct AttributeHistory<V> {
    entries: HashMap<AttributeKey, TrackedSample<V>>,
}

impl<V> Default for AttributeHistory<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V: Snapshot> AttributeHistory<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the diff state machine for `key`.
    ///
    /// `author` is called for each sample that must be written: possibly a
    /// hold sample with the old value, then the new one. Returns `true` if a
    /// sample was authored at `time`.
    pub fn record<F>(&mut self, key: &AttributeKey, value: &V, time: TimeCode, mut author: F) -> Result<bool>
    where
        F: FnMut(&V, TimeCode, SampleKind) -> Result<()>,
    {
        let traced = |v: &V, t: TimeCode, kind: SampleKind| -> Result<()> {
            debug!(attribute = %key, time = %t, ?kind, "authoring sample");
            author(v, t, kind)
        };

        match self.entries.get_mut(key) {
            Some(entry) => {
                let authored = entry.update(value, time, traced)?;
                if !authored {
                    trace!(attribute = %key, time = %time, "value unchanged");
                }
                Ok(authored)
            }
            None => {
                let entry = TrackedSample::first(value, time, traced)?;
                self.entries.insert(key.clone(), entry);
                Ok(true)
            }
        }
    }

    /// Tracked state for a key.
    pub fn get(&self, key: &AttributeKey) -> Option<&TrackedSample<V>> {
        self.entries.get(key)
    }

    /// Forget one key; the next write authors unconditionally.
    pub fn forget(&mut self, key: &AttributeKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Forget everything, e.g. at the start of a new export session.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
