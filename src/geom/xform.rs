//! Transform keyframe tracking.
//!
//! The local transform goes through the same hold-sample state machine as
//! attributes, with three differences:
//!
//! - an identity transform on a prim that never had one authored is skipped,
//!   since identity is what an unauthored transform means anyway,
//! - `force` authors every call, for per-frame export modes,
//! - before the first authored transform, xform ops on layers stronger than
//!   a remapping edit target are cleared so they cannot shadow the new ones.

use glam::DMat4;
use tracing::{debug, trace};

use crate::core::{SampleKind, TimeCode, TrackedSample};
use crate::stage::XformTarget;
use crate::util::{is_identity, Result};

/// Per-wrapper transform history.
#[derive(Clone, Debug, Default)]
pub struct XformCache {
    sample: Option<TrackedSample<DMat4>>,
}

impl XformCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Author `xform` at `time` if needed.
    ///
    /// `tolerance` bounds the per-component distance from identity for the
    /// elision of a first identity transform. Returns `true` if a sample was
    /// authored at `time`.
    pub fn update(
        &mut self,
        target: &mut dyn XformTarget,
        xform: &DMat4,
        time: TimeCode,
        force: bool,
        tolerance: f64,
    ) -> Result<bool> {
        if self.sample.is_none() {
            if !force && is_identity(xform, tolerance) {
                trace!(prim = target.path(), time = %time, "identity transform elided");
                return Ok(false);
            }
            clear_stronger_ops(target)?;
        }

        let prim = target.path().to_string();
        let author = |m: &DMat4, t: TimeCode, kind: SampleKind| -> Result<()> {
            debug!(prim = %prim, time = %t, ?kind, "authoring transform");
            target.set_transform(m, t)
        };

        match &mut self.sample {
            None => {
                self.sample = Some(TrackedSample::first(xform, time, author)?);
                Ok(true)
            }
            Some(s) if force => {
                s.force(xform, time, author)?;
                Ok(true)
            }
            Some(s) => s.update(xform, time, author),
        }
    }

    /// True once any transform was authored.
    pub fn has_authored(&self) -> bool {
        self.sample.is_some()
    }

    /// Time of the last authored transform.
    pub fn last_set(&self) -> Option<TimeCode> {
        self.sample.as_ref().map(|s| s.last_set)
    }

    /// Time of the last compared transform.
    pub fn last_compared(&self) -> Option<TimeCode> {
        self.sample.as_ref().map(|s| s.last_compared)
    }

    pub fn clear(&mut self) {
        self.sample = None;
    }
}

/// Clear stronger-layer xform ops when the edit target remaps namespace.
///
/// With an identity mapping the edit target is the strongest layer that
/// matters, so nothing can shadow the authored ops.
fn clear_stronger_ops(target: &mut dyn XformTarget) -> Result<()> {
    if target.edit_target_is_identity() || !target.has_stronger_xform_ops() {
        return Ok(());
    }
    debug!(prim = target.path(), "clearing xform ops on stronger layers");
    target.clear_stronger_xform_ops()
}
