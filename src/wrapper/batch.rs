//! Concurrent processing of independent prims.
//!
//! Each wrapper's state is single-writer, but wrappers never share state, so
//! a batch of (wrapper, prim) pairs can be processed on the rayon pool. One
//! failing prim does not stop the others.

use rayon::prelude::*;
use tracing::{debug, warn};

use super::PrimWrapper;
use crate::util::{Error, Result};

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of pairs processed, failed ones included.
    pub processed: usize,
    /// Failures with the path of the wrapper they came from.
    pub failures: Vec<(String, Error)>,
}

impl BatchReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run `f` on every (wrapper, item) pair in parallel.
pub fn process<T, F>(pairs: &mut [(PrimWrapper, T)], f: F) -> BatchReport
where
    T: Send,
    F: Fn(&mut PrimWrapper, &mut T) -> Result<()> + Sync,
{
    let failures: Vec<(String, Error)> = pairs
        .par_iter_mut()
        .filter_map(|(wrapper, item)| {
            f(wrapper, item).err().map(|err| {
                warn!(prim = wrapper.path(), "{}", err);
                (wrapper.path().to_string(), err)
            })
        })
        .collect();

    debug!(processed = pairs.len(), failed = failures.len(), "batch done");
    BatchReport {
        processed: pairs.len(),
        failures,
    }
}
