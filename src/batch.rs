//! Batch operations with per-item results.
//!
//! Some engine operations take a list of items and report an outcome for
//! each of them, even when the operation as a whole fails. [`transfer`]
//! reads the items out of a managed `Iterable`, runs the operation, and then
//! copies every item's outcome back onto the managed object it came from
//! before reporting the operation's own failure. A panic in the operation
//! counts as a failure too: outcomes are written back, then the panic
//! continues on to the entry point's boundary.

use std::panic::{self, AssertUnwindSafe};

use crate::error::Result;
use crate::ffi::marshal::IterableContext;
use crate::ffi::{enforce_not_null, Env, ObjectRef};

/// Converts one kind of batch item in both directions.
pub trait BatchConverter {
    /// Native form of an item.
    type Native;

    /// Read the input part of a managed item.
    fn to_native_input(&self, env: &mut dyn Env, obj: ObjectRef) -> Result<Self::Native>;

    /// Write the output part of a native item onto the managed item it was
    /// read from.
    fn copy_to_managed_output(
        &self,
        env: &mut dyn Env,
        item: &Self::Native,
        obj: ObjectRef,
    ) -> Result<()>;
}

/// Run `op` on the items of the managed `Iterable` `items`.
///
/// Outcomes are written back by position whether `op` succeeds, fails or
/// panics. If both `op` and the write-back fail, `op`'s error is returned
/// (or its panic resumed) and the write-back error is logged.
pub fn transfer<C: BatchConverter>(
    env: &mut dyn Env,
    conv: &C,
    ctx: &IterableContext,
    items: Option<ObjectRef>,
    op: impl FnOnce(&mut [C::Native]) -> Result<()>,
) -> Result<()> {
    let mut managed = Vec::new();
    let mut native = Vec::new();
    ctx.for_each(env, items, |env, element| {
        let obj = enforce_not_null(element)?;
        native.push(conv.to_native_input(env, obj)?);
        managed.push(obj);
        Ok(())
    })?;

    // Items a panicking `op` left half-updated are still written back.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| op(&mut native)));

    let written = managed
        .iter()
        .zip(&native)
        .try_for_each(|(&obj, item)| conv.copy_to_managed_output(env, item, obj));

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(payload) => {
            if let Err(write_err) = written {
                log::warn!("per-item results were not fully written back: {}", write_err);
            }
            panic::resume_unwind(payload);
        }
    };

    match (outcome, written) {
        (Err(err), Err(write_err)) => {
            log::warn!("per-item results were not fully written back: {}", write_err);
            Err(err)
        }
        (Err(err), Ok(())) => Err(err),
        (Ok(()), written) => written,
    }
}
