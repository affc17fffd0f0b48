//! Handles: integer tokens that stand in for native objects on the managed
//! side.
//!
//! Each native object type gets its own handle type (via `define_handle!`)
//! and its own [`HandleRegistry`]. A handle packs three things into the
//! managed `long`:
//!
//! ```text
//! bits 63..56  kind tag      (per handle type, never 0)
//! bits 55..32  generation    (bumped every time the slot is freed)
//! bits 31..0   slot index + 1
//! ```
//!
//! so a handle is never zero, a handle of the wrong kind is recognised, and
//! a handle that outlived its object is recognised instead of aliasing
//! whatever object reused the slot.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};

const GENERATION_BITS: u32 = 24;
const MAX_GENERATION: u32 = (1 << GENERATION_BITS) - 1;

/// A handle type: a typed view of the raw integer passed to managed code.
pub trait Handle: Copy + fmt::Debug {
    /// Kind tag stored in the top byte of every handle of this type.
    const TAG: u8;
    /// Human-readable name of the native type behind the handle.
    const KIND: &'static str;

    /// Reinterpret a raw managed value as a handle of this type.
    ///
    /// No validation happens here; [`HandleRegistry`] validates on lookup.
    fn from_raw(raw: i64) -> Self;

    /// The raw managed value.
    fn into_raw(self) -> i64;
}

/// Macro to define a handle type.
macro_rules! define_handle {
    ($name:ident, $tag:literal, $kind:literal) => {
        #[doc = concat!("Opaque handle to a native `", $kind, "`.")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            _h: i64,
        }

        impl $name {
            /// Create an invalid (null) handle.
            #[inline]
            pub const fn invalid() -> Self {
                Self { _h: 0 }
            }

            /// Check if this handle is non-null.
            ///
            /// A non-null handle may still be stale.
            #[inline]
            pub const fn is_valid(&self) -> bool {
                self._h != 0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl Handle for $name {
            const TAG: u8 = $tag;
            const KIND: &'static str = $kind;

            #[inline]
            fn from_raw(raw: i64) -> Self {
                Self { _h: raw }
            }

            #[inline]
            fn into_raw(self) -> i64 {
                self._h
            }
        }
    };
}

define_handle!(ExecutionHandle, 1, "Execution");
define_handle!(ProviderClusterHandle, 2, "ProviderCluster");
define_handle!(ImporterHandle, 3, "Importer");
define_handle!(FmuHandle, 4, "FMU");
define_handle!(SlaveInstanceHandle, 5, "SlaveInstance");
define_handle!(RunnerHandle, 6, "Runner");
define_handle!(FutureHandle, 7, "Future");

fn pack(tag: u8, generation: u32, slot: u32) -> i64 {
    debug_assert!(generation <= MAX_GENERATION);
    let raw = (u64::from(tag) << 56) | (u64::from(generation) << 32) | (u64::from(slot) + 1);
    raw as i64
}

fn unpack(raw: i64) -> (u8, u32, Option<u32>) {
    let raw = raw as u64;
    let tag = (raw >> 56) as u8;
    let generation = ((raw >> 32) as u32) & MAX_GENERATION;
    let slot = (raw as u32).checked_sub(1);
    (tag, generation, slot)
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Owner of every live native object of one type.
///
/// Objects enter through [`wrap`](Self::wrap), are reached through
/// [`get`](Self::get) / [`get_mut`](Self::get_mut), and leave through
/// [`destroy`](Self::destroy). Nothing else creates or drops them.
pub struct HandleRegistry<H: Handle, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
    _kind: PhantomData<H>,
}

impl<H: Handle, T> HandleRegistry<H, T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            _kind: PhantomData,
        }
    }

    /// Take ownership of `value` and return a fresh handle to it.
    pub fn wrap(&mut self, value: T) -> Result<H> {
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].value = Some(value);
                index
            }
            None => {
                let index = u32::try_from(self.slots.len())
                    .ok()
                    .filter(|i| *i < u32::MAX)
                    .ok_or_else(|| {
                        Error::native(format!("too many live {} objects", H::KIND))
                    })?;
                self.slots.push(Slot {
                    generation: 1,
                    value: Some(value),
                });
                index
            }
        };
        self.live += 1;
        let handle = H::from_raw(pack(
            H::TAG,
            self.slots[index as usize].generation,
            index,
        ));
        log::trace!("wrapped {} as {:#x}", H::KIND, handle.into_raw());
        Ok(handle)
    }

    fn locate(&self, handle: H) -> Result<usize> {
        let raw = handle.into_raw();
        if raw == 0 {
            return Err(Error::null_pointer());
        }
        let (tag, generation, slot) = unpack(raw);
        if tag != H::TAG {
            return Err(Error::illegal_argument(format!(
                "handle {:#x} does not refer to a {}",
                raw,
                H::KIND
            )));
        }
        slot.map(|s| s as usize)
            .filter(|&s| {
                self.slots
                    .get(s)
                    .map_or(false, |slot| slot.generation == generation && slot.value.is_some())
            })
            .ok_or_else(|| {
                Error::illegal_state(format!(
                    "{} handle {:#x} is stale or was never issued",
                    H::KIND,
                    raw
                ))
            })
    }

    /// Borrow the object behind `handle`.
    ///
    /// A null handle fails with `NullPointerException`; a handle of another
    /// kind with `IllegalArgumentException`; a stale handle with
    /// `IllegalStateException`.
    pub fn get(&self, handle: H) -> Result<&T> {
        let index = self.locate(handle)?;
        self.slots[index]
            .value
            .as_ref()
            .ok_or_else(|| Error::logic("located slot is empty"))
    }

    /// Mutably borrow the object behind `handle`.
    pub fn get_mut(&mut self, handle: H) -> Result<&mut T> {
        let index = self.locate(handle)?;
        self.slots[index]
            .value
            .as_mut()
            .ok_or_else(|| Error::logic("located slot is empty"))
    }

    /// Remove the object behind `handle` and return it to the caller, who
    /// drops it. The handle is invalid afterwards.
    pub fn destroy(&mut self, handle: H) -> Result<T> {
        let index = self.locate(handle)?;
        let slot = &mut self.slots[index];
        let value = slot
            .value
            .take()
            .ok_or_else(|| Error::logic("located slot is empty"))?;
        self.live -= 1;
        if slot.generation < MAX_GENERATION {
            slot.generation += 1;
            self.free.push(index as u32);
        }
        log::trace!("destroyed {} {:#x}", H::KIND, handle.into_raw());
        Ok(value)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no objects are live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

impl<H: Handle, T> Default for HandleRegistry<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handle, T> Drop for HandleRegistry<H, T> {
    fn drop(&mut self) {
        if self.live > 0 {
            log::warn!(
                "{} native {} object(s) were never destroyed by their owner",
                self.live,
                H::KIND
            );
        }
    }
}

/// A [`HandleRegistry`] shared by entry points running on several threads.
///
/// The lock is held only while a handle is issued, looked up or retired.
/// Lookups return a clone of the stored value (an `Arc` in practice), so
/// calls into the object itself run with the registry unlocked.
pub struct SharedRegistry<H: Handle, T> {
    inner: Mutex<HandleRegistry<H, T>>,
}

impl<H: Handle, T> SharedRegistry<H, T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HandleRegistry::new()),
        }
    }

    // A panic never leaves the slot table half-updated, so a poisoned lock
    // is still usable.
    fn lock(&self) -> MutexGuard<'_, HandleRegistry<H, T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take ownership of `value` and return a fresh handle to it.
    pub fn wrap(&self, value: T) -> Result<H> {
        self.lock().wrap(value)
    }

    /// Remove the object behind `handle`. The caller drops it, outside the
    /// registry lock.
    pub fn destroy(&self, handle: H) -> Result<T> {
        self.lock().destroy(handle)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no objects are live.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<H: Handle, T: Clone> SharedRegistry<H, T> {
    /// A clone of the object behind `handle`. Fails like
    /// [`HandleRegistry::get`].
    pub fn get(&self, handle: H) -> Result<T> {
        self.lock().get(handle).cloned()
    }
}

impl<H: Handle, T> Default for SharedRegistry<H, T> {
    fn default() -> Self {
        Self::new()
    }
}
