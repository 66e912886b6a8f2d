//! # Synchronization Primitives
//!
//! Single-CPU: a única primitiva necessária é o spinlock que mascara
//! interrupções. Os colaboradores de teste usam `spin::Mutex`.

/// Spinlock (busy-wait, mascara IRQs)
pub mod spinlock;

pub use spinlock::{Spinlock, SpinlockGuard};
