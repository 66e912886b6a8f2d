//! Spinlock com mascaramento de interrupções.
//!
//! Única primitiva de serialização do scheduler (single-CPU): enquanto o guard
//! existe, o timer não dispara, então nenhum tick observa o registro de tarefas
//! pela metade.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::arch::{Cpu, CpuOps};

/// Spinlock - busy-wait, NÃO pode dormir.
///
/// `lock()` desabilita interrupções antes de girar; o guard só as reabilita
/// se estavam habilitadas na aquisição. Isso permite travar de dentro de um
/// handler de trap (IF=0) sem religar interrupções no meio do handler.
pub struct Spinlock<T> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

// SAFETY: acesso ao dado só através do guard
unsafe impl<T: Send> Send for Spinlock<T> {}
unsafe impl<T: Send> Sync for Spinlock<T> {}

impl<T> Spinlock<T> {
    pub const fn new(data: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(data),
        }
    }

    /// Adquire o lock.
    pub fn lock(&self) -> SpinlockGuard<'_, T> {
        let interrupts_were_enabled = Cpu::are_interrupts_enabled();
        Cpu::disable_interrupts();

        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }

        SpinlockGuard {
            lock: self,
            interrupts_were_enabled,
        }
    }

    /// Tenta adquirir sem girar.
    pub fn try_lock(&self) -> Option<SpinlockGuard<'_, T>> {
        let interrupts_were_enabled = Cpu::are_interrupts_enabled();
        Cpu::disable_interrupts();

        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(SpinlockGuard {
                lock: self,
                interrupts_were_enabled,
            })
        } else {
            if interrupts_were_enabled {
                Cpu::enable_interrupts();
            }
            None
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Força o desbloqueio.
    ///
    /// # Safety
    ///
    /// Só o panic handler usa isto, para conseguir despejar o registro de
    /// tarefas mesmo que o pânico tenha ocorrido com o lock adquirido.
    pub unsafe fn force_unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

/// Guard do spinlock - libera ao sair do escopo.
pub struct SpinlockGuard<'a, T> {
    lock: &'a Spinlock<T>,
    interrupts_were_enabled: bool,
}

impl<T> Deref for SpinlockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: lock adquirido
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SpinlockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: lock adquirido
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for SpinlockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);

        if self.interrupts_were_enabled {
            Cpu::enable_interrupts();
        }
    }
}

// =============================================================================
// TESTES
// =============================================================================
