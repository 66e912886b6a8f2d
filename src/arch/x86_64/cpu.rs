//! Implementação x86_64 das operações de CPU.
//!
//! Em bare metal usa as instruções reais. Fora dele (testes no host) a flag
//! de interrupção é emulada por thread, o que mantém o `Spinlock` testável.

use crate::arch::traits::CpuOps;

/// RFLAGS.IF
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
const RFLAGS_IF: u64 = 1 << 9;

pub struct Cpu;

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
impl CpuOps for Cpu {
    #[inline]
    fn halt() {
        unsafe {
            core::arch::asm!("hlt", options(nomem, nostack, preserves_flags));
        }
    }

    #[inline]
    fn disable_interrupts() {
        unsafe {
            core::arch::asm!("cli", options(nomem, nostack));
        }
    }

    #[inline]
    fn enable_interrupts() {
        unsafe {
            core::arch::asm!("sti", options(nomem, nostack));
        }
    }

    #[inline]
    fn are_interrupts_enabled() -> bool {
        let rflags: u64;
        unsafe {
            core::arch::asm!("pushfq; pop {}", out(reg) rflags, options(nomem, preserves_flags));
        }
        rflags & RFLAGS_IF != 0
    }

    /// STI só tem efeito após a instrução seguinte: nenhuma IRQ se perde
    /// entre habilitar e dormir.
    #[inline]
    fn enable_and_halt() {
        unsafe {
            core::arch::asm!("sti; hlt", options(nomem, nostack));
        }
    }
}

// -----------------------------------------------------------------------------
// Host: IF emulado
// -----------------------------------------------------------------------------

#[cfg(all(test, not(target_os = "none")))]
mod emulated {
    use core::cell::Cell;

    std::thread_local! {
        static IF: Cell<bool> = const { Cell::new(false) };
    }

    pub fn set(enabled: bool) {
        IF.with(|f| f.set(enabled));
    }

    pub fn get() -> bool {
        IF.with(|f| f.get())
    }
}

#[cfg(all(not(test), not(target_os = "none")))]
mod emulated {
    use core::sync::atomic::{AtomicBool, Ordering};

    static IF: AtomicBool = AtomicBool::new(false);

    pub fn set(enabled: bool) {
        IF.store(enabled, Ordering::Relaxed);
    }

    pub fn get() -> bool {
        IF.load(Ordering::Relaxed)
    }
}

#[cfg(not(target_os = "none"))]
impl CpuOps for Cpu {
    fn halt() {
        core::hint::spin_loop();
    }

    fn disable_interrupts() {
        emulated::set(false);
    }

    fn enable_interrupts() {
        emulated::set(true);
    }

    fn are_interrupts_enabled() -> bool {
        emulated::get()
    }
}
