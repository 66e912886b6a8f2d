//! Interface abstrata de CPU (HAL).

pub trait CpuOps {
    /// Para a CPU até a próxima interrupção (HLT).
    fn halt();

    /// Desabilita interrupções (CLI).
    fn disable_interrupts();

    /// Habilita interrupções (STI).
    fn enable_interrupts();

    /// RFLAGS.IF
    fn are_interrupts_enabled() -> bool;

    /// Habilita interrupções e espera a próxima, atomicamente (STI; HLT).
    /// Corpo do laço da tarefa idle.
    fn enable_and_halt() {
        Self::enable_interrupts();
        Self::halt();
    }

    /// Loop infinito de halt com interrupções desabilitadas.
    /// Usado em pânicos irrecuperáveis.
    fn hang() -> ! {
        Self::disable_interrupts();
        loop {
            Self::halt();
        }
    }
}
