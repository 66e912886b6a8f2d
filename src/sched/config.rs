//! Constantes de configuração do Scheduler

use crate::mm::{VirtAddr, PAGE_SIZE};

/// Capacidade do registro de tarefas (slots)
pub const MAX_TASKS: usize = 128;

/// Quantum em ticks do timer. A tarefa é preemptada no tick em que
/// `time_ran` passa a exceder este valor.
pub const TIME_SLICE: u64 = 5;

/// Pilha de execução das tarefas de kernel (e pilha de boot da idle)
pub const KERNEL_STACK_SIZE: usize = 4096;

/// Pilha de interrupção de cada tarefa (TSS.RSP0 e área de rascunho do resume)
pub const IRQ_STACK_SIZE: usize = 4096;

/// Vetor do yield por software
pub const YIELD_VECTOR: u8 = crate::arch::platform::context::YIELD_VECTOR;

/// Vetor do timer (IRQ 0 remapeada)
pub const TIMER_VECTOR: u8 = 32;

/// Topo da pilha de usuário. A página imediatamente abaixo é mapeada na criação.
pub const USER_STACK_TOP: VirtAddr = VirtAddr::new(0x0000_7FFF_FFFF_F000);

/// Página da pilha de usuário
pub const USER_STACK_PAGE: VirtAddr = USER_STACK_TOP.sub(PAGE_SIZE);

/// Valor colocado em RAX pelo self-test de captura de contexto
pub const CONTEXT_SENTINEL: u64 = 0xC0FF_EEEE;

/// Parâmetros do scheduler escolhidos na inicialização.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedConfig {
    /// Slots do registro de tarefas (inclui a idle)
    pub capacity: usize,
    /// Quantum em ticks
    pub time_slice: u64,
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_TASKS,
            time_slice: TIME_SLICE,
        }
    }
}
