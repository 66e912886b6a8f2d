//! Task Control Block

use super::accounting::Accounting;
use super::state::TaskState;
use crate::arch::platform::context::TrapFrame;
use crate::fs::FileTable;
use crate::klib;
use crate::mm::{AddressSpace, KernelStack, PhysFrame, VirtAddr};
use crate::sys::Pid;

/// Tamanho do nome de debug
pub const TASK_NAME_LEN: usize = 16;

/// Ponto de entrada de uma tarefa de kernel.
pub type KernelEntry = extern "C" fn();

/// Pilha de execução normal da tarefa.
#[derive(Debug)]
pub enum ExecStack {
    /// Bloco do heap (tarefas de kernel e a idle)
    Kernel(KernelStack),
    /// Frame físico mapeado no espaço do usuário logo abaixo de `top`
    User { frame: PhysFrame, top: VirtAddr },
}

/// Task Control Block
#[derive(Debug)]
pub struct Task {
    pub pid: Pid,
    pub state: TaskState,
    /// Contexto salvo. Válido sempre que a tarefa não está na CPU.
    pub context: TrapFrame,
    /// `AddressSpace::KERNEL` para tarefas de kernel
    pub aspace: AddressSpace,
    pub stack: ExecStack,
    /// Pilha de interrupção (TSS.RSP0) e área de rascunho do resume
    pub irq_stack: KernelStack,
    pub accounting: Accounting,
    /// Quem criou (apenas consulta)
    pub parent: Option<Pid>,
    pub exit_code: Option<i32>,
    pub files: FileTable,
    pub name: [u8; TASK_NAME_LEN],
}

impl Task {
    pub fn is_kernel(&self) -> bool {
        self.aspace.is_kernel()
    }

    pub fn name(&self) -> &str {
        klib::name_str(&self.name)
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = klib::fixed_name(name);
    }

    pub fn irq_stack_top(&self) -> VirtAddr {
        self.irq_stack.top()
    }
}
