//! Contexto salvo de uma tarefa e a transferência de controle entre tarefas.
//!
//! O contexto é o próprio frame de trap: os stubs de entrada empilham os 15
//! registradores de uso geral sobre o vetor, o código de erro e o frame de
//! `iretq` da CPU, e o scheduler guarda uma cópia desse bloco na tarefa.
//! Retomar uma tarefa é o caminho inverso: copiar o frame para uma área de
//! rascunho, restaurar os registradores e executar `iretq`.
//!
//! Layout (endereços crescentes):
//!
//! ```text
//! r15 r14 r13 r12 r11 r10 r9 r8 rbp rdi rsi rdx rcx rbx rax
//! vector error_code | rip cs rflags rsp ss   (empilhado pela CPU)
//! ```

use bitflags::bitflags;

use super::gdt::{KERNEL_CODE_SEL, KERNEL_DATA_SEL, USER_CODE_SEL, USER_DATA_SEL};
use crate::mm::VirtAddr;

/// Vetor da interrupção de software de yield (`int 0x2f`).
pub const YIELD_VECTOR: u8 = 0x2F;

/// Frame de trap x86_64. Também é o formato do contexto salvo da tarefa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct TrapFrame {
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rbp: u64,
    pub rdi: u64,
    pub rsi: u64,
    pub rdx: u64,
    pub rcx: u64,
    pub rbx: u64,
    pub rax: u64,
    pub vector: u64,
    pub error_code: u64,
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

const _: () = assert!(core::mem::size_of::<TrapFrame>() == 22 * 8);
const _: () = assert!(core::mem::size_of::<TrapFrame>() % 16 == 0);

impl TrapFrame {
    /// A tarefa foi interrompida em ring 3?
    pub fn from_user(&self) -> bool {
        self.cs & 0b11 == 3
    }
}

bitflags! {
    /// RFLAGS (apenas os bits que o scheduler manipula)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RFlags: u64 {
        const CARRY = 1 << 0;
        /// Bit 1 é reservado e sempre 1.
        const RESERVED_1 = 1 << 1;
        const ZERO = 1 << 6;
        const TRAP = 1 << 8;
        const INTERRUPT_ENABLE = 1 << 9;
        const DIRECTION = 1 << 10;
    }
}

impl RFlags {
    /// RFLAGS de toda tarefa nova: IF=1 para que o timer a preempte (0x202).
    pub const INITIAL: RFlags = RFlags::INTERRUPT_ENABLE.union(RFlags::RESERVED_1);
}

/// Nível de privilégio em que a tarefa começa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    Kernel,
    User,
}

/// Monta o contexto inicial de uma tarefa.
///
/// Todos os registradores de uso geral começam zerados. Tarefas de usuário
/// recebem `rbp = rsp` (frame de pilha vazio no topo da stack de usuário).
pub fn make_initial_context(entry: u64, stack_ptr: VirtAddr, privilege: Privilege) -> TrapFrame {
    let (cs, ss) = match privilege {
        Privilege::Kernel => (KERNEL_CODE_SEL, KERNEL_DATA_SEL),
        Privilege::User => (USER_CODE_SEL, USER_DATA_SEL),
    };

    let mut frame = TrapFrame {
        rip: entry,
        cs: cs.as_u64(),
        rflags: RFlags::INITIAL.bits(),
        rsp: stack_ptr.as_u64(),
        ss: ss.as_u64(),
        ..TrapFrame::default()
    };

    if privilege == Privilege::User {
        frame.rbp = stack_ptr.as_u64();
    }

    frame
}

/// Endereço do trampolim colocado como endereço de retorno da função de
/// entrada de uma tarefa de kernel. Se a entrada retornar, o trampolim encerra
/// a tarefa atual.
pub fn task_return_address() -> u64 {
    imp::task_return_address()
}

/// Retoma `frame` usando o topo de `scratch_top` como área de rascunho.
///
/// # Safety
///
/// `scratch_top` deve ser o topo de uma pilha de interrupção exclusiva da
/// tarefa retomada, com pelo menos `size_of::<TrapFrame>()` bytes livres, e o
/// espaço de endereçamento da tarefa já deve estar ativo.
pub unsafe fn resume_context(frame: &TrapFrame, scratch_top: VirtAddr) -> ! {
    imp::resume_context(frame, scratch_top)
}

/// Troca para a pilha `stack_top` e chama `entry`, que nunca retorna.
///
/// # Safety
///
/// `stack_top` deve ser o topo de uma pilha válida que ninguém mais usa.
pub unsafe fn enter_stack(stack_top: VirtAddr, entry: extern "C" fn() -> !) -> ! {
    imp::enter_stack(stack_top, entry)
}

/// Gera a interrupção de yield.
pub fn raise_yield() {
    imp::raise_yield()
}

/// Gera a interrupção de yield com `value` em RAX.
///
/// Usado pelo self-test de captura de contexto: o handler deve ver `value` no
/// campo `rax` do frame salvo.
pub fn raise_yield_with_sentinel(value: u64) {
    imp::raise_yield_with_sentinel(value)
}

// =============================================================================
// BARE METAL
// =============================================================================

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
mod imp {
    use super::TrapFrame;
    use crate::mm::VirtAddr;

    core::arch::global_asm!(
        ".global forge_resume_frame",
        "forge_resume_frame:",
        "mov rsp, rdi",
        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop r11",
        "pop r10",
        "pop r9",
        "pop r8",
        "pop rbp",
        "pop rdi",
        "pop rsi",
        "pop rdx",
        "pop rcx",
        "pop rbx",
        "pop rax",
        // vector + error_code
        "add rsp, 16",
        "iretq",
        "",
        ".global forge_enter_stack",
        "forge_enter_stack:",
        "mov rsp, rdi",
        "xor ebp, ebp",
        "call rsi",
        "ud2",
        "",
        ".global forge_task_return",
        "forge_task_return:",
        "and rsp, -16",
        "call {exit}",
        "ud2",
        exit = sym crate::sched::core::kernel_task_exit,
    );

    extern "C" {
        fn forge_resume_frame(frame: *const TrapFrame) -> !;
        fn forge_enter_stack(stack_top: u64, entry: extern "C" fn() -> !) -> !;
        fn forge_task_return();
    }

    pub fn task_return_address() -> u64 {
        forge_task_return as usize as u64
    }

    pub unsafe fn resume_context(frame: &TrapFrame, scratch_top: VirtAddr) -> ! {
        let dst = (scratch_top.align_down(16).as_u64() as usize
            - core::mem::size_of::<TrapFrame>()) as *mut TrapFrame;
        // A origem pode estar sobre a própria pilha de IRQ: memmove.
        core::ptr::copy(frame as *const TrapFrame, dst, 1);
        forge_resume_frame(dst)
    }

    pub unsafe fn enter_stack(stack_top: VirtAddr, entry: extern "C" fn() -> !) -> ! {
        forge_enter_stack(stack_top.align_down(16).as_u64(), entry)
    }

    pub fn raise_yield() {
        unsafe {
            core::arch::asm!("int 0x2f");
        }
    }

    pub fn raise_yield_with_sentinel(value: u64) {
        unsafe {
            core::arch::asm!("int 0x2f", inout("rax") value => _);
        }
    }
}

// =============================================================================
// HOST (testes)
// =============================================================================

#[cfg(not(target_os = "none"))]
mod imp {
    use super::TrapFrame;
    use crate::mm::VirtAddr;

    extern "C" fn host_task_return() {
        panic!("(Arch) retorno de tarefa indisponível fora do bare metal");
    }

    pub fn task_return_address() -> u64 {
        host_task_return as usize as u64
    }

    pub unsafe fn resume_context(_frame: &TrapFrame, _scratch_top: VirtAddr) -> ! {
        panic!("(Arch) resume_context indisponível fora do bare metal");
    }

    pub unsafe fn enter_stack(_stack_top: VirtAddr, _entry: extern "C" fn() -> !) -> ! {
        panic!("(Arch) enter_stack indisponível fora do bare metal");
    }

    pub fn raise_yield() {
        panic!("(Arch) int 0x2f indisponível fora do bare metal");
    }

    pub fn raise_yield_with_sentinel(_value: u64) {
        panic!("(Arch) int 0x2f indisponível fora do bare metal");
    }
}

// =============================================================================
// TESTES
// =============================================================================
