//! Contrato com a camada de interrupções.
//!
//! O scheduler não programa IDT, PIC/APIC nem TSS diretamente: ele recebe um
//! `TrapController` do kernel e pede apenas o que precisa.

use crate::arch::platform::context::TrapFrame;
use crate::mm::VirtAddr;

/// Handler chamado pelo stub de entrada do vetor com o frame salvo na pilha.
///
/// Se o handler retornar, o stub restaura o frame (possivelmente alterado) e
/// executa `iretq` na mesma tarefa.
pub type TrapHandler = extern "C" fn(frame: &mut TrapFrame);

pub trait TrapController: Sync {
    /// Instala `handler` no vetor `vector`.
    fn register_trap(&self, vector: u8, handler: TrapHandler);

    /// Reconhece a interrupção (EOI) antes de trocar de tarefa.
    fn end_of_interrupt(&self, vector: u8);

    /// Topo da pilha usada pela CPU ao entrar em ring 0 (TSS.RSP0).
    fn set_interrupt_stack(&self, top: VirtAddr);
}
