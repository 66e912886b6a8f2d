//! Ciclo de vida: bloqueio, término e reciclagem.
//!
//! As operações daqui só mudam estado. Quem chama decide se precisa ceder a
//! CPU olhando o `Action` devolvido; o wrapper global em `sched::core` faz o
//! yield. A reciclagem (`reap`) acontece no scan do seletor, nunca sobre a
//! tarefa que está na CPU.

use super::entity::{ExecStack, Task};
use super::state::TaskState;
use super::table::SlotId;
use crate::mm::AddressSpace;
use crate::sched::core::{Platform, Scheduler};
use crate::sched::signal::Signal;
use crate::sys::Pid;

/// O que o chamador deve fazer depois da operação.
#[must_use = "Action::Yield exige ceder a CPU"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    /// A tarefa atual deixou de ser executável
    Yield,
}

/// Idle e init não podem terminar.
pub fn ensure_killable(pid: Pid) {
    if pid == Pid::IDLE {
        panic!("Kernel bug: tentativa de matar a tarefa idle");
    }
    if pid == Pid::INIT {
        panic!("Tentativa de encerrar o init");
    }
}

/// Conclui uma terminação adiada: `Dying` vira `Zombie`.
pub fn settle_dying(task: &mut Task) {
    task.state = TaskState::Zombie;
    task.exit_code.get_or_insert(Signal::Kill.exit_code());
    crate::kdebug!("(Sched) Terminacao adiada concluida, PID=", task.pid.as_u32());
}

/// Libera tudo que a tarefa possui.
///
/// Se o espaço de endereçamento dela é o ativo, o do kernel é carregado antes
/// da liberação.
pub fn reap(task: Task, platform: &Platform, active_space: &mut AddressSpace) {
    let Task {
        pid,
        aspace,
        stack,
        irq_stack,
        mut files,
        ..
    } = task;

    files.close_all(platform.files);

    if let ExecStack::User { frame, .. } = stack {
        platform.memory.free_frame(frame);
    }

    if !aspace.is_kernel() {
        if *active_space == aspace {
            platform.memory.activate(AddressSpace::KERNEL);
            *active_space = AddressSpace::KERNEL;
        }
        platform.memory.release_address_space(aspace);
    }

    drop(irq_stack);
    crate::kdebug!("(Sched) Tarefa reciclada, PID=", pid.as_u32());
}

impl Scheduler {
    /// Tira a tarefa da disputa até `unblock`.
    pub fn block(&mut self, slot: SlotId) -> Action {
        let task = &mut self.table[slot];
        if !task.state.is_runnable() {
            crate::kwarn!("(Sched) block em tarefa nao executavel, PID=", task.pid.as_u32());
            return Action::Continue;
        }
        task.state = TaskState::Blocked;
        crate::ktrace!("(Sched) Tarefa bloqueada, PID=", task.pid.as_u32());
        self.yield_if_current(slot)
    }

    /// `Blocked` volta a ser executável. Outros estados não mudam.
    pub fn unblock(&mut self, slot: SlotId) {
        let task = &mut self.table[slot];
        if task.state == TaskState::Blocked {
            task.state = TaskState::Preempted;
            crate::ktrace!("(Sched) Tarefa desbloqueada, PID=", task.pid.as_u32());
        }
    }

    /// Termina a tarefa atual com `code`. Sempre `Action::Yield`.
    pub fn exit_current(&mut self, code: i32) -> Action {
        self.terminate(self.current, code)
    }

    /// Termina imediatamente: a tarefa vira `Zombie` com `code`.
    pub fn terminate(&mut self, slot: SlotId, code: i32) -> Action {
        let task = &mut self.table[slot];
        ensure_killable(task.pid);
        if task.state == TaskState::Zombie {
            return Action::Continue;
        }
        task.state = TaskState::Zombie;
        task.exit_code = Some(code);
        crate::kinfo!("(Sched) Tarefa encerrada, PID=", task.pid.as_u32());
        self.yield_if_current(slot)
    }

    /// Terminação adiada: `Dying` até o próximo scan do seletor.
    pub fn request_termination(&mut self, slot: SlotId) -> Action {
        let task = &mut self.table[slot];
        ensure_killable(task.pid);
        if task.state.is_terminal() {
            return Action::Continue;
        }
        task.state = TaskState::Dying;
        crate::kdebug!("(Sched) Terminacao pedida, PID=", task.pid.as_u32());
        self.yield_if_current(slot)
    }

    /// Desfaz uma tarefa criada e nunca enfileirada.
    pub fn discard(&mut self, task: Task) {
        reap(task, &self.platform, &mut self.active_space);
    }

    fn yield_if_current(&self, slot: SlotId) -> Action {
        if slot == self.current {
            Action::Yield
        } else {
            Action::Continue
        }
    }
}

// =============================================================================
// TESTES
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::platform::context::TrapFrame;
    use crate::mm::VirtAddr;
    use crate::sched::config::SchedConfig;
    use crate::sched::test::fixture::{kernel_entry, Fixture};

    #[test]
    #[should_panic(expected = "tentativa de matar a tarefa idle")]
    fn idle_cannot_exit() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        let _ = sched.exit_current(0);
    }

    #[test]
    #[should_panic(expected = "Tentativa de encerrar o init")]
    fn init_cannot_exit() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        let init = sched.bootstrap_init_task(kernel_entry);
        fx.switch_to(&mut sched, init);
        let _ = sched.exit_current(0);
    }

    #[test]
    fn exit_makes_zombie_and_next_scan_reaps_it() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        sched.bootstrap_init_task(kernel_entry);
        let user = sched.create_user_task(VirtAddr::new(0x40_0000)).expect("spawn");
        let space = user.aspace;
        let slot = sched.enqueue(user);
        fx.switch_to(&mut sched, slot);
        let heap_with_user = fx.heap.used_bytes();

        assert_eq!(sched.exit_current(3), Action::Yield);
        assert_eq!(sched.table()[slot].state, TaskState::Zombie);
        assert_eq!(sched.table()[slot].exit_code, Some(3));

        // A atual sai da CPU mas só é reciclada no scan seguinte
        let _ = sched.on_yield(&TrapFrame::default());
        assert!(sched.table().get(slot).is_some());
        let _ = sched.on_yield(&TrapFrame::default());
        let _ = sched.on_yield(&TrapFrame::default());
        assert!(sched.table().get(slot).is_none());

        assert_eq!(fx.memory.released(), [space]);
        assert_eq!(fx.memory.freed_frames().len(), 1);
        assert_eq!(fx.files.open_count(), 0);
        assert!(fx.heap.used_bytes() < heap_with_user);
        assert_eq!(sched.active_space(), AddressSpace::KERNEL);
        assert_eq!(fx.memory.activations().last(), Some(&AddressSpace::KERNEL));
    }

    #[test]
    fn blocking_current_asks_for_yield() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        let task = sched.create_kernel_task(kernel_entry).expect("spawn");
        let slot = sched.enqueue(task);
        fx.switch_to(&mut sched, slot);

        assert_eq!(sched.block(slot), Action::Yield);
        assert_eq!(sched.table()[slot].state, TaskState::Blocked);
        let resume = sched.on_yield(&TrapFrame::default());
        assert_eq!(resume.pid(), Pid::IDLE);
    }

    #[test]
    fn blocking_other_task_continues() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        let task = sched.create_kernel_task(kernel_entry).expect("spawn");
        let slot = sched.enqueue(task);

        assert_eq!(sched.block(slot), Action::Continue);
        assert_eq!(sched.block(slot), Action::Continue);
        sched.unblock(slot);
        assert_eq!(sched.table()[slot].state, TaskState::Preempted);
    }

    #[test]
    fn unblock_ignores_non_blocked_tasks() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        sched.bootstrap_init_task(kernel_entry);
        let task = sched.create_kernel_task(kernel_entry).expect("spawn");
        let slot = sched.enqueue(task);
        let _ = sched.terminate(slot, 9);

        sched.unblock(slot);
        assert_eq!(sched.table()[slot].state, TaskState::Zombie);
    }

    #[test]
    fn requested_termination_is_settled_by_scan() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        sched.bootstrap_init_task(kernel_entry);
        let task = sched.create_kernel_task(kernel_entry).expect("spawn");
        let slot = sched.enqueue(task);

        assert_eq!(sched.request_termination(slot), Action::Continue);
        assert_eq!(sched.table()[slot].state, TaskState::Dying);

        let _ = sched.on_yield(&TrapFrame::default()); // idle
        let _ = sched.on_yield(&TrapFrame::default()); // init
        let resume = sched.on_yield(&TrapFrame::default());
        assert_eq!(resume.pid(), Pid::IDLE);
        assert!(sched.table().get(slot).is_none());
    }

    #[test]
    #[should_panic(expected = "Tentativa de encerrar o init")]
    fn first_spawned_task_is_protected_as_init() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        let task = sched.create_kernel_task(kernel_entry).expect("spawn");
        assert_eq!(task.pid, Pid::INIT);
        let slot = sched.enqueue(task);
        let _ = sched.request_termination(slot);
    }

    #[test]
    fn discard_returns_everything() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        let used = fx.heap.used_bytes();
        let task = sched.create_user_task(VirtAddr::new(0x40_0000)).expect("spawn");
        let space = task.aspace;

        sched.discard(task);
        assert_eq!(fx.heap.used_bytes(), used);
        assert_eq!(fx.memory.released(), [space]);
        assert_eq!(fx.memory.live_spaces(), 0);
        // Nunca ativado: nenhuma troca para o kernel
        assert!(fx.memory.activations().is_empty());
    }
}
