//! Núcleo do scheduler
//!
//! Um único `Scheduler` global, atrás de um spinlock que mascara interrupções.
//! As funções livres deste módulo são a API usada pelo resto do kernel: pegam
//! o lock, delegam ao `Scheduler` e, quando a operação pede, cedem a CPU com
//! `int 0x2f` depois de soltar o lock.

pub mod debug;
pub mod idle;
pub mod platform;
pub mod runqueue;
pub mod scheduler;
pub mod switch;

pub use idle::{idle_loop, init, BootHooks};
pub use platform::Platform;
pub use runqueue::RunQueue;
pub use scheduler::Scheduler;
pub use switch::{timer_trap, yield_trap, Resume, SwitchCause};

use crate::arch::platform::context::raise_yield;
use crate::mm::VirtAddr;
use crate::sched::exec::SpawnError;
use crate::sched::signal::Signal;
use crate::sched::task::{Action, KernelEntry, SlotId, Task};
use crate::sync::Spinlock;
use crate::sys::{Errno, Pid};

/// Estado global de escalonamento (CPU única)
static SCHEDULER: Spinlock<Option<Scheduler>> = Spinlock::new(None);

pub(crate) fn install(scheduler: Scheduler) {
    let mut global = SCHEDULER.lock();
    if global.is_some() {
        panic!("(Sched) Scheduler ja inicializado");
    }
    *global = Some(scheduler);
}

/// Executa `f` com o scheduler travado.
///
/// Não chame `raise_yield` dentro de `f`: o handler do yield pega o mesmo lock.
pub(crate) fn with_scheduler<R>(f: impl FnOnce(&mut Scheduler) -> R) -> R {
    let mut global = SCHEDULER.lock();
    match global.as_mut() {
        Some(scheduler) => f(scheduler),
        None => panic!("(Sched) Scheduler nao inicializado"),
    }
}

fn slot_of(scheduler: &Scheduler, pid: Pid) -> Result<SlotId, Errno> {
    scheduler.find(pid).ok_or(Errno::ESRCH)
}

impl Action {
    /// Cede a CPU se for `Yield`. Chamar sem o lock do scheduler.
    pub fn perform(self) {
        if self == Action::Yield {
            raise_yield();
        }
    }
}

// =============================================================================
// API GLOBAL
// =============================================================================

pub fn create_kernel_task(entry: KernelEntry) -> Result<Task, SpawnError> {
    with_scheduler(|s| s.create_kernel_task(entry))
}

pub fn create_user_task(entry: VirtAddr) -> Result<Task, SpawnError> {
    with_scheduler(|s| s.create_user_task(entry))
}

pub fn create_user_task_forked(entry: VirtAddr) -> Result<Task, SpawnError> {
    with_scheduler(|s| s.create_user_task_forked(entry))
}

/// Registra a tarefa e devolve seu PID.
pub fn enqueue(task: Task) -> Pid {
    let pid = task.pid;
    with_scheduler(|s| s.enqueue(task));
    pid
}

/// Bloqueia `pid`. Se for a tarefa atual, só retorna depois de `unblock`.
pub fn block(pid: Pid) -> Result<(), Errno> {
    let action = with_scheduler(|s| {
        let slot = slot_of(s, pid)?;
        Ok::<_, Errno>(s.block(slot))
    })?;
    action.perform();
    Ok(())
}

pub fn unblock(pid: Pid) -> Result<(), Errno> {
    with_scheduler(|s| {
        let slot = slot_of(s, pid)?;
        s.unblock(slot);
        Ok(())
    })
}

/// Encerra a tarefa atual.
pub fn exit_current(code: i32) -> ! {
    let action = with_scheduler(|s| s.exit_current(code));
    action.perform();
    panic!("(Sched) Tarefa encerrada voltou a executar");
}

pub fn yield_now() {
    raise_yield();
}

/// Entrega `signal` a `pid`. Se o alvo for a tarefa atual, não retorna.
pub fn deliver_signal(pid: Pid, signal: Signal) -> Result<(), Errno> {
    let action = with_scheduler(|s| {
        let slot = slot_of(s, pid)?;
        Ok::<_, Errno>(s.deliver_signal(slot, signal))
    })?;
    action.perform();
    Ok(())
}

pub fn current_pid() -> Pid {
    with_scheduler(|s| s.current_pid())
}

pub fn dump_tasks() {
    with_scheduler(|s| s.dump_tasks());
}

/// Destino de uma tarefa de kernel cuja entrada retornou.
pub extern "C" fn kernel_task_exit() -> ! {
    crate::kdebug!("(Sched) Entrada de tarefa de kernel retornou");
    exit_current(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_pid_is_esrch() {
        let fx = crate::sched::test::fixture::Fixture::new();
        let sched = fx.scheduler(crate::sched::config::SchedConfig::default());
        assert_eq!(slot_of(&sched, Pid::new(77)), Err(Errno::ESRCH));
        assert_eq!(slot_of(&sched, Pid::IDLE), Ok(SlotId::new(0)));
    }

    #[test]
    fn continue_does_not_yield() {
        // raise_yield panica no host: Continue não pode chegar nele
        Action::Continue.perform();
    }

    #[test]
    #[should_panic(expected = "Scheduler nao inicializado")]
    fn global_api_requires_init() {
        let _ = current_pid();
    }
}
