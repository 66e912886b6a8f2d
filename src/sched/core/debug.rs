//! Dump de tarefas para depuração

use super::scheduler::Scheduler;
use super::SCHEDULER;

impl Scheduler {
    /// Lista todas as tarefas registradas no log.
    pub fn dump_tasks(&self) {
        crate::ktrace!("--- (Sched) TAREFAS ---");
        crate::ktrace!("  Atual PID=", self.current_pid().as_u32());
        for (slot, task) in self.table.iter() {
            crate::ktrace!("  - Slot=", slot.index());
            crate::ktrace!("    PID=", task.pid.as_u32());
            crate::ktrace!(task.state.as_str());
            crate::ktrace!(task.name());
        }
        crate::ktrace!("--- (Sched) FIM DO DUMP ---");
    }
}

/// Dump chamado pelo panic handler.
///
/// O panic pode ter acontecido com o lock do scheduler adquirido; nesse caso
/// o lock é quebrado, já que nada mais vai executar.
pub fn dump_after_panic() {
    let global = match SCHEDULER.try_lock() {
        Some(guard) => guard,
        None => {
            // SAFETY: CPU única com interrupções desligadas; o dono do lock
            // nunca vai retomar
            unsafe { SCHEDULER.force_unlock() };
            SCHEDULER.lock()
        }
    };
    if let Some(scheduler) = global.as_ref() {
        scheduler.dump_tasks();
    }
}
