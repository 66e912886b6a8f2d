//! Estado do scheduler.

use super::platform::Platform;
use super::runqueue::RunQueue;
use crate::mm::AddressSpace;
use crate::sched::task::{SlotId, Task, TaskState, TaskTable};
use crate::sys::Pid;

/// Todo o estado de escalonamento de uma CPU.
///
/// O kernel guarda uma única instância em `SCHEDULER`; os testes criam
/// quantas quiserem sobre colaboradores falsos.
pub struct Scheduler {
    pub(crate) platform: Platform,
    pub(crate) table: TaskTable,
    pub(crate) runqueue: RunQueue,
    /// Slot da tarefa na CPU
    pub(crate) current: SlotId,
    pub(crate) time_slice: u64,
    /// Último espaço carregado em CR3 (tarefas de kernel não trocam)
    pub(crate) active_space: AddressSpace,
}

impl Scheduler {
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn table(&self) -> &TaskTable {
        &self.table
    }

    pub fn current_slot(&self) -> SlotId {
        self.current
    }

    pub fn current(&self) -> &Task {
        &self.table[self.current]
    }

    pub fn current_pid(&self) -> Pid {
        self.current().pid
    }

    pub fn active_space(&self) -> AddressSpace {
        self.active_space
    }

    pub fn time_slice(&self) -> u64 {
        self.time_slice
    }

    /// Slot de `pid`, se registrado.
    pub fn find(&self, pid: Pid) -> Option<SlotId> {
        self.table.find(pid)
    }

    /// Número de tarefas no estado `Running`.
    pub fn running_count(&self) -> usize {
        self.table
            .iter()
            .filter(|(_, t)| t.state == TaskState::Running)
            .count()
    }
}
