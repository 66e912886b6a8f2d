//! Registro de tarefas.
//!
//! Arena de capacidade fixa: cada tarefa ocupa um slot estável até ser
//! reciclada. O seletor round-robin percorre os slots em ordem, então o slot
//! (e não o pid) define a ordem de execução.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use super::entity::Task;
use crate::sys::Pid;

/// Índice de um slot do registro. Nunca é um pid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(usize);

impl SlotId {
    pub const fn index(self) -> usize {
        self.0
    }

    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }
}

pub struct TaskTable {
    slots: Box<[Option<Task>]>,
    last_pid: u32,
    live: usize,
}

impl TaskTable {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "(Sched) Registro sem slots");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots: slots.into_boxed_slice(),
            last_pid: 0,
            live: 0,
        }
    }

    /// Próximo pid. O primeiro é 1; o 0 pertence à idle.
    ///
    /// Pids nunca são reusados: esgotá-los é fatal.
    pub fn allocate_pid(&mut self) -> Pid {
        let Some(next) = self.last_pid.checked_add(1) else {
            panic!("(Sched) PIDs esgotados");
        };
        self.last_pid = next;
        Pid::new(next)
    }

    /// Coloca `task` no primeiro slot livre.
    ///
    /// Registro cheio é fatal.
    pub fn register(&mut self, task: Task) -> SlotId {
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(task);
                self.live += 1;
                SlotId(index)
            }
            None => panic!("(Sched) Run queue cheia"),
        }
    }

    pub fn get(&self, slot: SlotId) -> Option<&Task> {
        self.slots.get(slot.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut Task> {
        self.slots.get_mut(slot.0).and_then(Option::as_mut)
    }

    /// Slot da tarefa `pid`, se ainda registrada.
    pub fn find(&self, pid: Pid) -> Option<SlotId> {
        self.iter().find(|(_, t)| t.pid == pid).map(|(slot, _)| slot)
    }

    /// Tarefas registradas, em ordem de slot.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Task)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|t| (SlotId(i), t)))
    }

    /// Remove a tarefa do slot. Só a reciclagem usa isto.
    pub fn take(&mut self, slot: SlotId) -> Option<Task> {
        let task = self.slots.get_mut(slot.0)?.take();
        if task.is_some() {
            self.live -= 1;
        }
        task
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl Index<SlotId> for TaskTable {
    type Output = Task;

    fn index(&self, slot: SlotId) -> &Task {
        match self.get(slot) {
            Some(task) => task,
            None => panic!("(Sched) Slot vazio"),
        }
    }
}

impl IndexMut<SlotId> for TaskTable {
    fn index_mut(&mut self, slot: SlotId) -> &mut Task {
        match self.get_mut(slot) {
            Some(task) => task,
            None => panic!("(Sched) Slot vazio"),
        }
    }
}

// =============================================================================
// TESTES
// =============================================================================
