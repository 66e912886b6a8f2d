//! Seletor round-robin.
//!
//! Não há fila separada: o registro de tarefas é a run queue. Um cursor
//! lembra o slot seguinte ao último escolhido e cada scan continua dali,
//! o que dá a cada tarefa executável exatamente uma vez por volta.
//!
//! O scan também faz a manutenção do registro: tarefas `Dying` são
//! finalizadas e tarefas `Zombie` (que não sejam a atual) são retiradas do
//! slot e entregues a `reap`.

use crate::sched::task::{lifecycle, SlotId, Task, TaskState, TaskTable};

#[derive(Debug, Default)]
pub struct RunQueue {
    /// Slot onde o próximo scan começa
    cursor: usize,
}

impl RunQueue {
    pub const fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Escolhe a próxima tarefa executável.
    ///
    /// Um scan que começou no slot 0 e não achou nada é fatal. Um scan que
    /// começou no meio recomeça do 0.
    pub fn pick_next(
        &mut self,
        table: &mut TaskTable,
        current: SlotId,
        mut reap: impl FnMut(Task),
    ) -> SlotId {
        loop {
            let start = self.cursor;

            for index in start..table.capacity() {
                let slot = SlotId::new(index);
                let Some(task) = table.get_mut(slot) else {
                    continue;
                };

                let state = task.state;
                match state {
                    TaskState::Dying => {
                        lifecycle::settle_dying(task);
                        if slot != current {
                            if let Some(dead) = table.take(slot) {
                                reap(dead);
                            }
                        }
                    }
                    TaskState::Zombie => {
                        if slot != current {
                            if let Some(dead) = table.take(slot) {
                                reap(dead);
                            }
                        }
                    }
                    _ if state.is_runnable() => {
                        self.cursor = index + 1;
                        return slot;
                    }
                    _ => {}
                }
            }

            if start == 0 {
                panic!("(Sched) Nenhuma tarefa para executar");
            }
            self.cursor = 0;
        }
    }
}

// =============================================================================
// TESTES
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::test::fixture::Fixture;
    use crate::sys::Pid;
    use alloc::vec::Vec;

    fn table_with(fx: &Fixture, states: &[TaskState]) -> TaskTable {
        let mut table = TaskTable::new(states.len() + 2);
        for (i, &state) in states.iter().enumerate() {
            let mut task = fx.kernel_task(Pid::new(i as u32 + 2));
            task.state = state;
            table.register(task);
        }
        table
    }

    #[test]
    fn cycles_in_slot_order() {
        let fx = Fixture::new();
        let mut table = table_with(&fx, &[TaskState::Preempted; 3]);
        let mut rq = RunQueue::new();
        let current = SlotId::new(0);

        let picks: Vec<usize> = (0..7)
            .map(|_| rq.pick_next(&mut table, current, |_| {}).index())
            .collect();
        assert_eq!(picks, [0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn skips_blocked_until_unblocked() {
        let fx = Fixture::new();
        let mut table = table_with(
            &fx,
            &[TaskState::Preempted, TaskState::Blocked, TaskState::Preempted],
        );
        let mut rq = RunQueue::new();
        let current = SlotId::new(0);

        for _ in 0..6 {
            assert_ne!(rq.pick_next(&mut table, current, |_| {}).index(), 1);
        }

        table[SlotId::new(1)].state = TaskState::Preempted;
        let picks: Vec<usize> = (0..3)
            .map(|_| rq.pick_next(&mut table, current, |_| {}).index())
            .collect();
        assert!(picks.contains(&1));
    }

    #[test]
    fn zombies_are_reaped_except_current() {
        let fx = Fixture::new();
        let mut table = table_with(
            &fx,
            &[TaskState::Zombie, TaskState::Zombie, TaskState::Preempted],
        );
        let mut rq = RunQueue::new();
        let mut reaped = Vec::new();

        let next = rq.pick_next(&mut table, SlotId::new(0), |t| reaped.push(t.pid));
        assert_eq!(next.index(), 2);
        assert_eq!(reaped, [Pid::new(3)]);
        assert!(table.get(SlotId::new(0)).is_some());
        assert!(table.get(SlotId::new(1)).is_none());
    }

    #[test]
    fn dying_settles_to_zombie_and_is_reaped() {
        let fx = Fixture::new();
        let mut table = table_with(&fx, &[TaskState::Preempted, TaskState::Dying]);
        let mut rq = RunQueue::new();
        let mut reaped = Vec::new();

        // Começa no slot 1: a Dying é finalizada e o scan recomeça do 0
        rq.pick_next(&mut table, SlotId::new(0), |_| {});
        let next = rq.pick_next(&mut table, SlotId::new(0), |t| reaped.push(t));
        assert_eq!(next.index(), 0);
        assert_eq!(reaped.len(), 1);
        assert_eq!(reaped[0].state, TaskState::Zombie);
        assert!(reaped[0].exit_code.is_some());
    }

    #[test]
    fn dying_current_is_settled_but_kept() {
        let fx = Fixture::new();
        let mut table = table_with(&fx, &[TaskState::Dying, TaskState::Preempted]);
        let mut rq = RunQueue::new();

        let next = rq.pick_next(&mut table, SlotId::new(0), |_| panic!("não recicla a atual"));
        assert_eq!(next.index(), 1);
        assert_eq!(table[SlotId::new(0)].state, TaskState::Zombie);
    }

    #[test]
    #[should_panic(expected = "Nenhuma tarefa para executar")]
    fn nothing_runnable_is_fatal() {
        let fx = Fixture::new();
        let mut table = table_with(&fx, &[TaskState::Blocked, TaskState::Blocked]);
        let mut rq = RunQueue::new();
        rq.pick_next(&mut table, SlotId::new(0), |_| {});
    }
}
