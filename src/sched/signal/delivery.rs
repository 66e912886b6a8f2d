//! Entrega de sinais

use super::Signal;
use crate::sched::core::Scheduler;
use crate::sched::task::{Action, SlotId};

impl Scheduler {
    /// Aplica a ação padrão de `signal`: termina a tarefa em `slot`.
    ///
    /// `Action::Yield` se a tarefa é a atual.
    pub fn deliver_signal(&mut self, slot: SlotId, signal: Signal) -> Action {
        let pid = self.table[slot].pid;
        crate::kinfo!("(Signal) Sinal recebido, PID=", pid.as_u32());
        crate::kinfo!(signal.name());
        self.terminate(slot, signal.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::platform::context::TrapFrame;
    use crate::sched::config::SchedConfig;
    use crate::sched::task::TaskState;
    use crate::sched::test::fixture::{kernel_entry, Fixture};
    use crate::sys::Pid;

    #[test]
    fn segv_on_current_terminates_with_139_and_yields() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        sched.bootstrap_init_task(kernel_entry);
        let task = sched.create_kernel_task(kernel_entry).expect("spawn");
        let slot = sched.enqueue(task);
        fx.switch_to(&mut sched, slot);

        assert_eq!(sched.deliver_signal(slot, Signal::Segv), Action::Yield);
        assert_eq!(sched.table()[slot].state, TaskState::Zombie);
        assert_eq!(sched.table()[slot].exit_code, Some(139));

        let resume = sched.on_yield(&TrapFrame::default());
        assert_ne!(resume.pid(), sched.table()[slot].pid);
    }

    #[test]
    fn signal_to_other_task_does_not_yield() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        sched.bootstrap_init_task(kernel_entry);
        let task = sched.create_kernel_task(kernel_entry).expect("spawn");
        let slot = sched.enqueue(task);

        assert_eq!(sched.deliver_signal(slot, Signal::Term), Action::Continue);
        assert_eq!(sched.table()[slot].exit_code, Some(143));
    }

    #[test]
    #[should_panic(expected = "Tentativa de encerrar o init")]
    fn init_survives_no_signal() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        let init = sched.bootstrap_init_task(kernel_entry);
        assert_eq!(sched.table()[init].pid, Pid::INIT);
        let _ = sched.deliver_signal(init, Signal::Kill);
    }
}
