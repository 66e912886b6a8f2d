//! Troca de contexto.
//!
//! Toda troca nasce de um trap (timer ou `int 0x2f`). O handler entrega o
//! frame capturado, o scheduler guarda o frame na tarefa atual, escolhe a
//! próxima e devolve um `Resume` com a cópia do contexto dela. O lock do
//! scheduler é solto antes de `Resume::enter`, que não retorna.

use crate::arch::platform::context::{resume_context, TrapFrame};
use crate::mm::VirtAddr;
use crate::sched::config::TIMER_VECTOR;
use crate::sched::task::{lifecycle, TaskState};
use crate::sys::Pid;

use super::scheduler::Scheduler;

/// Por que a tarefa atual perdeu a CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCause {
    /// yield, block, exit
    Voluntary,
    /// Quantum expirado
    Preempted,
}

/// Contexto pronto para ser retomado.
#[must_use = "um Resume descartado deixa a CPU na tarefa anterior"]
#[derive(Debug)]
pub struct Resume {
    pid: Pid,
    frame: TrapFrame,
    scratch_top: VirtAddr,
}

impl Resume {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn frame(&self) -> &TrapFrame {
        &self.frame
    }

    /// Topo da pilha de interrupção da tarefa escolhida.
    pub fn scratch_top(&self) -> VirtAddr {
        self.scratch_top
    }

    /// Restaura os registradores da tarefa e executa `iretq`.
    ///
    /// Chamar sem nenhum lock adquirido.
    pub fn enter(self) -> ! {
        // SAFETY: scratch_top é o topo da pilha de IRQ exclusiva da tarefa e
        // reschedule() já ativou o espaço de endereçamento dela
        unsafe { resume_context(&self.frame, self.scratch_top) }
    }
}

impl Scheduler {
    /// `int 0x2f`: guarda o frame e cede a CPU.
    pub fn on_yield(&mut self, frame: &TrapFrame) -> Resume {
        self.table[self.current].context = *frame;
        self.reschedule(SwitchCause::Voluntary)
    }

    /// Tick do timer. `None` continua a mesma tarefa.
    ///
    /// Troca quando o quantum estoura, ou quando a tarefa atual deixou de ser
    /// `Running` (bloqueada ou terminada fora do próprio contexto).
    pub fn on_tick(&mut self, frame: &TrapFrame) -> Option<Resume> {
        let time_slice = self.time_slice;
        let task = &mut self.table[self.current];
        task.context = *frame;
        task.accounting.tick();

        if task.state != TaskState::Running {
            return Some(self.reschedule(SwitchCause::Voluntary));
        }
        if task.accounting.slice_expired(time_slice) {
            crate::ktrace!("(Sched) Quantum expirado, PID=", task.pid.as_u32());
            return Some(self.reschedule(SwitchCause::Preempted));
        }
        None
    }

    /// IRQ do timer. Se houver troca, reconhece a IRQ aqui, antes de sair
    /// por outra tarefa; senão o EOI fica com a camada de interrupções, no
    /// retorno.
    pub fn on_timer_irq(&mut self, frame: &TrapFrame) -> Option<Resume> {
        let resume = self.on_tick(frame);
        if resume.is_some() {
            self.platform.traps.end_of_interrupt(TIMER_VECTOR);
        }
        resume
    }

    /// Tira a tarefa atual da CPU e escolhe a próxima.
    pub fn reschedule(&mut self, cause: SwitchCause) -> Resume {
        let prev = self.current;
        {
            let task = &mut self.table[prev];
            if task.state == TaskState::Running {
                task.state = TaskState::Preempted;
            }
            task.accounting
                .account_switch(cause == SwitchCause::Voluntary);
        }

        let platform = self.platform;
        let active_space = &mut self.active_space;
        let next = self.runqueue.pick_next(&mut self.table, prev, |dead| {
            lifecycle::reap(dead, &platform, active_space)
        });

        let task = &mut self.table[next];
        task.accounting.start_slice();
        task.state = TaskState::Running;
        self.current = next;

        if !task.aspace.is_kernel() && task.aspace != self.active_space {
            platform.memory.activate(task.aspace);
            self.active_space = task.aspace;
        }
        platform.traps.set_interrupt_stack(task.irq_stack_top());

        let resume = Resume {
            pid: task.pid,
            frame: task.context,
            scratch_top: task.irq_stack_top(),
        };

        if next != prev {
            crate::ktrace!("(Sched) Troca para PID=", resume.pid.as_u32());
        }
        debug_assert_eq!(self.running_count(), 1, "(Sched) mais de uma tarefa Running");
        resume
    }
}

// =============================================================================
// HANDLERS DE TRAP
// =============================================================================

/// Vetor 0x2F.
pub extern "C" fn yield_trap(frame: &mut TrapFrame) {
    let resume = super::with_scheduler(|s| s.on_yield(frame));
    resume.enter();
}

/// Vetor do timer.
pub extern "C" fn timer_trap(frame: &mut TrapFrame) {
    let resume = super::with_scheduler(|s| s.on_timer_irq(frame));
    if let Some(resume) = resume {
        resume.enter();
    }
}

// =============================================================================
// TESTES
// =============================================================================
