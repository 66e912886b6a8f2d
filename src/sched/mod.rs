//! # Multitasking & Scheduler Subsystem
//!
//! O módulo `sched` transforma a CPU única em várias tarefas executando
//! "ao mesmo tempo".
//!
//! ## Propósito e Responsabilidade
//! - **Registro de tarefas:** `task` define o TCB (`Task`), seus estados e a
//!   tabela de slots que também é a run queue.
//! - **Criação:** `exec::spawn` monta tarefas de kernel e de usuário (pilhas,
//!   espaço de endereçamento, contexto inicial, file table).
//! - **Troca de contexto:** `core::switch` recebe o frame do trap, escolhe a
//!   próxima tarefa (`core::runqueue`, round-robin) e retoma com `iretq`.
//! - **Boot:** `core::idle` adota o fluxo de boot como a tarefa idle (pid 0)
//!   e cria o init (pid 1).
//!
//! ## Arquitetura: Cooperative + Preemptive
//! 1. **Preemptivo:** o timer chama `core::timer_trap` a cada tick; o quantum
//!    é `config::TIME_SLICE`.
//! 2. **Cooperativo:** `core::yield_now()` dispara `int 0x2f`.
//!
//! Toda troca passa por um trap, então existe um único formato de contexto
//! salvo: o `TrapFrame`.
//!
//! ## Limitações conhecidas
//! - Estado FPU/SSE não é salvo (`fxsave`/`fxrstor`).
//! - Um único lock global; não há suporte a SMP.

pub mod config;
pub mod core;
pub mod exec;
pub mod signal;
pub mod task;
#[cfg(any(test, feature = "self_test"))]
pub mod test;

pub use self::config::SchedConfig;
pub use self::core::{
    block, create_kernel_task, create_user_task, create_user_task_forked, current_pid,
    deliver_signal, dump_tasks, enqueue, exit_current, idle_loop, init, unblock, yield_now,
    BootHooks, Platform, Scheduler,
};
pub use self::exec::SpawnError;
pub use self::signal::Signal;
pub use self::task::{Task, TaskState};
