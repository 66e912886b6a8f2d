//! Forge Sched.
//!
//! Núcleo de escalonamento do kernel Forge: registro de tarefas, criação de
//! contextos de kernel e de usuário, seleção round-robin e troca de contexto
//! por frame de trap, mais a sequência de boot da tarefa idle.
//!
//! Os colaboradores externos (memória, heap, interrupções, arquivos) entram
//! por traits reunidas em `sched::Platform`.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

// --- Baixo nível ---
pub mod arch; // HAL (CPU, seletores, frame de trap)
pub mod drivers; // Serial (destino dos logs)

// --- Infraestrutura ---
pub mod core; // Logging, panic
pub mod klib; // Framework de self-test
pub mod mm; // Endereços, espaços de endereçamento, heap de pilhas
pub mod sync; // Spinlock
pub mod sys; // Pid, Errno

// --- Subsistemas ---
pub mod fs; // File table das tarefas
pub mod sched; // Scheduler
