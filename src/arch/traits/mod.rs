//! Traits do Hardware Abstraction Layer (HAL).
//! Interfaces que o scheduler usa para falar com a CPU e com a camada de
//! interrupções.

pub mod cpu;
pub mod trap;

pub use cpu::CpuOps;
pub use trap::{TrapController, TrapHandler};
