//! Implementação x86_64 do HAL.

pub mod context;
pub mod cpu;
pub mod gdt;

pub use cpu::Cpu;
