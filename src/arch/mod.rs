//! # Hardware Abstraction Layer (HAL)
//!
//! Única ponte entre o scheduler e o hardware. Tudo que exige uma instrução
//! privilegiada (cli/sti/hlt, troca de pilha, `iretq`, `int 0x2f`) vive em
//! `x86_64/` e só é montado com `target_os = "none"`. Em builds hospedados
//! (testes) as mesmas funções existem: a flag de interrupção é emulada e as
//! transferências de controle entram em pânico.
//!
//! 1. O scheduler importa `crate::arch::Cpu` e `crate::arch::platform::context`.
//! 2. `Cpu` é a implementação concreta de `CpuOps` para a arquitetura alvo.

pub mod traits;

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

#[cfg(target_arch = "x86_64")]
pub use x86_64 as platform;

pub use platform::Cpu;
pub use traits::*;
