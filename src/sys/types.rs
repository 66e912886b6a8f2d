//! Tipos fundamentais do sistema

use core::fmt;

/// Process ID. Monotônico, nunca reutilizado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Pid(pub u32);

impl Pid {
    /// Tarefa idle (criada pelo próprio scheduler).
    pub const IDLE: Pid = Pid(0);
    /// Primeira tarefa alocada: o init.
    pub const INIT: Pid = Pid(1);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
