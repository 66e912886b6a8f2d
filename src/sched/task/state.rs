//! Estados de task
//!
//! ```text
//!            slice/yield
//!   Running ───────────► Preempted
//!      ▲  ◄─────────────    │
//!      │    selecionada     │ block
//!      │ block              ▼
//!      └──────────────► Blocked ──unblock──► Preempted
//!
//!   qualquer ──exit/sinal──► Zombie ──scan──► reciclada
//!   qualquer ──terminação adiada──► Dying ──scan──► Zombie
//! ```

/// Estado de uma task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Executando (exatamente uma fora da janela de interrupção)
    Running,
    /// Pronta, perdeu a CPU
    Preempted,
    /// Esperando um evento
    Blocked,
    /// Terminada, aguardando reciclagem
    Zombie,
    /// Terminação pedida, finalizada no próximo scan
    Dying,
}

impl TaskState {
    /// Pode ser escolhida pelo seletor
    pub const fn is_runnable(self) -> bool {
        matches!(self, Self::Running | Self::Preempted)
    }

    /// Já terminou ou vai terminar
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Zombie | Self::Dying)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Preempted => "PREEMPTED",
            Self::Blocked => "BLOCKED",
            Self::Zombie => "ZOMBIE",
            Self::Dying => "DYING",
        }
    }
}
