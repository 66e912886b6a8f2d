//! Contabilidade de CPU por tarefa

/// Estatísticas de uso de CPU de uma tarefa
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accounting {
    /// Ticks desde a última seleção. Zerado quando a tarefa ganha a CPU.
    pub time_ran: u64,

    /// Ticks totais observados com a tarefa corrente
    pub total_ticks: u64,

    /// Trocas voluntárias (yield, block, exit)
    pub voluntary_switches: u64,

    /// Trocas involuntárias (quantum expirado)
    pub involuntary_switches: u64,

    /// Quantas vezes o seletor escolheu esta tarefa
    pub times_selected: u64,
}

impl Accounting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Um tick do timer com esta tarefa na CPU.
    pub fn tick(&mut self) {
        self.time_ran += 1;
        self.total_ticks += 1;
    }

    /// A tarefa ganhou a CPU.
    pub fn start_slice(&mut self) {
        self.time_ran = 0;
        self.times_selected += 1;
    }

    /// Quantum estourado: `time_ran` excede o slice.
    pub fn slice_expired(&self, time_slice: u64) -> bool {
        self.time_ran > time_slice
    }

    pub fn account_switch(&mut self, voluntary: bool) {
        if voluntary {
            self.voluntary_switches += 1;
        } else {
            self.involuntary_switches += 1;
        }
    }
}
