/// Arquivo: x86_64/gdt.rs
///
/// Seletores de segmento usados nos contextos iniciais das tarefas.
/// A GDT e o TSS pertencem à camada de interrupções do kernel; o scheduler
/// só precisa saber quais seletores colocar em CS/SS de um frame novo.
///
/// Layout da GDT assumido:
/// - Index 0: Null
/// - Index 1: Kernel Code
/// - Index 2: Kernel Data
/// - Index 3: User Data  (antes de Code, exigido por SYSRET)
/// - Index 4: User Code
/// - Index 5: TSS (2 slots)

/// Seletor de segmento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SegmentSelector(pub u16);

impl SegmentSelector {
    pub const fn new(index: u16, rpl: u8) -> Self {
        Self((index << 3) | (rpl as u16))
    }

    /// Requested Privilege Level (bits 0-1).
    pub const fn rpl(self) -> u8 {
        (self.0 & 0b11) as u8
    }

    pub const fn as_u64(self) -> u64 {
        self.0 as u64
    }
}

pub const KERNEL_CODE_SEL: SegmentSelector = SegmentSelector::new(1, 0); // 0x08
pub const KERNEL_DATA_SEL: SegmentSelector = SegmentSelector::new(2, 0); // 0x10
pub const USER_DATA_SEL: SegmentSelector = SegmentSelector::new(3, 3); // 0x1B
pub const USER_CODE_SEL: SegmentSelector = SegmentSelector::new(4, 3); // 0x23

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_match_gdt_layout() {
        assert_eq!(KERNEL_CODE_SEL.0, 0x08);
        assert_eq!(KERNEL_DATA_SEL.0, 0x10);
        assert_eq!(USER_DATA_SEL.0, 0x1B);
        assert_eq!(USER_CODE_SEL.0, 0x23);
        assert_eq!(USER_CODE_SEL.rpl(), 3);
        assert_eq!(KERNEL_CODE_SEL.rpl(), 0);
    }
}
