//! Colaboradores externos do scheduler.

use crate::arch::TrapController;
use crate::fs::FileTableOps;
use crate::mm::{AddressSpaces, KernelHeap};

/// Tudo que o scheduler pede ao resto do kernel.
///
/// As referências são `'static`: os subsistemas vivem tanto quanto o kernel.
#[derive(Clone, Copy)]
pub struct Platform {
    pub memory: &'static dyn AddressSpaces,
    pub heap: &'static dyn KernelHeap,
    pub traps: &'static dyn TrapController,
    pub files: &'static dyn FileTableOps,
}
