//! # Memory Management (visão do scheduler)
//!
//! Endereços, o contrato com o gerenciador de memória (`AddressSpaces`) e o
//! heap de pilhas. A implementação real das tabelas de página vive fora deste
//! crate.

pub mod addr;
pub mod aspace;
pub mod heap;

pub use addr::{align_down, align_up, PhysAddr, PhysFrame, VirtAddr, PAGE_SIZE};
pub use aspace::{AddressSpace, AddressSpaces, MemoryError, PageFlags};
pub use heap::{KernelHeap, KernelStack, LinkedListHeap};
