//! Contrato com o gerenciador de memória.
//!
//! O scheduler não conhece tabelas de página. Ele pede espaços de
//! endereçamento, frames e mapeamentos ao `AddressSpaces` que o kernel instala
//! na `Platform`, e guarda apenas o handle opaco `AddressSpace`.

use bitflags::bitflags;

use super::addr::{PhysAddr, PhysFrame, VirtAddr};

/// Handle de um espaço de endereçamento (raiz da tabela de páginas, o valor
/// de CR3). `KERNEL` é o sentinela compartilhado por todas as tarefas de kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressSpace(u64);

impl AddressSpace {
    pub const KERNEL: AddressSpace = AddressSpace(0);

    pub const fn from_root(root: PhysAddr) -> Self {
        Self(root.as_u64())
    }

    pub const fn root(self) -> PhysAddr {
        PhysAddr::new(self.0)
    }

    pub const fn is_kernel(self) -> bool {
        self.0 == 0
    }
}

bitflags! {
    /// Flags de mapeamento de página
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PageFlags: u64 {
        const PRESENT = 1 << 0;
        const WRITABLE = 1 << 1;
        const USER = 1 << 2;
        const NO_EXECUTE = 1 << 63;
    }
}

impl PageFlags {
    /// Pilha de usuário: presente, gravável, ring 3, não executável.
    pub const USER_STACK: PageFlags = PageFlags::PRESENT
        .union(PageFlags::WRITABLE)
        .union(PageFlags::USER)
        .union(PageFlags::NO_EXECUTE);
}

/// Falhas reportadas pelo gerenciador de memória.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    OutOfMemory,
    InvalidAddressSpace,
    AlreadyMapped,
}

pub trait AddressSpaces: Sync {
    /// Espaço novo contendo apenas a metade do kernel.
    fn new_address_space(&self) -> Result<AddressSpace, MemoryError>;

    /// Cópia independente de `source` (semântica de fork).
    fn copy_address_space(&self, source: AddressSpace) -> Result<AddressSpace, MemoryError>;

    fn allocate_frame(&self) -> Result<PhysFrame, MemoryError>;

    fn free_frame(&self, frame: PhysFrame);

    fn zero_frame(&self, frame: PhysFrame);

    /// Mapeia `page` -> `frame` em `space`, substituindo um mapeamento
    /// herdado de uma cópia.
    fn map_page(
        &self,
        space: AddressSpace,
        page: VirtAddr,
        frame: PhysFrame,
        flags: PageFlags,
    ) -> Result<(), MemoryError>;

    /// Carrega `space` em CR3.
    fn activate(&self, space: AddressSpace);

    /// Libera as tabelas de `space`. Nunca é chamado para o espaço ativo.
    fn release_address_space(&self, space: AddressSpace);
}
