//! Heap de blocos fixos para pilhas de tarefas.
//!
//! `KernelHeap` é o contrato mínimo que o scheduler precisa: blocos de tamanho
//! fixo, liberados com o mesmo tamanho. `LinkedListHeap` é a implementação
//! padrão, sobre o `linked_list_allocator`, e `KernelStack` é o dono RAII de
//! uma pilha alocada dele.

use core::alloc::Layout;
use core::ptr::NonNull;

use linked_list_allocator::Heap;
use spin::Mutex;
use volatile::VolatilePtr;

use super::addr::{VirtAddr, PAGE_SIZE};
use super::aspace::MemoryError;

/// Alinhamento de todo bloco (ABI SysV exige pilha alinhada em 16).
pub const BLOCK_ALIGN: usize = 16;

pub trait KernelHeap: Sync {
    /// Bloco de `size` bytes alinhado a `BLOCK_ALIGN`, ou `None` sem memória.
    fn allocate(&self, size: usize) -> Option<NonNull<u8>>;

    /// # Safety
    ///
    /// `ptr` veio de `allocate(size)` deste heap e não é mais usado.
    unsafe fn free(&self, ptr: NonNull<u8>, size: usize);
}

/// Heap sobre uma região contígua, com lista encadeada de blocos livres.
pub struct LinkedListHeap {
    inner: Mutex<RegionHeap>,
}

struct RegionHeap(Heap);

// SAFETY: a região pertence exclusivamente ao heap; o Mutex serializa acesso
unsafe impl Send for RegionHeap {}

impl LinkedListHeap {
    pub const fn empty() -> Self {
        Self {
            inner: Mutex::new(RegionHeap(Heap::empty())),
        }
    }

    /// Entrega a região `[start, start + size)` ao heap.
    ///
    /// # Safety
    ///
    /// A região deve ser memória válida, não usada por mais ninguém, e viver
    /// enquanto o heap existir. Só pode ser chamada uma vez.
    pub unsafe fn init(&self, start: *mut u8, size: usize) {
        self.inner.lock().0.init(start, size);
        crate::kdebug!("(Heap) Regiao de pilhas inicializada, bytes=", size);
    }

    /// Bytes em uso.
    pub fn used_bytes(&self) -> usize {
        self.inner.lock().0.used()
    }
}

impl KernelHeap for LinkedListHeap {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        let layout = Layout::from_size_align(size, BLOCK_ALIGN).ok()?;
        self.inner.lock().0.allocate_first_fit(layout).ok()
    }

    unsafe fn free(&self, ptr: NonNull<u8>, size: usize) {
        match Layout::from_size_align(size, BLOCK_ALIGN) {
            Ok(layout) => self.inner.lock().0.deallocate(ptr, layout),
            Err(_) => crate::kerror!("(Heap) Tamanho invalido ao liberar, bytes=", size),
        }
    }
}

// =============================================================================
// KERNEL STACK
// =============================================================================

/// Pilha alocada do heap. Devolvida ao heap no `Drop`.
pub struct KernelStack {
    base: NonNull<u8>,
    size: usize,
    heap: &'static dyn KernelHeap,
}

// SAFETY: a pilha é exclusiva da tarefa dona; o heap é Sync
unsafe impl Send for KernelStack {}

impl KernelStack {
    /// Aloca e zera uma pilha de `size` bytes.
    ///
    /// Cada página é tocada com escrita volátil antes do zeramento, para que
    /// qualquer falta de página aconteça aqui e não dentro de um handler de IRQ.
    pub fn allocate(heap: &'static dyn KernelHeap, size: usize) -> Result<Self, MemoryError> {
        let base = heap.allocate(size).ok_or(MemoryError::OutOfMemory)?;

        unsafe {
            for offset in (0..size).step_by(PAGE_SIZE as usize) {
                // SAFETY: offset < size, dentro do bloco recém-alocado
                let page = NonNull::new_unchecked(base.as_ptr().add(offset));
                VolatilePtr::new(page).write(0u8);
            }
            core::ptr::write_bytes(base.as_ptr(), 0, size);
        }

        Ok(Self { base, size, heap })
    }

    pub fn base(&self) -> VirtAddr {
        VirtAddr::from_ptr(self.base.as_ptr())
    }

    /// Primeiro endereço acima da pilha.
    pub fn top(&self) -> VirtAddr {
        self.base().add(self.size as u64)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, addr: VirtAddr) -> bool {
        addr >= self.base() && addr < self.top()
    }

    /// Escreve `value` no slot de 8 bytes em `addr`.
    ///
    /// Panic se o slot não couber inteiro na pilha.
    pub fn write_u64(&mut self, addr: VirtAddr, value: u64) {
        assert!(
            self.contains(addr) && addr.add(8) <= self.top() && addr.is_aligned(8),
            "(Heap) escrita fora da pilha"
        );
        unsafe {
            // SAFETY: slot validado acima, pilha exclusiva (&mut self)
            core::ptr::write(addr.as_mut_ptr::<u64>(), value);
        }
    }

    pub fn read_u64(&self, addr: VirtAddr) -> u64 {
        assert!(
            self.contains(addr) && addr.add(8) <= self.top() && addr.is_aligned(8),
            "(Heap) leitura fora da pilha"
        );
        unsafe { core::ptr::read(addr.as_mut_ptr::<u64>()) }
    }
}

impl Drop for KernelStack {
    fn drop(&mut self) {
        unsafe {
            // SAFETY: bloco veio de heap.allocate(size) e a tarefa dona morreu
            self.heap.free(self.base, self.size);
        }
    }
}

impl core::fmt::Debug for KernelStack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KernelStack")
            .field("base", &self.base())
            .field("size", &self.size)
            .finish()
    }
}

// =============================================================================
// TESTES
// =============================================================================
