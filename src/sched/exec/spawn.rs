//! Criação de tarefas
//!
//! Monta o `Task` completo (pilhas, espaço de endereçamento, contexto inicial,
//! file table) sem registrá-lo. Cada recurso adquirido é devolvido se um passo
//! seguinte falhar; nada é tentado de novo.

use crate::arch::platform::context::{make_initial_context, task_return_address, Privilege};
use crate::fs::{FileError, FileTable};
use crate::klib;
use crate::mm::{AddressSpace, KernelStack, MemoryError, PageFlags, VirtAddr};
use crate::sched::config::{IRQ_STACK_SIZE, KERNEL_STACK_SIZE, USER_STACK_PAGE, USER_STACK_TOP};
use crate::sched::core::{Platform, Scheduler};
use crate::sched::task::{Accounting, ExecStack, KernelEntry, SlotId, Task, TaskState};
use crate::sys::{Errno, Pid};

/// Falha ao criar uma tarefa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnError {
    /// Heap ou frames físicos esgotados
    OutOfMemory,
    /// O gerenciador de memória recusou o espaço de endereçamento
    AddressSpace(MemoryError),
    /// Não foi possível duplicar o console para stdin/stdout
    Files(FileError),
}

impl From<MemoryError> for SpawnError {
    fn from(e: MemoryError) -> Self {
        match e {
            MemoryError::OutOfMemory => SpawnError::OutOfMemory,
            other => SpawnError::AddressSpace(other),
        }
    }
}

impl From<FileError> for SpawnError {
    fn from(e: FileError) -> Self {
        SpawnError::Files(e)
    }
}

impl From<SpawnError> for Errno {
    fn from(e: SpawnError) -> Self {
        match e {
            SpawnError::OutOfMemory | SpawnError::AddressSpace(_) => Errno::ENOMEM,
            SpawnError::Files(FileError::TooManyOpenFiles) => Errno::EMFILE,
        }
    }
}

/// Tarefa de kernel: pilha do heap, espaço do kernel, sem file table.
///
/// A entrada começa com RSP em `topo - 8` (alinhamento SysV de uma chamada),
/// e esse slot guarda o endereço do trampolim de saída: se `entry` retornar,
/// a tarefa é encerrada.
pub(crate) fn build_kernel_task(
    platform: &Platform,
    pid: Pid,
    parent: Option<Pid>,
    entry: KernelEntry,
) -> Result<Task, SpawnError> {
    let mut stack = KernelStack::allocate(platform.heap, KERNEL_STACK_SIZE)?;
    let irq_stack = KernelStack::allocate(platform.heap, IRQ_STACK_SIZE)?;

    let entry_rsp = stack.top().align_down(16).sub(8);
    stack.write_u64(entry_rsp, task_return_address());

    let context = make_initial_context(entry as usize as u64, entry_rsp, Privilege::Kernel);

    crate::ktrace!("(Spawn) Tarefa de kernel, PID=", pid.as_u32());
    Ok(Task {
        pid,
        state: TaskState::Preempted,
        context,
        aspace: AddressSpace::KERNEL,
        stack: ExecStack::Kernel(stack),
        irq_stack,
        accounting: Accounting::new(),
        parent,
        exit_code: None,
        files: FileTable::empty(),
        name: klib::fixed_name("kthread"),
    })
}

/// Tarefa de usuário em `space` (novo ou copiado; a tarefa passa a ser dona).
///
/// Em falha, `space` é liberado junto com o resto.
pub(crate) fn build_user_task(
    platform: &Platform,
    pid: Pid,
    parent: Option<Pid>,
    space: AddressSpace,
    entry: VirtAddr,
) -> Result<Task, SpawnError> {
    let memory = platform.memory;

    let frame = match memory.allocate_frame() {
        Ok(frame) => frame,
        Err(e) => {
            memory.release_address_space(space);
            crate::kwarn!("(Spawn) Sem frame para a pilha de usuario, PID=", pid.as_u32());
            return Err(e.into());
        }
    };

    let parts = (|| -> Result<(KernelStack, FileTable), SpawnError> {
        memory.zero_frame(frame);
        memory.map_page(space, USER_STACK_PAGE, frame, PageFlags::USER_STACK)?;
        let irq_stack = KernelStack::allocate(platform.heap, IRQ_STACK_SIZE)?;
        let files = FileTable::with_console(platform.files)?;
        Ok((irq_stack, files))
    })();

    let (irq_stack, files) = match parts {
        Ok(parts) => parts,
        Err(e) => {
            memory.free_frame(frame);
            memory.release_address_space(space);
            crate::kwarn!("(Spawn) Criacao de tarefa de usuario desfeita, PID=", pid.as_u32());
            return Err(e);
        }
    };

    let context = make_initial_context(entry.as_u64(), USER_STACK_TOP, Privilege::User);

    crate::ktrace!("(Spawn) Tarefa de usuario, PID=", pid.as_u32());
    Ok(Task {
        pid,
        state: TaskState::Preempted,
        context,
        aspace: space,
        stack: ExecStack::User {
            frame,
            top: USER_STACK_TOP,
        },
        irq_stack,
        accounting: Accounting::new(),
        parent,
        exit_code: None,
        files,
        name: klib::fixed_name("user"),
    })
}

impl Scheduler {
    /// Cria (sem enfileirar) uma tarefa de kernel que começa em `entry`.
    pub fn create_kernel_task(&mut self, entry: KernelEntry) -> Result<Task, SpawnError> {
        let pid = self.table.allocate_pid();
        let parent = Some(self.current_pid());
        build_kernel_task(&self.platform, pid, parent, entry)
    }

    /// Cria (sem enfileirar) uma tarefa de usuário num espaço novo.
    pub fn create_user_task(&mut self, entry: VirtAddr) -> Result<Task, SpawnError> {
        let space = self.platform.memory.new_address_space()?;
        self.create_user_task_in(space, entry)
    }

    /// Cria (sem enfileirar) uma tarefa de usuário numa cópia do espaço da
    /// tarefa atual (fork).
    pub fn create_user_task_forked(&mut self, entry: VirtAddr) -> Result<Task, SpawnError> {
        let source = self.current().aspace;
        let space = self.platform.memory.copy_address_space(source)?;
        let mut task = self.create_user_task_in(space, entry)?;
        task.set_name("fork");
        Ok(task)
    }

    /// Tarefa de usuário em `space`, que passa a pertencer a ela. Em falha,
    /// `space` é liberado.
    pub fn create_user_task_in(
        &mut self,
        space: AddressSpace,
        entry: VirtAddr,
    ) -> Result<Task, SpawnError> {
        let pid = self.table.allocate_pid();
        let parent = Some(self.current_pid());
        build_user_task(&self.platform, pid, parent, space, entry)
    }

    /// Registra a tarefa; ela passa a concorrer no próximo scan.
    pub fn enqueue(&mut self, task: Task) -> SlotId {
        let pid = task.pid;
        let slot = self.table.register(task);
        crate::kdebug!("(Sched) Tarefa enfileirada, PID=", pid.as_u32());
        slot
    }
}

// =============================================================================
// TESTES
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{STDERR, STDIN, STDOUT};
    use crate::mm::{AddressSpaces, PAGE_SIZE};
    use crate::sched::config::SchedConfig;
    use crate::sched::test::fixture::{kernel_entry, Fixture};

    #[test]
    fn kernel_task_starts_below_return_trap() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        let task = sched.create_kernel_task(kernel_entry).expect("spawn");

        let ExecStack::Kernel(ref stack) = task.stack else {
            panic!("pilha de kernel esperada");
        };
        let ctx = task.context;
        assert_eq!(ctx.rip, kernel_entry as usize as u64);
        assert_eq!(ctx.rsp, stack.top().align_down(16).as_u64() - 8);
        assert_eq!(ctx.rsp % 16, 8);
        assert_eq!(stack.read_u64(VirtAddr::new(ctx.rsp)), task_return_address());
        assert_eq!(ctx.rflags, 0x202);
        assert_eq!(ctx.cs, 0x08);
        assert!(task.is_kernel());
        assert!(task.files.is_empty());
        assert_eq!(task.state, TaskState::Preempted);
        assert_eq!(task.parent, Some(Pid::IDLE));
    }

    #[test]
    fn user_task_gets_zeroed_stack_page_and_console() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        let task = sched.create_user_task(VirtAddr::new(0x40_0000)).expect("spawn");

        assert!(!task.is_kernel());
        let ctx = task.context;
        assert_eq!(ctx.rip, 0x40_0000);
        assert_eq!(ctx.rsp, USER_STACK_TOP.as_u64());
        assert_eq!(ctx.cs, 0x23);
        assert_eq!(ctx.ss, 0x1B);

        let ExecStack::User { frame, .. } = task.stack else {
            panic!("pilha de usuario esperada");
        };
        assert_eq!(fx.memory.translate(task.aspace, USER_STACK_PAGE), Some(frame));
        let page = fx.memory.read(task.aspace, USER_STACK_PAGE, 0, PAGE_SIZE as usize);
        assert!(page.iter().all(|&b| b == 0));

        assert!(task.files.get(STDIN).is_some());
        assert!(task.files.get(STDOUT).is_some());
        assert_eq!(task.files.get(STDERR), None);
    }

    #[test]
    fn fork_copies_address_space_independently() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());

        // Pai: tarefa de usuário com dados na pilha, posta na CPU
        let parent = sched.create_user_task(VirtAddr::new(0x40_0000)).expect("pai");
        let parent_space = parent.aspace;
        fx.memory.write(parent_space, USER_STACK_PAGE, 0x10, b"parent");
        let parent_slot = sched.enqueue(parent);
        fx.switch_to(&mut sched, parent_slot);

        let child = sched.create_user_task_forked(VirtAddr::new(0x40_1000)).expect("fork");
        assert_ne!(child.aspace, parent_space);
        assert_eq!(child.parent, Some(sched.table()[parent_slot].pid));

        // Filho tem pilha própria, zerada; pai intacto
        let child_frame = fx.memory.translate(child.aspace, USER_STACK_PAGE);
        let parent_frame = fx.memory.translate(parent_space, USER_STACK_PAGE);
        assert_ne!(child_frame, parent_frame);
        assert_eq!(fx.memory.read(child.aspace, USER_STACK_PAGE, 0x10, 6), [0u8; 6]);

        fx.memory.write(child.aspace, USER_STACK_PAGE, 0x10, b"child!");
        assert_eq!(fx.memory.read(parent_space, USER_STACK_PAGE, 0x10, 6), b"parent");
        assert_eq!(fx.memory.copies_of(parent_space), 1);
    }

    #[test]
    fn user_spawn_rolls_back_when_files_fail() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        fx.files.fail_after(1);

        let err = sched.create_user_task(VirtAddr::new(0x40_0000)).unwrap_err();
        assert_eq!(err, SpawnError::Files(FileError::TooManyOpenFiles));
        assert_eq!(Errno::from(err), Errno::EMFILE);

        assert_eq!(fx.memory.live_spaces(), 0);
        assert_eq!(fx.memory.freed_frames().len(), 1);
        assert_eq!(fx.files.open_count(), 0);
    }

    #[test]
    fn user_spawn_rolls_back_when_frames_run_out() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        fx.memory.fail_frames(true);

        let err = sched.create_user_task(VirtAddr::new(0x40_0000)).unwrap_err();
        assert_eq!(err, SpawnError::OutOfMemory);
        assert_eq!(Errno::from(err), Errno::ENOMEM);
        assert_eq!(fx.memory.live_spaces(), 0);
    }

    #[test]
    fn kernel_spawn_out_of_heap_releases_stacks() {
        // Idle (2 pilhas) + espaço para uma única tarefa de kernel
        let fx = Fixture::with_heap(4 * 4096);
        let mut sched = fx.scheduler(SchedConfig::default());
        let used_before = fx.heap.used_bytes();

        let mut failures = 0;
        let mut spawned = alloc::vec::Vec::new();
        for _ in 0..4 {
            match sched.create_kernel_task(kernel_entry) {
                Ok(task) => spawned.push(task),
                Err(e) => {
                    assert_eq!(e, SpawnError::OutOfMemory);
                    failures += 1;
                }
            }
        }
        assert!(failures > 0);
        drop(spawned);
        assert_eq!(fx.heap.used_bytes(), used_before);
    }

    #[test]
    fn pids_keep_increasing_across_failures() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        let a = sched.create_kernel_task(kernel_entry).expect("a").pid;
        fx.memory.fail_frames(true);
        assert!(sched.create_user_task(VirtAddr::new(0x1000)).is_err());
        fx.memory.fail_frames(false);
        let c = sched.create_kernel_task(kernel_entry).expect("c").pid;
        assert_eq!(a, Pid::new(1));
        assert_eq!(c, Pid::new(3));
    }

    #[test]
    fn refused_address_space_creates_nothing() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        let used = fx.heap.used_bytes();
        fx.memory.fail_new_space(true);

        let err = sched.create_user_task(VirtAddr::new(0x40_0000)).unwrap_err();
        assert_eq!(err, SpawnError::OutOfMemory);
        assert_eq!(fx.heap.used_bytes(), used);
        assert_eq!(fx.memory.live_spaces(), 0);
    }

    #[test]
    fn fork_of_unknown_space_is_reported() {
        let fx = Fixture::new();
        let mut sched = fx.scheduler(SchedConfig::default());
        let user = sched.create_user_task(VirtAddr::new(0x40_0000)).expect("spawn");
        let slot = sched.enqueue(user);
        fx.switch_to(&mut sched, slot);
        let space = sched.current().aspace;

        // O espaço some por baixo do scheduler
        fx.memory.activate(AddressSpace::KERNEL);
        fx.memory.release_address_space(space);
        let err = sched.create_user_task_forked(VirtAddr::new(0x40_0000)).unwrap_err();
        assert_eq!(err, SpawnError::AddressSpace(MemoryError::InvalidAddressSpace));
    }
}
