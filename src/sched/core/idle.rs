//! Tarefa idle e bootstrap do scheduler.
//!
//! A idle é o pid 0: não é criada por `create_kernel_task`, é o próprio fluxo
//! de boot adotado como tarefa. Ela ocupa o slot 0, nunca termina e é sempre
//! executável, então o seletor sempre tem para onde ir.
//!
//! Sequência:
//! 1. `init` monta o `Scheduler`, instala o trap de yield e troca para a
//!    pilha de boot da idle.
//! 2. `idle_thread` instala o trap do timer, confirma que o frame salvo por
//!    um yield é fiel (sentinela em RAX), roda o self-test, cria o init e
//!    entrega o controle a `late_init`.

use core::ptr::NonNull;

use spin::Once;
use volatile::VolatilePtr;

use super::platform::Platform;
use super::runqueue::RunQueue;
use super::scheduler::Scheduler;
use super::switch::{timer_trap, yield_trap};
use crate::arch::platform::context::{enter_stack, raise_yield_with_sentinel, TrapFrame};
use crate::arch::{Cpu, CpuOps};
use crate::fs::FileTable;
use crate::klib;
use crate::mm::{AddressSpace, KernelStack, VirtAddr};
use crate::sched::config::{
    SchedConfig, CONTEXT_SENTINEL, IRQ_STACK_SIZE, KERNEL_STACK_SIZE, TIMER_VECTOR, YIELD_VECTOR,
};
use crate::sched::task::{Accounting, ExecStack, KernelEntry, SlotId, Task, TaskState, TaskTable};
use crate::sys::Pid;

/// Ganchos do kernel chamados pela idle.
#[derive(Clone, Copy)]
pub struct BootHooks {
    /// Entrada da tarefa init (pid 1)
    pub init_task: KernelEntry,
    /// Resto da inicialização do kernel, executado pela idle. Não retorna;
    /// normalmente termina em `idle_loop`.
    pub late_init: fn() -> !,
}

static BOOT_HOOKS: Once<BootHooks> = Once::new();

impl Scheduler {
    /// Cria o scheduler com a idle (pid 0, `Running`) no slot 0.
    ///
    /// Falta de memória aqui é fatal.
    pub fn new(platform: Platform, config: SchedConfig) -> Self {
        let Ok(boot_stack) = KernelStack::allocate(platform.heap, KERNEL_STACK_SIZE) else {
            panic!("(Idle) Sem memoria para a pilha de boot");
        };
        let Ok(irq_stack) = KernelStack::allocate(platform.heap, IRQ_STACK_SIZE) else {
            panic!("(Idle) Sem memoria para a pilha de IRQ da idle");
        };

        let idle = Task {
            pid: Pid::IDLE,
            state: TaskState::Running,
            context: TrapFrame::default(),
            aspace: AddressSpace::KERNEL,
            stack: ExecStack::Kernel(boot_stack),
            irq_stack,
            accounting: Accounting::new(),
            parent: None,
            exit_code: None,
            files: FileTable::empty(),
            name: klib::fixed_name("idle"),
        };

        let mut table = TaskTable::new(config.capacity);
        let current = table.register(idle);

        crate::kinfo!("(Sched) Scheduler criado, slots=", table.capacity());
        Self {
            platform,
            table,
            runqueue: RunQueue::new(),
            current,
            time_slice: config.time_slice,
            active_space: AddressSpace::KERNEL,
        }
    }

    /// Topo da pilha de boot da idle.
    pub fn idle_boot_stack_top(&self) -> VirtAddr {
        match &self.table[SlotId::new(0)].stack {
            ExecStack::Kernel(stack) => stack.top(),
            ExecStack::User { .. } => panic!("(Idle) idle sem pilha de kernel"),
        }
    }

    /// Confere que o RAX salvo da tarefa atual é `expected`.
    ///
    /// Lido com acesso volátil: o valor foi escrito pelo handler de trap, fora
    /// do fluxo que o compilador enxerga.
    pub fn verify_context_capture(&self, expected: u64) {
        let rax = &self.current().context.rax;
        // SAFETY: referência válida durante a leitura
        let observed = unsafe { VolatilePtr::new_read_only(NonNull::from(rax)) }.read();
        if observed != expected {
            crate::kerror!("(Idle) RAX salvo=", observed);
            panic!("(Idle) Contexto salvo instavel (rax)");
        }
    }

    /// Instala o trap de yield (`int 0x2f`).
    pub fn install_yield_trap(&self) {
        self.platform.traps.register_trap(YIELD_VECTOR, yield_trap);
    }

    /// Instala o trap do timer. Só a idle chama, depois do yield.
    pub fn install_timer_trap(&self) {
        self.platform.traps.register_trap(TIMER_VECTOR, timer_trap);
    }

    /// Cria e enfileira o init. Falha é fatal.
    pub fn bootstrap_init_task(&mut self, entry: KernelEntry) -> SlotId {
        let mut task = match self.create_kernel_task(entry) {
            Ok(task) => task,
            Err(_) => panic!("(Idle) Falha ao criar a tarefa init"),
        };
        task.set_name("init");
        if task.pid != Pid::INIT {
            crate::kwarn!("(Idle) init criado com PID=", task.pid.as_u32());
        }
        let slot = self.enqueue(task);
        crate::kinfo!("(Idle) Tarefa init enfileirada");
        slot
    }
}

/// Instala o scheduler e vira a tarefa idle. Não retorna.
pub fn init(platform: Platform, config: SchedConfig, hooks: BootHooks) -> ! {
    Cpu::disable_interrupts();
    crate::kinfo!("(Sched) Inicializando scheduler");

    let scheduler = Scheduler::new(platform, config);
    let boot_top = scheduler.idle_boot_stack_top();

    scheduler.install_yield_trap();
    BOOT_HOOKS.call_once(|| hooks);
    super::install(scheduler);

    // SAFETY: a pilha de boot pertence à idle e ainda não foi usada
    unsafe { enter_stack(boot_top, idle_thread) }
}

extern "C" fn idle_thread() -> ! {
    crate::kinfo!("(Idle) Tarefa idle em execucao");

    let Some(hooks) = BOOT_HOOKS.get().copied() else {
        panic!("(Idle) Ganchos de boot ausentes");
    };

    super::with_scheduler(|s| s.install_timer_trap());

    // IF=0 até aqui: nenhum tick sobrescreve o frame entre o yield e a leitura
    raise_yield_with_sentinel(CONTEXT_SENTINEL);
    super::with_scheduler(|s| s.verify_context_capture(CONTEXT_SENTINEL));
    crate::kinfo!("(Idle) Captura de contexto OK");

    #[cfg(feature = "self_test")]
    {
        let report = crate::sched::test::run_sched_tests();
        if !report.all_passed() {
            panic!("(Idle) Self-test do scheduler falhou");
        }
    }

    super::with_scheduler(|s| s.bootstrap_init_task(hooks.init_task));

    Cpu::enable_interrupts();
    crate::kinfo!("(Idle) Escalonamento por timer habilitado");

    (hooks.late_init)()
}

/// Laço final da idle: dorme até a próxima interrupção.
pub fn idle_loop() -> ! {
    loop {
        Cpu::enable_and_halt();
    }
}

// =============================================================================
// TESTES
// =============================================================================
