//! Panic Handler.
//!
//! Toda condição fatal do scheduler (registro cheio, nenhuma tarefa
//! executável, tentativa de matar idle/init, contexto instável) termina aqui.
//!
//! 1. Desabilita interrupções (o timer não pode reentrar no scheduler).
//! 2. Loga local e motivo na serial.
//! 3. Nomeia o caso de self-test em execução, se houver, e despeja o
//!    registro de tarefas.
//! 4. Trava a CPU.
//!
//! Só existe em bare metal; nos testes do host o pânico é do `std`.

#[cfg(all(not(test), target_os = "none"))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    use crate::arch::{Cpu, CpuOps};

    Cpu::disable_interrupts();

    crate::kerror!("================ KERNEL PANIC ================");

    match info.location() {
        Some(location) => {
            crate::kerror!(location.file());
            crate::kerror!("Linha: ", location.line());
        }
        None => crate::kerror!("Local: desconhecido"),
    }

    match info.message().as_str() {
        Some(msg) => crate::kerror!(msg),
        None => crate::kerror!("Motivo: (mensagem formatada)"),
    }

    if let Some(case) = crate::klib::test_framework::running_case() {
        crate::kerror!("Self-test em execucao:");
        crate::kerror!(case);
    }

    crate::sched::core::debug::dump_after_panic();
    crate::kerror!("==============================================");

    Cpu::hang();
}
