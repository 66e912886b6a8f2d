// =============================================================================
// LOGGING DO SCHEDULER - ZERO OVERHEAD
// =============================================================================
//
// Macros de log do núcleo de escalonamento. O nível é escolhido em tempo de
// compilação pelas features do Cargo; um nível desligado vira expressão vazia
// e não gera nenhum código.
//
// REGRAS:
// - SEM core::fmt: os handlers de trap logam com a pilha de IRQ (4 KiB)
// - SEM alocação: apenas literais e um valor opcional impresso em hex
// - Toda mensagem começa com o subsistema: (Sched), (Spawn), (Idle), (Signal)
//
// USO:
//   kinfo!("(Sched) Scheduler inicializado");
//   kdebug!("(Spawn) Nova tarefa PID=", pid.as_u32());
//
// FEATURES (mutuamente exclusivas):
//   no_logs < log_error < log_info < log_debug < log_trace (padrão)
//
// =============================================================================

pub const P_ERROR: &str = "\x1b[1;31m[ERRO]\x1b[0m ";
pub const P_WARN: &str = "\x1b[1;33m[WARN]\x1b[0m ";
pub const P_INFO: &str = "\x1b[32m[INFO]\x1b[0m ";
pub const P_DEBUG: &str = "\x1b[36m[DEBG]\x1b[0m ";
pub const P_TRACE: &str = "\x1b[35m[TRAC]\x1b[0m ";

/// Emissor comum a todos os níveis. Não usar diretamente.
#[doc(hidden)]
#[macro_export]
macro_rules! __klog_emit {
    ($prefix:expr, $msg:expr) => {{
        $crate::drivers::serial::emit_str($prefix);
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_nl();
    }};
    ($prefix:expr, $msg:expr, $val:expr) => {{
        $crate::drivers::serial::emit_str($prefix);
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_hex($val as u64);
        $crate::drivers::serial::emit_nl();
    }};
}

// -----------------------------------------------------------------------------
// ERROR / WARN - ativos exceto com no_logs
// -----------------------------------------------------------------------------

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    ($($arg:expr),+ $(,)?) => {
        $crate::__klog_emit!($crate::core::logging::P_ERROR, $($arg),+)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {{}};
}

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    ($($arg:expr),+ $(,)?) => {
        $crate::__klog_emit!($crate::core::logging::P_WARN, $($arg),+)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)*) => {{}};
}

// -----------------------------------------------------------------------------
// INFO - desligado com no_logs e log_error
// -----------------------------------------------------------------------------

#[cfg(not(any(feature = "no_logs", feature = "log_error")))]
#[macro_export]
macro_rules! kinfo {
    ($($arg:expr),+ $(,)?) => {
        $crate::__klog_emit!($crate::core::logging::P_INFO, $($arg),+)
    };
}

#[cfg(any(feature = "no_logs", feature = "log_error"))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {{}};
}

// -----------------------------------------------------------------------------
// DEBUG - apenas log_debug e log_trace
// -----------------------------------------------------------------------------

#[cfg(all(
    not(feature = "no_logs"),
    any(feature = "log_trace", feature = "log_debug")
))]
#[macro_export]
macro_rules! kdebug {
    ($($arg:expr),+ $(,)?) => {
        $crate::__klog_emit!($crate::core::logging::P_DEBUG, $($arg),+)
    };
}

#[cfg(not(all(
    not(feature = "no_logs"),
    any(feature = "log_trace", feature = "log_debug")
)))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {{}};
}

// -----------------------------------------------------------------------------
// TRACE - apenas log_trace (cada tick, cada troca de contexto)
// -----------------------------------------------------------------------------

#[cfg(all(not(feature = "no_logs"), feature = "log_trace"))]
#[macro_export]
macro_rules! ktrace {
    ($($arg:expr),+ $(,)?) => {
        $crate::__klog_emit!($crate::core::logging::P_TRACE, $($arg),+)
    };
}

#[cfg(not(all(not(feature = "no_logs"), feature = "log_trace")))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {{}};
}

// -----------------------------------------------------------------------------
// STATUS (usados pela suite de self-test)
// -----------------------------------------------------------------------------

/// kok! - Log de sucesso (prefixo verde [OK]).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kok {
    ($msg:expr) => {
        $crate::__klog_emit!("\x1b[32m[OK]\x1b[0m ", $msg)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kok {
    ($($t:tt)*) => {{}};
}

/// kfail! - Log de falha (prefixo vermelho [FAIL]).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kfail {
    ($msg:expr) => {
        $crate::__klog_emit!("\x1b[1;31m[FAIL]\x1b[0m ", $msg)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kfail {
    ($($t:tt)*) => {{}};
}
