//! System Definitions (ABI).
//!
//! Tipos que cruzam a fronteira kernel/usuário: identificadores de processo e
//! códigos de erro.

pub mod error;
pub mod types;

pub use error::Errno;
pub use types::Pid;
