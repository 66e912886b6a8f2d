//! # Kernel Driver Layer
//!
//! O scheduler só precisa de um driver: a serial COM1, destino dos logs.
//!
//! | Driver   | Arquivo      | Uso                          |
//! |----------|--------------|------------------------------|
//! | Serial   | `serial.rs`  | Saída de `kinfo!`/`kerror!`… |

pub mod serial;
