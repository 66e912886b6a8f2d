//! Core Module
//!
//! Infraestrutura comum: logging e o panic handler.

pub mod logging;
pub mod panic;
