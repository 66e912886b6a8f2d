//! Criação de tarefas

pub mod spawn;

pub use spawn::SpawnError;
