//! # File table das tarefas
//!
//! O scheduler não abre arquivos. Ele só monta a tabela inicial de uma tarefa
//! de usuário (stdin/stdout duplicados do console serial, stderr vazio) e a
//! fecha quando a tarefa é reciclada. Quem sabe duplicar e fechar é o
//! subsistema de arquivos, através de `FileTableOps`.

/// Descritor aberto, opaco para o scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileError {
    /// Sem descritores livres no subsistema de arquivos.
    TooManyOpenFiles,
}

pub trait FileTableOps: Sync {
    /// Arquivo base do console serial.
    fn console(&self) -> FileHandle;

    fn duplicate(&self, fd: FileHandle) -> Result<FileHandle, FileError>;

    fn close(&self, fd: FileHandle);
}

/// Slots bem conhecidos
pub const STDIN: usize = 0;
pub const STDOUT: usize = 1;
pub const STDERR: usize = 2;

/// Tabela de descritores de uma tarefa.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FileTable {
    slots: [Option<FileHandle>; 3],
}

impl FileTable {
    /// Tabela vazia (tarefas de kernel).
    pub const fn empty() -> Self {
        Self { slots: [None; 3] }
    }

    /// stdin e stdout duplicados do console; stderr vazio.
    ///
    /// Em caso de falha, o que já foi duplicado é fechado.
    pub fn with_console(ops: &dyn FileTableOps) -> Result<Self, FileError> {
        let console = ops.console();
        let stdin = ops.duplicate(console)?;
        let stdout = match ops.duplicate(console) {
            Ok(fd) => fd,
            Err(e) => {
                ops.close(stdin);
                return Err(e);
            }
        };

        let mut table = Self::empty();
        table.slots[STDIN] = Some(stdin);
        table.slots[STDOUT] = Some(stdout);
        Ok(table)
    }

    pub fn get(&self, slot: usize) -> Option<FileHandle> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Fecha todos os descritores abertos.
    pub fn close_all(&mut self, ops: &dyn FileTableOps) {
        for slot in self.slots.iter_mut() {
            if let Some(fd) = slot.take() {
                ops.close(fd);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::test::fixture::FakeFiles;

    #[test]
    fn console_table_has_stdin_stdout_only() {
        let files = FakeFiles::new();
        let table = FileTable::with_console(files).expect("dup");
        assert!(table.get(STDIN).is_some());
        assert!(table.get(STDOUT).is_some());
        assert_ne!(table.get(STDIN), table.get(STDOUT));
        assert_eq!(table.get(STDERR), None);
    }

    #[test]
    fn failed_duplicate_closes_partial_table() {
        let files = FakeFiles::new();
        files.fail_after(1);
        let err = FileTable::with_console(files).unwrap_err();
        assert_eq!(err, FileError::TooManyOpenFiles);
        assert_eq!(files.open_count(), 0);
        assert_eq!(files.closed().len(), 1);
    }

    #[test]
    fn close_all_empties_the_table() {
        let files = FakeFiles::new();
        let mut table = FileTable::with_console(files).expect("dup");
        table.close_all(files);
        assert!(table.is_empty());
        assert_eq!(files.open_count(), 0);
    }
}
