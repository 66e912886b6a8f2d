//! # Códigos de erro (Errno)
//!
//! Numeração POSIX/Linux. Syscalls devolvem o valor negado em RAX
//! (`as_isize`). O scheduler só produz os códigos de criação de tarefa, via
//! `From<SpawnError>`.

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    Success = 0,
    EPERM = 1,   // Operation not permitted
    ESRCH = 3,   // No such process
    EINTR = 4,   // Interrupted system call
    ECHILD = 10, // No child processes
    EAGAIN = 11, // Try again
    ENOMEM = 12, // Out of memory
    EINVAL = 22, // Invalid argument
    EMFILE = 24, // Too many open files
    ENOSYS = 38, // Function not implemented
}

impl Errno {
    pub fn as_isize(self) -> isize {
        -(self as i32) as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syscall_return_is_negated() {
        assert_eq!(Errno::ENOMEM.as_isize(), -12);
        assert_eq!(Errno::EMFILE.as_isize(), -24);
        assert_eq!(Errno::Success.as_isize(), 0);
    }
}
