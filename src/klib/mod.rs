//! Kernel Library (KLib).
//!
//! Utilitários agnósticos de hardware.

pub mod test_framework;

/// Copia `src` para um nome de tamanho fixo, truncando e completando com zeros.
pub const fn fixed_name<const N: usize>(src: &str) -> [u8; N] {
    let bytes = src.as_bytes();
    let mut out = [0u8; N];
    let mut i = 0;
    while i < N && i < bytes.len() {
        out[i] = bytes[i];
        i += 1;
    }
    out
}

/// Lê um nome fixo de volta como `&str` (até o primeiro zero).
pub fn name_str(name: &[u8]) -> &str {
    let len = name.iter().position(|&b| b == 0).unwrap_or(name.len());
    core::str::from_utf8(&name[..len]).unwrap_or("?")
}
