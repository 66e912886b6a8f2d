// =============================================================================
// SERIAL (COM1) - SAÍDA DE LOG
// =============================================================================
//
// Destino único das macros de log. Sem lock, sem core::fmt, sem alocação:
// pode ser chamado de dentro de um handler de trap com o scheduler travado.
//
// ALVOS:
// - bare metal (target_os = "none"): UART 16550 em 0x3F8 via port I/O
// - testes no host: stderr (capturado pelo harness do cargo test)
// - qualquer outro build hospedado: descartado
//
// A UART já chega configurada pelo kernel que embute o scheduler.
//
// =============================================================================

/// Porta de dados da COM1
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
const COM1_DATA: u16 = 0x3F8;

/// Line Status Register da COM1
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
const COM1_STATUS: u16 = 0x3FD;

/// Bit 5 do LSR: buffer de transmissão vazio
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
const LSR_THR_EMPTY: u8 = 0x20;

/// Envia um byte.
#[inline]
pub fn emit(byte: u8) {
    #[cfg(all(target_arch = "x86_64", target_os = "none"))]
    unsafe {
        while port_in(COM1_STATUS) & LSR_THR_EMPTY == 0 {
            core::hint::spin_loop();
        }
        port_out(COM1_DATA, byte);
    }

    #[cfg(all(test, not(target_os = "none")))]
    {
        use std::io::Write;
        let _ = std::io::stderr().write_all(&[byte]);
    }

    #[cfg(not(any(test, all(target_arch = "x86_64", target_os = "none"))))]
    let _ = byte;
}

/// Envia uma string.
#[inline(never)]
pub fn emit_str(s: &str) {
    for &b in s.as_bytes() {
        emit(b);
    }
}

/// Envia CRLF.
#[inline(never)]
pub fn emit_nl() {
    emit(b'\r');
    emit(b'\n');
}

/// Envia um u64 como `0x` + 16 dígitos hexadecimais maiúsculos.
#[inline(never)]
pub fn emit_hex(value: u64) {
    emit(b'0');
    emit(b'x');
    let mut shift = 60u32;
    loop {
        emit(hex_digit(((value >> shift) & 0xF) as u8));
        if shift == 0 {
            break;
        }
        shift -= 4;
    }
}

#[inline]
const fn hex_digit(nibble: u8) -> u8 {
    if nibble < 10 {
        b'0' + nibble
    } else {
        b'A' + (nibble - 10)
    }
}

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
#[inline(always)]
unsafe fn port_out(port: u16, value: u8) {
    core::arch::asm!(
        "out dx, al",
        in("dx") port,
        in("al") value,
        options(nostack, nomem, preserves_flags)
    );
}

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
#[inline(always)]
unsafe fn port_in(port: u16) -> u8 {
    let value: u8;
    core::arch::asm!(
        "in al, dx",
        out("al") value,
        in("dx") port,
        options(nostack, nomem, preserves_flags)
    );
    value
}

// =============================================================================
// TESTES
// =============================================================================
