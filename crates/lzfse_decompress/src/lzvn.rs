use lzfse_io::{ReadU8, ReadU16};

use crate::{prelude::*, window::Window};

/// One LZVN instruction, as far as its opcode byte tells. Operand bytes, if
/// any, follow the opcode and precede the literal bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    EndOfStream,
    Nop,
    Reserved,
    /// `1110LLLL`
    SmallLiteral { l: usize },
    /// `11100000 LLLLLLLL`, 16 more than the operand.
    LargeLiteral,
    /// `1111MMMM`, at the previous distance.
    SmallMatch { m: usize },
    /// `11110000 MMMMMMMM`, 16 more than the operand.
    LargeMatch,
    /// `LLMMM110`
    PreviousDistance { l: usize, m: usize },
    /// `LLMMMDDD DDDDDDDD`
    SmallDistance { l: usize, m: usize, d_high: usize },
    /// `101LLMMM DDDDDDMM DDDDDDDD`
    MediumDistance { l: usize, m_high: usize },
    /// `LLMMM111 DDDDDDDD DDDDDDDD`
    LargeDistance { l: usize, m: usize },
}

pub const fn classify(opc: u8) -> Op {
    let l = (opc >> 6) as usize;
    let m = ((opc >> 3) & 0x7) as usize + 3;

    match opc {
        0x06 => Op::EndOfStream,
        0x0E | 0x16 => Op::Nop,
        0x1E | 0x26 | 0x2E | 0x36 | 0x3E => Op::Reserved,
        0x70..=0x7F | 0xD0..=0xDF => Op::Reserved,
        0xA0..=0xBF => Op::MediumDistance {
            l: ((opc >> 3) & 0x3) as usize,
            m_high: (opc & 0x7) as usize,
        },
        0xE0 => Op::LargeLiteral,
        0xE1..=0xEF => Op::SmallLiteral {
            l: (opc & 0xF) as usize,
        },
        0xF0 => Op::LargeMatch,
        0xF1..=0xFF => Op::SmallMatch {
            m: (opc & 0xF) as usize,
        },
        _ => match opc & 0x7 {
            6 => Op::PreviousDistance { l, m },
            7 => Op::LargeDistance { l, m },
            _ => Op::SmallDistance {
                l,
                m,
                d_high: (opc & 0x7) as usize,
            },
        },
    }
}

/// Runs the instructions of one LZVN block until its end-of-stream opcode.
/// Bytes after that opcode are ignored.
pub fn decode<W: std::io::Write>(
    mut src: &[u8],
    window: &mut Window<'_, W>,
) -> Result<(), Error> {
    let mut d_prev = 0;

    loop {
        let opc = src.read_u8()?;

        let (l, m, d) = match classify(opc) {
            Op::EndOfStream => return Ok(()),
            Op::Nop => continue,
            Op::Reserved => return Err(Error::ReservedOpcode(opc)),
            Op::SmallLiteral { l } => (l, 0, None),
            Op::LargeLiteral => (src.read_u8()? as usize + 16, 0, None),
            Op::SmallMatch { m } => (0, m, None),
            Op::LargeMatch => (0, src.read_u8()? as usize + 16, None),
            Op::PreviousDistance { l, m } => (l, m, None),
            Op::SmallDistance { l, m, d_high } => {
                let d = (d_high << 8) | src.read_u8()? as usize;
                (l, m, Some(d))
            }
            Op::MediumDistance { l, m_high } => {
                let s = src.read_u16()? as usize;
                (l, ((m_high << 2) | (s & 0x3)) + 3, Some(s >> 2))
            }
            Op::LargeDistance { l, m } => (l, m, Some(src.read_u16()? as usize)),
        };

        window.read_from(&mut src, l)?;

        match d {
            Some(d) => {
                d_prev = d;
                window.copy_within(d, m)?;
            }
            None if m == 0 => {}
            None if d_prev == 0 => return Err(Error::MissingPreviousDistance),
            None => window.copy_within(d_prev, m)?,
        }
    }
}
