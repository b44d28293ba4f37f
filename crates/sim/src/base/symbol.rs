use core::fmt;

use crate::errors::InvalidSymbol;
use serde::{Deserialize, Serialize};

/// Number of symbols in the alignment alphabet.
pub const NUM_SYMBOLS: usize = 5;

/// One column entry of an aligned nucleotide sequence.
///
/// `Symbol` is a compact, Copyable representation backed by a single byte
/// (u8). The mapping of variants to integers is stable and indexes every
/// 5-vector and 5×5 matrix in the crate (A=0, C=1, G=2, T=3, Gap=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Symbol {
    A = 0,
    C = 1,
    G = 2,
    T = 3,
    Gap = 4,
}

impl Symbol {
    /// All symbols in index order.
    pub const ALL: [Symbol; NUM_SYMBOLS] = [Self::A, Self::C, Self::G, Self::T, Self::Gap];

    /// Convert from u8 index (0-4)
    #[inline(always)]
    pub const fn from_index(idx: u8) -> Option<Self> {
        match idx {
            0 => Some(Self::A),
            1 => Some(Self::C),
            2 => Some(Self::G),
            3 => Some(Self::T),
            4 => Some(Self::Gap),
            _ => None,
        }
    }

    /// Convert to the compact index (0-4).
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Convert from an ASCII byte. Accepts upper and lower case bases and
    /// both gap markers (`-` and `.`). Returns `None` for anything else.
    #[inline]
    pub const fn from_ascii(byte: u8) -> Option<Self> {
        match byte {
            b'A' | b'a' => Some(Self::A),
            b'C' | b'c' => Some(Self::C),
            b'G' | b'g' => Some(Self::G),
            b'T' | b't' => Some(Self::T),
            b'-' | b'.' => Some(Self::Gap),
            _ => None,
        }
    }

    /// Convert to an uppercase ASCII byte; gaps render as `-`.
    #[inline(always)]
    pub const fn to_ascii(self) -> u8 {
        match self {
            Self::A => b'A',
            Self::C => b'C',
            Self::G => b'G',
            Self::T => b'T',
            Self::Gap => b'-',
        }
    }

    /// Return true for the gap symbol.
    #[inline(always)]
    pub const fn is_gap(self) -> bool {
        matches!(self, Self::Gap)
    }
}

impl TryFrom<u8> for Symbol {
    type Error = InvalidSymbol;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::from_ascii(byte).ok_or(InvalidSymbol(byte))
    }
}

impl From<Symbol> for char {
    #[inline(always)]
    fn from(sym: Symbol) -> char {
        sym.to_ascii() as char
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ascii() as char)
    }
}
