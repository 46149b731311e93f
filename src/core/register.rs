// Copyright 2025 Relalg Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Register type for relalg - the typed scalar flowing through operators
//!
//! A [`Register`] is a tagged scalar with exactly two variants: a signed
//! 64-bit integer and a fixed-width byte string of up to 16 bytes. The
//! variant is fixed at construction and carried as an explicit enum tag,
//! so a zero-valued integer can never be confused with a string.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::error::{Error, Result};

/// Maximum payload width of a CHAR16 register, in bytes
pub const CHAR16_WIDTH: usize = 16;

/// The variant of a [`Register`]
///
/// Doubles as the per-column schema entry of a tuple stream: the sequence
/// of variants emitted by an operator is constant across one open/close
/// cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterType {
    /// Signed 64-bit integer
    Int64,
    /// Fixed-width byte string of up to 16 bytes
    Char16,
}

impl fmt::Display for RegisterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterType::Int64 => write!(f, "INT64"),
            RegisterType::Char16 => write!(f, "CHAR16"),
        }
    }
}

/// Inline fixed-capacity byte string backing the CHAR16 variant
///
/// The payload is stored in place, zero-padded to [`CHAR16_WIDTH`] bytes,
/// with the live length tracked separately. No heap allocation is involved,
/// which keeps register copies cheap during materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Char16 {
    bytes: [u8; CHAR16_WIDTH],
    len: u8,
}

impl Char16 {
    /// Create from a string slice, failing if it exceeds the fixed width
    pub fn new(s: &str) -> Result<Self> {
        Self::from_bytes(s.as_bytes())
    }

    /// Create from a raw byte sequence, failing if it exceeds the fixed width
    pub fn from_bytes(payload: &[u8]) -> Result<Self> {
        if payload.len() > CHAR16_WIDTH {
            return Err(Error::string_too_long(CHAR16_WIDTH, payload.len()));
        }
        let mut bytes = [0u8; CHAR16_WIDTH];
        bytes[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            bytes,
            len: payload.len() as u8,
        })
    }

    /// The live payload bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// The payload as UTF-8, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    /// Payload length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Check if the payload is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Hash for Char16 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl PartialOrd for Char16 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Char16 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl fmt::Display for Char16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.as_bytes()))
    }
}

/// A typed scalar value
///
/// Registers are value objects, freely copyable. Operators own the
/// registers they materialize and expose them to consumers by borrowed
/// slice; consumers copy registers they keep across an `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Signed 64-bit integer
    Int64(i64),
    /// Fixed-width byte string of up to 16 bytes
    Char16(Char16),
}

impl Register {
    /// Create an INT64 register
    #[inline]
    pub fn int(value: i64) -> Self {
        Register::Int64(value)
    }

    /// Create a CHAR16 register, failing if the string exceeds 16 bytes
    pub fn string(value: &str) -> Result<Self> {
        Ok(Register::Char16(Char16::new(value)?))
    }

    /// The variant tag of this register
    #[inline]
    pub fn register_type(&self) -> RegisterType {
        match self {
            Register::Int64(_) => RegisterType::Int64,
            Register::Char16(_) => RegisterType::Char16,
        }
    }

    /// The integer payload, if this is an INT64 register
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Register::Int64(v) => Some(*v),
            Register::Char16(_) => None,
        }
    }

    /// The string payload, if this is a CHAR16 register
    #[inline]
    pub fn as_char16(&self) -> Option<&Char16> {
        match self {
            Register::Int64(_) => None,
            Register::Char16(s) => Some(s),
        }
    }

    /// Compare two registers of the same variant
    ///
    /// INT64 compares numerically, CHAR16 lexicographically over the raw
    /// bytes. Comparing registers of different variants is a contract
    /// violation and returns [`Error::IncomparableTypes`]. All predicate
    /// and aggregate comparisons go through here.
    pub fn compare(&self, other: &Register) -> Result<Ordering> {
        match (self, other) {
            (Register::Int64(a), Register::Int64(b)) => Ok(a.cmp(b)),
            (Register::Char16(a), Register::Char16(b)) => Ok(a.cmp(b)),
            _ => Err(Error::IncomparableTypes),
        }
    }
}

impl Hash for Register {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Variant discriminant first, then the payload. The hash depends
        // only on the variant and the underlying value, so it is stable
        // within a process.
        match self {
            Register::Int64(v) => {
                0u8.hash(state);
                v.hash(state);
            }
            Register::Char16(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

// PartialOrd intentionally differs from Ord:
// - PartialOrd: same-variant comparison only (None across variants)
// - Ord: total order for sorted emission (variant tier, then payload)
#[allow(clippy::non_canonical_partial_ord_impl)]
impl PartialOrd for Register {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

/// Total ordering over registers
///
/// Within a variant this is the semantic ordering of [`Register::compare`].
/// Across variants INT64 orders before CHAR16. Well-formed pipelines have
/// uniform per-column variants, so the cross-variant tier is never observed
/// by them; it exists to make sorting buffers of tuples total.
impl Ord for Register {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Register::Int64(a), Register::Int64(b)) => a.cmp(b),
            (Register::Char16(a), Register::Char16(b)) => a.cmp(b),
            (Register::Int64(_), Register::Char16(_)) => Ordering::Less,
            (Register::Char16(_), Register::Int64(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Int64(v) => write!(f, "{}", v),
            Register::Char16(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Register {
    fn from(value: i64) -> Self {
        Register::Int64(value)
    }
}
