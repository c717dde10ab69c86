#![cfg_attr(not(test), no_std)]

use core::fmt;

/// Fixed capacity byte buffer for building text records without allocating.
///
/// Each write is all-or-nothing: a slice that would not fit leaves the buffer
/// untouched and reports `fmt::Error`, so `write!` into a `FixedBuf` can never
/// run past its capacity.
#[derive(Clone, Copy)]
pub struct FixedBuf<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> FixedBuf<N> {
    pub const fn new() -> Self {
        FixedBuf {
            bytes: [0; N],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn remaining(&self) -> usize {
        N - self.len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<(), fmt::Error> {
        if bytes.len() > self.remaining() {
            return Err(fmt::Error);
        }
        self.bytes[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }
}

impl<const N: usize> Default for FixedBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Write for FixedBuf<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.extend_from_slice(s.as_bytes())
    }
}

impl<const N: usize> fmt::Debug for FixedBuf<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match core::str::from_utf8(self.as_bytes()) {
            Ok(text) => write!(f, "FixedBuf({:?})", text),
            Err(_) => write!(f, "FixedBuf({:X?})", self.as_bytes()),
        }
    }
}
