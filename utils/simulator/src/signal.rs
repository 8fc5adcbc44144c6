use std::fmt;

use crate::error::{Result, SimError};

/// Direction of a model signal as seen from the harness.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SignalKind {
    Input,
    Output,
    Register,
}

/// Declared shape of a signal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SignalWidth {
    Bit,
    /// Unsigned word of the given bit width (at most 64).
    Word(u32),
    /// Byte buffer with the given capacity.
    Bytes(usize),
}

impl SignalWidth {
    /// Number of bits a waveform viewer needs for this signal.
    pub fn bits(self) -> usize {
        match self {
            SignalWidth::Bit => 1,
            SignalWidth::Word(bits) => bits as usize,
            SignalWidth::Bytes(capacity) => capacity * 8,
        }
    }

    fn describe(self) -> String {
        match self {
            SignalWidth::Bit => "bit".to_owned(),
            SignalWidth::Word(bits) => format!("{bits}-bit word"),
            SignalWidth::Bytes(capacity) => format!("buffer of {capacity} bytes"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SignalDesc {
    pub name: &'static str,
    pub kind: SignalKind,
    pub width: SignalWidth,
}

impl SignalDesc {
    pub const fn input(name: &'static str, width: SignalWidth) -> Self {
        Self {
            name,
            kind: SignalKind::Input,
            width,
        }
    }

    pub const fn output(name: &'static str, width: SignalWidth) -> Self {
        Self {
            name,
            kind: SignalKind::Output,
            width,
        }
    }

    pub const fn register(name: &'static str, width: SignalWidth) -> Self {
        Self {
            name,
            kind: SignalKind::Register,
            width,
        }
    }
}

pub fn find_signal<'a>(signals: &'a [SignalDesc], name: &str) -> Option<&'a SignalDesc> {
    signals.iter().find(|signal| signal.name == name)
}

/// Owned byte buffer with a fixed capacity and an explicit length.
///
/// Bytes past `len()` read as absent rather than as stale memory, and the
/// textual view stops at the first NUL the way a C string would.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl ByteBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Buffer sized exactly to `data`.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        let bytes = data.into();
        let capacity = bytes.len();
        Self { bytes, capacity }
    }

    /// Replaces the contents. Returns `false` and leaves the buffer untouched
    /// when `data` does not fit.
    pub fn fill(&mut self, data: &[u8]) -> bool {
        if data.len() > self.capacity {
            return false;
        }
        self.bytes.clear();
        self.bytes.extend_from_slice(data);
        true
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte_at(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Contents up to (not including) the first NUL byte.
    pub fn c_str(&self) -> &[u8] {
        let end = self
            .bytes
            .iter()
            .position(|&byte| byte == 0)
            .unwrap_or(self.bytes.len());
        &self.bytes[..end]
    }
}

impl fmt::Display for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.c_str()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignalValue {
    Bit(bool),
    Word(u64),
    Bytes(ByteBuffer),
}

impl SignalValue {
    pub fn as_bit(&self) -> Option<bool> {
        match self {
            SignalValue::Bit(bit) => Some(*bit),
            _ => None,
        }
    }

    pub fn as_word(&self) -> Option<u64> {
        match self {
            SignalValue::Word(word) => Some(*word),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&ByteBuffer> {
        match self {
            SignalValue::Bytes(buffer) => Some(buffer),
            _ => None,
        }
    }

    /// Reads a bit, failing with `TypeMismatch` for any other shape.
    pub fn to_bit(&self, name: &str) -> Result<bool> {
        self.as_bit()
            .ok_or_else(|| self.mismatch(name, SignalWidth::Bit.describe()))
    }

    pub fn to_word(&self, name: &str) -> Result<u64> {
        self.as_word()
            .ok_or_else(|| self.mismatch(name, SignalWidth::Word(64).describe()))
    }

    pub fn to_bytes(&self, name: &str) -> Result<&ByteBuffer> {
        self.as_bytes()
            .ok_or_else(|| self.mismatch(name, "byte buffer".to_owned()))
    }

    fn shape(&self) -> String {
        match self {
            SignalValue::Bit(_) => "bit".to_owned(),
            SignalValue::Word(word) => format!("word {word}"),
            SignalValue::Bytes(buffer) => format!("{} bytes", buffer.len()),
        }
    }

    fn mismatch(&self, name: &str, expected: String) -> SimError {
        SimError::TypeMismatch {
            name: name.to_owned(),
            expected,
            found: self.shape(),
        }
    }

    /// Checks the value against a declared width, widening `0`/`1` words to
    /// bits and bits to words.
    pub fn conform(self, name: &str, width: SignalWidth) -> Result<SignalValue> {
        match (width, self) {
            (SignalWidth::Bit, SignalValue::Bit(bit)) => Ok(SignalValue::Bit(bit)),
            (SignalWidth::Bit, SignalValue::Word(word @ (0 | 1))) => Ok(SignalValue::Bit(word == 1)),
            (SignalWidth::Word(bits), SignalValue::Word(word)) if bits >= 64 || word >> bits == 0 => {
                Ok(SignalValue::Word(word))
            }
            (SignalWidth::Word(_), SignalValue::Bit(bit)) => Ok(SignalValue::Word(bit as u64)),
            (SignalWidth::Bytes(capacity), SignalValue::Bytes(buffer)) => {
                if buffer.len() > capacity {
                    Err(SimError::BufferOverflow {
                        name: name.to_owned(),
                        capacity,
                        len: buffer.len(),
                    })
                } else {
                    Ok(SignalValue::Bytes(buffer))
                }
            }
            (width, value) => Err(value.mismatch(name, width.describe())),
        }
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Bit(bit) => write!(f, "{}", u8::from(*bit)),
            SignalValue::Word(word) => write!(f, "{word}"),
            SignalValue::Bytes(buffer) => write!(f, "{buffer}"),
        }
    }
}

impl From<bool> for SignalValue {
    fn from(bit: bool) -> Self {
        SignalValue::Bit(bit)
    }
}

impl From<u64> for SignalValue {
    fn from(word: u64) -> Self {
        SignalValue::Word(word)
    }
}

impl From<&str> for SignalValue {
    fn from(text: &str) -> Self {
        SignalValue::Bytes(ByteBuffer::from_bytes(text.as_bytes()))
    }
}
