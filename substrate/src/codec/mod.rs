//! # Wire Codec
//!
//! Decoding side of the chain's SCALE wire format, plus the glue that lets
//! the rest of the crate encode with `parity-scale-codec` directly.
//!
//! Encoding never fails, so every domain type implements
//! [`parity_scale_codec::Encode`] (derived for plain structs, hand-written for
//! tagged variants in [`variant`]). Decoding is where the interesting failures
//! live, so it goes through [`WireDecode`]: the same byte layout, but errors
//! say *which* variant family rejected *which* byte, and *which* field of
//! *which* struct was being read when the buffer ran dry.
//!
//! ```text
//! mod.rs     — WireReader cursor, WireDecode trait, primitive/Vec/Option impls
//! variant.rs — TaggedVariant trait, discriminant read/write helpers
//! record.rs  — Version-gated decoding of persisted records
//! ```
//!
//! Primitive leaves (integers, `bool`, `String`, compact lengths, fixed byte
//! arrays) are decoded by `parity-scale-codec` itself through the
//! [`parity_scale_codec::Input`] impl on [`WireReader`]. We don't reimplement
//! SCALE; we only wrap it.

pub mod record;
pub mod variant;

use parity_scale_codec::{Compact, Decode, Encode, Input};
use thiserror::Error;

pub use record::{decode_record, Record, RecordError, RecordKind, VersionedRecord};
pub use variant::TaggedVariant;

// ---------------------------------------------------------------------------
// DecodeError
// ---------------------------------------------------------------------------

/// Everything that can go wrong turning bytes into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A tagged variant read a discriminant outside its closed set.
    #[error("unknown {family} discriminant {value}")]
    UnknownDiscriminant {
        /// Name of the variant family (e.g. `ContractState`).
        family: &'static str,
        /// The offending byte.
        value: u8,
    },

    /// The buffer ended before the value was complete.
    #[error("truncated {ty}: needed {needed} more bytes, {remaining} remaining")]
    Truncated {
        /// Type being decoded when the buffer ran out.
        ty: &'static str,
        /// Bytes the read asked for.
        needed: usize,
        /// Bytes that were left.
        remaining: usize,
    },

    /// The bytes were present but not a valid encoding (bad UTF-8, a `bool`
    /// byte other than 0/1, a non-canonical compact integer, ...).
    #[error("malformed {ty}: {reason}")]
    Malformed {
        /// Type being decoded.
        ty: &'static str,
        /// Reason reported by the underlying codec.
        reason: String,
    },

    /// A nested failure, annotated with the struct field that was being read.
    #[error("{ty}.{field}: {source}")]
    Field {
        /// Struct containing the field.
        ty: &'static str,
        /// Field name.
        field: &'static str,
        /// The failure inside the field.
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Builds the error for a discriminant outside `T`'s closed set.
    pub fn unknown<T: TaggedVariant>(value: u8) -> Self {
        Self::UnknownDiscriminant {
            family: T::FAMILY,
            value,
        }
    }

    /// Wraps `self` with the struct field it occurred in.
    pub fn within(self, ty: &'static str, field: &'static str) -> Self {
        Self::Field {
            ty,
            field,
            source: Box::new(self),
        }
    }

    /// Strips all [`DecodeError::Field`] annotations and returns the
    /// innermost failure.
    pub fn root_cause(&self) -> &DecodeError {
        let mut current = self;
        while let Self::Field { source, .. } = current {
            current = source;
        }
        current
    }

    /// Dotted path of struct fields leading to the failure, outermost first.
    pub fn field_path(&self) -> Vec<&'static str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::Field { field, source, .. } = current {
            path.push(*field);
            current = source;
        }
        path
    }
}

// ---------------------------------------------------------------------------
// WireReader
// ---------------------------------------------------------------------------

/// A forward-only cursor over an encoded buffer.
///
/// Tracks how many bytes have been consumed so callers can report
/// `bytesConsumed` and detect trailing data. When a read would overrun the
/// buffer, the shortfall is remembered so the error handed back from
/// `parity-scale-codec` can be reclassified as [`DecodeError::Truncated`].
#[derive(Debug)]
pub struct WireReader<'a> {
    data: &'a [u8],
    position: usize,
    shortfall: Option<(usize, usize)>,
}

impl<'a> WireReader<'a> {
    /// Creates a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            shortfall: None,
        }
    }

    /// Number of bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.position
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Peeks at the next byte without consuming it.
    pub fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    /// Reads a single tagged-variant discriminant.
    pub fn read_discriminant(&mut self, family: &'static str) -> Result<u8, DecodeError> {
        match self.peek_byte() {
            Some(byte) => {
                self.position += 1;
                Ok(byte)
            }
            None => Err(DecodeError::Truncated {
                ty: family,
                needed: 1,
                remaining: 0,
            }),
        }
    }

    /// Decodes a primitive with `parity-scale-codec`, mapping its error into
    /// a [`DecodeError`] that names `ty`.
    pub fn leaf<T: Decode>(&mut self, ty: &'static str) -> Result<T, DecodeError> {
        self.shortfall = None;
        match T::decode(self) {
            Ok(value) => Ok(value),
            Err(err) => Err(match self.shortfall.take() {
                Some((needed, remaining)) => DecodeError::Truncated {
                    ty,
                    needed,
                    remaining,
                },
                None => DecodeError::Malformed {
                    ty,
                    reason: err.to_string(),
                },
            }),
        }
    }
}

impl Input for WireReader<'_> {
    fn remaining_len(&mut self) -> Result<Option<usize>, parity_scale_codec::Error> {
        Ok(Some(self.remaining()))
    }

    fn read(&mut self, into: &mut [u8]) -> Result<(), parity_scale_codec::Error> {
        let remaining = self.remaining();
        if into.len() > remaining {
            self.shortfall = Some((into.len(), remaining));
            return Err("not enough data to fill buffer".into());
        }
        let end = self.position + into.len();
        into.copy_from_slice(&self.data[self.position..end]);
        self.position = end;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// WireDecode
// ---------------------------------------------------------------------------

/// Decoding half of the wire codec.
///
/// Implementations must consume exactly the bytes they encode and must
/// reject, never guess, anything outside their valid domain.
pub trait WireDecode: Sized {
    /// Reads one value from the front of `reader`.
    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, DecodeError>;
}

/// Decodes one `T` from the front of `bytes`.
///
/// Returns the value and the number of bytes it occupied. Trailing bytes
/// are left alone; use [`decode_exact`] when the buffer must hold exactly
/// one value.
pub fn decode<T: WireDecode>(bytes: &[u8]) -> Result<(T, usize), DecodeError> {
    let mut reader = WireReader::new(bytes);
    let value = T::decode_from(&mut reader)?;
    Ok((value, reader.consumed()))
}

/// Decodes a `T` that must span the whole buffer.
pub fn decode_exact<T: WireDecode>(bytes: &[u8], ty: &'static str) -> Result<T, DecodeError> {
    let (value, consumed) = decode::<T>(bytes)?;
    if consumed != bytes.len() {
        return Err(DecodeError::Malformed {
            ty,
            reason: format!("{} trailing bytes", bytes.len() - consumed),
        });
    }
    Ok(value)
}

/// Encodes any SCALE-encodable value.
pub fn encode<T: Encode + ?Sized>(value: &T) -> Vec<u8> {
    value.encode()
}

macro_rules! impl_leaf_decode {
    ($($ty:ty => $name:literal),+ $(,)?) => {
        $(
            impl WireDecode for $ty {
                fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
                    reader.leaf::<$ty>($name)
                }
            }
        )+
    };
}

impl_leaf_decode! {
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    bool => "bool",
    String => "String",
    [u8; 32] => "[u8; 32]",
}

impl<T: WireDecode> WireDecode for Vec<T> {
    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let len = reader.leaf::<Compact<u32>>("Vec length")?.0 as usize;
        // A hostile length prefix must not drive the allocation.
        let mut items = Vec::with_capacity(len.min(reader.remaining()));
        for _ in 0..len {
            items.push(T::decode_from(reader)?);
        }
        Ok(items)
    }
}

/// `Option<T>` is the two-way variant {0 → absent, 1 → present(T)}.
/// `Option<bool>` is deliberately not special-cased: the chain types never use it.
impl<T: WireDecode> WireDecode for Option<T> {
    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        match reader.read_discriminant(OPTION_FAMILY)? {
            0 => Ok(None),
            1 => Ok(Some(T::decode_from(reader)?)),
            other => Err(DecodeError::UnknownDiscriminant {
                family: OPTION_FAMILY,
                value: other,
            }),
        }
    }
}

const OPTION_FAMILY: &str = "Option";

/// Implements [`WireDecode`] for a plain struct by decoding its fields in
/// declaration order. Field failures are annotated with the field name.
macro_rules! impl_wire_decode {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::codec::WireDecode for $ty {
            fn decode_from(
                reader: &mut $crate::codec::WireReader<'_>,
            ) -> Result<Self, $crate::codec::DecodeError> {
                Ok(Self {
                    $(
                        $field: $crate::codec::WireDecode::decode_from(reader)
                            .map_err(|e| e.within(stringify!($ty), stringify!($field)))?,
                    )+
                })
            }
        }
    };
}

pub(crate) use impl_wire_decode;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
