//! Tagged variants: closed alternative sets encoded as one discriminant byte
//! followed by the active alternative's payload.
//!
//! Every chain enum in [`crate::types`] is a Rust `enum`, so "more than one
//! alternative active" cannot be represented. The discriminant mapping is
//! spelled out by hand in each [`TaggedVariant::discriminant`] impl and in the
//! matching `WireDecode` impl; it is part of the wire contract, not something
//! derived from declaration order.
//!
//! Nesting is by composition: a payload is encoded with its own `Encode` impl
//! and decoded with its own `WireDecode` impl, so a variant carrying another
//! variant (e.g. `ContractState::Deleted(DeletedState)`) needs nothing special.

use parity_scale_codec::Output;

/// A closed set of alternatives with a fixed discriminant mapping.
pub trait TaggedVariant {
    /// Family name used in error messages.
    const FAMILY: &'static str;

    /// Discriminant byte of the active alternative.
    fn discriminant(&self) -> u8;

    /// Writes the active alternative's payload. Payload-less alternatives
    /// write nothing.
    fn encode_payload<O: Output + ?Sized>(&self, _dest: &mut O) {}
}

/// Writes `discriminant ++ payload`.
pub fn encode_variant<V: TaggedVariant, O: Output + ?Sized>(value: &V, dest: &mut O) {
    dest.push_byte(value.discriminant());
    value.encode_payload(dest);
}

/// Implements `parity_scale_codec::Encode` for each listed [`TaggedVariant`].
macro_rules! impl_variant_encode {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl parity_scale_codec::Encode for $ty {
                fn encode_to<O: parity_scale_codec::Output + ?Sized>(&self, dest: &mut O) {
                    $crate::codec::variant::encode_variant(self, dest)
                }
            }
        )+
    };
}

pub(crate) use impl_variant_encode;
