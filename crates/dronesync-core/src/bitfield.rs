// ── Bitfield <-> enum-set mapping ──
//
// Capability and requirement sets arrive as integer bitfields whose bit
// positions are protocol enum values. A semantic enum maps onto that
// protocol enum totally; the reverse is partial, since firmware may set
// bits this build does not know.

use std::collections::BTreeSet;

use dronesync_api::ProtocolEnum;
use tracing::trace;

/// A closed semantic enum backed by a protocol bit enum.
pub trait BitfieldEnum: Copy + Ord + Sized + 'static {
    type Protocol: ProtocolEnum;

    /// Protocol counterpart of `self`. Implementations use an exhaustive
    /// `match`, so every variant is mapped.
    fn encode_bit(self) -> Self::Protocol;

    /// Semantic variant for a protocol value, `None` when not mapped.
    fn from_protocol(value: Self::Protocol) -> Option<Self>;

    /// Every mapped variant whose bit is set in `bitfield`.
    ///
    /// Unknown or unmapped bits are skipped.
    fn decode_set(bitfield: u64) -> BTreeSet<Self> {
        (0..64u32)
            .filter(|bit| bitfield & (1u64 << bit) != 0)
            .filter_map(|bit| {
                let mapped = i32::try_from(bit)
                    .ok()
                    .and_then(<Self::Protocol as ProtocolEnum>::from_raw)
                    .and_then(Self::from_protocol);
                if mapped.is_none() {
                    trace!(bit, "ignoring unmapped bitfield bit");
                }
                mapped
            })
            .collect()
    }

    /// Whether `self` is set in `bitfield`.
    fn is_set(self, bitfield: u64) -> bool {
        self.encode_bit().is_set_in(bitfield)
    }

    /// Bitfield with the bits of every value in `values` set.
    fn to_bitfield(values: impl IntoIterator<Item = Self>) -> u64 {
        values
            .into_iter()
            .filter_map(|value| value.encode_bit().bit())
            .fold(0, |acc, bit| acc | (1u64 << bit))
    }
}
