// ── Protocol enums ──
//
// Every protocol enum is a fieldless `#[repr(i32)]` enum deriving
// `strum::FromRepr`. The trait below gives callers a uniform raw <-> typed
// mapping, where the typed direction is partial: newer firmware may send
// values this build has never heard of.

/// A closed protocol enumeration with a stable wire value per variant.
pub trait ProtocolEnum: Copy + Sized + 'static {
    /// Wire value of this variant.
    fn to_raw(self) -> i32;

    /// Variant for a wire value, `None` when unknown.
    fn from_raw(raw: i32) -> Option<Self>;

    /// Bit position this variant occupies in protocol bitfields.
    ///
    /// Protocol bitfields are indexed by the enum's wire value.
    fn bit(self) -> Option<u32> {
        u32::try_from(self.to_raw()).ok().filter(|bit| *bit < 64)
    }

    /// Whether this variant's bit is set in `bitfield`.
    fn is_set_in(self, bitfield: u64) -> bool {
        self.bit().is_some_and(|bit| bitfield & (1u64 << bit) != 0)
    }
}

/// Implement [`ProtocolEnum`] for `#[repr(i32)]` enums deriving `FromRepr`.
#[macro_export]
macro_rules! protocol_enum {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::ProtocolEnum for $ty {
                #[allow(clippy::as_conversions)]
                fn to_raw(self) -> i32 {
                    self as i32
                }

                fn from_raw(raw: i32) -> Option<Self> {
                    Self::from_repr(raw)
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use strum::FromRepr;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
    #[repr(i32)]
    enum Sample {
        Zero = 0,
        Two = 2,
    }

    protocol_enum!(Sample);

    #[test]
    fn raw_round_trip_and_unknown_values() {
        assert_eq!(Sample::Two.to_raw(), 2);
        assert_eq!(Sample::from_raw(0), Some(Sample::Zero));
        assert_eq!(Sample::from_raw(1), None);
        assert_eq!(Sample::from_raw(-4), None);
    }

    #[test]
    fn bit_membership_uses_wire_value() {
        assert!(Sample::Two.is_set_in(0b100));
        assert!(!Sample::Two.is_set_in(0b011));
        assert!(Sample::Zero.is_set_in(0b001));
    }
}
