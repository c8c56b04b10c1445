// ── Multi-fragment value assembly ──
//
// Some values arrive split over several independent events (the two
// halves of a serial number). The assembler keeps one slot per part and
// yields the parts in slot order once every slot is filled.

use tracing::warn;

/// Slot-based accumulator for a value delivered in `N` parts.
///
/// Invariant: after [`receive`](Self::receive) returns `Some`, every slot
/// is empty again. A part received twice before completion overwrites the
/// previous one.
#[derive(Debug, Clone)]
pub struct FragmentAssembler<T, const N: usize> {
    slots: [Option<T>; N],
}

impl<T, const N: usize> Default for FragmentAssembler<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> FragmentAssembler<T, N> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Store `value` in `slot`. Returns every part in slot order when this
    /// fills the last empty slot, `None` otherwise.
    pub fn receive(&mut self, slot: usize, value: T) -> Option<Vec<T>> {
        let Some(entry) = self.slots.get_mut(slot) else {
            warn!(slot, slots = N, "fragment slot out of range");
            return None;
        };
        *entry = Some(value);

        if !self.slots.iter().all(Option::is_some) {
            return None;
        }
        let parts = std::mem::replace(&mut self.slots, std::array::from_fn(|_| None));
        Some(parts.into_iter().flatten().collect())
    }

    /// Drop any partial state.
    pub fn reset(&mut self) {
        self.slots = std::array::from_fn(|_| None);
    }

    /// `true` when no part is pending.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIGH: usize = 0;
    const LOW: usize = 1;

    fn concat(parts: Option<Vec<&str>>) -> Option<String> {
        parts.map(|p| p.concat())
    }

    #[test]
    fn composes_once_both_slots_are_filled() {
        let mut asm = FragmentAssembler::<&str, 2>::new();
        assert_eq!(asm.receive(HIGH, "PI04"), None);
        assert!(!asm.is_empty());
        assert_eq!(concat(asm.receive(LOW, "0123")), Some("PI040123".into()));
        assert!(asm.is_empty());
    }

    #[test]
    fn result_is_independent_of_arrival_order() {
        let mut asm = FragmentAssembler::<&str, 2>::new();
        assert_eq!(asm.receive(LOW, "0123"), None);
        assert_eq!(concat(asm.receive(HIGH, "PI04")), Some("PI040123".into()));
    }

    #[test]
    fn repeated_slot_overwrites_and_still_emits_once() {
        let mut asm = FragmentAssembler::<&str, 2>::new();
        assert_eq!(asm.receive(HIGH, "old"), None);
        assert_eq!(asm.receive(HIGH, "new"), None);
        assert_eq!(concat(asm.receive(LOW, "-low")), Some("new-low".into()));
        // slots were cleared: a single fragment does not emit again
        assert_eq!(asm.receive(LOW, "-low"), None);
    }

    #[test]
    fn reset_discards_partial_state() {
        let mut asm = FragmentAssembler::<&str, 2>::new();
        asm.receive(HIGH, "PI04");
        asm.reset();
        assert!(asm.is_empty());
        assert_eq!(asm.receive(LOW, "0123"), None);
    }

    #[test]
    fn out_of_range_slot_is_ignored() {
        let mut asm = FragmentAssembler::<&str, 2>::new();
        assert_eq!(asm.receive(7, "x"), None);
        assert!(asm.is_empty());
    }
}
