//! Placement order allocation for draw ordering.

use outpost_core::SortIndex;

/// Hands out strictly increasing [`SortIndex`] values in placement order.
///
/// Indices are never reused; the only way back to the base is
/// [`PlacementOrder::reset`], which belongs to a full map rebuild. Once
/// `u64::MAX` has been handed out the allocator is exhausted and refuses
/// further requests.
#[derive(Clone, Debug)]
pub struct PlacementOrder {
    base: u64,
    next: Option<u64>,
}

impl PlacementOrder {
    /// Creates an allocator whose first index is `base`.
    #[must_use]
    pub const fn new(base: u64) -> Self {
        Self {
            base,
            next: Some(base),
        }
    }

    /// Allocates the next index, or `None` once the allocator is exhausted.
    pub fn next_index(&mut self) -> Option<SortIndex> {
        let current = self.next?;
        self.next = current.checked_add(1);
        Some(SortIndex::new(current))
    }

    /// Index the next allocation will return.
    #[must_use]
    pub fn peek(&self) -> Option<SortIndex> {
        self.next.map(SortIndex::new)
    }

    /// Number of indices handed out since the last reset.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        match self.next {
            Some(next) => next - self.base,
            None => (u64::MAX - self.base).saturating_add(1),
        }
    }

    /// Restarts allocation at the configured base.
    pub fn reset(&mut self) {
        self.next = Some(self.base);
    }
}

impl Default for PlacementOrder {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_strictly_increase_from_base() {
        let mut order = PlacementOrder::new(10);
        let indices: Vec<_> = (0..5)
            .map(|_| order.next_index().map(|index| index.get()))
            .collect();
        assert_eq!(indices, vec![Some(10), Some(11), Some(12), Some(13), Some(14)]);
        assert_eq!(order.allocated(), 5);
        assert_eq!(order.peek(), Some(SortIndex::new(15)));
    }

    #[test]
    fn exhausted_allocator_refuses_instead_of_wrapping() {
        let mut order = PlacementOrder::new(u64::MAX - 1);
        assert_eq!(order.next_index(), Some(SortIndex::new(u64::MAX - 1)));
        assert_eq!(order.next_index(), Some(SortIndex::new(u64::MAX)));
        assert_eq!(order.next_index(), None);
        assert_eq!(order.peek(), None);
        assert_eq!(order.allocated(), 2);

        order.reset();
        assert_eq!(order.peek(), Some(SortIndex::new(u64::MAX - 1)));
    }

    #[test]
    fn reset_returns_to_base() {
        let mut order = PlacementOrder::default();
        let _ = order.next_index();
        let _ = order.next_index();
        order.reset();
        assert_eq!(order.next_index(), Some(SortIndex::new(0)));
    }
}
