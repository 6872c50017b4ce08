//! Object pools, pool views, and growable pooled lists
//!
//! A [`Pool`] preallocates all of its elements once and is reset wholesale
//! each collection cycle; nothing in the hot path touches the heap. A
//! [`PoolView`] is a non-owning window into a pool, and a [`GrowableList`]
//! is an append-only collection built on such a window, requesting a bigger
//! one (and copying) when it fills.
//!
//! # Growth waste
//!
//! Growing a list abandons its previous view inside the pool; that capacity
//! is only reclaimed by [`Pool::reset`]. This is the binding contract: size
//! every shared pool for the worst-case *cumulative* allocation of all
//! lists sharing it within one cycle, growth included, not for the peak
//! live element count.

use std::marker::PhantomData;

use crate::render::{MemoryError, MemoryResult};

/// Fixed-capacity preallocated storage for elements of one type.
///
/// Elements are default-initialized at construction and never destructed by
/// a reset; callers overwrite slots before reading them.
pub struct Pool<T> {
    storage: Vec<T>,
    used: usize,
    resets: u64,
}

impl<T: Default + Clone> Pool<T> {
    /// Preallocate `capacity` default elements.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        log::debug!(
            "Created Pool<{}> with {capacity} slots",
            std::any::type_name::<T>()
        );
        Self {
            storage: vec![T::default(); capacity],
            used: 0,
            resets: 0,
        }
    }
}

impl<T> Pool<T> {
    /// Total slot count.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Slots handed out since the last reset, abandoned views included.
    #[inline]
    #[must_use]
    pub const fn used(&self) -> usize {
        self.used
    }

    /// Slots still available this cycle.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.used
    }

    /// Claim a view over the next `count` slots.
    ///
    /// Offsets are strictly increasing across calls within one cycle.
    pub fn alloc(&mut self, count: usize) -> MemoryResult<PoolView<T>> {
        if count > self.remaining() {
            return Err(MemoryError::CapacityExceeded {
                resource: "object pool",
                requested: count as u64,
                remaining: self.remaining() as u64,
                frame: self.resets,
            });
        }
        let view = PoolView {
            start: self.used,
            len: count,
            _marker: PhantomData,
        };
        self.used += count;
        Ok(view)
    }

    /// Discard every view handed out this cycle. Element contents are left
    /// as-is; callers overwrite before reading.
    ///
    /// Called exactly once per frame/collection cycle.
    pub fn reset(&mut self) {
        self.used = 0;
        self.resets += 1;
    }

    /// The elements behind a view.
    #[must_use]
    pub fn slice(&self, view: PoolView<T>) -> &[T] {
        &self.storage[view.start..view.start + view.len]
    }

    /// The elements behind a view, mutably.
    pub fn slice_mut(&mut self, view: PoolView<T>) -> &mut [T] {
        &mut self.storage[view.start..view.start + view.len]
    }

    /// Clone `count` elements from one in-pool range to another.
    ///
    /// Used by list growth; ranges claimed by `alloc` never overlap.
    fn clone_range(&mut self, src_start: usize, dst_start: usize, count: usize)
    where
        T: Clone,
    {
        for i in 0..count {
            let value = self.storage[src_start + i].clone();
            self.storage[dst_start + i] = value;
        }
    }
}

/// A weak, non-owning `(start, length)` window into a pool's backing array.
///
/// Views are plain coordinates; several may alias the same pool, and a view
/// outlived by its list's growth simply keeps naming slots nobody reads.
#[derive(Debug)]
pub struct PoolView<T> {
    start: usize,
    len: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for PoolView<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PoolView<T> {}

impl<T> PoolView<T> {
    /// An empty window; the state of a list before its first allocation.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            start: 0,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Starting offset inside the pool's backing array.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.start
    }

    /// Window length in elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the window is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Smallest view a growth will request.
const GROWTH_FLOOR: usize = 32;

/// Append-only list borrowing its storage from a [`Pool`].
///
/// The list owns no storage; every operation takes the pool explicitly.
/// Elements `[0, count)` of the current view are always the live window.
///
/// # Contract
///
/// A growth-triggering [`GrowableList::alloc_slot`] replaces the backing
/// view: any `(slice, offset)` pair fetched earlier is invalidated. Bulk
/// readers and sorters fetch [`GrowableList::live`] once collection is
/// complete and never interleave cached slices with further allocation.
pub struct GrowableList<T> {
    view: PoolView<T>,
    count: usize,
}

impl<T> Default for GrowableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GrowableList<T> {
    /// An empty list; the first allocation claims its initial view.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            view: PoolView::empty(),
            count: 0,
        }
    }

    /// An empty list with an initial view of `capacity` slots.
    pub fn with_capacity(pool: &mut Pool<T>, capacity: usize) -> MemoryResult<Self> {
        Ok(Self {
            view: pool.alloc(capacity)?,
            count: 0,
        })
    }
}

impl<T: Clone> GrowableList<T> {
    /// Claim the next slot, growing first if the view is full.
    ///
    /// Growth requests a view of `max(32, (count + 1) * 2)` slots, copies
    /// the live window into it, and abandons the old view until the pool's
    /// next reset. Returns the list-local index of the claimed slot.
    pub fn alloc_slot(&mut self, pool: &mut Pool<T>) -> MemoryResult<usize> {
        if self.count + 1 >= self.view.len() {
            self.grow(pool)?;
        }
        let slot = self.count;
        self.count += 1;
        Ok(slot)
    }

    /// Claim a slot and write `value` into it.
    pub fn push(&mut self, pool: &mut Pool<T>, value: T) -> MemoryResult<usize> {
        let slot = self.alloc_slot(pool)?;
        pool.slice_mut(self.view)[slot] = value;
        Ok(slot)
    }

    fn grow(&mut self, pool: &mut Pool<T>) -> MemoryResult<()> {
        let new_len = GROWTH_FLOOR.max((self.count + 1) * 2);
        let new_view = pool.alloc(new_len)?;
        pool.clone_range(self.view.offset(), new_view.offset(), self.count);
        log::trace!(
            "GrowableList grew {} -> {} (pool slots used: {})",
            self.view.len(),
            new_len,
            pool.used()
        );
        self.view = new_view;
        Ok(())
    }
}

impl<T> GrowableList<T> {
    /// Live element count.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether the list holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The current backing view (offset valid until the next growth).
    #[inline]
    #[must_use]
    pub const fn view(&self) -> PoolView<T> {
        self.view
    }

    /// One live element.
    #[must_use]
    pub fn get<'a>(&self, pool: &'a Pool<T>, index: usize) -> Option<&'a T> {
        if index < self.count {
            pool.slice(self.view).get(index)
        } else {
            None
        }
    }

    /// One live element, mutably.
    pub fn get_mut<'a>(&self, pool: &'a mut Pool<T>, index: usize) -> Option<&'a mut T> {
        if index < self.count {
            pool.slice_mut(self.view).get_mut(index)
        } else {
            None
        }
    }

    /// The live window `[0, count)` as a slice.
    #[must_use]
    pub fn live<'a>(&self, pool: &'a Pool<T>) -> &'a [T] {
        &pool.slice(self.view)[..self.count]
    }

    /// The live window as a mutable slice, for in-place bulk operations.
    pub fn live_mut<'a>(&self, pool: &'a mut Pool<T>) -> &'a mut [T] {
        &mut pool.slice_mut(self.view)[..self.count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_alloc_and_reset() {
        let mut pool: Pool<u32> = Pool::new(8);
        let a = pool.alloc(3).unwrap();
        let b = pool.alloc(4).unwrap();
        assert_eq!(a.offset(), 0);
        assert_eq!(b.offset(), 3);
        assert_eq!(pool.remaining(), 1);

        assert!(matches!(
            pool.alloc(2),
            Err(MemoryError::CapacityExceeded { .. })
        ));

        pool.reset();
        assert_eq!(pool.alloc(8).unwrap().offset(), 0);
    }

    #[test]
    fn test_list_preserves_insertion_order_across_growth() {
        let mut pool: Pool<u64> = Pool::new(4096);
        let mut list = GrowableList::with_capacity(&mut pool, 2).unwrap();

        for value in 0..1000u64 {
            list.push(&mut pool, value).unwrap();
        }

        assert_eq!(list.len(), 1000);
        for (index, value) in list.live(&pool).iter().enumerate() {
            assert_eq!(*value, index as u64);
        }
    }

    #[test]
    fn test_growth_shape_from_small_view() {
        let mut pool: Pool<u8> = Pool::new(64);
        let mut list = GrowableList::with_capacity(&mut pool, 2).unwrap();
        assert_eq!(pool.used(), 2);

        for i in 0..5u8 {
            list.push(&mut pool, i).unwrap();
        }

        // Exactly one growth: the initial 2 slots are abandoned and one
        // larger view (>= 5 slots) now backs the list.
        assert!(list.view().len() >= 5);
        assert_eq!(pool.used(), 2 + list.view().len());
        assert_eq!(list.live(&pool), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_undersized_pool_fails_growth() {
        // Too small for abandoned view + grown view together.
        let mut pool: Pool<u8> = Pool::new(20);
        let mut list = GrowableList::with_capacity(&mut pool, 2).unwrap();

        list.push(&mut pool, 0).unwrap();
        let err = list.push(&mut pool, 1).unwrap_err();
        assert!(matches!(err, MemoryError::CapacityExceeded { .. }));
    }

    #[test]
    fn test_growth_abandons_old_view_until_reset() {
        let mut pool: Pool<u8> = Pool::new(128);
        let mut list = GrowableList::with_capacity(&mut pool, 2).unwrap();
        for i in 0..3u8 {
            list.push(&mut pool, i).unwrap();
        }
        let used_after_growth = pool.used();
        assert!(used_after_growth > list.view().len());

        pool.reset();
        assert_eq!(pool.used(), 0);
    }

    #[test]
    fn test_two_lists_share_one_pool() {
        let mut pool: Pool<u32> = Pool::new(256);
        let mut evens = GrowableList::new();
        let mut odds = GrowableList::new();

        for value in 0..40u32 {
            if value % 2 == 0 {
                evens.push(&mut pool, value).unwrap();
            } else {
                odds.push(&mut pool, value).unwrap();
            }
        }

        assert_eq!(evens.len(), 20);
        assert_eq!(odds.len(), 20);
        assert!(evens.live(&pool).iter().all(|v| v % 2 == 0));
        assert!(odds.live(&pool).iter().all(|v| v % 2 == 1));
    }

    #[test]
    fn test_get_is_bounds_checked() {
        let mut pool: Pool<u32> = Pool::new(64);
        let mut list = GrowableList::new();
        list.push(&mut pool, 9).unwrap();

        assert_eq!(list.get(&pool, 0), Some(&9));
        assert_eq!(list.get(&pool, 1), None);
    }
}
