//! Frame-scoped memory management
//!
//! The [`FrameArena`] is the engine's scratch allocator: one fixed region,
//! a bump cursor, and a wholesale reset at the top of every frame. Nothing
//! allocated from it survives the frame boundary.
//!
//! The arena is an explicit value with an owned lifecycle, passed into the
//! subsystems that need scratch memory. Parallel collection uses one private
//! arena per worker; nothing here is shared across threads.

use std::alloc::{alloc, dealloc, Layout};
use std::cell::Cell;
use std::ptr::NonNull;

use crate::foundation::math::align_up;

/// Default allocation alignment, sized to a cache line so unrelated
/// per-frame writes never share one.
pub const FRAME_ARENA_ALIGN: usize = 128;

/// Bump allocator for per-frame scratch memory.
///
/// Allocation is a cursor increment; the whole region is reclaimed at once
/// by [`FrameArena::reset`]. Running out of arena space is a budget
/// misconfiguration, not a recoverable condition: `alloc` panics with the
/// requested size, the current frame number, and the remaining capacity.
///
/// `reset` takes `&mut self`, so the borrow checker guarantees no region
/// handed out during a frame can still be alive when the cursor rewinds.
///
/// Not thread-safe; all access must come from the frame-owning thread.
pub struct FrameArena {
    base: NonNull<u8>,
    capacity: usize,
    cursor: Cell<usize>,
    frame: u64,
}

impl FrameArena {
    /// Creates an arena with `capacity` bytes of backing storage.
    ///
    /// The backing region is allocated once, here, and reused for the
    /// process lifetime.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or the allocation fails.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "frame arena capacity must be non-zero");
        let layout = Layout::from_size_align(capacity, FRAME_ARENA_ALIGN)
            .expect("invalid frame arena layout");
        // SAFETY: layout has non-zero size, checked above.
        let ptr = unsafe { alloc(layout) };
        let base = NonNull::new(ptr).expect("frame arena backing allocation failed");

        log::info!("Created FrameArena with {capacity} bytes");

        Self {
            base,
            capacity,
            cursor: Cell::new(0),
            frame: 0,
        }
    }

    /// Total capacity in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes consumed so far this frame.
    #[inline]
    #[must_use]
    pub fn used(&self) -> usize {
        self.cursor.get()
    }

    /// Bytes still available this frame.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.used()
    }

    /// Frames begun so far; incremented by every [`FrameArena::reset`].
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Bump-allocates `size` bytes aligned to `align`, zero-filled.
    ///
    /// Offsets within one frame are strictly increasing in call order.
    ///
    /// # Panics
    ///
    /// Panics if the allocation would exceed the arena budget, if `align`
    /// is not a power of two, or if `align` exceeds
    /// [`FRAME_ARENA_ALIGN`] (the backing region guarantees nothing
    /// stronger).
    #[allow(clippy::mut_from_ref)] // bump regions are pairwise disjoint
    pub fn alloc(&self, size: usize, align: usize) -> &mut [u8] {
        assert!(align.is_power_of_two(), "alignment must be a power of two");
        assert!(
            align <= FRAME_ARENA_ALIGN,
            "alignment {align} exceeds the arena's backing alignment {FRAME_ARENA_ALIGN}",
        );

        let offset = align_up(self.cursor.get(), align);
        let end = offset.checked_add(align_up(size, align)).unwrap_or(usize::MAX);
        assert!(
            end <= self.capacity,
            "FrameArena exhausted: requested {} bytes (frame {}, {} bytes remaining of {})",
            size,
            self.frame,
            self.remaining(),
            self.capacity,
        );
        self.cursor.set(end);

        // SAFETY: [offset, end) lies inside the backing region and no other
        // live slice overlaps it; the cursor never moves backwards between
        // resets, and reset requires exclusive access.
        unsafe {
            let ptr = self.base.as_ptr().add(offset);
            std::ptr::write_bytes(ptr, 0, end - offset);
            std::slice::from_raw_parts_mut(ptr, end - offset)
        }
    }

    /// Bump-allocates `size` bytes with the default cache-line alignment.
    pub fn alloc_bytes(&self, size: usize) -> &mut [u8] {
        self.alloc(size, FRAME_ARENA_ALIGN)
    }

    /// Typed convenience over [`FrameArena::alloc`]: a zeroed slice of
    /// `count` values of `T` at `T`'s natural alignment.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_typed<T: bytemuck::Pod>(&self, count: usize) -> &mut [T] {
        let bytes = self.alloc(count * std::mem::size_of::<T>(), std::mem::align_of::<T>());
        bytemuck::cast_slice_mut(bytes)
    }

    /// Rewinds the cursor to zero, reclaiming the whole region.
    ///
    /// Called exactly once per frame by the frame driver, before any other
    /// subsystem touches frame-scoped data.
    pub fn reset(&mut self) {
        self.cursor.set(0);
        self.frame += 1;
    }
}

impl Drop for FrameArena {
    fn drop(&mut self) {
        let layout = Layout::from_size_align(self.capacity, FRAME_ARENA_ALIGN)
            .expect("invalid frame arena layout");
        // SAFETY: base was allocated with this exact layout in `new`.
        unsafe { dealloc(self.base.as_ptr(), layout) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_allocations_are_disjoint_and_aligned() {
        let arena = FrameArena::new(1024);

        let a = arena.alloc(10, 16);
        let b = arena.alloc(20, 16);

        assert_eq!(a.len(), 16);
        assert_eq!(b.len(), 32);
        assert_eq!(a.as_ptr() as usize % 16, 0);
        assert_eq!(b.as_ptr() as usize % 16, 0);

        let a_range = a.as_ptr() as usize..a.as_ptr() as usize + a.len();
        assert!(!a_range.contains(&(b.as_ptr() as usize)));
        assert_eq!(arena.used(), 48);
    }

    #[test]
    fn test_reset_returns_to_base_offset() {
        let mut arena = FrameArena::new(1024);

        let first = arena.alloc(10, 16).as_ptr() as usize;
        let _ = arena.alloc(100, 16);
        arena.reset();

        let after_reset = arena.alloc(10, 16).as_ptr() as usize;
        assert_eq!(first, after_reset);
        assert_eq!(arena.frame(), 1);
    }

    #[test]
    fn test_regions_are_zero_filled() {
        let mut arena = FrameArena::new(256);
        arena.alloc_bytes(64).fill(0xAB);
        arena.reset();

        assert!(arena.alloc_bytes(64).iter().all(|&b| b == 0));
    }

    #[test]
    fn test_typed_allocation() {
        let arena = FrameArena::new(4096);
        let floats = arena.alloc_typed::<f32>(100);
        assert_eq!(floats.len(), 100);
        assert!(floats.iter().all(|&f| f == 0.0));
    }

    #[test]
    #[should_panic(expected = "FrameArena exhausted")]
    fn test_overflow_is_fatal() {
        let arena = FrameArena::new(128);
        let _ = arena.alloc(256, 16);
    }

    #[test]
    #[should_panic(expected = "exceeds the arena's backing alignment")]
    fn test_over_aligned_request_is_rejected() {
        let arena = FrameArena::new(1024);
        let _ = arena.alloc(64, 256);
    }

    #[test]
    fn test_full_budget_fits() {
        // Sum of aligned sizes equal to capacity must succeed exactly.
        let arena = FrameArena::new(1024);
        for _ in 0..64 {
            let _ = arena.alloc(16, 16);
        }
        assert_eq!(arena.remaining(), 0);
    }
}
