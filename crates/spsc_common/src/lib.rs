//! Common definitions shared by the SPSC queue crates.
//!
//! This crate holds the compile-time tunables of the queue (cache-line width,
//! minimum ring capacity), the plain-data description of handle layouts used
//! by callers that allocate handles outside Rust, and the status codes
//! returned across the C ABI. It has no dependencies and no code paths of its
//! own so that the core, FFI, and host crates agree on a single definition.

#![no_std]

/// Width in bytes of one cache line on the target platforms.
///
/// Producer-owned and consumer-owned state is aligned and padded to this
/// width so that writes from one side never invalidate the line the other
/// side is polling. `repr(align)` cannot take a constant, so every type
/// annotated with `#[repr(align(64))]` asserts at compile time that its
/// alignment matches this value.
pub const CACHE_LINE_SIZE: usize = 64;

/// Smallest ring capacity that can carry a value.
///
/// One slot is always kept empty so that `head == tail` means empty and
/// `head + 1 == tail` means full. A ring of capacity `N` therefore holds at
/// most `N - 1` values, and capacity 1 could hold none.
pub const MIN_CAPACITY: usize = 2;

/// Size and alignment metadata for the queue handles.
///
/// Callers that embed the handles in memory they manage themselves (another
/// language's allocator, a shared arena, a static region) query these values
/// instead of hard-coding them, since the cache-line padding is part of the
/// layout.
pub mod layout {
    use crate::CACHE_LINE_SIZE;

    /// Tag naming one of the two handle roles.
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum HandleKind {
        /// The write side, owner of the head index.
        Producer = 0,

        /// The read side, owner of the tail index.
        Consumer = 1,
    }

    impl HandleKind {
        /// Both roles, in a fixed order.
        pub const ALL: [HandleKind; 2] = [HandleKind::Producer, HandleKind::Consumer];

        /// Lower-case role name, used in reports.
        pub const fn name(self) -> &'static str {
            match self {
                HandleKind::Producer => "producer",
                HandleKind::Consumer => "consumer",
            }
        }
    }

    /// Byte size and byte alignment of a handle type.
    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HandleLayout {
        /// `size_of` the handle, padding included.
        pub size: usize,

        /// `align_of` the handle.
        pub align: usize,
    }

    impl HandleLayout {
        /// Layout of an arbitrary type `H`.
        pub const fn of<H>() -> Self {
            Self {
                size: core::mem::size_of::<H>(),
                align: core::mem::align_of::<H>(),
            }
        }

        /// Returns true when the type starts on a cache-line boundary and
        /// covers whole cache lines, so no neighbouring value can share a
        /// line with it.
        pub const fn is_cache_isolated(&self) -> bool {
            self.align >= CACHE_LINE_SIZE && self.size % CACHE_LINE_SIZE == 0
        }
    }
}

/// Status codes returned by the C ABI.
///
/// Failures are reported as negated errno values, matching the convention of
/// the C header shipped with the FFI crate.
pub mod abi {
    /// The call completed.
    pub const OK: i32 = 0;

    /// `EAGAIN` on the target platform: the queue was full, try again later.
    #[cfg(any(
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    ))]
    pub const EAGAIN: i32 = 35;

    /// `EAGAIN` on the target platform: the queue was full, try again later.
    #[cfg(not(any(
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    )))]
    pub const EAGAIN: i32 = 11;

    /// `EINVAL`: an initialization argument was null, misaligned, or the
    /// capacity was below the minimum.
    pub const EINVAL: i32 = 22;
}

#[cfg(test)]
mod tests {
    use super::layout::{HandleKind, HandleLayout};
    use super::*;

    #[repr(C, align(64))]
    struct Line([u8; 8]);

    #[test]
    fn layout_of_padded_type_is_isolated() {
        let layout = HandleLayout::of::<Line>();
        assert_eq!(layout.size, CACHE_LINE_SIZE);
        assert_eq!(layout.align, CACHE_LINE_SIZE);
        assert!(layout.is_cache_isolated());
    }

    #[test]
    fn layout_of_plain_word_is_not_isolated() {
        assert!(!HandleLayout::of::<usize>().is_cache_isolated());
    }

    #[test]
    fn handle_kind_names() {
        let names: [&str; 2] = HandleKind::ALL.map(HandleKind::name);
        assert_eq!(names, ["producer", "consumer"]);
    }

    #[test]
    fn status_codes_are_distinct() {
        assert_ne!(abi::EAGAIN, abi::EINVAL);
        assert_ne!(abi::EAGAIN, abi::OK);
    }
}
