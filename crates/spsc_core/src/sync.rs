#[cfg(not(loom))]
pub use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(loom)]
pub use loom::sync::atomic::{AtomicUsize, Ordering};

#[cfg(not(loom))]
pub use self::cell::UnsafeCell;

#[cfg(loom)]
pub use loom::cell::UnsafeCell;

#[cfg(not(loom))]
mod cell {
    /// `core::cell::UnsafeCell` behind the closure-based access API of
    /// `loom::cell::UnsafeCell`, so loom builds can track every slot access.
    #[repr(transparent)]
    pub struct UnsafeCell<T>(core::cell::UnsafeCell<T>);

    impl<T> UnsafeCell<T> {
        #[inline(always)]
        pub const fn new(value: T) -> Self {
            Self(core::cell::UnsafeCell::new(value))
        }

        /// Runs `f` with a shared pointer to the contents.
        #[inline(always)]
        pub fn with<R>(&self, f: impl FnOnce(*const T) -> R) -> R {
            f(self.0.get())
        }

        /// Runs `f` with a mutable pointer to the contents.
        #[inline(always)]
        pub fn with_mut<R>(&self, f: impl FnOnce(*mut T) -> R) -> R {
            f(self.0.get())
        }
    }
}
