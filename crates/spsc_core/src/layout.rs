use spsc_common::layout::{HandleKind, HandleLayout};

use crate::handle::{Consumer, Producer};

/// Size and alignment of the handle of the given role for payload type `T`.
pub fn handle_layout<T: 'static>(kind: HandleKind) -> HandleLayout {
    match kind {
        HandleKind::Producer => producer_layout::<T>(),
        HandleKind::Consumer => consumer_layout::<T>(),
    }
}

/// Layout of [`Producer`] for payload type `T`.
pub const fn producer_layout<T: 'static>() -> HandleLayout {
    HandleLayout::of::<Producer<'static, T>>()
}

/// Layout of [`Consumer`] for payload type `T`.
pub const fn consumer_layout<T: 'static>() -> HandleLayout {
    HandleLayout::of::<Consumer<'static, T>>()
}
