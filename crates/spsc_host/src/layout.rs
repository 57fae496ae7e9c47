//! Handle size and alignment report.
//!
//! Prints the layout of the Rust handles and of the C ABI handles so callers
//! allocating them externally can check the numbers their build sees.

use spsc_common::layout::{HandleKind, HandleLayout};
use spsc_core::layout::handle_layout;

pub struct LayoutRow {
    pub interface: &'static str,
    pub kind: HandleKind,
    pub layout: HandleLayout,
}

pub fn layout_rows() -> Vec<LayoutRow> {
    let mut rows: Vec<LayoutRow> = HandleKind::ALL
        .into_iter()
        .map(|kind| LayoutRow {
            interface: "rust",
            kind,
            layout: handle_layout::<usize>(kind),
        })
        .collect();

    rows.push(LayoutRow {
        interface: "c",
        kind: HandleKind::Producer,
        layout: HandleLayout {
            size: spsc_ffi::sizeof_producer_q(),
            align: spsc_ffi::alignof_producer_q(),
        },
    });
    rows.push(LayoutRow {
        interface: "c",
        kind: HandleKind::Consumer,
        layout: HandleLayout {
            size: spsc_ffi::sizeof_consumer_q(),
            align: spsc_ffi::alignof_consumer_q(),
        },
    });
    rows
}

pub fn print_layouts() {
    println!(
        "{:<6} {:<9} {:>6} {:>6} {:>9}",
        "abi", "handle", "size", "align", "isolated"
    );
    for row in layout_rows() {
        println!(
            "{:<6} {:<9} {:>6} {:>6} {:>9}",
            row.interface,
            row.kind.name(),
            row.layout.size,
            row.layout.align,
            row.layout.is_cache_isolated()
        );
    }
}
