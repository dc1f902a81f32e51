//! Shared fixtures for barrier dispatch tests

#![allow(dead_code)]

use hsgen_zgc::{BarrierStub, StubTable};
use std::sync::Arc;

/// Fake host address of `stub`, distinct per stub and never 0
pub fn address_of(stub: BarrierStub) -> u64 {
    let index = BarrierStub::ALL
        .iter()
        .position(|&s| s == stub)
        .unwrap_or_default();
    0x7f00_0000 + 0x100 * (index as u64 + 1)
}

/// Table exporting every stub
pub fn full_table() -> Arc<StubTable> {
    table_without(&[])
}

/// Table exporting every stub except those listed
pub fn table_without(missing: &[BarrierStub]) -> Arc<StubTable> {
    let listing = BarrierStub::ALL
        .iter()
        .filter(|stub| !missing.contains(stub))
        .map(|&stub| (stub.name(), address_of(stub)));
    Arc::new(StubTable::from_addresses(listing).expect("fixture names are valid"))
}
