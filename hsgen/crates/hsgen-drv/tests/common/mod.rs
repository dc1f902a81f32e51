//! Shared fixtures for driver tests

#![allow(dead_code)]

use hsgen_drv::HostConfig;
use hsgen_mark::Mark;
use hsgen_zgc::BarrierStub;
use std::path::{Path, PathBuf};

/// Host exporting every mark and every barrier stub
pub fn complete_host() -> HostConfig {
    let mut config = required_marks_only();
    for &mark in Mark::ALL.iter().filter(|mark| mark.is_optional()) {
        config.marks.insert(mark.constant_key(), mark_value(mark));
    }
    config
}

/// Host exporting every stub but none of the optional marks
pub fn required_marks_only() -> HostConfig {
    let mut config = HostConfig::default();
    for &mark in Mark::ALL.iter().filter(|mark| !mark.is_optional()) {
        config.marks.insert(mark.constant_key(), mark_value(mark));
    }
    for &stub in BarrierStub::ALL {
        config.stubs.insert(stub.name().to_string(), stub_address(stub));
    }
    config
}

pub fn mark_value(mark: Mark) -> i64 {
    0x1000 + mark.index() as i64
}

pub fn stub_address(stub: BarrierStub) -> u64 {
    let index = BarrierStub::ALL
        .iter()
        .position(|&s| s == stub)
        .unwrap_or_default();
    0x7f3a_1000_0000 + 0x40 * index as u64
}

/// Write `config` as `hsgen.toml` in `dir`
pub fn write_host(dir: &Path, config: &HostConfig) -> PathBuf {
    let path = dir.join(hsgen_drv::CONFIG_FILE_NAME);
    config.save_to_path(&path).expect("host description is writable");
    path
}
