//! Host description.
//!
//! Everything the host exports to the compiler at start-up, as a TOML file:
//!
//! ```toml
//! [marks]
//! "CodeInstaller::VERIFIED_ENTRY" = 1
//! "CodeInstaller::POLL_FAR" = 16
//!
//! [stubs]
//! load_barrier_on_oop_field_preloaded = 0x7f3a10002000
//!
//! [frame]
//! basic_lock_size = 8
//! max_frame_size = 65536
//!
//! [gc]
//! deferred_init_barriers = false
//!
//! [compiler]
//! compilation_count_limit = 0
//! ```

use std::path::{Path, PathBuf};

use hsgen_lir::{FrameLayout, MAX_FRAME_SIZE};
use hsgen_mark::Mark;
use hsgen_zgc::{BarrierStub, GenericBarrierPolicy};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default host description file name.
pub const CONFIG_FILE_NAME: &str = "hsgen.toml";

/// Prefix of every mark constant in the host's constant table.
pub const MARK_KEY_PREFIX: &str = "CodeInstaller::";

/// Smallest frame that still holds the saved frame pointer.
const MIN_FRAME_SIZE: u32 = 16;

type Result<T> = std::result::Result<T, ConfigError>;

/// Host description loaded at start-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HostConfig {
    /// Constant table, keyed `CodeInstaller::<MARK_NAME>`.
    #[serde(default)]
    pub marks: IndexMap<String, i64>,

    /// Barrier stub name to entry address. Address 0 means not exported.
    #[serde(default)]
    pub stubs: IndexMap<String, u64>,

    #[serde(default)]
    pub frame: FrameConfig,

    #[serde(default)]
    pub gc: GcConfig,

    #[serde(default)]
    pub compiler: CompilerConfig,
}

/// Frame-layout parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameConfig {
    /// Size in bytes of one lock record.
    #[serde(default = "default_basic_lock_size")]
    pub basic_lock_size: u32,

    /// Largest frame the host accepts, in bytes.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: u32,
}

/// Collector options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GcConfig {
    #[serde(default)]
    pub deferred_init_barriers: bool,
}

/// Compiler policy knobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompilerConfig {
    /// Compilations allowed per method; 0 disables the check.
    #[serde(default)]
    pub compilation_count_limit: u32,
}

fn default_basic_lock_size() -> u32 {
    FrameLayout::default().lock_slot_size
}

fn default_max_frame_size() -> u32 {
    FrameLayout::default().max_frame_size
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            basic_lock_size: default_basic_lock_size(),
            max_frame_size: default_max_frame_size(),
        }
    }
}

impl HostConfig {
    /// Load a host description from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::debug!(
            "loaded host description from {} ({} marks, {} stubs)",
            path.display(),
            config.marks.len(),
            config.stubs.len()
        );
        Ok(config)
    }

    /// Path to load from: `explicit` if given, else [`CONFIG_FILE_NAME`] in
    /// the current directory.
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Write the host description to `path`, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Reject descriptions no host could have produced.
    ///
    /// Missing marks or stubs are not checked here; that is decided when the
    /// registry and stub table are bound.
    pub fn validate(&self) -> Result<()> {
        for key in self.marks.keys() {
            let name = key.strip_prefix(MARK_KEY_PREFIX).ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "mark constant {key} does not start with {MARK_KEY_PREFIX}"
                ))
            })?;
            Mark::from_name(name).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }

        if let Some(name) = self
            .stubs
            .keys()
            .find(|name| BarrierStub::from_name(name).is_none())
        {
            return Err(ConfigError::Invalid(format!("unknown barrier stub {name}")));
        }

        let frame = &self.frame;
        if !(MIN_FRAME_SIZE..=MAX_FRAME_SIZE).contains(&frame.max_frame_size) {
            return Err(ConfigError::Invalid(format!(
                "max_frame_size must be between {MIN_FRAME_SIZE} and {MAX_FRAME_SIZE}, got {}",
                frame.max_frame_size
            )));
        }
        if frame.basic_lock_size == 0 || frame.basic_lock_size > frame.max_frame_size {
            return Err(ConfigError::Invalid(format!(
                "basic_lock_size must be between 1 and {}, got {}",
                frame.max_frame_size, frame.basic_lock_size
            )));
        }
        Ok(())
    }

    /// Value of a constant-table entry.
    pub fn mark_constant(&self, key: &str) -> Option<i64> {
        self.marks.get(key).copied()
    }

    pub fn frame_layout(&self) -> FrameLayout {
        FrameLayout {
            lock_slot_size: self.frame.basic_lock_size,
            max_frame_size: self.frame.max_frame_size,
        }
    }

    pub fn barrier_policy(&self) -> GenericBarrierPolicy {
        GenericBarrierPolicy::new(self.gc.deferred_init_barriers)
    }

    /// `(stub name, address)` pairs in file order.
    pub fn stub_addresses(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.stubs.iter().map(|(name, &address)| (name.as_str(), address))
    }
}
