use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Thresholds steering the split search. Fixed for the lifetime of a `Builder`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Slice budget along the longest axis for binned candidate generation.
    pub num_slices: u32,
    /// Reference sets up to this size get an exact per-reference sweep.
    pub sweep_threshold: u32,
    pub max_primitives: u32,
    /// Depth below which spatial candidates are generated. `None` derives it
    /// from the reference count of each build.
    pub spatial_split_threshold: Option<u32>,
    /// Subtrees smaller than this are deferred as tasks for the worker threads.
    pub parallelize_building_threshold: u32,
    /// Reference sets at least this large evaluate candidates on the pool.
    pub parallel_evaluation_threshold: u32,
    pub parallel_tasks: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_slices: 16,
            sweep_threshold: 64,
            max_primitives: 4,
            spatial_split_threshold: None,
            parallelize_building_threshold: 1024,
            parallel_evaluation_threshold: 1024,
            parallel_tasks: true,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.num_slices == 0 {
            return Err(Error::Setting {
                name: "num_slices",
                reason: "must be at least 1",
            });
        }

        if self.max_primitives == 0 {
            return Err(Error::Setting {
                name: "max_primitives",
                reason: "must be at least 1",
            });
        }

        if self.parallelize_building_threshold == 0 {
            return Err(Error::Setting {
                name: "parallelize_building_threshold",
                reason: "must be at least 1",
            });
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Worker thread request, see `Pool::available_threads`.
    pub threads: i32,
    pub bvh: Settings,
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Config = toml::from_str(source)?;
        config.bvh.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading config: {}...", path.display());

        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&source)
    }
}
