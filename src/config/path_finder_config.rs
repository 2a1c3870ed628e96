use crate::utils::config_loader::{ConfigLoader, ConfigLoaderSync, ConfigSection, LoadConfigError};
use crate::utils::constants::{
    DEFAULT_MAX_ASSETS_PARAM_LENGTH, DEFAULT_MAX_PATH_LENGTH, DEFAULT_MAX_PATHS_PER_ASSET, DEFAULT_MAX_REQUESTS_PER_SECOND,
    MAX_PATH_LENGTH_LIMIT,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Deserialize, Debug)]
pub struct PathFinderConfigRoot {
    #[serde(default)]
    pub path_finder: Option<PathFinderConfigSection>,
}

/// `[path_finder]` table of the config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathFinderConfigSection {
    /// Trades per path, a path holds at most one more asset.
    pub max_path_length: usize,
    pub max_paths_per_asset: usize,
    pub max_assets_param_length: usize,
    pub max_requests_per_second: u32,
    pub validate_source_balance: bool,
    /// Trade against liquidity pools as well as offers.
    pub include_pools: bool,
}

impl PathFinderConfigSection {
    pub fn with_max_path_length(&self, max_path_length: usize) -> Self {
        Self { max_path_length, ..self.clone() }
    }

    pub fn with_max_requests_per_second(&self, max_requests_per_second: u32) -> Self {
        Self { max_requests_per_second, ..self.clone() }
    }

    pub fn with_include_pools(&self, include_pools: bool) -> Self {
        Self { include_pools, ..self.clone() }
    }
}

impl Default for PathFinderConfigSection {
    fn default() -> Self {
        Self {
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            max_paths_per_asset: DEFAULT_MAX_PATHS_PER_ASSET,
            max_assets_param_length: DEFAULT_MAX_ASSETS_PARAM_LENGTH,
            max_requests_per_second: DEFAULT_MAX_REQUESTS_PER_SECOND,
            validate_source_balance: true,
            include_pools: true,
        }
    }
}

impl ConfigSection for PathFinderConfigSection {
    type Root = PathFinderConfigRoot;
    const NAME: &'static str = "path_finder";

    fn from_root(root: PathFinderConfigRoot) -> Option<Self> {
        root.path_finder
    }

    fn validate(&self) -> Result<(), LoadConfigError> {
        if self.max_path_length == 0 || self.max_path_length > MAX_PATH_LENGTH_LIMIT {
            return Err(LoadConfigError::ConfigError(format!(
                "max_path_length must be between 1 and {MAX_PATH_LENGTH_LIMIT} trades, got {}",
                self.max_path_length
            )));
        }
        if self.max_paths_per_asset == 0 {
            return Err(LoadConfigError::ConfigError("max_paths_per_asset must be positive".to_string()));
        }
        if self.max_assets_param_length == 0 {
            return Err(LoadConfigError::ConfigError("max_assets_param_length must be positive".to_string()));
        }
        Ok(())
    }
}

impl ConfigLoader for PathFinderConfigSection {}

impl ConfigLoaderSync for PathFinderConfigSection {}
