pub mod asset;
pub mod config_loader;
pub mod constants;

pub use asset::{AccountId, Asset, AssetType, NATIVE_ASSET_STRING};
pub use config_loader::*;
pub use constants::*;
