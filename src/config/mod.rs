pub mod path_finder_config;

pub use path_finder_config::{PathFinderConfigRoot, PathFinderConfigSection};
