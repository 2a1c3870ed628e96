use async_trait::async_trait;
use dotenvy::dotenv;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use std::{env, fs};
use thiserror::Error;

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Missing [{0}] section")]
    MissingSection(&'static str),
    #[error("Error loading config: {0}")]
    ConfigError(String),
}

/// A table of a TOML config file, checked after parsing.
pub trait ConfigSection: Sized {
    /// The whole document the section is read from.
    type Root: DeserializeOwned + Send;

    /// Table name, for error messages.
    const NAME: &'static str;

    fn from_root(root: Self::Root) -> Option<Self>;

    fn validate(&self) -> Result<(), LoadConfigError> {
        Ok(())
    }
}

fn extract_section<S: ConfigSection>(root: S::Root) -> Result<S, LoadConfigError> {
    let section = S::from_root(root).ok_or(LoadConfigError::MissingSection(S::NAME))?;
    section.validate()?;
    Ok(section)
}

#[async_trait]
pub trait ConfigLoader: ConfigSection + Send {
    async fn load_section_from_file(file_name: String) -> Result<Self, LoadConfigError> {
        let root: Self::Root = load_from_file(file_name).await?;
        extract_section(root)
    }
}

pub trait ConfigLoaderSync: ConfigSection {
    fn load_section_from_file_sync(file_name: String) -> Result<Self, LoadConfigError> {
        let root: Self::Root = load_from_file_sync(file_name)?;
        extract_section(root)
    }
}

pub async fn load_from_file<T: DeserializeOwned>(file_name: String) -> Result<T, LoadConfigError> {
    dotenv().ok();
    let contents = tokio::fs::read_to_string(file_name).await?;
    load_from_str(&contents)
}

pub fn load_from_file_sync<T: DeserializeOwned>(file_name: String) -> Result<T, LoadConfigError> {
    dotenv().ok();
    let contents = fs::read_to_string(file_name)?;
    load_from_str(&contents)
}

/// Parse a TOML document after replacing `${VAR}` with the value of the environment variable.
pub fn load_from_str<T: DeserializeOwned>(contents: &str) -> Result<T, LoadConfigError> {
    let contents = expand_vars(contents)?;
    let config: T = toml::from_str(&contents)?;
    Ok(config)
}

/// Unknown variables are left as they are.
fn expand_vars(raw_config: &str) -> Result<String, LoadConfigError> {
    let re = Regex::new(r"\$\{([a-zA-Z_][0-9a-zA-Z_]*)\}").map_err(|e| LoadConfigError::ConfigError(e.to_string()))?;
    Ok(re
        .replace_all(raw_config, |caps: &Captures| match env::var(&caps[1]) {
            Ok(val) => val,
            Err(_) => caps[0].to_string(),
        })
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Section {
        name: String,
        depth: u32,
    }

    #[derive(Deserialize)]
    struct Root {
        section: Option<Section>,
    }

    impl ConfigSection for Section {
        type Root = Root;
        const NAME: &'static str = "section";

        fn from_root(root: Root) -> Option<Self> {
            root.section
        }

        fn validate(&self) -> Result<(), LoadConfigError> {
            if self.depth == 0 {
                return Err(LoadConfigError::ConfigError("depth must be positive".to_string()));
            }
            Ok(())
        }
    }

    impl ConfigLoaderSync for Section {}

    #[test]
    fn test_expand_vars() -> eyre::Result<()> {
        // SAFETY: the variable name is unique to this test
        unsafe { env::set_var("ORDERBOOK_PATH_TEST_NAME", "replaced") };

        let section: Section = load_from_str("name = \"${ORDERBOOK_PATH_TEST_NAME}\"\ndepth = 4\n")?;
        assert_eq!(section.name, "replaced");
        assert_eq!(section.depth, 4);

        let section: Section = load_from_str("name = \"${ORDERBOOK_PATH_TEST_UNSET}\"\ndepth = 1\n")?;
        assert_eq!(section.name, "${ORDERBOOK_PATH_TEST_UNSET}");
        Ok(())
    }

    #[test]
    fn test_errors() {
        assert!(matches!(load_from_str::<Section>("name = "), Err(LoadConfigError::TomlError(_))));
        assert!(matches!(load_from_file_sync::<Section>("/nonexistent/config.toml".to_string()), Err(LoadConfigError::IoError(_))));
    }

    #[test]
    fn test_extract_section() -> eyre::Result<()> {
        let section: Section = extract_section(load_from_str("[section]\nname = \"a\"\ndepth = 2\n")?)?;
        assert_eq!((section.name.as_str(), section.depth), ("a", 2));

        let missing = extract_section::<Section>(load_from_str("[other]\nname = \"a\"\n")?);
        assert!(matches!(missing, Err(LoadConfigError::MissingSection("section"))));

        let invalid = extract_section::<Section>(load_from_str("[section]\nname = \"a\"\ndepth = 0\n")?);
        assert!(matches!(invalid, Err(LoadConfigError::ConfigError(_))));
        Ok(())
    }
}
