use crate::logic::errors::OrderBookError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use strum_macros::{Display as StrumDisplay, EnumString};

pub const NATIVE_ASSET_STRING: &str = "native";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumString)]
pub enum AssetType {
    #[strum(serialize = "native")]
    Native,
    #[strum(serialize = "credit_alphanum4")]
    CreditAlphanum4,
    #[strum(serialize = "credit_alphanum12")]
    CreditAlphanum12,
}

/// Ledger account, identified by its public address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new<T: Into<String>>(address: T) -> Self {
        AccountId(address.into())
    }

    pub fn get_address(&self) -> &str {
        &self.0
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tradable unit: the native currency or an issued token (code + issuer).
///
/// Assets are compared, hashed and ordered by their canonical string, e.g. `native` or
/// `credit_alphanum4/USD/GISSUER`. Serde goes through the same string, so a deserialized asset
/// is always valid.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asset {
    asset_type: AssetType,
    code: Option<String>,
    issuer: Option<AccountId>,
}

impl Asset {
    pub fn native() -> Asset {
        Asset { asset_type: AssetType::Native, code: None, issuer: None }
    }

    /// Issued asset. Codes of up to 4 characters are alphanum4, up to 12 alphanum12.
    pub fn credit(code: &str, issuer: AccountId) -> Result<Asset, OrderBookError> {
        if code.is_empty() || code.len() > 12 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(OrderBookError::InvalidAsset(format!("invalid asset code {code:?}")));
        }
        let address = issuer.get_address();
        if address.is_empty() || !address.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(OrderBookError::InvalidAsset(format!("asset {code} has invalid issuer {address:?}")));
        }
        let asset_type = if code.len() <= 4 { AssetType::CreditAlphanum4 } else { AssetType::CreditAlphanum12 };

        Ok(Asset { asset_type, code: Some(code.to_string()), issuer: Some(issuer) })
    }

    pub fn get_type(&self) -> AssetType {
        self.asset_type
    }

    pub fn get_code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn get_issuer(&self) -> Option<&AccountId> {
        self.issuer.as_ref()
    }

    pub fn is_native(&self) -> bool {
        self.asset_type == AssetType::Native
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.issuer) {
            (Some(code), Some(issuer)) => write!(f, "{}/{}/{}", self.asset_type, code, issuer),
            _ => write!(f, "{NATIVE_ASSET_STRING}"),
        }
    }
}

impl FromStr for Asset {
    type Err = OrderBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == NATIVE_ASSET_STRING {
            return Ok(Asset::native());
        }

        let parts: Vec<&str> = s.split('/').collect();
        let [asset_type, code, issuer] = parts.as_slice() else {
            return Err(OrderBookError::InvalidAsset(s.to_string()));
        };
        let asset = Asset::credit(code, AccountId::new(*issuer))?;
        if asset.asset_type.to_string() != *asset_type {
            return Err(OrderBookError::InvalidAsset(s.to_string()));
        }
        Ok(asset)
    }
}

impl TryFrom<String> for Asset {
    type Error = OrderBookError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.to_string()
    }
}

impl Hash for Asset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.asset_type.hash(state);
        self.code.hash(state);
        self.issuer.hash(state);
    }
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.asset_type == other.asset_type && self.code == other.code && self.issuer == other.issuer
    }
}

impl Eq for Asset {}

impl Ord for Asset {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl PartialOrd for Asset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
