use super::graph::{FastHashMap, FastHashSet};
use super::path_hash::PathHash;
use crate::utils::Asset;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use strum_macros::{Display as StrumDisplay, EnumString};

/// A payment path: spend `source_amount` of `source_asset`, trade through `interior_nodes` in
/// order, and receive `destination_amount` of `destination_asset`.
///
/// Fields are read only so the hash always matches them. Deserializing recomputes the hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PathParts")]
pub struct Path {
    path_hash: PathHash,
    source_asset: Asset,
    source_amount: i64,
    destination_asset: Asset,
    destination_amount: i64,
    interior_nodes: Vec<Asset>,
}

#[derive(Deserialize)]
struct PathParts {
    source_asset: Asset,
    source_amount: i64,
    destination_asset: Asset,
    destination_amount: i64,
    #[serde(default)]
    interior_nodes: Vec<Asset>,
}

impl From<PathParts> for Path {
    fn from(parts: PathParts) -> Self {
        Path::new(parts.source_asset, parts.source_amount, parts.destination_asset, parts.destination_amount, parts.interior_nodes)
    }
}

impl Path {
    pub fn new(source_asset: Asset, source_amount: i64, destination_asset: Asset, destination_amount: i64, interior_nodes: Vec<Asset>) -> Self {
        let path_hash = generate_path_hash(&source_asset, source_amount, &destination_asset, destination_amount, &interior_nodes);
        Path { path_hash, source_asset, source_amount, destination_asset, destination_amount, interior_nodes }
    }

    pub fn path_hash(&self) -> PathHash {
        self.path_hash
    }

    pub fn source_asset(&self) -> &Asset {
        &self.source_asset
    }

    pub fn source_amount(&self) -> i64 {
        self.source_amount
    }

    pub fn destination_asset(&self) -> &Asset {
        &self.destination_asset
    }

    pub fn destination_amount(&self) -> i64 {
        self.destination_amount
    }

    /// Assets traded through, in trade order.
    pub fn interior_nodes(&self) -> &[Asset] {
        &self.interior_nodes
    }

    /// Number of assets on the path, source and destination included.
    pub fn assets_count(&self) -> usize {
        self.interior_nodes.len() + 2
    }

    pub fn is_direct(&self) -> bool {
        self.interior_nodes.is_empty()
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Path({} {} -> [{}] -> {} {})",
            self.source_amount,
            self.source_asset,
            self.interior_nodes.iter().map(|asset| asset.to_string()).collect::<Vec<String>>().join(", "),
            self.destination_amount,
            self.destination_asset
        )
    }
}

/// Hash of a path with these fields, see [`PathHash::compute`].
pub fn generate_path_hash(
    source_asset: &Asset,
    source_amount: i64,
    destination_asset: &Asset,
    destination_amount: i64,
    interior_nodes: &[Asset],
) -> PathHash {
    let assets = std::iter::once(source_asset).chain(interior_nodes).chain(std::iter::once(destination_asset));
    PathHash::compute(assets, source_amount, destination_amount)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, StrumDisplay, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SortBy {
    /// Group by source asset, cheapest source amount first.
    SourceAsset,
    /// Group by destination asset, largest destination amount first.
    DestinationAsset,
}

/// Group `paths` by source or destination asset and keep the best `max_paths_per_asset` of
/// every group.
///
/// Groups appear in the order their first path was found. Inside a group paths are ordered by
/// amount, equal amounts keep their search order. Exact duplicates are dropped.
pub fn sort_and_filter_paths(paths: Vec<Path>, max_paths_per_asset: usize, sort_by: SortBy) -> Vec<Path> {
    let mut seen: FastHashSet<PathHash> = FastHashSet::default();
    let mut group_index: FastHashMap<String, usize> = FastHashMap::default();
    let mut groups: Vec<Vec<Path>> = Vec::new();

    for path in paths {
        if !seen.insert(path.path_hash) {
            continue;
        }

        let key = match sort_by {
            SortBy::SourceAsset => path.source_asset.to_string(),
            SortBy::DestinationAsset => path.destination_asset.to_string(),
        };
        let index = *group_index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[index].push(path);
    }

    let mut filtered = Vec::new();
    for mut group in groups {
        match sort_by {
            SortBy::SourceAsset => group.sort_by_key(|path| path.source_amount),
            SortBy::DestinationAsset => group.sort_by_key(|path| std::cmp::Reverse(path.destination_amount)),
        }
        group.truncate(max_paths_per_asset);
        filtered.extend(group);
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fixtures::*;

    fn to_native(source: &Asset, amount: i64, interior: Vec<Asset>) -> Path {
        Path::new(source.clone(), amount, NATIVE.clone(), 10, interior)
    }

    #[test]
    fn test_path_hash_depends_on_every_field() {
        let path = to_native(&EUR, 3, vec![]);
        assert_eq!(path.path_hash(), generate_path_hash(&EUR, 3, &NATIVE, 10, &[]));
        assert_ne!(path.path_hash(), to_native(&EUR, 4, vec![]).path_hash());
        assert_ne!(path.path_hash(), to_native(&USD, 3, vec![]).path_hash());
        assert_ne!(path.path_hash(), to_native(&EUR, 3, vec![USD.clone()]).path_hash());
    }

    #[test]
    fn test_deserialize_recomputes_hash() -> eyre::Result<()> {
        let path = to_native(&EUR, 3, vec![USD.clone()]);
        let serialized = serde_json::to_value(&path)?;
        assert_eq!(serialized["path_hash"], serde_json::Value::String(path.path_hash().to_string()));

        let mut tampered = serialized.clone();
        tampered["path_hash"] = serde_json::Value::String(format!("0x{}", "00".repeat(32)));
        tampered["source_amount"] = serde_json::Value::from(4);
        let deserialized: Path = serde_json::from_value(tampered)?;

        assert_eq!(deserialized, to_native(&EUR, 4, vec![USD.clone()]));
        assert_eq!(deserialized.path_hash(), generate_path_hash(&EUR, 4, &NATIVE, 10, &[USD.clone()]));
        assert_eq!(serde_json::from_value::<Path>(serialized)?, path);
        Ok(())
    }

    #[test]
    fn test_duplicates_after_deserialize_are_dropped() -> eyre::Result<()> {
        let path = to_native(&EUR, 3, vec![]);
        let copy: Path = serde_json::from_str(&serde_json::to_string(&path)?)?;

        assert_eq!(sort_and_filter_paths(vec![path.clone(), copy], 5, SortBy::SourceAsset), vec![path]);
        Ok(())
    }

    #[test]
    fn test_sort_and_filter_by_source_asset() {
        let paths = vec![
            to_native(&EUR, 3, vec![]),
            to_native(&EUR, 4, vec![]),
            to_native(&USD, 1, vec![]),
            to_native(&EUR, 2, vec![]),
            to_native(&EUR, 2, vec![CHF.clone()]),
            to_native(&NATIVE, 10, vec![]),
        ];

        let filtered = sort_and_filter_paths(paths.clone(), 3, SortBy::SourceAsset);

        assert_eq!(filtered, vec![paths[3].clone(), paths[4].clone(), paths[0].clone(), paths[2].clone(), paths[5].clone()]);
    }

    #[test]
    fn test_sort_and_filter_by_destination_asset() {
        fn from_native(destination: &Asset, amount: i64) -> Path {
            Path::new(NATIVE.clone(), 10, destination.clone(), amount, vec![])
        }
        let paths = vec![
            from_native(&USD, 5),
            from_native(&EUR, 1),
            from_native(&USD, 7),
            from_native(&USD, 6),
            from_native(&EUR, 9),
        ];

        let filtered = sort_and_filter_paths(paths.clone(), 2, SortBy::DestinationAsset);

        assert_eq!(filtered, vec![paths[2].clone(), paths[3].clone(), paths[4].clone(), paths[1].clone()]);
    }

    #[test]
    fn test_sort_and_filter_drops_duplicates() {
        let path = to_native(&EUR, 3, vec![USD.clone()]);
        let filtered = sort_and_filter_paths(vec![path.clone(), path.clone()], 5, SortBy::SourceAsset);
        assert_eq!(filtered, vec![path]);
    }

    #[test]
    fn test_sort_and_filter_edge_cases() {
        assert!(sort_and_filter_paths(vec![], 3, SortBy::SourceAsset).is_empty());
        assert!(sort_and_filter_paths(vec![to_native(&EUR, 3, vec![])], 0, SortBy::SourceAsset).is_empty());
    }

    #[test]
    fn test_sort_by_parse() -> eyre::Result<()> {
        assert_eq!("source_asset".parse::<SortBy>()?, SortBy::SourceAsset);
        assert_eq!(SortBy::DestinationAsset.to_string(), "destination_asset");
        Ok(())
    }

    #[test]
    fn test_path_display() {
        let path = to_native(&EUR, 3, vec![USD.clone()]);
        assert_eq!(path.assets_count(), 3);
        assert!(!path.is_direct());
        assert_eq!(
            path.to_string(),
            "Path(3 credit_alphanum4/EUR/GISSUER -> [credit_alphanum4/USD/GISSUER] -> 10 native)"
        );
    }
}
