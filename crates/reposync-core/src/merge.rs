use std::collections::BTreeMap;

use tracing::debug;

use crate::ResolvedPackage;

/// The packages a channel should contain, keyed by file name.
#[derive(Debug, Default)]
pub struct DesiredSet {
    packages: BTreeMap<String, ResolvedPackage>,
}

impl DesiredSet {
    /// Merges source groups in priority order: when two groups provide the same
    /// file name, the later group's URL wins.
    pub fn merge<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = Vec<ResolvedPackage>>,
    {
        let mut set = Self::default();
        for package in groups.into_iter().flatten() {
            set.insert(package);
        }
        set
    }

    /// Forge packages first, then direct URLs so they can override a forge asset.
    pub fn from_sources(forge: Vec<ResolvedPackage>, direct: Vec<ResolvedPackage>) -> Self {
        Self::merge([forge, direct])
    }

    pub fn insert(&mut self, package: ResolvedPackage) -> Option<ResolvedPackage> {
        let previous = self.packages.insert(package.filename.clone(), package);
        if let Some(prev) = &previous {
            debug!(
                "{} from {} overrides {}",
                prev.filename, self.packages[&prev.filename].url, prev.url
            );
        }
        previous
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.packages.contains_key(filename)
    }

    pub fn get(&self, filename: &str) -> Option<&ResolvedPackage> {
        self.packages.get(filename)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages in file name order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedPackage> {
        self.packages.values()
    }
}
