//! Lookup structure over the GC roots of one snapshot.
//!
//! Built once while roots are read and passed by reference to the
//! root-path resolver. It is never mutated while lookups are running, so
//! concurrent searches can share it without locking.

use super::schema::GcRoot;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct RootIndex {
    roots: Vec<GcRoot>,
    by_object: HashMap<u64, Vec<usize>>,
    by_address: HashMap<u64, usize>,
}

impl RootIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root. Roots holding nothing (object zero) are addressable
    /// but never match an object lookup.
    pub fn insert(&mut self, root: GcRoot) {
        let position = self.roots.len();

        if root.object_ref != 0 {
            self.by_object.entry(root.object_ref).or_default().push(position);
        }
        self.by_address.entry(root.address).or_insert(position);
        self.roots.push(root);
    }

    /// Roots that directly reference `obj`
    pub fn roots_of(&self, obj: u64) -> impl Iterator<Item = &GcRoot> + '_ {
        self.by_object
            .get(&obj)
            .into_iter()
            .flatten()
            .map(move |&position| &self.roots[position])
    }

    /// The root registered at `address`, if any
    pub fn root_at(&self, address: u64) -> Option<&GcRoot> {
        self.by_address.get(&address).map(|&position| &self.roots[position])
    }

    pub fn is_root_address(&self, address: u64) -> bool {
        self.by_address.contains_key(&address)
    }

    /// Every root that makes `obj` a search sink: roots keeping it alive,
    /// or a root living at that very address.
    pub fn roots_holding(&self, obj: u64) -> Vec<&GcRoot> {
        let mut holders: Vec<&GcRoot> = self.roots_of(obj).collect();

        if let Some(root) = self.root_at(obj) {
            if !holders.iter().any(|held| held.address == root.address) {
                holders.push(root);
            }
        }
        holders
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn roots(&self) -> &[GcRoot] {
        &self.roots
    }
}

impl FromIterator<GcRoot> for RootIndex {
    fn from_iter<I: IntoIterator<Item = GcRoot>>(iter: I) -> Self {
        let mut index = RootIndex::new();
        for root in iter {
            index.insert(root);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::schema::RootKind;

    fn root(address: u64, kind: RootKind, object_ref: u64) -> GcRoot {
        GcRoot {
            address,
            kind,
            name: None,
            object_ref,
            type_name: "T".to_string(),
        }
    }

    #[test]
    fn test_many_roots_for_one_object() {
        let index: RootIndex = vec![
            root(0x1, RootKind::LocalVar, 0x100),
            root(0x2, RootKind::Strong, 0x100),
            root(0x3, RootKind::StaticVar, 0x200),
        ]
        .into_iter()
        .collect();

        let addresses: Vec<u64> = index.roots_of(0x100).map(|r| r.address).collect();
        assert_eq!(addresses, vec![0x1, 0x2]);
        assert_eq!(index.roots_of(0x300).count(), 0);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_null_root_not_indexed_by_object() {
        let index: RootIndex = vec![root(0x1, RootKind::Weak, 0)].into_iter().collect();

        assert_eq!(index.roots_of(0).count(), 0);
        assert!(index.is_root_address(0x1));
    }

    #[test]
    fn test_roots_holding_includes_address_match() {
        let index: RootIndex = vec![
            root(0x500, RootKind::Pinning, 0x900),
            root(0x600, RootKind::Strong, 0x500),
        ]
        .into_iter()
        .collect();

        let holders: Vec<u64> = index.roots_holding(0x500).iter().map(|r| r.address).collect();
        assert_eq!(holders, vec![0x600, 0x500]);
        assert!(index.roots_holding(0x700).is_empty());
    }
}
