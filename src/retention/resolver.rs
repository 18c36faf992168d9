//! Bounded search for the GC root that keeps an object alive.
//!
//! Starting at an object, the resolver follows outgoing references until it
//! reaches an object held by a known root. Heaps contain millions of nodes
//! and arbitrary cycles, so the search keeps an explicit frontier (never
//! the call stack), marks every reference it has considered, and gives up
//! after a fixed number of expansions.
//!
//! # Algorithm
//! 1. Pop a node; skip it if already considered, otherwise mark it
//! 2. If a root holds the node, stop: roots are sinks, never traversed
//! 3. Resolve the node's type; drop the branch if it is unresolvable
//! 4. Count the expansion; abort with `BudgetExceeded` at the cap
//! 5. Push every unconsidered child reference
//!
//! Breadth-first order (the default) returns a shortest reference chain.
//! Depth-first order returns whichever root the walk meets first.

use crate::heap::root_index::RootIndex;
use crate::heap::schema::{GcRoot, PathNode, RootPathStatus};
use crate::snapshot::SnapshotProvider;
use crate::utils::config::MAX_ROOT_PATH_STEPS;
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};

/// Frontier discipline of the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOrder {
    #[default]
    BreadthFirst,
    DepthFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Expansions allowed before the search is abandoned
    pub max_steps: usize,
    pub order: SearchOrder,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_steps: MAX_ROOT_PATH_STEPS,
            order: SearchOrder::default(),
        }
    }
}

/// A chain of references from an object to a rooted object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPath {
    /// Roots holding the last object of `chain`
    pub roots: Vec<GcRoot>,

    /// Starting object first, rooted object last
    pub chain: Vec<PathNode>,

    /// Expansions spent finding it
    pub steps: usize,
}

impl RootPath {
    /// Object the roots keep alive
    pub fn held_object(&self) -> u64 {
        self.chain.last().map(|node| node.obj_ref).unwrap_or(0)
    }

    /// Number of references followed from the starting object
    pub fn hops(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }

    /// Nodes strictly between the starting object and the rooted object
    pub fn intermediate(&self) -> &[PathNode] {
        if self.chain.len() <= 2 {
            &[]
        } else {
            &self.chain[1..self.chain.len() - 1]
        }
    }

    pub fn root_addresses(&self) -> Vec<u64> {
        self.roots.iter().map(|root| root.address).collect()
    }
}

/// Result of a root-path search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootPathOutcome {
    Found(RootPath),

    /// Graph exhausted within budget without meeting a root
    Unreachable { steps: usize },

    /// Search abandoned at the step cap; reachability is unknown
    BudgetExceeded { steps: usize },
}

impl RootPathOutcome {
    pub fn status(&self) -> RootPathStatus {
        match self {
            RootPathOutcome::Found(_) => RootPathStatus::Found,
            RootPathOutcome::Unreachable { .. } => RootPathStatus::Unreachable,
            RootPathOutcome::BudgetExceeded { .. } => RootPathStatus::BudgetExceeded,
        }
    }

    pub fn path(&self) -> Option<&RootPath> {
        match self {
            RootPathOutcome::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// Pending node and the node it was reached from
type Entry = (u64, Option<u64>);

enum Frontier {
    Stack(Vec<Entry>),
    Queue(VecDeque<Entry>),
}

impl Frontier {
    fn new(order: SearchOrder) -> Self {
        match order {
            SearchOrder::BreadthFirst => Frontier::Queue(VecDeque::new()),
            SearchOrder::DepthFirst => Frontier::Stack(Vec::new()),
        }
    }

    fn push(&mut self, entry: Entry) {
        match self {
            Frontier::Stack(stack) => stack.push(entry),
            Frontier::Queue(queue) => queue.push_back(entry),
        }
    }

    fn pop(&mut self) -> Option<Entry> {
        match self {
            Frontier::Stack(stack) => stack.pop(),
            Frontier::Queue(queue) => queue.pop_front(),
        }
    }
}

/// Resolves retention paths against one snapshot and its root index
pub struct RootPathResolver<'a, P: SnapshotProvider> {
    provider: &'a P,
    index: &'a RootIndex,
    config: ResolverConfig,
}

impl<'a, P: SnapshotProvider> RootPathResolver<'a, P> {
    pub fn new(provider: &'a P, index: &'a RootIndex) -> Self {
        Self::with_config(provider, index, ResolverConfig::default())
    }

    pub fn with_config(provider: &'a P, index: &'a RootIndex, config: ResolverConfig) -> Self {
        Self {
            provider,
            index,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Find the root keeping `start` alive
    pub fn resolve(&self, start: u64) -> RootPathOutcome {
        let mut frontier = Frontier::new(self.config.order);
        let mut considered: HashSet<u64> = HashSet::new();
        let mut parents: HashMap<u64, u64> = HashMap::new();
        let mut type_names: HashMap<u64, String> = HashMap::new();
        let mut steps = 0usize;

        frontier.push((start, None));

        while let Some((obj, parent)) = frontier.pop() {
            if !considered.insert(obj) {
                continue;
            }
            if let Some(parent) = parent {
                parents.insert(obj, parent);
            }

            let holders = self.index.roots_holding(obj);
            if !holders.is_empty() {
                let path = self.build_path(obj, holders, &parents, &type_names, steps);
                debug!(
                    "Object {:#x} reaches root {:#x} in {} hops ({} steps)",
                    start,
                    path.roots[0].address,
                    path.hops(),
                    steps
                );
                return RootPathOutcome::Found(path);
            }

            let Some(clr_type) = self.provider.object_type(obj) else {
                debug!("Dropping branch at {:#x}: unresolvable type", obj);
                continue;
            };

            steps += 1;
            if steps >= self.config.max_steps {
                warn!(
                    "Root path search for {:#x} exceeded {} steps, giving up",
                    start, self.config.max_steps
                );
                return RootPathOutcome::BudgetExceeded { steps };
            }

            type_names.insert(obj, clr_type.name);

            self.provider.enumerate_references(obj, &mut |child| {
                if child != 0 && !considered.contains(&child) {
                    frontier.push((child, Some(obj)));
                }
            });
        }

        debug!("Object {:#x} is unreachable from known roots ({} steps)", start, steps);
        RootPathOutcome::Unreachable { steps }
    }

    /// Walk parent links back from the rooted object to the start
    fn build_path(
        &self,
        held: u64,
        holders: Vec<&GcRoot>,
        parents: &HashMap<u64, u64>,
        type_names: &HashMap<u64, String>,
        steps: usize,
    ) -> RootPath {
        let held_type = self
            .provider
            .object_type(held)
            .map(|clr_type| clr_type.name)
            .unwrap_or_else(|| holders[0].type_name.clone());

        let mut chain = vec![PathNode {
            obj_ref: held,
            type_name: held_type,
        }];

        let mut current = held;
        while let Some(&parent) = parents.get(&current) {
            chain.push(PathNode {
                obj_ref: parent,
                type_name: type_names.get(&parent).cloned().unwrap_or_default(),
            });
            current = parent;
        }
        chain.reverse();

        RootPath {
            roots: holders.into_iter().cloned().collect(),
            chain,
            steps,
        }
    }
}

impl<'a, P: SnapshotProvider + Sync> RootPathResolver<'a, P> {
    /// Resolve independent objects in parallel.
    ///
    /// Each search owns its frontier and considered set; only the index
    /// and the snapshot are shared, and both are read-only.
    pub fn resolve_many(&self, objects: &[u64]) -> Vec<(u64, RootPathOutcome)> {
        objects
            .par_iter()
            .map(|&obj| (obj, self.resolve(obj)))
            .collect()
    }
}
