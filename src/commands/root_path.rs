//! Root-path command: explain why specific objects are still alive.

use super::models::RootPathArgs;
use crate::heap::build_root_index;
use crate::retention::{ResolverConfig, RootPathOutcome, RootPathResolver};
use crate::snapshot::{parse_address, JsonSnapshot};
use anyhow::{Context, Result};
use log::{debug, info};

/// Execute the root-path command
///
/// **Public** - main entry point called from main.rs
///
/// Resolves every requested object independently and prints one report
/// per object, in the order they were given.
pub fn execute_root_path(args: RootPathArgs) -> Result<Vec<(u64, RootPathOutcome)>> {
    if args.objects.is_empty() {
        anyhow::bail!("At least one object address is required");
    }

    let objects = args
        .objects
        .iter()
        .map(|value| parse_address(value))
        .collect::<Result<Vec<u64>, _>>()
        .context("Invalid object address")?;

    info!("Loading heap snapshot: {}", args.dump.display());
    let snapshot = JsonSnapshot::load(&args.dump)
        .with_context(|| format!("Failed to load snapshot {}", args.dump.display()))?;

    let index = build_root_index(&snapshot);
    debug!("Indexed {} roots", index.len());

    let mut config = ResolverConfig {
        order: args.order,
        ..Default::default()
    };
    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }

    let resolver = RootPathResolver::with_config(&snapshot, &index, config);
    let results = resolver.resolve_many(&objects);

    for (obj, outcome) in &results {
        println!("{}", format_outcome(*obj, outcome));
    }

    Ok(results)
}

/// Render one search result, root first, as a debugger would show it
pub fn format_outcome(obj: u64, outcome: &RootPathOutcome) -> String {
    match outcome {
        RootPathOutcome::Found(path) => {
            let mut out = format!("{:#x}: rooted ({} steps)\n", obj, path.steps);
            for root in &path.roots {
                out.push_str(&format!("  {}\n", root));
            }
            for (depth, node) in path.chain.iter().rev().enumerate() {
                out.push_str(&format!(
                    "  {}-> {:#x} {}\n",
                    "  ".repeat(depth),
                    node.obj_ref,
                    node.type_name
                ));
            }
            out.trim_end().to_string()
        }
        RootPathOutcome::Unreachable { steps } => {
            format!("{:#x}: no path to a root ({} steps)", obj, steps)
        }
        RootPathOutcome::BudgetExceeded { steps } => {
            format!("{:#x}: search abandoned after {} steps", obj, steps)
        }
    }
}
