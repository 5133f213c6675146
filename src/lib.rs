//! Subnet partitioning and VPC provisioning plans.
//!
//! [`partition`] splits a VPC address block into one private and one public
//! subnet per availability zone. [`Vpc::provision`] turns a [`VpcArgs`]
//! description into resources through a [`ResourceEngine`].

pub mod config;
pub mod models;
pub mod output;
pub mod processing;
pub mod provision;

use itertools::Itertools;
use std::error::Error;
use std::path::Path;

pub use models::{merge_tags, AddressBlock, Tags};
pub use processing::{partition, PartitionError, PartitionResult};
pub use provision::{DryRunEngine, ResourceEngine, Vpc, VpcArgs};

// return error if any two subnets overlap or one leaves the base block
pub fn check_for_overlapping_subnets(result: &PartitionResult) -> Result<(), Box<dyn Error>> {
    let base = result.base();
    for (zone, role, block) in result.blocks() {
        if !base.contains_block(&block) {
            return Err(format!("{role} subnet {block} of zone {zone} is outside {base}").into());
        }
    }
    if let Some((a, b)) = result
        .blocks()
        .tuple_combinations()
        .find(|((_, _, a), (_, _, b))| a.overlaps(b))
    {
        return Err(format!("Overlap found: {a:?} and {b:?}").into());
    }
    Ok(())
}

/// Load a VPC config file and plan it against a [`DryRunEngine`].
pub fn plan_vpc(
    name: &str,
    config_file: &Path,
    region: &str,
) -> Result<(Vpc, DryRunEngine), Box<dyn Error>> {
    let args = config::load_vpc_args(config_file)?;
    let mut engine = DryRunEngine::new(region);
    let vpc = Vpc::provision(&mut engine, name, args)?;
    check_for_overlapping_subnets(&vpc.partition)?;
    Ok((vpc, engine))
}
