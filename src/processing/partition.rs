//! Subnet partitioning of a VPC address block across availability zones.
//!
//! The base block is cut into `2^n` equal tiles, the smallest power of two
//! that holds one private and one public subnet per zone. Zone `i` gets
//! tile `2i` as its private subnet and tile `2i + 1` as its public subnet.
//! Tiles past `2 * zone_count` stay unallocated.
//!
//! Adding a zone keeps every existing zone's blocks as long as the tile
//! count does not have to double (3 -> 4 zones keeps them, 2 -> 3 zones
//! halves the tile size and moves every block).

use crate::config::MAX_SUBNET_PREFIX;
use crate::models::{AddressBlock, AddressError, SubnetRole, ZoneAllocation, ZoneIndex};
use serde::Serialize;
use thiserror::Error;

/// Why a partition could not be computed. None of these are retryable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartitionError {
    #[error("invalid base block: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("zone count must be a positive integer, got {zone_count}")]
    InvalidArgument { zone_count: usize },

    #[error(
        "{base} cannot hold {subnets_needed} subnets for {zone_count} zone(s): \
         they would need /{required_prefix} blocks but /{max_prefix} is the smallest allowed \
         ({available_addresses} addresses available)"
    )]
    Capacity {
        zone_count: usize,
        subnets_needed: u64,
        base: AddressBlock,
        required_prefix: u32,
        max_prefix: u8,
        available_addresses: u64,
    },
}

/// Private and public blocks for each zone, aligned by [`ZoneIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionResult {
    base: AddressBlock,
    subnet_prefix: u8,
    private: Vec<AddressBlock>,
    public: Vec<AddressBlock>,
    reserved_tiles: u64,
}

impl PartitionResult {
    pub fn base(&self) -> AddressBlock {
        self.base
    }

    /// Prefix length shared by every returned block.
    pub fn subnet_prefix(&self) -> u8 {
        self.subnet_prefix
    }

    pub fn private(&self) -> &[AddressBlock] {
        &self.private
    }

    pub fn public(&self) -> &[AddressBlock] {
        &self.public
    }

    /// Tiles left over after rounding up to a power of two.
    pub fn reserved_tiles(&self) -> u64 {
        self.reserved_tiles
    }

    pub fn zone_count(&self) -> usize {
        self.private.len()
    }

    pub fn zone(&self, zone: ZoneIndex) -> Option<ZoneAllocation> {
        let private = *self.private.get(zone.get())?;
        let public = *self.public.get(zone.get())?;
        Some(ZoneAllocation {
            zone,
            private,
            public,
        })
    }

    pub fn zones(&self) -> impl Iterator<Item = ZoneAllocation> + Clone + '_ {
        self.private
            .iter()
            .zip(&self.public)
            .enumerate()
            .map(|(i, (private, public))| ZoneAllocation {
                zone: ZoneIndex::new(i),
                private: *private,
                public: *public,
            })
    }

    /// Every block with its zone and role, in address order.
    pub fn blocks(
        &self,
    ) -> impl Iterator<Item = (ZoneIndex, SubnetRole, AddressBlock)> + Clone + '_ {
        self.zones().flat_map(|alloc| {
            SubnetRole::ALL
                .into_iter()
                .map(move |role| (alloc.zone, role, alloc.block(role)))
        })
    }
}

/// Partition `base_cidr` into one private and one public block per zone.
///
/// # Examples
/// ```
/// use vpc_subnet_distributor::partition;
///
/// let result = partition("192.168.0.0/24", 1).unwrap();
/// assert_eq!(result.private()[0].to_string(), "192.168.0.0/25");
/// assert_eq!(result.public()[0].to_string(), "192.168.0.128/25");
/// ```
pub fn partition(base_cidr: &str, zone_count: usize) -> Result<PartitionResult, PartitionError> {
    let base = AddressBlock::parse(base_cidr)?;
    partition_block(base, zone_count)
}

/// Same as [`partition`] for an already parsed block.
pub fn partition_block(
    base: AddressBlock,
    zone_count: usize,
) -> Result<PartitionResult, PartitionError> {
    if zone_count == 0 {
        return Err(PartitionError::InvalidArgument { zone_count });
    }

    let subnets_needed = (zone_count as u64).checked_mul(2).unwrap_or(u64::MAX);
    let extra_bits = subnets_needed
        .checked_next_power_of_two()
        .map(u64::trailing_zeros)
        .unwrap_or(u64::BITS);
    let required_prefix = u32::from(base.prefix()) + extra_bits;

    if required_prefix > u32::from(MAX_SUBNET_PREFIX) {
        log::debug!(
            "partition({base}, {zone_count}) rejected: needs /{required_prefix} > /{MAX_SUBNET_PREFIX}"
        );
        return Err(PartitionError::Capacity {
            zone_count,
            subnets_needed,
            base,
            required_prefix,
            max_prefix: MAX_SUBNET_PREFIX,
            available_addresses: base.size(),
        });
    }

    // Bounded by MAX_SUBNET_PREFIX above.
    let subnet_prefix = required_prefix as u8;
    let tile_count = 1u64 << extra_bits;

    let tiles: Vec<AddressBlock> = base
        .subdivide(subnet_prefix)?
        .take(zone_count * SubnetRole::ALL.len())
        .collect();
    let tile_for = |zone: usize, role: SubnetRole| {
        tiles[zone * SubnetRole::ALL.len() + role.tile_offset()]
    };
    let private = (0..zone_count)
        .map(|zone| tile_for(zone, SubnetRole::Private))
        .collect();
    let public = (0..zone_count)
        .map(|zone| tile_for(zone, SubnetRole::Public))
        .collect();

    log::debug!(
        "partition({base}, {zone_count}) -> {tile_count} x /{subnet_prefix}, {} reserved",
        tile_count - subnets_needed
    );

    Ok(PartitionResult {
        base,
        subnet_prefix,
        private,
        public,
        reserved_tiles: tile_count - subnets_needed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn blocks(cidrs: &[&str]) -> Vec<AddressBlock> {
        cidrs
            .iter()
            .map(|c| AddressBlock::parse(c).unwrap())
            .collect()
    }

    fn assert_well_formed(result: &PartitionResult) {
        let all: Vec<AddressBlock> = result.blocks().map(|(_, _, b)| b).collect();
        assert_eq!(all.len(), result.zone_count() * 2);
        for b in &all {
            assert!(result.base().contains_block(b), "{b} outside {}", result.base());
            assert_ne!(*b, result.base(), "{b} is not a strict subset");
        }
        for (a, b) in all.iter().tuple_combinations() {
            assert!(!a.overlaps(b), "{a} overlaps {b}");
        }
    }

    #[test]
    fn test_two_zones_in_slash_16() {
        let result = partition("10.0.0.0/16", 2).unwrap();
        assert_eq!(result.subnet_prefix(), 18);
        assert_eq!(result.private(), blocks(&["10.0.0.0/18", "10.0.128.0/18"]));
        assert_eq!(result.public(), blocks(&["10.0.64.0/18", "10.0.192.0/18"]));
        assert_eq!(result.reserved_tiles(), 0);
        assert_well_formed(&result);
    }

    #[test]
    fn test_one_zone_in_slash_24() {
        let result = partition("192.168.0.0/24", 1).unwrap();
        assert_eq!(result.private(), blocks(&["192.168.0.0/25"]));
        assert_eq!(result.public(), blocks(&["192.168.0.128/25"]));
    }

    #[test]
    fn test_three_zones_reserve_two_tiles() {
        let result = partition("10.0.0.0/16", 3).unwrap();
        assert_eq!(result.subnet_prefix(), 19);
        assert_eq!(
            result.private(),
            blocks(&["10.0.0.0/19", "10.0.64.0/19", "10.0.128.0/19"])
        );
        assert_eq!(
            result.public(),
            blocks(&["10.0.32.0/19", "10.0.96.0/19", "10.0.160.0/19"])
        );
        assert_eq!(result.reserved_tiles(), 2);
        assert_well_formed(&result);
    }

    #[test]
    fn test_capacity_boundary() {
        let err = partition("10.0.0.0/24", 64).unwrap_err();
        match err {
            PartitionError::Capacity {
                zone_count,
                subnets_needed,
                required_prefix,
                max_prefix,
                available_addresses,
                base,
            } => {
                assert_eq!(zone_count, 64);
                assert_eq!(subnets_needed, 128);
                assert_eq!(required_prefix, 31);
                assert_eq!(max_prefix, 30);
                assert_eq!(available_addresses, 256);
                assert_eq!(base.to_string(), "10.0.0.0/24");
            }
            other => panic!("expected capacity error, got {other:?}"),
        }
        // 32 zones fit exactly into /30 tiles
        let result = partition("10.0.0.0/24", 32).unwrap();
        assert_eq!(result.subnet_prefix(), 30);
        assert_well_formed(&result);
    }

    #[test]
    fn test_capacity_error_message() {
        let msg = partition("10.0.0.0/29", 2).unwrap_err().to_string();
        assert!(msg.contains("10.0.0.0/29"), "{msg}");
        assert!(msg.contains("2 zone(s)"), "{msg}");
        assert!(msg.contains("/31"), "{msg}");
    }

    #[test]
    fn test_huge_zone_count_is_capacity_error() {
        assert!(matches!(
            partition("0.0.0.0/0", usize::MAX),
            Err(PartitionError::Capacity { .. })
        ));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            partition("not-a-cidr", 2),
            Err(PartitionError::InvalidAddress(_))
        ));
        assert_eq!(
            partition("10.0.0.0/16", 0),
            Err(PartitionError::InvalidArgument { zone_count: 0 })
        );
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            partition("172.16.0.0/12", 5).unwrap(),
            partition("172.16.0.0/12", 5).unwrap()
        );
    }

    #[test]
    fn test_growth_within_threshold_is_stable() {
        let three = partition("10.0.0.0/16", 3).unwrap();
        let four = partition("10.0.0.0/16", 4).unwrap();
        for alloc in three.zones() {
            assert_eq!(four.zone(alloc.zone), Some(alloc));
        }
    }

    #[test]
    fn test_growth_across_threshold_moves_blocks() {
        let two = partition("10.0.0.0/16", 2).unwrap();
        let three = partition("10.0.0.0/16", 3).unwrap();
        assert_ne!(two.zone(ZoneIndex::new(1)), three.zone(ZoneIndex::new(1)));
    }

    #[test]
    fn test_well_formed_across_sizes() {
        for base in ["10.0.0.0/8", "10.20.0.0/16", "192.168.4.0/22", "0.0.0.0/0"] {
            for zones in 1..=9 {
                assert_well_formed(&partition(base, zones).unwrap());
            }
        }
    }

    #[test]
    fn test_zones_are_index_aligned() {
        let result = partition("10.0.0.0/16", 4).unwrap();
        for (i, alloc) in result.zones().enumerate() {
            assert_eq!(alloc.zone.get(), i);
            assert_eq!(alloc.private, result.private()[i]);
            assert_eq!(alloc.public, result.public()[i]);
            assert!(alloc.private < alloc.public);
        }
        assert_eq!(result.zone(ZoneIndex::new(4)), None);
    }

    #[test]
    fn test_role_picks_tile_within_zone_pair() {
        let base = AddressBlock::parse("10.0.0.0/16").unwrap();
        let result = partition_block(base, 3).unwrap();
        let tiles: Vec<AddressBlock> = base.subdivide(result.subnet_prefix()).unwrap().collect();
        for (zone, role, block) in result.blocks() {
            assert_eq!(block, tiles[zone.get() * 2 + role.tile_offset()]);
        }
        assert_eq!(result.public()[2].to_string(), "10.0.160.0/19");
    }
}
