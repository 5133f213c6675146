//! Availability zone keys and the per-zone subnet pair.

use super::AddressBlock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an availability zone in the caller's zone list, `0..zone_count`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ZoneIndex(usize);

impl ZoneIndex {
    pub fn new(index: usize) -> ZoneIndex {
        ZoneIndex(index)
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// 1-based number used in resource names (`-private-1`, `-nat-2`, ...).
    pub fn ordinal(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for ZoneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a subnet routes out through a NAT gateway or the internet gateway.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubnetRole {
    Private,
    Public,
}

impl SubnetRole {
    pub const ALL: [SubnetRole; 2] = [SubnetRole::Private, SubnetRole::Public];

    /// Offset of the role's tile inside its zone pair.
    pub fn tile_offset(self) -> usize {
        match self {
            SubnetRole::Private => 0,
            SubnetRole::Public => 1,
        }
    }

    /// Lowercase form used in resource names.
    pub fn slug(self) -> &'static str {
        match self {
            SubnetRole::Private => "private",
            SubnetRole::Public => "public",
        }
    }
}

impl fmt::Display for SubnetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetRole::Private => write!(f, "Private"),
            SubnetRole::Public => write!(f, "Public"),
        }
    }
}

/// The private and public block assigned to one zone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneAllocation {
    pub zone: ZoneIndex,
    pub private: AddressBlock,
    pub public: AddressBlock,
}

impl ZoneAllocation {
    pub fn block(&self, role: SubnetRole) -> AddressBlock {
        match role {
            SubnetRole::Private => self.private,
            SubnetRole::Public => self.public,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_index_ordinal() {
        let zone = ZoneIndex::new(0);
        assert_eq!(zone.get(), 0);
        assert_eq!(zone.ordinal(), 1);
        assert_eq!(zone.to_string(), "0");
    }

    #[test]
    fn test_role_names() {
        assert_eq!(SubnetRole::Private.slug(), "private");
        assert_eq!(SubnetRole::Public.to_string(), "Public");
        assert!(SubnetRole::Private.tile_offset() < SubnetRole::Public.tile_offset());
        assert_eq!(
            serde_json::to_string(&SubnetRole::Public).unwrap(),
            "\"public\""
        );
    }

    #[test]
    fn test_allocation_block_by_role() {
        let alloc = ZoneAllocation {
            zone: ZoneIndex::new(1),
            private: AddressBlock::parse("10.0.128.0/18").unwrap(),
            public: AddressBlock::parse("10.0.192.0/18").unwrap(),
        };
        assert_eq!(alloc.block(SubnetRole::Private), alloc.private);
        assert_eq!(alloc.block(SubnetRole::Public).to_string(), "10.0.192.0/18");
    }
}
