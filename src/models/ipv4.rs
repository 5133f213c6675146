//! IPv4 address block (CIDR) utilities.
//!
//! Provides [`AddressBlock`], an IPv4 network kept in canonical form, along
//! with the mask arithmetic the subnet partitioner is built on.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Errors raised by address parsing and block arithmetic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid CIDR literal '{input}': {reason}")]
    InvalidCidr { input: String, reason: String },

    #[error("prefix length /{0} is too long (max /32)")]
    PrefixTooLong(u8),

    #[error("block /{block} can only be cut into smaller blocks, not /{requested}")]
    InvalidCut { block: u8, requested: u8 },
}

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use vpc_subnet_distributor::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, AddressError> {
    if len > MAX_LENGTH {
        Err(AddressError::PrefixTooLong(len))
    } else {
        Ok(mask_bits(len))
    }
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, AddressError> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

/// Calculate the broadcast address for a given IP and prefix length.
pub fn broadcast_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, AddressError> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from((u32::from(addr) & mask) | !mask))
}

/// Number of addresses in a block of the given prefix length.
pub fn block_size(len: u8) -> Result<u64, AddressError> {
    if len > MAX_LENGTH {
        Err(AddressError::PrefixTooLong(len))
    } else {
        Ok(1u64 << (MAX_LENGTH - len))
    }
}

/// Number of usable host addresses once network and broadcast are taken.
///
/// Only defined for /30 and wider; /31 and /32 have no room for hosts
/// under standard subnet semantics.
pub fn usable_hosts(len: u8) -> Result<u64, AddressError> {
    if len > MAX_LENGTH - 2 {
        Err(AddressError::PrefixTooLong(len))
    } else {
        Ok(block_size(len)? - 2)
    }
}

fn mask_bits(len: u8) -> u32 {
    let right_len = MAX_LENGTH - len;
    let all_bits = u32::MAX as u64;
    ((all_bits >> right_len) << right_len) as u32
}

/// IPv4 network in canonical form: the host bits of `addr` are always zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressBlock {
    addr: Ipv4Addr,
    prefix: u8,
}

impl AddressBlock {
    /// Build a block from an address and prefix, clearing any host bits.
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<AddressBlock, AddressError> {
        let addr = cut_addr(addr, prefix)?;
        Ok(AddressBlock { addr, prefix })
    }

    /// Parse a dotted-quad CIDR literal such as `10.0.0.0/16`.
    ///
    /// A literal with host bits set (`10.0.0.5/16`) is normalized to its
    /// network address.
    pub fn parse(literal: &str) -> Result<AddressBlock, AddressError> {
        let input = literal.trim();
        let invalid = |reason: &str| AddressError::InvalidCidr {
            input: literal.to_string(),
            reason: reason.to_string(),
        };

        let (addr_str, prefix_str) = input
            .split_once('/')
            .ok_or_else(|| invalid("expected address/prefix"))?;
        let addr: Ipv4Addr = addr_str
            .parse()
            .map_err(|_| invalid(&format!("'{addr_str}' is not an IPv4 address")))?;
        if prefix_str.is_empty() || !prefix_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(&format!("'{prefix_str}' is not a prefix length")));
        }
        let prefix: u8 = prefix_str
            .parse()
            .map_err(|_| invalid(&format!("prefix '{prefix_str}' is out of range")))?;
        if prefix > MAX_LENGTH {
            return Err(invalid(&format!("prefix /{prefix} is longer than /32")));
        }

        let block = AddressBlock::new(addr, prefix)?;
        if block.addr != addr {
            log::warn!("{input} has host bits set, using {block}");
        }
        Ok(block)
    }

    /// The network (lowest) address.
    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    /// The prefix length (0-32).
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Get the lowest (network) address in the block.
    pub fn lo(&self) -> Ipv4Addr {
        self.addr
    }

    /// Get the highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) | !mask_bits(self.prefix))
    }

    /// Number of addresses covered by the block.
    pub fn size(&self) -> u64 {
        1u64 << (MAX_LENGTH - self.prefix)
    }

    /// Usable hosts, `None` for /31 and /32.
    pub fn usable_hosts(&self) -> Option<u64> {
        usable_hosts(self.prefix).ok()
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        u32::from(ip) & mask_bits(self.prefix) == u32::from(self.addr)
    }

    /// True when `other` lies entirely inside this block.
    pub fn contains_block(&self, other: &AddressBlock) -> bool {
        other.prefix >= self.prefix && self.contains(other.addr)
    }

    /// Canonical blocks are either nested or disjoint.
    pub fn overlaps(&self, other: &AddressBlock) -> bool {
        self.contains_block(other) || other.contains_block(self)
    }

    /// Split the block into equal `/len` tiles, in ascending address order.
    ///
    /// The iterator is lazy, a /0 cut into /30 tiles is never materialized.
    pub fn subdivide(
        &self,
        len: u8,
    ) -> Result<impl DoubleEndedIterator<Item = AddressBlock> + Clone, AddressError> {
        if len > MAX_LENGTH {
            return Err(AddressError::PrefixTooLong(len));
        }
        if len < self.prefix {
            return Err(AddressError::InvalidCut {
                block: self.prefix,
                requested: len,
            });
        }
        let base = u32::from(self.addr) as u64;
        let step = block_size(len)?;
        let count = 1u64 << (len - self.prefix);
        Ok((0..count).map(move |i| AddressBlock {
            addr: Ipv4Addr::from((base + i * step) as u32),
            prefix: len,
        }))
    }
}

impl FromStr for AddressBlock {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AddressBlock::parse(s)
    }
}

impl fmt::Display for AddressBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl Serialize for AddressBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AddressBlock {
    fn deserialize<D>(deserializer: D) -> Result<AddressBlock, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AddressBlock::parse(&s).map_err(de::Error::custom)
    }
}
