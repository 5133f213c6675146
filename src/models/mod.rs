//! Domain models for the VPC subnet distributor.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`AddressBlock`] - canonical IPv4 CIDR block
//! - [`ZoneIndex`], [`SubnetRole`] and [`ZoneAllocation`] - per zone subnet keys
//! - [`Tags`] and [`merge_tags`] - resource tagging

mod ipv4;
mod tags;
mod zone;

// Re-export public types
pub use ipv4::{
    block_size, broadcast_addr, cut_addr, get_cidr_mask, usable_hosts,
    AddressBlock, AddressError, MAX_LENGTH,
};
pub use tags::{merge_tags, name_tag, Tags};
pub use zone::{SubnetRole, ZoneAllocation, ZoneIndex};
