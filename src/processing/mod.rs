//! Subnet address-space processing.
//!
//! - [`partition`] - split a VPC block into per zone private/public subnets

mod partition;

// Re-export public functions
pub use partition::{partition, partition_block, PartitionError, PartitionResult};
