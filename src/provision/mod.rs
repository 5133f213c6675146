//! Provisioning of the VPC topology.
//!
//! - [`engine`] - the [`ResourceEngine`] seam and resource requests
//! - [`dry_run`] - an engine that records a plan
//! - [`args`] - [`VpcArgs`] describing one VPC
//! - [`vpc`] - the provisioning pipeline
//! - [`flow_logs`] - optional flow logging

mod args;
mod dry_run;
mod engine;
mod error;
mod flow_logs;
mod vpc;

pub use args::{Endpoints, FlowLogArgs, TrafficType, VpcArgs};
pub use dry_run::{DryRunEngine, PlannedResource};
pub use engine::{CreatedResource, ResourceEngine, ResourceId, ResourceKind, ResourceRequest};
pub use error::{ProvisionError, ProvisionResult};
pub use vpc::{Vpc, ZoneSubnet};
