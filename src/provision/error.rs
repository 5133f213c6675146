//! Errors for the provisioning pipeline.

use crate::processing::PartitionError;
use thiserror::Error;

/// Anything that stops a provisioning run. The run is aborted on the first one.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("subnet partition failed: {0}")]
    Partition(#[from] PartitionError),

    #[error("invalid VPC arguments: {0}")]
    InvalidArgs(String),

    #[error("engine failed to create '{resource}': {reason}")]
    Engine { resource: String, reason: String },

    #[error("resource '{resource}' did not report output '{output}'")]
    MissingOutput { resource: String, output: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for provisioning operations
pub type ProvisionResult<T> = Result<T, ProvisionError>;
