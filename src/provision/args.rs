//! Arguments describing one VPC.

use super::ProvisionError;
use crate::models::Tags;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// Regex for a DNS zone name such as `corp.example.internal` (trailing dot allowed).
static ZONE_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_zone_name_regex() -> &'static Regex {
    ZONE_NAME_REGEX.get_or_init(|| {
        Regex::new(r"^(?i)([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)*[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.?$")
            .expect("Invalid Regex")
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VpcArgs {
    /// Address block of the whole VPC, e.g. `10.0.0.0/16`.
    pub base_cidr: String,
    /// Human readable prefix for every `Name` tag.
    pub description: String,
    /// Private DNS zone attached to the VPC through DHCP options.
    #[serde(default)]
    pub zone_name: Option<String>,
    /// One private and one public subnet is created per zone, in this order.
    pub availability_zone_names: Vec<String>,
    #[serde(default)]
    pub base_tags: Tags,
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub flow_logs: Option<FlowLogArgs>,
}

/// Gateway endpoints to attach to the VPC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Endpoints {
    #[serde(default)]
    pub s3: bool,
    #[serde(default)]
    pub dynamodb: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowLogArgs {
    pub traffic_type: TrafficType,
}

/// Which traffic a flow log captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrafficType {
    Accept,
    Reject,
    All,
}

impl TrafficType {
    pub fn as_str(self) -> &'static str {
        match self {
            TrafficType::Accept => "ACCEPT",
            TrafficType::Reject => "REJECT",
            TrafficType::All => "ALL",
        }
    }
}

impl fmt::Display for TrafficType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VpcArgs {
    /// Minimal arguments, no DNS zone, endpoints or flow logs.
    pub fn new(
        base_cidr: impl Into<String>,
        description: impl Into<String>,
        availability_zone_names: Vec<String>,
    ) -> VpcArgs {
        VpcArgs {
            base_cidr: base_cidr.into(),
            description: description.into(),
            zone_name: None,
            availability_zone_names,
            base_tags: Tags::new(),
            endpoints: Endpoints::default(),
            flow_logs: None,
        }
    }

    /// Check the arguments the partitioner does not look at.
    ///
    /// An empty zone list is left to the partitioner, which rejects it.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        let mut seen = HashSet::new();
        for name in &self.availability_zone_names {
            if name.trim().is_empty() {
                return Err(ProvisionError::InvalidArgs(
                    "availability zone names must not be blank".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(ProvisionError::InvalidArgs(format!(
                    "availability zone '{name}' is listed more than once"
                )));
            }
        }
        if let Some(zone) = &self.zone_name {
            if zone.len() > 253 || !get_zone_name_regex().is_match(zone) {
                return Err(ProvisionError::InvalidArgs(format!(
                    "'{zone}' is not a valid DNS zone name"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_validate_ok() {
        let mut args = VpcArgs::new("10.0.0.0/16", "dev", zones(&["us-east-1a", "us-east-1b"]));
        assert!(args.validate().is_ok());
        args.zone_name = Some("dev.example.internal.".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_zone() {
        let args = VpcArgs::new("10.0.0.0/16", "dev", zones(&["us-east-1a", "us-east-1a"]));
        let msg = args.validate().unwrap_err().to_string();
        assert!(msg.contains("listed more than once"), "{msg}");
    }

    #[test]
    fn test_validate_blank_zone() {
        let args = VpcArgs::new("10.0.0.0/16", "dev", zones(&["us-east-1a", " "]));
        assert!(matches!(args.validate(), Err(ProvisionError::InvalidArgs(_))));
    }

    #[test]
    fn test_validate_zone_name() {
        let mut args = VpcArgs::new("10.0.0.0/16", "dev", zones(&["us-east-1a"]));
        for bad in ["bad zone", "-lead.example", "a..b", ""] {
            args.zone_name = Some(bad.to_string());
            assert!(args.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_deserialize_defaults() {
        let args: VpcArgs = serde_json::from_str(
            r#"{"base_cidr":"10.0.0.0/16","description":"dev","availability_zone_names":["a"]}"#,
        )
        .unwrap();
        assert_eq!(args, VpcArgs::new("10.0.0.0/16", "dev", zones(&["a"])));
    }

    #[test]
    fn test_traffic_type_names() {
        let flow: FlowLogArgs = serde_json::from_str(r#"{"traffic_type":"REJECT"}"#).unwrap();
        assert_eq!(flow.traffic_type, TrafficType::Reject);
        assert_eq!(TrafficType::All.to_string(), "ALL");
        assert!(serde_json::from_str::<FlowLogArgs>(r#"{"traffic_type":"all"}"#).is_err());
    }
}
