//! An engine that records the plan instead of calling a cloud API.

use super::engine::{CreatedResource, ResourceEngine, ResourceId, ResourceKind, ResourceRequest};
use super::ProvisionError;
use crate::models::Tags;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Account id used in dry-run ARNs.
const DRY_RUN_ACCOUNT: &str = "000000000000";

/// A resource as the dry-run engine recorded it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedResource {
    pub id: ResourceId,
    pub arn: String,
    pub name: String,
    pub kind: ResourceKind,
    pub parent: Option<ResourceId>,
    pub properties: Map<String, Value>,
    pub tags: Tags,
}

/// Records every request in order and hands out deterministic ids.
///
/// Ids are `{prefix}-{sequence:08x}`, so two runs over the same arguments
/// produce identical plans.
#[derive(Debug, Serialize)]
pub struct DryRunEngine {
    region: String,
    resources: Vec<PlannedResource>,
    #[serde(skip)]
    sequence: u32,
    #[serde(skip)]
    names: HashSet<String>,
    #[serde(skip)]
    issued: HashSet<ResourceId>,
}

impl DryRunEngine {
    pub fn new(region: impl Into<String>) -> DryRunEngine {
        DryRunEngine {
            region: region.into(),
            resources: Vec::new(),
            sequence: 0,
            names: HashSet::new(),
            issued: HashSet::new(),
        }
    }

    /// Recorded resources in creation order.
    pub fn resources(&self) -> &[PlannedResource] {
        &self.resources
    }

    pub fn find(&self, name: &str) -> Option<&PlannedResource> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &PlannedResource> {
        self.resources.iter().filter(move |r| r.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn next_id(&mut self, kind: ResourceKind) -> ResourceId {
        self.sequence += 1;
        let id = ResourceId::new(format!("{}-{:08x}", kind.id_prefix(), self.sequence));
        self.issued.insert(id.clone());
        id
    }

    fn arn(&self, kind: ResourceKind, id: &ResourceId) -> String {
        format!(
            "arn:aws:{service}:{region}:{DRY_RUN_ACCOUNT}:{kind}/{id}",
            service = kind.service(),
            region = self.region,
            kind = kind.arn_type(),
        )
    }
}

impl ResourceEngine for DryRunEngine {
    fn region(&self) -> &str {
        &self.region
    }

    fn create(&mut self, request: ResourceRequest) -> Result<CreatedResource, ProvisionError> {
        let reject = |reason: String| ProvisionError::Engine {
            resource: request.name.clone(),
            reason,
        };
        if self.names.contains(&request.name) {
            return Err(reject("a resource with this name is already planned".to_string()));
        }
        if let Some(parent) = &request.parent {
            if !self.issued.contains(parent) {
                return Err(reject(format!("unknown parent id {parent}")));
            }
        }

        let id = self.next_id(request.kind);
        let arn = self.arn(request.kind, &id);
        let mut outputs = Map::new();
        if request.kind == ResourceKind::Vpc {
            let route_table = self.next_id(ResourceKind::DefaultRouteTable);
            outputs.insert("default_route_table_id".to_string(), Value::from(&route_table));
        }

        log::debug!(
            "plan {kind} '{name}' -> {id}",
            kind = request.kind,
            name = request.name
        );
        self.names.insert(request.name.clone());
        self.resources.push(PlannedResource {
            id: id.clone(),
            arn: arn.clone(),
            name: request.name.clone(),
            kind: request.kind,
            parent: request.parent,
            properties: request.properties,
            tags: request.tags,
        });

        Ok(CreatedResource {
            name: request.name,
            id,
            arn,
            outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_and_arns() {
        let mut engine = DryRunEngine::new("eu-west-1");
        let vpc = engine
            .create(ResourceRequest::new(ResourceKind::Vpc, "net-vpc"))
            .unwrap();
        assert_eq!(vpc.id.as_str(), "vpc-00000001");
        assert_eq!(
            vpc.arn,
            "arn:aws:ec2:eu-west-1:000000000000:vpc/vpc-00000001"
        );
        assert_eq!(vpc.output("default_route_table_id").unwrap(), "rtb-00000002");

        let igw = engine
            .create(ResourceRequest::new(ResourceKind::InternetGateway, "net-igw").parent(&vpc.id))
            .unwrap();
        assert_eq!(igw.id.as_str(), "igw-00000003");
        assert_eq!(engine.len(), 2);
        assert_eq!(engine.find("net-igw").unwrap().parent, Some(vpc.id));
    }

    #[test]
    fn test_default_route_table_is_a_known_parent() {
        let mut engine = DryRunEngine::new("us-east-1");
        let vpc = engine
            .create(ResourceRequest::new(ResourceKind::Vpc, "net-vpc"))
            .unwrap();
        let rtb = ResourceId::new(vpc.output("default_route_table_id").unwrap());
        assert!(engine
            .create(ResourceRequest::new(ResourceKind::Route, "net-route").parent(&rtb))
            .is_ok());
    }

    #[test]
    fn test_rejects_duplicate_name() {
        let mut engine = DryRunEngine::new("us-east-1");
        engine
            .create(ResourceRequest::new(ResourceKind::Vpc, "net-vpc"))
            .unwrap();
        let err = engine
            .create(ResourceRequest::new(ResourceKind::Vpc, "net-vpc"))
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Engine { ref resource, .. } if resource == "net-vpc"));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_rejects_unknown_parent() {
        let mut engine = DryRunEngine::new("us-east-1");
        let err = engine
            .create(
                ResourceRequest::new(ResourceKind::Subnet, "net-private-1")
                    .parent(&ResourceId::new("vpc-deadbeef")),
            )
            .unwrap_err();
        assert!(err.to_string().contains("unknown parent id vpc-deadbeef"));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_plan_json() {
        let mut engine = DryRunEngine::new("us-east-1");
        engine
            .create(ResourceRequest::new(ResourceKind::Vpc, "net-vpc"))
            .unwrap();
        let json: Value = serde_json::from_str(&engine.to_json().unwrap()).unwrap();
        assert_eq!(json["region"], "us-east-1");
        assert_eq!(json["resources"][0]["kind"], "vpc");
        assert!(json.get("sequence").is_none());
    }
}
