//! The seam to the declarative infrastructure engine.
//!
//! The pipeline never talks to a cloud API itself: it hands each
//! [`ResourceRequest`] to a [`ResourceEngine`] and keeps the returned
//! identifiers to wire up later resources.

use super::ProvisionError;
use crate::models::Tags;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Kinds of resource the VPC pipeline creates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Vpc,
    InternetGateway,
    PrivateZone,
    DhcpOptions,
    DhcpOptionsAssociation,
    Subnet,
    DefaultRouteTable,
    RouteTable,
    Route,
    RouteTableAssociation,
    ElasticIp,
    NatGateway,
    VpcEndpoint,
    IamRole,
    RolePolicy,
    LogGroup,
    FlowLog,
}

impl ResourceKind {
    /// Prefix of identifiers of this kind, as the cloud provider issues them.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ResourceKind::Vpc => "vpc",
            ResourceKind::InternetGateway => "igw",
            ResourceKind::PrivateZone => "Z",
            ResourceKind::DhcpOptions => "dopt",
            ResourceKind::DhcpOptionsAssociation => "dopt-assoc",
            ResourceKind::Subnet => "subnet",
            ResourceKind::DefaultRouteTable | ResourceKind::RouteTable => "rtb",
            ResourceKind::Route => "r",
            ResourceKind::RouteTableAssociation => "rtbassoc",
            ResourceKind::ElasticIp => "eipalloc",
            ResourceKind::NatGateway => "nat",
            ResourceKind::VpcEndpoint => "vpce",
            ResourceKind::IamRole => "AROA",
            ResourceKind::RolePolicy => "policy",
            ResourceKind::LogGroup => "lg",
            ResourceKind::FlowLog => "fl",
        }
    }

    /// Service namespace used in the resource ARN.
    pub fn service(self) -> &'static str {
        match self {
            ResourceKind::PrivateZone => "route53",
            ResourceKind::IamRole | ResourceKind::RolePolicy => "iam",
            ResourceKind::LogGroup => "logs",
            _ => "ec2",
        }
    }

    /// Resource type segment of the ARN.
    pub fn arn_type(self) -> &'static str {
        match self {
            ResourceKind::Vpc => "vpc",
            ResourceKind::InternetGateway => "internet-gateway",
            ResourceKind::PrivateZone => "hostedzone",
            ResourceKind::DhcpOptions => "dhcp-options",
            ResourceKind::DhcpOptionsAssociation => "dhcp-options-association",
            ResourceKind::Subnet => "subnet",
            ResourceKind::DefaultRouteTable | ResourceKind::RouteTable => "route-table",
            ResourceKind::Route => "route",
            ResourceKind::RouteTableAssociation => "route-table-association",
            ResourceKind::ElasticIp => "elastic-ip",
            ResourceKind::NatGateway => "natgateway",
            ResourceKind::VpcEndpoint => "vpc-endpoint",
            ResourceKind::IamRole => "role",
            ResourceKind::RolePolicy => "policy",
            ResourceKind::LogGroup => "log-group",
            ResourceKind::FlowLog => "vpc-flow-log",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.arn_type())
    }
}

/// Identifier issued by the engine for a created resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> ResourceId {
        ResourceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&ResourceId> for Value {
    fn from(id: &ResourceId) -> Self {
        Value::String(id.0.clone())
    }
}

/// One named resource the engine should create.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRequest {
    pub name: String,
    pub kind: ResourceKind,
    pub parent: Option<ResourceId>,
    pub properties: Map<String, Value>,
    pub tags: Tags,
}

impl ResourceRequest {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> ResourceRequest {
        ResourceRequest {
            name: name.into(),
            kind,
            parent: None,
            properties: Map::new(),
            tags: Tags::new(),
        }
    }

    pub fn parent(mut self, parent: &ResourceId) -> ResourceRequest {
        self.parent = Some(parent.clone());
        self
    }

    pub fn property(mut self, key: &str, value: impl Into<Value>) -> ResourceRequest {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn tags(mut self, tags: Tags) -> ResourceRequest {
        self.tags = tags;
        self
    }
}

/// What the engine reports back once a resource exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedResource {
    pub name: String,
    pub id: ResourceId,
    pub arn: String,
    /// Extra outputs, e.g. the default route table of a VPC.
    pub outputs: Map<String, Value>,
}

impl CreatedResource {
    /// A string output the engine must have reported.
    pub fn output(&self, key: &str) -> Result<&str, ProvisionError> {
        self.outputs
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| ProvisionError::MissingOutput {
                resource: self.name.clone(),
                output: key.to_string(),
            })
    }
}

/// A declarative infrastructure engine that creates one resource per call.
///
/// Implementations own authentication, diffing and retries. An error aborts
/// the whole provisioning run.
pub trait ResourceEngine {
    /// Region the engine provisions into, e.g. `us-east-1`.
    fn region(&self) -> &str;

    fn create(&mut self, request: ResourceRequest) -> Result<CreatedResource, ProvisionError>;
}
