//! The VPC provisioning pipeline.
//!
//! Each step creates one group of resources and returns the ids later
//! steps need. The first failing step aborts the run; the subnet partition
//! is computed before anything is created.

use super::engine::{CreatedResource, ResourceEngine, ResourceId, ResourceKind, ResourceRequest};
use super::{ProvisionResult, VpcArgs};
use crate::models::{merge_tags, name_tag, AddressBlock, SubnetRole, Tags, ZoneIndex};
use crate::processing::{partition, PartitionResult};
use serde::Serialize;

/// Destination of every default route.
const DEFAULT_ROUTE: &str = "0.0.0.0/0";

/// A subnet created for one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneSubnet {
    pub zone: ZoneIndex,
    pub role: SubnetRole,
    pub availability_zone: String,
    pub cidr: AddressBlock,
    pub id: ResourceId,
}

/// A provisioned VPC and the identifiers of everything inside it.
#[derive(Debug, Clone, Serialize)]
pub struct Vpc {
    pub name: String,
    pub id: ResourceId,
    pub arn: String,
    pub cidr: AddressBlock,
    pub args: VpcArgs,
    pub partition: PartitionResult,
    pub internet_gateway: ResourceId,
    pub private_zone: Option<ResourceId>,
    pub public_route_table: ResourceId,
    pub private_subnets: Vec<ZoneSubnet>,
    pub public_subnets: Vec<ZoneSubnet>,
    pub nat_gateways: Vec<ResourceId>,
    pub endpoints: Vec<ResourceId>,
    pub flow_log: Option<ResourceId>,
}

impl Vpc {
    /// Provision a VPC named `name` through `engine`.
    ///
    /// Flow logging is enabled as the last step when `args.flow_logs` is set.
    pub fn provision<E>(engine: &mut E, name: &str, args: VpcArgs) -> ProvisionResult<Vpc>
    where
        E: ResourceEngine + ?Sized,
    {
        args.validate()?;
        let partition = partition(&args.base_cidr, args.availability_zone_names.len())?;
        log::info!(
            "Provisioning VPC '{name}' {base} across {zones} zone(s) with /{prefix} subnets",
            base = partition.base(),
            zones = partition.zone_count(),
            prefix = partition.subnet_prefix(),
        );

        let mut steps = Pipeline {
            engine: &mut *engine,
            name,
            args: &args,
        };
        let vpc = steps.create_vpc(&partition)?;
        let internet_gateway = steps.create_internet_gateway(&vpc)?;
        let private_zone = match &args.zone_name {
            Some(zone_name) => Some(steps.create_private_zone(&vpc, zone_name)?),
            None => None,
        };
        let private_subnets = steps.create_subnets(&vpc, &partition, SubnetRole::Private)?;
        let public_subnets = steps.create_subnets(&vpc, &partition, SubnetRole::Public)?;
        let public_route_table =
            steps.create_public_routing(&vpc, &internet_gateway, &public_subnets)?;
        let nat_gateways = steps.create_private_routing(&vpc, &private_subnets, &public_subnets)?;
        let endpoints = steps.create_endpoints(&vpc)?;

        let flow_logs = args.flow_logs;
        let mut provisioned = Vpc {
            name: name.to_string(),
            id: vpc.id,
            arn: vpc.arn,
            cidr: partition.base(),
            args,
            partition,
            internet_gateway,
            private_zone,
            public_route_table,
            private_subnets,
            public_subnets,
            nat_gateways,
            endpoints,
            flow_log: None,
        };
        if let Some(flow_logs) = flow_logs {
            provisioned.enable_flow_logging(engine, name, flow_logs.traffic_type)?;
        }

        log::info!(
            "VPC '{name}' provisioned as {id}",
            id = provisioned.id
        );
        Ok(provisioned)
    }

    /// Merge the caller's base tags with a `Name` tag for one resource.
    pub(crate) fn tags_named(&self, name: String) -> Tags {
        merge_tags(&self.args.base_tags, &name_tag(name))
    }

    pub fn subnets(&self, role: SubnetRole) -> &[ZoneSubnet] {
        match role {
            SubnetRole::Private => &self.private_subnets,
            SubnetRole::Public => &self.public_subnets,
        }
    }
}

struct Pipeline<'a, E: ?Sized> {
    engine: &'a mut E,
    name: &'a str,
    args: &'a VpcArgs,
}

impl<'a, E> Pipeline<'a, E>
where
    E: ResourceEngine + ?Sized,
{
    fn create(&mut self, request: ResourceRequest) -> ProvisionResult<CreatedResource> {
        log::debug!("create {} '{}'", request.kind, request.name);
        self.engine.create(request)
    }

    fn tags(&self, name: String) -> Tags {
        merge_tags(&self.args.base_tags, &name_tag(name))
    }

    fn create_vpc(&mut self, partition: &PartitionResult) -> ProvisionResult<CreatedResource> {
        let request = ResourceRequest::new(ResourceKind::Vpc, format!("{}-vpc", self.name))
            .property("cidr_block", partition.base().to_string())
            .property("enable_dns_support", true)
            .property("enable_dns_hostnames", true)
            .tags(self.tags(format!("{} VPC", self.args.description)));
        self.create(request)
    }

    fn create_internet_gateway(&mut self, vpc: &CreatedResource) -> ProvisionResult<ResourceId> {
        let request =
            ResourceRequest::new(ResourceKind::InternetGateway, format!("{}-igw", self.name))
                .parent(&vpc.id)
                .property("vpc_id", &vpc.id)
                .tags(self.tags(format!(
                    "{} VPC Internet Gateway",
                    self.args.description
                )));
        Ok(self.create(request)?.id)
    }

    /// Private hosted zone plus the DHCP options that make it the search domain.
    fn create_private_zone(
        &mut self,
        vpc: &CreatedResource,
        zone_name: &str,
    ) -> ProvisionResult<ResourceId> {
        let zone = self.create(
            ResourceRequest::new(
                ResourceKind::PrivateZone,
                format!("{}-private-zone", self.name),
            )
            .property("name", zone_name)
            .property(
                "comment",
                format!("Private zone for {zone_name}. Managed by vpc-subnet-distributor"),
            )
            .property("vpc_ids", vec![vpc.id.to_string()]),
        )?;

        let dhcp_options = self.create(
            ResourceRequest::new(
                ResourceKind::DhcpOptions,
                format!("{}-dhcp-options", self.name),
            )
            .parent(&vpc.id)
            .property("domain_name", zone_name)
            .property("domain_name_servers", vec!["AmazonProvidedDNS"])
            .tags(self.tags(format!("{} DHCP Options", self.args.description))),
        )?;

        self.create(
            ResourceRequest::new(
                ResourceKind::DhcpOptionsAssociation,
                format!("{}-dhcp-options-assoc", self.name),
            )
            .parent(&dhcp_options.id)
            .property("vpc_id", &vpc.id)
            .property("dhcp_options_id", &dhcp_options.id),
        )?;

        Ok(zone.id)
    }

    fn create_subnets(
        &mut self,
        vpc: &CreatedResource,
        partition: &PartitionResult,
        role: SubnetRole,
    ) -> ProvisionResult<Vec<ZoneSubnet>> {
        let mut subnets = Vec::with_capacity(partition.zone_count());
        for alloc in partition.zones() {
            let zone = alloc.zone;
            let cidr = alloc.block(role);
            let availability_zone = self.args.availability_zone_names[zone.get()].clone();

            let mut request = ResourceRequest::new(
                ResourceKind::Subnet,
                format!("{}-{}-{}", self.name, role.slug(), zone.ordinal()),
            )
            .parent(&vpc.id)
            .property("vpc_id", &vpc.id)
            .property("cidr_block", cidr.to_string())
            .property("availability_zone", availability_zone.as_str())
            .tags(self.tags(format!("{} {role} {zone}", self.args.description)));
            if role == SubnetRole::Public {
                request = request.property("map_public_ip_on_launch", true);
            }

            let created = self.create(request)?;
            subnets.push(ZoneSubnet {
                zone,
                role,
                availability_zone,
                cidr,
                id: created.id,
            });
        }
        Ok(subnets)
    }

    /// Adopt the VPC's default route table for the public subnets and send
    /// their default route through the internet gateway.
    fn create_public_routing(
        &mut self,
        vpc: &CreatedResource,
        internet_gateway: &ResourceId,
        public_subnets: &[ZoneSubnet],
    ) -> ProvisionResult<ResourceId> {
        let default_route_table = ResourceId::new(vpc.output("default_route_table_id")?);
        let route_table = self.create(
            ResourceRequest::new(
                ResourceKind::DefaultRouteTable,
                format!("{}-public-rt", self.name),
            )
            .parent(&vpc.id)
            .property("default_route_table_id", &default_route_table)
            .tags(self.tags(format!("{} Public Route Table", self.args.description))),
        )?;

        self.create(
            ResourceRequest::new(
                ResourceKind::Route,
                format!("{}-route-public-sn-to-ig", self.name),
            )
            .parent(&route_table.id)
            .property("route_table_id", &route_table.id)
            .property("destination_cidr_block", DEFAULT_ROUTE)
            .property("gateway_id", internet_gateway),
        )?;

        for subnet in public_subnets {
            self.create(
                ResourceRequest::new(
                    ResourceKind::RouteTableAssociation,
                    format!("{}-public-rta-{}", self.name, subnet.zone.ordinal()),
                )
                .parent(&route_table.id)
                .property("subnet_id", &subnet.id)
                .property("route_table_id", &route_table.id),
            )?;
        }

        Ok(route_table.id)
    }

    /// One NAT gateway per zone, placed in that zone's public subnet, with a
    /// dedicated route table for the zone's private subnet.
    fn create_private_routing(
        &mut self,
        vpc: &CreatedResource,
        private_subnets: &[ZoneSubnet],
        public_subnets: &[ZoneSubnet],
    ) -> ProvisionResult<Vec<ResourceId>> {
        let args = self.args;
        let description = &args.description;
        let mut nat_gateways = Vec::with_capacity(private_subnets.len());
        for (private, public) in private_subnets.iter().zip(public_subnets) {
            let zone = private.zone;
            let n = zone.ordinal();

            let elastic_ip = self.create(
                ResourceRequest::new(ResourceKind::ElasticIp, format!("{}-nat-{n}", self.name))
                    .parent(&private.id)
                    .property("domain", "vpc")
                    .tags(self.tags(format!("{description} NAT Gateway EIP {zone}"))),
            )?;

            let nat_gateway = self.create(
                ResourceRequest::new(
                    ResourceKind::NatGateway,
                    format!("{}-nat-gateway-{n}", self.name),
                )
                .parent(&private.id)
                .property("allocation_id", &elastic_ip.id)
                .property("subnet_id", &public.id)
                .tags(self.tags(format!("{description} NAT Gateway {zone}"))),
            )?;

            let route_table = self.create(
                ResourceRequest::new(
                    ResourceKind::RouteTable,
                    format!("{}-private-rt-{n}", self.name),
                )
                .parent(&vpc.id)
                .property("vpc_id", &vpc.id)
                .tags(self.tags(format!("{description} Private Subnet RT {zone}"))),
            )?;

            self.create(
                ResourceRequest::new(
                    ResourceKind::Route,
                    format!("{}-route-private-sn-to-nat-{n}", self.name),
                )
                .parent(&route_table.id)
                .property("route_table_id", &route_table.id)
                .property("destination_cidr_block", DEFAULT_ROUTE)
                .property("nat_gateway_id", &nat_gateway.id),
            )?;

            self.create(
                ResourceRequest::new(
                    ResourceKind::RouteTableAssociation,
                    format!("{}-private-rta-{n}", self.name),
                )
                .parent(&route_table.id)
                .property("subnet_id", &private.id)
                .property("route_table_id", &route_table.id),
            )?;

            nat_gateways.push(nat_gateway.id);
        }
        Ok(nat_gateways)
    }

    fn create_endpoints(&mut self, vpc: &CreatedResource) -> ProvisionResult<Vec<ResourceId>> {
        let endpoints = self.args.endpoints;
        let services = [("s3", endpoints.s3), ("dynamodb", endpoints.dynamodb)];
        let mut created = Vec::new();
        for (service, _) in services.into_iter().filter(|(_, enabled)| *enabled) {
            let service_name = format!("com.amazonaws.{}.{service}", self.engine.region());
            let endpoint = self.create(
                ResourceRequest::new(
                    ResourceKind::VpcEndpoint,
                    format!("{}-{service}-endpoint", self.name),
                )
                .parent(&vpc.id)
                .property("vpc_id", &vpc.id)
                .property("service_name", service_name),
            )?;
            created.push(endpoint.id);
        }
        Ok(created)
    }
}
