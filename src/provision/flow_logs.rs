//! VPC flow logging to a log group.

use super::engine::{ResourceEngine, ResourceId, ResourceKind, ResourceRequest};
use super::{ProvisionResult, TrafficType, Vpc};
use serde_json::{json, Value};

/// Service principal allowed to assume the flow log role.
const FLOW_LOGS_PRINCIPAL: &str = "vpc-flow-logs.amazonaws.com";

/// Actions the flow log role needs on its log group.
const FLOW_LOGS_ACTIONS: [&str; 5] = [
    "logs:CreateLogGroup",
    "logs:CreateLogStream",
    "logs:PutLogEvents",
    "logs:DescribeLogGroups",
    "logs:DescribeLogStreams",
];

fn assume_role_policy() -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Action": "sts:AssumeRole",
            "Principal": { "Service": FLOW_LOGS_PRINCIPAL },
            "Effect": "Allow",
        }],
    })
}

fn role_policy() -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Action": FLOW_LOGS_ACTIONS,
            "Effect": "Allow",
            "Resource": "*",
        }],
    })
}

impl Vpc {
    /// Send the VPC's flow logs to a new log group.
    ///
    /// Creates the IAM role the flow log service assumes, the log group, the
    /// role policy and finally the flow log itself. Returns the flow log id.
    pub fn enable_flow_logging<E>(
        &mut self,
        engine: &mut E,
        name: &str,
        traffic_type: TrafficType,
    ) -> ProvisionResult<ResourceId>
    where
        E: ResourceEngine + ?Sized,
    {
        let role = engine.create(
            ResourceRequest::new(ResourceKind::IamRole, format!("{name}-flow-logs-role"))
                .parent(&self.id)
                .property("description", format!("{name} VPC Flow Logs"))
                .property(
                    "assume_role_policy",
                    serde_json::to_string(&assume_role_policy())?,
                ),
        )?;

        let log_group = engine.create(
            ResourceRequest::new(ResourceKind::LogGroup, format!("{name}-vpc-flow-logs"))
                .parent(&role.id)
                .tags(self.tags_named(format!("{} VPC Flow Logs", self.args.description))),
        )?;

        engine.create(
            ResourceRequest::new(ResourceKind::RolePolicy, format!("{name}-flow-log-policy"))
                .parent(&role.id)
                .property("name", "vpc-flow-logs")
                .property("role", &role.id)
                .property("policy", serde_json::to_string(&role_policy())?),
        )?;

        let flow_log = engine.create(
            ResourceRequest::new(ResourceKind::FlowLog, format!("{name}-flow-logs"))
                .parent(&role.id)
                .property("log_destination", log_group.arn.as_str())
                .property("iam_role_arn", role.arn.as_str())
                .property("vpc_id", &self.id)
                .property("traffic_type", traffic_type.as_str()),
        )?;

        log::info!(
            "Flow logs ({traffic_type}) for VPC {id} go to {arn}",
            id = self.id,
            arn = log_group.arn
        );
        self.flow_log = Some(flow_log.id.clone());
        Ok(flow_log.id)
    }
}
