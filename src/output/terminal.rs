//! Terminal output utilities.
//!
//! Formatting helpers and the colored plan summary.

use crate::models::SubnetRole;
use crate::provision::{DryRunEngine, Vpc};
use colored::{ColoredString, Colorize};
use itertools::Itertools;

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    format!("{quoted:>width$}")
}

pub fn role_label(role: SubnetRole) -> ColoredString {
    match role {
        SubnetRole::Private => role.to_string().yellow(),
        SubnetRole::Public => role.to_string().green(),
    }
}

/// Summary lines for a planned VPC, one per subnet plus totals.
pub fn plan_summary(vpc: &Vpc, engine: &DryRunEngine) -> Vec<String> {
    let mut lines = vec![format!(
        "VPC '{name}' {cidr} ({id}) - {count} resources planned",
        name = vpc.name.bold(),
        cidr = vpc.cidr,
        id = vpc.id,
        count = engine.len()
    )];
    let subnets = vpc
        .private_subnets
        .iter()
        .interleave(vpc.public_subnets.iter());
    for subnet in subnets {
        lines.push(format!(
            "  zone {zone} {az:<14} {role:<7} {cidr:<18} {id}",
            zone = subnet.zone,
            az = subnet.availability_zone,
            role = role_label(subnet.role),
            cidr = subnet.cidr.to_string(),
            id = subnet.id
        ));
    }
    let counts = engine
        .resources()
        .iter()
        .counts_by(|r| r.kind.to_string())
        .into_iter()
        .sorted()
        .map(|(kind, n)| format!("{kind}={n}"))
        .join(", ");
    lines.push(format!("  {counts}"));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::VpcArgs;

    #[test]
    fn test_format_field_short() {
        assert_eq!(format_field("test", 10), "    \"test\"");
    }

    #[test]
    fn test_format_field_long() {
        assert_eq!(format_field("long_value", 5), "\"long_value\"");
    }

    #[test]
    fn test_format_field_number() {
        assert_eq!(format_field(42, 6), "  \"42\"");
    }

    #[test]
    fn test_plan_summary() {
        colored::control::set_override(false);
        let mut engine = DryRunEngine::new("us-east-1");
        let args = VpcArgs::new(
            "10.0.0.0/16",
            "Dev",
            vec!["us-east-1a".to_string(), "us-east-1b".to_string()],
        );
        let vpc = Vpc::provision(&mut engine, "dev", args).unwrap();
        let lines = plan_summary(&vpc, &engine);
        assert_eq!(lines.len(), 6);
        assert!(lines[0].contains("20 resources planned"));
        assert!(lines[1].contains("Private") && lines[1].contains("10.0.0.0/18"));
        assert!(lines[2].contains("Public") && lines[2].contains("10.0.64.0/18"));
        assert!(lines[5].contains("subnet=4"));
        assert!(lines[5].contains("natgateway=2"));
    }
}
