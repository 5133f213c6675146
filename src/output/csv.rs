//! CSV output of a subnet partition.

use crate::processing::PartitionResult;

use super::terminal::format_field;

const HEADER: &str = r#""zone","role","subnet_cidr","broadcast","hosts","availability_zone""#;

/// Render one row per subnet, private before public within each zone.
///
/// # Arguments
/// * `result` - The partition to render
/// * `zone_names` - Availability zone names by zone index, `None` prints `-`
pub fn partition_csv(result: &PartitionResult, zone_names: Option<&[String]>) -> String {
    let mut lines = vec![HEADER.to_string()];
    for (zone, role, block) in result.blocks() {
        let availability_zone = zone_names
            .and_then(|names| names.get(zone.get()))
            .map(String::as_str)
            .unwrap_or("-");
        lines.push(format!(
            "{zone},{role},{cidr},{broadcast},{hosts},{az}",
            zone = format_field(zone, 6),
            role = format_field(role, 9),
            cidr = format_field(block, 20),
            broadcast = format_field(format!("{}_br", block.hi()), 20),
            hosts = format_field(block.usable_hosts().unwrap_or(0), 10),
            az = format_field(availability_zone, 14),
        ));
    }
    lines.join("\n")
}

/// Print the partition as CSV to stdout.
pub fn print_partition(result: &PartitionResult, zone_names: Option<&[String]>) {
    log::info!(
        "#Start print_partition() {} zone(s) of /{} in {}",
        result.zone_count(),
        result.subnet_prefix(),
        result.base()
    );
    println!("{}", partition_csv(result, zone_names));
    if result.reserved_tiles() > 0 {
        println!(
            "# {} /{} block(s) left unallocated",
            result.reserved_tiles(),
            result.subnet_prefix()
        );
    }
}
