//! Output formatting for partitions and plans.
//!
//! - [`csv`] - CSV rendering of a subnet partition
//! - [`terminal`] - terminal helpers and the plan summary
//! - [`plan`] - JSON plan file

mod csv;
mod plan;
mod terminal;

pub use csv::{partition_csv, print_partition};
pub use plan::write_plan;
pub use terminal::{format_field, plan_summary, role_label};
