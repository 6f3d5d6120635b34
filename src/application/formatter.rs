//! Console formatting for the operator session.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::DeviceRecord;

/// Formats the device at 0-based `index` as a header line plus a table.
pub fn format_device_card(index: usize, total: usize, device: &DeviceRecord) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Current IP", "New IP", "Netmask", "Gateway"]);
    table.add_row(vec![
        device.current_ip.as_str(),
        device.ip.as_str(),
        device.netmask.as_str(),
        device.gateway.as_str(),
    ]);

    format!(
        "\n{} Server {}\n{table}",
        format!("[{}/{total}]", index + 1).bold(),
        device.location.cyan()
    )
}
