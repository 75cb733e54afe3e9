//! Serial port enumeration for usage output.

use log::debug;

use crate::error::Result;

/// Sort key that groups names by their stem and orders the trailing number
/// numerically, so `COM2` comes before `COM10` and `ttyUSB1` before `ttyUSB10`.
fn port_sort_key(name: &str) -> (String, usize) {
    let basename = name.rsplit('/').next().unwrap_or(name);
    let stem = basename.trim_end_matches(|c: char| c.is_ascii_digit());
    let number = basename[stem.len()..].parse().unwrap_or(0);
    (stem.to_string(), number)
}

fn sort_port_names(names: &mut [String]) {
    names.sort_by_key(|name| port_sort_key(name));
}

/// Names of the serial ports present on this machine
pub fn list_ports() -> Result<Vec<String>> {
    let mut names: Vec<String> = serialport::available_ports()?
        .into_iter()
        .map(|info| info.port_name)
        .collect();
    sort_port_names(&mut names);
    names.dedup();
    debug!("Found {} serial port(s)", names.len());
    Ok(names)
}
