use std::net::IpAddr;
use tracing::warn;

const FALLBACK_ADDRESS: &str = "127.0.0.1";

/// Every non-loopback IPv4 address bound to a local interface, in interface
/// order, or `["127.0.0.1"]` when there are none or enumeration fails.
pub fn discover_addresses() -> Vec<String> {
    match local_ip_address::list_afinet_netifas() {
        Ok(interfaces) => usable_ipv4(interfaces.into_iter().map(|(_, ip)| ip)),
        Err(e) => {
            warn!("Error getting IP addresses: {}", e);
            vec![FALLBACK_ADDRESS.to_string()]
        }
    }
}

pub fn usable_ipv4(addrs: impl IntoIterator<Item = IpAddr>) -> Vec<String> {
    let ips: Vec<String> = addrs
        .into_iter()
        .filter_map(|ip| match ip {
            IpAddr::V4(v4) if !v4.is_loopback() => Some(v4.to_string()),
            _ => None,
        })
        .collect();

    if ips.is_empty() {
        vec![FALLBACK_ADDRESS.to_string()]
    } else {
        ips
    }
}
