//! Network utilities
//!
//! Interface address discovery and passive-mode address formatting.

use std::net::{Ipv4Addr, SocketAddrV4};

use log::debug;
use nix::ifaddrs::getifaddrs;
use nix::net::if_::InterfaceFlags;

/// Returns the first non-loopback IPv4 address configured on this host.
pub fn first_non_loopback_ipv4() -> Option<Ipv4Addr> {
    let interfaces = match getifaddrs() {
        Ok(interfaces) => interfaces,
        Err(e) => {
            debug!("Failed to enumerate network interfaces: {}", e);
            return None;
        }
    };

    for interface in interfaces {
        if interface.flags.contains(InterfaceFlags::IFF_LOOPBACK) {
            continue;
        }
        let Some(address) = interface.address else {
            continue;
        };
        if let Some(sin) = address.as_sockaddr_in() {
            let ip = Ipv4Addr::from(sin.ip());
            if !ip.is_loopback() && !ip.is_unspecified() {
                debug!("Using {} from interface {}", ip, interface.interface_name);
                return Some(ip);
            }
        }
    }

    None
}

/// Formats an address as the `a,b,c,d,p1,p2` tuple of a PASV reply.
pub fn pasv_tuple(addr: SocketAddrV4) -> String {
    let [a, b, c, d] = addr.ip().octets();
    let port = addr.port();
    format!("{},{},{},{},{},{}", a, b, c, d, port / 256, port % 256)
}

/// Parses a PASV reply back into a socket address.
pub fn parse_pasv_reply(line: &str) -> Option<SocketAddrV4> {
    let start = line.find('(')?;
    let end = line[start..].find(')')? + start;
    let numbers: Vec<u8> = line[start + 1..end]
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    if numbers.len() != 6 {
        return None;
    }
    let ip = Ipv4Addr::new(numbers[0], numbers[1], numbers[2], numbers[3]);
    let port = u16::from(numbers[4]) * 256 + u16::from(numbers[5]);
    Some(SocketAddrV4::new(ip, port))
}
