//! IP / CIDR whitelist.
//!
//! Containment is a prefix-masked comparison; lookup is linear in the number
//! of entries.

use super::errors::GuardrailError;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// One whitelist entry. An exact IP is a range with a full-length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpRange {
    network: IpAddr,
    prefix: u8,
}

impl IpRange {
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.network, ip) {
            (IpAddr::V4(net), IpAddr::V4(addr)) => {
                let mask = mask_u32(self.prefix);
                u32::from(net) & mask == u32::from(addr) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(addr)) => {
                let mask = mask_u128(self.prefix);
                u128::from(net) & mask == u128::from(addr) & mask
            }
            // An IPv4-mapped IPv6 client still matches an IPv4 range.
            (IpAddr::V4(_), IpAddr::V6(addr)) => match addr.to_ipv4_mapped() {
                Some(v4) => self.contains(IpAddr::V4(v4)),
                None => false,
            },
            (IpAddr::V6(_), IpAddr::V4(_)) => false,
        }
    }
}

fn mask_u32(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

fn mask_u128(prefix: u8) -> u128 {
    if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix))
    }
}

impl FromStr for IpRange {
    type Err = GuardrailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entry = s.trim();
        let invalid = |reason: &str| GuardrailError::InvalidWhitelistEntry {
            entry: entry.to_string(),
            reason: reason.to_string(),
        };

        let (addr, prefix) = match entry.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (entry, None),
        };

        let network: IpAddr = addr.parse().map_err(|_| invalid("not an IP address"))?;
        let max = if network.is_ipv4() { 32 } else { 128 };
        let prefix = match prefix {
            Some(p) => p
                .parse::<u8>()
                .ok()
                .filter(|p| *p <= max)
                .ok_or_else(|| invalid("bad prefix length"))?,
            None => max,
        };

        Ok(Self { network, prefix })
    }
}

impl fmt::Display for IpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

/// Set of addresses that bypass admission entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    ranges: Vec<IpRange>,
}

impl Whitelist {
    pub fn new(ranges: Vec<IpRange>) -> Self {
        Self { ranges }
    }

    /// Parse a comma-separated list; blank items are skipped.
    pub fn parse(list: &str) -> Result<Self, GuardrailError> {
        let ranges = list
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(IpRange::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.ranges.iter().any(|range| range.contains(ip))
    }

    /// Client ids that are not IP addresses are never whitelisted.
    pub fn contains_client(&self, client_id: &str) -> bool {
        if self.ranges.is_empty() {
            return false;
        }
        client_id
            .parse::<IpAddr>()
            .map(|ip| self.contains(ip))
            .unwrap_or(false)
    }
}
