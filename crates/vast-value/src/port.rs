//! Port values: a `(number, protocol)` pair (§4.3).

use std::fmt;

use crate::error::ValueError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    Unknown,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Icmp => "icmp",
            Self::Unknown => "?",
        })
    }
}

impl std::str::FromStr for Protocol {
    type Err = ValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "tcp" => Self::Tcp,
            "udp" => Self::Udp,
            "icmp" => Self::Icmp,
            "?" | "unknown" => Self::Unknown,
            other => return Err(ValueError::InvalidPort(format!("unknown protocol '{other}'"))),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Port {
    number: u16,
    protocol: Protocol,
}

impl Port {
    pub fn new(number: u16, protocol: Protocol) -> Self {
        Self { number, protocol }
    }

    pub fn number(&self) -> u16 {
        self.number
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Parse `number/protocol`, e.g. `"80/tcp"`.
    pub fn parse(s: &str) -> Result<Self, ValueError> {
        let (num_str, proto_str) = s
            .split_once('/')
            .ok_or_else(|| ValueError::InvalidPort(s.to_string()))?;
        let number: u16 = num_str
            .parse()
            .map_err(|_| ValueError::InvalidPort(s.to_string()))?;
        let protocol: Protocol = proto_str.parse()?;
        Ok(Self::new(number, protocol))
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.number, self.protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_roundtrip() {
        let p = Port::parse("80/tcp").unwrap();
        assert_eq!(p.number(), 80);
        assert_eq!(p.protocol(), Protocol::Tcp);
        assert_eq!(p.to_string(), "80/tcp");
    }

    #[test]
    fn rejects_unknown_protocol() {
        assert!(Port::parse("80/sctp").is_err());
    }
}
