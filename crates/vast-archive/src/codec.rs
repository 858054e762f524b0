//! Manual tagged binary encoding for `Event`/`Value`: length-prefixed,
//! big-endian integers, in the same hand-rolled parsing style
//! `git-object`'s `blob`/`tree`/`commit` modules use for their own
//! on-disk formats. No `serde`/`bincode`.

use std::net::Ipv6Addr;

use vast_value::{Address, Duration, Event, EventId, Pattern, Port, Protocol, Subnet, TimePoint, Value};

use crate::error::ArchiveError;

const TAG_BOOL: u8 = 0;
const TAG_INT: u8 = 1;
const TAG_UINT: u8 = 2;
const TAG_DOUBLE: u8 = 3;
const TAG_DURATION: u8 = 4;
const TAG_TIME_POINT: u8 = 5;
const TAG_STRING: u8 = 6;
const TAG_PATTERN: u8 = 7;
const TAG_ADDRESS: u8 = 8;
const TAG_SUBNET: u8 = 9;
const TAG_PORT: u8 = 10;
const TAG_VECTOR: u8 = 11;
const TAG_SET: u8 = 12;
const TAG_TABLE: u8 = 13;
const TAG_RECORD: u8 = 14;
const TAG_NONE: u8 = 15;
const TAG_INVALID: u8 = 16;

const PROTO_TCP: u8 = 0;
const PROTO_UDP: u8 = 1;
const PROTO_ICMP: u8 = 2;
const PROTO_UNKNOWN: u8 = 3;

/// Encode an event as `id | time | name | data`, each field length-
/// prefixed where variable-sized.
pub fn encode_event(event: &Event) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&event.id().get().to_be_bytes());
    buf.extend_from_slice(&event.time().as_nanos_since_epoch().to_be_bytes());
    write_string(&mut buf, event.name());
    encode_value(&mut buf, event.data());
    buf
}

pub fn decode_event(bytes: &[u8]) -> Result<Event, ArchiveError> {
    let mut r = Reader::new(bytes);
    let id = EventId::new(r.read_u64()?);
    let time = TimePoint::from_nanos_since_epoch(r.read_i64()?);
    let name = r.read_string()?;
    let data = decode_value(&mut r)?;
    Ok(Event::new(id, time, name, data))
}

fn encode_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Bool(b) => {
            buf.push(TAG_BOOL);
            buf.push(*b as u8);
        }
        Value::Int(i) => {
            buf.push(TAG_INT);
            buf.extend_from_slice(&i.to_be_bytes());
        }
        Value::UInt(u) => {
            buf.push(TAG_UINT);
            buf.extend_from_slice(&u.to_be_bytes());
        }
        Value::Double(d) => {
            buf.push(TAG_DOUBLE);
            buf.extend_from_slice(&d.to_be_bytes());
        }
        Value::Duration(d) => {
            buf.push(TAG_DURATION);
            buf.extend_from_slice(&d.as_nanos().to_be_bytes());
        }
        Value::TimePoint(t) => {
            buf.push(TAG_TIME_POINT);
            buf.extend_from_slice(&t.as_nanos_since_epoch().to_be_bytes());
        }
        Value::String(s) => {
            buf.push(TAG_STRING);
            write_string(buf, s);
        }
        Value::Pattern(p) => {
            buf.push(TAG_PATTERN);
            write_string(buf, p.source());
        }
        Value::Address(a) => {
            buf.push(TAG_ADDRESS);
            write_address(buf, a);
        }
        Value::Subnet(s) => {
            buf.push(TAG_SUBNET);
            write_address(buf, &s.network());
            buf.push(s.prefix_len());
        }
        Value::Port(p) => {
            buf.push(TAG_PORT);
            buf.extend_from_slice(&p.number().to_be_bytes());
            buf.push(protocol_tag(p.protocol()));
        }
        Value::Vector(items) => {
            buf.push(TAG_VECTOR);
            buf.extend_from_slice(&(items.len() as u32).to_be_bytes());
            for item in items {
                encode_value(buf, item);
            }
        }
        Value::Set(items) => {
            buf.push(TAG_SET);
            buf.extend_from_slice(&(items.len() as u32).to_be_bytes());
            for item in items {
                encode_value(buf, item);
            }
        }
        Value::Table(pairs) => {
            buf.push(TAG_TABLE);
            buf.extend_from_slice(&(pairs.len() as u32).to_be_bytes());
            for (k, v) in pairs {
                encode_value(buf, k);
                encode_value(buf, v);
            }
        }
        Value::Record(fields) => {
            buf.push(TAG_RECORD);
            buf.extend_from_slice(&(fields.len() as u32).to_be_bytes());
            for (name, v) in fields {
                write_string(buf, name);
                encode_value(buf, v);
            }
        }
        Value::None => buf.push(TAG_NONE),
        Value::Invalid => buf.push(TAG_INVALID),
    }
}

fn decode_value(r: &mut Reader) -> Result<Value, ArchiveError> {
    match r.read_u8()? {
        TAG_BOOL => Ok(Value::Bool(r.read_u8()? != 0)),
        TAG_INT => Ok(Value::Int(r.read_i64()?)),
        TAG_UINT => Ok(Value::UInt(r.read_u64()?)),
        TAG_DOUBLE => Ok(Value::Double(r.read_f64()?)),
        TAG_DURATION => Ok(Value::Duration(Duration::from_nanos(r.read_i64()?))),
        TAG_TIME_POINT => Ok(Value::TimePoint(TimePoint::from_nanos_since_epoch(r.read_i64()?))),
        TAG_STRING => Ok(Value::String(r.read_string()?)),
        TAG_PATTERN => Ok(Value::Pattern(Pattern::new(r.read_string()?)?)),
        TAG_ADDRESS => Ok(Value::Address(read_address(r)?)),
        TAG_SUBNET => {
            let network = read_address(r)?;
            let prefix = r.read_u8()?;
            Ok(Value::Subnet(Subnet::new(network, prefix)?))
        }
        TAG_PORT => {
            let number = r.read_u16()?;
            let protocol = protocol_from_tag(r.read_u8()?)?;
            Ok(Value::Port(Port::new(number, protocol)))
        }
        TAG_VECTOR => {
            let n = r.read_u32()?;
            let mut items = Vec::with_capacity(n as usize);
            for _ in 0..n {
                items.push(decode_value(r)?);
            }
            Ok(Value::Vector(items))
        }
        TAG_SET => {
            let n = r.read_u32()?;
            let mut items = Vec::with_capacity(n as usize);
            for _ in 0..n {
                items.push(decode_value(r)?);
            }
            Ok(Value::Set(items))
        }
        TAG_TABLE => {
            let n = r.read_u32()?;
            let mut pairs = Vec::with_capacity(n as usize);
            for _ in 0..n {
                let k = decode_value(r)?;
                let v = decode_value(r)?;
                pairs.push((k, v));
            }
            Ok(Value::Table(pairs))
        }
        TAG_RECORD => {
            let n = r.read_u32()?;
            let mut fields = Vec::with_capacity(n as usize);
            for _ in 0..n {
                let name = r.read_string()?;
                let v = decode_value(r)?;
                fields.push((name, v));
            }
            Ok(Value::Record(fields))
        }
        TAG_NONE => Ok(Value::None),
        TAG_INVALID => Ok(Value::Invalid),
        other => Err(ArchiveError::Malformed(format!("unknown value tag {other}"))),
    }
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

fn write_address(buf: &mut Vec<u8>, addr: &Address) {
    buf.push(addr.is_v4() as u8);
    buf.extend_from_slice(&addr.bits().to_be_bytes());
}

fn read_address(r: &mut Reader) -> Result<Address, ArchiveError> {
    let v4 = r.read_u8()? != 0;
    let bits = r.read_u128()?;
    let v6 = Ipv6Addr::from(bits);
    Ok(if v4 { Address::v4(v6.to_ipv4_mapped().ok_or_else(|| {
        ArchiveError::Malformed("v4 flag set on a non-mapped address".into())
    })?) } else {
        Address::v6(v6)
    })
}

fn protocol_tag(p: Protocol) -> u8 {
    match p {
        Protocol::Tcp => PROTO_TCP,
        Protocol::Udp => PROTO_UDP,
        Protocol::Icmp => PROTO_ICMP,
        Protocol::Unknown => PROTO_UNKNOWN,
    }
}

fn protocol_from_tag(tag: u8) -> Result<Protocol, ArchiveError> {
    Ok(match tag {
        PROTO_TCP => Protocol::Tcp,
        PROTO_UDP => Protocol::Udp,
        PROTO_ICMP => Protocol::Icmp,
        PROTO_UNKNOWN => Protocol::Unknown,
        other => return Err(ArchiveError::Malformed(format!("unknown protocol tag {other}"))),
    })
}

/// A cursor over an in-memory byte slice; every read checks bounds
/// explicitly rather than panicking on a truncated record.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ArchiveError> {
        let end = self.pos + n;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| ArchiveError::Malformed("unexpected end of event record".into()))?;
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, ArchiveError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, ArchiveError> {
        Ok(u16::from_be_bytes(self.take(2)?.try_into().unwrap()))
    }

    fn read_u32(&mut self) -> Result<u32, ArchiveError> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn read_u64(&mut self) -> Result<u64, ArchiveError> {
        Ok(u64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn read_i64(&mut self) -> Result<i64, ArchiveError> {
        Ok(i64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn read_u128(&mut self) -> Result<u128, ArchiveError> {
        Ok(u128::from_be_bytes(self.take(16)?.try_into().unwrap()))
    }

    fn read_f64(&mut self) -> Result<f64, ArchiveError> {
        Ok(f64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn read_string(&mut self) -> Result<String, ArchiveError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ArchiveError::Malformed(format!("invalid utf-8 in string field: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        let record = Value::record(vec![
            (
                "id".to_string(),
                Value::record(vec![(
                    "resp_h".to_string(),
                    Value::Address(Address::parse("192.168.1.5").unwrap()),
                )]),
            ),
            ("duration".to_string(), Value::Duration(Duration::from_secs_f64(1.5))),
            ("proto".to_string(), Value::Port(Port::new(443, Protocol::Tcp))),
            ("tags".to_string(), Value::set(vec![Value::String("a".into()), Value::String("b".into())])),
            ("note".to_string(), Value::None),
        ]);
        Event::new(EventId::new(7), TimePoint::from_nanos_since_epoch(42), "conn", record)
    }

    #[test]
    fn roundtrips_a_nested_record() {
        let event = sample_event();
        let bytes = encode_event(&event);
        let decoded = decode_event(&bytes).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn roundtrips_every_scalar_value_kind() {
        for value in [
            Value::Bool(true),
            Value::Int(-5),
            Value::UInt(5),
            Value::Double(1.25),
            Value::Pattern(Pattern::new("a.*").unwrap()),
            Value::Subnet(Subnet::parse("10.0.0.0/8").unwrap()),
            Value::Invalid,
        ] {
            let mut buf = Vec::new();
            encode_value(&mut buf, &value);
            let mut r = Reader::new(&buf);
            assert_eq!(decode_value(&mut r).unwrap(), value);
        }
    }

    #[test]
    fn truncated_record_is_an_error() {
        let event = sample_event();
        let bytes = encode_event(&event);
        assert!(decode_event(&bytes[..bytes.len() - 4]).is_err());
    }
}
