//! Line-based ingest record format local to this CLI: one event per
//! line, `<type-name> <time-nanos> field=type:value ...`. This is not
//! a Zeek/PCAP log format — it exists only to get typed records from a
//! text source into a [`vast_ingest::RawEvent`] without reusing
//! `vast-query`'s lexer, which is a grammar concern, not a data-ingest
//! one.
//!
//! Supported type tags: `bool`, `int`, `uint`, `double`, `duration`,
//! `timepoint`, `string`, `address`, `subnet`, `port`. Nested records,
//! vectors, sets and tables aren't expressible at this layer.

use vast_value::{Address, Duration, Port, Subnet, TimePoint, Value};

use crate::error::CliError;

pub struct RawRecord {
    pub name: String,
    pub time: TimePoint,
    pub fields: Vec<(String, Value)>,
}

pub fn parse_line(line: &str) -> Result<RawRecord, CliError> {
    let mut parts = line.split_whitespace();

    let name = parts
        .next()
        .ok_or_else(|| CliError::Record("record is missing a type name".to_string()))?
        .to_string();

    let time_raw = parts
        .next()
        .ok_or_else(|| CliError::Record(format!("record '{name}' is missing a timestamp")))?;
    let nanos: i64 = time_raw
        .parse()
        .map_err(|_| CliError::Record(format!("invalid timestamp '{time_raw}'")))?;

    let mut fields = Vec::new();
    for field in parts {
        let (path, rest) = field
            .split_once('=')
            .ok_or_else(|| CliError::Record(format!("field '{field}' is missing '='")))?;
        let (ty, raw) = rest
            .split_once(':')
            .ok_or_else(|| CliError::Record(format!("field '{field}' is missing a type tag")))?;
        fields.push((path.to_string(), parse_value(ty, raw)?));
    }

    Ok(RawRecord {
        name,
        time: TimePoint::from_nanos_since_epoch(nanos),
        fields,
    })
}

fn parse_value(ty: &str, raw: &str) -> Result<Value, CliError> {
    let malformed = |what: &str| CliError::Record(format!("invalid {what} value '{raw}'"));
    Ok(match ty {
        "bool" => Value::Bool(raw.parse().map_err(|_| malformed("bool"))?),
        "int" => Value::Int(raw.parse().map_err(|_| malformed("int"))?),
        "uint" => Value::UInt(raw.parse().map_err(|_| malformed("uint"))?),
        "double" => Value::Double(raw.parse().map_err(|_| malformed("double"))?),
        "duration" => Value::Duration(Duration::from_nanos(raw.parse().map_err(|_| malformed("duration"))?)),
        "timepoint" => {
            Value::TimePoint(TimePoint::from_nanos_since_epoch(raw.parse().map_err(|_| malformed("timepoint"))?))
        }
        "string" => Value::String(raw.to_string()),
        "address" => Value::Address(Address::parse(raw).map_err(|e| CliError::Record(e.to_string()))?),
        "subnet" => Value::Subnet(Subnet::parse(raw).map_err(|e| CliError::Record(e.to_string()))?),
        "port" => Value::Port(Port::parse(raw).map_err(|e| CliError::Record(e.to_string()))?),
        other => return Err(CliError::Record(format!("unknown field type '{other}'"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_record_with_mixed_field_types() {
        let record = parse_line("conn 1700000000000000000 orig_h=address:192.168.1.5 duration=duration:1500000000").unwrap();
        assert_eq!(record.name, "conn");
        assert_eq!(record.time.as_nanos_since_epoch(), 1700000000000000000);
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.fields[0].0, "orig_h");
        assert!(matches!(record.fields[0].1, Value::Address(_)));
        assert!(matches!(record.fields[1].1, Value::Duration(_)));
    }

    #[test]
    fn rejects_a_field_without_a_type_tag() {
        assert!(parse_line("conn 0 orig_h=192.168.1.5").is_err());
    }

    #[test]
    fn rejects_an_unknown_type_tag() {
        assert!(parse_line("conn 0 orig_h=vector:[]").is_err());
    }

    #[test]
    fn a_record_with_no_fields_is_valid() {
        let record = parse_line("heartbeat 0").unwrap();
        assert!(record.fields.is_empty());
    }
}
