//! Persisted record schema: one `name\ttype_name` line per top-level
//! field, stored at `<VAST_DIR>/schema` alongside the importer's
//! `next`/`available` decimal files. The CLI's record format is flat
//! (no nested records), so a schema here is just a flat field list —
//! the first record a fresh `VAST_DIR` ever ingests fixes it, and every
//! later `ingest`/`query`/`start` invocation in that directory loads it
//! back rather than re-inferring it.

use std::fs;
use std::path::Path;

use vast_value::{FieldType, RecordSchema, TypeTag};

use crate::error::CliError;
use crate::record::RawRecord;

pub fn load(path: &Path) -> Result<Option<RecordSchema>, CliError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut fields = Vec::new();
    for line in raw.lines().filter(|l| !l.is_empty()) {
        let (name, ty) = line
            .split_once('\t')
            .ok_or_else(|| CliError::Record(format!("malformed schema line '{line}'")))?;
        fields.push((name.to_string(), FieldType::Primitive(parse_type_tag(ty)?)));
    }
    Ok(Some(RecordSchema::new(fields)))
}

pub fn persist(path: &Path, schema: &RecordSchema) -> Result<(), CliError> {
    let mut out = String::new();
    for (name, field_ty) in schema.fields() {
        out.push_str(name);
        out.push('\t');
        out.push_str(type_tag_name(field_ty.tag()));
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

/// Derive a flat schema from a single record, in field order. Used the
/// first time a `VAST_DIR` sees a record and has no persisted schema
/// yet.
pub fn infer(record: &RawRecord) -> RecordSchema {
    let fields = record
        .fields
        .iter()
        .map(|(name, value)| {
            let tag = value.type_tag().unwrap_or(TypeTag::String);
            (name.clone(), FieldType::Primitive(tag))
        })
        .collect();
    RecordSchema::new(fields)
}

fn parse_type_tag(s: &str) -> Result<TypeTag, CliError> {
    Ok(match s {
        "bool" => TypeTag::Bool,
        "int" => TypeTag::Int,
        "uint" => TypeTag::UInt,
        "double" => TypeTag::Double,
        "duration" => TypeTag::Duration,
        "timepoint" => TypeTag::TimePoint,
        "string" => TypeTag::String,
        "pattern" => TypeTag::Pattern,
        "address" => TypeTag::Address,
        "subnet" => TypeTag::Subnet,
        "port" => TypeTag::Port,
        other => return Err(CliError::Record(format!("unknown schema field type '{other}'"))),
    })
}

fn type_tag_name(tag: TypeTag) -> &'static str {
    match tag {
        TypeTag::Bool => "bool",
        TypeTag::Int => "int",
        TypeTag::UInt => "uint",
        TypeTag::Double => "double",
        TypeTag::Duration => "duration",
        TypeTag::TimePoint => "timepoint",
        TypeTag::String => "string",
        TypeTag::Pattern => "pattern",
        TypeTag::Address => "address",
        TypeTag::Subnet => "subnet",
        TypeTag::Port => "port",
        // The CLI's own record format never produces these at the top
        // level; named defensively so a future field type doesn't
        // silently fail to round-trip.
        TypeTag::Vector => "vector",
        TypeTag::Set => "set",
        TypeTag::Table => "table",
        TypeTag::Record => "record",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_line;

    #[test]
    fn infers_then_round_trips_through_disk() {
        let record = parse_line("conn 0 orig_h=address:192.168.1.5 duration=duration:1500000000").unwrap();
        let schema = infer(&record);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema");
        persist(&path, &schema).unwrap();

        let reloaded = load(&path).unwrap().unwrap();
        assert_eq!(reloaded, schema);
    }

    #[test]
    fn absent_file_has_no_schema_yet() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("schema")).unwrap().is_none());
    }
}
