//! Ties every per-field `ValueIndex` together into one store keyed off
//! a `RecordSchema` (§3 "Index"), plus the three tag indexes every
//! event stream carries regardless of schema: `&name`, `&time`, `&id`
//! (§4.4). This is the thing `vast-ingest`'s index actors own and feed
//! one event at a time; `vast-query`'s planner resolves leaves against
//! it through [`IndexStore::lookup_field`]/[`IndexStore::lookup_fields`]
//! and the three tag accessors.

use std::collections::HashMap;

use vast_bitmap::{self as bm, Bitmap};
use vast_value::{Event, FieldType, OffsetStep, RecordSchema, TypeTag, Value};

use crate::arithmetic::{ArithmeticIndex, NumKind};
use crate::error::IndexError;
use crate::factory::make_index;
use crate::op::ClauseOp;
use crate::string_index::StringIndex;
use crate::value_index::ValueIndex;

pub struct IndexStore {
    fields: HashMap<String, Box<dyn ValueIndex>>,
    name: StringIndex,
    time: ArithmeticIndex,
    id: ArithmeticIndex,
    len: u64,
}

impl IndexStore {
    /// Build one index per leaf field of `schema`, recursing into nested
    /// records the way [`RecordSchema::fields_of_type`] does.
    pub fn new(schema: &RecordSchema) -> Self {
        let mut fields = HashMap::new();
        collect_leaf_indexes(schema, &mut Vec::new(), &mut fields);
        Self {
            fields,
            name: StringIndex::new(),
            time: ArithmeticIndex::new(NumKind::TimePoint),
            id: ArithmeticIndex::new(NumKind::UInt),
            len: 0,
        }
    }

    /// Advance every index by one position, extracting each leaf field's
    /// value out of `event`'s record along its schema path. A field
    /// whose path doesn't resolve (absent nested record, wrong shape)
    /// pushes `None` — "no value at this position", per §4.3.
    pub fn push_event(&mut self, position: u64, event: &Event) -> Result<(), IndexError> {
        if position != self.len {
            return Err(IndexError::OutOfOrder {
                expected: self.len,
                actual: position,
            });
        }
        self.name
            .push(position, Some(&Value::String(event.name().to_string())))?;
        self.time
            .push(position, Some(&Value::TimePoint(event.time())))?;
        self.id.push(position, Some(&Value::UInt(event.id().get())))?;
        for (path, index) in self.fields.iter_mut() {
            let value = resolve_path(event.data(), path);
            index.push(position, value)?;
        }
        self.len += 1;
        Ok(())
    }

    /// Resolve a single `event_clause` leaf (§4.4) against its
    /// schema-resolved offset path. A path with no matching index (can
    /// only happen for a degenerate empty-schema store) reads as "no
    /// match anywhere" rather than panicking.
    pub fn lookup_field(
        &self,
        steps: &[OffsetStep],
        op: ClauseOp,
        value: &Value,
    ) -> Result<Bitmap, IndexError> {
        let key = join_path(steps);
        match self.fields.get(&key) {
            Some(index) => index.lookup(op, value),
            None => Ok(Bitmap::zeros(self.len)),
        }
    }

    /// Resolve a `@type` leaf (§4.4): OR together every field whose
    /// declared type matched, across the whole schema.
    pub fn lookup_fields(
        &self,
        paths: &[Vec<OffsetStep>],
        op: ClauseOp,
        value: &Value,
    ) -> Result<Bitmap, IndexError> {
        let mut result = Bitmap::zeros(self.len);
        for path in paths {
            result = bm::or(&result, &self.lookup_field(path, op, value)?);
        }
        Ok(result)
    }

    pub fn name_index(&self) -> &StringIndex {
        &self.name
    }

    pub fn time_index(&self) -> &ArithmeticIndex {
        &self.time
    }

    pub fn id_index(&self) -> &ArithmeticIndex {
        &self.id
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn join_path(steps: &[OffsetStep]) -> String {
    steps
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

fn resolve_path<'a>(value: &'a Value, dotted_path: &str) -> Option<&'a Value> {
    let mut current = value;
    for seg in dotted_path.split('.') {
        current = current.field(seg)?;
    }
    Some(current)
}

fn collect_leaf_indexes(
    schema: &RecordSchema,
    prefix: &mut Vec<String>,
    out: &mut HashMap<String, Box<dyn ValueIndex>>,
) {
    for (name, field_ty) in schema.fields() {
        prefix.push(name.clone());
        match field_ty {
            FieldType::Record(nested) => collect_leaf_indexes(nested, prefix, out),
            FieldType::Primitive(tag) => {
                let key = prefix.join(".");
                out.insert(key, make_index(*tag));
            }
        }
        prefix.pop();
    }
}

/// `name`→`string|pattern`, `time`→`time_point`, `id`→`uint`, matching
/// `vast-query`'s `tag_lhs_type` — exposed here so callers outside
/// `vast-query` (tests, `vast-ingest`) don't need to duplicate it.
pub fn tag_type(which: TagField) -> TypeTag {
    match which {
        TagField::Name => TypeTag::String,
        TagField::Time => TypeTag::TimePoint,
        TagField::Id => TypeTag::UInt,
    }
}

/// Mirrors `vast_query::ast::Tag` without creating a dependency from
/// `vast-index` on `vast-query` (which itself depends on `vast-index`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Name,
    Time,
    Id,
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_value::{EventId, TimePoint};

    fn schema() -> RecordSchema {
        let id_schema = RecordSchema::new(vec![(
            "resp_h".to_string(),
            FieldType::Primitive(TypeTag::Address),
        )]);
        RecordSchema::new(vec![
            ("id".to_string(), FieldType::Record(id_schema)),
            ("duration".to_string(), FieldType::Primitive(TypeTag::Duration)),
        ])
    }

    fn conn_event(id: u64, time_secs: i64, resp_h: &str, duration_secs: f64) -> Event {
        let record = Value::record(vec![
            (
                "id".to_string(),
                Value::record(vec![(
                    "resp_h".to_string(),
                    Value::Address(vast_value::Address::parse(resp_h).unwrap()),
                )]),
            ),
            (
                "duration".to_string(),
                Value::Duration(vast_value::Duration::from_secs_f64(duration_secs)),
            ),
        ]);
        Event::new(
            EventId::new(id),
            TimePoint::from_nanos_since_epoch(time_secs * 1_000_000_000),
            "conn",
            record,
        )
    }

    #[test]
    fn scenario_three_end_to_end_through_the_store() {
        let mut store = IndexStore::new(&schema());
        store.push_event(0, &conn_event(0, 0, "192.168.1.5", 1.5)).unwrap();
        store.push_event(1, &conn_event(1, 1, "192.168.1.5", 0.5)).unwrap();
        store.push_event(2, &conn_event(2, 2, "10.0.0.1", 2.0)).unwrap();

        let resp_h_steps = schema().resolve("id.resp_h").unwrap();
        let subnet_hits = store
            .lookup_field(
                &resp_h_steps,
                ClauseOp::In,
                &Value::Subnet(vast_value::Subnet::parse("192.168.0.0/16").unwrap()),
            )
            .unwrap();
        assert!(subnet_hits.get(0) && subnet_hits.get(1) && !subnet_hits.get(2));

        let duration_steps = schema().resolve("duration").unwrap();
        let duration_hits = store
            .lookup_field(
                &duration_steps,
                ClauseOp::Gt,
                &Value::Duration(vast_value::Duration::from_secs_f64(1.0)),
            )
            .unwrap();
        assert!(duration_hits.get(0) && !duration_hits.get(1) && duration_hits.get(2));

        let combined = bm::and(&subnet_hits, &duration_hits);
        assert!(combined.get(0) && !combined.get(1) && !combined.get(2));
    }

    #[test]
    fn name_tag_index_matches_scenario_six() {
        let mut store = IndexStore::new(&RecordSchema::default());
        let empty = Value::record(vec![]);
        for (i, n) in ["http_req", "dns", "http_resp"].iter().enumerate() {
            let e = Event::new(EventId::new(i as u64), TimePoint::EPOCH, *n, empty.clone());
            store.push_event(i as u64, &e).unwrap();
        }
        let hits = store
            .name_index()
            .lookup(
                ClauseOp::Match,
                &Value::Pattern(vast_value::Pattern::new("http.*").unwrap()),
            )
            .unwrap();
        assert!(hits.get(0) && !hits.get(1) && hits.get(2));
    }

    #[test]
    fn unresolved_path_reads_as_no_match() {
        let store = IndexStore::new(&RecordSchema::default());
        let steps = vec![OffsetStep {
            name: "nope".to_string(),
            ty: TypeTag::Int,
        }];
        let hits = store.lookup_field(&steps, ClauseOp::Eq, &Value::Int(1)).unwrap();
        assert_eq!(hits.size(), 0);
    }
}
