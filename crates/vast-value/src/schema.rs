//! Record schemas and typed field resolution.
//!
//! `spec.md` §9 Open Question 1: the source's `event_clause` validator
//! overwrote `lhs[1]` with `"0"` and truncated, rather than resolving
//! the `identifier.identifier` pair against the event's schema. This
//! module is that resolution: a `RecordSchema` maps a dotted
//! `namespace.field` path to an offset path plus its `TypeTag`, so
//! `vast-query`'s validator can look up a real type instead of copying
//! the placeholder.

use crate::error::ValueError;

/// The primitive type tags of §6's `type_name` grammar, used for static
/// operator-legality checks (§4.3) against a clause's inferred LHS type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    Int,
    UInt,
    Double,
    Duration,
    TimePoint,
    String,
    Pattern,
    Address,
    Subnet,
    Port,
    Vector,
    Set,
    Table,
    Record,
}

/// A field's declared type: a primitive tag, or (recursively) a nested
/// record schema.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Primitive(TypeTag),
    Record(RecordSchema),
}

impl FieldType {
    /// The `TypeTag` a clause sees when comparing against this field —
    /// nested records resolve to `TypeTag::Record` itself (comparisons
    /// against a whole record are not legal per §4.3's static matrix, but
    /// the tag must still exist for the "unknown field" vs. "wrong type"
    /// distinction to work).
    pub fn tag(&self) -> TypeTag {
        match self {
            FieldType::Primitive(t) => *t,
            FieldType::Record(_) => TypeTag::Record,
        }
    }
}

/// One offset step: the field name plus its resolved type, recorded so a
/// caller can both print the resolved path and know its final type
/// without re-walking the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetStep {
    pub name: String,
    pub ty: TypeTag,
}

/// A record's field list, used to resolve `namespace.field` paths (the
/// `event_clause` grammar in §4.4/§6) to an offset path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSchema {
    fields: Vec<(String, FieldType)>,
}

impl RecordSchema {
    pub fn new(fields: Vec<(String, FieldType)>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[(String, FieldType)] {
        &self.fields
    }

    /// Resolve a dotted path (`"conn.id.resp_h"` -> `["conn", "id",
    /// "resp_h"]`) against this schema, descending into nested records
    /// one segment at a time. Returns the full offset path with each
    /// step's resolved type, or a `ValueError` naming the first segment
    /// that fails to resolve.
    pub fn resolve(&self, path: &str) -> Result<Vec<OffsetStep>, ValueError> {
        let segments: Vec<&str> = path.split('.').collect();
        let mut steps = Vec::with_capacity(segments.len());
        let mut current = self;
        let mut consumed = String::new();

        for (i, seg) in segments.iter().enumerate() {
            let (_, field_ty) = current
                .fields
                .iter()
                .find(|(name, _)| name == seg)
                .ok_or_else(|| ValueError::UnknownField(path.to_string()))?;

            steps.push(OffsetStep {
                name: seg.to_string(),
                ty: field_ty.tag(),
            });

            let is_last = i + 1 == segments.len();
            if !is_last {
                match field_ty {
                    FieldType::Record(nested) => current = nested,
                    _ => {
                        return Err(ValueError::NotARecord(
                            if consumed.is_empty() {
                                seg.to_string()
                            } else {
                                format!("{consumed}.{seg}")
                            },
                            segments[i + 1].to_string(),
                        ));
                    }
                }
            }
            if !consumed.is_empty() {
                consumed.push('.');
            }
            consumed.push_str(seg);
        }

        Ok(steps)
    }

    /// Every field path whose resolved type is `tag`, depth-first,
    /// including nested records — used by `vast-query`'s `@type` clause
    /// (a VAST "type extractor": match any field declared as `tag`,
    /// wherever it lives in the schema).
    pub fn fields_of_type(&self, tag: TypeTag) -> Vec<Vec<OffsetStep>> {
        let mut out = Vec::new();
        self.collect_fields_of_type(tag, &mut Vec::new(), &mut out);
        out
    }

    fn collect_fields_of_type(
        &self,
        tag: TypeTag,
        prefix: &mut Vec<OffsetStep>,
        out: &mut Vec<Vec<OffsetStep>>,
    ) {
        for (name, field_ty) in &self.fields {
            prefix.push(OffsetStep {
                name: name.clone(),
                ty: field_ty.tag(),
            });
            if field_ty.tag() == tag {
                out.push(prefix.clone());
            }
            if let FieldType::Record(nested) = field_ty {
                nested.collect_fields_of_type(tag, prefix, out);
            }
            prefix.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn_schema() -> RecordSchema {
        let id_schema = RecordSchema::new(vec![
            ("resp_h".to_string(), FieldType::Primitive(TypeTag::Address)),
            ("orig_h".to_string(), FieldType::Primitive(TypeTag::Address)),
        ]);
        RecordSchema::new(vec![
            ("id".to_string(), FieldType::Record(id_schema)),
            ("duration".to_string(), FieldType::Primitive(TypeTag::Duration)),
        ])
    }

    #[test]
    fn resolves_a_nested_dotted_path() {
        let schema = conn_schema();
        let steps = schema.resolve("id.resp_h").unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].name, "id");
        assert_eq!(steps[1].name, "resp_h");
        assert_eq!(steps[1].ty, TypeTag::Address);
    }

    #[test]
    fn resolves_a_top_level_path() {
        let schema = conn_schema();
        let steps = schema.resolve("duration").unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].ty, TypeTag::Duration);
    }

    #[test]
    fn unknown_field_is_an_error() {
        let schema = conn_schema();
        assert!(schema.resolve("nope").is_err());
        assert!(schema.resolve("id.nope").is_err());
    }

    #[test]
    fn descending_into_a_non_record_is_an_error() {
        let schema = conn_schema();
        assert!(matches!(
            schema.resolve("duration.nanos"),
            Err(ValueError::NotARecord(_, _))
        ));
    }

    #[test]
    fn fields_of_type_finds_nested_matches() {
        let schema = conn_schema();
        let addrs = schema.fields_of_type(TypeTag::Address);
        assert_eq!(addrs.len(), 2);
        assert_eq!(addrs[0].last().unwrap().name, "resp_h");
        assert_eq!(addrs[1].last().unwrap().name, "orig_h");
    }
}
