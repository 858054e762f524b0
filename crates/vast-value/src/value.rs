//! The tagged-union `Value` type (§3).

use std::cmp::Ordering;
use std::fmt;

use crate::address::{Address, Subnet};
use crate::pattern::Pattern;
use crate::port::Port;
use crate::time::{Duration, TimePoint};

/// A typed value. Equality and ordering are defined only within
/// compatible variant pairs (§4.3): comparing across variants is not a
/// type error the caller is protected from, it simply never holds — an
/// `Int` is never `==` a `UInt`, even when numerically equal. Callers
/// that need cross-type arithmetic coercion perform it explicitly before
/// constructing a `Value`.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Double(f64),
    Duration(Duration),
    TimePoint(TimePoint),
    String(String),
    Pattern(Pattern),
    Address(Address),
    Subnet(Subnet),
    Port(Port),
    Vector(Vec<Value>),
    Set(Vec<Value>),
    Table(Vec<(Value, Value)>),
    Record(Vec<(String, Value)>),
    None,
    Invalid,
}

impl Value {
    /// Build a `Set` value, sorted and deduplicated per §2.1 — sets are
    /// unordered collections, so construction normalizes representation
    /// for equality to work structurally.
    pub fn set(mut elements: Vec<Value>) -> Value {
        elements.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        elements.dedup_by(|a, b| a == b);
        Value::Set(elements)
    }

    pub fn record(fields: Vec<(String, Value)>) -> Value {
        Value::Record(fields)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Value::Invalid)
    }

    /// Look up a field by name on a `Record` value. `None` if this is
    /// not a record or the field is absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// This value's `TypeTag`, for error reporting and operator-legality
    /// checks. `None`/`Invalid` have no tag; indexes never see them
    /// (`push` takes `Option<&Value>` for the absent case instead).
    pub fn type_tag(&self) -> Option<crate::schema::TypeTag> {
        use crate::schema::TypeTag;
        Some(match self {
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::UInt(_) => TypeTag::UInt,
            Value::Double(_) => TypeTag::Double,
            Value::Duration(_) => TypeTag::Duration,
            Value::TimePoint(_) => TypeTag::TimePoint,
            Value::String(_) => TypeTag::String,
            Value::Pattern(_) => TypeTag::Pattern,
            Value::Address(_) => TypeTag::Address,
            Value::Subnet(_) => TypeTag::Subnet,
            Value::Port(_) => TypeTag::Port,
            Value::Vector(_) => TypeTag::Vector,
            Value::Set(_) => TypeTag::Set,
            Value::Table(_) => TypeTag::Table,
            Value::Record(_) => TypeTag::Record,
            Value::None | Value::Invalid => return Option::None,
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::UInt(u) => write!(f, "{u}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Duration(d) => write!(f, "{d}"),
            Value::TimePoint(t) => write!(f, "{t}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Pattern(p) => write!(f, "{p}"),
            Value::Address(a) => write!(f, "{a}"),
            Value::Subnet(s) => write!(f, "{s}"),
            Value::Port(p) => write!(f, "{p}"),
            Value::Vector(v) => {
                write!(f, "[")?;
                for (i, e) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "]")
            }
            Value::Set(v) => {
                write!(f, "{{")?;
                for (i, e) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "}}")
            }
            Value::Table(t) => {
                write!(f, "{{")?;
                for (i, (k, v)) in t.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k} -> {v}")?;
                }
                write!(f, "}}")
            }
            Value::Record(fields) => {
                write!(f, "<")?;
                for (i, (name, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {v}")?;
                }
                write!(f, ">")
            }
            Value::None => write!(f, "none"),
            Value::Invalid => write!(f, "invalid"),
        }
    }
}

/// Cross-variant comparisons are `false`, never a panic: `Value` is used
/// in hash maps and sorted collections where a stray cross-type
/// comparison must not abort a query, it should just never match.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (UInt(a), UInt(b)) => a == b,
            (Double(a), Double(b)) => a == b,
            (Duration(a), Duration(b)) => a == b,
            (TimePoint(a), TimePoint(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Pattern(a), Pattern(b)) => a == b,
            (Address(a), Address(b)) => a == b,
            (Subnet(a), Subnet(b)) => a == b,
            (Port(a), Port(b)) => a == b,
            (Vector(a), Vector(b)) => a == b,
            (Set(a), Set(b)) => a == b,
            (Table(a), Table(b)) => a == b,
            (Record(a), Record(b)) => a == b,
            (None, None) => true,
            (Invalid, Invalid) => true,
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.partial_cmp(b),
            (Int(a), Int(b)) => a.partial_cmp(b),
            (UInt(a), UInt(b)) => a.partial_cmp(b),
            (Double(a), Double(b)) => a.partial_cmp(b),
            (Duration(a), Duration(b)) => a.partial_cmp(b),
            (TimePoint(a), TimePoint(b)) => a.partial_cmp(b),
            (String(a), String(b)) => a.partial_cmp(b),
            (Address(a), Address(b)) => a.partial_cmp(b),
            (Port(a), Port(b)) => a.partial_cmp(b),
            _ => Option::None,
        }
    }
}
