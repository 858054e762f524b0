//! Events and event identifiers (§3).

use std::fmt;

use crate::time::TimePoint;
use crate::value::Value;

/// A globally unique, monotonically increasing 64-bit event identifier.
/// `0` is reserved; `EventId::MAX` marks exhaustion of the ID space
/// (`max_event_id` in `spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

impl EventId {
    pub const RESERVED: Self = Self(0);
    pub const MAX: Self = Self(u64::MAX);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn is_reserved(&self) -> bool {
        *self == Self::RESERVED
    }

    pub fn is_exhausted(&self) -> bool {
        *self == Self::MAX
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A `(id, time, record-value)` triple, plus the record's type name —
/// every event a parser emits is an instance of some named event type
/// (`conn`, `dns`, `http_req`, ...), and `&name` tag clauses (§4.4, §6)
/// query against that name. Events are immutable after ID assignment:
/// no `&mut` accessors are exposed, only constructors and getters.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    id: EventId,
    time: TimePoint,
    name: String,
    data: Value,
}

impl Event {
    /// Construct an event. `data` must be a `Value::Record`; anything
    /// else is a programmer error in the caller (parsers always emit
    /// records), so this asserts rather than returning a `Result`.
    pub fn new(id: EventId, time: TimePoint, name: impl Into<String>, data: Value) -> Self {
        assert!(
            matches!(data, Value::Record(_)),
            "event data must be a record"
        );
        Self {
            id,
            time,
            name: name.into(),
            data,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn time(&self) -> TimePoint {
        self.time
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Restamp this event with a freshly assigned ID, consuming the
    /// unstamped draft. Used by the importer at ingest time (§4.5).
    pub fn with_id(self, id: EventId) -> Self {
        Self { id, ..self }
    }
}
