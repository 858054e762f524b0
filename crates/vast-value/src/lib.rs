//! Typed value model: the tagged-union `Value`, event identifiers and
//! events, and record schemas for resolving dotted field paths.

pub mod address;
pub mod error;
pub mod event;
pub mod pattern;
pub mod port;
pub mod schema;
pub mod time;
pub mod value;

pub use address::{Address, Subnet};
pub use error::ValueError;
pub use event::{Event, EventId};
pub use pattern::Pattern;
pub use port::{Port, Protocol};
pub use schema::{FieldType, OffsetStep, RecordSchema, TypeTag};
pub use time::{Duration, TimePoint};
pub use value::Value;
