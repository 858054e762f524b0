//! Per-field typed indexes and the bitmap algebra that backs clause
//! evaluation (§4).

pub mod address_index;
pub mod arithmetic;
pub mod bool_index;
pub mod container;
pub mod equality_index;
pub mod error;
pub mod factory;
pub mod op;
pub mod pattern_index;
pub mod port_index;
pub mod store;
pub mod string_index;
pub mod subnet_index;
pub mod value_index;

pub use address_index::AddressIndex;
pub use arithmetic::{ArithmeticIndex, NumKind};
pub use bool_index::BoolIndex;
pub use container::{SetIndex, TableIndex, VectorIndex};
pub use error::IndexError;
pub use factory::make_index;
pub use op::{operator_legal, value_matches, ClauseOp};
pub use pattern_index::PatternIndex;
pub use port_index::PortIndex;
pub use store::{IndexStore, TagField};
pub use string_index::StringIndex;
pub use subnet_index::SubnetIndex;
pub use value_index::ValueIndex;
