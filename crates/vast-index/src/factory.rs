//! Picks the right [`ValueIndex`] implementation for a field's declared
//! primitive type (§4.3). Used by [`crate::store::IndexStore`] when it
//! walks a `RecordSchema` to build one index per leaf field.

use vast_value::TypeTag;

use crate::address_index::AddressIndex;
use crate::arithmetic::{ArithmeticIndex, NumKind};
use crate::bool_index::BoolIndex;
use crate::container::{SetIndex, TableIndex, VectorIndex};
use crate::pattern_index::PatternIndex;
use crate::port_index::PortIndex;
use crate::string_index::StringIndex;
use crate::subnet_index::SubnetIndex;
use crate::value_index::ValueIndex;

/// Construct a fresh, empty index for a field declared as `tag`.
///
/// `TypeTag::Record` never reaches this: a record-typed field is not
/// itself indexed, the schema walk recurses into its own leaf fields
/// instead (§3 "Index": "position i ... matches the key under the
/// index's operator semantics", which only makes sense for a scalar or
/// container leaf).
pub fn make_index(tag: TypeTag) -> Box<dyn ValueIndex> {
    match tag {
        TypeTag::Bool => Box::new(BoolIndex::new()),
        TypeTag::Int => Box::new(ArithmeticIndex::new(NumKind::Int)),
        TypeTag::UInt => Box::new(ArithmeticIndex::new(NumKind::UInt)),
        TypeTag::Double => Box::new(ArithmeticIndex::new(NumKind::Double)),
        TypeTag::Duration => Box::new(ArithmeticIndex::new(NumKind::Duration)),
        TypeTag::TimePoint => Box::new(ArithmeticIndex::new(NumKind::TimePoint)),
        TypeTag::String => Box::new(StringIndex::new()),
        TypeTag::Pattern => Box::new(PatternIndex::new()),
        TypeTag::Address => Box::new(AddressIndex::new()),
        TypeTag::Subnet => Box::new(SubnetIndex::new()),
        TypeTag::Port => Box::new(PortIndex::new()),
        TypeTag::Vector => Box::new(VectorIndex::new()),
        TypeTag::Set => Box::new(SetIndex::new()),
        TypeTag::Table => Box::new(TableIndex::new()),
        TypeTag::Record => unreachable!("record fields are recursed into, never indexed directly"),
    }
}
