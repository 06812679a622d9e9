//! Reduction of host values to wire values.
//!
//! Serialization is total. Scalars pass through, objects exposing an id
//! become typed handle descriptors, lists are reduced element by element, and
//! everything else falls back to its textual form.

use easel_proto::{HandleDescriptor, WireValue};

use crate::host::HostValue;

/// Converts a host value into its wire representation.
#[must_use]
pub fn serialize(value: &HostValue) -> WireValue {
    match value {
        HostValue::Null => WireValue::Null,
        HostValue::Bool(flag) => WireValue::Bool(*flag),
        HostValue::Int(number) => WireValue::Int(*number),
        HostValue::Float(number) if number.is_finite() => WireValue::Float(*number),
        HostValue::Str(text) => WireValue::Str(text.clone()),
        HostValue::Object(node) => match node.identity() {
            Some(id) => WireValue::Handle(HandleDescriptor::typed(id, node.kind())),
            None => WireValue::Str(node.describe()),
        },
        HostValue::List(items) => WireValue::List(items.iter().map(serialize).collect()),
        HostValue::Float(_) | HostValue::Map(_) => WireValue::Str(value.to_string()),
    }
}
