use std::time::{Duration, SystemTime};

use crate::description::{FieldType, ScalarKind, ValueKind};

/// Whether a field of this type is an association to another model.
///
/// Scalars and well-known value types (timestamps, uuids, ...) are never
/// models, including their optional and list forms.
pub fn is_model(ty: &FieldType) -> bool {
    match ty {
        FieldType::Model(_) => true,
        FieldType::Optional(inner) | FieldType::List(inner) => is_model(inner),
        FieldType::Scalar(_) | FieldType::Value(_) => false,
    }
}

/// Maps a Rust field type to its [`FieldType`].
pub trait FieldTyped {
    fn field_type() -> FieldType;
}

macro_rules! scalar {
    ($kind:expr => $($t:ty),+) => {
        $(
            impl FieldTyped for $t {
                fn field_type() -> FieldType {
                    FieldType::Scalar($kind)
                }
            }
        )+
    };
}

scalar!(ScalarKind::String => String, &'static str);
scalar!(ScalarKind::Int => i8, i16, i32, i64, u8, u16, u32, u64);
scalar!(ScalarKind::Float => f32, f64);
scalar!(ScalarKind::Bool => bool);
scalar!(ScalarKind::Bytes => Vec<u8>);

macro_rules! value {
    ($kind:expr => $($t:ty),+) => {
        $(
            impl FieldTyped for $t {
                fn field_type() -> FieldType {
                    FieldType::Value($kind)
                }
            }
        )+
    };
}

value!(ValueKind::Timestamp => SystemTime, bson::DateTime, bson::Timestamp);
value!(ValueKind::Duration => Duration);
value!(ValueKind::Uuid => bson::Uuid);
value!(ValueKind::Decimal => bson::Decimal128);
value!(ValueKind::ObjectId => bson::oid::ObjectId);

impl<T: FieldTyped> FieldTyped for Option<T> {
    fn field_type() -> FieldType {
        FieldType::optional(T::field_type())
    }
}

impl<T: FieldTyped> FieldTyped for Box<T> {
    fn field_type() -> FieldType {
        FieldType::optional(T::field_type())
    }
}

impl FieldType {
    pub fn of<T: FieldTyped>() -> Self {
        T::field_type()
    }
}
