//! Tagged values exchanged between cells and the host.

pub mod literal;
pub mod ty;

pub use literal::{parse_literal, LiteralError};
pub use ty::Type;

use crate::context::HostFunction;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as Json};
use std::sync::Arc;

/// Wire envelope `{ type, data?, src? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    #[serde(rename = "type")]
    pub ty: Type,
    /// `Some(Json::Null)` is a present null, `None` an absent field.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

fn deserialize_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Json>, D::Error> {
    Json::deserialize(deserializer).map(Some)
}

impl Value {
    pub fn new(ty: Type, data: Json) -> Self {
        Self {
            ty,
            data: Some(data),
            src: None,
        }
    }

    pub fn null() -> Self {
        Self::new(Type::Null, Json::Null)
    }

    pub fn image(src: impl Into<String>) -> Self {
        Self {
            ty: Type::Image,
            data: None,
            src: Some(src.into()),
        }
    }
}

/// A native value on the host side of the boundary.
#[derive(Debug, Clone)]
pub enum Native {
    Undefined,
    Json(Json),
    Function(Arc<HostFunction>),
}

impl From<Json> for Native {
    fn from(value: Json) -> Self {
        Native::Json(value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    /// Id of the context that owns packed function references.
    pub context: Option<String>,
}

pub fn type_of(value: &Native) -> Type {
    match value {
        Native::Undefined => Type::Null,
        Native::Json(json) => type_of_json(json),
        Native::Function(_) => Type::Function,
    }
}

pub fn type_of_json(value: &Json) -> Type {
    match value {
        Json::Null => Type::Null,
        Json::Bool(_) => Type::Boolean,
        Json::Number(number) => {
            let integral = number.is_i64()
                || number.is_u64()
                || number.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false);
            if integral {
                Type::Integer
            } else {
                Type::Number
            }
        }
        Json::String(_) => Type::String,
        Json::Array(_) => Type::Array,
        Json::Object(object) => match object.get("type").and_then(Json::as_str) {
            Some(tag) => Type::from(tag),
            None => Type::Object,
        },
    }
}

pub fn pack(value: &Native, options: &PackOptions) -> Value {
    match value {
        Native::Undefined | Native::Json(Json::Null) => Value::null(),
        Native::Function(function) => {
            let mut reference = Map::new();
            if let Some(id) = &function.id {
                reference.insert("id".into(), Json::String(id.clone()));
            }
            reference.insert("name".into(), Json::String(function.name.clone()));
            if let Some(context) = &options.context {
                reference.insert("context".into(), Json::String(context.clone()));
            }
            Value::new(Type::Function, Json::Object(reference))
        }
        Native::Json(json) => match json {
            Json::Object(object) if object.get("type").and_then(Json::as_str) == Some("image") => {
                Value {
                    ty: Type::Image,
                    data: None,
                    src: object.get("src").and_then(Json::as_str).map(str::to_string),
                }
            }
            _ => Value::new(type_of_json(json), json.clone()),
        },
    }
}

pub fn unpack(value: Option<&Value>) -> Option<Json> {
    value.and_then(|value| value.data.clone())
}

/// Pack a sequence of values as one array value with a coerced element type.
pub fn coerce_array(values: &[Value]) -> Value {
    let ty = Type::coerced_array_type(values.iter().map(|value| &value.ty));
    let data = values
        .iter()
        .map(|value| value.data.clone().unwrap_or(Json::Null))
        .collect();
    Value::new(ty, Json::Array(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn roundtrip(json: Json) -> Option<Json> {
        unpack(Some(&pack(&Native::Json(json), &PackOptions::default())))
    }

    #[test]
    fn unpack_inverts_pack() {
        for value in [
            json!(true),
            json!(42),
            json!(3.14),
            json!("text"),
            json!([1, 2]),
            json!({"a": 1}),
        ] {
            assert_eq!(roundtrip(value.clone()), Some(value));
        }
        assert_eq!(unpack(None), None);
    }

    #[test]
    fn packs_with_split_number_types() {
        let options = PackOptions::default();
        assert_eq!(pack(&Native::Json(json!(1)), &options).ty, Type::Integer);
        assert_eq!(pack(&Native::Json(json!(1.5)), &options).ty, Type::Number);
        assert_eq!(pack(&Native::Undefined, &options), Value::null());
        assert_eq!(
            pack(&Native::Json(json!({"type": "table", "data": {}})), &options).ty,
            Type::Table
        );
    }

    #[test]
    fn packs_images_by_source() {
        let packed = pack(
            &Native::Json(json!({"type": "image", "src": "plot.png"})),
            &PackOptions::default(),
        );
        assert_eq!(packed, Value::image("plot.png"));
        assert_eq!(
            serde_json::to_value(&packed).unwrap(),
            json!({"type": "image", "src": "plot.png"})
        );
    }

    #[test]
    fn null_data_survives_the_wire() {
        let value: Value = serde_json::from_value(json!({"type": "null", "data": null})).unwrap();
        assert_eq!(value.data, Some(Json::Null));
        let value: Value = serde_json::from_value(json!({"type": "null"})).unwrap();
        assert_eq!(value.data, None);
    }

    #[test]
    fn coerces_arrays_of_values() {
        let values = [
            Value::new(Type::Integer, json!(1)),
            Value::new(Type::Number, json!(2.5)),
        ];
        assert_eq!(
            coerce_array(&values),
            Value::new(Type::array_of(Type::Number), json!([1, 2.5]))
        );
    }
}
