use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// Reference to a callable, by id or by library and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl FunctionRef {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn in_library(library: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            library: Some(library.into()),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Read a reference back out of a packed function value's data.
    pub fn from_json(data: &Json) -> Option<Self> {
        serde_json::from_value(data.clone()).ok()
    }

    pub fn to_json(&self) -> Json {
        let mut map = Map::new();
        for (key, value) in [
            ("id", &self.id),
            ("library", &self.library),
            ("name", &self.name),
            ("context", &self.context),
        ] {
            if let Some(value) = value {
                map.insert(key.to_string(), Json::String(value.clone()));
            }
        }
        Json::Object(map)
    }

    /// Human readable key used in resolution errors.
    pub fn label(&self) -> &str {
        self.id
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("<anonymous>")
    }
}

/// A structured call: `{ type: "call", func, args?, namedArgs? }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "call", rename_all = "camelCase")]
pub struct Call {
    pub func: FunctionRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_args: Option<IndexMap<String, Value>>,
}

impl Call {
    pub fn new(func: FunctionRef) -> Self {
        Self {
            func,
            args: None,
            named_args: None,
        }
    }

    pub fn arg(mut self, value: Value) -> Self {
        self.args.get_or_insert_with(Vec::new).push(value);
        self
    }

    pub fn named_arg(mut self, name: impl Into<String>, value: Value) -> Self {
        self.named_args
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), value);
        self
    }

    pub fn positional(&self) -> &[Value] {
        self.args.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Type;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn named_args_keep_call_order() {
        let call: Call = serde_json::from_value(json!({
            "type": "call",
            "func": {"name": "f"},
            "namedArgs": {
                "zeta": {"type": "integer", "data": 1},
                "alpha": {"type": "integer", "data": 2}
            }
        }))
        .unwrap();
        let names: Vec<_> = call.named_args.unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn serializes_with_call_tag() {
        let call = Call::new(FunctionRef::by_id("f1")).arg(Value::new(Type::Integer, json!(3)));
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({
                "type": "call",
                "func": {"id": "f1"},
                "args": [{"type": "integer", "data": 3}]
            })
        );
    }
}
