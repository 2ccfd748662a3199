use crate::diagnostics::Message;
use crate::function::FunctionSpec;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// The result of compiling one cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub code: String,
    /// Free names in first-occurrence order.
    pub inputs: Vec<Input>,
    /// At most one entry.
    pub outputs: Vec<Output>,
    pub messages: Vec<Message>,
    pub expr: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implicit_return: Option<String>,
}

impl Cell {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|input| input.name.as_str())
    }

    pub fn output(&self) -> Option<&Output> {
        self.outputs.first()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(Message::is_error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Input {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Output {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<FunctionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Output {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn function(spec: FunctionSpec) -> Self {
        Self {
            name: Some(spec.name.clone()),
            spec: Some(spec),
            value: None,
        }
    }
}
