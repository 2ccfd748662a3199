//! Binding of structured calls onto method parameters.

use crate::call::Call;
use crate::function::{Method, ParamKind};
use crate::value::unpack;
use itertools::Itertools;
use serde_json::{Map, Value as Json};
use std::collections::HashSet;
use thiserror::Error;

pub type JsonMap = Map<String, Json>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("Function '{function}' requires parameter '{param}'")]
    MissingArgument { function: String, param: String },
    #[error("Function was supplied {0} extra arguments")]
    ExtraArguments(usize),
    #[error("Function was supplied extra named arguments {}", format_names(.0))]
    ExtraNamedArguments(Vec<String>),
}

fn format_names(names: &[String]) -> String {
    names.iter().map(|name| format!("\"{name}\"")).join(", ")
}

/// Arguments ready to hand to a function body. A repeats parameter occupies a
/// single array slot in `args`; an extends parameter fills `named_args`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    pub args: Vec<Json>,
    pub named_args: Option<JsonMap>,
}

pub fn bind(function: &str, method: &Method, call: &Call) -> Result<BoundArgs, BindError> {
    let positional = call.positional();
    let mut cursor = 0;
    let mut used_names = HashSet::new();
    let mut bound = BoundArgs::default();

    for param in &method.params {
        match param.kind {
            ParamKind::Repeats => {
                let remaining = positional[cursor..]
                    .iter()
                    .map(|value| unpack(Some(value)).unwrap_or(Json::Null))
                    .collect();
                cursor = positional.len();
                bound.args.push(Json::Array(remaining));
                break;
            }
            ParamKind::Extends => {
                if let Some(named) = &call.named_args {
                    let mut rest = JsonMap::new();
                    for (name, value) in named {
                        if used_names.insert(name.as_str()) {
                            rest.insert(name.clone(), unpack(Some(value)).unwrap_or(Json::Null));
                        }
                    }
                    bound.named_args = Some(rest);
                }
                break;
            }
            ParamKind::Positional => {
                let by_name = call
                    .named_args
                    .as_ref()
                    .and_then(|named| named.get_key_value(param.name.as_str()));
                let argument = match by_name {
                    Some((name, value)) => {
                        used_names.insert(name.as_str());
                        Some(value)
                    }
                    None => {
                        let value = positional.get(cursor);
                        if value.is_some() {
                            cursor += 1;
                        }
                        value
                    }
                };
                match (argument, &param.default) {
                    (Some(value), _) => bound.args.push(unpack(Some(value)).unwrap_or(Json::Null)),
                    (None, Some(default)) => bound.args.push(default.clone()),
                    (None, None) => {
                        return Err(BindError::MissingArgument {
                            function: function.to_string(),
                            param: param.name.clone(),
                        })
                    }
                }
            }
        }
    }

    if cursor < positional.len() {
        return Err(BindError::ExtraArguments(positional.len() - cursor));
    }
    if let Some(named) = &call.named_args {
        let extra: Vec<String> = named
            .keys()
            .filter(|name| !used_names.contains(name.as_str()))
            .cloned()
            .collect();
        if !extra.is_empty() {
            return Err(BindError::ExtraNamedArguments(extra));
        }
    }
    Ok(bound)
}
