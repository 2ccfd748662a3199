//! Callable specifications extracted from function definitions.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "function")]
pub struct FunctionSpec {
    pub name: String,
    pub code: String,
    /// Method variants, keyed by signature on the wire.
    #[serde(with = "methods_by_signature")]
    pub methods: Vec<Method>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FunctionSpec {
    /// The method used for binding calls.
    pub fn primary_method(&self) -> Option<&Method> {
        self.methods.first()
    }

    pub fn method(&self, signature: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.signature == signature)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Method {
    #[serde(default)]
    pub signature: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Return>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Method {
    /// `name(p1, p2: type)` followed by `: returnType` when the return type is known.
    pub fn signature_for(name: &str, params: &[Param], returns: Option<&Return>) -> String {
        let params = params
            .iter()
            .map(|param| match &param.ty {
                Some(ty) => format!("{}: {}", param.name, ty),
                None => param.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let mut signature = format!("{name}({params})");
        if let Some(ty) = returns.and_then(|returns| returns.ty.as_ref()) {
            signature.push_str(": ");
            signature.push_str(ty);
        }
        signature
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Return {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub usage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParamKind {
    #[default]
    Positional,
    /// Collects the remaining positional arguments.
    Repeats,
    /// Collects the remaining named arguments.
    Extends,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParamRepr", into = "ParamRepr")]
pub struct Param {
    pub name: String,
    pub ty: Option<String>,
    pub kind: ParamKind,
    pub default: Option<Json>,
    pub description: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_default(mut self, default: Json) -> Self {
        self.default = Some(default);
        self
    }

    pub fn is_variadic(&self) -> bool {
        self.kind != ParamKind::Positional
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Wire shape of [`Param`], with the kind spelled as two flags.
#[derive(Serialize, Deserialize)]
struct ParamRepr {
    name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    ty: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    repeats: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    extends: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl From<ParamRepr> for Param {
    fn from(repr: ParamRepr) -> Self {
        let kind = match (repr.repeats, repr.extends) {
            (true, _) => ParamKind::Repeats,
            (false, true) => ParamKind::Extends,
            (false, false) => ParamKind::Positional,
        };
        Param {
            name: repr.name,
            ty: repr.ty,
            kind,
            default: repr.default,
            description: repr.description,
        }
    }
}

impl From<Param> for ParamRepr {
    fn from(param: Param) -> Self {
        ParamRepr {
            name: param.name,
            ty: param.ty,
            repeats: param.kind == ParamKind::Repeats,
            extends: param.kind == ParamKind::Extends,
            default: param.default,
            description: param.description,
        }
    }
}

mod methods_by_signature {
    use super::*;

    pub fn serialize<S: Serializer>(methods: &[Method], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(methods.len()))?;
        for method in methods {
            map.serialize_entry(&method.signature, method)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Method>, D::Error> {
        deserializer.deserialize_map(MethodsVisitor)
    }

    struct MethodsVisitor;

    impl<'de> Visitor<'de> for MethodsVisitor {
        type Value = Vec<Method>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of signature to method")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut methods = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((signature, mut method)) = access.next_entry::<String, Method>()? {
                if method.signature.is_empty() {
                    method.signature = signature;
                }
                methods.push(method);
            }
            Ok(methods)
        }
    }
}
