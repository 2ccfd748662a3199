//! The value type lattice.
//!
//! `any` is the root and every other type has exactly one parent. Arrays are
//! parameterised by their element type, and `array[T]` sits under
//! `array[parent(T)]` when that is itself a typed array, otherwise under
//! `array`. Unknown tags survive as [`Type::Named`] leaves under `any`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Any,
    Null,
    Boolean,
    Number,
    Integer,
    String,
    Object,
    Array,
    ArrayOf(Box<Type>),
    Table,
    Image,
    Function,
    Named(String),
}

impl Type {
    pub fn array_of(element: Type) -> Self {
        Type::ArrayOf(Box::new(element))
    }

    /// Every type the lattice knows about, parents before children.
    pub fn known() -> Vec<Type> {
        vec![
            Type::Any,
            Type::Null,
            Type::Boolean,
            Type::Number,
            Type::Integer,
            Type::String,
            Type::Object,
            Type::Array,
            Type::array_of(Type::Boolean),
            Type::array_of(Type::Number),
            Type::array_of(Type::Integer),
            Type::array_of(Type::String),
            Type::array_of(Type::Object),
            Type::Table,
            Type::Image,
            Type::Function,
        ]
    }

    pub fn parent(&self) -> Option<Type> {
        match self {
            Type::Any => None,
            Type::Integer => Some(Type::Number),
            Type::ArrayOf(element) => match element.parent() {
                Some(Type::Any) | None => Some(Type::Array),
                Some(parent) => Some(Type::array_of(parent)),
            },
            _ => Some(Type::Any),
        }
    }

    /// Parent chain from the immediate parent up to `any`.
    pub fn ancestors(&self) -> Vec<Type> {
        let mut chain = Vec::new();
        let mut current = self.parent();
        while let Some(ty) = current {
            current = ty.parent();
            chain.push(ty);
        }
        chain
    }

    /// True when `self` equals `other` or descends from it.
    pub fn is_a(&self, other: &Type) -> bool {
        self == other || self.ancestors().iter().any(|ancestor| ancestor == other)
    }

    pub fn children(&self) -> Vec<Type> {
        Type::known()
            .into_iter()
            .filter(|ty| ty.parent().as_ref() == Some(self))
            .collect()
    }

    pub fn descendants(&self) -> Vec<Type> {
        Type::known()
            .into_iter()
            .filter(|ty| ty != self && ty.is_a(self))
            .collect()
    }

    /// Most specific type shared by two element types.
    pub fn unify(&self, other: &Type) -> Type {
        match (self, other) {
            (a, b) if a == b => a.clone(),
            (Type::Integer, Type::Number) | (Type::Number, Type::Integer) => Type::Number,
            _ => Type::Any,
        }
    }

    /// The array type describing a homogeneous sequence of element types.
    pub fn coerced_array_type<'a>(elements: impl IntoIterator<Item = &'a Type>) -> Type {
        let element = elements
            .into_iter()
            .fold(None, |acc: Option<Type>, next| match acc {
                None => Some(next.clone()),
                Some(acc) => Some(acc.unify(next)),
            });
        match element {
            None | Some(Type::Any) => Type::Array,
            Some(element) => Type::array_of(element),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("any"),
            Type::Null => f.write_str("null"),
            Type::Boolean => f.write_str("boolean"),
            Type::Number => f.write_str("number"),
            Type::Integer => f.write_str("integer"),
            Type::String => f.write_str("string"),
            Type::Object => f.write_str("object"),
            Type::Array => f.write_str("array"),
            Type::ArrayOf(element) => write!(f, "array[{element}]"),
            Type::Table => f.write_str("table"),
            Type::Image => f.write_str("image"),
            Type::Function => f.write_str("function"),
            Type::Named(name) => f.write_str(name),
        }
    }
}

impl From<&str> for Type {
    fn from(tag: &str) -> Self {
        match tag {
            "any" => Type::Any,
            "null" => Type::Null,
            "boolean" => Type::Boolean,
            "number" => Type::Number,
            "integer" => Type::Integer,
            "string" => Type::String,
            "object" => Type::Object,
            "array" => Type::Array,
            "table" => Type::Table,
            "image" => Type::Image,
            "function" => Type::Function,
            other => match other
                .strip_prefix("array[")
                .and_then(|rest| rest.strip_suffix(']'))
            {
                Some(element) if !element.is_empty() => Type::array_of(Type::from(element)),
                _ => Type::Named(other.to_string()),
            },
        }
    }
}

impl FromStr for Type {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Type::from(s))
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Type {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Type::from(tag.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn children_follow_parent_links() {
        assert_eq!(Type::Number.children(), vec![Type::Integer]);
        assert_eq!(Type::Table.children(), vec![]);
        assert_eq!(
            Type::array_of(Type::Number).children(),
            vec![Type::array_of(Type::Integer)]
        );
    }

    #[test]
    fn descendants_include_grandchildren() {
        assert_eq!(Type::Table.descendants(), vec![]);
        assert_eq!(
            Type::Array.descendants(),
            vec![
                Type::array_of(Type::Boolean),
                Type::array_of(Type::Number),
                Type::array_of(Type::Integer),
                Type::array_of(Type::String),
                Type::array_of(Type::Object),
            ]
        );
        assert!(Type::array_of(Type::Integer).is_a(&Type::Array));
        assert!(Type::Integer.is_a(&Type::Any));
        assert!(!Type::Number.is_a(&Type::Integer));
    }

    #[test]
    fn tags_round_trip_through_text() {
        for ty in Type::known() {
            assert_eq!(Type::from(ty.to_string().as_str()), ty);
        }
        assert_eq!(Type::from("matrix"), Type::Named("matrix".into()));
        assert_eq!(Type::from("array[]"), Type::Named("array[]".into()));
    }

    #[test]
    fn coerces_array_element_types() {
        let ints = [Type::Integer, Type::Integer];
        assert_eq!(
            Type::coerced_array_type(&ints),
            Type::array_of(Type::Integer)
        );
        let mixed_numbers = [Type::Integer, Type::Number, Type::Integer];
        assert_eq!(
            Type::coerced_array_type(&mixed_numbers),
            Type::array_of(Type::Number)
        );
        let mixed = [Type::Integer, Type::String];
        assert_eq!(Type::coerced_array_type(&mixed), Type::Array);
        assert_eq!(Type::coerced_array_type(std::iter::empty()), Type::Array);
    }
}
