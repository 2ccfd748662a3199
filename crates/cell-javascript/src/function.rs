//! Building a [`FunctionSpec`] from a function declaration and the doc block
//! written directly above it.

use crate::doc::{parse_doc, DocTag, TypeExpr};
use crate::parser::{DocBlock, ParsedSource};
use cell_core::diagnostics::Message;
use cell_core::function::{Example, FunctionSpec, Method, Param, ParamKind, Return};
use cell_core::value::parse_literal;
use std::collections::HashSet;
use swc_common::{Span, Spanned};
use swc_ecma_ast::{Function, Pat};
use thiserror::Error;
use tracing::debug;

/// Marks a parameter that collects the remaining named arguments.
pub const EXTENDS_PREFIX: &str = "___";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Unhandled parameter node type \"{0}\"")]
    UnsupportedParam(&'static str),
    #[error("Parameter '{0}' collects remaining arguments and must be the last parameter")]
    VariadicNotLast(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFunction {
    pub spec: FunctionSpec,
    /// Recoverable problems found in defaults and documentation.
    pub messages: Vec<Message>,
}

pub struct FunctionSpecExtractor<'a> {
    parsed: &'a ParsedSource,
}

impl<'a> FunctionSpecExtractor<'a> {
    pub fn new(parsed: &'a ParsedSource) -> Self {
        Self { parsed }
    }

    /// `anchor` is the span of the whole statement declaring the function,
    /// including any `export default` prefix.
    pub fn extract(
        &self,
        name: &str,
        function: &Function,
        anchor: Span,
    ) -> Result<ExtractedFunction, ExtractError> {
        let mut messages = Vec::new();
        let mut params = self.declared_params(function, &mut messages)?;
        let mut spec = FunctionSpec {
            name: name.to_string(),
            code: self.parsed.source().to_string(),
            methods: Vec::new(),
            title: None,
            summary: None,
            description: None,
        };
        let mut method = Method::default();

        if let Some(doc) = self.find_doc(self.parsed.offset(anchor.lo)) {
            let (line, column) = self.parsed.line_col(doc.start);
            let mut report = |text: String| messages.push(Message::warning(text).at(line, column));
            let comment = parse_doc(&doc.text);
            spec.description = comment.description;
            let mut seen = HashSet::new();
            for tag in comment.tags {
                let title = tag.title.clone();
                let repeated = !seen.insert(title.clone());
                match title.as_str() {
                    "name" | "title" | "summary" | "description" | "return" | "returns"
                        if repeated =>
                    {
                        report(format!("Documentation tag @{title} is given more than once"));
                    }
                    "name" => {
                        if tag.name.as_deref() != Some(name) {
                            report(format!(
                                "Documentation tag @name with name \"{}\" differs from name in function definition",
                                tag.name.unwrap_or_default()
                            ));
                        }
                    }
                    "title" => spec.title = tag.description,
                    "summary" => spec.summary = tag.description,
                    "description" => spec.description = tag.description,
                    "param" | "arg" | "argument" => merge_param(name, &mut params, tag, &mut report),
                    "return" | "returns" => {
                        method.returns = Some(Return {
                            ty: tag.ty.map(|ty| ty.to_string()),
                            description: tag.description,
                        })
                    }
                    "example" => method.examples.push(Example {
                        usage: tag.description.unwrap_or_default(),
                        caption: tag.caption,
                    }),
                    other => debug!("ignoring documentation tag @{other} on {name}"),
                }
            }
        }

        method.signature = Method::signature_for(name, &params, method.returns.as_ref());
        method.params = params;
        spec.methods.push(method);
        Ok(ExtractedFunction { spec, messages })
    }

    fn declared_params(
        &self,
        function: &Function,
        messages: &mut Vec<Message>,
    ) -> Result<Vec<Param>, ExtractError> {
        let count = function.params.len();
        let mut params = Vec::with_capacity(count);
        for (index, param) in function.params.iter().enumerate() {
            let param = match &param.pat {
                Pat::Ident(binding) => split_extends(&binding.id.sym),
                Pat::Rest(rest) => match &*rest.arg {
                    Pat::Ident(binding) => {
                        Param::new(binding.id.sym.to_string()).with_kind(ParamKind::Repeats)
                    }
                    _ => return Err(ExtractError::UnsupportedParam("RestElement")),
                },
                Pat::Assign(assign) => match &*assign.left {
                    Pat::Ident(binding) => {
                        let mut param = Param::new(binding.id.sym.to_string());
                        let span = assign.right.span();
                        match parse_literal(self.parsed.snippet(span)) {
                            Ok(value) => param.default = Some(value),
                            Err(err) => {
                                let (line, column) = self.parsed.line_col(self.parsed.offset(span.lo));
                                messages.push(
                                    Message::warning(format!(
                                        "Default of parameter '{}' is not a literal ({err}) and is ignored",
                                        param.name
                                    ))
                                    .at(line, column),
                                );
                            }
                        }
                        param
                    }
                    _ => return Err(ExtractError::UnsupportedParam("AssignmentPattern")),
                },
                Pat::Array(_) => return Err(ExtractError::UnsupportedParam("ArrayPattern")),
                Pat::Object(_) => return Err(ExtractError::UnsupportedParam("ObjectPattern")),
                Pat::Expr(_) | Pat::Invalid(_) => {
                    return Err(ExtractError::UnsupportedParam("Expression"))
                }
            };
            if param.is_variadic() && index + 1 != count {
                return Err(ExtractError::VariadicNotLast(param.name));
            }
            params.push(param);
        }
        Ok(params)
    }

    /// The block comment ending right before `anchor`, separated from it by
    /// whitespace only.
    fn find_doc(&self, anchor: usize) -> Option<&DocBlock> {
        let source = self.parsed.source();
        self.parsed
            .docs
            .iter()
            .take_while(|doc| doc.end <= anchor)
            .last()
            .filter(|doc| {
                source
                    .get(doc.end..anchor)
                    .is_some_and(|gap| gap.trim().is_empty())
            })
    }
}

fn split_extends(name: &str) -> Param {
    match name.strip_prefix(EXTENDS_PREFIX) {
        Some(stripped) if !stripped.is_empty() => {
            Param::new(stripped).with_kind(ParamKind::Extends)
        }
        _ => Param::new(name),
    }
}

fn merge_param(function: &str, params: &mut [Param], tag: DocTag, report: &mut impl FnMut(String)) {
    let Some(doc_name) = tag.name else {
        report("Documentation tag @param has no parameter name".to_string());
        return;
    };
    let documented = split_extends(&doc_name);
    let (ty, hinted) = match &tag.ty {
        Some(TypeExpr::Rest(inner)) => (Some(inner.to_string()), Some(ParamKind::Repeats)),
        Some(TypeExpr::Name(ty)) if ty.starts_with(EXTENDS_PREFIX) => (
            Some(ty[EXTENDS_PREFIX.len()..].to_string()),
            Some(ParamKind::Extends),
        ),
        Some(ty) => (Some(ty.to_string()), None),
        None => (None, None),
    };
    let hinted = hinted.or(documented.is_variadic().then_some(documented.kind));

    let count = params.len();
    let Some(index) = params.iter().position(|param| param.name == documented.name) else {
        report(format!(
            "Documentation tag @param names \"{}\" which is not a parameter of \"{function}\"",
            documented.name
        ));
        return;
    };
    let param = &mut params[index];
    if ty.is_some() {
        param.ty = ty;
    }
    if tag.description.is_some() {
        param.description = tag.description;
    }
    if let Some(kind) = hinted {
        if param.kind == ParamKind::Positional && index + 1 == count {
            param.kind = kind;
        } else if param.kind != kind {
            report(format!(
                "Documentation for parameter '{}' conflicts with its declaration",
                param.name
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_cell;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use swc_ecma_ast::{Decl, ModuleItem, Stmt};

    fn extract(source: &str) -> Result<ExtractedFunction, ExtractError> {
        let parsed = parse_cell(source).expect("cell should parse");
        let (name, function, span) = match parsed.module.body.last() {
            Some(ModuleItem::Stmt(Stmt::Decl(Decl::Fn(decl)))) => {
                (decl.ident.sym.to_string(), decl.function.clone(), decl.span())
            }
            other => panic!("expected a function declaration, found {other:?}"),
        };
        FunctionSpecExtractor::new(&parsed).extract(&name, &function, span)
    }

    fn params(source: &str) -> Vec<Param> {
        let extracted = extract(source).expect("extraction should succeed");
        extracted.spec.methods[0].params.clone()
    }

    #[test]
    fn declared_params_without_docs() {
        assert_eq!(params("function func (){}"), vec![]);
        assert_eq!(
            params("function func (a, ...b){}"),
            vec![Param::new("a"), Param::new("b").with_kind(ParamKind::Repeats)]
        );
        assert_eq!(
            params("function func (___a){}"),
            vec![Param::new("a").with_kind(ParamKind::Extends)]
        );
        assert_eq!(
            params("function func (a=1, b=\"foo\", c=[1, 2, 3]){}"),
            vec![
                Param::new("a").with_default(json!(1)),
                Param::new("b").with_default(json!("foo")),
                Param::new("c").with_default(json!([1, 2, 3])),
            ]
        );
    }

    #[test]
    fn signature_lists_params() {
        let extracted = extract("function func (a, b){}").unwrap();
        assert_eq!(extracted.spec.methods[0].signature, "func(a, b)");
        assert!(extracted.messages.is_empty());
    }

    #[test]
    fn non_literal_defaults_warn() {
        let extracted = extract("function func (a = b + 1){}").unwrap();
        assert_eq!(extracted.spec.methods[0].params, vec![Param::new("a")]);
        assert_eq!(extracted.messages.len(), 1);
        assert!(!extracted.messages[0].is_error());
        assert_eq!((extracted.messages[0].line, extracted.messages[0].column), (1, 20));
    }

    #[test]
    fn unsupported_params_are_fatal() {
        assert_eq!(
            extract("function func ({a}){}").unwrap_err(),
            ExtractError::UnsupportedParam("ObjectPattern")
        );
        assert_eq!(
            extract("function func (___a, b){}").unwrap_err(),
            ExtractError::VariadicNotLast("a".into())
        );
    }

    #[test]
    fn doc_params_merge_by_name() {
        let source = "/**\n * @param a Description of parameter a\n * @param {typeB} b Description of parameter b\n */\nfunction func (a, b){}";
        assert_eq!(
            params(source),
            vec![
                Param {
                    description: Some("Description of parameter a".into()),
                    ..Param::new("a")
                },
                Param {
                    ty: Some("typeB".into()),
                    description: Some("Description of parameter b".into()),
                    ..Param::new("b")
                },
            ]
        );
    }

    #[test]
    fn doc_type_markers_match_declared_kinds() {
        let repeats = "/**\n * @param {...number} pars Description of parameters\n */\nfunction func (...pars){}";
        assert_eq!(
            params(repeats),
            vec![Param {
                ty: Some("number".into()),
                description: Some("Description of parameters".into()),
                ..Param::new("pars").with_kind(ParamKind::Repeats)
            }]
        );
        let extends = "/**\n * @param {___number} pars Description of parameters\n */\nfunction func (___pars){}";
        assert_eq!(
            params(extends),
            vec![Param {
                ty: Some("number".into()),
                description: Some("Description of parameters".into()),
                ..Param::new("pars").with_kind(ParamKind::Extends)
            }]
        );
    }

    #[test]
    fn kitchen_sink() {
        let source = r#"
  /**
   * Function description
   *
   * @title Function title
   * @summary Function summary
   *
   * @example <caption>Example caption</caption>
   *
   * funcname(1, 2, 3, 4)
   *
   * @example
   *
   * funcname(x, y, z)
   *
   * @param  {par1Type} par1 Parameter one description
   * @param  {...any} par2 Parameter two description
   * @return {returnType} Return description
   */
  function funcname(par1, ...par2){
    return par1 + sum(par2)
  }
"#;
        let extracted = extract(source).unwrap();
        assert!(extracted.messages.is_empty());
        let mut json = serde_json::to_value(&extracted.spec).unwrap();
        json.as_object_mut().unwrap().remove("code");
        assert_eq!(
            json,
            json!({
                "type": "function",
                "name": "funcname",
                "title": "Function title",
                "summary": "Function summary",
                "description": "Function description",
                "methods": {
                    "funcname(par1: par1Type, par2: any): returnType": {
                        "signature": "funcname(par1: par1Type, par2: any): returnType",
                        "params": [
                            {"name": "par1", "type": "par1Type", "description": "Parameter one description"},
                            {"name": "par2", "type": "any", "repeats": true, "description": "Parameter two description"}
                        ],
                        "return": {"type": "returnType", "description": "Return description"},
                        "examples": [
                            {"usage": "funcname(1, 2, 3, 4)", "caption": "Example caption"},
                            {"usage": "funcname(x, y, z)"}
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn doc_inconsistencies_are_warnings() {
        let source = "/**\n * @name other\n * @param\n * @param {number} missing\n * @title One\n * @title Two\n */\nfunction func (a){}";
        let extracted = extract(source).unwrap();
        let texts: Vec<_> = extracted.messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Documentation tag @name with name \"other\" differs from name in function definition",
                "Documentation tag @param has no parameter name",
                "Documentation tag @param names \"missing\" which is not a parameter of \"func\"",
                "Documentation tag @title is given more than once",
            ]
        );
        assert!(extracted.messages.iter().all(|m| m.line == 1 && m.column == 1));
        assert_eq!(extracted.spec.title.as_deref(), Some("One"));
    }

    #[test]
    fn only_the_adjacent_comment_documents_the_function() {
        let source = "/** @title Far */\nlet x = 1\nfunction func (){}";
        assert_eq!(extract(source).unwrap().spec.title, None);
        let source = "/** @title Near */\n\n  function func (){}";
        assert_eq!(extract(source).unwrap().spec.title.as_deref(), Some("Near"));
    }
}
