//! A small JSDoc reader: a leading description followed by `@tag` sections.

use itertools::Itertools;
use std::fmt;

/// A type annotation from a `{...}` tag field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `*`
    All,
    Name(String),
    /// `(a|b)` or `a|b`
    Union(Vec<TypeExpr>),
    /// `Array.<T>`, `Array<T>` or `T[]`
    Application {
        base: Box<TypeExpr>,
        args: Vec<TypeExpr>,
    },
    /// `T=`
    Optional(Box<TypeExpr>),
    /// `...T`
    Rest(Box<TypeExpr>),
}

impl TypeExpr {
    /// Parse a type annotation. Text the grammar does not cover is kept
    /// verbatim as a name.
    pub fn parse(text: &str) -> TypeExpr {
        let text = text.trim();
        let mut parser = TypeParser {
            chars: text.chars().collect(),
            pos: 0,
        };
        match parser.union() {
            Some(ty) if parser.at_end() => ty,
            _ => TypeExpr::Name(text.to_string()),
        }
    }
}

/// The lattice name of a type: `*` becomes `any`, applications become
/// `Base[Arg,...]` and optional or rest markers are dropped.
impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::All => f.write_str("any"),
            TypeExpr::Name(name) => f.write_str(name),
            TypeExpr::Union(elements) => write!(f, "{}", elements.iter().join("|")),
            TypeExpr::Application { base, args } => write!(f, "{}[{}]", base, args.iter().join(",")),
            TypeExpr::Optional(inner) | TypeExpr::Rest(inner) => inner.fmt(f),
        }
    }
}

struct TypeParser {
    chars: Vec<char>,
    pos: usize,
}

impl TypeParser {
    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos >= self.chars.len()
    }

    fn skip_ws(&mut self) {
        while self.chars.get(self.pos).is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        let matches = token
            .chars()
            .enumerate()
            .all(|(offset, c)| self.chars.get(self.pos + offset) == Some(&c));
        if matches {
            self.pos += token.chars().count();
        }
        matches
    }

    fn union(&mut self) -> Option<TypeExpr> {
        let mut elements = vec![self.postfix()?];
        while self.eat("|") {
            elements.push(self.postfix()?);
        }
        Some(if elements.len() == 1 {
            elements.remove(0)
        } else {
            TypeExpr::Union(elements)
        })
    }

    fn postfix(&mut self) -> Option<TypeExpr> {
        if self.eat("...") {
            return Some(TypeExpr::Rest(Box::new(self.postfix()?)));
        }
        let mut ty = self.primary()?;
        loop {
            if self.eat(".<") || self.eat("<") {
                let mut args = vec![self.union()?];
                while self.eat(",") {
                    args.push(self.union()?);
                }
                if !self.eat(">") {
                    return None;
                }
                ty = TypeExpr::Application {
                    base: Box::new(ty),
                    args,
                };
            } else if self.eat("[]") {
                ty = TypeExpr::Application {
                    base: Box::new(TypeExpr::Name("Array".into())),
                    args: vec![ty],
                };
            } else {
                break;
            }
        }
        if self.eat("=") {
            ty = TypeExpr::Optional(Box::new(ty));
        }
        Some(ty)
    }

    fn primary(&mut self) -> Option<TypeExpr> {
        // nullability markers carry no lattice meaning
        while matches!(self.peek(), Some('?' | '!')) {
            self.pos += 1;
        }
        if self.eat("*") {
            return Some(TypeExpr::All);
        }
        if self.eat("(") {
            let inner = self.union()?;
            return self.eat(")").then_some(inner);
        }
        let start = self.pos;
        while let Some(&c) = self.chars.get(self.pos) {
            let dotted_name = c == '.' && self.chars.get(self.pos + 1) != Some(&'<');
            if c.is_alphanumeric() || c == '_' || c == '$' || dotted_name {
                self.pos += 1;
            } else {
                break;
            }
        }
        (self.pos > start).then(|| TypeExpr::Name(self.chars[start..self.pos].iter().collect()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocTag {
    /// Tag name without the `@`.
    pub title: String,
    pub ty: Option<TypeExpr>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// `<caption>` of an `@example`.
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub description: Option<String>,
    pub tags: Vec<DocTag>,
}

/// Parse the body of a block comment (without its delimiters).
pub fn parse_doc(text: &str) -> DocComment {
    let mut description = Vec::new();
    let mut sections: Vec<Vec<&str>> = Vec::new();
    for line in text.lines().map(strip_decoration) {
        let trimmed = line.trim_start();
        if trimmed.starts_with('@') {
            sections.push(vec![trimmed]);
        } else if let Some(section) = sections.last_mut() {
            section.push(line);
        } else {
            description.push(line);
        }
    }
    DocComment {
        description: join_trimmed(&description),
        tags: sections.iter().map(|section| parse_tag(section)).collect(),
    }
}

fn strip_decoration(line: &str) -> &str {
    let line = line.trim_start();
    line.strip_prefix('*').unwrap_or(line)
}

fn join_trimmed(lines: &[&str]) -> Option<String> {
    let text = lines.iter().map(|line| line.trim()).join("\n");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_tag(section: &[&str]) -> DocTag {
    let head = section[0].trim_start_matches('@');
    let title_len = head.find(char::is_whitespace).unwrap_or(head.len());
    let title = head[..title_len].to_string();
    let mut body: Vec<&str> = vec![&head[title_len..]];
    body.extend_from_slice(&section[1..]);

    let mut tag = DocTag {
        title,
        ..Default::default()
    };
    match tag.title.as_str() {
        "param" | "arg" | "argument" => {
            let (ty, rest) = split_type(&body);
            tag.ty = ty;
            let (name, rest) = split_name(&rest);
            tag.name = name;
            tag.description =
                join_trimmed(&[rest.trim_start().trim_start_matches("- ")]).map(unwrap_paragraphs);
        }
        "return" | "returns" => {
            let (ty, rest) = split_type(&body);
            tag.ty = ty;
            tag.description = join_trimmed(&[rest.as_str()]).map(unwrap_paragraphs);
        }
        "name" => {
            let (name, _) = split_name(&body.join("\n"));
            tag.name = name;
        }
        "example" => {
            let text = body
                .iter()
                .map(|line| line.strip_prefix(' ').unwrap_or(line))
                .join("\n");
            let mut usage = text.trim();
            if let Some(after) = usage.strip_prefix("<caption>") {
                if let Some(end) = after.find("</caption>") {
                    tag.caption = Some(after[..end].trim().to_string());
                    usage = after[end + "</caption>".len()..].trim();
                }
            }
            tag.description = (!usage.is_empty()).then(|| usage.to_string());
        }
        _ => tag.description = join_trimmed(&body),
    }
    tag
}

fn unwrap_paragraphs(text: String) -> String {
    text.lines().map(str::trim).join(" ")
}

/// Split a leading `{type}` off a tag body, honouring nested braces.
fn split_type(body: &[&str]) -> (Option<TypeExpr>, String) {
    let text = body.join("\n");
    let trimmed = text.trim_start();
    if !trimmed.starts_with('{') {
        return (None, text);
    }
    let mut depth = 0usize;
    for (idx, c) in trimmed.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let ty = TypeExpr::parse(&trimmed[1..idx]);
                    return (Some(ty), trimmed[idx + 1..].to_string());
                }
            }
            _ => {}
        }
    }
    (None, text)
}

/// Split the first word off as a name, unwrapping `[name]` and
/// `[name=default]` forms.
fn split_name(text: &str) -> (Option<String>, String) {
    let text = text.trim_start();
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    let (word, rest) = text.split_at(end);
    if word.is_empty() {
        return (None, rest.to_string());
    }
    let word = word
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .map(|inner| inner.split('=').next().unwrap_or(inner))
        .unwrap_or(word);
    (Some(word.to_string()), rest.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn name(n: &str) -> TypeExpr {
        TypeExpr::Name(n.to_string())
    }

    #[test]
    fn parses_type_expressions() {
        assert_eq!(TypeExpr::parse("*"), TypeExpr::All);
        assert_eq!(TypeExpr::parse("number"), name("number"));
        assert_eq!(
            TypeExpr::parse("(number|string)"),
            TypeExpr::Union(vec![name("number"), name("string")])
        );
        assert_eq!(TypeExpr::parse("...any"), TypeExpr::Rest(Box::new(name("any"))));
        assert_eq!(TypeExpr::parse("number="), TypeExpr::Optional(Box::new(name("number"))));
        assert_eq!(TypeExpr::parse("Array.<number>").to_string(), "Array[number]");
        assert_eq!(TypeExpr::parse("Map<string, number>").to_string(), "Map[string,number]");
        assert_eq!(TypeExpr::parse("string[]").to_string(), "Array[string]");
        assert_eq!(TypeExpr::parse("*").to_string(), "any");
        assert_eq!(TypeExpr::parse("a|b").to_string(), "a|b");
        assert_eq!(TypeExpr::parse("{weird}"), name("{weird}"));
    }

    #[test]
    fn splits_description_and_tags() {
        let doc = parse_doc(
            "*\n * Function description\n *\n * @title Function title\n * @param {number} x The x\n *   continued\n * @return {string} Result\n ",
        );
        assert_eq!(doc.description.as_deref(), Some("Function description"));
        assert_eq!(doc.tags.len(), 3);
        assert_eq!(doc.tags[0].title, "title");
        assert_eq!(doc.tags[0].description.as_deref(), Some("Function title"));
        assert_eq!(
            doc.tags[1],
            DocTag {
                title: "param".into(),
                ty: Some(name("number")),
                name: Some("x".into()),
                description: Some("The x continued".into()),
                caption: None,
            }
        );
        assert_eq!(doc.tags[2].ty, Some(name("string")));
        assert_eq!(doc.tags[2].description.as_deref(), Some("Result"));
    }

    #[test]
    fn params_without_type_or_name() {
        let doc = parse_doc("* @param a Description of a\n * @param [b=2] optional\n * @param");
        assert_eq!(doc.tags[0].ty, None);
        assert_eq!(doc.tags[0].name.as_deref(), Some("a"));
        assert_eq!(doc.tags[0].description.as_deref(), Some("Description of a"));
        assert_eq!(doc.tags[1].name.as_deref(), Some("b"));
        assert_eq!(doc.tags[2].name, None);
    }

    #[test]
    fn examples_keep_captions_apart() {
        let doc = parse_doc(
            "*\n * @example <caption>Example caption</caption>\n *\n * funcname(1, 2, 3, 4)\n *\n * @example\n *\n * funcname(x, y, z)\n ",
        );
        assert_eq!(doc.tags[0].caption.as_deref(), Some("Example caption"));
        assert_eq!(doc.tags[0].description.as_deref(), Some("funcname(1, 2, 3, 4)"));
        assert_eq!(doc.tags[1].caption, None);
        assert_eq!(doc.tags[1].description.as_deref(), Some("funcname(x, y, z)"));
    }
}
