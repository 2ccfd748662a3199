use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Names provided by the JavaScript runtime that never become cell inputs:
/// the ES2015 globals followed by the Node.js globals.
pub const JS_GLOBALS: &[&str] = &[
    "Array", "ArrayBuffer", "Boolean", "constructor", "DataView", "Date", "decodeURI",
    "decodeURIComponent", "encodeURI", "encodeURIComponent", "Error", "escape", "eval",
    "EvalError", "Float32Array", "Float64Array", "Function", "hasOwnProperty", "Infinity",
    "Int16Array", "Int32Array", "Int8Array", "isFinite", "isNaN", "isPrototypeOf", "JSON", "Map",
    "Math", "NaN", "Number", "Object", "parseFloat", "parseInt", "Promise", "propertyIsEnumerable",
    "Proxy", "RangeError", "ReferenceError", "Reflect", "RegExp", "Set", "String", "Symbol",
    "SyntaxError", "System", "toLocaleString", "toString", "TypeError", "Uint16Array",
    "Uint32Array", "Uint8Array", "Uint8ClampedArray", "undefined", "unescape", "URIError",
    "valueOf", "WeakMap", "WeakSet",
    "__dirname", "__filename", "arguments", "Buffer", "clearImmediate", "clearInterval",
    "clearTimeout", "console", "exports", "GLOBAL", "global", "Intl", "module", "process",
    "require", "root", "setImmediate", "setInterval", "setTimeout",
];

/// Names the scope analyzer ignores when collecting cell inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default = "default_builtins")]
    pub builtins: HashSet<String>,
}

fn default_builtins() -> HashSet<String> {
    JS_GLOBALS.iter().map(|name| name.to_string()).collect()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            builtins: default_builtins(),
        }
    }
}

impl AnalyzerConfig {
    /// A config that ignores nothing.
    pub fn empty() -> Self {
        Self {
            builtins: HashSet::new(),
        }
    }

    pub fn with_builtins<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extend(names);
        self
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builtins.extend(names.into_iter().map(Into::into));
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_es_and_node_globals() {
        let config = AnalyzerConfig::default();
        for name in ["Math", "undefined", "require", "console", "arguments"] {
            assert!(config.is_builtin(name), "{name} should be a builtin");
        }
        assert!(!config.is_builtin("foo"));
    }

    #[test]
    fn missing_builtins_deserialize_to_defaults() {
        let config: AnalyzerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        let config = AnalyzerConfig::empty().with_builtins(["plot"]);
        assert!(config.is_builtin("plot"));
        assert!(!config.is_builtin("Math"));
    }
}
