use crate::cell::Cell;
use crate::error::Result;
use std::path::Path;
use std::sync::Arc;

/// Options recognised by every cell frontend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Require the cell to be a single, simple expression.
    pub expr: bool,
}

/// Trait implemented by every cell language.
pub trait CellFrontend: Send + Sync {
    fn language(&self) -> &'static str;
    fn extensions(&self) -> &'static [&'static str];
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<Cell>;
}

/// Frontends keyed by language, looked up by name or by file extension.
#[derive(Default, Clone)]
pub struct FrontendRegistry {
    frontends: Vec<Arc<dyn CellFrontend>>,
}

impl FrontendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, frontend: Arc<dyn CellFrontend>) {
        self.frontends.push(frontend);
    }

    pub fn languages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.frontends.iter().map(|frontend| frontend.language())
    }

    pub fn by_language(&self, language: &str) -> Option<Arc<dyn CellFrontend>> {
        self.frontends
            .iter()
            .find(|frontend| frontend.language().eq_ignore_ascii_case(language))
            .cloned()
    }

    pub fn for_path(&self, path: &Path) -> Result<Arc<dyn CellFrontend>> {
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            bail!("cannot infer cell language of {}", path.display());
        };
        match self.frontends.iter().find(|frontend| {
            frontend
                .extensions()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        }) {
            Some(frontend) => Ok(frontend.clone()),
            None => bail!("no cell frontend handles .{extension} files"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl CellFrontend for Echo {
        fn language(&self) -> &'static str {
            "echo"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &["echo"]
        }

        fn compile(&self, source: &str, _options: &CompileOptions) -> Result<Cell> {
            Ok(Cell::new(source))
        }
    }

    #[test]
    fn finds_frontends_by_extension() {
        let mut registry = FrontendRegistry::new();
        registry.register(Arc::new(Echo));
        let frontend = registry.for_path(Path::new("cell.ECHO")).unwrap();
        assert_eq!(frontend.language(), "echo");
        assert!(registry.by_language("Echo").is_some());

        let err = registry.for_path(Path::new("cell.py")).err().unwrap();
        assert_eq!(err.to_string(), "Generic error: no cell frontend handles .py files");
        assert!(registry.for_path(Path::new("Makefile")).is_err());
    }
}
