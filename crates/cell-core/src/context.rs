//! Host-side execution context: a function table, imported libraries and the
//! resolve/bind/invoke/pack cycle behind a structured call.

use crate::binder::{bind, BoundArgs};
use crate::call::{Call, FunctionRef};
use crate::cell::{Cell, Input};
use crate::collections::ConcurrentMap;
use crate::diagnostics::{translate, ExecutionFailure};
use crate::function::FunctionSpec;
use crate::value::{pack, unpack, Native, PackOptions, Type, Value};
use indexmap::IndexMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("Could not resolve value \"{0}\"")]
    Unresolved(String),
    #[error("Function '{0}' has no methods")]
    NoMethod(String),
    #[error("Value of type '{0}' is not a function reference")]
    NotAFunction(Type),
}

/// The executable part of a host function, supplied by the evaluator.
pub trait FunctionBody: Send + Sync {
    fn invoke(&self, args: BoundArgs) -> crate::Result<Native>;
}

impl<F> FunctionBody for F
where
    F: Fn(BoundArgs) -> crate::Result<Native> + Send + Sync,
{
    fn invoke(&self, args: BoundArgs) -> crate::Result<Native> {
        self(args)
    }
}

/// Runs compiled cell code with its inputs bound by name.
pub trait CellEvaluator {
    /// Returns one value per entry of `outputs`, in order.
    fn evaluate(
        &self,
        code: &str,
        inputs: &[(String, Native)],
        outputs: &[String],
    ) -> Result<Vec<Native>, ExecutionFailure>;
}

pub struct HostFunction {
    pub id: Option<String>,
    pub name: String,
    pub spec: FunctionSpec,
    body: Arc<dyn FunctionBody>,
}

impl HostFunction {
    pub fn new(spec: FunctionSpec, body: impl FunctionBody + 'static) -> Self {
        Self {
            id: None,
            name: spec.name.clone(),
            spec,
            body: Arc::new(body),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Functions defined by a cell are registered as `<cell>@<name>` so two
    /// documents can define the same name.
    pub fn cell_scoped_id(cell_id: &str, name: &str) -> String {
        format!("{cell_id}@{name}")
    }

    pub fn invoke(&self, args: BoundArgs) -> crate::Result<Native> {
        self.body.invoke(args)
    }

    /// Same body under a new id, described by `spec` when the cell has one.
    fn rescoped(&self, id: String, name: &str, spec: Option<&FunctionSpec>) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            spec: spec.cloned().unwrap_or_else(|| self.spec.clone()),
            body: self.body.clone(),
        }
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunction")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct Library {
    pub name: String,
    pub funcs: IndexMap<String, Arc<HostFunction>>,
}

impl Library {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            funcs: IndexMap::new(),
        }
    }

    pub fn with_function(mut self, function: HostFunction) -> Self {
        self.funcs.insert(function.name.clone(), Arc::new(function));
        self
    }
}

pub struct HostContext {
    id: String,
    values: ConcurrentMap<String, Arc<HostFunction>>,
    libraries: RwLock<IndexMap<String, Arc<Library>>>,
}

impl HostContext {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: ConcurrentMap::new(),
            libraries: RwLock::new(IndexMap::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn pack_options(&self) -> PackOptions {
        PackOptions {
            context: Some(self.id.clone()),
        }
    }

    /// Store a function and return the packed reference a host can call it by.
    pub fn register(&self, function: HostFunction) -> Value {
        let key = function.id.clone().unwrap_or_else(|| function.name.clone());
        let function = Arc::new(function);
        if self.values.insert(key.clone(), function.clone()).is_some() {
            warn!("replacing function registered as {key}");
        }
        pack(&Native::Function(function), &self.pack_options())
    }

    pub fn import_library(&self, library: Library) {
        debug!(
            "importing library {} with {} functions",
            library.name,
            library.funcs.len()
        );
        self.libraries_mut()
            .insert(library.name.clone(), Arc::new(library));
    }

    pub fn resolve(&self, reference: &FunctionRef) -> Result<Arc<HostFunction>, ContextError> {
        let found = if let Some(id) = &reference.id {
            self.values.get_cloned(id.as_str())
        } else if let Some(library) = &reference.library {
            let name = reference.name.as_deref().unwrap_or_default();
            self.libraries()
                .get(library.as_str())
                .and_then(|library| library.funcs.get(name).cloned())
        } else {
            let name = reference.name.as_deref().unwrap_or_default();
            self.libraries()
                .values()
                .find_map(|library| library.funcs.get(name).cloned())
        };
        found.ok_or_else(|| ContextError::Unresolved(reference.label().to_string()))
    }

    /// Resolve a packed `function` value back to the function it refers to.
    pub fn resolve_value(&self, value: &Value) -> Result<Arc<HostFunction>, ContextError> {
        if value.ty != Type::Function {
            return Err(ContextError::NotAFunction(value.ty.clone()));
        }
        let reference = value
            .data
            .as_ref()
            .and_then(FunctionRef::from_json)
            .ok_or_else(|| ContextError::NotAFunction(value.ty.clone()))?;
        self.resolve(&reference)
    }

    /// Bind a cell's input values to natives. Functions owned by this context
    /// resolve to themselves; functions from other contexts are not callable
    /// across the boundary and bind as `undefined`.
    pub fn collect_inputs(&self, inputs: &[Input]) -> Result<Vec<(String, Native)>, ContextError> {
        inputs
            .iter()
            .map(|input| -> Result<(String, Native), ContextError> {
                let native = match &input.value {
                    Some(value) if value.ty == Type::Function => {
                        let context = value
                            .data
                            .as_ref()
                            .and_then(FunctionRef::from_json)
                            .and_then(|reference| reference.context);
                        if context.as_deref() == Some(self.id.as_str()) {
                            Native::Function(self.resolve_value(value)?)
                        } else {
                            warn!(
                                "input {} refers to a function in another context ({:?})",
                                input.name, context
                            );
                            Native::Undefined
                        }
                    }
                    value => unpack(value.as_ref()).map_or(Native::Undefined, Native::Json),
                };
                Ok((input.name.clone(), native))
            })
            .collect()
    }

    /// Run a compiled cell and store packed results on its outputs.
    ///
    /// Evaluation failures are appended to `cell.messages`. Function outputs
    /// are registered as `<cell_id>@<name>` so other cells can call them.
    pub fn execute(
        &self,
        cell: &mut Cell,
        cell_id: &str,
        evaluator: &dyn CellEvaluator,
    ) -> crate::Result<()> {
        let inputs = self.collect_inputs(&cell.inputs)?;
        let names: Vec<String> = cell
            .outputs
            .iter()
            .filter_map(|output| output.name.clone())
            .collect();
        debug!("executing cell {cell_id} with {} inputs", inputs.len());

        let results = match evaluator.evaluate(&cell.code, &inputs, &names) {
            Ok(results) => results,
            Err(failure) => {
                debug!("cell {cell_id} failed: {failure:?}");
                cell.messages.push(translate(&failure));
                return Ok(());
            }
        };

        let options = self.pack_options();
        let named = cell.outputs.iter_mut().filter(|output| output.name.is_some());
        for (output, result) in named.zip(results) {
            let name = output.name.clone().unwrap_or_default();
            output.value = Some(match result {
                Native::Function(function) => {
                    let id = HostFunction::cell_scoped_id(cell_id, &name);
                    self.register(function.rescoped(id, &name, output.spec.as_ref()))
                }
                other => pack(&other, &options),
            });
        }
        Ok(())
    }

    /// Run a call against this context. An `undefined` result yields `None`.
    pub fn evaluate_call(&self, call: &Call) -> crate::Result<Option<Value>> {
        let function = self.resolve(&call.func)?;
        let method = function
            .spec
            .primary_method()
            .ok_or_else(|| ContextError::NoMethod(function.name.clone()))?;
        let bound = bind(&function.name, method, call)?;
        trace!("calling {} with {:?}", method.signature, bound);
        match function.invoke(bound)? {
            Native::Undefined => Ok(None),
            result => Ok(Some(pack(&result, &self.pack_options()))),
        }
    }

    fn libraries(&self) -> RwLockReadGuard<'_, IndexMap<String, Arc<Library>>> {
        self.libraries
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn libraries_mut(&self) -> RwLockWriteGuard<'_, IndexMap<String, Arc<Library>>> {
        self.libraries
            .write()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("id", &self.id)
            .field("values", &self.values.len())
            .field("libraries", &self.libraries().len())
            .finish()
    }
}
