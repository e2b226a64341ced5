//! The engine: three registries plus the render-time resolution paths
//!
//! An [`Engine`] owns the view, include, and helper registries. Compiled
//! templates hold no registry state of their own; every `helpers.<name>(...)`
//! and `include(...)` inside a template is resolved against the engine passed
//! to the render call, at the moment of that call. Registering, swapping, or
//! removing entries after compilation therefore changes what an already
//! compiled template renders.
//!
//! Rendering borrows the engine shared (`&Engine`) and only reads registry
//! state; registration needs `&mut Engine`. The engine does no internal
//! locking. Entries are `Send + Sync`, so an engine can live behind a
//! caller-provided lock when shared across threads.

pub(crate) mod eval;
pub mod registry;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::loader::{self, LoadError, DEFAULT_EXTENSION};
use crate::value::Value;

pub use registry::Registry;

/// Which registry a failed name lookup was against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    View,
    Include,
    Helper,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::View => f.write_str("view"),
            NameKind::Include => f.write_str("include"),
            NameKind::Helper => f.write_str("helper"),
        }
    }
}

/// Errors raised while rendering a compiled template
#[derive(Debug, Error)]
pub enum RenderError {
    /// A view, include, or helper name was absent from its registry at call time
    #[error("{kind} not found: {name}")]
    NotFound { kind: NameKind, name: String },

    /// An expression evaluated against an unsupported operand or call target
    #[error("evaluation error: {message}")]
    Eval { message: String },
}

/// A registered helper: a plain function over positional values
pub type Helper = Arc<dyn Fn(&[Value]) -> Result<Value, RenderError> + Send + Sync>;

/// A registered view or include: anything invocable with an engine and
/// positional arguments that yields rendered text
pub type RenderFn = Arc<dyn Fn(&Engine, &[Value]) -> Result<String, RenderError> + Send + Sync>;

/// Wrap a closure as a registrable [`Helper`]
pub fn helper<F>(f: F) -> Helper
where
    F: Fn(&[Value]) -> Result<Value, RenderError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a registrable [`RenderFn`]
///
/// Compiled [`crate::Template`]s convert directly via `Into<RenderFn>`; this
/// is for hand-written views and includes.
pub fn render_fn<F>(f: F) -> RenderFn
where
    F: Fn(&Engine, &[Value]) -> Result<String, RenderError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Owner of the view, include, and helper registries
#[derive(Debug, Default, Clone)]
pub struct Engine {
    views: Registry<RenderFn>,
    includes: Registry<RenderFn>,
    helpers: Registry<Helper>,
}

impl Engine {
    /// Create an engine with all three registries empty
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> &Registry<RenderFn> {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut Registry<RenderFn> {
        &mut self.views
    }

    pub fn includes(&self) -> &Registry<RenderFn> {
        &self.includes
    }

    pub fn includes_mut(&mut self) -> &mut Registry<RenderFn> {
        &mut self.includes
    }

    pub fn helpers(&self) -> &Registry<Helper> {
        &self.helpers
    }

    pub fn helpers_mut(&mut self) -> &mut Registry<Helper> {
        &mut self.helpers
    }

    /// Register a view under `name`, overwriting any existing entry
    ///
    /// Accepts a compiled [`crate::Template`] or a [`RenderFn`].
    pub fn register_view(&mut self, name: impl Into<String>, view: impl Into<RenderFn>) {
        self.views.register(name, view.into());
    }

    /// Register an include under `name`, overwriting any existing entry
    pub fn register_include(&mut self, name: impl Into<String>, include: impl Into<RenderFn>) {
        self.includes.register(name, include.into());
    }

    /// Register a helper under `name`, overwriting any existing entry
    pub fn register_helper(&mut self, name: impl Into<String>, helper: Helper) {
        self.helpers.register(name, helper);
    }

    /// Render the named view with the given positional arguments
    ///
    /// This is the public entry point for rendering. Failures inside the view
    /// (an unresolved helper or include, transitively) propagate unchanged.
    pub fn view(&self, name: &str, args: &[Value]) -> Result<String, RenderError> {
        let view = self.views.get(name).cloned().ok_or_else(|| {
            RenderError::NotFound {
                kind: NameKind::View,
                name: name.to_string(),
            }
        })?;
        view(self, args)
    }

    /// Render the named include with the given positional arguments
    ///
    /// Every `${include("name", ...)}` expression resolves through here,
    /// which is what makes includes recursively composable without the
    /// compiler knowing which ones exist.
    pub fn include(&self, name: &str, args: &[Value]) -> Result<String, RenderError> {
        let include = self.includes.get(name).cloned().ok_or_else(|| {
            RenderError::NotFound {
                kind: NameKind::Include,
                name: name.to_string(),
            }
        })?;
        include(self, args)
    }

    /// Invoke the named helper with the given positional arguments
    pub fn call_helper(&self, name: &str, args: &[Value]) -> Result<Value, RenderError> {
        let helper = self.helpers.get(name).ok_or_else(|| RenderError::NotFound {
            kind: NameKind::Helper,
            name: name.to_string(),
        })?;
        helper(args)
    }

    /// Compile and register every `.html` file under `root` as a view
    ///
    /// Recurses into subdirectories; see [`loader::load_dir`] for key
    /// derivation and failure semantics. A missing `root` is a no-op.
    pub fn load_views(&mut self, root: impl AsRef<Path>) -> Result<(), LoadError> {
        loader::load_dir(&mut self.views, root, true, DEFAULT_EXTENSION)
    }

    /// Compile and register every `.html` file under `root` as an include
    pub fn load_includes(&mut self, root: impl AsRef<Path>) -> Result<(), LoadError> {
        loader::load_dir(&mut self.includes, root, true, DEFAULT_EXTENSION)
    }
}
