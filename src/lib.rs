//! weft - a minimal text-templating engine with late-bound helpers and includes
//!
//! Templates are plain strings with `${...}` expression placeholders. A
//! [`Template`] compiles once into an expression tree and renders any number
//! of times against an [`Engine`], which owns three registries: **views**
//! (top-level render targets), **includes** (templates invoked from inside
//! other templates), and **helpers** (plain functions exposed to placeholder
//! expressions). Helper and include names resolve at render time, so entries
//! registered or replaced after a template was compiled take effect on its
//! next render.
//!
//! # Example
//!
//! ```rust
//! use weft::{helper, Engine, Template, Value};
//!
//! let mut engine = Engine::new();
//! engine.register_helper("upper", helper(|args| {
//!     Ok(Value::Str(args[0].to_string().to_uppercase()))
//! }));
//! engine.register_include("who", Template::compile_with_params("world", &[]).unwrap());
//!
//! let page = Template::compile("hello ${helpers.upper(include(\"who\"))}").unwrap();
//! let out = page.render(&engine, &[Value::Null]).unwrap();
//! assert_eq!(out, "hello WORLD");
//! ```
//!
//! File-based templates come from [`Engine::load_views`] and
//! [`Engine::load_includes`] (or a TOML [`EngineConfig`]): every `.html`
//! file under the root registers under its dot-joined relative path, so
//! `components/timestamp.html` becomes the include `components.timestamp`.

pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod parser;
pub mod template;
pub mod value;

pub use config::{ConfigError, EngineConfig};
pub use engine::{
    helper, render_fn, Engine, Helper, NameKind, Registry, RenderError, RenderFn,
};
pub use error::CompileError;
pub use loader::{load_dir, LoadError, DEFAULT_EXTENSION};
pub use template::Template;
pub use value::Value;
