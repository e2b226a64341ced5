//! Compiled templates

use std::sync::Arc;

use crate::engine::{eval, Engine, RenderError, RenderFn};
use crate::error::CompileError;
use crate::parser::{self, Segment};
use crate::value::Value;

/// Parameter name used when none are given explicitly
pub const DEFAULT_PARAM: &str = "data";

/// A template compiled into an expression-tree representation
///
/// Compilation parses the source once into segments; rendering replays them
/// without re-parsing. A `Template` carries no registry state: helpers and
/// includes referenced by its placeholders are resolved against the
/// [`Engine`] passed to each [`Template::render`] call, so entries registered
/// or swapped after compilation take effect on the next render.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
    params: Vec<String>,
    source: String,
}

impl Template {
    /// Compile with the default single `data` parameter
    pub fn compile(source: &str) -> Result<Self, CompileError> {
        Self::compile_with_params(source, &[DEFAULT_PARAM])
    }

    /// Compile with an explicit ordered parameter list
    ///
    /// Compilation only parses; nothing in the template body runs until the
    /// first render. Duplicate parameter names are not guarded against; the
    /// first occurrence wins at render time.
    pub fn compile_with_params(source: &str, params: &[&str]) -> Result<Self, CompileError> {
        let segments = parser::parse_template(source)?;
        log::trace!(
            "compiled template with {} segments and params {:?}",
            segments.len(),
            params
        );
        Ok(Self {
            segments,
            params: params.iter().map(|p| p.to_string()).collect(),
            source: source.to_string(),
        })
    }

    /// Render against `engine` with positional arguments
    ///
    /// Arguments bind to parameters by position. Missing trailing arguments
    /// bind to [`Value::Undefined`]; surplus arguments are ignored. Rendering
    /// only reads registry state and never mutates anything.
    pub fn render(&self, engine: &Engine, args: &[Value]) -> Result<String, RenderError> {
        eval::render_segments(&self.segments, &self.params, args, engine)
    }

    /// The ordered parameter names this template was compiled with
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The original template source text
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl From<Template> for RenderFn {
    fn from(template: Template) -> Self {
        Arc::new(move |engine: &Engine, args: &[Value]| template.render(engine, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{helper, NameKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_param_is_data() {
        let engine = Engine::new();
        let template = Template::compile("hello ${data.name}").expect("Should compile");
        let out = template
            .render(&engine, &[Value::object([("name", Value::from("world"))])])
            .expect("Should render");
        assert_eq!(out, "hello world");
    }

    #[test]
    fn test_named_params() {
        let engine = Engine::new();
        let template =
            Template::compile_with_params("hello ${name}", &["name"]).expect("Should compile");
        let out = template
            .render(&engine, &[Value::from("world")])
            .expect("Should render");
        assert_eq!(out, "hello world");
    }

    #[test]
    fn test_multiple_params_bind_in_order() {
        let engine = Engine::new();
        let template = Template::compile_with_params("${greeting}, ${name}!", &["greeting", "name"])
            .expect("Should compile");
        let out = template
            .render(&engine, &[Value::from("hi"), Value::from("world")])
            .expect("Should render");
        assert_eq!(out, "hi, world!");
    }

    #[test]
    fn test_missing_trailing_args_are_undefined() {
        let engine = Engine::new();
        let template =
            Template::compile_with_params("${a}/${b}", &["a", "b"]).expect("Should compile");
        let out = template
            .render(&engine, &[Value::from("x")])
            .expect("Should render");
        assert_eq!(out, "x/undefined");
    }

    #[test]
    fn test_surplus_args_are_ignored() {
        let engine = Engine::new();
        let template = Template::compile_with_params("${a}", &["a"]).expect("Should compile");
        let out = template
            .render(&engine, &[Value::from("x"), Value::from("y")])
            .expect("Should render");
        assert_eq!(out, "x");
    }

    #[test]
    fn test_calling_helpers() {
        let mut engine = Engine::new();
        engine.register_helper(
            "lower",
            helper(|args| {
                Ok(Value::Str(
                    args.first()
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_lowercase(),
                ))
            }),
        );
        let template = Template::compile_with_params("hello ${helpers.lower(name)}", &["name"])
            .expect("Should compile");
        let out = template
            .render(&engine, &[Value::from("WORLD")])
            .expect("Should render");
        assert_eq!(out, "hello world");
    }

    #[test]
    fn test_include_call() {
        let mut engine = Engine::new();
        engine.register_include(
            "test",
            crate::engine::render_fn(|_, _| Ok("world".to_string())),
        );
        let template = Template::compile(r#"hello ${include("test")}"#).expect("Should compile");
        let out = template.render(&engine, &[]).expect("Should render");
        assert_eq!(out, "hello world");
    }

    #[test]
    fn test_include_receives_arguments() {
        let mut engine = Engine::new();
        let inner = Template::compile_with_params("[${label}]", &["label"]).expect("Should compile");
        engine.register_include("badge", inner);
        let template =
            Template::compile(r#"${include("badge", data.status)}"#).expect("Should compile");
        let out = template
            .render(&engine, &[Value::object([("status", Value::from("ok"))])])
            .expect("Should render");
        assert_eq!(out, "[ok]");
    }

    #[test]
    fn test_helper_resolved_at_render_time() {
        let mut engine = Engine::new();
        let template = Template::compile_with_params("${helpers.shout(name)}", &["name"])
            .expect("Should compile");

        // Helper registered after compilation is still found
        engine.register_helper(
            "shout",
            helper(|args| {
                Ok(Value::Str(
                    args.first()
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_uppercase(),
                ))
            }),
        );
        let out = template.render(&engine, &[Value::from("hi")]).unwrap();
        assert_eq!(out, "HI");

        // Swapping the helper changes the next render of the same template
        engine.register_helper("shout", helper(|_| Ok(Value::from("swapped"))));
        let out = template.render(&engine, &[Value::from("hi")]).unwrap();
        assert_eq!(out, "swapped");

        // Removing it surfaces NotFound on the next render
        engine.helpers_mut().remove("shout");
        let err = template
            .render(&engine, &[Value::from("hi")])
            .expect_err("Should fail");
        assert!(matches!(
            err,
            RenderError::NotFound {
                kind: NameKind::Helper,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_include_is_not_found() {
        let engine = Engine::new();
        let template = Template::compile(r#"${include("nope")}"#).expect("Should compile");
        let err = template.render(&engine, &[]).expect_err("Should fail");
        match err {
            RenderError::NotFound { kind, name } => {
                assert_eq!(kind, NameKind::Include);
                assert_eq!(name, "nope");
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_parameter_name_errors() {
        let engine = Engine::new();
        let template = Template::compile_with_params("${nope}", &["name"]).expect("Should compile");
        let err = template
            .render(&engine, &[Value::from("x")])
            .expect_err("Should fail");
        assert!(matches!(err, RenderError::Eval { .. }));
    }

    #[test]
    fn test_ternary_and_equality() {
        let engine = Engine::new();
        let template = Template::compile_with_params(
            r#"${count == 1 ? "1 item" : count + " items"}"#,
            &["count"],
        )
        .expect("Should compile");
        assert_eq!(
            template.render(&engine, &[Value::from(1i64)]).unwrap(),
            "1 item"
        );
        assert_eq!(
            template.render(&engine, &[Value::from(3i64)]).unwrap(),
            "3 items"
        );
    }

    #[test]
    fn test_indexing() {
        let engine = Engine::new();
        let template =
            Template::compile_with_params("${items[1]}", &["items"]).expect("Should compile");
        let out = template
            .render(&engine, &[Value::from(vec!["a", "b", "c"])])
            .unwrap();
        assert_eq!(out, "b");
    }

    #[test]
    fn test_absent_member_renders_undefined() {
        let engine = Engine::new();
        let template = Template::compile("${data.missing}").expect("Should compile");
        let out = template
            .render(&engine, &[Value::object([("other", Value::from(1i64))])])
            .unwrap();
        assert_eq!(out, "undefined");
    }

    #[test]
    fn test_compile_has_no_side_effects() {
        // Compiling a template full of unresolvable calls must not fail or
        // touch any registry
        let template =
            Template::compile(r#"${helpers.missing(include("also-missing"))}"#)
                .expect("Should compile");
        assert_eq!(template.params(), &["data".to_string()]);
    }

    #[test]
    fn test_source_is_preserved() {
        let template = Template::compile("a ${data.b} c").expect("Should compile");
        assert_eq!(template.source(), "a ${data.b} c");
    }
}
