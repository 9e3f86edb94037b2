//! Deterministic construction of test source text from fuzzing results.

use crate::introspect::{ScalarValue, TypeKind};
use crate::results::{FuzzedUnitResult, InvocationResult};
use std::fmt::Write;

/// The pluggable rendering vocabulary for generated tests.
///
/// Forced-visibility tests re-resolve their unit through a registry; the
/// profile supplies the expression that names it, plus any extra imports
/// the generated file needs to compile in its destination crate.
#[derive(Debug, Clone)]
pub struct RenderProfile {
    registry_expr: String,
    extra_imports: Vec<String>,
}

impl Default for RenderProfile {
    fn default() -> Self {
        Self {
            registry_expr: "registry()".to_string(),
            extra_imports: Vec::new(),
        }
    }
}

impl RenderProfile {
    /// Create a profile with the given registry expression.
    #[must_use]
    pub fn new(registry_expr: impl Into<String>) -> Self {
        Self {
            registry_expr: registry_expr.into(),
            extra_imports: Vec::new(),
        }
    }

    /// Add an import line to every generated file.
    #[must_use]
    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.extra_imports.push(import.into());
        self
    }

    /// The expression generated tests use to reach the unit registry.
    #[must_use]
    pub fn registry_expr(&self) -> &str {
        &self.registry_expr
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssertionForm {
    Throws,
    Null,
    True,
    False,
    Equals,
    NotNull,
}

/// Compiles one [`FuzzedUnitResult`] into test source text: one test per
/// retained invocation, named deterministically from the member name plus
/// a uniqueness counter.
#[derive(Debug)]
pub struct TestCaseBuilder<'a> {
    result: &'a FuzzedUnitResult,
    profile: RenderProfile,
}

impl<'a> TestCaseBuilder<'a> {
    /// Create a builder with the default rendering profile.
    #[must_use]
    pub fn new(result: &'a FuzzedUnitResult) -> Self {
        Self {
            result,
            profile: RenderProfile::default(),
        }
    }

    /// Use a custom rendering profile.
    #[must_use]
    pub fn with_profile(mut self, profile: RenderProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Build the complete test file text.
    #[must_use]
    pub fn build(&self) -> String {
        let mut tests = String::new();
        for (index, record) in self.result.results().iter().enumerate() {
            let rendered = if record.is_private() {
                self.build_forced_test(record, index + 1)
            } else {
                self.build_public_test(record, index + 1)
            };
            tests.push_str(&rendered);
            tests.push('\n');
        }

        format!(
            "//! Regression tests generated for `{}` by a fuzzing session.\n\n{}\n{}",
            self.result.qualified_name(),
            self.imports(),
            tests
        )
    }

    fn imports(&self) -> String {
        let mut imports = vec![format!(
            "use {}::{};",
            self.result.namespace(),
            self.result.name()
        )];
        if self
            .result
            .results()
            .iter()
            .any(InvocationResult::is_private)
        {
            imports.push("use sondear::introspect::{arg, value, DynValue};".to_string());
        }
        if self.result.results().iter().any(|record| {
            !record.is_private()
                && matches!(
                    Self::assertion_form(record),
                    AssertionForm::Throws | AssertionForm::NotNull
                )
        }) {
            imports.push("use sondear::testgen::simple_type_name;".to_string());
        }
        for extra in &self.profile.extra_imports {
            imports.push(extra.clone());
        }
        let mut block = imports.join("\n");
        block.push('\n');
        block
    }

    /// The per-result decision table, evaluated in order: expected
    /// exception, absent value, boolean, literal-renderable, fallback.
    fn assertion_form(record: &InvocationResult) -> AssertionForm {
        if record.exception_expected() {
            return AssertionForm::Throws;
        }
        match record.outcome().value() {
            None => AssertionForm::Null,
            Some(ScalarValue::Bool(true)) if record.return_type().is_boolean() => {
                AssertionForm::True
            }
            Some(ScalarValue::Bool(false)) if record.return_type().is_boolean() => {
                AssertionForm::False
            }
            Some(_) if record.return_type().is_literal_renderable() => AssertionForm::Equals,
            Some(_) => AssertionForm::NotNull,
        }
    }

    fn expected_literal(record: &InvocationResult) -> String {
        record
            .outcome()
            .value()
            .map(ScalarValue::render)
            .unwrap_or_default()
    }

    fn failure_kind(record: &InvocationResult) -> String {
        record
            .outcome()
            .failure()
            .map(|failure| failure.kind().to_string())
            .unwrap_or_default()
    }

    fn build_public_test(&self, record: &InvocationResult, index: usize) -> String {
        let name = format!("{}_test_{}", record.method_name(), index);
        let call = self.render_public_call(record);
        let mut body = String::new();

        if !record.is_static() {
            let _ = writeln!(body, "    let target = {};", record.receiver_literal());
        }

        match Self::assertion_form(record) {
            AssertionForm::Throws => {
                let _ = writeln!(
                    body,
                    "    let failure = {call}.expect_err(\"expected `{}` to fail\");",
                    record.method_name()
                );
                let _ = writeln!(
                    body,
                    "    assert_eq!(\"{}\", simple_type_name(&failure));",
                    Self::failure_kind(record)
                );
            }
            AssertionForm::Null => {
                let _ = writeln!(body, "    assert!({call}.is_none());");
            }
            AssertionForm::True => {
                let _ = writeln!(body, "    assert!({call});");
            }
            AssertionForm::False => {
                let _ = writeln!(body, "    assert!(!{call});");
            }
            AssertionForm::Equals => {
                let _ = writeln!(
                    body,
                    "    assert_eq!({}, {call});",
                    Self::expected_literal(record)
                );
            }
            AssertionForm::NotNull => {
                let _ = writeln!(body, "    let result = {call};");
                let _ = writeln!(
                    body,
                    "    assert_eq!(\"{}\", simple_type_name(&result));",
                    record.return_type().name()
                );
            }
        }

        format!("#[test]\nfn {name}() {{\n{body}}}\n")
    }

    fn render_public_call(&self, record: &InvocationResult) -> String {
        let args = record.parameter_literals().join(", ");
        if record.is_static() {
            format!("{}::{}({})", self.result.name(), record.method_name(), args)
        } else {
            format!("target.{}({})", record.method_name(), args)
        }
    }

    fn build_forced_test(&self, record: &InvocationResult, index: usize) -> String {
        let name = format!("{}_test_{}", record.method_name(), index);
        let mut body = String::new();

        let _ = writeln!(
            body,
            "    let unit = {}.resolve(\"{}\", \"{}\")?;",
            self.profile.registry_expr(),
            self.result.namespace(),
            self.result.name()
        );
        let param_names: Vec<String> = record
            .parameter_types()
            .iter()
            .map(|ty| format!("\"{}\"", ty.name()))
            .collect();
        let _ = writeln!(
            body,
            "    let member = unit.member(\"{}\", &[{}])?;",
            record.method_name(),
            param_names.join(", ")
        );
        if record.is_static() {
            body.push_str("    let mut receiver: Option<DynValue> = None;\n");
        } else {
            let _ = writeln!(
                body,
                "    let mut receiver: Option<DynValue> = Some(value({}));",
                record.receiver_literal()
            );
        }

        let invoke = format!(
            "member.invoke_forced(receiver.as_deref_mut(), &[{}])",
            Self::render_forced_args(record)
        );

        match Self::assertion_form(record) {
            AssertionForm::Throws => {
                let _ = writeln!(
                    body,
                    "    let failure = {invoke}.expect_err(\"expected `{}` to fail\");",
                    record.method_name()
                );
                body.push_str(
                    "    let cause = failure.into_target().expect(\"wrapped invocation failure\");\n",
                );
                let _ = writeln!(
                    body,
                    "    assert_eq!(\"{}\", cause.kind());",
                    Self::failure_kind(record)
                );
            }
            AssertionForm::Null => {
                let _ = writeln!(body, "    assert!({invoke}?.is_none());");
            }
            AssertionForm::True | AssertionForm::False => {
                let expected = Self::assertion_form(record) == AssertionForm::True;
                let _ = writeln!(body, "    let result = {invoke}?;");
                let _ = writeln!(
                    body,
                    "    assert_eq!(Some(&{expected}), result.as_ref().and_then(|v| v.downcast_ref::<bool>()));"
                );
            }
            AssertionForm::Equals => {
                let literal = if matches!(record.return_type().kind(), TypeKind::Str) {
                    format!("{}.to_string()", Self::expected_literal(record))
                } else {
                    Self::expected_literal(record)
                };
                let _ = writeln!(body, "    let result = {invoke}?;");
                let _ = writeln!(
                    body,
                    "    assert_eq!(Some(&{literal}), result.as_ref().and_then(|v| v.downcast_ref::<{}>()));",
                    record.return_type().name()
                );
            }
            AssertionForm::NotNull => {
                let _ = writeln!(body, "    assert!({invoke}?.is_some());");
            }
        }

        body.push_str("    Ok(())\n");
        format!("#[test]\nfn {name}() -> Result<(), Box<dyn std::error::Error>> {{\n{body}}}\n")
    }

    fn render_forced_args(record: &InvocationResult) -> String {
        // A lone absent argument needs its element type spelled out, or
        // the argument slice cannot be inferred.
        let lone_null = record.exception_expected()
            && record.parameter_literals().len() == 1
            && record.parameter_literals()[0] == "None";

        record
            .parameter_literals()
            .iter()
            .map(|literal| {
                if literal == "None" {
                    if lone_null {
                        "None::<DynValue>".to_string()
                    } else {
                        "None".to_string()
                    }
                } else {
                    format!("arg({literal})")
                }
            })
            .collect::<Vec<String>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{CapturedFailure, TypeDescriptor};
    use crate::results::InvocationOutcome;

    fn unit_with(results: Vec<InvocationResult>) -> FuzzedUnitResult {
        FuzzedUnitResult::new("menu", "MenuParser", results)
    }

    fn public_instance(
        method: &str,
        outcome: InvocationOutcome,
        return_type: TypeDescriptor,
    ) -> InvocationResult {
        InvocationResult::new(
            method,
            Vec::new(),
            Vec::new(),
            "MenuParser::new()",
            outcome,
            false,
            false,
            return_type,
        )
    }

    mod public_tests {
        use super::*;

        #[test]
        fn test_boolean_true_renders_assert() {
            let result = unit_with(vec![public_instance(
                "is_ready",
                InvocationOutcome::Value(Some(ScalarValue::Bool(true))),
                TypeDescriptor::boolean(),
            )]);
            let text = TestCaseBuilder::new(&result).build();
            assert!(text.contains("fn is_ready_test_1()"));
            assert!(text.contains("let target = MenuParser::new();"));
            assert!(text.contains("assert!(target.is_ready());"));
            assert!(text.contains("use menu::MenuParser;"));
        }

        #[test]
        fn test_boolean_false_renders_negated_assert() {
            let result = unit_with(vec![public_instance(
                "is_ready",
                InvocationOutcome::Value(Some(ScalarValue::Bool(false))),
                TypeDescriptor::boolean(),
            )]);
            let text = TestCaseBuilder::new(&result).build();
            assert!(text.contains("assert!(!target.is_ready());"));
        }

        #[test]
        fn test_absent_value_renders_assert_none() {
            let result = unit_with(vec![public_instance(
                "lookup",
                InvocationOutcome::Value(None),
                TypeDescriptor::void(),
            )]);
            let text = TestCaseBuilder::new(&result).build();
            assert!(text.contains("assert!(target.lookup().is_none());"));
        }

        #[test]
        fn test_literal_return_renders_assert_eq() {
            let record = InvocationResult::new(
                "count_rows",
                vec!["\"a;b\\nc;d\"".to_string()],
                vec![TypeDescriptor::string()],
                "MenuParser::new()",
                InvocationOutcome::Value(Some(ScalarValue::I64(2))),
                false,
                false,
                TypeDescriptor::i64(),
            );
            let text = TestCaseBuilder::new(&unit_with(vec![record])).build();
            assert!(text.contains("assert_eq!(2i64, target.count_rows(\"a;b\\nc;d\"));"));
        }

        #[test]
        fn test_static_member_calls_through_unit_name() {
            let record = InvocationResult::new(
                "default_delimiter",
                Vec::new(),
                Vec::new(),
                "",
                InvocationOutcome::Value(Some(ScalarValue::Char(';'))),
                true,
                false,
                TypeDescriptor::character(),
            );
            let text = TestCaseBuilder::new(&unit_with(vec![record])).build();
            assert!(text.contains("assert_eq!(';', MenuParser::default_delimiter());"));
            assert!(!text.contains("let target"));
        }

        #[test]
        fn test_thrown_failure_renders_expect_err() {
            let result = unit_with(vec![public_instance(
                "parse",
                InvocationOutcome::Failure(CapturedFailure::new("InvalidDate", "bad day")),
                TypeDescriptor::void(),
            )]);
            let text = TestCaseBuilder::new(&result).build();
            assert!(text.contains("expect_err(\"expected `parse` to fail\")"));
            assert!(text.contains("assert_eq!(\"InvalidDate\", simple_type_name(&failure));"));
            assert!(text.contains("use sondear::testgen::simple_type_name;"));
        }

        #[test]
        fn test_structured_return_asserts_type_name() {
            let result = unit_with(vec![public_instance(
                "parse",
                InvocationOutcome::Value(Some(ScalarValue::Opaque("Vec<MenuLine>".to_string()))),
                TypeDescriptor::composite("Vec<MenuLine>", Vec::new()),
            )]);
            let text = TestCaseBuilder::new(&result).build();
            assert!(text.contains("let result = target.parse();"));
            assert!(text.contains("assert_eq!(\"Vec<MenuLine>\", simple_type_name(&result));"));
        }
    }

    mod forced_tests {
        use super::*;

        fn private_thrower(literals: Vec<String>, types: Vec<TypeDescriptor>) -> InvocationResult {
            InvocationResult::new(
                "parse_price",
                literals,
                types,
                "MenuParser::new()",
                InvocationOutcome::Failure(CapturedFailure::new("InvalidPrice", "no digits")),
                false,
                true,
                TypeDescriptor::f64(),
            )
        }

        #[test]
        fn test_forced_throw_asserts_wrapper_then_cause() {
            let record = private_thrower(
                vec!["\"x\"".to_string()],
                vec![TypeDescriptor::string()],
            );
            let text = TestCaseBuilder::new(&unit_with(vec![record])).build();

            // Declared failure modes of the indirection
            assert!(text
                .contains("fn parse_price_test_1() -> Result<(), Box<dyn std::error::Error>>"));
            // Unit re-resolved by name, member re-looked-up with types
            assert!(text.contains("registry().resolve(\"menu\", \"MenuParser\")?"));
            assert!(text.contains("unit.member(\"parse_price\", &[\"String\"])?"));
            // Receiver reconstructed from its captured literal
            assert!(text.contains("Some(value(MenuParser::new()))"));
            // Wrapper first, unwrapped cause second
            assert!(text.contains("expect_err(\"expected `parse_price` to fail\")"));
            assert!(text.contains("failure.into_target().expect(\"wrapped invocation failure\")"));
            assert!(text.contains("assert_eq!(\"InvalidPrice\", cause.kind());"));
            assert!(text.contains("use sondear::introspect::{arg, value, DynValue};"));
        }

        #[test]
        fn test_lone_null_argument_is_type_disambiguated() {
            let record = private_thrower(
                vec!["None".to_string()],
                vec![TypeDescriptor::string()],
            );
            let text = TestCaseBuilder::new(&unit_with(vec![record])).build();
            assert!(text.contains("&[None::<DynValue>]"));
        }

        #[test]
        fn test_null_among_several_arguments_stays_bare() {
            let record = InvocationResult::new(
                "combine",
                vec!["None".to_string(), "3".to_string()],
                vec![TypeDescriptor::unconstrained(), TypeDescriptor::i32()],
                "MenuParser::new()",
                InvocationOutcome::Value(None),
                false,
                true,
                TypeDescriptor::void(),
            );
            let text = TestCaseBuilder::new(&unit_with(vec![record])).build();
            assert!(text.contains("&[None, arg(3)]"));
        }

        #[test]
        fn test_forced_boolean_asserts_downcast() {
            let record = InvocationResult::new(
                "has_header",
                Vec::new(),
                Vec::new(),
                "MenuParser::new()",
                InvocationOutcome::Value(Some(ScalarValue::Bool(true))),
                false,
                true,
                TypeDescriptor::boolean(),
            );
            let text = TestCaseBuilder::new(&unit_with(vec![record])).build();
            assert!(text.contains(
                "assert_eq!(Some(&true), result.as_ref().and_then(|v| v.downcast_ref::<bool>()));"
            ));
        }

        #[test]
        fn test_forced_string_equality_owns_the_literal() {
            let record = InvocationResult::new(
                "normalize",
                vec!["\"A\"".to_string()],
                vec![TypeDescriptor::string()],
                "MenuParser::new()",
                InvocationOutcome::Value(Some(ScalarValue::Str("a".to_string()))),
                false,
                true,
                TypeDescriptor::string(),
            );
            let text = TestCaseBuilder::new(&unit_with(vec![record])).build();
            assert!(text.contains("Some(&\"a\".to_string())"));
            assert!(text.contains("downcast_ref::<String>()"));
        }

        #[test]
        fn test_forced_static_member_has_no_receiver() {
            let record = InvocationResult::new(
                "internal_default",
                Vec::new(),
                Vec::new(),
                "",
                InvocationOutcome::Value(Some(ScalarValue::I32(7))),
                true,
                true,
                TypeDescriptor::i32(),
            );
            let text = TestCaseBuilder::new(&unit_with(vec![record])).build();
            assert!(text.contains("let mut receiver: Option<DynValue> = None;"));
        }
    }

    mod naming_tests {
        use super::*;

        #[test]
        fn test_counter_disambiguates_same_member() {
            let first = public_instance(
                "is_ready",
                InvocationOutcome::Value(Some(ScalarValue::Bool(true))),
                TypeDescriptor::boolean(),
            );
            let second = public_instance(
                "is_ready",
                InvocationOutcome::Value(Some(ScalarValue::Bool(false))),
                TypeDescriptor::boolean(),
            );
            let text = TestCaseBuilder::new(&unit_with(vec![first, second])).build();
            assert!(text.contains("fn is_ready_test_1()"));
            assert!(text.contains("fn is_ready_test_2()"));
        }

        #[test]
        fn test_output_is_deterministic() {
            let result = unit_with(vec![public_instance(
                "is_ready",
                InvocationOutcome::Value(Some(ScalarValue::Bool(true))),
                TypeDescriptor::boolean(),
            )]);
            let first = TestCaseBuilder::new(&result).build();
            let second = TestCaseBuilder::new(&result).build();
            assert_eq!(first, second);
        }

        #[test]
        fn test_header_names_the_unit() {
            let result = unit_with(Vec::new());
            let text = TestCaseBuilder::new(&result).build();
            assert!(text.starts_with(
                "//! Regression tests generated for `menu::MenuParser` by a fuzzing session."
            ));
        }
    }

    mod profile_tests {
        use super::*;

        #[test]
        fn test_custom_registry_expression_and_imports() {
            let record = InvocationResult::new(
                "hidden",
                Vec::new(),
                Vec::new(),
                "MenuParser::new()",
                InvocationOutcome::Value(None),
                false,
                true,
                TypeDescriptor::void(),
            );
            let profile = RenderProfile::new("demo::registry(&CoverageContext::new())")
                .with_import("use sondear::CoverageContext;");
            let text = TestCaseBuilder::new(&unit_with(vec![record]))
                .with_profile(profile)
                .build();
            assert!(text.contains("demo::registry(&CoverageContext::new()).resolve("));
            assert!(text.contains("use sondear::CoverageContext;"));
        }
    }
}
