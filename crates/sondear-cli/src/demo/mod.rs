//! Demo fuzz targets and their registry.
//!
//! The engine core knows nothing about these types; they are ordinary
//! programs under test, described to the engine through the introspection
//! descriptors. Registering a unit declares its probe lines into the
//! session's coverage context and wires every member to an invocation
//! adapter.

pub mod menu;

use menu::MenuParser;
use sondear::introspect::{
    value, CapturedFailure, ConstructorDescriptor, DynValue, MemberDescriptor, TypeDescriptor,
    Visibility,
};
use sondear::{CoverageContext, CoverageSink, TargetRegistry, UnitDescriptor};
use std::any::Any;

/// Build the registry of every demo unit, wired to the given coverage
/// context.
#[must_use]
pub fn registry(context: &CoverageContext) -> TargetRegistry {
    let mut registry = TargetRegistry::new();
    registry.register(menu_parser_unit(context));
    registry
}

fn parser_receiver<'r>(
    receiver: Option<&'r mut dyn Any>,
) -> Result<&'r MenuParser, CapturedFailure> {
    receiver
        .and_then(|r| r.downcast_ref::<MenuParser>())
        .ok_or_else(|| CapturedFailure::new("TypeError", "expected a MenuParser receiver"))
}

fn string_arg(args: &[Option<DynValue>], index: usize) -> Result<String, CapturedFailure> {
    args.get(index)
        .and_then(Option::as_ref)
        .and_then(|arg| arg.downcast_ref::<String>())
        .cloned()
        .ok_or_else(|| {
            CapturedFailure::new("TypeError", format!("argument {index} must be a string"))
        })
}

fn menu_parser_unit(context: &CoverageContext) -> UnitDescriptor {
    for line in 1..=menu::PROBE_COUNT {
        context.declare_line(menu::UNIT, line);
    }

    let constructor_context = context.clone();
    let receiver_type = TypeDescriptor::composite(
        "MenuParser",
        vec![ConstructorDescriptor::new(
            "MenuParser::new",
            Vec::new(),
            move |_| Ok(value(MenuParser::with_probes(constructor_context.clone()))),
        )],
    );

    let strip_context = context.clone();

    UnitDescriptor::new("menu", "MenuParser", receiver_type)
        .with_member(
            MemberDescriptor::new(
                "parse",
                vec![TypeDescriptor::string()],
                TypeDescriptor::composite("Vec<MenuLine>", Vec::new()),
            )
            .with_adapter(|receiver, args| {
                let parser = parser_receiver(receiver)?;
                let text = string_arg(args, 0)?;
                parser
                    .parse(&text)
                    .map(|rows| Some(value(rows)))
                    .map_err(|error| CapturedFailure::from_error(&error))
            }),
        )
        .with_member(
            MemberDescriptor::new(
                "count_rows",
                vec![TypeDescriptor::string()],
                TypeDescriptor::i64(),
            )
            .with_adapter(|receiver, args| {
                let parser = parser_receiver(receiver)?;
                let text = string_arg(args, 0)?;
                Ok(Some(value(parser.count_rows(&text))))
            }),
        )
        .with_member(
            MemberDescriptor::new(
                "is_empty_menu",
                vec![TypeDescriptor::string()],
                TypeDescriptor::boolean(),
            )
            .with_adapter(|receiver, args| {
                let parser = parser_receiver(receiver)?;
                let text = string_arg(args, 0)?;
                Ok(Some(value(parser.is_empty_menu(&text))))
            }),
        )
        .with_member(
            MemberDescriptor::new(
                "parse_price",
                vec![TypeDescriptor::string()],
                TypeDescriptor::f64(),
            )
            .with_visibility(Visibility::Private)
            .with_adapter(|receiver, args| {
                let parser = parser_receiver(receiver)?;
                let field = string_arg(args, 0)?;
                parser
                    .parse_price(&field)
                    .map(|price| Some(value(price)))
                    .map_err(|error| CapturedFailure::from_error(&error))
            }),
        )
        .with_member(
            MemberDescriptor::new(
                "parse_date",
                vec![TypeDescriptor::string()],
                TypeDescriptor::composite("NaiveDate", Vec::new()),
            )
            .with_visibility(Visibility::Private)
            .with_adapter(|receiver, args| {
                let parser = parser_receiver(receiver)?;
                let field = string_arg(args, 0)?;
                parser
                    .parse_date(&field)
                    .map(|date| Some(value(date)))
                    .map_err(|error| CapturedFailure::from_error(&error))
            }),
        )
        .with_member(
            MemberDescriptor::new(
                "strip_annotations",
                vec![TypeDescriptor::string()],
                TypeDescriptor::string(),
            )
            .with_static(true)
            .with_adapter(move |_, args| {
                strip_context.record_visit(menu::UNIT, 14);
                let field = string_arg(args, 0)?;
                Ok(Some(value(MenuParser::strip_annotations(&field))))
            }),
        )
        // Analog of a compiler-generated bridge method: enumerable
        // metadata exists, but fuzzing must skip it.
        .with_member(
            MemberDescriptor::new("clone_shim", Vec::new(), TypeDescriptor::void())
                .with_synthetic(true),
        )
}
