//! Translation of fuzzing results into regression-test source text.
//!
//! The builder is a pure function from a [`FuzzedUnitResult`]
//! (../results.rs) to test source text: template substitution over the
//! captured literals, with the assertion vocabulary supplied by a
//! [`RenderProfile`]. Writing the text to disk is a separate concern with
//! its own failure modes.

mod builder;
mod writer;

pub use builder::{RenderProfile, TestCaseBuilder};
pub use writer::{FileSystemOps, RealFileSystem, TestFileWriter};

/// The last path segment of a value's type name.
///
/// Generated tests use this to assert on a result's declared type without
/// naming the full path.
#[must_use]
pub fn simple_type_name<T>(_value: &T) -> &'static str {
    crate::introspect::simple_name(std::any::type_name::<T>())
}

/// `MenuParser` -> `menu_parser`, for generated file names.
pub(crate) fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (index, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if index > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
