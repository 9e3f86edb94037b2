//! Coverage report formatters.
//!
//! XML and HTML generators over a [`CoverageMap`](super::CoverageMap)
//! snapshot, for CI pickup and human reading respectively. Formatters
//! build strings; writing them anywhere is the caller's concern.

mod html;
mod xml;

pub use html::HtmlFormatter;
pub use xml::XmlFormatter;
