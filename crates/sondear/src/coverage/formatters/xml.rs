//! XML coverage report formatter.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <report>
//!     <unit name="menu::MenuParser">
//!         <line number="3" times="17"/>
//!         <lines>12</lines>
//!         <visited>9</visited>
//!     </unit>
//! </report>
//! ```

use crate::coverage::CoverageMap;
use std::fmt::Write;

/// XML format report generator
#[derive(Debug)]
pub struct XmlFormatter<'a> {
    map: &'a CoverageMap,
}

impl<'a> XmlFormatter<'a> {
    /// Create a formatter over a coverage snapshot.
    #[must_use]
    pub fn new(map: &'a CoverageMap) -> Self {
        Self { map }
    }

    /// Generate the XML report as a string.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<report>\n");
        for (unit, tracker) in self.map.units() {
            let _ = writeln!(xml, "    <unit name=\"{}\">", escape(unit));
            for (line, times) in tracker.visits() {
                let _ = writeln!(xml, "        <line number=\"{line}\" times=\"{times}\"/>");
            }
            let _ = writeln!(xml, "        <lines>{}</lines>", tracker.lines().len());
            let _ = writeln!(xml, "        <visited>{}</visited>", tracker.visits().len());
            xml.push_str("    </unit>\n");
        }
        xml.push_str("</report>\n");
        xml
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
