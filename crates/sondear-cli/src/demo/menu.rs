//! A canteen-menu CSV parser, the demo program under test.
//!
//! Rows look like
//! `14.03.2022;Mo;HG;Grillteller (A,AA,3);V,VG;3,20;4,10;5,00`: a date,
//! a weekday, a dish type, a dish name with optional additive/allergen
//! annotations, a tag list, and three prices using a decimal comma.
//!
//! The parser reports execution through abstract probe ids so a fuzzing
//! session can observe which of its branches a candidate reached. Probe
//! ids are stable identifiers, not physical source lines.

use chrono::NaiveDate;
use sondear::{CoverageContext, CoverageSink};
use thiserror::Error;

/// Coverage unit identifier of this parser.
pub const UNIT: &str = "menu::MenuParser";

/// Number of declared probes.
pub const PROBE_COUNT: u32 = 14;

/// Failures the parser reports for malformed rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    /// A row does not carry enough fields.
    #[error("row has {found} fields, expected at least {expected}")]
    MissingFields {
        /// Minimum number of fields a row must carry
        expected: usize,
        /// Number of fields found
        found: usize,
    },

    /// A date field does not match `dd.MM.yyyy`.
    #[error("invalid date `{0}`, expected dd.MM.yyyy")]
    InvalidDate(String),

    /// A price field is not a decimal number.
    #[error("invalid price `{0}`")]
    InvalidPrice(String),

    /// A dish-type field carries an unknown token.
    #[error("unknown dish type `{0}`")]
    UnknownDishType(String),
}

/// Category of a dish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DishType {
    /// Soup course
    Soup,
    /// Main dish
    Main,
    /// Side dish
    Side,
    /// Dessert
    Dessert,
}

impl DishType {
    fn from_token(token: &str) -> Result<Self, MenuError> {
        match token.trim() {
            "Suppe" => Ok(Self::Soup),
            "HG" => Ok(Self::Main),
            "B" => Ok(Self::Side),
            "N" => Ok(Self::Dessert),
            other => Err(MenuError::UnknownDishType(other.to_string())),
        }
    }
}

/// One successfully parsed menu row.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuLine {
    /// Serving date
    pub date: NaiveDate,
    /// Dish category
    pub dish_type: DishType,
    /// Dish name with annotations stripped
    pub name: String,
    /// Tag tokens
    pub tags: Vec<String>,
    /// Student price
    pub student_price: f64,
    /// Staff price
    pub staff_price: f64,
    /// Guest price
    pub guest_price: f64,
}

/// The demo parser.
#[derive(Debug, Clone, Default)]
pub struct MenuParser {
    probes: Option<CoverageContext>,
}

impl MenuParser {
    /// Create an uninstrumented parser.
    #[must_use]
    pub fn new() -> Self {
        Self { probes: None }
    }

    /// Create a parser reporting probe visits into the given context.
    #[must_use]
    pub fn with_probes(context: CoverageContext) -> Self {
        Self {
            probes: Some(context),
        }
    }

    fn probe(&self, line: u32) {
        if let Some(context) = &self.probes {
            context.record_visit(UNIT, line);
        }
    }

    /// Parse a whole menu text; empty lines are skipped.
    pub fn parse(&self, text: &str) -> Result<Vec<MenuLine>, MenuError> {
        self.probe(1);
        let mut lines = Vec::new();
        for row in text.lines().filter(|row| !row.trim().is_empty()) {
            self.probe(2);
            lines.push(self.parse_row(row)?);
        }
        Ok(lines)
    }

    /// Number of non-empty rows in the text.
    #[must_use]
    pub fn count_rows(&self, text: &str) -> i64 {
        self.probe(3);
        text.lines().filter(|row| !row.trim().is_empty()).count() as i64
    }

    /// True when the text contains no non-empty rows.
    #[must_use]
    pub fn is_empty_menu(&self, text: &str) -> bool {
        self.probe(4);
        self.count_rows(text) == 0
    }

    fn parse_row(&self, row: &str) -> Result<MenuLine, MenuError> {
        self.probe(5);
        let fields: Vec<&str> = row.split(';').collect();
        if fields.len() < 8 {
            self.probe(6);
            return Err(MenuError::MissingFields {
                expected: 8,
                found: fields.len(),
            });
        }

        let date = self.parse_date(fields[0])?;
        let dish_type = self.parse_dish_type(fields[2])?;
        let name = Self::strip_annotations(fields[3]);
        let tags = self.split_tags(fields[4]);
        let student_price = self.parse_price(fields[5])?;
        let staff_price = self.parse_price(fields[6])?;
        let guest_price = self.parse_price(fields[7])?;

        self.probe(7);
        Ok(MenuLine {
            date,
            dish_type,
            name,
            tags,
            student_price,
            staff_price,
            guest_price,
        })
    }

    // Reachable by the registry's visibility-override adapters, but not
    // part of the public parser API.
    pub(crate) fn parse_date(&self, field: &str) -> Result<NaiveDate, MenuError> {
        self.probe(8);
        NaiveDate::parse_from_str(field.trim(), "%d.%m.%Y").map_err(|_| {
            self.probe(9);
            MenuError::InvalidDate(field.to_string())
        })
    }

    pub(crate) fn parse_price(&self, field: &str) -> Result<f64, MenuError> {
        self.probe(10);
        let normalized = field.trim().replace(',', ".");
        normalized.parse::<f64>().map_err(|_| {
            self.probe(11);
            MenuError::InvalidPrice(field.to_string())
        })
    }

    fn parse_dish_type(&self, field: &str) -> Result<DishType, MenuError> {
        self.probe(12);
        DishType::from_token(field)
    }

    fn split_tags(&self, field: &str) -> Vec<String> {
        self.probe(13);
        field
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Dish name with the trailing `(...)` annotation block removed.
    #[must_use]
    pub fn strip_annotations(field: &str) -> String {
        match field.find('(') {
            Some(index) => field[..index].trim().to_string(),
            None => field.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ROW: &str = "14.03.2022;Mo;HG;Grillteller (A,AA,3);V,VG;3,20;4,10;5,00";

    #[test]
    fn test_valid_row_parses() {
        let parser = MenuParser::new();
        let lines = parser.parse(VALID_ROW).unwrap();
        assert_eq!(lines.len(), 1);

        let line = &lines[0];
        assert_eq!(line.date, NaiveDate::from_ymd_opt(2022, 3, 14).unwrap());
        assert_eq!(line.dish_type, DishType::Main);
        assert_eq!(line.name, "Grillteller");
        assert_eq!(line.tags, vec!["V".to_string(), "VG".to_string()]);
        assert_eq!(line.student_price, 3.2);
        assert_eq!(line.guest_price, 5.0);
    }

    #[test]
    fn test_short_row_is_rejected() {
        let parser = MenuParser::new();
        let err = parser.parse("a;b;c").unwrap_err();
        assert_eq!(
            err,
            MenuError::MissingFields {
                expected: 8,
                found: 3
            }
        );
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let parser = MenuParser::new();
        let row = "14.13.2022;Mo;HG;Dish;V;1,00;2,00;3,00";
        assert!(matches!(
            parser.parse(row).unwrap_err(),
            MenuError::InvalidDate(_)
        ));
    }

    #[test]
    fn test_bad_price_is_rejected() {
        let parser = MenuParser::new();
        let row = "14.03.2022;Mo;HG;Dish;V;abc;2,00;3,00";
        assert!(matches!(
            parser.parse(row).unwrap_err(),
            MenuError::InvalidPrice(_)
        ));
    }

    #[test]
    fn test_unknown_dish_type_is_rejected() {
        let parser = MenuParser::new();
        let row = "14.03.2022;Mo;XX;Dish;V;1,00;2,00;3,00";
        assert!(matches!(
            parser.parse(row).unwrap_err(),
            MenuError::UnknownDishType(_)
        ));
    }

    #[test]
    fn test_counting_and_emptiness() {
        let parser = MenuParser::new();
        assert_eq!(parser.count_rows(""), 0);
        assert!(parser.is_empty_menu("  \n  "));
        assert_eq!(parser.count_rows("a\n\nb"), 2);
        assert!(!parser.is_empty_menu("a"));
    }

    #[test]
    fn test_strip_annotations() {
        assert_eq!(
            MenuParser::strip_annotations("Grillteller (A,AA,3)"),
            "Grillteller"
        );
        assert_eq!(MenuParser::strip_annotations("Salat"), "Salat");
    }

    #[test]
    fn test_probes_report_into_the_context() {
        let context = CoverageContext::new();
        for line in 1..=PROBE_COUNT {
            context.declare_line(UNIT, line);
        }
        let parser = MenuParser::with_probes(context.clone());
        let _ = parser.parse(VALID_ROW);
        assert!(context.covered_lines() > 0);
        assert!(context.coverage_ratio() > 0.0);
    }

    #[test]
    fn test_uninstrumented_parser_records_nothing() {
        let parser = MenuParser::new();
        let _ = parser.parse(VALID_ROW);
        // No context attached, nothing to assert beyond not panicking
        assert!(parser.probes.is_none());
    }
}
