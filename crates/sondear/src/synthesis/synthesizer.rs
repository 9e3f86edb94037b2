//! The type-directed value synthesizer.

use super::expression::Expression;
use crate::introspect::{
    value_identity, CapturedFailure, ConstructorDescriptor, DynValue, RenderStyle, ScalarValue,
    TypeDescriptor, TypeKind,
};
use crate::rng::{Seed, Xorshift64};
use chrono::{Days, NaiveDate};
use num_bigint::BigInt;
use std::any::Any;
use std::collections::HashMap;

const MAX_STRING_LENGTH: u64 = 255;
const MAX_BIGINT_DIGITS: u64 = 20;
const MAX_ROWS: u64 = 20;
const MAX_FIELDS: u64 = 12;

const ADDITIVES: &[&str] = &[
    "A", "AA", "AB", "AC", "AD", "AE", "AF", "B", "C", "D", "E", "F", "G", "H", "HA", "HB", "HC",
    "HD", "HE", "HF", "HG", "HH", "HI", "I", "J", "K", "L", "M", "N", "O", "P",
];
const ALLERGENS: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
];
const TAGS: &[&str] = &["G", "S", "R", "F", "A", "V", "VG", "MV", "J", "BL", "L", "W", "B"];
const DISH_TYPES: &[&str] = &["Suppe", "HG", "B", "N"];
const WEEKDAYS: &[&str] = &["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"];
const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ ";

/// Generates values for arbitrary described types, remembering for every
/// successful synthesis the literal text that reproduces it.
pub struct ValueSynthesizer {
    rng: Xorshift64,
    memo: HashMap<usize, String>,
    delimiter: String,
}

impl ValueSynthesizer {
    /// Create a synthesizer with the default field delimiter `;`.
    #[must_use]
    pub fn new(seed: Seed) -> Self {
        Self {
            rng: Xorshift64::new(seed),
            memo: HashMap::new(),
            delimiter: ";".to_string(),
        }
    }

    /// Use a different delimiter for synthesized record text.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Build a randomized multi-row, multi-field text blob for raw-string
    /// fuzzing of text-parsing targets.
    ///
    /// Row and field counts are bounded; fields come from a fixed palette
    /// of domain-flavored generators (calendar dates, categorical tokens,
    /// decimal prices, alphabetic filler).
    pub fn synthesize_string(&mut self) -> String {
        let rows = self.rng.next_range(0, MAX_ROWS);
        let fields = self.rng.next_range(0, MAX_FIELDS);

        let mut text = String::new();
        for row in 0..rows {
            text.push_str(&self.random_row(fields as usize));
            if row < rows - 1 {
                text.push('\n');
            }
        }
        text
    }

    /// Synthesize a value of the described type.
    ///
    /// On success the value's literal rendering is recorded in the memo
    /// table under the value's identity. Any failure (no usable
    /// constructor, a constructor error) degrades to `None` rather than
    /// aborting the caller.
    pub fn synthesize(&mut self, ty: &TypeDescriptor) -> Option<DynValue> {
        let expression = self.build_expression(ty);
        match expression.resolve() {
            Ok(Some(produced)) => {
                self.memo
                    .insert(value_identity(&*produced), expression.render());
                Some(produced)
            }
            Ok(None) => None,
            Err(failure) => {
                tracing::debug!(ty = ty.name(), %failure, "synthesis failed, yielding absent");
                None
            }
        }
    }

    /// Convenience entry point for receiver and argument instantiation.
    pub fn instantiate(&mut self, ty: &TypeDescriptor) -> Option<DynValue> {
        self.synthesize(ty)
    }

    /// Build the expression tree for the described type without resolving
    /// it.
    pub fn build_expression(&mut self, ty: &TypeDescriptor) -> Expression {
        match ty.kind() {
            TypeKind::I16 => Expression::Leaf(ScalarValue::I16(self.rng.next() as i16)),
            TypeKind::I32 => Expression::Leaf(ScalarValue::I32(self.rng.next() as i32)),
            TypeKind::I64 => Expression::Leaf(ScalarValue::I64(self.rng.next() as i64)),
            TypeKind::U8 => Expression::Leaf(ScalarValue::U8(self.rng.next() as u8)),
            TypeKind::F32 => Expression::Leaf(ScalarValue::F32(self.rng.next_f32())),
            TypeKind::F64 => Expression::Leaf(ScalarValue::F64(self.rng.next_f64())),
            TypeKind::Char => {
                let ch = (b'a' + self.rng.next_range(0, 26) as u8) as char;
                Expression::Leaf(ScalarValue::Char(ch))
            }
            TypeKind::Bool => Expression::Leaf(ScalarValue::Bool(self.rng.next_bool())),
            TypeKind::Str => Expression::Leaf(ScalarValue::Str(self.random_string())),
            TypeKind::Unconstrained | TypeKind::Void => Expression::Leaf(ScalarValue::Null),
            TypeKind::BigInt => self.big_int_expression(),
            TypeKind::Composite(_) => self.composite_expression(ty),
        }
    }

    /// Look up the literal text recorded for a previously synthesized
    /// value.
    #[must_use]
    pub fn lookup_literal(&self, produced: &dyn Any) -> Option<&str> {
        self.memo.get(&value_identity(produced)).map(String::as_str)
    }

    /// Drop all recorded literals.
    pub fn clear_memo(&mut self) {
        self.memo.clear();
    }

    fn big_int_expression(&mut self) -> Expression {
        let constructor = ConstructorDescriptor::new(
            "BigInt",
            vec![TypeDescriptor::string()],
            |args| {
                let digits = args
                    .into_iter()
                    .next()
                    .flatten()
                    .and_then(|v| v.downcast::<String>().ok())
                    .ok_or_else(|| {
                        CapturedFailure::new(
                            "SynthesisError",
                            "big-integer constructor expects one string argument",
                        )
                    })?;
                digits
                    .parse::<BigInt>()
                    .map(|parsed| Box::new(parsed) as DynValue)
                    .map_err(|error| CapturedFailure::from_error(&error))
            },
        )
        .with_render_style(RenderStyle::Parse);

        Expression::Composite {
            constructor,
            args: vec![Expression::Leaf(ScalarValue::Str(
                self.random_numeric_string(),
            ))],
        }
    }

    fn composite_expression(&mut self, ty: &TypeDescriptor) -> Expression {
        let Some(constructor) = ty.first_public_constructor().cloned() else {
            // No reachable constructor: the value cannot be created
            return Expression::Leaf(ScalarValue::Null);
        };
        let params = constructor.params().to_vec();
        let args = params
            .iter()
            .map(|param| self.build_expression(param))
            .collect();
        Expression::Composite { constructor, args }
    }

    fn random_string(&mut self) -> String {
        let length = self.rng.next_range(0, MAX_STRING_LENGTH);
        (0..length)
            .map(|_| self.rng.next_range(32, 127) as u8 as char)
            .collect()
    }

    /// Digit string for the arbitrary-precision integer type: optional
    /// leading `-`, first digit non-zero, bounded digit count. A drawn
    /// length of zero yields the literal `"0"`.
    fn random_numeric_string(&mut self) -> String {
        let length = self.rng.next_range(0, MAX_BIGINT_DIGITS);
        if length == 0 {
            return "0".to_string();
        }
        let mut digits = String::with_capacity(length as usize + 1);
        if self.rng.next_bool() {
            digits.push('-');
        }
        digits.push(char::from_digit(self.rng.next_range(1, 10) as u32, 10).unwrap());
        for _ in 1..length {
            digits.push(char::from_digit(self.rng.next_range(0, 10) as u32, 10).unwrap());
        }
        digits
    }

    fn random_row(&mut self, fields: usize) -> String {
        let values = [
            self.random_date_string(),
            self.random_token(WEEKDAYS),
            self.random_token(DISH_TYPES),
            self.random_dish_name(),
            self.random_list(TAGS, 5),
            self.random_price(),
            self.random_price(),
            self.random_price(),
        ];

        let mut row = String::new();
        for field in 0..fields {
            if field < values.len() {
                row.push_str(&values[field]);
            } else {
                row.push_str(&self.random_alphabetic_string());
            }
            if field < fields - 1 {
                row.push_str(&self.delimiter);
            }
        }
        row
    }

    fn random_date_string(&mut self) -> String {
        let origin = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let days = self.rng.next_range(0, 30 * 365);
        let choice = origin + Days::new(days);
        choice.format("%d.%m.%Y").to_string()
    }

    fn random_token(&mut self, values: &[&str]) -> String {
        values[self.rng.next_index(values.len())].to_string()
    }

    fn random_dish_name(&mut self) -> String {
        let mut name = self.random_alphabetic_string();
        if self.rng.next_bool() {
            name.push_str(" (");
            name.push_str(&self.random_additives_and_allergens());
            name.push(')');
        }
        name
    }

    fn random_additives_and_allergens(&mut self) -> String {
        let additives = self.random_list(ADDITIVES, 6);
        let allergens = self.random_list(ALLERGENS, 6);
        if !additives.is_empty() && !allergens.is_empty() {
            format!("{additives},{allergens}")
        } else {
            format!("{additives}{allergens}")
        }
    }

    fn random_list(&mut self, values: &[&str], max_length: u64) -> String {
        let length = self.rng.next_range(0, max_length);
        let mut list = String::new();
        for item in 0..length {
            list.push_str(values[self.rng.next_index(values.len())]);
            if item < length - 1 {
                list.push(',');
            }
        }
        list
    }

    fn random_price(&mut self) -> String {
        let price = 10.0 * self.rng.next_f64();
        format!("{price:.2}").replace('.', ",")
    }

    fn random_alphabetic_string(&mut self) -> String {
        let alphabet: Vec<char> = ALPHABET.chars().collect();
        let length = self.rng.next_range(0, 25);
        (0..length)
            .map(|_| alphabet[self.rng.next_index(alphabet.len())])
            .collect()
    }
}

impl std::fmt::Debug for ValueSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueSynthesizer")
            .field("memo_entries", &self.memo.len())
            .field("delimiter", &self.delimiter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::value;

    fn synthesizer() -> ValueSynthesizer {
        ValueSynthesizer::new(Seed::from_u64(42))
    }

    mod scalar_tests {
        use super::*;

        #[test]
        fn test_i16_spans_full_range() {
            let mut synth = synthesizer();
            let ty = TypeDescriptor::i16();
            let mut saw_negative = false;
            for _ in 0..100 {
                let produced = synth.synthesize(&ty).unwrap();
                let v = *produced.downcast_ref::<i16>().unwrap();
                saw_negative |= v < 0;
            }
            assert!(saw_negative, "full-range synthesis must produce negatives");
        }

        #[test]
        fn test_char_is_lowercase_letter() {
            let mut synth = synthesizer();
            let ty = TypeDescriptor::character();
            for _ in 0..100 {
                let produced = synth.synthesize(&ty).unwrap();
                let ch = *produced.downcast_ref::<char>().unwrap();
                assert!(ch.is_ascii_lowercase());
            }
        }

        #[test]
        fn test_string_is_bounded_printable_ascii() {
            let mut synth = synthesizer();
            let ty = TypeDescriptor::string();
            for _ in 0..50 {
                let produced = synth.synthesize(&ty).unwrap();
                let text = produced.downcast_ref::<String>().unwrap();
                assert!(text.len() < 255);
                assert!(text.chars().all(|ch| (' '..='~').contains(&ch)));
            }
        }

        #[test]
        fn test_unconstrained_yields_absent() {
            let mut synth = synthesizer();
            assert!(synth.synthesize(&TypeDescriptor::unconstrained()).is_none());
        }

        #[test]
        fn test_floats_in_unit_interval() {
            let mut synth = synthesizer();
            for _ in 0..50 {
                let produced = synth.synthesize(&TypeDescriptor::f64()).unwrap();
                let v = *produced.downcast_ref::<f64>().unwrap();
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    mod numeric_string_tests {
        use super::*;

        #[test]
        fn test_shape_of_numeric_strings() {
            let mut synth = synthesizer();
            let mut saw_zero = false;
            let mut saw_negative = false;
            for _ in 0..500 {
                let digits = synth.random_numeric_string();
                if digits == "0" {
                    saw_zero = true;
                    continue;
                }
                let unsigned = digits.strip_prefix('-').unwrap_or(&digits);
                saw_negative |= unsigned.len() != digits.len();
                let first = unsigned.chars().next().unwrap();
                assert!(
                    ('1'..='9').contains(&first),
                    "first digit of {digits:?} must be non-zero"
                );
                assert!(unsigned.chars().all(|ch| ch.is_ascii_digit()));
                assert!(unsigned.len() < MAX_BIGINT_DIGITS as usize);
            }
            assert!(saw_zero, "zero-length draw must yield the literal \"0\"");
            assert!(saw_negative);
        }

        #[test]
        fn test_big_int_synthesis_parses() {
            let mut synth = synthesizer();
            let ty = TypeDescriptor::big_int();
            for _ in 0..50 {
                let produced = synth.synthesize(&ty).unwrap();
                assert!(produced.downcast_ref::<BigInt>().is_some());
            }
        }

        #[test]
        fn test_big_int_literal_is_parse_expression() {
            let mut synth = synthesizer();
            let ty = TypeDescriptor::big_int();
            let produced = synth.synthesize(&ty).unwrap();
            let literal = synth.lookup_literal(&*produced).unwrap();
            assert!(literal.ends_with(".parse::<BigInt>().unwrap()"));
            assert!(literal.starts_with('"'));
        }
    }

    mod composite_tests {
        use super::*;

        fn point_type() -> TypeDescriptor {
            TypeDescriptor::composite(
                "Point",
                vec![ConstructorDescriptor::new(
                    "Point::new",
                    vec![TypeDescriptor::i32(), TypeDescriptor::i32()],
                    |args| {
                        let mut coords = args.into_iter().map(|arg| {
                            arg.and_then(|v| v.downcast_ref::<i32>().copied())
                                .unwrap_or_default()
                        });
                        let x = coords.next().unwrap_or(0);
                        let y = coords.next().unwrap_or(0);
                        Ok(value((x, y)))
                    },
                )],
            )
        }

        #[test]
        fn test_composite_synthesis_resolves_constructor_args() {
            let mut synth = synthesizer();
            let produced = synth.synthesize(&point_type()).unwrap();
            let (x, y) = *produced.downcast_ref::<(i32, i32)>().unwrap();
            let literal = synth.lookup_literal(&*produced).unwrap();
            assert_eq!(literal, format!("Point::new({x}, {y})"));
        }

        #[test]
        fn test_no_public_constructor_yields_absent() {
            let mut synth = synthesizer();
            let ty = TypeDescriptor::composite("Hidden", Vec::new());
            assert!(synth.synthesize(&ty).is_none());
        }

        #[test]
        fn test_failing_constructor_degrades_to_absent() {
            let mut synth = synthesizer();
            let ty = TypeDescriptor::composite(
                "Broken",
                vec![ConstructorDescriptor::new("Broken::new", Vec::new(), |_| {
                    Err(CapturedFailure::new("ConstructError", "nope"))
                })],
            );
            assert!(synth.synthesize(&ty).is_none());
        }

        #[test]
        fn test_nested_composite_literal() {
            let inner = TypeDescriptor::composite(
                "Inner",
                vec![ConstructorDescriptor::new(
                    "Inner::new",
                    vec![TypeDescriptor::boolean()],
                    |_| Ok(value(())),
                )],
            );
            let outer = TypeDescriptor::composite(
                "Outer",
                vec![ConstructorDescriptor::new("Outer::new", vec![inner], |_| {
                    Ok(value(()))
                })],
            );
            let mut synth = synthesizer();
            let produced = synth.synthesize(&outer).unwrap();
            let literal = synth.lookup_literal(&*produced).unwrap();
            assert!(literal.starts_with("Outer::new(Inner::new("));
        }
    }

    mod memo_tests {
        use super::*;

        #[test]
        fn test_lookup_for_unknown_value() {
            let synth = synthesizer();
            let foreign = value(3i32);
            assert!(synth.lookup_literal(&*foreign).is_none());
        }

        #[test]
        fn test_clear_memo_drops_entries() {
            let mut synth = synthesizer();
            let produced = synth.synthesize(&TypeDescriptor::i32()).unwrap();
            assert!(synth.lookup_literal(&*produced).is_some());
            synth.clear_memo();
            assert!(synth.lookup_literal(&*produced).is_none());
        }

        #[test]
        fn test_string_literal_is_quoted() {
            let mut synth = synthesizer();
            let produced = synth.synthesize(&TypeDescriptor::string()).unwrap();
            let literal = synth.lookup_literal(&*produced).unwrap();
            assert!(literal.starts_with('"') && literal.ends_with('"'));
        }
    }

    mod record_text_tests {
        use super::*;

        #[test]
        fn test_row_and_field_bounds() {
            let mut synth = synthesizer();
            for _ in 0..50 {
                let blob = synth.synthesize_string();
                let rows: Vec<&str> = blob.split('\n').collect();
                assert!(rows.len() <= MAX_ROWS as usize);
                for row in rows {
                    assert!(row.split(';').count() <= MAX_FIELDS as usize);
                }
            }
        }

        #[test]
        fn test_custom_delimiter() {
            let mut synth = ValueSynthesizer::new(Seed::from_u64(7)).with_delimiter("|");
            let mut saw_delimiter = false;
            for _ in 0..20 {
                let blob = synth.synthesize_string();
                saw_delimiter |= blob.contains('|');
                assert!(!blob.contains(';'));
            }
            assert!(saw_delimiter);
        }

        #[test]
        fn test_deterministic_per_seed() {
            let mut a = ValueSynthesizer::new(Seed::from_u64(99));
            let mut b = ValueSynthesizer::new(Seed::from_u64(99));
            for _ in 0..10 {
                assert_eq!(a.synthesize_string(), b.synthesize_string());
            }
        }
    }
}
