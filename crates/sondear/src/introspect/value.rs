//! Dynamically typed values and captured invocation failures.

use std::any::Any;

/// A dynamically typed value flowing between the synthesizer, the engine,
/// and member adapters.
pub type DynValue = Box<dyn Any>;

/// Box a concrete value as a [`DynValue`].
#[must_use]
pub fn value<T: Any>(inner: T) -> DynValue {
    Box::new(inner)
}

/// Box a concrete value as a present argument. Generated tests use this
/// together with a bare `None` for absent arguments.
#[must_use]
pub fn arg<T: Any>(inner: T) -> Option<DynValue> {
    Some(Box::new(inner))
}

/// Identity of a synthesized value: the address of its heap allocation.
///
/// Stable for as long as the owning box is alive, which is exactly the
/// window the synthesizer memo needs (one fuzzing iteration).
#[must_use]
pub fn value_identity(value: &dyn Any) -> usize {
    (value as *const dyn Any).cast::<()>() as usize
}

/// The last path segment of a (possibly qualified) type name.
pub(crate) fn simple_name(qualified: &str) -> &str {
    qualified.rsplit("::").next().unwrap_or(qualified)
}

/// A scalar value captured from synthesis or from an invocation outcome.
///
/// `Null` only occurs as a synthesized "no constraint" leaf; `Opaque`
/// only occurs for captured results whose structure has no literal
/// rendering (it carries the declared type name instead).
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Signed 16-bit integer
    I16(i16),
    /// Signed 32-bit integer
    I32(i32),
    /// Signed 64-bit integer
    I64(i64),
    /// Byte
    U8(u8),
    /// Single-precision float
    F32(f32),
    /// Double-precision float
    F64(f64),
    /// Boolean
    Bool(bool),
    /// Character
    Char(char),
    /// Owned string
    Str(String),
    /// The absent value
    Null,
    /// A structured value identified only by its type name
    Opaque(String),
}

impl ScalarValue {
    /// Render this value as literal source text.
    ///
    /// Strings are quote-delimited with backslash/quote escaping, 64-bit
    /// integers and floats carry their type suffix, characters are
    /// single-quoted, and bytes render as binary literals.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::I16(v) => v.to_string(),
            Self::I32(v) => v.to_string(),
            Self::I64(v) => format!("{v}i64"),
            Self::U8(v) => format!("0b{v:b}"),
            Self::F32(v) => format!("{v}f32"),
            Self::F64(v) => format!("{v}f64"),
            Self::Bool(v) => v.to_string(),
            Self::Char(v) => format!("'{v}'"),
            Self::Str(v) => {
                let escaped = v.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{escaped}\"")
            }
            Self::Null => "None".to_string(),
            Self::Opaque(name) => name.clone(),
        }
    }

    /// Box this scalar as a dynamic value; `None` for `Null` and for
    /// `Opaque`, which carries no value to box.
    #[must_use]
    pub fn boxed(&self) -> Option<DynValue> {
        match self {
            Self::I16(v) => Some(Box::new(*v)),
            Self::I32(v) => Some(Box::new(*v)),
            Self::I64(v) => Some(Box::new(*v)),
            Self::U8(v) => Some(Box::new(*v)),
            Self::F32(v) => Some(Box::new(*v)),
            Self::F64(v) => Some(Box::new(*v)),
            Self::Bool(v) => Some(Box::new(*v)),
            Self::Char(v) => Some(Box::new(*v)),
            Self::Str(v) => Some(Box::new(v.clone())),
            Self::Null | Self::Opaque(_) => None,
        }
    }

    /// Probe a dynamic value for one of the scalar types.
    #[must_use]
    pub fn from_any(value: &dyn Any) -> Option<Self> {
        if let Some(v) = value.downcast_ref::<i16>() {
            Some(Self::I16(*v))
        } else if let Some(v) = value.downcast_ref::<i32>() {
            Some(Self::I32(*v))
        } else if let Some(v) = value.downcast_ref::<i64>() {
            Some(Self::I64(*v))
        } else if let Some(v) = value.downcast_ref::<u8>() {
            Some(Self::U8(*v))
        } else if let Some(v) = value.downcast_ref::<f32>() {
            Some(Self::F32(*v))
        } else if let Some(v) = value.downcast_ref::<f64>() {
            Some(Self::F64(*v))
        } else if let Some(v) = value.downcast_ref::<bool>() {
            Some(Self::Bool(*v))
        } else if let Some(v) = value.downcast_ref::<char>() {
            Some(Self::Char(*v))
        } else {
            value.downcast_ref::<String>().map(|v| Self::Str(v.clone()))
        }
    }
}

impl std::hash::Hash for ScalarValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Self::I16(v) => v.hash(state),
            Self::I32(v) => v.hash(state),
            Self::I64(v) => v.hash(state),
            Self::U8(v) => v.hash(state),
            Self::F32(v) => v.to_bits().hash(state),
            Self::F64(v) => v.to_bits().hash(state),
            Self::Bool(v) => v.hash(state),
            Self::Char(v) => v.hash(state),
            Self::Str(v) => v.hash(state),
            Self::Null => {}
            Self::Opaque(name) => name.hash(state),
        }
    }
}

/// A failure captured from the program under test.
///
/// Equality is structural (same kind, same message), so two distinct
/// failures that look alike compare equal, which is what result
/// deduplication needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CapturedFailure {
    kind: String,
    message: String,
}

impl CapturedFailure {
    /// Create a failure from its descriptor and message.
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Capture a concrete error value, using its simple type name as the
    /// descriptor.
    #[must_use]
    pub fn from_error<E: std::error::Error>(error: &E) -> Self {
        Self {
            kind: simple_name(std::any::type_name::<E>()).to_string(),
            message: error.to_string(),
        }
    }

    /// Capture an unwound panic payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_string()))
            .unwrap_or_else(|| "panic with non-string payload".to_string());
        Self {
            kind: "panic".to_string(),
            message,
        }
    }

    /// The failure's type descriptor (simple type name, or `"panic"`).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The failure's message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for CapturedFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
