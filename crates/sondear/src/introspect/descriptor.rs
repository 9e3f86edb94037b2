//! Type and constructor descriptors.

use super::value::{CapturedFailure, DynValue};
use std::sync::Arc;

/// Declared visibility of a constructor or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Reachable without an override.
    Public,
    /// Requires a visibility override to invoke.
    Private,
}

/// How a constructor call renders as source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    /// `Path(arg0, arg1)`, the ordinary constructor-call form.
    Call,
    /// `arg0.parse::<Path>().unwrap()`, the string-parsing form used by
    /// the arbitrary-precision integer type.
    Parse,
}

type ConstructFn = dyn Fn(Vec<Option<DynValue>>) -> Result<DynValue, CapturedFailure>;

/// Describes one way of constructing a value of some type.
#[derive(Clone)]
pub struct ConstructorDescriptor {
    path: String,
    style: RenderStyle,
    params: Vec<TypeDescriptor>,
    visibility: Visibility,
    construct: Arc<ConstructFn>,
}

impl ConstructorDescriptor {
    /// Describe a public constructor reachable at `path` (the text a
    /// generated test uses to call it, e.g. `MenuParser::new`).
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        params: Vec<TypeDescriptor>,
        construct: impl Fn(Vec<Option<DynValue>>) -> Result<DynValue, CapturedFailure> + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            style: RenderStyle::Call,
            params,
            visibility: Visibility::Public,
            construct: Arc::new(construct),
        }
    }

    /// Override the declared visibility.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Override the rendering style.
    #[must_use]
    pub fn with_render_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    /// Declared parameter types, in order.
    #[must_use]
    pub fn params(&self) -> &[TypeDescriptor] {
        &self.params
    }

    /// Declared visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// The rendered call path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Run the construction adapter with resolved arguments.
    pub fn construct(
        &self,
        args: Vec<Option<DynValue>>,
    ) -> Result<DynValue, CapturedFailure> {
        (*self.construct)(args)
    }

    /// Render a call to this constructor over already-rendered argument
    /// literals.
    #[must_use]
    pub fn render_call(&self, args: &[String]) -> String {
        match self.style {
            RenderStyle::Call => format!("{}({})", self.path, args.join(", ")),
            RenderStyle::Parse => {
                let literal = args.first().map_or("\"0\"", String::as_str);
                format!("{literal}.parse::<{}>().unwrap()", self.path)
            }
        }
    }
}

impl std::fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("path", &self.path)
            .field("params", &self.params.len())
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

/// The shape of a described type, driving synthesis dispatch and
/// assertion selection.
#[derive(Debug)]
pub enum TypeKind {
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// Signed 64-bit integer
    I64,
    /// Byte
    U8,
    /// Single-precision float
    F32,
    /// Double-precision float
    F64,
    /// Character
    Char,
    /// Boolean
    Bool,
    /// Owned string
    Str,
    /// Arbitrary-precision integer, synthesized from a numeric string
    BigInt,
    /// The designated "no constraint" catch-all; synthesizes to absent
    Unconstrained,
    /// No value; the return type of members that produce nothing
    Void,
    /// A structured type constructed through one of its constructors
    Composite(Vec<ConstructorDescriptor>),
}

struct TypeInfo {
    name: String,
    kind: TypeKind,
}

/// Named, shareable type metadata.
///
/// Descriptors compare by name: two descriptors with the same name are
/// the same type as far as synthesis and test generation are concerned.
#[derive(Clone)]
pub struct TypeDescriptor {
    inner: Arc<TypeInfo>,
}

impl TypeDescriptor {
    /// Describe a type by name and kind.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            inner: Arc::new(TypeInfo {
                name: name.into(),
                kind,
            }),
        }
    }

    /// Signed 16-bit integer.
    #[must_use]
    pub fn i16() -> Self {
        Self::new("i16", TypeKind::I16)
    }

    /// Signed 32-bit integer.
    #[must_use]
    pub fn i32() -> Self {
        Self::new("i32", TypeKind::I32)
    }

    /// Signed 64-bit integer.
    #[must_use]
    pub fn i64() -> Self {
        Self::new("i64", TypeKind::I64)
    }

    /// Byte.
    #[must_use]
    pub fn u8() -> Self {
        Self::new("u8", TypeKind::U8)
    }

    /// Single-precision float.
    #[must_use]
    pub fn f32() -> Self {
        Self::new("f32", TypeKind::F32)
    }

    /// Double-precision float.
    #[must_use]
    pub fn f64() -> Self {
        Self::new("f64", TypeKind::F64)
    }

    /// Character.
    #[must_use]
    pub fn character() -> Self {
        Self::new("char", TypeKind::Char)
    }

    /// Boolean.
    #[must_use]
    pub fn boolean() -> Self {
        Self::new("bool", TypeKind::Bool)
    }

    /// Owned string.
    #[must_use]
    pub fn string() -> Self {
        Self::new("String", TypeKind::Str)
    }

    /// Arbitrary-precision integer.
    #[must_use]
    pub fn big_int() -> Self {
        Self::new("BigInt", TypeKind::BigInt)
    }

    /// The "no constraint" catch-all type; always synthesizes to absent.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self::new("Any", TypeKind::Unconstrained)
    }

    /// The no-value return type.
    #[must_use]
    pub fn void() -> Self {
        Self::new("()", TypeKind::Void)
    }

    /// A structured type with the given constructors, in declaration
    /// order.
    #[must_use]
    pub fn composite(name: impl Into<String>, constructors: Vec<ConstructorDescriptor>) -> Self {
        Self::new(name, TypeKind::Composite(constructors))
    }

    /// The type's name as used in rendered source text.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The type's kind.
    #[must_use]
    pub fn kind(&self) -> &TypeKind {
        &self.inner.kind
    }

    /// True for the boolean type.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        matches!(self.inner.kind, TypeKind::Bool)
    }

    /// True for types whose values have a literal source rendering
    /// (numeric primitives, characters, booleans, strings).
    #[must_use]
    pub fn is_literal_renderable(&self) -> bool {
        matches!(
            self.inner.kind,
            TypeKind::I16
                | TypeKind::I32
                | TypeKind::I64
                | TypeKind::U8
                | TypeKind::F32
                | TypeKind::F64
                | TypeKind::Char
                | TypeKind::Bool
                | TypeKind::Str
        )
    }

    /// The first public constructor of a composite type, if any.
    #[must_use]
    pub fn first_public_constructor(&self) -> Option<&ConstructorDescriptor> {
        match &self.inner.kind {
            TypeKind::Composite(constructors) => constructors
                .iter()
                .find(|ctor| ctor.visibility() == Visibility::Public),
            _ => None,
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.inner.name == other.inner.name
    }
}

impl Eq for TypeDescriptor {}

impl std::hash::Hash for TypeDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeDescriptor({})", self.inner.name)
    }
}
