//! Expression trees reproducing how a synthesized value was built.

use crate::introspect::{CapturedFailure, ConstructorDescriptor, DynValue, ScalarValue};

/// A value-producing expression.
///
/// `resolve` produces the concrete value bottom-up; `render` produces the
/// literal source text bottom-up. The two are deliberately separate: the
/// expression is not the value, it is the recipe.
#[derive(Debug)]
pub enum Expression {
    /// A simple value with a literal source rendering.
    Leaf(ScalarValue),
    /// A constructor call over sub-expressions.
    Composite {
        /// The constructor being called.
        constructor: ConstructorDescriptor,
        /// One argument expression per declared parameter, in order.
        args: Vec<Expression>,
    },
}

impl Expression {
    /// Evaluate the expression bottom-up into a concrete value.
    ///
    /// A `Null` leaf resolves to an absent value; a constructor failure
    /// anywhere in the tree propagates as a synthesis failure.
    pub fn resolve(&self) -> Result<Option<DynValue>, CapturedFailure> {
        match self {
            Self::Leaf(scalar) => Ok(scalar.boxed()),
            Self::Composite { constructor, args } => {
                let mut resolved = Vec::with_capacity(args.len());
                for arg in args {
                    resolved.push(arg.resolve()?);
                }
                constructor.construct(resolved).map(Some)
            }
        }
    }

    /// Render the expression bottom-up as literal source text.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Leaf(scalar) => scalar.render(),
            Self::Composite { constructor, args } => {
                let rendered: Vec<String> = args.iter().map(Expression::render).collect();
                constructor.render_call(&rendered)
            }
        }
    }
}
