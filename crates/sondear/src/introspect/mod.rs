//! Dynamic-invocation capability layer.
//!
//! The engine never talks to a host reflection API. Instead, every fuzz
//! target is described once through this module's descriptors: what types
//! look like ([`TypeDescriptor`]), how values of them are constructed
//! ([`ConstructorDescriptor`]), which members a unit exposes
//! ([`MemberDescriptor`], [`UnitDescriptor`]), and how units are resolved
//! by name ([`TargetRegistry`]). Porting to a different invocation
//! mechanism means re-implementing the adapters behind these descriptors
//! and nothing else.

mod descriptor;
mod member;
mod registry;
mod value;

pub use descriptor::{ConstructorDescriptor, RenderStyle, TypeDescriptor, TypeKind, Visibility};
pub use member::{InvokeError, MemberDescriptor, UnitDescriptor};
pub use registry::TargetRegistry;
pub use value::{arg, value, value_identity, CapturedFailure, DynValue, ScalarValue};

pub(crate) use value::simple_name;
