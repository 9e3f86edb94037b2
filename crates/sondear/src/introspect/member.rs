//! Invocable members and the units that own them.

use super::descriptor::{TypeDescriptor, Visibility};
use super::value::{CapturedFailure, DynValue};
use crate::result::{SondearError, SondearResult};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

type InvokeFn =
    dyn Fn(Option<&mut dyn Any>, &[Option<DynValue>]) -> Result<Option<DynValue>, CapturedFailure>;

/// Why an invocation did not produce a result.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The member cannot be reached: wrong visibility without an
    /// override, or no invocation adapter registered.
    #[error("member `{member}` is not accessible: {reason}")]
    Access {
        /// Member that could not be reached
        member: String,
        /// Why access failed
        reason: String,
    },

    /// The invocation itself failed: this wraps the failure raised by the
    /// program under test, one level below the invocation mechanism.
    #[error("invocation raised {0}")]
    Target(CapturedFailure),
}

impl InvokeError {
    /// Unwrap one level: the failure of interest, if this error wraps one.
    #[must_use]
    pub fn into_target(self) -> Option<CapturedFailure> {
        match self {
            Self::Target(failure) => Some(failure),
            Self::Access { .. } => None,
        }
    }

    /// True for access failures, which abort only the current iteration.
    #[must_use]
    pub fn is_access(&self) -> bool {
        matches!(self, Self::Access { .. })
    }
}

/// One invocable member of a unit.
#[derive(Clone)]
pub struct MemberDescriptor {
    name: String,
    params: Vec<TypeDescriptor>,
    return_type: TypeDescriptor,
    visibility: Visibility,
    is_static: bool,
    synthetic: bool,
    adapter: Option<Arc<InvokeFn>>,
}

impl MemberDescriptor {
    /// Describe a public, non-static member with no adapter attached.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        params: Vec<TypeDescriptor>,
        return_type: TypeDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            visibility: Visibility::Public,
            is_static: false,
            synthetic: false,
            adapter: None,
        }
    }

    /// Override the declared visibility.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark the member static (invoked without a receiver).
    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Mark the member compiler-synthesized; synthetic members are
    /// excluded from enumeration.
    #[must_use]
    pub fn with_synthetic(mut self, synthetic: bool) -> Self {
        self.synthetic = synthetic;
        self
    }

    /// Attach the invocation adapter.
    #[must_use]
    pub fn with_adapter(
        mut self,
        adapter: impl Fn(Option<&mut dyn Any>, &[Option<DynValue>]) -> Result<Option<DynValue>, CapturedFailure>
            + 'static,
    ) -> Self {
        self.adapter = Some(Arc::new(adapter));
        self
    }

    /// Member name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter types, in order.
    #[must_use]
    pub fn params(&self) -> &[TypeDescriptor] {
        &self.params
    }

    /// Declared return type.
    #[must_use]
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }

    /// Declared visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// True for members invoked without a receiver.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// True for members requiring a visibility override.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    /// True for compiler-synthesized members.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Invoke the member, refusing private members.
    pub fn invoke(
        &self,
        receiver: Option<&mut dyn Any>,
        args: &[Option<DynValue>],
    ) -> Result<Option<DynValue>, InvokeError> {
        if self.is_private() {
            return Err(InvokeError::Access {
                member: self.name.clone(),
                reason: "declared private; use a visibility override".to_string(),
            });
        }
        self.dispatch(receiver, args)
    }

    /// Invoke the member regardless of its declared visibility.
    ///
    /// Failures from the program under test (raised errors and panics
    /// alike) surface as [`InvokeError::Target`]; unwrap one level with
    /// [`InvokeError::into_target`] to reach the failure of interest.
    pub fn invoke_forced(
        &self,
        receiver: Option<&mut dyn Any>,
        args: &[Option<DynValue>],
    ) -> Result<Option<DynValue>, InvokeError> {
        self.dispatch(receiver, args)
    }

    fn dispatch(
        &self,
        receiver: Option<&mut dyn Any>,
        args: &[Option<DynValue>],
    ) -> Result<Option<DynValue>, InvokeError> {
        let adapter = self.adapter.as_ref().ok_or_else(|| InvokeError::Access {
            member: self.name.clone(),
            reason: "no invocation adapter registered".to_string(),
        })?;

        match catch_unwind(AssertUnwindSafe(|| (**adapter)(receiver, args))) {
            Ok(Ok(produced)) => Ok(produced),
            Ok(Err(failure)) => Err(InvokeError::Target(failure)),
            Err(payload) => Err(InvokeError::Target(CapturedFailure::from_panic(&*payload))),
        }
    }
}

impl std::fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .field("synthetic", &self.synthetic)
            .finish_non_exhaustive()
    }
}

/// A fuzzable unit: a named type together with its invocable members.
#[derive(Debug, Clone)]
pub struct UnitDescriptor {
    namespace: String,
    name: String,
    receiver_type: TypeDescriptor,
    members: Vec<MemberDescriptor>,
}

impl UnitDescriptor {
    /// Describe a unit with no members yet.
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        receiver_type: TypeDescriptor,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            receiver_type,
            members: Vec::new(),
        }
    }

    /// Add a member.
    #[must_use]
    pub fn with_member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    /// The unit's namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The unit's simple name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `namespace::Name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.namespace, self.name)
    }

    /// The type used to construct receivers for non-static members.
    #[must_use]
    pub fn receiver_type(&self) -> &TypeDescriptor {
        &self.receiver_type
    }

    /// All members eligible for fuzzing: everything that is not
    /// compiler-synthesized.
    #[must_use]
    pub fn invocable_members(&self) -> Vec<&MemberDescriptor> {
        self.members
            .iter()
            .filter(|member| !member.is_synthetic())
            .collect()
    }

    /// Re-look a member up by name and parameter type names, the lookup
    /// generated tests perform.
    pub fn member(
        &self,
        name: &str,
        param_type_names: &[&str],
    ) -> SondearResult<&MemberDescriptor> {
        self.members
            .iter()
            .find(|member| {
                member.name() == name
                    && member.params().len() == param_type_names.len()
                    && member
                        .params()
                        .iter()
                        .zip(param_type_names)
                        .all(|(param, wanted)| param.name() == *wanted)
            })
            .ok_or_else(|| SondearError::UnknownMember {
                unit: self.qualified_name(),
                member: name.to_string(),
            })
    }
}
