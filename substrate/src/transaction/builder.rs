//! Call construction via the builder pattern.
//!
//! [`CallBuilder`] collects SCALE-encoded positional arguments and resolves
//! the call's index against runtime metadata in `.build()`. Business rules
//! ("twin ID must be nonzero") are the caller's job; the builder only
//! checks that the call exists and that the argument count matches.

use parity_scale_codec::Encode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::Metadata;

// ---------------------------------------------------------------------------
// BuildError
// ---------------------------------------------------------------------------

/// Errors that can occur while building a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Metadata has no dispatchable by that name.
    #[error("unknown call {module}.{function}")]
    UnknownCall { module: String, function: String },

    /// Positional argument count does not match the call's signature.
    #[error("{call} takes {expected} arguments, got {got}")]
    ArgumentCount {
        call: String,
        expected: usize,
        got: usize,
    },
}

// ---------------------------------------------------------------------------
// Call
// ---------------------------------------------------------------------------

/// A resolved, unsigned call.
///
/// Wire form: `[module_index][call_index][arg1][arg2]...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    module: String,
    function: String,
    module_index: u8,
    call_index: u8,
    args: Vec<u8>,
}

impl Call {
    /// `Module.function`, used in logs and errors.
    pub fn name(&self) -> String {
        format!("{}.{}", self.module, self.function)
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    /// `(module_index, call_index)` as resolved from metadata.
    pub fn index(&self) -> (u8, u8) {
        (self.module_index, self.call_index)
    }

    /// Concatenated encoded arguments.
    pub fn args(&self) -> &[u8] {
        &self.args
    }

    /// Full call payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.args.len());
        out.push(self.module_index);
        out.push(self.call_index);
        out.extend_from_slice(&self.args);
        out
    }
}

// ---------------------------------------------------------------------------
// CallBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Call`].
///
/// ```rust,no_run
/// # use grid_substrate::transaction::CallBuilder;
/// # use grid_substrate::config;
/// # fn demo(metadata: &dyn grid_substrate::chain::Metadata) {
/// let call = CallBuilder::new(config::SMART_CONTRACT_MODULE, config::CANCEL_CONTRACT)
///     .arg(&42u64)
///     .build(metadata);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CallBuilder {
    module: &'static str,
    function: &'static str,
    args: Vec<u8>,
    count: usize,
}

impl CallBuilder {
    pub fn new(module: &'static str, function: &'static str) -> Self {
        Self {
            module,
            function,
            args: Vec::new(),
            count: 0,
        }
    }

    /// Appends the next positional argument.
    pub fn arg<T: Encode + ?Sized>(mut self, value: &T) -> Self {
        value.encode_to(&mut self.args);
        self.count += 1;
        self
    }

    /// `Module.function` of the call being built.
    pub fn name(&self) -> String {
        format!("{}.{}", self.module, self.function)
    }

    /// Resolves the call against `metadata`.
    pub fn build(self, metadata: &dyn Metadata) -> Result<Call, BuildError> {
        let signature =
            metadata
                .call(self.module, self.function)
                .ok_or_else(|| BuildError::UnknownCall {
                    module: self.module.to_string(),
                    function: self.function.to_string(),
                })?;

        if signature.arity != self.count {
            return Err(BuildError::ArgumentCount {
                call: self.name(),
                expected: signature.arity,
                got: self.count,
            });
        }

        Ok(Call {
            module: self.module.to_string(),
            function: self.function.to_string(),
            module_index: signature.module_index,
            call_index: signature.call_index,
            args: self.args,
        })
    }
}
