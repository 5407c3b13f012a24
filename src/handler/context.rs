//! Per-invocation correlation handle.

use uuid::Uuid;

/// Opaque execution metadata supplied by the host for one invocation.
/// Carried through the request adapter so application code and log lines
/// can correlate work with the platform's own records.
#[derive(Debug, Clone)]
pub struct FunctionContext {
    invocation_id: String,
    function_name: String,
}

impl FunctionContext {
    /// Context with explicit ids, as delivered by a real host.
    pub fn new(invocation_id: impl Into<String>, function_name: impl Into<String>) -> FunctionContext {
        FunctionContext {
            invocation_id: invocation_id.into(),
            function_name: function_name.into(),
        }
    }

    /// Context with a fresh UUID invocation id, for tests and local runs.
    pub fn new_invocation(function_name: impl Into<String>) -> FunctionContext {
        FunctionContext {
            invocation_id: Uuid::new_v4().to_string(),
            function_name: function_name.into(),
        }
    }

    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_invocations_get_distinct_ids() {
        let a = FunctionContext::new_invocation("fn");
        let b = FunctionContext::new_invocation("fn");
        assert_ne!(a.invocation_id(), b.invocation_id());
        assert_eq!(a.function_name(), "fn");
    }
}
