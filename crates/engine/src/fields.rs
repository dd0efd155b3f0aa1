use crate::error::{EngineError, Result};

/// Maps field specifiers (header names, or 1-based column offsets) to
/// column indices. Pure; holds only the header names.
#[derive(Debug, Default)]
pub struct FieldResolver {
    names: Vec<String>,
}

impl FieldResolver {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Resolve a specifier to a 1-based column index. A header name match
    /// takes precedence over a numeric offset; offsets are bound-checked
    /// against the header width only when a header exists.
    pub fn resolve(&self, spec: &str) -> Result<usize> {
        if let Some(pos) = self.names.iter().position(|n| n == spec) {
            return Ok(pos + 1);
        }
        let idx: usize = spec
            .parse()
            .map_err(|_| EngineError::FieldNotFound(spec.to_string()))?;
        if idx == 0 || (!self.names.is_empty() && idx > self.names.len()) {
            return Err(EngineError::FieldNotFound(spec.to_string()));
        }
        Ok(idx)
    }
}
