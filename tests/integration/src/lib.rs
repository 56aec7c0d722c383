//! Shared fixtures for the cache integration tests.

use serde::{Deserialize, Serialize};

/// A finding as the report layer would consume it. The cache treats this
/// payload as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub code: String,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl Finding {
    pub fn new(code: &str, message: &str, line: u32, column: u32) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            line,
            column,
        }
    }
}

/// Stand-in for the real analysis pass: deterministic findings derived from
/// the source text, expensive enough in spirit to be worth caching.
pub fn analyze(source: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line_number = index as u32 + 1;
        if line.contains('\t') {
            findings.push(Finding::new(
                "W191",
                "indentation contains tabs",
                line_number,
                1,
            ));
        }
        if line.len() > 79 {
            findings.push(Finding::new("E501", "line too long", line_number, 80));
        }
    }
    findings
}
