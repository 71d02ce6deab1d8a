//! Hierarchical operation results.
//!
//! Each public operation opens a subresult in the result handed to it by the
//! caller and records its own outcome there. The tree is kept for diagnostics;
//! the primary error channel is still the returned `Result`.

use crate::error::ProvisioningError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an operation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationResultStatus {
    /// No outcome recorded yet
    Unknown,
    InProgress,
    Success,
    Warning,
    PartialError,
    FatalError,
}

impl OperationResultStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::PartialError | Self::FatalError)
    }

    fn severity(&self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Success => 1,
            Self::InProgress => 2,
            Self::Warning => 3,
            Self::PartialError => 4,
            Self::FatalError => 5,
        }
    }
}

impl fmt::Display for OperationResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unknown => "unknown",
            Self::InProgress => "in_progress",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::PartialError => "partial_error",
            Self::FatalError => "fatal_error",
        };
        f.write_str(label)
    }
}

/// One node of the operation result tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub operation: String,
    pub status: OperationResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subresults: Vec<OperationResult>,
}

impl OperationResult {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: OperationResultStatus::Unknown,
            message: None,
            error_kind: None,
            subresults: Vec::new(),
        }
    }

    /// Open a child result and return it for recording.
    pub fn subresult(&mut self, operation: impl Into<String>) -> &mut OperationResult {
        let mut child = OperationResult::new(operation);
        child.status = OperationResultStatus::InProgress;
        self.subresults.push(child);
        let index = self.subresults.len() - 1;
        &mut self.subresults[index]
    }

    pub fn record_success(&mut self) {
        self.status = OperationResultStatus::Success;
    }

    pub fn record_warning(&mut self, message: impl Into<String>) {
        self.status = OperationResultStatus::Warning;
        self.message = Some(message.into());
    }

    pub fn record_fatal_error(&mut self, error: &ProvisioningError) {
        self.status = OperationResultStatus::FatalError;
        self.message = Some(error.to_string());
        self.error_kind = Some(error.kind_label().to_string());
    }

    /// Record success or the fatal error of an operation outcome.
    pub fn record_outcome<T>(&mut self, outcome: &Result<T, ProvisioningError>) {
        match outcome {
            Ok(_) => {
                // warnings recorded during the operation are kept
                if self.status != OperationResultStatus::Warning {
                    self.record_success();
                }
            }
            Err(error) => self.record_fatal_error(error),
        }
    }

    /// Status of this node combined with its subtree: the most severe status wins.
    pub fn compute_status(&self) -> OperationResultStatus {
        self.subresults
            .iter()
            .map(OperationResult::compute_status)
            .fold(self.status, |worst, status| {
                if status.severity() > worst.severity() {
                    status
                } else {
                    worst
                }
            })
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.compute_status(),
            OperationResultStatus::Success | OperationResultStatus::Warning
        )
    }

    pub fn is_error(&self) -> bool {
        self.compute_status().is_error()
    }

    /// Depth-first search for a result of the given operation.
    pub fn find(&self, operation: &str) -> Option<&OperationResult> {
        if self.operation == operation {
            return Some(self);
        }
        self.subresults.iter().find_map(|child| child.find(operation))
    }
}
