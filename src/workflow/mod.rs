//! Workflow aggregate reconstructed from a persisted snapshot.
//!
//! A snapshot body is trusted only after it parses into [`WorkflowAggregate`]
//! and passes [`WorkflowAggregate::validate`]. Any failure is reported as
//! [`FailureKind::Corrupted`](crate::outcome::FailureKind::Corrupted): the data
//! is already persisted, so retrying cannot fix it.

use crate::outcome::{Failure, Outcome};
use crate::types::WorkflowId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status of a single workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Pending,
    Completed,
    Failed,
}

/// The assistant persona that executes a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assistant {
    pub name: String,
    pub role: String,
    pub system: String,
    pub prompt: String,
    pub phase_name: String,
}

/// One LLM invocation in the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub step_id: String,
    pub execution_order: u32,
    pub step_status: StepStatus,
    pub assistant: Assistant,
    #[serde(default)]
    pub llm_system: Option<String>,
    #[serde(default)]
    pub llm_prompt: Option<String>,
    #[serde(default)]
    pub llm_result: Option<String>,
}

/// The user's query plus tunables such as enhancement round counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructions {
    pub query: String,
    #[serde(flatten)]
    pub tunables: Map<String, Value>,
}

/// Current state of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowAggregate {
    pub workflow_id: WorkflowId,
    pub instructions: Instructions,
    pub steps: Vec<Step>,
}

impl WorkflowAggregate {
    /// Parses and validates a snapshot body.
    pub fn parse(body: &str) -> Outcome<Self> {
        if body.trim().is_empty() {
            return Err(Failure::corrupted("snapshot body is empty"));
        }
        let aggregate: Self = serde_json::from_str(body)
            .map_err(|e| Failure::corrupted(format!("snapshot body is not a workflow: {}", e)))?;
        aggregate.validate()?;
        Ok(aggregate)
    }

    /// Serializes the aggregate into a snapshot body.
    pub fn to_body(&self) -> Outcome<String> {
        serde_json::to_string(self)
            .map_err(|e| Failure::invalid_arguments(format!("workflow is not serializable: {}", e)))
    }

    /// Checks the structural invariants of the workflow:
    ///
    /// - identifiers and the query are non-blank
    /// - `execution_order` runs 1, 2, 3, ... without gaps
    /// - at most one step is pending, and it is the last non-failed step
    /// - nothing after a failed step has completed
    pub fn validate(&self) -> Outcome<()> {
        if self.workflow_id.as_str().trim().is_empty() {
            return Err(Failure::corrupted("workflowId is empty"));
        }
        if !WorkflowId::is_key_segment(self.workflow_id.as_str()) {
            return Err(Failure::corrupted(format!(
                "workflowId {} is not a single key segment",
                self.workflow_id
            )));
        }
        if self.instructions.query.trim().is_empty() {
            return Err(Failure::corrupted("instructions.query is empty"));
        }

        let mut pending_order = None;
        let mut failed_order = None;
        let mut last_live_order = None;

        for (index, step) in self.steps.iter().enumerate() {
            let expected = index as u32 + 1;
            if step.execution_order != expected {
                return Err(Failure::corrupted(format!(
                    "step {} has executionOrder {}, expected {}",
                    step.step_id, step.execution_order, expected
                )));
            }
            if step.step_id.trim().is_empty() {
                return Err(Failure::corrupted(format!(
                    "step at executionOrder {} has an empty stepId",
                    expected
                )));
            }

            match step.step_status {
                StepStatus::Pending => {
                    if pending_order.is_some() {
                        return Err(Failure::corrupted(format!(
                            "more than one pending step (second at executionOrder {})",
                            expected
                        )));
                    }
                    pending_order = Some(expected);
                    last_live_order = Some(expected);
                }
                StepStatus::Completed => {
                    if let Some(failed) = failed_order {
                        return Err(Failure::corrupted(format!(
                            "step {} completed after failed step at executionOrder {}",
                            step.step_id, failed
                        )));
                    }
                    last_live_order = Some(expected);
                }
                StepStatus::Failed => {
                    failed_order.get_or_insert(expected);
                }
            }
        }

        if let Some(pending) = pending_order {
            if last_live_order != Some(pending) {
                return Err(Failure::corrupted(format!(
                    "pending step at executionOrder {} is not the latest step",
                    pending
                )));
            }
        }
        Ok(())
    }

    pub fn pending_step(&self) -> Option<&Step> {
        self.steps
            .iter()
            .find(|s| s.step_status == StepStatus::Pending)
    }

    /// The most recent step, if any.
    pub fn current_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn has_failed(&self) -> bool {
        self.steps
            .iter()
            .any(|s| s.step_status == StepStatus::Failed)
    }

    /// True once steps exist and all of them completed.
    pub fn is_complete(&self) -> bool {
        !self.steps.is_empty()
            && self
                .steps
                .iter()
                .all(|s| s.step_status == StepStatus::Completed)
    }

    /// Execution order the next appended step must use.
    pub fn next_execution_order(&self) -> u32 {
        self.steps.len() as u32 + 1
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
