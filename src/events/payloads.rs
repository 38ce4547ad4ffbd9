//! Inbound event shapes.

use super::validation::{require_rounds, require_text, require_true};
use super::EventPayload;
use crate::outcome::Outcome;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A job was accepted for processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCreated {
    pub job_id: String,
    // TODO: confirm with the job producer whether `created: false` should be
    // representable; it is rejected for now.
    pub created: bool,
}

impl EventPayload for JobCreated {
    const EVENT_NAME: &'static str = "JobCreated";

    fn validate(self) -> Outcome<Self> {
        Ok(Self {
            job_id: require_text("jobId", &self.job_id)?,
            created: require_true("created", self.created)?,
        })
    }

    fn identity(&self) -> Vec<Value> {
        vec![json!(self.job_id)]
    }
}

/// A workflow was requested for an uploaded query object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowCreated {
    pub workflow_id: String,
    pub object_key: String,
    pub prompt_enhance_rounds: i64,
    pub response_enhance_rounds: i64,
}

impl EventPayload for WorkflowCreated {
    const EVENT_NAME: &'static str = "WorkflowCreated";

    fn validate(self) -> Outcome<Self> {
        Ok(Self {
            workflow_id: require_text("workflowId", &self.workflow_id)?,
            object_key: require_text("objectKey", &self.object_key)?,
            prompt_enhance_rounds: require_rounds(
                "promptEnhanceRounds",
                self.prompt_enhance_rounds,
            )?,
            response_enhance_rounds: require_rounds(
                "responseEnhanceRounds",
                self.response_enhance_rounds,
            )?,
        })
    }

    fn identity(&self) -> Vec<Value> {
        vec![
            json!(self.workflow_id),
            json!(self.object_key),
            json!(self.prompt_enhance_rounds),
            json!(self.response_enhance_rounds),
        ]
    }
}
