// src/models.rs
use serde::{Deserialize, Serialize};

/// Message shown when the template field is blank.
pub const EMPTY_TEMPLATE_MESSAGE: &str = "Template was empty; nothing to do.";

/// Message shown when the service failed without a structured error body.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "The service was unavailable or had returned an invalid response.";

/// The JSON body POSTed to the execute endpoint. Built fresh for every submission.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub template: String,
    pub data_model: String,
    pub output_format: String,
    pub locale: String,
    pub time_zone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_syntax: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolation_syntax: Option<String>,
}

/// Request fields a problem can point at.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Template,
    DataModel,
    OutputFormat,
    Locale,
    TimeZone,
    TagSyntax,
    InterpolationSyntax,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    #[serde(default, deserialize_with = "lenient_field")]
    pub field: Option<Field>,
    pub message: String,
}

/// Body of a 2xx answer from the execute endpoint.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    #[serde(default)]
    pub result: Option<String>,

    #[serde(default)]
    pub problems: Option<Vec<Problem>>,

    #[serde(default)]
    pub truncated_result: bool,
}

/// Structured body some non-2xx answers carry.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_code: String,
    pub error_description: String,
}

/// What the user gets to see once a submission completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Success { text: String },
    Failure { message: String },
}

impl ExecutionResult {
    pub fn is_error(&self) -> bool {
        matches!(self, ExecutionResult::Failure { .. })
    }

    pub fn text(&self) -> &str {
        match self {
            ExecutionResult::Success { text } => text,
            ExecutionResult::Failure { message } => message,
        }
    }
}

impl ExecuteResponse {
    /// Problems win over the result when the list is non-empty.
    /// A body with neither is treated as an empty success.
    pub fn into_result(self) -> ExecutionResult {
        match self.problems.and_then(|p| p.into_iter().next()) {
            Some(problem) => ExecutionResult::Failure {
                message: problem.message,
            },
            None => ExecutionResult::Success {
                text: self.result.unwrap_or_default(),
            },
        }
    }
}

impl ErrorBody {
    /// Parses a failure body, returning `None` unless both fields are present.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    pub fn message(&self) -> String {
        format!("{}: {}", self.error_code, self.error_description)
    }
}

fn lenient_field<'de, D>(deserializer: D) -> std::result::Result<Option<Field>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}
