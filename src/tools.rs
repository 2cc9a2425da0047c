//! The six tools this server advertises and dispatches.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::protocol::ToolResult;
use crate::trash::SafeRm;

// === Parameter Types ===

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RestoreParams {
    #[schemars(description = "Trash ID from list_trash")]
    pub trash_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TrashInfoParams {
    #[schemars(description = "Trash ID")]
    pub trash_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RequestDeleteParams {
    #[schemars(description = "Path to delete")]
    pub path: String,
}

// === Registry ===

/// One entry in the `tools/list` advertisement.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tool names on the wire, in advertisement order. Dispatch is an
/// exhaustive match, so adding a tool here forces a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    ListTrash,
    Restore,
    Status,
    CleanOld,
    TrashInfo,
    RequestDelete,
}

impl ToolName {
    pub const ALL: [ToolName; 6] = [
        ToolName::ListTrash,
        ToolName::Restore,
        ToolName::Status,
        ToolName::CleanOld,
        ToolName::TrashInfo,
        ToolName::RequestDelete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListTrash => "safe_rm_list_trash",
            Self::Restore => "safe_rm_restore",
            Self::Status => "safe_rm_status",
            Self::CleanOld => "safe_rm_clean_old",
            Self::TrashInfo => "safe_rm_trash_info",
            Self::RequestDelete => "safe_rm_request_delete",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    fn description(self) -> &'static str {
        match self {
            Self::ListTrash => "List all items in the safe-rm trash with their IDs and original paths",
            Self::Restore => "Restore a deleted item from trash to its original location",
            Self::Status => "Check safe-rm installation status",
            Self::CleanOld => "Remove items older than 7 days from trash",
            Self::TrashInfo => "Get detailed info about a trash item",
            Self::RequestDelete => "Request file deletion - returns instructions for user to delete manually",
        }
    }

    pub fn descriptor(self) -> ToolDescriptor {
        let input_schema = match self {
            Self::ListTrash | Self::Status | Self::CleanOld => no_params_schema(),
            Self::Restore => params_schema::<RestoreParams>(),
            Self::TrashInfo => params_schema::<TrashInfoParams>(),
            Self::RequestDelete => params_schema::<RequestDeleteParams>(),
        };
        ToolDescriptor {
            name: self.as_str(),
            description: self.description(),
            input_schema,
        }
    }

    /// Run the tool. Argument problems come back as error-flagged tool
    /// results, never as panics or transport faults.
    pub async fn call(self, safe_rm: &SafeRm, arguments: Value) -> ToolResult {
        match self {
            Self::ListTrash => safe_rm.list_trash().await,
            Self::Restore => match parse_args::<RestoreParams>(arguments) {
                Ok(params) => safe_rm.restore(&params.trash_id).await,
                Err(invalid) => invalid,
            },
            Self::Status => safe_rm.status().await,
            Self::CleanOld => safe_rm.clean_old().await,
            Self::TrashInfo => match parse_args::<TrashInfoParams>(arguments) {
                Ok(params) => safe_rm.trash_info(&params.trash_id).await,
                Err(invalid) => invalid,
            },
            Self::RequestDelete => match parse_args::<RequestDeleteParams>(arguments) {
                Ok(params) => safe_rm.request_delete(&params.path),
                Err(invalid) => invalid,
            },
        }
    }
}

pub fn list_descriptors() -> Vec<ToolDescriptor> {
    ToolName::ALL.into_iter().map(ToolName::descriptor).collect()
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolResult> {
    serde_json::from_value(arguments)
        .map_err(|e| ToolResult::error(format!("Error: Invalid arguments: {e}")))
}

fn params_schema<T: JsonSchema>() -> Value {
    let mut schema = schemars::schema_for!(T).to_value();
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    schema
}

fn no_params_schema() -> Value {
    json!({"type": "object", "properties": {}, "required": []})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::protocol::ToolContent;
    use std::time::Duration;

    fn offline_safe_rm(dir: &std::path::Path) -> SafeRm {
        SafeRm::new(Config {
            safe_rm_path: dir.join("no-such-safe-rm"),
            trash_dir: dir.to_path_buf(),
            exec_timeout: Duration::from_secs(5),
        })
    }

    #[test]
    fn advertises_exactly_six_tools() {
        let descriptors = list_descriptors();
        let names: Vec<&str> = descriptors.iter().map(|tool| tool.name).collect();
        assert_eq!(
            names,
            [
                "safe_rm_list_trash",
                "safe_rm_restore",
                "safe_rm_status",
                "safe_rm_clean_old",
                "safe_rm_trash_info",
                "safe_rm_request_delete",
            ]
        );
        for descriptor in &descriptors {
            assert!(!descriptor.description.is_empty());
            assert_eq!(descriptor.input_schema["type"], "object");
        }
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        assert_eq!(ToolName::from_name("safe_rm_restore"), Some(ToolName::Restore));
        assert_eq!(ToolName::from_name("SAFE_RM_RESTORE"), None);
        assert_eq!(ToolName::from_name("safe_rm_restore "), None);
        assert_eq!(ToolName::from_name("rm"), None);
    }

    #[test]
    fn restore_schema_requires_trash_id() {
        let schema = ToolName::Restore.descriptor().input_schema;
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["trash_id"]["type"], "string");
        assert_eq!(
            schema["properties"]["trash_id"]["description"],
            "Trash ID from list_trash"
        );
        assert_eq!(schema["required"], json!(["trash_id"]));
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("title").is_none());
    }

    #[test]
    fn zero_argument_tools_advertise_an_empty_object() {
        let schema = ToolName::Status.descriptor().input_schema;
        assert_eq!(
            schema,
            json!({"type": "object", "properties": {}, "required": []})
        );
    }

    #[test]
    fn descriptor_serializes_camel_case_schema_key() {
        let value = serde_json::to_value(ToolName::RequestDelete.descriptor()).unwrap();
        assert!(value.get("inputSchema").is_some());
        assert!(value.get("input_schema").is_none());
    }

    #[tokio::test]
    async fn missing_arguments_become_an_error_result() {
        let dir = tempfile::tempdir().unwrap();
        let safe_rm = offline_safe_rm(dir.path());

        let result = ToolName::Restore.call(&safe_rm, json!({})).await;
        assert!(result.is_error);
        let ToolContent::Text { text } = &result.content[0];
        assert!(text.starts_with("Error: Invalid arguments"), "got {text:?}");
    }
}
