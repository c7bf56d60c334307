//! MCP server implementation with tool routing.

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, InitializeResult,
    ListToolsResult, PaginatedRequestParams, ServerCapabilities, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, ServerHandler};
use serde_json::Value;
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use crate::storage::PresentationStore;
use crate::tools;

/// PowerPoint MCP Server.
///
/// Exposes create/append/list/describe operations over presentation files
/// stored in a single root directory.
pub struct PowerPointServer {
    /// Storage root all operations resolve filenames against.
    store: PresentationStore,
}

impl PowerPointServer {
    /// Create a server storing presentations under the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            store: PresentationStore::new(root),
        }
    }

    /// The underlying presentation store.
    pub fn store(&self) -> &PresentationStore {
        &self.store
    }

    fn make_tool(name: &str, description: &str, schema: Value) -> Tool {
        Tool {
            name: Cow::Owned(name.to_string()),
            title: None,
            description: Some(Cow::Owned(description.to_string())),
            input_schema: Arc::new(serde_json::from_value(schema).unwrap_or_default()),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        }
    }
}

impl Default for PowerPointServer {
    fn default() -> Self {
        Self::new(crate::storage::DEFAULT_ROOT)
    }
}

impl ServerHandler for PowerPointServer {
    fn get_info(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: Default::default(),
            server_info: Implementation {
                name: "powerpoint-mcp-server".to_string(),
                title: Some("PowerPoint MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Create and manage PowerPoint presentations stored on the local disk. \
                 \
                 WORKFLOW: create_presentation makes a new .pptx file (optionally with a \
                 title slide), add_slide appends a title+content slide to an existing \
                 file, list_presentations shows every stored file, and \
                 get_presentation_info reports file details and per-slide titles. \
                 \
                 Filenames are sanitized for the filesystem and the .pptx extension is \
                 added automatically, so 'Quarterly Report' and 'Quarterly Report.pptx' \
                 refer to the same file."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_
    {
        async move {
            let tools = vec![
                Self::make_tool(
                    "create_presentation",
                    "Create a new PowerPoint presentation file. If a title is given, the presentation starts with a title slide showing the title and a creation-date subtitle. Overwrites any existing presentation of the same name.",
                    serde_json::json!({
                        "type": "object",
                        "properties": {
                            "filename": { "type": "string", "description": "Presentation name; illegal filesystem characters are replaced and the .pptx extension is added automatically" },
                            "title": { "type": "string", "description": "Optional title for the first slide" }
                        },
                        "required": ["filename"]
                    }),
                ),
                Self::make_tool(
                    "add_slide",
                    "Add a new slide to an existing PowerPoint presentation. The slide uses the title+content layout; body text is formatted at 14pt, left-aligned, one paragraph per line.",
                    serde_json::json!({
                        "type": "object",
                        "properties": {
                            "filename": { "type": "string", "description": "Presentation to append to" },
                            "slide_title": { "type": "string", "description": "Title text for the new slide" },
                            "slide_content": { "type": "string", "description": "Body text for the new slide" }
                        },
                        "required": ["filename"]
                    }),
                ),
                Self::make_tool(
                    "list_presentations",
                    "List all PowerPoint presentations in the storage directory with their sizes and modification times.",
                    serde_json::json!({
                        "type": "object",
                        "properties": {}
                    }),
                ),
                Self::make_tool(
                    "get_presentation_info",
                    "Get detailed information about a specific PowerPoint presentation: file size, modification time, location, slide count, and per-slide titles.",
                    serde_json::json!({
                        "type": "object",
                        "properties": {
                            "filename": { "type": "string", "description": "Presentation to describe" }
                        },
                        "required": ["filename"]
                    }),
                ),
            ];

            Ok(ListToolsResult {
                tools,
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let name = request.name.clone();
        let args = request.arguments.clone().unwrap_or_default();

        async move {
            let result = match name.as_ref() {
                "create_presentation" => {
                    let params: tools::CreatePresentationParams =
                        serde_json::from_value(Value::Object(args))
                            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                    tools::create_presentation(&self.store, params).map(|r| r.to_string())
                }
                "add_slide" => {
                    let params: tools::AddSlideParams =
                        serde_json::from_value(Value::Object(args))
                            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                    tools::add_slide(&self.store, params).map(|r| r.to_string())
                }
                "list_presentations" => {
                    let params: tools::ListPresentationsParams =
                        serde_json::from_value(Value::Object(args))
                            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                    tools::list_presentations(&self.store, params).map(|r| r.to_string())
                }
                "get_presentation_info" => {
                    let params: tools::GetPresentationInfoParams =
                        serde_json::from_value(Value::Object(args))
                            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                    tools::get_presentation_info(&self.store, params).map(|r| r.to_string())
                }
                _ => return Err(McpError::invalid_params(format!("Unknown tool: {}", name), None)),
            };

            match result {
                Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
                Err(e) => {
                    tracing::error!("Tool '{}' failed: {}", name, e);
                    Ok(CallToolResult::error(vec![Content::text(format!(
                        "❌ Error: {}",
                        e
                    ))]))
                }
            }
        }
    }
}
