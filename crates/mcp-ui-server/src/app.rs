//! Registration of MCP Apps: tools that render into `ui://` resources.
//!
//! ```ignore
//! let router = AppRouter::builder("weather")
//!     .register_app_resource("forecast-view", "ui://weather/forecast", config, read)?
//!     .register_app_tool("get-forecast", tool_config, handler)?
//!     .build();
//! ```
use std::{collections::HashMap, future::Future, sync::Arc};

use futures::future::BoxFuture;
use mcp_ui_core::{
    model::{
        CallToolResult, JsonObject, Meta, RawResource, ReadResourceResult, ResourceContents, Tool,
        ToolAnnotations, empty_object_schema,
    },
    ui::{
        UiResource,
        apps::{
            EXTENSION_ID, RESOURCE_MIME_TYPE, RESOURCE_URI_META_KEY, UI_META_KEY, UiResourceMeta,
            UiToolMeta, Visibility, normalize_tool_meta, tool_ui_resource_uri, tool_visibility,
        },
        is_ui_uri,
    },
};
use serde_json::json;

use crate::{
    ResourceError, RouterError, ToolError,
    router::{CapabilitiesBuilder, Router},
    toolset::{Toolset, ToolsetBuilder, tool_handler},
};

pub type ResourceReadFn = Arc<
    dyn Fn(String) -> BoxFuture<'static, Result<ReadResourceResult, ResourceError>> + Send + Sync,
>;

/// Listing fields and `_meta.ui` for an app resource.
#[derive(Debug, Clone, Default)]
pub struct AppResourceConfig {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Defaults to `text/html;profile=mcp-app`
    pub mime_type: Option<String>,
    /// Attached to read results that carry no `_meta.ui` of their own
    pub ui: Option<UiResourceMeta>,
    pub meta: Meta,
}

impl AppResourceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn ui(mut self, ui: UiResourceMeta) -> Self {
        self.ui = Some(ui);
        self
    }
}

/// Definition of an app tool. `_meta.ui.resourceUri` is required.
#[derive(Debug, Clone, Default)]
pub struct AppToolConfig {
    pub title: Option<String>,
    pub description: Option<String>,
    pub input_schema: Option<Arc<JsonObject>>,
    pub output_schema: Option<Arc<JsonObject>>,
    pub annotations: Option<ToolAnnotations>,
    pub meta: Meta,
}

impl AppToolConfig {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn input_schema(mut self, schema: Arc<JsonObject>) -> Self {
        self.input_schema = Some(schema);
        self
    }

    pub fn output_schema(mut self, schema: Arc<JsonObject>) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn annotations(mut self, annotations: ToolAnnotations) -> Self {
        self.annotations = Some(annotations);
        self
    }

    /// Link the tool to its UI resource, overriding any `ui` keys in `meta`.
    pub fn ui(mut self, ui: UiToolMeta) -> Self {
        self.meta.remove(UI_META_KEY);
        self.meta.remove(RESOURCE_URI_META_KEY);
        self.meta.extend_missing(ui.to_meta());
        self
    }

    /// Merge extra `_meta` entries; keys already set are kept.
    pub fn meta(mut self, meta: Meta) -> Self {
        self.meta.extend_missing(meta);
        self
    }
}

#[derive(Clone)]
struct ResourceEntry {
    resource: RawResource,
    ui: Option<UiResourceMeta>,
    read: ResourceReadFn,
}

pub struct AppRouterBuilder {
    name: String,
    version: String,
    instructions: Option<String>,
    tools: ToolsetBuilder,
    resources: HashMap<String, ResourceEntry>,
    has_apps: bool,
}

impl AppRouterBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: None,
            tools: ToolsetBuilder::new(),
            resources: HashMap::new(),
            has_apps: false,
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    fn insert_resource(mut self, entry: ResourceEntry) -> Result<Self, RouterError> {
        let uri = entry.resource.uri.clone();
        if !is_ui_uri(&uri) {
            return Err(RouterError::Registration(format!(
                "UI resource URI must use the ui:// scheme: {uri}"
            )));
        }
        if self.resources.contains_key(&uri) {
            return Err(RouterError::Registration(format!(
                "resource already registered: {uri}"
            )));
        }
        tracing::debug!(uri = %uri, "registered resource");
        self.resources.insert(uri, entry);
        Ok(self)
    }

    /// Register the HTML resource an app tool renders into.
    pub fn register_app_resource<F, Fut>(
        mut self,
        name: impl Into<String>,
        uri: impl Into<String>,
        config: AppResourceConfig,
        read: F,
    ) -> Result<Self, RouterError>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ReadResourceResult, ResourceError>> + Send + 'static,
    {
        let AppResourceConfig {
            title,
            description,
            mime_type,
            ui,
            mut meta,
        } = config;

        if let Some(ui) = &ui {
            meta.extend_missing(ui.to_meta());
        }
        let mut resource = RawResource::new(uri, name)
            .with_mime_type(mime_type.unwrap_or_else(|| RESOURCE_MIME_TYPE.to_string()));
        resource.title = title;
        resource.description = description;
        resource.meta = (!meta.is_empty()).then_some(meta);

        let read: ResourceReadFn = Arc::new(move |uri: String| {
            Box::pin(read(uri)) as BoxFuture<'static, Result<ReadResourceResult, ResourceError>>
        });
        self.has_apps = true;
        self.insert_resource(ResourceEntry { resource, ui, read })
    }

    /// Serve a [`UiResource`] as a static resource.
    pub fn register_ui_resource(self, ui_resource: UiResource) -> Result<Self, RouterError> {
        let contents = ui_resource.resource;
        let mut resource = RawResource::new(
            contents.uri(),
            ui_resource
                .props
                .title
                .clone()
                .unwrap_or_else(|| contents.uri().to_string()),
        );
        resource.mime_type = contents.mime_type().map(str::to_string);
        resource.title = ui_resource.props.title;
        resource.description = ui_resource.props.description;

        let read: ResourceReadFn = Arc::new(move |_: String| {
            let contents = contents.clone();
            Box::pin(async move {
                Ok(ReadResourceResult {
                    contents: vec![contents],
                })
            }) as BoxFuture<'static, Result<ReadResourceResult, ResourceError>>
        });
        self.insert_resource(ResourceEntry {
            resource,
            ui: None,
            read,
        })
    }

    /// Register a tool that renders into a UI resource.
    pub fn register_app_tool<F, Fut>(
        mut self,
        name: impl Into<String>,
        config: AppToolConfig,
        handler: F,
    ) -> Result<Self, RouterError>
    where
        F: Fn(Option<JsonObject>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CallToolResult, ToolError>> + Send + 'static,
    {
        let name = name.into();
        let AppToolConfig {
            title,
            description,
            input_schema,
            output_schema,
            annotations,
            mut meta,
        } = config;

        normalize_tool_meta(&mut meta);
        let mut tool = Tool::new(
            name.clone(),
            description.unwrap_or_default(),
            input_schema.unwrap_or_else(empty_object_schema),
        )
        .with_meta(meta);
        tool.title = title;
        tool.output_schema = output_schema;
        tool.annotations = annotations;

        match tool_ui_resource_uri(&tool) {
            Some(uri) if is_ui_uri(&uri) => {}
            Some(uri) => {
                return Err(RouterError::Registration(format!(
                    "tool {name} links to a non-ui:// resource: {uri}"
                )));
            }
            None => {
                return Err(RouterError::Registration(format!(
                    "app tool {name} has no _meta.ui.resourceUri"
                )));
            }
        }

        self.has_apps = true;
        self.register_tool(tool, handler)
    }

    /// Register a plain tool, e.g. one returning [`UiResource`]s inline.
    pub fn register_tool<F, Fut>(mut self, tool: Tool, handler: F) -> Result<Self, RouterError>
    where
        F: Fn(Option<JsonObject>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CallToolResult, ToolError>> + Send + 'static,
    {
        if self.tools.contains(&tool.name) {
            return Err(RouterError::Registration(format!(
                "tool already registered: {}",
                tool.name
            )));
        }
        tracing::debug!(tool = %tool.name, "registered tool");
        self.tools = self.tools.add_tool(tool, tool_handler(handler));
        Ok(self)
    }

    pub fn build(self) -> AppRouter {
        let toolset = self.tools.build();
        for tool in toolset.list_tools() {
            if let Some(uri) = tool_ui_resource_uri(&tool) {
                if !self.resources.contains_key(&uri) {
                    tracing::warn!(tool = %tool.name, uri = %uri, "tool links to an unregistered resource");
                }
            }
        }

        AppRouter {
            inner: Arc::new(AppRouterInner {
                name: self.name,
                version: self.version,
                instructions: self.instructions,
                toolset,
                resources: self.resources,
                has_apps: self.has_apps,
            }),
        }
    }
}

struct AppRouterInner {
    name: String,
    version: String,
    instructions: Option<String>,
    toolset: Toolset,
    resources: HashMap<String, ResourceEntry>,
    has_apps: bool,
}

/// A [`Router`] serving registered app tools and UI resources.
#[derive(Clone)]
pub struct AppRouter {
    inner: Arc<AppRouterInner>,
}

impl AppRouter {
    pub fn builder(name: impl Into<String>) -> AppRouterBuilder {
        AppRouterBuilder::new(name.into())
    }
}

fn complete_contents(
    contents: ResourceContents,
    default_mime_type: Option<&str>,
    ui: Option<&UiResourceMeta>,
) -> ResourceContents {
    let contents = match default_mime_type {
        Some(mime_type) => contents.with_default_mime_type(mime_type),
        None => contents,
    };
    let Some(ui) = ui else {
        return contents;
    };
    if contents.meta().is_some_and(|meta| meta.contains_key(UI_META_KEY)) {
        return contents;
    }
    let mut meta = contents.meta().cloned().unwrap_or_default();
    meta.extend_missing(ui.to_meta());
    contents.with_meta(meta)
}

impl Router for AppRouter {
    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn version(&self) -> String {
        self.inner.version.clone()
    }

    fn instructions(&self) -> Option<String> {
        self.inner.instructions.clone()
    }

    fn capabilities(&self) -> mcp_ui_core::model::ServerCapabilities {
        let mut builder = CapabilitiesBuilder::new().with_tools(false);
        if !self.inner.resources.is_empty() {
            builder = builder.with_resources(false, false);
        }
        if self.inner.has_apps {
            builder = builder.with_extension(
                EXTENSION_ID,
                json!({ "mimeTypes": [RESOURCE_MIME_TYPE] }),
            );
        }
        builder.build()
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.inner
            .toolset
            .list_tools()
            .into_iter()
            .filter(|tool| tool_visibility(tool).contains(&Visibility::Model))
            .collect()
    }

    fn call_tool(
        &self,
        tool_name: &str,
        arguments: Option<JsonObject>,
    ) -> BoxFuture<'static, Result<CallToolResult, RouterError>> {
        let call = self.inner.toolset.call_tool(tool_name, arguments);
        Box::pin(async move { Ok(call?.await) })
    }

    fn list_resources(&self) -> Vec<RawResource> {
        let mut resources: Vec<RawResource> = self
            .inner
            .resources
            .values()
            .map(|entry| entry.resource.clone())
            .collect();
        resources.sort_by(|a, b| a.uri.cmp(&b.uri));
        resources
    }

    fn read_resource(
        &self,
        uri: &str,
    ) -> BoxFuture<'static, Result<ReadResourceResult, RouterError>> {
        let Some(entry) = self.inner.resources.get(uri).cloned() else {
            let uri = uri.to_string();
            return Box::pin(async move { Err(RouterError::ResourceNotFound(uri)) });
        };
        let uri = uri.to_string();

        Box::pin(async move {
            let result = (entry.read)(uri).await?;
            let default_mime_type = entry.resource.mime_type.as_deref();
            let contents = result
                .contents
                .into_iter()
                .map(|contents| complete_contents(contents, default_mime_type, entry.ui.as_ref()))
                .collect();
            Ok(ReadResourceResult { contents })
        })
    }
}
