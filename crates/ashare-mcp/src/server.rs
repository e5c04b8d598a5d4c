//! MCP server lifecycle and state management
//!
//! This module contains the server state (shared market-data client and
//! result caches) and the protocol handler wiring: server info, resource
//! reads, and prompt rendering. Tool routing lives in [`crate::tools`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ashare_lib::QuoteClient;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::model::{
    AnnotateAble, GetPromptRequestParam, GetPromptResult, ListPromptsResult, ListResourcesResult,
    PaginatedRequestParam, Prompt, PromptArgument, PromptMessage, PromptMessageContent,
    PromptMessageRole, RawResource, ReadResourceRequestParam, ReadResourceResult,
    ResourceContents, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{tool_handler, ErrorData as McpError, ServerHandler};
use tokio::sync::Mutex;
use tracing::debug;

use crate::types::{HoldingsSummary, LargeFundFlowOutput};
use crate::{prompts, resources};

const DEFAULT_ANALYSIS_TTL_SECS: u64 = 300;
const DEFAULT_HOLDINGS_TTL_SECS: u64 = 86_400;

struct CacheEntry<T> {
    stored_at: Instant,
    value: T,
}

/// Main server state shared across all request handlers
pub struct FundFlowServer {
    pub(crate) client: Arc<QuoteClient>,
    pub(crate) tool_router: ToolRouter<Self>,

    /// Screen results keyed by the full parameter set, fresh for 5 minutes
    analysis_cache: Mutex<HashMap<String, CacheEntry<LargeFundFlowOutput>>>,

    /// Per-stock holding summaries, fresh for 24 hours (quarterly data)
    holdings_cache: Mutex<HashMap<String, CacheEntry<HoldingsSummary>>>,

    analysis_ttl: Duration,
    holdings_ttl: Duration,
}

impl FundFlowServer {
    /// Create server state with a client built from the environment
    pub fn new() -> ashare_lib::Result<Self> {
        Ok(Self::with_client(QuoteClient::new()?))
    }

    /// Create server state around an existing client
    pub fn with_client(client: QuoteClient) -> Self {
        Self {
            client: Arc::new(client),
            tool_router: Self::tool_router(),
            analysis_cache: Mutex::new(HashMap::new()),
            holdings_cache: Mutex::new(HashMap::new()),
            analysis_ttl: ttl_from_env("ASHARE_ANALYSIS_CACHE_TTL_SECS", DEFAULT_ANALYSIS_TTL_SECS),
            holdings_ttl: ttl_from_env("ASHARE_HOLDINGS_CACHE_TTL_SECS", DEFAULT_HOLDINGS_TTL_SECS),
        }
    }

    pub(crate) async fn cached_analysis(&self, key: &str) -> Option<LargeFundFlowOutput> {
        let cache = self.analysis_cache.lock().await;
        cache
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.analysis_ttl)
            .map(|entry| entry.value.clone())
    }

    pub(crate) async fn store_analysis(&self, key: String, value: LargeFundFlowOutput) {
        debug!(key = %key, "caching screen result");
        self.analysis_cache.lock().await.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    pub(crate) async fn cached_holdings(&self, code: &str) -> Option<HoldingsSummary> {
        let cache = self.holdings_cache.lock().await;
        cache
            .get(code)
            .filter(|entry| entry.stored_at.elapsed() < self.holdings_ttl)
            .map(|entry| entry.value.clone())
    }

    pub(crate) async fn store_holdings(&self, code: String, value: HoldingsSummary) {
        self.holdings_cache.lock().await.insert(
            code,
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }
}

fn ttl_from_env(var: &str, default_secs: u64) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(default_secs))
}

#[tool_handler]
impl ServerHandler for FundFlowServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "A-share capital-flow analysis server. Use analyze_large_fund_flow to \
                 screen the market for decisive main-fund moves, and \
                 analyze_stock_fund_flow_detail for one stock's multi-day flow history. \
                 The resources://funds/* resources document the indicators and \
                 screening methodology."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = resources::list_resources()
            .into_iter()
            .map(|descriptor| {
                let mut raw = RawResource::new(descriptor.uri, descriptor.title.to_string());
                raw.description = Some(descriptor.description.to_string());
                raw.mime_type = Some(descriptor.mime_type.to_string());
                raw.no_annotation()
            })
            .collect();

        Ok(ListResourcesResult {
            resources,
            ..Default::default()
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let content = resources::read_resource(&request.uri)?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(content, request.uri)],
        })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        let prompts = prompts::list_prompts()
            .into_iter()
            .map(|descriptor| {
                let arguments = descriptor
                    .arguments
                    .into_iter()
                    .map(|arg| PromptArgument {
                        name: arg.name.to_string(),
                        title: None,
                        description: Some(arg.description.to_string()),
                        required: Some(arg.required),
                    })
                    .collect();
                Prompt::new(descriptor.name, Some(descriptor.description), Some(arguments))
            })
            .collect();

        Ok(ListPromptsResult {
            prompts,
            ..Default::default()
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        let args = request
            .arguments
            .map(serde_json::Value::Object)
            .unwrap_or_else(|| serde_json::json!({}));
        let (description, text) = prompts::get_prompt(&request.name, &args)?;

        Ok(GetPromptResult {
            description: Some(description),
            messages: vec![PromptMessage {
                role: PromptMessageRole::User,
                content: PromptMessageContent::text(text),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ThresholdsEcho;

    fn test_server() -> FundFlowServer {
        FundFlowServer::new().expect("client construction should not fail")
    }

    fn sample_output() -> LargeFundFlowOutput {
        LargeFundFlowOutput {
            generated_at: chrono::Utc::now().to_rfc3339(),
            board: "all".to_string(),
            thresholds: ThresholdsEcho {
                main_fund_wan: 5000.0,
                turnover_share_pct: 6.0,
                price_change_pct: 3.0,
                main_fund_share_pct: 10.0,
            },
            sort_by: "main_fund".to_string(),
            total_candidates: 0,
            matched: 0,
            stocks: vec![],
            from_cache: false,
        }
    }

    #[tokio::test]
    async fn test_analysis_cache_roundtrip() {
        let server = test_server();
        assert!(server.cached_analysis("key").await.is_none());

        server.store_analysis("key".to_string(), sample_output()).await;
        let cached = server.cached_analysis("key").await.unwrap();
        assert_eq!(cached.board, "all");
    }

    #[tokio::test]
    async fn test_analysis_cache_distinguishes_keys() {
        let server = test_server();
        server.store_analysis("a".to_string(), sample_output()).await;
        assert!(server.cached_analysis("b").await.is_none());
    }

    #[test]
    fn test_server_info_advertises_capabilities() {
        let server = test_server();
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
        assert!(info.capabilities.prompts.is_some());
        assert!(info.instructions.unwrap().contains("analyze_large_fund_flow"));
    }
}
