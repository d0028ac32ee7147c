// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Gateway Context
//!
//! Every long-lived collaborator of a gateway process, built once at startup
//! and handed to the request handlers. [`GatewayContext::shutdown`] releases
//! the shared clients and pools exactly once.

use anyhow::Context as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use super::llm::{DemoChatConnector, OpenAiChatConnector};
use super::opa_client::OpaClient;
use super::tools::ToolRegistry;
use super::vector_store::{DemoSearchConnector, PgVectorConnector};
use crate::application::adapters::{AgentAdapter, ChatAdapter, SearchAdapter};
use crate::application::{AgentService, ChatService, Mediator, SearchService};
use crate::domain::backend::{ChatConnector, SearchConnector, ToolConnector};
use crate::domain::decision::PolicyDecisionPoint;
use crate::domain::gateway_config::{ChatBackendMode, GatewayConfig, SearchBackendMode};
use crate::domain::security_event::EventSource;

pub struct GatewayContext {
    config: Arc<GatewayConfig>,
    pdp: Arc<dyn PolicyDecisionPoint>,
    chat_connector: Option<Arc<ChatConnector>>,
    search_connector: Option<Arc<SearchConnector>>,
    tools: Arc<ToolConnector>,
    chat: ChatService,
    search: SearchService,
    agent: AgentService,
    shut_down: AtomicBool,
}

impl GatewayContext {
    /// Build the production wiring described by `config`.
    pub fn from_config(config: GatewayConfig) -> anyhow::Result<Self> {
        config.validate().context("Invalid gateway configuration")?;
        let spec = &config.spec;

        let opa = OpaClient::from_config(&spec.policy);
        info!(url = opa.base_url(), "Decision point configured");
        let pdp: Arc<dyn PolicyDecisionPoint> = Arc::new(opa);

        let upstream = &spec.upstream.chat;
        let chat_connector: Option<Arc<ChatConnector>> = match upstream.mode {
            ChatBackendMode::Openai => match upstream.resolve_api_key() {
                Some(api_key) => {
                    let connector = OpenAiChatConnector::new(
                        &upstream.base_url,
                        api_key,
                        upstream.connect_timeout,
                        upstream.request_timeout,
                    )
                    .context("Failed to build upstream chat client")?;
                    info!(endpoint = connector.endpoint(), "Chat upstream configured");
                    Some(Arc::new(connector))
                }
                None => {
                    warn!("No upstream chat credential configured; chat requests will be refused");
                    None
                }
            },
            ChatBackendMode::Demo => {
                warn!("Chat upstream running in demo mode");
                Some(Arc::new(DemoChatConnector))
            }
            ChatBackendMode::Disabled => None,
        };

        let search_connector: Option<Arc<SearchConnector>> = match spec.rag.backend {
            SearchBackendMode::Pgvector => match spec.rag.resolve_database_url() {
                Ok(url) => Some(Arc::new(PgVectorConnector::new(&spec.rag, url))),
                Err(e) => {
                    warn!(
                        error = %e,
                        "Vector store not configured; search requests will be refused"
                    );
                    None
                }
            },
            SearchBackendMode::Demo => {
                warn!("Vector store running in demo mode");
                Some(Arc::new(DemoSearchConnector))
            }
        };

        let registry = ToolRegistry::with_builtins(&spec.service.name, &spec.policy.url);
        info!(
            registered = ?registry.names(),
            allowed = ?spec.agent.allowed_tools,
            "Tool registry ready"
        );
        let tools: Arc<ToolConnector> = Arc::new(registry);

        Ok(Self::with_components(config, pdp, chat_connector, search_connector, tools))
    }

    /// Assemble a context from explicit collaborators.
    pub fn with_components(
        config: GatewayConfig,
        pdp: Arc<dyn PolicyDecisionPoint>,
        chat_connector: Option<Arc<ChatConnector>>,
        search_connector: Option<Arc<SearchConnector>>,
        tools: Arc<ToolConnector>,
    ) -> Self {
        let spec = &config.spec;
        let source = EventSource::new(spec.service.name.clone(), spec.service.environment.clone());
        let mediator = Arc::new(
            Mediator::new(pdp.clone()).with_request_deadline(spec.network.request_deadline),
        );

        let provider = chat_connector
            .as_ref()
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| "none".to_string());
        let chat = ChatService::new(
            ChatAdapter::new(source.clone(), provider, spec.events.include_message_content),
            mediator.clone(),
            spec.policy.paths.chat.clone(),
            chat_connector.clone(),
        );
        let search = SearchService::new(
            SearchAdapter::new(
                source.clone(),
                spec.rag.table.clone(),
                spec.rag.top_k_default,
                spec.rag.max_top_k,
                spec.events.include_query_text,
            ),
            mediator.clone(),
            spec.policy.paths.search.clone(),
            search_connector.clone(),
        );
        let agent = AgentService::new(
            AgentAdapter::new(source, spec.agent.allowed_tools.iter().cloned()),
            mediator,
            spec.policy.paths.agent.clone(),
            tools.clone(),
        );

        Self {
            config: Arc::new(config),
            pdp,
            chat_connector,
            search_connector,
            tools,
            chat,
            search,
            agent,
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn chat(&self) -> &ChatService {
        &self.chat
    }

    pub fn search(&self) -> &SearchService {
        &self.search
    }

    pub fn agent(&self) -> &AgentService {
        &self.agent
    }

    /// Release the decision client and every backend pool. Later calls are no-ops.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("Shutting down gateway context");
        self.pdp.close().await;
        if let Some(chat) = &self.chat_connector {
            chat.close().await;
        }
        if let Some(search) = &self.search_connector {
            search.close().await;
        }
        self.tools.close().await;
    }
}
