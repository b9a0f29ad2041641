//! Crystal Battle MCP Server
//!
//! A Model Context Protocol server (rmcp) that lets an LLM play the demo
//! party against the demo map through the battle engine.

use std::borrow::Cow;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crystal_battle::mcp_interface::*;
use crystal_battle::session::GameSession;
use crystal_battle::ServerConfig;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ErrorData as McpError, *},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

const NO_BATTLE: &str = "No battle is currently active. Use 'start_battle' to begin.";

struct ServerState {
    session: GameSession,
    battle_id: Option<String>,
}

#[derive(Clone)]
pub struct CrystalBattleService {
    tool_router: ToolRouter<CrystalBattleService>,
    state: Arc<Mutex<ServerState>>,
}

// Tool request structures
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListAbilitiesRequest {
    #[schemars(description = "Party member id to filter by (aria, sable, kell). Omit for the full catalog")]
    pub member_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StartBattleRequest {
    #[schemars(description = "World object ids of the enemies to engage, e.g. [\"slime-1\"]")]
    pub enemy_ids: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UseAbilityRequest {
    #[schemars(description = "Id of the party member whose turn it is")]
    pub source_id: String,
    #[schemars(description = "Id of the target unit. Not needed for self-targeted abilities")]
    pub target_id: Option<String>,
    #[schemars(description = "Ability id, e.g. basic_attack or sage_mend")]
    pub ability_id: String,
}

fn internal_error(message: String) -> McpError {
    McpError {
        code: ErrorCode(-32603),
        message: Cow::from(message),
        data: None,
    }
}

#[tool_router]
impl CrystalBattleService {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            tool_router: Self::tool_router(),
            state: Arc::new(Mutex::new(ServerState {
                session: create_demo_session(config),
                battle_id: None,
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ServerState>, McpError> {
        self.state
            .lock()
            .map_err(|_| internal_error("server state is poisoned".to_string()))
    }

    #[tool(description = "List abilities, optionally only those a party member can use")]
    async fn list_abilities(
        &self,
        Parameters(request): Parameters<ListAbilitiesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let state = self.lock()?;
        let text = list_abilities_display(&state.session, request.member_id.as_deref());
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "List the enemies on the map that can be engaged")]
    async fn list_enemies(&self) -> Result<CallToolResult, McpError> {
        let state = self.lock()?;
        let text = list_enemies_display(&state.session);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Engage one or more enemies and start a battle")]
    async fn start_battle(
        &self,
        Parameters(request): Parameters<StartBattleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut state = self.lock()?;
        if state.battle_id.is_some() {
            return Ok(CallToolResult::success(vec![Content::text(
                "A battle is already in progress.".to_string(),
            )]));
        }
        let enemy_ids: Vec<&str> = request.enemy_ids.iter().map(String::as_str).collect();
        match crystal_battle::mcp_interface::start_battle(&mut state.session, &enemy_ids) {
            Ok((battle_id, text)) => {
                // the battle may already be over if the enemies struck first
                if state.session.snapshot(&battle_id).is_ok() {
                    state.battle_id = Some(battle_id);
                }
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => Err(internal_error(e)),
        }
    }

    #[tool(description = "Get the current battle state")]
    async fn get_battle_state(&self) -> Result<CallToolResult, McpError> {
        let state = self.lock()?;
        let text = match &state.battle_id {
            Some(battle_id) => match state.session.snapshot(battle_id) {
                Ok(snapshot) => battle_status_summary(&snapshot),
                Err(e) => format!("Error: {}", e),
            },
            None => NO_BATTLE.to_string(),
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Use an ability with the party member whose turn it is")]
    async fn use_ability(
        &self,
        Parameters(request): Parameters<UseAbilityRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut state = self.lock()?;
        let Some(battle_id) = state.battle_id.clone() else {
            return Ok(CallToolResult::success(vec![Content::text(NO_BATTLE.to_string())]));
        };
        let text = match crystal_battle::mcp_interface::use_ability(
            &mut state.session,
            &battle_id,
            &request.source_id,
            request.target_id.as_deref(),
            &request.ability_id,
        ) {
            Ok((text, finished)) => {
                if finished {
                    state.battle_id = None;
                }
                text
            }
            Err(e) => e,
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Flee the current battle. Always succeeds and counts as a defeat")]
    async fn flee(&self) -> Result<CallToolResult, McpError> {
        let mut state = self.lock()?;
        let Some(battle_id) = state.battle_id.take() else {
            return Ok(CallToolResult::success(vec![Content::text(NO_BATTLE.to_string())]));
        };
        let text = match crystal_battle::mcp_interface::flee(&mut state.session, &battle_id) {
            Ok(text) => text,
            Err(e) => e,
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for CrystalBattleService {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("CRYSTAL_BATTLE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config/server.ron"));
    let config = ServerConfig::load_or_default(&config_path)?;

    // stdout carries the protocol, so logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Crystal Battle MCP server starting");
    let service = CrystalBattleService::new(config);
    let transport = (stdin(), stdout());

    let server = service.serve(transport).await?;
    tracing::info!("Server running, waiting for shutdown");

    let quit_reason = server.waiting().await?;
    tracing::info!("Crystal Battle MCP server exiting: {:?}", quit_reason);
    Ok(())
}
