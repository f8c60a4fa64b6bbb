// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes a request to a primary tool session and chains secondary ones.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::{error, info, info_span, warn, Instrument};

use maestro_config::MaestroConfig;
use maestro_core::{FinalResult, MaestroError, ProviderAdapter, TokenUsage, ToolKind};
use maestro_database::{DatabaseService, SqliteEngine};
use maestro_router::{TaskAnalysis, TaskAnalyzer};
use maestro_skill::builtin::register_builtins;
use maestro_skill::ToolRegistry;

use crate::session::ToolSession;

/// One executed step of a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub tool: ToolKind,
    pub input: String,
    pub result: FinalResult,
}

/// Everything that happened while handling one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchestrationReport {
    pub session_id: String,
    pub analysis: TaskAnalysis,
    pub steps: Vec<StepReport>,
    /// Token usage summed over all tool sessions.
    pub usage: TokenUsage,
}

impl OrchestrationReport {
    /// The result of the last step that ran.
    pub fn final_result(&self) -> Option<&FinalResult> {
        self.steps.last().map(|s| &s.result)
    }

    pub fn is_error(&self) -> bool {
        self.final_result().is_some_and(|r| r.is_error)
    }
}

/// Owns one session per tool kind and drives requests through them.
pub struct Orchestrator {
    session_id: String,
    analyzer: TaskAnalyzer,
    sessions: HashMap<ToolKind, ToolSession>,
    database: Option<DatabaseService>,
}

impl Orchestrator {
    /// Builds every tool session from configuration.
    ///
    /// When the database is enabled, its connection is opened here and held
    /// for the orchestrator's lifetime. If it cannot be opened, the database
    /// tool runs disabled and the other tools are unaffected.
    pub async fn new(
        config: &MaestroConfig,
        provider: Arc<dyn ProviderAdapter>,
        session_id: String,
    ) -> Result<Self, MaestroError> {
        let database = open_database(config).await?;

        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry, config, database.clone());

        let mut sessions = HashMap::new();
        for kind in ToolKind::iter() {
            let dispatcher = registry.get(kind).ok_or_else(|| {
                MaestroError::Internal(format!("no dispatcher registered for {kind}"))
            })?;
            let session = ToolSession::new(
                kind,
                provider.clone(),
                dispatcher,
                system_prompt(config, kind),
                config.anthropic.max_tokens,
            );
            sessions.insert(kind, session);
        }

        info!(
            session_id = %session_id,
            tools = ?registry.kinds(),
            database = database.is_some(),
            "orchestrator ready"
        );
        Ok(Self {
            session_id,
            analyzer: TaskAnalyzer::new(provider, config.anthropic.analyzer_max_tokens),
            sessions,
            database,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn session(&self, kind: ToolKind) -> Option<&ToolSession> {
        self.sessions.get(&kind)
    }

    /// Token usage summed over all tool sessions.
    pub fn usage(&self) -> TokenUsage {
        let mut total = TokenUsage::default();
        for session in self.sessions.values() {
            total += session.usage();
        }
        total
    }

    /// Analyzes a request, runs the primary tool, then each secondary tool
    /// with the previous step's result. The chain stops at the first step
    /// whose result is an error.
    pub async fn process_request(
        &mut self,
        user_input: &str,
    ) -> Result<OrchestrationReport, MaestroError> {
        let span = info_span!("orchestrator", session_id = %self.session_id);
        self.process(user_input).instrument(span).await
    }

    async fn process(&mut self, user_input: &str) -> Result<OrchestrationReport, MaestroError> {
        info!(request = user_input, "processing request");
        let analysis = self.analyzer.analyze(user_input).await;
        let primary = analysis.primary_kind()?;

        info!(tool = %primary, input = %analysis.primary_input, "running primary tool");
        let mut result = self
            .run_step(primary, &analysis.primary_input, None)
            .await?;
        let mut steps = vec![StepReport {
            tool: primary,
            input: analysis.primary_input.clone(),
            result: result.clone(),
        }];

        if result.is_error {
            warn!(tool = %primary, "primary tool failed, skipping secondary tools");
        } else {
            for (kind, input) in analysis.secondary_steps() {
                info!(tool = %kind, input = %input, "running secondary tool");
                result = self.run_step(kind, &input, Some(&result)).await?;
                steps.push(StepReport {
                    tool: kind,
                    input,
                    result: result.clone(),
                });
                if result.is_error {
                    warn!(tool = %kind, "secondary tool failed, stopping chain");
                    break;
                }
            }
        }

        for kind in ToolKind::iter() {
            if let Some(session) = self.sessions.get(&kind)
                && session.usage().total() > 0
            {
                let usage = session.usage();
                info!(
                    tool = %kind,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "session token usage"
                );
            }
        }
        let usage = self.usage();
        info!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            total_tokens = usage.total(),
            "token usage"
        );

        Ok(OrchestrationReport {
            session_id: self.session_id.clone(),
            analysis,
            steps,
            usage,
        })
    }

    async fn run_step(
        &mut self,
        kind: ToolKind,
        input: &str,
        previous: Option<&FinalResult>,
    ) -> Result<FinalResult, MaestroError> {
        let session = self
            .sessions
            .get_mut(&kind)
            .ok_or_else(|| MaestroError::UnknownTool(kind.to_string()))?;
        session.run(input, previous).await
    }

    /// Closes the database connection, if one is open.
    pub async fn shutdown(&self) -> Result<(), MaestroError> {
        if let Some(database) = &self.database {
            database.disconnect().await?;
        }
        Ok(())
    }
}

fn system_prompt(config: &MaestroConfig, kind: ToolKind) -> &str {
    match kind {
        ToolKind::Editor => &config.editor.system_prompt,
        ToolKind::Bash => &config.bash.system_prompt,
        ToolKind::Mermaid => &config.mermaid.system_prompt,
        ToolKind::Database => &config.database.system_prompt,
    }
}

async fn open_database(config: &MaestroConfig) -> Result<Option<DatabaseService>, MaestroError> {
    if !config.database.enabled {
        return Ok(None);
    }
    let path = config.database.path.as_deref().ok_or_else(|| {
        MaestroError::Config("database.path is required when the database is enabled".to_string())
    })?;
    let service = DatabaseService::new(Arc::new(SqliteEngine::new(path)));
    if let Err(e) = service.connect().await {
        error!(path, error = %e, "failed to initialize database, database tool disabled");
        return Ok(None);
    }
    Ok(Some(service))
}

/// A new session id: local timestamp plus six hex characters.
pub fn new_session_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}",
        chrono::Local::now().format("%Y%m%d-%H%M%S"),
        &suffix[..6]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_shape() {
        let id = new_session_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(new_session_id(), id);
    }

    #[test]
    fn prompts_follow_config() {
        let mut config = MaestroConfig::default();
        config.bash.system_prompt = "shell expert".to_string();
        assert_eq!(system_prompt(&config, ToolKind::Bash), "shell expert");
        assert_eq!(
            system_prompt(&config, ToolKind::Database),
            config.database.system_prompt
        );
    }

    #[tokio::test]
    async fn enabled_database_without_path_fails() {
        let mut config = MaestroConfig::default();
        config.database.enabled = true;
        let err = open_database(&config).await.err().unwrap();
        assert!(matches!(err, MaestroError::Config(_)));
    }

    #[tokio::test]
    async fn unopenable_database_is_left_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = MaestroConfig::default();
        config.database.enabled = true;
        config.database.path = Some(
            dir.path()
                .join("no/such/dir/app.db")
                .to_string_lossy()
                .into_owned(),
        );
        assert!(open_database(&config).await.unwrap().is_none());
    }
}
