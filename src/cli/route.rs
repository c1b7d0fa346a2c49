//! CLI route: single route table and run context. Dispatches to the session and presentation.

use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{
    format_contexts_json, format_contexts_text, format_saved_suites_json,
    format_saved_suites_text, format_tools_json, format_tools_text,
};
use crate::config::{ConfigLoader, SweetConfig};
use crate::error::ApiError;
use crate::session::Session;
use crate::suite::{ContextOrder, ErrorChannel, SuiteOp, ToolVisibility, TracingSink};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runtime context for CLI execution: configuration and the suite session.
pub struct RunContext {
    config: SweetConfig,
    session: Session,
    color: bool,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Self::from_config(config)
    }

    pub fn from_config(config: SweetConfig) -> Result<Self, ApiError> {
        let errors = ErrorChannel::with_listener(Arc::new(TracingSink));
        let session = Session::from_config(&config, errors)?;
        let color = std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
        Ok(Self {
            config,
            session,
            color,
        })
    }

    pub fn config(&self) -> &SweetConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Force colored (or plain) text output.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Execute a CLI command via the single route table.
    ///
    /// `run` is not routed here; see [`RunContext::run_tool`].
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        debug!(
            command = command.name(),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Suites { branch, format } => {
                let saved = self.session.iter_saved_suites(branch.as_deref())?;
                match format {
                    OutputFormat::Json => format_saved_suites_json(&saved).map_err(json_error),
                    OutputFormat::Text => Ok(format_saved_suites_text(&saved, self.color)),
                }
            }
            Commands::Contexts {
                branch,
                suite,
                format,
            } => {
                let op = self.load_saved(branch, suite)?;
                let contexts = op.iter_contexts(ContextOrder::PriorityDescending);
                match format {
                    OutputFormat::Json => {
                        format_contexts_json(op.name(), &contexts).map_err(json_error)
                    }
                    OutputFormat::Text => Ok(format_contexts_text(op.name(), &contexts, self.color)),
                }
            }
            Commands::Tools {
                branch,
                suite,
                all,
                format,
            } => {
                let op = self.load_saved(branch, suite)?;
                let tools: Vec<_> = op
                    .resolve_tools()
                    .into_iter()
                    .filter(|t| *all || t.visibility == ToolVisibility::Visible)
                    .collect();
                match format {
                    OutputFormat::Json => format_tools_json(op.name(), &tools).map_err(json_error),
                    OutputFormat::Text => Ok(format_tools_text(op.name(), &tools, self.color)),
                }
            }
            Commands::Run {
                suite_file,
                alias,
                args,
            } => self.run_tool(suite_file, alias, args).map(|code| code.to_string()),
        }
    }

    fn load_saved(&self, branch: &str, suite: &str) -> Result<SuiteOp, ApiError> {
        let saved = self.session.find_saved(branch, suite)?;
        self.session.load(&saved)
    }

    /// Launch a visible tool of a suite file with its context environment.
    /// Returns the tool's exit code.
    pub fn run_tool(&self, suite_file: &Path, alias: &str, args: &[String]) -> Result<i32, ApiError> {
        let op = self.session.load_file(suite_file)?;
        let tool = op
            .tool_table()
            .visible_tool(alias)
            .cloned()
            .ok_or_else(|| ApiError::ToolNotFound(alias.to_string()))?;
        let environ = op
            .context(&tool.ctx_id)
            .map(|c| c.context.shell_environment())
            .unwrap_or_default();

        info!(alias, tool = %tool.name, context = %tool.ctx_name, "Launching tool");
        let status = std::process::Command::new(&tool.name)
            .args(args)
            .envs(&environ)
            .status()
            .map_err(|source| ApiError::Launch {
                tool: tool.name.clone(),
                source,
            })?;
        Ok(status.code().unwrap_or(1))
    }
}

fn json_error(e: serde_json::Error) -> ApiError {
    ApiError::ConfigError(format!("Failed to render json: {}", e))
}
