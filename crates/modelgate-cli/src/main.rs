//! # modelgate
//!
//! Command-line host for the modelgate crates: lists the remote model catalog
//! and prints composed request fragments.

#![deny(unsafe_code)]

mod host;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use modelgate_catalog::CatalogService;
use modelgate_compose::{
    ByokOverride, ByokProvider, MemoryOverride, ReasoningEffort, ReasoningOverride, SearchMode,
    SearchOverride, ToggleOverride,
};
use modelgate_core::EndpointCategory;
use modelgate_settings::ModelgateSettings;
use tokio_util::sync::CancellationToken;

use crate::host::{StderrNotifier, TerminalCredential};

/// Model catalog and request composition.
#[derive(Parser, Debug)]
#[command(name = "modelgate", about = "Model catalog and request composition")]
struct Cli {
    /// Settings file (defaults to `~/.modelgate/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve and list the model catalog.
    Models(ModelsArgs),
    /// Print the request fragment for a model and feature toggles.
    Compose(ComposeArgs),
}

#[derive(Args, Debug)]
struct ModelsArgs {
    /// Category to try first (all, premium, subscription).
    #[arg(long)]
    category: Option<EndpointCategory>,

    /// Print the resolution as JSON.
    #[arg(long)]
    json: bool,

    /// Never prompt for an API key.
    #[arg(long)]
    no_prompt: bool,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Base model id, e.g. `gpt-4o`.
    base_id: String,

    /// Enable web search with this mode (standard, deep).
    #[arg(long, conflicts_with = "no_search")]
    search: Option<SearchMode>,
    /// Disable web search.
    #[arg(long)]
    no_search: bool,

    /// Enable memory with the configured retention.
    #[arg(long, conflicts_with = "no_memory")]
    memory: bool,
    /// Enable memory with this retention in days (1-365).
    #[arg(long, conflicts_with = "no_memory")]
    memory_days: Option<u32>,
    /// Disable memory.
    #[arg(long)]
    no_memory: bool,

    /// Enable reasoning with this effort (low, medium, high).
    #[arg(long, conflicts_with = "no_reasoning")]
    reasoning: Option<ReasoningEffort>,
    /// Disable reasoning.
    #[arg(long)]
    no_reasoning: bool,

    /// Route through your own key for this provider (openai, anthropic, google).
    #[arg(long, conflicts_with = "no_byok")]
    byok: Option<ByokProvider>,
    /// Disable BYOK routing.
    #[arg(long)]
    no_byok: bool,
}

impl ComposeArgs {
    fn overrides(&self) -> ToggleOverride {
        ToggleOverride {
            reasoning: ReasoningOverride {
                enabled: switch(self.reasoning.is_some(), self.no_reasoning),
                effort: self.reasoning,
            },
            memory: MemoryOverride {
                enabled: switch(self.memory || self.memory_days.is_some(), self.no_memory),
                days: self.memory_days,
            },
            search: SearchOverride {
                enabled: switch(self.search.is_some(), self.no_search),
                mode: self.search,
            },
            byok: ByokOverride {
                enabled: switch(self.byok.is_some(), self.no_byok),
                provider: self.byok,
            },
        }
    }
}

/// `Some(false)` for an explicit off, `Some(true)` for an explicit on,
/// `None` to keep the configured value.
fn switch(on: bool, off: bool) -> Option<bool> {
    if off {
        Some(false)
    } else if on {
        Some(true)
    } else {
        None
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<ModelgateSettings> {
    let path = path.cloned().unwrap_or_else(modelgate_settings::settings_path);
    modelgate_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

async fn run_models(service: CatalogService, args: &ModelsArgs) -> Result<()> {
    let service = service.allow_prompt(!args.no_prompt);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let _signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling catalog resolution");
            on_interrupt.cancel();
        }
    });

    let resolution = service
        .resolve_catalog(args.category, &cancel)
        .await
        .context("Failed to resolve model catalog")?;

    if args.json {
        let json = serde_json::to_string_pretty(&*resolution)?;
        println!("{json}");
    } else {
        println!("{}", render::listing(&resolution));
    }
    Ok(())
}

fn run_compose(service: &CatalogService, args: &ComposeArgs) -> Result<()> {
    let composed = service
        .compose_request(&args.base_id, Some(&args.overrides()))
        .context("Invalid feature toggles")?;
    let mut json = serde_json::to_value(&composed)?;
    json["model"] = serde_json::Value::String(composed.model());
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings = load_settings(args.settings.as_ref())?;
    if settings.logging.json {
        modelgate_core::logging::init_json_subscriber(&settings.logging.level);
    } else {
        modelgate_core::logging::init_subscriber(&settings.logging.level);
    }
    tracing::debug!(?settings, "settings loaded");

    let service = CatalogService::new(
        Arc::new(settings),
        Arc::new(TerminalCredential::new()),
        Arc::new(StderrNotifier::default()),
    )
    .context("Failed to build catalog client")?;

    match &args.command {
        Command::Models(models) => run_models(service, models).await,
        Command::Compose(compose) => run_compose(&service, compose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn compose_args(argv: &[&str]) -> ComposeArgs {
        let mut full = vec!["modelgate", "compose"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Command::Compose(args) => args,
            Command::Models(_) => panic!("expected compose"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn models_defaults() {
        let cli = Cli::parse_from(["modelgate", "models"]);
        let Command::Models(args) = cli.command else {
            panic!("expected models");
        };
        assert_eq!(args.category, None);
        assert!(!args.json);
        assert!(!args.no_prompt);
        assert_eq!(cli.settings, None);
    }

    #[test]
    fn models_category_and_flags() {
        let cli = Cli::parse_from([
            "modelgate",
            "models",
            "--category",
            "Premium",
            "--json",
            "--no-prompt",
        ]);
        let Command::Models(args) = cli.command else {
            panic!("expected models");
        };
        assert_eq!(args.category, Some(EndpointCategory::Premium));
        assert!(args.json && args.no_prompt);
    }

    #[test]
    fn models_rejects_unknown_category() {
        assert!(Cli::try_parse_from(["modelgate", "models", "--category", "free"]).is_err());
    }

    #[test]
    fn settings_flag_is_global() {
        let cli = Cli::parse_from(["modelgate", "compose", "m", "--settings", "/tmp/s.json"]);
        assert_eq!(cli.settings, Some(PathBuf::from("/tmp/s.json")));
    }

    #[test]
    fn compose_without_flags_overrides_nothing() {
        assert!(compose_args(&["gpt-4o"]).overrides().is_empty());
    }

    #[test]
    fn compose_flags_become_overrides() {
        let overrides = compose_args(&[
            "gpt-4o",
            "--search",
            "deep",
            "--memory-days",
            "90",
            "--reasoning",
            "high",
            "--no-byok",
        ])
        .overrides();
        assert_eq!(overrides.search.enabled, Some(true));
        assert_eq!(overrides.search.mode, Some(SearchMode::Deep));
        assert_eq!(overrides.memory.enabled, Some(true));
        assert_eq!(overrides.memory.days, Some(90));
        assert_eq!(overrides.reasoning.effort, Some(ReasoningEffort::High));
        assert_eq!(overrides.byok.enabled, Some(false));
        assert_eq!(overrides.byok.provider, None);
    }

    #[test]
    fn compose_memory_flag_keeps_configured_days() {
        let overrides = compose_args(&["m", "--memory"]).overrides();
        assert_eq!(overrides.memory.enabled, Some(true));
        assert_eq!(overrides.memory.days, None);
    }

    #[test]
    fn compose_rejects_conflicting_flags() {
        assert!(
            Cli::try_parse_from(["modelgate", "compose", "m", "--search", "standard", "--no-search"])
                .is_err()
        );
        assert!(
            Cli::try_parse_from(["modelgate", "compose", "m", "--memory-days", "5", "--no-memory"])
                .is_err()
        );
    }

    #[test]
    fn compose_rejects_unknown_provider() {
        assert!(Cli::try_parse_from(["modelgate", "compose", "m", "--byok", "acme"]).is_err());
    }

    #[test]
    fn switch_prefers_off() {
        assert_eq!(switch(true, true), Some(false));
        assert_eq!(switch(true, false), Some(true));
        assert_eq!(switch(false, false), None);
    }
}
