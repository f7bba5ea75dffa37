//! Operator-facing command-line interface.
//!
//! Two commands, both pointed at a plugin entry file on disk:
//!
//! - `status` - the diagnostic panel: forge binding, slug, installed vs.
//!   remote version ("unable to fetch" when the forge is unreachable), and
//!   the update verdict.
//! - `check` - runs one full primed check cycle against a fresh in-memory
//!   store and reports what would be handed to the host. Every invocation
//!   is a fresh cycle, so this doubles as the force-check trigger.
//!
//! ```bash
//! forge-updater status --plugin plugins/my-plugin/my-plugin.php
//! forge-updater check --plugin my-plugin.php --strategy file-probe --branch main
//! FORGE_TOKEN=... forge-updater check --plugin my-plugin.php
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use crate::config::{DiscoveryStrategy, ResolverConfig};
use crate::manifest::PluginIdentity;
use crate::resolver::{MemoryStore, UpdateResolver, UpdateStore};

/// Forge-hosted update resolver for CMS plugins.
#[derive(Debug, Parser)]
#[command(name = "forge-updater", version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the plugin's forge binding and best-known update state
    Status(SourceArgs),
    /// Run one update-check cycle and print the resulting update record
    Check(SourceArgs),
}

/// Arguments shared by both commands.
#[derive(Debug, Args)]
struct SourceArgs {
    /// Path to the plugin entry file carrying the forge headers
    #[arg(long)]
    plugin: PathBuf,

    /// Release-discovery strategy
    #[arg(long, value_enum, default_value_t = StrategyArg::ReleaseApi)]
    strategy: StrategyArg,

    /// Default branch of the bound repository
    #[arg(long, default_value = "main")]
    branch: String,

    /// Credential for private-repository access
    #[arg(long, env = "FORGE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Forge REST API base URL
    #[arg(long, default_value = crate::config::DEFAULT_API_BASE)]
    api_base: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Query the forge's latest-release endpoint
    ReleaseApi,
    /// Probe the entry file's Version header on the default branch
    FileProbe,
}

impl From<StrategyArg> for DiscoveryStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::ReleaseApi => Self::ReleaseApi,
            StrategyArg::FileProbe => Self::FileProbe,
        }
    }
}

impl SourceArgs {
    fn build_resolver(&self) -> Result<UpdateResolver> {
        let (mut identity, headers) = PluginIdentity::from_entry_file(&self.plugin)
            .with_context(|| format!("cannot use {} as a plugin entry file", self.plugin.display()))?;
        if let Some(token) = &self.token {
            identity = identity.with_access_token(token);
        }

        let config = ResolverConfig::new()
            .with_strategy(self.strategy.into())
            .with_default_branch(&self.branch)
            .with_api_base(&self.api_base);

        UpdateResolver::new(identity, headers, config)
            .context("failed to initialize update resolver")
    }
}

impl Cli {
    /// Executes the parsed command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Status(args) => status(args).await,
            Commands::Check(args) => check(args).await,
        }
    }
}

async fn status(args: SourceArgs) -> Result<()> {
    let resolver = args.build_resolver()?;
    let identity = resolver.identity().clone();
    let info = resolver.describe_plugin().await;

    println!("{}", info.name.bold());
    println!("  slug:        {}", identity.slug);
    println!("  forge repo:  {}", identity.repo_binding());
    println!(
        "  subfolder:   {}",
        identity.subfolder.as_deref().unwrap_or("(repository root)")
    );
    println!("  installed:   {}", info.installed_version.yellow());
    match &info.remote_version {
        Some(version) => println!("  remote:      {}", version.green()),
        None => println!("  remote:      {}", "unable to fetch".red()),
    }
    if let Some(updated) = info.last_updated {
        println!("  published:   {}", updated.format("%Y-%m-%d %H:%M UTC"));
    }

    match resolver.check_for_update().await {
        Some(record) => println!(
            "\n{} {} -> {}",
            "update available:".green().bold(),
            info.installed_version,
            record.new_version.bold()
        ),
        None => println!("\n{}", "up to date".dimmed()),
    }
    Ok(())
}

async fn check(args: SourceArgs) -> Result<()> {
    let resolver = args.build_resolver()?;
    let identity = resolver.identity().clone();

    // A fresh store per invocation: the CLI is always a forced, primed cycle.
    let mut store = MemoryStore::new();
    store.prime(&identity.slug, &identity.installed_version);
    resolver.on_check_for_update(&mut store).await;

    match store.get(&identity.slug) {
        Some(record) => {
            println!(
                "{} {}",
                "update available:".green().bold(),
                record.new_version.bold()
            );
            println!("  package: {}", record.package);
            println!("  info:    {}", record.url);
            if let Some(tested) = &record.tested {
                println!("  tested:  {tested}");
            }
        }
        None => println!(
            "{} (installed {})",
            "no update available".dimmed(),
            identity.installed_version
        ),
    }
    Ok(())
}
