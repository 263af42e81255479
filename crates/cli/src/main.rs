use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use progress::TerminalProgress;
use project_filter::{
    plan_from_selection, FilterCommand, FilterConfig, FilterPlanExecutor, ProjectMatcher,
    SelectableProject,
};
use project_filter_graph::{InMemoryExplorer, InMemorySolution, SolutionSpec};
use project_filter_protocol::{FilterOptions, ProjectGraphService, ProjectId};
use report::{render_report, render_tree, ApplyOutput};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod progress;
mod report;

#[derive(Parser)]
#[command(name = "project-filter")]
#[command(about = "Load and unload projects of a large solution", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the solution tree with load state
    Tree(TreeArgs),

    /// Load and unload projects
    Apply(ApplyArgs),

    /// List the declared build dependencies of a project, transitively
    Deps(DepsArgs),
}

#[derive(Args)]
struct TreeArgs {
    /// Solution description (JSON)
    solution: PathBuf,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ApplyArgs {
    /// Solution description (JSON)
    solution: PathBuf,

    /// Projects to load (repeatable or comma-separated)
    #[arg(long, value_name = "ID", value_delimiter = ',')]
    load: Vec<String>,

    /// Projects to unload (repeatable or comma-separated)
    #[arg(long, value_name = "ID", value_delimiter = ',')]
    unload: Vec<String>,

    /// Load every project whose name fuzzy-matches QUERY
    #[arg(long, value_name = "QUERY")]
    load_matching: Option<String>,

    /// Unload every project whose name fuzzy-matches QUERY
    #[arg(long, value_name = "QUERY")]
    unload_matching: Option<String>,

    /// Keep exactly these projects loaded; everything else is unloaded
    #[arg(
        long,
        value_name = "ID",
        value_delimiter = ',',
        conflicts_with_all = ["load", "unload", "load_matching", "unload_matching"]
    )]
    only: Vec<String>,

    /// Also load build dependencies (default; PROJECT_FILTER_LOAD_DEPENDENCIES)
    #[arg(long, overrides_with = "no_deps")]
    deps: bool,

    /// Load only the requested projects
    #[arg(long, overrides_with = "deps")]
    no_deps: bool,

    /// Do not expand the folders of loaded projects
    #[arg(long)]
    no_expand: bool,

    /// Write the resulting load state back to the solution file
    #[arg(long)]
    save: bool,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DepsArgs {
    /// Solution description (JSON)
    solution: PathBuf,

    /// Project id
    project: String,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    let json_output = match &cli.command {
        Commands::Tree(args) => args.json,
        Commands::Apply(args) => args.json,
        Commands::Deps(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Tree(args) => run_tree(args).await?,
        Commands::Apply(args) => run_apply(args, cli.quiet).await?,
        Commands::Deps(args) => run_deps(args).await?,
    }

    Ok(())
}

fn load_solution(path: &Path) -> Result<InMemorySolution> {
    let spec = SolutionSpec::from_path(path)
        .with_context(|| format!("Failed to read solution {}", path.display()))?;
    InMemorySolution::from_spec(&spec)
        .with_context(|| format!("Invalid solution {}", path.display()))
}

async fn run_tree(args: TreeArgs) -> Result<()> {
    let solution = load_solution(&args.solution)?;
    let entries = solution.tree().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", render_tree(solution.name(), &entries));
    }
    Ok(())
}

async fn run_deps(args: DepsArgs) -> Result<()> {
    let solution = load_solution(&args.solution)?;
    let id = ProjectId::new(args.project);
    if solution.project_kind(&id).await.is_none() {
        anyhow::bail!("Unknown project {id}");
    }

    let closure = solution.declared_closure(&id).await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&closure)?);
    } else {
        for dependency in &closure {
            println!("{dependency}");
        }
    }
    Ok(())
}

async fn run_apply(args: ApplyArgs, quiet: bool) -> Result<()> {
    let solution = Arc::new(load_solution(&args.solution)?);

    let mut config = FilterConfig::from_env();
    if args.deps {
        config.load_dependencies = true;
    }
    if args.no_deps {
        config.load_dependencies = false;
    }
    if args.no_expand {
        config.expand_loaded_projects = false;
    }

    let options = build_options(&solution, &args, &config).await;
    log::debug!(
        "Request: load {:?}, unload {:?}",
        options.projects_to_load,
        options.projects_to_unload
    );

    let progress = Arc::new(TerminalProgress::new(!quiet));
    let cancel = progress.cancellation();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Cancelling after the current project...");
            cancel.cancel();
        }
    });

    let explorer = Arc::new(InMemoryExplorer::new(solution.clone()));
    let command = FilterCommand::new(FilterPlanExecutor::new(
        solution.clone(),
        explorer,
        progress,
        config,
    ));
    let outcome = command.run(&options).await;
    ctrl_c.abort();
    let report = outcome.context("Project filter aborted")?;

    if args.save {
        let raw = serde_json::to_string_pretty(&solution.to_spec().await)?;
        fs::write(&args.solution, raw)
            .with_context(|| format!("Failed to write {}", args.solution.display()))?;
    }

    let entries = solution.tree().await;
    if args.json {
        let output = ApplyOutput {
            solution: solution.name(),
            report: &report,
            projects: &entries,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_report(&report));
        print!("{}", render_tree(solution.name(), &entries));
    }
    Ok(())
}

async fn build_options(
    solution: &InMemorySolution,
    args: &ApplyArgs,
    config: &FilterConfig,
) -> FilterOptions {
    let projects: Vec<SelectableProject> = solution
        .tree()
        .await
        .into_iter()
        .map(|entry| SelectableProject {
            id: entry.id,
            name: entry.name,
            kind: entry.kind,
            loaded: entry.loaded,
        })
        .collect();

    if !args.only.is_empty() {
        let checked: HashSet<ProjectId> = args.only.iter().map(ProjectId::new).collect();
        return plan_from_selection(&projects, &checked, config);
    }

    let mut options = FilterOptions::new()
        .load(args.load.iter().map(String::as_str))
        .unload(args.unload.iter().map(String::as_str))
        .with_dependencies(config.load_dependencies)
        .expand_loaded(config.expand_loaded_projects);

    let mut matcher = ProjectMatcher::new();
    if let Some(query) = &args.load_matching {
        let found = matcher.find(query, &projects);
        log::info!("'{query}' matches {} project(s) to load", found.len());
        options.projects_to_load.extend(found);
    }
    if let Some(query) = &args.unload_matching {
        let found = matcher.find(query, &projects);
        log::info!("'{query}' matches {} project(s) to unload", found.len());
        options.projects_to_unload.extend(found);
    }

    options
}
