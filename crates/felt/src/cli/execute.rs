//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands. Each command
//! loads the fibers it needs, makes its change through the storage layer and
//! reports the result in the requested output mode.

use std::io::IsTerminal;

use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use felt_graph::{Dependency, Graph, Status};
use regex::RegexBuilder;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use super::args::{
    AddArgs, CommentArgs, EditArgs, GraphArgs, LinkArgs, LsArgs, OffArgs, OnArgs, PathArgs,
    ReadyArgs, RmArgs, ShowArgs, TagArgs, TraversalArgs, TreeArgs, UnlinkArgs,
};
use super::types::{DueChange, GraphFormat, StatusFilter};
use super::validators::split_tags;
use crate::app::App;
use crate::domain::{self, Fiber, FiberFilter, StatusGate, TextMatch};
use crate::error::Error;
use crate::id_generation::{IdGenerator, validate_id};
use crate::output::{self, OutputConfig, OutputMode};

/// Which way `upstream` and `downstream` walk the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards dependencies
    Upstream,
    /// Towards dependents
    Downstream,
}

/// Execute the init command
pub async fn execute_init(output_mode: OutputMode) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;
    let result = init::init(&current_dir).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "felt_dir": result.felt_dir.display().to_string(),
            "config_file": result.config_file.display().to_string(),
        }))?,
        OutputMode::Text => output::print_message("Initialized .felt/")?,
    }
    Ok(())
}

/// Execute the add command
pub async fn execute_add(app: &mut App, args: &AddArgs, output_mode: OutputMode) -> Result<()> {
    let fibers = app.storage().list().await?;
    let graph = Graph::build(&fibers);

    let (title_tags, title) = domain::extract_tags(&args.title);
    let now = Utc::now();
    let mut ids = IdGenerator::new(fibers.iter().map(|f| f.id.clone()));
    let id = ids.generate(&title, now)?;

    let mut fiber = Fiber::new(id, &title, now)?;
    fiber.kind = args
        .kind
        .clone()
        .unwrap_or_else(|| app.config().default_kind.clone());
    fiber.priority = args.priority.unwrap_or(app.config().default_priority);
    fiber.due = args.due;
    if let Some(outcome) = &args.outcome {
        fiber.outcome.clone_from(outcome);
    }

    for tag in title_tags.iter().chain(&args.tags) {
        fiber.add_tag(tag);
    }

    if let Some(status) = args.status {
        fiber.status = Some(status.into());
        if status == super::types::StatusArg::Closed {
            fiber.closed_at = Some(now);
        }
    }

    fiber.body = match &args.body {
        Some(body) => body.clone(),
        None => read_piped_stdin().await?.unwrap_or_default(),
    };

    for query in &args.depends_on {
        let dependency = domain::resolve(&fibers, query)?;
        if fiber.depends_on_id(&dependency.id) {
            continue;
        }
        if graph.would_create_cycle(&fiber.id, &dependency.id) {
            return Err(Error::CircularDependency(dependency.id.clone()).into());
        }
        fiber.depends_on.push(Dependency::new(dependency.id.clone()));
    }

    app.storage_mut().save(&fiber).await?;
    info!(id = %fiber.id, "Created fiber");

    match output_mode {
        OutputMode::Json => output::print_json(&fiber)?,
        OutputMode::Text => output::print_message(&fiber.id)?,
    }
    Ok(())
}

/// Execute the edit command
///
/// Without modification flags the fiber file is opened in `$EDITOR`.
pub async fn execute_edit(app: &mut App, args: &EditArgs, output_mode: OutputMode) -> Result<()> {
    let fibers = app.storage().list().await?;
    let mut fiber = domain::resolve(&fibers, &args.id)?.clone();

    if !args.has_modifications() {
        let path = app.storage().path(&fiber.id);
        return open_in_editor(&path).await;
    }

    if let Some(title) = &args.title {
        fiber.title.clone_from(title);
    }
    if let Some(body) = &args.body {
        fiber.body.clone_from(body);
    }
    if let Some(outcome) = &args.outcome {
        fiber.outcome.clone_from(outcome);
    }
    if let Some(priority) = args.priority {
        fiber.priority = priority;
    }
    if let Some(kind) = &args.kind {
        fiber.kind.clone_from(kind);
    }
    match args.due {
        Some(DueChange::Set(date)) => fiber.due = Some(date),
        Some(DueChange::Clear) => fiber.due = None,
        None => {}
    }

    let graph = Graph::build(&fibers);
    for query in &args.depends_on {
        let dependency = domain::resolve(&fibers, query)?;
        if fiber.depends_on_id(&dependency.id) {
            debug!(dependency = %dependency.id, "Dependency already present, skipping");
            continue;
        }
        if graph.would_create_cycle(&fiber.id, &dependency.id) {
            return Err(Error::CircularDependency(dependency.id.clone()).into());
        }
        fiber.depends_on.push(Dependency::new(dependency.id.clone()));
    }

    app.storage_mut().save(&fiber).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&fiber)?,
        OutputMode::Text => output::print_message(&format!("Updated {}", fiber.id))?,
    }
    Ok(())
}

/// Execute the comment command
pub async fn execute_comment(
    app: &mut App,
    args: &CommentArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let mut fiber = app.storage().resolve(&args.id).await?;
    fiber.append_comment(&args.text, Local::now());
    app.storage_mut().save(&fiber).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&fiber)?,
        OutputMode::Text => output::print_message(&format!("Added comment to {}", fiber.id))?,
    }
    Ok(())
}

/// Execute the link command
pub async fn execute_link(app: &mut App, args: &LinkArgs, output_mode: OutputMode) -> Result<()> {
    let fibers = app.storage().list().await?;
    let mut fiber = domain::resolve(&fibers, &args.id)?.clone();
    let dependency = domain::resolve(&fibers, &args.depends_on)?;

    if fiber.depends_on_id(&dependency.id) {
        return Err(Error::DuplicateDependency {
            fiber: fiber.id,
            dependency: dependency.id.clone(),
        }
        .into());
    }

    let graph = Graph::build(&fibers);
    if graph.would_create_cycle(&fiber.id, &dependency.id) {
        return Err(Error::CircularDependency(dependency.id.clone()).into());
    }

    let label = args.label.as_deref().map(str::trim).filter(|l| !l.is_empty());
    fiber.depends_on.push(match label {
        Some(label) => Dependency::with_label(dependency.id.clone(), label),
        None => Dependency::new(dependency.id.clone()),
    });
    app.storage_mut().save(&fiber).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&fiber)?,
        OutputMode::Text => {
            let suffix = label.map(|l| format!(" [{l}]")).unwrap_or_default();
            output::print_message(&format!("Linked {} → {}{suffix}", fiber.id, dependency.id))?;
        }
    }
    Ok(())
}

/// Execute the unlink command
pub async fn execute_unlink(
    app: &mut App,
    args: &UnlinkArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let fibers = app.storage().list().await?;
    let mut fiber = domain::resolve(&fibers, &args.id)?.clone();
    let dependency_id = match domain::resolve(&fibers, &args.depends_on) {
        Ok(dependency) => dependency.id.clone(),
        // A dangling reference can still be removed by its exact id.
        Err(Error::FiberNotFound(_)) if fiber.depends_on_id(&args.depends_on) => {
            args.depends_on.clone()
        }
        Err(e) => return Err(e.into()),
    };

    if !fiber.depends_on_id(&dependency_id) {
        return Err(Error::DependencyNotFound {
            fiber: fiber.id,
            dependency: dependency_id,
        }
        .into());
    }

    fiber.depends_on.retain(|d| d.id() != dependency_id);
    app.storage_mut().save(&fiber).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&fiber)?,
        OutputMode::Text => {
            output::print_message(&format!("Unlinked {} → {dependency_id}", fiber.id))?;
        }
    }
    Ok(())
}

/// Execute the ls command
pub async fn execute_ls(app: &App, args: &LsArgs, output_mode: OutputMode) -> Result<()> {
    let fibers = app.storage().list().await?;
    let query = args.query.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let text = match query {
        None => None,
        Some(q) if args.regex => Some(TextMatch::Pattern(
            RegexBuilder::new(q)
                .case_insensitive(true)
                .build()
                .with_context(|| format!("invalid regex {q:?}"))?,
        )),
        Some(q) if args.exact => Some(TextMatch::ExactTitle(q.to_string())),
        Some(q) => Some(TextMatch::Substring(q.to_string())),
    };

    // Searching widens the default status gate to everything.
    let searching =
        query.is_some() || !args.tags.is_empty() || args.recent.is_some_and(|n| n > 0);
    let status = match args.status {
        Some(StatusFilter::All) => StatusGate::All,
        Some(filter) => StatusGate::Only(filter.status()),
        None if searching => StatusGate::All,
        None => StatusGate::Actionable,
    };

    let filter = FiberFilter {
        status,
        tags: args.tags.clone(),
        text,
        recent: args.recent.filter(|&n| n > 0),
    };
    let selected = filter.apply(&fibers);
    debug!(total = fibers.len(), selected = selected.len(), "Filtered fibers");

    if output_mode == OutputMode::Json && !args.body {
        let stripped: Vec<Fiber> = selected
            .iter()
            .map(|&f| Fiber {
                body: String::new(),
                ..f.clone()
            })
            .collect();
        output::print_json(&stripped)?;
        return Ok(());
    }

    let empty = match query {
        Some(q) => format!("No felts matching {q:?}"),
        None => "No felts found".to_string(),
    };
    output::print_fibers(&selected, &empty, output_mode)?;
    Ok(())
}

/// Execute the ready command
pub async fn execute_ready(app: &App, args: &ReadyArgs, output_mode: OutputMode) -> Result<()> {
    let fibers = app.storage().list().await?;
    let graph = Graph::build(&fibers);

    let ready: Vec<&Fiber> = graph
        .ready()
        .into_iter()
        .filter(|f| args.tags.iter().all(|t| f.matches_tag(t)))
        .collect();

    output::print_fibers(&ready, "No felts ready", output_mode)?;
    Ok(())
}

/// Execute the tree command
pub async fn execute_tree(app: &App, args: &TreeArgs, output_mode: OutputMode) -> Result<()> {
    let fibers = app.storage().list().await?;
    let graph = Graph::build(&fibers);

    let root = match &args.id {
        Some(query) => Some(domain::resolve(&fibers, query)?.id.as_str()),
        None => None,
    };

    if root.is_none() && graph.is_empty() && output_mode == OutputMode::Text {
        output::print_message("No felts found")?;
        return Ok(());
    }

    output::print_tree(&graph, root, output_mode)?;
    Ok(())
}

/// Execute the show command
pub async fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let fibers = app.storage().list().await?;
    let fiber = domain::resolve(&fibers, &args.id)?;

    if args.body {
        if !fiber.body.is_empty() {
            output::print_message(fiber.body.trim_end())?;
        }
        return Ok(());
    }

    let graph = Graph::build(&fibers);
    output::print_fiber_details(fiber, &graph, output_mode)?;
    Ok(())
}

/// Execute the on command
pub async fn execute_on(app: &mut App, args: &OnArgs, output_mode: OutputMode) -> Result<()> {
    let mut fiber = app.storage().resolve(&args.id).await?;

    if fiber.is_closed() {
        if !args.reopen {
            return Err(Error::InvalidTransition(format!(
                "cannot activate closed felt {} (use --reopen to force)",
                fiber.id
            ))
            .into());
        }
        fiber.closed_at = None;
        fiber.close_reason.clear();
    }

    fiber.status = Some(Status::Active);
    app.storage_mut().save(&fiber).await?;

    print_transition(&fiber, output_mode)
}

/// Execute the off command
pub async fn execute_off(app: &mut App, args: &OffArgs, output_mode: OutputMode) -> Result<()> {
    let mut fiber = app.storage().resolve(&args.id).await?;

    if fiber.is_closed() {
        return Err(Error::InvalidTransition(format!("felt {} is already closed", fiber.id)).into());
    }

    fiber.status = Some(Status::Closed);
    fiber.closed_at = Some(Utc::now());
    if let Some(reason) = args.reason.as_deref().filter(|r| !r.trim().is_empty()) {
        fiber.close_reason = reason.to_string();
    }
    app.storage_mut().save(&fiber).await?;

    print_transition(&fiber, output_mode)
}

/// Execute the rm command
pub async fn execute_rm(app: &mut App, args: &RmArgs, output_mode: OutputMode) -> Result<()> {
    let fibers = app.storage().list().await?;
    let fiber = domain::resolve(&fibers, &args.id)?;
    let graph = Graph::build(&fibers);

    let mut dependents: Vec<String> = graph
        .downstream(&fiber.id)
        .iter()
        .map(|d| d.id.to_string())
        .collect();
    if !dependents.is_empty() {
        dependents.sort();
        return Err(Error::HasDependents {
            id: fiber.id.clone(),
            dependents,
        }
        .into());
    }

    let id = fiber.id.clone();
    app.storage_mut().delete(&id).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({ "deleted": id }))?,
        OutputMode::Text => output::print_message(&format!("Deleted {id}"))?,
    }
    Ok(())
}

/// Execute the tag and untag commands
pub async fn execute_tag(
    app: &mut App,
    args: &TagArgs,
    add: bool,
    output_mode: OutputMode,
) -> Result<()> {
    let tags = split_tags(&args.tags);
    if tags.is_empty() {
        bail!("no tags given");
    }
    for tag in &tags {
        super::validators::validate_tag(tag).map_err(|e| anyhow::anyhow!("{e}"))?;
    }

    let mut fiber = app.storage().resolve(&args.id).await?;
    let mut changes = Vec::new();
    for tag in &tags {
        if add && fiber.add_tag(tag) {
            changes.push(format!("{} +[{tag}]", fiber.id));
        } else if !add && fiber.remove_tag(tag) {
            changes.push(format!("{} -[{tag}]", fiber.id));
        }
    }

    if changes.is_empty() {
        debug!(id = %fiber.id, "Tags unchanged");
    } else {
        app.storage_mut().save(&fiber).await?;
    }

    match output_mode {
        OutputMode::Json => output::print_json(&fiber)?,
        OutputMode::Text => {
            for line in &changes {
                output::print_message(line)?;
            }
        }
    }
    Ok(())
}

/// Execute the graph command
pub async fn execute_graph(app: &App, args: &GraphArgs, output_mode: OutputMode) -> Result<()> {
    let fibers = app.storage().list().await?;
    let graph = Graph::build(&fibers);

    if output_mode == OutputMode::Json {
        let edges: Vec<serde_json::Value> = graph
            .sorted_ids()
            .into_iter()
            .flat_map(|id| {
                graph.upstream(id).iter().map(move |dep| {
                    serde_json::json!({ "from": dep.id(), "to": id, "label": dep.label() })
                })
            })
            .collect();
        let nodes: Vec<&Fiber> = graph
            .sorted_ids()
            .into_iter()
            .filter_map(|id| graph.node(id))
            .collect();
        output::print_json(&serde_json::json!({ "nodes": nodes, "edges": edges }))?;
        return Ok(());
    }

    if graph.is_empty() {
        output::print_message("No felts to graph")?;
        return Ok(());
    }

    match args.format {
        GraphFormat::Mermaid => print!("{}", output::diagram::to_mermaid(&graph)),
        GraphFormat::Dot => print!("{}", output::diagram::to_dot(&graph)),
        GraphFormat::Text => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            output::tree::write_forest(&mut handle, &graph, &OutputConfig::from_env())?;
        }
    }
    Ok(())
}

/// Execute the upstream and downstream commands
pub async fn execute_traversal(
    app: &App,
    args: &TraversalArgs,
    direction: Direction,
    output_mode: OutputMode,
) -> Result<()> {
    let fibers = app.storage().list().await?;
    let fiber = domain::resolve(&fibers, &args.id)?;
    let graph = Graph::build(&fibers);

    let depth = if args.all { None } else { Some(1) };
    let (ids, empty) = match direction {
        Direction::Upstream => (graph.ancestors_of(&fiber.id, depth), "No dependencies"),
        Direction::Downstream => (graph.descendants_of(&fiber.id, depth), "Nothing depends on this"),
    };

    let related: Vec<(&Fiber, Option<&str>)> = ids
        .into_iter()
        .filter_map(|id| {
            let label = match direction {
                Direction::Upstream => graph.edge_label(id, &fiber.id),
                Direction::Downstream => graph.edge_label(&fiber.id, id),
            };
            graph.node(id).map(|f| (f, label))
        })
        .collect();

    output::print_neighbours(&related, &graph, args.detail, empty, output_mode)?;
    Ok(())
}

/// Execute the path command
pub async fn execute_path(app: &App, args: &PathArgs, output_mode: OutputMode) -> Result<()> {
    let fibers = app.storage().list().await?;
    let from = domain::resolve(&fibers, &args.from)?;
    let to = domain::resolve(&fibers, &args.to)?;
    let graph = Graph::build(&fibers);

    let Some(path) = graph.find_path(&from.id, &to.id) else {
        match output_mode {
            OutputMode::Json => output::print_path(&[], output_mode)?,
            OutputMode::Text => {
                output::print_message(&format!("No path from {} to {}", from.id, to.id))?;
            }
        }
        return Ok(());
    };

    let path: Vec<&Fiber> = path.into_iter().filter_map(|id| graph.node(id)).collect();
    output::print_path(&path, output_mode)?;
    Ok(())
}

/// Execute the check command
///
/// Errors are unreadable files, dangling dependencies and cycles. Ids that
/// do not follow the generated format are only warned about.
pub async fn execute_check(app: &App, output_mode: OutputMode) -> Result<()> {
    let (fibers, load_warnings) = app.storage().load_all().await?;
    let graph = Graph::build(&fibers);

    let mut errors: Vec<String> = load_warnings.iter().map(ToString::to_string).collect();
    errors.extend(graph.validate_dependencies().iter().map(ToString::to_string));
    errors.extend(graph.find_cycles().iter().map(ToString::to_string));

    let warnings: Vec<String> = fibers
        .iter()
        .filter(|f| !validate_id(&f.id))
        .map(|f| format!("{} is not a valid felt id", f.id))
        .collect();

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "ok": errors.is_empty(),
            "errors": errors,
            "warnings": warnings,
        }))?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            for warning in &warnings {
                output::print_message(&format!(
                    "{} {warning}",
                    output::warning("WARNING:", &config)
                ))?;
            }
            for error in &errors {
                output::print_message(&format!("{} {error}", output::error("ERROR:", &config)))?;
            }
            if errors.is_empty() {
                output::print_message(&output::success("Graph OK", &config))?;
            }
        }
    }

    if !errors.is_empty() {
        bail!("found {} issue{}", errors.len(), if errors.len() == 1 { "" } else { "s" });
    }
    Ok(())
}

fn print_transition(fiber: &Fiber, output_mode: OutputMode) -> Result<()> {
    match output_mode {
        OutputMode::Json => output::print_json(fiber)?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            output::print_message(&format!(
                "{} {}  {}",
                output::color::status_icon(fiber.status, &config),
                fiber.id,
                fiber.title
            ))?;
        }
    }
    Ok(())
}

/// Read a body piped on stdin. Returns `None` for a terminal or empty input.
async fn read_piped_stdin() -> Result<Option<String>> {
    if std::io::stdin().is_terminal() {
        return Ok(None);
    }
    let mut body = String::new();
    tokio::io::stdin()
        .read_to_string(&mut body)
        .await
        .context("failed to read body from stdin")?;
    Ok((!body.trim().is_empty()).then_some(body))
}

/// Open `path` in `$EDITOR` (default `vi`) and wait for it to exit.
async fn open_in_editor(path: &std::path::Path) -> Result<()> {
    let editor = std::env::var("EDITOR")
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string());
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");

    debug!(%editor, path = %path.display(), "Launching editor");
    let status = tokio::process::Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .await
        .with_context(|| format!("failed to launch editor {program:?}"))?;

    if !status.success() {
        bail!("editor exited with {status}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, App) {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path()).await.unwrap();
        let app = App::from_directory(temp_dir.path()).await.unwrap();
        (temp_dir, app)
    }

    fn add_args(title: &str) -> AddArgs {
        AddArgs {
            title: title.to_string(),
            body: Some(String::new()),
            status: None,
            kind: None,
            priority: None,
            depends_on: vec![],
            tags: vec![],
            due: None,
            outcome: None,
        }
    }

    async fn add(app: &mut App, args: AddArgs) -> Fiber {
        execute_add(app, &args, OutputMode::Json).await.unwrap();
        let (_, title) = domain::extract_tags(&args.title);
        let fibers = app.storage().list().await.unwrap();
        fibers.into_iter().find(|f| f.title == title).unwrap()
    }

    // ========== Add Tests ==========

    #[tokio::test]
    async fn test_add_applies_title_tags_and_defaults() {
        let (_dir, mut app) = setup().await;
        let fiber = add(&mut app, add_args("[auth] Fix login")).await;

        assert_eq!(fiber.title, "Fix login");
        assert!(fiber.id.starts_with("fix-login-"));
        assert!(fiber.has_tag("auth"));
        assert_eq!(fiber.kind, app.config().default_kind);
        assert_eq!(fiber.priority, app.config().default_priority);
        assert_eq!(fiber.status, Some(Status::Open));
    }

    #[tokio::test]
    async fn test_add_closed_sets_closed_at() {
        let (_dir, mut app) = setup().await;
        let mut args = add_args("Done already");
        args.status = Some(super::super::types::StatusArg::Closed);
        let fiber = add(&mut app, args).await;

        assert_eq!(fiber.status, Some(Status::Closed));
        assert!(fiber.closed_at.is_some());
    }

    #[tokio::test]
    async fn test_add_with_unknown_dependency_fails() {
        let (_dir, mut app) = setup().await;
        let mut args = add_args("Orphan");
        args.depends_on = vec!["nope".to_string()];

        let err = execute_add(&mut app, &args, OutputMode::Json).await.unwrap_err();
        assert!(err.to_string().contains("no felt found matching \"nope\""));
        assert!(app.storage().list().await.unwrap().is_empty());
    }

    // ========== Link Tests ==========

    #[tokio::test]
    async fn test_link_rejects_cycle_and_duplicate() {
        let (_dir, mut app) = setup().await;
        let a = add(&mut app, add_args("Alpha")).await;
        let mut b_args = add_args("Beta");
        b_args.depends_on = vec![a.id.clone()];
        let b = add(&mut app, b_args).await;

        let cycle = LinkArgs {
            id: a.id.clone(),
            depends_on: b.id.clone(),
            label: None,
        };
        let err = execute_link(&mut app, &cycle, OutputMode::Json).await.unwrap_err();
        assert!(err.to_string().contains("would create a cycle"));

        let duplicate = LinkArgs {
            id: b.id.clone(),
            depends_on: a.id.clone(),
            label: None,
        };
        let err = execute_link(&mut app, &duplicate, OutputMode::Json).await.unwrap_err();
        assert_eq!(err.to_string(), format!("{} already depends on {}", b.id, a.id));
    }

    #[tokio::test]
    async fn test_link_then_unlink_with_label() {
        let (_dir, mut app) = setup().await;
        let a = add(&mut app, add_args("Alpha")).await;
        let b = add(&mut app, add_args("Beta")).await;

        let link = LinkArgs {
            id: b.id.clone(),
            depends_on: a.id.clone(),
            label: Some("design".to_string()),
        };
        execute_link(&mut app, &link, OutputMode::Json).await.unwrap();
        let stored = app.storage().get(&b.id).await.unwrap().unwrap();
        assert_eq!(stored.depends_on[0].label(), Some("design"));

        let unlink = UnlinkArgs {
            id: b.id.clone(),
            depends_on: a.id.clone(),
        };
        execute_unlink(&mut app, &unlink, OutputMode::Json).await.unwrap();
        let stored = app.storage().get(&b.id).await.unwrap().unwrap();
        assert!(stored.depends_on.is_empty());

        let err = execute_unlink(&mut app, &unlink, OutputMode::Json).await.unwrap_err();
        assert!(err.to_string().contains("does not depend on"));
    }

    // ========== Status Transition Tests ==========

    #[tokio::test]
    async fn test_on_off_reopen() {
        let (_dir, mut app) = setup().await;
        let fiber = add(&mut app, add_args("Work")).await;

        let off = OffArgs {
            id: fiber.id.clone(),
            reason: Some("shipped".to_string()),
        };
        execute_off(&mut app, &off, OutputMode::Json).await.unwrap();
        let closed = app.storage().get(&fiber.id).await.unwrap().unwrap();
        assert_eq!(closed.status, Some(Status::Closed));
        assert_eq!(closed.close_reason, "shipped");

        let err = execute_off(&mut app, &off, OutputMode::Json).await.unwrap_err();
        assert!(err.to_string().contains("already closed"));

        let on = OnArgs {
            id: fiber.id.clone(),
            reopen: false,
        };
        let err = execute_on(&mut app, &on, OutputMode::Json).await.unwrap_err();
        assert!(err.to_string().contains("--reopen"));

        let reopen = OnArgs {
            id: fiber.id.clone(),
            reopen: true,
        };
        execute_on(&mut app, &reopen, OutputMode::Json).await.unwrap();
        let active = app.storage().get(&fiber.id).await.unwrap().unwrap();
        assert_eq!(active.status, Some(Status::Active));
        assert!(active.closed_at.is_none());
        assert!(active.close_reason.is_empty());
    }

    // ========== Rm Tests ==========

    #[tokio::test]
    async fn test_rm_refuses_with_dependents() {
        let (_dir, mut app) = setup().await;
        let a = add(&mut app, add_args("Alpha")).await;
        let mut b_args = add_args("Beta");
        b_args.depends_on = vec![a.id.clone()];
        let b = add(&mut app, b_args).await;

        let err = execute_rm(&mut app, &RmArgs { id: a.id.clone() }, OutputMode::Json)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("cannot delete: {} depends on this felt", b.id));

        execute_rm(&mut app, &RmArgs { id: b.id.clone() }, OutputMode::Json).await.unwrap();
        execute_rm(&mut app, &RmArgs { id: a.id.clone() }, OutputMode::Json).await.unwrap();
        assert!(app.storage().list().await.unwrap().is_empty());
    }

    // ========== Tag Tests ==========

    #[tokio::test]
    async fn test_tag_and_untag() {
        let (_dir, mut app) = setup().await;
        let fiber = add(&mut app, add_args("Taggable")).await;

        let args = TagArgs {
            id: fiber.id.clone(),
            tags: "a, b".to_string(),
        };
        execute_tag(&mut app, &args, true, OutputMode::Json).await.unwrap();
        let tagged = app.storage().get(&fiber.id).await.unwrap().unwrap();
        assert!(tagged.has_tag("a") && tagged.has_tag("b"));

        let args = TagArgs {
            id: fiber.id.clone(),
            tags: "a".to_string(),
        };
        execute_tag(&mut app, &args, false, OutputMode::Json).await.unwrap();
        let untagged = app.storage().get(&fiber.id).await.unwrap().unwrap();
        assert!(!untagged.has_tag("a"));
        assert!(untagged.has_tag("b"));
    }

    #[tokio::test]
    async fn test_tag_rejects_empty_list() {
        let (_dir, mut app) = setup().await;
        let fiber = add(&mut app, add_args("Taggable")).await;
        let args = TagArgs {
            id: fiber.id,
            tags: " , ".to_string(),
        };
        let err = execute_tag(&mut app, &args, true, OutputMode::Json).await.unwrap_err();
        assert_eq!(err.to_string(), "no tags given");
    }

    // ========== Edit Tests ==========

    #[tokio::test]
    async fn test_edit_fields_and_clear_due() {
        let (_dir, mut app) = setup().await;
        let mut args = add_args("Draft");
        args.due = chrono::NaiveDate::from_ymd_opt(2026, 5, 1);
        let fiber = add(&mut app, args).await;

        let edit = EditArgs {
            id: fiber.id.clone(),
            title: Some("Final".to_string()),
            body: None,
            outcome: Some("agreed".to_string()),
            priority: Some(0),
            kind: Some("decision".to_string()),
            due: Some(DueChange::Clear),
            depends_on: vec![],
        };
        execute_edit(&mut app, &edit, OutputMode::Json).await.unwrap();

        let edited = app.storage().get(&fiber.id).await.unwrap().unwrap();
        assert_eq!(edited.title, "Final");
        assert_eq!(edited.outcome, "agreed");
        assert_eq!(edited.priority, 0);
        assert_eq!(edited.kind, "decision");
        assert!(edited.due.is_none());
    }

    // ========== Check Tests ==========

    #[tokio::test]
    async fn test_check_reports_dangling_dependency() {
        let (_dir, mut app) = setup().await;
        let mut fiber = add(&mut app, add_args("Lonely")).await;
        fiber.depends_on.push(Dependency::new("ghost-00000000"));
        app.storage_mut().save(&fiber).await.unwrap();

        let err = execute_check(&app, OutputMode::Json).await.unwrap_err();
        assert_eq!(err.to_string(), "found 1 issue");
    }

    #[tokio::test]
    async fn test_check_clean_repository() {
        let (_dir, mut app) = setup().await;
        add(&mut app, add_args("Fine")).await;
        execute_check(&app, OutputMode::Json).await.unwrap();
    }
}
