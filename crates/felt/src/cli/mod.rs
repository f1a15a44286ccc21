//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for felt using clap's
//! derive API. Every command that reads the graph loads all fibers, builds a
//! fresh [`felt_graph::Graph`], queries it and, for mutating commands, writes
//! back the single fiber it changed.
//!
//! # Global Flags
//!
//! - `--json` / `-j`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! felt add "[docs] Write the user guide" -p 1
//! felt link write-the-user-guide-1a2b3c4d design-doc -l needs
//! felt ready
//! felt graph -f dot | dot -Tsvg > graph.svg
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

// Re-export argument structs
pub use args::{
    AddArgs, CommentArgs, EditArgs, GraphArgs, LinkArgs, LsArgs, OffArgs, OnArgs, PathArgs,
    ReadyArgs, RmArgs, ShowArgs, TagArgs, TraversalArgs, TreeArgs, UnlinkArgs,
};

// Re-export types
pub use types::{DetailLevel, DueChange, GraphFormat, StatusArg, StatusFilter};

// Re-export validators for external use
pub use validators::{parse_due_date, split_tags, validate_tag, validate_title};

/// Felt - fibers of work in markdown, tied together by dependencies
///
/// Each fiber is a markdown file with YAML frontmatter under `.felt/`, easy
/// to read, edit and version alongside your code.
#[derive(Parser, Debug)]
#[command(name = "felt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(short = 'j', long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new felt repository
    ///
    /// Creates the `.felt/` directory with a default `config.yaml`.
    Init,

    /// Create a new fiber
    ///
    /// Prints the id of the new fiber. Leading `[tag]` groups in the title
    /// become tags.
    Add(AddArgs),

    /// Modify a fiber's fields, or open it in $EDITOR when no flags are given
    Edit(EditArgs),

    /// Append a timestamped comment to a fiber's body
    Comment(CommentArgs),

    /// Record that one fiber depends on another
    Link(LinkArgs),

    /// Remove a dependency
    Unlink(UnlinkArgs),

    /// List and search fibers
    ///
    /// Shows open and active fibers by default. Any filter or query widens
    /// the search to every status unless `--status` is given.
    Ls(LsArgs),

    /// List open fibers whose dependencies are all closed
    Ready(ReadyArgs),

    /// Show the downstream tree under a fiber, or under every root
    Tree(TreeArgs),

    /// Show every field of a fiber with its neighbours
    Show(ShowArgs),

    /// Mark a fiber as active
    On(OnArgs),

    /// Mark a fiber as closed
    Off(OffArgs),

    /// Delete a fiber
    ///
    /// Refused while any other fiber depends on it.
    Rm(RmArgs),

    /// Add comma-separated tags to a fiber
    Tag(TagArgs),

    /// Remove comma-separated tags from a fiber
    Untag(TagArgs),

    /// Export the dependency graph
    Graph(GraphArgs),

    /// List what a fiber depends on
    Upstream(TraversalArgs),

    /// List what depends on a fiber
    Downstream(TraversalArgs),

    /// Show the shortest dependency path between two fibers
    Path(PathArgs),

    /// Check for missing dependencies and cycles
    Check,
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("felt: fibers of work tied together by dependencies");
            println!("Use --help for more information");
            return Ok(());
        };

        match command {
            Commands::Init => execute::execute_init(output_mode).await,
            Commands::Add(args) => execute::execute_add(&mut open_app().await?, args, output_mode).await,
            Commands::Edit(args) => execute::execute_edit(&mut open_app().await?, args, output_mode).await,
            Commands::Comment(args) => {
                execute::execute_comment(&mut open_app().await?, args, output_mode).await
            }
            Commands::Link(args) => execute::execute_link(&mut open_app().await?, args, output_mode).await,
            Commands::Unlink(args) => {
                execute::execute_unlink(&mut open_app().await?, args, output_mode).await
            }
            Commands::Ls(args) => execute::execute_ls(&open_app().await?, args, output_mode).await,
            Commands::Ready(args) => execute::execute_ready(&open_app().await?, args, output_mode).await,
            Commands::Tree(args) => execute::execute_tree(&open_app().await?, args, output_mode).await,
            Commands::Show(args) => execute::execute_show(&open_app().await?, args, output_mode).await,
            Commands::On(args) => execute::execute_on(&mut open_app().await?, args, output_mode).await,
            Commands::Off(args) => execute::execute_off(&mut open_app().await?, args, output_mode).await,
            Commands::Rm(args) => execute::execute_rm(&mut open_app().await?, args, output_mode).await,
            Commands::Tag(args) => {
                execute::execute_tag(&mut open_app().await?, args, true, output_mode).await
            }
            Commands::Untag(args) => {
                execute::execute_tag(&mut open_app().await?, args, false, output_mode).await
            }
            Commands::Graph(args) => execute::execute_graph(&open_app().await?, args, output_mode).await,
            Commands::Upstream(args) => {
                let app = open_app().await?;
                execute::execute_traversal(&app, args, execute::Direction::Upstream, output_mode)
                    .await
            }
            Commands::Downstream(args) => {
                let app = open_app().await?;
                execute::execute_traversal(&app, args, execute::Direction::Downstream, output_mode)
                    .await
            }
            Commands::Path(args) => execute::execute_path(&open_app().await?, args, output_mode).await,
            Commands::Check => execute::execute_check(&open_app().await?, output_mode).await,
        }
    }
}

/// Open the repository containing the current directory.
async fn open_app() -> Result<crate::app::App> {
    let app = crate::app::App::from_directory(&std::env::current_dir()?).await?;
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // ========== CLI Parsing Tests ==========

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["felt"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_global_json_flag() {
        let cli = Cli::try_parse_from(["felt", "ls", "-j"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::Ls(_))));

        let cli = Cli::try_parse_from(["felt", "--json", "ready"]).unwrap();
        assert!(cli.json);
    }

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from(["felt", "init"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Init)));
    }

    // ========== Add Tests ==========

    #[test]
    fn test_parse_add_minimal() {
        let cli = Cli::try_parse_from(["felt", "add", "  Write docs  "]).unwrap();
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.title, "Write docs");
                assert!(args.priority.is_none());
                assert!(args.status.is_none());
                assert!(args.depends_on.is_empty());
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_parse_add_full() {
        let cli = Cli::try_parse_from([
            "felt", "add", "Ship it", "-b", "Body", "-s", "active", "-k", "spec", "-p", "1",
            "-a", "design", "-a", "build", "-t", "q3", "-D", "2026-05-01", "-o", "Done",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.body.as_deref(), Some("Body"));
                assert_eq!(args.status, Some(StatusArg::Active));
                assert_eq!(args.kind.as_deref(), Some("spec"));
                assert_eq!(args.priority, Some(1));
                assert_eq!(args.depends_on, vec!["design", "build"]);
                assert_eq!(args.tags, vec!["q3"]);
                assert_eq!(args.due, NaiveDate::from_ymd_opt(2026, 5, 1));
                assert_eq!(args.outcome.as_deref(), Some("Done"));
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_parse_add_rejects_bad_values() {
        assert!(Cli::try_parse_from(["felt", "add", "T", "-p", "5"]).is_err());
        assert!(Cli::try_parse_from(["felt", "add", "T", "-s", "blocked"]).is_err());
        assert!(Cli::try_parse_from(["felt", "add", "T", "-D", "tomorrow"]).is_err());
        assert!(Cli::try_parse_from(["felt", "add", "   "]).is_err());
    }

    // ========== Edit Tests ==========

    #[test]
    fn test_parse_edit_without_flags_opens_editor() {
        let cli = Cli::try_parse_from(["felt", "edit", "abc"]).unwrap();
        match cli.command {
            Some(Commands::Edit(args)) => assert!(!args.has_modifications()),
            _ => panic!("Expected Edit command"),
        }
    }

    #[test]
    fn test_parse_edit_clear_due() {
        let cli = Cli::try_parse_from(["felt", "edit", "abc", "--due", ""]).unwrap();
        match cli.command {
            Some(Commands::Edit(args)) => {
                assert_eq!(args.due, Some(DueChange::Clear));
                assert!(args.has_modifications());
            }
            _ => panic!("Expected Edit command"),
        }
    }

    // ========== Query Command Tests ==========

    #[test]
    fn test_parse_ls_flags() {
        let cli = Cli::try_parse_from([
            "felt", "ls", "login", "-s", "untracked", "-t", "area:", "-t", "q3", "-n", "5",
            "-e", "-r", "--body",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Ls(args)) => {
                assert_eq!(args.query.as_deref(), Some("login"));
                assert_eq!(args.status, Some(StatusFilter::Untracked));
                assert_eq!(args.tags, vec!["area:", "q3"]);
                assert_eq!(args.recent, Some(5));
                assert!(args.exact && args.regex && args.body);
            }
            _ => panic!("Expected Ls command"),
        }
    }

    #[test]
    fn test_parse_graph_format() {
        let cli = Cli::try_parse_from(["felt", "graph"]).unwrap();
        match cli.command {
            Some(Commands::Graph(args)) => assert_eq!(args.format, GraphFormat::Mermaid),
            _ => panic!("Expected Graph command"),
        }

        let cli = Cli::try_parse_from(["felt", "graph", "-f", "dot"]).unwrap();
        match cli.command {
            Some(Commands::Graph(args)) => assert_eq!(args.format, GraphFormat::Dot),
            _ => panic!("Expected Graph command"),
        }
    }

    #[test]
    fn test_parse_traversal() {
        let cli = Cli::try_parse_from(["felt", "upstream", "abc", "--all", "-d", "summary"]).unwrap();
        match cli.command {
            Some(Commands::Upstream(args)) => {
                assert!(args.all);
                assert_eq!(args.detail, Some(DetailLevel::Summary));
            }
            _ => panic!("Expected Upstream command"),
        }

        assert!(Cli::try_parse_from(["felt", "downstream", "abc", "-d", "verbose"]).is_err());
    }

    // ========== Mutation Command Tests ==========

    #[test]
    fn test_parse_link_with_label() {
        let cli = Cli::try_parse_from(["felt", "link", "a", "b", "-l", "needs"]).unwrap();
        match cli.command {
            Some(Commands::Link(args)) => {
                assert_eq!(args.id, "a");
                assert_eq!(args.depends_on, "b");
                assert_eq!(args.label.as_deref(), Some("needs"));
            }
            _ => panic!("Expected Link command"),
        }
    }

    #[test]
    fn test_parse_on_off() {
        let cli = Cli::try_parse_from(["felt", "on", "a", "--reopen"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::On(args)) if args.reopen));

        let cli = Cli::try_parse_from(["felt", "off", "a", "-r", "shipped"]).unwrap();
        assert!(
            matches!(cli.command, Some(Commands::Off(args)) if args.reason.as_deref() == Some("shipped"))
        );
    }

    #[test]
    fn test_parse_tag_and_untag_share_args() {
        let cli = Cli::try_parse_from(["felt", "untag", "a", "x, y"]).unwrap();
        match cli.command {
            Some(Commands::Untag(args)) => assert_eq!(split_tags(&args.tags), vec!["x", "y"]),
            _ => panic!("Expected Untag command"),
        }
    }

    #[test]
    fn test_parse_check_and_path() {
        assert!(matches!(
            Cli::try_parse_from(["felt", "check"]).unwrap().command,
            Some(Commands::Check)
        ));
        assert!(Cli::try_parse_from(["felt", "path", "a"]).is_err());
    }
}
