//! Shared types for the ideaboard application.
//!
//! This module holds the crate-wide Result alias and the commands accepted
//! by an interactive session.
use std::path::PathBuf;

use clap::Subcommand;

use crate::{PlanError, Priority, Status};

/// A specialized Result type for ideaboard operations.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Available session commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new idea
    Add {
        /// Title of the idea
        #[clap(short = 'T', long)]
        title: String,

        /// Text of the post
        #[clap(short, long)]
        content: Option<String>,

        /// Write the content in an editor before saving
        #[clap(short, long)]
        edit: bool,

        /// Tags to associate with the idea (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,

        /// Initial pipeline status
        #[clap(short, long, value_enum, default_value_t = Status::Draft)]
        status: Status,

        /// Priority
        #[clap(short, long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
    },

    /// Show one idea
    View {
        /// ID of the idea to view
        id: String,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// List ideas with optional filtering
    List {
        /// Only ideas in this status
        #[clap(short, long, value_enum)]
        status: Option<Status>,

        /// Filter ideas by tag
        #[clap(short, long)]
        tag: Option<String>,

        /// Only ideas whose title or content contains this text
        #[clap(short = 'q', long)]
        search: Option<String>,

        /// Sort key
        #[clap(long, value_parser = ["date", "title", "id", "status"], default_value = "date")]
        sort: String,

        /// Reverse the sort order
        #[clap(short, long)]
        descending: bool,

        /// Limit the number of ideas shown (0 shows all)
        #[clap(short = 'n', long, default_value_t = 0)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,

        /// Show full content instead of a preview
        #[clap(long)]
        detailed: bool,
    },

    /// Fuzzy search over titles and content
    Search {
        /// Search query text
        query: String,

        /// Limit the number of search results
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Edit an existing idea
    Edit {
        /// ID of the idea to edit
        id: String,

        /// New title
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content
        #[clap(short, long)]
        content: Option<String>,

        /// Open the current content in an editor
        #[clap(short, long)]
        edit: bool,

        /// New status
        #[clap(short, long, value_enum)]
        status: Option<Status>,

        /// New priority
        #[clap(short, long, value_enum)]
        priority: Option<Priority>,

        /// Tags to add (comma-separated)
        #[clap(long)]
        add_tags: Option<String>,

        /// Tags to remove (comma-separated)
        #[clap(long)]
        remove_tags: Option<String>,
    },

    /// Move an idea to another pipeline stage
    Move {
        /// ID of the idea to move
        id: String,

        /// Target status
        #[clap(value_enum)]
        status: Status,
    },

    /// Delete an idea by ID
    Delete {
        /// ID of the idea to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Show the pipeline board
    Pipeline,

    /// Show dashboard metrics
    Stats {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Export every idea to a CSV file
    Export {
        /// Destination file (defaults to the configured export directory)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that a CSV file has the required columns
    Validate {
        /// Path to the CSV file
        file: PathBuf,
    },

    /// Replace every idea with the contents of a CSV file
    Import {
        /// Path to the CSV file
        file: PathBuf,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Update a configuration setting (key=value)
        #[clap(short, long)]
        set: Option<String>,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}
