//! Session handler for the ideaboard application
//!
//! This module reads command lines, drives the idea store and the CSV
//! transcoder, and reports outcomes through the notification surface.
use std::{
    fs::{read_to_string, File, OpenOptions},
    io::{stdout, BufRead, Write},
    path::{Path, PathBuf},
    process::Command,
};

use chrono::Utc;
use clap::{error::ErrorKind, Parser};
use log::{debug, info};
use shell_words::split;
use tempfile::Builder;

use crate::{
    content_preview, daily_activity, default_export_filename, export_to_file, import_from_csv,
    parse_instant, parse_tags, validate_structure, Commands, Config, Idea, IdeaStore, Notifier,
    PlanError, Priority, Result, SessionLine, Status,
};

/// Characters of content shown in list rows
const LIST_PREVIEW_CHARS: usize = 100;
/// Characters of content shown on pipeline cards
const CARD_PREVIEW_CHARS: usize = 80;
/// Tags shown on a pipeline card before collapsing into `+N`
const CARD_TAGS: usize = 2;

/// Whether the session should keep reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Session handler - owns the idea store for the lifetime of the session
pub struct App {
    /// The idea store, created with the session and dropped with it
    store: IdeaStore,

    /// Application configuration
    config: Config,

    /// Where `config --set`/`--reset` persist changes
    config_path: Option<PathBuf>,

    /// Source of command lines and confirmation answers
    input: Box<dyn BufRead>,

    /// Outcome messages
    notifier: Box<dyn Notifier>,

    /// Skip every confirmation prompt
    assume_yes: bool,

    /// Print a prompt before each command line
    show_prompt: bool,
}

impl App {
    /// Create a new session over the given store, input and notifier
    pub fn new(
        store: IdeaStore,
        config: Config,
        input: Box<dyn BufRead>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            config,
            config_path: None,
            input,
            notifier,
            assume_yes: false,
            show_prompt: false,
        }
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    pub fn show_prompt(mut self, show: bool) -> Self {
        self.show_prompt = show;
        self
    }

    pub fn store(&self) -> &IdeaStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reads and executes command lines until `quit` or end of input.
    ///
    /// A failing command is reported and the session continues.
    pub fn run_session(&mut self) -> Result<()> {
        info!("Session started");

        loop {
            if self.show_prompt {
                print!("ideaboard> ");
                stdout().flush()?;
            }

            let line = match self.read_line()? {
                Some(line) => line,
                None => break,
            };

            match self.run_line(&line) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => self.notifier.error(&e.to_string()),
            }
        }

        info!("Session ended with {} ideas in memory", self.store.len());
        Ok(())
    }

    /// Parses and executes a single command line
    pub fn run_line(&mut self, line: &str) -> Result<Flow> {
        let words = split(line).map_err(|e| PlanError::InvalidFormat {
            message: format!("Failed to parse command line: {}", e),
        })?;

        match words.first().map(String::as_str) {
            None => return Ok(Flow::Continue),
            Some(word) if word.starts_with('#') => return Ok(Flow::Continue),
            Some("quit") | Some("exit") => return Ok(Flow::Quit),
            _ => {}
        }

        match SessionLine::try_parse_from(&words) {
            Ok(parsed) => {
                self.run(parsed.command)?;
                Ok(Flow::Continue)
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::DisplayHelp
                        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                        | ErrorKind::DisplayVersion
                ) =>
            {
                println!("{}", e.render());
                Ok(Flow::Continue)
            }
            Err(e) => Err(PlanError::InvalidFormat {
                message: e.render().to_string(),
            }),
        }
    }

    /// Run the session with the given command
    pub fn run(&mut self, command: Commands) -> Result<()> {
        debug!("Running command: {:?}", command);

        match command {
            Commands::Add {
                title,
                content,
                edit,
                tags,
                status,
                priority,
            } => self.add_idea(title, content, edit, tags, status, priority)?,

            Commands::View { id, json } => self.view_idea(&id, json)?,

            Commands::List {
                status,
                tag,
                search,
                sort,
                descending,
                limit,
                json,
                detailed,
            } => self.list_ideas(ListOptions {
                status,
                tag,
                search,
                sort,
                descending,
                limit,
                json,
                detailed,
            })?,

            Commands::Search { query, limit, json } => self.handle_search(&query, limit, json)?,

            Commands::Edit {
                id,
                title,
                content,
                edit,
                status,
                priority,
                add_tags,
                remove_tags,
            } => self.handle_edit(EditOptions {
                id,
                title,
                content,
                open_editor: edit,
                status,
                priority,
                add_tags,
                remove_tags,
            })?,

            Commands::Move { id, status } => self.handle_move(&id, status)?,

            Commands::Delete { id, force } => self.handle_delete(&id, force)?,

            Commands::Pipeline => self.show_pipeline(),

            Commands::Stats { json } => self.show_stats(json)?,

            Commands::Export { output } => self.handle_export(output)?,

            Commands::Validate { file } => self.handle_validate(&file)?,

            Commands::Import { file, force } => self.handle_import(&file, force)?,

            Commands::Config { show, set, reset } => self.handle_config(show, set, reset)?,
        }

        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    /// Asks a yes/no question on the session input; end of input means no
    fn confirm(&mut self, question: &str) -> Result<bool> {
        if self.assume_yes || !self.config.confirm_destructive {
            return Ok(true);
        }

        print!("{} [y/N]: ", question);
        stdout().flush()?;

        let answer = self.read_line()?.unwrap_or_default().trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }

    fn add_idea(
        &mut self,
        title: String,
        content: Option<String>,
        open_editor: bool,
        tags: Option<String>,
        status: Status,
        priority: Priority,
    ) -> Result<()> {
        let content = match (content, open_editor) {
            (Some(_), true) => {
                return Err(PlanError::ApplicationError {
                    message: "Cannot specify both --content and --edit options".to_string(),
                })
            }
            (Some(c), false) => c,
            (None, true) => self.edit_in_editor(&title, "")?,
            (None, false) => {
                return Err(PlanError::ApplicationError {
                    message: "Content is required: pass --content or --edit".to_string(),
                })
            }
        };

        let (title, content) = required_fields(&title, &content)?;
        let idea = Idea::new(title, content, parse_tags(tags))
            .with_status(status)
            .with_priority(priority);
        let id = idea.id.clone();

        self.store.add(idea)?;
        self.notifier.success(&format!("New idea added with ID: {}", id));
        Ok(())
    }

    fn view_idea(&self, id: &str, json: bool) -> Result<()> {
        let idea = self
            .store
            .get(id)
            .ok_or_else(|| PlanError::IdeaNotFound { id: id.to_string() })?;

        if json {
            println!("{}", serde_json::to_string_pretty(idea)?);
        } else {
            print_idea(idea, true);
        }
        Ok(())
    }

    /// List ideas according to provided filters and options
    fn list_ideas(&self, options: ListOptions) -> Result<()> {
        // Step 1: Retrieve ideas based on filters
        let mut ideas = match &options.tag {
            Some(tag) => self.store.ideas_by_tag(tag),
            None => self.store.ideas().iter().collect(),
        };

        if let Some(status) = options.status {
            ideas.retain(|idea| idea.status == status);
        }

        if let Some(term) = &options.search {
            let term = term.to_lowercase();
            ideas.retain(|idea| {
                idea.title.to_lowercase().contains(&term)
                    || idea.content.to_lowercase().contains(&term)
            });
        }

        // Step 2: Sort ideas based on sort criteria
        sort_ideas(&mut ideas, &options.sort, options.descending);

        // Step 3: Apply limit
        if options.limit > 0 {
            ideas.truncate(options.limit);
        }

        // Step 4: Display ideas in requested format
        if options.json {
            print_ideas_json(&ideas, options.detailed)?;
        } else {
            print_ideas_text(&ideas, options.detailed);
        }
        Ok(())
    }

    fn handle_search(&self, query: &str, limit: usize, json: bool) -> Result<()> {
        let mut results = self.store.search(query);
        let total = results.len();

        // Apply limit if specified (0 means no limit)
        let truncated = limit > 0 && total > limit;
        if truncated {
            results.truncate(limit);
        }

        if json {
            return print_ideas_json(&results, true);
        }

        if results.is_empty() {
            println!("No ideas found matching query: \"{}\"", query);
            return Ok(());
        }

        print_ideas_text(&results, false);
        if truncated {
            println!("\n{}", truncation_note(results.len(), total));
        }
        Ok(())
    }

    fn handle_edit(&mut self, options: EditOptions) -> Result<()> {
        if options.content.is_some() && options.open_editor {
            return Err(PlanError::ApplicationError {
                message: "Cannot specify both --content and --edit options".to_string(),
            });
        }

        // Retrieve the existing idea
        let mut idea = self
            .store
            .get(&options.id)
            .cloned()
            .ok_or_else(|| PlanError::IdeaNotFound {
                id: options.id.clone(),
            })?;

        if let Some(title) = options.title {
            idea.title = title;
        }

        if let Some(content) = options.content {
            idea.content = content;
        } else if options.open_editor {
            idea.content = self.edit_in_editor(&idea.title, &idea.content)?;
        }

        if let Some(status) = options.status {
            idea.status = status;
        }

        if let Some(priority) = options.priority {
            idea.priority = priority;
        }

        // Add only tags that don't already exist
        for tag in parse_tags(options.add_tags) {
            if !idea.tags.contains(&tag) {
                idea.tags.push(tag);
            }
        }

        let remove = parse_tags(options.remove_tags);
        idea.tags.retain(|tag| !remove.contains(tag));

        let (title, content) = required_fields(&idea.title, &idea.content)?;
        idea.title = title;
        idea.content = content;
        idea.touch();

        let id = idea.id.clone();
        self.store.update(idea);
        self.notifier.success(&format!("Idea {} updated", id));
        Ok(())
    }

    fn handle_move(&mut self, id: &str, status: Status) -> Result<()> {
        if self.store.move_to_status(id, status)? {
            self.notifier
                .success(&format!("Idea {} moved to {}", id, status.label()));
        } else {
            self.notifier
                .warning(&format!("Idea {} is already in {}", id, status.label()));
        }
        Ok(())
    }

    fn handle_delete(&mut self, id: &str, force: bool) -> Result<()> {
        // Step 1: Fetch the idea to be deleted
        let idea = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| PlanError::IdeaNotFound { id: id.to_string() })?;

        // Step 2: Show idea details and ask for confirmation
        if !force {
            println!("You are about to delete the following idea:");
            print_idea(&idea, false);
            println!("\nThis action cannot be undone!");

            if !self.confirm("Are you sure you want to delete this idea?")? {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        // Step 3: Delete the idea
        self.store.remove(id);
        self.notifier
            .success(&format!("Idea '{}' ({}) removed", idea.title, idea.id));
        Ok(())
    }

    fn show_pipeline(&self) {
        let width = terminal_width().min(60);

        for status in Status::ALL {
            let column = self.store.ideas_by_status(status);
            println!(
                "{} ({})",
                console::style(status.label()).bold().underlined(),
                column.len()
            );

            if column.is_empty() {
                println!("  {}", console::style("(empty)").dim());
            }

            for idea in column {
                println!("  {} {}", console::style(&idea.title).bold(), console::style(&idea.id).dim());

                let preview = content_preview(&idea.content, CARD_PREVIEW_CHARS);
                if !preview.is_empty() {
                    println!("    {}", preview);
                }

                if !idea.tags.is_empty() {
                    let mut shown: Vec<String> = idea
                        .tags
                        .iter()
                        .take(CARD_TAGS)
                        .map(|tag| format!("#{}", tag))
                        .collect();
                    if idea.tags.len() > CARD_TAGS {
                        shown.push(format!("+{}", idea.tags.len() - CARD_TAGS));
                    }
                    println!("    {}", console::style(shown.join(" ")).cyan());
                }

                println!("    {}", console::style(display_date(&idea.created_at, "%Y-%m-%d")).dim());
            }

            println!("{}", "-".repeat(width));
        }
    }

    fn show_stats(&self, json: bool) -> Result<()> {
        let metrics = self.store.metrics();

        if json {
            println!("{}", serde_json::to_string_pretty(metrics)?);
            return Ok(());
        }

        println!("Ideaboard - Dashboard");
        println!("=====================");
        println!();
        println!("  Total ideas:  {}", metrics.total_ideas);
        println!("  This week:    {}", metrics.this_week);
        println!("  This month:   {}", metrics.this_month);
        println!();

        for status in Status::ALL {
            let percentage = metrics.percentage_for(status);
            println!(
                "  {:<10} {:>4}  {:>3}%  {}",
                status.label(),
                metrics.count_for(status),
                percentage,
                console::style("█".repeat(percentage / 5)).cyan()
            );
        }

        println!();
        println!("  Last 7 days");
        let activity = daily_activity(self.store.ideas(), Utc::now().date_naive(), 7);
        for (day, count) in activity {
            println!(
                "  {} {:>4}  {}",
                day.format("%a %m-%d"),
                count,
                console::style("█".repeat(count)).green()
            );
        }

        Ok(())
    }

    fn handle_export(&mut self, output: Option<PathBuf>) -> Result<()> {
        if self.store.is_empty() {
            self.notifier.warning("There are no ideas to export");
            return Ok(());
        }

        let path = output.unwrap_or_else(|| {
            self.config.export_dir.join(default_export_filename(
                &self.config.export_prefix,
                Utc::now().date_naive(),
            ))
        });

        let written = export_to_file(self.store.ideas(), &path)?;
        self.notifier.success(&format!(
            "Exported {} ideas to {}",
            self.store.len(),
            written.display()
        ));
        Ok(())
    }

    fn handle_validate(&mut self, file: &Path) -> Result<()> {
        validate_structure(open_csv(file)?)?;
        self.notifier
            .success(&format!("{} has the required columns", file.display()));
        Ok(())
    }

    fn handle_import(&mut self, file: &Path, force: bool) -> Result<()> {
        // Step 1: Check the header before touching anything
        validate_structure(open_csv(file)?)?;

        // Step 2: Import replaces everything, ask first
        if !force && !self.store.is_empty() {
            self.notifier.warning(&format!(
                "Importing replaces all {} existing ideas. Export a backup first if needed.",
                self.store.len()
            ));
            if !self.confirm("Replace every idea with the file contents?")? {
                println!("Import cancelled.");
                return Ok(());
            }
        }

        // Step 3: Parse every row; any failure leaves the store untouched
        let ideas = import_from_csv(open_csv(file)?)?;
        let count = ideas.len();

        self.store.set_all(ideas);
        self.notifier
            .success(&format!("{} ideas imported successfully", count));
        Ok(())
    }

    fn handle_config(&mut self, show: bool, set: Option<String>, reset: bool) -> Result<()> {
        let print = show || (set.is_none() && !reset);

        if reset {
            self.config = Config::default();
            self.persist_config()?;
        }

        if let Some(assignment) = set {
            self.config.set(&assignment)?;
            self.persist_config()?;
        }

        if print {
            println!("{}", serde_json::to_string_pretty(&self.config)?);
        }
        Ok(())
    }

    fn persist_config(&self) -> Result<()> {
        match self.config_path.clone().or_else(Config::default_path) {
            Some(path) => {
                self.config.save(&path)?;
                self.notifier
                    .success(&format!("Configuration saved to {}", path.display()));
            }
            None => self
                .notifier
                .warning("No configuration location available; change kept for this session"),
        }
        Ok(())
    }

    /// Opens `existing` in the configured editor and returns the edited text
    fn edit_in_editor(&self, title: &str, existing: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        write_editor_template(&temp_path, title, existing)?;

        info!("Opening editor to write idea content. Save and exit when done...");
        launch_editor(&self.config.get_editor_command(), &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(process_editor_content(&content, title))
    }
}

/// Filters and presentation for `list`
struct ListOptions {
    status: Option<Status>,
    tag: Option<String>,
    search: Option<String>,
    sort: String,
    descending: bool,
    limit: usize,
    json: bool,
    detailed: bool,
}

/// Changes requested by `edit`
struct EditOptions {
    id: String,
    title: Option<String>,
    content: Option<String>,
    open_editor: bool,
    status: Option<Status>,
    priority: Option<Priority>,
    add_tags: Option<String>,
    remove_tags: Option<String>,
}

/// Trims title and content, rejecting either one when empty
fn required_fields(title: &str, content: &str) -> Result<(String, String)> {
    let title = title.trim();
    let content = content.trim();

    if title.is_empty() {
        return Err(PlanError::ApplicationError {
            message: "Title is required".to_string(),
        });
    }
    if content.is_empty() {
        return Err(PlanError::ApplicationError {
            message: "Content is required".to_string(),
        });
    }

    Ok((title.to_string(), content.to_string()))
}

fn open_csv(path: &Path) -> Result<File> {
    if !path.is_file() {
        return Err(PlanError::FileNotFound {
            file_path: path.display().to_string(),
        });
    }
    Ok(File::open(path)?)
}

/// Sort ideas by specified criteria
fn sort_ideas(ideas: &mut [&Idea], sort_by: &str, descending: bool) {
    match sort_by {
        "title" => ideas.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase())),
        "id" => ideas.sort_by(|a, b| a.id.cmp(&b.id)),
        "status" => ideas.sort_by_key(|idea| {
            Status::ALL
                .iter()
                .position(|s| *s == idea.status)
                .unwrap_or(0)
        }),
        // Default is "date"; unparseable dates sort first
        _ => ideas.sort_by(|a, b| {
            a.created_instant()
                .cmp(&b.created_instant())
                .then_with(|| a.created_at.cmp(&b.created_at))
        }),
    }

    if descending {
        ideas.reverse();
    }
}

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Formats an ISO timestamp for display, falling back to the raw text
fn display_date(value: &str, format: &str) -> String {
    parse_instant(value)
        .map(|instant| instant.format(format).to_string())
        .unwrap_or_else(|| value.to_string())
}

fn print_idea(idea: &Idea, detailed: bool) {
    println!(
        "ID: {} | Status: {} | Priority: {} | Created: {}",
        idea.id,
        idea.status,
        idea.priority,
        display_date(&idea.created_at, "%Y-%m-%d %H:%M")
    );
    println!("Title: {}", console::style(&idea.title).bold());

    if !idea.tags.is_empty() {
        let tags = idea
            .tags
            .iter()
            .map(|tag| format!("#{}", tag))
            .collect::<Vec<_>>()
            .join(" ");
        println!("Tags: {}", console::style(tags).cyan());
    }

    if detailed {
        println!("\n{}", idea.content);
    } else {
        let preview = content_preview(&idea.content, LIST_PREVIEW_CHARS);
        if !preview.is_empty() {
            println!("\n{}", preview);
        }
    }
}

/// Display ideas in text format
fn print_ideas_text(ideas: &[&Idea], detailed: bool) {
    if ideas.is_empty() {
        println!("No ideas found matching the criteria.");
        return;
    }

    let width = terminal_width().min(50);
    for (i, idea) in ideas.iter().enumerate() {
        if i > 0 {
            println!("{}", "-".repeat(width));
        }
        print_idea(idea, detailed);
    }

    println!(
        "\nFound {} idea{}",
        ideas.len(),
        if ideas.len() == 1 { "" } else { "s" }
    );
}

/// Display ideas in JSON format
fn print_ideas_json(ideas: &[&Idea], detailed: bool) -> Result<()> {
    if detailed {
        println!("{}", serde_json::to_string_pretty(ideas)?);
        return Ok(());
    }

    // Simplified ideas without the content body
    let simplified: Vec<serde_json::Value> = ideas
        .iter()
        .map(|idea| {
            serde_json::json!({
                "id": idea.id,
                "title": idea.title,
                "status": idea.status,
                "priority": idea.priority,
                "tags": idea.tags,
                "createdAt": idea.created_at,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&simplified)?);
    Ok(())
}

fn write_editor_template(path: &Path, title: &str, existing: &str) -> Result<()> {
    let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;

    writeln!(file, "# {}", title)?;
    writeln!(file)?;
    writeln!(file, "<!-- ")?;
    writeln!(file, "Write the post text below.")?;
    writeln!(
        file,
        "Lines that start with <!-- and end with --> are comments and will be ignored."
    )?;
    writeln!(file, "Save and exit the editor when you're done.")?;
    writeln!(file, "-->")?;
    writeln!(file)?;
    if !existing.is_empty() {
        writeln!(file, "{}", existing)?;
    }

    Ok(())
}

fn launch_editor(editor_cmd: &str, file_path: &Path) -> Result<()> {
    // Handle shell-like command parsing
    let args = split(editor_cmd).map_err(|e| PlanError::EditorError {
        message: format!("Failed to parse editor command: {}", e),
    })?;

    let (program, rest) = args.split_first().ok_or_else(|| PlanError::EditorError {
        message: "Empty editor command".to_string(),
    })?;

    let status = Command::new(program)
        .args(rest)
        .arg(file_path)
        .status()
        .map_err(|e| PlanError::EditorError {
            message: format!("Failed to execute editor command: {}", e),
        })?;

    if !status.success() {
        return Err(PlanError::EditorError {
            message: "Editor exited with non-zero status".to_string(),
        });
    }

    Ok(())
}

/// Drops the title heading and the comment block written by the template
fn process_editor_content(content: &str, title: &str) -> String {
    let heading = format!("# {}", title);
    let mut in_comment = false;

    content
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if in_comment {
                in_comment = !trimmed.ends_with("-->");
                return false;
            }
            if trimmed.starts_with("<!--") {
                in_comment = !trimmed.ends_with("-->");
                return false;
            }
            trimmed != heading
        })
        .collect::<Vec<&str>>()
        .join("\n")
        .trim()
        .to_string()
}

fn truncation_note(shown: usize, total: usize) -> String {
    format!(
        "Showing {} of {} matching results. Use --limit to show more.",
        shown, total
    )
}
