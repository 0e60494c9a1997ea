//! Taskdash CLI - task dashboard over an in-memory store.

mod config;
mod seed;
mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use taskdash_analytics::{export_file_name, paginate, AssignmentFilter, DashboardStats, TaskSummary};
use taskdash_core::{
    Clock, FixedClock, SystemClock, Task, TaskDraft, TaskFilter, TaskId, TaskPriority, TaskStatus,
    UserId,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::DashboardConfig;
use session::{ListQuery, Session};

#[derive(Parser)]
#[command(name = "taskdash")]
#[command(about = "Task dashboard with analytics and CSV export", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Email of the user to act as
    #[arg(long = "as", global = true)]
    as_user: Option<String>,

    /// Pin the clock to an RFC 3339 timestamp
    #[arg(long, global = true)]
    now: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: usize,
    },
    /// Show task details
    Show {
        /// Task ID
        id: String,
    },
    /// Dashboard statistics
    Stats,
    /// Per-member statistics (admins only)
    Team,
    /// Export the task list as CSV
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output file; defaults to tasks-<date>.csv, `-` for stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Add a new task
    Add {
        /// Title
        title: String,
        /// Description
        #[arg(long)]
        description: String,
        #[command(flatten)]
        fields: TaskArgs,
    },
    /// Edit fields of an existing task
    Edit {
        /// Task ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        fields: TaskArgs,
        /// Remove the assignee
        #[arg(long, conflicts_with = "assignee")]
        unassign: bool,
    },
    /// Change a task's status
    SetStatus {
        /// Task ID
        id: String,
        /// pending, in_progress or completed
        status: String,
    },
    /// Comment on a task
    Comment {
        /// Task ID
        id: String,
        /// Comment text
        content: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Run subcommands from a file (or stdin), one per line, in one session
    Script {
        /// Script file; stdin when absent or `-`
        file: Option<PathBuf>,
    },
}

/// One line of a script: a subcommand without the global flags.
#[derive(Parser)]
#[command(name = "taskdash", no_binary_name = true)]
struct ScriptLine {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Filter by status
    #[arg(long)]
    status: Option<String>,
    /// Filter by priority
    #[arg(long)]
    priority: Option<String>,
    /// Filter by assignee email
    #[arg(long)]
    assignee: Option<String>,
    /// Search title, description and categories
    #[arg(long)]
    search: Option<String>,
    /// Due on or after (YYYY-MM-DD); needs --due-to
    #[arg(long, requires = "due_to")]
    due_from: Option<NaiveDate>,
    /// Due on or before (YYYY-MM-DD); needs --due-from
    #[arg(long, requires = "due_from")]
    due_to: Option<NaiveDate>,
    /// all, assigned or unassigned
    #[arg(long, default_value = "all")]
    assignment: String,
}

#[derive(clap::Args)]
struct TaskArgs {
    /// low, medium or high
    #[arg(long)]
    priority: Option<String>,
    /// pending, in_progress or completed
    #[arg(long)]
    status: Option<String>,
    /// Assignee email
    #[arg(long)]
    assignee: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    due: Option<NaiveDate>,
    /// Category (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,
    /// Estimated hours
    #[arg(long)]
    hours: Option<f64>,
    /// Progress percentage
    #[arg(long)]
    progress: Option<u8>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = DashboardConfig::load(cli.config.as_deref())?;
    init_logging(&config.log_level);

    let clock: Arc<dyn Clock> = match &cli.now {
        Some(now) => {
            let now = DateTime::parse_from_rfc3339(now)
                .with_context(|| format!("invalid --now: {}", now))?
                .with_timezone(&Utc);
            debug!("Clock pinned to {}", now);
            Arc::new(FixedClock::new(now))
        }
        None => Arc::new(SystemClock),
    };

    let session = Session::open(&config, cli.as_user.as_deref(), clock)?;

    match cli.command {
        Commands::Script { file } => {
            let script = read_script(file.as_deref())?;
            run_script(&session, &config, cli.json, &script).await
        }
        command => run(&session, &config, cli.json, command).await,
    }
}

async fn run(session: &Session, config: &DashboardConfig, json: bool, command: Commands) -> Result<()> {
    match command {
        Commands::List { filter, page } => {
            let query = list_query(session, filter)?;
            let tasks = session.list(&query).await;
            let summary = TaskSummary::of(&tasks);
            let page = paginate(&tasks, page, config.page_size);

            if json {
                print_json(&serde_json::json!({
                    "summary": summary,
                    "page": page.number,
                    "totalPages": page.total_pages,
                    "tasks": page.items,
                }))?;
                return Ok(());
            }

            println!(
                "Tasks ({}) - {} pending, {} in progress, {} completed",
                summary.total, summary.pending, summary.in_progress, summary.completed
            );
            for task in page.items {
                println!("  {}", format_row(task));
            }
            if page.total_pages > 1 {
                println!("Page {} of {}", page.number, page.total_pages);
            }
        }
        Commands::Show { id } => {
            let task = session.show(&TaskId::from(id.as_str())).await?;
            if json {
                print_json(&task)?;
            } else {
                print_task(&task);
            }
        }
        Commands::Stats => {
            let stats = session.stats().await;
            if json {
                print_json(&stats)?;
            } else {
                print_stats(&session.current_user().name, &stats);
            }
        }
        Commands::Team => {
            let team = session.team().await?;
            if json {
                let rows: Vec<_> = team
                    .iter()
                    .map(|(user, stats)| {
                        serde_json::json!({
                            "name": user.name,
                            "email": user.email,
                            "role": user.role,
                            "stats": stats,
                        })
                    })
                    .collect();
                print_json(&rows)?;
                return Ok(());
            }

            println!("Team ({})", team.len());
            for (user, stats) in team {
                println!(
                    "  {} <{}> | {} total | {} assigned | {} completed | {}%",
                    user.name,
                    user.email,
                    stats.total,
                    stats.assigned,
                    stats.completed,
                    stats.completion_rate,
                );
            }
        }
        Commands::Export { filter, out } => {
            let query = list_query(session, filter)?;
            let csv = session.export(&query).await;
            let out = out.unwrap_or_else(|| PathBuf::from(export_file_name(session.now().date_naive())));

            if out.as_os_str() == "-" {
                print!("{}", csv);
                return Ok(());
            }

            std::fs::write(&out, &csv).with_context(|| format!("writing {}", out.display()))?;
            let rows = csv.lines().count().saturating_sub(1);
            info!("Exported {} rows to {}", rows, out.display());
            if json {
                print_json(&export_report(&out, rows))?;
            } else {
                println!("Exported to {}", out.display());
            }
        }
        Commands::Add {
            title,
            description,
            fields,
        } => {
            let mut draft = TaskDraft::new(title, description);
            fields.apply(session, &mut draft)?;
            let task = session.add(draft).await?;
            if json {
                print_json(&task)?;
            } else {
                println!("Added task: {} - {}", task.id, task.title);
            }
        }
        Commands::Edit {
            id,
            title,
            description,
            fields,
            unassign,
        } => {
            let id = TaskId::from(id.as_str());
            let current = session.show(&id).await?;
            let mut draft = TaskDraft::from(&current);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            fields.apply(session, &mut draft)?;
            if unassign {
                draft.assigned_to = None;
            }

            let patch = draft.into_patch(session.users())?;
            let task = session.edit(&id, patch).await?;
            if json {
                print_json(&task)?;
            } else {
                println!("Updated task: {} ({} activities)", task.id, task.activities.len());
            }
        }
        Commands::SetStatus { id, status } => {
            let status: TaskStatus = status.parse()?;
            let task = session.set_status(&TaskId::from(id.as_str()), status).await?;
            if json {
                print_json(&task)?;
            } else {
                println!("{} is now {}", task.id, task.status.label());
            }
        }
        Commands::Comment { id, content } => {
            let task = session.comment(&TaskId::from(id.as_str()), &content).await?;
            if json {
                print_json(&task.comments)?;
            } else {
                println!("Commented on {} ({} comments)", task.id, task.comments.len());
            }
        }
        Commands::Delete { id } => {
            let id = TaskId::from(id.as_str());
            session.delete(&id).await?;
            if json {
                print_json(&serde_json::json!({ "deleted": id }))?;
            } else {
                println!("Deleted task: {}", id);
            }
        }
        Commands::Script { .. } => bail!("scripts cannot run other scripts"),
    }

    Ok(())
}

fn read_script(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display())),
        _ => std::io::read_to_string(std::io::stdin()).context("reading script from stdin"),
    }
}

/// Run each non-blank, non-`#` line as a subcommand. Stops at the first failure.
async fn run_script(session: &Session, config: &DashboardConfig, json: bool, script: &str) -> Result<()> {
    for (n, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let words = split_words(line).with_context(|| format!("line {}", n + 1))?;
        let parsed = ScriptLine::try_parse_from(words)
            .with_context(|| format!("line {}: {}", n + 1, line))?;
        debug!("Script line {}: {}", n + 1, line);
        run(session, config, json, parsed.command)
            .await
            .with_context(|| format!("line {}: {}", n + 1, line))?;
    }
    Ok(())
}

/// Split a script line into words. Single quotes are literal; double quotes
/// and bare words honour backslash escapes.
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => word.push(c),
                        None => bail!("unterminated single quote"),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c) => word.push(c),
                            None => bail!("unterminated double quote"),
                        },
                        Some(c) => word.push(c),
                        None => bail!("unterminated double quote"),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(c) = chars.next() {
                    word.push(c);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                word.push(c);
            }
        }
    }

    if in_word {
        words.push(word);
    }
    Ok(words)
}

fn export_report(out: &Path, rows: usize) -> serde_json::Value {
    serde_json::json!({
        "path": out.display().to_string(),
        "rows": rows,
    })
}

/// Log to stderr so stdout stays clean for CSV and JSON output.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_user(session: &Session, email: &str) -> Result<UserId> {
    session
        .users()
        .find_by_email(email)
        .map(|u| u.id.clone())
        .ok_or_else(|| anyhow!("unknown user: {}", email))
}

fn list_query(session: &Session, args: FilterArgs) -> Result<ListQuery> {
    let filter = TaskFilter {
        status: args.status.map(|s| s.parse()).transpose()?,
        priority: args.priority.map(|p| p.parse()).transpose()?,
        assigned_to: args
            .assignee
            .map(|email| resolve_user(session, &email))
            .transpose()?,
        search_query: args.search,
        due_date_from: args.due_from,
        due_date_to: args.due_to,
    };
    Ok(ListQuery {
        filter,
        assignment: args.assignment.parse::<AssignmentFilter>()?,
    })
}

impl TaskArgs {
    fn apply(self, session: &Session, draft: &mut TaskDraft) -> Result<()> {
        if let Some(priority) = self.priority {
            draft.priority = priority.parse::<TaskPriority>()?;
        }
        if let Some(status) = self.status {
            draft.status = status.parse()?;
        }
        if let Some(email) = self.assignee {
            draft.assigned_to = Some(resolve_user(session, &email)?);
        }
        if self.due.is_some() {
            draft.due_date = self.due;
        }
        if !self.categories.is_empty() {
            draft.categories = self.categories;
        }
        if self.hours.is_some() {
            draft.estimated_hours = self.hours;
        }
        if self.progress.is_some() {
            draft.progress = self.progress;
        }
        Ok(())
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_row(task: &Task) -> String {
    format!(
        "{} | {} | {} | {} | {} - {}",
        task.id,
        task.status.label(),
        task.display_priority(),
        task.assigned_to_name.as_deref().unwrap_or("Unassigned"),
        task.primary_category().unwrap_or("-"),
        task.title,
    )
}

fn print_task(task: &Task) {
    println!("Task: {}", task.id);
    println!("  Title: {}", task.title);
    println!("  Description: {}", task.description);
    println!("  Status: {}", task.status.label());
    println!("  Priority: {}", task.display_priority());
    println!(
        "  Assignee: {}",
        task.assigned_to_name.as_deref().unwrap_or("Unassigned")
    );
    if let Some(due) = task.due_date {
        println!("  Due: {}", due);
    }
    if let Some(categories) = &task.categories {
        println!("  Categories: {}", categories.join(", "));
    }
    println!("  Progress: {}%", task.progress.unwrap_or(0));
    if let Some(hours) = task.estimated_hours {
        println!("  Estimated hours: {}", hours);
    }
    println!("  Created: {}", task.created_at);
    println!("  Updated: {}", task.updated_at);

    if !task.comments.is_empty() {
        println!("  Comments:");
        for c in &task.comments {
            println!("    [{}] {}: {}", c.created_at, c.user_name, c.content);
        }
    }
    if !task.activities.is_empty() {
        println!("  Activity:");
        for a in &task.activities {
            let change = match (&a.old_value, &a.new_value) {
                (Some(old), Some(new)) => format!(" ({} -> {})", old, new),
                (None, Some(new)) => format!(" ({})", new),
                _ => String::new(),
            };
            println!("    [{}] {} {}{}", a.timestamp, a.user_name, a.action, change);
        }
    }
}

fn print_stats(viewer: &str, stats: &DashboardStats) {
    println!("Dashboard ({})", viewer);
    println!("  Total tasks: {}", stats.total_tasks);
    println!("  Completion rate: {}%", stats.completion_rate);
    println!("  Average progress: {}%", stats.avg_progress);
    println!(
        "  Hours: {} estimated, {} completed",
        stats.total_hours, stats.completed_hours
    );
    println!("  Overdue: {}", stats.overdue_tasks);
    println!("  Due this week: {}", stats.due_this_week);

    println!("  By status:");
    for status in TaskStatus::ALL {
        println!("    {}: {}", status.label(), stats.status_counts.get(status));
    }
    println!("  By priority:");
    for priority in TaskPriority::ALL {
        println!("    {}: {}", priority, stats.priority_counts.get(priority));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn session() -> Session {
        let now = DateTime::parse_from_rfc3339("2024-01-21T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Session::open(&DashboardConfig::default(), None, Arc::new(FixedClock::new(now))).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
        ScriptLine::command().debug_assert();
    }

    #[test]
    fn test_due_window_flags_come_in_pairs() {
        assert!(Cli::try_parse_from(["taskdash", "list", "--due-from", "2024-01-20"]).is_err());
        assert!(Cli::try_parse_from(["taskdash", "export", "--due-to", "2024-01-26"]).is_err());
        assert!(Cli::try_parse_from([
            "taskdash",
            "list",
            "--due-from",
            "2024-01-20",
            "--due-to",
            "2024-01-26",
        ])
        .is_ok());
    }

    #[test]
    fn test_split_words() {
        assert_eq!(
            split_words(r#"add "Write notes" --description 'For "v1"' --category a\ b"#).unwrap(),
            vec!["add", "Write notes", "--description", r#"For "v1""#, "--category", "a b"]
        );
        assert_eq!(split_words("comment 1 ''").unwrap(), vec!["comment", "1", ""]);
        assert!(split_words("comment 1 \"open").is_err());
        assert!(split_words("comment 1 'open").is_err());
    }

    #[test]
    fn test_export_report() {
        let report = export_report(Path::new("tasks-2024-01-21.csv"), 6);
        assert_eq!(report["path"], "tasks-2024-01-21.csv");
        assert_eq!(report["rows"], 6);
    }

    #[tokio::test]
    async fn test_script_mutations_share_one_session() {
        let session = session();
        let script = r#"
            # seeded with six tasks
            add "Write release notes" --description "For v1.0" --priority low
            set-status 1 completed
            comment 1 "Shipped"
            delete 6
        "#;
        run_script(&session, &DashboardConfig::default(), false, script)
            .await
            .unwrap();

        let tasks = session.visible().await;
        assert_eq!(tasks.len(), 6);
        assert!(tasks.iter().any(|t| t.title == "Write release notes"));
        assert!(tasks.iter().all(|t| t.id != TaskId::from("6")));

        let task = session.show(&TaskId::from("1")).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.activities.len(), 1);
        assert_eq!(task.comments[0].content, "Shipped");
    }

    #[tokio::test]
    async fn test_script_stops_at_first_failure() {
        let session = session();
        let script = "delete 6\ndelete missing\ndelete 5\n";
        let err = run_script(&session, &DashboardConfig::default(), true, script)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
        // Line 3 never ran.
        assert!(session.show(&TaskId::from("5")).await.is_ok());

        let err = run_script(&session, &DashboardConfig::default(), false, "script other.txt")
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("cannot run other scripts"));
    }
}
