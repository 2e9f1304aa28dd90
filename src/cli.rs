use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::models::{Platform, Priority, ProjectCreate, TaskCreate};
use crate::utils::{date_to_datetime, parse_date};

#[derive(Parser)]
#[command(name = "shipcheck")]
#[command(about = "App-store submission tracker - a terminal dashboard")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// List all projects
    Projects,
    /// Quickly add a new project
    AddProject {
        /// Project name
        name: String,
        /// Target platform: ios, android or both
        #[arg(long, default_value = "both")]
        platform: String,
        /// Project description
        #[arg(long)]
        description: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Target publish date (YYYY-MM-DD)
        #[arg(long)]
        publish: Option<String>,
        /// Skip generating the default task list
        #[arg(long)]
        no_default_tasks: bool,
    },
    /// Quickly add a task to a project
    AddTask {
        /// Project id
        project_id: String,
        /// Task title
        title: String,
        /// Workflow phase number (1-based)
        #[arg(long, default_value_t = 1)]
        phase: i64,
        /// Priority: low, medium or high
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// Ask the submission assistant a question about a project
    Chat {
        /// Project id
        project_id: String,
        /// The question
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("API error: {0}")]
    ApiError(#[from] ApiError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

fn parse_platform(value: &str) -> Result<Platform, CliError> {
    match value.to_ascii_lowercase().as_str() {
        "ios" => Ok(Platform::Ios),
        "android" => Ok(Platform::Android),
        "both" => Ok(Platform::Both),
        other => Err(CliError::InvalidArgument(format!(
            "unknown platform '{}', expected ios, android or both",
            other
        ))),
    }
}

fn parse_priority(value: &str) -> Result<Priority, CliError> {
    match value.to_ascii_lowercase().as_str() {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        other => Err(CliError::InvalidArgument(format!(
            "unknown priority '{}', expected low, medium or high",
            other
        ))),
    }
}

fn parse_cli_date(value: &str) -> Result<chrono::DateTime<chrono::Utc>, CliError> {
    parse_date(value)
        .map(date_to_datetime)
        .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", value, e)))
}

/// Handle the projects command
pub fn handle_projects(client: &ApiClient) -> Result<(), CliError> {
    let projects = client.list_projects()?;
    if projects.is_empty() {
        println!("No projects yet.");
        return Ok(());
    }
    for project in projects {
        println!(
            "{}  {:<24} {:<8} {}",
            project.id,
            project.name,
            project.platform.as_str(),
            project.status.label()
        );
    }
    Ok(())
}

/// Handle the add-project command
pub fn handle_add_project(
    name: String,
    platform: String,
    description: Option<String>,
    start: Option<String>,
    publish: Option<String>,
    no_default_tasks: bool,
    client: &ApiClient,
) -> Result<(), CliError> {
    let input = ProjectCreate {
        name,
        platform: parse_platform(&platform)?,
        description,
        start_date: start.as_deref().map(parse_cli_date).transpose()?,
        publish_date: publish.as_deref().map(parse_cli_date).transpose()?,
        auto_generate_tasks: !no_default_tasks,
    };

    let project = client.create_project(&input)?;
    println!("Project created successfully (ID: {})", project.id);

    Ok(())
}

/// Handle the add-task command
pub fn handle_add_task(
    project_id: String,
    title: String,
    phase: i64,
    priority: String,
    due: Option<String>,
    client: &ApiClient,
) -> Result<(), CliError> {
    // Resolve the phase name from the workflow reference data
    let phases = client.phases()?;
    let phase_name = phases
        .iter()
        .find(|p| p.phase_number == phase)
        .map(|p| p.phase_name.clone())
        .ok_or_else(|| CliError::InvalidArgument(format!("unknown phase number {}", phase)))?;

    let input = TaskCreate {
        project_id,
        title,
        description: None,
        phase: phase_name,
        phase_number: Some(phase),
        due_date: due.as_deref().map(parse_cli_date).transpose()?,
        priority: parse_priority(&priority)?,
    };

    let task = client.create_task(&input)?;
    println!("Task created successfully (ID: {})", task.id);

    Ok(())
}

/// Handle the chat command
pub fn handle_chat(
    project_id: String,
    message: String,
    client: &ApiClient,
) -> Result<(), CliError> {
    let exchange = client.ai_chat(&project_id, &message)?;
    println!("{}", exchange.ai_response);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn platform_and_priority_args_are_case_insensitive() {
        assert_eq!(parse_platform("iOS").unwrap(), Platform::Ios);
        assert_eq!(parse_platform("BOTH").unwrap(), Platform::Both);
        assert!(parse_platform("windows").is_err());

        assert_eq!(parse_priority("High").unwrap(), Priority::High);
        assert!(parse_priority("urgent").is_err());
    }

    #[test]
    fn cli_dates_become_utc_midnight() {
        let parsed = parse_cli_date("2026-09-01").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-09-01T00:00:00+00:00");
        assert!(parse_cli_date("tomorrow").is_err());
    }
}
