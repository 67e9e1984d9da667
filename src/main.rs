//! # td - Taskdeck workspace client
//!
//! A terminal client for a Taskdeck team-workspace server: tasks, notes and
//! projects with search, filters, pinned-first sorting and an optional
//! terminal user interface (TUI).
//!
//! ## Key Features
//!
//! - **Server-backed collections**: the server owns all state; the client
//!   fetches full collections and never caches them across invocations
//! - **Derived views**: search, status/priority/assignee filters, pinned-first
//!   sorting by due date or priority, and subtask-derived progress, all
//!   computed locally over the loaded collection
//! - **Mutation intents**: create, update, status transitions, pin toggles and
//!   deletes are single requests to fixed endpoints; validation errors come
//!   back verbatim and successful mutations trigger a refetch
//! - **Multiple Interfaces**: full CLI for automation + interactive TUI
//!
//! ## Quick Start
//!
//! ```bash
//! # Point the client at your workspace and store the token
//! td config set --api-base https://deck.example.com --token <token>
//!
//! # Launch the interactive UI
//! td ui
//!
//! # List urgent open tasks, soonest due first
//! td tasks --priority urgent --sort due-date
//!
//! # Add a task
//! td add "Implement user authentication" --priority high --due "in 3d" --tag backend
//!
//! # Move it along the workflow
//! td status 42 in-progress
//! ```
//!
//! Connection settings live in `~/.taskdeck/config.json` and can be
//! overridden per invocation with `--api-base` / `--token` or the
//! `TASKDECK_API_BASE` / `TASKDECK_TOKEN` environment variables.

use clap::Parser;

pub mod api;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod fields;
pub mod note;
pub mod project;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
}

use api::ApiClient;
use cli::Cli;
use cmd::*;
use config::Config;

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_path);

    // Commands that don't need a server connection.
    match &cli.command {
        Commands::Completions { shell } => {
            cmd_completions(*shell);
            return;
        }
        Commands::Config { .. } => {
            if let Commands::Config { action } = cli.command {
                cmd_config(&config_path, action);
            }
            return;
        }
        _ => {}
    }

    // Resolve connection settings: config file, then flag/env overrides.
    let config = Config::load(&config_path);
    let api_base = cli.api_base.unwrap_or(config.api_base);
    let token = cli.token.or(config.token);
    let api = ApiClient::new(&api_base, token);

    match cli.command {
        Commands::Ui => cmd_ui(api),

        Commands::Tasks {
            search,
            status,
            priority,
            assignee,
            sort,
            direction,
            limit,
        } => cmd_tasks(&api, search, status, priority, assignee, sort, direction, limit),

        Commands::Add {
            title,
            desc,
            status,
            priority,
            due,
            tags,
            assignees,
        } => cmd_add(&api, title, desc, status, priority, due, tags, assignees),

        Commands::Update {
            id,
            title,
            desc,
            priority,
            due,
            tags,
            assignees,
        } => cmd_update(&api, id, title, desc, priority, due, tags, assignees),

        Commands::Status { id, status } => cmd_status(&api, id, status),

        Commands::Complete { id } => cmd_status(&api, id, fields::Status::Completed),

        Commands::Reopen { id } => cmd_status(&api, id, fields::Status::InProgress),

        Commands::Pin { id } => cmd_pin(&api, id),

        Commands::Delete { id, yes } => cmd_delete(&api, id, yes),

        Commands::Notes { search } => cmd_notes(&api, search),

        Commands::Note { action } => cmd_note(&api, action),

        Commands::Projects {
            search,
            status,
            sort_by,
            sort_order,
            page,
        } => cmd_projects(&api, search, status, sort_by, sort_order, page),

        Commands::Config { .. } => unreachable!("Config command handled above"),
        Commands::Completions { .. } => unreachable!("Completions command handled above"),
    }
}
