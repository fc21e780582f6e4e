//! Reqsync CLI - terminal client for a requirements-management service

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqsync_core::api::{ApiClient, ProjectDraft, RequirementState, User};
use reqsync_core::config::Config;
use reqsync_core::error::Error;
use reqsync_core::session::SessionStore;
use reqsync_core::workspace::Workspace;
use tracing::warn;

#[derive(Parser)]
#[command(name = "reqsync")]
#[command(author, version, about = "Terminal client for a requirements-management service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account on the service
    Register {
        /// Display name
        name: String,
        /// Account email
        email: String,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Log in and store the session token
    Login {
        /// Account email
        email: String,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Discard the stored session token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Choose the project requirements are scoped to
    Select {
        /// Project id (omit to clear the selection)
        project_id: Option<String>,
    },

    /// Manage the selected project's requirements
    Requirements {
        #[command(subcommand)]
        action: RequirementAction,
    },

    /// Generate the requirements document (DRS) for the selected project
    Generate,

    /// Show the last generated document
    Document,

    /// Show session, selection, and requirement count
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum ProjectAction {
    /// List all projects
    List,
    /// Show project details
    Show { id: String },
    /// Create a new project
    Create {
        /// Project name
        name: String,
        #[arg(short, long)]
        description: String,
        #[arg(short, long)]
        scope: String,
        #[arg(long)]
        perspective: Option<String>,
        #[arg(long)]
        functions: Option<String>,
        #[arg(long)]
        constraints: Option<String>,
    },
    /// Update a project
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        scope: Option<String>,
        #[arg(long)]
        perspective: Option<String>,
        #[arg(long)]
        functions: Option<String>,
        #[arg(long)]
        constraints: Option<String>,
    },
    /// Delete a project
    Delete { id: String },
}

#[derive(Subcommand)]
enum RequirementAction {
    /// List the selected project's requirements
    List {
        /// Also fetch each requirement's change history
        #[arg(long)]
        history: bool,
    },
    /// Create a requirement in the selected project
    Create {
        /// Requirement title
        title: String,
        #[arg(short, long)]
        description: String,
        /// Requirement version
        #[arg(short, long, default_value = "1.0")]
        version: String,
    },
    /// Update a requirement
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        version: Option<String>,
    },
    /// Delete a requirement
    Delete { id: String },
    /// Move a requirement to a new state
    SetState {
        id: String,
        /// Target state (e.g. Aprovado / approved)
        state: String,
    },
    /// Show a requirement's change history
    History { id: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reqsync=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => cmd_register(&name, &email, password, cli.quiet).await,

        Commands::Login { email, password } => cmd_login(&email, password, cli.quiet).await,

        Commands::Logout => cmd_logout(cli.quiet),

        Commands::Whoami => cmd_whoami().await,

        Commands::Projects { action } => cmd_projects(action, cli.quiet).await,

        Commands::Select { project_id } => cmd_select(project_id, cli.quiet).await,

        Commands::Requirements { action } => cmd_requirements(action, cli.quiet).await,

        Commands::Generate => cmd_generate(cli.quiet).await,

        Commands::Document => cmd_document(),

        Commands::Status => cmd_status().await,

        Commands::Config { action } => cmd_config(action, cli.quiet),

        Commands::Doctor => cmd_doctor(cli.quiet).await,
    }
}

// ============================================================================
// Shared plumbing
// ============================================================================

fn load_env() -> anyhow::Result<(Config, SessionStore)> {
    let config = Config::load()?;
    let store = SessionStore::open()?;
    Ok((config, store))
}

fn public_client(config: &Config) -> anyhow::Result<ApiClient> {
    Ok(ApiClient::from_config(config)?)
}

/// Session guard shared by every protected command
///
/// A missing token fails here, before any request goes out; an invalid one
/// fails on the `/auth/me` probe that follows.
async fn authed_client(config: &Config, store: &SessionStore) -> anyhow::Result<(ApiClient, User)> {
    let token = store.require_token()?;
    let client = ApiClient::from_config(config)?.with_token(token);
    let user = client.me().await?;
    Ok((client, user))
}

async fn open_workspace(config: &Config, store: SessionStore, client: &ApiClient) -> Workspace {
    Workspace::attach(
        Arc::new(client.clone()),
        store,
        Duration::from_secs(config.generation.timeout_secs),
    )
    .await
}

fn resolve_password(flag: Option<String>) -> anyhow::Result<String> {
    match flag {
        Some(password) => Ok(password),
        None => {
            let mut editor = rustyline::DefaultEditor::new()?;
            let line = editor.readline("Password: ")?;
            Ok(line.trim().to_string())
        }
    }
}

fn parse_state(input: &str) -> Result<RequirementState, Error> {
    RequirementState::parse(input).ok_or_else(|| {
        let valid = RequirementState::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Error::InvalidInput(format!(
            "unknown state '{}'. Valid states: {}",
            input, valid
        ))
    })
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_register(
    name: &str,
    email: &str,
    password: Option<String>,
    quiet: bool,
) -> anyhow::Result<()> {
    let password = resolve_password(password)?;
    let (config, _store) = load_env()?;
    let client = public_client(&config)?;

    client.register(name, email, &password).await?;

    if !quiet {
        println!("Account created for {}.", email);
        println!("\nNext: run `reqsync login {}` to start a session.", email);
    }
    Ok(())
}

async fn cmd_login(email: &str, password: Option<String>, quiet: bool) -> anyhow::Result<()> {
    let password = resolve_password(password)?;
    let (config, mut store) = load_env()?;
    let client = public_client(&config)?;

    let token = client.login(email, &password).await?;
    store.set_token(&token)?;

    // greet with the profile the dashboard showed on arrival
    match client.with_token(token).me().await {
        Ok(user) => {
            if !quiet {
                println!("Logged in as {}.", user.name);
            }
        }
        Err(err) => {
            warn!(error = %err, "could not fetch the user profile after login");
            if !quiet {
                println!("Logged in.");
            }
        }
    }
    Ok(())
}

fn cmd_logout(quiet: bool) -> anyhow::Result<()> {
    let mut store = SessionStore::open()?;
    store.clear_token()?;
    if !quiet {
        println!("Logged out.");
    }
    Ok(())
}

async fn cmd_whoami() -> anyhow::Result<()> {
    let (config, store) = load_env()?;
    let (_client, user) = authed_client(&config, &store).await?;

    println!("{}", user.name);
    if let Some(email) = user.email {
        println!("{}", email);
    }
    Ok(())
}

async fn cmd_projects(action: ProjectAction, quiet: bool) -> anyhow::Result<()> {
    let (config, store) = load_env()?;
    let (client, _user) = authed_client(&config, &store).await?;

    match action {
        ProjectAction::List => {
            let projects = client.list_projects().await?;
            if projects.is_empty() {
                if !quiet {
                    println!("No projects found.");
                    println!(
                        "\nCreate one with: reqsync projects create <name> --description <text> --scope <text>"
                    );
                }
            } else {
                if !quiet {
                    println!("Projects:");
                }
                let selected = store.selected_project();
                for p in &projects {
                    let marker = if selected == Some(p.id.as_str()) {
                        " (selected)"
                    } else {
                        ""
                    };
                    println!("  {} - {}{}", p.id, p.name, marker);
                }
            }
        }
        ProjectAction::Show { id } => {
            let project = client
                .list_projects()
                .await?
                .into_iter()
                .find(|p| p.id == id)
                .ok_or(Error::ProjectNotFound(id))?;

            println!("Project: {}", project.name);
            println!("  ID: {}", project.id);
            println!("  Description: {}", project.description);
            println!("  Scope: {}", project.scope);
            if let Some(perspective) = &project.perspective {
                println!("  Perspective: {}", perspective);
            }
            if let Some(functions) = &project.functions {
                println!("  Functions: {}", functions);
            }
            if let Some(constraints) = &project.constraints {
                println!("  Constraints: {}", constraints);
            }
        }
        ProjectAction::Create {
            name,
            description,
            scope,
            perspective,
            functions,
            constraints,
        } => {
            let draft = ProjectDraft {
                name,
                description,
                scope,
                perspective,
                functions,
                constraints,
            };
            client.create_project(&draft).await?;
            if !quiet {
                println!("Project '{}' created.", draft.name);
                println!("\nNext: run `reqsync select <project-id>` to work on it.");
            }
        }
        ProjectAction::Update {
            id,
            name,
            description,
            scope,
            perspective,
            functions,
            constraints,
        } => {
            // pre-fill from the current record, then apply the given fields
            let existing = client
                .list_projects()
                .await?
                .into_iter()
                .find(|p| p.id == id)
                .ok_or_else(|| Error::ProjectNotFound(id.clone()))?;

            let mut draft = ProjectDraft::from(existing);
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            if let Some(scope) = scope {
                draft.scope = scope;
            }
            if let Some(perspective) = perspective {
                draft.perspective = Some(perspective);
            }
            if let Some(functions) = functions {
                draft.functions = Some(functions);
            }
            if let Some(constraints) = constraints {
                draft.constraints = Some(constraints);
            }

            client.update_project(&id, &draft).await?;
            if !quiet {
                println!("Project '{}' updated.", id);
            }
        }
        ProjectAction::Delete { id } => {
            client.delete_project(&id).await?;
            if !quiet {
                println!("Project '{}' deleted.", id);
            }
        }
    }
    Ok(())
}

async fn cmd_select(project_id: Option<String>, quiet: bool) -> anyhow::Result<()> {
    let (config, store) = load_env()?;
    let (client, _user) = authed_client(&config, &store).await?;

    if let Some(id) = &project_id {
        // the dropdown only ever offered existing projects; match that here
        let projects = client.list_projects().await?;
        if !projects.iter().any(|p| &p.id == id) {
            return Err(Error::ProjectNotFound(id.clone()).into());
        }
    }

    let workspace = open_workspace(&config, store, &client).await;
    workspace.select_project(project_id.as_deref()).await?;

    if !quiet {
        match project_id {
            Some(id) => println!(
                "Selected project {} ({} requirements).",
                id,
                workspace.requirements().await.len()
            ),
            None => println!("Selection cleared."),
        }
    }
    Ok(())
}

async fn cmd_requirements(action: RequirementAction, quiet: bool) -> anyhow::Result<()> {
    // fail fast on unparseable input, before the session guard
    if let RequirementAction::SetState { state, .. } = &action {
        parse_state(state)?;
    }

    let (config, store) = load_env()?;
    let (client, _user) = authed_client(&config, &store).await?;
    let workspace = open_workspace(&config, store, &client).await;

    match action {
        RequirementAction::List { history } => {
            if workspace.selected_project().await.is_none() {
                if !quiet {
                    println!("No project selected.");
                    println!("\nChoose one with: reqsync select <project-id>");
                }
                return Ok(());
            }

            let requirements = workspace.requirements().await;
            if requirements.is_empty() {
                if !quiet {
                    println!("No requirements in the selected project.");
                    println!(
                        "\nCreate one with: reqsync requirements create <title> --description <text>"
                    );
                }
                return Ok(());
            }

            if history {
                workspace.load_histories().await?;
            }

            for req in requirements {
                println!(
                    "{} - {} [v{}] ({})",
                    req.id, req.title, req.version, req.state
                );
                println!("    {}", req.description);
                println!("    Created: {}", req.created_at.format("%Y-%m-%d"));
                if history && let Some(entries) = workspace.history_for(&req.id).await {
                    for entry in entries {
                        match entry.previous_state {
                            Some(previous) => println!(
                                "    {}: {} -> {}",
                                entry.changed_at.format("%Y-%m-%d %H:%M"),
                                previous,
                                entry.new_state
                            ),
                            None => println!(
                                "    {}: {}",
                                entry.changed_at.format("%Y-%m-%d %H:%M"),
                                entry.new_state
                            ),
                        }
                    }
                }
            }
        }
        RequirementAction::Create {
            title,
            description,
            version,
        } => {
            workspace
                .create_requirement(title.clone(), description, version)
                .await?;
            if !quiet {
                println!(
                    "Requirement '{}' created ({} in project).",
                    title,
                    workspace.requirements().await.len()
                );
            }
        }
        RequirementAction::Update {
            id,
            title,
            description,
            version,
        } => {
            workspace
                .update_requirement(&id, title, description, version)
                .await?;
            if !quiet {
                println!("Requirement '{}' updated.", id);
            }
        }
        RequirementAction::Delete { id } => {
            workspace.delete_requirement(&id).await?;
            if !quiet {
                println!("Requirement '{}' deleted.", id);
            }
        }
        RequirementAction::SetState { id, state } => {
            let state = parse_state(&state)?;
            let updated = workspace.set_requirement_state(&id, state).await?;
            if !quiet {
                println!("Requirement '{}' is now {}.", updated.id, updated.state);
            }
        }
        RequirementAction::History { id } => {
            let entries = client.requirement_history(&id).await?;
            if entries.is_empty() {
                if !quiet {
                    println!("No state changes recorded.");
                }
            } else {
                for entry in entries {
                    match entry.previous_state {
                        Some(previous) => println!(
                            "{}: {} -> {}",
                            entry.changed_at.format("%Y-%m-%d %H:%M"),
                            previous,
                            entry.new_state
                        ),
                        None => println!(
                            "{}: {}",
                            entry.changed_at.format("%Y-%m-%d %H:%M"),
                            entry.new_state
                        ),
                    }
                }
            }
        }
    }
    Ok(())
}

async fn cmd_generate(quiet: bool) -> anyhow::Result<()> {
    let (config, store) = load_env()?;
    let (client, _user) = authed_client(&config, &store).await?;
    let workspace = open_workspace(&config, store, &client).await;

    if !quiet {
        println!(
            "Generating the requirements document (up to {} seconds)...",
            config.generation.timeout_secs
        );
    }

    let document = workspace.generate_document().await?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn cmd_document() -> anyhow::Result<()> {
    let store = SessionStore::open()?;
    match store.last_document() {
        Some(document) => println!("{}", serde_json::to_string_pretty(document)?),
        None => println!("No document generated yet. Run `reqsync generate` first."),
    }
    Ok(())
}

async fn cmd_status() -> anyhow::Result<()> {
    let (config, store) = load_env()?;
    let (client, user) = authed_client(&config, &store).await?;

    println!("Logged in as {}.", user.name);

    let selected = store.selected_project().map(str::to_string);
    let workspace = open_workspace(&config, store, &client).await;

    match selected {
        Some(id) => {
            let name = client
                .list_projects()
                .await?
                .into_iter()
                .find(|p| p.id == id)
                .map(|p| p.name);
            match name {
                Some(name) => println!("Selected project: {} ({})", name, id),
                None => println!("Selected project: {} (no longer exists)", id),
            }
            println!("Requirements: {}", workspace.requirements().await.len());
        }
        None => println!("No project selected."),
    }

    match workspace.document().await {
        Some(_) => println!("Cached document: available (run `reqsync document`)."),
        None => println!("Cached document: none."),
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("Reqsync Health Check");
        println!("====================");
        println!();
    }

    let mut all_ok = true;

    // Check configuration
    let config = match Config::load() {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
                println!("     API origin: {}", config.api.resolved_base_url());
            }
            Some(config)
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Configuration: Error - {}", e);
            }
            None
        }
    };

    // Check config file location
    if !quiet {
        match Config::config_path() {
            Ok(path) => {
                if path.exists() {
                    println!("[OK] Config file: {}", path.display());
                } else {
                    println!("[--] Config file: {} (using defaults)", path.display());
                }
            }
            Err(e) => {
                println!("[!!] Config file: Error - {}", e);
            }
        }
    }

    // Check session and service reachability
    match SessionStore::open() {
        Ok(session) => match session.token() {
            Some(token) => {
                if !quiet {
                    println!("[OK] Session: Token stored");
                }
                if let Some(config) = &config {
                    match ApiClient::from_config(config) {
                        Ok(client) => match client.with_token(token).me().await {
                            Ok(user) => {
                                if !quiet {
                                    println!(
                                        "[OK] Service: Reachable (logged in as {})",
                                        user.name
                                    );
                                }
                            }
                            Err(e) => {
                                all_ok = false;
                                if !quiet {
                                    println!("[!!] Service: {}", e);
                                }
                            }
                        },
                        Err(e) => {
                            all_ok = false;
                            if !quiet {
                                println!("[!!] Service: {}", e);
                            }
                        }
                    }
                }
            }
            None => {
                all_ok = false;
                if !quiet {
                    println!("[!!] Session: Not logged in");
                    println!("     Run `reqsync login <email>`");
                }
            }
        },
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Session: Error - {}", e);
            }
        }
    }

    // Summary
    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed!");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }

    Ok(())
}
