use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tasksync_core::{
    BroadcastHub, Credentials, HttpTransport, MutationCoordinator, RouteTracker, SyncConfig,
    SyncSession,
};
use tasksync_model::{Project, ProjectId};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("tasksync")
        .version(tasksync_core::VERSION)
        .about("Collaborative project tracker client")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .global(true)
                .env("TASKSYNC_TOKEN")
                .hide_env_values(true)
                .help("Session bearer token"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Output and logs as JSON"),
        )
        .subcommand(Command::new("projects").about("List projects"))
        .subcommand(
            Command::new("show")
                .about("Show a project with its tasks and collaborators")
                .arg(Arg::new("id").required(true).help("Project id")),
        )
        .subcommand(
            Command::new("watch")
                .about("Open a project and print it whenever a collaborator changes it")
                .arg(Arg::new("id").required(true).help("Project id")),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<SyncConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => SyncConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(SyncConfig::default().with_env_overrides()),
    }
}

fn project_arg(args: &ArgMatches) -> Result<ProjectId> {
    let id = args.get_one::<String>("id").context("project id is required")?;
    Ok(ProjectId::from(id.as_str()))
}

/// Coordinator for commands that never hear from peers
fn one_shot(config: SyncConfig, credentials: Credentials) -> Result<MutationCoordinator> {
    let transport = HttpTransport::from_config(&config, credentials)?;
    let hub = BroadcastHub::new(config.channel_capacity);
    Ok(MutationCoordinator::new(
        Arc::new(transport),
        Arc::new(hub.connect()),
        Arc::new(RouteTracker::new()),
        config,
    ))
}

fn print_project(project: &Project, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(project)?);
        return Ok(());
    }
    println!("{} ({})", project.name, project.id);
    if !project.client.is_empty() {
        println!("  Client: {}", project.client);
    }
    if let Some(date) = project.date_delivery {
        println!("  Delivery: {date}");
    }
    println!("  Tasks:");
    for task in &project.tasks {
        let mark = if task.completed { "x" } else { " " };
        println!(
            "    [{mark}] {} - {} - {} ({})",
            task.name, task.priority, task.date_delivery, task.id
        );
    }
    if !project.collaborators.is_empty() {
        println!("  Collaborators:");
        for collaborator in &project.collaborators {
            println!("    {} <{}>", collaborator.name, collaborator.email);
        }
    }
    println!();
    Ok(())
}

async fn list_projects(config: SyncConfig, credentials: Credentials, json: bool) -> Result<()> {
    let coordinator = one_shot(config, credentials)?;
    coordinator.load_projects().await?;
    let projects = coordinator.projects().projects();

    if json {
        println!("{}", serde_json::to_string_pretty(&*projects)?);
    } else if projects.is_empty() {
        println!("No projects yet");
    } else {
        for project in projects.iter() {
            println!("{}  {}  ({})", project.id, project.name, project.client);
        }
    }
    Ok(())
}

async fn show_project(
    config: SyncConfig,
    credentials: Credentials,
    id: ProjectId,
    json: bool,
) -> Result<()> {
    let coordinator = one_shot(config, credentials)?;
    coordinator.get_one_project(&id).await?;
    let project = coordinator
        .projects()
        .project()
        .context("project was not loaded")?;
    print_project(&project, json)
}

async fn watch_project(
    config: SyncConfig,
    credentials: Credentials,
    id: ProjectId,
    json: bool,
) -> Result<()> {
    let session = SyncSession::connect(config, credentials, Arc::new(RouteTracker::new())).await?;
    let coordinator = session.coordinator();
    coordinator.get_one_project(&id).await?;

    let mut updates = coordinator.projects().watch_project();
    loop {
        let snapshot = updates.borrow_and_update().clone();
        match snapshot {
            Some(project) => print_project(&project, json)?,
            None => break,
        }
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    session.logout().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let json = matches.get_flag("json");
    init_tracing(json);

    let config = load_config(&matches)?;
    let credentials = match matches.get_one::<String>("token") {
        Some(token) => Credentials::new(token.as_str()),
        None => Credentials::anonymous(),
    };
    if !credentials.is_authenticated() {
        bail!("no session token: pass --token or set TASKSYNC_TOKEN");
    }

    match matches.subcommand() {
        Some(("projects", _)) => list_projects(config, credentials, json).await,
        Some(("show", args)) => show_project(config, credentials, project_arg(args)?, json).await,
        Some(("watch", args)) => watch_project(config, credentials, project_arg(args)?, json).await,
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}
