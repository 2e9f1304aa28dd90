use clap::Parser;
use color_eyre::Result;
use shipcheck::{
    ApiClient, Config, Profile, Store,
    cli::{Cli, Commands},
};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    // Load configuration: an explicit --config path wins over the profile
    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(&shipcheck::utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };

    // Initialize the backend client
    let client = ApiClient::new(&config.api_base_url, config.request_timeout())?;

    // Dispatch to appropriate command handler
    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let store = Store::new(Box::new(client));
            let app = shipcheck::tui::App::new(config, store)?;
            shipcheck::tui::run_event_loop(app)?;
        }
        Commands::Projects => {
            shipcheck::cli::handle_projects(&client)?;
        }
        Commands::AddProject {
            name,
            platform,
            description,
            start,
            publish,
            no_default_tasks,
        } => {
            shipcheck::cli::handle_add_project(
                name,
                platform,
                description,
                start,
                publish,
                no_default_tasks,
                &client,
            )?;
        }
        Commands::AddTask {
            project_id,
            title,
            phase,
            priority,
            due,
        } => {
            shipcheck::cli::handle_add_task(project_id, title, phase, priority, due, &client)?;
        }
        Commands::Chat {
            project_id,
            message,
        } => {
            shipcheck::cli::handle_chat(project_id, message, &client)?;
        }
    }

    Ok(())
}
