// region:    --- Imports
use mazadi::accounts::commands::seed_security_questions;
use mazadi::chatbot::seed::populate_knowledge_base;
use mazadi::config::AppConfig;
use mazadi::database::DatabaseManager;
use mazadi::routes;
use mazadi::scheduler::SessionReaper;
use mazadi::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Commands
#[derive(Debug, PartialEq)]
enum Command {
    Serve,
    SeedSecurityQuestions,
    PopulateKnowledgeBase { clear: bool },
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    match args.first().map(String::as_str) {
        None | Some("serve") => Ok(Command::Serve),
        Some("seed-security-questions") => Ok(Command::SeedSecurityQuestions),
        Some("populate-knowledge-base") => Ok(Command::PopulateKnowledgeBase {
            clear: args[1..].iter().any(|a| a == "--clear"),
        }),
        Some(other) => Err(format!(
            "unknown command '{}' (expected serve, seed-security-questions or populate-knowledge-base [--clear])",
            other
        )),
    }
}
// endregion: --- Commands

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;
    let config = AppConfig::from_env()?;

    let db_manager = Arc::new(DatabaseManager::new(&config.database).await?);
    if let Err(e) = db_manager.initialize_database(config.database.reset).await {
        error!("{:<12} --> Database initialization failed: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> Database initialized", "Main");

    match command {
        Command::SeedSecurityQuestions => {
            seed_security_questions(&db_manager).await?;
            Ok(())
        }
        Command::PopulateKnowledgeBase { clear } => {
            let report = populate_knowledge_base(&db_manager, clear).await?;
            info!(
                "{:<12} --> {} created, {} updated, {} settings added",
                "Main", report.created, report.updated, report.settings_created
            );
            Ok(())
        }
        Command::Serve => serve(db_manager, config).await,
    }
}

async fn serve(
    db_manager: Arc<DatabaseManager>,
    config: AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let reaper = SessionReaper::new(db_manager.get_pool(), config.session.reap_interval_secs);
    reaper.start();

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(db_manager, config);
    let routes_all = routes::app(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(&args(&[])), Ok(Command::Serve));
        assert_eq!(parse_command(&args(&["serve"])), Ok(Command::Serve));
        assert_eq!(
            parse_command(&args(&["seed-security-questions"])),
            Ok(Command::SeedSecurityQuestions)
        );
        assert_eq!(
            parse_command(&args(&["populate-knowledge-base", "--clear"])),
            Ok(Command::PopulateKnowledgeBase { clear: true })
        );
        assert_eq!(
            parse_command(&args(&["populate-knowledge-base"])),
            Ok(Command::PopulateKnowledgeBase { clear: false })
        );
        assert!(parse_command(&args(&["migrate"])).is_err());
    }
}
