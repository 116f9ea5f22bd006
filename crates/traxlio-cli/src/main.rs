mod commands;
mod config;

use clap::Parser;
use tracing::debug;

use crate::commands::Command;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "traxlio", version, about = "Track what is stored in which box, in which room")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging; stdout is kept for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "traxlio=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    debug!(
        db = %config.db_path.display(),
        demo = config.demo_mode,
        remote = config.remote.is_configured(),
        "Config loaded"
    );

    commands::run(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{InventoryCommand, LocalCommand};
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_move_with_several_items() {
        let cli = Cli::try_parse_from(["traxlio", "move", "i1", "i2", "--to", "b2"]).unwrap();
        match cli.command {
            Command::Inventory(InventoryCommand::Move { item_ids, to }) => {
                assert_eq!(item_ids, ["i1", "i2"]);
                assert_eq!(to, "b2");
            }
            _ => panic!("expected move"),
        }
    }

    #[test]
    fn local_and_inventory_commands_share_one_namespace() {
        let cli = Cli::try_parse_from(["traxlio", "import", "backup.json", "--mode", "replace"])
            .unwrap();
        assert!(matches!(cli.command, Command::Local(LocalCommand::Import { .. })));

        let cli = Cli::try_parse_from(["traxlio", "rooms", "--sort", "boxes", "--desc"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Inventory(InventoryCommand::Rooms { desc: true, .. })
        ));
    }

    #[test]
    fn rejects_unknown_sort_and_kind() {
        assert!(Cli::try_parse_from(["traxlio", "rooms", "--sort", "colour"]).is_err());
        assert!(Cli::try_parse_from(["traxlio", "share", "shelf", "x"]).is_err());
    }

    #[test]
    fn settings_accept_on_off() {
        let cli = Cli::try_parse_from([
            "traxlio",
            "settings",
            "--notifications",
            "off",
            "--frequency",
            "weekly",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Local(LocalCommand::Settings {
                notifications: Some(false),
                frequency: Some(traxlio_types::ReminderFrequency::Weekly),
            })
        ));
    }
}
