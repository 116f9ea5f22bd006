use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::builder::BoolishValueParser;
use clap::{Subcommand, ValueEnum};
use tracing::info;

use traxlio_core::{
    BackendSelector, Direction, Inventory, ItemSort, RoomSort, share_url, sort, transfer,
};
use traxlio_db::LocalStore;
use traxlio_types::{ImportMode, NewBox, NewItem, NewRoom, ReminderFrequency, ResourceKind};

use crate::config::Config;

#[derive(Subcommand)]
pub enum Command {
    #[command(flatten)]
    Inventory(InventoryCommand),
    #[command(flatten)]
    Local(LocalCommand),
}

/// Commands that go through the selected backend.
#[derive(Subcommand)]
pub enum InventoryCommand {
    /// List rooms with their box counts
    Rooms {
        /// Only rooms whose name or description contains this
        #[arg(short, long, default_value = "")]
        query: String,
        /// name, created, updated or boxes
        #[arg(long, default_value = "name")]
        sort: RoomSort,
        #[arg(long)]
        desc: bool,
    },
    /// List the items in a box
    Items {
        box_id: String,
        #[arg(short, long, default_value = "")]
        query: String,
        /// name, created, updated or quantity
        #[arg(long, default_value = "name")]
        sort: ItemSort,
        #[arg(long)]
        desc: bool,
    },
    AddRoom {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    AddBox {
        room_id: String,
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    AddItem {
        box_id: String,
        name: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
        /// Repeat for several tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move one or more items into another box
    Move {
        #[arg(required = true)]
        item_ids: Vec<String>,
        #[arg(long)]
        to: String,
    },
    DeleteRoom {
        id: String,
    },
    DeleteBox {
        id: String,
    },
    DeleteItem {
        id: String,
    },
    /// Search box and item names, descriptions, tags and notes
    Search {
        query: String,
    },
    /// Show the most recent activity
    Activity {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Create a share link for a room, box or item
    Share {
        kind: ResourceKind,
        id: String,
        #[arg(long)]
        private: bool,
    },
    /// Print what a share link shows, as JSON
    ShowShare {
        token: String,
    },
    /// Counts of rooms, boxes and items
    Stats,
}

/// Backup and settings commands; they always use the local store.
#[derive(Subcommand)]
pub enum LocalCommand {
    /// Write a JSON backup of rooms, boxes and items
    Export {
        /// Defaults to traxlio-backup-YYYY-MM-DD.json
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Load a JSON backup into the local store
    Import {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = ModeArg::Merge)]
        mode: ModeArg,
    },
    /// Delete the local inventory (settings are kept)
    Clear,
    /// Show or change notification settings
    Settings {
        /// on or off
        #[arg(long, value_parser = BoolishValueParser::new())]
        notifications: Option<bool>,
        /// daily or weekly
        #[arg(long)]
        frequency: Option<ReminderFrequency>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Merge,
    Replace,
}

impl From<ModeArg> for ImportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Merge => ImportMode::Merge,
            ModeArg::Replace => ImportMode::Replace,
        }
    }
}

fn direction(desc: bool) -> Direction {
    if desc { Direction::Desc } else { Direction::Asc }
}

async fn open_store(config: &Config) -> Result<Arc<LocalStore>> {
    let scope = config.scope();
    let store = tokio::task::spawn_blocking(move || LocalStore::open(&scope)).await??;
    Ok(Arc::new(store))
}

async fn open_inventory(config: &Config, store: Arc<LocalStore>) -> Result<Inventory> {
    let backend = BackendSelector::new(store).select(&config.remote, config.session.clone());
    info!(backend = %backend.kind(), "Opening inventory");
    Ok(Inventory::open(backend).await?)
}

/// Run `f` against the local store on the blocking pool.
async fn blocking<T, F>(store: &Arc<LocalStore>, f: F) -> Result<T>
where
    F: FnOnce(&LocalStore) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || f(&store)).await?
}

pub async fn run(command: Command, config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    match command {
        Command::Local(command) => run_local(command, &store).await,
        Command::Inventory(command) => {
            let inventory = open_inventory(config, store).await?;
            run_inventory(command, &inventory, config).await
        }
    }
}

async fn run_local(command: LocalCommand, store: &Arc<LocalStore>) -> Result<()> {
    match command {
        LocalCommand::Export { output } => {
            let now = Utc::now();
            let path = output.unwrap_or_else(|| transfer::backup_file_name(now).into());
            let file = blocking(store, move |s| Ok(transfer::export(s, now))).await?;
            let json = serde_json::to_string_pretty(&file)?;
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "Exported {} rooms, {} boxes, {} items to {}",
                file.data.rooms.len(),
                file.data.boxes.len(),
                file.data.items.len(),
                path.display()
            );
        }
        LocalCommand::Import { path, mode } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file = transfer::parse_export(&text)?;
            let preview = transfer::preview(&file);
            println!(
                "Backup holds {} rooms, {} boxes, {} items",
                preview.rooms, preview.boxes, preview.items
            );
            let summary =
                blocking(store, move |s| Ok(transfer::import(s, file, mode.into())?)).await?;
            match mode {
                ModeArg::Merge => println!(
                    "Merged: {} rooms, {} boxes, {} items added",
                    summary.rooms, summary.boxes, summary.items
                ),
                ModeArg::Replace => println!(
                    "Imported: {} rooms, {} boxes, {} items",
                    summary.rooms, summary.boxes, summary.items
                ),
            }
        }
        LocalCommand::Clear => {
            blocking(store, |s| s.clear_all()).await?;
            println!("Local inventory cleared");
        }
        LocalCommand::Settings {
            notifications,
            frequency,
        } => {
            let settings = blocking(store, move |s| {
                let mut settings = s.settings();
                if let Some(enabled) = notifications {
                    settings.notifications_enabled = enabled;
                }
                if let Some(frequency) = frequency {
                    settings.reminder_frequency = frequency;
                }
                s.save_settings(&settings)?;
                Ok(settings)
            })
            .await?;
            println!(
                "notifications: {}\nreminders:     {}",
                if settings.notifications_enabled { "on" } else { "off" },
                settings.reminder_frequency.as_str()
            );
        }
    }

    Ok(())
}

async fn run_inventory(
    command: InventoryCommand,
    inventory: &Inventory,
    config: &Config,
) -> Result<()> {
    match command {
        InventoryCommand::Rooms { query, sort, desc } => {
            for room in inventory.filter_rooms(&query, sort, direction(desc)).await {
                let boxes = inventory.boxes_in_room(&room.id).await.len();
                println!("{}  {}  ({} boxes)", room.id, room.name, boxes);
            }
        }
        InventoryCommand::Items {
            box_id,
            query,
            sort,
            desc,
        } => {
            if inventory.storage_box(&box_id).await.is_none() {
                bail!("box `{}` not found", box_id);
            }
            let items = inventory.items_in_box(&box_id).await;
            for item in sort::filter_items(&items, &query, sort, direction(desc)) {
                let tags = if item.tags.is_empty() {
                    String::new()
                } else {
                    format!("  [{}]", item.tags.join(", "))
                };
                println!("{}  {} x{}{}", item.id, item.name, item.quantity, tags);
            }
        }
        InventoryCommand::AddRoom { name, description } => {
            let room = inventory
                .create_room(NewRoom { name, description })
                .await?;
            println!("{}", room.id);
        }
        InventoryCommand::AddBox {
            room_id,
            name,
            description,
        } => {
            let storage_box = inventory
                .create_box(NewBox {
                    room_id,
                    name,
                    description,
                    image: None,
                })
                .await?;
            println!("{}", storage_box.id);
        }
        InventoryCommand::AddItem {
            box_id,
            name,
            quantity,
            tags,
            description,
            notes,
        } => {
            let item = inventory
                .create_item(
                    &box_id,
                    NewItem {
                        name,
                        description,
                        quantity,
                        images: Vec::new(),
                        tags,
                        notes,
                    },
                )
                .await?;
            println!("{}", item.id);
        }
        InventoryCommand::Move { item_ids, to } => {
            let outcomes = inventory.bulk_move(&item_ids, &to).await;
            let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
            for outcome in &outcomes {
                if let Err(e) = &outcome.result {
                    eprintln!("{}: {}", outcome.item_id, e);
                }
            }
            println!("Moved {} of {} items", outcomes.len() - failed, outcomes.len());
            if failed > 0 {
                bail!("{} item(s) could not be moved", failed);
            }
        }
        InventoryCommand::DeleteRoom { id } => inventory.delete_room(&id).await?,
        InventoryCommand::DeleteBox { id } => inventory.delete_box(&id).await?,
        InventoryCommand::DeleteItem { id } => inventory.delete_item(&id).await?,
        InventoryCommand::Search { query } => {
            for hit in inventory.search(&query).await {
                let parent = hit.parent_name.as_deref().unwrap_or("-");
                println!("{:<4}  {}  {}  (in {})", hit.kind, hit.id, hit.name, parent);
            }
        }
        InventoryCommand::Activity { limit } => {
            for entry in inventory.recent_activities(limit).await {
                let parent = entry
                    .parent_name
                    .map(|p| format!(" in {}", p))
                    .unwrap_or_default();
                println!(
                    "{}  {} {} {}{}",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.action,
                    entry.kind,
                    entry.resource_name,
                    parent
                );
            }
        }
        InventoryCommand::Share { kind, id, private } => {
            let share = inventory.create_share(kind, &id, !private).await?;
            println!("{}", share_url(&config.share_base_url, &share.id));
        }
        InventoryCommand::ShowShare { token } => {
            match inventory.resolve_share(&token, Utc::now()).await? {
                Some(view) => println!("{}", serde_json::to_string_pretty(&view)?),
                None => bail!("Share not found. The link may have expired or been deleted."),
            }
        }
        InventoryCommand::Stats => {
            let stats = inventory.stats().await;
            println!(
                "backend: {}\nrooms:   {}\nboxes:   {}\nitems:   {} ({} total)\nshares:  {}",
                inventory.backend_kind(),
                stats.rooms,
                stats.boxes,
                stats.items,
                stats.total_quantity,
                stats.shares
            );
        }
    }

    Ok(())
}
