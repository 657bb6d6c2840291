mod render;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use meal_app_lib::{
    config::AppConfig,
    infrastructure::{
        cache_repo::CacheRepository,
        network::{Fetcher, FsFetcher, Request},
        storage::JsonFileStore,
    },
    AppServices,
};
use meal_core::{
    data_parser::{parse_activities_data, parse_menu_data, parse_week_anchor},
    day_view::DayType,
    favorites::FavoriteFields,
    menu_model::MenuType,
};

// 引数を構造体として定義します
#[derive(Parser)]
#[command(name = "meal_tools")]
#[command(version = "0.1.0")]
#[command(about = "献立と活動の表示、お気に入りの管理をします", long_about = None)]
struct Cli {
    /// 設定ファイル (無ければ既定値)
    #[arg(short, long, default_value = "meal-config.json")]
    config: PathBuf,

    /// データファイルのディレクトリ
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// お気に入りの保存先
    #[arg(long)]
    storage: Option<PathBuf>,

    /// キャッシュ DB の URL
    #[arg(long)]
    cache_db: Option<String>,

    /// 現在時刻の代わりに使う (例: 2024-01-09T08:00)
    #[arg(long, value_parser = parse_now)]
    at: Option<NaiveDateTime>,

    /// JSON で出力する
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// お気に入りごとの今日 (土日は月曜) の献立と活動
    Today {
        /// 明日に切り替えるお気に入りの id
        #[arg(long)]
        tomorrow: Vec<String>,
    },

    /// 献立の週一覧
    Week {
        /// nido / infanzia
        menu: MenuType,

        /// 4週すべて表示する
        #[arg(long)]
        all: bool,
    },

    /// グループの1週間の活動
    Activities {
        group: Option<String>,
    },

    /// お気に入りの編集
    Favorites {
        #[command(subcommand)]
        action: FavoriteAction,
    },

    /// データファイルを解析して件数を表示します
    Check {
        file: PathBuf,

        #[arg(short, long, value_enum)]
        kind: DataKind,
    },

    /// キャッシュワーカーの操作
    Worker {
        #[command(subcommand)]
        action: WorkerAction,
    },
}

#[derive(Subcommand)]
enum FavoriteAction {
    List,
    Add {
        name: String,
        #[arg(short, long)]
        menu: MenuType,
        #[arg(short, long)]
        group: String,
    },
    Edit {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        menu: Option<MenuType>,
        #[arg(short, long)]
        group: Option<String>,
    },
    Delete {
        id: String,
    },
    Up {
        id: String,
    },
    Down {
        id: String,
    },
}

#[derive(Subcommand)]
enum WorkerAction {
    /// 状態とキャッシュ一覧
    Status,
    /// メッセージを送る (例: '{"type":"SKIP_WAITING"}')
    Message { json: String },
    /// ワーカー経由で取得する
    Fetch { url: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum DataKind {
    Menu,
    Activities,
    Anchor,
}

fn parse_now(text: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M").map_err(|e| e.to_string())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn check_file(file: &PathBuf, kind: DataKind) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("ファイル '{}' を読めませんでした", file.display()))?;

    match kind {
        DataKind::Menu => {
            let menu = parse_menu_data(&text);
            println!("{}: {} entries", file.display(), menu.len());
        }
        DataKind::Activities => {
            let activities = parse_activities_data(&text);
            println!("{}: {} entries", file.display(), activities.len());
            for group in activities.group_names() {
                println!("   {} : {} days", group, activities.group_days(group).len());
            }
        }
        DataKind::Anchor => match parse_week_anchor(&text) {
            Some(anchor) => println!("{}: {}", file.display(), anchor),
            None => bail!("'{}' は YYYY-MM-DD 形式ではありません", file.display()),
        },
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("設定 '{}' を読めませんでした", cli.config.display()))?;

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(path) = &cli.storage {
        config.favorites_path = path.clone();
    }
    if let Some(url) = &cli.cache_db {
        config.cache_database_url = url.clone();
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // 解析だけならサービスは要らない
    if let Commands::Check { file, kind } = &cli.command {
        return check_file(file, *kind);
    }

    let config = load_config(&cli)?;
    let now = cli.at.unwrap_or_else(|| Local::now().naive_local());

    // キャッシュ DB が開けなくてもコマンドは動かす
    let caches = CacheRepository::connect_or_fallback(&config.cache_database_url).await;
    let store = JsonFileStore::open(&config.favorites_path)
        .with_context(|| format!("'{}' を開けませんでした", config.favorites_path.display()))?;

    let mut services = AppServices::start(
        &config,
        FsFetcher::new(&config.data_dir),
        caches,
        store,
        now,
    )
    .await?;

    // パターンマッチで分岐処理
    match cli.command {
        Commands::Today { tomorrow } => {
            for id in &tomorrow {
                if services.state.toggle_favorite_day(id, DayType::Tomorrow, now).is_none() {
                    bail!("お気に入り '{}' はありません", id);
                }
            }

            let views = services.state.favorite_views(now);
            if cli.json {
                print_json(&views)?;
            } else {
                render::favorite_views(&views);
                render::anchor_info(&services.state.anchor_info(now));
            }
        }

        Commands::Week { menu, all } => {
            let weeks = if all {
                services.state.all_weeks(menu, now)
            } else {
                vec![services.state.week_overview(menu, now)]
            };

            if cli.json {
                print_json(&weeks)?;
            } else {
                render::week_overviews(&weeks);
            }
        }

        Commands::Activities { group } => {
            let groups: Vec<String> = match group {
                Some(group) => vec![group],
                None => services
                    .state
                    .activity_groups()
                    .into_iter()
                    .map(String::from)
                    .collect(),
            };

            for group in &groups {
                let cards = services.state.activity_week(group, now);
                if cli.json {
                    print_json(&cards)?;
                } else {
                    render::activity_week(group, cards.as_deref());
                }
            }
        }

        Commands::Favorites { action } => {
            run_favorite_action(&mut services, action, now, cli.json)?;
        }

        Commands::Worker { action } => match action {
            WorkerAction::Status => {
                let lifecycle = services.worker.lifecycle();
                println!(
                    "version: {}  state: {:?}  controlling: {}",
                    lifecycle.version(),
                    lifecycle.state(),
                    lifecycle.is_controlling()
                );
                match &services.install_report {
                    Some(report) => render::install_report(report),
                    None => println!("   install failed, data loaded without cache"),
                }
                match services.worker.caches().cache_names().await {
                    Ok(names) => {
                        for name in names {
                            let count = services.worker.caches().entry_count(&name).await?;
                            println!("   cache {} : {} entries", name, count);
                        }
                    }
                    Err(e) => warn!(error = %e, "cache database unavailable"),
                }
            }
            WorkerAction::Message { json } => {
                let handled = services.worker.handle_message(&json).await?;
                info!(handled, "message delivered");
                println!("state: {:?}", services.worker.lifecycle().state());
            }
            WorkerAction::Fetch { url } => {
                let response = services
                    .worker
                    .fetch(&Request::get(url.as_str()))
                    .await
                    .with_context(|| format!("'{}' を取得できませんでした", url))?;
                println!(
                    "{} {} ({} bytes)",
                    response.status,
                    response.content_type,
                    response.body.len()
                );
            }
        },

        Commands::Check { .. } => {}
    }

    Ok(())
}

fn run_favorite_action(
    services: &mut AppServices<FsFetcher, JsonFileStore>,
    action: FavoriteAction,
    now: NaiveDateTime,
    json: bool,
) -> Result<()> {
    let state = &mut services.state;

    match action {
        FavoriteAction::List => {
            let favorites: Vec<_> = state.favorites().list().iter().cloned().collect();
            if json {
                print_json(&favorites)?;
            } else {
                for favorite in &favorites {
                    println!(
                        "{}  {}  ({} / {})",
                        favorite.id, favorite.name, favorite.menu_type, favorite.activity_group
                    );
                }
            }
        }
        FavoriteAction::Add { name, menu, group } => {
            let name = name.trim().to_string();
            let group = group.trim().to_string();
            if name.is_empty() || group.is_empty() {
                bail!("名前とグループは必須です");
            }

            let id = state.add_favorite(FavoriteFields {
                name,
                menu_type: menu,
                activity_group: group,
            })?;
            println!("added {}", id);
            if let Some(view) = state.favorite_view(&id, now) {
                render::favorite_views(&[view]);
            }
        }
        FavoriteAction::Edit { id, name, menu, group } => {
            let Some(current) = state.favorites().get(&id).cloned() else {
                bail!("お気に入り '{}' はありません", id);
            };

            state.update_favorite(
                &id,
                FavoriteFields {
                    name: name.unwrap_or(current.name),
                    menu_type: menu.unwrap_or(current.menu_type),
                    activity_group: group.unwrap_or(current.activity_group),
                },
            )?;
            println!("updated {}", id);
        }
        FavoriteAction::Delete { id } => {
            if !state.delete_favorite(&id)? {
                bail!("お気に入り '{}' はありません", id);
            }
            println!("deleted {}", id);
        }
        FavoriteAction::Up { id } => {
            if !state.move_favorite_up(&id)? {
                println!("{} は移動できません", id);
            }
        }
        FavoriteAction::Down { id } => {
            if !state.move_favorite_down(&id)? {
                println!("{} は移動できません", id);
            }
        }
    }

    Ok(())
}
