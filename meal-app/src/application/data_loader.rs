// =====================
// データファイルの読み込み
// =====================

use chrono::NaiveDate;
use meal_core::calendar::fallback_anchor;
use meal_core::data_parser::{parse_activities_data, parse_menu_data, parse_week_anchor};
use meal_core::menu_model::{ActivityTable, MenuTable, MenuTables};
use tracing::{error, info, warn};

use crate::config::DataFiles;
use crate::error::FetchError;
use crate::infrastructure::network::{Fetcher, Request};

/// 最初の表示に必要なものすべて
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub anchor: NaiveDate,
    /// false なら直近の月曜で代用している
    pub anchor_from_config: bool,
    pub menus: MenuTables,
    pub activities: ActivityTable,
}

/// 200 以外は失敗扱い
pub async fn fetch_text<F>(fetcher: &F, path: &str) -> Result<String, FetchError>
where
    F: Fetcher + ?Sized,
{
    let response = fetcher.fetch(&Request::get(path)).await?;
    if !response.is_ok() {
        return Err(FetchError::Status {
            path: path.to_string(),
            status: response.status,
        });
    }
    Ok(response.text())
}

/// 読めない・解釈できないときは today 以前の直近の月曜
pub async fn load_week_anchor<F>(fetcher: &F, path: &str, today: NaiveDate) -> (NaiveDate, bool)
where
    F: Fetcher + ?Sized,
{
    let parsed = match fetch_text(fetcher, path).await {
        Ok(text) => {
            let anchor = parse_week_anchor(&text);
            if anchor.is_none() {
                warn!(path, "week anchor is not a YYYY-MM-DD date");
            }
            anchor
        }
        Err(e) => {
            warn!(path, error = %e, "failed to load week anchor");
            None
        }
    };

    match parsed {
        Some(anchor) => {
            info!(%anchor, "week anchor loaded");
            (anchor, true)
        }
        None => {
            let anchor = fallback_anchor(today);
            info!(%anchor, "using most recent monday as week anchor");
            (anchor, false)
        }
    }
}

/// 2つの献立を並行して読む。失敗した方だけ空になる
pub async fn load_menu_tables<F>(fetcher: &F, files: &DataFiles) -> MenuTables
where
    F: Fetcher + ?Sized,
{
    let (nido, infanzia) = tokio::join!(
        load_menu_table(fetcher, &files.menu_nido),
        load_menu_table(fetcher, &files.menu_infanzia),
    );

    let menus = MenuTables { nido, infanzia };
    info!(
        nido = menus.nido.len(),
        infanzia = menus.infanzia.len(),
        "menus loaded"
    );
    menus
}

async fn load_menu_table<F>(fetcher: &F, path: &str) -> MenuTable
where
    F: Fetcher + ?Sized,
{
    match fetch_text(fetcher, path).await {
        Ok(text) => parse_menu_data(&text),
        Err(e) => {
            error!(path, error = %e, "failed to load menu");
            MenuTable::new()
        }
    }
}

pub async fn load_activities<F>(fetcher: &F, path: &str) -> ActivityTable
where
    F: Fetcher + ?Sized,
{
    match fetch_text(fetcher, path).await {
        Ok(text) => {
            let activities = parse_activities_data(&text);
            info!(entries = activities.len(), "activities loaded");
            activities
        }
        Err(e) => {
            error!(path, error = %e, "failed to load activities");
            ActivityTable::new()
        }
    }
}

/// 週の基準日 -> (献立, 活動) を並行
pub async fn load_all<F>(fetcher: &F, files: &DataFiles, today: NaiveDate) -> LoadedData
where
    F: Fetcher + ?Sized,
{
    let (anchor, anchor_from_config) = load_week_anchor(fetcher, &files.week_config, today).await;

    let (menus, activities) = tokio::join!(
        load_menu_tables(fetcher, files),
        load_activities(fetcher, &files.activities),
    );

    LoadedData {
        anchor,
        anchor_from_config,
        menus,
        activities,
    }
}
