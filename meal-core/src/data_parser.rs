//! 献立・活動テキストの解析
//!
//! 1行1レコードの `|` 区切り形式を読みます。
//!
//! ```text
//! # 献立: settimana|giorno|primo|secondo|frutta
//! #   or: settimana|giorno|primo|secondo|contorno|frutta
//! 2|2|Pasta|Pollo|Mela
//!
//! # 活動: gruppo|giorno|attivita_mattino|attivita_pomeriggio
//! nido|3|Disegno|-
//! ```
//!
//! 形式に合わない行は黙って読み飛ばします (エラーにはしない)。

use chrono::{NaiveDate, Weekday};
use tracing::debug;

use crate::calendar::WeekNumber;
use crate::menu_model::{ActivityMoment, ActivityTable, MenuEntry, MenuTable};

const MENU_MIN_FIELDS: usize = 5;
const MENU_WITH_SIDE_DISH_FIELDS: usize = 6;
const ACTIVITY_MIN_FIELDS: usize = 4;

/// 献立の曜日番号 (1=Lunedì .. 5=Venerdì)
fn menu_day(token: &str) -> Option<Weekday> {
    match token {
        "1" => Some(Weekday::Mon),
        "2" => Some(Weekday::Tue),
        "3" => Some(Weekday::Wed),
        "4" => Some(Weekday::Thu),
        "5" => Some(Weekday::Fri),
        _ => None,
    }
}

/// 活動の曜日番号 (1=Lunedì .. 6=Sabato)
fn activity_day(token: &str) -> Option<Weekday> {
    match token {
        "6" => Some(Weekday::Sat),
        other => menu_day(other),
    }
}

/// 空行・コメント行以外を `|` で分割して返す
fn data_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !(line.trim().is_empty() || line.starts_with('#')))
        .map(|(index, line)| (index + 1, line.split('|').map(str::trim).collect()))
}

pub fn parse_menu_data(text: &str) -> MenuTable {
    let mut menu = MenuTable::new();

    for (line_no, parts) in data_lines(text) {
        if parts.len() < MENU_MIN_FIELDS {
            debug!(line_no, fields = parts.len(), "menu line skipped: too few fields");
            continue;
        }

        let week = parts[0].parse::<u8>().ok().and_then(WeekNumber::new);
        let weekday = menu_day(parts[1]);

        let (Some(week), Some(weekday)) = (week, weekday) else {
            debug!(line_no, week = parts[0], day = parts[1], "menu line skipped: bad week or day");
            continue;
        };

        // 6列以上なら contorno 付き
        let (side_dish, fruit) = if parts.len() >= MENU_WITH_SIDE_DISH_FIELDS {
            let side = Some(parts[4]).filter(|s| !s.is_empty()).map(str::to_string);
            (side, parts[5])
        } else {
            (None, parts[4])
        };

        menu.insert(
            week,
            weekday,
            MenuEntry {
                first_course: parts[2].to_string(),
                second_course: parts[3].to_string(),
                side_dish,
                fruit: fruit.to_string(),
            },
        );
    }

    menu
}

pub fn parse_activities_data(text: &str) -> ActivityTable {
    let mut activities = ActivityTable::new();

    for (line_no, parts) in data_lines(text) {
        if parts.len() < ACTIVITY_MIN_FIELDS {
            debug!(line_no, fields = parts.len(), "activity line skipped: too few fields");
            continue;
        }

        let Some(weekday) = activity_day(parts[1]) else {
            debug!(line_no, day = parts[1], "activity line skipped: unknown day");
            continue;
        };

        activities.insert(parts[0], weekday, ActivityMoment::from_fields(parts[2], parts[3]));
    }

    activities
}

/// week-config.txt の中身 (ISO 日付1つ)
pub fn parse_week_anchor(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}
