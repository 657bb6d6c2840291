// =====================
// お気に入り1件分の「今日/明日」表示を決める
// =====================

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::{is_weekend, week_number, ItalianWeekday, WeekNumber};
use crate::menu_model::{ActivityMoment, ActivityTable, MenuEntry, MenuTables, MenuType};

pub const MENU_UNAVAILABLE: &str = "Dati menu non disponibili";
pub const ACTIVITY_UNAVAILABLE: &str = "Dati attività non disponibili";

/// 今日 / 明日 の切り替え
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    #[default]
    Today,
    Tomorrow,
}

/// 表示する曜日と週
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayDay {
    pub weekday: Weekday,
    pub week: WeekNumber,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "menu", rename_all = "camelCase")]
pub enum MenuSection {
    Available(MenuEntry),
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "moments", rename_all = "camelCase")]
pub enum ActivitySection {
    Available(ActivityMoment),
    Unavailable,
}

/// 1日分の表示内容
///
/// `menu` が None のときは献立欄そのものを出さない (土曜)。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    #[serde(flatten)]
    pub day: DisplayDay,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<MenuSection>,
    pub activities: ActivitySection,
}

impl DayView {
    /// 献立なし・活動のみの表示か
    pub fn is_activities_only(&self) -> bool {
        self.menu.is_none()
    }
}

/// 表示する曜日・週・ラベルを決める
///
/// - 土日: 切り替えを無視して「明日 = 月曜」を出す (週は翌日の日付で計算)
/// - 明日: 翌日の曜日と翌日の日付の週
/// - 今日: 今日の曜日と週
pub fn resolve_display_day(now: NaiveDateTime, anchor: NaiveDate, day_type: DayType) -> DisplayDay {
    let today = now.date();
    let tomorrow = now + Duration::days(1);

    if is_weekend(today) {
        return DisplayDay {
            weekday: Weekday::Mon,
            week: week_number(tomorrow, anchor),
            label: format!("Domani - {}", Weekday::Mon.to_italian()),
        };
    }

    match day_type {
        DayType::Tomorrow => {
            let weekday = tomorrow.date().weekday();
            DisplayDay {
                weekday,
                week: week_number(tomorrow, anchor),
                label: format!("Domani - {}", weekday.to_italian()),
            }
        }
        DayType::Today => {
            let weekday = today.weekday();
            DisplayDay {
                weekday,
                week: week_number(now, anchor),
                label: format!("Oggi - {}", weekday.to_italian()),
            }
        }
    }
}

/// 解決済みの曜日・週から献立と活動を引く
pub fn build_day_view(
    day: DisplayDay,
    menu_type: MenuType,
    activity_group: &str,
    menus: &MenuTables,
    activities: &ActivityTable,
) -> DayView {
    // 土曜は献立を引かない (データの有無に関係なく)
    let menu = if day.weekday == Weekday::Sat {
        None
    } else {
        let section = match menus.for_type(menu_type).get(day.week, day.weekday) {
            Some(entry) => MenuSection::Available(entry.clone()),
            None => MenuSection::Unavailable,
        };
        Some(section)
    };

    let activities = match activities.get(activity_group, day.weekday) {
        Some(moment) => ActivitySection::Available(moment.clone()),
        None => ActivitySection::Unavailable,
    };

    DayView {
        day,
        menu,
        activities,
    }
}

pub fn select_day_view(
    now: NaiveDateTime,
    anchor: NaiveDate,
    day_type: DayType,
    menu_type: MenuType,
    activity_group: &str,
    menus: &MenuTables,
    activities: &ActivityTable,
) -> DayView {
    let day = resolve_display_day(now, anchor, day_type);
    build_day_view(day, menu_type, activity_group, menus, activities)
}

/// 今日/明日の切り替えを出すのは月〜木のみ
pub fn toggle_available(today: NaiveDate) -> bool {
    matches!(
        today.weekday(),
        Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu
    )
}
