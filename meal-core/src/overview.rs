// =====================
// 週単位の一覧表示 (献立のクイックビュー / 全週 / 活動表)
// =====================

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

use crate::calendar::{current_weekday, tomorrow_weekday, week_number, WeekNumber};
use crate::menu_model::{ActivityMoment, ActivityTable, MenuEntry, MenuTables, MenuType};

pub const NO_ACTIVITIES_FOR_GROUP: &str = "Nessuna attività disponibile per questo gruppo.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayBadge {
    Today,    // OGGI
    Tomorrow, // DOMANI
}

impl DayBadge {
    pub fn for_day(weekday: Weekday, today: NaiveDate) -> Option<Self> {
        if weekday == current_weekday(today) {
            Some(DayBadge::Today)
        } else if weekday == tomorrow_weekday(today) {
            Some(DayBadge::Tomorrow)
        } else {
            None
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            DayBadge::Today => "OGGI",
            DayBadge::Tomorrow => "DOMANI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDayCard {
    pub weekday: Weekday,
    pub menu: MenuEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<DayBadge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekOverview {
    pub week: WeekNumber,
    pub menu_type: MenuType,
    pub title: String,
    /// 現在の週か (全週表示で使う)
    pub current: bool,
    pub days: Vec<MenuDayCard>,
}

/// 1週間分の献立カード (献立がある曜日のみ)
pub fn week_overview(
    menus: &MenuTables,
    menu_type: MenuType,
    week: WeekNumber,
    today: NaiveDate,
) -> WeekOverview {
    let days = menus
        .for_type(menu_type)
        .week_days(week)
        .into_iter()
        .map(|(weekday, entry)| MenuDayCard {
            weekday,
            menu: entry.clone(),
            badge: DayBadge::for_day(weekday, today),
        })
        .collect();

    WeekOverview {
        week,
        menu_type,
        title: format!("Settimana {} - {}", week, menu_type.display_label()),
        current: false,
        days,
    }
}

/// 4週分すべて。現在週に印を付ける
pub fn all_weeks_overview(
    menus: &MenuTables,
    menu_type: MenuType,
    now: NaiveDateTime,
    anchor: NaiveDate,
) -> Vec<WeekOverview> {
    let current_week = week_number(now, anchor);

    WeekNumber::all()
        .map(|week| {
            let mut overview = week_overview(menus, menu_type, week, now.date());
            overview.title = format!("Settimana {}", week);
            overview.current = week == current_week;
            overview
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDayCard {
    pub weekday: Weekday,
    pub moments: ActivityMoment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<DayBadge>,
}

/// グループの1週間の活動表。グループが無い/空なら None
pub fn activity_week(
    activities: &ActivityTable,
    group: &str,
    today: NaiveDate,
) -> Option<Vec<ActivityDayCard>> {
    let days = activities.group_days(group);
    if days.is_empty() {
        return None;
    }

    Some(
        days.into_iter()
            .map(|(weekday, moment)| ActivityDayCard {
                weekday,
                moments: moment.clone(),
                badge: DayBadge::for_day(weekday, today),
            })
            .collect(),
    )
}
