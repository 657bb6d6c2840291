// =====================
// 献立・活動のデータモデル
// =====================

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::calendar::{WeekNumber, DISPLAY_ORDER};

/// 献立の種類 (年齢グループ)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuType {
    Nido,
    Infanzia,
}

impl MenuType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuType::Nido => "nido",
            MenuType::Infanzia => "infanzia",
        }
    }

    /// 画面表示用の名前
    pub fn display_label(&self) -> &'static str {
        match self {
            MenuType::Nido => "Piccoli",
            MenuType::Infanzia => "Grandi",
        }
    }
}

impl fmt::Display for MenuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenuType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nido" => Ok(MenuType::Nido),
            "infanzia" => Ok(MenuType::Infanzia),
            other => Err(format!("unknown menu type: {other}")),
        }
    }
}

/// 1日分の献立
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    pub first_course: String,  // primo
    pub second_course: String, // secondo
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_dish: Option<String>, // contorno
    pub fruit: String,         // frutta
}

/// 1つの献立種類に対する 週 -> 曜日 -> 献立
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuTable {
    entries: HashMap<WeekNumber, HashMap<Weekday, MenuEntry>>,
}

impl MenuTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同じ (週, 曜日) は後勝ちで上書き
    pub fn insert(&mut self, week: WeekNumber, weekday: Weekday, entry: MenuEntry) {
        self.entries.entry(week).or_default().insert(weekday, entry);
    }

    pub fn get(&self, week: WeekNumber, weekday: Weekday) -> Option<&MenuEntry> {
        self.entries.get(&week)?.get(&weekday)
    }

    /// 指定週の献立を月曜から順に返す
    pub fn week_days(&self, week: WeekNumber) -> Vec<(Weekday, &MenuEntry)> {
        DISPLAY_ORDER
            .iter()
            .filter_map(|day| self.get(week, *day).map(|entry| (*day, entry)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// nido / infanzia 両方の献立
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuTables {
    pub nido: MenuTable,
    pub infanzia: MenuTable,
}

impl MenuTables {
    pub fn for_type(&self, menu_type: MenuType) -> &MenuTable {
        match menu_type {
            MenuType::Nido => &self.nido,
            MenuType::Infanzia => &self.infanzia,
        }
    }
}

// --------------------------------------------------------
// 活動
// --------------------------------------------------------

/// 1日の時間帯ラベル
pub const MOMENT_LABELS: [&str; 7] = [
    "Ingresso",
    "Attività 1",
    "Attività 2",
    "Pranzo",
    "Riposo",
    "Merenda",
    "Uscita",
];

/// "-" が指定された枠に入る文言
pub const FREE_ACTIVITY: &str = "Attività libera";

/// 1日分の活動 (7枠固定)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActivityMoment([String; 7]);

impl ActivityMoment {
    /// 午前・午後の活動から7枠を組み立てる
    ///
    /// ```text
    /// [Ingresso, Attività 1, Attività 2, Pranzo, Riposo, Merenda, Uscita]
    ///  morning   morning     afternoon   (固定の文言)
    /// ```
    pub fn from_fields(morning: &str, afternoon: &str) -> Self {
        let morning = free_if_dash(morning);
        let afternoon = free_if_dash(afternoon);

        Self([
            morning.clone(),
            morning,
            afternoon,
            String::from("Pranzo"),
            String::from("Riposo"),
            String::from("Merenda"),
            String::from("Uscita"),
        ])
    }

    pub fn slots(&self) -> &[String; 7] {
        &self.0
    }

    /// (ラベル, 内容) の組
    pub fn labeled(&self) -> impl Iterator<Item = (&'static str, &str)> {
        MOMENT_LABELS
            .iter()
            .copied()
            .zip(self.0.iter().map(String::as_str))
    }
}

fn free_if_dash(field: &str) -> String {
    if field == "-" {
        String::from(FREE_ACTIVITY)
    } else {
        field.to_string()
    }
}

/// グループ名 -> 曜日 -> 活動
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityTable {
    groups: HashMap<String, HashMap<Weekday, ActivityMoment>>,
}

impl ActivityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: &str, weekday: Weekday, moment: ActivityMoment) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(weekday, moment);
    }

    pub fn get(&self, group: &str, weekday: Weekday) -> Option<&ActivityMoment> {
        self.groups.get(group)?.get(&weekday)
    }

    /// 指定グループの活動を月曜から土曜の順に返す
    pub fn group_days(&self, group: &str) -> Vec<(Weekday, &ActivityMoment)> {
        let Some(days) = self.groups.get(group) else {
            return Vec::new();
        };

        DISPLAY_ORDER
            .iter()
            .filter_map(|day| days.get(day).map(|moment| (*day, moment)))
            .collect()
    }

    /// グループ名 (ソート済み)
    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
