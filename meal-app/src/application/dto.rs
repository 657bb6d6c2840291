use meal_core::day_view::{DayType, DayView};
use meal_core::favorites::Favorite;
use serde::Serialize;

/// お気に入り1件分のカード (表示用)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteView {
    pub favorite: Favorite,
    pub show_toggle: bool,    // 月〜木のみ今日/明日の切り替えを出す
    pub selected: DayType,    // 切り替えの現在値 (土日は無視される)
    pub view: DayView,
}

/// 画面下部の設定情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorInfo {
    pub label: String,        // 例: "lunedì 1 gennaio 2024"
    pub from_config: bool,    // false = 直近の月曜で代用
    pub current_week: u8,
}
