use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::Serialize;

// =====================
// 曜日名
// =====================

/// 曜日名テーブル (index 0 = 日曜)
pub const DAY_NAMES: [&str; 7] = [
    "Domenica",
    "Lunedì",
    "Martedì",
    "Mercoledì",
    "Giovedì",
    "Venerdì",
    "Sabato",
];

const MONTH_NAMES: [&str; 12] = [
    "gennaio",
    "febbraio",
    "marzo",
    "aprile",
    "maggio",
    "giugno",
    "luglio",
    "agosto",
    "settembre",
    "ottobre",
    "novembre",
    "dicembre",
];

const MS_PER_DAY: i64 = 1000 * 60 * 60 * 24;

pub trait ItalianWeekday {
    fn to_italian(&self) -> &'static str;
}

impl ItalianWeekday for Weekday {
    fn to_italian(&self) -> &'static str {
        DAY_NAMES[self.num_days_from_sunday() as usize]
    }
}

/// 月曜から土曜までの表示順
pub const DISPLAY_ORDER: [Weekday; 6] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

// =====================
// 週番号
// =====================

/// 献立サイクルの週番号 (1〜4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct WeekNumber(u8);

impl WeekNumber {
    pub const FIRST: WeekNumber = WeekNumber(1);
    pub const LAST: WeekNumber = WeekNumber(4);

    /// 範囲外なら None (データ読み込み用)
    pub fn new(n: u8) -> Option<Self> {
        if (Self::FIRST.0..=Self::LAST.0).contains(&n) {
            Some(Self(n))
        } else {
            None
        }
    }

    /// 範囲外は端に寄せる (週番号計算用)
    pub fn clamped(n: i64) -> Self {
        Self(n.clamp(Self::FIRST.0 as i64, Self::LAST.0 as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// 1, 2, 3, 4 の順に返す
    pub fn all() -> impl Iterator<Item = WeekNumber> {
        (Self::FIRST.0..=Self::LAST.0).map(WeekNumber)
    }
}

impl fmt::Display for WeekNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =====================
// 日付の解決
// =====================

pub fn current_weekday(date: NaiveDate) -> Weekday {
    date.weekday()
}

/// 翌日の曜日 (日曜の次は月曜)
pub fn tomorrow_weekday(date: NaiveDate) -> Weekday {
    date.weekday().succ()
}

pub fn current_day_name(date: NaiveDate) -> &'static str {
    current_weekday(date).to_italian()
}

pub fn tomorrow_day_name(date: NaiveDate) -> &'static str {
    tomorrow_weekday(date).to_italian()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 基準の月曜日からの経過で週番号を求める
///
/// ```text
///  anchor (Mon)
///  v
///  day 0 ..  6  -> week 1
///  day 7 .. 13  -> week 2
///  day 14.. 20  -> week 3
///  day 21.. 27  -> week 4
///  day 28..     -> week 4 (clamp)
///  day < 0      -> week 1 (clamp)
/// ```
///
/// 経過日数は時刻込みで切り上げる。
/// 例えば基準日 6 日後の 10:00 は経過 7 日として扱われ、week 2 になる。
pub fn week_number(now: NaiveDateTime, anchor: NaiveDate) -> WeekNumber {
    let diff_ms = (now - anchor.and_time(NaiveTime::MIN)).num_milliseconds();

    // ceil(diff_ms / MS_PER_DAY)
    let diff_days = -(-diff_ms).div_euclid(MS_PER_DAY);
    let week = diff_days.div_euclid(7) + 1;

    WeekNumber::clamped(week)
}

/// 日付のみ (0:00 として扱う) の週番号
pub fn week_number_for_date(date: NaiveDate, anchor: NaiveDate) -> WeekNumber {
    week_number(date.and_time(NaiveTime::MIN), anchor)
}

/// 基準日が読めなかったときの代替: 今日以前で直近の月曜日
pub fn fallback_anchor(today: NaiveDate) -> NaiveDate {
    today - Duration::days(today.weekday().num_days_from_monday() as i64)
}

/// 設定日付の表示用ラベル (例: "lunedì 1 gennaio 2024")
pub fn long_date_label(date: NaiveDate) -> String {
    format!(
        "{} {} {} {}",
        date.weekday().to_italian().to_lowercase(),
        date.day(),
        MONTH_NAMES[date.month0() as usize],
        date.year()
    )
}
