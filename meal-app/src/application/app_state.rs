use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use meal_core::calendar::{long_date_label, week_number, WeekNumber};
use meal_core::day_view::{select_day_view, toggle_available, DayType};
use meal_core::favorites::{Favorite, FavoriteFields, FavoriteId};
use meal_core::menu_model::{ActivityTable, MenuTables, MenuType};
use meal_core::overview::{self, ActivityDayCard, WeekOverview};

use crate::application::data_loader::LoadedData;
use crate::application::dto::{AnchorInfo, FavoriteView};
use crate::error::StorageError;
use crate::infrastructure::favorites_repo::FavoritesRepository;
use crate::infrastructure::storage::KeyValueStore;

/// 読み込んだデータとお気に入り、カードごとの今日/明日の選択
pub struct AppState<S: KeyValueStore> {
    anchor: NaiveDate,
    anchor_from_config: bool,
    menus: MenuTables,
    activities: ActivityTable,
    favorites: FavoritesRepository<S>,
    // 保存しない。無ければ Today
    day_toggles: HashMap<FavoriteId, DayType>,
}

impl<S: KeyValueStore> AppState<S> {
    pub fn new(data: LoadedData, favorites: FavoritesRepository<S>) -> Self {
        Self {
            anchor: data.anchor,
            anchor_from_config: data.anchor_from_config,
            menus: data.menus,
            activities: data.activities,
            favorites,
            day_toggles: HashMap::new(),
        }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn menus(&self) -> &MenuTables {
        &self.menus
    }

    pub fn activities(&self) -> &ActivityTable {
        &self.activities
    }

    pub fn favorites(&self) -> &FavoritesRepository<S> {
        &self.favorites
    }

    pub fn current_week(&self, now: NaiveDateTime) -> WeekNumber {
        week_number(now, self.anchor)
    }

    pub fn anchor_info(&self, now: NaiveDateTime) -> AnchorInfo {
        AnchorInfo {
            label: long_date_label(self.anchor),
            from_config: self.anchor_from_config,
            current_week: self.current_week(now).get(),
        }
    }

    // =====================
    // お気に入りカード
    // =====================

    fn view_for(&self, favorite: &Favorite, now: NaiveDateTime) -> FavoriteView {
        let selected = self.day_toggles.get(&favorite.id).copied().unwrap_or_default();
        let view = select_day_view(
            now,
            self.anchor,
            selected,
            favorite.menu_type,
            &favorite.activity_group,
            &self.menus,
            &self.activities,
        );

        FavoriteView {
            favorite: favorite.clone(),
            show_toggle: toggle_available(now.date()),
            selected,
            view,
        }
    }

    /// 保存順
    pub fn favorite_views(&self, now: NaiveDateTime) -> Vec<FavoriteView> {
        self.favorites
            .list()
            .iter()
            .map(|favorite| self.view_for(favorite, now))
            .collect()
    }

    pub fn favorite_view(&self, id: &str, now: NaiveDateTime) -> Option<FavoriteView> {
        self.favorites.get(id).map(|favorite| self.view_for(favorite, now))
    }

    /// カード1枚の今日/明日を切り替えて、そのカードだけ作り直す
    pub fn toggle_favorite_day(
        &mut self,
        id: &str,
        day_type: DayType,
        now: NaiveDateTime,
    ) -> Option<FavoriteView> {
        if self.favorites.get(id).is_none() {
            return None;
        }

        self.day_toggles.insert(id.to_string(), day_type);
        self.favorite_view(id, now)
    }

    pub fn add_favorite(&mut self, fields: FavoriteFields) -> Result<FavoriteId, StorageError> {
        self.favorites.add(fields)
    }

    pub fn update_favorite(&mut self, id: &str, fields: FavoriteFields) -> Result<bool, StorageError> {
        self.favorites.update(id, fields)
    }

    pub fn delete_favorite(&mut self, id: &str) -> Result<bool, StorageError> {
        self.day_toggles.remove(id);
        self.favorites.delete(id)
    }

    pub fn move_favorite_up(&mut self, id: &str) -> Result<bool, StorageError> {
        self.favorites.move_up(id)
    }

    pub fn move_favorite_down(&mut self, id: &str) -> Result<bool, StorageError> {
        self.favorites.move_down(id)
    }

    // =====================
    // 週の一覧
    // =====================

    /// 現在週の献立
    pub fn week_overview(&self, menu_type: MenuType, now: NaiveDateTime) -> WeekOverview {
        overview::week_overview(&self.menus, menu_type, self.current_week(now), now.date())
    }

    pub fn all_weeks(&self, menu_type: MenuType, now: NaiveDateTime) -> Vec<WeekOverview> {
        overview::all_weeks_overview(&self.menus, menu_type, now, self.anchor)
    }

    pub fn activity_week(&self, group: &str, now: NaiveDateTime) -> Option<Vec<ActivityDayCard>> {
        overview::activity_week(&self.activities, group, now.date())
    }

    pub fn activity_groups(&self) -> Vec<&str> {
        self.activities.group_names()
    }
}
