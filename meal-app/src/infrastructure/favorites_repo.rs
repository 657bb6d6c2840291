use chrono::Utc;
use meal_core::favorites::{make_favorite_id, Favorite, FavoriteFields, FavoriteId, FavoritesList};
use tracing::{info, warn};

use crate::error::StorageError;
use crate::infrastructure::storage::KeyValueStore;

/// ストレージ上のキー
pub const FAVORITES_KEY: &str = "combinations";

/// お気に入り一覧と保存先
///
/// 変更のたびに一覧全体を書き戻す。書き込みに失敗してもメモリ上の変更は残る。
pub struct FavoritesRepository<S: KeyValueStore> {
    store: S,
    list: FavoritesList,
    // 同じミリ秒内でも id が被らないようにする連番 (リポジトリごと)
    next_sequence: u64,
}

impl<S: KeyValueStore> FavoritesRepository<S> {
    /// 保存済みの一覧を読む。読めなければ空
    pub fn load(store: S) -> Self {
        let blob = match store.get_item(FAVORITES_KEY) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "failed to read favorites, starting empty");
                None
            }
        };

        let list = FavoritesList::from_json(blob.as_deref());
        info!(count = list.len(), "favorites loaded");

        Self {
            store,
            list,
            next_sequence: 0,
        }
    }

    pub fn list(&self) -> &FavoritesList {
        &self.list
    }

    pub fn get(&self, id: &str) -> Option<&Favorite> {
        self.list.get(id)
    }

    pub fn add(&mut self, fields: FavoriteFields) -> Result<FavoriteId, StorageError> {
        let id = self.next_id();
        self.list.add(id.clone(), fields);
        self.persist()?;
        Ok(id)
    }

    pub fn update(&mut self, id: &str, fields: FavoriteFields) -> Result<bool, StorageError> {
        let changed = self.list.update(id, fields);
        self.persist()?;
        Ok(changed)
    }

    pub fn delete(&mut self, id: &str) -> Result<bool, StorageError> {
        let changed = self.list.delete(id);
        self.persist()?;
        Ok(changed)
    }

    pub fn move_up(&mut self, id: &str) -> Result<bool, StorageError> {
        let changed = self.list.move_up(id);
        self.persist()?;
        Ok(changed)
    }

    pub fn move_down(&mut self, id: &str) -> Result<bool, StorageError> {
        let changed = self.list.move_down(id);
        self.persist()?;
        Ok(changed)
    }

    fn next_id(&mut self) -> FavoriteId {
        loop {
            let timestamp = Utc::now().timestamp_millis().max(0) as u64;
            let sequence = self.next_sequence;
            self.next_sequence += 1;
            let id = make_favorite_id(timestamp, sequence);
            if !self.list.contains_id(&id) {
                return id;
            }
        }
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let json = self.list.to_json()?;
        self.store.set_item(FAVORITES_KEY, &json)
    }
}
