use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::menu_model::MenuType;

pub type FavoriteId = String;

/// 保存された (献立, 活動グループ) の組み合わせ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: FavoriteId,
    pub name: String,
    pub menu_type: MenuType,
    pub activity_group: String,
}

/// 編集可能な項目 (id 以外)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteFields {
    pub name: String,
    pub menu_type: MenuType,
    pub activity_group: String,
}

/// お気に入り一覧 (並び順 = 表示順)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesList(Vec<Favorite>);

impl FavoritesList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存済み JSON から復元する。壊れていれば空にする
    pub fn from_json(blob: Option<&str>) -> Self {
        let Some(blob) = blob else {
            return Self::new();
        };

        match serde_json::from_str::<FavoritesList>(blob) {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "stored favorites are corrupt, starting empty");
                Self::new()
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|f| f.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Favorite> {
        self.0.iter().find(|f| f.id == id)
    }

    /// 末尾に追加
    pub fn add(&mut self, id: FavoriteId, fields: FavoriteFields) {
        self.0.push(Favorite {
            id,
            name: fields.name,
            menu_type: fields.menu_type,
            activity_group: fields.activity_group,
        });
    }

    /// 位置を保ったまま書き換える。見つからなければ何もしない
    pub fn update(&mut self, id: &str, fields: FavoriteFields) -> bool {
        let Some(favorite) = self.0.iter_mut().find(|f| f.id == id) else {
            return false;
        };

        favorite.name = fields.name;
        favorite.menu_type = fields.menu_type;
        favorite.activity_group = fields.activity_group;
        true
    }

    pub fn delete(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    /// 1つ前と入れ替える。先頭なら何もしない
    pub fn move_up(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) if index > 0 => {
                self.0.swap(index - 1, index);
                true
            }
            _ => false,
        }
    }

    /// 1つ後と入れ替える。末尾なら何もしない
    pub fn move_down(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) if index + 1 < self.0.len() => {
                self.0.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Favorite> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a FavoritesList {
    type Item = &'a Favorite;
    type IntoIter = std::slice::Iter<'a, Favorite>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// 数値を 36 進の小文字で表す
pub fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return String::from("0");
    }

    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

/// 新しい id: 時刻(ミリ秒) + 連番 をそれぞれ 36 進で
pub fn make_favorite_id(timestamp_ms: u64, sequence: u64) -> FavoriteId {
    format!("{}{}", to_base36(timestamp_ms), to_base36(sequence))
}

#[cfg(test)]
mod favorites_tests {
    use super::*;

    fn fields(name: &str) -> FavoriteFields {
        FavoriteFields {
            name: name.to_string(),
            menu_type: MenuType::Nido,
            activity_group: String::from("nido"),
        }
    }

    fn sample() -> FavoritesList {
        let mut list = FavoritesList::new();
        list.add(String::from("a"), fields("Anna"));
        list.add(String::from("b"), fields("Bruno"));
        list.add(String::from("c"), fields("Carla"));
        list
    }

    fn ids(list: &FavoritesList) -> Vec<&str> {
        list.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_add_appends() {
        let list = sample();
        assert_eq!(ids(&list), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_move_up_and_down() {
        let mut list = sample();

        assert!(!list.move_up("a")); // 先頭
        assert!(!list.move_down("c")); // 末尾
        assert_eq!(ids(&list), vec!["a", "b", "c"]);

        assert!(list.move_up("c"));
        assert_eq!(ids(&list), vec!["a", "c", "b"]);

        assert!(list.move_down("a"));
        assert_eq!(ids(&list), vec!["c", "a", "b"]);

        assert!(!list.move_up("zzz"));
        assert_eq!(ids(&list), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_update_in_place() {
        let mut list = sample();
        let changed = list.update(
            "b",
            FavoriteFields {
                name: String::from("Bruno (grandi)"),
                menu_type: MenuType::Infanzia,
                activity_group: String::from("infanzia"),
            },
        );

        assert!(changed);
        assert_eq!(ids(&list), vec!["a", "b", "c"]);
        let b = list.get("b").unwrap();
        assert_eq!(b.name, "Bruno (grandi)");
        assert_eq!(b.menu_type, MenuType::Infanzia);

        let before = list.clone();
        assert!(!list.update("missing", fields("X")));
        assert_eq!(list, before);
    }

    #[test]
    fn test_delete() {
        let mut list = sample();
        let before = list.clone();

        assert!(!list.delete("missing"));
        assert_eq!(list, before);

        assert!(list.delete("b"));
        assert_eq!(ids(&list), vec!["a", "c"]);
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let mut list = sample();
        list.move_up("c");

        let json = list.to_json().unwrap();
        let restored = FavoritesList::from_json(Some(&json));
        assert_eq!(restored, list);
    }

    #[test]
    fn test_json_uses_browser_field_names() {
        let json = r#"[{"id":"lq1x2","name":"Casa","menuType":"infanzia","activityGroup":"primavera"}]"#;
        let list = FavoritesList::from_json(Some(json));

        let favorite = list.get("lq1x2").unwrap();
        assert_eq!(favorite.menu_type, MenuType::Infanzia);
        assert_eq!(favorite.activity_group, "primavera");
        assert_eq!(list.to_json().unwrap(), json);
    }

    #[test]
    fn test_missing_or_corrupt_blob_is_empty() {
        assert!(FavoritesList::from_json(None).is_empty());
        assert!(FavoritesList::from_json(Some("{not json")).is_empty());
        assert!(FavoritesList::from_json(Some(r#"{"id":"x"}"#)).is_empty());
    }

    #[test]
    fn test_make_favorite_id() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(make_favorite_id(36, 1), "101");
        assert_ne!(make_favorite_id(1_700_000_000_000, 0), make_favorite_id(1_700_000_000_000, 1));
    }
}
