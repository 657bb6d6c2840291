//! Meal & Play のドメインロジック
//!
//! テキストデータの解析、週番号の計算、表示内容の選択、
//! お気に入りリストの操作、オフラインキャッシュの方針をまとめています。
//! I/O はここでは一切行いません。

pub mod calendar;
pub mod menu_model;
pub mod data_parser;
pub mod day_view;
pub mod overview;
pub mod favorites;
pub mod offline_policy;
