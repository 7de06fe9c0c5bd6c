//! ユーティリティモジュール
//!
//! ロギングと時間処理の共通機能を提供します。

pub mod logging;
pub mod time;
