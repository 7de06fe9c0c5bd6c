//! カメラビューア共通ライブラリ
//!
//! このクレートは、カメラビューアアプリケーションで使用される
//! 共通の機能（エラー型、設定、ロギング、時間ユーティリティ）を提供します。

pub mod config;
pub mod error;
pub mod utils;

// 主要コンポーネントを再エクスポート
pub use config::{CanvasConfig, ConfigError, RefreshRate};
pub use error::{Result, ViewerError};

/// ライブラリのバージョン
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// ライブラリを初期化
///
/// ロガーとパニックフックを設定します。アプリケーションの起動時に
/// 一度だけ呼び出してください。
pub fn initialize() {
    utils::logging::init();
    utils::logging::set_panic_hook();

    log::info!("カメラビューア共通ライブラリ初期化 - バージョン: {}", VERSION);
}
