//! UIモジュール
//!
//! メインウィンドウ、ツールバーの有効・無効制御、設定パネルを
//! 提供します。

mod controls;
mod settings;
mod window;

pub use controls::{action_enabled, ActionGraph, ActionId};
pub use settings::SettingsPanel;
pub use window::MainWindow;

/// UI状態
///
/// ツールバーの有効・無効判定に使う観測可能な状態の集約です。
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// プロデューサ接続済みかどうか
    pub connected: bool,
    /// 画像取得中かどうか
    pub acquiring: bool,
    /// 描画一時停止中かどうか
    pub pausing: bool,
    /// ステータスバーに表示する文字列
    pub status_line: String,
}
