//! メインアプリケーション
//!
//! 設定の読み込みと永続化を担当します。ウィンドウ生成前に設定を
//! 確定させる必要があるため（垂直同期など）、UIとは独立しています。

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use cam_viewer_rs_common::{config, CanvasConfig};

use crate::acquisition::sim::SimConfig;

/// 保存される設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    /// キャンバス設定
    pub canvas: CanvasConfig,
    /// シミュレーションプロデューサ設定
    pub producer: SimConfig,
}

/// アプリケーション
pub struct ViewerApp {
    /// 設定
    settings: AppSettings,
    /// 設定ファイルのパス
    settings_path: PathBuf,
}

impl ViewerApp {
    /// 新しいアプリケーションを作成
    ///
    /// 設定ファイルが存在すれば読み込み、なければ既定値を使います。
    pub fn new() -> Self {
        let settings_path = Self::settings_path();
        let settings = Self::load_settings(&settings_path);
        Self {
            settings,
            settings_path,
        }
    }

    /// 設定ファイルのパスを取得
    fn settings_path() -> PathBuf {
        let dir = config::config_dir();
        if !dir.exists() {
            if let Err(e) = fs::create_dir_all(&dir) {
                log::warn!("設定ディレクトリの作成に失敗しました: {}", e);
            }
        }
        dir.join("settings.json")
    }

    /// 設定を読み込む
    fn load_settings(path: &PathBuf) -> AppSettings {
        if !path.exists() {
            return AppSettings::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<AppSettings>(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("設定ファイルのパースに失敗しました: {}", e);
                    AppSettings::default()
                }
            },
            Err(e) => {
                log::warn!("設定ファイルの読み込みに失敗しました: {}", e);
                AppSettings::default()
            }
        }
    }

    /// 設定を保存
    pub fn save_settings(&self) {
        match serde_json::to_string_pretty(&self.settings) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.settings_path, json) {
                    log::warn!("設定ファイルの保存に失敗しました: {}", e);
                }
            }
            Err(e) => {
                log::warn!("設定のシリアライズに失敗しました: {}", e);
            }
        }
    }

    /// 設定を取得
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// 設定を可変参照で取得
    pub fn settings_mut(&mut self) -> &mut AppSettings {
        &mut self.settings
    }
}

impl Default for ViewerApp {
    fn default() -> Self {
        Self::new()
    }
}
