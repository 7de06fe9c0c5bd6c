//! 設定管理
//!
//! キャンバス設定の読み込み、保存、および管理機能を提供します。

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// 設定エラー
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O エラー
    #[error("設定の読み書き中にI/Oエラーが発生しました: {0}")]
    IoError(#[from] io::Error),

    /// JSON エラー
    #[error("JSONの解析に失敗しました: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML デシリアライズエラー
    #[error("TOMLの解析に失敗しました: {0}")]
    TomlDeError(#[from] toml::de::Error),

    /// TOML シリアライズエラー
    #[error("TOMLのシリアライズに失敗しました: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// サポートされていない設定形式
    #[error("サポートされていない設定形式です: {0}")]
    UnsupportedFormat(String),
}

/// 設定形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON 形式
    Json,
    /// TOML 形式
    Toml,
}

impl ConfigFormat {
    /// ファイル拡張子から設定形式を判定
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// 表示リフレッシュレート
///
/// 再描画ワーカーの周期。30fpsなら1/30秒、60fpsなら1/60秒間隔で
/// 再描画を要求します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshRate {
    /// 30fps (1/30秒間隔)
    Fps30,
    /// 60fps (1/60秒間隔)
    Fps60,
}

impl RefreshRate {
    /// 再描画間隔を取得
    pub fn interval(&self) -> Duration {
        match self {
            RefreshRate::Fps30 => Duration::from_secs_f64(1.0 / 30.0),
            RefreshRate::Fps60 => Duration::from_secs_f64(1.0 / 60.0),
        }
    }

    /// 表示用ラベルを取得
    pub fn label(&self) -> &'static str {
        match self {
            RefreshRate::Fps30 => "30 fps",
            RefreshRate::Fps60 => "60 fps",
        }
    }
}

impl Default for RefreshRate {
    fn default() -> Self {
        RefreshRate::Fps30
    }
}

/// キャンバス設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// 表示面の幅（ピクセル）
    pub surface_width: u32,
    /// 表示面の高さ（ピクセル）
    pub surface_height: u32,
    /// 表示リフレッシュレート
    pub refresh_rate: RefreshRate,
    /// 背景色 (RGB)
    pub background_color: [u8; 3],
    /// 垂直同期を有効にするかどうか
    pub vsync: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            surface_width: 640,
            surface_height: 480,
            refresh_rate: RefreshRate::default(),
            // グレー背景
            background_color: [128, 128, 128],
            vsync: true,
        }
    }
}

impl CanvasConfig {
    /// 設定ファイルから読み込み
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        match ConfigFormat::from_path(path) {
            Some(ConfigFormat::Json) => Ok(serde_json::from_str(&content)?),
            Some(ConfigFormat::Toml) => Ok(toml::from_str(&content)?),
            None => Err(ConfigError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }

    /// 設定ファイルへ保存
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = match ConfigFormat::from_path(path) {
            Some(ConfigFormat::Json) => serde_json::to_string_pretty(self)?,
            Some(ConfigFormat::Toml) => toml::to_string_pretty(self)?,
            None => {
                return Err(ConfigError::UnsupportedFormat(
                    path.display().to_string(),
                ))
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, content)?;
        Ok(())
    }
}

/// アプリケーションの設定ディレクトリを取得
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cam-viewer-rs")
}
