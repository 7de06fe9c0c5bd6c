//! エラー型定義
//!
//! カメラビューアアプリケーションで使用する共通エラー型を定義します。

use std::io;
use thiserror::Error;

/// ビューア共通エラー
///
/// 表示パイプラインのエラー分類。`NoProducerAttached` / `FetchTimedOut` /
/// `UnsupportedPixelFormat` は1ティックをスキップするだけの非致命エラーで、
/// `ProducerFailure` のみが呼び出し側に伝播します。
#[derive(Error, Debug)]
pub enum ViewerError {
    /// プロデューサ未接続（非致命、ティックをスキップ）
    #[error("プロデューサが接続されていません")]
    NoProducerAttached,

    /// フレーム取得のタイムアウト（非致命、ティックをスキップ）
    #[error("フレームの取得がタイムアウトしました")]
    FetchTimedOut,

    /// サポートされていないピクセルフォーマット（非致命、フレームを破棄）
    #[error("サポートされていないピクセルフォーマットです: {0}")]
    UnsupportedPixelFormat(String),

    /// プロデューサ側の失敗（当該ティックに対しては致命）
    #[error("プロデューサでエラーが発生しました: {0}")]
    ProducerFailure(String),

    /// 設定エラー
    #[error("設定エラー: {0}")]
    Config(String),

    /// 入出力エラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] io::Error),

    /// その他のエラー
    #[error("{0}")]
    Other(String),
}

impl ViewerError {
    /// ティックをスキップするだけで済む非致命エラーかどうか
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            ViewerError::NoProducerAttached
                | ViewerError::FetchTimedOut
                | ViewerError::UnsupportedPixelFormat(_)
        )
    }
}

/// 結果型のエイリアス
pub type Result<T> = std::result::Result<T, ViewerError>;
