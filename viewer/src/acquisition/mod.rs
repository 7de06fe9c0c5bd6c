//! 画像取得モジュール
//!
//! フレームプロデューサとの境界を定義します。プロデューサは自身の
//! スレッドでフレームを生成し、表示側は `fetch` で1枚ずつ取り出して、
//! 表示し終えたバッファを `release` で返却します。

mod format;
pub mod sim;
mod stats;

pub use format::{FormatClass, PixelFormat};
pub use stats::{Statistics, StatisticsSnapshot};

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

use cam_viewer_rs_common::Result;

/// ペイロード種別
///
/// バッファの内容の分類。表示対象になるのは画像系の種別のみです。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// 単一画像
    Image,
    /// チャンクデータ付き画像
    ChunkImage,
    /// マルチパート画像
    MultiPart,
    /// その他（取得はするが表示しない）
    Other,
}

impl PayloadKind {
    /// 表示対象の種別かどうか
    pub fn is_displayable(&self) -> bool {
        matches!(
            self,
            PayloadKind::Image | PayloadKind::ChunkImage | PayloadKind::MultiPart
        )
    }
}

/// 生フレーム
///
/// プロデューサが生成した1枚分の画像データ。届いた後は不変で、
/// 所有権は返却されるまで表示パイプラインにあります。
#[derive(Debug)]
pub struct RawFrame {
    /// ピクセルフォーマット
    pub pixel_format: PixelFormat,
    /// 画像の幅（ピクセル）
    pub width: u32,
    /// 画像の高さ（ピクセル）
    pub height: u32,
    /// サンプル1つあたりのバイト数 (1 または 2)
    pub bytes_per_sample: u32,
    /// ペイロード種別
    pub payload_kind: PayloadKind,
    /// 単調増加のシーケンス番号
    pub sequence: u64,
    /// ペイロードバイト列
    pub payload: Vec<u8>,
}

/// 取得済みバッファ
///
/// 生フレームと、プロデューサへの返却ハンドルの組。`release` を呼ぶまで
/// 付随データ（チャンクデータ等）の生存が保証されます。返却ハンドルを
/// 持たないバッファの `release` は何もしません。
#[derive(Debug)]
pub struct FrameBuffer {
    frame: RawFrame,
    reclaim: Option<Sender<RawFrame>>,
}

impl FrameBuffer {
    /// 返却ハンドルなしのバッファを作成
    pub fn new(frame: RawFrame) -> Self {
        Self {
            frame,
            reclaim: None,
        }
    }

    /// 返却ハンドル付きのバッファを作成
    pub fn with_reclaim(frame: RawFrame, reclaim: Sender<RawFrame>) -> Self {
        Self {
            frame,
            reclaim: Some(reclaim),
        }
    }

    /// フレームへの参照を取得
    pub fn frame(&self) -> &RawFrame {
        &self.frame
    }

    /// ペイロード種別を取得
    pub fn payload_kind(&self) -> PayloadKind {
        self.frame.payload_kind
    }

    /// バッファをプロデューサへ返却
    ///
    /// プロデューサ側が既に停止している場合、返却は単に破棄になります。
    pub fn release(self) {
        if let Some(reclaim) = self.reclaim {
            let _ = reclaim.send(self.frame);
        }
    }
}

/// フレーム取得エラー
#[derive(Error, Debug)]
pub enum FetchError {
    /// タイムアウト内にフレームが届かなかった（非致命）
    #[error("タイムアウト内にフレームが届きませんでした")]
    TimedOut,

    /// プロデューサ側の失敗
    #[error("フレームの取得に失敗しました: {0}")]
    Failed(String),
}

/// フレームプロデューサ
///
/// 取得エンジンとの境界。メソッドは `&self` を取り、実装側が内部可変性で
/// 状態を管理します。これにより呼び出し側のロックが `fetch` のブロック
/// 区間をまたぐことはありません。
pub trait FrameProducer: Send + Sync {
    /// 画像取得を開始
    fn start(&self) -> Result<()>;

    /// 画像取得を停止
    fn stop(&self) -> Result<()>;

    /// 取得中かどうか
    fn is_acquiring(&self) -> bool;

    /// 次のフレームを取得
    ///
    /// `timeout` 以内に届かなければ `FetchError::TimedOut` を返します。
    fn fetch(&self, timeout: Duration) -> std::result::Result<FrameBuffer, FetchError>;

    /// 取得統計のスナップショットを取得
    fn statistics(&self) -> StatisticsSnapshot;

    /// 取得統計をリセット
    fn reset_statistics(&self);

    /// ステータス表示用の説明文字列 (`W: .. x H: .., フォーマット`)
    fn description(&self) -> String;
}

/// 現在のプロデューサハンドル
///
/// UIスレッドと統計ワーカーで共有します。ロックはハンドルの複製・差し替えの
/// 間だけ保持し、`fetch` 中は保持しません。
pub type SharedProducer = Arc<Mutex<Option<Arc<dyn FrameProducer>>>>;
