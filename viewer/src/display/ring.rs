//! 保持バッファリング
//!
//! 表示中のバッファの保持と返却を管理します。テクスチャにコミット済みの
//! フレームは、次のフレームがコミットされるまで保持し続けることで、
//! バッファに付随するチャンクデータ等の生存を保証します。

use crate::acquisition::FrameBuffer;

/// 保持バッファの集合
///
/// 定常状態では高々1個を保持しますが、フレーム切り替えの瞬間だけ
/// 旧バッファと新バッファが同時に存在します。
#[derive(Debug, Default)]
pub struct BufferRing {
    held: Vec<FrameBuffer>,
}

impl BufferRing {
    /// 新しい空のリングを作成
    pub fn new() -> Self {
        Self { held: Vec::new() }
    }

    /// 保持中のバッファ数を取得
    pub fn len(&self) -> usize {
        self.held.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// テクスチャコミット済みのバッファを保持に追加
    ///
    /// 必ずテクスチャへのコミットが完了した後に呼び出してください。
    pub fn hold(&mut self, buffer: FrameBuffer) {
        self.held.push(buffer);
    }

    /// 最新の1個を残して残りをすべて返却
    ///
    /// ティック内の順序不変条件: 新バッファを `hold` した後でなければ
    /// 呼び出してはなりません。
    pub fn release_previous(&mut self) {
        if self.held.len() <= 1 {
            return;
        }
        let keep_from = self.held.len() - 1;
        for buffer in self.held.drain(..keep_from) {
            log::trace!("バッファを返却します: seq={}", buffer.frame().sequence);
            buffer.release();
        }
    }

    /// 保持中のバッファをすべて返却
    ///
    /// 取得停止やデタッチの際のフラッシュに使用します。空のリングに
    /// 対して呼んでも何もしません。
    pub fn release_all(&mut self) {
        for buffer in self.held.drain(..) {
            log::trace!("バッファを返却します: seq={}", buffer.frame().sequence);
            buffer.release();
        }
    }
}
