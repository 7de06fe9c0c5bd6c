//! 取得統計
//!
//! フレームレート、経過時間、取得枚数の計測機能を提供します。
//! 統計ワーカーと取得側の両方から参照されるため、内部をロックで保護します。

use std::time::Instant;

use parking_lot::Mutex;

/// 統計の内部状態
struct Inner {
    /// 計測開始時刻
    epoch: Instant,
    /// 取得フレーム数
    frames: u64,
}

/// 取得統計
pub struct Statistics {
    inner: Mutex<Inner>,
}

/// 統計のスナップショット
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsSnapshot {
    /// フレームレート (フレーム毎秒)
    pub fps: f64,
    /// 計測開始からの経過秒数
    pub elapsed_secs: u64,
    /// 取得フレーム数
    pub frame_count: u64,
}

impl Statistics {
    /// 新しい統計を作成
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                epoch: Instant::now(),
                frames: 0,
            }),
        }
    }

    /// 統計をリセット
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.epoch = Instant::now();
        inner.frames = 0;
    }

    /// フレーム取得を1枚分記録
    pub fn record_frame(&self) {
        self.inner.lock().frames += 1;
    }

    /// スナップショットを取得
    pub fn snapshot(&self) -> StatisticsSnapshot {
        let inner = self.inner.lock();
        let elapsed = inner.epoch.elapsed();
        let secs = elapsed.as_secs_f64();
        let fps = if secs > 0.0 {
            inner.frames as f64 / secs
        } else {
            0.0
        };
        StatisticsSnapshot {
            fps,
            elapsed_secs: elapsed.as_secs(),
            frame_count: inner.frames,
        }
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}
