//! 時間ユーティリティ
//!
//! 時間処理に関連するユーティリティ機能を提供します。

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// 現在のUNIXタイムスタンプ（ミリ秒）を取得
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_millis() as u64
}

/// 経過秒数を `H:MM:SS` 形式の文字列に変換
///
/// ステータスバーの経過時間表示に使用します。
pub fn format_elapsed(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

/// 経過時間を測定するタイマー
pub struct Timer {
    /// 開始時刻
    start: Instant,
}

impl Timer {
    /// 新しいタイマーを作成して開始
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// 経過時間を取得
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// 経過時間をミリ秒で取得
    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// タイマーをリセット
    pub fn reset(&mut self) {
        self.start = Instant::now();
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "0:00:00");
        assert_eq!(format_elapsed(59), "0:00:59");
        assert_eq!(format_elapsed(61), "0:01:01");
        assert_eq!(format_elapsed(3600), "1:00:00");
        assert_eq!(format_elapsed(3661), "1:01:01");
        assert_eq!(format_elapsed(90061), "25:01:01");
    }

    #[test]
    fn test_timer_reset() {
        let mut timer = Timer::start();
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.elapsed() >= Duration::from_millis(5));
        timer.reset();
        assert!(timer.elapsed() < Duration::from_millis(5));
    }
}
