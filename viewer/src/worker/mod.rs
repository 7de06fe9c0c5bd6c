//! 周期ワーカーモジュール
//!
//! 一定間隔でコールバックを呼び続けるワーカースレッドを提供します。
//! 画面の再描画要求と統計表示の更新に使用します。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// 周期実行ワーカー
///
/// `start` でスレッドを起動し、停止されるまで `work` を `interval`
/// 間隔で呼び続けます。`stop` はスレッドの合流まで待つため、復帰後に
/// コールバックが呼ばれることはありません。
pub struct PollCycle {
    name: String,
    interval: Duration,
    work: Arc<dyn Fn() + Send + Sync>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PollCycle {
    /// 新しいワーカーを作成（未起動）
    pub fn new<F>(name: &str, interval: Duration, work: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            interval,
            work: Arc::new(work),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// 実行中かどうか
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// 現在の実行間隔を取得
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// ワーカースレッドを起動
    ///
    /// 既に実行中の場合は何もしません。
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();
        let work = self.work.clone();
        let interval = self.interval;
        let name = self.name.clone();

        log::debug!("周期ワーカーを起動します: {} ({:?})", name, interval);
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || {
                while running.load(Ordering::SeqCst) {
                    work();
                    thread::sleep(interval);
                }
            })
            .ok();
        self.handle = handle;
    }

    /// ワーカースレッドを停止して合流
    ///
    /// 実行中のコールバックがあれば完了を待ちます。未起動なら何も
    /// しません。
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            log::debug!("周期ワーカーを停止します: {}", self.name);
            let _ = handle.join();
        }
    }

    /// 実行間隔を変更
    ///
    /// 実行中の場合はワーカーを再起動して新しい間隔を反映します。
    pub fn set_interval(&mut self, interval: Duration) {
        if self.interval == interval {
            return;
        }
        self.interval = interval;
        if self.is_running() {
            self.stop();
            self.start();
        }
    }
}

impl Drop for PollCycle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_invokes_work_periodically() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let mut cycle = PollCycle::new("test-tick", Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cycle.start();
        assert!(cycle.is_running());
        thread::sleep(Duration::from_millis(60));
        cycle.stop();

        assert!(count.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_no_invocation_after_stop_returns() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let mut cycle = PollCycle::new("test-stop", Duration::from_millis(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cycle.start();
        thread::sleep(Duration::from_millis(20));
        cycle.stop();
        assert!(!cycle.is_running());

        // 停止復帰後は呼び出しが増えない
        let frozen = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), frozen);
    }

    #[test]
    fn test_start_is_idempotent() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let mut cycle = PollCycle::new("test-idem", Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cycle.start();
        cycle.start();
        assert!(cycle.is_running());
        cycle.stop();
    }

    #[test]
    fn test_restart_after_stop() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let mut cycle = PollCycle::new("test-restart", Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cycle.start();
        thread::sleep(Duration::from_millis(20));
        cycle.stop();
        let first_run = count.load(Ordering::SeqCst);

        cycle.start();
        thread::sleep(Duration::from_millis(20));
        cycle.stop();
        assert!(count.load(Ordering::SeqCst) > first_run);
    }

    #[test]
    fn test_set_interval_restarts_running_worker() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let mut cycle = PollCycle::new("test-interval", Duration::from_millis(50), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cycle.start();
        cycle.set_interval(Duration::from_millis(5));
        assert_eq!(cycle.interval(), Duration::from_millis(5));
        assert!(cycle.is_running());
        thread::sleep(Duration::from_millis(40));
        cycle.stop();

        assert!(count.load(Ordering::SeqCst) >= 3);
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let mut cycle = PollCycle::new("test-noop", Duration::from_millis(5), || {});
        cycle.stop();
        assert!(!cycle.is_running());
    }
}
