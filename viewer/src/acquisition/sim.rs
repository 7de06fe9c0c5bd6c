//! シミュレーションプロデューサ
//!
//! 実デバイスなしで表示パイプラインを動かすためのテストパターン
//! ジェネレータです。専用スレッドで一定レートのフレームを生成し、
//! 有限個のインフライトバッファを返却キュー経由で再利用します。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use cam_viewer_rs_common::{Result, ViewerError};

use super::{
    FetchError, FrameBuffer, FrameProducer, PayloadKind, PixelFormat, RawFrame,
    StatisticsSnapshot, Statistics,
};

/// シミュレーションプロデューサの設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// フレームの幅（ピクセル）
    pub width: u32,
    /// フレームの高さ（ピクセル）
    pub height: u32,
    /// 生成するピクセルフォーマット
    pub pixel_format: PixelFormat,
    /// 生成レート（フレーム毎秒）
    pub frame_rate: f64,
    /// インフライトバッファの上限
    pub num_buffers: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            pixel_format: PixelFormat::Mono8,
            frame_rate: 30.0,
            num_buffers: 4,
        }
    }
}

/// 稼働中のジェネレータスレッドの状態
struct Worker {
    handle: JoinHandle<()>,
    reclaim: Sender<RawFrame>,
}

/// テストパターンを生成するフレームプロデューサ
pub struct SimProducer {
    config: SimConfig,
    stats: Statistics,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<Worker>>,
    frames: Mutex<Option<Receiver<RawFrame>>>,
}

impl SimProducer {
    /// 新しいシミュレーションプロデューサを作成
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            stats: Statistics::new(),
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
            frames: Mutex::new(None),
        }
    }

    /// 設定を取得
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

impl FrameProducer for SimProducer {
    fn start(&self) -> Result<()> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            // 既に開始済み
            return Ok(());
        }

        if !matches!(
            self.config.pixel_format,
            PixelFormat::Mono8 | PixelFormat::Mono12 | PixelFormat::Rgb8 | PixelFormat::Bgr8
        ) {
            return Err(ViewerError::Config(format!(
                "シミュレーションが対応していないフォーマットです: {}",
                self.config.pixel_format
            )));
        }

        let (frame_tx, frame_rx) = mpsc::sync_channel::<RawFrame>(self.config.num_buffers.max(1));
        let (reclaim_tx, reclaim_rx) = mpsc::channel::<RawFrame>();

        self.running.store(true, Ordering::Relaxed);
        let running = self.running.clone();
        let config = self.config.clone();

        let handle = thread::Builder::new()
            .name("sim-producer".to_string())
            .spawn(move || generator_loop(&config, &running, frame_tx, reclaim_rx))?;

        *self.frames.lock() = Some(frame_rx);
        *worker = Some(Worker {
            handle,
            reclaim: reclaim_tx,
        });

        log::info!(
            "シミュレーションプロデューサを開始しました: {} ({:.1} fps)",
            self.description(),
            self.config.frame_rate
        );
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let taken = self.worker.lock().take();
        if let Some(worker) = taken {
            self.running.store(false, Ordering::Relaxed);
            *self.frames.lock() = None;
            if worker.handle.join().is_err() {
                return Err(ViewerError::ProducerFailure(
                    "ジェネレータスレッドが異常終了しました".to_string(),
                ));
            }
            log::info!("シミュレーションプロデューサを停止しました");
        }
        Ok(())
    }

    fn is_acquiring(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn fetch(&self, timeout: Duration) -> std::result::Result<FrameBuffer, FetchError> {
        if !self.is_acquiring() {
            // 未開始は「まだ届いていない」と同じ扱い
            return Err(FetchError::TimedOut);
        }

        let frames = self.frames.lock();
        let rx = match frames.as_ref() {
            Some(rx) => rx,
            None => return Err(FetchError::TimedOut),
        };

        match rx.recv_timeout(timeout) {
            Ok(frame) => {
                self.stats.record_frame();
                let reclaim = self
                    .worker
                    .lock()
                    .as_ref()
                    .map(|worker| worker.reclaim.clone());
                Ok(match reclaim {
                    Some(reclaim) => FrameBuffer::with_reclaim(frame, reclaim),
                    None => FrameBuffer::new(frame),
                })
            }
            Err(mpsc::RecvTimeoutError::Timeout) => Err(FetchError::TimedOut),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(FetchError::Failed(
                "ジェネレータスレッドが停止しています".to_string(),
            )),
        }
    }

    fn statistics(&self) -> StatisticsSnapshot {
        self.stats.snapshot()
    }

    fn reset_statistics(&self) {
        self.stats.reset();
    }

    fn description(&self) -> String {
        format!(
            "W: {} x H: {}, {}",
            self.config.width, self.config.height, self.config.pixel_format
        )
    }
}

impl Drop for SimProducer {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// ジェネレータスレッドの本体
///
/// 返却されたフレームの割り当てを再利用しながら、設定レートで
/// テストパターンを送出します。表示側が追い付いていない間は
/// フレームを破棄します。
fn generator_loop(
    config: &SimConfig,
    running: &AtomicBool,
    frame_tx: mpsc::SyncSender<RawFrame>,
    reclaim_rx: Receiver<RawFrame>,
) {
    let period = Duration::from_secs_f64(1.0 / config.frame_rate.max(1.0));
    let bytes_per_sample = if config.pixel_format.bit_depth().unwrap_or(8) > 8 {
        2
    } else {
        1
    };
    let mut sequence: u64 = 0;

    while running.load(Ordering::Relaxed) {
        // 返却済みバッファの割り当てを回収して再利用する
        let mut payload = match reclaim_rx.try_recv() {
            Ok(frame) => {
                let mut buf = frame.payload;
                buf.clear();
                buf
            }
            Err(_) => Vec::new(),
        };

        fill_pattern(&mut payload, config, sequence);

        let frame = RawFrame {
            pixel_format: config.pixel_format,
            width: config.width,
            height: config.height,
            bytes_per_sample,
            payload_kind: PayloadKind::Image,
            sequence,
            payload,
        };

        match frame_tx.try_send(frame) {
            Ok(()) => {}
            // 表示側が追い付いていない。このフレームは破棄する
            Err(TrySendError::Full(_)) => {
                log::trace!("フレーム {} を破棄しました（バッファ満杯）", sequence);
            }
            Err(TrySendError::Disconnected(_)) => break,
        }
        sequence = sequence.wrapping_add(1);

        thread::sleep(period);
    }
}

/// 移動するグラデーションのテストパターンを書き込む
fn fill_pattern(payload: &mut Vec<u8>, config: &SimConfig, sequence: u64) {
    let (width, height) = (config.width as u64, config.height as u64);
    match config.pixel_format {
        PixelFormat::Mono8 => {
            payload.reserve((width * height) as usize);
            for y in 0..height {
                for x in 0..width {
                    payload.push(((x + y + sequence) & 0xFF) as u8);
                }
            }
        }
        PixelFormat::Mono12 => {
            payload.reserve((width * height * 2) as usize);
            for y in 0..height {
                for x in 0..width {
                    let value = (((x + y + sequence) * 16) & 0x0FFF) as u16;
                    payload.extend_from_slice(&value.to_le_bytes());
                }
            }
        }
        PixelFormat::Rgb8 | PixelFormat::Bgr8 => {
            let swapped = config.pixel_format == PixelFormat::Bgr8;
            payload.reserve((width * height * 3) as usize);
            for y in 0..height {
                for x in 0..width {
                    let r = ((x + sequence) & 0xFF) as u8;
                    let g = (y & 0xFF) as u8;
                    let b = (sequence & 0xFF) as u8;
                    if swapped {
                        payload.extend_from_slice(&[b, g, r]);
                    } else {
                        payload.extend_from_slice(&[r, g, b]);
                    }
                }
            }
        }
        // start() で検査済み
        _ => unreachable!("未対応フォーマット"),
    }
}
