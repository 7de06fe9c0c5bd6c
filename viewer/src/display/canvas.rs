//! 表示キャンバス
//!
//! 表示パイプラインの中心となる状態機械です。ティックごとに高々1枚の
//! フレームを非ブロッキングで取得し、デコード、テクスチャ更新、
//! バッファの保持・返却を決められた順序で行います。

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use cam_viewer_rs_common::{CanvasConfig, Result, ViewerError};

use crate::acquisition::{FetchError, FrameProducer, SharedProducer};

use super::{decode, BufferRing, GestureTuning, Surface, TextureSink, ViewTransform};

/// フレーム取得のタイムアウト
///
/// 「届いていなければ即座に戻る」ための実質ゼロのタイムアウト。
/// これが1ティックの最悪待ち時間の上限になります。
pub const FETCH_TIMEOUT: Duration = Duration::from_micros(100);

/// 表示サーフェスの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    /// プロデューサ未接続
    Idle,
    /// プロデューサ接続済み・描画一時停止中
    Attached,
    /// 新フレームを取得して描画中
    Live,
}

/// 1ティックの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 新しいフレームをテクスチャへコミットした
    NewFrame,
    /// 新フレームなし。直前のテクスチャを再描画する
    Redrawn,
}

/// 表示キャンバス
pub struct Canvas {
    /// 現在のプロデューサハンドル（統計ワーカーと共有）
    producer: SharedProducer,
    ring: BufferRing,
    transform: ViewTransform,
    /// 取得は続けるが描画はしないフラグ
    pause_drawing: bool,
    fetch_timeout: Duration,
}

impl Canvas {
    /// 新しいキャンバスを作成
    pub fn new(config: &CanvasConfig, tuning: GestureTuning) -> Self {
        Self {
            producer: Arc::new(Mutex::new(None)),
            ring: BufferRing::new(),
            transform: ViewTransform::new(config.surface_width, config.surface_height, tuning),
            pause_drawing: false,
            fetch_timeout: FETCH_TIMEOUT,
        }
    }

    /// プロデューサを接続
    pub fn attach(&mut self, producer: Arc<dyn FrameProducer>) {
        *self.producer.lock() = Some(producer);
    }

    /// プロデューサを切り離し
    ///
    /// 保持中のバッファをすべて返却してから切り離します。これを怠ると
    /// バッファが永久に保持されたままになります。
    pub fn detach(&mut self) {
        self.ring.release_all();
        *self.producer.lock() = None;
        self.pause_drawing = false;
    }

    /// 共有プロデューサハンドルを取得（統計ワーカー用）
    pub fn producer_handle(&self) -> SharedProducer {
        self.producer.clone()
    }

    /// 接続中のプロデューサを取得
    ///
    /// ロックはハンドルの複製の間だけ保持します。
    pub fn attached_producer(&self) -> Option<Arc<dyn FrameProducer>> {
        self.producer.lock().clone()
    }

    /// 現在の状態を取得
    pub fn state(&self) -> SurfaceState {
        if self.producer.lock().is_none() {
            SurfaceState::Idle
        } else if self.pause_drawing {
            SurfaceState::Attached
        } else {
            SurfaceState::Live
        }
    }

    /// 描画を一時停止または再開
    pub fn pause_drawing(&mut self, pause: bool) {
        self.pause_drawing = pause;
    }

    /// 描画の一時停止を切り替え
    pub fn toggle_drawing(&mut self) {
        self.pause_drawing = !self.pause_drawing;
    }

    /// 一時停止中かどうか
    pub fn is_pausing(&self) -> bool {
        self.pause_drawing
    }

    /// 描画を再開
    pub fn resume_drawing(&mut self) {
        self.pause_drawing = false;
    }

    /// 保持中のバッファをすべて返却
    ///
    /// 取得停止の際は、プロデューサを止める前に必ず呼び出してください。
    pub fn release_buffers(&mut self) {
        self.ring.release_all();
    }

    /// 保持中のバッファ数を取得
    pub fn held_buffers(&self) -> usize {
        self.ring.len()
    }

    /// ビュー変換を取得
    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    /// 表示面にソース画像全体が収まるように調整
    pub fn autofit(&mut self) {
        self.transform.autofit();
    }
}

impl Surface for Canvas {
    fn tick(&mut self, sink: &mut dyn TextureSink) -> Result<TickOutcome> {
        // 一時停止中は取得も描画更新もせず、直前のテクスチャを出し続ける
        if self.pause_drawing {
            return Ok(TickOutcome::Redrawn);
        }

        // プロデューサ未接続はエラーではなくスキップ
        let producer = match self.attached_producer() {
            Some(producer) => producer,
            None => return Ok(TickOutcome::Redrawn),
        };

        let buffer = match producer.fetch(self.fetch_timeout) {
            Ok(buffer) => buffer,
            // タイムアウト内に何も届かなければ次のティックを待つ
            Err(FetchError::TimedOut) => return Ok(TickOutcome::Redrawn),
            Err(FetchError::Failed(message)) => {
                return Err(ViewerError::ProducerFailure(message))
            }
        };

        // 表示対象外のペイロードは、パイプラインを詰まらせないために
        // 取得だけ行って即返却する
        if !buffer.payload_kind().is_displayable() {
            log::trace!(
                "表示対象外のペイロードを返却します: seq={}",
                buffer.frame().sequence
            );
            buffer.release();
            return Ok(TickOutcome::Redrawn);
        }

        match decode(buffer.frame()) {
            Ok(image) => {
                // フレームサイズの変化は論理表示面のリサイズとして反映する
                if self.transform.set_source_size(image.width, image.height) {
                    log::debug!(
                        "ソースサイズを変更しました: {} x {}",
                        image.width,
                        image.height
                    );
                }

                // 順序不変条件: コミット → 新バッファ保持 → 旧バッファ返却
                sink.commit(&image);
                self.ring.hold(buffer);
                self.ring.release_previous();
                Ok(TickOutcome::NewFrame)
            }
            Err(reject) => {
                // デコード棄却は非致命。直前のテクスチャを保ち、フレームは返す
                log::debug!(
                    "フレームを破棄しました: seq={}, 理由: {}",
                    buffer.frame().sequence,
                    reject
                );
                buffer.release();
                Ok(TickOutcome::Redrawn)
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.transform.set_surface_size(width, height);
    }

    fn on_pointer_down(&mut self, x: f32, y: f32) {
        self.transform.on_pointer_down(x, y);
    }

    fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.transform.on_pointer_move(x, y);
    }

    fn on_pointer_up(&mut self) {
        self.transform.on_pointer_up();
    }

    fn on_scroll(&mut self, delta: f32) {
        self.transform.on_scroll(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{
        FrameBuffer, PayloadKind, PixelFormat, RawFrame, Statistics, StatisticsSnapshot,
    };
    use crate::display::DecodedImage;
    use std::collections::VecDeque;
    use std::sync::mpsc::{self, Receiver};

    // コミットを記録するだけのテクスチャ転送先
    #[derive(Default)]
    struct RecordingSink {
        committed: Vec<DecodedImage>,
    }

    impl TextureSink for RecordingSink {
        fn commit(&mut self, image: &DecodedImage) {
            self.committed.push(image.clone());
        }
    }

    // あらかじめ積んだ結果を順番に返すテスト用プロデューサ
    struct ScriptedProducer {
        outcomes: Mutex<VecDeque<std::result::Result<FrameBuffer, FetchError>>>,
        stats: Statistics,
    }

    impl ScriptedProducer {
        fn new(
            outcomes: Vec<std::result::Result<FrameBuffer, FetchError>>,
        ) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                stats: Statistics::new(),
            }
        }
    }

    impl FrameProducer for ScriptedProducer {
        fn start(&self) -> Result<()> {
            Ok(())
        }

        fn stop(&self) -> Result<()> {
            Ok(())
        }

        fn is_acquiring(&self) -> bool {
            true
        }

        fn fetch(&self, _timeout: Duration) -> std::result::Result<FrameBuffer, FetchError> {
            self.outcomes
                .lock()
                .pop_front()
                .unwrap_or(Err(FetchError::TimedOut))
        }

        fn statistics(&self) -> StatisticsSnapshot {
            self.stats.snapshot()
        }

        fn reset_statistics(&self) {
            self.stats.reset();
        }

        fn description(&self) -> String {
            "scripted".to_string()
        }
    }

    fn mono_frame(sequence: u64, width: u32, height: u32) -> RawFrame {
        RawFrame {
            pixel_format: PixelFormat::Mono8,
            width,
            height,
            bytes_per_sample: 1,
            payload_kind: PayloadKind::Image,
            sequence,
            payload: vec![0; (width * height) as usize],
        }
    }

    fn counted_buffer(frame: RawFrame) -> (FrameBuffer, Receiver<RawFrame>) {
        let (tx, rx) = mpsc::channel();
        (FrameBuffer::with_reclaim(frame, tx), rx)
    }

    fn test_canvas() -> Canvas {
        Canvas::new(&CanvasConfig::default(), GestureTuning::default())
    }

    #[test]
    fn test_state_transitions() {
        let mut canvas = test_canvas();
        assert_eq!(canvas.state(), SurfaceState::Idle);

        let producer = Arc::new(ScriptedProducer::new(vec![]));
        canvas.attach(producer);
        assert_eq!(canvas.state(), SurfaceState::Live);

        canvas.pause_drawing(true);
        assert_eq!(canvas.state(), SurfaceState::Attached);

        canvas.resume_drawing();
        assert_eq!(canvas.state(), SurfaceState::Live);

        canvas.detach();
        assert_eq!(canvas.state(), SurfaceState::Idle);
    }

    #[test]
    fn test_tick_without_producer_redraws() {
        let mut canvas = test_canvas();
        let mut sink = RecordingSink::default();
        assert_eq!(canvas.tick(&mut sink).unwrap(), TickOutcome::Redrawn);
        assert!(sink.committed.is_empty());
    }

    #[test]
    fn test_tick_commits_new_frame_and_resizes() {
        let mut canvas = test_canvas();
        let (buffer, _rx) = counted_buffer(mono_frame(1, 320, 240));
        canvas.attach(Arc::new(ScriptedProducer::new(vec![Ok(buffer)])));

        let mut sink = RecordingSink::default();
        assert_eq!(canvas.tick(&mut sink).unwrap(), TickOutcome::NewFrame);
        assert_eq!(sink.committed.len(), 1);
        assert_eq!(canvas.transform().source_size(), [320, 240]);
        assert_eq!(canvas.held_buffers(), 1);
    }

    #[test]
    fn test_tick_timeout_is_silent() {
        let mut canvas = test_canvas();
        canvas.attach(Arc::new(ScriptedProducer::new(vec![Err(
            FetchError::TimedOut,
        )])));

        let mut sink = RecordingSink::default();
        assert_eq!(canvas.tick(&mut sink).unwrap(), TickOutcome::Redrawn);
    }

    #[test]
    fn test_tick_propagates_producer_failure() {
        let mut canvas = test_canvas();
        canvas.attach(Arc::new(ScriptedProducer::new(vec![Err(
            FetchError::Failed("切断".to_string()),
        )])));

        let mut sink = RecordingSink::default();
        let error = canvas.tick(&mut sink).unwrap_err();
        assert!(matches!(error, ViewerError::ProducerFailure(_)));

        // 次のティックは通常どおり続行できる
        assert_eq!(canvas.tick(&mut sink).unwrap(), TickOutcome::Redrawn);
    }

    #[test]
    fn test_custom_format_keeps_last_texture_and_releases_buffer() {
        let mut canvas = test_canvas();
        let mut bad = mono_frame(1, 4, 4);
        bad.pixel_format = PixelFormat::Custom(0x8100);
        let (buffer, rx) = counted_buffer(bad);
        canvas.attach(Arc::new(ScriptedProducer::new(vec![Ok(buffer)])));

        let mut sink = RecordingSink::default();
        assert_eq!(canvas.tick(&mut sink).unwrap(), TickOutcome::Redrawn);
        // テクスチャは更新されず、バッファは即返却される
        assert!(sink.committed.is_empty());
        assert!(rx.try_recv().is_ok());
        assert_eq!(canvas.held_buffers(), 0);
    }

    #[test]
    fn test_non_displayable_payload_is_fetched_but_not_drawn() {
        let mut canvas = test_canvas();
        let mut frame = mono_frame(1, 4, 4);
        frame.payload_kind = PayloadKind::Other;
        let (buffer, rx) = counted_buffer(frame);
        canvas.attach(Arc::new(ScriptedProducer::new(vec![Ok(buffer)])));

        let mut sink = RecordingSink::default();
        assert_eq!(canvas.tick(&mut sink).unwrap(), TickOutcome::Redrawn);
        assert!(sink.committed.is_empty());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_pause_skips_fetch() {
        let (buffer, rx) = counted_buffer(mono_frame(1, 4, 4));
        let mut canvas = test_canvas();
        canvas.attach(Arc::new(ScriptedProducer::new(vec![Ok(buffer)])));
        canvas.pause_drawing(true);

        let mut sink = RecordingSink::default();
        assert_eq!(canvas.tick(&mut sink).unwrap(), TickOutcome::Redrawn);
        // 一時停止中はフレームに触れない
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_previous_buffer_released_after_new_commit() {
        let (first, first_rx) = counted_buffer(mono_frame(1, 4, 4));
        let (second, second_rx) = counted_buffer(mono_frame(2, 4, 4));
        let mut canvas = test_canvas();
        canvas.attach(Arc::new(ScriptedProducer::new(vec![Ok(first), Ok(second)])));

        let mut sink = RecordingSink::default();
        canvas.tick(&mut sink).unwrap();
        assert!(first_rx.try_recv().is_err());

        canvas.tick(&mut sink).unwrap();
        // 旧バッファは新フレームのコミット後に返却され、新は保持される
        assert!(first_rx.try_recv().is_ok());
        assert!(second_rx.try_recv().is_err());
        assert_eq!(canvas.held_buffers(), 1);
    }

    #[test]
    fn test_detach_flushes_two_held_buffers() {
        // 2個保持した状態でのデタッチは、ちょうど2回の返却と空の保持集合になる
        let (first, first_rx) = counted_buffer(mono_frame(1, 4, 4));
        let (second, second_rx) = counted_buffer(mono_frame(2, 4, 4));
        let mut canvas = test_canvas();
        canvas.attach(Arc::new(ScriptedProducer::new(vec![Ok(first), Ok(second)])));

        let mut sink = RecordingSink::default();
        canvas.tick(&mut sink).unwrap();
        // 2個目の保持を作るため、返却前の状態を直接組み立てる
        let (third, third_rx) = counted_buffer(mono_frame(3, 4, 4));
        canvas.ring.hold(third);
        assert_eq!(canvas.held_buffers(), 2);

        canvas.detach();
        assert_eq!(canvas.held_buffers(), 0);
        assert!(first_rx.try_recv().is_ok());
        assert!(first_rx.try_recv().is_err());
        assert!(third_rx.try_recv().is_ok());
        assert!(third_rx.try_recv().is_err());
        let _ = second_rx;
    }
}
