//! メインウィンドウ
//!
//! アプリケーションのメインウィンドウを実装します。ツールバー、
//! 表示パネル、ステータスバー、設定ウィンドウを組み立て、取得の
//! 開始・停止と描画ワーカーの寿命を管理します。

use std::sync::Arc;
use std::time::Duration;

use egui::Ui;
use parking_lot::Mutex;

use cam_viewer_rs_common::utils::time::format_elapsed;
use cam_viewer_rs_common::ViewerError;

use super::{ActionGraph, ActionId, AppState, SettingsPanel};
use crate::acquisition::sim::SimProducer;
use crate::acquisition::{FrameProducer, SharedProducer};
use crate::app::ViewerApp;
use crate::display::{Canvas, DisplayRenderer, GestureTuning, Surface};
use crate::input::InputRouter;
use crate::worker::PollCycle;

/// 統計表示の更新間隔
const STATS_INTERVAL: Duration = Duration::from_millis(250);

/// メインウィンドウ
pub struct MainWindow {
    /// アプリケーション（設定の永続化）
    app: ViewerApp,
    /// UI状態
    state: AppState,
    /// 表示キャンバス
    canvas: Canvas,
    /// 画面レンダラー
    renderer: DisplayRenderer,
    /// ツールバーの有効・無効グラフ
    actions: ActionGraph,
    /// 入力ルータ
    input: InputRouter,
    /// 設定パネル
    settings_panel: SettingsPanel,
    /// 再描画要求ワーカー
    redraw_cycle: PollCycle,
    /// 統計表示ワーカー（取得中のみ稼働）
    stats_cycle: Option<PollCycle>,
    /// 統計ワーカーからのステータス文字列キュー
    status_queue: Arc<Mutex<Vec<String>>>,
    /// 設定ウィンドウの表示状態
    show_settings: bool,
    /// エラーメッセージ
    error_message: Option<String>,
}

impl MainWindow {
    /// 新しいメインウィンドウを作成
    pub fn new(cc: &eframe::CreationContext<'_>, app: ViewerApp) -> Self {
        // デフォルトのeGUIスタイルをカスタマイズ
        let mut style = (*cc.egui_ctx.style()).clone();
        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::new(15.0, egui::FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Button,
            egui::FontId::new(15.0, egui::FontFamily::Proportional),
        );
        cc.egui_ctx.set_style(style);

        let canvas_config = app.settings().canvas.clone();
        let canvas = Canvas::new(&canvas_config, GestureTuning::default());
        let renderer =
            DisplayRenderer::new(cc.egui_ctx.clone(), canvas_config.background_color);

        // 表示レートに合わせて再描画を要求し続けるワーカー
        let ctx = cc.egui_ctx.clone();
        let mut redraw_cycle = PollCycle::new(
            "redraw-worker",
            canvas_config.refresh_rate.interval(),
            move || ctx.request_repaint(),
        );
        redraw_cycle.start();

        let mut actions = ActionGraph::new();
        let state = AppState::default();
        actions.refresh_all(&state);

        Self {
            app,
            state,
            canvas,
            renderer,
            actions,
            input: InputRouter::new(),
            settings_panel: SettingsPanel::new(),
            redraw_cycle,
            stats_cycle: None,
            status_queue: Arc::new(Mutex::new(Vec::new())),
            show_settings: false,
            error_message: None,
        }
    }

    /// プロデューサへ接続
    fn connect(&mut self) {
        self.error_message = None;
        if self.state.connected {
            self.disconnect();
        }

        let producer = Arc::new(SimProducer::new(self.app.settings().producer.clone()));
        log::info!("プロデューサへ接続しました: {}", producer.description());
        self.canvas.attach(producer);

        self.state.connected = true;
        self.actions.notify(ActionId::Connect, &self.state);
    }

    /// プロデューサから切断
    fn disconnect(&mut self) {
        if self.state.acquiring {
            self.stop_acquisition();
        }

        self.canvas.detach();
        self.renderer.clear();
        self.state.connected = false;
        self.state.status_line.clear();
        log::info!("プロデューサから切断しました");
        self.actions.notify(ActionId::Disconnect, &self.state);
    }

    /// 画像取得を開始（一時停止中なら再開）
    fn start_acquisition(&mut self) {
        if self.state.acquiring && self.state.pausing {
            self.canvas.resume_drawing();
            self.state.pausing = false;
            self.actions.notify(ActionId::StartAcquisition, &self.state);
            return;
        }

        let producer = match self.canvas.attached_producer() {
            Some(producer) => producer,
            None => return,
        };

        producer.reset_statistics();
        if let Err(e) = producer.start() {
            self.error_message = Some(e.to_string());
            log::error!("画像取得の開始に失敗しました: {}", e);
            return;
        }

        // 統計表示ワーカーを起動。プロデューサはハンドル経由で参照し、
        // 切断後はロック内の複製が尽きた時点で解放される
        let handle: SharedProducer = self.canvas.producer_handle();
        let queue = self.status_queue.clone();
        let mut cycle = PollCycle::new("stats-worker", STATS_INTERVAL, move || {
            let producer = handle.lock().clone();
            if let Some(producer) = producer {
                let snapshot = producer.statistics();
                queue.lock().push(format!(
                    "{}, {:.1} fps, 経過 {}, {} 枚",
                    producer.description(),
                    snapshot.fps,
                    format_elapsed(snapshot.elapsed_secs),
                    snapshot.frame_count
                ));
            }
        });
        cycle.start();
        self.stats_cycle = Some(cycle);

        self.state.acquiring = true;
        self.state.pausing = false;
        self.actions.notify(ActionId::StartAcquisition, &self.state);
    }

    /// 画像取得を停止
    ///
    /// 停止順序: 統計ワーカー → 保持バッファの返却 → プロデューサ。
    /// この順序によりプロデューサ停止後のバッファ参照を防ぎます。
    fn stop_acquisition(&mut self) {
        if let Some(mut cycle) = self.stats_cycle.take() {
            cycle.stop();
        }

        self.canvas.release_buffers();

        if let Some(producer) = self.canvas.attached_producer() {
            if let Err(e) = producer.stop() {
                self.error_message = Some(e.to_string());
                log::error!("画像取得の停止に失敗しました: {}", e);
            }
        }

        self.canvas.resume_drawing();
        self.state.acquiring = false;
        self.state.pausing = false;
        self.actions.notify(ActionId::StopAcquisition, &self.state);
    }

    /// 描画の一時停止を切り替え
    fn toggle_drawing(&mut self) {
        self.canvas.toggle_drawing();
        self.state.pausing = self.canvas.is_pausing();
        self.actions.notify(ActionId::ToggleDrawing, &self.state);
    }

    /// 統計ワーカーからのステータス文字列を取り込み
    fn drain_status_queue(&mut self) {
        let mut queue = self.status_queue.lock();
        if let Some(line) = queue.pop() {
            self.state.status_line = line;
        }
        queue.clear();
    }

    /// ツールバーを描画
    fn draw_toolbar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            if ui
                .add_enabled(
                    self.actions.is_enabled(ActionId::Connect),
                    egui::Button::new("接続"),
                )
                .clicked()
            {
                self.connect();
            }

            if ui
                .add_enabled(
                    self.actions.is_enabled(ActionId::Disconnect),
                    egui::Button::new("切断"),
                )
                .clicked()
            {
                self.disconnect();
            }

            ui.separator();

            if ui
                .add_enabled(
                    self.actions.is_enabled(ActionId::StartAcquisition),
                    egui::Button::new("取得開始"),
                )
                .clicked()
            {
                self.start_acquisition();
            }

            if ui
                .add_enabled(
                    self.actions.is_enabled(ActionId::StopAcquisition),
                    egui::Button::new("取得停止"),
                )
                .clicked()
            {
                self.stop_acquisition();
            }

            let pause_label = if self.state.pausing {
                "描画再開"
            } else {
                "描画停止"
            };
            if ui
                .add_enabled(
                    self.actions.is_enabled(ActionId::ToggleDrawing),
                    egui::Button::new(pause_label),
                )
                .clicked()
            {
                self.toggle_drawing();
            }

            ui.separator();

            if ui
                .add_enabled(
                    self.actions.is_enabled(ActionId::Autofit),
                    egui::Button::new("全体表示"),
                )
                .clicked()
            {
                self.canvas.autofit();
            }

            // 右寄せの接続状態表示
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if self.state.connected {
                    ui.colored_label(egui::Color32::GREEN, "接続済み");
                } else {
                    ui.colored_label(egui::Color32::RED, "未接続");
                }
            });
        });
    }

    /// メインディスプレイを描画
    fn draw_main_display(&mut self, ui: &mut Ui) {
        let panel_rect = ui.max_rect();
        let available_size = panel_rect.size();

        self.canvas
            .resize(available_size.x.max(1.0) as u32, available_size.y.max(1.0) as u32);

        // 1ティック分の取得と描画
        if let Err(e) = self.canvas.tick(&mut self.renderer) {
            self.handle_tick_error(e);
        }

        self.renderer
            .draw(ui, self.canvas.transform(), panel_rect);

        // ポインタ入力をキャンバスへ配送
        let response = ui.allocate_rect(panel_rect, egui::Sense::click_and_drag());
        let events = self.input.gather(&response, panel_rect.min);
        self.input.route(&mut self.canvas, &events);

        if !self.renderer.has_texture() && !self.state.connected {
            ui.allocate_ui_at_rect(panel_rect, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label("プロデューサに接続されていません");
                });
            });
        }
    }

    /// ティック中のエラーを処理
    fn handle_tick_error(&mut self, error: ViewerError) {
        log::error!("フレーム取得中にエラーが発生しました: {}", error);
        self.error_message = Some(error.to_string());
        // プロデューサ側の失敗からは取得を止めて立て直す
        if self.state.acquiring {
            self.stop_acquisition();
        }
    }

    /// 設定ウィンドウを描画
    fn draw_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        let mut changed = false;
        let mut new_background = None;
        let mut new_interval = None;

        egui::Window::new("設定")
            .open(&mut open)
            .collapsible(true)
            .resizable(false)
            .show(ctx, |ui| {
                let settings = self.app.settings_mut();
                changed = self
                    .settings_panel
                    .ui(ui, &mut settings.canvas, &mut settings.producer);
                if changed {
                    new_background = Some(settings.canvas.background_color);
                    new_interval = Some(settings.canvas.refresh_rate.interval());
                }
            });
        self.show_settings = open;

        if changed {
            if let Some(background) = new_background {
                self.renderer.set_background(background);
            }
            if let Some(interval) = new_interval {
                self.redraw_cycle.set_interval(interval);
            }
            self.app.save_settings();
        }
    }
}

impl eframe::App for MainWindow {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.drain_status_queue();
        self.actions.refresh_all(&self.state);

        // トップバー
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("ファイル", |ui| {
                    if ui.button("終了").clicked() {
                        ui.close_menu();
                        frame.close();
                    }
                });

                ui.menu_button("表示", |ui| {
                    if ui.button("全体表示").clicked() {
                        ui.close_menu();
                        self.canvas.autofit();
                    }
                });

                ui.menu_button("設定", |ui| {
                    if ui.button("環境設定...").clicked() {
                        ui.close_menu();
                        self.show_settings = true;
                    }
                });
            });
        });

        // ツールバー
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        // ステータスバー
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.state.status_line.is_empty() {
                    ui.label("待機中");
                } else {
                    ui.label(&self.state.status_line);
                }
            });
        });

        // メインパネル（映像表示領域）
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_main_display(ui);
        });

        // 設定ウィンドウ
        if self.show_settings {
            self.draw_settings_window(ctx);
        }

        // エラーメッセージ表示
        if let Some(error) = self.error_message.clone() {
            egui::Window::new("エラー")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.colored_label(egui::Color32::RED, &error);
                    if ui.button("閉じる").clicked() {
                        self.error_message = None;
                    }
                });
        }
    }

    fn on_close_event(&mut self) -> bool {
        self.app.save_settings();
        true
    }
}

impl Drop for MainWindow {
    fn drop(&mut self) {
        // 取得と各ワーカーを止めてから破棄する
        self.disconnect();
        self.redraw_cycle.stop();
    }
}
