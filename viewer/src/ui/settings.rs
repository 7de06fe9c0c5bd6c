//! 設定パネル
//!
//! 表示設定とシミュレータ設定のUIを実装します。

use egui::{ComboBox, Grid, Ui};

use cam_viewer_rs_common::{CanvasConfig, RefreshRate};

use crate::acquisition::sim::SimConfig;
use crate::acquisition::PixelFormat;

/// 設定パネル
pub struct SettingsPanel {
    /// 現在のタブ
    current_tab: String,
}

impl SettingsPanel {
    /// 新しい設定パネルを作成
    pub fn new() -> Self {
        Self {
            current_tab: "表示".to_string(),
        }
    }

    /// UIに表示
    ///
    /// いずれかの設定が変更された場合に `true` を返します。
    pub fn ui(
        &mut self,
        ui: &mut Ui,
        canvas: &mut CanvasConfig,
        producer: &mut SimConfig,
    ) -> bool {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.current_tab, "表示".to_string(), "表示");
            ui.selectable_value(&mut self.current_tab, "シミュレータ".to_string(), "シミュレータ");
        });

        ui.separator();

        match self.current_tab.as_str() {
            "表示" => self.show_display_settings(ui, canvas),
            "シミュレータ" => self.show_producer_settings(ui, producer),
            _ => false,
        }
    }

    /// 表示設定を表示
    fn show_display_settings(&self, ui: &mut Ui, canvas: &mut CanvasConfig) -> bool {
        let mut changed = false;

        Grid::new("display_settings_grid")
            .num_columns(2)
            .spacing([8.0, 8.0])
            .show(ui, |ui| {
                ui.label("表示レート:");
                ui.horizontal(|ui| {
                    for rate in [RefreshRate::Fps30, RefreshRate::Fps60] {
                        if ui
                            .radio_value(&mut canvas.refresh_rate, rate, rate.label())
                            .changed()
                        {
                            changed = true;
                        }
                    }
                });
                ui.end_row();

                ui.label("背景色:");
                if ui
                    .color_edit_button_srgb(&mut canvas.background_color)
                    .changed()
                {
                    changed = true;
                }
                ui.end_row();

                ui.label("");
                // 垂直同期の変更は次回起動時に反映される
                if ui.checkbox(&mut canvas.vsync, "垂直同期 (要再起動)").changed() {
                    changed = true;
                }
                ui.end_row();
            });

        changed
    }

    /// シミュレータ設定を表示
    fn show_producer_settings(&self, ui: &mut Ui, producer: &mut SimConfig) -> bool {
        let mut changed = false;

        Grid::new("producer_settings_grid")
            .num_columns(2)
            .spacing([8.0, 8.0])
            .show(ui, |ui| {
                ui.label("幅:");
                if ui
                    .add(egui::DragValue::new(&mut producer.width).clamp_range(16..=4096))
                    .changed()
                {
                    changed = true;
                }
                ui.end_row();

                ui.label("高さ:");
                if ui
                    .add(egui::DragValue::new(&mut producer.height).clamp_range(16..=4096))
                    .changed()
                {
                    changed = true;
                }
                ui.end_row();

                ui.label("ピクセルフォーマット:");
                ComboBox::from_id_source("sim_pixel_format")
                    .selected_text(producer.pixel_format.to_string())
                    .show_ui(ui, |ui| {
                        for format in [
                            PixelFormat::Mono8,
                            PixelFormat::Mono12,
                            PixelFormat::Rgb8,
                            PixelFormat::Bgr8,
                        ] {
                            if ui
                                .selectable_value(
                                    &mut producer.pixel_format,
                                    format,
                                    format.to_string(),
                                )
                                .changed()
                            {
                                changed = true;
                            }
                        }
                    });
                ui.end_row();

                ui.label("フレームレート:");
                if ui
                    .add(
                        egui::Slider::new(&mut producer.frame_rate, 1.0..=120.0)
                            .text("fps"),
                    )
                    .changed()
                {
                    changed = true;
                }
                ui.end_row();

                ui.label("バッファ数:");
                if ui
                    .add(egui::DragValue::new(&mut producer.num_buffers).clamp_range(1..=16))
                    .changed()
                {
                    changed = true;
                }
                ui.end_row();
            });

        changed
    }
}

impl Default for SettingsPanel {
    fn default() -> Self {
        Self::new()
    }
}
