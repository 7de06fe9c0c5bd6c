//! 描画モジュール
//!
//! デコード済み画像をGPUテクスチャへ転送し、ビュー変換が決めた矩形へ
//! 貼り付けて描画します。

use egui::{Color32, ColorImage, Rect, TextureHandle, TextureOptions};

use super::{DecodedImage, TextureSink, ViewTransform};

/// ディスプレイレンダラ
///
/// 直近にコミットされたフレームのテクスチャを保持します。新フレームが
/// 届かないティックでは同じテクスチャを再描画します。
pub struct DisplayRenderer {
    ctx: egui::Context,
    texture: Option<TextureHandle>,
    image_size: [u32; 2],
    background: Color32,
}

impl DisplayRenderer {
    /// 新しいレンダラを作成
    pub fn new(ctx: egui::Context, background: [u8; 3]) -> Self {
        Self {
            ctx,
            texture: None,
            image_size: [0, 0],
            background: Color32::from_rgb(background[0], background[1], background[2]),
        }
    }

    /// 背景色を設定
    pub fn set_background(&mut self, background: [u8; 3]) {
        self.background = Color32::from_rgb(background[0], background[1], background[2]);
    }

    /// テクスチャを保持しているかどうか
    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    /// 直近にコミットされた画像のサイズを取得
    pub fn image_size(&self) -> [u32; 2] {
        self.image_size
    }

    /// テクスチャを破棄
    ///
    /// プロデューサの切り離し後に呼ぶと表示が背景色へ戻ります。
    pub fn clear(&mut self) {
        self.texture = None;
        self.image_size = [0, 0];
    }

    /// 現在のテクスチャをパネルへ描画
    ///
    /// パネル全体を背景色で塗りつぶした上で、ビュー変換が算出した
    /// 矩形へテクスチャを貼り付けます。
    pub fn draw(&self, ui: &mut egui::Ui, transform: &ViewTransform, panel_rect: Rect) {
        let painter = ui.painter_at(panel_rect);
        painter.rect_filled(panel_rect, 0.0, self.background);

        let texture = match &self.texture {
            Some(texture) => texture,
            None => return,
        };

        let (min, max) = transform.screen_rect();
        let rect = Rect::from_min_max(
            panel_rect.min + egui::vec2(min[0], min[1]),
            panel_rect.min + egui::vec2(max[0], max[1]),
        );
        painter.image(
            texture.id(),
            rect,
            Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            Color32::WHITE,
        );
    }
}

impl TextureSink for DisplayRenderer {
    fn commit(&mut self, image: &DecodedImage) {
        let size = [image.width as usize, image.height as usize];
        let pixels: Vec<Color32> = match image.channels {
            1 => image.pixels.iter().map(|&v| Color32::from_gray(v)).collect(),
            3 => image
                .pixels
                .chunks_exact(3)
                .map(|px| Color32::from_rgb(px[0], px[1], px[2]))
                .collect(),
            4 => image
                .pixels
                .chunks_exact(4)
                .map(|px| Color32::from_rgba_unmultiplied(px[0], px[1], px[2], px[3]))
                .collect(),
            other => {
                log::warn!("コミットできないチャンネル数です: {}", other);
                return;
            }
        };
        let color_image = ColorImage { size, pixels };

        match &mut self.texture {
            Some(texture) => texture.set(color_image, TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(self.ctx
                        .load_texture("canvas", color_image, TextureOptions::LINEAR));
            }
        }
        self.image_size = [image.width, image.height];
    }
}
