//! ビュー変換モジュール
//!
//! 固定サイズのソース画像を可変サイズの表示面へ写像する投影
//! （パンオフセットとズーム倍率）を計算します。ズームはスクロール入力の
//! 累積値（translate）から `2^(-translate/stride)` で導出し、累積値を
//! `±(power×stride)` に制限することで滑らかで有界な指数ズームを得ます。

/// ジェスチャ調整定数
///
/// 入力デバイスの感触に合わせたプラットフォーム別の既定値を持ちますが、
/// 設定で上書きできる単一の構造体に集約しています。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTuning {
    /// ズーム1段分のスクロール量
    pub zoom_stride: f32,
    /// ズーム段数の上限 (2のべき指数)
    pub zoom_power: f32,
    /// ドラッグ移動量の倍率
    pub pan_adjust: f32,
}

impl Default for GestureTuning {
    #[cfg(target_os = "macos")]
    fn default() -> Self {
        Self {
            zoom_stride: 4.0,
            zoom_power: 7.0,
            pan_adjust: 2.0,
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn default() -> Self {
        Self {
            zoom_stride: 7.0,
            zoom_power: 5.0,
            pan_adjust: 1.0,
        }
    }
}

/// 正射影行列を作成
///
/// 行ベクトル規約（平行移動成分は最終行）の4x4行列を返します。
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> [[f32; 4]; 4] {
    let mut m = [[0.0f32; 4]; 4];
    m[0][0] = 2.0 / (right - left);
    m[1][1] = 2.0 / (top - bottom);
    m[2][2] = -2.0 / (far - near);
    m[3][0] = -(right + left) / (right - left);
    m[3][1] = -(top + bottom) / (top - bottom);
    m[3][2] = -(far + near) / (far - near);
    m[3][3] = 1.0;
    m
}

/// 投影の計算結果
///
/// 正射影行列と、中央寄せされた矩形の4頂点（triangle strip順）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// 正射影行列
    pub matrix: [[f32; 4]; 4],
    /// 頂点位置 [左下, 右下, 左上, 右上]
    pub vertices: [[f32; 2]; 4],
}

/// ビュー変換
///
/// パン・ズームの現在値と、そこから導出した投影を保持します。
#[derive(Debug, Clone)]
pub struct ViewTransform {
    tuning: GestureTuning,
    /// スクロール累積値
    translate: f32,
    /// 最後に投影を再計算したときの累積値
    latest_translate: f32,
    /// ズーム倍率
    magnification: f32,
    /// パンオフセット (x, y)
    pan: [f32; 2],
    /// ソース画像サイズ
    source_size: [u32; 2],
    /// 表示面サイズ
    surface_size: [u32; 2],
    /// ドラッグ中かどうか
    dragging: bool,
    /// 直前のポインタ位置
    origin: [f32; 2],
    projection: Projection,
}

impl ViewTransform {
    /// 新しいビュー変換を作成
    ///
    /// ソースサイズは最初のフレームが届くまで表示面サイズと同じです。
    pub fn new(width: u32, height: u32, tuning: GestureTuning) -> Self {
        let mut transform = Self {
            tuning,
            translate: 0.0,
            latest_translate: 0.0,
            magnification: 1.0,
            pan: [0.0, 0.0],
            source_size: [width, height],
            surface_size: [width, height],
            dragging: false,
            origin: [0.0, 0.0],
            projection: Projection {
                matrix: [[0.0; 4]; 4],
                vertices: [[0.0; 2]; 4],
            },
        };
        transform.recompute();
        transform
    }

    /// 現在のズーム倍率を取得
    pub fn magnification(&self) -> f32 {
        self.magnification
    }

    /// 現在のパンオフセットを取得
    pub fn pan(&self) -> [f32; 2] {
        self.pan
    }

    /// 現在のスクロール累積値を取得
    pub fn translate(&self) -> f32 {
        self.translate
    }

    /// 現在の投影を取得
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// ソース画像サイズを取得
    pub fn source_size(&self) -> [u32; 2] {
        self.source_size
    }

    /// 表示面サイズを取得
    pub fn surface_size(&self) -> [u32; 2] {
        self.surface_size
    }

    /// ソース画像サイズを設定
    ///
    /// サイズが変わった場合のみ投影を再計算し、`true` を返します。
    pub fn set_source_size(&mut self, width: u32, height: u32) -> bool {
        if self.source_size == [width, height] {
            return false;
        }
        self.source_size = [width, height];
        self.recompute();
        true
    }

    /// 表示面サイズを設定
    ///
    /// サイズが変わった場合のみ投影を再計算し、`true` を返します。
    pub fn set_surface_size(&mut self, width: u32, height: u32) -> bool {
        if self.surface_size == [width, height] {
            return false;
        }
        self.surface_size = [width, height];
        self.recompute();
        true
    }

    /// 投影を再計算
    ///
    /// 投影範囲: left = pan.x, right = 表示面幅×ズーム + pan.x（縦も同様）。
    /// 頂点矩形はソース画像を表示面の中央に置くようオフセットします。
    pub fn recompute(&mut self) {
        let ratio = self.magnification;
        let [w, h] = [self.source_size[0] as f32, self.source_size[1] as f32];
        let [cw, ch] = [self.surface_size[0] as f32, self.surface_size[1] as f32];

        let matrix = ortho(
            self.pan[0],
            cw * ratio + self.pan[0],
            self.pan[1],
            ch * ratio + self.pan[1],
            -1.0,
            1.0,
        );

        // 中央寄せオフセット
        let x = ((cw * ratio - w) / 2.0).trunc();
        let y = ((ch * ratio - h) / 2.0).trunc();

        self.projection = Projection {
            matrix,
            vertices: [[x, y], [x + w, y], [x, y + h], [x + w, y + h]],
        };
    }

    /// スクロールによるズームジェスチャを処理
    ///
    /// 累積値を制限内に収めた結果が前回から変化した場合のみ投影を
    /// 再計算し、`true` を返します。
    pub fn on_scroll(&mut self, delta: f32) -> bool {
        let limit = self.tuning.zoom_power * self.tuning.zoom_stride;
        self.translate = (self.translate + delta).clamp(-limit, limit);
        self.magnification = 2.0f32.powf(-(self.translate / self.tuning.zoom_stride));

        if (self.latest_translate - self.translate).abs() > f32::EPSILON {
            self.recompute();
            self.latest_translate = self.translate;
            true
        } else {
            false
        }
    }

    /// ポインタ押下（ドラッグ開始）
    pub fn on_pointer_down(&mut self, x: f32, y: f32) {
        self.dragging = true;
        self.origin = [x, y];
    }

    /// ポインタ移動によるパンジェスチャを処理
    ///
    /// ドラッグ中のみ、移動量を現在のズーム倍率（と調整係数）で
    /// スケールしてパンオフセットへ反映します。
    pub fn on_pointer_move(&mut self, x: f32, y: f32) -> bool {
        if !self.dragging {
            return false;
        }
        let ratio = self.magnification * self.tuning.pan_adjust;
        let delta = [x - self.origin[0], y - self.origin[1]];
        self.origin = [x, y];
        self.pan[0] -= delta[0] * ratio;
        self.pan[1] += delta[1] * ratio;
        self.recompute();
        true
    }

    /// ポインタ解放（ドラッグ終了）
    pub fn on_pointer_up(&mut self) {
        self.dragging = false;
    }

    /// ドラッグ中かどうか
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// 表示面にソース画像全体が収まるようにパン・ズームを設定
    pub fn autofit(&mut self) {
        self.pan = [0.0, 0.0];

        let mag_width = self.source_size[0] as f32 / self.surface_size[0] as f32;
        let mag_height = self.source_size[1] as f32 / self.surface_size[1] as f32;
        self.magnification = mag_height.max(mag_width);

        self.translate = -self.magnification.log2() * self.tuning.zoom_stride;
        self.latest_translate = self.translate;
        self.recompute();
    }

    /// 頂点矩形を表示面のピクセル座標（Y軸下向き）へ写像
    ///
    /// 戻り値は (最小点, 最大点)。描画側はこの矩形にテクスチャを貼ります。
    pub fn screen_rect(&self) -> ([f32; 2], [f32; 2]) {
        let ratio = self.magnification;
        let ch = self.surface_size[1] as f32;
        let [ox, oy] = self.projection.vertices[0];
        let [w, h] = [self.source_size[0] as f32, self.source_size[1] as f32];

        let min = [
            (ox - self.pan[0]) / ratio,
            ch - (oy + h - self.pan[1]) / ratio,
        ];
        let max = [
            (ox + w - self.pan[0]) / ratio,
            ch - (oy - self.pan[1]) / ratio,
        ];
        (min, max)
    }
}
