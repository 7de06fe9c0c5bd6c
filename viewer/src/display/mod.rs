//! ディスプレイモジュール
//!
//! このモジュールはライブ映像の表示パイプラインを担当します。
//! 生フレームのデコード、パン・ズーム変換、バッファ保持、および
//! ティックごとの再描画を行います。

mod canvas;
mod decoder;
mod renderer;
mod ring;
mod transform;

pub use canvas::{Canvas, SurfaceState, TickOutcome, FETCH_TIMEOUT};
pub use decoder::{decode, DecodeReject, DecodedImage};
pub use renderer::DisplayRenderer;
pub use ring::BufferRing;
pub use transform::{ortho, GestureTuning, Projection, ViewTransform};

use cam_viewer_rs_common::Result;

/// テクスチャの転送先
///
/// デコード済み画像のコミット先。コミットされた時点で前フレームの
/// テクスチャは上書きされます。
pub trait TextureSink {
    /// デコード済み画像をテクスチャとして転送
    fn commit(&mut self, image: &DecodedImage);
}

/// 表示サーフェスの能力インターフェース
///
/// ツールキット固有の基底クラス階層の代わりに、ティック駆動・リサイズ・
/// ポインタ入力の各能力をこのトレイトに集約します。
pub trait Surface {
    /// 1ティック分の処理を実行
    ///
    /// 新しいフレームを高々1枚取得し、デコードできればテクスチャを
    /// 更新します。フレームが届かなくても失敗にはなりません。
    fn tick(&mut self, sink: &mut dyn TextureSink) -> Result<TickOutcome>;

    /// 表示面のサイズ変更を反映
    fn resize(&mut self, width: u32, height: u32);

    /// ポインタ押下
    fn on_pointer_down(&mut self, x: f32, y: f32);

    /// ポインタ移動
    fn on_pointer_move(&mut self, x: f32, y: f32);

    /// ポインタ解放
    fn on_pointer_up(&mut self);

    /// スクロール（ズームジェスチャ）
    fn on_scroll(&mut self, delta: f32);
}
