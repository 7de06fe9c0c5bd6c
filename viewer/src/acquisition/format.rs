//! ピクセルフォーマット定義
//!
//! フレームが運ぶピクセルフォーマットのタグと、その分類・ビット深度・
//! コンポーネント数の問い合わせ機能を提供します。

use std::fmt;

use serde::{Deserialize, Serialize};

/// ピクセルフォーマット
///
/// `Custom` は定義外のフォーマットで、表示対象にはなりません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// モノクロ 8bit
    Mono8,
    /// モノクロ 10bit
    Mono10,
    /// モノクロ 12bit
    Mono12,
    /// モノクロ 16bit
    Mono16,
    /// ベイヤー配列 RG 8bit
    BayerRG8,
    /// ベイヤー配列 GR 8bit
    BayerGR8,
    /// ベイヤー配列 GB 8bit
    BayerGB8,
    /// ベイヤー配列 BG 8bit
    BayerBG8,
    /// ベイヤー配列 RG 12bit
    BayerRG12,
    /// RGB 各8bit
    Rgb8,
    /// BGR 各8bit
    Bgr8,
    /// RGBA 各8bit
    Rgba8,
    /// BGRA 各8bit
    Bgra8,
    /// RGB 各12bit
    Rgb12,
    /// BGR 各12bit
    Bgr12,
    /// 定義外のフォーマット（表示不可）
    Custom(u32),
}

/// フォーマット分類
///
/// リシェイプとチャンネル順の扱いを決定します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatClass {
    /// 単一チャンネル
    Mono,
    /// 単一チャンネル（ベイヤー配列）
    Bayer,
    /// RGB順 3チャンネル
    Rgb,
    /// BGR順 3チャンネル（表示前にRGBへ並べ替え）
    Bgr,
    /// RGBA順 4チャンネル
    Rgba,
    /// BGRA順 4チャンネル（表示前にRGBAへ並べ替え）
    Bgra,
    /// 分類不能
    Custom,
}

impl PixelFormat {
    /// フォーマット分類を取得
    pub fn class(&self) -> FormatClass {
        match self {
            PixelFormat::Mono8
            | PixelFormat::Mono10
            | PixelFormat::Mono12
            | PixelFormat::Mono16 => FormatClass::Mono,
            PixelFormat::BayerRG8
            | PixelFormat::BayerGR8
            | PixelFormat::BayerGB8
            | PixelFormat::BayerBG8
            | PixelFormat::BayerRG12 => FormatClass::Bayer,
            PixelFormat::Rgb8 | PixelFormat::Rgb12 => FormatClass::Rgb,
            PixelFormat::Bgr8 | PixelFormat::Bgr12 => FormatClass::Bgr,
            PixelFormat::Rgba8 => FormatClass::Rgba,
            PixelFormat::Bgra8 => FormatClass::Bgra,
            PixelFormat::Custom(_) => FormatClass::Custom,
        }
    }

    /// サンプル1つあたりのビット深度を取得
    ///
    /// `Custom` は深度を特定できないため `None` を返します。
    pub fn bit_depth(&self) -> Option<u32> {
        match self {
            PixelFormat::Mono8
            | PixelFormat::BayerRG8
            | PixelFormat::BayerGR8
            | PixelFormat::BayerGB8
            | PixelFormat::BayerBG8
            | PixelFormat::Rgb8
            | PixelFormat::Bgr8
            | PixelFormat::Rgba8
            | PixelFormat::Bgra8 => Some(8),
            PixelFormat::Mono10 => Some(10),
            PixelFormat::Mono12
            | PixelFormat::BayerRG12
            | PixelFormat::Rgb12
            | PixelFormat::Bgr12 => Some(12),
            PixelFormat::Mono16 => Some(16),
            PixelFormat::Custom(_) => None,
        }
    }

    /// ピクセルあたりのコンポーネント数を取得
    pub fn num_components(&self) -> u32 {
        match self.class() {
            FormatClass::Mono | FormatClass::Bayer => 1,
            FormatClass::Rgb | FormatClass::Bgr => 3,
            FormatClass::Rgba | FormatClass::Bgra => 4,
            FormatClass::Custom => 0,
        }
    }

    /// 定義外フォーマットかどうか
    pub fn is_custom(&self) -> bool {
        matches!(self, PixelFormat::Custom(_))
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Mono8 => "Mono8",
            PixelFormat::Mono10 => "Mono10",
            PixelFormat::Mono12 => "Mono12",
            PixelFormat::Mono16 => "Mono16",
            PixelFormat::BayerRG8 => "BayerRG8",
            PixelFormat::BayerGR8 => "BayerGR8",
            PixelFormat::BayerGB8 => "BayerGB8",
            PixelFormat::BayerBG8 => "BayerBG8",
            PixelFormat::BayerRG12 => "BayerRG12",
            PixelFormat::Rgb8 => "RGB8",
            PixelFormat::Bgr8 => "BGR8",
            PixelFormat::Rgba8 => "RGBA8",
            PixelFormat::Bgra8 => "BGRA8",
            PixelFormat::Rgb12 => "RGB12",
            PixelFormat::Bgr12 => "BGR12",
            PixelFormat::Custom(id) => return write!(f, "Custom({:#x})", id),
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_classification() {
        assert_eq!(PixelFormat::Mono8.class(), FormatClass::Mono);
        assert_eq!(PixelFormat::BayerGB8.class(), FormatClass::Bayer);
        assert_eq!(PixelFormat::Rgb8.class(), FormatClass::Rgb);
        assert_eq!(PixelFormat::Bgr12.class(), FormatClass::Bgr);
        assert_eq!(PixelFormat::Rgba8.class(), FormatClass::Rgba);
        assert_eq!(PixelFormat::Bgra8.class(), FormatClass::Bgra);
        assert_eq!(PixelFormat::Custom(0x8100).class(), FormatClass::Custom);
    }

    #[test]
    fn test_bit_depth() {
        assert_eq!(PixelFormat::Mono8.bit_depth(), Some(8));
        assert_eq!(PixelFormat::Mono10.bit_depth(), Some(10));
        assert_eq!(PixelFormat::Rgb12.bit_depth(), Some(12));
        assert_eq!(PixelFormat::Mono16.bit_depth(), Some(16));
        assert_eq!(PixelFormat::Custom(1).bit_depth(), None);
    }

    #[test]
    fn test_num_components() {
        assert_eq!(PixelFormat::Mono12.num_components(), 1);
        assert_eq!(PixelFormat::BayerRG8.num_components(), 1);
        assert_eq!(PixelFormat::Bgr8.num_components(), 3);
        assert_eq!(PixelFormat::Bgra8.num_components(), 4);
        assert_eq!(PixelFormat::Custom(0).num_components(), 0);
    }
}
