//! 画像デコードモジュール
//!
//! 生フレームを表示可能な8bit画像へ変換する機能を提供します。
//! 状態を持たない純粋な変換で、失敗は「このフレームを表示しない」
//! という判断として呼び出し側へ返ります。

use thiserror::Error;

use crate::acquisition::{FormatClass, RawFrame};

/// デコード済み画像
///
/// 不変条件: `pixels.len() == width * height * channels`
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// 画像の幅
    pub width: u32,
    /// 画像の高さ
    pub height: u32,
    /// チャンネル数 (1, 3, 4 のいずれか)
    pub channels: u32,
    /// 8bit画素データ
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// スナップショット保存等の外部連携用にRGBA画像へ変換
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        let mut rgba = Vec::with_capacity((self.width * self.height * 4) as usize);
        match self.channels {
            1 => {
                for &v in &self.pixels {
                    rgba.extend_from_slice(&[v, v, v, 255]);
                }
            }
            3 => {
                for px in self.pixels.chunks_exact(3) {
                    rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
            }
            4 => rgba.extend_from_slice(&self.pixels),
            _ => return None,
        }
        image::RgbaImage::from_raw(self.width, self.height, rgba)
    }
}

/// デコード棄却
///
/// いずれも非致命で、呼び出し側は直前のテクスチャを表示し続けます。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeReject {
    /// 定義外フォーマット
    #[error("カスタムフォーマットは表示できません")]
    CustomFormat,

    /// ビット深度を特定できない
    #[error("ビット深度を特定できません")]
    UnknownBitDepth,

    /// ペイロード長の不一致
    #[error("ペイロード長が不正です (期待 {expected} バイト, 実際 {actual} バイト)")]
    PayloadLength { expected: usize, actual: usize },

    /// サポートされていないコンポーネント配置
    #[error("サポートされていないコンポーネント配置です")]
    UnsupportedLayout,
}

/// 生フレームを8bit画像へデコード
///
/// ビット深度が8を超えるサンプルは `2^(深度-8)` による整数除算で
/// 8bitへ切り詰めます（表示用途の意図的な欠落）。BGR系フォーマットは
/// R/Bチャンネルを入れ替えて常にRGB順で返します。
pub fn decode(frame: &RawFrame) -> Result<DecodedImage, DecodeReject> {
    let format = frame.pixel_format;
    if format.is_custom() {
        return Err(DecodeReject::CustomFormat);
    }

    let depth = format.bit_depth().ok_or(DecodeReject::UnknownBitDepth)?;
    let class = format.class();
    let channels = match class {
        FormatClass::Mono | FormatClass::Bayer => 1,
        FormatClass::Rgb | FormatClass::Bgr => 3,
        FormatClass::Rgba | FormatClass::Bgra => 4,
        FormatClass::Custom => return Err(DecodeReject::UnsupportedLayout),
    };

    let exponent = depth as i32 - 8;
    // 深度8超のサンプルは2バイト幅でなければ解釈できない
    if exponent > 0 && frame.bytes_per_sample != 2 {
        return Err(DecodeReject::UnsupportedLayout);
    }

    let samples = frame.width as usize * frame.height as usize * channels as usize;
    let expected = samples * frame.bytes_per_sample as usize;
    if frame.payload.len() != expected {
        return Err(DecodeReject::PayloadLength {
            expected,
            actual: frame.payload.len(),
        });
    }

    // 8bitへ正規化
    let mut pixels: Vec<u8> = if frame.bytes_per_sample == 2 {
        let shift = exponent.max(0) as u32;
        frame
            .payload
            .chunks_exact(2)
            .map(|pair| {
                let value = u16::from_le_bytes([pair[0], pair[1]]);
                (value >> shift) as u8
            })
            .collect()
    } else {
        frame.payload.clone()
    };

    // BGR系はチャンネル軸を入れ替えてRGB順にする（アルファは末尾のまま）
    if matches!(class, FormatClass::Bgr | FormatClass::Bgra) {
        for px in pixels.chunks_exact_mut(channels as usize) {
            px.swap(0, 2);
        }
    }

    debug_assert_eq!(
        pixels.len(),
        (frame.width * frame.height * channels) as usize
    );

    Ok(DecodedImage {
        width: frame.width,
        height: frame.height,
        channels,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{PayloadKind, PixelFormat};

    // テスト用の生フレームを作成
    fn frame(
        format: PixelFormat,
        width: u32,
        height: u32,
        bytes_per_sample: u32,
        payload: Vec<u8>,
    ) -> RawFrame {
        RawFrame {
            pixel_format: format,
            width,
            height,
            bytes_per_sample,
            payload_kind: PayloadKind::Image,
            sequence: 0,
            payload,
        }
    }

    #[test]
    fn test_mono8_passthrough() {
        let raw = frame(PixelFormat::Mono8, 4, 2, 1, (0..8).collect());
        let image = decode(&raw).unwrap();
        assert_eq!(image.width, 4);
        assert_eq!(image.height, 2);
        assert_eq!(image.channels, 1);
        assert_eq!(image.pixels, (0..8).collect::<Vec<u8>>());
    }

    #[test]
    fn test_mono12_floor_division() {
        // 深度12 → 指数4。各サンプルは floor(raw / 16) になる
        let samples: [u16; 4] = [0, 15, 16, 4095];
        let mut payload = Vec::new();
        for v in samples {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        let raw = frame(PixelFormat::Mono12, 2, 2, 2, payload);
        let image = decode(&raw).unwrap();
        assert_eq!(image.pixels, vec![0, 0, 1, 255]);
    }

    #[test]
    fn test_mono10_floor_division() {
        // 深度10 → 指数2。floor(raw / 4)
        let samples: [u16; 2] = [7, 1023];
        let mut payload = Vec::new();
        for v in samples {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        let raw = frame(PixelFormat::Mono10, 2, 1, 2, payload);
        let image = decode(&raw).unwrap();
        assert_eq!(image.pixels, vec![1, 255]);
    }

    #[test]
    fn test_mono16_floor_division() {
        let samples: [u16; 2] = [0x1234, 0xFFFF];
        let mut payload = Vec::new();
        for v in samples {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        let raw = frame(PixelFormat::Mono16, 2, 1, 2, payload);
        let image = decode(&raw).unwrap();
        assert_eq!(image.pixels, vec![0x12, 0xFF]);
    }

    #[test]
    fn test_bayer_stays_single_channel() {
        let raw = frame(PixelFormat::BayerRG8, 2, 2, 1, vec![10, 20, 30, 40]);
        let image = decode(&raw).unwrap();
        assert_eq!(image.channels, 1);
        assert_eq!(image.pixels, vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_bgr_reordered_to_rgb() {
        // 1ピクセル: B=1, G=2, R=3 → RGB順で [3, 2, 1]
        let raw = frame(PixelFormat::Bgr8, 1, 1, 1, vec![1, 2, 3]);
        let image = decode(&raw).unwrap();
        assert_eq!(image.channels, 3);
        assert_eq!(image.pixels, vec![3, 2, 1]);
    }

    #[test]
    fn test_bgra_reordered_to_rgba() {
        // B=1, G=2, R=3, A=4 → RGBA順で [3, 2, 1, 4]
        let raw = frame(PixelFormat::Bgra8, 1, 1, 1, vec![1, 2, 3, 4]);
        let image = decode(&raw).unwrap();
        assert_eq!(image.channels, 4);
        assert_eq!(image.pixels, vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_rgb_unchanged() {
        let raw = frame(PixelFormat::Rgb8, 2, 1, 1, vec![1, 2, 3, 4, 5, 6]);
        let image = decode(&raw).unwrap();
        assert_eq!(image.pixels, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_custom_format_rejected() {
        let raw = frame(PixelFormat::Custom(0x8100), 2, 2, 1, vec![0; 4]);
        assert_eq!(decode(&raw), Err(DecodeReject::CustomFormat));
    }

    #[test]
    fn test_payload_length_mismatch_rejected() {
        let raw = frame(PixelFormat::Mono8, 4, 4, 1, vec![0; 15]);
        assert_eq!(
            decode(&raw),
            Err(DecodeReject::PayloadLength {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn test_wide_depth_requires_two_byte_samples() {
        let raw = frame(PixelFormat::Mono12, 2, 2, 1, vec![0; 4]);
        assert_eq!(decode(&raw), Err(DecodeReject::UnsupportedLayout));
    }

    #[test]
    fn test_to_rgba_image() {
        let image = DecodedImage {
            width: 1,
            height: 1,
            channels: 3,
            pixels: vec![10, 20, 30],
        };
        let rgba = image.to_rgba_image().unwrap();
        assert_eq!(rgba.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }
}
