//! 入力モジュール
//!
//! ツールキットのポインタ・スクロール入力を正規化イベントへ変換し、
//! 表示サーフェスへ配送します。

mod events;

pub use events::{InputRouter, PointerEvent, SCROLL_STEP};
