//! カメラビューアライブラリ
//!
//! フレームプロデューサから非同期に届く生フレームを、一定の
//! リフレッシュレートで表示するためのパイプラインを提供します。

pub mod acquisition;
pub mod app;
pub mod display;
pub mod input;
pub mod ui;
pub mod worker;
