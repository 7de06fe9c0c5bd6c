//! ロギング機能
//!
//! アプリケーションのロギング機能を提供します。`log` マクロの出力を
//! `env_logger` で整形して標準エラーに書き出します。ログレベルは
//! 環境変数 `RUST_LOG` で制御できます（既定は `info`）。

use std::io::Write;

use chrono::Local;
use env_logger::{Builder, Env};

/// ロガーを初期化
///
/// 二重初期化は無視されるため、テストからも安全に呼び出せます。
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}

/// パニック時のログ記録ハンドラーを設定
pub fn set_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let message = match panic_info.payload().downcast_ref::<&str>() {
            Some(s) => *s,
            None => match panic_info.payload().downcast_ref::<String>() {
                Some(s) => s.as_str(),
                None => "Unknown panic payload",
            },
        };

        let location = match panic_info.location() {
            Some(loc) => format!(" at {}:{}", loc.file(), loc.line()),
            None => String::new(),
        };

        log::error!("Panic: {}{}", message, location);
    }));
}
