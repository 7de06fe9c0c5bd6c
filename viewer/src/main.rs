//! ビューアエントリポイント
//!
//! カメラビューアのメインエントリポイント

use cam_viewer_rs_viewer::app::ViewerApp;
use cam_viewer_rs_viewer::ui::MainWindow;

fn main() -> anyhow::Result<()> {
    // ロギングとパニックフックを初期化
    cam_viewer_rs_common::initialize();

    // 垂直同期はウィンドウ生成前に確定させる必要があるため、
    // 設定を先に読み込む
    let app = ViewerApp::new();
    let vsync = app.settings().canvas.vsync;

    // ネイティブオプションを設定
    let native_options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(1024.0, 768.0)),
        min_window_size: Some(egui::vec2(640.0, 480.0)),
        resizable: true,
        maximized: false,
        decorated: true,
        transparent: false,
        vsync,
        icon_data: load_icon(),
        ..Default::default()
    };

    // アプリケーションを実行
    eframe::run_native(
        "カメラビューア",
        native_options,
        Box::new(|cc| Box::new(MainWindow::new(cc, app))),
    )
    .map_err(|e| anyhow::anyhow!("アプリケーションの起動に失敗しました: {}", e))
}

/// アプリケーションアイコンを読み込む
fn load_icon() -> Option<eframe::IconData> {
    let icon_path = std::path::Path::new("assets/app.png");

    if icon_path.exists() {
        let image = image::open(icon_path).ok()?;
        let image = image.to_rgba8();

        let (width, height) = image.dimensions();
        let rgba = image.into_raw();

        Some(eframe::IconData {
            rgba,
            width,
            height,
        })
    } else {
        log::debug!("アイコンファイルが見つかりませんでした: {:?}", icon_path);
        None
    }
}
