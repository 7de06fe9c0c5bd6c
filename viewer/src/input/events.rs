//! ポインタイベントの変換と配送

use crate::display::Surface;

/// スクロール1段分のピクセル量
///
/// ホイール入力のピクセル差分をズーム段数へ正規化する除数です。
pub const SCROLL_STEP: f32 = 50.0;

/// 微小移動とみなすしきい値（ピクセル）
const MOVE_THRESHOLD: f32 = 0.5;

/// 正規化ポインタイベント
///
/// 座標は表示パネル左上を原点とするローカル座標です。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// ポインタ押下
    Down { x: f32, y: f32 },
    /// ポインタ移動（ドラッグ中）
    Move { x: f32, y: f32 },
    /// ポインタ解放
    Up,
    /// スクロール（ズーム段数単位）
    Scroll { delta: f32 },
}

/// 入力ルータ
///
/// ツールキットの応答からイベント列を組み立て、サーフェスへ配送します。
/// 微小移動は抑制して無駄な再計算を避けます。
#[derive(Debug, Default)]
pub struct InputRouter {
    last_pos: Option<[f32; 2]>,
}

impl InputRouter {
    /// 新しいルータを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// パネル応答からイベント列を組み立て
    ///
    /// `origin` はパネル左上のスクリーン座標で、ローカル座標への
    /// 変換に使用します。
    pub fn gather(&mut self, response: &egui::Response, origin: egui::Pos2) -> Vec<PointerEvent> {
        let mut events = Vec::new();

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                events.push(PointerEvent::Down {
                    x: pos.x - origin.x,
                    y: pos.y - origin.y,
                });
            }
        } else if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                events.push(PointerEvent::Move {
                    x: pos.x - origin.x,
                    y: pos.y - origin.y,
                });
            }
        }

        if response.drag_released() {
            events.push(PointerEvent::Up);
        }

        if response.hovered() {
            let scroll = response.ctx.input(|i| i.scroll_delta);
            if scroll.y != 0.0 {
                events.push(PointerEvent::Scroll {
                    delta: scroll.y / SCROLL_STEP,
                });
            }
        }

        events
    }

    /// イベント列をサーフェスへ配送
    pub fn route(&mut self, surface: &mut dyn Surface, events: &[PointerEvent]) {
        for event in events {
            match *event {
                PointerEvent::Down { x, y } => {
                    self.last_pos = Some([x, y]);
                    surface.on_pointer_down(x, y);
                }
                PointerEvent::Move { x, y } => {
                    // 微小移動は捨てる
                    if let Some([lx, ly]) = self.last_pos {
                        if (x - lx).abs() < MOVE_THRESHOLD && (y - ly).abs() < MOVE_THRESHOLD {
                            continue;
                        }
                    }
                    self.last_pos = Some([x, y]);
                    surface.on_pointer_move(x, y);
                }
                PointerEvent::Up => {
                    self.last_pos = None;
                    surface.on_pointer_up();
                }
                PointerEvent::Scroll { delta } => {
                    surface.on_scroll(delta);
                }
            }
        }
    }
}
