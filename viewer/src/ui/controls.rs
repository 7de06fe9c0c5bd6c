//! ツールバー制御
//!
//! 各操作の有効・無効を状態から判定し、操作間の依存関係に沿って
//! 再評価を伝播させます。

use std::collections::{HashMap, HashSet};

use super::AppState;

/// ツールバー操作の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionId {
    /// プロデューサへ接続
    Connect,
    /// プロデューサを切断
    Disconnect,
    /// 画像取得を開始
    StartAcquisition,
    /// 画像取得を停止
    StopAcquisition,
    /// 描画の一時停止を切り替え
    ToggleDrawing,
    /// 表示面に合わせてズーム
    Autofit,
}

impl ActionId {
    /// 全操作の一覧
    pub const ALL: [ActionId; 6] = [
        ActionId::Connect,
        ActionId::Disconnect,
        ActionId::StartAcquisition,
        ActionId::StopAcquisition,
        ActionId::ToggleDrawing,
        ActionId::Autofit,
    ];
}

/// 操作の有効条件を判定
pub fn action_enabled(action: ActionId, state: &AppState) -> bool {
    match action {
        ActionId::Connect => !state.connected,
        ActionId::Disconnect => state.connected,
        // 一時停止中の「開始」は再開として機能する
        ActionId::StartAcquisition => state.connected && (!state.acquiring || state.pausing),
        ActionId::StopAcquisition => state.connected && state.acquiring,
        ActionId::ToggleDrawing => state.connected && state.acquiring,
        ActionId::Autofit => true,
    }
}

/// 操作の有効・無効グラフ
///
/// ある操作の実行が他の操作の有効条件に影響するという依存関係を保持し、
/// 実行された操作から到達可能な操作だけを再評価します。
#[derive(Debug, Default)]
pub struct ActionGraph {
    /// 操作 → その実行で再評価が必要になる操作
    observers: HashMap<ActionId, Vec<ActionId>>,
    enabled: HashMap<ActionId, bool>,
}

impl ActionGraph {
    /// 既定の依存関係を持つグラフを作成
    pub fn new() -> Self {
        let mut graph = Self::default();

        // 接続・切断は取得系操作の前提条件
        graph.add_observer(ActionId::Connect, ActionId::Disconnect);
        graph.add_observer(ActionId::Connect, ActionId::StartAcquisition);
        graph.add_observer(ActionId::Disconnect, ActionId::Connect);
        graph.add_observer(ActionId::Disconnect, ActionId::StartAcquisition);
        graph.add_observer(ActionId::Disconnect, ActionId::StopAcquisition);

        // 取得開始・停止は互いと一時停止に影響する
        graph.add_observer(ActionId::StartAcquisition, ActionId::StopAcquisition);
        graph.add_observer(ActionId::StartAcquisition, ActionId::ToggleDrawing);
        graph.add_observer(ActionId::StopAcquisition, ActionId::StartAcquisition);
        graph.add_observer(ActionId::StopAcquisition, ActionId::ToggleDrawing);
        graph.add_observer(ActionId::ToggleDrawing, ActionId::StartAcquisition);

        graph
    }

    /// 依存関係を追加
    pub fn add_observer(&mut self, source: ActionId, observer: ActionId) {
        self.observers.entry(source).or_default().push(observer);
    }

    /// 操作が有効かどうか
    pub fn is_enabled(&self, action: ActionId) -> bool {
        self.enabled.get(&action).copied().unwrap_or(false)
    }

    /// 全操作を再評価
    pub fn refresh_all(&mut self, state: &AppState) {
        for action in ActionId::ALL {
            self.enabled.insert(action, action_enabled(action, state));
        }
    }

    /// 操作の実行を通知し、影響を受ける操作を再評価
    ///
    /// 実行された操作自身と、依存グラフで到達可能な操作だけを
    /// 更新します。循環があっても各操作の評価は1回きりです。
    pub fn notify(&mut self, executed: ActionId, state: &AppState) {
        let mut visited = HashSet::new();
        let mut worklist = vec![executed];

        while let Some(action) = worklist.pop() {
            if !visited.insert(action) {
                continue;
            }
            self.enabled.insert(action, action_enabled(action, state));
            if let Some(observers) = self.observers.get(&action) {
                worklist.extend(observers.iter().copied());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(connected: bool, acquiring: bool, pausing: bool) -> AppState {
        AppState {
            connected,
            acquiring,
            pausing,
            status_line: String::new(),
        }
    }

    #[test]
    fn test_enablement_idle() {
        let state = state(false, false, false);
        assert!(action_enabled(ActionId::Connect, &state));
        assert!(!action_enabled(ActionId::Disconnect, &state));
        assert!(!action_enabled(ActionId::StartAcquisition, &state));
        assert!(!action_enabled(ActionId::StopAcquisition, &state));
        assert!(!action_enabled(ActionId::ToggleDrawing, &state));
        assert!(action_enabled(ActionId::Autofit, &state));
    }

    #[test]
    fn test_enablement_connected() {
        let state = state(true, false, false);
        assert!(!action_enabled(ActionId::Connect, &state));
        assert!(action_enabled(ActionId::Disconnect, &state));
        assert!(action_enabled(ActionId::StartAcquisition, &state));
        assert!(!action_enabled(ActionId::StopAcquisition, &state));
    }

    #[test]
    fn test_enablement_acquiring() {
        let state = state(true, true, false);
        assert!(!action_enabled(ActionId::StartAcquisition, &state));
        assert!(action_enabled(ActionId::StopAcquisition, &state));
        assert!(action_enabled(ActionId::ToggleDrawing, &state));
    }

    #[test]
    fn test_start_reenabled_while_pausing() {
        // 一時停止中は「開始」が再開ボタンとして有効になる
        let state = state(true, true, true);
        assert!(action_enabled(ActionId::StartAcquisition, &state));
        assert!(action_enabled(ActionId::StopAcquisition, &state));
    }

    #[test]
    fn test_notify_propagates_to_observers() {
        let mut graph = ActionGraph::new();
        graph.refresh_all(&state(false, false, false));
        assert!(graph.is_enabled(ActionId::Connect));
        assert!(!graph.is_enabled(ActionId::StartAcquisition));

        // 接続を実行すると依存先の開始ボタンも再評価される
        graph.notify(ActionId::Connect, &state(true, false, false));
        assert!(!graph.is_enabled(ActionId::Connect));
        assert!(graph.is_enabled(ActionId::Disconnect));
        assert!(graph.is_enabled(ActionId::StartAcquisition));
    }

    #[test]
    fn test_notify_terminates_with_cycles() {
        // 開始と停止は相互依存だが、伝播は1周で終わる
        let mut graph = ActionGraph::new();
        graph.notify(ActionId::StartAcquisition, &state(true, true, false));
        assert!(!graph.is_enabled(ActionId::StartAcquisition));
        assert!(graph.is_enabled(ActionId::StopAcquisition));
    }

    #[test]
    fn test_notify_does_not_touch_unrelated_actions() {
        let mut graph = ActionGraph::new();
        graph.refresh_all(&state(false, false, false));

        // オートフィットは依存グラフの外にあり、通知では変化しない
        graph.notify(ActionId::StopAcquisition, &state(true, false, false));
        assert!(graph.is_enabled(ActionId::Autofit));
    }
}
