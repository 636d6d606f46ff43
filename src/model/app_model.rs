//! Main application model with state management

use std::sync::Arc;
use tokio::sync::Mutex;

use super::playback::PlaybackState;
use super::preferences::Preferences;
use super::queue::Queue;
use super::track::Track;
use super::types::{InputMode, Notification, NotificationLevel, UiState};

/// Snapshot of the queue for rendering
#[derive(Clone, Debug, Default)]
pub struct QueueView {
    pub tracks: Vec<Track>,
    pub current: usize,
}

/// Main application model containing all state
pub struct AppModel {
    playback: Arc<Mutex<PlaybackState>>,
    queue: Arc<Mutex<Queue>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}

impl AppModel {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            playback: Arc::new(Mutex::new(PlaybackState::from_preferences(&prefs))),
            queue: Arc::new(Mutex::new(Queue::new())),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    // ========================================================================
    // Playback & Queue
    // ========================================================================

    pub async fn get_playback_state(&self) -> PlaybackState {
        self.playback.lock().await.clone()
    }

    /// Apply `f` to the playback state under the lock.
    pub async fn update_playback<R>(&self, f: impl FnOnce(&mut PlaybackState) -> R) -> R {
        let mut playback = self.playback.lock().await;
        f(&mut playback)
    }

    pub async fn is_playing(&self) -> bool {
        self.playback.lock().await.is_playing
    }

    pub async fn preferences(&self) -> Preferences {
        self.playback.lock().await.preferences()
    }

    pub async fn with_queue<R>(&self, f: impl FnOnce(&mut Queue) -> R) -> R {
        let mut queue = self.queue.lock().await;
        f(&mut queue)
    }

    pub async fn get_queue_view(&self) -> QueueView {
        let queue = self.queue.lock().await;
        QueueView {
            tracks: queue.tracks().to_vec(),
            current: queue.index(),
        }
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    pub async fn notify(&self, message: impl Into<String>, level: NotificationLevel) {
        let notification = Notification::new(message, level);
        tracing::debug!(level = ?notification.level, message = %notification.message, "Notification");
        self.ui_state.lock().await.notification = Some(notification);
    }


    pub async fn clear_notification(&self) {
        self.ui_state.lock().await.notification = None;
    }

    pub async fn auto_clear_old_notifications(&self) {
        let mut state = self.ui_state.lock().await;
        if state.notification.as_ref().is_some_and(|n| n.is_expired()) {
            state.notification = None;
        }
    }

    /// Record whether the server answered. Returns true when this flips the state.
    pub async fn set_server_reachable(&self, reachable: bool) -> bool {
        let mut state = self.ui_state.lock().await;
        let changed = state.server_unreachable == reachable;
        state.server_unreachable = !reachable;
        changed
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn set_loading(&self, loading: bool) {
        self.ui_state.lock().await.loading = loading;
    }

    pub async fn set_labels(&self, device_name: String, server_label: String) {
        let mut state = self.ui_state.lock().await;
        state.device_name = device_name;
        state.server_label = server_label;
    }

    pub async fn toggle_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help_popup = !state.show_help_popup;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn toggle_fullscreen_visualizer(&self) {
        let mut state = self.ui_state.lock().await;
        state.fullscreen_visualizer = !state.fullscreen_visualizer;
    }

    pub async fn toggle_queue_panel(&self) {
        let current = self.queue.lock().await.index();
        let mut state = self.ui_state.lock().await;
        state.show_queue = !state.show_queue;
        if state.show_queue {
            state.queue_selected = current;
        }
    }

    pub async fn queue_move_up(&self) {
        let mut state = self.ui_state.lock().await;
        state.queue_selected = state.queue_selected.saturating_sub(1);
    }

    pub async fn queue_move_down(&self) {
        let len = self.queue.lock().await.len();
        let mut state = self.ui_state.lock().await;
        if state.queue_selected + 1 < len {
            state.queue_selected += 1;
        }
    }

    pub async fn selected_queue_index(&self) -> usize {
        self.ui_state.lock().await.queue_selected
    }

    pub async fn set_paused_on_blur(&self, paused: bool) {
        self.ui_state.lock().await.paused_on_blur = paused;
    }

    pub async fn paused_on_blur(&self) -> bool {
        self.ui_state.lock().await.paused_on_blur
    }

    // ========================================================================
    // Command input
    // ========================================================================

    pub async fn enter_command_mode(&self) {
        let mut state = self.ui_state.lock().await;
        state.input_mode = InputMode::Command;
        state.command_input.clear();
    }

    pub async fn leave_command_mode(&self) {
        let mut state = self.ui_state.lock().await;
        state.input_mode = InputMode::Normal;
        state.command_input.clear();
    }

    pub async fn append_to_command(&self, c: char) {
        self.ui_state.lock().await.command_input.push(c);
    }

    pub async fn backspace_command(&self) {
        self.ui_state.lock().await.command_input.pop();
    }

    /// Return the typed command and go back to normal mode.
    pub async fn take_command(&self) -> String {
        let mut state = self.ui_state.lock().await;
        state.input_mode = InputMode::Normal;
        std::mem::take(&mut state.command_input)
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn command_input_round_trip() {
        let model = AppModel::default();
        model.enter_command_mode().await;
        for c in "song 4x".chars() {
            model.append_to_command(c).await;
        }
        model.backspace_command().await;
        assert_eq!(model.get_ui_state().await.input_mode, InputMode::Command);
        assert_eq!(model.take_command().await, "song 4");
        assert_eq!(model.get_ui_state().await.input_mode, InputMode::Normal);
        assert!(model.get_ui_state().await.command_input.is_empty());
    }

    #[tokio::test]
    async fn fresh_notification_is_kept() {
        let model = AppModel::default();
        model.notify("Now playing: Blue", NotificationLevel::Success).await;
        model.auto_clear_old_notifications().await;
        let n = model.get_ui_state().await.notification.unwrap();
        assert_eq!(n.message, "Now playing: Blue");
        assert_eq!(n.level, NotificationLevel::Success);
    }

    #[tokio::test]
    async fn reachability_reports_only_transitions() {
        let model = AppModel::default();
        assert!(!model.get_ui_state().await.server_unreachable);
        assert!(!model.set_server_reachable(true).await);
        assert!(model.set_server_reachable(false).await);
        assert!(!model.set_server_reachable(false).await);
        assert!(model.get_ui_state().await.server_unreachable);
        assert!(model.set_server_reachable(true).await);
    }

    #[tokio::test]
    async fn queue_selection_stays_in_bounds() {
        let model = AppModel::default();
        model.queue_move_down().await;
        assert_eq!(model.selected_queue_index().await, 0);
        model.queue_move_up().await;
        assert_eq!(model.selected_queue_index().await, 0);
    }
}
