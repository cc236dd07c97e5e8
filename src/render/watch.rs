use tokio::sync::watch;
use tracing::debug;

use super::{DisplaySnapshot, RenderSink};

/// Publishes every rendered snapshot on a watch channel.
///
/// Readers always see the most recently rendered view. That view only moves
/// when the twin renders, so control edits staged while paused do not show up
/// here until the next tick.
pub struct WatchRenderer {
    tx: watch::Sender<DisplaySnapshot>,
}

impl WatchRenderer {
    pub fn new(initial: DisplaySnapshot) -> (Self, watch::Receiver<DisplaySnapshot>) {
        let (tx, rx) = watch::channel(initial);
        (Self { tx }, rx)
    }
}

impl RenderSink for WatchRenderer {
    fn render(&mut self, snapshot: &DisplaySnapshot) {
        debug!(
            status = snapshot.status,
            time = snapshot.time,
            mode = %snapshot.mode,
            "render"
        );
        self.tx.send_replace(snapshot.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SimulationState, DEFAULT_MAX_STORAGE_KG};

    #[test]
    fn test_publishes_latest_snapshot() {
        let mut state = SimulationState::new(DEFAULT_MAX_STORAGE_KG, 20);
        let (mut renderer, rx) = WatchRenderer::new(DisplaySnapshot::from_state(&state));
        assert_eq!(rx.borrow().time, 0);

        state.time = 12;
        renderer.render(&DisplaySnapshot::from_state(&state));

        assert_eq!(rx.borrow().time, 12);
        assert_eq!(rx.borrow().elapsed, "00:00:12");
    }

    #[test]
    fn test_render_without_readers() {
        let state = SimulationState::new(DEFAULT_MAX_STORAGE_KG, 20);
        let (mut renderer, rx) = WatchRenderer::new(DisplaySnapshot::from_state(&state));
        drop(rx);
        renderer.render(&DisplaySnapshot::from_state(&state));
    }
}
