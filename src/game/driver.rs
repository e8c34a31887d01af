//! Pumps a shared manager from the glib main loop with wall-clock time.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use glib::SourceId;
use rand::Rng;

use super::manager::GameManager;

const PUMP_INTERVAL_MS: u64 = 50;

pub struct GlibDriver {
    handle: Option<SourceId>,
}

impl GlibDriver {
    /// Starts pumping. The manager keeps its own virtual clock; every pump
    /// advances it by the real time since the previous one.
    pub fn start<R: Rng + 'static>(game: &Rc<RefCell<GameManager<R>>>) -> Self {
        let game_pump = game.clone();
        let mut last = Instant::now();
        let handle = glib::timeout_add_local(Duration::from_millis(PUMP_INTERVAL_MS), move || {
            let now = Instant::now();
            let elapsed = now.duration_since(last);
            last = now;
            match game_pump.try_borrow_mut() {
                Ok(mut game) => game.advance(elapsed),
                // Held by a UI handler right now; catch up on the next pump.
                Err(_) => last -= elapsed,
            }
            glib::ControlFlow::Continue
        });
        GlibDriver {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.remove();
        }
    }
}

impl Drop for GlibDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
