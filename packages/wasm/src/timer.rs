//! Single `setTimeout` wake-up driven by the session's next deadline

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

struct Armed {
    id: i32,
    due: u64,
}

/// One callback, armed at most once at a time. Re-arming for the same
/// deadline is a no-op; a new deadline replaces the pending timeout.
pub struct WakeTimer {
    callback: Closure<dyn FnMut()>,
    armed: Option<Armed>,
}

impl WakeTimer {
    pub fn new(callback: impl FnMut() + 'static) -> Self {
        Self {
            callback: Closure::<dyn FnMut()>::new(callback),
            armed: None,
        }
    }

    /// Deadline of the pending timeout
    pub fn armed_for(&self) -> Option<u64> {
        self.armed.as_ref().map(|armed| armed.due)
    }

    pub fn schedule(&mut self, window: &Window, deadline: Option<u64>, now: u64) {
        if self.armed_for() == deadline {
            return;
        }
        self.cancel(window);
        let Some(due) = deadline else {
            return;
        };
        let delay = due.saturating_sub(now).min(i32::MAX as u64) as i32;
        self.armed = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(self.callback.as_ref().unchecked_ref(), delay)
            .ok()
            .map(|id| Armed { id, due });
    }

    /// The timeout ran; the next `schedule` must arm again
    pub fn fired(&mut self) {
        self.armed = None;
    }

    pub fn cancel(&mut self, window: &Window) {
        if let Some(armed) = self.armed.take() {
            window.clear_timeout_with_handle(armed.id);
        }
    }

    #[cfg(test)]
    fn armed_id(&self) -> Option<i32> {
        self.armed.as_ref().map(|armed| armed.id)
    }
}
