use std::ops::ControlFlow;

use gloo_timers::callback::Timeout;

pub type Task = Box<dyn FnOnce()>;

/// Fixed-delay scheduling. Nothing scheduled here is ever cancelled, the page
/// going away is what tears pending timers down.
pub trait Timers: Clone + 'static {
    fn after(&self, delay_ms: u32, task: Task);

    /// Runs `tick` every `period_ms` until it breaks. Built on chained
    /// timeouts so every implementation only has to provide `after`.
    fn every(&self, period_ms: u32, tick: Box<dyn FnMut() -> ControlFlow<()>>) {
        fn schedule<T: Timers>(timers: T, period_ms: u32, mut tick: Box<dyn FnMut() -> ControlFlow<()>>) {
            let next = timers.clone();
            timers.after(
                period_ms,
                Box::new(move || {
                    if tick().is_continue() {
                        schedule(next, period_ms, tick);
                    }
                }),
            );
        }
        schedule(self.clone(), period_ms, tick);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTimers;

impl Timers for BrowserTimers {
    fn after(&self, delay_ms: u32, task: Task) {
        let timeout = Timeout::new(delay_ms, move || task());
        timeout.forget();
    }
}
