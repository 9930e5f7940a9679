use std::cell::RefCell;

thread_local! {
    pub static PERF_PATH_STEPS: RefCell<u64> = const { RefCell::new(0) };
    pub static PERF_PATH_COLLISIONS: RefCell<u64> = const { RefCell::new(0) };
}

#[inline]
pub(super) fn count_steps(steps: u32, collided: bool) {
    PERF_PATH_STEPS.with(|c| {
        let mut v = c.borrow_mut();
        *v = v.saturating_add(steps as u64);
    });
    if collided {
        PERF_PATH_COLLISIONS.with(|c| {
            let mut v = c.borrow_mut();
            *v = v.saturating_add(1);
        });
    }
}

pub fn reset_movement_perf_counters() {
    PERF_PATH_STEPS.with(|c| *c.borrow_mut() = 0);
    PERF_PATH_COLLISIONS.with(|c| *c.borrow_mut() = 0);
}

/// (sub-steps walked, collisions) since the last call
pub fn take_movement_perf_counters() -> (u64, u64) {
    let steps = PERF_PATH_STEPS.with(|c| std::mem::take(&mut *c.borrow_mut()));
    let collisions = PERF_PATH_COLLISIONS.with(|c| std::mem::take(&mut *c.borrow_mut()));
    (steps, collisions)
}
