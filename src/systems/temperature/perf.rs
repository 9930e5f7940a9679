use std::cell::RefCell;

thread_local! {
    static PERF_TRANSITIONS: RefCell<u64> = RefCell::new(0);
    static PERF_CONDUCTIONS: RefCell<u64> = RefCell::new(0);
}

#[inline]
pub(super) fn count_transition() {
    PERF_TRANSITIONS.with(|c| *c.borrow_mut() += 1);
}

#[inline]
pub(super) fn count_conduction() {
    PERF_CONDUCTIONS.with(|c| *c.borrow_mut() += 1);
}

pub fn reset_heat_perf_counters() {
    PERF_TRANSITIONS.with(|c| *c.borrow_mut() = 0);
    PERF_CONDUCTIONS.with(|c| *c.borrow_mut() = 0);
}

/// `(transitions, conductions)` since the last call
pub fn take_heat_perf_counters() -> (u64, u64) {
    let transitions = PERF_TRANSITIONS.with(|c| std::mem::take(&mut *c.borrow_mut()));
    let conductions = PERF_CONDUCTIONS.with(|c| std::mem::take(&mut *c.borrow_mut()));
    (transitions, conductions)
}
