//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use kinetic_stage::runtime::{FrameScheduler, ManualTicker, TickOutcome, TickReport};

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Run `n` requested callbacks, returning the completed tick reports.
///
/// Panics if the scheduler stops requesting ticks before `n`.
pub fn run_ticks(scheduler: &mut FrameScheduler<ManualTicker>, n: usize) -> Vec<TickReport> {
    let mut reports = Vec::with_capacity(n);
    for i in 0..n {
        match scheduler.pump() {
            Some(TickOutcome::Completed(report)) => reports.push(report),
            Some(_) => {}
            None => panic!("no tick requested at callback {}", i),
        }
    }
    reports
}
