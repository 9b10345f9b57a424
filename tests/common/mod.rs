#![allow(dead_code)]

pub use touchbridge_test_utils::*;

use std::time::Duration;

/// Poll `cond` every 10ms (real time) until it holds or 5 seconds pass.
pub async fn wait_until<F>(mut cond: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..500 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
