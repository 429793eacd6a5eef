use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::Readiness;
use crate::host::HostError;

/// Fixed pause standing in for a "page loaded" signal.
pub fn settle(label: &str, delay: Duration) {
    if delay.is_zero() {
        return;
    }
    info!("Waiting {} ms ({})...", delay.as_millis(), label);
    thread::sleep(delay);
}

/// Poll `ready` every `interval` until it holds or `timeout` runs out.
/// Returns whether the condition was met.
pub fn wait_until<F>(label: &str, timeout: Duration, interval: Duration, mut ready: F) -> Result<bool, HostError>
where
    F: FnMut() -> Result<bool, HostError>,
{
    let started = Instant::now();
    loop {
        if ready()? {
            debug!("{} ready after {} ms", label, started.elapsed().as_millis());
            return Ok(true);
        }
        if started.elapsed() >= timeout {
            warn!("{} not ready after {} ms, continuing", label, timeout.as_millis());
            return Ok(false);
        }
        thread::sleep(interval);
    }
}

/// Settle according to the readiness policy: the fixed delay, or a bounded
/// poll of `ready`. A poll that times out is not an error; the next lookup
/// decides what happens.
pub fn settle_with<F>(readiness: Readiness, label: &str, delay: Duration, ready: F) -> Result<(), HostError>
where
    F: FnMut() -> Result<bool, HostError>,
{
    match readiness {
        Readiness::Fixed => {
            settle(label, delay);
            Ok(())
        }
        Readiness::Poll { timeout_ms, interval_ms } => {
            wait_until(
                label,
                Duration::from_millis(timeout_ms),
                Duration::from_millis(interval_ms.max(1)),
                ready,
            )?;
            Ok(())
        }
    }
}
