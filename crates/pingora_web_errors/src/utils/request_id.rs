use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Hex timestamp (µs) plus a process-wide counter; unique within one process.
pub fn generate() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let c = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", ts, c)
}

#[cfg(test)]
mod tests {
    #[test]
    fn ids_differ() {
        assert_ne!(super::generate(), super::generate());
    }
}
