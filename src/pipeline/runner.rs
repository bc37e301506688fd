//! Reader/compute thread split
//!
//! The reader thread parses ticks out of the mapping and pushes them into
//! the ring; the calling thread pops and runs the per-tick pipeline. The
//! compute side can be pinned to a core to reduce jitter.

use super::{LockFreeQueue, QueueError};
use crate::data::{Tick, TickReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Drive `on_tick` for every tick in the file, with the reader on its own
/// thread. Returns the number of ticks processed. Tick order is preserved:
/// the ring is FIFO for its single producer.
pub fn run_split(
    reader: TickReader,
    queue_capacity: usize,
    pin_core: Option<usize>,
    mut on_tick: impl FnMut(Tick),
) -> Result<u64, QueueError> {
    let queue = LockFreeQueue::<Tick>::with_capacity(queue_capacity)?;
    let done = AtomicBool::new(false);
    let mut processed = 0u64;

    if let Some(core) = pin_core {
        pin_current_thread(core);
    }

    thread::scope(|scope| {
        scope.spawn(|| {
            for tick in reader {
                let mut item = Box::new(tick);
                // Ring full: spin until the consumer frees a slot
                loop {
                    match queue.push(item) {
                        Ok(()) => break,
                        Err(back) => {
                            item = back;
                            std::hint::spin_loop();
                        }
                    }
                }
            }
            done.store(true, Ordering::Release);
        });

        loop {
            if let Some(tick) = queue.pop() {
                on_tick(*tick);
                processed += 1;
            } else if done.load(Ordering::Acquire) {
                // Producer finished; drain whatever is left
                while let Some(tick) = queue.pop() {
                    on_tick(*tick);
                    processed += 1;
                }
                break;
            } else {
                std::hint::spin_loop();
            }
        }
    });

    Ok(processed)
}

/// Best-effort pin of the calling thread
fn pin_current_thread(core: usize) {
    if let Some(core_ids) = core_affinity::get_core_ids() {
        if let Some(id) = core_ids.get(core) {
            if core_affinity::set_for_current(*id) {
                tracing::info!(core, "pinned compute thread");
                return;
            }
        }
    }
    tracing::warn!(core, "could not pin compute thread");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(rows: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let mut contents = String::from("timestamp,bid,ask,volume\n");
        for i in 0..rows {
            contents.push_str(&format!(
                "{},4500.25,4500.75,{}\n",
                (i as i64 + 1) * 1_000,
                100 + i
            ));
        }
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_invalid_capacity_rejected() {
        let file = fixture(1);
        let reader = TickReader::open(file.path()).unwrap();
        let result = run_split(reader, 1000, None, |_| {});
        assert_eq!(result.err(), Some(QueueError::InvalidArgument(1000)));
    }

    #[test]
    fn test_preserves_file_order() {
        let file = fixture(500);
        let reader = TickReader::open(file.path()).unwrap();

        let mut timestamps = Vec::new();
        let processed = run_split(reader, 64, None, |tick| {
            timestamps.push(tick.timestamp);
        })
        .unwrap();

        assert_eq!(processed, 500);
        let expected: Vec<i64> = (1..=500).map(|i| i * 1_000).collect();
        assert_eq!(timestamps, expected);
    }

    #[test]
    fn test_empty_stream() {
        let file = fixture(0);
        let reader = TickReader::open(file.path()).unwrap();
        let processed = run_split(reader, 1024, None, |_| {}).unwrap();
        assert_eq!(processed, 0);
    }
}
