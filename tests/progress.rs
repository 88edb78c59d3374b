//! Progress reporting integration tests.

mod support;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use retime::{ProgressCallback, ProgressInfo, RemuxOptions, RemuxSession, TimeBase};

use support::{FakeDestination, FakeSource, audio, packet, video};

const MPEG_TS: TimeBase = TimeBase::new(1, 90_000);
const MILLIS: TimeBase = TimeBase::new(1, 1_000);

#[derive(Default)]
struct Snapshots(Mutex<Vec<ProgressInfo>>);

impl ProgressCallback for Snapshots {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Ok(mut seen) = self.0.lock() {
            seen.push(info.clone());
        }
    }
}

fn remux_with(progress: Arc<Snapshots>, batch_size: u64, source: FakeSource) {
    let options = RemuxOptions::new()
        .with_progress(progress)
        .with_batch_size(batch_size);
    RemuxSession::new(source, FakeDestination::new(MILLIS), &options)
        .expect("session")
        .run()
        .expect("remux");
}

#[test]
fn final_snapshot_describes_the_last_packet() {
    let progress = Arc::new(Snapshots::default());
    let source = FakeSource::new(vec![video(0, MPEG_TS), audio(1, MPEG_TS)]).with_packets([
        packet(0, 900_000, 900_000),
        packet(1, 450_000, 450_000),
        packet(1, 630_000, 630_000),
    ]);

    remux_with(progress.clone(), 100, source);

    let seen = progress.0.lock().unwrap();
    assert_eq!(seen.len(), 1, "only the closing report below the batch size");
    let last = &seen[0];
    assert_eq!(last.packets_written, 3);
    assert_eq!(last.bytes_written, 3 * 188);
    assert_eq!(last.current_stream, Some(1));
    assert_eq!(last.current_timestamp, Some(Duration::from_secs(2)));
}

#[test]
fn every_packet_reports_with_batch_size_one() {
    let progress = Arc::new(Snapshots::default());
    let source = FakeSource::new(vec![video(0, MPEG_TS)])
        .with_packets((1..=3).map(|tick| packet(0, 90_000 * tick, 90_000 * tick)));

    remux_with(progress.clone(), 1, source);

    let counts: Vec<u64> = progress
        .0
        .lock()
        .unwrap()
        .iter()
        .map(|info| info.packets_written)
        .collect();
    assert_eq!(counts, vec![1, 2, 3, 3]);
}

#[test]
fn early_stop_sends_no_closing_report() {
    let progress = Arc::new(Snapshots::default());
    let source = FakeSource::new(vec![video(0, MPEG_TS)]).with_packets([packet(0, 0, 0)]);

    remux_with(progress.clone(), 1, source);

    assert!(progress.0.lock().unwrap().is_empty());
}
