//! Start-of-timeline probe tests.

mod support;

use retime::{MediaKind, StartProbe, TimeBase};

use support::{FakeSource, audio, packet, video};

const MPEG_TS: TimeBase = TimeBase::new(1, 90_000);

#[test]
fn reports_each_stream_start() {
    let mut source = FakeSource::new(vec![video(0, MPEG_TS), audio(1, MPEG_TS)]).with_packets([
        packet(0, 903_003, 900_000),
        packet(1, 450_000, 449_000),
        packet(0, 906_006, 903_003),
    ]);

    let report = StartProbe::inspect(&mut source, 100).expect("inspect");

    assert!(report.needs_fix());
    assert_eq!(report.packets_read, 2, "stops once every stream has both origins");
    assert_eq!(report.streams.len(), 2);

    let video = &report.streams[0];
    assert_eq!(video.kind, MediaKind::Video);
    assert_eq!(video.baseline.pts_origin, Some(903_003));
    assert_eq!(video.baseline.dts_origin, Some(903_003));
    let start = video.start_seconds().expect("video start");
    assert!((start - 10.0334).abs() < 1e-3, "start {start}");

    let audio = &report.streams[1];
    assert_eq!(audio.baseline.dts_origin, Some(449_000));
}

#[test]
fn zero_start_is_reported_as_no_fix_needed() {
    let mut source = FakeSource::new(vec![video(0, MPEG_TS), audio(1, MPEG_TS)])
        .with_packets([packet(0, 3_003, 3_003), packet(1, 0, 0), packet(0, 6_006, 6_006)]);

    let report = StartProbe::inspect(&mut source, 100).expect("inspect");

    assert!(!report.needs_fix());
    assert_eq!(report.already_normalized, Some(1));
    assert_eq!(report.packets_read, 2);
}

#[test]
fn silent_stream_leaves_its_start_unknown() {
    let mut source = FakeSource::new(vec![video(0, MPEG_TS), audio(1, MPEG_TS)]).with_packets(
        (1..=10).map(|tick| packet(0, 3_003 * tick, 3_003 * tick)),
    );

    let report = StartProbe::inspect(&mut source, 4).expect("inspect");

    assert_eq!(report.packets_read, 4);
    assert!(report.needs_fix());
    assert_eq!(report.streams[1].start_seconds(), None);
}

#[test]
fn source_without_packets_needs_no_fix() {
    let mut source = FakeSource::new(vec![video(0, MPEG_TS), audio(1, MPEG_TS)]);

    let report = StartProbe::inspect(&mut source, 100).expect("inspect");

    assert_eq!(report.packets_read, 0);
    assert_eq!(report.already_normalized, None);
    assert!(!report.needs_fix());
}

#[test]
fn read_errors_are_propagated() {
    let mut source = FakeSource::new(vec![video(0, MPEG_TS)]).then_fail();

    let error = StartProbe::inspect(&mut source, 10).unwrap_err();

    assert_eq!(error.code(), Some(-5));
}

#[test]
fn probing_a_missing_file_fails() {
    assert!(StartProbe::probe("this_file_does_not_exist.ts").is_err());
}
