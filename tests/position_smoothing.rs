use approx::assert_relative_eq;
use shuttle_reconciler::config::SmoothingConfig;
use shuttle_reconciler::smoothing::{equirectangular_distance, LatLon, PositionSample, PositionSmoother};

const ORIGIN: LatLon = LatLon::new(42.3750, -71.1200);

fn sample(position: LatLon) -> PositionSample {
    PositionSample::new(position.lat, position.lon, 0.0)
}

#[test]
fn five_metre_shuffle_is_damped() {
    let mut smoother = PositionSmoother::new(SmoothingConfig::default());
    smoother.ingest("bus-7", sample(ORIGIN), 0);

    // 3 m north, 4 m east.
    let lon_scale = 111_320.0 * ORIGIN.lat.to_radians().cos();
    let raw = LatLon::new(ORIGIN.lat + 3.0 / 111_320.0, ORIGIN.lon + 4.0 / lon_scale);
    assert_relative_eq!(equirectangular_distance(ORIGIN, raw), 5.0, epsilon = 1e-3);

    smoother.ingest("bus-7", sample(raw), 6_000);
    let settled = smoother.current_position("bus-7", 6_000 + 7_600).unwrap();

    assert_relative_eq!(settled.lat, ORIGIN.lat + 0.25 * (raw.lat - ORIGIN.lat), epsilon = 1e-12);
    assert_relative_eq!(settled.lon, ORIGIN.lon + 0.25 * (raw.lon - ORIGIN.lon), epsilon = 1e-12);
}

#[test]
fn repeated_small_updates_creep_toward_truth() {
    let mut smoother = PositionSmoother::new(SmoothingConfig::default());
    smoother.ingest("bus-7", sample(ORIGIN), 0);

    let truth = LatLon::new(ORIGIN.lat + 6.0 / 111_320.0, ORIGIN.lon);
    let mut last_gap = equirectangular_distance(ORIGIN, truth);
    for poll in 1..=10u64 {
        let now = poll * 8_000;
        smoother.ingest("bus-7", sample(truth), now);
        let here = smoother.current_position("bus-7", now + 7_600).unwrap();
        let gap = equirectangular_distance(here, truth);
        assert!(gap < last_gap);
        last_gap = gap;
    }
    assert!(last_gap < 0.5);
}

#[test]
fn new_sample_mid_flight_does_not_jump_back() {
    let mut smoother = PositionSmoother::new(SmoothingConfig::default());
    smoother.ingest("bus-7", sample(ORIGIN), 0);

    let first = LatLon::new(42.3780, -71.1170);
    smoother.ingest("bus-7", sample(first), 10_000);

    let restart_at = 10_000 + 2_500;
    let eased = smoother.current_position("bus-7", restart_at).unwrap();
    assert!(eased.lat > ORIGIN.lat && eased.lat < first.lat);

    smoother.ingest("bus-7", sample(LatLon::new(42.3800, -71.1150)), restart_at);
    assert_eq!(smoother.current_position("bus-7", restart_at), Some(eased));
    assert_eq!(smoother.state("bus-7").unwrap().from, eased);
}

#[test]
fn easing_runs_monotonically_from_start_to_target() {
    let mut smoother = PositionSmoother::new(SmoothingConfig::default());
    smoother.ingest("bus-7", sample(ORIGIN), 0);

    let target = LatLon::new(42.3790, -71.1260);
    smoother.ingest("bus-7", sample(target), 1_000);

    assert_eq!(smoother.current_position("bus-7", 1_000), Some(ORIGIN));
    assert_eq!(smoother.current_position("bus-7", 8_600), Some(target));
    assert_eq!(smoother.current_position("bus-7", 20_000), Some(target));

    let mut previous = ORIGIN;
    for ms in (1_100..8_600).step_by(100) {
        let here = smoother.current_position("bus-7", ms).unwrap();
        assert!(here.lat > previous.lat, "lat stalled at {ms}ms");
        assert!(here.lon < previous.lon, "lon stalled at {ms}ms");
        previous = here;
    }
}
