// Unit tests for domain models

use super::*;

const SAMPLE_VALUES: [f64; 14] = [
    -1000.0, -0.5, -0.01, 0.0, 0.01, 0.049, 0.5, 9.99, 10.0, 59.95, 60.0, 60.01, 120.0, 1e9,
];

fn range_120() -> TrimRange {
    TrimRange::new(120.0).unwrap()
}

#[test]
fn test_time_spec_from_components() {
    let time = TimeSpec::from_components(1, 2, 3, 500);
    assert_eq!(time.seconds, 3723.5);
}

#[test]
fn test_time_spec_parse_seconds() {
    assert_eq!(TimeSpec::parse("123.456").unwrap().seconds, 123.456);
    assert_eq!(TimeSpec::parse(" 7 ").unwrap().seconds, 7.0);
}

#[test]
fn test_time_spec_parse_mm_ss() {
    assert_eq!(TimeSpec::parse("01:30.5").unwrap().seconds, 90.5);
    assert_eq!(TimeSpec::parse("90:00").unwrap().seconds, 5400.0);
}

#[test]
fn test_time_spec_parse_hh_mm_ss() {
    let time = TimeSpec::parse("01:02:03.25").unwrap();
    assert!((time.seconds - 3723.25).abs() < 1e-9);
}

#[test]
fn test_time_spec_parse_invalid() {
    assert!(TimeSpec::parse("invalid").is_err());
    assert!(TimeSpec::parse("00:60").is_err());
    assert!(TimeSpec::parse("01:60:00").is_err());
    assert!(TimeSpec::parse("-10").is_err());
    assert!(TimeSpec::parse("inf").is_err());
    assert!(TimeSpec::parse("1:2:3:4").is_err());
}

#[test]
fn test_ffmpeg_timestamp_format() {
    assert_eq!(TimeSpec::from_seconds(0.0).to_ffmpeg_timestamp(), "00:00:00.000");
    assert_eq!(TimeSpec::from_seconds(10.0).to_ffmpeg_timestamp(), "00:00:10.000");
    assert_eq!(TimeSpec::from_seconds(3723.5).to_ffmpeg_timestamp(), "01:02:03.500");
    assert_eq!(TimeSpec::from_seconds(59.9996).to_ffmpeg_timestamp(), "00:01:00.000");
    assert_eq!(TimeSpec::from_seconds(-3.0).to_ffmpeg_timestamp(), "00:00:00.000");
    assert_eq!(format!("{}", TimeSpec::from_seconds(1.25)), "00:00:01.250");
}

#[test]
fn test_trim_range_starts_full_length() {
    let range = range_120();
    assert_eq!(range.start(), 0.0);
    assert_eq!(range.end(), 120.0);
    assert_eq!(range.length(), 120.0);
    assert_eq!(range.min_gap(), DEFAULT_MIN_GAP);
}

#[test]
fn test_trim_range_rejects_unusable_duration() {
    for duration in [0.0, -5.0, 0.05, f64::NAN, f64::INFINITY] {
        let err = TrimRange::new(duration).unwrap_err();
        assert!(matches!(err, DomainError::UnknownDuration(_)), "{duration}");
    }
    assert!(matches!(
        TrimRange::with_min_gap(10.0, 0.0),
        Err(DomainError::BadArgs(_))
    ));
}

#[test]
fn test_set_start_always_within_bounds() {
    for end in [0.06, 5.0, 120.0] {
        for value in SAMPLE_VALUES {
            let mut range = range_120();
            range.set_end(end);
            let returned = range.set_start(value);
            assert_eq!(returned, range.start());
            assert!(range.start() >= 0.0, "start {value}");
            assert!(range.start() <= range.end() - range.min_gap(), "start {value}");
        }
    }
}

#[test]
fn test_set_end_always_within_bounds() {
    for start in [0.0, 30.0, 119.9] {
        for value in SAMPLE_VALUES {
            let mut range = range_120();
            range.set_start(start);
            let returned = range.set_end(value);
            assert_eq!(returned, range.end());
            assert!(range.end() >= range.start() + range.min_gap(), "end {value}");
            assert!(range.end() <= range.duration(), "end {value}");
        }
    }
}

#[test]
fn test_setters_ignore_nan_and_clamp_infinities() {
    let mut range = range_120();
    range.set_start(10.0);
    assert_eq!(range.set_start(f64::NAN), 10.0);
    assert_eq!(range.set_end(f64::NAN), 120.0);
    assert_eq!(range.set_end(f64::INFINITY), 120.0);
    assert_eq!(range.set_start(f64::NEG_INFINITY), 0.0);
}

#[test]
fn test_start_cannot_cross_end() {
    let mut range = range_120();
    range.set_end(20.0);
    let start = range.set_start(50.0);
    assert!((start - 19.95).abs() < 1e-9);
}

#[test]
fn test_scrub_start_left_at_zero_stays_zero() {
    let mut range = range_120();
    assert_eq!(range.scrub_start_left(0.5), 0.0);
}

#[test]
fn test_scrub_moves_by_increment() {
    let mut range = range_120();
    range.set_start(10.0);
    range.set_end(20.0);
    assert_eq!(range.scrub_start_right(0.5), 10.5);
    assert_eq!(range.scrub_start_left(0.5), 10.0);
    assert_eq!(range.scrub_end_left(0.5), 19.5);
    assert_eq!(range.scrub_end_right(0.5), 20.0);
}

#[test]
fn test_scrub_never_escapes_bounds() {
    let mut range = range_120();
    range.set_end(1.0);
    for _ in 0..10 {
        range.scrub_start_right(0.5);
        assert!(range.start() <= range.end() - range.min_gap());
    }
    for _ in 0..10 {
        range.scrub_end_left(0.5);
        assert!(range.end() >= range.start() + range.min_gap() - 1e-12);
    }
    for _ in 0..400 {
        range.scrub_end_right(0.5);
        assert!(range.end() <= range.duration());
    }
    assert_eq!(range.end(), 120.0);
    for _ in 0..400 {
        range.scrub_start_left(0.5);
        assert!(range.start() >= 0.0);
    }
    assert_eq!(range.start(), 0.0);
}

#[test]
fn test_requested_length_is_floored() {
    let mut range = range_120();
    range.set_start(10.0);
    range.set_end(10.05);
    let request = TrimRequest::new("in.mp4", "/tmp", range);
    assert_eq!(request.requested_length(), MIN_TRIM_LENGTH);

    let mut range = range_120();
    range.set_start(10.0);
    range.set_end(20.0);
    let request = TrimRequest::new("in.mp4", "/tmp", range);
    assert_eq!(request.requested_length(), 10.0);
}

#[test]
fn test_thumbnail_filter_expression() {
    let geometry = ThumbnailGeometry::default();
    assert_eq!(
        geometry.filter_expression(),
        "scale=320:-1:force_original_aspect_ratio=decrease,crop=320:180"
    );
}

#[test]
fn test_trim_state_from_outcome() {
    let outcome = TrimOutcome::PartialSuccess {
        output: PathBuf::from("/out/a_temp.mp4"),
        original_deleted: false,
        message: "kept".to_string(),
    };
    assert_eq!(
        TrimState::from_outcome(&outcome),
        TrimState::PartialSuccess {
            output: PathBuf::from("/out/a_temp.mp4"),
            message: "kept".to_string(),
        }
    );
    assert!(!TrimState::from_outcome(&outcome).is_running());
    assert_eq!(outcome.output(), Some(Path::new("/out/a_temp.mp4")));
}

#[test]
fn test_directory_state_remember() {
    let mut state = DirectoryState {
        last_input_directory: None,
        recent_input_directories: vec![
            PathBuf::from("/videos/a"),
            PathBuf::from("/videos/gone"),
            PathBuf::from("/videos/b"),
        ],
    };
    let exists = |p: &Path| !p.ends_with("gone");

    state.remember(Path::new("/videos/b"), 5, exists);
    assert_eq!(
        state.recent_input_directories,
        vec![PathBuf::from("/videos/b"), PathBuf::from("/videos/a")]
    );
    assert_eq!(state.last_input_directory, Some(PathBuf::from("/videos/b")));

    for name in ["c", "d", "e", "f", "g"] {
        state.remember(&Path::new("/videos").join(name), 5, exists);
    }
    assert_eq!(state.recent_input_directories.len(), 5);
    assert_eq!(state.recent_input_directories[0], PathBuf::from("/videos/g"));
}

#[test]
fn test_directory_state_last_valid() {
    let state = DirectoryState {
        last_input_directory: Some(PathBuf::from("/videos/gone")),
        recent_input_directories: vec![],
    };
    assert!(state.last_valid(|_| false).is_none());
    assert_eq!(state.last_valid(|_| true), Some(Path::new("/videos/gone")));
}
