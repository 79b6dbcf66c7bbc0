//! Eigenschaften des Verlaufspuffers über viele Eingaben hinweg.

use reflexa_core::{CoreError, HistoryBuffer};

fn readings(n: usize) -> Vec<f64> {
    (0..n).map(|i| ((i * 37) % 101) as f64 * 0.5).collect()
}

#[test]
fn length_never_exceeds_capacity() {
    for capacity in 1..=6 {
        let mut buffer = HistoryBuffer::new(capacity).expect("capacity > 0");
        for (i, v) in readings(20).into_iter().enumerate() {
            buffer.push(v);
            assert_eq!(buffer.len(), (i + 1).min(capacity));
        }
    }
}

#[test]
fn overflow_keeps_the_newest_readings_in_order() {
    let values = readings(12);
    for capacity in 1..=5 {
        let mut buffer = HistoryBuffer::new(capacity).expect("capacity > 0");
        for v in &values {
            buffer.push(*v);
        }
        assert_eq!(buffer.snapshot(), values[values.len() - capacity..].to_vec());
    }
}

#[test]
fn pushing_n_plus_one_drops_exactly_the_oldest() {
    let mut buffer = HistoryBuffer::new(3).expect("capacity > 0");
    for v in [21.0, 22.0, 23.0, 24.0] {
        buffer.push(v);
    }
    assert_eq!(buffer.snapshot(), vec![22.0, 23.0, 24.0]);
}

#[test]
fn mean_and_trend_do_not_change_state() {
    let mut buffer = HistoryBuffer::new(4).expect("capacity > 0");
    for v in readings(7) {
        buffer.push(v);
    }
    let before = buffer.clone();
    for window in 0..6 {
        let _ = buffer.mean(window);
        let _ = buffer.trend();
    }
    assert_eq!(buffer, before);
}

#[test]
fn trend_is_newest_minus_oldest() {
    let mut buffer = HistoryBuffer::new(5).expect("capacity > 0");
    for v in readings(9) {
        buffer.push(v);
        let snap = buffer.snapshot();
        let expected = if snap.len() < 2 {
            0.0
        } else {
            snap[snap.len() - 1] - snap[0]
        };
        assert!((buffer.trend() - expected).abs() < 1e-12);
    }
}

#[test]
fn empty_buffer_only_errors_without_fallback() {
    let buffer = HistoryBuffer::new(2).expect("capacity > 0");
    assert_eq!(buffer.mean(2), Err(CoreError::EmptyInput));
    assert!((buffer.mean_or(2, 7.5) - 7.5).abs() < f64::EPSILON);
    assert!(buffer.trend().abs() < f64::EPSILON);
    assert!(buffer.latest().is_none());
}
