use super::*;
use crate::foundation::core::FrameIndex;

fn tiny(i: u64) -> GeneratedFrame {
    GeneratedFrame::new(FrameIndex(i), image::RgbaImage::new(1, 1))
}

#[test]
fn pops_in_push_order_then_none_after_producer_drops() {
    let (tx, rx) = frame_queue(8);
    for i in 0..5 {
        tx.push(tiny(i)).unwrap();
    }
    drop(tx);

    let got: Vec<u64> = std::iter::from_fn(|| rx.pop()).map(|f| f.index.0).collect();
    assert_eq!(got, vec![0, 1, 2, 3, 4]);
    assert!(rx.pop().is_none());
}

#[test]
fn try_push_reports_full_at_capacity() {
    let (tx, rx) = frame_queue(3);
    for i in 0..3 {
        tx.try_push(tiny(i)).unwrap();
    }
    match tx.try_push(tiny(3)) {
        Err(TryPushError::Full(f)) => assert_eq!(f.index, FrameIndex(3)),
        other => panic!("expected Full, got {other:?}"),
    }

    rx.pop().unwrap();
    tx.try_push(tiny(3)).unwrap();
}

#[test]
fn push_fails_once_consumer_is_gone() {
    let (tx, rx) = frame_queue(2);
    drop(rx);
    assert!(matches!(
        tx.push(tiny(0)),
        Err(MidirollError::Pipeline(_))
    ));
    assert!(matches!(tx.try_push(tiny(1)), Err(TryPushError::Closed(_))));
}

#[test]
fn zero_capacity_is_raised_to_one() {
    let (tx, _rx) = frame_queue(0);
    tx.try_push(tiny(0)).unwrap();
    assert!(matches!(tx.try_push(tiny(1)), Err(TryPushError::Full(_))));
}
