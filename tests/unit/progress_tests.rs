/*!
 * Tests for the pseudo-progress emitter
 */

use std::time::Duration;

use uuid::Uuid;

use vasha::app_config::ProgressConfig;
use vasha::progress::{ProgressBoard, ProgressHandle};

fn fast_settings() -> ProgressConfig {
    ProgressConfig { interval_ms: 50, floor: 5, ceiling: 95 }
}

/// Test that a slow operation gets several intermediate ticks, all
/// monotone and below 100
#[tokio::test]
async fn test_progress_withSlowOperation_shouldTickMonotonicallyBelow100() {
    let mut handle = ProgressHandle::start(&fast_settings());
    let receiver = handle.subscribe();

    let mut observed = vec![*receiver.borrow()];
    for _ in 0..9 {
        tokio::time::sleep(Duration::from_millis(60)).await;
        let value = *receiver.borrow();
        if value != *observed.last().unwrap() {
            observed.push(value);
        }
    }
    handle.finish();

    // Floor plus at least two distinct intermediate ticks
    assert!(observed.len() >= 3, "observed: {:?}", observed);
    assert_eq!(observed[0], 5);
    for value in &observed {
        assert!(*value < 100, "intermediate value hit 100: {:?}", observed);
    }
    for pair in observed.windows(2) {
        assert!(pair[0] < pair[1], "not monotone: {:?}", observed);
    }
    assert_eq!(*receiver.borrow(), 100);
}

/// Test the terminal value: published once by finish, stable afterwards
#[tokio::test]
async fn test_finish_shouldPublishASingleStableTerminal100() {
    let mut handle = ProgressHandle::start(&fast_settings());
    let receiver = handle.subscribe();

    handle.finish();
    assert_eq!(*receiver.borrow(), 100);

    // A second finish is a no-op and the ticker is gone
    handle.finish();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(*receiver.borrow(), 100);
}

/// Test that progress advances with no subscriber at all: the channel
/// stores values whether or not anything is listening yet
#[tokio::test]
async fn test_progress_withNoSubscribers_shouldStillAdvanceAndFinish() {
    let settings = ProgressConfig { interval_ms: 10, floor: 5, ceiling: 95 };
    let mut handle = ProgressHandle::start(&settings);

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(handle.value() > 5, "ticker stalled at the floor: {}", handle.value());

    handle.finish();
    assert_eq!(handle.value(), 100);

    // A subscriber arriving after the fact sees the terminal value
    assert_eq!(*handle.subscribe().borrow(), 100);
}

/// Test that no tick lands after the terminal write while the ticker is
/// running at full speed
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_finish_duringActiveTicking_shouldNeverBeOvertakenByATick() {
    let settings = ProgressConfig { interval_ms: 10, floor: 5, ceiling: 95 };

    for _ in 0..20 {
        let mut handle = ProgressHandle::start(&settings);
        let receiver = handle.subscribe();

        tokio::time::sleep(Duration::from_millis(15)).await;
        handle.finish();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(*receiver.borrow(), 100);
    }
}

/// Test that an abandoned operation never looks complete
#[tokio::test]
async fn test_drop_withoutFinish_shouldNeverPublish100() {
    let handle = ProgressHandle::start(&fast_settings());
    let receiver = handle.subscribe();

    drop(handle);
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(*receiver.borrow() < 100, "dropped handle published {}", *receiver.borrow());
}

/// Test saturation at the configured ceiling
#[tokio::test]
async fn test_progress_withLowCeiling_shouldSaturateAtTheCeiling() {
    let settings = ProgressConfig { interval_ms: 10, floor: 5, ceiling: 20 };
    let mut handle = ProgressHandle::start(&settings);

    // Plenty of ticks to cover the 5 to 20 span at 2 or more per tick
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(handle.value(), 20);

    handle.finish();
    assert_eq!(handle.value(), 100);
}

/// Test the board's poll-by-correlation-id surface
#[tokio::test]
async fn test_board_withRegisteredJob_shouldPollAndForget() {
    let board = ProgressBoard::new();
    let id = Uuid::new_v4();
    let mut handle = ProgressHandle::start(&fast_settings());

    board.register(id, handle.subscribe());
    assert_eq!(board.poll(&id), Some(5));
    assert!(board.poll(&Uuid::new_v4()).is_none());

    handle.finish();
    assert_eq!(board.poll(&id), Some(100));
    assert!(board.subscribe(&id).is_some());

    board.remove(&id);
    assert!(board.poll(&id).is_none());
}
