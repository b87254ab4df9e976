use spiraling::document::Key;
use spiraling::engine::Engine;
use spiraling::runtime::{EngineEvent, FixedTicker, Runner, TestEventSource};
use std::sync::mpsc;
use std::time::Duration;

/// Drive the shell loop headlessly: scripted events in, engine state out.
#[test]
fn scripted_session_reaches_the_engine() {
    let (tx, rx) = mpsc::channel();
    for c in "hi".chars() {
        tx.send(EngineEvent::KeyDown(Key::Char(c))).unwrap();
        tx.send(EngineEvent::KeyUp).unwrap();
    }
    tx.send(EngineEvent::Tick).unwrap();
    tx.send(EngineEvent::Quit).unwrap();

    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(10)),
    );
    let mut engine = Engine::with_defaults();

    loop {
        match runner.step() {
            EngineEvent::Quit => break,
            EngineEvent::KeyDown(key) => engine.on_key_down(key),
            EngineEvent::KeyUp => engine.on_key_up(),
            EngineEvent::Resize => {}
            EngineEvent::Tick => engine.tick(),
        }
    }

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.heading.text(), "hi");
    assert!(snapshot.chars_per_second >= 0.0);
    assert_eq!(snapshot.heart_rate, 110);
}

#[test]
fn disconnected_source_degrades_to_ticks() {
    let (tx, rx) = mpsc::channel::<EngineEvent>();
    drop(tx);

    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );
    let mut engine = Engine::with_defaults();

    // a dead input source must not wedge the loop; ticks keep flowing
    for _ in 0..3 {
        match runner.step() {
            EngineEvent::Tick => engine.tick(),
            other => panic!("expected Tick, got {:?}", other),
        }
    }

    assert!(engine.snapshot().heading.is_sentinel());
}
