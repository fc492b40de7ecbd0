//! End-to-end control loop scenarios against the mock adapters.

use std::time::Duration;

use pumphouse::clock::TimeOfDay;
use pumphouse::config::{PumpSpec, TriggerMatching};
use pumphouse::control::{ControlLoop, Tick};
use pumphouse::events::PumpEvent;
use pumphouse::scheduler::PumpScheduler;

use crate::mock_hw::{MockGpio, RecordingSink, SimClock};

fn pump(pin: u8, triggers: &[TimeOfDay], duration_ms: u32) -> PumpSpec {
    let mut list = heapless::Vec::new();
    for &t in triggers {
        list.push(t).unwrap();
    }
    PumpSpec {
        pin,
        triggers: list,
        duration_ms,
    }
}

#[test]
fn two_pump_schedule_runs_end_to_end() {
    // Wall clock walks 08:59:59 → 09:00:11+ in 500 ms steps. The pump with
    // the 09:00:00 trigger must activate at the step whose sample is
    // exactly 09:00:00 and deactivate once 10 s of monotonic time has
    // accumulated; the other pump must never be commanded.
    let pumps = [
        pump(22, &[TimeOfDay::new(9, 0, 0)], 10_000),
        pump(27, &[TimeOfDay::new(9, 5, 0)], 5_000),
    ];
    let (gpio, state) = MockGpio::new(2);
    let (sink, events) = RecordingSink::new();
    let clock = SimClock::new(TimeOfDay::new(8, 59, 59), 500);
    let scheduler = PumpScheduler::new(&pumps, TriggerMatching::EdgeHit);
    let mut control = ControlLoop::new(gpio, clock, sink, scheduler);

    // 08:59:59 → 09:00:11 is 24 half-second steps; a few extra prove the
    // pump stays off afterwards.
    for _ in 0..30 {
        assert_eq!(control.step(), Tick::Continue);
    }

    let events = events.borrow();
    assert_eq!(
        *events,
        vec![
            PumpEvent::Activated {
                pump: 0,
                at: TimeOfDay::new(9, 0, 0),
            },
            PumpEvent::Deactivated {
                pump: 0,
                at: TimeOfDay::new(9, 0, 10),
                ran_ms: 10_000,
            },
        ]
    );

    let state = state.borrow();
    assert!(!state.pumps[0], "pump 0 back off after its run");
    assert!(!state.pumps[1], "pump 1 never scheduled");
    assert_eq!(state.history, vec![(0, true), (0, false)]);
}

#[test]
fn activation_on_the_very_first_sample() {
    // No previous sample exists on the first cycle; matching falls back to
    // the current sample alone.
    let pumps = [pump(22, &[TimeOfDay::new(9, 0, 0)], 10_000)];
    let (gpio, state) = MockGpio::new(1);
    let (sink, _events) = RecordingSink::new();
    let clock = SimClock::new(TimeOfDay::new(9, 0, 0), 500);
    let scheduler = PumpScheduler::new(&pumps, TriggerMatching::EdgeHit);
    let mut control = ControlLoop::new(gpio, clock, sink, scheduler);

    control.step();
    assert!(state.borrow().pumps[0]);
}

#[test]
fn ping_output_mirrors_ping_input() {
    let (gpio, state) = MockGpio::new(0);
    let (sink, _events) = RecordingSink::new();
    let clock = SimClock::new(TimeOfDay::new(12, 0, 0), 500);
    let scheduler = PumpScheduler::new(&[], TriggerMatching::EdgeHit);
    let mut control = ControlLoop::new(gpio, clock, sink, scheduler);

    state.borrow_mut().ping_in = true;
    control.step();
    assert!(state.borrow().ping_out);

    state.borrow_mut().ping_in = false;
    control.step();
    assert!(!state.borrow().ping_out);
}

#[test]
fn exit_mid_run_deasserts_every_output() {
    // Activate a pump, then assert the exit pin while it is still running:
    // shutdown must deassert the pump and ping outputs regardless of the
    // pump's state, and the scheduler must never see another cycle.
    let pumps = [pump(22, &[TimeOfDay::new(9, 0, 0)], 60_000)];
    let (gpio, state) = MockGpio::new(1);
    let (sink, events) = RecordingSink::new();
    let clock = SimClock::new(TimeOfDay::new(9, 0, 0), 500);
    let scheduler = PumpScheduler::new(&pumps, TriggerMatching::EdgeHit);
    let mut control = ControlLoop::new(gpio, clock, sink, scheduler);

    control.step();
    state.borrow_mut().ping_in = true;
    control.step();
    assert!(state.borrow().pumps[0], "pump running");
    assert!(state.borrow().ping_out, "ping mirrored high");

    state.borrow_mut().exit = true;
    assert_eq!(control.step(), Tick::Exit);
    control.shutdown();

    let state = state.borrow();
    assert!(!state.pumps[0]);
    assert!(!state.ping_out);
    assert_eq!(events.borrow().last(), Some(&PumpEvent::ExitSignal));
}

#[test]
fn run_loop_exits_cleanly_on_exit_pin() {
    // Full `run` path with a zero period: the loop polls until the exit
    // pin goes high, emits the exit event, and shuts down on its own.
    let pumps = [pump(22, &[TimeOfDay::new(9, 0, 0)], 2_000)];
    let (gpio, state) = MockGpio::new(1);
    let (sink, events) = RecordingSink::new();
    let clock = SimClock::new(TimeOfDay::new(9, 0, 0), 500);
    let scheduler = PumpScheduler::new(&pumps, TriggerMatching::EdgeHit);
    let mut control = ControlLoop::new(gpio, clock, sink, scheduler);

    state.borrow_mut().exit_after = Some(10);
    control.run(Duration::ZERO);

    let state = state.borrow();
    assert!(state.exit);
    assert!(!state.pumps[0]);
    assert!(!state.ping_out);

    let events = events.borrow();
    assert_eq!(events.last(), Some(&PumpEvent::ExitSignal));
    // Ten cycles at 500 ms covers the 2 s run: the pump both started and
    // stopped before the exit fired.
    assert!(events.contains(&PumpEvent::Activated {
        pump: 0,
        at: TimeOfDay::new(9, 0, 0),
    }));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, PumpEvent::Deactivated { pump: 0, .. }))
    );
}
