//! Integration tests for the Controller scan → fire → drain pipeline.
//!
//! Time is simulated: every tick is given an explicit uptime, and the
//! mock IO stamps each hardware call with it.

use std::path::PathBuf;
use std::time::Duration;

use embedded_hal::digital::ErrorKind;
use propctl::app::events::ControllerEvent;
use propctl::app::service::{Controller, TickReport};
use propctl::config::{SoundBinding, SystemConfig, TriggerConfig, TriggerKindConfig};
use propctl::error::{ConfigError, Error, HardwareError};
use propctl::events::TriggerId;
use propctl::pins::{PIN_OFF, PIN_ON};
use propctl::sound::{Sound, SoundCatalog};

use crate::mock_hw::{IoCall, MockIo, MockPlayer, RecordingSink};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn catalog(names: &[&str]) -> SoundCatalog<MockPlayer> {
    let mut catalog = SoundCatalog::new();
    for name in names {
        let files = (0..3).map(|i| PathBuf::from(format!("{name}/{i}.wav"))).collect();
        catalog.insert(Sound::with_files(*name, files, 0));
    }
    catalog
}

fn timed(name: &str, input_pin: u8, drive_pin: u8, duration_ms: u64, cooldown_ms: u64) -> TriggerConfig {
    TriggerConfig {
        name: name.into(),
        input_pin,
        cooldown_ms,
        sound: None,
        kind: TriggerKindConfig::TimedRelay {
            drive_pin,
            duration_ms,
        },
    }
}

fn with_triggers(triggers: Vec<TriggerConfig>) -> SystemConfig {
    SystemConfig {
        triggers,
        ..SystemConfig::default()
    }
}

struct Rig {
    ctl: Controller<MockPlayer>,
    io: MockIo,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: &SystemConfig, sounds: &[&str]) -> Self {
        let io = MockIo::new();
        let mut sink = RecordingSink::new();
        let ctl = Controller::new(config, catalog(sounds), MockPlayer::new(), &io).unwrap();
        ctl.start(&mut sink);
        Self { ctl, io, sink }
    }

    fn tick(&mut self, now_ms: u64) -> TickReport {
        self.io.now = ms(now_ms);
        self.ctl.tick(ms(now_ms), &mut self.io, &mut self.sink).unwrap()
    }

    /// Tick every 100 ms over `[from, to]`.
    fn run(&mut self, from_ms: u64, to_ms: u64) {
        let mut now = from_ms;
        while now <= to_ms {
            self.tick(now);
            now += 100;
        }
    }
}

// ── Timed relay ───────────────────────────────────────────────

#[test]
fn timed_relay_drives_on_at_fire_and_off_after_duration() {
    let mut rig = Rig::new(&with_triggers(vec![timed("bats", 2, 4, 2000, 5000)]), &[]);

    rig.tick(0);
    rig.io.press(2);
    rig.run(100, 3000);

    assert_eq!(rig.io.writes_to(4), vec![(ms(100), PIN_ON), (ms(2100), PIN_OFF)]);
    assert_eq!(rig.sink.fired(), vec!["bats"]);
    assert_eq!(rig.sink.ended(), vec!["bats"]);
}

#[test]
fn reasserting_during_cooldown_does_not_refire() {
    let mut rig = Rig::new(&with_triggers(vec![timed("bats", 2, 4, 1000, 5000)]), &[]);

    rig.io.press(2);
    rig.tick(0);
    rig.io.release(2);
    rig.tick(100);

    // While on.
    rig.io.press(2);
    rig.tick(500);
    rig.io.release(2);
    rig.run(600, 2000);

    // Off, still cooling down.
    rig.io.press(2);
    rig.tick(4900);
    rig.io.release(2);
    rig.tick(5000);
    assert_eq!(rig.sink.fired().len(), 1);
    assert_eq!(rig.io.writes_to(4).len(), 2);

    // Cooldown elapsed.
    rig.io.press(2);
    let report = rig.tick(5100);
    assert_eq!(report.activations, 1);
    assert_eq!(rig.sink.fired().len(), 2);
    assert_eq!(rig.io.output(4), PIN_ON);
}

#[test]
fn held_input_fires_only_on_the_edge() {
    let mut rig = Rig::new(&with_triggers(vec![timed("bats", 2, 4, 300, 0)]), &[]);

    rig.io.press(2);
    rig.run(0, 2000);

    assert_eq!(rig.sink.fired().len(), 1, "no new edge, no new activation");
    assert_eq!(rig.io.output(4), PIN_OFF);
}

// ── Pulse ("wig-wag") ─────────────────────────────────────────

#[test]
fn pulse_trigger_follows_waveform_for_its_duration() {
    let pulse = TriggerConfig {
        name: "possum".into(),
        input_pin: 0,
        cooldown_ms: 10_000,
        sound: None,
        kind: TriggerKindConfig::Pulse {
            drive_pin: 0,
            duration_ms: 6000,
            pulse_interval_ms: 1000,
            pulse_duration_ms: 300,
        },
    };
    let mut rig = Rig::new(&with_triggers(vec![pulse]), &[]);

    let t0 = 2000;
    rig.io.press(0);
    rig.run(t0, t0 + 8000);

    let mut expected = Vec::new();
    for k in 0..6 {
        expected.push((ms(t0 + k * 1000), PIN_ON));
        expected.push((ms(t0 + k * 1000 + 300), PIN_OFF));
    }
    expected.push((ms(t0 + 6000), PIN_OFF));
    assert_eq!(rig.io.writes_to(0), expected);

    let trigger = rig.ctl.trigger_by_name("possum").unwrap();
    assert!(!trigger.is_on());
    assert_eq!(rig.ctl.pending_events(), 0);
    assert!(rig.sink.events.contains(&ControllerEvent::TriggerEnded {
        trigger: trigger.id(),
        name: "possum".into(),
        at: ms(t0 + 6000),
    }));
}

// ── Notification order ────────────────────────────────────────

#[test]
fn subscribers_on_one_pin_fire_in_registration_order() {
    let config = with_triggers(vec![timed("a", 3, 1, 500, 0), timed("b", 3, 2, 500, 0)]);
    let mut rig = Rig::new(&config, &[]);

    rig.io.press(3);
    let report = rig.tick(0);
    assert_eq!(report.activations, 2);
    assert_eq!(rig.sink.fired(), vec!["a", "b"]);
    assert_eq!(
        rig.io.calls,
        vec![
            (ms(0), IoCall::Write { pin: 1, state: PIN_ON }),
            (ms(0), IoCall::Write { pin: 2, state: PIN_ON }),
        ]
    );

    let report = rig.tick(100);
    assert_eq!(report, TickReport::default(), "unchanged pin notifies nobody");
}

#[test]
fn input_changes_are_reported_both_ways() {
    let mut rig = Rig::new(&with_triggers(vec![]), &[]);
    rig.io.press(7);
    rig.tick(0);
    rig.io.release(7);
    rig.tick(100);

    let changes: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, ControllerEvent::InputChanged { .. }))
        .cloned()
        .collect();
    assert_eq!(
        changes,
        vec![
            ControllerEvent::InputChanged { pin: 7, level: PIN_ON },
            ControllerEvent::InputChanged { pin: 7, level: PIN_OFF },
        ]
    );
    assert_eq!(rig.sink.events[0], ControllerEvent::Started { triggers: 0 });
}

// ── Default installation ──────────────────────────────────────

#[test]
fn default_installation_fires_bats_and_saloon_together() {
    let config = SystemConfig::default();
    let names: Vec<&str> = config.sounds.iter().map(|s| s.name.as_str()).collect();
    let mut rig = Rig::new(&config, &names);

    rig.io.press(0);
    rig.tick(0);

    assert_eq!(rig.sink.fired(), vec!["bats", "saloon_music"]);
    assert_eq!(rig.sink.ended(), vec!["saloon_music"], "sound-only ends at once");
    assert_eq!(rig.io.output(0), PIN_ON);

    let started = &rig.ctl.sounds().backend().started;
    assert_eq!(started.len(), 1);
    assert!(started[0].starts_with("saloon"));
    assert!(
        rig.io.calls.iter().all(|(_, c)| !matches!(c, IoCall::Enable(_))),
        "default output touches no channel line"
    );

    rig.run(100, 20_000);
    assert_eq!(rig.io.writes_to(0), vec![(ms(0), PIN_ON), (ms(20_000), PIN_OFF)]);
}

// ── Sound bindings ────────────────────────────────────────────

#[test]
fn bound_channel_is_enabled_then_released_on_next_request() {
    let mut possum = timed("possum", 0, 0, 500, 0);
    possum.sound = Some(SoundBinding {
        name: "clicking".into(),
        channel: Some(2),
    });
    let mut rabbit = timed("rabbit", 1, 1, 500, 0);
    rabbit.sound = Some(SoundBinding {
        name: "sssh".into(),
        channel: Some(5),
    });
    let mut rig = Rig::new(&with_triggers(vec![possum, rabbit]), &["clicking", "sssh"]);

    rig.io.press(0);
    rig.tick(0);
    assert!(rig.io.channel_enabled(2));

    rig.ctl.sounds_mut().backend_mut().finish_dir("clicking");
    rig.tick(100);
    assert!(rig.io.channel_enabled(2), "reconciled lazily, not per tick");

    rig.io.press(1);
    rig.tick(200);
    assert!(!rig.io.channel_enabled(2));
    assert!(rig.io.channel_enabled(5));
}

// ── Failure handling ──────────────────────────────────────────

#[test]
fn write_failure_aborts_tick_and_shutdown_clears_outputs() {
    let mut rig = Rig::new(&with_triggers(vec![timed("bats", 2, 4, 2000, 0)]), &[]);
    rig.io.fail_write_on = Some(4);
    rig.io.press(2);

    let result = rig.ctl.tick(ms(0), &mut rig.io, &mut rig.sink);
    assert_eq!(
        result,
        Err(Error::Hardware(HardwareError::Write {
            pin: 4,
            kind: ErrorKind::Other
        }))
    );

    rig.ctl.shutdown(&mut rig.io).unwrap();
    assert_eq!(rig.io.output(4), PIN_OFF);
    assert!((0..8).all(|c| !rig.io.channel_enabled(c)));
}

#[test]
fn read_failure_aborts_tick_without_losing_the_edge() {
    let mut rig = Rig::new(&with_triggers(vec![timed("bats", 0, 3, 2000, 0)]), &[]);
    rig.io.fail_read_on = Some(5);
    rig.io.press(0);

    let result = rig.ctl.tick(ms(0), &mut rig.io, &mut rig.sink);
    assert_eq!(
        result,
        Err(Error::Hardware(HardwareError::Read {
            pin: 5,
            kind: ErrorKind::Other
        }))
    );
    assert_eq!(rig.ctl.world().pin_state(0), PIN_OFF);
    assert!(rig.sink.fired().is_empty());

    // Input still held: the next good scan delivers the press.
    let report = rig.tick(100);
    assert_eq!(report.activations, 1);
    assert_eq!(rig.ctl.world().pin_state(0), PIN_ON);
    assert_eq!(rig.sink.fired(), vec!["bats"]);
    assert_eq!(rig.io.writes_to(3), vec![(ms(100), PIN_ON)]);
}

fn clicking_on_channel(name: &str, input_pin: u8, drive_pin: u8, channel: u8) -> TriggerConfig {
    let mut trigger = timed(name, input_pin, drive_pin, 500, 0);
    trigger.sound = Some(SoundBinding {
        name: "clicking".into(),
        channel: Some(channel),
    });
    trigger
}

#[test]
fn channel_enable_failure_propagates_out_of_tick() {
    let mut rig = Rig::new(
        &with_triggers(vec![clicking_on_channel("possum", 0, 0, 2)]),
        &["clicking"],
    );
    rig.io.fail_channel_on = Some(2);
    rig.io.press(0);

    let result = rig.ctl.tick(ms(0), &mut rig.io, &mut rig.sink);
    assert_eq!(
        result,
        Err(Error::Hardware(HardwareError::Channel {
            channel: 2,
            kind: ErrorKind::Other
        }))
    );
    assert!(!rig.io.channel_enabled(2));
    assert_eq!(rig.ctl.sounds().backend().playing_count(), 0);
}

#[test]
fn channel_disable_failure_propagates_out_of_tick() {
    let mut rig = Rig::new(
        &with_triggers(vec![
            clicking_on_channel("possum", 0, 0, 2),
            clicking_on_channel("rabbit", 1, 1, 5),
        ]),
        &["clicking"],
    );
    rig.io.press(0);
    rig.tick(0);
    assert!(rig.io.channel_enabled(2));

    // Releasing channel 2 happens in the cleanup before rabbit's sound.
    rig.ctl.sounds_mut().backend_mut().finish_dir("clicking");
    rig.io.fail_channel_on = Some(2);
    rig.io.press(1);
    rig.io.now = ms(100);

    let result = rig.ctl.tick(ms(100), &mut rig.io, &mut rig.sink);
    assert_eq!(
        result,
        Err(Error::Hardware(HardwareError::Channel {
            channel: 2,
            kind: ErrorKind::Other
        }))
    );
    assert!(!rig.io.channel_enabled(5));
}

// ── Queries ───────────────────────────────────────────────────

#[test]
fn queries_reflect_fire_and_cooldown() {
    let mut bats = timed("bats", 2, 4, 2000, 10_000);
    bats.sound = Some(SoundBinding {
        name: "screech".into(),
        channel: None,
    });
    let mut rig = Rig::new(&with_triggers(vec![bats]), &["screech"]);
    assert_eq!(rig.ctl.triggers().len(), 1);
    assert_eq!(rig.ctl.next_due(), None);

    rig.io.press(2);
    rig.tick(500);

    let trigger = rig.ctl.trigger(TriggerId(0)).unwrap();
    assert_eq!(trigger.name(), "bats");
    assert!(trigger.is_on());
    assert_eq!(trigger.cooldown_until(), ms(10_500));
    assert_eq!(trigger.sound().map(|s| s.name.as_str()), Some("screech"));
    assert_eq!(rig.ctl.next_due(), Some(ms(2500)));
    assert_eq!(rig.ctl.world().pin_state(2), PIN_ON);
    assert!(rig.ctl.trigger(TriggerId(1)).is_none());

    rig.tick(2500);
    assert_eq!(rig.ctl.next_due(), None);
    assert!(!rig.ctl.triggers()[0].is_on());
}

#[test]
fn construction_rejects_bad_references() {
    let io = MockIo::new();

    let mut unknown_sound = timed("bats", 0, 0, 100, 0);
    unknown_sound.sound = Some(SoundBinding {
        name: "screech".into(),
        channel: None,
    });
    let result = Controller::new(
        &with_triggers(vec![unknown_sound]),
        catalog(&[]),
        MockPlayer::new(),
        &io,
    );
    assert!(matches!(result, Err(ConfigError::UnknownSound { .. })));

    let mut bad_channel = timed("bats", 0, 0, 100, 0);
    bad_channel.sound = Some(SoundBinding {
        name: "screech".into(),
        channel: Some(8),
    });
    let result = Controller::new(
        &with_triggers(vec![bad_channel]),
        catalog(&["screech"]),
        MockPlayer::new(),
        &io,
    );
    assert!(matches!(
        result,
        Err(ConfigError::InvalidChannel { channel: 8, .. })
    ));

    let small = MockIo::with_counts(2, 2, 0);
    let result = Controller::new(
        &with_triggers(vec![timed("rabbit", 1, 2, 100, 0)]),
        catalog(&[]),
        MockPlayer::new(),
        &small,
    );
    assert!(matches!(
        result,
        Err(ConfigError::InvalidOutputPin { pin: 2, .. })
    ));
}
