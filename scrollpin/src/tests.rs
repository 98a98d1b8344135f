use crate::*;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

const EPS: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPS
}

fn num(map: &PropertyMap, target: &str, property: &str) -> f32 {
    map.get(&PropertyKey::new(target, property))
        .and_then(Value::as_number)
        .unwrap_or(f32::NAN)
}

fn three_phase_spec() -> TimelineSpec {
    TimelineSpec::new()
        .with_default_easing(Easing::Linear)
        .with_initial(("mask", "scale"), 1.0)
        .with_initial(("mask", "x"), 0.0)
        .with_initial(("title", "opacity"), 1.0)
        .with_phase(
            Phase::new("hero", 1.0)
                .with_keyframe(Keyframe::to(("mask", "scale"), 0.5))
                .with_keyframe(Keyframe::to(("title", "opacity"), 0.0)),
        )
        .with_phase(Phase::new("dashboard", 2.0).with_keyframe(Keyframe::to(("mask", "x"), -25.0)))
        .with_phase(Phase::new("about", 1.0).with_keyframe(Keyframe::to(("mask", "x"), 25.0)))
}

fn trigger_at(top: f32) -> impl Fn() -> Option<Bounds> {
    move || Some(Bounds::new(0.0, top, 1280.0, 800.0))
}

#[test]
fn phase_boundaries_are_cumulative_normalized_weights() {
    let t = Timeline::build(&three_phase_spec()).unwrap();
    assert_eq!(t.boundaries(), std::vec![0.0, 0.25, 0.75, 1.0]);
    assert_eq!(t.total_weight(), 4.0);

    let (phase, local) = t.locate(0.5);
    assert_eq!(phase, PhaseId(1));
    assert!(approx(local, 0.5));
}

#[test]
fn arbitrary_weights_partition_progress_without_gaps() {
    let weights = [0.3f32, 1.7, 2.2, 0.1, 5.0, 0.35];
    let mut spec = TimelineSpec::new().with_initial(("a", "x"), 0.0);
    for (i, w) in weights.iter().enumerate() {
        spec = spec.with_phase(
            Phase::new(std::format!("p{i}"), *w).with_keyframe(Keyframe::to(("a", "x"), i as f32)),
        );
    }
    let t = Timeline::build(&spec).unwrap();
    let phases = t.phases();
    assert_eq!(phases[0].start, 0.0);
    assert_eq!(phases.last().unwrap().end, 1.0);
    for pair in phases.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
        assert!(pair[0].start < pair[0].end);
    }
}

#[test]
fn exact_boundary_belongs_to_incoming_phase() {
    let t = Timeline::build(&three_phase_spec()).unwrap();
    assert_eq!(t.phase_at(0.25).id, PhaseId(1));
    assert_eq!(t.phase_at(0.75).id, PhaseId(2));
    assert_eq!(t.phase_at(1.0).id, PhaseId(2));
    assert_eq!(t.phase_at(0.0).id, PhaseId(0));
}

#[test]
fn evaluate_is_a_pure_function_of_progress() {
    let t = Timeline::build(&three_phase_spec()).unwrap();
    let samples = [0.9f32, 0.1, 0.5, 0.0, 1.0, 0.33, 0.75, 0.25];
    let first: Vec<PropertyMap> = samples.iter().map(|&p| t.evaluate(p)).collect();
    let mut reversed = samples;
    reversed.reverse();
    for &p in &reversed {
        let idx = samples.iter().position(|&s| s == p).unwrap();
        assert_eq!(t.evaluate(p), first[idx]);
    }
}

#[test]
fn endpoints_match_initial_and_final_declared_values() {
    let t = Timeline::build(&three_phase_spec()).unwrap();

    let start = t.evaluate(0.0);
    assert_eq!(num(&start, "mask", "scale"), 1.0);
    assert_eq!(num(&start, "mask", "x"), 0.0);
    assert_eq!(num(&start, "title", "opacity"), 1.0);

    let end = t.evaluate(1.0);
    assert_eq!(num(&end, "mask", "scale"), 0.5);
    assert_eq!(num(&end, "mask", "x"), 25.0);
    assert_eq!(num(&end, "title", "opacity"), 0.0);
}

#[test]
fn progress_is_clamped() {
    let t = Timeline::build(&three_phase_spec()).unwrap();
    assert_eq!(t.evaluate(-3.0), t.evaluate(0.0));
    assert_eq!(t.evaluate(7.0), t.evaluate(1.0));
    assert_eq!(t.evaluate(f32::NAN), t.evaluate(0.0));
}

#[test]
fn interpolates_within_a_phase() {
    let t = Timeline::build(&three_phase_spec()).unwrap();
    let m = t.evaluate(0.125);
    assert!(approx(num(&m, "mask", "scale"), 0.75));
    // Second phase is half done at 0.5.
    let m = t.evaluate(0.5);
    assert!(approx(num(&m, "mask", "x"), -12.5));
}

#[test]
fn incoming_phase_starts_from_outgoing_final_state() {
    let t = Timeline::build(&three_phase_spec()).unwrap();
    let at_boundary = t.evaluate(0.75);
    assert_eq!(num(&at_boundary, "mask", "x"), -25.0);

    let just_before = t.evaluate(0.7499);
    assert!((num(&just_before, "mask", "x") - -25.0).abs() < 0.01);
}

#[test]
fn untouched_properties_keep_their_last_value() {
    let t = Timeline::build(&three_phase_spec()).unwrap();
    for p in [0.3f32, 0.5, 0.8, 1.0] {
        assert_eq!(num(&t.evaluate(p), "mask", "scale"), 0.5);
        assert_eq!(num(&t.evaluate(p), "title", "opacity"), 0.0);
    }
}

#[test]
fn cross_fade_keeps_adjacent_phases_active() {
    let spec = TimelineSpec::new()
        .with_default_easing(Easing::Linear)
        .with_initial(("dashboard", "opacity"), 0.0)
        .with_initial(("about", "opacity"), 0.0)
        .with_phase(
            Phase::new("dashboard", 1.0).with_keyframe(
                Keyframe::to(("dashboard", "opacity"), 1.0)
                    .with_offset(0.5)
                    .with_duration(1.0),
            ),
        )
        .with_phase(Phase::new("about", 1.0).with_keyframe(Keyframe::to(("about", "opacity"), 1.0)));
    let t = Timeline::build(&spec).unwrap();

    assert_eq!(t.active_phases(0.6), std::vec![PhaseId(0), PhaseId(1)]);
    assert_eq!(t.active_phases(0.1), std::vec![PhaseId(0)]);

    let m = t.evaluate(0.6);
    assert!(approx(num(&m, "dashboard", "opacity"), 0.7));
    assert!(approx(num(&m, "about", "opacity"), 0.2));
}

#[test]
fn later_declared_keyframe_wins_on_overlap() {
    let spec = TimelineSpec::new()
        .with_default_easing(Easing::Linear)
        .with_initial(("mask", "rotation"), 0.0)
        .with_phase(
            Phase::new("a", 1.0)
                .with_keyframe(Keyframe::to(("mask", "rotation"), -10.0).with_duration(2.0)),
        )
        .with_phase(Phase::new("b", 1.0).with_keyframe(Keyframe::to(("mask", "rotation"), 10.0)));
    let t = Timeline::build(&spec).unwrap();

    // At 0.5 the first keyframe is half way: -5. The second starts from there.
    assert!(approx(t.value_at(&("mask", "rotation").into(), 0.5).unwrap().as_number().unwrap(), -5.0));
    let m = t.evaluate(0.75);
    assert!(approx(num(&m, "mask", "rotation"), 2.5));
    assert_eq!(num(&t.evaluate(1.0), "mask", "rotation"), 10.0);
}

#[test]
fn from_and_from_to_keyframes() {
    let spec = TimelineSpec::new()
        .with_default_easing(Easing::Linear)
        .with_initial(("card", "y"), 0.0)
        .with_phase(Phase::new("idle", 1.0))
        .with_phase(
            Phase::new("pop", 1.0)
                .with_keyframe(Keyframe::from(("card", "y"), 300.0))
                .with_keyframe(Keyframe::from_to(("track", "x"), 0.0, -160.0)),
        );
    let t = Timeline::build(&spec).unwrap();

    let before = t.evaluate(0.25);
    assert_eq!(num(&before, "card", "y"), 0.0);
    assert_eq!(num(&before, "track", "x"), 0.0);

    let start = t.evaluate(0.5);
    assert_eq!(num(&start, "card", "y"), 300.0);

    let end = t.evaluate(1.0);
    assert_eq!(num(&end, "card", "y"), 0.0);
    assert_eq!(num(&end, "track", "x"), -160.0);
}

#[test]
fn active_keyframe_wins_over_a_finished_later_declaration() {
    let mut spec = TimelineSpec::new()
        .with_default_easing(Easing::Linear)
        .with_initial(("a", "x"), 0.0)
        .with_phase(Phase::new("p1", 1.0));
    spec.add_at("p1+=0.5", Keyframe::to(("a", "x"), 100.0).with_duration(0.25))
        .unwrap();
    spec.add_at("p1+=0.1", Keyframe::to(("a", "x"), 50.0).with_duration(0.1))
        .unwrap();
    let t = Timeline::build(&spec).unwrap();
    let key = PropertyKey::new("a", "x");
    let x = |p: f32| t.value_at(&key, p).and_then(|v| v.as_number()).unwrap();

    assert!(approx(x(0.15), 25.0));
    assert_eq!(x(0.3), 50.0);
    // The tween placed later in time starts from what the earlier one left behind.
    assert_eq!(x(0.5), 50.0);
    assert_eq!(x(0.625), 75.0);
    assert_eq!(x(0.75), 100.0);
    assert_eq!(x(1.0), 100.0);
}

#[test]
fn immediate_render_shows_the_from_state_before_the_window() {
    let spec = TimelineSpec::new()
        .with_default_easing(Easing::Linear)
        .with_initial(("card", "x"), 0.0)
        .with_initial(("card", "y"), 0.0)
        .with_phase(Phase::new("idle", 1.0).with_keyframe(Keyframe::to(("card", "x"), 10.0)))
        .with_phase(
            Phase::new("pop", 1.0)
                .with_keyframe(Keyframe::from(("card", "y"), 300.0).with_immediate_render(true))
                .with_keyframe(Keyframe::from(("card", "x"), -50.0).with_immediate_render(true)),
        );
    let t = Timeline::build(&spec).unwrap();

    for p in [0.0f32, 0.25, 0.4999, 0.5] {
        assert_eq!(num(&t.evaluate(p), "card", "y"), 300.0);
    }
    assert!(approx(num(&t.evaluate(0.75), "card", "y"), 150.0));
    assert_eq!(num(&t.evaluate(1.0), "card", "y"), 0.0);

    // x is already animating, so the waiting from-state doesn't cover it.
    assert!(approx(num(&t.evaluate(0.25), "card", "x"), 5.0));
    assert_eq!(num(&t.evaluate(0.5), "card", "x"), -50.0);
    assert_eq!(num(&t.evaluate(1.0), "card", "x"), 10.0);
}

#[test]
fn zero_length_keyframe_sets_value_at_its_start() {
    let spec = TimelineSpec::new()
        .with_initial(("work", "pointer_events"), 0.0)
        .with_phase(Phase::new("a", 1.0))
        .with_phase(
            Phase::new("b", 1.0).with_keyframe(
                Keyframe::to(("work", "pointer_events"), 1.0)
                    .with_offset(0.5)
                    .with_duration(0.0),
            ),
        );
    let t = Timeline::build(&spec).unwrap();
    assert_eq!(num(&t.evaluate(0.74), "work", "pointer_events"), 0.0);
    assert_eq!(num(&t.evaluate(0.75), "work", "pointer_events"), 1.0);
}

#[test]
fn computed_keyframe_with_snap_counts_in_integers() {
    let spec = TimelineSpec::new()
        .with_default_easing(Easing::Linear)
        .with_phase(
            Phase::new("count", 1.0).with_keyframe(
                Keyframe::computed(("stat", "text"), |t| Value::Number(t * 500.0)).with_snap(1.0),
            ),
        );
    let t = Timeline::build(&spec).unwrap();
    assert_eq!(num(&t.evaluate(0.0), "stat", "text"), 0.0);
    assert_eq!(num(&t.evaluate(0.5011), "stat", "text"), 251.0);
    assert_eq!(num(&t.evaluate(1.0), "stat", "text"), 500.0);
}

#[test]
fn colors_interpolate_component_wise() {
    let spec = TimelineSpec::new()
        .with_default_easing(Easing::Linear)
        .with_initial(("bg", "color"), Value::hex("#000000").unwrap())
        .with_phase(
            Phase::new("a", 1.0).with_keyframe(Keyframe::to(("bg", "color"), Value::hex("#ffffff").unwrap())),
        );
    let t = Timeline::build(&spec).unwrap();
    let c = t
        .value_at(&("bg", "color").into(), 0.5)
        .and_then(|v| v.as_color())
        .unwrap();
    assert!(approx(c.r, 0.5) && approx(c.g, 0.5) && approx(c.b, 0.5));
    assert_eq!(c.a, 1.0);
}

#[test]
fn rgba_parses_hex_forms() {
    assert_eq!(Rgba::from_hex("#fff"), Some(Rgba::rgb(1.0, 1.0, 1.0)));
    let c = Rgba::from_hex("#172554").unwrap();
    assert!(approx(c.r, 23.0 / 255.0));
    assert!(approx(c.b, 84.0 / 255.0));
    assert_eq!(Rgba::from_hex("#00000080").map(|c| c.a), Some(128.0 / 255.0));
    assert_eq!(Rgba::from_hex("#12"), None);
    assert_eq!(Rgba::from_hex("#gggggg"), None);
}

#[test]
fn mismatched_value_kinds_switch_at_the_end() {
    let a = Value::Number(1.0);
    let b = Value::Color(Rgba::BLACK);
    assert_eq!(a.lerp(&b, 0.99), a);
    assert_eq!(a.lerp(&b, 1.0), b);
}

#[test]
fn configuration_errors_are_reported_at_build() {
    assert_eq!(
        Timeline::build(&TimelineSpec::new()).unwrap_err(),
        ConfigError::NoPhases
    );

    let zero = TimelineSpec::new().with_phase(Phase::new("a", 0.0));
    assert!(matches!(
        Timeline::build(&zero),
        Err(ConfigError::InvalidWeight { .. })
    ));

    let negative = TimelineSpec::new().with_phase(Phase::new("a", -1.0));
    assert!(matches!(
        Timeline::build(&negative),
        Err(ConfigError::InvalidWeight { .. })
    ));

    let missing = TimelineSpec::new()
        .with_phase(Phase::new("a", 1.0).with_keyframe(Keyframe::to(("mask", "x"), 1.0)));
    assert_eq!(
        Timeline::build(&missing).unwrap_err(),
        ConfigError::MissingInitialValue(PropertyKey::new("mask", "x"))
    );

    let bad_offset = TimelineSpec::new()
        .with_initial(("mask", "x"), 0.0)
        .with_phase(Phase::new("a", 1.0).with_keyframe(Keyframe::to(("mask", "x"), 1.0).with_offset(2.0)));
    assert!(matches!(
        Timeline::build(&bad_offset),
        Err(ConfigError::InvalidOffset { .. })
    ));

    let bad_duration = TimelineSpec::new()
        .with_initial(("mask", "x"), 0.0)
        .with_phase(
            Phase::new("a", 1.0).with_keyframe(Keyframe::to(("mask", "x"), 1.0).with_duration(-1.0)),
        );
    assert!(matches!(
        Timeline::build(&bad_duration),
        Err(ConfigError::InvalidDuration { .. })
    ));
}

#[test]
fn keyframes_past_the_end_are_clamped_to_progress_one() {
    let spec = TimelineSpec::new()
        .with_default_easing(Easing::Linear)
        .with_initial(("a", "x"), 0.0)
        .with_phase(Phase::new("only", 1.0).with_keyframe(Keyframe::to(("a", "x"), 10.0).with_duration(5.0)));
    let t = Timeline::build(&spec).unwrap();
    assert_eq!(num(&t.evaluate(1.0), "a", "x"), 10.0);
    assert!(approx(num(&t.evaluate(0.5), "a", "x"), 5.0));
}

#[test]
fn labels_resolve_to_phase_and_offset() {
    assert_eq!(parse_label("phase2+=0.5").unwrap(), ("phase2", 0.5));
    assert_eq!(parse_label(" phase4 -= 0.25").unwrap(), ("phase4", -0.25));
    assert_eq!(parse_label("phase1").unwrap(), ("phase1", 0.0));
    assert!(matches!(
        parse_label("+=1"),
        Err(ConfigError::MalformedLabel(_))
    ));
    assert!(matches!(
        parse_label("phase1+=abc"),
        Err(ConfigError::MalformedLabel(_))
    ));

    let mut spec = TimelineSpec::new()
        .with_initial(("a", "x"), 0.0)
        .with_phase(Phase::new("phase1", 1.0))
        .with_phase(Phase::new("phase2", 2.0));

    let anchor = spec.add_at("phase2+=0.5", Keyframe::to(("a", "x"), 1.0)).unwrap();
    assert_eq!(anchor.phase, PhaseId(1));
    assert_eq!(anchor.offset, 0.5);

    let anchor = spec.add_at("phase2-=0.25", Keyframe::to(("a", "x"), 2.0)).unwrap();
    assert_eq!(anchor.phase, PhaseId(0));
    assert_eq!(anchor.offset, 0.75);
    assert_eq!(spec.phases[0].keyframes.len(), 1);

    assert_eq!(
        spec.add_at("phase9", Keyframe::to(("a", "x"), 1.0)).unwrap_err(),
        ConfigError::UnknownPhase("phase9".into())
    );
    assert!(matches!(
        spec.add_at("phase1-=3", Keyframe::to(("a", "x"), 1.0)),
        Err(ConfigError::InvalidOffset { .. })
    ));
}

#[test]
fn stagger_offsets_each_target() {
    let kfs = Keyframe::from(("", "opacity"), 0.0)
        .with_name("step")
        .with_offset(1.0)
        .stagger(["step-a", "step-b", "step-c"], 0.5);
    assert_eq!(kfs.len(), 3);
    assert_eq!(kfs[2].target, PropertyKey::new("step-c", "opacity"));
    assert_eq!(kfs[2].offset, 2.0);
    assert_eq!(kfs[1].name.as_deref(), Some("step#1"));
}

#[test]
fn scrub_lags_behind_raw_progress() {
    let mut scrub = Scrub::new(2.0);
    assert_eq!(scrub.update(1.0), 0.5);
    assert_eq!(scrub.update(1.0), 0.75);
    for _ in 0..64 {
        scrub.update(1.0);
    }
    assert_eq!(scrub.value(), 1.0);
    assert!(scrub.is_settled(1.0));

    let mut instant = Scrub::new(1.0);
    assert_eq!(instant.update(0.4), 0.4);
    assert_eq!(instant.update(3.0), 1.0);
}

#[test]
fn easing_endpoints_are_exact() {
    let curves = [
        Easing::Linear,
        Easing::SmoothStep,
        Easing::EaseInOutCubic,
        Easing::PowerIn(3),
        Easing::PowerOut(2),
        Easing::PowerInOut(4),
        Easing::SineInOut,
        Easing::ExpoOut,
        Easing::BackOut { overshoot: 1.2 },
        Easing::ElasticOut {
            amplitude: 1.0,
            period: 0.3,
        },
    ];
    for e in curves {
        assert_eq!(e.sample(0.0), 0.0, "{e:?}");
        assert_eq!(e.sample(1.0), 1.0, "{e:?}");
        assert_eq!(e.sample(-1.0), 0.0, "{e:?}");
        assert_eq!(e.sample(2.0), 1.0, "{e:?}");
    }
    assert!(approx(Easing::PowerOut(1).sample(0.5), 0.75));
    assert!(approx(
        Easing::PowerInOut(2).sample(0.25),
        Easing::EaseInOutCubic.sample(0.25)
    ));
    assert!(Easing::BackOut { overshoot: 1.70158 }.sample(0.8) > 1.0);
    assert!(
        Easing::ElasticOut {
            amplitude: 1.0,
            period: 0.3
        }
        .sample(0.1)
            > 1.0
    );
}

#[test]
fn easing_parses_gsap_names() {
    assert_eq!("none".parse::<Easing>().unwrap(), Easing::Linear);
    assert_eq!("power2.inOut".parse::<Easing>().unwrap(), Easing::PowerInOut(2));
    assert_eq!("power3.out".parse::<Easing>().unwrap(), Easing::PowerOut(3));
    assert_eq!("power1".parse::<Easing>().unwrap(), Easing::PowerOut(1));
    assert_eq!("sine.inOut".parse::<Easing>().unwrap(), Easing::SineInOut);
    assert_eq!(
        "back.out(1.2)".parse::<Easing>().unwrap(),
        Easing::BackOut { overshoot: 1.2 }
    );
    assert_eq!(
        "elastic.out(1, 0.3)".parse::<Easing>().unwrap(),
        Easing::ElasticOut {
            amplitude: 1.0,
            period: 0.3
        }
    );
    assert!("bounce.out".parse::<Easing>().is_err());
    assert!("back.out(1.2".parse::<Easing>().is_err());
}

#[test]
fn tween_samples_between_endpoints() {
    let tw = Tween::new(0.0f32, 100.0, 1000, 200, Easing::Linear);
    assert_eq!(tw.sample(900), 0.0);
    assert_eq!(tw.sample(1100), 50.0);
    assert_eq!(tw.sample(5000), 100.0);
    assert!(tw.is_done(1200));

    let mut tw = Tween::new((0.0f32, 0.0f32), (10.0, -10.0), 0, 100, Easing::Linear);
    tw.retarget(50, (0.0, 0.0), 100, Easing::Linear);
    assert_eq!(tw.from, (5.0, -5.0));
    assert_eq!(tw.sample(150), (0.0, 0.0));
}

#[test]
fn inertial_filter_converges_without_overshoot() {
    let mut s = InertialScroll::new(InertialOptions::new().with_responsiveness(0.2));
    s.apply(ScrollInput::Wheel { delta: 100.0 });
    assert_eq!(s.raw_offset(), 100.0);

    let first = s.update();
    assert!(approx(first, 20.0));
    assert!(approx(s.velocity(), 20.0));

    let mut last = first;
    for _ in 0..200 {
        let next = s.update();
        assert!(next >= last && next <= 100.0);
        last = next;
    }
    assert_eq!(s.smoothed_offset(), 100.0);
    assert_eq!(s.velocity(), 0.0);
    assert!(s.is_settled());
}

#[test]
fn inertial_velocity_is_clamped() {
    let mut s = InertialScroll::new(
        InertialOptions::new()
            .with_responsiveness(0.5)
            .with_max_velocity(30.0),
    );
    s.apply(ScrollInput::Touch { delta: 10_000.0 });
    assert_eq!(s.update(), 30.0);
    assert_eq!(s.velocity(), 30.0);

    s.apply(ScrollInput::Native { offset: 0.0 });
    s.apply(ScrollInput::Wheel { delta: 5_000.0 });
    s.apply(ScrollInput::Wheel { delta: -10_000.0 });
    assert_eq!(s.raw_offset(), 0.0);
}

#[test]
fn inertial_native_mode_follows_raw_offset() {
    let mut s = InertialScroll::new(InertialOptions::new().with_mode(InputMode::Native));
    s.apply(ScrollInput::Native { offset: 1234.0 });
    assert_eq!(s.update(), 1234.0);
    s.apply(ScrollInput::Wheel { delta: 16.0 });
    assert_eq!(s.update(), 1250.0);
}

#[test]
fn inertial_native_scroll_resyncs_delta_mode() {
    let mut s = InertialScroll::new(InertialOptions::new());
    s.apply(ScrollInput::Wheel { delta: 500.0 });
    s.update();
    s.apply(ScrollInput::Native { offset: 2000.0 });
    assert_eq!(s.smoothed_offset(), 2000.0);
    assert_eq!(s.velocity(), 0.0);
}

#[test]
fn inertial_respects_scroll_limit() {
    let mut s = InertialScroll::new(InertialOptions::new());
    s.set_limit(300.0);
    s.apply(ScrollInput::Wheel { delta: 1000.0 });
    assert_eq!(s.raw_offset(), 300.0);
    s.jump_to(-5.0);
    assert_eq!(s.smoothed_offset(), 0.0);
}

#[test]
fn pin_progress_is_linear_over_the_pinned_range() {
    let pin = PinController::new(1000.0, 4000.0);
    assert_eq!(pin.progress_at(3000.0), 0.5);
    assert_eq!(pin.progress_at(1000.0), 0.0);
    assert_eq!(pin.progress_at(500.0), 0.0);
    assert_eq!(pin.progress_at(5000.0), 1.0);
    assert_eq!(pin.progress_at(9000.0), 1.0);
    assert_eq!(pin.offset_for_progress(0.25), 2000.0);
    assert_eq!(pin.spacing(), 4000.0);
    assert_eq!(pin.document_length(2000.0), 6000.0);
}

#[test]
fn pin_state_machine_forward_and_backward() {
    use ScrollDirection::{Backward, Forward};

    let mut pin = PinController::new(1000.0, 4000.0);
    assert_eq!(pin.update(0.0).state, PinState::Unpinned(PinSide::Before));
    assert_eq!(pin.update(1000.0).state, PinState::Entering(Forward));
    let frame = pin.update(2000.0);
    assert_eq!(frame.state, PinState::Pinned);
    assert_eq!(frame.pin_offset, 1000.0);
    assert_eq!(pin.update(5000.0).state, PinState::Exiting(Forward));
    assert_eq!(pin.resume_offset(Forward), 5000.0);
    let past = pin.update(6000.0);
    assert_eq!(past.state, PinState::Unpinned(PinSide::Past));
    assert_eq!(past.raw_progress, 1.0);
    assert_eq!(past.pin_offset, 4000.0);

    assert_eq!(pin.update(4000.0).state, PinState::Entering(Backward));
    assert_eq!(pin.update(3000.0).state, PinState::Pinned);
    assert_eq!(pin.update(999.0).state, PinState::Exiting(Backward));
    assert_eq!(pin.resume_offset(Backward), 1000.0);
    assert_eq!(pin.update(10.0).state, PinState::Unpinned(PinSide::Before));
}

#[test]
fn pin_jump_across_the_range_exits_directly() {
    let mut pin = PinController::new(100.0, 200.0);
    let f = pin.update(1000.0);
    assert_eq!(f.state, PinState::Exiting(ScrollDirection::Forward));
    assert_eq!(f.raw_progress, 1.0);
    assert_eq!(pin.update(1000.0).state, PinState::Unpinned(PinSide::Past));
    assert_eq!(
        pin.update(0.0).state,
        PinState::Exiting(ScrollDirection::Backward)
    );
}

#[test]
fn pin_release_and_geometry_changes() {
    let mut pin = PinController::new(100.0, 200.0);
    pin.update(150.0);
    pin.update(160.0);
    assert!(pin.state().is_pinned());
    pin.release();
    assert_eq!(pin.state(), PinState::Unpinned(PinSide::Past));

    pin.set_geometry(400.0, 200.0);
    assert_eq!(pin.update(160.0).state, PinState::Exiting(ScrollDirection::Backward));
    assert_eq!(pin.exit(), 600.0);
}

#[test]
fn degenerate_pin_distance_is_a_step() {
    let pin = PinController::new(100.0, 0.0);
    assert_eq!(pin.progress_at(99.0), 0.0);
    assert_eq!(pin.progress_at(100.0), 1.0);
}

#[test]
fn breakpoint_predicates_must_be_exclusive_and_exhaustive() {
    assert!(validate_predicates(&[WidthRange::below(768), WidthRange::at_least(768)]).is_ok());
    assert!(validate_predicates(&[WidthRange::at_least(768), WidthRange::below(768)]).is_ok());
    assert!(validate_predicates(&[WidthRange::ANY]).is_ok());

    assert_eq!(validate_predicates(&[]), Err(ConfigError::NoVariants));
    assert_eq!(
        validate_predicates(&[WidthRange::below(700), WidthRange::at_least(768)]),
        Err(ConfigError::BreakpointGap { from: 700 })
    );
    assert_eq!(
        validate_predicates(&[WidthRange::below(800), WidthRange::at_least(768)]),
        Err(ConfigError::OverlappingBreakpoints {
            first: 0,
            second: 1
        })
    );
    assert_eq!(
        validate_predicates(&[WidthRange::below(768)]),
        Err(ConfigError::BreakpointGap { from: 768 })
    );
    assert_eq!(
        validate_predicates(&[WidthRange::ANY, WidthRange::at_least(10)]),
        Err(ConfigError::OverlappingBreakpoints {
            first: 0,
            second: 1
        })
    );
    assert_eq!(
        validate_predicates(&[WidthRange::new(10, Some(10)), WidthRange::ANY]),
        Err(ConfigError::EmptyBreakpoint(0))
    );
}

#[test]
fn resolver_reports_changes_only() {
    let mut r =
        BreakpointResolver::new(std::vec![WidthRange::at_least(768), WidthRange::below(768)])
            .unwrap();
    assert_eq!(r.resolve(767), 1);
    assert_eq!(r.resolve(768), 0);

    let first = r.update(1024).unwrap();
    assert_eq!(first.previous, None);
    assert_eq!(first.current, 0);
    assert!(r.update(900).is_none());
    let flip = r.update(500).unwrap();
    assert_eq!((flip.previous, flip.current), (Some(0), 1));
}

#[test]
fn breakpoint_listener_fires_and_unsubscribes() {
    let ctx = EngineContext::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut listener = register_breakpoint_listener(
        &ctx,
        std::vec![WidthRange::below(768), WidthRange::at_least(768)],
        {
            let seen = Rc::clone(&seen);
            move |change: &BreakpointChange| seen.borrow_mut().push(change.current)
        },
    )
    .unwrap();

    ctx.resize(Viewport::new(1280, 800, 0.0));
    ctx.resize(Viewport::new(1100, 800, 0.0));
    ctx.resize(Viewport::new(375, 800, 0.0));
    assert_eq!(*seen.borrow(), std::vec![1, 0]);
    assert_eq!(listener.active(), Some(0));

    listener.remove();
    assert!(!listener.is_registered());
    ctx.resize(Viewport::new(1280, 800, 0.0));
    assert_eq!(seen.borrow().len(), 2);
    assert!(ctx.viewport_listeners().is_empty());

    assert!(matches!(
        register_breakpoint_listener(&ctx, std::vec![WidthRange::below(5)], |_: &BreakpointChange| {}),
        Err(ConfigError::BreakpointGap { .. })
    ));
}

#[test]
fn registry_tolerates_unsubscribe_during_dispatch() {
    let reg = Registry::<u32>::new();
    let hits = Rc::new(Cell::new(0u32));
    let second: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));

    reg.subscribe({
        let reg = reg.clone();
        let second = Rc::clone(&second);
        let hits = Rc::clone(&hits);
        move |_| {
            hits.set(hits.get() + 1);
            if let Some(id) = second.get() {
                reg.unsubscribe(id);
            }
        }
    });
    let id = reg.subscribe({
        let hits = Rc::clone(&hits);
        move |_| hits.set(hits.get() + 100)
    });
    second.set(Some(id));

    reg.emit(&1);
    assert_eq!(hits.get(), 1);
    assert_eq!(reg.len(), 1);
    assert!(!reg.contains(id));
    assert!(!reg.unsubscribe(id));
}

#[test]
fn registry_debug_reports_subscriber_count() {
    fn render<E>(registry: &Registry<E>) -> std::string::String {
        std::format!("{registry:?}")
    }
    let registry: Registry<u32> = Registry::new();
    let _id = registry.subscribe(|_| {});
    assert!(render(&registry).contains("len: 1"));
}

#[test]
fn ticker_applies_lag_smoothing() {
    let ctx = EngineContext::new();
    let deltas = Rc::new(RefCell::new(Vec::new()));
    ctx.add_ticker({
        let deltas = Rc::clone(&deltas);
        move |f: &Frame| deltas.borrow_mut().push((f.index, f.delta_ms))
    });

    ctx.tick(1000);
    ctx.tick(1016);
    ctx.tick(5000);
    ctx.tick(5017);
    assert_eq!(
        *deltas.borrow(),
        std::vec![(0, 0), (1, 16), (2, 16), (3, 17)]
    );

    let frame = ctx.tick(5033);
    assert_eq!(frame.time_ms, 16 + 16 + 17 + 16);

    ctx.set_lag_smoothing(LagSmoothing::DISABLED);
    assert_eq!(ctx.tick(9033).delta_ms, 4000);
}

fn native_options(spec: TimelineSpec, distance: f32) -> ScrollTimelineOptions {
    ScrollTimelineOptions::new(spec, distance)
        .with_inertial(InertialOptions::new().with_mode(InputMode::Native))
}

#[test]
fn engine_pin_contract_drives_progress_linearly() {
    let ctx = EngineContext::new();
    let handle =
        TimelineHandle::build(&ctx, native_options(three_phase_spec(), 4000.0), trigger_at(1000.0))
            .unwrap();

    let frames = Rc::new(RefCell::new(Vec::new()));
    handle.on_frame({
        let frames = Rc::clone(&frames);
        move |out: &FrameOutput| frames.borrow_mut().push((out.progress, out.pin.state))
    });

    let mut now = 0u64;
    for offset in [0.0f32, 1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0, 9000.0] {
        ctx.scroll(ScrollInput::Native { offset });
        now += 16;
        ctx.tick(now);
        let expected = ((offset - 1000.0) / 4000.0).clamp(0.0, 1.0);
        assert!(approx(handle.progress(), expected), "offset={offset}");
    }

    let frames = frames.borrow();
    assert_eq!(frames.len(), 8);
    assert_eq!(frames[1].1, PinState::Entering(ScrollDirection::Forward));
    assert_eq!(frames[2].1, PinState::Pinned);
    assert_eq!(frames[5].1, PinState::Exiting(ScrollDirection::Forward));
    assert_eq!(frames[7].1, PinState::Unpinned(PinSide::Past));
    assert_eq!(frames[7].0, 1.0);

    let state = handle.scroll_state();
    assert_eq!(state.pin_entry, 1000.0);
    assert_eq!(state.pin_exit, 5000.0);
    assert!(!state.pinned);
    assert_eq!(handle.pin_spacing(), 4000.0);
}

#[test]
fn engine_scrub_lags_then_catches_up() {
    let ctx = EngineContext::new();
    let handle = TimelineHandle::build(
        &ctx,
        native_options(three_phase_spec(), 4000.0).with_scrub(2.0),
        trigger_at(0.0),
    )
    .unwrap();

    ctx.scroll(ScrollInput::Native { offset: 2000.0 });
    ctx.tick(16);
    assert_eq!(handle.progress(), 0.25);
    ctx.tick(32);
    assert_eq!(handle.progress(), 0.375);
    for i in 0..64 {
        ctx.tick(48 + i * 16);
    }
    assert_eq!(handle.progress(), 0.5);
}

#[test]
fn engine_smoothed_offset_is_emitted_once_per_tick_before_the_frame() {
    let ctx = EngineContext::new();
    let handle =
        TimelineHandle::build(&ctx, ScrollTimelineOptions::new(three_phase_spec(), 4000.0), trigger_at(0.0))
            .unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    handle.on_scroll({
        let log = Rc::clone(&log);
        move |s: &ScrollState| log.borrow_mut().push(std::format!("scroll {}", s.smoothed_offset))
    });
    handle.on_frame({
        let log = Rc::clone(&log);
        move |_: &FrameOutput| log.borrow_mut().push("frame".into())
    });

    ctx.scroll(ScrollInput::Wheel { delta: 100.0 });
    ctx.tick(16);
    ctx.tick(32);
    assert_eq!(
        *log.borrow(),
        std::vec!["scroll 10", "frame", "scroll 19", "frame"]
    );
}

#[test]
fn engine_on_tick_evaluates_and_records_values() {
    let ctx = EngineContext::new();
    let handle = build_timeline(&ctx, three_phase_spec(), 4000.0, trigger_at(0.0), Vec::new()).unwrap();

    let at_start = handle.applied();
    assert_eq!(num(&at_start, "mask", "scale"), 1.0);

    let half = handle.on_tick(0.5);
    assert!(approx(num(&half, "mask", "x"), -12.5));
    assert_eq!(handle.applied(), half);
    assert_eq!(handle.evaluate(1.0).unwrap(), handle.timeline().unwrap().evaluate(1.0));
    assert_eq!(handle.applied(), half);
    assert_eq!(handle.variant_name(), "default");
}

fn variant_spec() -> TimelineSpec {
    TimelineSpec::new()
        .with_default_easing(Easing::Linear)
        .with_initial(("mask", "width"), 100.0)
        .with_initial(("mask", "rotation"), 0.0)
        .with_phase(
            Phase::new("hero", 1.0)
                .with_keyframe(Keyframe::to(("mask", "width"), 30.0).with_name("mask-width")),
        )
        .with_phase(Phase::new("spin", 1.0).with_keyframe(Keyframe::to(("mask", "rotation"), 180.0)))
}

fn desktop_mobile() -> Vec<BreakpointVariant> {
    std::vec![
        BreakpointVariant::new("desktop", WidthRange::at_least(768)).with_total_distance(4000.0),
        BreakpointVariant::new("mobile", WidthRange::below(768))
            .with_total_distance(6000.0)
            .with_keyframe_value("mask-width", 85.0),
    ]
}

#[test]
fn breakpoint_switch_preserves_progress_fraction() {
    let ctx = EngineContext::new();
    let handle = TimelineHandle::build(
        &ctx,
        native_options(variant_spec(), 4000.0)
            .with_variants(desktop_mobile())
            .with_initial_viewport(Some(Viewport::new(1280, 800, 0.0))),
        trigger_at(0.0),
    )
    .unwrap();
    assert_eq!(handle.variant_name(), "desktop");

    ctx.scroll(ScrollInput::Native { offset: 2000.0 });
    ctx.tick(16);
    assert_eq!(handle.progress(), 0.5);
    let before = handle.applied();
    assert_eq!(num(&before, "mask", "rotation"), 0.0);

    let restores = Rc::new(RefCell::new(Vec::new()));
    handle.on_frame({
        let restores = Rc::clone(&restores);
        move |out: &FrameOutput| restores.borrow_mut().push((out.scroll_restore, out.progress))
    });

    ctx.resize(Viewport::new(375, 800, 0.0));
    assert_eq!(handle.active_variant(), 1);
    assert_eq!(handle.progress(), 0.5);
    // Untouched by overrides, so identical across the switch.
    assert_eq!(
        num(&handle.applied(), "mask", "rotation"),
        num(&before, "mask", "rotation")
    );
    assert_eq!(num(&handle.applied(), "mask", "width"), 85.0);

    ctx.tick(32);
    assert_eq!(*restores.borrow(), std::vec![(Some(3000.0), 0.5)]);
    assert_eq!(handle.scroll_state().raw_offset, 3000.0);
    assert_eq!(handle.scroll_state().pin_exit, 6000.0);
    assert!(handle.take_scroll_restore().is_none());

    // Same-variant resizes don't rebuild.
    ctx.resize(Viewport::new(400, 900, 0.0));
    assert_eq!(handle.active_variant(), 1);
    ctx.tick(48);
    assert_eq!(handle.progress(), 0.5);
}

#[test]
fn both_variants_sample_cleanly_across_progress() {
    let ctx = EngineContext::new();
    for width in [1280u32, 375] {
        let handle = TimelineHandle::build(
            &ctx,
            ScrollTimelineOptions::new(variant_spec(), 4000.0)
                .with_variants(desktop_mobile())
                .with_initial_viewport(Some(Viewport::new(width, 800, 0.0))),
            trigger_at(0.0),
        )
        .unwrap();
        for p in [0.0f32, 0.25, 0.5, 0.75, 1.0] {
            let m = handle.on_tick(p);
            assert_eq!(m.len(), 2);
            assert!(m.values().all(|v| v.as_number().is_some_and(f32::is_finite)));
        }
    }
}

#[test]
fn switch_before_the_pin_keeps_the_raw_offset() {
    let ctx = EngineContext::new();
    let handle = TimelineHandle::build(
        &ctx,
        native_options(variant_spec(), 4000.0)
            .with_variants(desktop_mobile())
            .with_initial_viewport(Some(Viewport::new(1280, 800, 2000.0))),
        trigger_at(1500.0),
    )
    .unwrap();
    ctx.scroll(ScrollInput::Native { offset: 700.0 });
    ctx.tick(16);
    ctx.resize(Viewport::new(375, 800, 2000.0));
    assert_eq!(handle.take_scroll_restore(), Some(700.0));
    assert_eq!(handle.progress(), 0.0);
}

#[test]
fn switch_mid_flick_restores_from_the_smoothed_offset() {
    let ctx = EngineContext::new();
    let handle = TimelineHandle::build(
        &ctx,
        ScrollTimelineOptions::new(variant_spec(), 4000.0)
            .with_inertial(
                InertialOptions::new()
                    .with_responsiveness(0.5)
                    .with_max_velocity(0.0),
            )
            .with_variants(desktop_mobile())
            .with_initial_viewport(Some(Viewport::new(1280, 800, 2000.0))),
        trigger_at(1000.0),
    )
    .unwrap();

    ctx.scroll(ScrollInput::Native { offset: 3000.0 });
    ctx.scroll(ScrollInput::Wheel { delta: -2500.0 });
    ctx.tick(16);
    // The target is already back before the pin; the smoothed offset is still inside it.
    assert_eq!(handle.scroll_state().raw_offset, 500.0);
    assert_eq!(handle.scroll_state().smoothed_offset, 1750.0);
    assert_eq!(handle.pin_frame().raw_progress, 0.1875);

    ctx.resize(Viewport::new(375, 800, 2000.0));
    assert_eq!(handle.progress(), 0.1875);
    assert_eq!(handle.take_scroll_restore(), Some(1000.0 + 0.1875 * 6000.0));
    assert_eq!(handle.scroll_state().smoothed_offset, 2125.0);
}

#[test]
fn engine_build_rejects_bad_configuration() {
    let ctx = EngineContext::new();

    let overlapping = std::vec![
        BreakpointVariant::new("a", WidthRange::at_least(0)),
        BreakpointVariant::new("b", WidthRange::below(768)),
    ];
    assert!(matches!(
        build_timeline(&ctx, variant_spec(), 4000.0, trigger_at(0.0), overlapping),
        Err(ConfigError::OverlappingBreakpoints { .. })
    ));

    let unknown = std::vec![
        BreakpointVariant::new("only", WidthRange::ANY).with_keyframe_value("nope", 1.0),
    ];
    assert_eq!(
        build_timeline(&ctx, variant_spec(), 4000.0, trigger_at(0.0), unknown).unwrap_err(),
        ConfigError::UnknownKeyframe("nope".into())
    );

    assert_eq!(
        build_timeline(&ctx, variant_spec(), 0.0, trigger_at(0.0), Vec::new()).unwrap_err(),
        ConfigError::InvalidDistance(0.0)
    );

    // Nothing was left subscribed by the failed builds.
    assert!(ctx.ticker().is_empty());
    assert!(ctx.viewport_listeners().is_empty());
}

#[test]
fn destroy_is_idempotent_and_silences_callbacks() {
    let ctx = EngineContext::new();
    let mut handle =
        TimelineHandle::build(&ctx, native_options(three_phase_spec(), 4000.0), trigger_at(0.0))
            .unwrap();
    let fired = Rc::new(Cell::new(0u32));
    handle.on_frame({
        let fired = Rc::clone(&fired);
        move |_: &FrameOutput| fired.set(fired.get() + 1)
    });

    ctx.tick(16);
    assert_eq!(fired.get(), 1);
    assert_eq!(ctx.ticker().len(), 1);

    handle.destroy();
    handle.destroy();
    assert!(handle.is_destroyed());
    assert!(ctx.ticker().is_empty());
    assert!(ctx.viewport_listeners().is_empty());
    assert!(ctx.scroll_listeners().is_empty());

    ctx.scroll(ScrollInput::Native { offset: 3000.0 });
    ctx.tick(32);
    ctx.resize(Viewport::new(500, 800, 0.0));
    assert_eq!(fired.get(), 1);
    assert!(handle.on_tick(0.5).is_empty());
    assert!(handle.evaluate(0.5).is_none());
    assert!(!handle.pin_state().is_pinned());
}

#[test]
fn dropping_the_handle_tears_down() {
    let ctx = EngineContext::new();
    {
        let _handle =
            TimelineHandle::build(&ctx, native_options(three_phase_spec(), 4000.0), trigger_at(0.0))
                .unwrap();
        assert_eq!(ctx.ticker().len(), 1);
    }
    assert!(ctx.ticker().is_empty());
    ctx.tick(16);
}

#[test]
fn unmounted_pin_target_keeps_previous_thresholds() {
    let ctx = EngineContext::new();
    let mounted = Rc::new(Cell::new(true));
    let target = {
        let mounted = Rc::clone(&mounted);
        move || mounted.get().then(|| Bounds::new(0.0, 1000.0, 100.0, 100.0))
    };
    let handle =
        TimelineHandle::build(&ctx, native_options(three_phase_spec(), 4000.0), target).unwrap();
    assert_eq!(handle.scroll_state().pin_entry, 1000.0);

    mounted.set(false);
    ctx.resize(Viewport::new(1280, 800, 3000.0));
    assert_eq!(handle.scroll_state().pin_entry, 1000.0);
    ctx.scroll(ScrollInput::Native { offset: 3000.0 });
    ctx.tick(16);
    assert_eq!(handle.progress(), 0.5);
}
