//! A ready-made seven-phase portfolio scene.
//!
//! A hero image, reduced to a floating mask, travels past a dashboard, an about panel, a process
//! list, a playground, testimonials and finally a horizontally scrolling project track.
//!
//! Property conventions the host renders:
//! - `auto_alpha` is opacity, with the element hidden (`visibility: hidden`) at 0;
//! - a `_vw`/`_vh`/`_pct` suffix gives the unit, bare lengths are pixels;
//! - lengths split over several units add up (`height = height_vh + height_vw`), so mixed-unit
//!   tweens interpolate the way CSS `calc()` does;
//! - `pointer_events` is 0 (`none`) or 1 (`all`).

use alloc::vec::Vec;

use scrollpin::{
    BreakpointVariant, ConfigError, Easing, Keyframe, KeyframeValue, ScrollTimelineOptions,
    TimelineSpec, Tween, Value, WidthRange,
};

use crate::{FloatOptions, LoopTween, StatSlot, TweenGroup, counter_keyframe, float_group};

/// Tween length when none is given, in virtual-scroll units.
const DEFAULT_DURATION: f32 = 0.5;

pub const DESKTOP_DISTANCE: f32 = 18000.0;
pub const MOBILE_DISTANCE: f32 = 15000.0;
pub const MOBILE_BREAKPOINT: u32 = 768;
pub const SCRUB: f32 = 2.0;
/// Blurred background orbs behind the hero.
pub const ORB_COUNT: usize = 2;

/// Phase names and weights. Each weight is the span its tweens occupy, staggers included.
pub const PHASES: [(&str, f32); 7] = [
    ("hero", 0.5),
    ("dashboard", 2.5),
    ("about", 0.8),
    ("process", 3.0),
    ("playground", 1.0),
    ("testimonials", 2.7),
    ("work", 6.5),
];

const MASK: &str = "mask";
const BG: &str = "bg";
const PROCESS_STEPS: [&str; 4] = [
    "process-step-1",
    "process-step-2",
    "process-step-3",
    "process-step-4",
];
const TESTIMONIAL_CARDS: [&str; 2] = ["testimonial-card-1", "testimonial-card-2"];
const PROJECT_CARDS: [&str; 4] = [
    "project-card-1",
    "project-card-2",
    "project-card-3",
    "project-card-4",
];

fn hex(s: &str) -> Value {
    Value::hex(s).unwrap_or(Value::Number(0.0))
}

fn to(target: &str, props: &[(&str, f32)]) -> Vec<Keyframe> {
    props
        .iter()
        .map(|&(property, value)| {
            Keyframe::to((target, property), value).with_duration(DEFAULT_DURATION)
        })
        .collect()
}

/// `from` tweens show their from-state right away, before their window opens.
fn from(target: &str, props: &[(&str, f32)]) -> Vec<Keyframe> {
    props
        .iter()
        .map(|&(property, value)| {
            Keyframe::from((target, property), value)
                .with_duration(DEFAULT_DURATION)
                .with_immediate_render(true)
        })
        .collect()
}

/// `from` over several targets, each delayed by `each`.
fn staggered_from(targets: &[&str], props: &[(&str, f32)], each: f32) -> Vec<Keyframe> {
    from("", props)
        .into_iter()
        .flat_map(|kf| kf.stagger(targets.iter().copied(), each))
        .collect()
}

fn named(mut kfs: Vec<Keyframe>, property: &str, name: &str) -> Vec<Keyframe> {
    for kf in &mut kfs {
        if kf.target.property == property {
            kf.name = Some(name.into());
        }
    }
    kfs
}

fn tuned(kfs: Vec<Keyframe>, duration: f32, easing: Option<Easing>) -> Vec<Keyframe> {
    kfs.into_iter()
        .map(|kf| {
            let kf = kf.with_duration(duration);
            match easing {
                Some(e) => kf.with_easing(e),
                None => kf,
            }
        })
        .collect()
}

fn put(
    spec: &mut TimelineSpec,
    label: &str,
    kfs: impl IntoIterator<Item = Keyframe>,
) -> Result<(), ConfigError> {
    for kf in kfs {
        spec.add_at(label, kf)?;
    }
    Ok(())
}

fn initial_values(mut spec: TimelineSpec) -> TimelineSpec {
    let set = |spec: TimelineSpec, target: &str, props: &[(&str, f32)]| {
        props
            .iter()
            .fold(spec, |spec, &(p, v)| spec.with_initial((target, p), v))
    };

    spec = set(
        spec,
        MASK,
        &[
            ("width_vw", 100.0),
            ("height_vh", 100.0),
            ("height_vw", 0.0),
            ("radius_pct", 0.0),
            ("scale", 1.0),
            ("x_vw", 0.0),
            ("y", 0.0),
            ("y_vh", 0.0),
            ("rotation", 0.0),
            ("border_alpha", 0.0),
            ("opacity", 1.0),
        ],
    );
    spec = spec.with_initial((BG, "color"), hex("#000000"));
    spec = set(spec, "image", &[("scale", 1.0), ("grayscale_pct", 0.0)]);
    spec = set(spec, "hero-title", &[("opacity", 1.0), ("y", 0.0)]);
    spec = set(spec, "dashboard-ui", &[("auto_alpha", 0.0), ("y", 80.0)]);
    spec = set(spec, "about-ui", &[("auto_alpha", 0.0), ("y", 80.0)]);
    spec = set(spec, "process-ui", &[("auto_alpha", 0.0), ("scale", 1.0)]);
    for step in PROCESS_STEPS {
        spec = set(spec, step, &[("opacity", 1.0), ("y", 0.0)]);
    }
    spec = set(spec, "playground-ui", &[("auto_alpha", 0.0), ("y", 0.0)]);
    spec = set(
        spec,
        "testimonials-ui",
        &[("auto_alpha", 0.0), ("x", 0.0), ("y", 0.0), ("scale", 1.0)],
    );
    for card in TESTIMONIAL_CARDS {
        spec = set(spec, card, &[("x_vw", 0.0)]);
    }
    spec = set(
        spec,
        "work-ui",
        &[("auto_alpha", 0.0), ("y", 0.0), ("pointer_events", 0.0)],
    );
    spec = set(
        spec,
        "work-title",
        &[("scale", 1.0), ("opacity", 1.0), ("blur", 0.0), ("y", 0.0)],
    );
    for card in PROJECT_CARDS {
        spec = set(
            spec,
            card,
            &[("y", 0.0), ("opacity", 1.0), ("rotation_x", 0.0), ("scale", 1.0)],
        );
    }
    set(spec, "work-track", &[("x_vw", 0.0)])
}

/// The portfolio timeline (desktop values) and its desktop/mobile variants.
///
/// `stat` feeds the dashboard's commit counter; the counter shows whatever the slot holds when
/// sampled, so the timeline never waits on the fetch.
pub fn portfolio(stat: &StatSlot) -> Result<(TimelineSpec, Vec<BreakpointVariant>), ConfigError> {
    let mut spec = PHASES
        .iter()
        .fold(TimelineSpec::new(), |spec, &(name, weight)| {
            spec.with_phase(scrollpin::Phase::new(name, weight))
        })
        .with_default_easing(Easing::PowerInOut(2));
    spec = initial_values(spec);

    // Hero shrinks into a floating mask.
    let mask = to(
        MASK,
        &[
            ("width_vw", 30.0),
            ("height_vh", 0.0),
            ("height_vw", 30.0),
            ("radius_pct", 50.0),
            ("scale", 0.5),
            ("y", 100.0),
            ("y_vh", 0.0),
            ("border_alpha", 0.2),
        ],
    );
    let mask = named(mask, "width_vw", "mask-width");
    let mask = named(mask, "height_vw", "mask-height");
    let mask = named(mask, "y", "mask-y-hero");
    let mask = named(mask, "y_vh", "mask-y-vh-hero");
    put(&mut spec, "hero", tuned(mask, DEFAULT_DURATION, Some(Easing::PowerInOut(3))))?;
    put(
        &mut spec,
        "hero",
        [Keyframe::to((BG, "color"), hex("#172554")).with_duration(DEFAULT_DURATION)],
    )?;
    put(&mut spec, "hero", to("image", &[("scale", 1.5), ("grayscale_pct", 100.0)]))?;
    put(&mut spec, "hero", to("hero-title", &[("opacity", 0.0), ("y", -100.0)]))?;

    // Dashboard.
    let mask = to(MASK, &[("x_vw", -25.0), ("y", 0.0), ("y_vh", 0.0), ("rotation", -10.0)]);
    let mask = named(mask, "x_vw", "mask-x-dashboard");
    let mask = named(mask, "y_vh", "mask-y-vh-dashboard");
    put(&mut spec, "dashboard", mask)?;
    put(
        &mut spec,
        "dashboard",
        tuned(to("dashboard-ui", &[("auto_alpha", 1.0), ("y", 0.0)]), 1.0, None),
    )?;
    put(
        &mut spec,
        "dashboard+=0.5",
        [counter_keyframe("stat-number", stat).with_duration(2.0)],
    )?;

    // About.
    let mask = to(
        MASK,
        &[("x_vw", 25.0), ("y", 0.0), ("y_vh", 0.0), ("rotation", 10.0), ("scale", 0.6)],
    );
    let mask = named(mask, "x_vw", "mask-x-about");
    let mask = named(mask, "y_vh", "mask-y-vh-about");
    put(&mut spec, "about", mask)?;
    put(
        &mut spec,
        "about",
        [Keyframe::to((BG, "color"), hex("#0f0f0f")).with_duration(DEFAULT_DURATION)],
    )?;
    let dashboard = to("dashboard-ui", &[("auto_alpha", 0.0), ("y", 50.0)]);
    put(&mut spec, "about", named(dashboard, "y", "dashboard-y-about"))?;
    put(&mut spec, "about+=0.3", to("about-ui", &[("auto_alpha", 1.0), ("y", 0.0)]))?;

    // Process.
    put(&mut spec, "process", to("about-ui", &[("auto_alpha", 0.0), ("y", -50.0)]))?;
    put(
        &mut spec,
        "process",
        to(
            MASK,
            &[
                ("scale", 0.4),
                ("x_vw", 0.0),
                ("y", -50.0),
                ("y_vh", 0.0),
                ("rotation", 180.0),
                ("radius_pct", 20.0),
            ],
        ),
    )?;
    put(
        &mut spec,
        "process",
        [Keyframe::to((BG, "color"), hex("#111")).with_duration(DEFAULT_DURATION)],
    )?;
    put(&mut spec, "process+=0.5", to("process-ui", &[("auto_alpha", 1.0)]))?;
    put(
        &mut spec,
        "process+=1",
        staggered_from(&PROCESS_STEPS, &[("opacity", 0.0), ("y", 20.0)], 0.5),
    )?;

    // Playground.
    put(&mut spec, "playground", to("process-ui", &[("auto_alpha", 0.0), ("scale", 0.9)]))?;
    put(
        &mut spec,
        "playground",
        to(
            MASK,
            &[
                ("scale", 2.0),
                ("rotation", 0.0),
                ("radius_pct", 0.0),
                ("width_vw", 100.0),
                ("height_vw", 0.0),
                ("height_vh", 100.0),
                ("opacity", 0.1),
            ],
        ),
    )?;
    put(
        &mut spec,
        "playground",
        [Keyframe::to((BG, "color"), hex("#050505")).with_duration(DEFAULT_DURATION)],
    )?;
    put(
        &mut spec,
        "playground+=0.5",
        to("playground-ui", &[("auto_alpha", 1.0), ("y", 0.0)]),
    )?;

    // Testimonials.
    put(
        &mut spec,
        "testimonials",
        to("playground-ui", &[("auto_alpha", 0.0), ("y", -50.0)]),
    )?;
    put(
        &mut spec,
        "testimonials+=0.5",
        to("testimonials-ui", &[("auto_alpha", 1.0), ("x", 0.0)]),
    )?;
    put(
        &mut spec,
        "testimonials+=0.5",
        tuned(
            staggered_from(&TESTIMONIAL_CARDS, &[("x_vw", 100.0)], 0.2),
            2.0,
            Some(Easing::PowerOut(2)),
        ),
    )?;

    // Work: title slam, cards pop up, then the track scrolls sideways.
    put(
        &mut spec,
        "work",
        to("testimonials-ui", &[("auto_alpha", 0.0), ("scale", 0.8), ("y", -100.0)]),
    )?;
    put(&mut spec, "work", to(MASK, &[("opacity", 0.0)]))?;
    put(
        &mut spec,
        "work",
        [Keyframe::to((BG, "color"), hex("#000000")).with_duration(DEFAULT_DURATION)],
    )?;
    put(&mut spec, "work", to("work-ui", &[("auto_alpha", 1.0), ("y", 0.0)]))?;
    put(
        &mut spec,
        "work",
        [Keyframe::to(("work-ui", "pointer_events"), 1.0).with_duration(0.0)],
    )?;
    put(
        &mut spec,
        "work+=0.2",
        tuned(
            from(
                "work-title",
                &[("scale", 3.0), ("opacity", 0.0), ("blur", 10.0), ("y", 100.0)],
            ),
            1.0,
            Some(Easing::ExpoOut),
        ),
    )?;
    put(
        &mut spec,
        "work+=0.5",
        tuned(
            staggered_from(
                &PROJECT_CARDS,
                &[("y", 300.0), ("opacity", 0.0), ("rotation_x", 45.0), ("scale", 0.5)],
                0.1,
            ),
            1.5,
            Some(Easing::BackOut { overshoot: 1.2 }),
        ),
    )?;
    put(
        &mut spec,
        "work+=1.5",
        [Keyframe::from_to(("work-track", "x_vw"), 0.0, -160.0)
            .with_name("work-track-x")
            .with_duration(5.0)
            .with_easing(Easing::Linear)],
    )?;

    let desktop = BreakpointVariant::new("desktop", WidthRange::at_least(MOBILE_BREAKPOINT))
        .with_total_distance(DESKTOP_DISTANCE);
    let mobile = BreakpointVariant::new("mobile", WidthRange::below(MOBILE_BREAKPOINT))
        .with_total_distance(MOBILE_DISTANCE)
        .with_keyframe_value("mask-width", 85.0)
        .with_keyframe_value("mask-height", 85.0)
        .with_keyframe_value("mask-y-hero", 0.0)
        .with_keyframe_value("mask-y-vh-hero", -30.0)
        .with_keyframe_value("mask-x-dashboard", 0.0)
        .with_keyframe_value("mask-y-vh-dashboard", -35.0)
        .with_keyframe_value("mask-x-about", 0.0)
        .with_keyframe_value("mask-y-vh-about", -35.0)
        .with_keyframe_value("dashboard-y-about", -50.0)
        .with_keyframe_override(
            "work-track-x",
            KeyframeValue::FromTo(Value::Number(0.0), Value::Number(-300.0)),
        );

    adebug!(phases = spec.phases.len(), "scene::portfolio");
    Ok((spec, alloc::vec![desktop, mobile]))
}

/// [`portfolio`] wrapped in engine options: desktop distance by default and a scrub of 2.
pub fn portfolio_options(stat: &StatSlot) -> Result<ScrollTimelineOptions, ConfigError> {
    let (spec, variants) = portfolio(stat)?;
    Ok(ScrollTimelineOptions::new(spec, DESKTOP_DISTANCE)
        .with_variants(variants)
        .with_scrub(SCRUB))
}

/// The endless background drift: each orb wanders to a random offset within 100 px and back over
/// 10 to 20 s, the second starting 2 s after the first.
pub fn orb_float(seed: u64) -> TweenGroup<(f32, f32)> {
    float_group(ORB_COUNT, FloatOptions::new().with_seed(seed))
}

/// The intro reveal: each name character slides up from `y_pct = 100` over 1.5 s with
/// power4.out, 0.1 s apart, after a 0.2 s delay. Times are on the ticker clock.
pub fn name_intro(chars: usize) -> TweenGroup<f32> {
    let base =
        LoopTween::new(Tween::new(100.0, 0.0, 0, 1500, Easing::PowerOut(4))).with_delay(200);
    TweenGroup::staggered(base, chars, 100)
}
