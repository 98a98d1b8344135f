// Example: a resize across a breakpoint swaps variants and reports where to restore scroll.
use scrollpin::{
    Bounds, BreakpointChange, BreakpointVariant, EngineContext, InertialOptions, InputMode,
    Keyframe, Phase, ScrollInput, ScrollTimelineOptions, TimelineHandle, TimelineSpec, Viewport,
    WidthRange, register_breakpoint_listener,
};

fn main() -> Result<(), scrollpin::ConfigError> {
    let spec = TimelineSpec::new()
        .with_initial(("card", "width"), 100.0)
        .with_phase(
            Phase::new("shrink", 1.0)
                .with_keyframe(Keyframe::to(("card", "width"), 30.0).with_name("card-width")),
        );
    let variants = [
        BreakpointVariant::new("desktop", WidthRange::at_least(768)).with_total_distance(4000.0),
        BreakpointVariant::new("mobile", WidthRange::below(768))
            .with_total_distance(6000.0)
            .with_keyframe_value("card-width", 85.0),
    ];

    let ctx = EngineContext::new();
    let _listener = register_breakpoint_listener(
        &ctx,
        variants.iter().map(|v| v.predicate).collect(),
        |change: &BreakpointChange| {
            println!("breakpoint {:?} -> {} at {}px", change.previous, change.current, change.width);
        },
    )?;

    let handle = TimelineHandle::build(
        &ctx,
        ScrollTimelineOptions::new(spec, 4000.0)
            .with_variants(variants)
            .with_inertial(InertialOptions::new().with_mode(InputMode::Native))
            .with_initial_viewport(Some(Viewport::new(1280, 800, 0.0))),
        || Some(Bounds::new(0.0, 0.0, 1280.0, 800.0)),
    )?;
    ctx.resize(Viewport::new(1280, 800, 0.0));

    ctx.scroll(ScrollInput::Native { offset: 2000.0 });
    ctx.tick(16);
    println!(
        "{}: progress={} applied={:?}",
        handle.variant_name(),
        handle.progress(),
        handle.applied()
    );

    ctx.resize(Viewport::new(390, 844, 0.0));
    println!(
        "{}: progress={} restore={:?} applied={:?}",
        handle.variant_name(),
        handle.progress(),
        handle.take_scroll_restore(),
        handle.applied()
    );
    Ok(())
}
