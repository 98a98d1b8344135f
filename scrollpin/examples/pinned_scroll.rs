// Example: wheel input driving a pinned three-phase timeline.
use std::cell::RefCell;
use std::rc::Rc;

use scrollpin::{
    Bounds, EngineContext, FrameOutput, Keyframe, Phase, PropertyKey, ScrollInput,
    ScrollTimelineOptions, TimelineHandle, TimelineSpec, Viewport,
};

fn main() {
    let spec = TimelineSpec::new()
        .with_initial(("mask", "scale"), 1.0)
        .with_initial(("mask", "x"), 0.0)
        .with_phase(Phase::new("intro", 1.0).with_keyframe(Keyframe::to(("mask", "scale"), 0.5)))
        .with_phase(Phase::new("left", 2.0).with_keyframe(Keyframe::to(("mask", "x"), -300.0)))
        .with_phase(Phase::new("right", 1.0).with_keyframe(Keyframe::to(("mask", "x"), 300.0)));

    let ctx = EngineContext::new();
    let options = ScrollTimelineOptions::new(spec, 4000.0)
        .with_scrub(2.0)
        .with_initial_viewport(Some(Viewport::new(1280, 800, 2400.0)));

    // The trigger sits 600px down the page.
    let handle = match TimelineHandle::build(&ctx, options, || {
        Some(Bounds::new(0.0, 600.0, 1280.0, 800.0))
    }) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("invalid timeline: {err}");
            return;
        }
    };

    let last = Rc::new(RefCell::new(None::<FrameOutput>));
    handle.on_frame({
        let last = Rc::clone(&last);
        move |out: &FrameOutput| *last.borrow_mut() = Some(out.clone())
    });

    let mut now_ms = 0u64;
    for frame in 0..600u64 {
        // Simulate a 60fps tick with a steady wheel for the first five seconds.
        now_ms += 16;
        if frame < 300 {
            ctx.scroll(ScrollInput::Wheel { delta: 24.0 });
        }
        ctx.tick(now_ms);

        if frame % 40 == 0 {
            if let Some(out) = last.borrow().as_ref() {
                println!(
                    "t={now_ms}ms offset={:.0} pin={:?} progress={:.3} scale={} x={}",
                    out.scroll.smoothed_offset,
                    out.pin.state,
                    out.progress,
                    out.properties[&PropertyKey::new("mask", "scale")],
                    out.properties[&PropertyKey::new("mask", "x")],
                );
            }
        }
    }

    println!("done: {handle:?}");
}
