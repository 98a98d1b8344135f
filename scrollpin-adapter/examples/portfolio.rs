use scrollpin::{
    Bounds, EngineContext, Frame, FrameOutput, PropertyKey, ScrollInput, TimelineHandle, Viewport,
};
use scrollpin_adapter::{StatSlot, scene};

fn main() {
    // Example: the portfolio scene driven by a simulated scroll session.
    //
    // A real adapter would:
    // - resolve the stat slot when its fetch completes (or fail it)
    // - forward wheel/touch/native scroll and resize events to the context
    // - call ctx.tick(now_ms) once per display refresh
    // - apply the delivered properties to its elements
    let commits = StatSlot::new(450.0);
    let options = match scene::portfolio_options(&commits) {
        Ok(options) => options.with_initial_viewport(Some(Viewport::new(1440, 900, 900.0))),
        Err(err) => {
            eprintln!("scene failed to build: {err}");
            return;
        }
    };

    let ctx = EngineContext::new();
    let handle = match TimelineHandle::build(&ctx, options, || {
        Some(Bounds::new(0.0, 0.0, 1440.0, 900.0))
    }) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("invalid timeline: {err}");
            return;
        }
    };

    let bg = PropertyKey::new("bg", "color");
    let stat = PropertyKey::new("stat-number", "text");
    handle.on_frame(move |out: &FrameOutput| {
        if out.frame.index % 60 == 0 {
            println!(
                "t={}ms phase-progress={:.3} bg={} commits={}",
                out.frame.now_ms, out.progress, out.properties[&bg], out.properties[&stat]
            );
        }
    });

    // Time-based motion shares the ticker but not the scroll progress.
    let _intro = scene::name_intro(7).attach(&ctx, |frame: &Frame, chars: &[f32]| {
        if frame.index % 30 == 0 && frame.time_ms <= 2000 {
            println!("t={}ms name y%={chars:.1?}", frame.time_ms);
        }
    });
    let _orbs = scene::orb_float(42).attach(&ctx, |frame: &Frame, orbs: &[(f32, f32)]| {
        if frame.index % 300 == 0 {
            println!("t={}ms orbs={orbs:.1?}", frame.time_ms);
        }
    });

    let mut now_ms = 0u64;
    for frame in 0..900u64 {
        now_ms += 16;
        if frame == 120 {
            commits.fulfil(612.0);
        }
        ctx.scroll(ScrollInput::Wheel { delta: 40.0 });
        ctx.tick(now_ms);
    }

    // Rotate a phone: the mobile variant takes over at the same progress.
    ctx.resize(Viewport::new(390, 844, 844.0));
    println!(
        "{}: restore scroll to {:?}",
        handle.variant_name(),
        handle.take_scroll_restore()
    );
}
