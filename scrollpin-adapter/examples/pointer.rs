use scrollpin::Bounds;
use scrollpin_adapter::{MagneticOptions, TiltOptions, attach_magnetic, attach_tilt};

fn main() {
    // Example: hover micro-interactions sampled in a frame loop.
    let card = || Some(Bounds::new(100.0, 100.0, 300.0, 200.0));
    let mut tilt = attach_tilt(card, TiltOptions::new());
    let mut button = attach_magnetic(card, MagneticOptions::new());

    let path = [(120.0, 110.0), (250.0, 200.0), (380.0, 290.0)];
    let mut now_ms = 0u64;
    for (x, y) in path {
        if let Some(target) = tilt.on_pointer_move(x, y, now_ms) {
            println!("tilt target at ({x}, {y}): {target:?}");
        }
        button.on_pointer_move(x, y, now_ms);
        for _ in 0..10 {
            now_ms += 16;
            let t = tilt.sample(now_ms);
            let (bx, by) = button.sample(now_ms);
            println!(
                "t={now_ms} rotate=({:.2}, {:.2}) button=({bx:.1}, {by:.1})",
                t.rotate_x, t.rotate_y
            );
        }
    }

    tilt.on_pointer_leave(now_ms);
    button.on_pointer_leave(now_ms);
    while tilt.is_animating(now_ms) || button.is_animating(now_ms) {
        now_ms += 16;
        let (bx, _) = button.sample(now_ms);
        println!("t={now_ms} rotate_y={:.2} button_x={bx:.1}", tilt.sample(now_ms).rotate_y);
    }

    tilt.detach();
    button.detach();
}
