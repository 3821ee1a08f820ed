#![cfg(not(target_arch = "wasm32"))]

//! Host-side properties of the pure render state: pointer smoothing, surface
//! sizing and the frame loop.

use proptest::prelude::*;

use rays_wasm::{
    backing_size, FrameLoop, FrameScheduler, PointerState, RayScene, RenderConfig, ScheduleError,
    SurfaceState,
};

#[derive(Default)]
struct Fake {
    next: u32,
    outstanding: Vec<u32>,
}

impl FrameScheduler for Fake {
    type Handle = u32;

    fn request(&mut self) -> Result<u32, ScheduleError> {
        self.next += 1;
        self.outstanding.push(self.next);
        Ok(self.next)
    }

    fn cancel(&mut self, handle: u32) {
        self.outstanding.retain(|h| *h != handle);
    }
}

#[derive(Clone, Copy, Debug)]
enum Op {
    Start,
    Stop,
    Fire,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Start), Just(Op::Stop), Just(Op::Fire)]
}

proptest! {
    /// |current_n - target| = |current_0 - target| * (1 - s)^n
    #[test]
    fn smoothing_follows_geometric_decay(
        tx in 0.0f32..=1.0,
        ty in 0.0f32..=1.0,
        s in 0.01f32..=1.0,
        n in 0u32..60,
    ) {
        let mut pointer = PointerState::new();
        let [x0, y0] = pointer.current();
        pointer.set_target(tx, ty);
        for _ in 0..n {
            pointer.step(s);
        }
        let [x, y] = pointer.current();
        let decay = (1.0 - f64::from(s)).powi(n as i32);
        let expect_x = (f64::from(x0) - f64::from(tx)).abs() * decay;
        let expect_y = (f64::from(y0) - f64::from(ty)).abs() * decay;
        prop_assert!(((f64::from(x) - f64::from(tx)).abs() - expect_x).abs() < 1e-4);
        prop_assert!(((f64::from(y) - f64::from(ty)).abs() - expect_y).abs() < 1e-4);
    }

    #[test]
    fn targets_are_stored_exactly(x in -1.0f32..2.0, y in -1.0f32..2.0) {
        let mut pointer = PointerState::new();
        pointer.set_target(x, y);
        prop_assert_eq!(pointer.target(), [x, y]);
    }

    #[test]
    fn resize_is_idempotent(
        w in 0.0f64..4000.0,
        h in 0.0f64..4000.0,
        dpr in 0.5f64..4.0,
        cap in 1.0f64..3.0,
    ) {
        let mut surface = SurfaceState::default();
        surface.resize(w, h, dpr, cap);
        let first = surface;
        prop_assert!(!surface.resize(w, h, dpr, cap));
        prop_assert_eq!(surface, first);
        prop_assert!(surface.width >= 1 && surface.height >= 1);
        prop_assert_eq!((surface.width, surface.height), backing_size(w, h, dpr, cap));
    }

    #[test]
    fn backing_never_exceeds_the_cap(w in 1.0f64..4000.0, dpr in 0.5f64..4.0) {
        let cap = 1.5;
        let (bw, _) = backing_size(w, 10.0, dpr, cap);
        prop_assert!(f64::from(bw) <= (w * cap).ceil());
    }

    /// Under any interleaving of start, stop and fired frames there is one
    /// outstanding request exactly while the loop runs.
    #[test]
    fn one_request_while_running(ops in prop::collection::vec(op(), 0..64)) {
        let mut fake = Fake::default();
        let mut frames = FrameLoop::new();
        for op in ops {
            match op {
                Op::Start => frames.start(&mut fake).unwrap(),
                Op::Stop => frames.stop(&mut fake),
                Op::Fire => {
                    if fake.outstanding.is_empty() {
                        continue;
                    }
                    fake.outstanding.remove(0);
                    frames.begin_frame();
                    frames.end_frame(&mut fake).unwrap();
                }
            }
            let expected = usize::from(frames.is_running());
            prop_assert_eq!(fake.outstanding.len(), expected);
            prop_assert_eq!(frames.has_pending(), frames.is_running());
        }
    }

    #[test]
    fn scene_time_never_runs_backwards(start in 0.0f64..1e6, a in 0.0f64..1e5, b in 0.0f64..1e5) {
        let scene = RayScene::new(RenderConfig::cone(), start);
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(scene.elapsed(start + early) <= scene.elapsed(start + late));
        prop_assert!(scene.elapsed(start - late) >= 0.0);
    }
}

#[test]
fn restart_after_stop_leaves_a_single_chain() {
    let mut fake = Fake::default();
    let mut frames = FrameLoop::new();
    frames.start(&mut fake).unwrap();
    frames.stop(&mut fake);
    frames.start(&mut fake).unwrap();
    frames.start(&mut fake).unwrap();
    assert_eq!(fake.outstanding.len(), 1);

    for _ in 0..5 {
        fake.outstanding.remove(0);
        assert!(frames.begin_frame());
        frames.end_frame(&mut fake).unwrap();
        assert_eq!(fake.outstanding.len(), 1);
    }
}
