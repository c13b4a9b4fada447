use northfit::lowlevel::rotated_bounds;
use northfit::{
    Anchor, Condition, FitConfig, NaturalSize, Rect, ResizeFitter, ResizeMode, Size,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOL: f64 = 1e-9;

fn random_case(rng: &mut StdRng) -> (Rect, NaturalSize) {
    let frame = Rect::new(
        rng.random_range(-500.0..500.0),
        rng.random_range(-500.0..500.0),
        rng.random_range(0.5..400.0),
        rng.random_range(0.5..400.0),
    );
    let natural = NaturalSize::new(rng.random_range(1..4000), rng.random_range(1..4000));
    (frame, natural)
}

fn assert_rect_close(a: Rect, b: Rect, what: &str) {
    let scale = 1.0 + a.width.abs().max(a.height.abs()).max(a.x.abs()).max(a.y.abs());
    assert!(
        (a.x - b.x).abs() <= TOL * scale
            && (a.y - b.y).abs() <= TOL * scale
            && (a.width - b.width).abs() <= TOL * scale
            && (a.height - b.height).abs() <= TOL * scale,
        "{what}: {a:?} vs {b:?}"
    );
}

fn aspect(r: Rect) -> f64 {
    r.width / r.height
}

#[test]
fn zoom_preserves_aspect_and_stays_inside() {
    let fitter = ResizeFitter::default();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let (frame, natural) = random_case(&mut rng);
        let out = fitter.fit(frame, natural, ResizeMode::Zoom);
        let image_aspect = natural.width as f64 / natural.height as f64;
        let rel = (aspect(out.displayed) - image_aspect).abs() / image_aspect;
        assert!(rel < 1e-6, "aspect drift {rel} for {frame:?} {natural:?}");
        assert!(frame.contains_rect(&out.displayed, TOL * 1e3));
        // One side fills the frame.
        assert!(
            (out.displayed.width - frame.width).abs() < TOL * 1e3
                || (out.displayed.height - frame.height).abs() < TOL * 1e3
        );
        assert_eq!(out.new_frame, None);
        assert_eq!(out.condition, None);
    }
}

#[test]
fn zoom_centers_by_default() {
    let fitter = ResizeFitter::default();
    let frame = Rect::new(10.0, 20.0, 200.0, 100.0);
    let out = fitter.fit(frame, NaturalSize::new(100, 100), ResizeMode::Zoom);
    assert_eq!(out.displayed, Rect::new(60.0, 20.0, 100.0, 100.0));
    assert_eq!(out.displayed.center(), frame.center());
}

#[test]
fn zoom_follows_anchor() {
    let frame = Rect::new(0.0, 0.0, 200.0, 100.0);
    let natural = NaturalSize::new(100, 100);
    let expected_x = [(Anchor::MiddleLeft, 0.0), (Anchor::Middle, 50.0), (Anchor::LowerRight, 100.0)];
    for (anchor, x) in expected_x {
        let fitter = ResizeFitter::new(FitConfig::default().with_anchor(anchor)).unwrap();
        let out = fitter.fit(frame, natural, ResizeMode::Zoom);
        assert_eq!(out.displayed, Rect::new(x, 0.0, 100.0, 100.0), "{anchor}");
    }
}

#[test]
fn rotated_zoom_footprint_fits_frame() {
    let fitter = ResizeFitter::default();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..300 {
        let (frame, natural) = random_case(&mut rng);
        let rotation = rng.random_range(-360.0..360.0);
        let out = fitter.fit_rotated(frame, natural, ResizeMode::Zoom, rotation);
        let fp = rotated_bounds(out.displayed.size(), rotation);
        let footprint = Rect::centered_at(out.displayed.center(), fp);
        assert!(
            frame.contains_rect(&footprint, 1e-6),
            "rotation {rotation}: {footprint:?} not in {frame:?}"
        );
        let image_aspect = natural.width as f64 / natural.height as f64;
        assert!((aspect(out.displayed) / image_aspect - 1.0).abs() < 1e-6);
    }
}

#[test]
fn quarter_turn_zoom_fills_swapped_frame() {
    let fitter = ResizeFitter::default();
    let frame = Rect::new(0.0, 0.0, 50.0, 200.0);
    let out = fitter.fit_rotated(frame, NaturalSize::new(400, 100), ResizeMode::Zoom, -90.0);
    assert_eq!(out.displayed.size(), Size::new(200.0, 50.0));
    assert_eq!(out.displayed.center(), frame.center());
}

#[test]
fn stretch_ignores_aspect() {
    let fitter = ResizeFitter::default();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let (frame, natural) = random_case(&mut rng);
        let out = fitter.fit_rotated(frame, natural, ResizeMode::Stretch, 30.0);
        assert_eq!(out.displayed, frame);
        assert_rect_close(out.visible, frame, "stretch visible");
    }
}

#[test]
fn clip_crops_to_frame() {
    let fitter = ResizeFitter::new(FitConfig::default().with_pixels_per_unit(10.0)).unwrap();
    let frame = Rect::new(0.0, 0.0, 20.0, 20.0);
    let out = fitter.fit(frame, NaturalSize::new(600, 100), ResizeMode::Clip);
    assert_eq!(out.displayed, Rect::new(-20.0, 5.0, 60.0, 10.0));
    assert_eq!(out.visible, Rect::new(0.0, 5.0, 20.0, 10.0));
    assert_eq!(out.new_frame, None);
}

#[test]
fn frame_to_image_size_default_is_96_dpi() {
    let fitter = ResizeFitter::default();
    let frame = Rect::new(3.0, 4.0, 1.0, 1.0);
    let out = fitter.fit(frame, NaturalSize::new(96, 192), ResizeMode::FrameToImageSize);
    let new_frame = out.new_frame.unwrap();
    let center = new_frame.center();
    assert!((center.x - 3.5).abs() < 1e-12 && (center.y - 4.5).abs() < 1e-12);
    assert!((new_frame.width - 25.4).abs() < 1e-12);
    assert!((new_frame.height - 50.8).abs() < 1e-12);
}

#[test]
fn frame_resizing_modes_keep_anchor_point() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        let anchor = Anchor::ALL[rng.random_range(0..Anchor::ALL.len())];
        let fitter = ResizeFitter::new(FitConfig::default().with_anchor(anchor)).unwrap();
        let (frame, natural) = random_case(&mut rng);
        let rotation = if rng.random_bool(0.5) {
            0.0
        } else {
            rng.random_range(-180.0..180.0)
        };
        for mode in [ResizeMode::ZoomResizeFrame, ResizeMode::FrameToImageSize] {
            let out = fitter.fit_rotated(frame, natural, mode, rotation);
            let new_frame = out.new_frame.unwrap();
            let (p, q) = (anchor.point_in(frame), anchor.point_in(new_frame));
            assert!((p.x - q.x).abs() < 1e-9 && (p.y - q.y).abs() < 1e-9, "{mode} {anchor}");
            let (a, b) = (out.displayed.center(), new_frame.center());
            assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "{mode}");
        }
        let out = fitter.fit_rotated(frame, natural, ResizeMode::ZoomResizeFrame, rotation);
        let new_frame = out.new_frame.unwrap();
        assert!(new_frame.width <= frame.width + TOL * frame.width);
        assert!(new_frame.height <= frame.height + TOL * frame.height);
    }
}

#[test]
fn fitting_is_idempotent() {
    let fitter = ResizeFitter::default();
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..200 {
        let (frame, natural) = random_case(&mut rng);
        let rotation = if rng.random_bool(0.5) {
            90.0 * rng.random_range(-4i32..4) as f64
        } else {
            rng.random_range(-180.0..180.0)
        };
        for mode in ResizeMode::ALL {
            let first = fitter.fit_rotated(frame, natural, mode, rotation);
            let frame1 = first.frame_or(frame);
            let second = fitter.fit_rotated(frame1, natural, mode, rotation);
            let frame2 = second.frame_or(frame1);
            assert_rect_close(frame2, frame1, &format!("{mode} frame"));
            assert_rect_close(second.displayed, first.displayed, &format!("{mode} displayed"));
            if rotation == 0.0 && mode == ResizeMode::ZoomResizeFrame {
                assert_eq!(frame2, frame1);
            }
        }
    }
}

#[test]
fn resized_frame_survives_rotation_cycles() {
    let fitter = ResizeFitter::default();
    let mode = ResizeMode::ZoomResizeFrame;
    let mut rng = StdRng::seed_from_u64(451);
    for _ in 0..100 {
        let (frame, natural) = random_case(&mut rng);
        let start = fitter.fit(frame, natural, mode);
        let start_frame = start.frame_or(frame);
        let size = start.displayed.size();

        let mut current = start_frame;
        for _ in 0..5 {
            let angle = rng.random_range(-180.0..180.0);
            let turned = fitter.refit_rotation(current, natural, mode, 0.0, angle);
            let d = turned.displayed.size();
            assert!(
                (d.width - size.width).abs() <= TOL * (1.0 + size.width)
                    && (d.height - size.height).abs() <= TOL * (1.0 + size.height),
                "size drifted at {angle}: {d:?} vs {size:?}"
            );
            let turned_frame = turned.frame_or(current);
            let back = fitter.refit_rotation(turned_frame, natural, mode, angle, 0.0);
            current = back.frame_or(turned_frame);
        }
        assert_rect_close(current, start_frame, "frame after rotation cycles");
    }
}

#[test]
fn degenerate_geometry_is_reported() {
    let fitter = ResizeFitter::default();
    let empty_frame = Rect::new(5.0, 5.0, 0.0, 10.0);
    for mode in [ResizeMode::Zoom, ResizeMode::Stretch, ResizeMode::Clip, ResizeMode::ZoomResizeFrame] {
        let out = fitter.fit(empty_frame, NaturalSize::new(10, 10), mode);
        assert!(out.displayed.is_empty(), "{mode}");
        assert!(out.displayed.width >= 0.0 && out.displayed.height >= 0.0);
        assert_eq!(out.condition, Some(Condition::DegenerateGeometry));
    }
    let frame = Rect::new(0.0, 0.0, 10.0, 10.0);
    for mode in ResizeMode::ALL {
        let out = fitter.fit(frame, NaturalSize::new(10, 0), mode);
        assert!(out.displayed.is_empty(), "{mode}");
        assert_eq!(out.new_frame, None);
        assert_eq!(out.condition, Some(Condition::DegenerateGeometry));
    }
}
