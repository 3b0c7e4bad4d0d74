use super::*;

fn surface_from(w: u32, h: u32, px: impl Fn(u32, u32) -> Color) -> PixelSurface {
    let mut s = PixelSurface::create(w, h).unwrap();
    s.with_lock(|lock| {
        for y in 0..h {
            for x in 0..w {
                lock.set(x, y, px(x, y))?;
            }
        }
        Ok(())
    })
    .unwrap();
    s
}

fn snapshot(s: &mut PixelSurface) -> Vec<u8> {
    s.with_lock(|lock| Ok(lock.bytes().to_vec())).unwrap()
}

#[test]
fn flat_image_is_unchanged() {
    let mut s = surface_from(6, 4, |_, _| Color::rgba(80, 90, 100, 255));
    let before = snapshot(&mut s);
    apply_unsharp_mask(&mut s, &UnsharpMaskParams::default()).unwrap();
    assert_eq!(snapshot(&mut s), before);
}

#[test]
fn edge_contrast_increases() {
    let dark = Color::rgba(60, 60, 60, 255);
    let light = Color::rgba(180, 180, 180, 255);
    let mut s = surface_from(8, 1, |x, _| if x < 4 { dark } else { light });

    let params = UnsharpMaskParams {
        amount: 1.0,
        threshold: 0.0,
        radius: 2,
        sigma: 1.0,
    };
    apply_unsharp_mask(&mut s, &params).unwrap();

    let lock = s.lock().unwrap();
    let left = lock.get(3, 0).unwrap();
    let right = lock.get(4, 0).unwrap();
    assert!(left.r < dark.r, "{left:?}");
    assert!(right.r > light.r, "{right:?}");
    assert_eq!(lock.get(0, 0).unwrap().a, 255);
}

#[test]
fn high_threshold_suppresses_sharpening() {
    let mut s = surface_from(8, 1, |x, _| {
        if x < 4 {
            Color::rgba(100, 100, 100, 255)
        } else {
            Color::rgba(110, 110, 110, 255)
        }
    });
    let before = snapshot(&mut s);
    let params = UnsharpMaskParams {
        amount: 2.0,
        threshold: 50.0,
        ..UnsharpMaskParams::default()
    };
    apply_unsharp_mask(&mut s, &params).unwrap();
    assert_eq!(snapshot(&mut s), before);
}

#[test]
fn output_stays_premultiplied() {
    let mut s = surface_from(6, 6, |x, y| {
        if (x + y) % 2 == 0 {
            Color::from_straight_rgba(255, 255, 255, 128)
        } else {
            Color::rgba(0, 0, 0, 128)
        }
    });
    let params = UnsharpMaskParams {
        amount: 4.0,
        threshold: 0.0,
        ..UnsharpMaskParams::default()
    };
    apply_unsharp_mask(&mut s, &params).unwrap();

    let lock = s.lock().unwrap();
    for y in 0..6 {
        for x in 0..6 {
            let c = lock.get(x, y).unwrap();
            assert_eq!(c.a, 128);
            assert!(c.r <= c.a && c.g <= c.a && c.b <= c.a, "{c:?}");
        }
    }
}

#[test]
fn disposed_surface_is_rejected() {
    let mut s = PixelSurface::create(2, 2).unwrap();
    s.dispose();
    let err = apply_unsharp_mask(&mut s, &UnsharpMaskParams::default()).unwrap_err();
    assert!(matches!(err, crate::PixsurfError::AlreadyDisposed));
}

#[test]
fn oversized_radius_leaves_surface_untouched() {
    let mut s = surface_from(3, 3, |x, _| Color::rgba(x as u8 * 50, 0, 0, 255));
    let before = snapshot(&mut s);
    let params = UnsharpMaskParams {
        radius: u32::MAX,
        ..UnsharpMaskParams::default()
    };
    let err = apply_unsharp_mask(&mut s, &params).unwrap_err();
    assert!(matches!(err, crate::PixsurfError::Validation(_)));
    assert_eq!(snapshot(&mut s), before);
    assert_eq!(s.lock_state(), crate::LockState::Unlocked);
}
