use super::*;

#[test]
fn create_allocates_zeroed_canonical_buffer() {
    let mut s = PixelSurface::create(3, 2).unwrap();
    assert_eq!((s.width(), s.height()), (3, 2));
    assert_eq!(s.stride(), 12);
    assert_eq!(s.pixel_format(), PixelFormat::Bgra8Premul);
    assert_eq!(s.lock_state(), LockState::Unlocked);

    let lock = s.lock().unwrap();
    assert_eq!(lock.bytes().len(), 24);
    assert!(lock.bytes().iter().all(|&b| b == 0));
}

#[test]
fn create_rejects_zero_dimensions() {
    for (w, h) in [(0, 1), (1, 0), (0, 0)] {
        let err = PixelSurface::create(w, h).unwrap_err();
        assert!(
            matches!(err, PixsurfError::InvalidDimensions { width, height } if width == w && height == h)
        );
    }
}

#[test]
fn create_aligned_pads_rows() {
    let mut s = PixelSurface::create_aligned(3, 2, 16).unwrap();
    assert_eq!(s.stride(), 16);
    assert_eq!(s.lock().unwrap().bytes().len(), 32);
}

#[test]
fn lock_and_drop_cycle_state() {
    let mut s = PixelSurface::create(1, 1).unwrap();
    for _ in 0..3 {
        let lock = s.lock().unwrap();
        drop(lock);
        assert_eq!(s.lock_state(), LockState::Unlocked);
    }
}

#[test]
fn lock_after_dispose_fails() {
    let mut s = PixelSurface::create(2, 2).unwrap();
    s.dispose();
    assert!(s.is_disposed());
    assert!(matches!(s.lock(), Err(PixsurfError::AlreadyDisposed)));
}

#[test]
fn dispose_and_unlock_are_idempotent() {
    let mut s = PixelSurface::create(2, 2).unwrap();
    s.unlock();
    s.unlock();
    assert_eq!(s.lock_state(), LockState::Unlocked);

    s.dispose();
    s.dispose();
    s.unlock();
    assert_eq!(s.lock_state(), LockState::Disposed);
}

#[test]
fn leaked_lock_blocks_relock_until_unlocked() {
    let mut s = PixelSurface::create(2, 2).unwrap();
    std::mem::forget(s.lock().unwrap());
    assert_eq!(s.lock_state(), LockState::Locked);
    assert!(matches!(s.lock(), Err(PixsurfError::IllegalState(_))));

    s.unlock();
    assert_eq!(s.lock_state(), LockState::Unlocked);
    assert!(s.lock().is_ok());
}

#[test]
fn dispose_releases_leaked_lock() {
    let mut s = PixelSurface::create(2, 2).unwrap();
    std::mem::forget(s.lock().unwrap());
    s.dispose();
    assert_eq!(s.lock_state(), LockState::Disposed);
}

#[test]
fn source_bytes_unavailable_after_dispose() {
    let mut s = PixelSurface::create(1, 1).unwrap().with_source(vec![1, 2, 3]);
    assert_eq!(s.source_bytes().unwrap(), Some(&[1u8, 2, 3][..]));
    s.dispose();
    assert!(matches!(
        s.source_bytes(),
        Err(PixsurfError::IllegalState(_))
    ));
}

#[test]
fn with_lock_releases_on_error() {
    let mut s = PixelSurface::create(2, 2).unwrap();
    let res: PixsurfResult<()> = s.with_lock(|lock| {
        lock.get(5, 0)?;
        Ok(())
    });
    assert!(matches!(res, Err(PixsurfError::OutOfBounds { .. })));
    assert_eq!(s.lock_state(), LockState::Unlocked);
}

#[test]
fn scoped_returns_closure_result() {
    let s = PixelSurface::create(2, 2).unwrap();
    let stride = s.scoped(|s| {
        assert!(!s.is_disposed());
        s.stride()
    });
    assert_eq!(stride, 8);
}

#[test]
fn scoped_propagates_panic_from_closure() {
    let s = PixelSurface::create(2, 2).unwrap();
    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _: u32 = s.scoped(|_| panic!("effect failed"));
    }));
    let payload = res.unwrap_err();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"effect failed"));
}
