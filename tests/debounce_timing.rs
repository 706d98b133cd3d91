//! Timer-driven behaviour, run against tokio's paused clock

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tilegrid::render::MemoryTarget;
use tilegrid::tile::PostTileData;
use tilegrid::{Debouncer, DisplayOptions, PageRegistry, TileGridInstance};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    (seen, move |v: u32| s.lock().unwrap().push(v))
}

#[tokio::test(start_paused = true)]
async fn burst_collapses_into_one_trailing_call_with_latest_args() {
    let (seen, cb) = recorder();
    let d = Debouncer::new(cb, ms(200), false).unwrap();

    d.call(1);
    tokio::time::sleep(ms(50)).await;
    d.call(2);
    tokio::time::sleep(ms(50)).await;
    d.call(3);
    assert!(seen.lock().unwrap().is_empty());

    // last call at t=100, so nothing before t=300
    tokio::time::sleep(ms(199)).await;
    assert!(seen.lock().unwrap().is_empty());

    tokio::time::sleep(ms(2)).await;
    assert_eq!(*seen.lock().unwrap(), vec![3]);

    tokio::time::sleep(ms(1000)).await;
    assert_eq!(*seen.lock().unwrap(), vec![3]);
}

#[tokio::test(start_paused = true)]
async fn immediate_mode_fires_first_call_only() {
    let (seen, cb) = recorder();
    let d = Debouncer::new(cb, ms(200), true).unwrap();

    d.call(1);
    assert_eq!(*seen.lock().unwrap(), vec![1]);

    tokio::time::sleep(ms(100)).await;
    d.call(2);
    tokio::time::sleep(ms(100)).await;
    d.call(3);
    assert_eq!(*seen.lock().unwrap(), vec![1]);

    tokio::time::sleep(ms(500)).await;
    assert_eq!(*seen.lock().unwrap(), vec![1]);

    // idle again: next burst fires synchronously
    d.call(4);
    assert_eq!(*seen.lock().unwrap(), vec![1, 4]);
}

#[tokio::test(start_paused = true)]
async fn separate_bursts_each_fire_once() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let d = Debouncer::new(
        move |()| {
            c.fetch_add(1, Ordering::SeqCst);
        },
        ms(200),
        false,
    )
    .unwrap();

    for _ in 0..3 {
        for _ in 0..5 {
            d.call(());
            tokio::time::sleep(ms(20)).await;
        }
        tokio::time::sleep(ms(300)).await;
    }
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

fn mounted(width: u32, options: DisplayOptions) -> (Arc<Mutex<TileGridInstance>>, MemoryTarget) {
    let mut page = PageRegistry::new();
    let posts = (1..=4).map(|id| PostTileData::new(id, format!("/{}", id), "t")).collect();
    let id = page
        .register(
            vec![("Grid".into(), "1 1 1 1".into())],
            Some("2 2".into()),
            posts,
            options,
        )
        .unwrap()
        .unwrap();
    let target = MemoryTarget::new(width);
    let inst = TileGridInstance::mount(page.get(&id).unwrap(), Box::new(target.clone())).unwrap();
    (Arc::new(Mutex::new(inst)), target)
}

#[tokio::test(start_paused = true)]
async fn resize_events_are_coalesced_before_relayout() {
    let options = DisplayOptions {
        animated: false,
        padding: 0,
        ..Default::default()
    };
    let (inst, target) = mounted(1000, options);
    let listener = TileGridInstance::resize_listener(&inst).unwrap();
    assert_eq!(listener.wait(), ms(200));
    assert_eq!(target.frame_count(), 1);

    for width in [900, 700, 600, 500] {
        target.set_width(width);
        listener.call(());
        tokio::time::sleep(ms(30)).await;
    }
    assert_eq!(target.frame_count(), 1);

    tokio::time::sleep(ms(300)).await;
    assert_eq!(target.frame_count(), 2);

    let guard = inst.lock().unwrap();
    assert_eq!(guard.grid().template().rows(), &[vec![2, 2]]);
    assert_eq!(guard.grid().container_width(), 500);
    assert_eq!(guard.wrapper_height(), 2 * 125);
}

#[tokio::test(start_paused = true)]
async fn animated_redraw_reports_wrapper_height_when_settled() {
    let options = DisplayOptions {
        padding: 10,
        animation_duration_ms: 400,
        ..Default::default()
    };
    let (inst, target) = mounted(1030, options);
    {
        let guard = inst.lock().unwrap();
        assert_eq!(guard.completed_redraws(), 0);
        assert_eq!(guard.wrapper_height(), 0);
        assert!(target.last_frame().unwrap().transition.is_some());
    }

    tokio::time::sleep(ms(450)).await;
    let guard = inst.lock().unwrap();
    assert_eq!(guard.completed_redraws(), 1);
    assert_eq!(guard.grid().column_width(), 250);
    assert_eq!(guard.wrapper_height(), 250 + 10);
}
