//! Infinite-scroll tests: initial window, step growth clamped to the
//! total, reset on filter change, and the footer state.

use paydash_core::pagination::{InfiniteScroll, ListFooter};

#[test]
fn starts_at_initial_count() {
    let scroll = InfiniteScroll::new(30, 30);
    assert_eq!(scroll.visible_count(), 30);
    assert_eq!(scroll.shown(100), 30);
    assert_eq!(scroll.shown(12), 12);
}

#[test]
fn grows_by_step_and_clamps_to_total() {
    let mut scroll = InfiniteScroll::new(30, 30);
    assert!(scroll.on_sentinel_visible(75));
    assert_eq!(scroll.visible_count(), 60);
    assert!(scroll.on_sentinel_visible(75));
    assert_eq!(scroll.visible_count(), 75);
    // already everything: no change
    assert!(!scroll.on_sentinel_visible(75));
    assert_eq!(scroll.visible_count(), 75);
}

/// A short list never grows the window.
#[test]
fn short_list_does_not_grow() {
    let mut scroll = InfiniteScroll::new(30, 30);
    assert!(!scroll.on_sentinel_visible(10));
    assert_eq!(scroll.visible_count(), 30);
    assert_eq!(scroll.shown(10), 10);
}

#[test]
fn reset_returns_to_initial() {
    let mut scroll = InfiniteScroll::new(3, 2);
    scroll.on_sentinel_visible(100);
    scroll.on_sentinel_visible(100);
    assert_eq!(scroll.visible_count(), 7);

    scroll.reset();
    assert_eq!(scroll.visible_count(), 3);
}

#[test]
fn window_slices_items() {
    let items: Vec<u32> = (0..10).collect();
    let mut scroll = InfiniteScroll::new(3, 4);
    assert_eq!(scroll.window(&items), &[0, 1, 2]);

    scroll.on_sentinel_visible(items.len());
    assert_eq!(scroll.window(&items).len(), 7);

    let empty: Vec<u32> = Vec::new();
    assert!(scroll.window(&empty).is_empty());
}

#[test]
fn status_line_states() {
    let mut scroll = InfiniteScroll::new(3, 3);
    assert_eq!(scroll.status_line(10, true), ListFooter::Loading);
    assert_eq!(scroll.status_line(10, false), ListFooter::MoreAvailable);
    assert_eq!(scroll.status_line(3, false), ListFooter::AllShown);

    while scroll.on_sentinel_visible(10) {}
    assert_eq!(scroll.status_line(10, false), ListFooter::AllShown);
}
