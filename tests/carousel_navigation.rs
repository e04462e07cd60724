use photo_carousel::config::{Configuration, SlideSource, Variant};
use photo_carousel::events::{Dispatch, InputEvent, Key};
use photo_carousel::page::Page;
use photo_carousel::scheduler::ManualScheduler;
use std::path::PathBuf;
use std::time::Duration;

const SETTLE: Duration = Duration::from_millis(1000);

fn config(n: usize, variant: Variant) -> Configuration {
    let mut cfg = Configuration::default();
    cfg.carousel.variant = variant;
    cfg.page.slides = (0..n)
        .map(|i| SlideSource {
            image: PathBuf::from(format!("/photos/{i}.jpg")),
            caption: None,
        })
        .collect();
    cfg
}

/// Hardened page with auto-advance parked so only explicit input moves it.
fn page(n: usize) -> Page<ManualScheduler> {
    let mut page = Page::bootstrap(&config(n, Variant::Hardened), ManualScheduler::new()).unwrap();
    page.with_carousel(|c, _, timers| c.stop_auto_slide(timers));
    page
}

fn current(page: &Page<ManualScheduler>) -> usize {
    page.carousel().expect("carousel mounted").current_index()
}

fn marked(page: &Page<ManualScheduler>, selector: &str, class: &str) -> Vec<usize> {
    let doc = page.document();
    doc.query_selector_all(selector)
        .into_iter()
        .enumerate()
        .filter(|(_, id)| doc.has_class(*id, class))
        .map(|(i, _)| i)
        .collect()
}

fn next(page: &mut Page<ManualScheduler>) {
    page.with_carousel(|c, doc, timers| c.next_slide(doc, timers));
}

fn prev(page: &mut Page<ManualScheduler>) {
    page.with_carousel(|c, doc, timers| c.prev_slide(doc, timers));
}

fn go(page: &mut Page<ManualScheduler>, index: usize) {
    page.with_carousel(|c, doc, timers| c.go_to_slide(doc, timers, index));
}

#[test]
fn three_spaced_nexts_cycle_back_to_start() {
    let mut page = page(3);
    let mut seen = Vec::new();
    for _ in 0..3 {
        next(&mut page);
        seen.push(current(&page));
        page.advance(SETTLE);
    }
    assert_eq!(seen, vec![1, 2, 0]);
}

#[test]
fn prev_wraps_to_last_slide() {
    let mut page = page(4);
    prev(&mut page);
    assert_eq!(current(&page), 3);
}

#[test]
fn index_stays_in_range_and_moves_one_step() {
    for n in 1..=5 {
        let mut page = page(n);
        let pattern = [true, true, false, true, false, false, false, true, true, true, true];
        for forward in pattern {
            let before = current(&page);
            if forward {
                next(&mut page);
            } else {
                prev(&mut page);
            }
            let after = current(&page);
            assert!(after < n, "index {after} out of range for {n} slides");
            let expected = if forward {
                (before + 1) % n
            } else {
                (before + n - 1) % n
            };
            assert_eq!(after, expected, "n={n} forward={forward}");
            page.advance(SETTLE);
        }
    }
}

#[test]
fn changes_inside_transition_window_are_dropped() {
    let mut page = page(4);
    go(&mut page, 1);
    assert!(page.carousel().unwrap().is_transitioning());

    go(&mut page, 2);
    next(&mut page);
    prev(&mut page);
    assert_eq!(current(&page), 1);

    page.advance(Duration::from_millis(999));
    go(&mut page, 2);
    assert_eq!(current(&page), 1, "window still open at 999ms");

    page.advance(Duration::from_millis(1));
    assert!(!page.carousel().unwrap().is_transitioning());
    go(&mut page, 2);
    assert_eq!(current(&page), 2);
}

#[test]
fn outgoing_slide_is_marked_exiting_until_transition_ends() {
    let mut page = page(3);
    next(&mut page);
    assert_eq!(marked(&page, ".slide", "active"), vec![1]);
    assert_eq!(marked(&page, ".indicator", "active"), vec![1]);
    assert_eq!(marked(&page, ".slide", "prev"), vec![0]);

    page.advance(SETTLE);
    assert_eq!(marked(&page, ".slide", "active"), vec![1]);
    assert!(marked(&page, ".slide", "prev").is_empty());
}

#[test]
fn aria_attributes_follow_current_slide() {
    let mut page = page(3);
    go(&mut page, 2);
    let doc = page.document();
    let hidden: Vec<_> = doc
        .query_selector_all(".slide")
        .into_iter()
        .map(|id| doc.attribute(id, "aria-hidden").unwrap().to_string())
        .collect();
    let pressed: Vec<_> = doc
        .query_selector_all(".indicator")
        .into_iter()
        .map(|id| doc.attribute(id, "aria-pressed").unwrap().to_string())
        .collect();
    assert_eq!(hidden, vec!["true", "true", "false"]);
    assert_eq!(pressed, vec!["false", "false", "true"]);
}

#[test]
fn same_or_out_of_range_target_is_ignored() {
    let mut page = page(3);
    go(&mut page, 0);
    assert!(!page.carousel().unwrap().is_transitioning());
    go(&mut page, 7);
    assert_eq!(current(&page), 0);
    assert!(!page.carousel().unwrap().is_transitioning());
}

#[test]
fn single_slide_never_transitions() {
    let mut page = page(1);
    next(&mut page);
    prev(&mut page);
    assert_eq!(current(&page), 0);
    assert!(!page.carousel().unwrap().is_transitioning());
}

#[test]
fn buttons_and_indicators_navigate() {
    let mut page = page(4);
    let carousel = page.carousel().unwrap();
    let next_btn = carousel.next_button().unwrap();
    let prev_btn = carousel.prev_button().unwrap();
    let third = carousel.indicators()[2];

    assert_eq!(page.dispatch(InputEvent::Click(next_btn)), Dispatch::DefaultPrevented);
    assert_eq!(current(&page), 1);
    page.advance(SETTLE);

    page.dispatch(InputEvent::Click(prev_btn));
    assert_eq!(current(&page), 0);
    page.advance(SETTLE);

    page.dispatch(InputEvent::Click(third));
    assert_eq!(current(&page), 2);
}

#[test]
fn clicks_elsewhere_pass_through() {
    let mut page = page(3);
    let body = page.document().body();
    assert_eq!(page.dispatch(InputEvent::Click(body)), Dispatch::Passed);
    assert_eq!(current(&page), 0);
}

#[test]
fn indicator_keyboard_activation() {
    let mut page = page(3);
    let indicators = page.carousel().unwrap().indicators().to_vec();
    let doc = page.document();
    assert_eq!(doc.attribute(indicators[1], "tabindex"), Some("0"));
    assert_eq!(doc.attribute(indicators[1], "role"), Some("button"));

    let ignored = page.dispatch(InputEvent::KeyPress {
        target: indicators[1],
        key: Key::Other("a".into()),
    });
    assert_eq!(ignored, Dispatch::Passed);
    assert_eq!(current(&page), 0);

    page.dispatch(InputEvent::KeyPress {
        target: indicators[1],
        key: Key::Enter,
    });
    assert_eq!(current(&page), 1);
    page.advance(SETTLE);

    page.dispatch(InputEvent::KeyPress {
        target: indicators[2],
        key: Key::Space,
    });
    assert_eq!(current(&page), 2);
}

#[test]
fn arrow_keys_navigate_globally() {
    let mut page = page(3);
    assert_eq!(
        page.dispatch(InputEvent::KeyDown(Key::ArrowLeft)),
        Dispatch::DefaultPrevented
    );
    assert_eq!(current(&page), 2);
    page.advance(SETTLE);
    page.dispatch(InputEvent::KeyDown(Key::ArrowRight));
    assert_eq!(current(&page), 0);
    assert_eq!(
        page.dispatch(InputEvent::KeyDown(Key::Other("Tab".into()))),
        Dispatch::Passed
    );
}

fn swipe(page: &mut Page<ManualScheduler>, from: f64, to: f64) {
    let container = page.carousel().unwrap().container().unwrap();
    page.dispatch(InputEvent::TouchStart {
        target: container,
        screen_x: from,
    });
    page.dispatch(InputEvent::TouchEnd {
        target: container,
        screen_x: to,
    });
}

#[test]
fn swipe_threshold_and_direction() {
    let mut page = page(3);
    swipe(&mut page, 100.0, 150.0);
    assert_eq!(current(&page), 0, "a 50px swipe does not navigate");

    swipe(&mut page, 100.0, 151.0);
    assert_eq!(current(&page), 2, "swiping right reveals the previous slide");
    page.advance(SETTLE);

    swipe(&mut page, 300.0, 249.0);
    assert_eq!(current(&page), 0, "swiping left reveals the next slide");
}

#[test]
fn non_finite_touch_coordinates_do_not_navigate() {
    let mut page = page(3);
    swipe(&mut page, f64::NAN, 0.0);
    assert_eq!(current(&page), 0);
    swipe(&mut page, 0.0, f64::NAN);
    assert_eq!(current(&page), 0);
    assert!(!page.carousel().unwrap().is_transitioning());
}

#[test]
fn touches_outside_container_are_ignored() {
    let mut page = page(3);
    let body = page.document().body();
    page.dispatch(InputEvent::TouchStart {
        target: body,
        screen_x: 0.0,
    });
    page.dispatch(InputEvent::TouchEnd {
        target: body,
        screen_x: 400.0,
    });
    assert_eq!(current(&page), 0);
}

#[test]
fn minimal_variant_skips_touch_and_indicator_keys() {
    let cfg = config(3, Variant::Minimal);
    let mut page = Page::bootstrap(&cfg, ManualScheduler::new()).unwrap();
    let indicators = page.carousel().unwrap().indicators().to_vec();
    assert_eq!(page.document().attribute(indicators[0], "tabindex"), None);

    swipe(&mut page, 0.0, 400.0);
    assert_eq!(current(&page), 0);

    page.dispatch(InputEvent::KeyPress {
        target: indicators[2],
        key: Key::Enter,
    });
    assert_eq!(current(&page), 0);

    let next_btn = page.carousel().unwrap().next_button().unwrap();
    assert_eq!(page.dispatch(InputEvent::Click(next_btn)), Dispatch::Passed);
    assert_eq!(current(&page), 1);
}
