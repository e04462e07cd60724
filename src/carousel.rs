//! Slide-rotation controller.
//!
//! Rules:
//! - Exactly one slide and its indicator carry `active`.
//! - A slide change starts a transition window; changes requested inside the
//!   window are dropped, not queued.
//! - At most one auto-advance timer is armed at any time.

use tracing::{debug, info, warn};

use crate::config::{CarouselOptions, Variant};
use crate::document::{Document, ElementId};
use crate::error::Error;
use crate::events::{Dispatch, InputEvent, Key, Timer, TimerFired, TimerId};
use crate::scheduler::Scheduler;

const ACTIVE: &str = "active";
const EXITING: &str = "prev";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Direction a horizontal swipe of `delta` pixels navigates, if it clears
/// `threshold`. Swiping right (positive delta) reveals the previous slide.
/// A NaN delta never clears the threshold.
pub fn swipe_direction(delta: f64, threshold: f64) -> Option<Direction> {
    if delta.is_nan() || delta.abs() <= threshold {
        None
    } else if delta > 0.0 {
        Some(Direction::Prev)
    } else {
        Some(Direction::Next)
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    outgoing: usize,
    timer: TimerId,
}

#[derive(Debug, Clone, Copy, Default)]
struct Swipe {
    start: f64,
    end: f64,
}

#[derive(Debug)]
pub struct Carousel {
    options: CarouselOptions,
    container: Option<ElementId>,
    slides: Vec<ElementId>,
    indicators: Vec<ElementId>,
    prev_button: Option<ElementId>,
    next_button: Option<ElementId>,
    current: usize,
    transition: Option<Transition>,
    auto_advance: Option<TimerId>,
    touch_resume: Option<TimerId>,
    swipe: Swipe,
}

impl Carousel {
    /// Attach to the slider markup in `doc` and arm auto-advance.
    ///
    /// # Errors
    /// [`Error::MissingSlides`] when the document has no slides and
    /// [`Error::IndicatorMismatch`] when indicators do not pair up with them.
    /// The document is left untouched in both cases.
    pub fn mount(
        doc: &mut Document,
        timers: &mut dyn Scheduler,
        options: CarouselOptions,
    ) -> Result<Self, Error> {
        let slides = doc.query_selector_all(".slide");
        let indicators = doc.query_selector_all(".indicator");
        if slides.is_empty() {
            return Err(Error::MissingSlides);
        }
        if indicators.len() != slides.len() {
            return Err(Error::IndicatorMismatch {
                slides: slides.len(),
                indicators: indicators.len(),
            });
        }

        let mut carousel = Self {
            container: doc.query_selector(".slider-container"),
            prev_button: doc.query_selector(".nav-btn.prev"),
            next_button: doc.query_selector(".nav-btn.next"),
            slides,
            indicators,
            options,
            current: 0,
            transition: None,
            auto_advance: None,
            touch_resume: None,
            swipe: Swipe::default(),
        };

        if carousel.container.is_none() {
            debug!("no slider container; touch and hover input disabled");
        }
        if carousel.options.variant.is_hardened() {
            for &indicator in &carousel.indicators {
                doc.set_attribute(indicator, "tabindex", "0");
                doc.set_attribute(indicator, "role", "button");
            }
        }
        for (index, (&slide, &indicator)) in
            carousel.slides.iter().zip(&carousel.indicators).enumerate()
        {
            doc.remove_class(slide, EXITING);
            if index == 0 {
                doc.add_class(slide, ACTIVE);
                doc.add_class(indicator, ACTIVE);
            } else {
                doc.remove_class(slide, ACTIVE);
                doc.remove_class(indicator, ACTIVE);
            }
        }

        carousel.start_auto_slide(doc, timers);
        carousel.update_slide_states(doc);
        info!(
            slides = carousel.len(),
            variant = ?carousel.options.variant,
            "carousel mounted"
        );
        Ok(carousel)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn is_auto_advancing(&self) -> bool {
        self.auto_advance.is_some()
    }

    pub fn options(&self) -> &CarouselOptions {
        &self.options
    }

    pub fn container(&self) -> Option<ElementId> {
        self.container
    }

    pub fn slides(&self) -> &[ElementId] {
        &self.slides
    }

    pub fn indicators(&self) -> &[ElementId] {
        &self.indicators
    }

    pub fn prev_button(&self) -> Option<ElementId> {
        self.prev_button
    }

    pub fn next_button(&self) -> Option<ElementId> {
        self.next_button
    }

    pub fn go_to_slide(&mut self, doc: &mut Document, timers: &mut dyn Scheduler, index: usize) {
        if self.is_transitioning() || index == self.current {
            return;
        }
        if index >= self.len() {
            warn!(index, slides = self.len(), "ignoring slide index out of range");
            return;
        }

        let outgoing = self.current;
        if let Some(&slide) = self.slides.get(outgoing) {
            doc.remove_class(slide, ACTIVE);
            doc.add_class(slide, EXITING);
        }
        if let Some(&indicator) = self.indicators.get(outgoing) {
            doc.remove_class(indicator, ACTIVE);
        }

        self.current = index;
        if let Some(&slide) = self.slides.get(index) {
            doc.add_class(slide, ACTIVE);
        }
        if let Some(&indicator) = self.indicators.get(index) {
            doc.add_class(indicator, ACTIVE);
        }

        let timer = timers.schedule_once(Timer::TransitionEnd { outgoing }, self.options.transition);
        self.transition = Some(Transition { outgoing, timer });
        debug!(from = outgoing, to = index, "slide change");

        self.update_slide_states(doc);
    }

    pub fn next_slide(&mut self, doc: &mut Document, timers: &mut dyn Scheduler) {
        if self.is_transitioning() || self.is_empty() {
            return;
        }
        let target = (self.current + 1) % self.len();
        self.go_to_slide(doc, timers, target);
    }

    pub fn prev_slide(&mut self, doc: &mut Document, timers: &mut dyn Scheduler) {
        if self.is_transitioning() || self.is_empty() {
            return;
        }
        let target = (self.current + self.len() - 1) % self.len();
        self.go_to_slide(doc, timers, target);
    }

    /// Navigate according to the most recent touch start/end pair.
    pub fn handle_swipe(&mut self, doc: &mut Document, timers: &mut dyn Scheduler) {
        let delta = self.swipe.end - self.swipe.start;
        match swipe_direction(delta, self.options.swipe_threshold_px) {
            Some(Direction::Prev) => self.prev_slide(doc, timers),
            Some(Direction::Next) => self.next_slide(doc, timers),
            None => debug!(delta, "swipe below threshold"),
        }
    }

    pub fn start_auto_slide(&mut self, doc: &Document, timers: &mut dyn Scheduler) {
        if doc.prefers_reduced_motion() {
            debug!("reduced motion preferred; auto-advance stays off");
            return;
        }
        self.stop_auto_slide(timers);
        let id = timers.schedule_repeating(Timer::AutoAdvance, self.options.auto_advance_interval);
        self.auto_advance = Some(id);
        debug!(
            interval_ms = self.options.auto_advance_interval.as_millis() as u64,
            "auto-advance armed"
        );
    }

    pub fn stop_auto_slide(&mut self, timers: &mut dyn Scheduler) {
        if let Some(id) = self.auto_advance.take() {
            timers.cancel(id);
            debug!("auto-advance disarmed");
        }
    }

    /// Cancel every timer the carousel owns and settle any transition in flight.
    pub fn destroy(&mut self, doc: &mut Document, timers: &mut dyn Scheduler) {
        self.stop_auto_slide(timers);
        if let Some(id) = self.touch_resume.take() {
            timers.cancel(id);
        }
        if let Some(transition) = self.transition.take() {
            timers.cancel(transition.timer);
            if let Some(&slide) = self.slides.get(transition.outgoing) {
                doc.remove_class(slide, EXITING);
            }
        }
        info!("carousel destroyed");
    }

    /// React to a platform signal. Events the carousel has no use for pass
    /// through untouched.
    pub fn handle_event(
        &mut self,
        doc: &mut Document,
        timers: &mut dyn Scheduler,
        event: &InputEvent,
    ) -> Dispatch {
        let hardened = self.options.variant.is_hardened();
        match event {
            InputEvent::Click(target) => {
                if self.next_button.is_some_and(|b| doc.contains(b, *target)) {
                    self.next_slide(doc, timers);
                } else if self.prev_button.is_some_and(|b| doc.contains(b, *target)) {
                    self.prev_slide(doc, timers);
                } else if let Some(index) = self.indicator_at(doc, *target) {
                    self.go_to_slide(doc, timers, index);
                } else {
                    return Dispatch::Passed;
                }
                self.handled()
            }
            InputEvent::KeyPress { target, key } if hardened => {
                if !matches!(key, Key::Enter | Key::Space) {
                    return Dispatch::Passed;
                }
                match self.indicator_at(doc, *target) {
                    Some(index) => {
                        self.go_to_slide(doc, timers, index);
                        self.handled()
                    }
                    None => Dispatch::Passed,
                }
            }
            InputEvent::KeyDown(Key::ArrowLeft) => {
                self.prev_slide(doc, timers);
                self.handled()
            }
            InputEvent::KeyDown(Key::ArrowRight) => {
                self.next_slide(doc, timers);
                self.handled()
            }
            InputEvent::TouchStart { target, screen_x } if hardened => {
                if self.within_container(doc, *target) {
                    self.swipe.start = *screen_x;
                    self.stop_auto_slide(timers);
                    if let Some(id) = self.touch_resume.take() {
                        timers.cancel(id);
                    }
                }
                Dispatch::Passed
            }
            InputEvent::TouchEnd { target, screen_x } if hardened => {
                if self.within_container(doc, *target) {
                    self.swipe.end = *screen_x;
                    self.handle_swipe(doc, timers);
                    if let Some(id) = self.touch_resume.take() {
                        timers.cancel(id);
                    }
                    self.touch_resume =
                        Some(timers.schedule_once(Timer::TouchResume, self.options.touch_resume_delay));
                }
                Dispatch::Passed
            }
            InputEvent::MouseEnter(target) => {
                if self.within_container(doc, *target) {
                    self.stop_auto_slide(timers);
                }
                Dispatch::Passed
            }
            InputEvent::MouseLeave(target) => {
                if self.within_container(doc, *target) {
                    self.start_auto_slide(doc, timers);
                }
                Dispatch::Passed
            }
            InputEvent::VisibilityChange { hidden } if hardened => {
                if *hidden {
                    self.stop_auto_slide(timers);
                } else {
                    self.start_auto_slide(doc, timers);
                }
                Dispatch::Passed
            }
            _ => Dispatch::Passed,
        }
    }

    /// Route a fired timer. Returns `false` for timers the carousel does not
    /// own or no longer tracks.
    pub fn on_timer(
        &mut self,
        doc: &mut Document,
        timers: &mut dyn Scheduler,
        fired: TimerFired,
    ) -> bool {
        match fired.timer {
            Timer::AutoAdvance if self.auto_advance == Some(fired.id) => {
                self.next_slide(doc, timers);
                true
            }
            Timer::TransitionEnd { outgoing }
                if self.transition.is_some_and(|t| t.timer == fired.id) =>
            {
                if let Some(&slide) = self.slides.get(outgoing) {
                    doc.remove_class(slide, EXITING);
                }
                self.transition = None;
                true
            }
            Timer::TouchResume if self.touch_resume == Some(fired.id) => {
                self.touch_resume = None;
                if self.auto_advance.is_none() {
                    self.start_auto_slide(doc, timers);
                }
                true
            }
            _ => false,
        }
    }

    fn handled(&self) -> Dispatch {
        match self.options.variant {
            Variant::Hardened => Dispatch::DefaultPrevented,
            Variant::Minimal => Dispatch::Passed,
        }
    }

    fn indicator_at(&self, doc: &Document, target: ElementId) -> Option<usize> {
        self.indicators
            .iter()
            .position(|&indicator| doc.contains(indicator, target))
    }

    fn within_container(&self, doc: &Document, target: ElementId) -> bool {
        self.container.is_some_and(|c| doc.contains(c, target))
    }

    fn update_slide_states(&self, doc: &mut Document) {
        for (index, &slide) in self.slides.iter().enumerate() {
            let hidden = if index == self.current { "false" } else { "true" };
            doc.set_attribute(slide, "aria-hidden", hidden);
        }
        for (index, &indicator) in self.indicators.iter().enumerate() {
            let pressed = if index == self.current { "true" } else { "false" };
            doc.set_attribute(indicator, "aria-pressed", pressed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swipe_threshold_is_exclusive() {
        assert_eq!(swipe_direction(50.0, 50.0), None);
        assert_eq!(swipe_direction(-50.0, 50.0), None);
        assert_eq!(swipe_direction(51.0, 50.0), Some(Direction::Prev));
        assert_eq!(swipe_direction(-51.0, 50.0), Some(Direction::Next));
        assert_eq!(swipe_direction(0.0, 0.0), None);
    }

    #[test]
    fn nan_swipe_goes_nowhere() {
        assert_eq!(swipe_direction(f64::NAN, 50.0), None);
        assert_eq!(swipe_direction(-f64::NAN, 0.0), None);
    }
}
