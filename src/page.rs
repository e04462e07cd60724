//! Lifecycle owner of one slider page: the document, the timer capability,
//! the mounted carousel and page-level handles such as the resize debounce.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info, trace, warn};

use crate::carousel::Carousel;
use crate::command::Command;
use crate::config::{Configuration, PageOptions, SlideSource};
use crate::document::Document;
use crate::events::{
    Dispatch, ImageProbed, ImageStatus, InputEvent, Key, ProbeImage, Timer, TimerFired, TimerId,
};
use crate::scan;
use crate::scheduler::{ManualScheduler, Scheduler};

/// Snapshot of the widget for logs and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub current: Option<usize>,
    pub slides: usize,
    pub transitioning: bool,
    pub auto_advancing: bool,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current {
            Some(current) => write!(
                f,
                "slide {}/{} (transitioning: {}, auto-advance: {})",
                current + 1,
                self.slides,
                self.transitioning,
                self.auto_advancing
            ),
            None => f.write_str("carousel not mounted"),
        }
    }
}

/// Gather the configured slides: explicit entries first, then anything found
/// under `slides-dir`.
pub fn collect_slides(options: &PageOptions) -> Result<Vec<SlideSource>> {
    let mut slides = options.slides.clone();
    if let Some(dir) = options.slides_dir.as_deref() {
        let found = scan::discover_slides(dir)
            .with_context(|| format!("failed to scan slides in {}", dir.display()))?;
        info!(dir = %dir.display(), discovered = found.len(), "slide directory scanned");
        slides.extend(
            found
                .into_iter()
                .filter(|path| !options.slides.iter().any(|s| &s.image == path))
                .map(|image| SlideSource {
                    image,
                    caption: None,
                }),
        );
    }
    Ok(slides)
}

pub struct Page<S: Scheduler> {
    options: PageOptions,
    document: Document,
    scheduler: S,
    carousel: Option<Carousel>,
    resize_timer: Option<TimerId>,
}

impl<S: Scheduler> Page<S> {
    /// Build the slider markup from configuration and mount the carousel.
    ///
    /// Only an invalid configuration is an error. A slide directory that
    /// cannot be scanned leaves the listed slides in place, and a carousel
    /// that refuses to mount leaves the page running without it.
    pub fn bootstrap(cfg: &Configuration, scheduler: S) -> Result<Self> {
        let cfg = cfg.clone().validated()?;
        let slides = collect_slides(&cfg.page).unwrap_or_else(|err| {
            warn!("slide discovery failed, showing listed slides only: {err:#}");
            cfg.page.slides.clone()
        });
        let document = Document::slider(&slides, cfg.page.nav_buttons);
        Ok(Self::mount(&cfg, document, scheduler))
    }

    /// Mount onto an existing document.
    pub fn mount(cfg: &Configuration, mut document: Document, mut scheduler: S) -> Self {
        if cfg.page.prefers_reduced_motion {
            document.set_prefers_reduced_motion(true);
        }
        let carousel = match Carousel::mount(&mut document, &mut scheduler, cfg.carousel.clone())
        {
            Ok(carousel) => Some(carousel),
            Err(err) => {
                warn!("carousel not mounted: {err}");
                None
            }
        };
        Self {
            options: cfg.page.clone(),
            document,
            scheduler,
            carousel,
            resize_timer: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn carousel(&self) -> Option<&Carousel> {
        self.carousel.as_ref()
    }

    /// Run `f` against the mounted carousel with access to the document and
    /// timers it drives. `None` when no carousel is mounted.
    pub fn with_carousel<R>(
        &mut self,
        f: impl FnOnce(&mut Carousel, &mut Document, &mut dyn Scheduler) -> R,
    ) -> Option<R> {
        let carousel = self.carousel.as_mut()?;
        let timers: &mut dyn Scheduler = &mut self.scheduler;
        Some(f(carousel, &mut self.document, timers))
    }

    pub fn status(&self) -> Status {
        match &self.carousel {
            Some(c) => Status {
                current: Some(c.current_index()),
                slides: c.len(),
                transitioning: c.is_transitioning(),
                auto_advancing: c.is_auto_advancing(),
            },
            None => Status {
                current: None,
                slides: self.document.query_selector_all(".slide").len(),
                transitioning: false,
                auto_advancing: false,
            },
        }
    }

    pub fn dispatch(&mut self, event: InputEvent) -> Dispatch {
        trace!(?event, "dispatch");
        match &event {
            InputEvent::VisibilityChange { hidden } => self.document.set_hidden(*hidden),
            InputEvent::Resize => {
                if let Some(id) = self.resize_timer.take() {
                    self.scheduler.cancel(id);
                }
                let id = self
                    .scheduler
                    .schedule_once(Timer::ResizeSettled, self.options.resize_debounce);
                self.resize_timer = Some(id);
                return Dispatch::Passed;
            }
            InputEvent::Error { filename, message } => {
                if filename
                    .as_deref()
                    .is_some_and(|f| f.contains(&self.options.error_source))
                {
                    error!(filename = filename.as_deref(), "slider error: {message}");
                }
                return Dispatch::Passed;
            }
            _ => {}
        }
        match self.carousel.as_mut() {
            Some(carousel) => carousel.handle_event(&mut self.document, &mut self.scheduler, &event),
            None => Dispatch::Passed,
        }
    }

    pub fn on_timer(&mut self, fired: TimerFired) {
        if fired.timer == Timer::ResizeSettled {
            if self.resize_timer != Some(fired.id) {
                return;
            }
            self.resize_timer = None;
            if let Some(container) = self.document.query_selector(".slider-container") {
                self.document.force_reflow(container);
                debug!("slider container reflowed after resize");
            }
            return;
        }
        let handled = self
            .carousel
            .as_mut()
            .is_some_and(|c| c.on_timer(&mut self.document, &mut self.scheduler, fired));
        if !handled {
            trace!(id = fired.id.0, timer = ?fired.timer, "stale timer ignored");
        }
    }

    /// Background images to probe, one per slide that has one.
    pub fn probe_requests(&self) -> Vec<ProbeImage> {
        self.document
            .query_selector_all(".slide")
            .into_iter()
            .enumerate()
            .filter_map(|(slide, id)| {
                let url = self.document.background_image(id)?;
                Some(ProbeImage {
                    slide,
                    path: PathBuf::from(url),
                })
            })
            .collect()
    }

    /// Mark a slide with the outcome of loading its background image.
    pub fn apply_image_status(&mut self, probed: &ImageProbed) {
        let Some(slide) = self
            .document
            .query_selector_all(".slide")
            .get(probed.slide)
            .copied()
        else {
            warn!(slide = probed.slide, "image probe for unknown slide");
            return;
        };
        match &probed.status {
            ImageStatus::Loaded { width, height } => {
                self.document.add_class(slide, "image-loaded");
                debug!(path = %probed.path.display(), width, height, "slide image loaded");
            }
            ImageStatus::Failed(reason) => {
                self.document.add_class(slide, "image-error");
                warn!(path = %probed.path.display(), "failed to load slide image: {reason}");
            }
        }
    }

    /// Input events a user would produce to carry out `command`.
    pub fn synthesize(&self, command: &Command) -> Vec<InputEvent> {
        let doc = &self.document;
        let container = doc.query_selector(".slider-container");
        let indicator = |index: usize| doc.query_selector_all(".indicator").get(index).copied();
        match command {
            Command::Next => vec![match doc.query_selector(".nav-btn.next") {
                Some(button) => InputEvent::Click(button),
                None => InputEvent::KeyDown(Key::ArrowRight),
            }],
            Command::Prev => vec![match doc.query_selector(".nav-btn.prev") {
                Some(button) => InputEvent::Click(button),
                None => InputEvent::KeyDown(Key::ArrowLeft),
            }],
            Command::Go(index) => indicator(*index).map(InputEvent::Click).into_iter().collect(),
            Command::Activate(index) => indicator(*index)
                .map(|target| InputEvent::KeyPress {
                    target,
                    key: Key::Enter,
                })
                .into_iter()
                .collect(),
            Command::Key(key) => vec![InputEvent::KeyDown(key.clone())],
            Command::Swipe { from, to } => container
                .map(|target| {
                    vec![
                        InputEvent::TouchStart {
                            target,
                            screen_x: *from,
                        },
                        InputEvent::TouchEnd {
                            target,
                            screen_x: *to,
                        },
                    ]
                })
                .unwrap_or_default(),
            Command::Hover => container.map(InputEvent::MouseEnter).into_iter().collect(),
            Command::Leave => container.map(InputEvent::MouseLeave).into_iter().collect(),
            Command::Hide => vec![InputEvent::VisibilityChange { hidden: true }],
            Command::Show => vec![InputEvent::VisibilityChange { hidden: false }],
            Command::Resize => vec![InputEvent::Resize],
            Command::Fail { filename, message } => vec![InputEvent::Error {
                filename: Some(filename.clone()),
                message: message.clone(),
            }],
            Command::Status | Command::Quit => Vec::new(),
        }
    }

    /// Carry out `command` by dispatching the events it stands for.
    pub fn perform(&mut self, command: &Command) {
        for event in self.synthesize(command) {
            self.dispatch(event);
        }
    }

    /// Cancel every timer the page and its carousel own.
    pub fn teardown(&mut self) {
        if let Some(id) = self.resize_timer.take() {
            self.scheduler.cancel(id);
        }
        if let Some(carousel) = self.carousel.as_mut() {
            carousel.destroy(&mut self.document, &mut self.scheduler);
        }
        info!("page torn down");
    }
}

impl Page<ManualScheduler> {
    /// Move the virtual clock forward by `by`, delivering every timer that
    /// comes due on the way, including ones armed by earlier deliveries.
    pub fn advance(&mut self, by: Duration) {
        let until = self.scheduler.now() + by;
        while let Some(fired) = self.scheduler.fire_next(until) {
            self.on_timer(fired);
        }
        self.scheduler.settle(until);
    }
}
