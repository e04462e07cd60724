use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Which flavor of the widget gets mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Transition gate, touch, visibility pause, reduced motion, keyboard indicators.
    #[default]
    Hardened,
    /// Buttons, indicator clicks, hover pause, arrow keys and auto-advance only.
    Minimal,
}

impl Variant {
    pub fn is_hardened(self) -> bool {
        matches!(self, Self::Hardened)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CarouselOptions {
    pub variant: Variant,
    /// Length of the exit animation; new slide changes are ignored meanwhile.
    #[serde(with = "humantime_serde")]
    pub transition: Duration,
    /// Period of the recurring auto-advance timer.
    #[serde(with = "humantime_serde")]
    pub auto_advance_interval: Duration,
    /// Idle time after a touch ends before auto-advance resumes.
    #[serde(with = "humantime_serde")]
    pub touch_resume_delay: Duration,
    /// Horizontal travel a swipe must exceed to navigate.
    pub swipe_threshold_px: f64,
}

impl CarouselOptions {
    const fn default_transition() -> Duration {
        Duration::from_millis(1000)
    }

    const fn default_auto_advance_interval() -> Duration {
        Duration::from_millis(6000)
    }

    const fn default_touch_resume_delay() -> Duration {
        Duration::from_millis(3000)
    }

    const fn default_swipe_threshold_px() -> f64 {
        50.0
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            !self.transition.is_zero(),
            "carousel.transition must be greater than zero"
        );
        ensure!(
            !self.auto_advance_interval.is_zero(),
            "carousel.auto-advance-interval must be greater than zero"
        );
        ensure!(
            !self.touch_resume_delay.is_zero(),
            "carousel.touch-resume-delay must be greater than zero"
        );
        ensure!(
            self.swipe_threshold_px.is_finite() && self.swipe_threshold_px >= 0.0,
            "carousel.swipe-threshold-px must be a non-negative number"
        );
        Ok(())
    }
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            transition: Self::default_transition(),
            auto_advance_interval: Self::default_auto_advance_interval(),
            touch_resume_delay: Self::default_touch_resume_delay(),
            swipe_threshold_px: Self::default_swipe_threshold_px(),
        }
    }
}

/// One explicitly listed slide.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SlideSource {
    /// Background image shown by the slide.
    pub image: PathBuf,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PageOptions {
    /// Slides listed in display order.
    pub slides: Vec<SlideSource>,
    /// Directory scanned recursively for additional slides, appended after `slides`.
    pub slides_dir: Option<PathBuf>,
    /// Whether the markup carries previous/next buttons.
    pub nav_buttons: bool,
    /// Quiet period after the last resize before the container reflows.
    #[serde(with = "humantime_serde")]
    pub resize_debounce: Duration,
    /// Platform reduced-motion preference as reported to the widget.
    pub prefers_reduced_motion: bool,
    /// Window errors are logged only when their filename contains this.
    pub error_source: String,
    /// Maximum number of slide images probed at once.
    pub image_probe_concurrency: usize,
}

impl PageOptions {
    const fn default_resize_debounce() -> Duration {
        Duration::from_millis(250)
    }

    fn default_error_source() -> String {
        "script.js".to_string()
    }

    const fn default_image_probe_concurrency() -> usize {
        4
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            !self.resize_debounce.is_zero(),
            "page.resize-debounce must be greater than zero"
        );
        ensure!(
            !self.error_source.trim().is_empty(),
            "page.error-source must not be empty"
        );
        ensure!(
            self.image_probe_concurrency > 0,
            "page.image-probe-concurrency must be greater than zero"
        );
        Ok(())
    }

    fn rebase(&mut self, base: &Path) {
        for slide in &mut self.slides {
            if slide.image.is_relative() {
                slide.image = base.join(&slide.image);
            }
        }
        if let Some(dir) = self.slides_dir.as_mut()
            && dir.is_relative()
        {
            *dir = base.join(&*dir);
        }
    }
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            slides: Vec::new(),
            slides_dir: None,
            nav_buttons: true,
            resize_debounce: Self::default_resize_debounce(),
            prefers_reduced_motion: false,
            error_source: Self::default_error_source(),
            image_probe_concurrency: Self::default_image_probe_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Timing and behavior of the slide controller.
    pub carousel: CarouselOptions,
    /// Markup and host-page settings.
    pub page: PageOptions,
}

impl Configuration {
    /// Load a configuration file. Relative slide paths are resolved against
    /// the directory holding the file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut cfg: Self = serde_yaml::from_str(&s)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        if let Some(base) = path.parent() {
            cfg.page.rebase(base);
        }
        Ok(cfg)
    }

    /// Reject values serde accepts but the carousel cannot run with.
    pub fn validated(self) -> Result<Self> {
        self.carousel
            .validate()
            .context("invalid carousel configuration")?;
        self.page.validate().context("invalid page configuration")?;
        Ok(self)
    }
}
