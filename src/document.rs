//! In-memory document surface the carousel reads and writes.
//!
//! Elements live in an arena and are addressed by [`ElementId`]. Every lookup
//! that can miss returns an `Option` or a `bool` so callers decide what an
//! absent node means for them.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::SlideSource;

/// Handle to an element owned by a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: Option<String>,
    reflows: u32,
}

impl Element {
    fn new(tag: &str, parent: Option<ElementId>) -> Self {
        Self {
            tag: tag.to_string(),
            parent,
            ..Self::default()
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Number of forced layout passes this element went through.
    pub fn reflows(&self) -> u32 {
        self.reflows
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    hidden: bool,
    prefers_reduced_motion: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document holding only a `body` element.
    pub fn new() -> Self {
        Self {
            elements: vec![Element::new("body", None)],
            hidden: false,
            prefers_reduced_motion: false,
        }
    }

    pub fn body(&self) -> ElementId {
        ElementId(0)
    }

    /// Build the slider markup: a container holding one slide per source,
    /// optional previous/next buttons and one indicator per slide. The first
    /// slide and indicator start out active.
    pub fn slider(slides: &[SlideSource], nav_buttons: bool) -> Self {
        let mut doc = Self::new();
        let container = doc.append(doc.body(), "div");
        doc.add_class(container, "slider-container");

        for (index, source) in slides.iter().enumerate() {
            let slide = doc.append(container, "div");
            doc.add_class(slide, "slide");
            if index == 0 {
                doc.add_class(slide, "active");
            }
            doc.set_style(slide, "background-image", &css_url(&source.image));
            if let Some(caption) = source.caption.as_deref() {
                let label = doc.append(slide, "div");
                doc.add_class(label, "slide-caption");
                doc.set_text(label, caption);
            }
        }

        if nav_buttons {
            for (class, label) in [("prev", "Previous slide"), ("next", "Next slide")] {
                let button = doc.append(container, "button");
                doc.add_class(button, "nav-btn");
                doc.add_class(button, class);
                doc.set_attribute(button, "aria-label", label);
            }
        }

        let strip = doc.append(container, "div");
        doc.add_class(strip, "slider-indicators");
        for index in 0..slides.len() {
            let indicator = doc.append(strip, "span");
            doc.add_class(indicator, "indicator");
            if index == 0 {
                doc.add_class(indicator, "active");
            }
            doc.set_attribute(indicator, "aria-label", &format!("Go to slide {}", index + 1));
        }

        doc
    }

    /// Create a new element as the last child of `parent`.
    ///
    /// An unknown `parent` leaves the element detached.
    pub fn append(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let id = ElementId(self.elements.len());
        let parent = self.elements.get_mut(parent.0).map(|p| {
            p.children.push(id);
            parent
        });
        self.elements.push(Element::new(tag, parent));
        id
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0)
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    /// Returns `false` when the element does not exist.
    pub fn add_class(&mut self, id: ElementId, class: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        if !el.has_class(class) {
            el.classes.push(class.to_string());
        }
        true
    }

    /// Returns `false` when the element does not exist.
    pub fn remove_class(&mut self, id: ElementId, class: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        el.classes.retain(|c| c != class);
        true
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attribute(name))
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        el.attributes.insert(name.to_string(), value.to_string());
        true
    }

    pub fn style(&self, id: ElementId, property: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.style(property))
    }

    pub fn set_style(&mut self, id: ElementId, property: &str, value: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        if value.is_empty() {
            el.styles.remove(property);
        } else {
            el.styles.insert(property.to_string(), value.to_string());
        }
        true
    }

    pub fn set_text(&mut self, id: ElementId, text: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        el.text = Some(text.to_string());
        true
    }

    /// Hide the element, force a layout pass and restore its display value.
    pub fn force_reflow(&mut self, id: ElementId) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        let display = el.styles.insert("display".to_string(), "none".to_string());
        el.reflows += 1;
        match display {
            Some(previous) => el.styles.insert("display".to_string(), previous),
            None => el.styles.remove("display"),
        };
        true
    }

    /// All elements matching a compound class selector such as `.nav-btn.prev`,
    /// in document order.
    pub fn query_selector_all(&self, selector: &str) -> Vec<ElementId> {
        let classes: Vec<&str> = selector.split('.').filter(|c| !c.is_empty()).collect();
        if classes.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut stack = vec![self.body()];
        while let Some(id) = stack.pop() {
            let Some(el) = self.element(id) else {
                continue;
            };
            if classes.iter().all(|c| el.has_class(c)) {
                out.push(id);
            }
            stack.extend(el.children.iter().rev().copied());
        }
        out
    }

    pub fn query_selector(&self, selector: &str) -> Option<ElementId> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// `true` if `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.element(id).and_then(Element::parent);
        }
        false
    }

    /// Resolved URL of the element's `background-image`, if any.
    pub fn background_image(&self, id: ElementId) -> Option<String> {
        self.style(id, "background-image").and_then(parse_css_url)
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn prefers_reduced_motion(&self) -> bool {
        self.prefers_reduced_motion
    }

    pub fn set_prefers_reduced_motion(&mut self, reduce: bool) {
        self.prefers_reduced_motion = reduce;
    }
}

fn css_url(path: &Path) -> String {
    format!("url(\"{}\")", path.display())
}

/// Extract the target of a `url(...)` value; `none` and empty URLs yield `None`.
pub fn parse_css_url(value: &str) -> Option<String> {
    let inner = value.trim().strip_prefix("url(")?.strip_suffix(')')?.trim();
    let inner = inner
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(inner);
    if inner.is_empty() || inner == "none" {
        None
    } else {
        Some(inner.to_string())
    }
}
