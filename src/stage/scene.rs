use serde::Serialize;

use crate::animation::tween::{Channel, Sample, Target};
use crate::config::model::BlendMode;
use crate::effects::mask::{ClipRegion, RevealDirection, mask};
use crate::foundation::core::{ElementId, MotionFrame, MoverId, Rect, Size};
use crate::stage::mover::{MoverContent, MoverPool};

/// Part an element plays in the gallery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementRole {
    /// A thumbnail in the grid.
    GridItem,
    /// The detail overlay.
    Panel,
    /// Text and controls inside the panel.
    PanelContent,
    /// Page furniture faded out while the panel is open.
    Chrome,
}

/// Opaque reference to an element's image content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentRef(pub String);

impl ContentRef {
    /// Reference from anything string-like.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

/// Animatable presentation state shared by elements and movers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Mask reveal progress in `[0, 1]`.
    pub reveal: f64,
    /// Direction the mask reveals toward.
    pub reveal_dir: RevealDirection,
    /// Whether pointer input reaches the element.
    pub interactive: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            scale: 1.0,
            rotation: 0.0,
            reveal: 1.0,
            reveal_dir: RevealDirection::TopBottom,
            interactive: true,
        }
    }
}

impl Style {
    /// Transparent, fully masked and non-interactive.
    pub fn hidden() -> Self {
        Self {
            opacity: 0.0,
            reveal: 0.0,
            interactive: false,
            ..Self::default()
        }
    }

    /// Current clip region derived from the reveal progress.
    pub fn clip(&self) -> ClipRegion {
        mask(self.reveal_dir, self.reveal)
    }

    pub(crate) fn read(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Opacity => self.opacity,
            Channel::Scale => self.scale,
            Channel::Rotation => self.rotation,
            Channel::Reveal => self.reveal,
        }
    }

    pub(crate) fn write(&mut self, channel: Channel, value: f64) {
        match channel {
            Channel::Opacity => self.opacity = value.clamp(0.0, 1.0),
            Channel::Scale => self.scale = value,
            Channel::Rotation => self.rotation = value,
            Channel::Reveal => self.reveal = value.clamp(0.0, 1.0),
        }
    }
}

/// A host element registered in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Role in the gallery.
    pub role: ElementRole,
    /// Bounding rectangle in viewport coordinates, when laid out.
    pub rect: Option<Rect>,
    /// Image content, when the element carries one.
    pub content: Option<ContentRef>,
    /// Presentation state.
    pub style: Style,
    attached: bool,
}

impl Element {
    /// Attached element with no geometry, no content and a visible style.
    pub fn new(role: ElementRole) -> Self {
        Self {
            role,
            rect: None,
            content: None,
            style: Style::default(),
            attached: true,
        }
    }

    /// Set the bounding rectangle.
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    /// Set the content reference.
    pub fn with_content(mut self, content: ContentRef) -> Self {
        self.content = Some(content);
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Whether the element is still in the visual tree.
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// In-memory visual tree the engine animates.
///
/// Elements are registered once and addressed by [`ElementId`]; they are never removed, only
/// detached. Movers live in a separate [`MoverPool`].
#[derive(Debug, Default)]
pub struct Scene {
    viewport: Size,
    elements: Vec<Element>,
    movers: MoverPool,
}

impl Scene {
    /// Empty scene with the given viewport.
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            elements: Vec::new(),
            movers: MoverPool::new(),
        }
    }

    /// Viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Resize the viewport.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Register an element.
    pub fn insert(&mut self, element: Element) -> ElementId {
        self.elements.push(element);
        ElementId((self.elements.len() - 1) as u32)
    }

    /// Element behind `id`, attached or not.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0 as usize)
    }

    /// Ids of attached elements with `role`, in insertion order.
    pub fn ids_with_role(&self, role: ElementRole) -> Vec<ElementId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.attached && e.role == role)
            .map(|(i, _)| ElementId(i as u32))
            .collect()
    }

    /// Whether `id` exists and is attached.
    pub fn is_attached(&self, id: ElementId) -> bool {
        self.element(id).is_some_and(Element::is_attached)
    }

    /// Remove `id` from the visual tree. Returns `false` if it was unknown or already detached.
    pub fn detach(&mut self, id: ElementId) -> bool {
        match self.elements.get_mut(id.0 as usize) {
            Some(e) if e.attached => {
                e.attached = false;
                true
            }
            _ => false,
        }
    }

    /// Rectangle of an attached element. Detached elements have no geometry.
    pub fn rect(&self, id: ElementId) -> Option<Rect> {
        self.element(id).filter(|e| e.attached).and_then(|e| e.rect)
    }

    /// Replace an element's rectangle.
    pub fn set_rect(&mut self, id: ElementId, rect: Option<Rect>) {
        if let Some(e) = self.elements.get_mut(id.0 as usize) {
            e.rect = rect;
        }
    }

    /// Content reference of an element.
    pub fn content(&self, id: ElementId) -> Option<&ContentRef> {
        self.element(id).and_then(|e| e.content.as_ref())
    }

    /// Style of an element.
    pub fn style(&self, id: ElementId) -> Option<&Style> {
        self.element(id).map(|e| &e.style)
    }

    /// Mutable style of an element.
    pub fn style_mut(&mut self, id: ElementId) -> Option<&mut Style> {
        self.elements.get_mut(id.0 as usize).map(|e| &mut e.style)
    }

    /// Live movers.
    pub fn movers(&self) -> &MoverPool {
        &self.movers
    }

    /// Mutable live movers.
    pub fn movers_mut(&mut self) -> &mut MoverPool {
        &mut self.movers
    }

    /// Write one sample. Returns `false` when the target no longer exists.
    pub fn apply(&mut self, sample: &Sample) -> bool {
        let style = match sample.target {
            Target::Element(id) => self.style_mut(id),
            Target::Mover(id) => self.movers.get_mut(id).map(|m| &mut m.style),
        };
        match style {
            Some(style) => {
                style.write(sample.channel, sample.value);
                true
            }
            None => false,
        }
    }

    /// Serializable view of every element and live mover.
    pub fn snapshot(&self) -> SceneSnapshot {
        let elements = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, e)| ElementSnapshot {
                id: ElementId(i as u32),
                role: e.role,
                attached: e.attached,
                frame: e.rect.map(MotionFrame::from),
                opacity: e.style.opacity,
                scale: e.style.scale,
                clip_path: e.style.clip().to_css_polygon(),
                interactive: e.style.interactive,
            })
            .collect();
        let movers = self
            .movers
            .iter()
            .map(|(id, m)| MoverSnapshot {
                id,
                session: m.session,
                content: match &m.content {
                    MoverContent::Image(c) => Some(c.0.clone()),
                    MoverContent::Empty => None,
                },
                frame: m.frame,
                opacity: m.style.opacity,
                scale: m.style.scale,
                rotation: m.style.rotation,
                clip_path: m.style.clip().to_css_polygon(),
                blend_mode: m.blend,
            })
            .collect();
        SceneSnapshot { elements, movers }
    }
}

/// Point-in-time view of a [`Scene`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneSnapshot {
    /// Every registered element.
    pub elements: Vec<ElementSnapshot>,
    /// Live movers.
    pub movers: Vec<MoverSnapshot>,
}

/// Presentation of one element.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub id: ElementId,
    pub role: ElementRole,
    pub attached: bool,
    pub frame: Option<MotionFrame>,
    pub opacity: f64,
    pub scale: f64,
    pub clip_path: String,
    pub interactive: bool,
}

/// Presentation of one mover.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoverSnapshot {
    pub id: MoverId,
    pub session: u64,
    pub content: Option<String>,
    pub frame: MotionFrame,
    pub opacity: f64,
    pub scale: f64,
    pub rotation: f64,
    pub clip_path: String,
    pub blend_mode: Option<BlendMode>,
}

#[cfg(test)]
#[path = "../../tests/unit/stage/scene.rs"]
mod tests;
