use super::*;
use crate::foundation::core::rect_ltwh;
use crate::stage::mover::Mover;

fn scene() -> (Scene, ElementId, ElementId) {
    let mut scene = Scene::new(Size::new(1000.0, 800.0));
    let item = scene.insert(
        Element::new(ElementRole::GridItem)
            .with_rect(rect_ltwh(10.0, 10.0, 100.0, 100.0))
            .with_content(ContentRef::new("img/1.jpg")),
    );
    let panel = scene.insert(Element::new(ElementRole::Panel).with_style(Style::hidden()));
    (scene, item, panel)
}

#[test]
fn hidden_style_is_fully_masked() {
    let s = Style::hidden();
    assert_eq!(s.opacity, 0.0);
    assert!(!s.interactive);
    assert_eq!(s.clip().visible_area(), 0.0);
    assert_eq!(Style::default().clip(), ClipRegion::FULL);
}

#[test]
fn writes_clamp_bounded_channels() {
    let mut s = Style::default();
    s.write(Channel::Opacity, 1.7);
    s.write(Channel::Reveal, -0.2);
    s.write(Channel::Scale, 1.2);
    assert_eq!(s.opacity, 1.0);
    assert_eq!(s.reveal, 0.0);
    assert_eq!(s.scale, 1.2);
}

#[test]
fn detached_elements_lose_geometry() {
    let (mut scene, item, _) = scene();
    assert!(scene.rect(item).is_some());
    assert!(scene.detach(item));
    assert!(!scene.detach(item));
    assert!(!scene.is_attached(item));
    assert_eq!(scene.rect(item), None);
    assert!(scene.ids_with_role(ElementRole::GridItem).is_empty());
}

#[test]
fn apply_routes_to_elements_and_movers() {
    let (mut scene, item, panel) = scene();
    assert!(scene.apply(&Sample {
        target: Target::Element(panel),
        channel: Channel::Opacity,
        value: 0.5,
    }));
    assert_eq!(scene.style(panel).unwrap().opacity, 0.5);

    let frame = MotionFrame::from(scene.rect(item).unwrap());
    let id = scene.movers_mut().acquire(Mover {
        session: 1,
        content: MoverContent::Empty,
        frame,
        style: Style::hidden(),
        blend: None,
    });
    assert!(scene.apply(&Sample {
        target: Target::Mover(id),
        channel: Channel::Reveal,
        value: 0.25,
    }));
    assert_eq!(scene.movers().get(id).unwrap().style.reveal, 0.25);

    scene.movers_mut().release(id);
    assert!(!scene.apply(&Sample {
        target: Target::Mover(id),
        channel: Channel::Reveal,
        value: 1.0,
    }));
    assert!(!scene.apply(&Sample {
        target: Target::Element(ElementId(99)),
        channel: Channel::Opacity,
        value: 1.0,
    }));
}

#[test]
fn snapshot_serializes_clip_paths() {
    let (mut scene, _, panel) = scene();
    scene.style_mut(panel).unwrap().reveal = 0.5;
    let snap = scene.snapshot();
    assert_eq!(snap.elements.len(), 2);
    assert_eq!(snap.movers.len(), 0);
    assert_eq!(
        snap.elements[1].clip_path,
        "polygon(0% 0%, 100% 0%, 100% 50%, 0% 50%)"
    );

    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["elements"][0]["role"], "grid-item");
    assert_eq!(json["elements"][0]["frame"]["width"], 100.0);
    assert_eq!(json["elements"][1]["clipPath"], snap.elements[1].clip_path);
}

#[test]
fn viewport_can_be_resized() {
    let (mut scene, _, _) = scene();
    assert_eq!(scene.viewport(), Size::new(1000.0, 800.0));
    scene.set_viewport(Size::new(640.0, 480.0));
    assert_eq!(scene.viewport(), Size::new(640.0, 480.0));
}
