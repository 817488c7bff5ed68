use super::*;
use crate::foundation::core::{Size, rect_ltwh};
use crate::stage::scene::{ContentRef, Element};

struct Fixture {
    scene: Scene,
    req: ForwardRequest,
}

fn fixture() -> Fixture {
    let mut scene = Scene::new(Size::new(1000.0, 800.0));
    let mut items = Vec::new();
    for row in 0..2 {
        for col in 0..3 {
            let n = items.len();
            items.push(
                scene.insert(
                    Element::new(ElementRole::GridItem)
                        .with_rect(rect_ltwh(
                            20.0 + f64::from(col) * 150.0,
                            100.0 + f64::from(row) * 150.0,
                            120.0,
                            120.0,
                        ))
                        .with_content(ContentRef::new(format!("img/{n}.jpg"))),
                ),
            );
        }
    }
    scene.insert(Element::new(ElementRole::Chrome).with_rect(rect_ltwh(20.0, 20.0, 400.0, 40.0)));
    scene.insert(
        Element::new(ElementRole::Panel)
            .with_rect(rect_ltwh(500.0, 0.0, 500.0, 800.0))
            .with_style(Style::hidden()),
    );
    scene.insert(
        Element::new(ElementRole::PanelContent)
            .with_rect(rect_ltwh(520.0, 600.0, 460.0, 180.0))
            .with_style(Style::hidden()),
    );
    let req = ForwardRequest::from_roles(&scene, items[0]).unwrap();
    Fixture { scene, req }
}

fn second_panel(scene: &mut Scene) -> ElementId {
    scene.insert(
        Element::new(ElementRole::Panel)
            .with_rect(rect_ltwh(500.0, 0.0, 500.0, 800.0))
            .with_style(Style::hidden()),
    )
}

fn assert_grid_visible(scene: &Scene, items: &[ElementId]) {
    for &g in items {
        let s = scene.style(g).unwrap();
        assert_eq!((s.opacity, s.scale, s.reveal), (1.0, 1.0, 1.0), "{g:?}");
        assert!(s.interactive, "{g:?}");
    }
}

fn engine(cfg: TransitionConfig) -> Engine {
    Engine::with_seed(cfg, 7).unwrap()
}

#[test]
fn from_roles_collects_every_participant() {
    let f = fixture();
    assert_eq!(f.req.grid_items.len(), 6);
    assert_eq!(f.req.chrome.len(), 1);
    assert_eq!(f.req.source, f.req.grid_items[0]);

    let empty = Scene::new(Size::new(10.0, 10.0));
    assert!(ForwardRequest::from_roles(&empty, ElementId(0)).is_err());
}

#[test]
fn forward_completes_at_closed_form_duration() {
    let cfg = TransitionConfig {
        steps: 8,
        step_interval: 0.05,
        step_duration: 0.35,
        mover_pause_before_exit: 0.25,
        panel_reveal_duration_factor: 2.0,
        ..TransitionConfig::default()
    };
    let total = cfg.forward_duration();
    assert!((total - 2.05).abs() < 1e-9);

    let Fixture { mut scene, req } = fixture();
    let mut engine = engine(cfg);
    let done = engine.forward(&mut scene, &req);
    assert_eq!(engine.state(), EngineState::RunningForward);

    assert_eq!(engine.tick(&mut scene, total - 1e-6), None);
    assert!(!done.is_resolved());

    let outcome = engine.tick(&mut scene, 2e-6).unwrap();
    assert!(outcome.is_completed());
    assert_eq!(done.outcome(), Some(outcome.clone()));
    let TransitionOutcome::Completed { duration, .. } = outcome else {
        unreachable!()
    };
    assert!((duration - 2.05).abs() < 1e-5);
    assert_eq!(engine.state(), EngineState::Idle);

    let panel = scene.style(req.panel).unwrap();
    assert_eq!(panel.reveal, 1.0);
    let content = scene.style(req.content_slot).unwrap();
    assert_eq!(content.opacity, 1.0);
    assert!(content.interactive);
}

#[test]
fn concurrent_requests_collapse_onto_the_open_session() {
    let Fixture { mut scene, req } = fixture();
    let mut engine = engine(TransitionConfig::default());
    let first = engine.forward(&mut scene, &req);
    engine.tick(&mut scene, 0.1);
    let before = scene.snapshot();

    let again = engine.reverse(&mut scene, &ReverseRequest::from(&req));
    assert!(again.same_as(&first));
    assert_eq!(engine.state(), EngineState::RunningForward);
    assert_eq!(scene.snapshot(), before);

    let dup = engine.forward(&mut scene, &req);
    assert!(dup.same_as(&first));
    assert!(engine.in_flight().unwrap().same_as(&first));
}

#[test]
fn movers_are_acquired_per_step_and_released_on_exit() {
    let Fixture { mut scene, req } = fixture();
    let cfg = TransitionConfig::default();
    let mut engine = engine(cfg.clone());
    engine.forward(&mut scene, &req);
    assert_eq!(scene.movers().live_count(), cfg.steps as usize);
    assert!(
        scene
            .movers()
            .iter()
            .all(|(_, m)| m.content == MoverContent::Image(ContentRef::new("img/0.jpg")))
    );

    engine.tick(&mut scene, cfg.panel_reveal_start());
    assert_eq!(scene.movers().live_count(), 0);
    let stats = scene.movers().stats();
    assert_eq!(stats.released, u64::from(cfg.steps));
    assert_eq!(stats.forced, 0);
}

#[test]
fn sweep_removes_movers_whose_exit_never_fired() {
    let Fixture { mut scene, req } = fixture();
    let mut engine = engine(TransitionConfig::default());
    let done = engine.forward(&mut scene, &req);
    engine
        .timeline
        .retain_cues(|a| !matches!(a, Action::ReleaseMover(_)));

    let total = engine.config().forward_duration();
    engine.tick(&mut scene, total + 1e-9);
    assert!(done.is_resolved());
    assert_eq!(scene.movers().live_count(), 6);

    engine.tick(&mut scene, engine.config().cleanup_grace);
    assert_eq!(scene.movers().live_count(), 0);
    assert_eq!(scene.movers().stats().forced, 6);
    assert!(engine.is_quiet());
}

#[test]
fn missing_geometry_skips_and_stays_idle() {
    let Fixture { mut scene, req } = fixture();
    let mut engine = engine(TransitionConfig::default());
    let panel_rect = scene.rect(req.panel);
    scene.set_rect(req.panel, None);

    let done = engine.forward(&mut scene, &req);
    assert!(matches!(done.outcome(), Some(TransitionOutcome::Skipped { .. })));
    assert_eq!(engine.state(), EngineState::Idle);
    assert_eq!(scene.movers().live_count(), 0);

    let rev = engine.reverse(&mut scene, &ReverseRequest::from(&req));
    assert!(matches!(rev.outcome(), Some(TransitionOutcome::Skipped { .. })));

    scene.set_rect(req.panel, panel_rect);
    engine.forward(&mut scene, &req);
    assert_eq!(engine.state(), EngineState::RunningForward);
}

#[test]
fn detached_panel_aborts_and_frees_the_guard() {
    let Fixture { mut scene, req } = fixture();
    let mut engine = engine(TransitionConfig::default());
    let done = engine.forward(&mut scene, &req);
    engine.tick(&mut scene, 0.3);
    assert!(scene.movers().live_count() > 0);

    scene.detach(req.panel);
    let outcome = engine.tick(&mut scene, 0.016).unwrap();
    assert!(matches!(outcome, TransitionOutcome::Aborted { .. }));
    assert_eq!(done.outcome(), Some(outcome));
    assert_eq!(engine.state(), EngineState::Idle);
    assert_eq!(scene.movers().live_count(), 0);
    assert!(engine.is_quiet());

    let next = engine.forward(&mut scene, &req);
    assert!(matches!(next.outcome(), Some(TransitionOutcome::Skipped { .. })));
}

#[test]
fn detached_panel_aborts_a_reverse_run() {
    let Fixture { mut scene, req } = fixture();
    let mut engine = engine(TransitionConfig::default());
    let fps = Fps::default();
    engine.forward(&mut scene, &req);
    engine.run_until_quiet(&mut scene, fps);

    let rev = engine.reverse(&mut scene, &ReverseRequest::from(&req));
    engine.tick(&mut scene, 0.2);
    assert_eq!(engine.state(), EngineState::RunningReverse);

    scene.detach(req.panel);
    let outcome = engine.tick(&mut scene, 0.016).unwrap();
    assert!(matches!(
        outcome,
        TransitionOutcome::Aborted {
            direction: Direction::Reverse,
            ..
        }
    ));
    assert_eq!(rev.outcome(), Some(outcome));
    assert_eq!(engine.state(), EngineState::Idle);
    assert!(engine.is_quiet());

    let next = ForwardRequest {
        panel: second_panel(&mut scene),
        ..req.clone()
    };
    let fwd = engine.forward(&mut scene, &next);
    assert_eq!(engine.state(), EngineState::RunningForward);
    engine.run_until_quiet(&mut scene, fps);
    assert!(fwd.outcome().unwrap().is_completed());

    engine.reverse(&mut scene, &ReverseRequest::from(&next));
    engine.run_until_quiet(&mut scene, fps);
    assert_grid_visible(&scene, &req.grid_items);
}

#[test]
fn repeated_forward_runs_keep_the_first_grid_styles() {
    let Fixture { mut scene, req } = fixture();
    let mut engine = engine(TransitionConfig::default());
    let fps = Fps::default();

    engine.forward(&mut scene, &req);
    engine.run_until_quiet(&mut scene, fps);
    let again = ForwardRequest {
        source: req.grid_items[1],
        ..req.clone()
    };
    assert!(engine.forward(&mut scene, &again).outcome().is_none());
    engine.run_until_quiet(&mut scene, fps);
    for &g in &req.grid_items {
        assert_eq!(scene.style(g).unwrap().opacity, 0.0);
    }

    let done = engine.reverse(&mut scene, &ReverseRequest::from(&again));
    engine.run_until_quiet(&mut scene, fps);
    assert!(done.outcome().unwrap().is_completed());
    assert_grid_visible(&scene, &req.grid_items);
}

#[test]
fn aborted_forward_does_not_poison_the_restore() {
    let Fixture { mut scene, req } = fixture();
    let mut engine = engine(TransitionConfig::default());
    let fps = Fps::default();

    engine.forward(&mut scene, &req);
    engine.tick(&mut scene, 0.3);
    assert!(req.grid_items.iter().any(|&g| {
        let o = scene.style(g).unwrap().opacity;
        o > 0.0 && o < 1.0
    }));
    scene.detach(req.panel);
    assert!(matches!(
        engine.tick(&mut scene, 0.016),
        Some(TransitionOutcome::Aborted { .. })
    ));

    let next = ForwardRequest {
        panel: second_panel(&mut scene),
        ..req.clone()
    };
    engine.forward(&mut scene, &next);
    engine.run_until_quiet(&mut scene, fps);
    let done = engine.reverse(&mut scene, &ReverseRequest::from(&next));
    engine.run_until_quiet(&mut scene, fps);
    assert!(done.outcome().unwrap().is_completed());
    assert_grid_visible(&scene, &req.grid_items);

    // A completed reverse consumes the saved styles; the next forward saves afresh.
    scene.style_mut(req.grid_items[2]).unwrap().scale = 0.5;
    engine.forward(&mut scene, &next);
    engine.run_until_quiet(&mut scene, fps);
    engine.reverse(&mut scene, &ReverseRequest::from(&next));
    engine.run_until_quiet(&mut scene, fps);
    assert_eq!(scene.style(req.grid_items[2]).unwrap().scale, 0.5);
}

#[test]
fn panel_side_drives_horizontal_reveal() {
    let Fixture { mut scene, req } = fixture();
    let cfg = TransitionConfig {
        auto_adjust_horizontal_clip_path: true,
        ..TransitionConfig::default()
    };
    let mut engine = engine(cfg);
    engine.forward(&mut scene, &req);
    assert_eq!(engine.panel_side(), Some(PanelSide::Right));
    assert_eq!(
        scene.style(req.panel).unwrap().reveal_dir,
        RevealDirection::LeftRight
    );
    assert!(
        scene
            .movers()
            .iter()
            .all(|(_, m)| m.style.reveal_dir == RevealDirection::LeftRight)
    );

    assert_eq!(
        PanelSide::facing(rect_ltwh(800.0, 0.0, 100.0, 100.0), 1000.0),
        PanelSide::Left
    );
    assert_eq!(PanelSide::Left.reveal_direction(), RevealDirection::RightLeft);

    // Narrowing the viewport puts the source in the right half.
    engine.run_until_quiet(&mut scene, Fps::default());
    engine.reverse(&mut scene, &ReverseRequest::from(&req));
    engine.run_until_quiet(&mut scene, Fps::default());
    scene.set_viewport(Size::new(150.0, 800.0));
    engine.forward(&mut scene, &req);
    assert_eq!(engine.panel_side(), Some(PanelSide::Left));
    assert_eq!(
        scene.style(req.panel).unwrap().reveal_dir,
        RevealDirection::RightLeft
    );
}

#[test]
fn reverse_without_prior_forward_uses_zero_stagger() {
    let Fixture { mut scene, req } = fixture();
    for &g in &req.grid_items {
        scene.style_mut(g).unwrap().opacity = 0.0;
    }
    scene.style_mut(req.panel).unwrap().reveal = 1.0;

    let cfg = TransitionConfig::default();
    let mut engine = engine(cfg.clone());
    engine.reverse(&mut scene, &ReverseRequest::from(&req));
    assert_eq!(engine.state(), EngineState::RunningReverse);

    engine.tick(&mut scene, cfg.panel_reveal_duration() + cfg.step_duration / 2.0);
    let first = scene.style(req.grid_items[0]).unwrap().opacity;
    assert!(first > 0.0 && first < 1.0);
    for &g in &req.grid_items {
        assert_eq!(scene.style(g).unwrap().opacity, first);
    }
}

#[test]
fn forward_then_reverse_restores_the_grid() {
    let Fixture { mut scene, req } = fixture();
    let mut engine = engine(TransitionConfig::default());
    let fps = Fps::default();

    engine.forward(&mut scene, &req);
    let seen = engine.run_until_quiet(&mut scene, fps);
    assert_eq!(seen.len(), 1);
    for &g in &req.grid_items {
        assert_eq!(scene.style(g).unwrap().opacity, 0.0);
    }
    assert_eq!(scene.style(req.chrome[0]).unwrap().opacity, 0.0);

    let done = engine.reverse(&mut scene, &ReverseRequest::from(&req));
    engine.run_until_quiet(&mut scene, fps);
    assert!(done.outcome().unwrap().is_completed());

    for &g in &req.grid_items {
        let s = scene.style(g).unwrap();
        assert_eq!((s.opacity, s.scale, s.reveal), (1.0, 1.0, 1.0));
        assert!(s.interactive);
    }
    let content = scene.style(req.content_slot).unwrap();
    assert_eq!(content.opacity, 0.0);
    assert!(!content.interactive);
    let panel = scene.style(req.panel).unwrap();
    assert_eq!((panel.opacity, panel.reveal), (0.0, 0.0));
    assert_eq!(scene.style(req.chrome[0]).unwrap().opacity, 1.0);
}

#[test]
fn zero_steps_still_reveals_the_panel() {
    let Fixture { mut scene, req } = fixture();
    let cfg = TransitionConfig {
        steps: 0,
        ..TransitionConfig::default()
    };
    let mut engine = engine(cfg);
    engine.forward(&mut scene, &req);
    assert_eq!(scene.movers().live_count(), 0);
    let seen = engine.run_until_quiet(&mut scene, Fps::default());
    assert!(seen[0].is_completed());
    assert_eq!(scene.style(req.panel).unwrap().reveal, 1.0);
}

#[test]
fn missing_content_degrades_to_empty_movers() {
    let mut scene = Scene::new(Size::new(1000.0, 800.0));
    let item = scene.insert(Element::new(ElementRole::GridItem).with_rect(rect_ltwh(0.0, 0.0, 100.0, 100.0)));
    let panel = scene.insert(
        Element::new(ElementRole::Panel)
            .with_rect(rect_ltwh(500.0, 0.0, 500.0, 800.0))
            .with_style(Style::hidden()),
    );
    let slot = scene.insert(Element::new(ElementRole::PanelContent).with_style(Style::hidden()));
    let req = ForwardRequest::new(item, panel, slot).with_grid_items(vec![item]);

    let mut engine = engine(TransitionConfig::default());
    engine.forward(&mut scene, &req);
    assert_eq!(scene.movers().live_count(), 6);
    assert!(scene.movers().iter().all(|(_, m)| m.content == MoverContent::Empty));
    assert!(engine.run_until_quiet(&mut scene, Fps::default())[0].is_completed());
}

#[test]
fn seeded_rotation_is_bounded_and_reproducible() {
    let cfg = TransitionConfig {
        rotation_range: 5.0,
        ..TransitionConfig::default()
    };
    let rotations = |seed| {
        let Fixture { mut scene, req } = fixture();
        let mut engine = Engine::with_seed(cfg.clone(), seed).unwrap();
        engine.forward(&mut scene, &req);
        scene
            .movers()
            .iter()
            .map(|(_, m)| m.style.rotation)
            .collect::<Vec<_>>()
    };
    let a = rotations(11);
    assert_eq!(a, rotations(11));
    assert!(a.iter().all(|r| (-5.0..=5.0).contains(r)));
    assert!(a.iter().any(|r| *r != 0.0));
}

#[test]
fn config_updates_apply_to_the_next_session() {
    let Fixture { mut scene, req } = fixture();
    let mut engine = engine(TransitionConfig::default());
    engine.forward(&mut scene, &req);
    engine
        .update_config(&ConfigPatch {
            steps: Some(2),
            ..ConfigPatch::default()
        })
        .unwrap();
    assert_eq!(engine.config().steps, 2);
    assert_eq!(scene.movers().live_count(), 6);

    let bad = ConfigPatch {
        step_interval: Some(-1.0),
        ..ConfigPatch::default()
    };
    assert!(engine.update_config(&bad).is_err());
    assert_eq!(engine.config().step_interval, 0.05);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let cfg = TransitionConfig {
        step_duration: f64::INFINITY,
        ..TransitionConfig::default()
    };
    assert!(Engine::new(cfg).is_err());
}
