use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng as _;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "reprise", version)]
struct Cli {
    /// Log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the computed choreography (frames, delays, durations) as JSON.
    Plan(PlanArgs),
    /// Drive a forward and a reverse run on a synthetic grid.
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
struct SetupArgs {
    /// Base configuration JSON (camelCase fields; missing fields take defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named preset merged over the base configuration (effect01..effect04).
    #[arg(long)]
    preset: Option<reprise::Preset>,

    /// Inline JSON patch merged last, e.g. '{"steps": 4}'.
    #[arg(long = "set")]
    patch: Option<String>,

    /// Seed for wobble and rotation.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Viewport width.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height.
    #[arg(long, default_value_t = 800.0)]
    height: f64,

    /// Grid columns.
    #[arg(long, default_value_t = 4)]
    cols: u32,

    /// Grid rows.
    #[arg(long, default_value_t = 3)]
    rows: u32,

    /// Index of the clicked grid item (row-major).
    #[arg(long, default_value_t = 0)]
    click: usize,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[command(flatten)]
    setup: SetupArgs,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[command(flatten)]
    setup: SetupArgs,

    /// Tick rate.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Emit a scene snapshot every N frames as JSON lines (0 disables snapshots).
    #[arg(long, default_value_t = 0)]
    every: u64,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Simulate(args) => cmd_simulate(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_config(setup: &SetupArgs) -> anyhow::Result<reprise::TransitionConfig> {
    let mut cfg = match &setup.config {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            reprise::TransitionConfig::from_json(&s)
                .with_context(|| format!("parse config '{}'", path.display()))?
        }
        None => reprise::TransitionConfig::default(),
    };
    if let Some(preset) = setup.preset {
        cfg = cfg
            .merged(&preset.patch())
            .with_context(|| format!("apply preset '{preset}'"))?;
    }
    if let Some(patch) = &setup.patch {
        let patch = reprise::ConfigPatch::from_json(patch).with_context(|| "parse --set patch")?;
        cfg = cfg.merged(&patch).with_context(|| "apply --set patch")?;
    }
    Ok(cfg)
}

/// Grid across the viewport with the panel on the half facing away from the clicked item.
fn build_scene(setup: &SetupArgs) -> anyhow::Result<(reprise::Scene, reprise::ForwardRequest)> {
    anyhow::ensure!(setup.cols > 0 && setup.rows > 0, "grid must have at least one cell");
    anyhow::ensure!(
        setup.width > 0.0 && setup.height > 0.0,
        "viewport must have a positive size"
    );
    let count = setup
        .cols
        .checked_mul(setup.rows)
        .and_then(|n| usize::try_from(n).ok())
        .with_context(|| format!("grid of {} x {} is too large", setup.cols, setup.rows))?;
    anyhow::ensure!(
        setup.click < count,
        "--click {} is outside a grid of {count} items",
        setup.click
    );

    let mut scene = reprise::Scene::new(reprise::Size::new(setup.width, setup.height));
    let gap = 16.0;
    let top = 96.0;
    let cell_w = (setup.width - gap * (f64::from(setup.cols) + 1.0)) / f64::from(setup.cols);
    let cell_h = (setup.height - top - gap * (f64::from(setup.rows) + 1.0)) / f64::from(setup.rows);
    anyhow::ensure!(cell_w > 0.0 && cell_h > 0.0, "viewport too small for the grid");

    let mut items = Vec::with_capacity(count);
    for row in 0..setup.rows {
        for col in 0..setup.cols {
            let rect = reprise::rect_ltwh(
                gap + f64::from(col) * (cell_w + gap),
                top + gap + f64::from(row) * (cell_h + gap),
                cell_w,
                cell_h,
            );
            let content = reprise::ContentRef::new(format!("img/{}.jpg", items.len() + 1));
            items.push(scene.insert(
                reprise::Element::new(reprise::ElementRole::GridItem)
                    .with_rect(rect)
                    .with_content(content),
            ));
        }
    }
    scene.insert(
        reprise::Element::new(reprise::ElementRole::Chrome)
            .with_rect(reprise::rect_ltwh(gap, gap, setup.width - 2.0 * gap, top - 2.0 * gap)),
    );

    let source = items[setup.click];
    let source_rect = scene
        .rect(source)
        .context("clicked item has no rectangle")?;
    let half = setup.width / 2.0;
    let panel_left = match reprise::PanelSide::facing(source_rect, setup.width) {
        reprise::PanelSide::Left => 0.0,
        reprise::PanelSide::Right => half,
    };
    scene.insert(
        reprise::Element::new(reprise::ElementRole::Panel)
            .with_rect(reprise::rect_ltwh(panel_left, 0.0, half, setup.height))
            .with_style(reprise::Style::hidden()),
    );
    scene.insert(
        reprise::Element::new(reprise::ElementRole::PanelContent)
            .with_rect(reprise::rect_ltwh(
                panel_left + gap,
                setup.height * 0.7,
                half - 2.0 * gap,
                setup.height * 0.3 - gap,
            ))
            .with_style(reprise::Style::hidden()),
    );

    let req = reprise::ForwardRequest::from_roles(&scene, source)?;
    Ok((scene, req))
}

fn open_out(path: Option<&Path>) -> anyhow::Result<Box<dyn std::io::Write>> {
    Ok(match path {
        Some(p) => {
            if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f = File::create(p).with_context(|| format!("create '{}'", p.display()))?;
            Box::new(BufWriter::new(f))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Plan {
    config: reprise::TransitionConfig,
    panel_side: reprise::PanelSide,
    reveal_direction: reprise::RevealDirection,
    frames: Vec<reprise::MotionFrame>,
    grid_delays: Vec<f64>,
    mover_starts: Vec<f64>,
    panel_reveal_start: f64,
    forward_duration: f64,
    reverse_duration: f64,
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.setup)?;
    let (scene, req) = build_scene(&args.setup)?;
    let source = scene.rect(req.source).context("clicked item has no rectangle")?;
    let panel = scene.rect(req.panel).context("panel has no rectangle")?;

    let side = reprise::PanelSide::facing(source, scene.viewport().width);
    let mut rng = rand::rngs::SmallRng::seed_from_u64(args.setup.seed);
    let frames = reprise::synthesize(
        source,
        panel,
        cfg.steps as usize,
        &cfg.path_params(),
        &mut rng,
    );
    let rects: Vec<Option<reprise::Rect>> =
        req.grid_items.iter().map(|&g| scene.rect(g)).collect();

    let plan = Plan {
        panel_side: side,
        reveal_direction: if cfg.auto_adjust_horizontal_clip_path {
            side.reveal_direction()
        } else {
            cfg.clip_path_direction
        },
        grid_delays: reprise::stagger_delays_sparse(
            Some(source),
            &rects,
            cfg.grid_item_stagger_factor,
        ),
        mover_starts: (0..frames.len())
            .map(|i| i as f64 * cfg.step_interval)
            .collect(),
        frames,
        panel_reveal_start: cfg.panel_reveal_start(),
        forward_duration: cfg.forward_duration(),
        reverse_duration: cfg.reverse_duration(),
        config: cfg,
    };

    let mut out = open_out(args.out.as_deref())?;
    serde_json::to_writer_pretty(&mut out, &plan).with_context(|| "write plan JSON")?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameLine<'a> {
    frame: u64,
    time: f64,
    state: reprise::EngineState,
    scene: &'a reprise::SceneSnapshot,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    frames: u64,
    seconds: f64,
    outcomes: Vec<reprise::TransitionOutcome>,
    pool: reprise::MoverPoolStats,
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.setup)?;
    let fps = reprise::Fps::new(args.fps, 1)?;
    let (mut scene, req) = build_scene(&args.setup)?;
    let mut engine = reprise::Engine::with_seed(cfg, args.setup.seed)?;
    let mut out = open_out(args.out.as_deref())?;

    let mut frame = 0u64;
    let mut outcomes = Vec::new();
    let forward = engine.forward(&mut scene, &req);
    let reverse_req = reprise::ReverseRequest::from(&req);
    let mut reverse = None;

    // Bounded by both runs plus cleanup, with one second of slack.
    let budget = engine.config().forward_duration()
        + engine.config().cleanup_grace
        + engine.config().reverse_duration()
        + 1.0;
    let max_frames = fps.secs_to_frames_ceil(budget);

    while frame < max_frames {
        if args.every > 0 && frame % args.every == 0 {
            let snap = scene.snapshot();
            let line = FrameLine {
                frame,
                time: engine.now(),
                state: engine.state(),
                scene: &snap,
            };
            serde_json::to_writer(&mut out, &line).with_context(|| "write snapshot")?;
            writeln!(out)?;
        }

        outcomes.extend(engine.tick_frame(&mut scene, fps));
        frame += 1;

        if reverse.is_none() && forward.is_resolved() {
            reverse = Some(engine.reverse(&mut scene, &reverse_req));
        }
        if reverse.as_ref().is_some_and(|r| r.is_resolved()) && engine.is_quiet() {
            break;
        }
    }
    outcomes.extend(engine.run_until_quiet(&mut scene, fps));

    anyhow::ensure!(
        reverse.as_ref().is_some_and(|r| r.is_resolved()),
        "simulation did not finish within {max_frames} frames"
    );

    let summary = Summary {
        frames: frame,
        seconds: fps.frames_to_secs(frame),
        outcomes,
        pool: scene.movers().stats(),
    };
    if args.every > 0 {
        serde_json::to_writer(&mut out, &summary).with_context(|| "write summary")?;
    } else {
        serde_json::to_writer_pretty(&mut out, &summary).with_context(|| "write summary")?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
