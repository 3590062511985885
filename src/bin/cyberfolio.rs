use std::{
    io::{self, Write as _},
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, MouseButton, MouseEventKind},
    execute, queue, style, terminal,
};
use cyberfolio::{
    AsciiEffect, AudioTrack, Color, ContributionsWidget, FetchState, FfmpegSink, FfmpegSinkOpts,
    FontOptions, FrameIndex, HttpContributionSource, IntroConfig, IntroRenderer, MountedSphere,
    Page, PageConfig, PageView, PointerEvent, SiteContent, SphereProps, WidgetHost,
    encode::ffmpeg::ensure_parent_dir,
};

#[derive(Parser, Debug)]
#[command(name = "cyberfolio", version, about = "Cyberpunk portfolio intro and widgets")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single intro frame as a PNG.
    Frame(FrameArgs),
    /// Write a single intro frame as SVG.
    Svg(SvgArgs),
    /// Render the intro to MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Run the ASCII sphere in the terminal.
    Sphere(SphereArgs),
    /// Fetch and print a contribution calendar.
    Contributions(ContributionsArgs),
    /// Simulate the landing page and print its event timeline.
    Page(PageArgs),
}

#[derive(Parser, Debug)]
struct IntroArgs {
    /// Intro configuration JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra font file for the title (repeatable).
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,
}

impl IntroArgs {
    fn renderer(&self) -> anyhow::Result<IntroRenderer> {
        let config = match &self.config {
            Some(path) => IntroConfig::from_path(path)?,
            None => IntroConfig::default(),
        };
        let fonts = FontOptions {
            dirs: self.font_dirs.clone(),
            files: self.fonts.clone(),
        };
        Ok(IntroRenderer::new(config, &fonts)?)
    }
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    intro: IntroArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SvgArgs {
    #[command(flatten)]
    intro: IntroArgs,

    #[arg(long)]
    frame: u64,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    intro: IntroArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Soundtrack looped under the video.
    #[arg(long)]
    audio: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SphereArgs {
    /// Glyph color as #RRGGBB.
    #[arg(long, default_value = "#FF2A55")]
    color: String,

    /// Viewport size in pixels.
    #[arg(long, default_value_t = 400)]
    size: u32,

    /// Quit after this many seconds.
    #[arg(long)]
    seconds: Option<f64>,

    /// Print one frame to stdout and exit, without taking over the terminal.
    #[arg(long)]
    once: bool,
}

#[derive(Parser, Debug)]
struct ContributionsArgs {
    /// Account to look up; defaults to the site's configured user.
    #[arg(long)]
    user: Option<String>,

    /// API root.
    #[arg(long)]
    endpoint: Option<String>,

    /// Give up after this many seconds.
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,
}

#[derive(Parser, Debug)]
struct PageArgs {
    /// Page configuration JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Site content JSON, overriding the content in the page configuration.
    #[arg(long)]
    content: Option<PathBuf>,

    /// Press "Skip Intro" at this time.
    #[arg(long)]
    skip_at_ms: Option<u64>,

    /// Scroll offsets fed one every 100 ms, starting at `--scroll-at-ms`.
    #[arg(long, value_delimiter = ',')]
    scroll: Vec<f64>,

    #[arg(long, default_value_t = 8_000)]
    scroll_at_ms: u64,

    /// The intro player never reports completion.
    #[arg(long)]
    no_completion_event: bool,

    /// Simulated duration.
    #[arg(long, default_value_t = 10_000)]
    until_ms: u64,

    /// Print events as JSON lines.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Svg(args) => cmd_svg(args),
        Command::Render(args) => cmd_render(args),
        Command::Sphere(args) => cmd_sphere(args),
        Command::Contributions(args) => cmd_contributions(args),
        Command::Page(args) => cmd_page(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let renderer = args.intro.renderer()?;
    let frame = renderer.render_frame(FrameIndex(args.frame))?;
    ensure_parent_dir(&args.out)?;
    frame
        .save_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_svg(args: SvgArgs) -> anyhow::Result<()> {
    let renderer = args.intro.renderer()?;
    let svg = renderer.svg(FrameIndex(args.frame));
    ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, svg)
        .with_context(|| format!("write svg '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let renderer = args.intro.renderer()?;
    ensure_parent_dir(&args.out)?;
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&args.out));
    let audio = args.audio.map(|path| AudioTrack { path, looped: true });
    let stats = renderer
        .render_range(renderer.full_range(), &mut sink, audio)
        .with_context(|| format!("render '{}'", args.out.display()))?;
    eprintln!(
        "wrote {} ({} frames)",
        args.out.display(),
        stats.frames_total
    );
    Ok(())
}

fn sphere_props(args: &SphereArgs) -> anyhow::Result<SphereProps> {
    let color = Color::parse_hex(&args.color)
        .with_context(|| format!("parse --color '{}'", args.color))?;
    Ok(SphereProps {
        color,
        size: args.size,
        ..SphereProps::default()
    })
}

fn cmd_sphere(args: SphereArgs) -> anyhow::Result<()> {
    let props = sphere_props(&args)?;
    let host = WidgetHost::new();

    if args.once {
        let sphere = MountedSphere::mount(&host, props, 0);
        host.run_until(0);
        let frame = sphere
            .latest_frame()
            .context("sphere produced no frame")?;
        let mut out = io::stdout().lock();
        for row in &frame.rows {
            writeln!(out, "{}", widen(row))?;
        }
        return Ok(());
    }

    let cell_px = f64::from(props.size) / f64::from(AsciiEffect::default().cells_for(props.size));
    let color = props.color;
    let sphere = MountedSphere::mount(&host, props, 0);
    run_terminal(&host, &sphere, cell_px, color, args.seconds)
}

/// Terminal cells are roughly twice as tall as wide, so every glyph is printed twice.
fn widen(row: &str) -> String {
    row.chars().flat_map(|c| [c, c]).collect()
}

fn run_terminal(
    host: &WidgetHost,
    sphere: &MountedSphere,
    cell_px: f64,
    color: Color,
    seconds: Option<f64>,
) -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    let mut out = io::stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        event::EnableMouseCapture,
    )?;

    let cleanup = |out: &mut io::Stdout| -> io::Result<()> {
        execute!(
            out,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show,
        )?;
        terminal::disable_raw_mode()
    };

    let result = terminal_loop(&mut out, host, sphere, cell_px, color, seconds);
    cleanup(&mut out)?;
    result
}

fn terminal_loop(
    out: &mut io::Stdout,
    host: &WidgetHost,
    sphere: &MountedSphere,
    cell_px: f64,
    color: Color,
    seconds: Option<f64>,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let frame_dur = Duration::from_millis(33);
    let to_px = |column: u16, row: u16| PointerEvent::Move {
        x: f64::from(column / 2) * cell_px,
        y: f64::from(row) * cell_px,
    };

    loop {
        let frame_start = Instant::now();
        if seconds.is_some_and(|s| started.elapsed().as_secs_f64() >= s) {
            return Ok(());
        }

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) => {
                    return Ok(());
                }
                Event::Mouse(m) => match m.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        if let PointerEvent::Move { x, y } = to_px(m.column, m.row) {
                            host.dispatch(PointerEvent::Down { x, y });
                        }
                    }
                    MouseEventKind::Drag(MouseButton::Left) => {
                        host.dispatch(to_px(m.column, m.row));
                    }
                    MouseEventKind::Up(_) => host.dispatch(PointerEvent::Up),
                    _ => {}
                },
                _ => {}
            }
        }

        let now_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        host.run_until(now_ms);

        if let Some(frame) = sphere.latest_frame() {
            let shade = (frame.opacity * 255.0).round() as u16;
            let dim = |c: u8| (u16::from(c) * shade / 255) as u8;
            let pad = if frame.jitter_px.abs() >= cell_px / 2.0 {
                " "
            } else {
                ""
            };
            queue!(
                out,
                cursor::MoveTo(0, 0),
                style::SetForegroundColor(style::Color::Rgb {
                    r: dim(color.r),
                    g: dim(color.g),
                    b: dim(color.b),
                }),
            )?;
            for row in &frame.rows {
                queue!(
                    out,
                    terminal::Clear(terminal::ClearType::CurrentLine),
                    style::Print(pad),
                    style::Print(widen(row)),
                    style::Print("\r\n"),
                )?;
            }
            queue!(out, style::ResetColor, style::Print("q / Esc to quit"))?;
            out.flush()?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

fn cmd_contributions(args: ContributionsArgs) -> anyhow::Result<()> {
    let user = args
        .user
        .unwrap_or_else(|| SiteContent::default().github_user);
    let source = match args.endpoint {
        Some(endpoint) => HttpContributionSource::with_endpoint(endpoint)?,
        None => HttpContributionSource::new()?,
    };
    let mut widget = ContributionsWidget::mount(Arc::new(source), user);
    if !widget.wait(Duration::from_secs(args.timeout_secs)) {
        anyhow::bail!("contribution fetch timed out after {}s", args.timeout_secs);
    }

    for line in widget.grid_lines() {
        println!("{line}");
    }
    let state = match widget.state() {
        FetchState::Ready => "ok",
        FetchState::Failed => "unavailable",
        FetchState::Loading => "loading",
    };
    println!(
        "{}: {} contributions in the last year, current streak {} days ({state})",
        widget.user(),
        widget.data().total,
        widget.streak()
    );
    Ok(())
}

fn cmd_page(args: PageArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => PageConfig::from_path(path)?,
        None => PageConfig::default(),
    };
    if let Some(path) = &args.content {
        config.content = SiteContent::from_path(path)?;
    }
    if args.no_completion_event {
        config.completion_event = false;
    }

    let mut page = Page::new(config, 0)?;

    // Inputs in time order, then let the remaining timers run out.
    let mut inputs: Vec<(u64, Input)> = Vec::new();
    if let Some(at) = args.skip_at_ms {
        inputs.push((at, Input::Skip));
    }
    for (i, offset) in args.scroll.iter().enumerate() {
        inputs.push((args.scroll_at_ms + 100 * i as u64, Input::Scroll(*offset)));
    }
    inputs.sort_by_key(|(at, _)| *at);

    for (at, input) in inputs {
        match input {
            Input::Skip => {
                page.skip(at);
            }
            Input::Scroll(offset) => page.scroll(offset, at),
        }
    }
    page.advance_to(args.until_ms);

    let mut out = io::stdout().lock();
    for event in page.log() {
        if args.json {
            writeln!(out, "{}", serde_json::to_string(event)?)?;
        } else {
            writeln!(out, "{:>7} ms  {:?}", event.at_ms, event.kind)?;
        }
    }

    let view = page.view();
    if args.json {
        let line = ViewLine {
            kind: "view",
            at_ms: page.now_ms(),
            view,
        };
        writeln!(out, "{}", serde_json::to_string(&line)?)?;
        return Ok(());
    }

    writeln!(out, "final: {:?}", view.phase)?;
    if let Some(heading) = view.heading {
        let pin = if view.heading_pinned { " (pinned)" } else { "" };
        writeln!(out, "  {}{pin}", heading.to_uppercase())?;
    }
    if let Some(tagline) = view.tagline {
        writeln!(out, "  {tagline}")?;
    }
    if !view.nav_links.is_empty() {
        writeln!(out, "  [ {} ]", view.nav_links.join(" | "))?;
    }
    for e in view.experience {
        writeln!(out, "  {}  {} @ {}", e.period, e.role, e.org)?;
        if !e.summary.is_empty() {
            writeln!(out, "      {}", e.summary)?;
        }
    }
    writeln!(out, "{}", page.marquee_line(60))?;
    Ok(())
}

/// Last line of `page --json`: what is on screen when the simulation stops.
#[derive(serde::Serialize)]
struct ViewLine<'a> {
    kind: &'static str,
    at_ms: u64,
    #[serde(flatten)]
    view: PageView<'a>,
}

enum Input {
    Skip,
    Scroll(f64),
}
