//! # life_canvas
//!
//! Terminal front-end for the `life_canvas` library, drawn with `ratatui` and
//! driven by `crossterm` events.
//!
//! ## Controls
//!
//! * Space: Play/Pause
//! * Enter: Step one generation (when paused)
//! * Left click: Toggle a cell
//! * r: Reseed with a fresh random pattern
//! * c: Clear the grid
//! * q: Quit

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use sysinfo::{System, SystemExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use life_canvas::{
    AnimationController, CanvasBounds, CellMetrics, Click, FrameClock, FrameOutcome, InputHandler,
    Palette, Raster, Renderer, Seeding, TickStats, Universe, ViewportScale,
};

/// Poll timeout while no frame is pending.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Half-block glyphs stack two pixel rows in one terminal row.
const DISPLAY_SCALE: ViewportScale = ViewportScale { x: 1.0, y: 2.0 };

#[derive(Parser, Debug)]
#[command(version, about = "Conway's Game of Life on a torus, in the terminal")]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 64)]
    width: u32,

    /// Grid height in cells
    #[arg(long, default_value_t = 32)]
    height: u32,

    /// Seed for the random initial pattern
    #[arg(long)]
    seed: Option<u64>,

    /// Start with every cell dead
    #[arg(long)]
    empty: bool,

    /// Animation frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Write logs to this file (filtered by RUST_LOG, default `warn`)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Running totals shown in the statistics panel.
#[derive(Debug, Default)]
struct Stats {
    /// Total number of cells born since start
    cells_created: u64,
    /// Total number of cells that died since start
    cells_destroyed: u64,
}

impl Stats {
    fn record(&mut self, tick: TickStats) {
        self.cells_created += tick.born as u64;
        self.cells_destroyed += tick.died as u64;
    }

    /// Average births and deaths per generation over `generations` steps.
    fn rates(&self, generations: u64) -> (f64, f64) {
        let steps = generations.max(1) as f64;
        (
            self.cells_created as f64 / steps,
            self.cells_destroyed as f64 / steps,
        )
    }
}

struct App {
    universe: Universe,
    renderer: Renderer,
    raster: Raster,
    controller: AnimationController<FrameClock>,
    /// Where the raster was last displayed, for mapping clicks
    canvas: Rect,
    seed: u64,
    stats: Stats,
    sys: System,
}

impl App {
    fn new(args: &Args, viewport: Rect) -> Result<App> {
        let seed = args.seed.unwrap_or_else(rand::random);
        let seeding = if args.empty {
            Seeding::Empty
        } else {
            Seeding::Random { seed }
        };
        let universe = Universe::new(args.width, args.height, seeding)?;
        info!(seed, width = args.width, height = args.height, "starting");

        let metrics = fit_metrics(viewport, args.width, args.height);
        let renderer = Renderer::new(metrics, Palette::default());
        let mut raster = Raster::with_size(metrics.surface_size(args.width, args.height));
        renderer.draw(&mut raster, universe.cells_view());

        Ok(App {
            universe,
            renderer,
            raster,
            controller: AnimationController::new(FrameClock::new(args.fps)),
            canvas: Rect::default(),
            seed,
            stats: Stats::default(),
            sys: System::new_all(),
        })
    }

    fn redraw(&mut self) {
        self.renderer.draw(&mut self.raster, self.universe.cells_view());
    }

    fn click(&mut self, column: u16, row: u16) -> Result<()> {
        let (cols, rows) = self.raster.display_size();
        let inside = column >= self.canvas.x
            && row >= self.canvas.y
            && column < self.canvas.x + cols.min(self.canvas.width)
            && row < self.canvas.y + rows.min(self.canvas.height);
        if !inside {
            return Ok(());
        }

        let bounds = CanvasBounds {
            left: self.canvas.x as f64,
            top: self.canvas.y as f64,
            width: cols as f64,
            height: rows as f64,
        };
        InputHandler::with_scale(bounds, DISPLAY_SCALE).on_click(
            Click::new(column as f64, row as f64),
            &mut self.universe,
            &self.renderer,
            &mut self.raster,
        )?;
        Ok(())
    }

    fn step(&mut self) {
        let tick = self
            .controller
            .step(&mut self.universe, &self.renderer, &mut self.raster);
        self.stats.record(tick);
    }

    fn reseed(&mut self) {
        self.seed = rand::random();
        self.universe.reseed(Seeding::Random { seed: self.seed });
        self.stats = Stats::default();
        info!(seed = self.seed, "reseeded");
        self.redraw();
    }

    fn clear(&mut self) {
        self.universe.clear();
        self.stats = Stats::default();
        self.redraw();
    }

    /// Runs the pending frame if it is due.
    fn advance(&mut self, now: Instant) -> Result<()> {
        let Some(frame) = self.controller.scheduler_mut().take_due(now) else {
            return Ok(());
        };
        let outcome =
            self.controller
                .on_frame(frame, &mut self.universe, &self.renderer, &mut self.raster)?;
        if let FrameOutcome::Advanced(tick) = outcome {
            self.stats.record(tick);
            self.sys.refresh_memory();
        }
        Ok(())
    }
}

/// Picks the largest cell size whose canvas fits the grid panel.
fn fit_metrics(viewport: Rect, width: u32, height: u32) -> CellMetrics {
    let [grid_area, _] = panels(viewport);
    let inner = Block::default().borders(Borders::ALL).inner(grid_area);
    let by_height = CellMetrics::fit(inner.height as u32 * 2, height);
    let by_width = CellMetrics::fit(inner.width as u32, width);
    CellMetrics::new(by_height.cell_size().min(by_width.cell_size()))
}

fn panels(area: Rect) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)].as_ref())
        .split(area);
    [chunks[0], chunks[1]]
}

/// Draws the game grid to the terminal interface.
fn draw_grid(f: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Game of Life [Space: Play/Pause | Enter: Step | Click: Toggle | r: Reseed | c: Clear | q: Quit]");
    app.canvas = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(&app.raster, app.canvas);
}

/// Draws the statistics panel: one `label value` row per figure.
fn draw_stats(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let generation = app.universe.generation();
    let (birth_rate, death_rate) = app.stats.rates(generation);
    let status = if app.controller.is_paused() {
        "Paused"
    } else {
        "Running"
    };

    let rows = [
        ("Generation", generation.to_string()),
        ("Population", app.universe.population().to_string()),
        ("Born", app.stats.cells_created.to_string()),
        ("Died", app.stats.cells_destroyed.to_string()),
        ("Births/gen", format!("{birth_rate:.2}")),
        ("Deaths/gen", format!("{death_rate:.2}")),
        (
            "Memory",
            format!(
                "{} / {} MiB",
                app.sys.used_memory() >> 20,
                app.sys.total_memory() >> 20
            ),
        ),
        ("Seed", app.seed.to_string()),
    ];

    let label_style = Style::default().fg(Color::DarkGray);
    let mut lines: Vec<Line> = rows
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label:<11}"), label_style),
                Span::raw(value),
            ])
        })
        .collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("{} {}", app.controller.label(), status),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )));

    let stats_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Statistics"))
        .wrap(Wrap { trim: true });

    f.render_widget(stats_widget, area);
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| {
            let [grid_area, stats_area] = panels(f.size());
            draw_grid(f, app, grid_area);
            draw_stats(f, app, stats_area);
        })?;

        let timeout = app
            .controller
            .scheduler()
            .time_until_due(Instant::now())
            .unwrap_or(IDLE_POLL);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char(' ') => app.controller.toggle()?,
                    KeyCode::Enter => {
                        if app.controller.is_paused() {
                            app.step();
                        }
                    }
                    KeyCode::Char('r') => app.reseed(),
                    KeyCode::Char('c') => app.clear(),
                    _ => {}
                },
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    app.click(mouse.column, mouse.row)?;
                }
                _ => {}
            }
        }

        app.advance(Instant::now())?;
    }
    Ok(())
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = terminal
        .size()
        .map_err(anyhow::Error::from)
        .and_then(|size| App::new(&args, size))
        .and_then(|mut app| run(&mut terminal, &mut app));

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
