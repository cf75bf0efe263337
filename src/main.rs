mod app;
mod blocks;
mod ui;

use app::{App, Focus};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use doom_fire::config::AppConfig;
use doom_fire::export::{self, GifRecorder};
use doom_fire::presets::PresetManager;
use doom_fire::{FireSimulation, Palette};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "doom-fire")]
#[command(about = "Doom-style pixel fire in the terminal")]
struct Args {
    // === Fire Parameters ===
    /// Maximum heat lost per row (0-50)
    #[arg(long)]
    fade: Option<f32>,

    /// Lateral spread of the flames (0-10)
    #[arg(long)]
    spread: Option<f32>,

    /// Constant sideways drift, positive blows right (-5 to 5)
    #[arg(long)]
    wind: Option<f32>,

    /// Random bits per draw (0-64, 0 = no randomness)
    #[arg(long)]
    bits: Option<u32>,

    /// Start from a named preset (classic, inferno, embers, windy, gale, coarse,
    /// frozen, or a saved one)
    #[arg(short = 'p', long)]
    preset: Option<String>,

    /// Config file to load instead of the default location
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    // === Display ===
    /// Number of palette entries (>= 2)
    #[arg(long = "palette-size")]
    palette_size: Option<usize>,

    /// Target frames per second (1-120)
    #[arg(long)]
    fps: Option<u32>,

    /// Terminal pixels per fire cell (1-8)
    #[arg(long)]
    downscale: Option<u16>,

    /// Show raw intensities in grayscale
    #[arg(long, default_value = "false")]
    grayscale: bool,

    /// Seed for a reproducible fire
    #[arg(long)]
    seed: Option<u64>,

    // === Headless Output ===
    /// Run headless and write the final frame as a PNG
    #[arg(long = "export-png")]
    export_png: Option<PathBuf>,

    /// Run headless and record an animated GIF
    #[arg(long = "export-gif")]
    export_gif: Option<PathBuf>,

    /// Steps to simulate for headless export
    #[arg(long, default_value = "120")]
    frames: usize,

    /// Pixel upscale factor for exported images
    #[arg(long, default_value = "4")]
    scale: u32,

    /// Grid width for headless export
    #[arg(long, default_value = "160")]
    width: usize,

    /// Grid height for headless export
    #[arg(long, default_value = "90")]
    height: usize,

    /// Print the palette as color swatches and exit
    #[arg(long = "print-palette")]
    print_palette: bool,

    /// Write logs to this file (the interactive viewer logs nowhere otherwise)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn is_headless(&self) -> bool {
        self.print_palette || self.export_png.is_some() || self.export_gif.is_some()
    }
}

/// Install the tracing subscriber. `RUST_LOG` overrides the `info` default.
fn init_logging(log_file: Option<&Path>, headless: bool) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = log_file {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if headless {
        // Stderr would corrupt the alternate screen, so only headless runs use it
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

/// Merge config file, preset and command line flags, in increasing priority
fn build_config(
    args: &Args,
    presets: &PresetManager,
) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => match AppConfig::default_path().filter(|p| p.exists()) {
            Some(path) => AppConfig::load_from_file(&path).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "ignoring unreadable config");
                AppConfig::default()
            }),
            None => AppConfig::default(),
        },
    };

    if let Some(name) = &args.preset {
        let preset = presets.find(name).ok_or_else(|| {
            format!(
                "unknown preset '{}', expected one of: {}",
                name,
                presets.preset_names().join(", ")
            )
        })?;
        info!(preset = %preset.name, "starting from preset");
        config.settings = preset.settings.clone();
    }

    let settings = &mut config.settings;
    if let Some(fade) = args.fade {
        settings.fade_speed = fade;
    }
    if let Some(spread) = args.spread {
        settings.spread = spread;
    }
    if let Some(wind) = args.wind {
        settings.wind = wind;
    }
    if let Some(bits) = args.bits {
        settings.precision_bits = bits;
    }
    settings.validate()?;

    if let Some(size) = args.palette_size {
        config.palette_size = size;
    }
    if let Some(fps) = args.fps {
        config.target_fps = fps.clamp(1, 120);
    }
    if let Some(downscale) = args.downscale {
        config.downscale = downscale.clamp(1, 8);
    }
    if args.grayscale {
        config.use_palette = false;
    }

    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.is_headless())?;

    let presets = PresetManager::new();
    let config = build_config(&args, &presets)?;

    if args.print_palette {
        return print_palette(&config);
    }
    if args.is_headless() {
        return run_headless(&args, &config);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let (canvas_width, canvas_height) =
        ui::get_canvas_size(Rect::new(0, 0, size.width, size.height), false);

    let res = App::new(canvas_width, canvas_height, &config, presets, args.seed)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
        .and_then(|mut app| run_app(&mut terminal, &mut app));

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

/// Print every palette entry as a truecolor swatch with its index and RGB
fn print_palette(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let palette = if config.use_palette {
        Palette::fire(config.palette_size)?
    } else {
        Palette::grayscale()
    };

    let mut stdout = io::stdout();
    for (index, rgb) in palette.colors().iter().enumerate() {
        execute!(
            stdout,
            SetBackgroundColor(TermColor::Rgb {
                r: rgb.r,
                g: rgb.g,
                b: rgb.b,
            }),
            Print("      "),
            ResetColor,
            Print(format!(" {:>3}  {:>3} {:>3} {:>3}\n", index, rgb.r, rgb.g, rgb.b)),
        )?;
    }
    Ok(())
}

/// Simulate without a terminal and write the requested images
fn run_headless(args: &Args, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let palette = if config.use_palette {
        Palette::fire(config.palette_size)?
    } else {
        Palette::grayscale()
    };
    let mut sim = match args.seed {
        Some(seed) => {
            FireSimulation::seeded(args.width, args.height, config.settings.clone(), seed)?
        }
        None => FireSimulation::new(args.width, args.height, config.settings.clone())?,
    };
    info!(width = args.width, height = args.height, frames = args.frames, "headless run");

    let mut recorder = args
        .export_gif
        .as_ref()
        .map(|_| GifRecorder::new(sim.width(), sim.height()));

    for _ in 0..args.frames {
        sim.step();
        if let Some(recorder) = recorder.as_mut() {
            recorder.capture(sim.grid())?;
        }
    }

    if let Some(path) = &args.export_png {
        export::save_png(path, sim.grid(), sim.width(), sim.height(), &palette, args.scale)?;
        info!(path = %path.display(), "wrote png");
    }
    if let (Some(path), Some(recorder)) = (&args.export_gif, &recorder) {
        recorder.save(path, &palette, args.scale, config.target_fps)?;
        info!(path = %path.display(), frames = recorder.frame_count(), "wrote gif");
    }
    Ok(())
}

/// Recompute the canvas from the terminal size (after resize or layout change)
fn sync_canvas<B: ratatui::backend::Backend>(
    terminal: &Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    let size = terminal.size()?;
    let (canvas_width, canvas_height) = ui::get_canvas_size(
        Rect::new(0, 0, size.width, size.height),
        app.fullscreen_mode,
    );
    app.resize(canvas_width, canvas_height);
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        let frame_start = Instant::now();

        app.tick();
        terminal.draw(|frame| ui::render(frame, app))?;

        let budget = app.frame_budget();
        let elapsed = frame_start.elapsed();
        app.stats.record(elapsed, budget, app.target_fps);

        // Wait out the rest of the frame while listening for input
        let deadline = frame_start + budget.max(elapsed);
        while let Some(timeout) = deadline.checked_duration_since(Instant::now()) {
            if !event::poll(timeout)? {
                break;
            }
            match event::read()? {
                Event::Key(key) => {
                    // Only process Press events
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }

                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        return Ok(());
                    }

                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char(' ') => app.toggle_pause(),
                        KeyCode::Char('.') => app.step_once(),
                        KeyCode::Char('r') | KeyCode::Char('R') => app.reset(),
                        KeyCode::Char('f') | KeyCode::Char('F') => app.toggle_fire(),
                        KeyCode::Char('c') | KeyCode::Char('C') => app.toggle_palette(),
                        KeyCode::Char('p') | KeyCode::Char('P') => app.next_preset(),
                        KeyCode::Char('s') | KeyCode::Char('S') => app.snapshot(),
                        KeyCode::Char('v') | KeyCode::Char('V') => {
                            app.toggle_fullscreen();
                            sync_canvas(terminal, app)?;
                        }
                        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => {
                            app.toggle_help()
                        }
                        KeyCode::Char('+') | KeyCode::Char('=') => {
                            app.increase_fps();
                            app.focus = Focus::Fps;
                        }
                        KeyCode::Char('-') | KeyCode::Char('_') => {
                            app.decrease_fps();
                            app.focus = Focus::Fps;
                        }
                        KeyCode::Char('[') => {
                            app.adjust_downscale(-1);
                            app.focus = Focus::Downscale;
                        }
                        KeyCode::Char(']') => {
                            app.adjust_downscale(1);
                            app.focus = Focus::Downscale;
                        }

                        // Navigation
                        KeyCode::Tab => app.next_focus(),
                        KeyCode::BackTab => app.prev_focus(),
                        KeyCode::Up => {
                            if app.show_help {
                                app.scroll_help_up();
                            } else {
                                app.adjust_focused_up();
                            }
                        }
                        KeyCode::Down => {
                            if app.show_help {
                                app.scroll_help_down(ui::HELP_CONTENT_LINES);
                            } else {
                                app.adjust_focused_down();
                            }
                        }
                        KeyCode::Esc => {
                            if app.show_help {
                                app.toggle_help();
                            } else if app.focus.is_param() {
                                app.focus = Focus::Controls;
                            }
                        }
                        KeyCode::Char('j') | KeyCode::Char('J') => {
                            if app.show_help {
                                app.scroll_help_down(ui::HELP_CONTENT_LINES);
                            }
                        }
                        KeyCode::Char('k') | KeyCode::Char('K') => {
                            if app.show_help {
                                app.scroll_help_up();
                            }
                        }
                        _ => {}
                    }
                }
                Event::Resize(_, _) => sync_canvas(terminal, app)?,
                _ => {}
            }
        }
    }
}
