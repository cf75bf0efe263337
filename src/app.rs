use crate::blocks;
use doom_fire::config::AppConfig;
use doom_fire::export;
use doom_fire::presets::PresetManager;
use doom_fire::{FireError, FireSettings, FireSimulation, Palette};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Upscale factor for PNG snapshots
const SNAPSHOT_SCALE: u32 = 4;

/// Focus state for parameter editing in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    Fade,
    Spread,
    Wind,
    Bits,
    Fps,
    Downscale,
    // Controls box (not a param)
    Controls,
}

impl Focus {
    /// Tab cycles through parameters in sidebar order
    pub fn next(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Fade,
            Focus::Fade => Focus::Spread,
            Focus::Spread => Focus::Wind,
            Focus::Wind => Focus::Bits,
            Focus::Bits => Focus::Fps,
            Focus::Fps => Focus::Downscale,
            Focus::Downscale => Focus::Fade, // Loop back
        }
    }

    /// Shift+Tab cycles through parameters in reverse order
    pub fn prev(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Downscale,
            Focus::Fade => Focus::Downscale, // Loop back
            Focus::Spread => Focus::Fade,
            Focus::Wind => Focus::Spread,
            Focus::Bits => Focus::Wind,
            Focus::Fps => Focus::Bits,
            Focus::Downscale => Focus::Fps,
        }
    }

    /// Line of this parameter in the sidebar params box
    pub fn line_index(&self) -> u16 {
        match self {
            Focus::None | Focus::Controls | Focus::Fade => 0,
            Focus::Spread => 1,
            Focus::Wind => 2,
            Focus::Bits => 3,
            Focus::Fps => 4,
            Focus::Downscale => 5,
        }
    }

    /// Check if focus is on a parameter (not Controls or None)
    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::None | Focus::Controls)
    }
}

/// Measured frame pacing
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub actual_fps: u32,
    pub frame_missed: bool,
}

impl FrameStats {
    /// Update from the time one step + draw took against the frame budget
    pub fn record(&mut self, elapsed: Duration, budget: Duration, target_fps: u32) {
        self.frame_missed = elapsed > budget;
        let secs = elapsed.as_secs_f32();
        self.actual_fps = if secs > 0.0 {
            ((1.0 / secs) as u32).min(target_fps)
        } else {
            target_fps
        };
    }
}

/// Main application state
pub struct App {
    pub simulation: FireSimulation,
    pub palette: Palette,
    pub grayscale: Palette,
    pub use_palette: bool,
    pub paused: bool,
    pub focus: Focus,
    pub fullscreen_mode: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    pub target_fps: u32,
    pub downscale: u16,
    pub stats: FrameStats,
    pub presets: PresetManager,
    pub preset_index: usize,
    pub status_message: Option<String>,
    canvas: (u16, u16),
}

impl App {
    pub fn new(
        canvas_width: u16,
        canvas_height: u16,
        config: &AppConfig,
        presets: PresetManager,
        seed: Option<u64>,
    ) -> Result<Self, FireError> {
        let downscale = config.downscale.clamp(1, 8);
        let (sim_width, sim_height) =
            blocks::calculate_simulation_size(canvas_width, canvas_height, downscale);
        let simulation = match seed {
            Some(seed) => {
                FireSimulation::seeded(sim_width, sim_height, config.settings.clone(), seed)?
            }
            None => FireSimulation::new(sim_width, sim_height, config.settings.clone())?,
        };

        Ok(Self {
            simulation,
            palette: Palette::fire(config.palette_size)?,
            grayscale: Palette::grayscale(),
            use_palette: config.use_palette,
            paused: false,
            focus: Focus::Controls,
            fullscreen_mode: false,
            show_help: false,
            help_scroll: 0,
            target_fps: config.target_fps.clamp(1, 120),
            downscale,
            stats: FrameStats::default(),
            presets,
            preset_index: 0,
            status_message: None,
            canvas: (canvas_width, canvas_height),
        })
    }

    /// Palette currently used for display
    pub fn active_palette(&self) -> &Palette {
        if self.use_palette {
            &self.palette
        } else {
            &self.grayscale
        }
    }

    /// Time budget for one frame at the target rate
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }

    /// Run one simulation step unless paused
    pub fn tick(&mut self) {
        if !self.paused {
            self.simulation.step();
        }
    }

    /// Advance exactly one step while paused
    pub fn step_once(&mut self) {
        if self.paused {
            self.simulation.step();
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Fade => self.edit_settings(|s| s.adjust_fade_speed(0.25)),
            Focus::Spread => self.edit_settings(|s| s.adjust_spread(0.25)),
            Focus::Wind => self.edit_settings(|s| s.adjust_wind(0.1)),
            Focus::Bits => self.edit_settings(|s| s.adjust_precision_bits(1)),
            Focus::Fps => self.increase_fps(),
            Focus::Downscale => self.adjust_downscale(1),
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Fade => self.edit_settings(|s| s.adjust_fade_speed(-0.25)),
            Focus::Spread => self.edit_settings(|s| s.adjust_spread(-0.25)),
            Focus::Wind => self.edit_settings(|s| s.adjust_wind(-0.1)),
            Focus::Bits => self.edit_settings(|s| s.adjust_precision_bits(-1)),
            Focus::Fps => self.decrease_fps(),
            Focus::Downscale => self.adjust_downscale(-1),
        }
    }

    /// Apply a clamped edit to a copy of the settings
    fn edit_settings(&mut self, edit: impl FnOnce(&mut FireSettings)) {
        let mut settings = self.simulation.settings().clone();
        edit(&mut settings);
        if let Err(err) = self.simulation.apply_settings(settings) {
            self.status_message = Some(err.to_string());
        }
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Reset simulation
    pub fn reset(&mut self) {
        self.simulation.initialize();
    }

    /// Light or extinguish the heat source
    pub fn toggle_fire(&mut self) {
        self.simulation.toggle_fire();
    }

    /// Switch between fire palette and raw grayscale intensities
    pub fn toggle_palette(&mut self) {
        self.use_palette = !self.use_palette;
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Load the next preset in the combined builtin + user list
    pub fn next_preset(&mut self) {
        if self.presets.is_empty() {
            return;
        }
        self.preset_index = (self.preset_index + 1) % self.presets.len();
        self.apply_current_preset();
    }

    fn apply_current_preset(&mut self) {
        let Some(preset) = self.presets.cycle(self.preset_index) else {
            return;
        };
        let name = preset.name.clone();
        // Keep the fire state the user chose; presets only shape the flames
        let settings = FireSettings {
            fire_active: self.simulation.settings().fire_active,
            ..preset.settings.clone()
        };
        match self.simulation.apply_settings(settings) {
            Ok(()) => {
                info!(preset = %name, "preset applied");
                self.status_message = Some(format!("Preset: {}", name));
            }
            Err(err) => self.status_message = Some(err.to_string()),
        }
    }

    /// Name of the most recently applied preset
    pub fn preset_name(&self) -> &str {
        self.presets
            .cycle(self.preset_index)
            .map(|p| p.name.as_str())
            .unwrap_or("-")
    }

    /// Resize simulation to match new canvas size (hard reset)
    pub fn resize(&mut self, canvas_width: u16, canvas_height: u16) {
        self.canvas = (canvas_width, canvas_height);
        let (sim_width, sim_height) =
            blocks::calculate_simulation_size(canvas_width, canvas_height, self.downscale);
        if let Err(err) = self.simulation.resize(sim_width, sim_height) {
            warn!(%err, "resize rejected");
            self.status_message = Some(err.to_string());
        }
    }

    /// Change terminal pixels per simulation cell (1-8)
    pub fn adjust_downscale(&mut self, delta: i32) {
        let downscale = (self.downscale as i32 + delta).clamp(1, 8) as u16;
        if downscale != self.downscale {
            self.downscale = downscale;
            let (w, h) = self.canvas;
            self.resize(w, h);
        }
    }

    /// Increase target frame rate
    pub fn increase_fps(&mut self) {
        self.target_fps = (self.target_fps + 5).min(120);
    }

    /// Decrease target frame rate
    pub fn decrease_fps(&mut self) {
        self.target_fps = self.target_fps.saturating_sub(5).max(5);
    }

    /// Save the current frame as a PNG in the working directory
    pub fn snapshot(&mut self) {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let path = PathBuf::from(format!("doom-fire-{}.png", stamp));

        let result = export::save_png(
            &path,
            self.simulation.grid(),
            self.simulation.width(),
            self.simulation.height(),
            self.active_palette(),
            SNAPSHOT_SCALE,
        );
        self.status_message = Some(match result {
            Ok(()) => format!("Saved {}", path.display()),
            Err(err) => {
                warn!(%err, "snapshot failed");
                format!("Snapshot failed: {}", err)
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(40, 10, &AppConfig::default(), PresetManager::with_dir(None), Some(1)).unwrap()
    }

    #[test]
    fn test_new_sizes_simulation_from_canvas() {
        let app = test_app();
        assert_eq!(app.simulation.width(), 40);
        assert_eq!(app.simulation.height(), 20);
    }

    #[test]
    fn test_focus_cycle_round_trips() {
        let mut focus = Focus::Fade;
        for _ in 0..6 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Fade);
        assert_eq!(Focus::Fade.prev().next(), Focus::Fade);
        assert!(!Focus::Controls.is_param());
    }

    #[test]
    fn test_adjust_focused_parameters() {
        let mut app = test_app();
        app.focus = Focus::Wind;
        app.adjust_focused_up();
        assert!((app.simulation.settings().wind - 0.1).abs() < 1e-6);

        app.focus = Focus::Bits;
        app.adjust_focused_down();
        assert_eq!(app.simulation.settings().precision_bits, 15);
    }

    #[test]
    fn test_pause_blocks_tick_but_not_single_step() {
        let mut app = test_app();
        app.toggle_pause();
        let before = app.simulation.grid().to_vec();
        app.tick();
        assert_eq!(app.simulation.grid(), before.as_slice());
        app.step_once();
        assert_ne!(app.simulation.grid(), before.as_slice());
    }

    #[test]
    fn test_downscale_resizes() {
        let mut app = test_app();
        app.adjust_downscale(1);
        assert_eq!(app.downscale, 2);
        assert_eq!(app.simulation.width(), 20);
        assert_eq!(app.simulation.height(), 10);
        app.adjust_downscale(-10);
        assert_eq!(app.downscale, 1);
        assert_eq!(app.simulation.width(), 40);
    }

    #[test]
    fn test_presets_keep_fire_state() {
        let mut app = test_app();
        app.toggle_fire();
        app.next_preset();
        assert_eq!(app.preset_name(), "Inferno");
        assert_eq!(app.simulation.settings().fade_speed, 1.75);
        assert!(!app.simulation.settings().fire_active);
    }

    #[test]
    fn test_resize_always_resets() {
        let mut app = test_app();
        for _ in 0..5 {
            app.tick();
        }
        assert!(app.simulation.grid()[..40 * 19].iter().any(|&v| v > 0));

        // Same canvas, same grid size: still a fresh fire
        app.resize(40, 10);
        assert_eq!(app.simulation.width(), 40);
        assert!(app.simulation.grid()[..40 * 19].iter().all(|&v| v == 0));
        assert!(app.simulation.grid()[40 * 19..].iter().all(|&v| v == 255));
    }

    #[test]
    fn test_frame_stats() {
        let mut stats = FrameStats::default();
        stats.record(Duration::from_millis(50), Duration::from_millis(33), 30);
        assert!(stats.frame_missed);
        assert_eq!(stats.actual_fps, 20);

        stats.record(Duration::from_millis(5), Duration::from_millis(33), 30);
        assert!(!stats.frame_missed);
        assert_eq!(stats.actual_fps, 30);
    }
}
