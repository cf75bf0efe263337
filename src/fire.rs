use crate::error::FireError;
use crate::random::{RandomSource, RngSource};
use crate::settings::{check_fade_speed, check_finite, check_precision_bits, FireSettings};
use rand::rngs::StdRng;
use tracing::debug;

/// Intensity of a burning seed row cell
pub const HEAT_MAX: u8 = u8::MAX;

/// Pixel fire simulation state.
///
/// The grid is `width * height` bytes, row-major, row 0 at the top. The last
/// row is the heat source: it only changes on [`initialize`](Self::initialize)
/// or when `fire_active` flips. Every step pushes each cell of row `y` into
/// row `y - 1`, at a randomly displaced column and with random decay.
pub struct FireSimulation<R = RngSource<StdRng>> {
    width: usize,
    height: usize,
    grid: Vec<u8>,
    settings: FireSettings,
    /// `fire_active` as of the last seed row write
    seeded_active: bool,
    rng: R,
}

impl FireSimulation {
    /// Create a simulation drawing from an entropy-seeded generator
    pub fn new(width: usize, height: usize, settings: FireSettings) -> Result<Self, FireError> {
        Self::with_source(width, height, settings, RngSource::from_entropy())
    }

    /// Create a reproducible simulation for a fixed seed
    pub fn seeded(
        width: usize,
        height: usize,
        settings: FireSettings,
        seed: u64,
    ) -> Result<Self, FireError> {
        Self::with_source(width, height, settings, RngSource::seeded(seed))
    }
}

impl<R: RandomSource> FireSimulation<R> {
    /// Create a simulation using a caller supplied random source
    pub fn with_source(
        width: usize,
        height: usize,
        settings: FireSettings,
        rng: R,
    ) -> Result<Self, FireError> {
        let len = grid_len(width, height)?;
        settings.validate()?;

        let mut sim = Self {
            width,
            height,
            grid: vec![0; len],
            seeded_active: settings.fire_active,
            settings,
            rng,
        };
        sim.initialize();
        Ok(sim)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn settings(&self) -> &FireSettings {
        &self.settings
    }

    /// Current intensities, row-major.
    ///
    /// This is the live buffer: copy it before the next [`step`](Self::step)
    /// if a stable snapshot is needed.
    pub fn grid(&self) -> &[u8] {
        &self.grid
    }

    /// Intensity at (x, y), or `None` outside the grid
    pub fn cell(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.grid[y * self.width + x])
        } else {
            None
        }
    }

    /// Zero the grid and light the seed row if the fire is active
    pub fn initialize(&mut self) {
        self.grid.fill(0);
        if self.settings.fire_active {
            self.fill_seed_row(HEAT_MAX);
        }
        self.seeded_active = self.settings.fire_active;
        debug!(
            width = self.width,
            height = self.height,
            fire_active = self.settings.fire_active,
            "fire grid initialized"
        );
    }

    /// Replace the grid with a freshly initialized one of the new size
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), FireError> {
        let len = grid_len(width, height)?;
        self.width = width;
        self.height = height;
        self.grid = vec![0; len];
        self.initialize();
        Ok(())
    }

    /// Replace all parameters at once; they take effect on the next step
    pub fn apply_settings(&mut self, settings: FireSettings) -> Result<(), FireError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn set_fade_speed(&mut self, fade_speed: f32) -> Result<(), FireError> {
        check_fade_speed(fade_speed)?;
        self.settings.fade_speed = fade_speed;
        Ok(())
    }

    pub fn set_spread(&mut self, spread: f32) -> Result<(), FireError> {
        check_finite("spread", spread)?;
        self.settings.spread = spread;
        Ok(())
    }

    pub fn set_wind(&mut self, wind: f32) -> Result<(), FireError> {
        check_finite("wind", wind)?;
        self.settings.wind = wind;
        Ok(())
    }

    pub fn set_precision_bits(&mut self, bits: u32) -> Result<(), FireError> {
        check_precision_bits(bits)?;
        self.settings.precision_bits = bits;
        Ok(())
    }

    /// Light or extinguish the seed row; the row is rewritten on the next step
    pub fn set_fire_active(&mut self, active: bool) {
        self.settings.fire_active = active;
    }

    pub fn toggle_fire(&mut self) {
        self.set_fire_active(!self.settings.fire_active);
    }

    /// Advance the fire by one frame
    pub fn step(&mut self) {
        if self.seeded_active != self.settings.fire_active {
            let value = if self.settings.fire_active { HEAT_MAX } else { 0 };
            self.fill_seed_row(value);
            self.seeded_active = self.settings.fire_active;
            debug!(fire_active = self.settings.fire_active, "seed row rewritten");
        }

        let width = self.width;
        for y in 1..self.height {
            let row = y * width;
            let next_row = (y - 1) * width;
            for x in 0..width {
                self.spread_fire(x, row, next_row);
            }
        }
    }

    /// Push the cell at `row + x` into the row above
    fn spread_fire(&mut self, x: usize, row: usize, next_row: usize) {
        let bits = self.settings.precision_bits;
        // Without entropy there is neither fade nor random spread, only wind
        let (rnd, remapped) = if bits == 0 {
            (0.0, 0.0)
        } else {
            let rnd = self.rng.draw(bits);
            (rnd, (rnd - 0.5) * 2.0)
        };

        let offset = remapped * f64::from(self.settings.spread) + f64::from(self.settings.wind);
        let target_x = wrap_column(x, offset, self.width);
        let next_idx = next_row + target_x;

        let pixel = self.grid[row + x];
        if pixel == 0 {
            self.grid[next_idx] = 0;
            return;
        }

        let decay = rnd * f64::from(self.settings.fade_speed);
        let faded = (f64::from(pixel) - decay).round_ties_even();
        self.grid[next_idx] = faded.clamp(0.0, f64::from(HEAT_MAX)) as u8;
    }

    fn fill_seed_row(&mut self, value: u8) {
        let offset = self.width * (self.height - 1);
        self.grid[offset..].fill(value);
    }
}

/// Column `x` moved by the rounded `offset`, wrapped into `0..width`
fn wrap_column(x: usize, offset: f64, width: usize) -> usize {
    let width = width as i64;
    // Offsets beyond the i64 range saturate; wrapping makes the exact value irrelevant
    let shift = (offset.round() as i64).rem_euclid(width);
    ((x as i64 + shift).rem_euclid(width)) as usize
}

fn grid_len(width: usize, height: usize) -> Result<usize, FireError> {
    if width == 0 || height == 0 {
        return Err(FireError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(FireError::InvalidDimensions { width, height })
}
