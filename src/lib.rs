//! Doom-style pixel fire.
//!
//! [`FireSimulation`] owns a byte grid whose bottom row is the heat source;
//! each [`step`](FireSimulation::step) pushes heat one row up with random
//! decay and sideways drift. [`Palette`] turns intensities into colors along
//! a black-body gradient. Everything else here is host-side glue: settings,
//! presets, config files and image export.
//!
//! ```
//! use doom_fire::{FireSettings, FireSimulation, Palette};
//!
//! let palette = Palette::fire(256)?;
//! let mut fire = FireSimulation::seeded(80, 40, FireSettings::default(), 7)?;
//! fire.step();
//! let top_left = palette.color(fire.grid()[0]);
//! assert_eq!(top_left, doom_fire::Rgb::BLACK);
//! # Ok::<(), doom_fire::FireError>(())
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod fire;
pub mod palette;
pub mod presets;
pub mod random;
pub mod settings;

pub use error::{ConfigError, ExportError, FireError};
pub use fire::FireSimulation;
pub use palette::{color_temperature_to_rgb, Palette, Rgb};
pub use random::{RandomSource, RngSource, SequenceSource};
pub use settings::FireSettings;
