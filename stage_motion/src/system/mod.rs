//! Motion system: the axis and IO tables plus the driver handle.
//!
//! [`MotionSystem`] is the coordinator. It is built once by [`MotionSystem::init`]
//! from a configuration directory and released by [`MotionSystem::discard`].
//! Axes and IO points are addressed by their 0-based position in `axis.toml`
//! and `dio.toml`.
//!
//! # Initialisation (online)
//!
//! 1. load `motion.toml` (optional), `axis.toml`, `dio.toml`
//! 2. enumerate cards and open each one
//! 3. reset the controller and initialise homing
//! 4. load `{card}.cfg` for every card
//! 5. reset every axis
//!
//! The first failing step aborts init. Cards opened before the failure stay
//! open.
//!
//! # Thread Safety
//!
//! Every operation takes `&self` or `&mut self`; callers sharing a system
//! between threads wrap it in a lock.

mod batch;
mod interpolation;

use crate::axis::Axis;
use crate::backend::{AxisBackend, IoBackend, LiveAxis, LiveIo, SimulatedAxis, SimulatedIo};
use crate::io::DigitalIo;
use crate::poll::PollTiming;
use serde::{Deserialize, Serialize};
use stage_common::config::{ConfigError, ConfigLoader, ConfigSaver, SharedConfig};
use stage_common::consts::{AXIS_FILE, CARD_CONFIG_EXT, IO_FILE, SYSTEM_FILE};
use stage_common::error::MotionError;
use stage_common::hal::config::{AxisTable, IoTable};
use stage_common::hal::driver::MotionDriver;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Whether operations reach the hardware.
#[derive(Clone)]
pub enum OperatingMode {
    /// No hardware; axes and IO only update their caches.
    Offline,
    /// All axes and IO share this driver.
    Online(Arc<dyn MotionDriver>),
}

impl OperatingMode {
    /// True when a driver is attached.
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online(_))
    }

    /// Attached driver, if any.
    pub fn driver(&self) -> Option<&Arc<dyn MotionDriver>> {
        match self {
            Self::Offline => None,
            Self::Online(driver) => Some(driver),
        }
    }
}

impl std::fmt::Debug for OperatingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offline => f.write_str("Offline"),
            Self::Online(driver) => write!(f, "Online({} {})", driver.name(), driver.version()),
        }
    }
}

/// Contents of the optional `motion.toml`.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "info"
/// service_name = "dispenser-stage"
///
/// [timing]
/// home_poll_ms = 50
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Logging and instance name.
    #[serde(default)]
    pub shared: SharedConfig,
    /// Poll intervals and settle delays.
    #[serde(default)]
    pub timing: PollTiming,
}

impl SystemConfig {
    /// Load `motion.toml` from `dir`, or defaults if it is absent.
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(SYSTEM_FILE);
        let config = match Self::load(&path) {
            Ok(config) => config,
            Err(ConfigError::FileNotFound(_)) => {
                debug!("{} not found, using defaults", path.display());
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.shared.validate()?;
        Ok(config)
    }
}

/// The coordinator of all axes and IO points.
#[derive(Debug)]
pub struct MotionSystem {
    config_dir: PathBuf,
    mode: OperatingMode,
    settings: SystemConfig,
    axes: Vec<Axis>,
    dio: Vec<DigitalIo>,
}

impl MotionSystem {
    /// Load the configuration in `config_dir` and bring up the hardware.
    ///
    /// # Errors
    ///
    /// - `FileNotExist` if `axis.toml`, `dio.toml` or an online card's `{card}.cfg` is missing
    /// - `ConfigInvalid` if a file cannot be parsed or fails validation
    /// - `Driver` for the first failing driver call
    pub fn init(config_dir: &Path, mode: OperatingMode) -> Result<Self, MotionError> {
        info!("Initialising motion system from {} ({:?})", config_dir.display(), mode);

        let settings = SystemConfig::load_or_default(config_dir)?;
        let axis_table = AxisTable::load(&config_dir.join(AXIS_FILE))?;
        axis_table.validate()?;
        let io_table = IoTable::load(&config_dir.join(IO_FILE))?;
        io_table.validate()?;

        let timing = settings.timing;
        let axes = axis_table
            .axis
            .into_iter()
            .map(|cfg| {
                let backend: Box<dyn AxisBackend> = match &mode {
                    OperatingMode::Offline => Box::new(SimulatedAxis),
                    OperatingMode::Online(driver) => {
                        Box::new(LiveAxis::new(driver.clone(), cfg.hw()))
                    }
                };
                Axis::new(cfg, backend, timing)
            })
            .collect::<Vec<_>>();
        let dio = io_table
            .io
            .into_iter()
            .map(|cfg| {
                let backend: Box<dyn IoBackend> = match &mode {
                    OperatingMode::Offline => Box::new(SimulatedIo),
                    OperatingMode::Online(driver) => Box::new(LiveIo::new(driver.clone())),
                };
                DigitalIo::new(cfg, backend)
            })
            .collect::<Vec<_>>();

        if let OperatingMode::Online(driver) = &mode {
            Self::open_controller(driver.as_ref(), config_dir)?;
        }

        let mut system = Self {
            config_dir: config_dir.to_path_buf(),
            mode,
            settings,
            axes,
            dio,
        };
        for axis in system.axes.iter_mut() {
            axis.reset()?;
        }

        info!(
            "Motion system '{}' ready: {} axes, {} IO points",
            system.settings.shared.service_name,
            system.axes.len(),
            system.dio.len()
        );
        Ok(system)
    }

    fn open_controller(driver: &dyn MotionDriver, config_dir: &Path) -> Result<(), MotionError> {
        let cards = driver.enumerate_cards()?;
        info!("Found {} controller card(s)", cards);
        for card in 0..cards {
            driver.open(card)?;
            info!("Card {} opened", card);
        }
        driver.reset_controller()?;
        driver.home_init()?;
        for card in 0..cards {
            let path = config_dir.join(format!("{card}.{CARD_CONFIG_EXT}"));
            if !path.is_file() {
                warn!("Card {} configuration missing: {}", card, path.display());
                return Err(MotionError::FileNotExist(path));
            }
            debug!("Loading card {} configuration {}", card, path.display());
            driver.load_card_config(card, &path)?;
        }
        Ok(())
    }

    /// Disable every axis and close the driver. No-op offline.
    ///
    /// Disable failures are logged and skipped; the close status is returned
    /// as is, so a second discard reports the driver's "not open" error.
    pub fn discard(&mut self) -> Result<(), MotionError> {
        let Some(driver) = self.mode.driver().cloned() else {
            debug!("Offline discard");
            return Ok(());
        };
        info!("Discarding motion system");
        for axis in self.axes.iter_mut() {
            if let Err(e) = axis.set_enabled(false) {
                warn!("Failed to disable axis '{}': {}", axis.name(), e);
            }
        }
        driver.close()?;
        Ok(())
    }

    /// Operating mode fixed at init.
    pub fn mode(&self) -> &OperatingMode {
        &self.mode
    }

    /// True when attached to hardware.
    pub fn is_online(&self) -> bool {
        self.mode.is_online()
    }

    /// Directory the configuration was loaded from.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Settings from `motion.toml`.
    pub fn settings(&self) -> &SystemConfig {
        &self.settings
    }

    /// Replace the poll timing of the system and every axis.
    pub fn set_timing(&mut self, timing: PollTiming) {
        self.settings.timing = timing;
        for axis in self.axes.iter_mut() {
            axis.set_timing(timing);
        }
    }

    /// Number of axes.
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    /// All axes in logical order.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Axis by logical index.
    pub fn axis(&self, id: usize) -> Result<&Axis, MotionError> {
        let count = self.axes.len();
        self.axes
            .get(id)
            .ok_or(MotionError::IdOutOfRange { id, count })
    }

    /// Mutable axis by logical index.
    pub fn axis_mut(&mut self, id: usize) -> Result<&mut Axis, MotionError> {
        let count = self.axes.len();
        self.axes
            .get_mut(id)
            .ok_or(MotionError::IdOutOfRange { id, count })
    }

    /// Logical index of the axis called `name`.
    pub fn axis_index(&self, name: &str) -> Option<usize> {
        self.axes.iter().position(|a| a.name() == name)
    }

    /// Number of IO points.
    pub fn dio_count(&self) -> usize {
        self.dio.len()
    }

    /// IO point by logical index.
    pub fn dio(&self, id: usize) -> Result<&DigitalIo, MotionError> {
        let count = self.dio.len();
        self.dio
            .get(id)
            .ok_or(MotionError::IdOutOfRange { id, count })
    }

    /// Mutable IO point by logical index.
    pub fn dio_mut(&mut self, id: usize) -> Result<&mut DigitalIo, MotionError> {
        let count = self.dio.len();
        self.dio
            .get_mut(id)
            .ok_or(MotionError::IdOutOfRange { id, count })
    }

    /// Logical index of the IO point called `name`.
    pub fn dio_index(&self, name: &str) -> Option<usize> {
        self.dio.iter().position(|d| d.name() == name)
    }

    /// Write the axis table to `path`, default `axis.toml` in the config directory.
    pub fn save_axis_params(&self, path: Option<&Path>) -> Result<(), MotionError> {
        let table = AxisTable {
            axis: self.axes.iter().map(|a| a.config().clone()).collect(),
        };
        table.validate()?;
        let path = path.map_or_else(|| self.config_dir.join(AXIS_FILE), Path::to_path_buf);
        table.save(&path)?;
        info!("Saved {} axes to {}", table.axis.len(), path.display());
        Ok(())
    }

    /// Write the IO table to `path`, default `dio.toml` in the config directory.
    pub fn save_io_params(&self, path: Option<&Path>) -> Result<(), MotionError> {
        let table = IoTable {
            io: self.dio.iter().map(|d| d.config().clone()).collect(),
        };
        table.validate()?;
        let path = path.map_or_else(|| self.config_dir.join(IO_FILE), Path::to_path_buf);
        table.save(&path)?;
        info!("Saved {} IO points to {}", table.io.len(), path.display());
        Ok(())
    }

    /// Validate logical axis ids.
    pub(crate) fn check_ids(&self, ids: &[usize]) -> Result<(), MotionError> {
        let count = self.axes.len();
        match ids.iter().find(|&&id| id >= count) {
            Some(&id) => Err(MotionError::IdOutOfRange { id, count }),
            None => Ok(()),
        }
    }

    /// Validate logical axis ids and that they share one card.
    pub(crate) fn check_one_card(&self, ids: &[usize]) -> Result<(), MotionError> {
        self.check_ids(ids)?;
        let mut cards = ids.iter().map(|&id| self.axes[id].card_id());
        if let Some(first) = cards.next() {
            if cards.any(|card| card != first) {
                return Err(MotionError::AxesNotInOneCard);
            }
        }
        Ok(())
    }
}
