//! Named digital input/output bits.

use crate::backend::IoBackend;
use stage_common::error::MotionError;
use stage_common::hal::config::DigitalIoConfig;
use tracing::debug;

/// One digital signal.
///
/// Online, `get` reads the output register for outputs and the general input
/// group for inputs; writes to an input are ignored. Offline the mirror is
/// the signal and accepts writes in either direction.
pub struct DigitalIo {
    config: DigitalIoConfig,
    mirror: bool,
    backend: Box<dyn IoBackend>,
}

impl std::fmt::Debug for DigitalIo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitalIo")
            .field("config", &self.config)
            .field("mirror", &self.mirror)
            .finish_non_exhaustive()
    }
}

impl DigitalIo {
    /// Create a signal over `backend`.
    pub fn new(config: DigitalIoConfig, backend: Box<dyn IoBackend>) -> Self {
        Self {
            config,
            mirror: false,
            backend,
        }
    }

    /// Signal name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// True for an output.
    pub fn is_output(&self) -> bool {
        self.config.output
    }

    /// Persisted configuration.
    pub fn config(&self) -> &DigitalIoConfig {
        &self.config
    }

    /// Editable configuration; saved by `MotionSystem::save_io_params`.
    pub fn config_mut(&mut self) -> &mut DigitalIoConfig {
        &mut self.config
    }

    /// Last read or written value.
    pub fn cached(&self) -> bool {
        self.mirror
    }

    /// Current value of the bit.
    pub fn get(&mut self) -> Result<bool, MotionError> {
        self.backend.get(&self.config, &mut self.mirror)
    }

    /// Drive the bit.
    pub fn set(&mut self, value: bool) -> Result<(), MotionError> {
        debug!("IO '{}' <- {}", self.config.name, value);
        self.backend.set(&self.config, &mut self.mirror, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{LiveIo, SimulatedIo};
    use stage_hal::drivers::simulation::{DriverCall, SimulationDriver};
    use std::sync::Arc;

    fn config(name: &str, bit_no: u16, output: bool) -> DigitalIoConfig {
        DigitalIoConfig {
            name: name.to_string(),
            card_id: 0,
            bit_no,
            output,
        }
    }

    #[test]
    fn test_offline_mirror() {
        let mut io = DigitalIo::new(config("door", 2, false), Box::new(SimulatedIo));
        assert_eq!(io.get(), Ok(false));
        io.set(true).unwrap();
        assert_eq!(io.get(), Ok(true));
        assert!(io.cached());
    }

    #[test]
    fn test_online_output_round_trip() {
        let driver = Arc::new(SimulationDriver::new());
        let mut io = DigitalIo::new(config("valve", 7, true), Box::new(LiveIo::new(driver.clone())));

        io.set(true).unwrap();
        assert_eq!(io.get(), Ok(true));
        io.set(false).unwrap();
        assert_eq!(io.get(), Ok(false));
        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::SetOutputBit(7, true),
                DriverCall::ReadOutputs,
                DriverCall::SetOutputBit(7, false),
                DriverCall::ReadOutputs,
            ]
        );
    }

    #[test]
    fn test_online_input_reads_group_and_ignores_writes() {
        let driver = Arc::new(SimulationDriver::new());
        let mut io = DigitalIo::new(config("door", 3, false), Box::new(LiveIo::new(driver.clone())));

        driver.set_input(3, true);
        assert_eq!(io.get(), Ok(true));
        io.set(false).unwrap();
        assert!(io.cached());
        assert_eq!(driver.calls(), vec![DriverCall::ReadInputs(4)]);
    }

    #[test]
    fn test_edited_bit_past_register_width() {
        let driver = Arc::new(SimulationDriver::new());
        let mut io = DigitalIo::new(config("valve", 7, true), Box::new(LiveIo::new(driver.clone())));
        io.config_mut().bit_no = 40;

        let out_of_range = MotionError::IdOutOfRange { id: 40, count: 32 };
        assert_eq!(io.get(), Err(out_of_range.clone()));
        assert_eq!(io.set(true), Err(out_of_range));
        assert!(driver.calls().is_empty());
    }
}
