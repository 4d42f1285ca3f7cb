//! MCP4725 12-bit DAC (I2C)
//!
//! The MCP4725 has a DAC register and an EEPROM. The EEPROM contents are
//! loaded into the DAC register at power-on, on a general-call reset, and
//! its power-down bits on a general-call wake-up.
//!
//! # Frames
//!
//! Fast write (DAC register only, 2 bytes):
//! - `0 0 PD1 PD0 D11 D10 D9 D8`
//! - `D7 .. D0`
//!
//! Write DAC register and EEPROM (3 bytes):
//! - `0 1 1 x x PD1 PD0 x`
//! - `D11 .. D4`
//! - `D3 D2 D1 D0 x x x x`
//!
//! Read (5 bytes): status + PD bits, DAC register (left-justified),
//! EEPROM PD bits + value (right-justified).

use tickwire_hal::i2c::{I2cBus, TimeoutMs, GENERAL_CALL_ADDRESS};

/// MCP4725 command constants
pub mod cmd {
    /// Power-down bits position in a fast-write frame
    pub const FAST_WRITE_PD_POS: u8 = 4;
    /// Write DAC register and EEPROM
    pub const WRITE_EEPROM: u8 = 0x03;
    /// Command bits position in a write-EEPROM frame
    pub const WRITE_EEPROM_CMD_POS: u8 = 5;
    /// Power-down bits position in a write-EEPROM frame
    pub const WRITE_EEPROM_PD_POS: u8 = 1;
    /// General call: reset and reload from EEPROM
    pub const GENERAL_CALL_RESET: u8 = 0x06;
    /// General call: wake up
    pub const GENERAL_CALL_WAKEUP: u8 = 0x09;
}

/// Largest 12-bit DAC code
pub const MAX_VALUE: u16 = 0x0FFF;

/// Default address (A0 tied low); 0x61 with A0 high
pub const DEFAULT_ADDRESS: u8 = 0x60;

/// Presence probe attempts during init
pub const PROBE_TRIALS: u32 = 3;

/// Timeout for every bus transaction
pub const TIMEOUT_MS: TimeoutMs = 5;

/// Output state selectable independently of the DAC code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PowerDownMode {
    /// Output driven
    #[default]
    Normal,
    /// Powered down, 1 kΩ to ground
    Pulldown1k,
    /// Powered down, 100 kΩ to ground
    Pulldown100k,
    /// Powered down, 500 kΩ to ground
    Pulldown500k,
}

impl PowerDownMode {
    /// 2-bit PD1:PD0 code
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Mode from a 2-bit code (upper bits ignored)
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => PowerDownMode::Normal,
            1 => PowerDownMode::Pulldown1k,
            2 => PowerDownMode::Pulldown100k,
            _ => PowerDownMode::Pulldown500k,
        }
    }
}

/// Frame building errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// DAC code above 12 bits
    ValueOutOfRange,
}

fn check_value(value: u16) -> Result<u16, FrameError> {
    if value > MAX_VALUE {
        return Err(FrameError::ValueOutOfRange);
    }
    Ok(value)
}

/// Build a fast-write frame
pub fn build_fast_write(value: u16, mode: PowerDownMode) -> Result<[u8; 2], FrameError> {
    let value = check_value(value)?;
    Ok([
        (mode.bits() << cmd::FAST_WRITE_PD_POS) | ((value >> 8) as u8 & 0x0F),
        (value & 0xFF) as u8,
    ])
}

/// Build a write-DAC-and-EEPROM frame
pub fn build_eeprom_write(value: u16, mode: PowerDownMode) -> Result<[u8; 3], FrameError> {
    let value = check_value(value)?;
    Ok([
        (cmd::WRITE_EEPROM << cmd::WRITE_EEPROM_CMD_POS) | (mode.bits() << cmd::WRITE_EEPROM_PD_POS),
        (value >> 4) as u8,
        ((value & 0x0F) as u8) << 4,
    ])
}

/// Decoded 5-byte read response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readback {
    /// Current DAC register code
    pub register_value: u16,
    /// Current power-down mode
    pub power_mode: PowerDownMode,
    /// Code stored in EEPROM
    pub nonvolatile_value: u16,
    /// Power-down mode stored in EEPROM
    pub nonvolatile_power_mode: PowerDownMode,
}

impl Readback {
    /// Decode a read response
    pub fn from_bytes(bytes: &[u8; 5]) -> Self {
        Self {
            power_mode: PowerDownMode::from_bits((bytes[0] & 0x06) >> 1),
            register_value: (u16::from(bytes[1]) << 4) | (u16::from(bytes[2] & 0xF0) >> 4),
            nonvolatile_power_mode: PowerDownMode::from_bits((bytes[3] & 0x60) >> 5),
            nonvolatile_value: (u16::from(bytes[3] & 0x0F) << 8) | u16::from(bytes[4]),
        }
    }
}

/// MCP4725 driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mcp4725Config {
    /// 7-bit device address (0x60 or 0x61)
    pub address: u8,
    /// DAC code written during init
    pub initial_value: u16,
    /// Power-down mode written during init
    pub power_mode: PowerDownMode,
}

impl Default for Mcp4725Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            initial_value: 0,
            power_mode: PowerDownMode::Normal,
        }
    }
}

/// MCP4725 driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mcp4725Error<E> {
    /// Device did not answer the presence probe
    NotPresent,
    /// Driver used before a successful init
    NotInitialized,
    /// Bus transaction failed (timeout, NACK)
    Bus(E),
    /// Invalid DAC code
    Frame(FrameError),
}

impl<E> From<FrameError> for Mcp4725Error<E> {
    fn from(e: FrameError) -> Self {
        Mcp4725Error::Frame(e)
    }
}

/// MCP4725 driver
///
/// Caches the last written DAC register and power-down mode, plus the
/// EEPROM contents from the last readback.
pub struct Mcp4725<B> {
    bus: B,
    config: Mcp4725Config,
    register_value: u16,
    power_mode: PowerDownMode,
    nonvolatile_value: u16,
    nonvolatile_power_mode: PowerDownMode,
    initialized: bool,
}

impl<B: I2cBus> Mcp4725<B> {
    /// Create a driver; nothing is sent until [`Mcp4725::init`]
    pub fn new(bus: B, config: Mcp4725Config) -> Self {
        Self {
            bus,
            config,
            register_value: 0,
            power_mode: PowerDownMode::Normal,
            nonvolatile_value: 0,
            nonvolatile_power_mode: PowerDownMode::Normal,
            initialized: false,
        }
    }

    /// Probe the device, write the initial code and read back the EEPROM
    pub fn init(&mut self) -> Result<(), Mcp4725Error<B::Error>> {
        self.initialized = false;

        if self
            .bus
            .probe(self.config.address, PROBE_TRIALS, TIMEOUT_MS)
            .is_err()
        {
            #[cfg(feature = "defmt")]
            defmt::warn!("MCP4725 not found at {=u8:#x}", self.config.address);
            return Err(Mcp4725Error::NotPresent);
        }

        self.fast_write(self.config.initial_value, self.config.power_mode)?;
        self.readback()?;
        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "MCP4725 at {=u8:#x} ready, EEPROM code {=u16}",
            self.config.address,
            self.nonvolatile_value
        );
        Ok(())
    }

    /// Check if init succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn ensure_initialized(&self) -> Result<(), Mcp4725Error<B::Error>> {
        if self.initialized {
            Ok(())
        } else {
            Err(Mcp4725Error::NotInitialized)
        }
    }

    fn fast_write(&mut self, value: u16, mode: PowerDownMode) -> Result<(), Mcp4725Error<B::Error>> {
        let frame = build_fast_write(value, mode)?;
        self.bus
            .write(self.config.address, &frame, TIMEOUT_MS)
            .map_err(Mcp4725Error::Bus)?;
        self.register_value = value;
        self.power_mode = mode;
        Ok(())
    }

    fn readback(&mut self) -> Result<Readback, Mcp4725Error<B::Error>> {
        let mut bytes = [0u8; 5];
        self.bus
            .read(self.config.address, &mut bytes, TIMEOUT_MS)
            .map_err(Mcp4725Error::Bus)?;
        let readback = Readback::from_bytes(&bytes);
        self.register_value = readback.register_value;
        self.power_mode = readback.power_mode;
        self.nonvolatile_value = readback.nonvolatile_value;
        self.nonvolatile_power_mode = readback.nonvolatile_power_mode;
        Ok(readback)
    }

    fn general_call(&mut self, command: u8) -> Result<(), Mcp4725Error<B::Error>> {
        self.ensure_initialized()?;
        self.bus
            .write(GENERAL_CALL_ADDRESS, &[command], TIMEOUT_MS)
            .map_err(Mcp4725Error::Bus)?;
        // The device reloads its register from EEPROM
        self.register_value = self.nonvolatile_value;
        self.power_mode = self.nonvolatile_power_mode;
        Ok(())
    }

    /// Write the DAC register with a power-down mode
    pub fn write_register(
        &mut self,
        value: u16,
        mode: PowerDownMode,
    ) -> Result<(), Mcp4725Error<B::Error>> {
        self.ensure_initialized()?;
        self.fast_write(value, mode)
    }

    /// Write the DAC register, keeping the current power-down mode
    pub fn write_register_fast(&mut self, value: u16) -> Result<(), Mcp4725Error<B::Error>> {
        self.ensure_initialized()?;
        self.fast_write(value, self.power_mode)
    }

    /// Change the power-down mode, keeping the current DAC code
    pub fn write_power_down(&mut self, mode: PowerDownMode) -> Result<(), Mcp4725Error<B::Error>> {
        self.ensure_initialized()?;
        self.fast_write(self.register_value, mode)
    }

    /// Write the DAC register and EEPROM
    ///
    /// The cached EEPROM values are not updated; call
    /// [`Mcp4725::read_nonvolatile`] once the EEPROM write has finished.
    pub fn write_nonvolatile(
        &mut self,
        value: u16,
        mode: PowerDownMode,
    ) -> Result<(), Mcp4725Error<B::Error>> {
        self.ensure_initialized()?;
        let frame = build_eeprom_write(value, mode)?;
        self.bus
            .write(self.config.address, &frame, TIMEOUT_MS)
            .map_err(Mcp4725Error::Bus)
    }

    /// Read the DAC register and EEPROM contents
    pub fn read_nonvolatile(&mut self) -> Result<Readback, Mcp4725Error<B::Error>> {
        self.ensure_initialized()?;
        self.readback()
    }

    /// General-call reset: every device on the bus reloads from EEPROM
    pub fn broadcast_reset(&mut self) -> Result<(), Mcp4725Error<B::Error>> {
        self.general_call(cmd::GENERAL_CALL_RESET)
    }

    /// General-call wake-up
    pub fn broadcast_wake(&mut self) -> Result<(), Mcp4725Error<B::Error>> {
        self.general_call(cmd::GENERAL_CALL_WAKEUP)
    }

    /// Cached DAC register code
    pub fn register_value(&self) -> u16 {
        self.register_value
    }

    /// Cached power-down mode
    pub fn power_mode(&self) -> PowerDownMode {
        self.power_mode
    }

    /// EEPROM code from the last readback
    pub fn nonvolatile_value(&self) -> u16 {
        self.nonvolatile_value
    }

    /// EEPROM power-down mode from the last readback
    pub fn nonvolatile_power_mode(&self) -> PowerDownMode {
        self.nonvolatile_power_mode
    }

    /// Device address
    pub fn address(&self) -> u8 {
        self.config.address
    }

    /// Release the bus
    pub fn release(self) -> B {
        self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum BusFault {
        Nack,
    }

    /// Mock bus recording writes and replaying a read response
    #[derive(Default)]
    struct MockBus {
        present: bool,
        fail_writes: bool,
        response: [u8; 5],
        writes: Vec<(u8, Vec<u8>)>,
        probes: u32,
        timeouts: Vec<TimeoutMs>,
    }

    impl MockBus {
        fn with_device(response: [u8; 5]) -> Self {
            Self {
                present: true,
                response,
                ..Default::default()
            }
        }
    }

    impl I2cBus for MockBus {
        type Error = BusFault;

        fn probe(&mut self, _address: u8, trials: u32, timeout: TimeoutMs) -> Result<(), BusFault> {
            assert_eq!(trials, PROBE_TRIALS);
            self.timeouts.push(timeout);
            self.probes += 1;
            if self.present {
                Ok(())
            } else {
                Err(BusFault::Nack)
            }
        }

        fn write(&mut self, address: u8, data: &[u8], timeout: TimeoutMs) -> Result<(), BusFault> {
            self.timeouts.push(timeout);
            if self.fail_writes {
                return Err(BusFault::Nack);
            }
            self.writes.push((address, data.to_vec()));
            Ok(())
        }

        fn read(&mut self, _address: u8, buf: &mut [u8], timeout: TimeoutMs) -> Result<(), BusFault> {
            self.timeouts.push(timeout);
            buf.copy_from_slice(&self.response);
            Ok(())
        }
    }

    // DAC register 0x800 normal, EEPROM 0x123 with 100k pulldown
    const RESPONSE: [u8; 5] = [0xC0, 0x80, 0x00, 0x41, 0x23];

    fn ready_driver() -> Mcp4725<MockBus> {
        let mut dac = Mcp4725::new(MockBus::with_device(RESPONSE), Mcp4725Config::default());
        dac.init().unwrap();
        dac.bus.writes.clear();
        dac
    }

    #[test]
    fn test_fast_write_frame() {
        assert_eq!(
            build_fast_write(0xABC, PowerDownMode::Pulldown100k),
            Ok([0x2A, 0xBC])
        );
        assert_eq!(build_fast_write(0x0FFF, PowerDownMode::Normal), Ok([0x0F, 0xFF]));
        assert_eq!(
            build_fast_write(0x1000, PowerDownMode::Normal),
            Err(FrameError::ValueOutOfRange)
        );
    }

    #[test]
    fn test_eeprom_write_frame() {
        assert_eq!(
            build_eeprom_write(0xABC, PowerDownMode::Pulldown1k),
            Ok([0x62, 0xAB, 0xC0])
        );
        assert_eq!(
            build_eeprom_write(0x001, PowerDownMode::Pulldown500k),
            Ok([0x66, 0x00, 0x10])
        );
    }

    #[test]
    fn test_readback_decoding() {
        let readback = Readback::from_bytes(&RESPONSE);
        assert_eq!(readback.register_value, 0x800);
        assert_eq!(readback.power_mode, PowerDownMode::Normal);
        assert_eq!(readback.nonvolatile_value, 0x123);
        assert_eq!(readback.nonvolatile_power_mode, PowerDownMode::Pulldown100k);

        let readback = Readback::from_bytes(&[0x06, 0xFF, 0xF0, 0x6F, 0xFF]);
        assert_eq!(readback.register_value, 0xFFF);
        assert_eq!(readback.power_mode, PowerDownMode::Pulldown500k);
        assert_eq!(readback.nonvolatile_value, 0xFFF);
        assert_eq!(readback.nonvolatile_power_mode, PowerDownMode::Pulldown500k);
    }

    #[test]
    fn test_init_writes_then_reads() {
        let config = Mcp4725Config {
            address: 0x61,
            initial_value: 0x200,
            power_mode: PowerDownMode::Normal,
        };
        let mut dac = Mcp4725::new(MockBus::with_device(RESPONSE), config);
        assert!(!dac.is_initialized());

        dac.init().unwrap();
        assert!(dac.is_initialized());
        assert_eq!(dac.bus.probes, 1);
        assert_eq!(dac.bus.writes, vec![(0x61, vec![0x02, 0x00])]);
        // Readback overrides the cache
        assert_eq!(dac.register_value(), 0x800);
        assert_eq!(dac.nonvolatile_value(), 0x123);
    }

    #[test]
    fn test_every_transaction_is_bounded() {
        let mut dac = Mcp4725::new(MockBus::with_device(RESPONSE), Mcp4725Config::default());
        dac.init().unwrap();
        dac.write_register_fast(0x100).unwrap();
        dac.write_nonvolatile(0x200, PowerDownMode::Normal).unwrap();
        dac.read_nonvolatile().unwrap();

        // Probe, init write, init read, fast write, EEPROM write, read
        assert_eq!(dac.bus.timeouts, vec![TIMEOUT_MS; 6]);
    }

    #[test]
    fn test_init_device_absent() {
        let mut dac = Mcp4725::new(MockBus::default(), Mcp4725Config::default());
        assert_eq!(dac.init(), Err(Mcp4725Error::NotPresent));
        assert!(!dac.is_initialized());
        assert!(dac.bus.writes.is_empty());

        // Unusable afterwards
        assert_eq!(
            dac.write_register_fast(1),
            Err(Mcp4725Error::NotInitialized)
        );
    }

    #[test]
    fn test_init_write_failure() {
        let mut bus = MockBus::with_device(RESPONSE);
        bus.fail_writes = true;
        let mut dac = Mcp4725::new(bus, Mcp4725Config::default());
        assert_eq!(dac.init(), Err(Mcp4725Error::Bus(BusFault::Nack)));
        assert!(!dac.is_initialized());
    }

    #[test]
    fn test_write_register_updates_cache() {
        let mut dac = ready_driver();

        dac.write_register(0x3FF, PowerDownMode::Pulldown1k).unwrap();
        assert_eq!(dac.register_value(), 0x3FF);
        assert_eq!(dac.power_mode(), PowerDownMode::Pulldown1k);

        // Fast write keeps the mode
        dac.write_register_fast(0x010).unwrap();
        assert_eq!(dac.power_mode(), PowerDownMode::Pulldown1k);
        assert_eq!(dac.bus.writes[1], (0x60, vec![0x10, 0x10]));
    }

    #[test]
    fn test_failed_write_keeps_cache() {
        let mut dac = ready_driver();
        dac.bus.fail_writes = true;

        assert_eq!(
            dac.write_register(0x001, PowerDownMode::Pulldown500k),
            Err(Mcp4725Error::Bus(BusFault::Nack))
        );
        assert_eq!(dac.register_value(), 0x800);
        assert_eq!(dac.power_mode(), PowerDownMode::Normal);
    }

    #[test]
    fn test_write_power_down_keeps_value() {
        let mut dac = ready_driver();
        dac.write_power_down(PowerDownMode::Pulldown500k).unwrap();
        assert_eq!(dac.bus.writes[0], (0x60, vec![0x38, 0x00]));
        assert_eq!(dac.register_value(), 0x800);
        assert_eq!(dac.power_mode(), PowerDownMode::Pulldown500k);
    }

    #[test]
    fn test_write_nonvolatile_leaves_cache() {
        let mut dac = ready_driver();
        dac.write_nonvolatile(0xABC, PowerDownMode::Normal).unwrap();
        assert_eq!(dac.bus.writes[0], (0x60, vec![0x60, 0xAB, 0xC0]));
        assert_eq!(dac.nonvolatile_value(), 0x123);

        assert_eq!(
            dac.write_nonvolatile(0x1000, PowerDownMode::Normal),
            Err(Mcp4725Error::Frame(FrameError::ValueOutOfRange))
        );
    }

    #[test]
    fn test_broadcast_reset_reloads_from_eeprom() {
        let mut dac = ready_driver();
        dac.write_register(0x555, PowerDownMode::Normal).unwrap();

        dac.broadcast_reset().unwrap();
        assert_eq!(dac.bus.writes[1], (GENERAL_CALL_ADDRESS, vec![0x06]));
        assert_eq!(dac.register_value(), 0x123);
        assert_eq!(dac.power_mode(), PowerDownMode::Pulldown100k);
    }

    #[test]
    fn test_broadcast_wake() {
        let mut dac = ready_driver();
        dac.broadcast_wake().unwrap();
        assert_eq!(dac.bus.writes[0], (GENERAL_CALL_ADDRESS, vec![0x09]));
        assert_eq!(dac.register_value(), 0x123);
    }

    #[test]
    fn test_release_returns_bus() {
        let dac = ready_driver();
        let bus = dac.release();
        assert!(bus.present);
    }
}
