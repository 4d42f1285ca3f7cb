//! Peripheral capability table
//!
//! Timers differ per chip in which clock gate and which interrupt vector
//! belong to them. Instead of branching on the instance every time a
//! driver starts, the application registers one entry per peripheral at
//! startup and drivers resolve their entry by identifier.

use heapless::Vec;

/// Number of NVIC priority bits implemented (STM32F1/F4/H7)
pub const PRIORITY_BITS: u8 = 4;

/// Interrupt priority split by NVIC priority grouping
///
/// `grouping` is the number of preemption bits (0-4); the remaining
/// bits hold the sub-priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqPriority {
    /// Preemption bits in use (0-4)
    pub grouping: u8,
    /// Preemption priority (0 = most urgent)
    pub preempt: u8,
    /// Sub-priority within the preemption level
    pub sub: u8,
}

impl IrqPriority {
    /// Create a priority, checking both fields fit the grouping
    pub fn new(grouping: u8, preempt: u8, sub: u8) -> Option<Self> {
        if grouping > PRIORITY_BITS {
            return None;
        }
        let sub_bits = PRIORITY_BITS - grouping;
        if u16::from(preempt) >= (1u16 << grouping) || u16::from(sub) >= (1u16 << sub_bits) {
            return None;
        }
        Some(Self {
            grouping,
            preempt,
            sub,
        })
    }

    /// Least urgent priority for the given grouping
    ///
    /// Grouping values above 4 are treated as 4.
    pub fn lowest(grouping: u8) -> Self {
        let grouping = grouping.min(PRIORITY_BITS);
        let sub_bits = PRIORITY_BITS - grouping;
        Self {
            grouping,
            preempt: ((1u16 << grouping) - 1) as u8,
            sub: ((1u16 << sub_bits) - 1) as u8,
        }
    }

    /// Combined 4-bit priority value as written to the NVIC
    pub fn raw(&self) -> u8 {
        let sub_bits = PRIORITY_BITS - self.grouping.min(PRIORITY_BITS);
        ((self.preempt << sub_bits) | self.sub) & 0x0F
    }
}

/// Startup hooks for one peripheral instance
#[derive(Debug, Clone, Copy)]
pub struct PeripheralCaps {
    /// Ungate the peripheral clock
    pub enable_clock: fn(),
    /// Set the priority and unmask the peripheral's interrupt
    pub enable_interrupt: fn(IrqPriority),
    /// Priority handed to `enable_interrupt`
    pub priority: IrqPriority,
}

/// Errors from the capability table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CapabilityError {
    /// No room for another entry
    TableFull,
    /// Identifier already registered
    Duplicate,
    /// Identifier was never registered
    Unknown,
}

/// Mapping from peripheral identifier to its startup hooks
pub struct CapabilityTable<Id, const N: usize> {
    entries: Vec<(Id, PeripheralCaps), N>,
}

impl<Id: Copy + PartialEq, const N: usize> Default for CapabilityTable<Id, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Copy + PartialEq, const N: usize> CapabilityTable<Id, N> {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register the hooks for a peripheral
    pub fn register(&mut self, id: Id, caps: PeripheralCaps) -> Result<(), CapabilityError> {
        if self.entries.iter().any(|(known, _)| *known == id) {
            return Err(CapabilityError::Duplicate);
        }
        self.entries
            .push((id, caps))
            .map_err(|_| CapabilityError::TableFull)
    }

    /// Look up the hooks for a peripheral
    pub fn resolve(&self, id: Id) -> Result<&PeripheralCaps, CapabilityError> {
        self.entries
            .iter()
            .find(|(known, _)| *known == id)
            .map(|(_, caps)| caps)
            .ok_or(CapabilityError::Unknown)
    }

    /// Run the clock and interrupt hooks for a peripheral
    ///
    /// Returns the priority the interrupt was enabled with.
    pub fn activate(&self, id: Id) -> Result<IrqPriority, CapabilityError> {
        let caps = self.resolve(id)?;
        (caps.enable_clock)();
        (caps.enable_interrupt)(caps.priority);
        Ok(caps.priority)
    }

    /// Number of registered peripherals
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
