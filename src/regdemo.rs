//! Host-only stand-in for a board's register map (§3 in the design doc).
//!
//! `spec.md` explicitly excludes "the specific register map of any one
//! board" from scope; this module exists only to give the CLI binary and
//! integration tests something concrete to bind a [`RegisterTable`] to
//! without pulling in a real MMIO target. `Cell` stands in for a memory-
//! mapped register: `Cell::as_ptr` hands out a raw pointer without
//! requiring a unique borrow, the same way a real register address is
//! shared between whatever ISR and whatever [`RegisterTable`] touch it.

use core::cell::Cell;

use crate::registers::RegisterTable;
use crate::volatile::VolatileReg;

/// Number of demo registers. Register 0 is read-only (all-zero write mask);
/// the rest are fully writable.
pub const DEMO_REG_COUNT: usize = 4;

pub struct DemoRegisterMap {
    cells: [Cell<u32>; DEMO_REG_COUNT],
}

impl Default for DemoRegisterMap {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoRegisterMap {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: [Cell::new(0), Cell::new(0), Cell::new(0), Cell::new(0)],
        }
    }

    /// Current value of register `reg_num`, bypassing the protocol entirely.
    /// Useful for asserting on CLI/integration-test side effects.
    #[must_use]
    pub fn peek(&self, reg_num: usize) -> u32 {
        self.cells[reg_num].get()
    }

    /// Builds a [`RegisterTable`] bound to this map's cells. The table
    /// borrows `self` for as long as it exists; nothing stops building a
    /// second one afterward since `Cell` access never requires a unique
    /// borrow.
    #[must_use]
    pub fn table(&self) -> RegisterTable<'_, u32, DEMO_REG_COUNT> {
        let slots = core::array::from_fn(|i| {
            // SAFETY: `self.cells[i]` outlives the returned table's
            // lifetime `'_`, is properly aligned, and `Cell` already
            // permits this raw-pointer access without an exclusive borrow.
            Some(unsafe { VolatileReg::new(self.cells[i].as_ptr()) })
        });
        let masks = core::array::from_fn(|i| if i == 0 { 0 } else { u32::MAX });
        RegisterTable::new(slots, masks)
    }
}
