//! Address-space registry.
//!
//! An address space binds a register type to a contiguous, externally-owned
//! `[u16]` backing store. The registry is an ordered, fixed-capacity list of
//! these descriptors (16 entries by default, matching the original C
//! firmware's `address_space_t address_spaces[0x10]`); lookup is linear,
//! first-match-wins.

use crate::error::RegistryError;

/// Which register file an address space belongs to.
#[cfg_attr(not(test), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterType {
    /// Read-only, serviced by function 0x04.
    Input,
    /// Read-write, serviced by functions 0x03/0x06/0x10.
    Holding,
}

/// An immutable-after-construction descriptor binding `register_type` to a
/// caller-owned slice of 16-bit words.
///
/// Invariants enforced at construction: `backing` is non-empty, and
/// `start_offset + backing.len() <= 0x10000`.
pub struct AddressSpace<'a> {
    register_type: RegisterType,
    start_offset: u16,
    backing: &'a mut [u16],
}

impl<'a> AddressSpace<'a> {
    pub fn new(
        register_type: RegisterType,
        start_offset: u16,
        backing: &'a mut [u16],
    ) -> Result<Self, RegistryError> {
        if backing.is_empty() {
            return Err(RegistryError::InvalidAddressSpace("size must be >= 1"));
        }
        let end = start_offset as u32 + backing.len() as u32;
        if end > 0x1_0000 {
            return Err(RegistryError::InvalidAddressSpace(
                "start_offset + size exceeds the 16-bit address space",
            ));
        }
        Ok(Self {
            register_type,
            start_offset,
            backing,
        })
    }

    pub fn register_type(&self) -> RegisterType {
        self.register_type
    }

    pub fn start_offset(&self) -> u16 {
        self.start_offset
    }

    pub fn size(&self) -> u16 {
        self.backing.len() as u16
    }

    pub fn backing(&self) -> &[u16] {
        self.backing
    }

    pub fn backing_mut(&mut self) -> &mut [u16] {
        self.backing
    }

    /// Base pointer of the backing store, used as the identity for removal.
    pub fn base_ptr(&self) -> *const u16 {
        self.backing.as_ptr()
    }

    /// Whether `start..start+count` lies fully within this space.
    fn contains(&self, start: u16, count: u16) -> bool {
        match start.checked_add(count) {
            Some(end) => start >= self.start_offset && end <= self.start_offset + self.size(),
            None => false,
        }
    }

    fn overlaps(&self, other: &AddressSpace<'_>) -> bool {
        if self.register_type != other.register_type {
            return false;
        }
        let a_end = self.start_offset as u32 + self.size() as u32;
        let b_end = other.start_offset as u32 + other.size() as u32;
        (self.start_offset as u32) < b_end && (other.start_offset as u32) < a_end
    }
}

/// Ordered collection of address spaces bound to one engine.
///
/// `N` is the capacity (16 by default, configurable at build like the rest
/// of this no-alloc crate).
pub struct Registry<'a, const N: usize = 16> {
    spaces: heapless::Vec<AddressSpace<'a>, N>,
}

impl<'a, const N: usize> Registry<'a, N> {
    pub const fn new() -> Self {
        Self {
            spaces: heapless::Vec::new(),
        }
    }

    /// Appends `space`. Fails with [`RegistryError::TooManySpaces`] once the
    /// registry is at capacity.
    ///
    /// Per the source design, overlap between two spaces of the same type is
    /// the caller's responsibility and is not rejected here; in debug builds
    /// an overlap is still logged so misconfiguration is caught early in
    /// testing without changing release behavior.
    pub fn add(&mut self, space: AddressSpace<'a>) -> Result<(), RegistryError> {
        #[cfg(all(debug_assertions, not(test)))]
        if let Some(_existing) = self.spaces.iter().find(|s| s.overlaps(&space)) {
            defmt::warn!("address space overlaps an already-registered entry of the same type");
        }
        self.spaces
            .push(space)
            .map_err(|_| RegistryError::TooManySpaces)
    }

    /// Removes the first entry whose backing base pointer equals `ptr`,
    /// preserving the relative order of the remaining entries.
    pub fn remove_by_backing(&mut self, ptr: *const u16) -> Result<(), RegistryError> {
        let index = self
            .spaces
            .iter()
            .position(|s| core::ptr::eq(s.base_ptr(), ptr))
            .ok_or(RegistryError::NotFound)?;
        self.spaces.remove(index);
        Ok(())
    }

    pub fn find(&self, register_type: RegisterType, start: u16, count: u16) -> Option<&AddressSpace<'a>> {
        self.spaces
            .iter()
            .find(|s| s.register_type == register_type && s.contains(start, count))
    }

    pub fn find_mut(
        &mut self,
        register_type: RegisterType,
        start: u16,
        count: u16,
    ) -> Option<&mut AddressSpace<'a>> {
        self.spaces
            .iter_mut()
            .find(|s| s.register_type == register_type && s.contains(start, count))
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}

impl<'a, const N: usize> Default for Registry<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}
