use heapless::Vec;

use crate::bus::{
    BusError,
    layout::{DeviceInfo, control},
    page::{Access, CommandField, PageId, RegisterFile},
};

/// Highest written-byte index a register file can have.
const MAX_PAGE_LEN: usize = 256;

struct Slot<'a> {
    file: RegisterFile<'a>,
    written: bitmaps::Bitmap<MAX_PAGE_LEN>,
}

/// Ordered table of every register file on the bus.
///
/// Page 0 is the control block and page 1 the device-info block, both
/// owned by the registry. Driver pages follow in registration order,
/// up to `P` of them.
pub struct Registry<'a, const P: usize> {
    control: [u8; control::LEN],
    device_info: [u8; DeviceInfo::LEN],
    drivers: Vec<Slot<'a>, P>,
}

impl<'a, const P: usize> core::fmt::Debug for Registry<'a, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}

impl<'a, const P: usize> Registry<'a, P> {
    pub(crate) fn new(info: &DeviceInfo) -> Self {
        Self {
            control: [0; control::LEN],
            device_info: info.encode(),
            drivers: Vec::new(),
        }
    }

    /// Appends a driver page and returns the index it is reachable at.
    pub(crate) fn register(&mut self, file: RegisterFile<'a>) -> Result<PageId, BusError> {
        file.validate()?;
        let page = PageId(self.count());
        self.drivers
            .push(Slot {
                file,
                written: bitmaps::Bitmap::new(),
            })
            .map_err(|_| BusError::RegistryFull)?;
        Ok(page)
    }

    /// Number of registered pages, the two reserved ones included.
    pub fn count(&self) -> u8 {
        (PageId::FIRST_DRIVER.index() + self.drivers.len()) as u8
    }

    pub fn contains(&self, page: PageId) -> bool {
        page.0 < self.count()
    }

    fn slot(&self, page: PageId) -> Option<&Slot<'a>> {
        page.index()
            .checked_sub(PageId::FIRST_DRIVER.index())
            .and_then(|i| self.drivers.get(i))
    }

    fn slot_mut(&mut self, page: PageId) -> Option<&mut Slot<'a>> {
        page.index()
            .checked_sub(PageId::FIRST_DRIVER.index())
            .and_then(|i| self.drivers.get_mut(i))
    }

    pub fn bytes(&self, page: PageId) -> Option<&[u8]> {
        match page {
            PageId::CONTROL => Some(&self.control),
            PageId::DEVICE_INFO => Some(&self.device_info),
            _ => self.slot(page).map(|s| &*s.file.data),
        }
    }

    /// Mutable bytes of `page`. The device-info block is fixed at build
    /// time and never handed out.
    pub fn bytes_mut(&mut self, page: PageId) -> Result<&mut [u8], BusError> {
        match page {
            PageId::CONTROL => Ok(&mut self.control),
            PageId::DEVICE_INFO => Err(BusError::ReadOnlyPage),
            _ => self
                .slot_mut(page)
                .map(|s| &mut *s.file.data)
                .ok_or(BusError::UnknownPage),
        }
    }

    pub fn access(&self, page: PageId) -> Option<Access> {
        match page {
            PageId::CONTROL => Some(Access::ReadWrite),
            PageId::DEVICE_INFO => Some(Access::ReadOnly),
            _ => self.slot(page).map(|s| s.file.access),
        }
    }

    pub fn page_len(&self, page: PageId) -> Option<usize> {
        self.bytes(page).map(<[u8]>::len)
    }

    pub fn control(&self) -> &[u8; control::LEN] {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut [u8; control::LEN] {
        &mut self.control
    }

    /// Stores a byte written by the bus controller.
    ///
    /// Out-of-range writes are dropped; the engine never issues them.
    pub(crate) fn store(&mut self, page: PageId, offset: usize, byte: u8) {
        match page {
            PageId::CONTROL => {
                if let Some(b) = self.control.get_mut(offset) {
                    *b = byte;
                }
            }
            PageId::DEVICE_INFO => {}
            _ => {
                if let Some(slot) = self.slot_mut(page) {
                    if let Some(b) = slot.file.data.get_mut(offset) {
                        *b = byte;
                        slot.written.set(offset, true);
                    }
                }
            }
        }
    }

    /// Reads and clears the command byte that governs `page`.
    pub(crate) fn take_command(&mut self, page: PageId) -> u8 {
        let field = match page {
            PageId::CONTROL => &mut self.control[control::COMMAND],
            PageId::DEVICE_INFO => return 0,
            _ => {
                let index = page.index() - PageId::FIRST_DRIVER.index();
                let Some(slot) = self.drivers.get_mut(index) else {
                    return 0;
                };
                match slot.file.command {
                    CommandField::At(offset) => &mut slot.file.data[offset as usize],
                    CommandField::Shared => &mut self.control[control::TX_COMMAND],
                }
            }
        };
        core::mem::take(field)
    }

    /// Returns true if the controller wrote `offset` since the last clear.
    pub fn is_written(&self, page: PageId, offset: usize) -> bool {
        self.slot(page)
            .is_some_and(|s| offset < MAX_PAGE_LEN && s.written.get(offset))
    }

    pub fn any_written(&self, page: PageId) -> bool {
        self.slot(page).is_some_and(|s| !s.written.is_empty())
    }

    /// Calls `f` with each offset the controller wrote, lowest first.
    pub fn iter_written(&self, page: PageId, mut f: impl FnMut(usize, u8)) {
        let Some(slot) = self.slot(page) else {
            return;
        };
        let mut idx = slot.written.first_index();
        while let Some(offset) = idx {
            f(offset, slot.file.data[offset]);
            idx = slot.written.next_index(offset);
        }
    }

    pub fn clear_written(&mut self, page: PageId) {
        if let Some(slot) = self.slot_mut(page) {
            slot.written = bitmaps::Bitmap::new();
        }
    }
}
