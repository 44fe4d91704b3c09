use core::marker::PhantomData;

use crate::bus::{
    config::DEFAULT_DEVICE_ADDRESS,
    layout::DeviceInfo,
    persist::is_valid_address,
    storage::BusStorage,
    system::{NoSignal, SignalSink},
};

// Builder states
pub struct NeedDriverPages;
pub struct NeedDeviceInfo;
pub struct NeedDefaultAddress;
pub struct NeedSignal;
pub struct Ready;

/// Most driver pages a single-byte page index leaves room for.
pub const MAX_DRIVER_PAGES: usize = u8::MAX as usize - 2;

pub struct BusStorageBuilder<const P: usize, S, State> {
    info: DeviceInfo,
    address: u8,
    signal: S,
    _phantom: PhantomData<State>,
}

impl BusStorageBuilder<0, (), NeedDriverPages> {
    pub fn new() -> Self {
        BusStorageBuilder {
            info: DeviceInfo::default(),
            address: DEFAULT_DEVICE_ADDRESS,
            signal: (),
            _phantom: PhantomData,
        }
    }

    /// Set how many driver register files the bus can hold.
    ///
    /// # Panics
    /// Panics if `P` exceeds [`MAX_DRIVER_PAGES`].
    pub fn driver_pages<const P: usize>(self) -> BusStorageBuilder<P, (), NeedDeviceInfo> {
        assert!(
            P <= MAX_DRIVER_PAGES,
            "{} driver pages requested, at most {} fit",
            P,
            MAX_DRIVER_PAGES
        );

        BusStorageBuilder {
            info: self.info,
            address: self.address,
            signal: (),
            _phantom: PhantomData,
        }
    }
}

impl Default for BusStorageBuilder<0, (), NeedDriverPages> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const P: usize> BusStorageBuilder<P, (), NeedDeviceInfo> {
    pub fn device_info(self, info: DeviceInfo) -> BusStorageBuilder<P, (), NeedDefaultAddress> {
        BusStorageBuilder {
            info,
            address: self.address,
            signal: (),
            _phantom: PhantomData,
        }
    }

    /// Use the built-in manufacturer, product and version.
    pub fn default_device_info(self) -> BusStorageBuilder<P, (), NeedDefaultAddress> {
        self.device_info(DeviceInfo::default())
    }
}

impl<const P: usize> BusStorageBuilder<P, (), NeedDefaultAddress> {
    /// Set the address answered on while NVM holds none.
    ///
    /// # Panics
    /// Panics if `address` is even or `0xFF`.
    pub fn default_address(self, address: u8) -> BusStorageBuilder<P, (), NeedSignal> {
        assert!(
            is_valid_address(address),
            "default bus address {:#04x} must be odd and not 0xFF",
            address
        );

        BusStorageBuilder {
            info: self.info,
            address,
            signal: (),
            _phantom: PhantomData,
        }
    }

    pub fn builtin_address(self) -> BusStorageBuilder<P, (), NeedSignal> {
        self.default_address(DEFAULT_DEVICE_ADDRESS)
    }
}

impl<const P: usize> BusStorageBuilder<P, (), NeedSignal> {
    pub fn signal<S: SignalSink>(self, signal: S) -> BusStorageBuilder<P, S, Ready> {
        BusStorageBuilder {
            info: self.info,
            address: self.address,
            signal,
            _phantom: PhantomData,
        }
    }

    /// Drop all signals; the main loop polls the worker unconditionally.
    pub fn no_signal(self) -> BusStorageBuilder<P, NoSignal, Ready> {
        self.signal(NoSignal)
    }
}

impl<const P: usize, S: SignalSink> BusStorageBuilder<P, S, Ready> {
    pub fn build<'a>(self) -> BusStorage<'a, P, S> {
        BusStorage::new(self.info, self.address, self.signal)
    }
}
