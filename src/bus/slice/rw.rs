use super::macros::{impl_read_le, impl_reg_read, impl_reg_write, impl_write_le};

/// Read-write window onto a register file.
///
/// Handed to command handlers and drivers. Writes through it never mark
/// bytes as written by the controller.
#[derive(Debug)]
pub struct RegMut<'a>(&'a mut [u8]);

impl<'a> RegMut<'a> {
    #[inline]
    pub fn new(regs: &'a mut [u8]) -> Self {
        Self(regs)
    }

    impl_reg_read!();
    impl_reg_write!();
}
