use super::macros::{impl_read_le, impl_reg_read};

/// Read-only window onto a register file.
#[derive(Debug, Clone, Copy)]
pub struct RegRef<'a>(&'a [u8]);

impl<'a> RegRef<'a> {
    #[inline]
    pub fn new(regs: &'a [u8]) -> Self {
        Self(regs)
    }

    impl_reg_read!();
}
