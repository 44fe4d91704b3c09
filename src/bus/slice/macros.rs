/// Generates a little-endian read method for one primitive type.
///
/// All multi-byte register fields on the bus are little-endian, so no
/// big-endian variants are generated.
macro_rules! impl_read_le {
    (u8) => {
        /// Reads a `u8` at the given offset.
        ///
        /// # Panics
        /// Panics if `offset >= len()`.
        #[inline]
        pub fn read_u8_at(&self, offset: usize) -> u8 {
            self.0[offset]
        }
    };
    ($type:ty, $size:literal) => {
        paste::paste! {
            #[doc = "Reads a little-endian `" $type "` at the given offset."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = "Panics if `offset + " $size " > len()`."]
            #[inline]
            pub fn [<read_ $type _le_at>](&self, offset: usize) -> $type {
                assert!(
                    offset + $size <= self.0.len(),
                    "register read out of bounds: offset {} + size {} > len {}",
                    offset, $size, self.0.len()
                );
                let mut raw = [0u8; $size];
                raw.copy_from_slice(&self.0[offset..offset + $size]);
                <$type>::from_le_bytes(raw)
            }
        }
    };
}

/// Generates a little-endian write method for one primitive type.
macro_rules! impl_write_le {
    (u8) => {
        /// Writes a `u8` at the given offset.
        ///
        /// # Panics
        /// Panics if `offset >= len()`.
        #[inline]
        pub fn write_u8_at(&mut self, offset: usize, value: u8) {
            self.0[offset] = value;
        }
    };
    ($type:ty, $size:literal) => {
        paste::paste! {
            #[doc = "Writes a little-endian `" $type "` at the given offset."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = "Panics if `offset + " $size " > len()`."]
            #[inline]
            pub fn [<write_ $type _le_at>](&mut self, offset: usize, value: $type) {
                assert!(
                    offset + $size <= self.0.len(),
                    "register write out of bounds: offset {} + size {} > len {}",
                    offset, $size, self.0.len()
                );
                self.0[offset..offset + $size].copy_from_slice(&value.to_le_bytes());
            }
        }
    };
}

/// Shared register accessors: length queries, copies out, primitive reads.
macro_rules! impl_reg_read {
    () => {
        /// Length of the register file in bytes.
        #[inline]
        pub fn len(&self) -> usize {
            self.0.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        /// Returns the byte at `offset`, or `None` past the end.
        #[inline]
        pub fn get(&self, offset: usize) -> Option<u8> {
            self.0.get(offset).copied()
        }

        /// Copies data starting at `offset` to the destination buffer.
        ///
        /// # Panics
        /// Panics if the range exceeds register bounds.
        #[inline]
        pub fn copy_to_slice_at(&self, offset: usize, dest: &mut [u8]) {
            dest.copy_from_slice(&self.0[offset..offset + dest.len()]);
        }

        impl_read_le!(u8);
        impl_read_le!(u16, 2);
        impl_read_le!(u32, 4);
    };
}

/// Mutating register accessors.
macro_rules! impl_reg_write {
    () => {
        /// Copies the source buffer starting at `offset`.
        ///
        /// # Panics
        /// Panics if the range exceeds register bounds.
        #[inline]
        pub fn copy_from_slice_at(&mut self, offset: usize, src: &[u8]) {
            self.0[offset..offset + src.len()].copy_from_slice(src);
        }

        /// Fills `len` bytes starting at `offset` with the given value.
        ///
        /// # Panics
        /// Panics if the range exceeds register bounds.
        #[inline]
        pub fn fill_at(&mut self, offset: usize, len: usize, value: u8) {
            self.0[offset..offset + len].fill(value);
        }

        impl_write_le!(u8);
        impl_write_le!(u16, 2);
        impl_write_le!(u32, 4);
    };
}

pub(super) use impl_read_le;
pub(super) use impl_reg_read;
pub(super) use impl_reg_write;
pub(super) use impl_write_le;
