//! 16-byte GUID as laid out on the wire

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Windows-style GUID, `#[repr(C)]` so it can be read straight from a property buffer
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    /// The all-zero GUID
    pub const NULL: Self = Self::new(0, 0, 0, [0; 8]);

    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self { data1, data2, data3, data4 }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<Guid>(), 16);
        let g = Guid::new(0x0102_0304, 0x0506, 0x0708, [9, 10, 11, 12, 13, 14, 15, 16]);
        let bytes = bytemuck::bytes_of(&g);
        assert_eq!(&bytes[8..], &[9, 10, 11, 12, 13, 14, 15, 16]);
        let back: Guid = bytemuck::pod_read_unaligned(bytes);
        assert_eq!(back, g);
    }

    #[test]
    fn test_display() {
        let g = Guid::new(0x1D48_70AD, 0x0DEF, 0x43C0, [0xA4, 0x0C, 0x52, 0x36, 0x32, 0x29, 0x63, 0x42]);
        assert_eq!(g.to_string(), "{1D4870AD-0DEF-43C0-A40C-523632296342}");
        assert!(Guid::NULL.is_null());
        assert!(!g.is_null());
    }
}
