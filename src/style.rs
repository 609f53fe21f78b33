//! Text attributes with a packed hyperlink id.
//!
//! A cell carries one `u32` of attributes: the low byte holds SGR style
//! flags and the upper 24 bits hold a [`LinkPool`](crate::LinkPool) id, so a
//! hyperlink costs nothing extra per cell and participates in the plain
//! equality check the diff uses.

use bitflags::bitflags;

bitflags! {
    /// SGR text attributes.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct TextAttributes: u32 {
        /// Bold/increased intensity.
        const BOLD          = 0x01;
        /// Dim/decreased intensity.
        const DIM           = 0x02;
        /// Italic.
        const ITALIC        = 0x04;
        /// Underlined text.
        const UNDERLINE     = 0x08;
        /// Blinking text.
        const BLINK         = 0x10;
        /// Swapped foreground/background.
        const INVERSE       = 0x20;
        /// Hidden/invisible text.
        const HIDDEN        = 0x40;
        /// Strikethrough text.
        const STRIKETHROUGH = 0x80;
    }
}

impl TextAttributes {
    /// Mask for the style flags.
    pub const FLAGS_MASK: u32 = 0x0000_00FF;
    /// Mask for the packed link id.
    pub const LINK_ID_MASK: u32 = 0xFFFF_FF00;
    /// Bit shift for link id storage.
    pub const LINK_ID_SHIFT: u32 = 8;
    /// Largest link id that fits.
    pub const MAX_LINK_ID: u32 = 0x00FF_FFFF;

    /// Packed link id, 0 when the cell has no link.
    #[must_use]
    pub const fn link_id(self) -> u32 {
        (self.bits() & Self::LINK_ID_MASK) >> Self::LINK_ID_SHIFT
    }

    /// Return attributes carrying `link_id` (masked to 24 bits).
    #[must_use]
    pub const fn with_link_id(self, link_id: u32) -> Self {
        let id = link_id & Self::MAX_LINK_ID;
        Self::from_bits_retain((self.bits() & Self::FLAGS_MASK) | (id << Self::LINK_ID_SHIFT))
    }

    /// Style flags with the link id stripped.
    #[must_use]
    pub const fn flags_only(self) -> Self {
        Self::from_bits_retain(self.bits() & Self::FLAGS_MASK)
    }

    /// SGR parameter codes for the set flags, in ascending order.
    pub fn sgr_codes(self) -> impl Iterator<Item = u8> {
        const TABLE: [(TextAttributes, u8); 8] = [
            (TextAttributes::BOLD, 1),
            (TextAttributes::DIM, 2),
            (TextAttributes::ITALIC, 3),
            (TextAttributes::UNDERLINE, 4),
            (TextAttributes::BLINK, 5),
            (TextAttributes::INVERSE, 7),
            (TextAttributes::HIDDEN, 8),
            (TextAttributes::STRIKETHROUGH, 9),
        ];
        let flags = self.flags_only();
        TABLE
            .into_iter()
            .filter(move |(flag, _)| flags.contains(*flag))
            .map(|(_, code)| code)
    }
}
