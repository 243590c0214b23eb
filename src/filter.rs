//! `DiffFilter`: the named bitmask controlling which dimensions and
//! properties `diff`/`diff_grouped_children` report on.
//!
//! `bitflags` isn't part of the teacher's own dependency stack, but a named
//! bitmask is exactly what it's for, and the pack shows it used for this
//! same purpose in DOM-adjacent code (e.g. servo's `dom::node` flags) — see
//! DESIGN.md for the grounding note on this one addition.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DiffFilter: u32 {
        const DATA      = 0b0000_0001;
        const ATTRIBUTE = 0b0000_0010;
        const CUSTOM    = 0b0000_0100;
        const CHILDREN  = 0b0000_1000;
        const ORIGINAL  = 0b0001_0000;
        const MUTATED   = 0b0010_0000;

        const PROPERTY = Self::DATA.bits() | Self::ATTRIBUTE.bits() | Self::CUSTOM.bits();
        const ALL = Self::PROPERTY.bits() | Self::CHILDREN.bits() | Self::ORIGINAL.bits() | Self::MUTATED.bits();
    }
}

impl Default for DiffFilter {
    fn default() -> Self {
        DiffFilter::ALL
    }
}
