//! Mapping from VM segments to Hack RAM.

use crate::parser::Segment;

/// Initial stack pointer.
pub const STACK_BASE: u16 = 256;

/// Scratch variable holding the target address of an indirect pop.
pub const POP_DEST: &str = "POP_DEST";

/// Segment access mode for code generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentAccess {
    /// Immediate value
    Constant,
    /// Base address held in a pointer register (LCL, ARG, THIS, THAT)
    Indirect(&'static str),
    /// Fixed RAM region starting at the given register (pointer, temp)
    Direct(u16),
    /// `File.i` assembler variables
    Static,
}

/// Determine the access mode for a segment.
pub fn segment_access(segment: Segment) -> SegmentAccess {
    match segment {
        Segment::Constant => SegmentAccess::Constant,
        Segment::Local => SegmentAccess::Indirect("LCL"),
        Segment::Argument => SegmentAccess::Indirect("ARG"),
        Segment::This => SegmentAccess::Indirect("THIS"),
        Segment::That => SegmentAccess::Indirect("THAT"),
        Segment::Pointer => SegmentAccess::Direct(3),
        Segment::Temp => SegmentAccess::Direct(5),
        Segment::Static => SegmentAccess::Static,
    }
}
