//! Constant lookup tables of the duty synthesizer.
//!
//! [`STEP_TABLE`] holds four magnitudes per amplitude row. Every output
//! channel at every step uses one of those four columns, optionally forced
//! to zero and optionally negated around the 50% duty point.
//! [`INDEX_TABLE`] says which, for each of the 24 steps.

use crate::{Amplitude, Phase, AMPLITUDE_MAX, STEP_COUNT};

/// Number of magnitude columns per amplitude row.
pub const COLUMNS: usize = 4;

/// Quantised, amplitude-scaled magnitudes, indexed by `[amplitude][column]`.
///
/// Row 0 is all zero and no entry exceeds 127, so `128 ± magnitude` always
/// lands within 1..=255.
pub static STEP_TABLE: [[u8; COLUMNS]; AMPLITUDE_MAX as usize + 1] = [
    [0, 0, 0, 0],
    [3, 6, 7, 8],
    [4, 7, 9, 10],
    [5, 9, 11, 12],
    [6, 10, 13, 14],
    [7, 12, 15, 16],
    [7, 13, 17, 18],
    [8, 15, 18, 20],
    [9, 16, 20, 22],
    [10, 18, 22, 24],
    [11, 19, 24, 26],
    [11, 20, 26, 28],
    [12, 22, 28, 30],
    [13, 23, 30, 32],
    [14, 25, 31, 34],
    [15, 26, 33, 36],
    [15, 28, 35, 38],
    [16, 29, 37, 40],
    [17, 31, 39, 42],
    [18, 32, 41, 44],
    [19, 34, 42, 46],
    [20, 35, 44, 48],
    [20, 36, 46, 50],
    [21, 38, 48, 52],
    [22, 39, 50, 54],
    [23, 41, 52, 56],
    [24, 42, 53, 58],
    [24, 44, 55, 60],
    [25, 45, 57, 62],
    [26, 47, 59, 64],
    [27, 48, 61, 66],
    [28, 50, 63, 68],
    [28, 51, 65, 70],
    [29, 53, 66, 72],
    [30, 54, 68, 74],
    [31, 55, 70, 76],
    [32, 57, 72, 78],
    [33, 58, 74, 80],
    [33, 60, 76, 82],
    [34, 61, 77, 84],
    [35, 63, 79, 86],
    [36, 64, 81, 88],
    [37, 66, 83, 90],
    [37, 67, 85, 92],
    [38, 69, 87, 94],
    [39, 70, 89, 96],
    [40, 71, 90, 98],
    [41, 73, 92, 99],
    [42, 74, 94, 101],
    [42, 76, 96, 103],
    [43, 77, 98, 105],
    [44, 79, 100, 107],
    [45, 80, 101, 109],
    [46, 82, 103, 111],
    [46, 83, 105, 113],
    [47, 85, 107, 115],
    [48, 86, 109, 117],
    [49, 88, 111, 119],
    [50, 89, 112, 121],
    [50, 90, 114, 123],
    [51, 92, 116, 125],
    [52, 93, 118, 127],
];

/// Packed channel descriptors per step.
///
/// The first byte is the u descriptor. The second byte carries v in its
/// low nibble and w in its high nibble.
pub static INDEX_TABLE: [[u8; 2]; STEP_COUNT as usize] = [
    [0x01, 0x71],
    [0x02, 0x70],
    [0x03, 0x78],
    [0x03, 0x64],
    [0x03, 0x55],
    [0x03, 0x46],
    [0x03, 0x87],
    [0x02, 0x07],
    [0x01, 0x17],
    [0x00, 0x27],
    [0x08, 0x37],
    [0x04, 0x36],
    [0x05, 0x35],
    [0x06, 0x34],
    [0x07, 0x38],
    [0x07, 0x20],
    [0x07, 0x11],
    [0x07, 0x02],
    [0x07, 0x83],
    [0x06, 0x43],
    [0x05, 0x53],
    [0x04, 0x63],
    [0x08, 0x73],
    [0x00, 0x72],
];

/// How one output channel is built at a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Descriptor(u8);

impl Descriptor {
    const COLUMN_MASK: u8 = 0x3;
    const NEGATE: u8 = 0x4;
    const ZERO: u8 = 0x8;
    const NIBBLE_BITS: u8 = 4;
    const NIBBLE_MASK: u8 = 0xF;

    pub const fn from_bits(bits: u8) -> Self {
        Descriptor(bits & Self::NIBBLE_MASK)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Which [`STEP_TABLE`] column to read.
    pub const fn column(self) -> usize {
        (self.0 & Self::COLUMN_MASK) as usize
    }

    /// The magnitude is forced to zero regardless of the column.
    pub const fn is_zero(self) -> bool {
        self.0 & Self::ZERO != 0
    }

    /// The magnitude is subtracted from, rather than added to, the center.
    pub const fn is_negated(self) -> bool {
        self.0 & Self::NEGATE != 0
    }
}

/// Decode the u, v and w descriptors of a step.
pub fn descriptors(step: Phase) -> [Descriptor; 3] {
    let [u, vw] = INDEX_TABLE[step.get() as usize];
    [
        Descriptor::from_bits(u),
        Descriptor::from_bits(vw),
        Descriptor::from_bits(vw >> Descriptor::NIBBLE_BITS),
    ]
}

/// The magnitude a descriptor selects at the given amplitude.
pub fn magnitude(amplitude: Amplitude, descriptor: Descriptor) -> u8 {
    if descriptor.is_zero() {
        0
    } else {
        STEP_TABLE[amplitude.get() as usize][descriptor.column()]
    }
}
