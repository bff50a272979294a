/*++

Licensed under the Apache-2.0 license.

File Name:

    seeds.rs

Abstract:

    File contains the fixed key-derivation seed constants. Seeds are
    compile-time constants, never derived at runtime.

--*/

/// Per-firmware-version keyblob key seeds, indexed by keyblob index.
pub const KEYBLOB_KEY_SEEDS: [[u8; 16]; 5] = [
    [
        0xDF, 0x20, 0x6F, 0x59, 0x44, 0x54, 0xEF, 0xDC, 0x70, 0x74, 0x48, 0x3B, 0x0D, 0xED, 0x9F,
        0xD3,
    ],
    [
        0x0C, 0x25, 0x61, 0x5D, 0x68, 0x4C, 0xEB, 0x42, 0x1C, 0x23, 0x79, 0xEA, 0x82, 0x25, 0x12,
        0xAC,
    ],
    [
        0x33, 0x76, 0x85, 0xEE, 0x88, 0x4A, 0xAE, 0x0A, 0xC2, 0x8A, 0xFD, 0x7D, 0x63, 0xC0, 0x43,
        0x3B,
    ],
    [
        0x2D, 0x1F, 0x48, 0x80, 0xED, 0xEC, 0xED, 0x3E, 0x3C, 0xF2, 0x48, 0xB5, 0x65, 0x7D, 0xF7,
        0xBE,
    ],
    [
        0xBB, 0x5A, 0x01, 0xF9, 0x88, 0xAF, 0xF5, 0xFC, 0x6C, 0xFF, 0x07, 0x9E, 0x13, 0x3C, 0x39,
        0x80,
    ],
];

/// CMAC-purpose key seed.
pub const CMAC_KEY_SEED: [u8; 16] = [
    0x59, 0xC7, 0xFB, 0x6F, 0xBE, 0x9B, 0xBE, 0x87, 0x65, 0x6B, 0x15, 0xC0, 0x53, 0x73, 0x36, 0xA5,
];

/// Retail master key seed.
pub const MASTER_KEY_SEED_RETAIL: [u8; 16] = [
    0xD8, 0xA2, 0x41, 0x0A, 0xC6, 0xC5, 0x90, 0x01, 0xC6, 0x1D, 0x6A, 0x26, 0x7C, 0x51, 0x3F, 0x3C,
];

/// Device (per-console) key seed.
pub const DEVICE_KEY_SEED: [u8; 16] = [
    0x4F, 0x02, 0x5F, 0x0E, 0xB6, 0x6D, 0x11, 0x0E, 0xDC, 0x32, 0x7D, 0x41, 0x86, 0xC2, 0xF4, 0x78,
];

/// Package2 key seed.
pub const PKG2_KEY_SEED: [u8; 16] = [
    0xFB, 0x8B, 0x6A, 0x9C, 0x79, 0x00, 0xC8, 0x49, 0xEF, 0xD2, 0x4D, 0x85, 0x4D, 0x30, 0xA0, 0xC7,
];

/// 4.x-era master key seed variant.
pub const MASTER_KEY_SEED_4XX: [u8; 16] = [
    0x2D, 0xC1, 0xF4, 0x8D, 0xF3, 0x5B, 0x69, 0x33, 0x42, 0x10, 0xAC, 0x65, 0xDA, 0x90, 0x46, 0x66,
];

/// 4.x-era device key seed variant.
pub const DEVICE_KEY_SEED_4XX: [u8; 16] = [
    0x0C, 0x91, 0x09, 0xDB, 0x93, 0x93, 0x07, 0x81, 0x07, 0x3C, 0xC4, 0x16, 0x22, 0x7C, 0x6C, 0x28,
];
