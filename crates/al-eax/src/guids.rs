//! Property-set and effect GUIDs

use al_core::Guid;

const fn g(d1: u32, d2: u16, d3: u16, d4: [u8; 8]) -> Guid {
    Guid::new(d1, d2, d3, d4)
}

pub const EAX_NULL_GUID: Guid = Guid::NULL;

/// Sentinel that selects whatever slot the context names as primary
pub const EAX_PRIMARY_FX_SLOT_ID: Guid =
    g(0xF317_866D, 0x924C, 0x450C, [0x86, 0x1B, 0xE6, 0xDA, 0xA2, 0x5E, 0x7C, 0x20]);

// Context
pub const EAXPROPERTYID_EAX40_CONTEXT: Guid =
    g(0x1D48_70AD, 0x0DEF, 0x43C0, [0xA4, 0x0C, 0x52, 0x36, 0x32, 0x29, 0x63, 0x42]);
pub const EAXPROPERTYID_EAX50_CONTEXT: Guid =
    g(0x57E1_3437, 0xB932, 0x4AB2, [0xB8, 0xBD, 0x52, 0x66, 0xC1, 0xA8, 0x87, 0xEE]);

// FX slots
pub const EAXPROPERTYID_EAX40_FX_SLOT0: Guid =
    g(0xC4D7_9F1E, 0xF1AC, 0x436B, [0xA8, 0x1D, 0xA7, 0x38, 0xE7, 0x04, 0x54, 0x69]);
pub const EAXPROPERTYID_EAX50_FX_SLOT0: Guid =
    g(0x91F9_590F, 0xC388, 0x407A, [0x84, 0xB0, 0x1B, 0xAE, 0x0E, 0xF7, 0x1A, 0xBC]);
pub const EAXPROPERTYID_EAX40_FX_SLOT1: Guid =
    g(0x08C0_0E96, 0x74BE, 0x4491, [0x93, 0xAA, 0xE8, 0xAD, 0x35, 0xA4, 0x91, 0x17]);
pub const EAXPROPERTYID_EAX50_FX_SLOT1: Guid =
    g(0x8F5F_7ACA, 0x9608, 0x4965, [0x81, 0x37, 0x82, 0x13, 0xC7, 0xB9, 0xD9, 0xDE]);
pub const EAXPROPERTYID_EAX40_FX_SLOT2: Guid =
    g(0x1D43_3B88, 0xF0F6, 0x4637, [0x91, 0x9F, 0x60, 0xE7, 0xE0, 0x6B, 0x5E, 0xDD]);
pub const EAXPROPERTYID_EAX50_FX_SLOT2: Guid =
    g(0x3C0F_5252, 0x9834, 0x46F0, [0xA1, 0xD8, 0x5B, 0x95, 0xC4, 0xB0, 0x0A, 0x30]);
pub const EAXPROPERTYID_EAX40_FX_SLOT3: Guid =
    g(0xEFFF_08EA, 0xC7D8, 0x44AB, [0x93, 0xAD, 0x6D, 0xBD, 0x5F, 0x91, 0x00, 0x64]);
pub const EAXPROPERTYID_EAX50_FX_SLOT3: Guid =
    g(0xE2EB_0EAA, 0xE806, 0x45E7, [0x9F, 0x86, 0x06, 0xC1, 0x57, 0x1A, 0x6F, 0xA3]);

pub const EAX40_FX_SLOT_IDS: [Guid; 4] = [
    EAXPROPERTYID_EAX40_FX_SLOT0,
    EAXPROPERTYID_EAX40_FX_SLOT1,
    EAXPROPERTYID_EAX40_FX_SLOT2,
    EAXPROPERTYID_EAX40_FX_SLOT3,
];

pub const EAX50_FX_SLOT_IDS: [Guid; 4] = [
    EAXPROPERTYID_EAX50_FX_SLOT0,
    EAXPROPERTYID_EAX50_FX_SLOT1,
    EAXPROPERTYID_EAX50_FX_SLOT2,
    EAXPROPERTYID_EAX50_FX_SLOT3,
];

// Sources
pub const EAXPROPERTYID_EAX40_SOURCE: Guid =
    g(0x1B86_B823, 0x22DF, 0x4EAE, [0x8B, 0x3C, 0x12, 0x78, 0xCE, 0x54, 0x42, 0x27]);
pub const EAXPROPERTYID_EAX50_SOURCE: Guid =
    g(0x5EDF_82F0, 0x24A7, 0x4F38, [0x8E, 0x64, 0x2F, 0x09, 0xCA, 0x05, 0xDE, 0xE1]);

// Legacy listener/buffer property sets
pub const DSPROPSETID_EAX20_LISTENER_PROPERTIES: Guid =
    g(0x0306_A6A8, 0xB224, 0x11D2, [0x99, 0xE5, 0x00, 0x00, 0xE8, 0xD8, 0xC7, 0x22]);
pub const DSPROPSETID_EAX20_BUFFER_PROPERTIES: Guid =
    g(0x0306_A6A7, 0xB224, 0x11D2, [0x99, 0xE5, 0x00, 0x00, 0xE8, 0xD8, 0xC7, 0x22]);
pub const DSPROPSETID_EAX30_LISTENER_PROPERTIES: Guid =
    g(0xA8FA_6882, 0xB476, 0x11D3, [0xBD, 0xB9, 0x00, 0xC0, 0xF0, 0x2D, 0xDF, 0x87]);
pub const DSPROPSETID_EAX30_BUFFER_PROPERTIES: Guid =
    g(0xA8FA_6881, 0xB476, 0x11D3, [0xBD, 0xB9, 0x00, 0xC0, 0xF0, 0x2D, 0xDF, 0x87]);

// Effects
pub const EAX_REVERB_EFFECT: Guid =
    g(0x0CF9_5C8F, 0xA3CC, 0x4849, [0xB0, 0xB6, 0x83, 0x2E, 0xCC, 0x18, 0x22, 0xDF]);
pub const EAX_AGCCOMPRESSOR_EFFECT: Guid =
    g(0xBFB7_A01E, 0x7825, 0x4039, [0x92, 0x7F, 0x03, 0xAA, 0xBD, 0xA0, 0xC5, 0x60]);
pub const EAX_AUTOWAH_EFFECT: Guid =
    g(0xEC31_30C0, 0xAC7A, 0x11D2, [0x88, 0xDD, 0x00, 0xA0, 0x24, 0xD1, 0x3C, 0xE1]);
pub const EAX_CHORUS_EFFECT: Guid =
    g(0xDE6D_6FE0, 0xAC79, 0x11D2, [0x88, 0xDD, 0x00, 0xA0, 0x24, 0xD1, 0x3C, 0xE1]);
pub const EAX_DISTORTION_EFFECT: Guid =
    g(0x975A_4CE0, 0xAC7E, 0x11D2, [0x88, 0xDD, 0x00, 0xA0, 0x24, 0xD1, 0x3C, 0xE1]);
pub const EAX_ECHO_EFFECT: Guid =
    g(0x0E9F_1BC0, 0xAC82, 0x11D2, [0x88, 0xDD, 0x00, 0xA0, 0x24, 0xD1, 0x3C, 0xE1]);
pub const EAX_EQUALIZER_EFFECT: Guid =
    g(0x65F9_4CE0, 0x9793, 0x11D3, [0x93, 0x9D, 0x00, 0xC0, 0xF0, 0x2D, 0xD6, 0xF0]);
pub const EAX_FLANGER_EFFECT: Guid =
    g(0xA700_07C0, 0x07D2, 0x11D3, [0x9B, 0x1E, 0x00, 0xA0, 0xC9, 0x22, 0xB9, 0xF9]);
pub const EAX_FREQUENCYSHIFTER_EFFECT: Guid =
    g(0xDC3E_1880, 0x9212, 0x11D3, [0x93, 0x9D, 0x00, 0xC0, 0xF0, 0x2D, 0xD6, 0xF0]);
pub const EAX_VOCALMORPHER_EFFECT: Guid =
    g(0xE41C_F10C, 0x3383, 0x11D2, [0x88, 0xDD, 0x00, 0xA0, 0x24, 0xD1, 0x3C, 0xE1]);
pub const EAX_PITCHSHIFTER_EFFECT: Guid =
    g(0xE790_5100, 0xAFB2, 0x11D2, [0x88, 0xDD, 0x00, 0xA0, 0x24, 0xD1, 0x3C, 0xE1]);
pub const EAX_RINGMODULATOR_EFFECT: Guid =
    g(0x0B89_FE60, 0xAFB5, 0x11D2, [0x88, 0xDD, 0x00, 0xA0, 0x24, 0xD1, 0x3C, 0xE1]);

/// True for any of the eight v4/v5 FX-slot GUIDs
pub fn is_fx_slot_guid(guid: &Guid) -> bool {
    EAX40_FX_SLOT_IDS.contains(guid) || EAX50_FX_SLOT_IDS.contains(guid)
}
