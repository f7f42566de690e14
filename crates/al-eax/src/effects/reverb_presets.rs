//! The 26 EAX reverb environment presets

use super::reverb::*;

/// Environment indices
pub const EAX_ENVIRONMENT_GENERIC: u32 = 0;
pub const EAX_ENVIRONMENT_PADDEDCELL: u32 = 1;
pub const EAX_ENVIRONMENT_ROOM: u32 = 2;
pub const EAX_ENVIRONMENT_BATHROOM: u32 = 3;
pub const EAX_ENVIRONMENT_LIVINGROOM: u32 = 4;
pub const EAX_ENVIRONMENT_STONEROOM: u32 = 5;
pub const EAX_ENVIRONMENT_AUDITORIUM: u32 = 6;
pub const EAX_ENVIRONMENT_CONCERTHALL: u32 = 7;
pub const EAX_ENVIRONMENT_CAVE: u32 = 8;
pub const EAX_ENVIRONMENT_ARENA: u32 = 9;
pub const EAX_ENVIRONMENT_HANGAR: u32 = 10;
pub const EAX_ENVIRONMENT_CARPETEDHALLWAY: u32 = 11;
pub const EAX_ENVIRONMENT_HALLWAY: u32 = 12;
pub const EAX_ENVIRONMENT_STONECORRIDOR: u32 = 13;
pub const EAX_ENVIRONMENT_ALLEY: u32 = 14;
pub const EAX_ENVIRONMENT_FOREST: u32 = 15;
pub const EAX_ENVIRONMENT_CITY: u32 = 16;
pub const EAX_ENVIRONMENT_MOUNTAINS: u32 = 17;
pub const EAX_ENVIRONMENT_QUARRY: u32 = 18;
pub const EAX_ENVIRONMENT_PLAIN: u32 = 19;
pub const EAX_ENVIRONMENT_PARKINGLOT: u32 = 20;
pub const EAX_ENVIRONMENT_SEWERPIPE: u32 = 21;
pub const EAX_ENVIRONMENT_UNDERWATER: u32 = 22;
pub const EAX_ENVIRONMENT_DRUGGED: u32 = 23;
pub const EAX_ENVIRONMENT_DIZZY: u32 = 24;
pub const EAX_ENVIRONMENT_PSYCHOTIC: u32 = 25;
/// Marks a hand-edited environment; valid only in a full property set
pub const EAX_ENVIRONMENT_UNDEFINED: u32 = 26;

pub const EAX_ENVIRONMENT_COUNT: usize = 26;

pub const EAXREVERB_PRESET_NAMES: [&str; EAX_ENVIRONMENT_COUNT] = [
    "generic",
    "padded_cell",
    "room",
    "bathroom",
    "living_room",
    "stone_room",
    "auditorium",
    "concert_hall",
    "cave",
    "arena",
    "hangar",
    "carpeted_hallway",
    "hallway",
    "stone_corridor",
    "alley",
    "forest",
    "city",
    "mountains",
    "quarry",
    "plain",
    "parking_lot",
    "sewer_pipe",
    "underwater",
    "drugged",
    "dizzy",
    "psychotic",
];

const ZERO_PAN: EaxVector = EaxVector { x: 0.0, y: 0.0, z: 0.0 };

const SCALE_ALL: u32 = 0x3F;
const SCALE_NO_HF_LIMIT: u32 = 0x1F;

#[allow(clippy::too_many_arguments)]
const fn preset(
    environment: u32,
    environment_size: f32,
    environment_diffusion: f32,
    room: i32,
    room_hf: i32,
    decay_time: f32,
    decay_hf_ratio: f32,
    reflections: i32,
    reflections_delay: f32,
    reverb: i32,
    reverb_delay: f32,
    echo: (f32, f32),
    modulation: (f32, f32),
    flags: u32,
) -> ReverbProperties {
    ReverbProperties {
        environment,
        environment_size,
        environment_diffusion,
        room,
        room_hf,
        room_lf: 0,
        decay_time,
        decay_hf_ratio,
        decay_lf_ratio: 1.0,
        reflections,
        reflections_delay,
        reflections_pan: ZERO_PAN,
        reverb,
        reverb_delay,
        reverb_pan: ZERO_PAN,
        echo_time: echo.0,
        echo_depth: echo.1,
        modulation_time: modulation.0,
        modulation_depth: modulation.1,
        air_absorption_hf: -5.0,
        hf_reference: 5000.0,
        lf_reference: 250.0,
        room_rolloff_factor: 0.0,
        flags,
    }
}

const NO_ECHO: (f32, f32) = (0.25, 0.0);
const NO_MOD: (f32, f32) = (0.25, 0.0);

#[rustfmt::skip]
pub const EAXREVERB_PRESETS: [ReverbProperties; EAX_ENVIRONMENT_COUNT] = [
    preset(EAX_ENVIRONMENT_GENERIC,          7.5,   1.0,  -1000,  -100,  1.49, 0.83,  -2602, 0.007,   200, 0.011, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_PADDEDCELL,       1.4,   1.0,  -1000, -6000,  0.17, 0.10,  -1204, 0.001,   207, 0.002, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_ROOM,             1.9,   1.0,  -1000,  -454,  0.40, 0.83,  -1646, 0.002,    53, 0.003, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_BATHROOM,         1.4,   1.0,  -1000, -1200,  1.49, 0.54,   -370, 0.007,  1030, 0.011, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_LIVINGROOM,       2.5,   1.0,  -1000, -6000,  0.50, 0.10,  -1376, 0.003, -1104, 0.004, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_STONEROOM,       11.6,   1.0,  -1000,  -300,  2.31, 0.64,   -711, 0.012,    83, 0.017, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_AUDITORIUM,      21.6,   1.0,  -1000,  -476,  4.32, 0.59,   -789, 0.020,  -289, 0.030, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_CONCERTHALL,     19.6,   1.0,  -1000,  -500,  3.92, 0.70,  -1230, 0.020,    -2, 0.029, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_CAVE,            14.6,   1.0,  -1000,     0,  2.91, 1.30,   -602, 0.015,  -302, 0.022, NO_ECHO,       NO_MOD,          SCALE_NO_HF_LIMIT),
    preset(EAX_ENVIRONMENT_ARENA,           36.2,   1.0,  -1000,  -698,  7.24, 0.33,  -1166, 0.020,    16, 0.030, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_HANGAR,          50.3,   1.0,  -1000, -1000, 10.05, 0.23,   -602, 0.020,   198, 0.030, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_CARPETEDHALLWAY,  1.9,   1.0,  -1000, -4000,  0.30, 0.10,  -1831, 0.002, -1630, 0.030, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_HALLWAY,          1.8,   1.0,  -1000,  -300,  1.49, 0.59,  -1219, 0.007,   441, 0.011, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_STONECORRIDOR,   13.5,   1.0,  -1000,  -237,  2.70, 0.79,  -1214, 0.013,   395, 0.020, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_ALLEY,            7.5,   0.3,  -1000,  -270,  1.49, 0.86,  -1204, 0.007,    -4, 0.011, (0.125, 0.95), NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_FOREST,          38.0,   0.3,  -1000, -3300,  1.49, 0.54,  -2560, 0.162,  -229, 0.088, (0.125, 1.0),  NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_CITY,             7.5,   0.5,  -1000,  -800,  1.49, 0.67,  -2273, 0.007, -1691, 0.011, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_MOUNTAINS,      100.0,   0.27, -1000, -2500,  1.49, 0.21,  -2780, 0.300, -1434, 0.100, (0.25, 1.0),   NO_MOD,          SCALE_NO_HF_LIMIT),
    preset(EAX_ENVIRONMENT_QUARRY,          17.5,   1.0,  -1000, -1000,  1.49, 0.83, -10000, 0.061,   500, 0.025, (0.125, 0.70), NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_PLAIN,           42.5,   0.21, -1000, -2000,  1.49, 0.50,  -2466, 0.179, -1926, 0.100, (0.25, 1.0),   NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_PARKINGLOT,       8.3,   1.0,  -1000,     0,  1.65, 1.50,  -1363, 0.008, -1153, 0.012, NO_ECHO,       NO_MOD,          SCALE_NO_HF_LIMIT),
    preset(EAX_ENVIRONMENT_SEWERPIPE,        1.7,   0.8,  -1000, -1000,  2.81, 0.14,    429, 0.014,  1023, 0.021, NO_ECHO,       NO_MOD,          SCALE_ALL),
    preset(EAX_ENVIRONMENT_UNDERWATER,       1.8,   1.0,  -1000, -4000,  1.49, 0.10,   -449, 0.007,  1700, 0.011, NO_ECHO,       (1.18, 0.348),   SCALE_ALL),
    preset(EAX_ENVIRONMENT_DRUGGED,          1.9,   0.5,  -1000,     0,  8.39, 1.39,   -115, 0.002,   985, 0.030, NO_ECHO,       (0.25, 1.0),     SCALE_NO_HF_LIMIT),
    preset(EAX_ENVIRONMENT_DIZZY,            1.8,   0.6,  -1000,  -400, 17.23, 0.56,  -1713, 0.020,  -613, 0.030, (0.25, 1.0),   (0.81, 0.31),    SCALE_NO_HF_LIMIT),
    preset(EAX_ENVIRONMENT_PSYCHOTIC,        1.0,   0.5,  -1000,  -151,  7.56, 0.91,   -626, 0.020,   774, 0.030, NO_ECHO,       (4.0, 1.0),      SCALE_NO_HF_LIMIT),
];

/// Preset index for a name like `"concert_hall"`
pub fn preset_by_name(name: &str) -> Option<usize> {
    EAXREVERB_PRESET_NAMES.iter().position(|n| n.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_indexed_by_environment() {
        for (i, preset) in EAXREVERB_PRESETS.iter().enumerate() {
            assert_eq!(preset.environment as usize, i);
        }
        assert_eq!(EAXREVERB_PRESETS[0], ReverbProperties::default());
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(preset_by_name("concert_hall"), Some(EAX_ENVIRONMENT_CONCERTHALL as usize));
        assert_eq!(preset_by_name("Psychotic"), Some(25));
        assert_eq!(preset_by_name("ballroom"), None);
    }

    #[test]
    fn test_preset_serializes_wire_fields() {
        let index = EAX_ENVIRONMENT_CONCERTHALL as usize;
        let preset = &EAXREVERB_PRESETS[index];
        let json = serde_json::to_value(preset).unwrap();

        assert_eq!(json["environment"], index);
        assert_eq!(json["room"], preset.room);
        assert_eq!(json["decay_time"].as_f64().unwrap() as f32, preset.decay_time);
        assert_eq!(json["reverb_pan"].as_object().unwrap().len(), 3);
        assert_eq!(json.as_object().unwrap().len(), 24);
    }
}
