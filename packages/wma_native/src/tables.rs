//! Constant tables used by the decoder.
//!
//! Prefix codes are stored as code lengths (canonical assignment, see
//! [`crate::vlc::Vlc::from_lengths`]) except for the exponent and high-band
//! gain codes, which keep explicit bit patterns. Trigonometric and power tables are raw Q-format
//! integers; everything derived from them is built with integer arithmetic.

/// Band edges in Hz used to lay out exponent bands.
pub const CRITICAL_FREQS: [u32; 25] = [
    100, 200, 300, 400, 510, 630, 770, 920, 1080, 1270, 1480, 1720, 2000, 2320, 2700, 3150, 3700,
    4400, 5300, 6400, 7700, 9500, 12000, 15500, 24500,
];

/// Exponent band sizes for WMAv2, indexed by `frame_len_bits - 7 - k` for block
/// size index `k` when that value is below 3. The first entry of each row is the
/// number of bands that follow.
pub const EXPONENT_BANDS_22050: [&[u8]; 3] = [
    &[10, 4, 8, 4, 8, 8, 12, 20, 24, 24, 16],
    &[14, 4, 8, 8, 4, 12, 12, 16, 24, 16, 20, 24, 32, 40, 36],
    &[
        23, 4, 4, 4, 8, 4, 4, 8, 8, 8, 8, 8, 12, 12, 16, 16, 24, 24, 32, 44, 48, 60, 84, 72,
    ],
];

pub const EXPONENT_BANDS_32000: [&[u8]; 3] = [
    &[11, 4, 4, 8, 4, 4, 12, 16, 24, 20, 28, 4],
    &[15, 4, 8, 4, 4, 8, 8, 16, 20, 12, 20, 20, 28, 40, 56, 8],
    &[16, 8, 4, 8, 8, 8, 8, 16, 12, 24, 16, 28, 32, 44, 68, 96, 132],
];

pub const EXPONENT_BANDS_44100: [&[u8]; 3] = [
    &[12, 4, 4, 4, 4, 4, 8, 8, 8, 12, 16, 20, 36],
    &[15, 4, 8, 4, 8, 8, 4, 8, 8, 12, 12, 12, 24, 28, 40, 76],
    &[17, 4, 8, 8, 4, 12, 12, 8, 8, 24, 16, 20, 24, 32, 40, 60, 80, 152],
];

/// Exponent delta code. Symbol `s` encodes a delta of `s - 60`.
pub const EXPONENT_CODES: [u32; 121] = [
    0x3_ffe8, 0x3_ffe6, 0x3_ffe7, 0x3_ffe5, 0x7_fff5, 0x7_fff1, 0x7_ffed, 0x7_fff6,
    0x7_ffee, 0x7_ffef, 0x7_fff0, 0x7_fffc, 0x7_fffd, 0x7_ffff, 0x7_fffe, 0x7_fff7,
    0x7_fff8, 0x7_fffb, 0x7_fff9, 0x3_ffe4, 0x7_fffa, 0x3_ffe3, 0x1_ffef, 0x1_fff0,
    0x0_fff5, 0x1_ffee, 0x0_fff2, 0x0_fff3, 0x0_fff4, 0x0_fff1, 0x0_7ff6, 0x0_7ff7,
    0x0_3ff9, 0x0_3ff5, 0x0_3ff7, 0x0_3ff3, 0x0_3ff6, 0x0_3ff2, 0x0_1ff7, 0x0_1ff5,
    0x0_0ff9, 0x0_0ff7, 0x0_0ff6, 0x0_07f9, 0x0_0ff4, 0x0_07f8, 0x0_03f9, 0x0_03f7,
    0x0_03f5, 0x0_01f8, 0x0_01f7, 0x0_00fa, 0x0_00f8, 0x0_00f6, 0x0_0079, 0x0_003a,
    0x0_0038, 0x0_001a, 0x0_000b, 0x0_0004, 0x0_0000, 0x0_000a, 0x0_000c, 0x0_001b,
    0x0_0039, 0x0_003b, 0x0_0078, 0x0_007a, 0x0_00f7, 0x0_00f9, 0x0_01f6, 0x0_01f9,
    0x0_03f4, 0x0_03f6, 0x0_03f8, 0x0_07f5, 0x0_07f4, 0x0_07f6, 0x0_07f7, 0x0_0ff5,
    0x0_0ff8, 0x0_1ff4, 0x0_1ff6, 0x0_1ff8, 0x0_3ff8, 0x0_3ff4, 0x0_fff0, 0x0_7ff4,
    0x0_fff6, 0x0_7ff5, 0x3_ffe2, 0x7_ffd9, 0x7_ffda, 0x7_ffdb, 0x7_ffdc, 0x7_ffdd,
    0x7_ffde, 0x7_ffd8, 0x7_ffd2, 0x7_ffd3, 0x7_ffd4, 0x7_ffd5, 0x7_ffd6, 0x7_fff2,
    0x7_ffdf, 0x7_ffe7, 0x7_ffe8, 0x7_ffe9, 0x7_ffea, 0x7_ffeb, 0x7_ffe6, 0x7_ffe0,
    0x7_ffe1, 0x7_ffe2, 0x7_ffe3, 0x7_ffe4, 0x7_ffe5, 0x7_ffd7, 0x7_ffec, 0x7_fff4,
    0x7_fff3,
];

pub const EXPONENT_BITS: [u8; 121] = [
    18, 18, 18, 18, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19,
    19, 19, 19, 18, 19, 18, 17, 17, 16, 17, 16, 16, 16, 16, 15, 15,
    14, 14, 14, 14, 14, 14, 13, 13, 12, 12, 12, 11, 12, 11, 10, 10,
    10, 9, 9, 8, 8, 8, 7, 6, 6, 5, 4, 3, 1, 4, 4, 5,
    6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 10, 11, 11, 11, 11, 12,
    12, 13, 13, 13, 14, 14, 16, 15, 16, 15, 18, 19, 19, 19, 19, 19,
    19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19,
    19, 19, 19, 19, 19, 19, 19, 19, 19,
];

/// High-band gain delta code. Symbol `s` encodes a delta of `s - 18`.
pub const HGAIN_CODES: [u32; 37] = [
    0x0003, 0x02e7, 0x0001, 0x05cd, 0x005d, 0x05c9, 0x005e, 0x0003,
    0x0016, 0x000b, 0x0001, 0x0006, 0x0001, 0x0006, 0x0004, 0x0005,
    0x0004, 0x0007, 0x0003, 0x0007, 0x0004, 0x000a, 0x000a, 0x0002,
    0x0003, 0x0000, 0x0005, 0x0002, 0x005f, 0x0004, 0x0003, 0x0002,
    0x05c8, 0x00b8, 0x05ca, 0x05cb, 0x05cc,
];

pub const HGAIN_BITS: [u8; 37] = [
    10, 12, 10, 13, 9, 13, 9, 8, 7, 5, 5, 4, 4, 3, 3, 3,
    4, 3, 4, 4, 5, 5, 6, 8, 7, 10, 8, 10, 9, 8, 9, 9,
    13, 10, 13, 13, 13,
];

/// Run/level coefficient codebook.
///
/// Symbol 0 is the escape code, symbol 1 ends the block, and symbols `2..`
/// enumerate `(level, run)` pairs: `levels[l - 1]` consecutive symbols for
/// level `l` with runs `0..levels[l - 1]`.
#[derive(Debug, Clone, Copy)]
pub struct CoefCodebook {
    pub bits: &'static [u8],
    pub levels: &'static [u16],
}

const COEF_C0N_BITS: [u8; 92] = [
    11, 5, 3, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 7, 7,
    7, 7, 8, 8, 8, 8, 9, 9, 9, 9, 10, 10, 10, 10, 11, 11,
    5, 5, 5, 5, 6, 6, 6, 7, 7, 7, 7, 8, 8, 8, 8, 9,
    9, 9, 9, 10, 6, 6, 6, 7, 7, 7, 8, 8, 8, 8, 9, 9,
    7, 8, 8, 8, 8, 9, 9, 9, 9, 9, 9, 9, 10, 10, 10, 10,
    10, 11, 11, 11, 12, 12, 12, 13, 14, 15, 16, 17,
];

const COEF_C0N_LEVELS: [u16; 12] = [
    30, 20, 12, 8, 6, 4, 3, 2, 2, 1, 1, 1,
];

const COEF_C0M_BITS: [u8; 99] = [
    11, 6, 3, 4, 4, 4, 4, 5, 5, 5, 5, 5, 6, 6, 6, 6,
    6, 7, 7, 7, 7, 7, 8, 8, 8, 8, 8, 9, 9, 9, 9, 9,
    10, 10, 10, 10, 10, 11, 11, 11, 11, 11, 5, 5, 6, 6, 6, 6,
    6, 7, 7, 7, 7, 7, 8, 8, 8, 8, 8, 9, 9, 9, 9, 9,
    9, 10, 7, 7, 7, 7, 7, 8, 8, 8, 8, 8, 9, 9, 8, 8,
    9, 9, 9, 9, 9, 10, 10, 10, 10, 10, 11, 11, 11, 12, 13, 14,
    15, 16, 17,
];

const COEF_C0M_LEVELS: [u16; 10] = [
    40, 24, 12, 8, 5, 3, 2, 1, 1, 1,
];

const COEF_C1N_BITS: [u8; 105] = [
    11, 5, 3, 4, 4, 4, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7,
    8, 8, 8, 8, 9, 9, 9, 10, 10, 10, 4, 5, 5, 5, 6, 6,
    6, 7, 7, 7, 7, 8, 8, 8, 9, 9, 9, 9, 6, 6, 6, 6,
    7, 7, 7, 8, 8, 8, 8, 9, 9, 9, 7, 7, 7, 7, 8, 8,
    8, 9, 9, 9, 8, 8, 8, 8, 9, 9, 9, 10, 9, 9, 9, 9,
    10, 10, 9, 10, 10, 10, 11, 10, 11, 11, 11, 12, 12, 12, 12, 13,
    13, 14, 14, 14, 15, 16, 17, 18, 19,
];

const COEF_C1N_LEVELS: [u16; 16] = [
    24, 18, 14, 10, 8, 6, 5, 4, 3, 3, 2, 2, 1, 1, 1, 1,
];

const COEF_C1M_BITS: [u8; 98] = [
    11, 5, 4, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 6,
    7, 7, 7, 7, 8, 8, 8, 8, 9, 9, 9, 9, 9, 10, 10, 10,
    10, 11, 5, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 7, 8, 8,
    8, 8, 8, 9, 9, 9, 6, 6, 6, 7, 7, 7, 7, 8, 8, 8,
    8, 9, 9, 9, 7, 8, 8, 8, 8, 9, 9, 9, 9, 9, 9, 9,
    9, 9, 10, 10, 10, 10, 10, 11, 11, 12, 12, 13, 13, 13, 14, 15,
    16, 17,
];

const COEF_C1M_LEVELS: [u16; 12] = [
    32, 20, 14, 10, 6, 4, 3, 2, 2, 1, 1, 1,
];

const COEF_C2N_BITS: [u8; 109] = [
    11, 5, 4, 4, 4, 5, 5, 5, 5, 6, 6, 7, 7, 7, 8, 8,
    8, 9, 4, 5, 5, 5, 6, 6, 6, 7, 7, 7, 8, 8, 8, 9,
    5, 5, 6, 6, 6, 7, 7, 7, 8, 8, 8, 9, 6, 6, 6, 7,
    7, 7, 8, 8, 8, 9, 6, 7, 7, 7, 8, 8, 8, 9, 7, 7,
    8, 8, 9, 9, 9, 8, 8, 9, 9, 9, 9, 9, 9, 9, 10, 10,
    9, 10, 10, 10, 10, 10, 11, 11, 11, 11, 11, 11, 12, 12, 12, 12,
    13, 13, 14, 14, 14, 15, 16, 17, 18, 19, 20, 21, 22,
];

const COEF_C2N_LEVELS: [u16; 24] = [
    16, 14, 12, 10, 8, 7, 6, 5, 4, 4, 3, 3, 2, 2, 2, 1,
    1, 1, 1, 1, 1, 1, 1, 1,
];

const COEF_C2M_BITS: [u8; 100] = [
    12, 6, 3, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 7, 7,
    7, 7, 8, 8, 8, 8, 9, 9, 9, 9, 10, 10, 10, 10, 5, 5,
    5, 5, 6, 6, 6, 6, 7, 7, 7, 7, 8, 8, 8, 8, 9, 9,
    6, 6, 6, 6, 7, 7, 7, 7, 8, 8, 8, 9, 7, 7, 7, 7,
    8, 8, 8, 9, 9, 8, 8, 8, 9, 9, 9, 9, 9, 9, 9, 10,
    10, 10, 10, 10, 11, 11, 11, 12, 12, 12, 13, 13, 13, 14, 15, 16,
    17, 18, 19, 20,
];

const COEF_C2M_LEVELS: [u16; 16] = [
    28, 18, 12, 9, 7, 5, 4, 3, 3, 2, 2, 1, 1, 1, 1, 1,
];

/// Coefficient codebooks as `[rate class][normal, mid/side]`.
pub const COEF_CODEBOOKS: [[CoefCodebook; 2]; 3] = [
    [
        CoefCodebook {
            bits: &COEF_C0N_BITS,
            levels: &COEF_C0N_LEVELS,
        },
        CoefCodebook {
            bits: &COEF_C0M_BITS,
            levels: &COEF_C0M_LEVELS,
        },
    ],
    [
        CoefCodebook {
            bits: &COEF_C1N_BITS,
            levels: &COEF_C1N_LEVELS,
        },
        CoefCodebook {
            bits: &COEF_C1M_BITS,
            levels: &COEF_C1M_LEVELS,
        },
    ],
    [
        CoefCodebook {
            bits: &COEF_C2N_BITS,
            levels: &COEF_C2N_LEVELS,
        },
        CoefCodebook {
            bits: &COEF_C2M_BITS,
            levels: &COEF_C2M_LEVELS,
        },
    ],
];

/// `sin(a * pi / 128)` for `a` in `0..=64`, Q31.
pub const SIN_COARSE_Q31: [i32; 65] = [
    0, 52_701_887, 105_372_028, 157_978_697, 210_490_206,
    262_874_923, 315_101_295, 367_137_861, 418_953_276, 470_516_330,
    521_795_963, 572_761_285, 623_381_598, 673_626_408, 723_465_451,
    772_868_706, 821_806_413, 870_249_095, 918_167_572, 965_532_978,
    1_012_316_784, 1_058_490_808, 1_104_027_237, 1_148_898_640, 1_193_077_991,
    1_236_538_675, 1_279_254_516, 1_321_199_781, 1_362_349_204, 1_402_678_000,
    1_442_161_874, 1_480_777_044, 1_518_500_250, 1_555_308_768, 1_591_180_426,
    1_626_093_616, 1_660_027_308, 1_692_961_062, 1_724_875_040, 1_755_750_017,
    1_785_567_396, 1_814_309_216, 1_841_958_164, 1_868_497_586, 1_893_911_494,
    1_918_184_581, 1_941_302_225, 1_963_250_501, 1_984_016_189, 2_003_586_779,
    2_021_950_484, 2_039_096_241, 2_055_013_723, 2_069_693_342, 2_083_126_254,
    2_095_304_370, 2_106_220_352, 2_115_867_626, 2_124_240_380, 2_131_333_572,
    2_137_142_927, 2_141_664_948, 2_144_896_910, 2_146_836_866, 2_147_483_647,
];

/// `sin(b * pi / 16384)` for `b` in `0..128`, Q31.
pub const SIN_FINE_Q31: [i32; 128] = [
    0, 411_775, 823_550, 1_235_324, 1_647_099,
    2_058_874, 2_470_648, 2_882_423, 3_294_197, 3_705_972,
    4_117_746, 4_529_520, 4_941_294, 5_353_067, 5_764_841,
    6_176_614, 6_588_387, 7_000_160, 7_411_932, 7_823_705,
    8_235_476, 8_647_248, 9_059_019, 9_470_790, 9_882_561,
    10_294_331, 10_706_101, 11_117_871, 11_529_640, 11_941_409,
    12_353_177, 12_764_945, 13_176_712, 13_588_479, 14_000_245,
    14_412_011, 14_823_776, 15_235_541, 15_647_305, 16_059_069,
    16_470_832, 16_882_594, 17_294_356, 17_706_117, 18_117_878,
    18_529_638, 18_941_397, 19_353_155, 19_764_913, 20_176_670,
    20_588_426, 21_000_182, 21_411_936, 21_823_690, 22_235_444,
    22_647_196, 23_058_947, 23_470_698, 23_882_448, 24_294_197,
    24_705_945, 25_117_692, 25_529_438, 25_941_183, 26_352_928,
    26_764_671, 27_176_413, 27_588_155, 27_999_895, 28_411_635,
    28_823_373, 29_235_110, 29_646_846, 30_058_581, 30_470_315,
    30_882_048, 31_293_780, 31_705_510, 32_117_239, 32_528_968,
    32_940_695, 33_352_420, 33_764_145, 34_175_868, 34_587_590,
    34_999_311, 35_411_031, 35_822_749, 36_234_466, 36_646_181,
    37_057_895, 37_469_608, 37_881_320, 38_293_030, 38_704_738,
    39_116_446, 39_528_151, 39_939_856, 40_351_559, 40_763_260,
    41_174_960, 41_586_658, 41_998_355, 42_410_051, 42_821_744,
    43_233_436, 43_645_127, 44_056_816, 44_468_503, 44_880_189,
    45_291_873, 45_703_556, 46_115_236, 46_526_915, 46_938_593,
    47_350_268, 47_761_942, 48_173_614, 48_585_284, 48_996_953,
    49_408_620, 49_820_285, 50_231_948, 50_643_609, 51_055_268,
    51_466_926, 51_878_581, 52_290_235,
];

/// `cos(b * pi / 16384)` for `b` in `0..128`, Q31.
pub const COS_FINE_Q31: [i32; 128] = [
    2_147_483_647, 2_147_483_609, 2_147_483_490, 2_147_483_293, 2_147_483_016,
    2_147_482_661, 2_147_482_227, 2_147_481_714, 2_147_481_121, 2_147_480_450,
    2_147_479_700, 2_147_478_871, 2_147_477_963, 2_147_476_976, 2_147_475_910,
    2_147_474_765, 2_147_473_542, 2_147_472_239, 2_147_470_857, 2_147_469_396,
    2_147_467_857, 2_147_466_238, 2_147_464_540, 2_147_462_764, 2_147_460_908,
    2_147_458_974, 2_147_456_961, 2_147_454_868, 2_147_452_697, 2_147_450_447,
    2_147_448_118, 2_147_445_709, 2_147_443_222, 2_147_440_656, 2_147_438_011,
    2_147_435_287, 2_147_432_484, 2_147_429_602, 2_147_426_641, 2_147_423_602,
    2_147_420_483, 2_147_417_285, 2_147_414_008, 2_147_410_653, 2_147_407_218,
    2_147_403_705, 2_147_400_112, 2_147_396_441, 2_147_392_690, 2_147_388_861,
    2_147_384_953, 2_147_380_965, 2_147_376_899, 2_147_372_754, 2_147_368_530,
    2_147_364_227, 2_147_359_845, 2_147_355_384, 2_147_350_844, 2_147_346_225,
    2_147_341_527, 2_147_336_750, 2_147_331_895, 2_147_326_960, 2_147_321_946,
    2_147_316_854, 2_147_311_682, 2_147_306_432, 2_147_301_102, 2_147_295_694,
    2_147_290_207, 2_147_284_640, 2_147_278_995, 2_147_273_271, 2_147_267_468,
    2_147_261_586, 2_147_255_625, 2_147_249_585, 2_147_243_466, 2_147_237_268,
    2_147_230_991, 2_147_224_635, 2_147_218_201, 2_147_211_687, 2_147_205_094,
    2_147_198_423, 2_147_191_672, 2_147_184_843, 2_147_177_934, 2_147_170_947,
    2_147_163_881, 2_147_156_736, 2_147_149_511, 2_147_142_208, 2_147_134_826,
    2_147_127_365, 2_147_119_825, 2_147_112_206, 2_147_104_508, 2_147_096_732,
    2_147_088_876, 2_147_080_941, 2_147_072_928, 2_147_064_835, 2_147_056_664,
    2_147_048_413, 2_147_040_084, 2_147_031_675, 2_147_023_188, 2_147_014_622,
    2_147_005_977, 2_146_997_253, 2_146_988_450, 2_146_979_568, 2_146_970_607,
    2_146_961_567, 2_146_952_448, 2_146_943_251, 2_146_933_974, 2_146_924_618,
    2_146_915_184, 2_146_905_670, 2_146_896_078, 2_146_886_407, 2_146_876_656,
    2_146_866_827, 2_146_856_919, 2_146_846_932,
];

/// `2^(i / 64)` for `i` in `0..=64`, Q30.
pub const POW2_FRAC_Q30: [u32; 65] = [
    1_073_741_824, 1_085_434_106, 1_097_253_708, 1_109_202_018, 1_121_280_436, 1_133_490_379,
    1_145_833_280, 1_158_310_587, 1_170_923_762, 1_183_674_286, 1_196_563_654, 1_209_593_378,
    1_222_764_986, 1_236_080_024, 1_249_540_052, 1_263_146_652, 1_276_901_417, 1_290_805_962,
    1_304_861_917, 1_319_070_932, 1_333_434_672, 1_347_954_824, 1_362_633_090, 1_377_471_191,
    1_392_470_869, 1_407_633_882, 1_422_962_010, 1_438_457_051, 1_454_120_821, 1_469_955_159,
    1_485_961_921, 1_502_142_985, 1_518_500_250, 1_535_035_634, 1_551_751_076, 1_568_648_537,
    1_585_730_000, 1_602_997_467, 1_620_452_965, 1_638_098_541, 1_655_936_265, 1_673_968_228,
    1_692_196_547, 1_710_623_359, 1_729_250_827, 1_748_081_133, 1_767_116_489, 1_786_359_126,
    1_805_811_301, 1_825_475_297, 1_845_353_420, 1_865_448_001, 1_885_761_398, 1_906_295_993,
    1_927_054_196, 1_948_038_440, 1_969_251_188, 1_990_694_927, 2_012_372_174, 2_034_285_470,
    2_056_437_387, 2_078_830_522, 2_101_467_502, 2_124_350_982, 2_147_483_648,
];

/// `10^(-d / 16)` for exponent distances `d` below the block peak, Q30.
pub const EXP10_NEG_Q30: [u32; 216] = [
    1_073_741_824, 929_822_112, 805_192_776, 697_268_218, 603_809_400, 522_877_399,
    452_793_173, 392_102_733, 339_546_978, 294_035_569, 254_624_313, 220_495_571,
    190_941_298, 165_348_352, 143_185_773, 123_993_771, 107_374_182, 92_982_211,
    80_519_278, 69_726_822, 60_380_940, 52_287_740, 45_279_317, 39_210_273,
    33_954_698, 29_403_557, 25_462_431, 22_049_557, 19_094_130, 16_534_835,
    14_318_577, 12_399_377, 10_737_418, 9_298_221, 8_051_928, 6_972_682,
    6_038_094, 5_228_774, 4_527_932, 3_921_027, 3_395_470, 2_940_356,
    2_546_243, 2_204_956, 1_909_413, 1_653_484, 1_431_858, 1_239_938,
    1_073_742, 929_822, 805_193, 697_268, 603_809, 522_877,
    452_793, 392_103, 339_547, 294_036, 254_624, 220_496,
    190_941, 165_348, 143_186, 123_994, 107_374, 92982,
    80519, 69727, 60381, 52288, 45279, 39210,
    33955, 29404, 25462, 22050, 19094, 16535,
    14319, 12399, 10737, 9298, 8052, 6973,
    6038, 5229, 4528, 3921, 3395, 2940,
    2546, 2205, 1909, 1653, 1432, 1240,
    1074, 930, 805, 697, 604, 523,
    453, 392, 340, 294, 255, 220,
    191, 165, 143, 124, 107, 93,
    81, 70, 60, 52, 45, 39,
    34, 29, 25, 22, 19, 17,
    14, 12, 11, 9, 8, 7,
    6, 5, 5, 4, 3, 3,
    3, 2, 2, 2, 1, 1,
    1, 1, 1, 1, 1, 1,
    0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0,
];

/// `log2(10) / 20` in Q32.
pub const LOG2_10_OVER_20_Q32: i64 = 713_378_626;

/// LSP quantizer levels as `2 * cos(w)`, Q28. Row `i` holds the 16 levels of
/// coefficient `i`.
pub const LSP_CODEBOOK_Q28: [[i32; 16]; 10] = [
    [
        536_274_918, 535_846_528, 535_302_965, 534_644_348,
        533_870_817, 532_982_540, 531_979_706, 530_862_531,
        529_631_256, 528_286_145, 526_827_487, 525_255_597,
        523_570_810, 521_773_491, 519_864_024, 517_842_821,
    ],
    [
        502_212_690, 499_376_639, 496_433_256, 493_383_172,
        490_227_043, 486_965_547, 483_599_386, 480_129_283,
        476_555_984, 472_880_256, 469_102_890, 465_224_698,
        461_246_514, 457_169_191, 452_993_608, 448_720_660,
    ],
    [
        418_990_385, 414_024_287, 408_969_201, 403_826_213,
        398_596_430, 393_280_974, 387_880_989, 382_397_635,
        376_832_091, 371_185_553, 365_459_234, 359_654_365,
        353_772_195, 347_813_986, 341_781_021, 335_674_595,
    ],
    [
        294_754_381, 288_144_352, 281_472_391, 274_739_931,
        267_948_421, 261_099_319, 254_194_098, 247_234_243,
        240_221_248, 233_156_621, 226_041_881, 218_878_557,
        211_668_188, 204_412_325, 197_112_527, 189_770_362,
    ],
    [
        141_665_765, 134_058_840, 126_423_102, 118_760_191,
        111_071_754, 103_359_444, 95_624_918, 87_869_840,
        80_095_875, 72_304_695, 64_497_974, 56_677_391,
        48_844_625, 41_001_361, 33_149_285, 25_290_083,
    ],
    [
        -25_290_083, -33_149_285, -41_001_361, -48_844_625,
        -56_677_391, -64_497_974, -72_304_695, -80_095_875,
        -87_869_840, -95_624_918, -103_359_444, -111_071_754,
        -118_760_191, -126_423_102, -134_058_840, -141_665_765,
    ],
    [
        -189_770_362, -197_112_527, -204_412_325, -211_668_188,
        -218_878_557, -226_041_881, -233_156_621, -240_221_248,
        -247_234_243, -254_194_098, -261_099_319, -267_948_421,
        -274_739_931, -281_472_391, -288_144_352, -294_754_381,
    ],
    [
        -335_674_595, -341_781_021, -347_813_986, -353_772_195,
        -359_654_365, -365_459_234, -371_185_553, -376_832_091,
        -382_397_635, -387_880_989, -393_280_974, -398_596_430,
        -403_826_213, -408_969_201, -414_024_287, -418_990_385,
    ],
    [
        -448_720_660, -452_993_608, -457_169_191, -461_246_514,
        -465_224_698, -469_102_890, -472_880_256, -476_555_984,
        -480_129_283, -483_599_386, -486_965_547, -490_227_043,
        -493_383_172, -496_433_256, -499_376_639, -502_212_690,
    ],
    [
        -517_842_821, -519_864_024, -521_773_491, -523_570_810,
        -525_255_597, -526_827_487, -528_286_145, -529_631_256,
        -530_862_531, -531_979_706, -532_982_540, -533_870_817,
        -534_644_348, -535_302_965, -535_846_528, -536_274_918,
    ],
];

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_hgain_code_is_complete() {
        assert_eq!(HGAIN_CODES.len(), HGAIN_BITS.len());
        let max_len = u32::from(*HGAIN_BITS.iter().max().unwrap());
        assert_eq!(max_len, 13);
        let space: u32 = HGAIN_BITS
            .iter()
            .map(|&len| 1 << (max_len - u32::from(len)))
            .sum();
        assert_eq!(space, 1 << max_len);
    }

    #[test]
    fn test_hgain_known_entries() {
        // zero delta
        assert_eq!((HGAIN_CODES[18], HGAIN_BITS[18]), (0x3, 4));
        assert_eq!((HGAIN_CODES[13], HGAIN_BITS[13]), (0x6, 3));
        assert_eq!((HGAIN_CODES[25], HGAIN_BITS[25]), (0x0, 10));
        assert_eq!((HGAIN_CODES[36], HGAIN_BITS[36]), (0x5cc, 13));
    }

    #[test]
    fn test_exponent_code_zero_delta_is_shortest() {
        assert_eq!((EXPONENT_CODES[60], EXPONENT_BITS[60]), (0x0, 1));
        assert_eq!(EXPONENT_BITS.iter().min(), Some(&1));
    }

    #[test]
    fn test_exp10_table_steps_by_decibels() {
        assert_eq!(EXP10_NEG_Q30[0], 1 << 30);
        // 16 steps of 1.25 dB is a factor of ten
        assert_eq!(EXP10_NEG_Q30[16], (1 << 30) / 10);
        assert!(EXP10_NEG_Q30.windows(2).all(|pair| pair[1] <= pair[0]));
    }
}
