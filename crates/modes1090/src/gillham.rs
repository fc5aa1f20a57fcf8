//! Gillham (Gray) code: the Q=0 fallback altitude encoding shared by legacy
//! Mode C replies and Mode S's 11-bit altitude field.

/// Remaps a 13-bit Mode-A-style identity field into the Gillham group layout
/// `gray2alt` expects (A1/A2/A4, B1/B2/B4, C1/C2/C4, D1/D2/D4 each in their
/// own nibble).
pub fn decode_id13(id13_field: u16) -> u16 {
    let mut hex_gillham: u16 = 0;

    if id13_field & 0x1000 != 0 {
        hex_gillham |= 0x0010; // C1
    }
    if id13_field & 0x0800 != 0 {
        hex_gillham |= 0x1000; // A1
    }
    if id13_field & 0x0400 != 0 {
        hex_gillham |= 0x0020; // C2
    }
    if id13_field & 0x0200 != 0 {
        hex_gillham |= 0x2000; // A2
    }
    if id13_field & 0x0100 != 0 {
        hex_gillham |= 0x0040; // C4
    }
    if id13_field & 0x0080 != 0 {
        hex_gillham |= 0x4000; // A4
    }
    // bit 0x0040 (X/M) carries no altitude information.
    if id13_field & 0x0020 != 0 {
        hex_gillham |= 0x0100; // B1
    }
    if id13_field & 0x0010 != 0 {
        hex_gillham |= 0x0001; // D1 (or Q, unused for altitude)
    }
    if id13_field & 0x0008 != 0 {
        hex_gillham |= 0x0200; // B2
    }
    if id13_field & 0x0004 != 0 {
        hex_gillham |= 0x0002; // D2
    }
    if id13_field & 0x0002 != 0 {
        hex_gillham |= 0x0400; // B4
    }
    if id13_field & 0x0001 != 0 {
        hex_gillham |= 0x0004; // D4
    }

    hex_gillham
}

/// Converts a Gillham-coded altitude group to feet, or `Err` if the code is
/// structurally invalid (reserved bits set, or an impossible C-group).
pub fn gray_to_altitude(gray: u16) -> Result<i32, &'static str> {
    let mut five_hundreds: u32 = 0;
    let mut one_hundreds: u32 = 0;

    if (gray & 0x8889) != 0 || (gray & 0x00f0) == 0 {
        return Err("invalid altitude code: reserved bits set or empty C group");
    }

    if gray & 0x0010 != 0 {
        one_hundreds ^= 0x007; // C1
    }
    if gray & 0x0020 != 0 {
        one_hundreds ^= 0x003; // C2
    }
    if gray & 0x0040 != 0 {
        one_hundreds ^= 0x001; // C4
    }

    // 5 and 7 are swapped in the raw Gray sequence.
    if (one_hundreds & 5) == 5 {
        one_hundreds ^= 2;
    }
    if one_hundreds > 5 {
        return Err("invalid altitude code: one-hundreds group out of range");
    }

    if gray & 0x0002 != 0 {
        five_hundreds ^= 0x0ff; // D2
    }
    if gray & 0x0004 != 0 {
        five_hundreds ^= 0x07f; // D4
    }
    if gray & 0x1000 != 0 {
        five_hundreds ^= 0x03f; // A1
    }
    if gray & 0x2000 != 0 {
        five_hundreds ^= 0x01f; // A2
    }
    if gray & 0x4000 != 0 {
        five_hundreds ^= 0x00f; // A4
    }
    if gray & 0x0100 != 0 {
        five_hundreds ^= 0x007; // B1
    }
    if gray & 0x0200 != 0 {
        five_hundreds ^= 0x003; // B2
    }
    if gray & 0x0400 != 0 {
        five_hundreds ^= 0x001; // B4
    }

    if five_hundreds & 1 != 0 && one_hundreds <= 6 {
        one_hundreds = 6 - one_hundreds;
    }

    let n = (five_hundreds * 5) + one_hundreds;
    if n >= 13 {
        Ok(n as i32 - 13)
    } else {
        Err("invalid altitude code: below the 13-step offset")
    }
}
