//! Compact Position Reporting: even/odd frame pairing into a global lat/lon,
//! plus the great-circle distance used by the tracker's reportability gate.

const CPR_MAX: f64 = 131072.0; // 2^17
const NZ: f64 = 15.0;
const D_LAT_EVEN: f64 = 360.0 / (4.0 * NZ);
const D_LAT_ODD: f64 = 360.0 / (4.0 * NZ - 1.0);

fn modulo(a: f64, b: f64) -> f64 {
    a - b * (a / b).floor()
}

/// Number of longitude zones for a given latitude (DO-260 NL function).
pub fn nl(lat: f64) -> u64 {
    if lat == 0.0 {
        return 59;
    }
    if lat.abs() == 87.0 {
        return 2;
    }
    if lat.abs() > 87.0 {
        return 1;
    }
    let lat_rad = lat.to_radians();
    let arg = 1.0 - (1.0 - (std::f64::consts::PI / 30.0).cos()) / lat_rad.cos().powi(2);
    (2.0 * std::f64::consts::PI / arg.acos()).floor() as u64
}

/// One globally-unambiguous latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolves an even/odd CPR frame pair into a global position.
///
/// `newer_is_odd` breaks the tie on which frame's zone to report the
/// longitude against when both frames carry the same timestamp: the odd
/// frame is treated as newer.
pub fn resolve(
    even_lat_cpr: u32,
    even_lon_cpr: u32,
    odd_lat_cpr: u32,
    odd_lon_cpr: u32,
    newer_is_odd: bool,
) -> Option<LatLon> {
    let cpr_lat_even = even_lat_cpr as f64 / CPR_MAX;
    let cpr_lat_odd = odd_lat_cpr as f64 / CPR_MAX;

    let j = (59.0 * cpr_lat_even - 60.0 * cpr_lat_odd + 0.5).floor();

    let mut lat_even = D_LAT_EVEN * (modulo(j, 60.0) + cpr_lat_even);
    let mut lat_odd = D_LAT_ODD * (modulo(j, 59.0) + cpr_lat_odd);
    if lat_even >= 270.0 {
        lat_even -= 360.0;
    }
    if lat_odd >= 270.0 {
        lat_odd -= 360.0;
    }

    let nl_even = nl(lat_even);
    let nl_odd = nl(lat_odd);
    if nl_even != nl_odd {
        return None;
    }

    let lat = if newer_is_odd { lat_odd } else { lat_even };

    let ni = std::cmp::max(
        nl_even as i64 - if newer_is_odd { 1 } else { 0 },
        1,
    ) as f64;
    let d_lon = 360.0 / ni;

    let cpr_lon_even = even_lon_cpr as f64 / CPR_MAX;
    let cpr_lon_odd = odd_lon_cpr as f64 / CPR_MAX;

    let m = (cpr_lon_even * (nl_even as f64 - 1.0) - cpr_lon_odd * nl_even as f64 + 0.5).floor();

    let (r, c) = if newer_is_odd {
        (modulo(m, ni), cpr_lon_odd)
    } else {
        (modulo(m, ni), cpr_lon_even)
    };

    let mut lon = d_lon * (r + c);
    if lon >= 180.0 {
        lon -= 360.0;
    }

    Some(LatLon {
        latitude: lat,
        longitude: lon,
    })
}

const EARTH_RADIUS_M: f64 = 6_372_800.0;
const METERS_PER_NM: f64 = 1852.0;

/// Great-circle distance in nautical miles between two lat/lon points.
pub fn distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_M * c / METERS_PER_NM
}
