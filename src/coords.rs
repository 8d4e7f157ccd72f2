//! Sky-coordinate formatting.

/// Printed in place of RA and Dec when a source's coordinates use a unit we
/// can't convert.
pub const UNHANDLED_COORDINATE: &str = "XXX";

/// Convert an RA and Dec in decimal degrees to sexagesimal strings, returned as
/// `("HH:MM:SS.ss", "±DD:MM:SS.ss")`.
///
/// The hour is found by integer-dividing the truncated RA by 15; the remainder
/// against `h * 15` then gives minutes and seconds. Seconds are not carried, so
/// values just under a minute boundary can print as `60.00`. This matches the
/// sheets observers already compare against.
pub fn dec_to_sexagesimal(ra: f64, dec: f64) -> (String, String) {
    let h = (ra.trunc() as i64).div_euclid(15);
    let minutes = (ra - (h as f64 * 15.0)) * 4.0;
    let m = minutes.trunc() as i64;
    let s = minutes.fract() * 60.0;

    let sign = 1.0_f64.copysign(dec);
    let d = dec.trunc() as i64;
    let arcmin = dec.fract() * 60.0;
    let arcm = arcmin.trunc().abs() as i64;
    let arcs = (arcmin.fract() * 60.0).abs();

    let ra = format!("{h:02}:{m:02}:{s:05.2}");
    // An integer 0 has no sign, so small negative declinations need it put back.
    let dec = if d == 0 && sign < 0.0 {
        format!("-{d:02}:{arcm:02}:{arcs:05.2}")
    } else {
        format!("{d:+03}:{arcm:02}:{arcs:05.2}")
    };
    (ra, dec)
}
