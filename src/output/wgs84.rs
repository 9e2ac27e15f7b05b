use glam::DVec3;

/// WGS-84 semi-major axis, meters.
pub const EQUATORIAL_RADIUS_M: f64 = 6_378_137.0;

/// WGS-84 first eccentricity squared.
pub const E2: f64 = 0.006_694_379_990_14;

/// Geodetic `(lon°, lat°, elev m)` to Earth-centered Cartesian meters.
pub fn geod_to_cart(geod: DVec3) -> DVec3 {
    let (lon, lat) = (geod.x.to_radians(), geod.y.to_radians());
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    // prime vertical radius of curvature
    let n = EQUATORIAL_RADIUS_M / (1.0 - E2 * sin_lat * sin_lat).sqrt();
    let h = geod.z;

    DVec3::new(
        (n + h) * cos_lat * cos_lon,
        (n + h) * cos_lat * sin_lon,
        (n * (1.0 - E2) + h) * sin_lat,
    )
}
