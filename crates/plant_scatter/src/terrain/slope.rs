//! Slope derivation from an elevation raster.
use tracing::debug;

use super::raster::Raster;

/// Derive per-pixel slope in degrees using central differences.
///
/// The stencil needs one pixel of margin on each side, so border pixels are
/// left at `0.0`. Rasters narrower than three pixels on an axis yield all zeros.
pub fn derive_slope(elevation: &Raster, grid_spacing: f64) -> Raster {
    let (dim_x, dim_y) = elevation.dims();
    let mut slopes = Raster::zeros(dim_x, dim_y);
    if dim_x < 3 || dim_y < 3 {
        debug!("Elevation {dim_x}x{dim_y} has no interior; slope left at zero.");
        return slopes;
    }

    let two_h = 2.0 * grid_spacing;
    for x in 1..dim_x - 1 {
        for y in 1..dim_y - 1 {
            let dzdx = (elevation.get(x + 1, y) - elevation.get(x - 1, y)) / two_h;
            let dzdy = (elevation.get(x, y + 1) - elevation.get(x, y - 1)) / two_h;
            let radians = (dzdx * dzdx + dzdy * dzdy).sqrt().atan();
            slopes.set(x, y, radians.to_degrees());
        }
    }
    slopes
}
