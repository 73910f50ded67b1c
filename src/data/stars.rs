//! Confidence rating from regression fit.

use trendwatch_types::Stars;

/// Number of stars for a perfect (or better than `MAX_R_SQUARED`) fit.
pub const MAX_STARS: f64 = 5.0;

/// r² at or above which a fit earns every star.
pub const MAX_R_SQUARED: f64 = 0.8;

/// Scale r² onto a 0-5 star range, rounded to the nearest half star.
///
/// Values above [`MAX_R_SQUARED`] are clamped; negative or NaN input
/// earns no stars.
///
/// ```
/// use trendwatch::data::stars::scale_to_stars;
///
/// let stars = scale_to_stars(0.4);
/// assert_eq!((stars.whole, stars.half), (2, 1));
/// ```
pub fn scale_to_stars(r_squared: f64) -> Stars {
    let r_squared = if r_squared.is_nan() {
        0.0
    } else {
        r_squared.clamp(0.0, MAX_R_SQUARED)
    };

    let scaled = r_squared / MAX_R_SQUARED * MAX_STARS;
    let halves = (scaled * 2.0).round();

    Stars {
        actual: halves / 2.0,
        whole: (halves / 2.0).trunc() as u8,
        half: (halves as u8) % 2,
    }
}
