pub struct FitAnalysis {
    pub fits: bool,
    /// How far `required` runs past `available`; zero when it fits.
    pub overflow: f32,
}

/// Use a small epsilon to handle floating point inaccuracies.
pub const EPSILON: f32 = 0.01;

/// Centralized logic to check if a block of `required` height fits in the
/// `available` space of a column or page.
pub fn check_fit(required: f32, available: f32) -> FitAnalysis {
    let available = available.max(0.0);
    FitAnalysis {
        fits: required <= available + EPSILON,
        overflow: (required - available).max(0.0),
    }
}

pub fn fits(required: f32, available: f32) -> bool {
    check_fit(required, available).fits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_rounding_noise() {
        assert!(fits(100.005, 100.0));
        assert!(!fits(100.5, 100.0));
    }

    #[test]
    fn reports_overflow_against_negative_space_as_full_height() {
        let analysis = check_fit(40.0, -5.0);
        assert!(!analysis.fits);
        assert_eq!(analysis.overflow, 40.0);
    }
}
