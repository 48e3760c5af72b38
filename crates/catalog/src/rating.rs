//! Fixed-width star rating shared by product list and detail views.

use serde::{Deserialize, Serialize};

use storefront_core::ValueObject;

/// Number of symbols in every rendered rating.
pub const STAR_SLOTS: usize = 5;

/// One rating symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Star {
    Full,
    Half,
    Empty,
}

impl Star {
    pub fn symbol(self) -> char {
        match self {
            Star::Full => '★',
            Star::Half => '⯪',
            Star::Empty => '☆',
        }
    }
}

/// Exactly five stars: `floor(rating)` full, one half if there is a fractional
/// part, the rest empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarRating([Star; STAR_SLOTS]);

impl StarRating {
    /// Ratings outside [0, 5] are clamped; NaN counts as 0.
    pub fn from_rating(rating: f64) -> Self {
        let rating = if rating.is_nan() {
            0.0
        } else {
            rating.clamp(0.0, STAR_SLOTS as f64)
        };

        let full = rating.floor() as usize;
        let has_half = rating.fract() != 0.0;

        let mut stars = [Star::Empty; STAR_SLOTS];
        for (slot, star) in stars.iter_mut().enumerate() {
            if slot < full {
                *star = Star::Full;
            } else if slot == full && has_half {
                *star = Star::Half;
            }
        }
        Self(stars)
    }

    pub fn stars(&self) -> &[Star; STAR_SLOTS] {
        &self.0
    }

    pub fn count(&self, kind: Star) -> usize {
        self.0.iter().filter(|s| **s == kind).count()
    }
}

impl ValueObject for StarRating {}

impl core::fmt::Display for StarRating {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.iter().try_for_each(|s| write!(f, "{}", s.symbol()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn counts(rating: f64) -> (usize, usize, usize) {
        let r = StarRating::from_rating(rating);
        (r.count(Star::Full), r.count(Star::Half), r.count(Star::Empty))
    }

    #[test]
    fn whole_rating_has_no_half_star() {
        assert_eq!(counts(3.0), (3, 0, 2));
        assert_eq!(counts(2.0), (2, 0, 3));
    }

    #[test]
    fn fractional_rating_gets_one_half_star() {
        assert_eq!(counts(3.5), (3, 1, 1));
        assert_eq!(counts(4.5), (4, 1, 0));
        assert_eq!(counts(0.2), (0, 1, 4));
    }

    #[test]
    fn bounds_and_out_of_range() {
        assert_eq!(counts(0.0), (0, 0, 5));
        assert_eq!(counts(5.0), (5, 0, 0));
        assert_eq!(counts(7.3), (5, 0, 0));
        assert_eq!(counts(-1.0), (0, 0, 5));
        assert_eq!(counts(f64::NAN), (0, 0, 5));
    }

    #[test]
    fn renders_symbols_in_order() {
        assert_eq!(StarRating::from_rating(4.5).to_string(), "★★★★⯪");
        assert_eq!(StarRating::from_rating(2.0).to_string(), "★★☆☆☆");
    }

    proptest! {
        /// Property: always five symbols, full stars first, at most one half star.
        #[test]
        fn always_five_symbols(rating in -10.0f64..10.0f64) {
            let r = StarRating::from_rating(rating);
            prop_assert_eq!(r.to_string().chars().count(), STAR_SLOTS);
            prop_assert!(r.count(Star::Half) <= 1);

            let first_non_full = r.stars().iter().position(|s| *s != Star::Full).unwrap_or(STAR_SLOTS);
            prop_assert_eq!(first_non_full, r.count(Star::Full));
        }
    }
}
