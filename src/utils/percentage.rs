use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0 as i64)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Values above a whole are shown as a full bar.
    pub fn capped(self) -> Percentage {
        Percentage(self.0.min(100.))
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `whole` taken by `value`, both in seconds. Negative or empty inputs count as 0%.
pub fn seconds_percentage(value: f64, whole: f64) -> Percentage {
    if whole <= 0. {
        return Percentage(0.);
    }
    Percentage::new_opt(value / whole * 100.).unwrap_or(Percentage(0.))
}
