/// Most recent iterates seen on each side of zero.
///
/// Once both signs have been seen, the two points enclose a root of a
/// continuous residual. Iterates taken inside that interval replace the
/// endpoint with the same sign, so the interval only shrinks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) struct SignBracket {
    positive: Option<f64>,
    negative: Option<f64>,
}

impl SignBracket {
    /// Records an iterate by the sign of its residual. Zero residuals are
    /// ignored.
    pub(super) fn record(&mut self, x: f64, residual: f64) {
        if residual > 0.0 {
            self.positive = Some(x);
        } else if residual < 0.0 {
            self.negative = Some(x);
        }
    }

    /// Returns the interval `[left, right]` once a sign change is known.
    pub(super) fn interval(&self) -> Option<[f64; 2]> {
        let (positive, negative) = (self.positive?, self.negative?);
        Some(if positive < negative {
            [positive, negative]
        } else {
            [negative, positive]
        })
    }
}
