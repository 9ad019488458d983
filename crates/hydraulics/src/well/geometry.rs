use petrosim_core::constraint::{Constrained, StrictlyPositive};
use uom::si::{f64::Length, length::meter};

use crate::{Error, error::reason};

/// Trajectory and tubing size of a well.
///
/// All lengths are strictly positive and finite, and the vertical depth never
/// exceeds the measured depth along the hole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WellGeometry {
    measured_depth: Constrained<Length, StrictlyPositive>,
    vertical_depth: Constrained<Length, StrictlyPositive>,
    inner_diameter: Constrained<Length, StrictlyPositive>,
}

impl WellGeometry {
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any length is not finite and
    /// strictly positive, or if `vertical_depth > measured_depth`.
    pub fn new(
        measured_depth: Length,
        vertical_depth: Length,
        inner_diameter: Length,
    ) -> Result<Self, Error> {
        let measured_depth = positive_length("measured_depth", measured_depth)?;
        let vertical_depth = positive_length("vertical_depth", vertical_depth)?;
        let inner_diameter = positive_length("inner_diameter", inner_diameter)?;

        if vertical_depth.as_ref() > measured_depth.as_ref() {
            return Err(Error::invalid(
                "vertical_depth",
                vertical_depth.as_ref().get::<meter>(),
                "must not exceed the measured depth",
            ));
        }

        Ok(Self {
            measured_depth,
            vertical_depth,
            inner_diameter,
        })
    }

    /// Convenience constructor taking lengths in metres.
    ///
    /// # Errors
    ///
    /// See [`WellGeometry::new`].
    pub fn from_meters(
        measured_depth: f64,
        vertical_depth: f64,
        inner_diameter: f64,
    ) -> Result<Self, Error> {
        Self::new(
            Length::new::<meter>(measured_depth),
            Length::new::<meter>(vertical_depth),
            Length::new::<meter>(inner_diameter),
        )
    }

    #[must_use]
    pub fn measured_depth(&self) -> Length {
        self.measured_depth.into_inner()
    }

    #[must_use]
    pub fn vertical_depth(&self) -> Length {
        self.vertical_depth.into_inner()
    }

    #[must_use]
    pub fn inner_diameter(&self) -> Length {
        self.inner_diameter.into_inner()
    }
}

fn positive_length(
    name: &'static str,
    length: Length,
) -> Result<Constrained<Length, StrictlyPositive>, Error> {
    let value = length.get::<meter>();
    if value.is_infinite() {
        return Err(Error::invalid(name, value, "must be finite"));
    }
    StrictlyPositive::new(length).map_err(|err| Error::invalid(name, value, reason(err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::length::{foot, millimeter};

    #[test]
    fn accepts_mixed_units() {
        let geometry = WellGeometry::new(
            Length::new::<foot>(3937.0),
            Length::new::<meter>(700.0),
            Length::new::<millimeter>(100.0),
        )
        .unwrap();

        assert_relative_eq!(geometry.measured_depth().get::<meter>(), 1199.99, epsilon = 0.01);
        assert_relative_eq!(geometry.inner_diameter().get::<meter>(), 0.1);
    }

    #[test]
    fn vertical_section_is_allowed() {
        assert!(WellGeometry::from_meters(900.0, 900.0, 0.1).is_ok());
    }

    #[test]
    fn rejects_invalid_lengths() {
        let cases = [
            (0.0, 700.0, 0.1),
            (1200.0, -1.0, 0.1),
            (1200.0, 700.0, 0.0),
            (f64::INFINITY, 700.0, 0.1),
            (1200.0, 700.0, f64::NAN),
            (700.0, 1200.0, 0.1),
        ];

        for (md, tvd, d) in cases {
            assert!(
                matches!(
                    WellGeometry::from_meters(md, tvd, d),
                    Err(Error::InvalidArgument { .. })
                ),
                "({md}, {tvd}, {d}) should be rejected"
            );
        }
    }
}
