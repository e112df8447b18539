//! Reflection and transmission coefficients.

use tlm_core::Face;

/// Per-face scattering coefficients of one node.
///
/// For a face between this node (impedance `Zs`) and its neighbour
/// (`Zn`): `R = (Zs − Zn)/(Zs + Zn)` and `T = 2·Zn/(Zs + Zn)`. Faces on
/// the grid edge are open: `R = 0`, `T = 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coefficients {
    /// Reflection coefficient per face, indexed by [`Face::index`].
    pub reflection: [f64; 6],
    /// Transmission coefficient per face, indexed by [`Face::index`].
    pub transmission: [f64; 6],
}

impl Coefficients {
    /// Coefficients of a node matched on every face.
    pub const MATCHED: Coefficients = Coefficients {
        reflection: [0.0; 6],
        transmission: [1.0; 6],
    };

    /// `(R, T)` for a face from impedance `zs` into impedance `zn`.
    pub fn junction(zs: f64, zn: f64) -> (f64, f64) {
        let sum = zs + zn;
        ((zs - zn) / sum, 2.0 * zn / sum)
    }

    /// Reflection coefficient on `face`.
    #[inline]
    pub fn r(&self, face: Face) -> f64 {
        self.reflection[face.index()]
    }

    /// Transmission coefficient on `face`.
    #[inline]
    pub fn t(&self, face: Face) -> f64 {
        self.transmission[face.index()]
    }

    /// The first face whose coefficients are not finite, if any.
    pub fn first_non_finite(&self) -> Option<Face> {
        Face::ALL
            .into_iter()
            .find(|f| !self.r(*f).is_finite() || !self.t(*f).is_finite())
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::MATCHED
    }
}
