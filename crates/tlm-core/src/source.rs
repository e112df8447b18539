//! The excitation source and its waveforms.

use std::f64::consts::PI;
use std::fmt;

use crate::coord::Coord;

/// Shape of the excitation injected at the source node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// A unit pulse on the first step only.
    #[default]
    Impulse,
    /// `exp(−10·((t − ⌊D/2⌋)/D)²)`, centred on the middle step.
    Gaussian,
    /// `0.5·(1 + cos(2π·((t+1)/D − 0.5)))`, one raised-cosine period.
    RaisedCosine,
}

impl Waveform {
    /// Amplitude added to the source node on `step` for a source lasting
    /// `duration` steps.
    ///
    /// Callers only sample steps below `duration`; `duration` is never
    /// zero for a validated source.
    pub fn sample(self, step: u64, duration: u32) -> f64 {
        let t = step as f64;
        let d = f64::from(duration);
        match self {
            Waveform::Impulse => {
                if step == 0 {
                    1.0
                } else {
                    0.0
                }
            }
            Waveform::Gaussian => {
                let centre = f64::from(duration / 2);
                let u = (t - centre) / d;
                (-10.0 * u * u).exp()
            }
            Waveform::RaisedCosine => 0.5 * (1.0 + (2.0 * PI * ((t + 1.0) / d - 0.5)).cos()),
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Waveform::Impulse => "impulse",
            Waveform::Gaussian => "gaussian",
            Waveform::RaisedCosine => "raised-cosine",
        };
        f.write_str(name)
    }
}

/// A single point source: what to inject, where, and for how long.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Source {
    /// Excitation shape.
    pub waveform: Waveform,
    /// Node receiving the excitation.
    pub position: Coord,
    /// Number of steps, starting at step 0, on which the waveform is
    /// sampled.
    pub duration: u32,
}

impl Source {
    /// A one-step unit impulse at `position`.
    pub const fn impulse(position: Coord) -> Self {
        Self {
            waveform: Waveform::Impulse,
            position,
            duration: 1,
        }
    }

    /// Amplitude to inject on `step`, or `None` once the source has
    /// finished.
    pub fn sample(&self, step: u64) -> Option<f64> {
        if step < u64::from(self.duration) {
            Some(self.waveform.sample(step, self.duration))
        } else {
            None
        }
    }
}
