use serde::{Deserialize, Serialize};

/// Measured bounding rectangle of a hosted element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamp to a reportable rectangle: negative or NaN extents become zero
    pub fn sanitized(self) -> Self {
        fn clamp(v: f64) -> f64 {
            if v.is_nan() || v < 0.0 { 0.0 } else { v }
        }
        Self {
            width: clamp(self.width),
            height: clamp(self.height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl From<(f64, f64)> for Rect {
    fn from((width, height): (f64, f64)) -> Self {
        Self { width, height }
    }
}

/// Last recorded (width, height) of an element
///
/// Starts unset; the first measurement seeds it. Afterwards it only moves
/// when a measurement reports different dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeSnapshot {
    last: Option<Rect>,
}

impl SizeSnapshot {
    pub fn new() -> Self {
        Self { last: None }
    }

    pub fn last(&self) -> Option<Rect> {
        self.last
    }

    /// Record a measurement, returning it when it counts as a resize
    pub fn record(&mut self, rect: Rect) -> Option<Rect> {
        let rect = rect.sanitized();
        match self.last {
            None => {
                self.last = Some(rect);
                None
            }
            Some(prev) if prev.width == rect.width && prev.height == rect.height => None,
            Some(_) => {
                self.last = Some(rect);
                Some(rect)
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
