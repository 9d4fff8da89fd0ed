use std::fmt;

/// Coordinates a member re-emerges at.
///
/// Opaque to the pool layer: the values are forwarded verbatim to
/// [`PoolObject::reposition`](crate::pool::PoolObject::reposition) and
/// never interpreted here.
#[derive(Clone, Copy, PartialEq)]
pub struct Placement {
    /// Target position of the instance
    pub position: [f32; 3],

    /// Target orientation of the instance, as a quaternion
    pub orientation: [f32; 4],
}

impl Placement {
    /// Identity orientation (no rotation)
    pub const IDENTITY_ORIENTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    /// Create a placement from a position and an orientation
    #[inline]
    pub const fn new(position: [f32; 3], orientation: [f32; 4]) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Create a placement at a position with identity orientation
    #[inline]
    pub const fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            orientation: Self::IDENTITY_ORIENTATION,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::at([0.0, 0.0, 0.0])
    }
}

impl fmt::Debug for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Placement(pos={:?}, orient={:?})",
            self.position, self.orientation
        )
    }
}
