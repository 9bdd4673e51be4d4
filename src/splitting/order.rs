use derive_more::Display;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A cartesian velocity axis.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum Axis {
    #[allow(missing_docs)]
    #[display("vx")]
    X,
    #[allow(missing_docs)]
    #[display("vy")]
    Y,
    #[allow(missing_docs)]
    #[display("vz")]
    Z,
}

impl Axis {
    /// All three axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Create an [`Axis`] from its index, panics for indices larger than 2.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Axis::X,
            1 => Axis::Y,
            2 => Axis::Z,
            _ => panic!("axis index {index} is out of bounds"),
        }
    }

    /// The index of the axis (0, 1 or 2).
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Returns the next axis in cyclic order (x → y → z → x).
    pub fn next(&self) -> Self {
        Axis::from_index((self.index() + 1) % 3)
    }

    /// Returns the two other axes in ascending index order.
    pub fn others(&self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }
}

/// A permutation of the three velocity axes.
///
/// Within the exact splitting, `order[0]` is the axis of the two outer shears while `order[1]`
/// and `order[2]` are the axes of the two inner shears.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AxisOrder([Axis; 3]);

impl AxisOrder {
    /// Sorts the axes by ascending magnitude of the vector components.
    ///
    /// The sort is stable, axes with equal magnitudes remain in index order.
    pub fn by_magnitude(vector: &Vector3<f64>) -> Self {
        let mut order = Axis::ALL;

        order.sort_by(|a, b| {
            vector[a.index()]
                .abs()
                .partial_cmp(&vector[b.index()].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Self(order)
    }

    /// All six permutations.
    pub fn all() -> [AxisOrder; 6] {
        use Axis::*;

        [
            AxisOrder([X, Y, Z]),
            AxisOrder([X, Z, Y]),
            AxisOrder([Y, X, Z]),
            AxisOrder([Y, Z, X]),
            AxisOrder([Z, X, Y]),
            AxisOrder([Z, Y, X]),
        ]
    }

    /// Create a new [`AxisOrder`], returns `None` if the axes are not a permutation.
    pub fn new(axes: [Axis; 3]) -> Option<Self> {
        if axes[0] != axes[1] && axes[1] != axes[2] && axes[0] != axes[2] {
            Some(Self(axes))
        } else {
            None
        }
    }

    /// The underlying axis indices.
    pub fn indices(&self) -> [usize; 3] {
        [self.0[0].index(), self.0[1].index(), self.0[2].index()]
    }
}

impl Index<usize> for AxisOrder {
    type Output = Axis;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_order_by_magnitude() {
        let order = AxisOrder::by_magnitude(&Vector3::new(-3.0, 0.5, 1.0));

        assert!(order.indices() == [1, 2, 0]);

        // Ties keep the index order.
        let order = AxisOrder::by_magnitude(&Vector3::new(1.0, -1.0, 0.0));

        assert!(order.indices() == [2, 0, 1]);
    }

    #[test]
    fn test_axis_others() {
        for axis in Axis::ALL {
            let [a, b] = axis.others();

            assert!(a.index() < b.index());
            assert!(a != axis && b != axis);
        }

        assert!(Axis::Z.next() == Axis::X);
        assert!(AxisOrder::new([Axis::X, Axis::X, Axis::Z]).is_none());
        assert!(AxisOrder::all().iter().all(|order| AxisOrder::new(order.0).is_some()));
    }
}
