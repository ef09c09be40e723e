//! riemgeom - vectorized differential geometry.
//!
//! Facade over [`riemgeom_core`] (traits, batching, linear algebra) and
//! [`riemgeom_manifolds`] (concrete manifolds and metrics).
//!
//! # Example
//!
//! ```rust
//! use riemgeom::prelude::*;
//!
//! let sphere = Hypersphere::<f64>::new(2)?;
//! let north = Batch::single(DVector::from_vec(vec![0.0, 0.0, 1.0]));
//! let east = Batch::single(DVector::from_vec(vec![1.0, 0.0, 0.0]));
//!
//! let dist = sphere.metric().dist(&north, &east)?;
//! assert!((dist[0] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
//! # Ok::<(), riemgeom::ManifoldError>(())
//! ```

pub use nalgebra;
pub use riemgeom_core;
pub use riemgeom_manifolds;

pub use riemgeom_core::{Batch, ManifoldError, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use riemgeom_core::prelude::*;
    pub use riemgeom_manifolds::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exports() {
        let spd = SPDMatrices::<f64>::new(2).unwrap();
        let metric = spd.metric();
        let id = Batch::single(DMatrix::identity(2, 2));
        let d = metric.squared_dist(&id, &id).unwrap();
        assert_relative_eq!(d[0], 0.0);

        let landmarks = LandmarksSpace::new(Euclidean::<f64>::new(3).unwrap(), 2).unwrap();
        assert_eq!(landmarks.dimension(), 6);
    }
}
