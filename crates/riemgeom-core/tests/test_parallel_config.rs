//! Process-wide parallel configuration.
//!
//! The global configuration can be set at most once per process, so this file
//! holds a single test that owns the whole sequence.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use riemgeom_core::{
    batch::{broadcast_map2, Batch},
    config::{get_parallel_config, set_parallel_config},
    prelude::*,
};

#[test]
fn test_global_config_is_set_once_and_drives_batches() {
    let eager = ParallelConfigBuilder::new().min_batch_len(1).build();
    set_parallel_config(eager.clone()).unwrap();
    assert_eq!(get_parallel_config(), &eager);

    let rejected = set_parallel_config(ParallelConfig::sequential()).unwrap_err();
    assert!(!rejected.enabled);
    assert_eq!(get_parallel_config(), &eager);

    // Element order survives whichever execution path the config selects.
    let xs = Batch::new((0..64).map(f64::from).collect()).unwrap();
    let offset = Batch::single(0.5);
    let shifted = broadcast_map2(&xs, &offset, |x, y| Ok(x * x + y)).unwrap();
    assert_eq!(shifted.len(), 64);
    for (i, value) in shifted.iter().enumerate() {
        let x = i as f64;
        assert_relative_eq!(*value, x * x + 0.5);
    }
}
