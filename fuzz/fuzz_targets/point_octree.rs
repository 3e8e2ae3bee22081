#![no_main]

use glam::IVec3;
use libfuzzer_sys::fuzz_target;
use loam_spatial::PointOctree;
use std::collections::HashMap;

fuzz_target!(|points: Vec<(i8, i8, i8)>| {
    // The tree must agree with a plain map for any insertion sequence.
    let mut tree = PointOctree::new();
    let mut shadow = HashMap::new();

    for (i, &(x, y, z)) in points.iter().enumerate() {
        let key = IVec3::new(x as i32, y as i32, z as i32);
        tree.insert(key, i);
        shadow.insert(key, i);
    }

    assert_eq!(tree.len(), shadow.len());
    for (key, value) in &shadow {
        assert_eq!(tree.lookup(*key), Ok(value));
    }
});
