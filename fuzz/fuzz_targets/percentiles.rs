#![no_main]

use libfuzzer_sys::fuzz_target;
use loam_rank::Percentiles;

fuzz_target!(|ops: Vec<(bool, i32)>| {
    // Contents must stay sorted under any insert/remove sequence.
    let mut percentiles = Percentiles::new();
    for &(remove, value) in &ops {
        if remove {
            percentiles.remove(&value);
        } else {
            percentiles.insert(value);
        }
    }
    assert!(percentiles.as_slice().is_sorted());
});
