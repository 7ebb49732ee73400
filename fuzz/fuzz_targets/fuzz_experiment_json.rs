#![no_main]

use libfuzzer_sys::fuzz_target;
use peakalign::alignment::{align, Alignment, AlignmentParams};
use peakalign::experiment::Experiment;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must either parse or fail with an error, never panic
    let Ok(expr) = Experiment::from_reader(Cursor::new(data)) else {
        return;
    };

    // Keep the DP table small
    if expr.len() > 64 {
        return;
    }

    // Self-alignment exercises scoring, DP and merge on whatever parsed
    let single = Alignment::from_experiment(&expr);
    let _ = align(&single, &single, &AlignmentParams::default());
});
