#![no_main]

use ddscalc::log_parser::parse_log_samples;
use ddscalc::stats::summarize;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let samples = parse_log_samples(input);

        // Extracted sequences stay index-aligned
        assert_eq!(samples.correction().len(), samples.cycle_times_us().len());
        assert_eq!(samples.buffer_diff().len(), samples.len());

        let _ = summarize(samples.cycle_times_us());
        let _ = summarize(samples.correction());
    }
});
