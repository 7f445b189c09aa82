//! Statistical checks for OS entropy output.
//!
//! A small NIST SP 800-22 inspired battery used by the osprim test suites to
//! confirm that bytes coming back from the OS look uniformly random, plus a
//! birthday-bound distinctness check across repeated draws. Each check
//! returns a [`TestResult`] with a p-value (where applicable), a pass/fail
//! determination, and a letter grade (A through F).
//!
//! These are smoke detectors for a broken pass-through (zeroed buffers,
//! repeated output, stuck bits), not a certification of the kernel CSPRNG.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::function::erf::erfc;
use std::collections::HashSet;
use std::io::Write;

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a single randomness check.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub p_value: Option<f64>,
    pub statistic: f64,
    pub details: String,
    pub grade: char,
}

impl TestResult {
    /// Assign a letter grade based on p-value.
    ///
    /// - A: p >= 0.1
    /// - B: p >= 0.01
    /// - C: p >= 0.001
    /// - D: p >= 0.0001
    /// - F: otherwise or None
    pub fn grade_from_p(p: Option<f64>) -> char {
        match p {
            Some(p) if p >= 0.1 => 'A',
            Some(p) if p >= 0.01 => 'B',
            Some(p) if p >= 0.001 => 'C',
            Some(p) if p >= 0.0001 => 'D',
            _ => 'F',
        }
    }

    /// Determine pass/fail from p-value against a threshold.
    pub fn pass_from_p(p: Option<f64>, threshold: f64) -> bool {
        match p {
            Some(p) => p >= threshold,
            None => false,
        }
    }

    fn from_p(name: &str, p: Option<f64>, statistic: f64, details: String) -> Self {
        Self {
            name: name.to_string(),
            passed: Self::pass_from_p(p, SIGNIFICANCE),
            p_value: p,
            statistic,
            details,
            grade: Self::grade_from_p(p),
        }
    }
}

/// Significance level for the p-value checks.
///
/// Deliberately strict so that a healthy OS source essentially never trips
/// a check by chance inside a CI run.
pub const SIGNIFICANCE: f64 = 0.0001;

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Unpack a byte slice into individual bits (MSB first per byte).
fn to_bits(data: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(data.len() * 8);
    for &byte in data {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// Return a failing `TestResult` when data is too short.
fn insufficient(name: &str, needed: usize, got: usize) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed: false,
        p_value: None,
        statistic: 0.0,
        details: format!("Insufficient data: need {needed}, got {got}"),
        grade: 'F',
    }
}

/// Chi-squared survival function, `None` for invalid degrees of freedom.
fn chi2_sf(statistic: f64, freedom: f64) -> Option<f64> {
    ChiSquared::new(freedom).ok().map(|d| d.sf(statistic))
}

/// True when every byte is zero (an untouched, zero-initialized buffer).
pub fn is_all_zero(data: &[u8]) -> bool {
    data.iter().all(|&b| b == 0)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Frequency
// ═══════════════════════════════════════════════════════════════════════════════

/// Monobit frequency -- proportion of 1s vs 0s should be ~50%.
pub fn monobit_frequency(data: &[u8]) -> TestResult {
    let name = "Monobit Frequency";
    let n = data.len() * 8;
    if n < 100 {
        return insufficient(name, 100, n);
    }
    let ones: i64 = data.iter().map(|b| i64::from(b.count_ones())).sum();
    let s = 2 * ones - n as i64;
    let s_obs = (s as f64).abs() / (n as f64).sqrt();
    let p = erfc(s_obs / 2.0_f64.sqrt());
    TestResult::from_p(name, Some(p), s_obs, format!("S={s}, n={n}"))
}

/// Block frequency -- frequency within 128-bit blocks. Chi-squared test.
pub fn block_frequency(data: &[u8]) -> TestResult {
    let name = "Block Frequency";
    let block_bytes: usize = 16;
    let block_bits = block_bytes * 8;
    let num_blocks = data.len() / block_bytes;
    if num_blocks < 10 {
        return insufficient(name, block_bytes * 10, data.len());
    }
    let chi2 = 4.0
        * block_bits as f64
        * data
            .chunks_exact(block_bytes)
            .map(|block| {
                let ones: u32 = block.iter().map(|b| b.count_ones()).sum();
                let proportion = ones as f64 / block_bits as f64;
                (proportion - 0.5) * (proportion - 0.5)
            })
            .sum::<f64>();
    let p = chi2_sf(chi2, num_blocks as f64);
    TestResult::from_p(name, p, chi2, format!("blocks={num_blocks}, M={block_bits}"))
}

/// Byte frequency -- chi-squared on byte value distribution (256 bins).
pub fn byte_frequency(data: &[u8]) -> TestResult {
    let name = "Byte Frequency";
    let n = data.len();
    if n < 2560 {
        return insufficient(name, 2560, n);
    }
    let mut hist = [0u64; 256];
    for &b in data {
        hist[b as usize] += 1;
    }
    let expected = n as f64 / 256.0;
    let chi2: f64 = hist
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum();
    let p = chi2_sf(chi2, 255.0);
    TestResult::from_p(
        name,
        p,
        chi2,
        format!("n={n}, expected_per_bin={expected:.1}"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runs
// ═══════════════════════════════════════════════════════════════════════════════

/// Runs test -- number of uninterrupted runs of 0s or 1s.
pub fn runs_test(data: &[u8]) -> TestResult {
    let name = "Runs Test";
    let bits = to_bits(data);
    let n = bits.len();
    if n < 100 {
        return insufficient(name, 100, n);
    }
    let ones: usize = bits.iter().map(|&b| b as usize).sum();
    let prop = ones as f64 / n as f64;
    if (prop - 0.5).abs() >= 2.0 / (n as f64).sqrt() {
        return TestResult {
            name: name.to_string(),
            passed: false,
            p_value: Some(0.0),
            statistic: 0.0,
            details: format!("Pre-test failed: proportion={prop:.4}"),
            grade: 'F',
        };
    }
    let runs = 1 + bits.windows(2).filter(|w| w[0] != w[1]).count();
    let expected = 2.0 * n as f64 * prop * (1.0 - prop) + 1.0;
    let std = 2.0 * (2.0 * n as f64).sqrt() * prop * (1.0 - prop);
    let z = (runs as f64 - expected).abs() / std;
    let p = erfc(z / 2.0_f64.sqrt());
    TestResult::from_p(
        name,
        Some(p),
        z,
        format!("runs={runs}, expected={expected:.0}"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// Structure
// ═══════════════════════════════════════════════════════════════════════════════

/// Compression ratio -- zlib should not be able to shrink random data.
pub fn compression_ratio(data: &[u8]) -> TestResult {
    let name = "Compression Ratio";
    let n = data.len();
    if n < 32 {
        return insufficient(name, 32, n);
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    let compressed = match encoder.write_all(data).and_then(|_| encoder.finish()) {
        Ok(c) => c,
        Err(e) => {
            return TestResult {
                name: name.to_string(),
                passed: false,
                p_value: None,
                statistic: 0.0,
                details: format!("zlib failed: {e}"),
                grade: 'F',
            };
        }
    };
    let ratio = compressed.len() as f64 / n as f64;
    let grade = if ratio > 0.95 {
        'A'
    } else if ratio > 0.85 {
        'B'
    } else if ratio > 0.7 {
        'C'
    } else if ratio > 0.5 {
        'D'
    } else {
        'F'
    };
    TestResult {
        name: name.to_string(),
        passed: ratio > 0.85,
        p_value: None,
        statistic: ratio,
        details: format!("{}/{n} = {ratio:.4}", compressed.len()),
        grade,
    }
}

/// Distinct blocks -- no 16-byte block may repeat.
///
/// For uniform 128-bit blocks the birthday bound puts the chance of any
/// collision among `k` blocks at about `k² / 2¹²⁹`, so a single repeat means
/// the source is replaying output.
pub fn distinct_blocks(data: &[u8]) -> TestResult {
    let name = "Distinct Blocks";
    let blocks: Vec<&[u8]> = data.chunks_exact(16).collect();
    if blocks.len() < 2 {
        return insufficient(name, 32, data.len());
    }
    distinct(name, &blocks)
}

/// Distinct samples -- independent draws of the same length must all differ.
///
/// Samples shorter than 8 bytes are ignored: at that size a chance repeat is
/// no longer negligible.
pub fn distinct_samples<S: AsRef<[u8]>>(samples: &[S]) -> TestResult {
    let name = "Distinct Samples";
    let samples: Vec<&[u8]> = samples
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| s.len() >= 8)
        .collect();
    if samples.len() < 2 {
        return insufficient(name, 2, samples.len());
    }
    distinct(name, &samples)
}

fn distinct(name: &str, items: &[&[u8]]) -> TestResult {
    let mut seen = HashSet::with_capacity(items.len());
    let dups = items.iter().filter(|item| !seen.insert(**item)).count();
    TestResult {
        name: name.to_string(),
        passed: dups == 0,
        p_value: None,
        statistic: dups as f64,
        details: format!("duplicates={dups}, items={}", items.len()),
        grade: if dups == 0 { 'A' } else { 'F' },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Test battery
// ═══════════════════════════════════════════════════════════════════════════════

/// Run every single-buffer check on a byte slice.
pub fn run_all_tests(data: &[u8]) -> Vec<TestResult> {
    let tests: [fn(&[u8]) -> TestResult; 6] = [
        monobit_frequency,
        block_frequency,
        byte_frequency,
        runs_test,
        compression_ratio,
        distinct_blocks,
    ];
    tests.iter().map(|test_fn| test_fn(data)).collect()
}

impl std::fmt::Display for TestResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] stat={:.4}", self.name, self.grade, self.statistic)?;
        if let Some(p) = self.p_value {
            write!(f, " p={p:.6}")?;
        }
        write!(f, " ({})", self.details)
    }
}

/// One line per failed check (name, grade, statistic, p-value, details),
/// for assertion messages.
pub fn failures(results: &[TestResult]) -> Vec<String> {
    results
        .iter()
        .filter(|r| !r.passed)
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generate pseudo-random data for testing (simple LCG).
    fn pseudo_random(n: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(n);
        let mut state: u64 = 0xDEAD_BEEF_CAFE_BABE;
        for _ in 0..n {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            data.push((state >> 33) as u8);
        }
        data
    }

    #[test]
    fn test_to_bits() {
        let data = [0b10110001u8];
        let bits = to_bits(&data);
        assert_eq!(bits, vec![1, 0, 1, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_grade_from_p() {
        assert_eq!(TestResult::grade_from_p(Some(0.5)), 'A');
        assert_eq!(TestResult::grade_from_p(Some(0.05)), 'B');
        assert_eq!(TestResult::grade_from_p(Some(0.005)), 'C');
        assert_eq!(TestResult::grade_from_p(Some(0.0005)), 'D');
        assert_eq!(TestResult::grade_from_p(Some(0.00000001)), 'F');
        assert_eq!(TestResult::grade_from_p(None), 'F');
    }

    #[test]
    fn test_pass_from_p() {
        assert!(TestResult::pass_from_p(Some(0.05), 0.01));
        assert!(!TestResult::pass_from_p(Some(0.005), 0.01));
        assert!(!TestResult::pass_from_p(None, 0.01));
    }

    #[test]
    fn test_insufficient_data() {
        let result = monobit_frequency(&[0u8; 5]);
        assert!(!result.passed);
        assert!(result.details.contains("Insufficient"));
    }

    #[test]
    fn test_zeroed_buffer_fails() {
        let data = vec![0u8; 4096];
        assert!(is_all_zero(&data));
        let results = run_all_tests(&data);
        for name in ["Monobit Frequency", "Byte Frequency", "Compression Ratio", "Distinct Blocks"] {
            let r = results.iter().find(|r| r.name == name).unwrap();
            assert!(!r.passed, "{name} passed on a zeroed buffer");
        }
    }

    #[test]
    fn test_pseudo_random_passes() {
        let data = pseudo_random(16384);
        assert!(!is_all_zero(&data));
        let results = run_all_tests(&data);
        assert_eq!(results.len(), 6);
        let failed = failures(&results);
        assert!(failed.is_empty(), "failed: {failed:?}");
    }

    #[test]
    fn test_monobit_counts_bits() {
        // 0xFF repeated: every bit set, maximal imbalance.
        let result = monobit_frequency(&[0xFF; 64]);
        assert!(!result.passed);
        assert_eq!(result.details, "S=512, n=512");
    }

    #[test]
    fn test_repeating_block_detected() {
        let mut data = pseudo_random(64);
        let first: Vec<u8> = data[..16].to_vec();
        data.extend_from_slice(&first);
        let result = distinct_blocks(&data);
        assert!(!result.passed);
        assert_eq!(result.statistic, 1.0);
    }

    #[test]
    fn test_distinct_samples() {
        let a = pseudo_random(32);
        let b: Vec<u8> = pseudo_random(64)[32..].to_vec();
        assert!(distinct_samples(&[a.clone(), b]).passed);
        assert!(!distinct_samples(&[a.clone(), a]).passed);
    }

    #[test]
    fn test_distinct_samples_ignores_short() {
        let result = distinct_samples(&[vec![1u8], vec![1u8]]);
        assert!(!result.passed);
        assert!(result.details.contains("Insufficient"));
    }

    #[test]
    fn test_display_reports_grade_and_p_value() {
        let line = monobit_frequency(&[0xFF; 64]).to_string();
        assert!(line.starts_with("Monobit Frequency [F] stat="), "{line}");
        assert!(line.contains(" p="), "{line}");
        assert!(line.ends_with("(S=512, n=512)"), "{line}");

        let line = compression_ratio(&[0u8; 64]).to_string();
        assert!(!line.contains(" p="), "{line}");
    }

    #[test]
    fn test_failures_lists_names() {
        let results = run_all_tests(&[0u8; 4096]);
        let failed = failures(&results);
        assert!(failed.iter().any(|f| f.starts_with("Monobit Frequency")));
    }
}
