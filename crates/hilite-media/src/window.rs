//! Prefix-sum sliding-window maximum over plain numeric sequences.

/// The best-scoring fixed-length window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowMax {
    /// Start offset of the window
    pub offset: usize,
    /// Window length in samples
    pub len: usize,
    /// Sum of the values inside the window
    pub sum: f64,
}

impl WindowMax {
    /// Average value over the window.
    pub fn mean(&self) -> f64 {
        self.sum / self.len.max(1) as f64
    }
}

/// Prefix sums with a leading zero: `out[i] = values[0] + ... + values[i-1]`.
pub fn prefix_sums(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len() + 1);
    out.push(0.0);
    let mut acc = 0.0;
    for v in values {
        acc += v;
        out.push(acc);
    }
    out
}

/// Find the window of length `win` with the greatest sum.
///
/// Start offsets range over `[0, len - win)`, so a window ending exactly on
/// the last sample is never considered. Ties keep the earliest offset.
/// Returns `None` when `win == 0` or `len <= win`.
pub fn best_window(values: &[f64], win: usize) -> Option<WindowMax> {
    if win == 0 || values.len() <= win {
        return None;
    }

    let sums = prefix_sums(values);
    let mut best: Option<WindowMax> = None;

    for offset in 0..values.len() - win {
        let sum = sums[offset + win] - sums[offset];
        if best.map_or(true, |b| sum > b.sum) {
            best = Some(WindowMax {
                offset,
                len: win,
                sum,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_sums() {
        assert_eq!(prefix_sums(&[1.0, 2.0, 3.0]), vec![0.0, 1.0, 3.0, 6.0]);
        assert_eq!(prefix_sums(&[]), vec![0.0]);
    }

    #[test]
    fn test_best_window_finds_peak() {
        let values = [0.0, 0.1, 0.9, 0.8, 0.1, 0.0, 0.0];
        let best = best_window(&values, 2).unwrap();
        assert_eq!(best.offset, 2);
        assert!((best.sum - 1.7).abs() < 1e-9);
        assert!((best.mean() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_first_offset() {
        let values = [1.0, 1.0, 1.0, 1.0, 1.0];
        assert_eq!(best_window(&values, 2).unwrap().offset, 0);
    }

    #[test]
    fn test_last_offset_excluded() {
        // The only window reaching the final sample is skipped.
        let values = [0.0, 0.0, 0.0, 5.0];
        let best = best_window(&values, 1).unwrap();
        assert_eq!(best.offset, 0);
        assert_eq!(best.sum, 0.0);
    }

    #[test]
    fn test_degenerate_windows() {
        assert!(best_window(&[1.0, 2.0], 2).is_none());
        assert!(best_window(&[1.0, 2.0], 3).is_none());
        assert!(best_window(&[1.0, 2.0], 0).is_none());
        assert!(best_window(&[], 1).is_none());
    }
}
