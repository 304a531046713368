//! Shot-level stabilization of the crop plan.
//!
//! Detection noise perturbs the target position a few pixels per frame
//! even when nobody switches. Rather than smoothing (which would soften
//! real cuts), the plan is split into shots at large position jumps and
//! each shot is flattened to its median. Cuts stay instantaneous; within
//! a shot the camera is perfectly still.

use reframe_models::CropPlan;

/// Flatten each shot of the plan to its median position, in place.
///
/// A shot boundary is any index where the raw delta from the previous
/// frame exceeds `cut_threshold`. The median of an even-length run is the
/// mean of the two central values truncated toward zero.
pub fn stabilize_shots(plan: &mut CropPlan, cut_threshold: i32) {
    if plan.is_empty() {
        return;
    }

    let mut shot_start = 0;
    for i in 1..=plan.len() {
        let is_boundary = i < plan.len() && (plan[i] - plan[i - 1]).abs() > cut_threshold;
        if is_boundary || i == plan.len() {
            let value = median(&plan[shot_start..i]);
            for slot in &mut plan[shot_start..i] {
                *slot = value;
            }
            shot_start = i;
        }
    }
}

/// Median of a non-empty slice; even lengths truncate toward zero.
fn median(values: &[i32]) -> i32 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        ((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_plan() {
        let mut plan: CropPlan = vec![];
        stabilize_shots(&mut plan, 100);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_single_shot_flattens_to_median() {
        let mut plan = vec![100, 103, 99, 101, 102];
        stabilize_shots(&mut plan, 100);
        assert_eq!(plan, vec![101; 5]);
    }

    #[test]
    fn test_two_shots_split_at_large_jump() {
        let mut plan = vec![100, 100, 102, 101, 400, 402, 399, 401];
        stabilize_shots(&mut plan, 100);
        // First run: central pair (100, 101) -> 100.5 truncated to 100
        assert_eq!(&plan[0..4], &[100, 100, 100, 100]);
        // Second run: central pair (400, 401) -> 400.5 truncated to 400
        assert_eq!(&plan[4..8], &[400, 400, 400, 400]);
    }

    #[test]
    fn test_even_median_truncates_toward_zero() {
        assert_eq!(median(&[400, 402, 399, 401]), 400);
        assert_eq!(median(&[100, 100, 102, 101]), 100);
        assert_eq!(median(&[10, 11]), 10);
    }

    #[test]
    fn test_odd_median_is_exact() {
        assert_eq!(median(&[300, 100, 200]), 200);
        assert_eq!(median(&[7]), 7);
    }

    #[test]
    fn test_boundary_exactly_at_threshold_is_not_a_cut() {
        let mut plan = vec![0, 100, 200];
        // Deltas of exactly 100 do not split shots
        stabilize_shots(&mut plan, 100);
        assert_eq!(plan, vec![100, 100, 100]);
    }

    #[test]
    fn test_idempotence() {
        let mut plan = vec![100, 100, 102, 101, 400, 402, 399, 401, 90, 95];
        stabilize_shots(&mut plan, 100);
        let once = plan.clone();
        stabilize_shots(&mut plan, 100);
        assert_eq!(plan, once);
    }

    #[test]
    fn test_values_stay_within_input_range() {
        let mut plan = vec![10, 14, 12, 500, 505, 490, 1312, 1300, 1311];
        let lo = *plan.iter().min().unwrap();
        let hi = *plan.iter().max().unwrap();
        stabilize_shots(&mut plan, 100);
        for v in plan {
            assert!(v >= lo && v <= hi);
        }
    }
}
