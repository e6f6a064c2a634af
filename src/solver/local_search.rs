//! Intra-route improvement operators.
//!
//! 2-opt segment reversal and Or-opt segment relocation, both
//! first-improvement, both re-checking the time-window schedule before
//! accepting a move (capacity and zones are invariant under intra-route
//! reordering).

use crate::solver::schedule::Ctx;

/// Total tour distance of a sequence including the return leg when the
/// fleet is configured to return.
pub(crate) fn tour_distance(ctx: &Ctx, seq: &[usize]) -> f64 {
    let mut dist = ctx.seq_distance(seq);
    if ctx.fleet.params().return_to_depot {
        if let Some(&last) = seq.last() {
            dist += ctx.travel.distance_km(last, 0);
        }
    }
    dist
}

/// 2-opt: reverses segments while doing so shortens the tour and keeps the
/// schedule feasible. Returns the improved sequence and its distance.
pub(crate) fn two_opt_improve(ctx: &Ctx, seq: &[usize]) -> (Vec<usize>, f64) {
    let mut current = seq.to_vec();
    let mut current_dist = tour_distance(ctx, &current);
    if current.len() < 2 {
        return (current, current_dist);
    }

    let mut improved = true;
    while improved {
        improved = false;
        let n = current.len();
        'scan: for i in 0..n - 1 {
            for j in i + 1..n {
                let mut candidate = current.clone();
                candidate[i..=j].reverse();
                let dist = tour_distance(ctx, &candidate);
                if dist < current_dist - 1e-9 && ctx.simulate(&candidate).is_some() {
                    current = candidate;
                    current_dist = dist;
                    improved = true;
                    break 'scan;
                }
            }
        }
    }
    (current, current_dist)
}

/// Or-opt: relocates segments of 1–3 consecutive stops to better positions
/// within the same route. Returns the improved sequence and its distance.
pub(crate) fn or_opt_improve(ctx: &Ctx, seq: &[usize]) -> (Vec<usize>, f64) {
    let mut current = seq.to_vec();
    let mut current_dist = tour_distance(ctx, &current);
    if current.len() < 2 {
        return (current, current_dist);
    }

    let mut improved = true;
    while improved {
        improved = false;
        let n = current.len();
        'scan: for seg_len in 1..=3usize.min(n) {
            for from in 0..=n - seg_len {
                for to in 0..=n - seg_len {
                    if to >= from && to <= from + seg_len {
                        continue;
                    }
                    let mut candidate = current.clone();
                    let segment: Vec<usize> =
                        candidate.drain(from..from + seg_len).collect();
                    let insert_at = if to > from { to - seg_len } else { to };
                    for (k, &c) in segment.iter().enumerate() {
                        candidate.insert(insert_at + k, c);
                    }
                    let dist = tour_distance(ctx, &candidate);
                    if dist < current_dist - 1e-9 && ctx.simulate(&candidate).is_some() {
                        current = candidate;
                        current_dist = dist;
                        improved = true;
                        break 'scan;
                    }
                }
            }
        }
    }
    (current, current_dist)
}
