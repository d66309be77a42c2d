// Deltas module - frame-to-frame derivatives of feature trajectories
//
// Rows are frames, columns are coefficients. Each column is differentiated
// independently:
// - first frame: f[1] - f[0]
// - interior:    f[t+1] - f[t-1]
// - last frame:  f[last] - f[last-1]
//
// The interior difference is not halved. Fewer than two frames yields zeros.

use ndarray::{s, Array2};

/// Compute the delta trajectory of a (num_frames × n_coeffs) matrix
///
/// Apply twice for the delta² trajectory.
pub fn compute_deltas(trajectory: &Array2<f32>) -> Array2<f32> {
    let num_frames = trajectory.nrows();
    let mut deltas = Array2::<f32>::zeros(trajectory.raw_dim());
    if num_frames < 2 {
        return deltas;
    }

    let last = num_frames - 1;
    deltas
        .row_mut(0)
        .assign(&(&trajectory.row(1) - &trajectory.row(0)));
    deltas
        .row_mut(last)
        .assign(&(&trajectory.row(last) - &trajectory.row(last - 1)));

    if num_frames > 2 {
        let forward = trajectory.slice(s![2.., ..]);
        let backward = trajectory.slice(s![..last - 1, ..]);
        deltas
            .slice_mut(s![1..last, ..])
            .assign(&(&forward - &backward));
    }

    deltas
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_trajectory() {
        // f[t] = 2t in column 0, constant in column 1
        let trajectory =
            Array2::from_shape_fn((6, 2), |(t, c)| if c == 0 { 2.0 * t as f32 } else { 5.0 });
        let deltas = compute_deltas(&trajectory);

        assert_eq!(deltas[[0, 0]], 2.0);
        for t in 1..5 {
            assert_eq!(deltas[[t, 0]], 4.0, "interior frame {}", t);
        }
        assert_eq!(deltas[[5, 0]], 2.0);
        assert!(deltas.column(1).iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_quadratic_delta2_interior_is_constant() {
        let trajectory = Array2::from_shape_fn((8, 1), |(t, _)| (t * t) as f32);
        let delta2 = compute_deltas(&compute_deltas(&trajectory));
        // Interior of delta2 away from the one-sided edges: 8 for t^2
        for t in 2..6 {
            assert_eq!(delta2[[t, 0]], 8.0, "frame {}", t);
        }
    }

    #[test]
    fn test_two_frames() {
        let trajectory = array![[1.0f32, 4.0], [3.0, 1.0]];
        let deltas = compute_deltas(&trajectory);
        assert_eq!(deltas, array![[2.0f32, -3.0], [2.0, -3.0]]);
    }

    #[test]
    fn test_single_and_empty_trajectories_are_zero() {
        let single = array![[1.0f32, 2.0, 3.0]];
        assert_eq!(compute_deltas(&single), Array2::<f32>::zeros((1, 3)));

        let empty = Array2::<f32>::zeros((0, 13));
        assert_eq!(compute_deltas(&empty).dim(), (0, 13));
    }
}
