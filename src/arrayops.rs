use num_traits::{Float, FromPrimitive};

/// Arithmetic mean of `values`, `NaN` when empty.
pub fn mean<T: Float + FromPrimitive>(values: &[T]) -> T {
    if values.is_empty() {
        return T::nan();
    }
    let total = values.iter().fold(T::zero(), |acc, v| acc + *v);
    total / T::from_usize(values.len()).unwrap()
}

/// Median of the non-`NaN` entries of `values`, `NaN` if there are none.
pub fn nan_median<T: Float + FromPrimitive>(values: &[T]) -> T {
    let mut finite: Vec<T> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if finite.is_empty() {
        return T::nan();
    }
    finite.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = finite.len();
    if n % 2 == 1 {
        finite[n / 2]
    } else {
        (finite[n / 2 - 1] + finite[n / 2]) / T::from_f64(2.0).unwrap()
    }
}

pub fn minmax<T: Float>(values: &[T]) -> (T, T) {
    let mut max = -T::infinity();
    let mut min = T::infinity();

    for v in values.iter() {
        if *v > max {
            max = *v;
        }
        if *v < min {
            min = *v
        }
    }
    (min, max)
}

/// Check that `values` is monotonically non-decreasing or non-increasing
pub fn is_monotonic<T: Float>(values: &[T]) -> bool {
    let ascending = values.windows(2).all(|w| w[0] <= w[1]);
    ascending || values.windows(2).all(|w| w[0] >= w[1])
}

/// Return the index of the first non-finite value, if any
pub fn first_non_finite<T: Float>(values: &[T]) -> Option<usize> {
    values.iter().position(|v| !v.is_finite())
}

/// Index of the smallest element of `values`, ignoring `NaN`s. Ties go to the
/// earliest index.
pub fn argmin<T: Float>(values: impl IntoIterator<Item = T>) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;
    for (i, v) in values.into_iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if b <= v => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mean_and_median() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert!(mean::<f64>(&[]).is_nan());
        assert_eq!(nan_median(&[3.0, f64::NAN, 1.0, 2.0]), 2.0);
        assert_eq!(nan_median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
        assert!(nan_median(&[f64::NAN, f64::NAN]).is_nan());
    }

    #[test]
    fn test_monotonic() {
        assert!(is_monotonic(&[1.0, 2.0, 2.0, 5.0]));
        assert!(is_monotonic(&[5.0, 3.0, 1.0]));
        assert!(!is_monotonic(&[1.0, 3.0, 2.0]));
        assert!(is_monotonic::<f64>(&[]));
    }

    #[test]
    fn test_argmin() {
        assert_eq!(argmin([3.0, 1.0, 1.0, 2.0]), Some(1));
        assert_eq!(argmin([f64::NAN, 2.0]), Some(1));
        assert_eq!(argmin(Vec::<f64>::new()), None);
    }
}
