//! Common metrics for regression
//!
//! This module implements common comparison metrices for continuous variables.

use ndarray::prelude::*;
use ndarray::IntoNdProducer;
use ndarray::{Data, NdFloat};
use num_traits::FromPrimitive;
use std::ops::Sub;

/// Regression metrices trait
///
/// Implemented for one-dimensional predictions, compared against one-dimensional ground truth.
/// All metrics return `NaN` when both arrays are empty.
pub trait Regression<
    'a,
    A: 'a,
    D: ndarray::Dimension,
    T: IntoNdProducer<Item = &'a A, Dim = D, Output = ArrayView<'a, A, D>>,
>
{
    /// Maximal error between two continuous variables
    fn max_error(&self, compare_to: T) -> A;
    /// Mean error between two continuous variables
    fn mean_absolute_error(&self, compare_to: T) -> A;
    /// Mean squared error between two continuous variables
    fn mean_squared_error(&self, compare_to: T) -> A;
    /// R squared coefficient, is the proportion of the variance in the dependent variable that is
    /// predictable from the independent variable.
    ///
    /// To evaluate the accuracy of a prediction, use
    /// ```ignore
    /// prediction.r2(ground_truth)
    /// ```
    ///
    /// When the ground truth is constant the coefficient is not defined; a perfect prediction
    /// then scores `1.0` and any other prediction `0.0`.
    fn r2(&self, compare_to: T) -> A;
    /// Same as R-Squared but ignores a constant offset of the residuals
    fn explained_variance(&self, compare_to: T) -> A;
}

impl<
        'a,
        A: 'a + NdFloat + FromPrimitive,
        D: Data<Elem = A>,
        T: IntoNdProducer<Item = &'a A, Dim = Ix1, Output = ArrayView<'a, A, Ix1>>,
    > Regression<'a, A, Ix1, T> for ArrayBase<D, Ix1>
{
    fn max_error(&self, compare_to: T) -> A {
        let compare_to: ArrayView1<'a, A> = compare_to.into_producer();

        self.sub(&compare_to)
            .iter()
            .map(|x| x.abs())
            .fold(A::neg_infinity(), A::max)
    }

    fn mean_absolute_error(&self, compare_to: T) -> A {
        let compare_to = compare_to.into_producer();

        self.sub(&compare_to)
            .mapv(|x| x.abs())
            .mean()
            .unwrap_or_else(A::nan)
    }

    fn mean_squared_error(&self, compare_to: T) -> A {
        let compare_to = compare_to.into_producer();

        self.sub(&compare_to)
            .mapv(|x| x * x)
            .mean()
            .unwrap_or_else(A::nan)
    }

    // r2 = 1 - sum((pred_i - y_i)^2)/sum((mean_y - y_i)^2)
    // if the mean is of `compare_to`, then the denominator
    // should compare `compare_to` and the mean, and not self and the mean
    fn r2(&self, compare_to: T) -> A {
        let compare_to = compare_to.into_producer();

        let mean = match compare_to.mean() {
            Some(mean) => mean,
            None => return A::nan(),
        };

        let residual = self.sub(&compare_to).mapv(|x| x * x).sum();
        let total = compare_to.mapv(|x| (x - mean) * (x - mean)).sum();

        if total == A::zero() {
            return if residual == A::zero() {
                A::one()
            } else {
                A::zero()
            };
        }

        A::one() - residual / total
    }

    fn explained_variance(&self, compare_to: T) -> A {
        let compare_to = compare_to.into_producer();
        let diff = self.sub(&compare_to);

        let mean = match compare_to.mean() {
            Some(mean) => mean,
            None => return A::nan(),
        };
        let mean_error = diff.mean().unwrap_or_else(A::zero);

        let residual = diff.mapv(|x| (x - mean_error) * (x - mean_error)).sum();
        let total = compare_to.mapv(|x| (x - mean) * (x - mean)).sum();

        if total == A::zero() {
            return if residual == A::zero() {
                A::one()
            } else {
                A::zero()
            };
        }

        A::one() - residual / total
    }
}

#[cfg(test)]
mod tests {
    use super::Regression;
    use approx::assert_abs_diff_eq;
    use ndarray::prelude::*;

    #[test]
    fn test_same() {
        let a: Array1<f32> = Array1::ones(100);

        assert_abs_diff_eq!(a.max_error(&a), 0.0f32);
        assert_abs_diff_eq!(a.mean_absolute_error(&a), 0.0f32);
        assert_abs_diff_eq!(a.mean_squared_error(&a), 0.0f32);
        assert_abs_diff_eq!(a.r2(&a), 1.0f32);
        assert_abs_diff_eq!(a.explained_variance(&a), 1.0f32);
    }

    #[test]
    fn test_max_error() {
        let a = array![0.0, 0.1, 0.2, 0.3, 0.4];
        let b = array![0.1, 0.3, 0.2, 0.5, 0.7];

        assert_abs_diff_eq!(a.max_error(&b), 0.3f32, epsilon = 1e-5);
    }

    #[test]
    fn test_mean_absolute_error() {
        // sum of differences divided by number of elements
        let a = array![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
        let b = array![0.1, 0.1, 0.3, 0.3, 0.5, 0.5, 0.7, 0.7, 0.9, 0.9];

        assert_abs_diff_eq!(a.mean_absolute_error(&b), 0.05f32, epsilon = 1e-5);
    }

    #[test]
    fn test_mean_squared_error() {
        let a = array![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
        let b = array![0.1, 0.1, 0.3, 0.3, 0.5, 0.5, 0.7, 0.7, 0.9, 0.9];

        assert_abs_diff_eq!(a.mean_squared_error(&b), 0.005, epsilon = 1e-5);
    }

    #[test]
    fn test_r2() {
        let truth = array![3.0, -0.5, 2.0, 7.0];
        let prediction = array![2.5, 0.0, 2.0, 8.0];

        // matches the reference value of the classic scikit-learn example
        assert_abs_diff_eq!(prediction.r2(&truth), 0.948_608_137, epsilon = 1e-8);
    }

    #[test]
    fn test_r2_of_mean_prediction_is_zero() {
        let truth = array![1.0, 2.0, 3.0, 4.0];
        let prediction = Array1::from_elem(4, 2.5);

        assert_abs_diff_eq!(prediction.r2(&truth), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_r2_can_be_negative() {
        let truth = array![1.0, 2.0, 3.0];
        let prediction = array![3.0, 2.0, 1.0];

        assert!(prediction.r2(&truth) < 0.0);
    }

    #[test]
    fn test_r2_with_constant_truth() {
        let truth = array![5.0, 5.0, 5.0];

        assert_abs_diff_eq!(truth.r2(&truth), 1.0);
        assert_abs_diff_eq!(array![4.0, 5.0, 6.0].r2(&truth), 0.0);
    }

    #[test]
    fn test_explained_variance_ignores_offset() {
        let truth = array![1.0, 2.0, 3.0, 4.0];
        let prediction = &truth + 10.0;

        assert_abs_diff_eq!(prediction.explained_variance(&truth), 1.0, epsilon = 1e-12);
        assert!(prediction.r2(&truth) < 0.0);
    }
}
