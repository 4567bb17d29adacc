use crate::loss::cross_entropy::Gradients;
use crate::math::matrix::Matrix;

/// Plain full-batch gradient descent: `theta -= learning_rate * grad`.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    pub learning_rate: f64,
}

impl GradientDescent {
    pub fn new(learning_rate: f64) -> GradientDescent {
        GradientDescent { learning_rate }
    }

    /// Applies one update to the weight matrix and bias vector in place.
    pub fn step(&self, weights: &mut Matrix, bias: &mut [f64], grads: &Gradients) {
        *weights = &*weights - &grads.weights.scale(self.learning_rate);
        for (b, g) in bias.iter_mut().zip(&grads.bias) {
            *b -= self.learning_rate * g;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_against_the_gradient() {
        let mut w = Matrix::from_rows(vec![vec![1.0, 1.0]]).unwrap();
        let mut b = vec![0.0, 0.0];
        let grads = Gradients {
            weights: Matrix::from_rows(vec![vec![2.0, -2.0]]).unwrap(),
            bias: vec![1.0, -1.0],
        };
        GradientDescent::new(0.5).step(&mut w, &mut b, &grads);
        assert_eq!(w.to_flat(), vec![0.0, 2.0]);
        assert_eq!(b, vec![-0.5, 0.5]);
    }
}
