//! Adam optimizer over flat parameter slices.
//!
//! Each parameter block (a weight matrix or a bias vector) owns one `Adam`
//! state. Nalgebra matrices expose their storage as contiguous slices, so the
//! optimizer never needs to know about shapes.

/// Exponential decay for the first moment.
const BETA1: f64 = 0.9;
/// Exponential decay for the second moment.
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    m: Vec<f64>,
    v: Vec<f64>,
    t: i32,
}

impl Adam {
    pub fn new(len: usize, learning_rate: f64) -> Self {
        Self {
            learning_rate,
            m: vec![0.0; len],
            v: vec![0.0; len],
            t: 0,
        }
    }

    /// Apply one bias-corrected update step in place.
    ///
    /// # Panics
    /// Panics if `params` and `grads` differ in length from the state.
    pub fn step(&mut self, params: &mut [f64], grads: &[f64]) {
        assert_eq!(params.len(), self.m.len());
        assert_eq!(grads.len(), self.m.len());

        self.t += 1;
        let correction1 = 1.0 - BETA1.powi(self.t);
        let correction2 = 1.0 - BETA2.powi(self.t);

        for i in 0..params.len() {
            let g = grads[i];
            self.m[i] = BETA1 * self.m[i] + (1.0 - BETA1) * g;
            self.v[i] = BETA2 * self.v[i] + (1.0 - BETA2) * g * g;

            let m_hat = self.m[i] / correction1;
            let v_hat = self.v[i] / correction2;
            params[i] -= self.learning_rate * m_hat / (v_hat.sqrt() + EPSILON);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_by_learning_rate_against_gradient() {
        let mut adam = Adam::new(2, 0.01);
        let mut params = [1.0, -1.0];
        adam.step(&mut params, &[4.0, -0.5]);

        // Bias correction makes the first step ~lr * sign(g).
        assert!((params[0] - 0.99).abs() < 1e-6);
        assert!((params[1] + 0.99).abs() < 1e-6);
    }

    #[test]
    fn minimizes_a_quadratic() {
        let mut adam = Adam::new(1, 0.1);
        let mut x = [5.0];
        for _ in 0..2000 {
            let grad = [2.0 * (x[0] - 2.0)];
            adam.step(&mut x, &grad);
        }
        assert!((x[0] - 2.0).abs() < 0.05, "x = {}", x[0]);
    }
}
