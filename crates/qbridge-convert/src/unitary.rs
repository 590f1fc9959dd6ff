//! Explicit unitaries for gates without a native target.

use ndarray::prelude::*;
use num_complex::Complex64;
use qbridge_ir::{CustomGate, StandardGate, unitary_dim};

use crate::error::{ConvertError, ConvertResult};

const UNITARY_TOLERANCE: f64 = 1e-8;

#[inline(always)]
fn c64(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// Controlled-Hadamard with the control on the first operand.
///
/// Basis states are little-endian: the first operand is the least
/// significant bit of the row index.
pub fn ch_matrix() -> Array2<Complex64> {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    array![
        [c64(1., 0.), c64(0., 0.), c64(0., 0.), c64(0., 0.)],
        [c64(0., 0.), c64(s, 0.), c64(0., 0.), c64(s, 0.)],
        [c64(0., 0.), c64(0., 0.), c64(1., 0.), c64(0., 0.)],
        [c64(0., 0.), c64(s, 0.), c64(0., 0.), c64(-s, 0.)],
    ]
}

/// Matrix for a standard gate that has no target name.
pub fn standard_unitary(gate: &StandardGate) -> Option<Array2<Complex64>> {
    match gate {
        StandardGate::CH => Some(ch_matrix()),
        _ => None,
    }
}

/// Matrix carried by a custom gate, if any.
pub fn custom_unitary(gate: &CustomGate) -> ConvertResult<Option<Array2<Complex64>>> {
    let Some(entries) = &gate.matrix else {
        return Ok(None);
    };
    let dim = unitary_dim(gate.num_qubits).ok_or_else(|| ConvertError::InvalidMatrix {
        name: gate.name.clone(),
        reason: format!("a {}-qubit matrix does not fit in memory", gate.num_qubits),
    })?;
    let matrix = Array2::from_shape_vec((dim, dim), entries.clone()).map_err(|e| {
        ConvertError::InvalidMatrix {
            name: gate.name.clone(),
            reason: e.to_string(),
        }
    })?;
    if !is_unitary(&matrix) {
        return Err(ConvertError::InvalidMatrix {
            name: gate.name.clone(),
            reason: "matrix is not unitary".into(),
        });
    }
    Ok(Some(matrix))
}

/// Check `U† U = I` within tolerance.
pub fn is_unitary(matrix: &Array2<Complex64>) -> bool {
    if !matrix.is_square() {
        return false;
    }
    let adjoint = matrix.t().mapv(|z| z.conj());
    let product = adjoint.dot(matrix);
    product.indexed_iter().all(|((i, j), z)| {
        let expected = if i == j { c64(1., 0.) } else { c64(0., 0.) };
        (z - expected).norm() < UNITARY_TOLERANCE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ch_is_unitary() {
        assert!(is_unitary(&ch_matrix()));
    }

    #[test]
    fn test_ch_acts_on_target_when_control_set() {
        let m = ch_matrix();
        let s = std::f64::consts::FRAC_1_SQRT_2;
        // |01> (control, first operand, set) maps to (|01> + |11>)/sqrt(2)
        assert!((m[[1, 1]] - c64(s, 0.)).norm() < 1e-12);
        assert!((m[[3, 1]] - c64(s, 0.)).norm() < 1e-12);
        assert!((m[[3, 3]] - c64(-s, 0.)).norm() < 1e-12);
        // control clear: identity
        assert_eq!(m[[0, 0]], c64(1., 0.));
        assert_eq!(m[[2, 2]], c64(1., 0.));
    }

    #[test]
    fn test_only_ch_needs_a_matrix() {
        assert!(standard_unitary(&StandardGate::CH).is_some());
        assert!(standard_unitary(&StandardGate::CX).is_none());
    }

    #[test]
    fn test_custom_matrix_shape() {
        let one = c64(1., 0.);
        let zero = c64(0., 0.);
        let gate = CustomGate::new("swapish", 1)
            .with_matrix(vec![zero, one, one, zero])
            .unwrap();
        let m = custom_unitary(&gate).unwrap().unwrap();
        assert_eq!(m.dim(), (2, 2));
        assert_eq!(m[[0, 1]], one);
    }

    #[test]
    fn test_custom_without_matrix() {
        assert!(custom_unitary(&CustomGate::new("oracle", 2)).unwrap().is_none());
    }

    #[test]
    fn test_non_unitary_rejected() {
        let gate = CustomGate::new("bad", 1)
            .with_matrix(vec![c64(1., 0.); 4])
            .unwrap();
        assert!(matches!(
            custom_unitary(&gate),
            Err(ConvertError::InvalidMatrix { .. })
        ));
    }

    #[test]
    fn test_oversized_matrix_rejected() {
        let gate = CustomGate {
            matrix: Some(vec![]),
            ..CustomGate::new("wide", 40)
        };
        assert!(matches!(
            custom_unitary(&gate),
            Err(ConvertError::InvalidMatrix { .. })
        ));
    }
}
