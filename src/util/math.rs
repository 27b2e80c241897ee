//! Math type re-exports and matrix helpers.
//!
//! Matrices are kept in USD's flat layout: 16 doubles with the translation
//! in elements 12..15. glam's column-major `DMat4` built with
//! `from_cols_array` over that layout is the same matrix under the
//! column-vector convention, so no transposition happens anywhere.

pub use glam::{
    DMat2, DMat3, DMat4, DQuat, DVec2, DVec3, DVec4, IVec2, IVec3, IVec4, Mat4, Quat, Vec2,
    Vec3, Vec4,
};

/// Default tolerance for treating a transform as identity.
pub const IDENTITY_TOLERANCE: f64 = 1e-10;

/// True if every element of `m` is within `tol` of the identity matrix.
#[inline]
pub fn is_identity(m: &DMat4, tol: f64) -> bool {
    m.abs_diff_eq(DMat4::IDENTITY, tol)
}

/// Exact, bit-level matrix equality.
///
/// `-0.0` differs from `0.0` and a NaN equals itself when the payload
/// matches, which is what the diff caches want.
#[inline]
pub fn bits_eq(a: &DMat4, b: &DMat4) -> bool {
    let a = a.to_cols_array();
    let b = b.to_cols_array();
    bytemuck::cast_slice::<f64, u8>(&a) == bytemuck::cast_slice::<f64, u8>(&b)
}

/// Build a matrix from USD's flat 16-element layout.
#[inline]
pub fn matrix_from_flat(vals: &[f64; 16]) -> DMat4 {
    DMat4::from_cols_array(vals)
}

/// Flatten a matrix into USD's 16-element layout.
#[inline]
pub fn matrix_to_flat(m: &DMat4) -> [f64; 16] {
    m.to_cols_array()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_tolerance() {
        assert!(is_identity(&DMat4::IDENTITY, IDENTITY_TOLERANCE));

        let mut vals = matrix_to_flat(&DMat4::IDENTITY);
        vals[12] = 1e-12;
        assert!(is_identity(&matrix_from_flat(&vals), IDENTITY_TOLERANCE));

        vals[12] = 1e-6;
        assert!(!is_identity(&matrix_from_flat(&vals), IDENTITY_TOLERANCE));
    }

    #[test]
    fn test_translation_layout() {
        let m = DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0));
        let flat = matrix_to_flat(&m);
        assert_eq!(&flat[12..15], &[1.0, 2.0, 3.0]);
        assert!(bits_eq(&matrix_from_flat(&flat), &m));
    }

    #[test]
    fn test_bits_eq_nan() {
        let mut vals = [0.0f64; 16];
        vals[3] = f64::NAN;
        let a = matrix_from_flat(&vals);
        let b = matrix_from_flat(&vals);
        assert!(bits_eq(&a, &b));
        assert!(a != b);
    }
}
