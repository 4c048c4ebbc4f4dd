//! Row-major GEMM used by batched inference.
//!
//! `C = alpha * A * B + beta * C` with arbitrary strides, so a layer can multiply a
//! `(batch, in)` input block by its `(out, in)` weights read as a transposed view.
//! The `matrixmultiply` feature swaps the triple loop for a blocked kernel.

#[allow(clippy::too_many_arguments)]
#[inline]
pub(crate) fn gemm_f32(
    m: usize,
    n: usize,
    k: usize,
    alpha: f32,
    a: &[f32],
    rsa: usize,
    csa: usize,
    b: &[f32],
    rsb: usize,
    csb: usize,
    beta: f32,
    c: &mut [f32],
    rsc: usize,
    csc: usize,
) {
    debug_assert!(m > 0 && n > 0 && k > 0);
    debug_assert!(rsa > 0 || m <= 1);
    debug_assert!(csa > 0 || k <= 1);
    debug_assert!(rsb > 0 || k <= 1);
    debug_assert!(csb > 0 || n <= 1);
    debug_assert!(rsc > 0 || m <= 1);
    debug_assert!(csc > 0 || n <= 1);

    #[cfg(feature = "matrixmultiply")]
    {
        // SAFETY: callers guarantee every strided index stays inside its slice.
        unsafe {
            matrixmultiply::sgemm(
                m,
                k,
                n,
                alpha,
                a.as_ptr(),
                rsa as isize,
                csa as isize,
                b.as_ptr(),
                rsb as isize,
                csb as isize,
                beta,
                c.as_mut_ptr(),
                rsc as isize,
                csc as isize,
            );
        }
    }

    #[cfg(not(feature = "matrixmultiply"))]
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0.0_f32;
            let a0 = i * rsa;
            let b0 = j * csb;

            for p in 0..k {
                let av = a[a0 + p * csa];
                let bv = b[p * rsb + b0];
                acc = av.mul_add(bv, acc);
            }

            let idx = i * rsc + j * csc;
            c[idx] = alpha * acc + beta * c[idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplies_by_transposed_view() {
        // A: 2x3, W: 2x3 read as W^T (3x2).
        let a = [1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let w = [1.0_f32, 0.0, -1.0, 0.5, 0.5, 0.5];
        let mut c = [10.0_f32, 20.0, 30.0, 40.0];

        gemm_f32(2, 2, 3, 1.0, &a, 3, 1, &w, 1, 3, 1.0, &mut c, 2, 1);

        assert_eq!(c, [10.0 - 2.0, 20.0 + 3.0, 30.0 - 2.0, 40.0 + 7.5]);
    }
}
