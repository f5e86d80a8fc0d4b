use lintrain::Matrix;
use proptest::collection::vec;
use proptest::prelude::*;

fn matrix(rows: usize, cols: usize) -> impl Strategy<Value = Matrix> {
    vec(vec(-10.0f64..10.0, cols), rows).prop_map(|data| Matrix::from_data(data).unwrap())
}

fn any_matrix() -> impl Strategy<Value = Matrix> {
    (1usize..6, 1usize..6).prop_flat_map(|(r, c)| matrix(r, c))
}

/// Strictly diagonally dominant, so always non-singular and well conditioned.
fn dominant_square() -> impl Strategy<Value = Matrix> {
    (1usize..6).prop_flat_map(|n| {
        matrix(n, n).prop_map(move |mut a| {
            for i in 0..n {
                let v = a.get(i, i).unwrap();
                a.set(i, i, v + 20.0 * n as f64).unwrap();
            }
            a
        })
    })
}

proptest! {
    #[test]
    fn addition_commutes(
        (a, b) in (1usize..6, 1usize..6).prop_flat_map(|(r, c)| (matrix(r, c), matrix(r, c)))
    ) {
        prop_assert_eq!(a.add(&b).unwrap(), b.add(&a).unwrap());
        prop_assert!(a.add(&b).unwrap().sub(&b).unwrap().approx_eq(&a, 1e-12));
    }

    #[test]
    fn addition_associates(
        (a, b, c) in (1usize..6, 1usize..6)
            .prop_flat_map(|(r, cols)| (matrix(r, cols), matrix(r, cols), matrix(r, cols)))
    ) {
        let left = a.add(&b).unwrap().add(&c).unwrap();
        let right = a.add(&b.add(&c).unwrap()).unwrap();
        prop_assert!(left.approx_eq(&right, 1e-12));
    }

    #[test]
    fn transpose_is_an_involution(a in any_matrix()) {
        let t = a.transpose();
        prop_assert_eq!(t.shape(), (a.cols(), a.rows()));
        prop_assert_eq!(t.transpose(), a);
    }

    #[test]
    fn identity_is_neutral_for_matmul(a in any_matrix()) {
        prop_assert_eq!(a.matmul(&Matrix::identity(a.cols())).unwrap(), a.clone());
        prop_assert_eq!(Matrix::identity(a.rows()).matmul(&a).unwrap(), a);
    }

    #[test]
    fn transpose_reverses_products(
        (a, b) in (1usize..5, 1usize..5, 1usize..5)
            .prop_flat_map(|(r, k, c)| (matrix(r, k), matrix(k, c)))
    ) {
        let left = a.matmul(&b).unwrap().transpose();
        let right = b.transpose().matmul(&a.transpose()).unwrap();
        prop_assert!(left.approx_eq(&right, 1e-9));
    }

    #[test]
    fn mismatched_shapes_never_panic(a in any_matrix(), b in any_matrix()) {
        prop_assert_eq!(a.add(&b).is_ok(), a.shape() == b.shape());
        prop_assert_eq!(a.matmul(&b).is_ok(), a.cols() == b.rows());
    }

    #[test]
    fn solve_leaves_small_residual(
        (a, b) in dominant_square().prop_flat_map(|a| {
            let n = a.rows();
            (Just(a), matrix(n, 1))
        })
    ) {
        let x = a.solve(&b).unwrap();
        let residual = a.matmul(&x).unwrap().sub(&b).unwrap();
        prop_assert!(residual.norm() < 1e-9, "residual {}", residual.norm());
    }

    #[test]
    fn qr_reconstructs_full_rank_input(a in dominant_square()) {
        let qr = a.qr_decompose().unwrap();
        prop_assert!(qr.q.matmul(&qr.r).unwrap().approx_eq(&a, 1e-9));
        let gram = qr.q.transpose().matmul(&qr.q).unwrap();
        prop_assert!(gram.approx_eq(&Matrix::identity(a.cols()), 1e-9));
        for i in 0..a.cols() {
            for j in 0..i {
                prop_assert_eq!(qr.r.get(i, j).unwrap(), 0.0);
            }
        }
    }
}
