use approx::assert_relative_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustynn::prelude::*;

#[test]
fn test_walkthrough_primitives() {
    let m = Matrix::zeros(3, 2).t();
    assert_eq!(m.shape(), (2, 3));

    let a = &m - 4.0;
    assert_eq!(a.sum(0).unwrap(), Matrix::from([[-8.0, -8.0, -8.0]]));

    let a = a + 2.0;
    assert_eq!(&a * 0.5, Matrix::from([[-1.0, -1.0, -1.0], [-1.0, -1.0, -1.0]]));
    assert_eq!(a.dot(&(a.t() + 6.0)).unwrap(), Matrix::from([[-24.0, -24.0], [-24.0, -24.0]]));
    assert_eq!(a.powf(3.0)[(1, 2)], -8.0);

    let b = Matrix::from_rows(vec![vec![2.0, 5.0], vec![6.0, 1.0], vec![3.0, 7.0]]).unwrap();
    assert_eq!(b.argmax(0).unwrap(), Matrix::from([[1.0, 2.0]]));
    assert_eq!(b.mean(1).unwrap(), Matrix::from([[3.5], [3.5], [5.0]]));
    assert_relative_eq!(b.log()[(2, 1)], 7.0_f64.ln());

    let flat = b.reshape(1, -1).unwrap();
    assert_eq!(flat.shape(), (1, 6));

    let column = (Matrix::zeros(1, 1) + 1.0).broadcast_to((2, 1)).unwrap();
    let sum = column.broadcast_add(&flat).unwrap();
    assert_eq!(sum.shape(), (2, 6));
    assert_eq!(sum.row(1).unwrap(), &[3.0, 6.0, 7.0, 2.0, 4.0, 8.0]);

    let row = Matrix::from([[0.0, 1.0, 2.0]]);
    let square = Matrix::from([[0.0, 1.0, 2.0], [3.0, 4.0, 5.0], [6.0, 7.0, 8.0]]);
    assert_eq!(
        row.broadcast_mul(&square).unwrap(),
        Matrix::from([[0.0, 1.0, 4.0], [0.0, 4.0, 10.0], [0.0, 7.0, 16.0]])
    );
}

#[test]
fn test_broadcast_row_over_random_matrices() {
    let mut rng = StdRng::seed_from_u64(100);
    for (rows, cols) in [(1, 1), (7, 3), (300, 50)] {
        let m = Matrix::randn(rows, cols, &mut rng);
        let r = Matrix::randn(1, cols, &mut rng);
        let sum = m.broadcast_add(&r).unwrap();
        assert_eq!(sum.shape(), (rows, cols));
        for i in 0..rows {
            for j in 0..cols {
                assert_eq!(sum[(i, j)], m[(i, j)] + r[(0, j)]);
            }
        }
    }
}

#[test]
fn test_dot_shape_contract() {
    let mut rng = StdRng::seed_from_u64(101);
    for (m, k, n) in [(1, 1, 1), (2, 3, 4), (64, 128, 32)] {
        let a = Matrix::randn(m, k, &mut rng);
        let b = Matrix::randn(k, n, &mut rng);
        assert_eq!(a.dot(&b).unwrap().shape(), (m, n));
        assert!(a.dot(&Matrix::randn(k + 1, n, &mut rng)).is_err());
    }
}

#[test]
fn test_large_reductions_match_small() {
    let mut rng = StdRng::seed_from_u64(102);
    let m = Matrix::randn(150, 120, &mut rng);
    let col_sums = m.sum(0).unwrap();
    let row_max = m.max(1).unwrap();

    for j in [0, 60, 119] {
        let expected: f64 = (0..150).map(|i| m[(i, j)]).sum();
        assert_relative_eq!(col_sums[(0, j)], expected, epsilon = 1e-10);
    }
    for i in [0, 75, 149] {
        let expected = m.row(i).unwrap().iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(row_max[(i, 0)], expected);
    }
}

#[test]
fn test_self_test_report() {
    let mut out = Vec::new();
    rustynn::self_test::run_self_test(&mut out).unwrap();
    let report = String::from_utf8(out).unwrap();
    assert!(report.contains("Elementwise multiplication with broadcasting"));
    assert!(report.ends_with("All self-test checks passed\n"));
}
