use super::*;

const DELTA: f64 = 1e-5;

/// Scalar loss `sum(output * r)` whose gradient with respect to the output is `r`.
fn linear_loss(layer: &mut FCLayer, x: &Matrix, r: &Matrix) -> f64 {
    layer
        .forward(x)
        .unwrap()
        .broadcast_mul(r)
        .unwrap()
        .sum_all()
}

fn assert_gradient_close(numeric: f64, analytic: f64) {
    assert!(
        (numeric - analytic).abs() <= 1e-8 + 1e-4 * analytic.abs(),
        "numeric gradient {} differs from analytic gradient {}",
        numeric,
        analytic
    );
}

#[test]
fn relu_forward_backward_test() {
    let mut relu = ReLULayer::new();
    let output = relu
        .forward(&Matrix::from([[-1.0, 2.0], [3.0, -4.0]]))
        .unwrap();
    assert_eq!(output, Matrix::from([[0.0, 2.0], [3.0, 0.0]]));

    let grad = relu.backward(&Matrix::ones(2, 2)).unwrap();
    assert_eq!(grad, Matrix::from([[0.0, 1.0], [1.0, 0.0]]));
}

#[test]
fn relu_zero_is_inactive_test() {
    let mut relu = ReLULayer::new();
    relu.forward(&Matrix::from([[0.0, 1e-12]])).unwrap();
    assert_eq!(relu.mask().unwrap(), &Matrix::from([[0.0, 1.0]]));
}

#[test]
fn relu_backward_without_forward_test() {
    let mut relu = ReLULayer::new();
    assert!(matches!(
        relu.backward(&Matrix::ones(1, 1)),
        Err(ModelError::ProcessingError(_))
    ));
}

#[test]
fn relu_backward_shape_mismatch_test() {
    let mut relu = ReLULayer::new();
    relu.forward(&Matrix::ones(2, 3)).unwrap();
    assert!(matches!(
        relu.backward(&Matrix::ones(3, 2)),
        Err(ModelError::ShapeIncompatible(_))
    ));
}

#[test]
fn relu_has_no_params_test() {
    let relu = ReLULayer::new();
    assert!(relu.params().is_empty());
    assert_eq!(relu.param_count(), 0);
    assert_eq!(relu.layer_type(), "ReLULayer");
}

#[test]
fn fc_initialization_test() {
    let mut rng = StdRng::seed_from_u64(0);
    let layer = FCLayer::new(30, 20, &mut rng);
    assert_eq!(layer.weight().shape(), (30, 20));
    assert_eq!(layer.bias().shape(), (1, 20));
    assert_eq!(layer.param_count(), 30 * 20 + 20);

    // small-scale init: N(0, 1) * 0.001
    let max_abs = layer
        .weight()
        .value()
        .as_slice()
        .iter()
        .fold(0.0_f64, |acc, &w| acc.max(w.abs()));
    assert!(max_abs > 0.0);
    assert!(max_abs < 0.01);
    assert_eq!(layer.weight().grad(), &Matrix::zeros(30, 20));
}

#[test]
fn fc_forward_test() {
    let mut layer = FCLayer::from_values(
        Matrix::from([[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]),
        Matrix::from([[0.5, -0.5]]),
    )
    .unwrap();
    let output = layer
        .forward(&Matrix::from([[1.0, 0.0, 1.0], [0.0, 1.0, 0.0]]))
        .unwrap();
    assert_eq!(output, Matrix::from([[6.5, 7.5], [3.5, 3.5]]));
}

#[test]
fn fc_forward_shape_mismatch_test() {
    let mut layer = FCLayer::new(3, 2, &mut StdRng::seed_from_u64(0));
    assert!(matches!(
        layer.forward(&Matrix::ones(4, 2)),
        Err(ModelError::ShapeIncompatible(_))
    ));
}

#[test]
fn fc_from_values_rejects_bad_bias_test() {
    assert!(FCLayer::from_values(Matrix::ones(3, 2), Matrix::ones(1, 3)).is_err());
    assert!(FCLayer::from_values(Matrix::ones(3, 2), Matrix::ones(2, 2)).is_err());
}

#[test]
fn fc_backward_values_test() {
    let mut layer = FCLayer::from_values(
        Matrix::from([[1.0, 2.0], [3.0, 4.0]]),
        Matrix::zeros(1, 2),
    )
    .unwrap();
    let x = Matrix::from([[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
    layer.forward(&x).unwrap();

    let grad_output = Matrix::from([[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
    let grad_input = layer.backward(&grad_output).unwrap();

    assert_eq!(grad_input, grad_output.dot(&layer.weight().value().t()).unwrap());
    assert_eq!(layer.weight().grad(), &x.t().dot(&grad_output).unwrap());
    assert_eq!(layer.bias().grad(), &Matrix::from([[2.0, 2.0]]));
}

#[test]
fn fc_backward_accumulates_test() {
    let mut layer = FCLayer::new(3, 2, &mut StdRng::seed_from_u64(4));
    let x = Matrix::randn(4, 3, &mut StdRng::seed_from_u64(5));
    let grad_output = Matrix::ones(4, 2);

    layer.forward(&x).unwrap();
    layer.backward(&grad_output).unwrap();
    let once = layer.weight().grad().clone();
    layer.backward(&grad_output).unwrap();

    assert_eq!(layer.weight().grad(), &(&once * 2.0));
    assert_eq!(layer.bias().grad(), &Matrix::from([[8.0, 8.0]]));

    layer.weight_mut().zero_grad();
    assert_eq!(layer.weight().grad(), &Matrix::zeros(3, 2));
}

#[test]
fn fc_backward_without_forward_test() {
    let mut layer = FCLayer::new(2, 2, &mut StdRng::seed_from_u64(0));
    assert!(matches!(
        layer.backward(&Matrix::ones(1, 2)),
        Err(ModelError::ProcessingError(_))
    ));
}

#[test]
fn fc_weight_gradient_check_test() {
    let mut rng = StdRng::seed_from_u64(42);
    let x = Matrix::randn(5, 4, &mut rng);
    let r = Matrix::randn(5, 3, &mut rng);
    let mut layer = FCLayer::from_values(Matrix::randn(4, 3, &mut rng), Matrix::randn(1, 3, &mut rng))
        .unwrap();

    layer.forward(&x).unwrap();
    layer.backward(&r).unwrap();
    let analytic = layer.weight().grad().clone();

    for i in 0..4 {
        for j in 0..3 {
            let original = layer.weight().value().clone();

            let mut plus = original.clone();
            plus[(i, j)] += DELTA;
            layer.weight_mut().set_value(plus).unwrap();
            let loss_plus = linear_loss(&mut layer, &x, &r);

            let mut minus = original.clone();
            minus[(i, j)] -= DELTA;
            layer.weight_mut().set_value(minus).unwrap();
            let loss_minus = linear_loss(&mut layer, &x, &r);

            layer.weight_mut().set_value(original).unwrap();
            let numeric = (loss_plus - loss_minus) / (2.0 * DELTA);
            assert_gradient_close(numeric, analytic[(i, j)]);
        }
    }
}

#[test]
fn fc_bias_gradient_check_test() {
    let mut rng = StdRng::seed_from_u64(43);
    let x = Matrix::randn(6, 2, &mut rng);
    let r = Matrix::randn(6, 4, &mut rng);
    let mut layer = FCLayer::from_values(Matrix::randn(2, 4, &mut rng), Matrix::randn(1, 4, &mut rng))
        .unwrap();

    layer.forward(&x).unwrap();
    layer.backward(&r).unwrap();
    let analytic = layer.bias().grad().clone();

    for j in 0..4 {
        let original = layer.bias().value().clone();

        let mut plus = original.clone();
        plus[(0, j)] += DELTA;
        layer.bias_mut().set_value(plus).unwrap();
        let loss_plus = linear_loss(&mut layer, &x, &r);

        let mut minus = original.clone();
        minus[(0, j)] -= DELTA;
        layer.bias_mut().set_value(minus).unwrap();
        let loss_minus = linear_loss(&mut layer, &x, &r);

        layer.bias_mut().set_value(original).unwrap();
        let numeric = (loss_plus - loss_minus) / (2.0 * DELTA);
        assert_gradient_close(numeric, analytic[(0, j)]);
    }
}

#[test]
fn fc_input_gradient_check_test() {
    let mut rng = StdRng::seed_from_u64(44);
    let x = Matrix::randn(3, 4, &mut rng);
    let r = Matrix::randn(3, 2, &mut rng);
    let mut layer = FCLayer::new(4, 2, &mut rng);

    layer.forward(&x).unwrap();
    let analytic = layer.backward(&r).unwrap();

    for i in 0..3 {
        for j in 0..4 {
            let mut plus = x.clone();
            plus[(i, j)] += DELTA;
            let mut minus = x.clone();
            minus[(i, j)] -= DELTA;
            let numeric = (linear_loss(&mut layer, &plus, &r) - linear_loss(&mut layer, &minus, &r))
                / (2.0 * DELTA);
            assert_gradient_close(numeric, analytic[(i, j)]);
        }
    }
}

#[test]
fn parameter_set_value_shape_test() {
    let mut param = Parameter::new(Matrix::ones(2, 2));
    assert_eq!(param.grad(), &Matrix::zeros(2, 2));
    assert!(param.set_value(Matrix::zeros(2, 2)).is_ok());
    assert!(matches!(
        param.set_value(Matrix::zeros(1, 2)),
        Err(ModelError::ShapeIncompatible(_))
    ));
}

#[test]
fn parameter_grad_accumulates_until_zeroed_test() {
    let mut param = Parameter::new(Matrix::zeros(1, 2));
    param.accumulate_grad(&Matrix::from([[1.0, 2.0]])).unwrap();
    param.accumulate_grad(&Matrix::from([[1.0, 2.0]])).unwrap();
    assert_eq!(param.grad(), &Matrix::from([[2.0, 4.0]]));

    param.zero_grad();
    assert_eq!(param.grad(), &Matrix::zeros(1, 2));
    assert!(param.accumulate_grad(&Matrix::zeros(2, 1)).is_err());
}
