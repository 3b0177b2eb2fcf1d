use super::*;

fn small_model(seed: u64, reg: f64) -> Model {
    let mut rng = StdRng::seed_from_u64(seed);
    Model::new(&NetworkConfig::new(4, 6, 3, reg), &mut rng).unwrap()
}

#[test]
fn new_builds_fc_relu_fc_test() {
    let model = small_model(0, 1e-3);
    let types: Vec<&str> = model.layers().iter().map(|l| l.layer_type()).collect();
    assert_eq!(types, vec!["FCLayer", "ReLULayer", "FCLayer"]);
    assert_eq!(model.reg(), 1e-3);
    assert_eq!(model.param_count(), 4 * 6 + 6 + 6 * 3 + 3);
}

#[test]
fn params_order_test() {
    let model = small_model(0, 0.0);
    let shapes: Vec<(usize, usize)> = model.params().iter().map(|p| p.shape()).collect();
    assert_eq!(shapes, vec![(4, 6), (1, 6), (6, 3), (1, 3)]);
}

#[test]
fn new_rejects_invalid_config_test() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(Model::new(&NetworkConfig::new(0, 6, 3, 0.0), &mut rng).is_err());
    assert!(Model::new(&NetworkConfig::new(4, 6, 3, -1.0), &mut rng).is_err());
}

#[test]
fn same_seed_same_model_test() {
    let a = small_model(9, 0.0);
    let b = small_model(9, 0.0);
    for (pa, pb) in a.params().iter().zip(b.params()) {
        assert_eq!(pa.value(), pb.value());
    }
}

#[test]
fn feed_forward_initial_loss_test() {
    let mut model = small_model(1, 0.0);
    let x = Matrix::randn(8, 4, &mut StdRng::seed_from_u64(2));
    let y = Matrix::from([[0.0], [1.0], [2.0], [0.0], [1.0], [2.0], [0.0], [1.0]]);

    // tiny initial weights give near-uniform probabilities
    let loss = model.feed_forward(&x, &y).unwrap();
    assert_relative_eq!(loss, 3.0_f64.ln(), epsilon = 1e-3);
}

#[test]
fn feed_forward_zeroes_gradients_test() {
    let mut model = small_model(3, 1e-2);
    let x = Matrix::randn(5, 4, &mut StdRng::seed_from_u64(4));
    let y = Matrix::from([[0.0], [1.0], [2.0], [1.0], [0.0]]);

    let loss_first = model.feed_forward(&x, &y).unwrap();
    let grads_first: Vec<Matrix> = model.params().iter().map(|p| p.grad().clone()).collect();
    let loss_second = model.feed_forward(&x, &y).unwrap();
    let grads_second: Vec<Matrix> = model.params().iter().map(|p| p.grad().clone()).collect();

    assert_eq!(loss_first, loss_second);
    assert_eq!(grads_first, grads_second);
}

#[test]
fn feed_forward_adds_l2_penalty_test() {
    let mut with_reg = small_model(5, 0.5);
    let mut without_reg = small_model(5, 0.0);
    let x = Matrix::randn(3, 4, &mut StdRng::seed_from_u64(6));
    let y = Matrix::from([[2.0], [1.0], [0.0]]);

    let penalty: f64 = with_reg
        .params()
        .iter()
        .map(|p| 0.5 * p.value().powf(2.0).sum_all())
        .sum();
    let loss_reg = with_reg.feed_forward(&x, &y).unwrap();
    let loss_plain = without_reg.feed_forward(&x, &y).unwrap();
    assert_relative_eq!(loss_reg, loss_plain + penalty, epsilon = 1e-12);

    for (reg_param, plain_param) in with_reg.params().iter().zip(without_reg.params()) {
        let expected = plain_param
            .grad()
            .broadcast_add(&(reg_param.value() * 1.0))
            .unwrap();
        for (a, b) in reg_param.grad().as_slice().iter().zip(expected.as_slice()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }
}

#[test]
fn feed_forward_rejects_bad_labels_test() {
    let mut model = small_model(0, 0.0);
    let x = Matrix::ones(2, 4);
    assert!(model.feed_forward(&x, &Matrix::from([[0.0], [3.0]])).is_err());
    assert!(model.feed_forward(&x, &Matrix::from([[0.0, 1.0]])).is_err());
    assert!(model.feed_forward(&Matrix::ones(2, 5), &Matrix::from([[0.0], [1.0]])).is_err());
}

#[test]
fn predict_shape_and_range_test() {
    let mut model = small_model(7, 0.0);
    let predictions = model.predict(&Matrix::randn(10, 4, &mut StdRng::seed_from_u64(8))).unwrap();
    assert_eq!(predictions.shape(), (10, 1));
    assert!(predictions
        .as_slice()
        .iter()
        .all(|&p| p == 0.0 || p == 1.0 || p == 2.0));
}

#[test]
fn predict_uses_argmax_of_scores_test() {
    let layer = FCLayer::from_values(
        Matrix::from([[1.0, 0.0], [0.0, 1.0]]),
        Matrix::zeros(1, 2),
    )
    .unwrap();
    let mut model = Model::from_layers(vec![Box::new(layer)], 0.0);
    let predictions = model
        .predict(&Matrix::from([[3.0, 1.0], [0.0, 2.0], [5.0, 5.0]]))
        .unwrap();
    assert_eq!(predictions, Matrix::from([[0.0], [1.0], [0.0]]));
}

#[test]
fn linear_model_gradient_check_test() {
    let mut rng = StdRng::seed_from_u64(31);
    let layer = FCLayer::from_values(Matrix::randn(3, 4, &mut rng), Matrix::randn(1, 4, &mut rng))
        .unwrap();
    let mut model = Model::from_layers(vec![Box::new(layer)], 0.05);
    let x = Matrix::randn(6, 3, &mut rng);
    let y = Matrix::from([[0.0], [3.0], [1.0], [2.0], [3.0], [0.0]]);

    model.feed_forward(&x, &y).unwrap();
    let analytic: Vec<Matrix> = model.params().iter().map(|p| p.grad().clone()).collect();

    let delta = 1e-5;
    for (p, grad) in analytic.iter().enumerate() {
        let (rows, cols) = grad.shape();
        for i in 0..rows {
            for j in 0..cols {
                let original = model.params()[p].value().clone();

                let mut plus = original.clone();
                plus[(i, j)] += delta;
                model.params_mut()[p].set_value(plus).unwrap();
                let loss_plus = model.feed_forward(&x, &y).unwrap();

                let mut minus = original.clone();
                minus[(i, j)] -= delta;
                model.params_mut()[p].set_value(minus).unwrap();
                let loss_minus = model.feed_forward(&x, &y).unwrap();

                model.params_mut()[p].set_value(original).unwrap();
                let numeric = (loss_plus - loss_minus) / (2.0 * delta);
                let a = grad[(i, j)];
                assert!(
                    (numeric - a).abs() <= 1e-8 + 1e-4 * a.abs(),
                    "param {} entry ({}, {}): numeric {} vs analytic {}",
                    p,
                    i,
                    j,
                    numeric,
                    a
                );
            }
        }
    }
}

#[test]
fn add_chains_layers_test() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut model = Model::from_layers(Vec::new(), 0.0);
    model
        .add(FCLayer::new(2, 3, &mut rng))
        .add(ReLULayer::new())
        .add(FCLayer::new(3, 2, &mut rng));
    assert_eq!(model.layers().len(), 3);
    assert_eq!(model.params_mut().len(), 4);
    model.summary();
}
