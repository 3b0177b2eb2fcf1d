use super::*;

#[test]
fn network_config_default_test() {
    let config = NetworkConfig::default();
    assert_eq!(config.n_input, 3072);
    assert_eq!(config.n_hidden, 100);
    assert_eq!(config.n_output, 10);
    assert_eq!(config.reg, 1e-5);
    assert!(config.validate().is_ok());
}

#[test]
fn network_config_validation_test() {
    assert!(NetworkConfig::new(4, 0, 2, 0.0).validate().is_err());
    assert!(NetworkConfig::new(4, 3, 0, 0.0).validate().is_err());
    assert!(NetworkConfig::new(4, 3, 2, f64::NAN).validate().is_err());
    assert!(NetworkConfig::new(4, 3, 2, f64::INFINITY).validate().is_err());
    assert!(NetworkConfig::new(4, 3, 2, 0.0).validate().is_ok());
}

#[test]
fn training_config_default_test() {
    let config = TrainingConfig::default();
    assert_eq!(config.num_epochs, 20);
    assert_eq!(config.batch_size, 300);
    assert_eq!(config.learning_rate, 1e-3);
    assert_eq!(config.learning_rate_decay, 0.9);
    assert_eq!(config.num_folds, 10);
    assert_eq!(config.seed, None);
    assert!(config.validate().is_ok());
}

#[test]
fn training_config_builders_test() {
    let config = TrainingConfig::new(3, 16, 0.1, 1.0)
        .with_seed(5)
        .with_folds(4)
        .with_verbose(true);
    assert_eq!(config.seed, Some(5));
    assert_eq!(config.num_folds, 4);
    assert!(config.verbose);
    assert!(config.validate().is_ok());
}

#[test]
fn training_config_validation_test() {
    let valid = TrainingConfig::new(1, 10, 0.01, 0.5);
    assert!(valid.validate().is_ok());

    let cases = [
        TrainingConfig { learning_rate: 0.0, ..valid },
        TrainingConfig { learning_rate: f64::NAN, ..valid },
        TrainingConfig { learning_rate_decay: 0.0, ..valid },
        TrainingConfig { learning_rate_decay: 1.5, ..valid },
        TrainingConfig { learning_rate_decay: -0.5, ..valid },
        TrainingConfig { batch_size: 0, ..valid },
        TrainingConfig { num_folds: 1, ..valid },
    ];
    for config in cases {
        assert!(
            matches!(config.validate(), Err(ModelError::InputValidationError(_))),
            "{:?} should be rejected",
            config
        );
    }
}
