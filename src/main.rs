//! Train the FC-ReLU-FC digit classifier on 32x32 RGB records, or run the
//! primitive self-test.
//!
//! Usage: cargo run --release [-- test]

use clap::{Parser, ValueEnum};
use log::{LevelFilter, error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustynn::prelude::*;
use rustynn::self_test::run_self_test;
use std::process::ExitCode;

const TRAIN_PATH: &str = "data/train_32x32.dat";
const TRAIN_ROWS: usize = 73257;
const TEST_PATH: &str = "data/test_32x32.dat";
const TEST_ROWS: usize = 26032;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train a two-layer classifier on 32x32 digit images")]
struct Args {
    /// Run the self-test instead of training
    #[arg(value_enum)]
    mode: Option<Mode>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Test,
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .init();
    let args = Args::parse();

    let result = match args.mode {
        Some(Mode::Test) => run_self_test(&mut std::io::stdout().lock()),
        None => train(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn train() -> Result<(), IoError> {
    info!("Loading training set from {}", TRAIN_PATH);
    let mut train_set = load_dataset(TRAIN_PATH, TRAIN_ROWS, RECORD_WIDTH)?;
    info!("Loading test set from {}", TEST_PATH);
    let mut test_set = load_dataset(TEST_PATH, TEST_ROWS, RECORD_WIDTH)?;

    let mean = prepare_dataset(&mut train_set, &mut test_set)?;
    info!("Normalized features (training mean {:.6})", mean);

    let network = NetworkConfig::default();
    let training = TrainingConfig::default().with_verbose(true);

    let mut rng = match training.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let model = Model::new(&network, &mut rng)?;
    model.summary();

    let mut trainer = Trainer::with_rng(model, train_set, Adam::default(), training, rng)?;
    let history = trainer.fit()?;

    if let (Some(loss), Some(val_accuracy)) = (history.loss.last(), history.val_accuracy.last()) {
        info!(
            "Final epoch: loss {:.6}, validation accuracy {:.4}",
            loss, val_accuracy
        );
    }

    let test_accuracy = trainer.evaluate(&test_set)?;
    println!("Test accuracy: {:.4}", test_accuracy);
    Ok(())
}
