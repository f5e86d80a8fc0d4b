use lintrain::{
    train_loop, Activation, CostFunction, InitMethod, LayerSpec, Matrix, Network, NetworkSpec,
    TrainConfig, TrainingMode,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::mpsc;

fn main() -> lintrain::Result<()> {
    env_logger::init();
    let mut rng = StdRng::seed_from_u64(7);

    let spec = NetworkSpec::new("xor", 0.5, 0.0)
        .layer(LayerSpec::new(2, 4, Activation::Tanh, InitMethod::Xavier))
        .layer(LayerSpec::new(4, 1, Activation::Sigmoid, InitMethod::Xavier));
    let mut network = Network::from_spec(&spec, &mut rng)?;
    print!("{network}");

    let inputs: Vec<Matrix> = [[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]
        .iter()
        .map(|x| Matrix::column_vector(x))
        .collect();
    let targets: Vec<Matrix> = [1.0, 0.0, 1.0, 0.0]
        .iter()
        .map(|&y| Matrix::column_vector(&[y]))
        .collect();

    let (tx, rx) = mpsc::channel();
    let mut config = TrainConfig::new(5000, TrainingMode::Online, CostFunction::CrossEntropy);
    config.progress_tx = Some(tx);
    config.track_accuracy = true;

    let cost = train_loop(&mut network, &inputs, &targets, None, &config, &mut rng)?;
    drop(config);

    for stats in rx.iter().filter(|s| s.epoch % 1000 == 0) {
        println!(
            "Epoch {}: cost = {:.6}, accuracy = {:.2}",
            stats.epoch,
            stats.train_cost,
            stats.train_accuracy.unwrap_or(0.0)
        );
    }
    println!("final cost = {cost:.6}");

    for input in &inputs {
        let output = network.predict(&input.to_column_vec())?;
        println!("Input: {:?} -> Output: {:.4}", input.to_column_vec(), output[0]);
    }
    Ok(())
}
