//! Rank a synthetic dataset under every criterion.
//!
//! ```sh
//! INFOSEL_LOG=debug cargo run --example rank_synthetic [config.json]
//! ```
use anyhow::Result;
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use infosel::{load_selection_config, select_features, Criterion, DiscreteDataset, FeatureSelector};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("INFOSEL_LOG", "error,infosel=info"))
        .init();

    // 1000 samples, 10 features:
    //   0, 1  jointly determine the label (y = a XOR b, flipped 10% of the time)
    //   2     noisy copy of feature 0
    //   3     weakly tied to the label on its own
    //   4..9  noise
    let mut rng = StdRng::seed_from_u64(7);
    let n_samples = 1000;
    let a: Vec<u32> = (0..n_samples).map(|_| rng.gen_range(0..2)).collect();
    let b: Vec<u32> = (0..n_samples).map(|_| rng.gen_range(0..2)).collect();
    let labels: Vec<u32> = a
        .iter()
        .zip(&b)
        .map(|(&a, &b)| if rng.gen_bool(0.1) { 1 - (a ^ b) } else { a ^ b })
        .collect();

    let mut columns = vec![a.clone(), b];
    columns.push(a.iter().map(|&v| if rng.gen_bool(0.2) { 1 - v } else { v }).collect());
    columns.push(
        labels
            .iter()
            .map(|&y| if rng.gen_bool(0.3) { rng.gen_range(0..3) } else { y })
            .collect(),
    );
    for _ in 4..10 {
        columns.push((0..n_samples).map(|_| rng.gen_range(0..4)).collect());
    }
    let data = DiscreteDataset::from_columns(columns, labels)?;

    println!(
        "Synthetic dataset: {} features x {} samples",
        data.n_features(),
        data.n_samples()
    );

    if let Some(path) = std::env::args().nth(1) {
        let config = load_selection_config(&path)?;
        let result = select_features(&data, &config)?;
        println!("{:<24} {:?}", config.criterion.to_string(), result.indices());
        return Ok(());
    }

    for criterion in [
        Criterion::Mim,
        Criterion::mifs(),
        Criterion::cife(),
        Criterion::Cmim,
        Criterion::Jmi,
        Criterion::Disr,
        Criterion::Icap,
        Criterion::CondMi,
        Criterion::Mrmr,
    ] {
        let result = FeatureSelector::new(criterion).select(&data, 4)?;
        let ranked: Vec<String> = result
            .iter()
            .map(|f| format!("{}({:.3})", f.index, f.score))
            .collect();
        println!(
            "{:<36} {} [{:?}]",
            criterion.to_string(),
            ranked.join(" "),
            result.stop_reason
        );
    }

    // Down-weight the first half of the samples.
    let weights: Vec<f64> = (0..n_samples)
        .map(|i| if i < n_samples / 2 { 0.25 } else { 1.0 })
        .collect();
    let weighted = data.with_weights(weights)?;
    let result = FeatureSelector::new(Criterion::Jmi).select(&weighted, 4)?;
    println!("{:<36} {:?}", "JMI (weighted)", result.indices());

    Ok(())
}
