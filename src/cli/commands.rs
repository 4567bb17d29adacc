//! Command implementations.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::cli::args::*;
use crate::config::Hyperparams;
use crate::data::{self, toy};
use crate::eval::metrics;
use crate::math::matrix::Matrix;
use crate::model::softmax_regression::SoftmaxRegression;

/// Execute a CLI command.
pub fn execute_command(args: SoftmaxArgs) -> Result<()> {
    match args.command {
        Command::Train(train_args) => train(train_args),
        Command::Predict(predict_args) => predict(predict_args),
        Command::Evaluate(evaluate_args) => evaluate(evaluate_args),
        Command::Demo(demo_args) => demo(demo_args),
    }
}

/// Config file values, then individual flag overrides, then validation.
fn resolve_hyperparams(args: &TrainArgs) -> Result<Hyperparams> {
    let mut hp = match &args.config {
        Some(path) => Hyperparams::load_json(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => Hyperparams::default(),
    };
    if let Some(lr) = args.learning_rate {
        hp.learning_rate = lr;
    }
    if let Some(iterations) = args.iterations {
        hp.iterations = iterations;
    }
    if let Some(lambda) = args.regularization {
        hp.regularization = lambda;
    }
    hp.validate()?;
    Ok(hp)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

fn train(args: TrainArgs) -> Result<()> {
    let hp = resolve_hyperparams(&args)?;
    let dataset = data::load_dataset(&args.data, &args.label)
        .with_context(|| format!("failed to load dataset {}", args.data.display()))?;
    info!(
        "loaded {} rows, {} features, {} classes from {}",
        dataset.len(),
        dataset.feature_names.len(),
        dataset.class_count(),
        args.data.display()
    );

    let mut model = SoftmaxRegression::from_hyperparams(hp);
    if let Some(seed) = args.seed {
        model = model.with_seed(seed);
    }
    let report = model.fit(&dataset.features, &dataset.labels)?;
    let acc = model.accuracy(&dataset.features, &dataset.labels)?;

    println!("training accuracy: {acc:.4}");
    if let Some(loss) = report.final_loss {
        println!("final loss: {loss:.6} after {} iterations", report.iterations_run);
    }

    ensure_parent_dir(&args.out)?;
    model.save_json(&args.out)
        .with_context(|| format!("failed to save model to {}", args.out.display()))?;
    println!("model saved to {}", args.out.display());

    if let Some(loss_csv) = &args.loss_csv {
        ensure_parent_dir(loss_csv)?;
        data::write_loss_csv(loss_csv, model.loss_history())
            .with_context(|| format!("failed to write {}", loss_csv.display()))?;
        println!("loss curve written to {}", loss_csv.display());
    }
    Ok(())
}

/// Loads prediction inputs, dropping the label column when one is named.
fn load_inputs(args: &PredictArgs) -> Result<(Matrix, Option<Vec<usize>>)> {
    match &args.label {
        Some(label) => {
            let ds = data::load_dataset(&args.data, label)
                .with_context(|| format!("failed to load dataset {}", args.data.display()))?;
            Ok((ds.features, Some(ds.labels)))
        }
        None => {
            let (_, x) = data::load_features(&args.data)
                .with_context(|| format!("failed to load features {}", args.data.display()))?;
            Ok((x, None))
        }
    }
}

fn load_model(path: &Path) -> Result<SoftmaxRegression> {
    SoftmaxRegression::load_json(path)
        .with_context(|| format!("failed to load model {}", path.display()))
}

fn predict(args: PredictArgs) -> Result<()> {
    let model = load_model(&args.model)?;
    let (x, labels) = load_inputs(&args)?;
    let probabilities = model.predict_probabilities(&x)?;

    match &args.out {
        Some(out) => {
            ensure_parent_dir(out)?;
            data::write_points_csv(out, &x, labels.as_deref(), &probabilities)?;
            println!("{} predictions written to {}", x.rows(), out.display());
        }
        None => {
            for (i, row) in probabilities.iter_rows().enumerate() {
                let probs: Vec<String> = row.iter().map(|p| format!("{p:.4}")).collect();
                println!("{i}\t{}\t[{}]", metrics::argmax(row), probs.join(", "));
            }
        }
    }
    Ok(())
}

fn evaluate(args: EvaluateArgs) -> Result<()> {
    let model = load_model(&args.model)?;
    let ds = data::load_dataset(&args.data, &args.label)
        .with_context(|| format!("failed to load dataset {}", args.data.display()))?;

    let predictions = model.predict(&ds.features)?;
    let acc = metrics::accuracy(&predictions, &ds.labels)?;
    let n_classes = model.n_classes().unwrap_or(0).max(ds.class_count());
    let confusion = metrics::confusion_matrix(&predictions, &ds.labels, n_classes)?;

    println!("accuracy: {acc:.4} ({} samples)", ds.len());
    println!("confusion matrix (rows = true class, cols = predicted):");
    for (k, row) in confusion.iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|c| format!("{c:>5}")).collect();
        println!("  {k:>3} |{}", cells.join(""));
    }
    Ok(())
}

fn demo(args: DemoArgs) -> Result<()> {
    let ds = toy::three_clusters();
    let mut model = SoftmaxRegression::new(0.1, 2000, 1e-3);
    model.fit(&ds.features, &ds.labels)?;
    println!("training accuracy (toy): {:.4}", model.accuracy(&ds.features, &ds.labels)?);

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let train_path = args.out_dir.join("softmax_train_points.csv");
    let train_probs = model.predict_probabilities(&ds.features)?;
    data::write_points_csv(&train_path, &ds.features, Some(ds.labels.as_slice()), &train_probs)?;

    let probe = toy::three_clusters_probe();
    let test_path = args.out_dir.join("softmax_test_points.csv");
    let test_probs = model.predict_probabilities(&probe)?;
    data::write_points_csv(&test_path, &probe, None, &test_probs)?;

    let loss_path = args.out_dir.join("softmax_toy_loss.csv");
    data::write_loss_csv(&loss_path, model.loss_history())?;

    println!("wrote:");
    for p in [&train_path, &test_path, &loss_path] {
        println!("  - {}", p.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn train_then_evaluate_and_predict() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("train.csv");
        fs::write(
            &csv,
            "a,b,urgencia\n-1,-1,0\n-1.2,-0.8,0\n1,1,1\n1.1,0.9,1\n",
        ).unwrap();
        let model_path = dir.path().join("models/m.json");
        let loss_path = dir.path().join("loss.csv");

        let args = SoftmaxArgs::try_parse_from([
            "ferrite-softmax", "train",
            "--data", csv.to_str().unwrap(),
            "--label", "urgencia",
            "--out", model_path.to_str().unwrap(),
            "--iterations", "300",
            "--loss-csv", loss_path.to_str().unwrap(),
        ]).unwrap();
        execute_command(args).unwrap();
        assert!(model_path.exists());
        assert_eq!(fs::read_to_string(&loss_path).unwrap().lines().count(), 301);

        let out = dir.path().join("pred.csv");
        let args = SoftmaxArgs::try_parse_from([
            "ferrite-softmax", "predict",
            "--model", model_path.to_str().unwrap(),
            "--data", csv.to_str().unwrap(),
            "--label", "urgencia",
            "--out", out.to_str().unwrap(),
        ]).unwrap();
        execute_command(args).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap().lines().count(), 5);

        let args = SoftmaxArgs::try_parse_from([
            "ferrite-softmax", "evaluate",
            "--model", model_path.to_str().unwrap(),
            "--data", csv.to_str().unwrap(),
            "--label", "urgencia",
        ]).unwrap();
        execute_command(args).unwrap();
    }

    #[test]
    fn flags_override_config_and_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("hp.json");
        fs::write(&config, r#"{"learning_rate": 0.5, "iterations": 10}"#).unwrap();

        let args = SoftmaxArgs::try_parse_from([
            "ferrite-softmax", "train",
            "--data", "d.csv", "--label", "y",
            "--config", config.to_str().unwrap(),
            "--iterations", "20",
        ]).unwrap();
        let Command::Train(train_args) = args.command else { panic!("expected train") };
        let hp = resolve_hyperparams(&train_args).unwrap();
        assert_eq!(hp, Hyperparams::new(0.5, 20, 1e-3));

        let args = SoftmaxArgs::try_parse_from([
            "ferrite-softmax", "train",
            "--data", "/nonexistent.csv", "--label", "y",
            "--learning-rate", "0",
        ]).unwrap();
        let Command::Train(train_args) = args.command else { panic!("expected train") };
        assert!(resolve_hyperparams(&train_args).is_err());
    }

    #[test]
    fn demo_writes_all_exports() {
        let dir = tempfile::tempdir().unwrap();
        demo(DemoArgs { out_dir: dir.path().to_path_buf() }).unwrap();
        for name in ["softmax_train_points.csv", "softmax_test_points.csv", "softmax_toy_loss.csv"] {
            assert!(dir.path().join(name).exists());
        }
    }
}
