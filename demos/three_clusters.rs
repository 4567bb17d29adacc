use ferrite_softmax::data::toy;
use ferrite_softmax::{Matrix, SoftmaxRegression};

fn main() -> ferrite_softmax::Result<()> {
    let ds = toy::three_clusters();

    let mut model = SoftmaxRegression::new(0.1, 2000, 1e-3);
    model.fit(&ds.features, &ds.labels)?;

    let history = model.loss_history();
    for (i, loss) in history.iter().enumerate().step_by(250) {
        println!("Iteration {i}: loss = {loss:.6}");
    }
    println!("training accuracy: {:.4}", model.accuracy(&ds.features, &ds.labels)?);

    let probe = Matrix::from_rows(vec![
        vec![-1.0, -0.8],
        vec![0.1, 1.2],
        vec![2.1, 2.0],
    ])?;
    let probs = model.predict_probabilities(&probe)?;
    let classes = model.predict(&probe)?;
    for ((x, p), class) in probe.iter_rows().zip(probs.iter_rows()).zip(classes) {
        println!("Input: {x:?} -> class {class} {p:.4?}");
    }
    Ok(())
}
