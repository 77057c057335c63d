use insults_classifiers::config::{Penalty, PipelineConfig, StagedConfig};
use insults_classifiers::models::StagedModel;
use insults_classifiers::pipeline::Pipeline;
use ndarray::Array1;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Tiny synthetic corpus: every insult mentions "idiot"
    let comments = vec![
        "you are an idiot",
        "thanks for the link",
        "what an idiot",
        "great game last night",
        "shut up idiot",
        "nice photo of the lake",
        "total idiot",
        "see you at the meeting",
    ];
    let labels = Array1::from(vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);

    // Few steps for speed
    let config = PipelineConfig {
        regressor: StagedConfig {
            step_size: 10,
            total_iterations: 100,
            eta0: 0.05,
            penalty: Penalty::L2,
            ..StagedConfig::default()
        },
        ..PipelineConfig::default()
    };

    let mut pipeline = Pipeline::from_config(&config)?;
    pipeline.fit(&comments, &labels)?;
    println!(
        "Vocabulary: {} character n-grams, {} kept after filtering",
        pipeline.vectorizer().vocabulary_size(),
        pipeline.transform(&comments)?.cols()
    );

    let x = pipeline.transform(&comments)?;
    let (iterations, aucs) = pipeline.final_model().staged_auc(&x, &labels)?;
    for (iters, auc) in iterations.iter().zip(&aucs) {
        println!("{:>5} iterations: training auc {:.4}", iters, auc);
    }

    let unseen = ["idiot", "lovely lake"];
    let preds = pipeline.predict(&unseen)?;
    for (comment, score) in unseen.iter().zip(preds.iter()) {
        println!("{:>12}: {:.3}", comment, score);
    }
    Ok(())
}
