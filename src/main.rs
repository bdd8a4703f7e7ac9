use std::env;
use std::error::Error;

use qbank_dedup::{demo_corpus, submit_question, QbankConfig, RawQuestion};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match env::args().nth(1) {
        Some(path) => QbankConfig::from_file(path)?,
        None => QbankConfig::default(),
    };
    let detector = config.build_detector()?;
    detector.initialize(&demo_corpus())?;

    let candidate = RawQuestion {
        id: "draft-001".into(),
        question: "What muscle acts as the main mover when the elbow flexes?".into(),
        options: vec![
            "Deltoid".into(),
            "Biceps brachii".into(),
            "Pectoralis major".into(),
            "Triceps brachii".into(),
        ],
        correct: 1,
        category_id: Some("kinesiology".into()),
        difficulty: Some("medium".into()),
        image: None,
        language: None,
    };

    let report = submit_question(candidate, &config.ingest, &detector)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    println!("{}", serde_json::to_string_pretty(&detector.statistics())?);

    Ok(())
}
