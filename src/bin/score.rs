use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use tabpfn_serve::features::Record;
use tabpfn_serve::model::ModelProvider;
use tabpfn_serve::pipeline::PredictionPipeline;
use tabpfn_serve::config;

/// Offline batch scorer: reads a CSV of records, runs them through the same
/// pipeline the server uses, writes `prediction,probability` rows.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".parse().unwrap()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(input_path) = args.next() else {
        eprintln!("Usage: score <new_data.csv> [output.csv]");
        std::process::exit(1);
    };
    let output_path = args.next().unwrap_or_else(|| "predictions.csv".to_string());

    let batch = read_records(&input_path)
        .with_context(|| format!("failed to read records from '{}'", input_path))?;

    let artifact_path = match std::env::var("MODEL_PATH") {
        Ok(path) => path,
        Err(_) => config::load().await?.model.artifact_path,
    };

    let provider = Arc::new(ModelProvider::from_path(artifact_path));
    let pipeline = PredictionPipeline::new(provider);
    let output = pipeline.predict_batch(&batch).await?;

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("failed to open '{}'", output_path))?;
    writer.write_record(["prediction", "probability"])?;
    for (prediction, probability) in output.predictions.iter().zip(&output.probabilities) {
        writer.write_record([prediction.to_string(), probability.to_string()])?;
    }
    writer.flush()?;

    let fraud: i64 = output.predictions.iter().sum();
    println!("Predictions saved to '{}'", output_path);
    println!("Total samples: {}", output.predictions.len());
    println!("Predicted fraud: {}", fraud);
    println!(
        "Predicted non-fraud: {}",
        output.predictions.len() as i64 - fraud
    );

    Ok(())
}

fn read_records(path: &str) -> Result<Vec<Record>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut batch = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| (name.to_string(), parse_cell(cell)))
            .collect();
        batch.push(record);
    }
    Ok(batch)
}

/// CSV cells are untyped; integers and floats become numbers, everything
/// else stays a string for the normalizer to handle.
fn parse_cell(cell: &str) -> Value {
    if let Ok(n) = cell.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = cell.parse::<f64>() {
        return Value::from(f);
    }
    Value::from(cell)
}
