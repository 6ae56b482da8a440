//! CSV and JSON renderings of [`Results`].

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use serde_json::{json, Value};

use crate::{
    metrics::{MetricValue, Results},
    Result,
};

const MIME_TYPE: &str = "text/plain";

/// Header row of metric names followed by one row of values.
pub fn to_csv(results: &Results) -> String {
    let header = results
        .iter()
        .map(|(metric, _)| csv_field(metric.name()))
        .collect::<Vec<_>>()
        .join(",");
    let values = results
        .iter()
        .map(|(_, value)| csv_field(&value.to_string()))
        .collect::<Vec<_>>()
        .join(",");
    format!("{header}\n{values}\n")
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn write_csv(results: &Results, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, to_csv(results))?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

/// Evaluation output layout of the DIVA services: one `number` entry per
/// numeric metric, `text` entries for the rest, and the ground-truth file
/// name last.
pub fn to_json(results: &Results, gt_filename: &str) -> Value {
    let mut output = results
        .iter()
        .map(|(metric, value)| match value {
            MetricValue::Count(_) | MetricValue::Ratio(_) => json!({
                "number": {
                    "name": metric.name(),
                    "value": value.as_f64(),
                    "mime-type": MIME_TYPE,
                }
            }),
            MetricValue::Text(text) => json!({
                "text": {
                    "name": metric.name(),
                    "value": text,
                    "mime-type": MIME_TYPE,
                }
            }),
        })
        .collect::<Vec<_>>();
    output.push(json!({
        "text": {
            "name": "gtFilename",
            "value": gt_filename,
            "mime-type": MIME_TYPE,
        }
    }));
    json!({ "output": output })
}

pub fn write_json(results: &Results, gt_filename: &str, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &to_json(results, gt_filename))?;
    writer.flush()?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
