use std::io::Write;

use crate::experiment::AccuracyCurvePoint;
use crate::Result;

// Write the curve as csv: a header row, then one row per schedule entry
pub fn write_curve(writer: impl Write, points: &[AccuracyCurvePoint]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["size", "mean_accuracy", "variance"])?;
    for point in points {
        writer.write_record([
            point.size.to_string(),
            point.mean_accuracy.to_string(),
            point.variance.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

// Human readable table for the console
pub fn print_curve(points: &[AccuracyCurvePoint]) {
    println!("{:>10}  {:>10}  {:>12}", "size", "accuracy", "std dev");
    for point in points {
        println!(
            "{:>10}  {:>10.4}  {:>12.6}",
            point.size,
            point.mean_accuracy,
            point.variance.sqrt()
        );
    }
}
