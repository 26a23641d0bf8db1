use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a synthetic dataset with a deliberately skewed `Class` column.
#[derive(Parser)]
#[command(name = "generate-sample", version, about)]
struct Args {
    /// Rows per class, e.g. `950,45,5`.
    #[arg(long, value_delimiter = ',', default_values_t = [950usize, 50])]
    counts: Vec<usize>,

    /// Class labels, one per count (defaults to 0, 1, 2, …).
    #[arg(long, value_delimiter = ',')]
    labels: Vec<String>,

    /// Output directory for `sample_data.csv` and `sample_data.parquet`.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Fisher-Yates
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_u64() % (i as u64 + 1)) as usize;
            items.swap(i, j);
        }
    }
}

struct SampleRow {
    id: i64,
    amount: f64,
    score: f64,
    class: String,
}

fn generate_rows(counts: &[usize], labels: &[String], rng: &mut SimpleRng) -> Vec<SampleRow> {
    let mut rows = Vec::with_capacity(counts.iter().sum());
    for (class_idx, (&count, label)) in counts.iter().zip(labels).enumerate() {
        // Each class gets its own feature means so the data is not pure noise.
        let shift = class_idx as f64;
        for _ in 0..count {
            rows.push(SampleRow {
                id: 0,
                amount: (rng.gauss(4.0 + shift, 0.8)).exp().round() / 100.0,
                score: rng.gauss(shift * 1.5, 1.0),
                class: label.clone(),
            });
        }
    }
    rng.shuffle(&mut rows);
    for (i, row) in rows.iter_mut().enumerate() {
        row.id = i as i64;
    }
    rows
}

fn write_csv(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(["id", "amount", "score", "Class"])?;
    for row in rows {
        writer.write_record([
            row.id.to_string(),
            format!("{:.2}", row.amount),
            format!("{:.4}", row.score),
            row.class.clone(),
        ])?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("amount", DataType::Float64, false),
        Field::new("score", DataType::Float64, false),
        Field::new("Class", DataType::Utf8, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.id))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.amount))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.score))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.class.as_str()))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.counts.is_empty() {
        bail!("--counts needs at least one class size");
    }
    let labels: Vec<String> = if args.labels.is_empty() {
        (0..args.counts.len()).map(|i| i.to_string()).collect()
    } else if args.labels.len() == args.counts.len() {
        args.labels
    } else {
        bail!(
            "got {} labels for {} counts",
            args.labels.len(),
            args.counts.len()
        );
    };

    let mut rng = SimpleRng::new(args.seed);
    let rows = generate_rows(&args.counts, &labels, &mut rng);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let csv_path = args.out_dir.join("sample_data.csv");
    let parquet_path = args.out_dir.join("sample_data.parquet");
    write_csv(&csv_path, &rows)?;
    write_parquet(&parquet_path, &rows)?;

    println!(
        "Wrote {} rows ({} classes) to {} and {}",
        rows.len(),
        labels.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
