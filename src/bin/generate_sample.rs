use std::sync::Arc;

use arrow::array::{ArrayRef, Float32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

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
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
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
}

/// Cluster name, colour, and mean expression per marker.
const POPULATIONS: [(&str, &str, [f64; 4]); 3] = [
    ("T cells", "#1f77b4", [6.0, 4.5, 0.5, 1.0]),
    ("B cells", "#ff7f0e", [0.5, 0.8, 5.5, 1.5]),
    ("Monocytes", "#2ca02c", [1.0, 0.5, 1.0, 6.5]),
];

const MARKERS: [&str; 4] = ["CD3", "CD4", "CD19", "CD14"];

const CELLS_PER_POPULATION: usize = 400;

fn main() {
    let mut rng = SimpleRng::new(42);

    let mut keys: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<f32>> = vec![Vec::new(); MARKERS.len()];
    let mut memberships: Vec<Vec<usize>> = vec![Vec::new(); POPULATIONS.len()];

    for (p, (_, _, means)) in POPULATIONS.iter().enumerate() {
        for _ in 0..CELLS_PER_POPULATION {
            memberships[p].push(keys.len());
            keys.push(format!("cell_{:05}", keys.len()));
            for (m, mean) in means.iter().enumerate() {
                columns[m].push(rng.gauss(*mean, 0.6).max(0.0) as f32);
            }
        }
    }

    // ---- points.parquet: key column + one Float32 column per marker ----
    let mut fields = vec![Field::new("id", DataType::Utf8, false)];
    fields.extend(MARKERS.iter().map(|m| Field::new(*m, DataType::Float32, false)));
    let schema = Arc::new(Schema::new(fields));

    let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from(
        keys.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
    ))];
    arrays.extend(
        columns
            .into_iter()
            .map(|c| Arc::new(Float32Array::from(c)) as ArrayRef),
    );

    let batch = RecordBatch::try_new(schema.clone(), arrays).expect("Failed to create RecordBatch");
    let file = std::fs::File::create("points.parquet").expect("Failed to create points.parquet");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // ---- clusters.json ----
    let clusters: Vec<_> = POPULATIONS
        .iter()
        .zip(&memberships)
        .map(|((name, color, _), indices)| json!({ "name": name, "color": color, "indices": indices }))
        .collect();
    let text = serde_json::to_string_pretty(&json!({ "clusters": clusters })).expect("Failed to encode clusters");
    std::fs::write("clusters.json", text).expect("Failed to write clusters.json");

    // ---- metadata.csv: shuffled, and every tenth cell missing ----
    let mut rows: Vec<(String, String, &str)> = Vec::new();
    for (p, indices) in memberships.iter().enumerate() {
        for &i in indices {
            if i % 10 == 9 {
                continue;
            }
            let batch = if rng.next_f64() < 0.5 { "batch_1" } else { "batch_2" };
            rows.push((keys[i].clone(), POPULATIONS[p].0.to_string(), batch));
        }
    }
    for i in (1..rows.len()).rev() {
        let j = (rng.next_u64() % (i as u64 + 1)) as usize;
        rows.swap(i, j);
    }

    let mut csv_writer = csv::Writer::from_path("metadata.csv").expect("Failed to create metadata.csv");
    csv_writer
        .write_record(["id", "cell_type", "batch"])
        .expect("Failed to write header");
    for (key, cell_type, batch) in &rows {
        csv_writer
            .write_record([key.as_str(), cell_type.as_str(), *batch])
            .expect("Failed to write row");
    }
    csv_writer.flush().expect("Failed to flush metadata.csv");

    println!(
        "Wrote {} cells x {} markers to points.parquet, {} clusters to clusters.json, {} metadata rows to metadata.csv",
        keys.len(),
        MARKERS.len(),
        POPULATIONS.len(),
        rows.len()
    );
}
