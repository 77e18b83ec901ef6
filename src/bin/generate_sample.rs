use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    ArrayRef, Float64Array, Int64Array, ListBuilder, StringArray, StringBuilder,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

/// A source city for guests: name, postcode prefix, lat, lon.
type City = (&'static str, &'static str, f64, f64);

const UK_CITIES: [City; 6] = [
    ("London", "SW1A", 51.50, -0.13),
    ("Manchester", "M1", 53.48, -2.24),
    ("Birmingham", "B1", 52.49, -1.89),
    ("Glasgow", "G1", 55.86, -4.25),
    ("Leeds", "LS1", 53.80, -1.55),
    ("Bristol", "BS1", 51.45, -2.59),
];

const IE_CITIES: [City; 4] = [
    ("Dublin", "D01", 53.35, -6.26),
    ("Cork", "T12", 51.90, -8.47),
    ("Galway", "H91", 53.27, -9.05),
    ("Limerick", "V94", 52.66, -8.63),
];

const HOTELS: [&str; 4] = ["Arona Gran Hotel", "Bitácora", "Vulcano", "Jardín Tropical"];
const CHANNELS: [&str; 3] = ["OCEAN", "BOOKING", "EXPEDIA"];
const PENSIONS: [&str; 4] = ["AI", "MP", "AD", "SA"];
const ROOMS: [&str; 3] = ["DOBLE", "SUITE", "FAMILIAR"];
const LEAD_TIMES: [&str; 7] = [
    "0-7 días",
    "8-14 días",
    "15-30 días",
    "31-60 días",
    "61-90 días",
    "91-365 días",
    "366+ días",
];
const AGENCIES: [&str; 4] = ["Jet2", "TUI", "loveholidays", "On the Beach"];

fn age_group(age: i64) -> &'static str {
    match age {
        ..=24 => "De 15 a 24 años",
        25..=44 => "De 25 a 44 años",
        45..=64 => "De 45 a 64 años",
        _ => "65 años o más",
    }
}

/// Build one market's reservations. The IE market has no room-type column.
fn market_batch(prefix: &str, cities: &[City], rows: usize, with_room_type: bool, rng: &mut SimpleRng) -> Result<RecordBatch> {
    let mut ids = Vec::with_capacity(rows);
    let mut hotels = Vec::with_capacity(rows);
    let mut channels = Vec::with_capacity(rows);
    let mut lats = Vec::with_capacity(rows);
    let mut lons = Vec::with_capacity(rows);
    let mut postcodes = Vec::with_capacity(rows);
    let mut pensions = Vec::with_capacity(rows);
    let mut rooms = Vec::with_capacity(rows);
    let mut spend = Vec::with_capacity(rows);
    let mut nights = Vec::with_capacity(rows);
    let mut repeat = Vec::with_capacity(rows);
    let mut lead = Vec::with_capacity(rows);
    let mut ages = Vec::with_capacity(rows);
    let mut groups = Vec::with_capacity(rows);
    let mut agencies = ListBuilder::new(StringBuilder::new());

    for i in 0..rows {
        let (_, postcode, lat, lon) = cities[rng.below(cities.len())];
        let n = 2 + rng.below(12) as i64;
        let age = 18 + rng.below(62) as i64;
        let channel = rng.pick(&CHANNELS);

        ids.push(format!("{prefix}-{i:05}"));
        hotels.push(rng.pick(&HOTELS));
        channels.push(channel);
        // Jitter guests around their home city.
        lats.push(lat + (rng.next_f64() - 0.5) * 0.6);
        lons.push(lon + (rng.next_f64() - 0.5) * 0.9);
        postcodes.push(format!("{postcode} {}", 1 + rng.below(9)));
        pensions.push(rng.pick(&PENSIONS));
        rooms.push(rng.pick(&ROOMS));
        spend.push(((80.0 + rng.next_f64() * 160.0) * n as f64 * 100.0).round() / 100.0);
        nights.push(n);
        repeat.push(if rng.below(5) == 0 { "SI" } else { "NO" });
        lead.push(rng.pick(&LEAD_TIMES));
        ages.push(age);
        groups.push(age_group(age));

        if channel == "OCEAN" {
            agencies.append(false);
        } else {
            let count = 1 + rng.below(2);
            for _ in 0..count {
                agencies.values().append_value(rng.pick(&AGENCIES));
            }
            agencies.append(true);
        }
    }

    let utf8 = |name: &str| Field::new(name, DataType::Utf8, false);
    let mut fields = vec![
        utf8("reservation_id"),
        utf8("Hotel"),
        utf8("Canal"),
        Field::new("lat", DataType::Float64, false),
        Field::new("lon", DataType::Float64, false),
        utf8("Codigo_Postal"),
        utf8("Pension"),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(ids)),
        Arc::new(StringArray::from(hotels)),
        Arc::new(StringArray::from(channels)),
        Arc::new(Float64Array::from(lats)),
        Arc::new(Float64Array::from(lons)),
        Arc::new(StringArray::from(postcodes)),
        Arc::new(StringArray::from(pensions)),
    ];
    if with_room_type {
        fields.push(utf8("Tipo_Habitacion"));
        columns.push(Arc::new(StringArray::from(rooms)));
    }
    fields.extend([
        Field::new("GastoTotal", DataType::Float64, false),
        Field::new("Noches", DataType::Int64, false),
        utf8("Repetidor"),
        utf8("Antelacion_Range"),
        Field::new("Edad", DataType::Int64, false),
        utf8("G_Etario"),
        Field::new(
            "Agencia",
            DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
            true,
        ),
    ]);
    columns.extend([
        Arc::new(Float64Array::from(spend)) as ArrayRef,
        Arc::new(Int64Array::from(nights)),
        Arc::new(StringArray::from(repeat)),
        Arc::new(StringArray::from(lead)),
        Arc::new(Int64Array::from(ages)),
        Arc::new(StringArray::from(groups)),
        Arc::new(agencies.finish()),
    ]);

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .with_context(|| format!("building {prefix} record batch"))
}

fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let markets = [
        ("UK", &UK_CITIES[..], 1500, true, "data/UK_2025_s1_GeoData.parquet"),
        ("IE", &IE_CITIES[..], 500, false, "data/IE_2025_s1_GeoData.parquet"),
    ];

    for (prefix, cities, rows, with_room_type, output_path) in markets {
        let batch = market_batch(prefix, cities, rows, with_room_type, &mut rng)?;
        write_parquet(Path::new(output_path), &batch)?;
        println!("Wrote {rows} {prefix} reservations to {output_path}");
        println!("{}", pretty_format_batches(&[batch.slice(0, 3)])?);
    }
    Ok(())
}
