//! Writes a synthetic `metadata.csv.zip` for trying paper-explorer without
//! the real dataset. Every column kind has some gaps.

use std::io::Write;

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

const JOURNALS: &[&str] = &[
    "PLoS One",
    "BMJ",
    "The Lancet",
    "Nature",
    "Journal of Virology",
    "Vaccine",
    "Emerging Infectious Diseases",
    "Science",
    "Cell",
    "Virology Journal",
    "Scientific Reports",
    "JAMA",
];
const SOURCES: &[&str] = &["PMC", "Medline", "WHO", "Elsevier", "MedRxiv", "ArXiv"];
const TOPICS: &[&str] = &[
    "COVID-19", "SARS-CoV-2", "coronavirus", "influenza", "pandemic", "vaccine",
];
const FRAMES: &[&str] = &[
    "Transmission dynamics of",
    "Clinical features of",
    "A review of",
    "Modelling the spread of",
    "Immune response to",
    "Public health measures against",
    "Genomic analysis of",
];
const SETTINGS: &[&str] = &[
    "in hospitalized patients",
    "in Wuhan, China",
    "among healthcare workers",
    "in children",
    "during lockdown",
    "",
];

fn main() {
    let mut rng = SimpleRng::new(42);
    let n_papers = 600;

    let mut bytes = Vec::new();
    let mut writer = csv::Writer::from_writer(&mut bytes);
    writer.write_record([
        "cord_uid",
        "title",
        "journal",
        "source",
        "publication_date",
        "release_date",
        "last_modified",
        "citations",
    ])
    .expect("Failed to write header");

    for i in 0..n_papers {
        let year = 2015 + rng.below(10) as i32;
        let month = 1 + rng.below(12);
        let day = 1 + rng.below(28);

        let title = if rng.chance(0.03) {
            String::new()
        } else {
            format!(
                "{} {} {}",
                rng.pick(FRAMES),
                rng.pick(TOPICS),
                rng.pick(SETTINGS)
            )
            .trim()
            .to_string()
        };
        let journal = if rng.chance(0.08) {
            ""
        } else {
            rng.pick(JOURNALS)
        };
        let source = rng.pick(SOURCES);
        let publication_date = match rng.below(20) {
            0 => String::new(),
            1 => year.to_string(),
            2 => "unknown".to_string(),
            _ => format!("{year}-{month:02}-{day:02}"),
        };
        let release_date = if rng.chance(0.05) {
            "n/a".to_string()
        } else {
            format!("{}-{month:02}-{day:02}", year.max(2019))
        };
        let last_modified = if rng.chance(0.1) {
            String::new()
        } else {
            format!("2024-{month:02}-{day:02}T12:00:00Z")
        };
        let citations = if rng.chance(0.1) {
            String::new()
        } else {
            ((rng.next_f64() * rng.next_f64()) * 400.0).round().to_string()
        };

        writer.write_record([
            format!("uid{i:05}"),
            title,
            journal.to_string(),
            source.to_string(),
            publication_date,
            release_date,
            last_modified,
            citations,
        ])
        .expect("Failed to write row");
    }

    writer.flush().expect("Failed to finish CSV");
    drop(writer);

    let output_path = "metadata.csv.zip";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file("metadata.csv", options)
        .expect("Failed to start zip entry");
    zip.write_all(&bytes).expect("Failed to write zip entry");
    zip.finish().expect("Failed to finish zip");

    println!("Wrote {n_papers} papers to {output_path}");
}
