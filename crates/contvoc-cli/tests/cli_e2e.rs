//! End-to-end runs of the CLI commands against files on disk.

use std::fs;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use pretty_assertions::assert_eq;

use contvoc_cli::commands::codebook;
use contvoc_cli::commands::excite::{self, ExciteOptions};
use contvoc_excitation::{CodebookPreset, ResidualCodebook};

fn write_log_contour(path: &Path, values_hz: &[f64]) {
    let mut bytes = vec![0u8; values_hz.len() * 4];
    let logs: Vec<f32> = values_hz.iter().map(|v| v.ln() as f32).collect();
    LittleEndian::write_f32_into(&logs, &mut bytes);
    fs::write(path, bytes).unwrap();
}

fn write_codebook(path: &Path) {
    let entries = (0..80)
        .map(|k| {
            (0..200)
                .map(|n| {
                    let t = n as f64 - 100.0;
                    (-t * t / (150.0 + k as f64)).exp()
                })
                .collect()
        })
        .collect();
    fs::write(path, ResidualCodebook::new(entries).unwrap().to_bytes()).unwrap();
}

fn read_raw_f32(path: &Path) -> Vec<f32> {
    let bytes = fs::read(path).unwrap();
    let mut out = vec![0.0f32; bytes.len() / 4];
    LittleEndian::read_f32_into(&bytes, &mut out);
    out
}

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new(f0: &[f64], mvf: &[f64]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_log_contour(&dir.path().join("utt.lf0"), f0);
        write_log_contour(&dir.path().join("utt.mvf"), mvf);
        write_codebook(&dir.path().join(CodebookPreset::Female.file_name()));
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_str().unwrap().to_string()
    }
}

#[test]
fn excite_writes_normalized_output() {
    let fx = Fixture::new(&[120.0; 50], &[3500.0; 50]);
    let (lf0, mvf, out, dir) = (
        fx.path("utt.lf0"),
        fx.path("utt.mvf"),
        fx.path("out/utt.raw"),
        fx.path(""),
    );

    let summary = excite::execute(&ExciteOptions {
        lf0: &lf0,
        mvf: &mvf,
        preset: Some("female"),
        codebook_dir: &dir,
        output: &out,
        variant: "envelope",
        seed: Some(3),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(summary.frames, 50);
    assert_eq!(summary.samples, 50 * 80);
    assert_eq!(summary.variant, "envelope:Hilbert");
    assert!(summary.pulse_count > 0);

    let samples = read_raw_f32(Path::new(&out));
    assert_eq!(samples.len(), 4000);
    let peak = samples.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    assert!((peak - 1.0).abs() < 1e-6);
}

#[test]
fn excite_is_reproducible_for_same_seed() {
    let fx = Fixture::new(&[140.0; 40], &[4000.0; 40]);
    let (lf0, mvf, cb) = (
        fx.path("utt.lf0"),
        fx.path("utt.mvf"),
        fx.path(CodebookPreset::Female.file_name()),
    );
    let outputs: Vec<String> = ["a.raw", "b.raw"].iter().map(|n| fx.path(n)).collect();

    for out in &outputs {
        excite::execute(&ExciteOptions {
            lf0: &lf0,
            mvf: &mvf,
            codebook: Some(&cb),
            output: out,
            variant: "envelope:Triangular",
            seed: Some(11),
            ..Default::default()
        })
        .unwrap();
    }

    assert_eq!(
        read_raw_f32(Path::new(&outputs[0])),
        read_raw_f32(Path::new(&outputs[1]))
    );
}

#[test]
fn excite_unvoiced_input_fails_without_writing() {
    let fx = Fixture::new(&[0.0; 30], &[3000.0; 30]);
    let (lf0, mvf, cb, out) = (
        fx.path("utt.lf0"),
        fx.path("utt.mvf"),
        fx.path(CodebookPreset::Female.file_name()),
        fx.path("silent.raw"),
    );

    let err = excite::execute(&ExciteOptions {
        lf0: &lf0,
        mvf: &mvf,
        codebook: Some(&cb),
        output: &out,
        variant: "residual",
        ..Default::default()
    })
    .unwrap_err();

    assert!(format!("{:#}", err).contains("silent buffer"));
    assert!(!Path::new(&out).exists());
}

#[test]
fn excite_pulse_noise_needs_no_codebook_shapes() {
    let fx = Fixture::new(&[100.0; 20], &[2000.0; 20]);
    let (lf0, mvf, cb, out) = (
        fx.path("utt.lf0"),
        fx.path("utt.mvf"),
        fx.path(CodebookPreset::Female.file_name()),
        fx.path("pn.raw"),
    );

    let summary = excite::execute(&ExciteOptions {
        lf0: &lf0,
        mvf: &mvf,
        codebook: Some(&cb),
        output: &out,
        variant: "pulse-noise",
        ..Default::default()
    })
    .unwrap();

    assert_eq!(summary.variant, "pulse-noise");
    assert_eq!(summary.samples, 1600);
    assert_eq!(read_raw_f32(Path::new(&out)).len(), 1600);
}

#[test]
fn codebook_summary_reads_written_file() {
    let fx = Fixture::new(&[100.0], &[1000.0]);
    let summary = codebook::summarize(&fx.path(CodebookPreset::Female.file_name())).unwrap();

    assert_eq!(summary.entries, 80);
    assert!(summary.entry_lengths.iter().all(|&l| l == 200));
    assert!(summary.covers_mvf_range);
}
