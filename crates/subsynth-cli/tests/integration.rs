//! Integration tests for subsynth-cli.
//!
//! Tests run the `subsynth` binary and inspect the WAV files it writes.

use std::process::Command;
use tempfile::TempDir;

/// Helper to get the path to the `subsynth` binary built by cargo.
fn subsynth_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_subsynth"))
}

fn read_wav(path: &std::path::Path) -> (hound::WavSpec, Vec<f32>) {
    let mut reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<f32>().map(Result::unwrap).collect();
    (spec, samples)
}

// ---------------------------------------------------------------------------
// `subsynth params`
// ---------------------------------------------------------------------------

#[test]
fn cli_params_lists_every_parameter() {
    let output = subsynth_bin()
        .arg("params")
        .output()
        .expect("failed to run subsynth params");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for id in [
        "osc1_type",
        "osc2_type",
        "osc_mix",
        "filter_enabled",
        "filter_cutoff",
        "filter_resonance",
        "filter_mode",
        "attack",
        "decay",
        "sustain",
        "release",
        "master_gain",
    ] {
        assert!(stdout.contains(id), "params listing should contain '{id}'");
    }
}

#[test]
fn cli_params_toml_is_loadable_config() {
    let dir = TempDir::new().unwrap();
    let output = subsynth_bin().args(["params", "--toml"]).output().unwrap();
    assert!(output.status.success());

    let config_path = dir.path().join("synth.toml");
    std::fs::write(&config_path, &output.stdout).unwrap();
    let config = subsynth::SynthConfig::load(&config_path).unwrap();
    assert_eq!(config.params.len(), 12);
    assert!(config.validate().is_ok());
}

// ---------------------------------------------------------------------------
// `subsynth render`
// ---------------------------------------------------------------------------

#[test]
fn cli_render_writes_stereo_float_wav() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("chord.wav");

    let output = subsynth_bin()
        .args([
            "render",
            out.to_str().unwrap(),
            "--notes",
            "60,64,67",
            "--hold",
            "0.5",
            "--tail",
            "0.25",
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let (spec, samples) = read_wav(&out);
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 48000);
    assert_eq!(spec.bits_per_sample, 32);
    assert_eq!(samples.len(), 36000 * 2);
    assert!(samples.iter().all(|s| s.abs() <= 0.95));
    assert!(samples.iter().any(|s| s.abs() > 0.01));
    for frame in samples.chunks(2) {
        assert_eq!(frame[0], frame[1]);
    }
}

#[test]
fn cli_render_respects_config_and_overrides() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("synth.toml");
    std::fs::write(
        &config_path,
        "sample_rate = 22050.0\nmax_block_size = 64\n\n[params]\nfilter_cutoff = 800.0\n",
    )
    .unwrap();
    let out = dir.path().join("mono.wav");

    let output = subsynth_bin()
        .args([
            "render",
            out.to_str().unwrap(),
            "--config",
            config_path.to_str().unwrap(),
            "--channels",
            "1",
            "--hold",
            "0.1",
            "--tail",
            "0",
            "--param",
            "osc1_type=square",
            "--param",
            "master_gain=-6",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let (spec, samples) = read_wav(&out);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 22050);
    assert_eq!(samples.len(), 2205);
}

#[test]
fn cli_render_rounds_fractional_config_rate() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("synth.toml");
    std::fs::write(&config_path, "sample_rate = 22049.6\n").unwrap();
    let out = dir.path().join("rate.wav");

    let output = subsynth_bin()
        .args([
            "render",
            out.to_str().unwrap(),
            "--config",
            config_path.to_str().unwrap(),
            "--channels",
            "1",
            "--hold",
            "1.0",
            "--tail",
            "0",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let (spec, samples) = read_wav(&out);
    assert_eq!(spec.sample_rate, 22050);
    // One second of audio matches the header's rate.
    assert_eq!(samples.len(), 22050);
}

#[test]
fn cli_render_hard_stop_ends_silent() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("stop.wav");

    let output = subsynth_bin()
        .args([
            "render",
            out.to_str().unwrap(),
            "--channels",
            "1",
            "--hold",
            "0.2",
            "--tail",
            "0.1",
            "--hard-stop",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let (_, samples) = read_wav(&out);
    assert!(samples[9600..].iter().all(|s| *s == 0.0));
}

#[test]
fn cli_render_rejects_unknown_param() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("x.wav");

    let output = subsynth_bin()
        .args(["render", out.to_str().unwrap(), "--param", "detune=7"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown parameter"));
    assert!(!out.exists());
}

#[test]
fn cli_render_rejects_zero_block_size() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("x.wav");

    let output = subsynth_bin()
        .args(["render", out.to_str().unwrap(), "--block-size", "0"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!out.exists());
}
