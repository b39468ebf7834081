//! Full pipeline on a real ONNX graph through the tract backend.
//!
//! `fixtures/global_average_pool.onnx` is a single `GlobalAveragePool`
//! node: input `data` [1, 3, 224, 224], output `scores` [1, 3, 1, 1].
//! Each class score is the mean of one preprocessed channel.

use std::path::{Path, PathBuf};

use classifier::{run, ClassifierConfig, Pipeline};
use image::{DynamicImage, Rgb, RgbImage};
use image_preprocess::{PreprocessConfig, ResizeFilter};
use inference_engine::{Backend, Device, Evaluator, OnnxModel};

fn fixture_model() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/global_average_pool.onnx")
}

struct Workdir {
    dir: PathBuf,
}

impl Workdir {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("tract-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    /// Solid image; after bias and BGR reversal the channel means are
    /// 250-128, 20-128, 10-128
    fn image(&self) -> PathBuf {
        let path = self.dir.join("solid.png");
        DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([10, 20, 250])))
            .save(&path)
            .unwrap();
        path
    }

    fn labels(&self) -> PathBuf {
        let path = self.dir.join("labels.json");
        std::fs::write(&path, r#"["blue", "green", "red"]"#).unwrap();
        path
    }

    fn config(&self) -> ClassifierConfig {
        ClassifierConfig {
            model_path: fixture_model(),
            image_path: self.image(),
            labels_path: self.labels(),
            preprocess: PreprocessConfig {
                filter: ResizeFilter::Nearest,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

impl Drop for Workdir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.dir).ok();
    }
}

#[test]
fn test_fixture_graph_loads_with_declared_input() {
    let model = OnnxModel::load(fixture_model(), Backend::Tract, Device::Cpu, &[1, 3, 224, 224]).unwrap();

    assert_eq!(model.input().name, "data");
    assert_eq!(model.input().shape, vec![1, 3, 224, 224]);
    assert_eq!(model.device(), Device::Cpu);
}

#[test]
fn test_run_prints_blue_for_blue_image() {
    let workdir = Workdir::new("run");
    let config = workdir.config();
    let mut out = Vec::new();

    let classification = run(&config, &mut out).unwrap();

    assert_eq!(classification.index, 0);
    assert_eq!(classification.label, "blue");
    assert!((classification.score - 122.0).abs() < 1e-3);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!("Loaded {}!\n0\nblue\n", config.model_path.display())
    );
}

#[test]
fn test_channel_means_reach_score_vector() {
    let workdir = Workdir::new("scores");
    let config = workdir.config();
    let pipeline = Pipeline::load(&config).unwrap();

    let scores = pipeline.scores(&config.image_path).unwrap();

    assert_eq!(scores.len(), 3);
    let expected = [122.0, -108.0, -118.0];
    for (score, expected) in scores.as_slice().iter().zip(expected) {
        assert!((score - expected).abs() < 1e-3, "{score} != {expected}");
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let workdir = Workdir::new("determinism");
    let config = workdir.config();

    let first = run(&config, &mut Vec::new()).unwrap();
    let second = run(&config, &mut Vec::new()).unwrap();

    assert_eq!(first, second);
}
