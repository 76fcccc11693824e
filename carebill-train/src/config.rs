//! Fixed parameters of the training job

use std::path::PathBuf;

/// Physical resolution of the saved chart
const DEFAULT_DPI: u32 = 120;

/// Where the labels of the importance chart come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    /// Column names of the loaded dataset, paired with the importances by position and cut to the
    /// shorter of the two lists
    DatasetColumns,
    /// Output names of the fitted column transformer, one per importance
    EncodedFeatures,
}

/// Geometry and typography of the feature importance chart
#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    /// Figure size in inches
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    pub title: String,
    pub title_pt: f64,
    pub x_label: String,
    pub y_label: String,
    pub axis_pt: f64,
}

impl PlotStyle {
    /// Image size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    /// Converts a font size in points to pixels at the chart resolution
    pub fn pt_to_px(&self, pt: f64) -> u32 {
        (pt * self.dpi as f64 / 72.0).round() as u32
    }

    /// Resolution in pixels per metre, as stored in the `pHYs` chunk of the PNG
    pub fn pixels_per_metre(&self) -> u32 {
        (self.dpi as f64 / 0.0254).round() as u32
    }
}

impl Default for PlotStyle {
    fn default() -> Self {
        PlotStyle {
            width_in: 6.4,
            height_in: 4.8,
            dpi: DEFAULT_DPI,
            title: "Random forest\nfeature importance".to_string(),
            title_pt: 22.0,
            x_label: "Importance".to_string(),
            y_label: "Feature".to_string(),
            axis_pt: 18.0,
        }
    }
}

/// Every constant of a training run
///
/// The binary always runs with [`PipelineConfig::default`]; the setters exist so that tests can
/// point the job at temporary files.
///
/// ```
/// use carebill_train::config::PipelineConfig;
///
/// let config = PipelineConfig::default().data_path("records.csv").n_estimators(10);
/// assert_eq!(config.max_depth, Some(2));
/// assert_eq!(config.seed, 42);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub data_path: PathBuf,
    pub metrics_path: PathBuf,
    pub plot_path: PathBuf,

    pub features: Vec<String>,
    pub categorical: Vec<String>,
    pub target: String,

    pub seed: u64,
    pub train_ratio: f32,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,

    pub labels: LabelSource,
    pub plot: PlotStyle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            data_path: PathBuf::from("healthcare_dataset.csv"),
            metrics_path: PathBuf::from("metrics.txt"),
            plot_path: PathBuf::from("feature_importance.png"),

            features: strings(&["Age", "Gender", "Blood Type", "Medical Condition"]),
            categorical: strings(&["Gender", "Blood Type", "Medical Condition"]),
            target: "Billing Amount".to_string(),

            seed: 42,
            train_ratio: 0.8,
            n_estimators: 100,
            max_depth: Some(2),

            labels: LabelSource::DatasetColumns,
            plot: PlotStyle::default(),
        }
    }
}

impl PipelineConfig {
    pub fn data_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn metrics_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.metrics_path = path.into();
        self
    }

    pub fn plot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.plot_path = path.into();
        self
    }

    /// Writes all outputs into `dir`, keeping their default file names
    pub fn output_dir<P: Into<PathBuf>>(self, dir: P) -> Self {
        let dir = dir.into();
        self.metrics_path(dir.join("metrics.txt"))
            .plot_path(dir.join("feature_importance.png"))
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn labels(mut self, labels: LabelSource) -> Self {
        self.labels = labels;
        self
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|x| x.to_string()).collect()
}
