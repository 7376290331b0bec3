//! Tumor feature vector for the Wisconsin Diagnostic layout.
//!
//! Each sample carries ten cell-nucleus measures, summarized three ways
//! (mean, standard error, worst), for 30 values in total. The scaler and
//! the classifier were fit against exactly this ordering:
//!
//! `[mean × 10, standard error × 10, worst × 10]`
//!
//! and within each group: radius, texture, perimeter, area, smoothness,
//! compactness, concavity, concave points, symmetry, fractal dimension.

/// Number of measures in one summary group.
pub const MEASURES_PER_GROUP: usize = 10;

/// Total length of the feature vector.
pub const FEATURE_COUNT: usize = 3 * MEASURES_PER_GROUP;

/// Column names as recorded by the training pipeline, in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "mean radius",
    "mean texture",
    "mean perimeter",
    "mean area",
    "mean smoothness",
    "mean compactness",
    "mean concavity",
    "mean concave points",
    "mean symmetry",
    "mean fractal dimension",
    "radius error",
    "texture error",
    "perimeter error",
    "area error",
    "smoothness error",
    "compactness error",
    "concavity error",
    "concave points error",
    "symmetry error",
    "fractal dimension error",
    "worst radius",
    "worst texture",
    "worst perimeter",
    "worst area",
    "worst smoothness",
    "worst compactness",
    "worst concavity",
    "worst concave points",
    "worst symmetry",
    "worst fractal dimension",
];

/// Human-readable field labels, in vector order.
pub const FEATURE_LABELS: [&str; FEATURE_COUNT] = [
    "Mean Radius",
    "Mean Texture",
    "Mean Perimeter",
    "Mean Area",
    "Mean Smoothness",
    "Mean Compactness",
    "Mean Concavity",
    "Mean Concave Points",
    "Mean Symmetry",
    "Mean Fractal Dimension",
    "Radius Error",
    "Texture Error",
    "Perimeter Error",
    "Area Error",
    "Smoothness Error",
    "Compactness Error",
    "Concavity Error",
    "Concave Points Error",
    "Symmetry Error",
    "Fractal Dimension Error",
    "Worst Radius",
    "Worst Texture",
    "Worst Perimeter",
    "Worst Area",
    "Worst Smoothness",
    "Worst Compactness",
    "Worst Concavity",
    "Worst Concave Points",
    "Worst Symmetry",
    "Worst Fractal Dimension",
];

/// How a measure is summarized over the nuclei in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureGroup {
    Mean,
    StandardError,
    Worst,
}

impl FeatureGroup {
    /// Groups in vector order.
    pub const ALL: [Self; 3] = [Self::Mean, Self::StandardError, Self::Worst];

    /// Position of the group's first value in the feature vector.
    #[must_use]
    pub fn offset(self) -> usize {
        match self {
            Self::Mean => 0,
            Self::StandardError => MEASURES_PER_GROUP,
            Self::Worst => 2 * MEASURES_PER_GROUP,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Mean => "Mean",
            Self::StandardError => "Standard Error",
            Self::Worst => "Worst",
        }
    }
}

/// A single cell-nucleus measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    Radius,
    Texture,
    Perimeter,
    Area,
    Smoothness,
    Compactness,
    Concavity,
    ConcavePoints,
    Symmetry,
    FractalDimension,
}

impl Measure {
    /// Measures in group order.
    pub const ALL: [Self; MEASURES_PER_GROUP] = [
        Self::Radius,
        Self::Texture,
        Self::Perimeter,
        Self::Area,
        Self::Smoothness,
        Self::Compactness,
        Self::Concavity,
        Self::ConcavePoints,
        Self::Symmetry,
        Self::FractalDimension,
    ];

    /// Position within a group.
    #[must_use]
    pub fn position(self) -> usize {
        match self {
            Self::Radius => 0,
            Self::Texture => 1,
            Self::Perimeter => 2,
            Self::Area => 3,
            Self::Smoothness => 4,
            Self::Compactness => 5,
            Self::Concavity => 6,
            Self::ConcavePoints => 7,
            Self::Symmetry => 8,
            Self::FractalDimension => 9,
        }
    }
}

/// Identifies one of the 30 features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureId {
    pub group: FeatureGroup,
    pub measure: Measure,
}

impl FeatureId {
    #[must_use]
    pub const fn new(group: FeatureGroup, measure: Measure) -> Self {
        Self { group, measure }
    }

    /// All features in vector order.
    pub fn all() -> impl Iterator<Item = FeatureId> {
        FeatureGroup::ALL.into_iter().flat_map(|group| {
            Measure::ALL
                .into_iter()
                .map(move |measure| FeatureId::new(group, measure))
        })
    }

    /// Index of this feature in the 30-value vector.
    #[must_use]
    pub fn index(self) -> usize {
        self.group.offset() + self.measure.position()
    }

    /// Column name used by the training pipeline.
    #[must_use]
    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    /// Label shown in the form.
    #[must_use]
    pub fn label(self) -> &'static str {
        FEATURE_LABELS[self.index()]
    }
}

/// The ten measures of one summary group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeasurementSet {
    pub radius: f64,
    pub texture: f64,
    pub perimeter: f64,
    pub area: f64,
    pub smoothness: f64,
    pub compactness: f64,
    pub concavity: f64,
    pub concave_points: f64,
    pub symmetry: f64,
    pub fractal_dimension: f64,
}

impl MeasurementSet {
    #[must_use]
    pub fn get(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Radius => self.radius,
            Measure::Texture => self.texture,
            Measure::Perimeter => self.perimeter,
            Measure::Area => self.area,
            Measure::Smoothness => self.smoothness,
            Measure::Compactness => self.compactness,
            Measure::Concavity => self.concavity,
            Measure::ConcavePoints => self.concave_points,
            Measure::Symmetry => self.symmetry,
            Measure::FractalDimension => self.fractal_dimension,
        }
    }

    pub fn set(&mut self, measure: Measure, value: f64) {
        let slot = match measure {
            Measure::Radius => &mut self.radius,
            Measure::Texture => &mut self.texture,
            Measure::Perimeter => &mut self.perimeter,
            Measure::Area => &mut self.area,
            Measure::Smoothness => &mut self.smoothness,
            Measure::Compactness => &mut self.compactness,
            Measure::Concavity => &mut self.concavity,
            Measure::ConcavePoints => &mut self.concave_points,
            Measure::Symmetry => &mut self.symmetry,
            Measure::FractalDimension => &mut self.fractal_dimension,
        };
        *slot = value;
    }

    /// Values in group order.
    #[must_use]
    pub fn to_array(&self) -> [f64; MEASURES_PER_GROUP] {
        [
            self.radius,
            self.texture,
            self.perimeter,
            self.area,
            self.smoothness,
            self.compactness,
            self.concavity,
            self.concave_points,
            self.symmetry,
            self.fractal_dimension,
        ]
    }
}

/// Complete feature vector for one tissue sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TumorFeatures {
    pub mean: MeasurementSet,
    pub error: MeasurementSet,
    pub worst: MeasurementSet,
}

impl TumorFeatures {
    #[must_use]
    pub fn group(&self, group: FeatureGroup) -> &MeasurementSet {
        match group {
            FeatureGroup::Mean => &self.mean,
            FeatureGroup::StandardError => &self.error,
            FeatureGroup::Worst => &self.worst,
        }
    }

    fn group_mut(&mut self, group: FeatureGroup) -> &mut MeasurementSet {
        match group {
            FeatureGroup::Mean => &mut self.mean,
            FeatureGroup::StandardError => &mut self.error,
            FeatureGroup::Worst => &mut self.worst,
        }
    }

    #[must_use]
    pub fn get(&self, id: FeatureId) -> f64 {
        self.group(id.group).get(id.measure)
    }

    pub fn set(&mut self, id: FeatureId, value: f64) {
        self.group_mut(id.group).set(id.measure, value);
    }

    /// Convert to the model's input row.
    /// Order matches `FEATURE_NAMES`.
    #[must_use]
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        let mut row = [0.0; FEATURE_COUNT];
        for group in FeatureGroup::ALL {
            let offset = group.offset();
            row[offset..offset + MEASURES_PER_GROUP].copy_from_slice(&self.group(group).to_array());
        }
        row
    }

    /// Build features from a model input row.
    #[must_use]
    pub fn from_array(row: [f64; FEATURE_COUNT]) -> Self {
        let mut features = Self::default();
        for id in FeatureId::all() {
            features.set(id, row[id.index()]);
        }
        features
    }

    /// First record of the Wisconsin Diagnostic dataset (diagnosed malignant).
    #[must_use]
    pub fn reference_sample() -> Self {
        Self::from_array([
            17.99, 10.38, 122.8, 1001.0, 0.1184, 0.2776, 0.3001, 0.1471, 0.2419, 0.07871,
            1.095, 0.9053, 8.589, 153.4, 0.006399, 0.04904, 0.05373, 0.01587, 0.03003, 0.006193,
            25.38, 17.33, 184.6, 2019.0, 0.1622, 0.6656, 0.7119, 0.2654, 0.4601, 0.1189,
        ])
    }
}
