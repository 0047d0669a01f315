// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Professional reference sequences.
//!
//! A [`ReferenceLibrary`] caches one [`ReferenceSequence`] per exercise, loaded once from
//! a [`ReferenceSource`]: a directory of `<exercise>_keypoints.json` files, the built-in
//! demo set, or both. The cache is read-only once initialized; new captures are written
//! with [`ReferenceSequence::save`] and picked up by the next library built over that
//! directory.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::keypoint::{Frame, Keypoint, KeypointSequence, Landmark};
use crate::rules::EngineState;
use crate::utils::normalize_exercise;
use crate::{verbose, warn};

/// Suffix of reference keypoint files inside a reference directory.
pub const KEYPOINTS_FILE_SUFFIX: &str = "_keypoints.json";

/// Frame rate assumed when a capture does not state one.
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// Exercises covered by the demo references.
pub const DEMO_EXERCISES: [&str; 5] = ["squat", "pushup", "lunge", "plank", "burpee"];

/// Frames in each demo reference (10 s at 30 fps).
pub const DEMO_FRAME_COUNT: usize = 300;

/// Capture metadata stored alongside a reference sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceMetadata {
    /// Frames per second of the capture.
    pub frame_rate: f64,
    /// Number of frames in the sequence.
    pub total_frames: usize,
    /// Duration in seconds.
    pub duration: f64,
    /// RFC 3339 capture timestamp.
    pub capture_date: String,
}

impl Default for ReferenceMetadata {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            total_frames: 0,
            duration: 0.0,
            capture_date: String::new(),
        }
    }
}

/// A professional-form exemplar for one exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceSequence {
    /// Normalized exercise key.
    pub exercise_name: String,
    /// The exemplar keypoint frames.
    pub keypoints: KeypointSequence,
    /// Capture metadata.
    #[serde(default)]
    pub metadata: ReferenceMetadata,
}

impl ReferenceSequence {
    /// Wrap a captured sequence as a reference, deriving its metadata.
    ///
    /// # Arguments
    ///
    /// * `exercise` - Exercise name; stored normalized.
    /// * `keypoints` - Captured frames.
    /// * `frame_rate` - Capture frame rate; [`DEFAULT_FRAME_RATE`] when `None` or not positive.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_capture(
        exercise: &str,
        keypoints: KeypointSequence,
        frame_rate: Option<f64>,
    ) -> Self {
        let frame_rate = frame_rate
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .unwrap_or(DEFAULT_FRAME_RATE);
        let total_frames = keypoints.len();
        Self {
            exercise_name: normalize_exercise(exercise),
            keypoints,
            metadata: ReferenceMetadata {
                frame_rate,
                total_frames,
                duration: total_frames as f64 / frame_rate,
                capture_date: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Path of this reference's file inside `dir`.
    #[must_use]
    pub fn file_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}{KEYPOINTS_FILE_SUFFIX}", self.exercise_name))
    }

    /// Write the reference as pretty JSON into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = self.file_path(dir);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    /// Read a reference file.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ReferenceSourceError`] if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AnalysisError::ReferenceSourceError(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| AnalysisError::ReferenceSourceError(format!("{}: {e}", path.display())))
    }
}

/// Where a [`ReferenceLibrary`] loads its sequences from.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ReferenceSource {
    /// Every `<exercise>_keypoints.json` file in a directory.
    Directory(PathBuf),
    /// Synthetic demo references for [`DEMO_EXERCISES`].
    #[default]
    Demo,
    /// Demo references, overridden by the files of a directory.
    Layered(PathBuf),
    /// An explicit in-memory list.
    Sequences(Vec<ReferenceSequence>),
}

/// Cache of reference sequences keyed by normalized exercise name.
#[derive(Debug, Default)]
pub struct ReferenceLibrary {
    source: ReferenceSource,
    cache: OnceLock<HashMap<String, ReferenceSequence>>,
}

impl ReferenceLibrary {
    /// Create an uninitialized library for a source.
    #[must_use]
    pub const fn new(source: ReferenceSource) -> Self {
        Self {
            source,
            cache: OnceLock::new(),
        }
    }

    /// Library over the demo references.
    #[must_use]
    pub const fn demo() -> Self {
        Self::new(ReferenceSource::Demo)
    }

    /// Library over a reference directory.
    #[must_use]
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(ReferenceSource::Directory(dir.as_ref().to_path_buf()))
    }

    /// Library over explicit sequences.
    #[must_use]
    pub const fn from_sequences(sequences: Vec<ReferenceSequence>) -> Self {
        Self::new(ReferenceSource::Sequences(sequences))
    }

    /// The configured source.
    #[must_use]
    pub const fn source(&self) -> &ReferenceSource {
        &self.source
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        if self.cache.get().is_some() {
            EngineState::Initialized
        } else {
            EngineState::Uninitialized
        }
    }

    /// Load the sequences if they have not been loaded yet. Idempotent and thread-safe.
    pub fn initialize(&self) {
        self.cache();
    }

    fn cache(&self) -> &HashMap<String, ReferenceSequence> {
        self.cache.get_or_init(|| {
            let cache = load_cache(&self.source);
            verbose!("Reference library initialized with {} exercises", cache.len());
            cache
        })
    }

    /// Reference for an exercise (case-insensitive).
    #[must_use]
    pub fn get(&self, exercise: &str) -> Option<&ReferenceSequence> {
        self.cache().get(&normalize_exercise(exercise))
    }

    /// Exercises with a reference, sorted.
    #[must_use]
    pub fn exercises(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.cache().keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of cached references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache().len()
    }

    /// Check if no reference is available.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache().is_empty()
    }
}

fn load_cache(source: &ReferenceSource) -> HashMap<String, ReferenceSequence> {
    let mut cache = HashMap::new();
    match source {
        ReferenceSource::Demo => insert_demo(&mut cache),
        ReferenceSource::Directory(dir) => load_dir(dir, &mut cache),
        ReferenceSource::Layered(dir) => {
            insert_demo(&mut cache);
            load_dir(dir, &mut cache);
        }
        ReferenceSource::Sequences(sequences) => {
            for seq in sequences {
                cache.insert(normalize_exercise(&seq.exercise_name), seq.clone());
            }
        }
    }
    cache
}

fn insert_demo(cache: &mut HashMap<String, ReferenceSequence>) {
    for exercise in DEMO_EXERCISES {
        let keypoints = generate_demo_sequence(exercise, DEMO_FRAME_COUNT);
        cache.insert(
            exercise.to_string(),
            ReferenceSequence::from_capture(exercise, keypoints, Some(DEFAULT_FRAME_RATE)),
        );
    }
}

fn load_dir(dir: &Path, cache: &mut HashMap<String, ReferenceSequence>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Reference directory {} unavailable: {e}", dir.display());
            return;
        }
    };

    let mut files: Vec<(String, PathBuf)> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            let exercise = normalize_exercise(name.strip_suffix(KEYPOINTS_FILE_SUFFIX)?);
            Some((exercise, path))
        })
        .collect();
    files.sort();

    for (exercise, path) in files {
        match ReferenceSequence::load(&path) {
            Ok(mut reference) => {
                reference.exercise_name.clone_from(&exercise);
                cache.insert(exercise, reference);
            }
            Err(e) => warn!("Skipping reference file: {e}"),
        }
    }
}

/// Standing base pose on the 13-landmark layout, as `(x, y, confidence)`.
const BASE_POSE: [(f64, f64, f64); Landmark::COUNT] = [
    (0.5, 0.2, 0.9),
    (0.45, 0.35, 0.8),
    (0.55, 0.35, 0.8),
    (0.4, 0.5, 0.7),
    (0.6, 0.5, 0.7),
    (0.35, 0.65, 0.6),
    (0.65, 0.65, 0.6),
    (0.48, 0.7, 0.9),
    (0.52, 0.7, 0.9),
    (0.47, 0.85, 0.8),
    (0.53, 0.85, 0.8),
    (0.46, 0.95, 0.7),
    (0.54, 0.95, 0.7),
];

/// Generate a synthetic exercise sequence at 30 fps.
///
/// Squats and lunges perform two repetitions and push-ups four over the sequence;
/// other exercises hold the base pose.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn generate_demo_sequence(exercise: &str, frame_count: usize) -> KeypointSequence {
    use Landmark::{
        LeftAnkle, LeftElbow, LeftHip, LeftKnee, LeftWrist, RightElbow, RightHip, RightKnee,
        RightWrist,
    };

    let exercise = normalize_exercise(exercise);
    let frames = (0..frame_count)
        .map(|i| {
            let progress = i as f64 / frame_count as f64;
            let mut pose: Vec<Keypoint> = BASE_POSE
                .iter()
                .map(|&(x, y, c)| Keypoint::new(x, y, c))
                .collect();

            match exercise.as_str() {
                "squat" => {
                    let depth = (progress * PI * 2.0).sin() * 0.1;
                    pose[LeftHip.index()].y += depth;
                    pose[RightHip.index()].y += depth;
                    pose[LeftKnee.index()].y += depth * 1.2;
                    pose[RightKnee.index()].y += depth * 1.2;
                }
                "pushup" => {
                    let motion = (progress * PI * 4.0).sin() * 0.05;
                    pose[LeftElbow.index()].y += motion;
                    pose[RightElbow.index()].y += motion;
                    pose[LeftWrist.index()].y += motion * 1.5;
                    pose[RightWrist.index()].y += motion * 1.5;
                }
                "lunge" => {
                    let motion = (progress * PI * 2.0).sin() * 0.1;
                    pose[LeftKnee.index()].x += motion;
                    pose[LeftAnkle.index()].x += motion;
                    pose[LeftKnee.index()].y += motion.abs() * 0.5;
                }
                _ => {}
            }

            Frame::new(
                pose.into_iter().map(Some).collect(),
                i as f64 * 1000.0 / DEFAULT_FRAME_RATE,
                i,
            )
        })
        .collect();

    // frame numbers are generated in strictly increasing order
    KeypointSequence::new(frames).unwrap_or_default()
}
