//! On-disk documents of a run and the JSON helpers that move them.
//!
//! Layout of one run directory:
//! - `request.json`: what the user asked for
//! - `input.json`: resolved playlist sets, written by the preparer
//! - `output.json`: results and timings, written by the executor
//!
//! Documents are written pretty-printed with four-space indentation and
//! fields in declaration order.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use data_loader::{Genre, PlaylistId};
use generator::TimingProfile;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::FileError;
use crate::run_id::RunId;

pub const REQUEST_FILE: &str = "request.json";
pub const INPUT_FILE: &str = "input.json";
pub const OUTPUT_FILE: &str = "output.json";

/// What to do when the target file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Replace the existing file
    #[default]
    Overwrite,
    /// Fail with `AlreadyExists`
    CreateNew,
}

/// `request.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub selected_model: String,
    pub playlist_selections: BTreeSet<PlaylistId>,
    pub genre_selections: BTreeSet<Genre>,
}

/// `input.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInput {
    pub run_id: RunId,
    pub model_type: String,
    pub target_playlists: BTreeSet<PlaylistId>,
    pub reject_playlists: BTreeSet<PlaylistId>,
    pub inference_playlists: BTreeSet<PlaylistId>,
}

/// Phase durations in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TsProfile {
    pub ts_total_length: f64,
    pub ts_training_length: f64,
    pub ts_inference_length: f64,
}

impl From<TimingProfile> for TsProfile {
    fn from(timings: TimingProfile) -> Self {
        let training = timings.training.as_secs_f64();
        let inference = timings.inference.as_secs_f64();
        Self {
            ts_total_length: training + inference,
            ts_training_length: training,
            ts_inference_length: inference,
        }
    }
}

/// `output.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub run_id: RunId,
    pub model_type: String,
    pub results: Vec<String>,
    pub ts_profile: TsProfile,
}

/// Read and deserialize a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, FileError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Serialize `value` with four-space indentation
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, FileError> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Serialize and write `value` to `path`
///
/// The document is fully serialized before the file is touched.
/// `Overwrite` goes through a sibling temp file and a rename, so readers
/// never see a half-written document. `CreateNew` fails with an
/// `AlreadyExists` I/O error if `path` exists.
pub fn write_json<T: Serialize>(path: &Path, value: &T, mode: WriteMode) -> Result<(), FileError> {
    let bytes = to_pretty_json(value)?;

    match mode {
        WriteMode::Overwrite => {
            let tmp = temp_path(path);
            let replaced = fs::write(&tmp, &bytes).and_then(|_| fs::rename(&tmp, path));
            if let Err(e) = replaced {
                // Never leave a partial temp file in the run directory
                if tmp.is_file() {
                    let _ = fs::remove_file(&tmp);
                }
                return Err(e.into());
            }
        }
        WriteMode::CreateNew => {
            let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
            let written = file.write_all(&bytes).and_then(|_| file.sync_all());
            drop(file);
            if let Err(e) = written {
                let _ = fs::remove_file(path);
                return Err(e.into());
            }
        }
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;
    use std::time::Duration;

    #[test]
    fn test_request_accepts_mixed_id_types() {
        let request: RunRequest = serde_json::from_str(
            r#"{
                "selected_model": "baseline",
                "playlist_selections": ["37i9dQ", 17, "37i9dQ"],
                "genre_selections": ["rock", "pop"]
            }"#,
        )
        .unwrap();

        assert_eq!(request.playlist_selections.len(), 2);
        assert!(request.playlist_selections.contains(&PlaylistId::Numeric(17)));
        assert_eq!(request.genre_selections.len(), 2);
    }

    #[test]
    fn test_ts_profile_total_is_sum() {
        let profile = TsProfile::from(TimingProfile {
            training: Duration::from_millis(5003),
            inference: Duration::from_millis(2511),
        });

        assert!((profile.ts_training_length - 5.003).abs() < 1e-9);
        assert!((profile.ts_inference_length - 2.511).abs() < 1e-9);
        assert_eq!(
            profile.ts_total_length,
            profile.ts_training_length + profile.ts_inference_length
        );
    }

    #[test]
    fn test_output_field_order() {
        let output = RunOutput {
            run_id: RunId::new("r1").unwrap(),
            model_type: "baseline".to_string(),
            results: vec!["0".to_string()],
            ts_profile: TsProfile {
                ts_total_length: 1.5,
                ts_training_length: 1.0,
                ts_inference_length: 0.5,
            },
        };

        let text = String::from_utf8(to_pretty_json(&output).unwrap()).unwrap();
        let run_id = text.find("\"run_id\"").unwrap();
        let model = text.find("\"model_type\"").unwrap();
        let results = text.find("\"results\"").unwrap();
        let profile = text.find("\"ts_profile\"").unwrap();
        assert!(run_id < model && model < results && results < profile);
        assert!(text.contains("\n    \"run_id\": \"r1\""));
    }

    #[test]
    fn test_write_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        write_json(&path, &vec![1, 2], WriteMode::CreateNew).unwrap();
        let err = write_json(&path, &vec![3], WriteMode::CreateNew).unwrap_err();
        assert!(matches!(err, FileError::Io(ref e) if e.kind() == ErrorKind::AlreadyExists));
        assert_eq!(read_json::<Vec<i32>>(&path).unwrap(), vec![1, 2]);

        write_json(&path, &vec![3], WriteMode::Overwrite).unwrap();
        assert_eq!(read_json::<Vec<i32>>(&path).unwrap(), vec![3]);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_failed_overwrite_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();

        // Rename fails: the target is a non-empty directory
        let path = dir.path().join("output.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "").unwrap();
        assert!(write_json(&path, &vec![1], WriteMode::Overwrite).is_err());
        assert!(!temp_path(&path).exists());

        // Temp write fails: its parent directory does not exist
        let orphan = dir.path().join("missing-run").join("input.json");
        assert!(matches!(
            write_json(&orphan, &vec![1], WriteMode::Overwrite),
            Err(FileError::Io(_))
        ));
        assert!(!temp_path(&orphan).exists());
        assert!(!orphan.exists());
    }

    #[test]
    fn test_read_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");

        assert!(matches!(read_json::<RunRequest>(&path), Err(FileError::Io(_))));

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_json::<RunRequest>(&path), Err(FileError::Json(_))));
    }
}
