// Pack archive layout: one zip entry per slot plus the JSON index

use std::io::{Cursor, Write};

use log::debug;
use model::{Flavor, Pack, Patch, Project, Sample};
use serde::{Deserialize, Serialize};
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::{patch_codec, transport, wav, PackError};

pub const INDEX_FILE: &str = "index.json";
pub const INDEX_VERSION: &str = "2.0";

/// Manifest stored as `index.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackIndex {
    pub name: String,
    pub color: String,
    pub product: String,
    pub version: String,
    pub projects: Vec<PackObject>,
    pub samples: Vec<PackObject>,
    pub patches: Vec<PackObject>,
}

/// One slot of the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackObject {
    pub name: String,
    /// Archive-relative path of the slot's file
    #[serde(rename = "url", default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

pub fn project_path(index: usize) -> String {
    format!("projects/project_{}.ncs", index)
}

pub fn sample_path(index: usize) -> String {
    format!("samples/sample_{}.wav", index)
}

pub fn patch_path(index: usize) -> String {
    format!("patches/patch_{}.syx", index)
}

/// Build the complete archive for `pack` in memory
///
/// Capacity must already have been checked against `flavor`.
pub fn write_archive(pack: &Pack, flavor: &Flavor, product: &str) -> Result<Vec<u8>, PackError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    let mut index = PackIndex {
        name: pack.name.clone(),
        color: pack.color.clone(),
        product: product.to_string(),
        version: INDEX_VERSION.to_string(),
        projects: Vec::with_capacity(flavor.number_projects),
        samples: Vec::with_capacity(flavor.number_samples),
        patches: Vec::with_capacity(flavor.number_patches),
    };

    zip.add_directory("projects/", options)?;
    let empty_project = Project::default();
    for i in 0..flavor.number_projects {
        let path = project_path(i);
        let project = pack.projects.get(i).unwrap_or(&empty_project);

        zip.start_file(path.as_str(), options)?;
        zip.write_all(project.format())?;
        index.projects.push(PackObject {
            name: String::new(),
            path,
        });
    }

    zip.add_directory("samples/", options)?;
    let empty_sample = Sample::default();
    for i in 0..flavor.number_samples {
        let path = sample_path(i);
        let sample = pack.samples.get(i).unwrap_or(&empty_sample);

        // Unfilled slots are listed in the index without a file
        if let Some(audio) = &sample.audio {
            let data = wav::encode(audio)?;
            zip.start_file(path.as_str(), options)?;
            zip.write_all(&data)?;
            debug!("Wrote {} ({} bytes)", path, data.len());
        }
        index.samples.push(PackObject {
            name: sample.name.clone(),
            path,
        });
    }

    zip.add_directory("patches/", options)?;
    for i in 0..flavor.number_patches {
        let path = patch_path(i);
        let patch = pack.patches.get(i);
        let slot = u8::try_from(i).map_err(|_| PackError::CapacityExceeded {
            kind: "patches",
            count: i + 1,
            limit: usize::from(u8::MAX) + 1,
        })?;

        // Entries must stay importable as SysEx
        let payload = patch_codec::encode_sysex(patch.unwrap_or(&Patch::default()), flavor, slot)?;
        zip.start_file(path.as_str(), options)?;
        zip.write_all(&transport::wrap(&payload))?;
        index.patches.push(PackObject {
            name: Patch::name_of(patch),
            path,
        });
    }

    let body = serde_json::to_vec(&index)?;
    zip.start_file(INDEX_FILE, options)?;
    zip.write_all(&body)?;

    let buffer = zip.finish()?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_json_shape() {
        let index = PackIndex {
            name: "pack".to_string(),
            color: "".to_string(),
            product: "circuit-tracks".to_string(),
            version: INDEX_VERSION.to_string(),
            projects: vec![PackObject {
                name: String::new(),
                path: project_path(0),
            }],
            samples: vec![],
            patches: vec![PackObject {
                name: "Initial Patch".to_string(),
                path: String::new(),
            }],
        };
        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json["projects"][0]["url"], "projects/project_0.ncs");
        assert_eq!(json["product"], "circuit-tracks");
        assert_eq!(json["version"], "2.0");
        assert!(json["patches"][0].get("url").is_none());
    }

    #[test]
    fn test_paths() {
        assert_eq!(sample_path(63), "samples/sample_63.wav");
        assert_eq!(patch_path(127), "patches/patch_127.syx");
    }
}
