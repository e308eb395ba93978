pub mod config;
pub mod flavor;
pub mod model;
pub mod patch;

pub use config::{get_config_path, load_config, ConvertConfig};
pub use flavor::{Flavor, CIRCUIT, CIRCUIT_TRACKS, FLAVORS, SAMPLE_ID, SYNTH_ID, VENDOR_ID};
pub use model::{Pack, Project, Sample, SampleAudio};
pub use patch::{Category, Genre, Patch, INITIAL_PATCH_NAME, PATCH_BODY_SIZE};
