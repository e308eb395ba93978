use crate::patch::Patch;

/// Project slot contents, carried as an opaque device blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub data: Vec<u8>,
}

impl Project {
    /// Archive body of this project; an empty project has an empty body
    pub fn format(&self) -> &[u8] {
        &self.data
    }
}

/// PCM audio as reconstructed from a sample bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleAudio {
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_rate: u32,
    /// Interleaved frames, least significant byte first
    pub pcm: Vec<u8>,
}

impl SampleAudio {
    /// Bytes per single-channel frame
    pub fn frame_size(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    pub fn frame_count(&self) -> usize {
        match self.frame_size() {
            0 => 0,
            size => self.pcm.len() / size,
        }
    }
}

/// One sample slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    /// Display name, empty when the source does not carry one
    pub name: String,
    /// None for an unfilled slot
    pub audio: Option<SampleAudio>,
}

/// The aggregate of projects, samples and patches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pack {
    pub name: String,
    pub color: String,
    pub projects: Vec<Project>,
    pub samples: Vec<Sample>,
    pub patches: Vec<Patch>,
}

impl Pack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}
