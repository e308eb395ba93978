// Synth patch record
// The body of a patch dump is a fixed 340 byte layout shared by every flavor.

use codec::{record, ByteWriter, CodecError, Cursor, Record};

/// Size of the parameter body carried by every patch dump
pub const PATCH_BODY_SIZE: usize = 340;

/// Name reported for empty or missing patches
pub const INITIAL_PATCH_NAME: &str = "Initial Patch";

const NAME_SIZE: usize = 16;

macro_rules! byte_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:literal,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub enum $name {
            #[default]
            None,
            $($variant,)*
            /// Value outside the known table, kept as transmitted
            Other(u8),
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                match value {
                    0 => $name::None,
                    $($value => $name::$variant,)*
                    other => $name::Other(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                match value {
                    $name::None => 0,
                    $($name::$variant => $value,)*
                    $name::Other(other) => other,
                }
            }
        }

        impl Record for $name {
            const SIZE: usize = 1;

            fn read(cursor: &mut Cursor<'_>) -> Result<Self, CodecError> {
                cursor.read_u8().map($name::from)
            }

            fn write(&self, writer: &mut ByteWriter) {
                writer.put_u8(u8::from(*self));
            }
        }
    };
}

byte_enum! {
    /// Browsing category of a patch
    Category {
        Arp = 1,
        Bass = 2,
        Bell = 3,
        Classic = 4,
        Drum = 5,
        Keyboard = 6,
        Lead = 7,
        Motion = 8,
        Pad = 9,
        Poly = 10,
        Sfx = 11,
        String = 12,
        User = 13,
        Vocal = 14,
    }
}

byte_enum! {
    /// Musical genre tag of a patch
    Genre {
        Classic = 1,
        Breaks = 2,
        House = 3,
        Industrial = 4,
        Jazz = 5,
        HipHop = 6,
        PopRock = 7,
        Techno = 8,
        DubStep = 9,
    }
}

record! {
    pub struct Voice {
        pub polyphony_mode: u8,
        pub portamento_rate: u8,
        pub pre_glide: u8,
        pub keyboard_octave: u8,
    }
}

record! {
    pub struct Oscillator {
        pub wave: u8,
        pub wave_interpolate: u8,
        pub pulse_width_index: u8,
        pub virtual_sync_depth: u8,
        pub density: u8,
        pub density_detune: u8,
        pub semitones: u8,
        pub cents: u8,
        pub pitch_bend: u8,
    }
}

record! {
    pub struct Mixer {
        pub osc1_level: u8,
        pub osc2_level: u8,
        pub ring_mod_level_12: u8,
        pub noise_level: u8,
        pub pre_fx_level: u8,
        pub post_fx_level: u8,
    }
}

record! {
    pub struct Filter {
        pub routing: u8,
        pub drive: u8,
        pub drive_type: u8,
        pub filter_type: u8,
        pub frequency: u8,
        pub track: u8,
        pub resonance: u8,
        pub q_normalize: u8,
        pub env2_to_freq: u8,
    }
}

record! {
    pub struct Adsr {
        pub attack: u8,
        pub decay: u8,
        pub sustain: u8,
        pub release: u8,
    }
}

record! {
    /// Amplitude and filter envelopes
    pub struct VelocityEnvelope {
        pub velocity: u8,
        pub adsr: Adsr,
    }
}

record! {
    /// Modulation-only envelope
    pub struct DelayEnvelope {
        pub delay: u8,
        pub adsr: Adsr,
    }
}

record! {
    pub struct Lfo {
        pub waveform: u8,
        pub phase_offset: u8,
        pub slew_rate: u8,
        pub delay: u8,
        pub delay_sync: u8,
        pub rate: u8,
        pub rate_sync: u8,
        pub bits: u8,
    }
}

record! {
    pub struct Band {
        pub frequency: u8,
        pub level: u8,
    }
}

record! {
    pub struct Equalizer {
        pub bass: Band,
        pub mid: Band,
        pub treble: Band,
    }
}

record! {
    pub struct Distortion {
        pub distortion_type: u8,
        pub compensation: u8,
    }
}

record! {
    pub struct Chorus {
        pub chorus_type: u8,
        pub rate: u8,
        pub rate_sync: u8,
        pub feedback: u8,
        pub mod_depth: u8,
        pub delay: u8,
    }
}

record! {
    /// One modulation matrix slot
    pub struct ModRoute {
        pub source1: u8,
        pub source2: u8,
        pub depth: u8,
        pub destination: u8,
    }
}

record! {
    pub struct MacroTarget {
        pub destination: u8,
        pub start: u8,
        pub end: u8,
        pub depth: u8,
    }
}

record! {
    /// Macro knob with its four assignable targets
    pub struct Macro {
        pub position: u8,
        pub targets: [MacroTarget; 4],
    }
}

record! {
    /// A synth program, field for field as the device lays it out
    pub struct Patch {
        pub patch_name: [u8; 16],
        pub category: Category,
        pub genre: Genre,
        pub reserved: [u8; 14],
        pub voice: Voice,
        pub osc1: Oscillator,
        pub osc2: Oscillator,
        pub mixer: Mixer,
        pub filter: Filter,
        pub envelope1: VelocityEnvelope,
        pub envelope2: VelocityEnvelope,
        pub envelope3: DelayEnvelope,
        pub lfo1: Lfo,
        pub lfo2: Lfo,
        pub distortion_level: u8,
        pub fx_reserved1: u8,
        pub chorus_level: u8,
        pub fx_reserved2: u8,
        pub fx_reserved3: u8,
        pub equalizer: Equalizer,
        pub fx_reserved: [u8; 5],
        pub distortion: Distortion,
        pub chorus: Chorus,
        pub mod_matrix: [ModRoute; 20],
        pub macros: [Macro; 8],
    }
}

const _: () = assert!(<Patch as Record>::SIZE == PATCH_BODY_SIZE);

impl Patch {
    /// Decode a 340 byte parameter body
    pub fn from_body(body: &[u8]) -> Result<Self, CodecError> {
        let mut cursor = Cursor::new(body);
        Self::read(&mut cursor)
    }

    /// Serialize back to the 340 byte parameter body
    pub fn to_body(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(PATCH_BODY_SIZE);
        self.write(&mut writer);
        writer.into_inner()
    }

    /// Display name, falling back to "Initial Patch" when blank
    pub fn name(&self) -> String {
        let name = String::from_utf8_lossy(&self.patch_name);
        let name = name.trim_matches(|c: char| c.is_whitespace() || c == '\0');
        if name.is_empty() {
            INITIAL_PATCH_NAME.to_string()
        } else {
            name.to_string()
        }
    }

    /// Store `name` in the fixed 16 byte field, space padded and truncated
    pub fn set_name(&mut self, name: &str) {
        let mut field = [b' '; NAME_SIZE];
        for (slot, byte) in field.iter_mut().zip(name.bytes()) {
            *slot = byte;
        }
        self.patch_name = field;
    }

    /// Resolve the display name of a possibly missing slot
    pub fn name_of(patch: Option<&Patch>) -> String {
        patch.map(Patch::name).unwrap_or_else(|| INITIAL_PATCH_NAME.to_string())
    }
}
