// Patch dump <-> Patch record
// A patch dump is a flavor prelude followed by the 340 byte parameter body.

use log::{debug, warn};
use model::{Flavor, Patch, PATCH_BODY_SIZE};

use crate::PackError;

/// Decode a patch dump payload (envelope already stripped)
///
/// Returns None when the payload is not a patch of any listed flavor. A
/// patch of the wrong size decodes to the empty patch so the rest of the
/// stream can still be read.
pub fn decode(payload: &[u8], flavors: &[&Flavor]) -> Option<Patch> {
    let flavor = Flavor::find_by_patch_prefix(payload, flavors)?;

    if payload.len() != flavor.sysex_size {
        warn!(
            "Invalid {} patch: {} bytes instead of {}",
            flavor.name,
            payload.len(),
            flavor.sysex_size
        );
        return Some(Patch::default());
    }

    let prelude_len = payload.len() - PATCH_BODY_SIZE;
    if let Some(slot) = prelude_len.checked_sub(2).and_then(|i| payload.get(i)) {
        debug!("Decoding {} patch from slot {}", flavor.name, slot);
    }

    match Patch::from_body(&payload[prelude_len..]) {
        Ok(patch) => Some(patch),
        Err(err) => {
            warn!("Invalid {} patch body: {}", flavor.name, err);
            Some(Patch::default())
        }
    }
}

/// Prelude of a patch dump for `slot`, built fresh on every call
pub fn prelude(flavor: &Flavor, slot: u8) -> Vec<u8> {
    let mut prelude = flavor.sysex_patch_prefix();
    prelude.push(0x01);
    if flavor.extended {
        prelude.extend_from_slice(&[0x7f, 0x7f]);
    }
    prelude.push(slot);
    prelude.push(0x00);
    prelude
}

/// Encode a patch dump payload for `slot`, without the SysEx envelope
pub fn encode(patch: &Patch, flavor: &Flavor, slot: u8) -> Vec<u8> {
    let mut payload = prelude(flavor, slot);
    payload.extend(patch.to_body());
    payload
}

/// Encode a patch dump that can travel as SysEx
///
/// Fails with `InvalidPatch` when any byte has bit 7 set, as such a dump
/// could not be read back.
pub fn encode_sysex(patch: &Patch, flavor: &Flavor, slot: u8) -> Result<Vec<u8>, PackError> {
    let payload = encode(patch, flavor, slot);
    if payload.iter().any(|b| b & 0x80 != 0) {
        return Err(PackError::InvalidPatch(usize::from(slot)));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{Category, CIRCUIT, CIRCUIT_TRACKS, FLAVORS};

    fn named_patch(name: &str) -> Patch {
        let mut patch = Patch::default();
        patch.set_name(name);
        patch.category = Category::Pad;
        patch.filter.frequency = 0x5a;
        patch.macros[3].targets[2].end = 0x7f;
        patch
    }

    #[test]
    fn test_prelude() {
        assert_eq!(
            prelude(&CIRCUIT_TRACKS, 5),
            vec![0x00, 0x20, 0x29, 0x01, 0x64, 0x01, 0x7f, 0x7f, 0x05, 0x00]
        );
        assert_eq!(
            prelude(&CIRCUIT, 5),
            vec![0x00, 0x20, 0x29, 0x01, 0x60, 0x01, 0x05, 0x00]
        );
    }

    #[test]
    fn test_encoded_size_matches_flavor() {
        let patch = named_patch("Pad");
        for flavor in FLAVORS {
            assert_eq!(encode(&patch, flavor, 0).len(), flavor.sysex_size);
        }
    }

    #[test]
    fn test_decode_encoded() {
        let patch = named_patch("Warm Pad");
        for flavor in FLAVORS {
            let payload = encode(&patch, flavor, 12);
            assert_eq!(decode(&payload, &FLAVORS), Some(patch));
        }
    }

    #[test]
    fn test_decode_wrong_size_yields_empty_patch() {
        let mut payload = encode(&named_patch("Warm Pad"), &CIRCUIT_TRACKS, 0);
        payload.pop();
        let patch = decode(&payload, &FLAVORS).unwrap();
        assert_eq!(patch, Patch::default());
        assert_eq!(patch.name(), "Initial Patch");
    }

    #[test]
    fn test_encode_sysex_rejects_high_bytes() {
        let patch = named_patch("Pad");
        assert_eq!(encode_sysex(&patch, &CIRCUIT_TRACKS, 3).unwrap(), encode(&patch, &CIRCUIT_TRACKS, 3));

        let mut accented = Patch::default();
        accented.set_name("Caf\u{e9}");
        assert!(matches!(
            encode_sysex(&accented, &CIRCUIT_TRACKS, 3),
            Err(PackError::InvalidPatch(3))
        ));
    }

    #[test]
    fn test_decode_foreign_message() {
        let payload = [0x00, 0x20, 0x29, 0x00, 0x77];
        assert_eq!(decode(&payload, &FLAVORS), None);
        // Known prefix, but the flavor is not in the table handed in
        let payload = encode(&Patch::default(), &CIRCUIT, 0);
        assert_eq!(decode(&payload, &[&CIRCUIT_TRACKS]), None);
    }
}
