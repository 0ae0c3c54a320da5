//! Script encodings the lock reads
//!
//! - The running script, a molecule `Script` table whose args carry the two
//!   32-byte cell references.
//! - Identifier (type) scripts: the canonical TYPE_ID script, whose args are
//!   the 32-byte reference being searched for.

use super::error::{PoaError, PoaResult};

/// Capacity of the buffer the running script is loaded into.
pub const SCRIPT_BUFFER_SIZE: usize = 128;

/// Wire length of a TYPE_ID script with 32-byte args.
pub const TYPE_ID_SCRIPT_SIZE: usize = 85;

/// Everything before the args of a TYPE_ID script.
///
/// Total size 0x55, field offsets 16/48/49, code hash `"TYPE_ID"` right
/// aligned, hash type 1, args length 32.
pub const TYPE_ID_SCRIPT_PREFIX: [u8; 53] = [
    0x55, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x30, 0x00, 0x00, 0x00, 0x31, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x54, 0x59, 0x50, 0x45, 0x5f, 0x49, 0x44,
    0x01, 0x20, 0x00, 0x00, 0x00,
];

/// A 32-byte reference to a TYPE_ID-guarded cell.
pub type CellRef = [u8; 32];

/// Length of the running script's args.
pub const LOCK_ARGS_SIZE: usize = 64;

const SCRIPT_FIELD_COUNT: usize = 3;
const NUMBER_SIZE: usize = 4;

/// The two references carried in the lock args.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockArgs {
    /// Reference of the PoA setup cell
    pub setup_ref: CellRef,
    /// Reference of the round state cell
    pub state_ref: CellRef,
}

impl LockArgs {
    /// Parse the running script and extract its 64-byte args.
    pub fn from_script(script: &[u8]) -> PoaResult<Self> {
        let args = script_args(script)?;
        if args.len() != LOCK_ARGS_SIZE {
            return Err(PoaError::InvalidArgsLength { actual: args.len() });
        }
        let mut setup_ref = [0u8; 32];
        let mut state_ref = [0u8; 32];
        setup_ref.copy_from_slice(&args[..32]);
        state_ref.copy_from_slice(&args[32..]);
        Ok(Self {
            setup_ref,
            state_ref,
        })
    }

    /// Concatenated args bytes.
    pub fn to_bytes(&self) -> [u8; LOCK_ARGS_SIZE] {
        let mut out = [0u8; LOCK_ARGS_SIZE];
        out[..32].copy_from_slice(&self.setup_ref);
        out[32..].copy_from_slice(&self.state_ref);
        out
    }
}

fn read_number(data: &[u8], offset: usize) -> PoaResult<usize> {
    let bytes = data
        .get(offset..offset + NUMBER_SIZE)
        .ok_or(PoaError::MalformedScript)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
}

/// Verify a molecule `Script` table and return the raw args bytes.
///
/// Strict mode: exactly three fields, `code_hash` 32 bytes, `hash_type`
/// 1 byte, `args` a `Bytes` fixvec.
pub fn script_args(script: &[u8]) -> PoaResult<&[u8]> {
    let total_size = read_number(script, 0)?;
    if total_size != script.len() {
        return Err(PoaError::MalformedScript);
    }
    let first_offset = read_number(script, NUMBER_SIZE)?;
    if first_offset != NUMBER_SIZE * (SCRIPT_FIELD_COUNT + 1) {
        return Err(PoaError::MalformedScript);
    }

    let mut offsets = [0usize; SCRIPT_FIELD_COUNT + 1];
    for (i, slot) in offsets.iter_mut().take(SCRIPT_FIELD_COUNT).enumerate() {
        *slot = read_number(script, NUMBER_SIZE * (i + 1))?;
    }
    offsets[SCRIPT_FIELD_COUNT] = total_size;
    if offsets.windows(2).any(|w| w[0] > w[1]) {
        return Err(PoaError::MalformedScript);
    }

    if offsets[1] - offsets[0] != 32 || offsets[2] - offsets[1] != 1 {
        return Err(PoaError::MalformedScript);
    }

    let args = &script[offsets[2]..offsets[3]];
    let item_count = read_number(args, 0)?;
    if args.len() != NUMBER_SIZE + item_count {
        return Err(PoaError::MalformedScript);
    }
    Ok(&args[NUMBER_SIZE..])
}

/// Encode a molecule `Script` table. Used to build fixtures and drafts.
pub fn encode_script(code_hash: &[u8; 32], hash_type: u8, args: &[u8]) -> Vec<u8> {
    let header = NUMBER_SIZE * (SCRIPT_FIELD_COUNT + 1);
    let args_size = NUMBER_SIZE + args.len();
    let total = header + 32 + 1 + args_size;

    let mut out = Vec::with_capacity(total);
    for n in [total, header, header + 32, header + 33] {
        out.extend_from_slice(&(n as u32).to_le_bytes());
    }
    out.extend_from_slice(code_hash);
    out.push(hash_type);
    out.extend_from_slice(&(args.len() as u32).to_le_bytes());
    out.extend_from_slice(args);
    out
}

/// Canonical TYPE_ID script for a reference.
pub fn type_id_script(reference: &CellRef) -> [u8; TYPE_ID_SCRIPT_SIZE] {
    let mut out = [0u8; TYPE_ID_SCRIPT_SIZE];
    out[..TYPE_ID_SCRIPT_PREFIX.len()].copy_from_slice(&TYPE_ID_SCRIPT_PREFIX);
    out[TYPE_ID_SCRIPT_PREFIX.len()..].copy_from_slice(reference);
    out
}

/// Whether a loaded type script is the TYPE_ID script for `reference`.
///
/// `len` is the full length reported by the host, which may exceed the
/// bytes actually held in `script`.
pub fn is_type_id_for(script: &[u8], len: usize, reference: &CellRef) -> bool {
    len == TYPE_ID_SCRIPT_SIZE
        && script.len() >= TYPE_ID_SCRIPT_SIZE
        && script[..TYPE_ID_SCRIPT_PREFIX.len()] == TYPE_ID_SCRIPT_PREFIX
        && script[TYPE_ID_SCRIPT_PREFIX.len()..TYPE_ID_SCRIPT_SIZE] == reference[..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_prefix_matches_encoder() {
        let mut code_hash = [0u8; 32];
        code_hash[25..].copy_from_slice(b"TYPE_ID");
        let encoded = encode_script(&code_hash, 1, &[9u8; 32]);
        assert_eq!(encoded.len(), TYPE_ID_SCRIPT_SIZE);
        assert_eq!(encoded[..53], TYPE_ID_SCRIPT_PREFIX);
        assert_eq!(encoded, type_id_script(&[9u8; 32]).to_vec());
    }

    #[test]
    fn test_lock_args_round_trip() {
        let args = LockArgs {
            setup_ref: [1u8; 32],
            state_ref: [2u8; 32],
        };
        let script = encode_script(&[0xAB; 32], 1, &args.to_bytes());
        assert_eq!(LockArgs::from_script(&script), Ok(args));
    }

    #[test]
    fn test_wrong_args_length() {
        let script = encode_script(&[0xAB; 32], 1, &[0u8; 63]);
        assert_eq!(
            LockArgs::from_script(&script),
            Err(PoaError::InvalidArgsLength { actual: 63 })
        );
    }

    #[test]
    fn test_malformed_scripts() {
        let good = encode_script(&[0xAB; 32], 0, &[0u8; 64]);

        // truncated
        assert_eq!(
            script_args(&good[..good.len() - 1]),
            Err(PoaError::MalformedScript)
        );
        // too short to hold a header
        assert_eq!(script_args(&[0x55, 0x00]), Err(PoaError::MalformedScript));

        // args item count disagrees with field size
        let mut bad = good.clone();
        bad[49] = 10;
        assert_eq!(script_args(&bad), Err(PoaError::MalformedScript));

        // extra field
        let mut bad = good.clone();
        bad[4] = 20;
        assert_eq!(script_args(&bad), Err(PoaError::MalformedScript));

        // decreasing offsets
        let mut bad = good;
        bad[8] = 0x60;
        assert_eq!(script_args(&bad), Err(PoaError::MalformedScript));
    }

    #[test]
    fn test_is_type_id_for() {
        let reference = [5u8; 32];
        let script = type_id_script(&reference);
        assert!(is_type_id_for(&script, 85, &reference));
        assert!(!is_type_id_for(&script, 86, &reference));
        assert!(!is_type_id_for(&script, 85, &[6u8; 32]));

        let mut other_code = script;
        other_code[45] ^= 1;
        assert!(!is_type_id_for(&other_code, 85, &reference));
    }
}
