/// Computes a deterministic shard for an input, used to assign subjects to traffic buckets.
///
/// The shard is derived from the first four bytes of the MD5 digest of the input, interpreted as
/// a big-endian `u32`, modulo `total_shards`. This must remain bit-stable across every SDK that
/// implements this scheme.
pub trait Sharder {
    fn get_shard(&self, input: impl AsRef<[u8]>, total_shards: u32) -> u32;
}

/// The standard MD5-based sharder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Sharder;

impl Sharder for Md5Sharder {
    fn get_shard(&self, input: impl AsRef<[u8]>, total_shards: u32) -> u32 {
        get_md5_shard(&[input], total_shards)
    }
}

/// Computes the shard for `input` (given as a slice of byte-slice-like segments, so callers can
/// build a salted key without an intermediate allocation), modulo `total_shards`.
pub fn get_md5_shard(input: &[impl AsRef<[u8]>], total_shards: u32) -> u32 {
    let mut context = md5::Context::new();
    for segment in input {
        context.consume(segment.as_ref());
    }
    let digest = context.compute();
    let int_from_hash = u32::from_be_bytes(digest[0..4].try_into().expect("4 bytes"));
    int_from_hash % total_shards
}

/// Shard for a salted subject key, i.e. `shard(salt + "-" + subject_key, total_shards)`.
pub fn get_salted_shard(salt: &str, subject_key: &str, total_shards: u32) -> u32 {
    get_md5_shard(&[salt, "-", subject_key], total_shards)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_vector() {
        // md5("test-alice")[0..4] as big-endian u32, mod 10000.
        let digest = md5::compute(b"test-alice");
        let expected = u32::from_be_bytes(digest[0..4].try_into().unwrap()) % 10000;
        assert_eq!(get_salted_shard("test", "alice", 10000), expected);
    }

    #[test]
    fn is_deterministic() {
        let a = get_salted_shard("salt", "subject-1", 10000);
        let b = get_salted_shard("salt", "subject-1", 10000);
        assert_eq!(a, b);
    }

    #[test]
    fn differs_across_salts() {
        let a = get_salted_shard("salt-a", "subject-1", 10000);
        let b = get_salted_shard("salt-b", "subject-1", 10000);
        assert_ne!(a, b);
    }
}
