//! Fixity signatures: size plus one or more content digests.
//!
//! A `FileSignature` identifies file content independent of path or name.
//! Two signatures match when their sizes agree and every digest algorithm
//! present on both sides produces the same value; a signature carrying a
//! subset of another's algorithms can still match. Because that relation is
//! not transitive, signatures are never used directly as hash-map keys —
//! `SignatureIndex` provides the keyed lookup instead.

use crate::error::{Error, Result};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

/// Checksum algorithms usable in a signature, weakest first.
///
/// The `Ord` derived from declaration order doubles as a strength ranking:
/// index lookups probe the strongest available digest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Md5,
    Sha1,
    Sha256,
}

/// Default enabled algorithm set
pub const DEFAULT_ALGORITHMS: [ChecksumAlgorithm; 3] = [
    ChecksumAlgorithm::Md5,
    ChecksumAlgorithm::Sha1,
    ChecksumAlgorithm::Sha256,
];

impl ChecksumAlgorithm {
    /// String name used in persisted documents and CLI flags
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Md5 => "md5",
            ChecksumAlgorithm::Sha1 => "sha1",
            ChecksumAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "md5" => Ok(ChecksumAlgorithm::Md5),
            "sha1" => Ok(ChecksumAlgorithm::Sha1),
            "sha256" => Ok(ChecksumAlgorithm::Sha256),
            _ => Err(Error::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Immutable fixity fingerprint of a byte stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSignature {
    /// Content length in bytes
    pub size: u64,

    /// Hex-encoded digest per algorithm. Absent algorithms were not computed.
    pub digests: BTreeMap<ChecksumAlgorithm, String>,
}

impl FileSignature {
    /// Construct from a size and digest map
    pub fn new(size: u64, digests: BTreeMap<ChecksumAlgorithm, String>) -> Self {
        Self { size, digests }
    }

    /// Compute a signature for a file in one streaming pass.
    ///
    /// All requested digests are fed from the same 64 KiB read buffer, so
    /// the file is read exactly once regardless of how many algorithms are
    /// enabled.
    pub fn from_file(path: &Path, algorithms: &[ChecksumAlgorithm]) -> Result<Self> {
        if algorithms.is_empty() {
            return Err(Error::EmptyAlgorithmSet);
        }
        if !path.exists() {
            return Err(Error::not_found(path));
        }

        let mut reader = BufReader::new(File::open(path)?);
        let mut buffer = [0u8; 64 * 1024];
        let mut size: u64 = 0;

        let mut md5 = algorithms
            .contains(&ChecksumAlgorithm::Md5)
            .then(Md5::new);
        let mut sha1 = algorithms
            .contains(&ChecksumAlgorithm::Sha1)
            .then(Sha1::new);
        let mut sha256 = algorithms
            .contains(&ChecksumAlgorithm::Sha256)
            .then(Sha256::new);

        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            size += n as u64;
            if let Some(h) = md5.as_mut() {
                h.update(&buffer[..n]);
            }
            if let Some(h) = sha1.as_mut() {
                h.update(&buffer[..n]);
            }
            if let Some(h) = sha256.as_mut() {
                h.update(&buffer[..n]);
            }
        }

        let mut digests = BTreeMap::new();
        if let Some(h) = md5 {
            digests.insert(ChecksumAlgorithm::Md5, hex::encode(h.finalize()));
        }
        if let Some(h) = sha1 {
            digests.insert(ChecksumAlgorithm::Sha1, hex::encode(h.finalize()));
        }
        if let Some(h) = sha256 {
            digests.insert(ChecksumAlgorithm::Sha256, hex::encode(h.finalize()));
        }

        Ok(Self { size, digests })
    }

    /// Fixity equality: sizes agree, every algorithm present on both sides
    /// agrees, and at least one algorithm is shared.
    pub fn matches(&self, other: &FileSignature) -> bool {
        if self.size != other.size {
            return false;
        }
        let mut shared = 0usize;
        for (algorithm, digest) in &self.digests {
            if let Some(other_digest) = other.digests.get(algorithm) {
                if other_digest != digest {
                    return false;
                }
                shared += 1;
            }
        }
        shared > 0
    }

    /// Digest for a specific algorithm, if computed
    pub fn digest(&self, algorithm: ChecksumAlgorithm) -> Option<&str> {
        self.digests.get(&algorithm).map(String::as_str)
    }

    /// Storage blocks consumed at a 1024-byte block size
    pub fn block_count(&self) -> u64 {
        self.size.div_ceil(1024)
    }

    /// True when no digest has been computed; such a signature cannot
    /// participate in equality comparisons.
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Strongest algorithm present, used for display and bag manifests
    pub fn strongest_algorithm(&self) -> Option<ChecksumAlgorithm> {
        self.digests.keys().next_back().copied()
    }
}

impl fmt::Display for FileSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strongest_algorithm() {
            Some(algorithm) => write!(
                f,
                "{} bytes, {}:{}",
                self.size,
                algorithm,
                self.digests[&algorithm]
            ),
            None => write!(f, "{} bytes, no digests", self.size),
        }
    }
}

/// Keyed lookup over a set of signatures.
///
/// Keys are `(algorithm, digest)` pairs, so a probe signature finds its
/// candidates through whichever algorithms it carries; candidates are then
/// confirmed with [`FileSignature::matches`]. This replaces linear scans with
/// an explicit mapping while keeping the subset-digest matching rule intact.
#[derive(Debug, Default, Clone)]
pub struct SignatureIndex {
    signatures: Vec<FileSignature>,
    by_digest: HashMap<(ChecksumAlgorithm, String), Vec<usize>>,
}

impl SignatureIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from an iterator of signatures
    pub fn from_signatures<'a, I>(signatures: I) -> Self
    where
        I: IntoIterator<Item = &'a FileSignature>,
    {
        let mut index = Self::new();
        for signature in signatures {
            index.insert(signature.clone());
        }
        index
    }

    /// Number of indexed signatures
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// True when nothing has been indexed
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Add a signature, returning its slot
    pub fn insert(&mut self, signature: FileSignature) -> usize {
        let slot = self.signatures.len();
        for (algorithm, digest) in &signature.digests {
            self.by_digest
                .entry((*algorithm, digest.clone()))
                .or_default()
                .push(slot);
        }
        self.signatures.push(signature);
        slot
    }

    /// Find the slot of a signature matching the probe, strongest digest first
    pub fn lookup(&self, probe: &FileSignature) -> Option<usize> {
        for (algorithm, digest) in probe.digests.iter().rev() {
            if let Some(slots) = self.by_digest.get(&(*algorithm, digest.clone())) {
                for &slot in slots {
                    if self.signatures[slot].matches(probe) {
                        return Some(slot);
                    }
                }
            }
        }
        None
    }

    /// True iff a matching signature has been indexed
    pub fn contains(&self, probe: &FileSignature) -> bool {
        self.lookup(probe).is_some()
    }

    /// Signature stored at a slot returned by `insert`/`lookup`
    pub fn get(&self, slot: usize) -> Option<&FileSignature> {
        self.signatures.get(slot)
    }
}
