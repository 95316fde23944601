//! Schema versions and the write-side version configuration.
//!
//! Every record begins with a 2-byte version tag. Each record family has a
//! closed set of supported versions; decoding dispatches on the tag and an
//! unrecognized tag is an [`FormatError::UnknownFormatVersion`], distinct
//! from corruption. The version a writer emits is carried in an immutable
//! [`WriteConfig`] threaded into every encode call, so concurrent writers
//! targeting different versions never share mutable state.

use crate::error::FormatError;

/// Schema versions of the blob properties record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertiesVersion {
    /// ttl, privacy flag, creation time, size and the three string fields.
    V1,
    /// Adds account and container ids.
    V2,
    /// Adds the encryption flag.
    #[default]
    V3,
}

impl PropertiesVersion {
    /// Returns the wire tag for this version.
    #[must_use]
    pub const fn tag(self) -> u16 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }
}

impl TryFrom<u16> for PropertiesVersion {
    type Error = FormatError;

    fn try_from(tag: u16) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            other => Err(FormatError::unknown_version("blob properties", other)),
        }
    }
}

/// Schema versions of the message header record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderVersion {
    /// Properties, user metadata and blob offsets only.
    V1,
    /// Adds the blob encryption key offset slot.
    #[default]
    V2,
}

impl HeaderVersion {
    /// Returns the wire tag for this version.
    #[must_use]
    pub const fn tag(self) -> u16 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }
}

impl TryFrom<u16> for HeaderVersion {
    type Error = FormatError;

    fn try_from(tag: u16) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(FormatError::unknown_version("message header", other)),
        }
    }
}

/// Schema versions of the blob content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlobVersion {
    /// Size and raw payload; every blob is a data blob.
    V1,
    /// Adds the blob type discriminator for composite blobs.
    #[default]
    V2,
}

impl BlobVersion {
    /// Returns the wire tag for this version.
    #[must_use]
    pub const fn tag(self) -> u16 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }
}

impl TryFrom<u16> for BlobVersion {
    type Error = FormatError;

    fn try_from(tag: u16) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(FormatError::unknown_version("blob content", other)),
        }
    }
}

/// Schema versions of the delete (tombstone) record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteVersion {
    /// Legacy layout with no room for account, container or deletion time.
    V1,
    /// Carries account id, container id and deletion time.
    #[default]
    V2,
}

impl DeleteVersion {
    /// Returns the wire tag for this version.
    #[must_use]
    pub const fn tag(self) -> u16 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }
}

impl TryFrom<u16> for DeleteVersion {
    type Error = FormatError;

    fn try_from(tag: u16) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(FormatError::unknown_version("delete record", other)),
        }
    }
}

/// The active write versions, one slot per record family.
///
/// Immutable by construction: build one per writer (or per call) instead of
/// mutating a process-wide default. [`WriteConfig::default`] selects the
/// newest version of every family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteConfig {
    /// Version emitted for blob properties records.
    pub properties: PropertiesVersion,
    /// Version emitted for message headers.
    pub header: HeaderVersion,
    /// Version emitted for blob content records.
    pub blob: BlobVersion,
    /// Version emitted for delete records.
    pub delete: DeleteVersion,
}

impl WriteConfig {
    /// Configuration writing the newest version of every record family.
    #[must_use]
    pub fn latest() -> Self {
        Self::default()
    }
}
