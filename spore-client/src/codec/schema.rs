//! Molecule entities for the Spore cell schemas.
//!
//! ```text
//! vector Bytes <byte>;
//! option BytesOpt (Bytes);
//!
//! table ClusterData {
//!     name: Bytes,
//!     description: Bytes,
//! }
//!
//! table SporeData {
//!     content_type: Bytes,
//!     content: Bytes,
//!     cluster_id: BytesOpt,
//! }
//! ```
//!
//! Each type comes as an owned entity, a borrowing reader, and a builder.
//! Accessors assume the slice has been verified; go through
//! `Reader::from_slice` / `from_compatible_slice` for untrusted data.

use molecule::bytes::Bytes as Raw;
use molecule::error::{VerificationError, VerificationResult};
use molecule::prelude::{Builder, Entity, Reader};
use molecule::{NUMBER_SIZE, hex_string, pack_number, unpack_number};
use std::fmt;

macro_rules! entity {
    ($entity:ident, $reader:ident, $builder:ident, $default:expr) => {
        #[derive(Clone)]
        pub struct $entity(Raw);

        #[derive(Clone, Copy)]
        pub struct $reader<'r>(&'r [u8]);

        impl fmt::Debug for $entity {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(0x{})", <Self as Entity>::NAME, hex_string(self.as_slice()))
            }
        }

        impl fmt::Display for $entity {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }

        impl<'r> fmt::Debug for $reader<'r> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(0x{})", <Self as Reader<'r>>::NAME, hex_string(self.0))
            }
        }

        impl<'r> fmt::Display for $reader<'r> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }

        impl Default for $entity {
            fn default() -> Self {
                Self::new_unchecked(Raw::from_static(&$default))
            }
        }

        impl $entity {
            pub fn as_reader(&self) -> $reader<'_> {
                $reader::new_unchecked(self.as_slice())
            }
        }

        impl Entity for $entity {
            type Builder = $builder;
            const NAME: &'static str = stringify!($entity);

            fn new_unchecked(data: Raw) -> Self {
                $entity(data)
            }

            fn as_bytes(&self) -> Raw {
                self.0.clone()
            }

            fn as_slice(&self) -> &[u8] {
                &self.0[..]
            }

            fn from_slice(slice: &[u8]) -> VerificationResult<Self> {
                $reader::from_slice(slice).map(|reader| reader.to_entity())
            }

            fn from_compatible_slice(slice: &[u8]) -> VerificationResult<Self> {
                $reader::from_compatible_slice(slice).map(|reader| reader.to_entity())
            }

            fn new_builder() -> Self::Builder {
                $builder::default()
            }

            fn as_builder(self) -> Self::Builder {
                self.to_builder()
            }
        }

        impl<'r> Reader<'r> for $reader<'r> {
            type Entity = $entity;
            const NAME: &'static str = concat!(stringify!($entity), "Reader");

            fn to_entity(&self) -> Self::Entity {
                $entity::new_unchecked(Raw::copy_from_slice(self.0))
            }

            fn new_unchecked(slice: &'r [u8]) -> Self {
                $reader(slice)
            }

            fn as_slice(&self) -> &'r [u8] {
                self.0
            }

            fn verify(slice: &[u8], compatible: bool) -> VerificationResult<()> {
                Self::check(slice, compatible)
            }
        }

        impl Builder for $builder {
            type Entity = $entity;
            const NAME: &'static str = concat!(stringify!($entity), "Builder");

            fn expected_length(&self) -> usize {
                self.encoded_len()
            }

            fn write<W: molecule::io::Write>(&self, writer: &mut W) -> molecule::io::Result<()> {
                let mut out = Vec::with_capacity(self.encoded_len());
                self.encode(&mut out);
                writer.write_all(&out)
            }

            fn build(&self) -> Self::Entity {
                let mut out = Vec::with_capacity(self.encoded_len());
                self.encode(&mut out);
                $entity::new_unchecked(Raw::from(out))
            }
        }
    };
}

entity!(Bytes, BytesReader, BytesBuilder, [0u8, 0, 0, 0]);
entity!(BytesOpt, BytesOptReader, BytesOptBuilder, [0u8; 0]);
entity!(
    ClusterData,
    ClusterDataReader,
    ClusterDataBuilder,
    [20u8, 0, 0, 0, 12, 0, 0, 0, 16, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
);
entity!(
    SporeData,
    SporeDataReader,
    SporeDataBuilder,
    [24u8, 0, 0, 0, 16, 0, 0, 0, 20, 0, 0, 0, 24, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
);

// Bytes

impl Bytes {
    /// The payload without its length header.
    pub fn raw_data(&self) -> Raw {
        self.0.slice(NUMBER_SIZE..)
    }

    fn to_builder(&self) -> BytesBuilder {
        BytesBuilder(self.as_reader().raw_data().to_vec())
    }
}

impl From<&[u8]> for Bytes {
    fn from(value: &[u8]) -> Self {
        BytesBuilder::default().set(value.to_vec()).build()
    }
}

impl<'r> BytesReader<'r> {
    /// The payload without its length header.
    pub fn raw_data(&self) -> &'r [u8] {
        &self.0[NUMBER_SIZE..]
    }

    fn check(slice: &[u8], _compatible: bool) -> VerificationResult<()> {
        let name = <Self as Reader<'r>>::NAME;
        let slice_len = slice.len();
        if slice_len < NUMBER_SIZE {
            return Err(VerificationError::HeaderIsBroken(
                name.to_owned(),
                NUMBER_SIZE,
                slice_len,
            ));
        }
        let total_size = NUMBER_SIZE + unpack_number(slice) as usize;
        if slice_len != total_size {
            return Err(VerificationError::TotalSizeNotMatch(
                name.to_owned(),
                total_size,
                slice_len,
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct BytesBuilder(Vec<u8>);

impl BytesBuilder {
    pub fn set(mut self, value: Vec<u8>) -> Self {
        self.0 = value;
        self
    }

    fn encoded_len(&self) -> usize {
        NUMBER_SIZE + self.0.len()
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&pack_number(self.0.len() as u32));
        out.extend_from_slice(&self.0);
    }
}

// BytesOpt

impl BytesOpt {
    pub fn to_opt(&self) -> Option<Bytes> {
        (!self.0.is_empty()).then(|| Bytes::new_unchecked(self.0.clone()))
    }

    fn to_builder(&self) -> BytesOptBuilder {
        BytesOptBuilder(self.to_opt())
    }
}

impl<'r> BytesOptReader<'r> {
    pub fn to_opt(&self) -> Option<BytesReader<'r>> {
        (!self.0.is_empty()).then(|| BytesReader::new_unchecked(self.0))
    }

    fn check(slice: &[u8], compatible: bool) -> VerificationResult<()> {
        if slice.is_empty() {
            Ok(())
        } else {
            BytesReader::verify(slice, compatible)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BytesOptBuilder(Option<Bytes>);

impl BytesOptBuilder {
    pub fn set(mut self, value: Option<Bytes>) -> Self {
        self.0 = value;
        self
    }

    fn encoded_len(&self) -> usize {
        self.0.as_ref().map_or(0, |bytes| bytes.as_slice().len())
    }

    fn encode(&self, out: &mut Vec<u8>) {
        if let Some(bytes) = &self.0 {
            out.extend_from_slice(bytes.as_slice());
        }
    }
}

// Tables

/// Verify a table header and split out its first `expected` field bodies.
///
/// Extra trailing fields are accepted only in compatible mode.
fn verify_table<'a>(
    name: &str,
    slice: &'a [u8],
    expected: usize,
    compatible: bool,
) -> VerificationResult<Vec<&'a [u8]>> {
    let slice_len = slice.len();
    if slice_len < NUMBER_SIZE {
        return Err(VerificationError::HeaderIsBroken(
            name.to_owned(),
            NUMBER_SIZE,
            slice_len,
        ));
    }
    let total_size = unpack_number(slice) as usize;
    if slice_len != total_size {
        return Err(VerificationError::TotalSizeNotMatch(
            name.to_owned(),
            total_size,
            slice_len,
        ));
    }
    if slice_len < NUMBER_SIZE * 2 {
        return Err(VerificationError::HeaderIsBroken(
            name.to_owned(),
            NUMBER_SIZE * 2,
            slice_len,
        ));
    }

    let offset_first = unpack_number(&slice[NUMBER_SIZE..]) as usize;
    if offset_first % NUMBER_SIZE != 0 || offset_first < NUMBER_SIZE * 2 {
        return Err(VerificationError::OffsetsNotMatch(name.to_owned()));
    }
    if slice_len < offset_first {
        return Err(VerificationError::HeaderIsBroken(
            name.to_owned(),
            offset_first,
            slice_len,
        ));
    }

    let field_count = offset_first / NUMBER_SIZE - 1;
    if field_count < expected || (!compatible && field_count > expected) {
        return Err(VerificationError::FieldCountNotMatch(
            name.to_owned(),
            expected,
            field_count,
        ));
    }

    // bounded by the slice, not by the header
    let mut offsets: Vec<usize> = slice[NUMBER_SIZE..offset_first]
        .chunks_exact(NUMBER_SIZE)
        .map(|number| unpack_number(number) as usize)
        .collect();
    offsets.push(total_size);
    if offsets.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(VerificationError::OffsetsNotMatch(name.to_owned()));
    }

    Ok(offsets
        .windows(2)
        .take(expected)
        .map(|pair| &slice[pair[0]..pair[1]])
        .collect())
}

/// Start and end of field `index` in a verified table.
fn field_range(slice: &[u8], index: usize) -> (usize, usize) {
    let field_count = unpack_number(&slice[NUMBER_SIZE..]) as usize / NUMBER_SIZE - 1;
    let start = unpack_number(&slice[NUMBER_SIZE * (index + 1)..]) as usize;
    let end = if index + 1 < field_count {
        unpack_number(&slice[NUMBER_SIZE * (index + 2)..]) as usize
    } else {
        slice.len()
    };
    (start, end)
}

fn table_len(fields: &[usize]) -> usize {
    NUMBER_SIZE * (fields.len() + 1) + fields.iter().sum::<usize>()
}

fn write_table(out: &mut Vec<u8>, fields: &[&[u8]]) {
    let header = NUMBER_SIZE * (fields.len() + 1);
    let total = header + fields.iter().map(|field| field.len()).sum::<usize>();

    out.extend_from_slice(&pack_number(total as u32));
    let mut offset = header;
    for field in fields {
        out.extend_from_slice(&pack_number(offset as u32));
        offset += field.len();
    }
    for field in fields {
        out.extend_from_slice(field);
    }
}

// ClusterData

impl ClusterData {
    pub fn name(&self) -> Bytes {
        let (start, end) = field_range(self.as_slice(), 0);
        Bytes::new_unchecked(self.0.slice(start..end))
    }

    pub fn description(&self) -> Bytes {
        let (start, end) = field_range(self.as_slice(), 1);
        Bytes::new_unchecked(self.0.slice(start..end))
    }

    fn to_builder(&self) -> ClusterDataBuilder {
        ClusterDataBuilder::default()
            .name(self.name())
            .description(self.description())
    }
}

impl<'r> ClusterDataReader<'r> {
    pub fn name(&self) -> BytesReader<'r> {
        let (start, end) = field_range(self.0, 0);
        BytesReader::new_unchecked(&self.0[start..end])
    }

    pub fn description(&self) -> BytesReader<'r> {
        let (start, end) = field_range(self.0, 1);
        BytesReader::new_unchecked(&self.0[start..end])
    }

    fn check(slice: &[u8], compatible: bool) -> VerificationResult<()> {
        let fields = verify_table(<Self as Reader<'r>>::NAME, slice, 2, compatible)?;
        BytesReader::verify(fields[0], compatible)?;
        BytesReader::verify(fields[1], compatible)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClusterDataBuilder {
    name: Bytes,
    description: Bytes,
}

impl ClusterDataBuilder {
    pub fn name(mut self, value: Bytes) -> Self {
        self.name = value;
        self
    }

    pub fn description(mut self, value: Bytes) -> Self {
        self.description = value;
        self
    }

    fn encoded_len(&self) -> usize {
        table_len(&[self.name.as_slice().len(), self.description.as_slice().len()])
    }

    fn encode(&self, out: &mut Vec<u8>) {
        write_table(out, &[self.name.as_slice(), self.description.as_slice()]);
    }
}

// SporeData

impl SporeData {
    pub fn content_type(&self) -> Bytes {
        let (start, end) = field_range(self.as_slice(), 0);
        Bytes::new_unchecked(self.0.slice(start..end))
    }

    pub fn content(&self) -> Bytes {
        let (start, end) = field_range(self.as_slice(), 1);
        Bytes::new_unchecked(self.0.slice(start..end))
    }

    pub fn cluster_id(&self) -> BytesOpt {
        let (start, end) = field_range(self.as_slice(), 2);
        BytesOpt::new_unchecked(self.0.slice(start..end))
    }

    fn to_builder(&self) -> SporeDataBuilder {
        SporeDataBuilder::default()
            .content_type(self.content_type())
            .content(self.content())
            .cluster_id(self.cluster_id())
    }
}

impl<'r> SporeDataReader<'r> {
    pub fn content_type(&self) -> BytesReader<'r> {
        let (start, end) = field_range(self.0, 0);
        BytesReader::new_unchecked(&self.0[start..end])
    }

    pub fn content(&self) -> BytesReader<'r> {
        let (start, end) = field_range(self.0, 1);
        BytesReader::new_unchecked(&self.0[start..end])
    }

    pub fn cluster_id(&self) -> BytesOptReader<'r> {
        let (start, end) = field_range(self.0, 2);
        BytesOptReader::new_unchecked(&self.0[start..end])
    }

    fn check(slice: &[u8], compatible: bool) -> VerificationResult<()> {
        let fields = verify_table(<Self as Reader<'r>>::NAME, slice, 3, compatible)?;
        BytesReader::verify(fields[0], compatible)?;
        BytesReader::verify(fields[1], compatible)?;
        BytesOptReader::verify(fields[2], compatible)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SporeDataBuilder {
    content_type: Bytes,
    content: Bytes,
    cluster_id: BytesOpt,
}

impl SporeDataBuilder {
    pub fn content_type(mut self, value: Bytes) -> Self {
        self.content_type = value;
        self
    }

    pub fn content(mut self, value: Bytes) -> Self {
        self.content = value;
        self
    }

    pub fn cluster_id(mut self, value: BytesOpt) -> Self {
        self.cluster_id = value;
        self
    }

    fn encoded_len(&self) -> usize {
        table_len(&[
            self.content_type.as_slice().len(),
            self.content.as_slice().len(),
            self.cluster_id.as_slice().len(),
        ])
    }

    fn encode(&self, out: &mut Vec<u8>) {
        write_table(
            out,
            &[
                self.content_type.as_slice(),
                self.content.as_slice(),
                self.cluster_id.as_slice(),
            ],
        );
    }
}
