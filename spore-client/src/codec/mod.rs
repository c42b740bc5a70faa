//! Spore and Cluster cell data.
//!
//! Both payloads are molecule tables of `Bytes` fields:
//!
//! ```text
//! ClusterData { name: Bytes, description: Bytes }
//! SporeData   { content_type: Bytes, content: Bytes, cluster_id: BytesOpt }
//! ```
//!
//! The types here are owned views over the [`schema`] entities. Decoding
//! verifies in compatible mode so tables with extra trailing fields from
//! newer cell versions still decode.

pub mod schema;

use crate::error::{ClientError, Result};
use molecule::error::VerificationError;
use molecule::prelude::{Builder, Entity, Reader};

fn malformed(entity: &'static str, error: VerificationError) -> ClientError {
    ClientError::decode(entity, error.to_string())
}

/// Decoded `ClusterData` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterData {
    /// Raw name bytes, normally UTF-8.
    pub name: Vec<u8>,
    /// Raw description bytes, normally UTF-8.
    pub description: Vec<u8>,
}

impl ClusterData {
    /// Build cluster data from UTF-8 strings.
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            description: description.as_bytes().to_vec(),
        }
    }

    /// Decode from raw cell data.
    pub fn unpack(data: &[u8]) -> Result<Self> {
        let reader = schema::ClusterDataReader::from_compatible_slice(data)
            .map_err(|e| malformed("ClusterData", e))?;
        Ok(Self {
            name: reader.name().raw_data().to_vec(),
            description: reader.description().raw_data().to_vec(),
        })
    }

    /// The molecule entity for this data.
    pub fn to_molecule(&self) -> schema::ClusterData {
        schema::ClusterData::new_builder()
            .name(self.name.as_slice().into())
            .description(self.description.as_slice().into())
            .build()
    }

    /// Encode into raw cell data.
    pub fn pack(&self) -> Vec<u8> {
        self.to_molecule().as_slice().to_vec()
    }
}

/// Decoded `SporeData` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SporeData {
    /// MIME type of the content, e.g. `image/png`.
    pub content_type: Vec<u8>,
    /// Raw content.
    pub content: Vec<u8>,
    /// Owning cluster id, if any.
    pub cluster_id: Option<Vec<u8>>,
}

impl SporeData {
    /// Decode from raw cell data.
    pub fn unpack(data: &[u8]) -> Result<Self> {
        let reader = schema::SporeDataReader::from_compatible_slice(data)
            .map_err(|e| malformed("SporeData", e))?;
        Ok(Self {
            content_type: reader.content_type().raw_data().to_vec(),
            content: reader.content().raw_data().to_vec(),
            cluster_id: reader
                .cluster_id()
                .to_opt()
                .map(|id| id.raw_data().to_vec()),
        })
    }

    /// The molecule entity for this data.
    pub fn to_molecule(&self) -> schema::SporeData {
        let cluster_id = schema::BytesOpt::new_builder()
            .set(self.cluster_id.as_deref().map(schema::Bytes::from))
            .build();
        schema::SporeData::new_builder()
            .content_type(self.content_type.as_slice().into())
            .content(self.content.as_slice().into())
            .cluster_id(cluster_id)
            .build()
    }

    /// Encode into raw cell data.
    pub fn pack(&self) -> Vec<u8> {
        self.to_molecule().as_slice().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(fields: &[&[u8]]) -> Vec<u8> {
        let header = 4 * (fields.len() + 1);
        let total = header + fields.iter().map(|f| f.len()).sum::<usize>();
        let mut out = (total as u32).to_le_bytes().to_vec();
        let mut offset = header;
        for field in fields {
            out.extend_from_slice(&(offset as u32).to_le_bytes());
            offset += field.len();
        }
        for field in fields {
            out.extend_from_slice(field);
        }
        out
    }

    fn fixvec(bytes: &[u8]) -> Vec<u8> {
        let mut out = (bytes.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(bytes);
        out
    }

    #[test]
    fn cluster_data_roundtrip_utf8() {
        let data = ClusterData::new("Ünïcode 集群", "a description\nwith lines");
        let decoded = ClusterData::unpack(&data.pack()).unwrap();
        assert_eq!(String::from_utf8(decoded.name).unwrap(), "Ünïcode 集群");
        assert_eq!(
            String::from_utf8(decoded.description).unwrap(),
            "a description\nwith lines"
        );
    }

    #[test]
    fn cluster_data_known_layout() {
        let packed = ClusterData::new("a", "").pack();
        assert_eq!(
            packed,
            vec![
                21, 0, 0, 0, // total size
                12, 0, 0, 0, // name offset
                17, 0, 0, 0, // description offset
                1, 0, 0, 0, b'a', // name
                0, 0, 0, 0, // description
            ]
        );
    }

    #[test]
    fn spore_data_without_cluster() {
        let data = SporeData {
            content_type: b"text/plain".to_vec(),
            content: b"hello".to_vec(),
            cluster_id: None,
        };
        let decoded = SporeData::unpack(&data.pack()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn spore_data_with_cluster() {
        let data = SporeData {
            content_type: b"image/png".to_vec(),
            content: vec![0x89, 0x50, 0x4e, 0x47],
            cluster_id: Some(vec![0xaa; 32]),
        };
        assert_eq!(SporeData::unpack(&data.pack()).unwrap(), data);
    }

    #[test]
    fn accepts_extra_trailing_fields() {
        let packed = table(&[&fixvec(b"n"), &fixvec(b"d"), &fixvec(b"extra")]);
        let decoded = ClusterData::unpack(&packed).unwrap();
        assert_eq!(decoded.name, b"n");
        assert_eq!(decoded.description, b"d");
    }

    #[test]
    fn rejects_malformed_data() {
        assert!(ClusterData::unpack(&[]).is_err());
        assert!(ClusterData::unpack(&[4, 0, 0, 0]).is_err());

        let mut packed = ClusterData::new("name", "desc").pack();
        packed.pop();
        assert!(ClusterData::unpack(&packed).is_err());

        let only_name = table(&[&fixvec(b"n")]);
        assert!(ClusterData::unpack(&only_name).is_err());
    }

    #[test]
    fn rejects_bad_fixvec_length() {
        let mut field = fixvec(b"abc");
        field[0] = 9;
        let packed = table(&[&field, &fixvec(b"")]);
        assert!(matches!(
            ClusterData::unpack(&packed),
            Err(ClientError::Decode { .. })
        ));
    }

    #[test]
    fn oversized_first_offset_is_an_error() {
        let data = [12, 0, 0, 0, 0xf0, 0xff, 0xff, 0xff, 0, 0, 0, 0];
        assert!(matches!(
            ClusterData::unpack(&data),
            Err(ClientError::Decode { entity: "ClusterData", .. })
        ));
        assert!(SporeData::unpack(&data).is_err());
    }

    #[test]
    fn first_offset_past_end_is_an_error() {
        // offset points beyond a well-sized slice
        let data = [16, 0, 0, 0, 64, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(ClusterData::unpack(&data).is_err());
    }

    #[test]
    fn spore_data_matches_entity_accessors() {
        let data = SporeData {
            content_type: b"text/plain".to_vec(),
            content: b"hi".to_vec(),
            cluster_id: Some(vec![1; 32]),
        };
        let entity = data.to_molecule();
        assert_eq!(entity.content().raw_data().as_ref(), b"hi");
        assert!(entity.cluster_id().to_opt().is_some());
        assert_eq!(entity.as_slice(), data.pack().as_slice());
    }
}
