/*++

Licensed under the Apache-2.0 license.

File Name:

    kip.rs

Abstract:

    File contains the INI1 directory of KIP1 named images.

--*/

use zerocopy::{AsBytes, FromBytes};

use switchboot_error::{SwitchbootError, SwitchbootResult};

/// INI1 directory magic ("INI1")
pub const INI1_MAGIC: u32 = 0x3149_4E49;

/// KIP1 record magic ("KIP1")
pub const KIP1_MAGIC: u32 = 0x3149_504B;

/// KIP1 name field length
pub const KIP1_NAME_LEN: usize = 12;

/// Number of sections in a KIP1 record
pub const KIP1_SECTION_COUNT: usize = 6;

/// INI1 section header.
#[repr(C)]
#[derive(AsBytes, FromBytes, Default, Debug, Clone, Copy)]
pub struct Ini1Header {
    pub magic: u32,
    pub size: u32,
    pub kip_count: u32,
    pub pad: u32,
}

/// One section descriptor of a KIP1 record.
#[repr(C)]
#[derive(AsBytes, FromBytes, Default, Debug, Clone, Copy)]
pub struct Kip1Section {
    pub dst_offset: u32,
    pub dst_size: u32,
    pub compressed_size: u32,
    pub attribute: u32,
}

/// KIP1 record header; section payloads follow back-to-back.
#[repr(C)]
#[derive(AsBytes, FromBytes, Debug, Clone, Copy)]
pub struct Kip1Header {
    pub magic: u32,
    pub name: [u8; KIP1_NAME_LEN],
    pub tid: u64,
    pub process_category: u32,
    pub main_thread_priority: u8,
    pub default_cpu_core: u8,
    pub reserved: u8,
    pub flags: u8,
    pub sections: [Kip1Section; KIP1_SECTION_COUNT],
    pub capabilities: [u32; 0x20],
}

impl Kip1Header {
    /// Total record size: header plus every section payload.
    pub fn record_size(&self) -> usize {
        core::mem::size_of::<Self>()
            + self
                .sections
                .iter()
                .map(|s| s.compressed_size as usize)
                .sum::<usize>()
    }

    /// NUL-trimmed name.
    pub fn name_str(&self) -> String {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(KIP1_NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}

/// Name of a raw KIP1 record.
pub fn kip1_name(record: &[u8]) -> SwitchbootResult<String> {
    let hdr = Kip1Header::read_from_prefix(record).ok_or(SwitchbootError::PKG2_KIP_TRUNCATED)?;
    if hdr.magic != KIP1_MAGIC {
        return Err(SwitchbootError::PKG2_BAD_KIP_MAGIC);
    }
    Ok(hdr.name_str())
}

/// One directory entry: a named image held as its full on-disk record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KipEntry {
    pub name: String,
    pub record: Vec<u8>,
}

/// Ordered directory of the KIP1 records inside an INI1 section.
///
/// Insertion order is on-disk order and is preserved across merge and
/// re-serialization.
#[derive(Debug, Default, Clone)]
pub struct KipDirectory {
    entries: Vec<KipEntry>,
}

impl KipDirectory {
    /// Parse a decrypted INI1 section.
    pub fn parse(ini1: &[u8]) -> SwitchbootResult<Self> {
        let hdr = Ini1Header::read_from_prefix(ini1).ok_or(SwitchbootError::PKG2_TRUNCATED)?;
        if hdr.magic != INI1_MAGIC {
            return Err(SwitchbootError::PKG2_BAD_INI1_MAGIC);
        }

        let mut entries = Vec::with_capacity(hdr.kip_count as usize);
        let mut cursor = core::mem::size_of::<Ini1Header>();
        for _ in 0..hdr.kip_count {
            let kip_hdr = Kip1Header::read_from_prefix(&ini1[cursor.min(ini1.len())..])
                .ok_or(SwitchbootError::PKG2_KIP_TRUNCATED)?;
            if kip_hdr.magic != KIP1_MAGIC {
                return Err(SwitchbootError::PKG2_BAD_KIP_MAGIC);
            }
            let end = cursor
                .checked_add(kip_hdr.record_size())
                .ok_or(SwitchbootError::PKG2_KIP_TRUNCATED)?;
            if end > ini1.len() {
                return Err(SwitchbootError::PKG2_KIP_TRUNCATED);
            }
            entries.push(KipEntry {
                name: kip_hdr.name_str(),
                record: ini1[cursor..end].to_vec(),
            });
            cursor = end;
        }

        Ok(Self { entries })
    }

    /// Insert or replace an image by exact name match. Replacement keeps the
    /// entry's position; a new name appends.
    pub fn merge(&mut self, record: &[u8]) -> SwitchbootResult<()> {
        let name = kip1_name(record)?;
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.record = record.to_vec(),
            None => self.entries.push(KipEntry {
                name,
                record: record.to_vec(),
            }),
        }
        Ok(())
    }

    /// Serialize back into the INI1 section layout.
    pub fn serialize(&self) -> Vec<u8> {
        let body: usize = self.entries.iter().map(|e| e.record.len()).sum();
        let total = core::mem::size_of::<Ini1Header>() + body;
        let hdr = Ini1Header {
            magic: INI1_MAGIC,
            size: total as u32,
            kip_count: self.entries.len() as u32,
            pad: 0,
        };
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(hdr.as_bytes());
        for entry in &self.entries {
            out.extend_from_slice(&entry.record);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KipEntry> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&KipEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn make_kip(name: &str, payload: &[u8]) -> Vec<u8> {
        let mut hdr = Kip1Header {
            magic: KIP1_MAGIC,
            name: [0; KIP1_NAME_LEN],
            tid: 0x0100_0000_0000_1000,
            process_category: 0,
            main_thread_priority: 44,
            default_cpu_core: 0,
            reserved: 0,
            flags: 0,
            sections: [Kip1Section::default(); KIP1_SECTION_COUNT],
            capabilities: [0; 0x20],
        };
        hdr.name[..name.len()].copy_from_slice(name.as_bytes());
        hdr.sections[0].compressed_size = payload.len() as u32;
        hdr.sections[0].dst_size = payload.len() as u32;
        let mut record = hdr.as_bytes().to_vec();
        record.extend_from_slice(payload);
        record
    }

    fn make_ini1(kips: &[Vec<u8>]) -> Vec<u8> {
        let mut dir = KipDirectory::default();
        for kip in kips {
            dir.merge(kip).unwrap();
        }
        dir.serialize()
    }

    #[test]
    fn test_header_layout() {
        assert_eq!(core::mem::size_of::<Ini1Header>(), 0x10);
        assert_eq!(core::mem::size_of::<Kip1Header>(), 0x100);
    }

    #[test]
    fn test_parse_preserves_order() {
        let ini1 = make_ini1(&[make_kip("sm", b"aaaa"), make_kip("boot", b"bb")]);
        let dir = KipDirectory::parse(&ini1).unwrap();
        let names: Vec<_> = dir.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["sm", "boot"]);
    }

    #[test]
    fn test_merge_replaces_by_name() {
        let ini1 = make_ini1(&[make_kip("sm", b"aaaa"), make_kip("boot", b"bb")]);
        let mut dir = KipDirectory::parse(&ini1).unwrap();
        dir.merge(&make_kip("sm", b"xxxxxxxx")).unwrap();
        assert_eq!(dir.len(), 2);
        let names: Vec<_> = dir.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["sm", "boot"]);
        assert_eq!(dir.get("sm").unwrap().record, make_kip("sm", b"xxxxxxxx"));
    }

    #[test]
    fn test_merge_appends_new_name() {
        let ini1 = make_ini1(&[make_kip("sm", b"aaaa")]);
        let mut dir = KipDirectory::parse(&ini1).unwrap();
        dir.merge(&make_kip("loader", b"cc")).unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.iter().last().unwrap().name, "loader");
    }

    #[test]
    fn test_serialize_round_trip() {
        let ini1 = make_ini1(&[make_kip("sm", b"aaaa"), make_kip("boot", b"bb")]);
        let dir = KipDirectory::parse(&ini1).unwrap();
        assert_eq!(dir.serialize(), ini1);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut ini1 = make_ini1(&[make_kip("sm", b"aaaa")]);
        ini1[0] ^= 0xFF;
        assert_eq!(
            KipDirectory::parse(&ini1).err(),
            Some(SwitchbootError::PKG2_BAD_INI1_MAGIC)
        );
    }

    #[test]
    fn test_truncated_kip_rejected() {
        let ini1 = make_ini1(&[make_kip("sm", b"aaaa")]);
        assert_eq!(
            KipDirectory::parse(&ini1[..ini1.len() - 1]).err(),
            Some(SwitchbootError::PKG2_KIP_TRUNCATED)
        );
    }
}
