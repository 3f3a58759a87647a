// Plain-old-data element layouts for each named chunk, matching the
// reference tool's on-disk struct layouts byte for byte. Every element
// type here derives bytemuck's Pod/Zeroable so a chunk body is just
// `bytemuck::cast_slice` over a `Vec<T>` — no manual field-by-field
// packing.
use bytemuck::{Pod, Zeroable};

pub const CHUNK_NAME_LEN: usize = 32;

#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct ChunkHeader {
    pub name: [u8; CHUNK_NAME_LEN],
    pub num_elements: u32,
    pub element_size: u32,
}

impl ChunkHeader {
    pub fn named(name: &str, num_elements: u32, element_size: u32) -> Self {
        ChunkHeader {
            name: encode_name(name),
            num_elements,
            element_size,
        }
    }

    pub fn name_str(&self) -> String {
        decode_name(&self.name)
    }
}

// Shared by chunk names and material names: both are fixed 32-byte,
// NUL-padded fields with the same encoding.
pub fn encode_name(name: &str) -> [u8; CHUNK_NAME_LEN] {
    let mut bytes = [0u8; CHUNK_NAME_LEN];
    let src = name.as_bytes();
    assert!(src.len() < CHUNK_NAME_LEN, "name too long: {}", name);
    bytes[..src.len()].copy_from_slice(src);
    bytes
}

pub fn decode_name(bytes: &[u8; CHUNK_NAME_LEN]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
#[repr(C)]
pub struct DiskVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
}

#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
#[repr(C)]
pub struct DiskTriangle {
    pub vertices: [u32; 3],
    pub material: u32,
}

#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
#[repr(C)]
pub struct DiskMaterialRef {
    pub material: [u8; CHUNK_NAME_LEN],
}

impl DiskMaterialRef {
    pub fn named(name: &str) -> Self {
        DiskMaterialRef {
            material: encode_name(name),
        }
    }

    pub fn name_str(&self) -> String {
        decode_name(&self.material)
    }
}

#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
#[repr(C)]
pub struct DiskNode {
    pub parent: u32,
    pub first_child: u32,
    pub escape: u32,
}

pub const NUM_PRIMITIVES: usize = crate::config::NUM_PRIMITIVES;

#[derive(Clone, Copy, Pod, Zeroable, PartialEq)]
#[repr(C)]
pub struct DiskLeaf {
    pub triangles: [DiskTriangle; NUM_PRIMITIVES],
}

#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
#[repr(C)]
pub struct DiskAABox {
    pub pmin: [f32; 3],
    pub pmax: [f32; 3],
}

#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
#[repr(C)]
pub struct DiskEllipsoid {
    pub center: [f32; 3],
    pub radii: [f32; 3],
}

// Downstream's SGGX approximation pass chunk. Never populated by this
// crate, just reserved so the chunk name and layout live in one place.
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
#[repr(C)]
pub struct DiskSggx {
    pub sigma: [u16; 3],
    pub r: [i16; 3],
}

pub const CHUNK_VERTICES: &str = "vertices";
pub const CHUNK_TRIANGLES: &str = "triangles";
pub const CHUNK_MATERIALREF: &str = "materialref";
pub const CHUNK_HIERARCHY: &str = "hierarchy";
pub const CHUNK_LEAFNODES: &str = "leafnodes";
pub const CHUNK_BOUNDING_AABOX: &str = "bounding_aabox";
pub const CHUNK_BOUNDING_ELLIPSOID: &str = "bounding_ellipsoid";
pub const CHUNK_SGGX: &str = "sggx";
