// Reads back a chunked scene file. This crate owns this reader so the
// CLI has something concrete to open: the triangle/material importer
// itself is out of scope, so the CLI's input is a scene file an
// external importer already wrote the `vertices`/`triangles`/
// `materialref` chunks into.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::BvhError;
use crate::io::chunk::ChunkHeader;

pub struct Chunk {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub fn read_chunks(path: impl AsRef<Path>) -> Result<Vec<Chunk>, BvhError> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| {
        BvhError::Import(format!("failed to open scene file '{}': {}", path.display(), e))
    })?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    let header_size = std::mem::size_of::<ChunkHeader>();
    let mut chunks = Vec::new();
    let mut offset = 0usize;
    while offset < data.len() {
        if offset + header_size > data.len() {
            return Err(BvhError::Import("truncated chunk header".into()));
        }
        let header: ChunkHeader = *bytemuck::from_bytes(&data[offset..offset + header_size]);
        offset += header_size;

        let body_len = header.num_elements as usize * header.element_size as usize;
        if offset + body_len > data.len() {
            return Err(BvhError::Import(format!(
                "truncated chunk body for '{}'",
                header.name_str()
            )));
        }
        chunks.push(Chunk {
            name: header.name_str(),
            bytes: data[offset..offset + body_len].to_vec(),
        });
        offset += body_len;
    }
    Ok(chunks)
}

pub fn find_chunk<'a>(chunks: &'a [Chunk], name: &str) -> Option<&'a Chunk> {
    chunks.iter().find(|c| c.name == name)
}

pub fn cast_chunk<T: bytemuck::Pod>(chunk: &Chunk) -> Result<Vec<T>, BvhError> {
    let size = std::mem::size_of::<T>();
    if size == 0 || chunk.bytes.len() % size != 0 {
        return Err(BvhError::Import(format!(
            "chunk '{}' size {} not a multiple of element size {}",
            chunk.name,
            chunk.bytes.len(),
            size
        )));
    }
    Ok(bytemuck::cast_slice(&chunk.bytes).to_vec())
}
