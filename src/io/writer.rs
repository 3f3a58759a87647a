// Writes the self-describing chunked binary scene file: a sequence of
// {name, num_elements, element_size} headers, each immediately
// followed by that many elements' raw bytes.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::BvhError;
use crate::io::chunk::ChunkHeader;

pub struct ChunkWriter {
    out: BufWriter<File>,
}

impl ChunkWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, BvhError> {
        let file = File::create(path)?;
        Ok(ChunkWriter {
            out: BufWriter::new(file),
        })
    }

    pub fn write_chunk<T: bytemuck::Pod>(&mut self, name: &str, elements: &[T]) -> Result<(), BvhError> {
        let header = ChunkHeader::named(name, elements.len() as u32, std::mem::size_of::<T>() as u32);
        self.out.write_all(bytemuck::bytes_of(&header))?;
        self.out.write_all(bytemuck::cast_slice(elements))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), BvhError> {
        self.out.flush()?;
        Ok(())
    }
}
