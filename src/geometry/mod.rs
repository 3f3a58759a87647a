// The input contract: an immutable vertex array, an immutable triangle
// array, and an opaque material reference per triangle. This crate
// never mutates geometry; it only reads centroids and vertex positions
// while building the hierarchy over them.
use crate::math::vector::Vec3f;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3f,
    pub normal: Vec3f,
    pub texcoord: [f32; 2],
}

// Sentinel: a triangle index triple with every index set to u32::MAX.
// Written into the tail of an under-full leaf slot.
pub const INVALID_VERTEX_INDEX: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriangleIndex {
    pub vertices: [u32; 3],
    pub material: u32,
}

impl TriangleIndex {
    pub const INVALID: TriangleIndex = TriangleIndex {
        vertices: [INVALID_VERTEX_INDEX; 3],
        material: INVALID_VERTEX_INDEX,
    };

    // A triangle is valid iff its first two vertex indices differ. The
    // all-equal case (including INVALID) is the only legal way for the
    // first two to coincide; anything else would be a degenerate
    // triangle from a bad importer.
    pub fn is_valid(&self) -> bool {
        self.vertices[0] != self.vertices[1]
    }
}

pub struct GeometryStore {
    vertices: Vec<Vertex>,
    triangles: Vec<TriangleIndex>,
    centroids: Vec<Vec3f>,
    materials: Vec<String>,
}

impl GeometryStore {
    pub fn new(vertices: Vec<Vertex>, triangles: Vec<TriangleIndex>) -> Self {
        Self::with_materials(vertices, triangles, Vec::new())
    }

    // `materials[i]` is the name a `TriangleIndex::material` value of `i`
    // refers to (array: materialref). An empty list is legal: a scene
    // file an importer didn't annotate with material names still has
    // valid geometry, just no names to look the indices up against.
    pub fn with_materials(
        vertices: Vec<Vertex>,
        triangles: Vec<TriangleIndex>,
        materials: Vec<String>,
    ) -> Self {
        let centroids = triangles
            .iter()
            .map(|t| {
                let a = vertices[t.vertices[0] as usize].position;
                let b = vertices[t.vertices[1] as usize].position;
                let c = vertices[t.vertices[2] as usize].position;
                (a + b + c).scale(1.0 / 3.0)
            })
            .collect();
        GeometryStore {
            vertices,
            triangles,
            centroids,
            materials,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[TriangleIndex] {
        &self.triangles
    }

    pub fn materials(&self) -> &[String] {
        &self.materials
    }

    pub fn num_triangles(&self) -> u32 {
        self.triangles.len() as u32
    }

    pub fn triangle(&self, i: u32) -> TriangleIndex {
        self.triangles[i as usize]
    }

    pub fn centroid(&self, i: u32) -> Vec3f {
        self.centroids[i as usize]
    }

    pub fn triangle_vertices(&self, i: u32) -> [Vec3f; 3] {
        let t = self.triangles[i as usize];
        [
            self.vertices[t.vertices[0] as usize].position,
            self.vertices[t.vertices[1] as usize].position,
            self.vertices[t.vertices[2] as usize].position,
        ]
    }
}
