pub mod chunk;
pub mod reader;
pub mod writer;

use crate::bvh::build::BuildOutput;
use crate::bvh::fit::aabox::AABox;
use crate::bvh::fit::aaellipsoid::AAEllipsoid;
use crate::bvh::flatten::flatten;
use crate::bvh::BoundingVolume;
use crate::error::BvhError;
use crate::geometry::{GeometryStore, TriangleIndex, Vertex};
use crate::io::chunk::*;
use crate::io::reader::{cast_chunk, find_chunk, read_chunks};
use crate::io::writer::ChunkWriter;

// Reads the vertex/triangle/material chunks an external importer
// already wrote, the documented input interface of this crate's CLI.
pub fn read_geometry(path: impl AsRef<std::path::Path>) -> Result<GeometryStore, BvhError> {
    let chunks = read_chunks(path)?;

    let vertex_chunk = find_chunk(&chunks, CHUNK_VERTICES)
        .ok_or_else(|| BvhError::Import("missing 'vertices' chunk".into()))?;
    let triangle_chunk = find_chunk(&chunks, CHUNK_TRIANGLES)
        .ok_or_else(|| BvhError::Import("missing 'triangles' chunk".into()))?;

    let disk_vertices: Vec<DiskVertex> = cast_chunk(vertex_chunk)?;
    let disk_triangles: Vec<DiskTriangle> = cast_chunk(triangle_chunk)?;

    let vertices = disk_vertices
        .into_iter()
        .map(|v| Vertex {
            position: crate::math::vector::Vec3f::new(v.position[0], v.position[1], v.position[2]),
            normal: crate::math::vector::Vec3f::new(v.normal[0], v.normal[1], v.normal[2]),
            texcoord: v.texcoord,
        })
        .collect();
    let triangles = disk_triangles
        .into_iter()
        .map(|t| TriangleIndex {
            vertices: t.vertices,
            material: t.material,
        })
        .collect();

    // `materialref` is optional on read: an importer that never wrote
    // material names still produces a geometry this crate can build over.
    let materials = match find_chunk(&chunks, CHUNK_MATERIALREF) {
        Some(chunk) => {
            let disk_materials: Vec<DiskMaterialRef> = cast_chunk(chunk)?;
            disk_materials.iter().map(DiskMaterialRef::name_str).collect()
        }
        None => Vec::new(),
    };

    Ok(GeometryStore::with_materials(vertices, triangles, materials))
}

fn to_disk_vertices(geometry: &GeometryStore) -> Vec<DiskVertex> {
    geometry
        .vertices()
        .iter()
        .map(|v| DiskVertex {
            position: [v.position.x, v.position.y, v.position.z],
            normal: [v.normal.x, v.normal.y, v.normal.z],
            texcoord: v.texcoord,
        })
        .collect()
}

fn to_disk_triangles(geometry: &GeometryStore) -> Vec<DiskTriangle> {
    geometry
        .triangles()
        .iter()
        .map(|t| DiskTriangle {
            vertices: t.vertices,
            material: t.material,
        })
        .collect()
}

fn to_disk_materials(geometry: &GeometryStore) -> Vec<DiskMaterialRef> {
    geometry.materials().iter().map(|m| DiskMaterialRef::named(m)).collect()
}

fn to_disk_hierarchy_and_leaves(
    flat_nodes: &[crate::bvh::flatten::DiskNode],
    leaves: &crate::memory::pool::LeafPool,
) -> (Vec<DiskNode>, Vec<DiskLeaf>) {
    let nodes = flat_nodes
        .iter()
        .map(|n| DiskNode {
            parent: n.parent,
            first_child: n.first_child,
            escape: n.escape,
        })
        .collect();
    let leaves = leaves
        .leaves()
        .iter()
        .map(|l| {
            let mut triangles = [DiskTriangle {
                vertices: [0; 3],
                material: 0,
            }; NUM_PRIMITIVES];
            for (slot, t) in triangles.iter_mut().zip(l.triangles.iter()) {
                *slot = DiskTriangle {
                    vertices: t.vertices,
                    material: t.material,
                };
            }
            DiskLeaf { triangles }
        })
        .collect();
    (nodes, leaves)
}

// Writes the geometry plus a completed AABox-bounded build to `path`.
pub fn write_aabox_scene(
    path: impl AsRef<std::path::Path>,
    geometry: &GeometryStore,
    build: &BuildOutput<AABox>,
) -> Result<(), BvhError> {
    let (flat_nodes, flat_bounds) = flatten(&build.nodes, build.root);
    let (disk_nodes, disk_leaves) = to_disk_hierarchy_and_leaves(&flat_nodes, &build.leaves);
    let disk_boxes: Vec<DiskAABox> = flat_bounds
        .iter()
        .map(|b| DiskAABox {
            pmin: [b.axis_min(0), b.axis_min(1), b.axis_min(2)],
            pmax: [b.axis_max(0), b.axis_max(1), b.axis_max(2)],
        })
        .collect();

    let mut writer = ChunkWriter::create(path)?;
    writer.write_chunk(CHUNK_VERTICES, &to_disk_vertices(geometry))?;
    writer.write_chunk(CHUNK_TRIANGLES, &to_disk_triangles(geometry))?;
    writer.write_chunk(CHUNK_MATERIALREF, &to_disk_materials(geometry))?;
    writer.write_chunk(CHUNK_HIERARCHY, &disk_nodes)?;
    writer.write_chunk(CHUNK_LEAFNODES, &disk_leaves)?;
    writer.write_chunk(CHUNK_BOUNDING_AABOX, &disk_boxes)?;
    writer.flush()?;
    Ok(())
}

pub fn write_ellipsoid_scene(
    path: impl AsRef<std::path::Path>,
    geometry: &GeometryStore,
    build: &BuildOutput<AAEllipsoid>,
) -> Result<(), BvhError> {
    let (flat_nodes, flat_bounds) = flatten(&build.nodes, build.root);
    let (disk_nodes, disk_leaves) = to_disk_hierarchy_and_leaves(&flat_nodes, &build.leaves);
    let disk_ellipsoids: Vec<DiskEllipsoid> = flat_bounds
        .iter()
        .map(|e| DiskEllipsoid {
            center: [e.center.x, e.center.y, e.center.z],
            radii: [e.radii.x, e.radii.y, e.radii.z],
        })
        .collect();

    let mut writer = ChunkWriter::create(path)?;
    writer.write_chunk(CHUNK_VERTICES, &to_disk_vertices(geometry))?;
    writer.write_chunk(CHUNK_TRIANGLES, &to_disk_triangles(geometry))?;
    writer.write_chunk(CHUNK_MATERIALREF, &to_disk_materials(geometry))?;
    writer.write_chunk(CHUNK_HIERARCHY, &disk_nodes)?;
    writer.write_chunk(CHUNK_LEAFNODES, &disk_leaves)?;
    writer.write_chunk(CHUNK_BOUNDING_ELLIPSOID, &disk_ellipsoids)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::build::kdtree;
    use crate::bvh::fit::AABoxEngine;
    use crate::math::vector::Vec3f;

    fn scratch_path(tag: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("bvhmake_io_test_{}_{}.bim", std::process::id(), tag));
        p
    }

    fn single_triangle() -> GeometryStore {
        GeometryStore::new(
            vec![
                Vertex {
                    position: Vec3f::new(0.0, 0.0, 0.0),
                    normal: Vec3f::new(0.0, 1.0, 0.0),
                    texcoord: [0.0, 0.0],
                },
                Vertex {
                    position: Vec3f::new(1.0, 0.0, 0.0),
                    normal: Vec3f::new(0.0, 1.0, 0.0),
                    texcoord: [1.0, 0.0],
                },
                Vertex {
                    position: Vec3f::new(0.0, 1.0, 0.0),
                    normal: Vec3f::new(0.0, 1.0, 0.0),
                    texcoord: [0.0, 1.0],
                },
            ],
            vec![TriangleIndex {
                vertices: [0, 1, 2],
                material: 0,
            }],
        )
    }

    #[test]
    fn write_then_read_round_trip_preserves_geometry() {
        let geometry = single_triangle();
        let build = kdtree::build(&geometry, &AABoxEngine).unwrap();
        let path = scratch_path("roundtrip");
        write_aabox_scene(&path, &geometry, &build).unwrap();

        let read_back = read_geometry(&path).unwrap();
        assert_eq!(read_back.num_triangles(), geometry.num_triangles());
        assert_eq!(read_back.vertices().len(), geometry.vertices().len());
        for i in 0..geometry.vertices().len() {
            assert_eq!(read_back.vertices()[i], geometry.vertices()[i]);
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn write_then_read_round_trip_preserves_materials() {
        let geometry = GeometryStore::with_materials(
            single_triangle().vertices().to_vec(),
            single_triangle().triangles().to_vec(),
            vec!["glass".to_string(), "chrome".to_string()],
        );
        let build = kdtree::build(&geometry, &AABoxEngine).unwrap();
        let path = scratch_path("materialref");
        write_aabox_scene(&path, &geometry, &build).unwrap();

        let read_back = read_geometry(&path).unwrap();
        assert_eq!(read_back.materials(), geometry.materials());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn write_then_read_round_trip_preserves_hierarchy_leaves_and_bounds() {
        let geometry = grid_geometry_for_hierarchy_test(40);
        let build = kdtree::build(&geometry, &AABoxEngine).unwrap();
        let (expected_nodes, expected_bounds) = crate::bvh::flatten::flatten(&build.nodes, build.root);
        let (_, expected_leaves) = to_disk_hierarchy_and_leaves(&expected_nodes, &build.leaves);
        let expected_disk_bounds: Vec<DiskAABox> = expected_bounds
            .iter()
            .map(|b| DiskAABox {
                pmin: [b.axis_min(0), b.axis_min(1), b.axis_min(2)],
                pmax: [b.axis_max(0), b.axis_max(1), b.axis_max(2)],
            })
            .collect();
        let expected_disk_nodes: Vec<DiskNode> = expected_nodes
            .iter()
            .map(|n| DiskNode {
                parent: n.parent,
                first_child: n.first_child,
                escape: n.escape,
            })
            .collect();

        let path = scratch_path("hierarchy_roundtrip");
        write_aabox_scene(&path, &geometry, &build).unwrap();

        let chunks = read_chunks(&path).unwrap();
        let read_nodes: Vec<DiskNode> = cast_chunk(find_chunk(&chunks, CHUNK_HIERARCHY).unwrap()).unwrap();
        let read_leaves: Vec<DiskLeaf> = cast_chunk(find_chunk(&chunks, CHUNK_LEAFNODES).unwrap()).unwrap();
        let read_bounds: Vec<DiskAABox> =
            cast_chunk(find_chunk(&chunks, CHUNK_BOUNDING_AABOX).unwrap()).unwrap();

        assert_eq!(read_nodes, expected_disk_nodes);
        assert_eq!(read_leaves, expected_leaves);
        assert_eq!(read_bounds, expected_disk_bounds);

        let _ = std::fs::remove_file(&path);
    }

    fn grid_geometry_for_hierarchy_test(n: usize) -> GeometryStore {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        for i in 0..n {
            let x = i as f32;
            vertices.push(Vertex {
                position: Vec3f::new(x, 0.0, 0.0),
                normal: Vec3f::new(0.0, 1.0, 0.0),
                texcoord: [0.0, 0.0],
            });
            vertices.push(Vertex {
                position: Vec3f::new(x + 1.0, 0.0, 0.0),
                normal: Vec3f::new(0.0, 1.0, 0.0),
                texcoord: [0.0, 0.0],
            });
            vertices.push(Vertex {
                position: Vec3f::new(x, 1.0, 0.0),
                normal: Vec3f::new(0.0, 1.0, 0.0),
                texcoord: [0.0, 0.0],
            });
            let base = (i * 3) as u32;
            triangles.push(TriangleIndex {
                vertices: [base, base + 1, base + 2],
                material: 0,
            });
        }
        GeometryStore::new(vertices, triangles)
    }
}
