// Only positions are kept, the hierarchy needs nothing else from a mesh.

use std::path::Path;

use na::Point3;

use super::Bounded;
use crate::error::{Error, Result};
use crate::types::Aabb;

#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(vertices: [Point3<f32>; 3]) -> Self {
        Self { vertices }
    }
}

impl Bounded for Triangle {
    fn bbox(&self) -> Aabb {
        let [a, b, c] = &self.vertices;
        let mut aabb = Aabb::new(*a, *b);
        aabb.insert(c);
        aabb
    }
}

pub struct TriMesh {
    positions: (Vec<Point3<f32>>, Vec<u32>),
}

impl TriMesh {
    pub fn new(positions: (Vec<Point3<f32>>, Vec<u32>)) -> Self {
        Self { positions }
    }

    pub fn num_triangles(&self) -> usize {
        self.positions.1.len() / 3
    }

    /// Loads every model of an OBJ file as its own mesh. Faces are
    /// triangulated, materials are ignored.
    pub fn load_as_vec<P: AsRef<Path>>(path: P) -> Result<Vec<Self>> {
        let path = path.as_ref();
        log::debug!("Loading mesh: {}...", path.display());

        let options = tobj::LoadOptions {
            triangulate: true,
            ..Default::default()
        };

        let (models, _) = tobj::load_obj(path, &options).map_err(|source| Error::Mesh {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("Found {} models", models.len());

        let meshes = models
            .into_iter()
            .enumerate()
            .map(|(i, model)| {
                let mesh = model.mesh;
                log::debug!(
                    "Model {} has {} vertices and {} triangles",
                    i,
                    mesh.positions.len() / 3,
                    mesh.indices.len() / 3
                );

                TriMesh::new((
                    mesh.positions
                        .chunks(3)
                        .map(|v| Point3::new(v[0], v[1], v[2]))
                        .collect(),
                    mesh.indices,
                ))
            })
            .collect();

        Ok(meshes)
    }

    pub fn to_triangles(&self) -> Vec<Triangle> {
        let (positions, indices) = &self.positions;

        indices
            .chunks_exact(3)
            .map(|i| {
                Triangle::new([
                    positions[i[0] as usize],
                    positions[i[1] as usize],
                    positions[i[2] as usize],
                ])
            })
            .collect()
    }
}
