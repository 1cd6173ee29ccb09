use std::borrow::Cow;

use glam::{Vec2, Vec3, Vec4};

/// Triangle-list geometry in object space.
///
/// Only positions are required; everything else is derived when missing (see
/// [`Mesh::resolve()`]), without ever touching the mesh itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    normals: Option<Vec<Vec3>>,
    uvs: Option<Vec<Vec2>>,
    tangents: Option<Vec<Vec4>>,
    indices: Option<Vec<u32>>,
    groups: Vec<MeshGroup>,
}

/// Range of indices drawn with a single material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshGroup {
    /// First index (not triangle) of this group
    pub start: u32,

    /// Number of indices (not triangles) in this group
    pub count: u32,

    /// Which of drawable's materials to use; when missing, the group's own
    /// position within the mesh is used instead
    pub material_index: Option<u32>,
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Sets tangents (xyz) together with their handedness (w).
    pub fn with_tangents(mut self, tangents: Vec<Vec4>) -> Self {
        self.tangents = Some(tangents);
        self
    }

    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn with_group(mut self, group: MeshGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    pub fn uvs(&self) -> Option<&[Vec2]> {
        self.uvs.as_deref()
    }

    pub fn tangents(&self) -> Option<&[Vec4]> {
        self.tangents.as_deref()
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn groups(&self) -> &[MeshGroup] {
        &self.groups
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns this mesh with all of its optional attributes filled in:
    ///
    /// - missing indices become `0..vertex_count`,
    /// - missing normals are computed by accumulating face normals,
    /// - missing UVs are all zeros,
    /// - missing tangents are computed from UVs and normals,
    /// - missing groups become a single group spanning all indices.
    ///
    /// Attributes whose length doesn't match the number of vertices are
    /// treated as missing.
    pub fn resolve(&self) -> ResolvedMesh<'_> {
        let vertex_count = self.vertex_count();

        let indices = match &self.indices {
            Some(indices) => Cow::Borrowed(indices.as_slice()),
            None => Cow::Owned((0..vertex_count as u32).collect()),
        };

        let normals = match self.attribute("normals", self.normals.as_deref()) {
            Some(normals) => Cow::Borrowed(normals),
            None => Cow::Owned(compute_normals(&self.positions, &indices)),
        };

        let uvs = match self.attribute("uvs", self.uvs.as_deref()) {
            Some(uvs) => Cow::Borrowed(uvs),
            None => Cow::Owned(vec![Vec2::ZERO; vertex_count]),
        };

        let tangents = match self.attribute("tangents", self.tangents.as_deref())
        {
            Some(tangents) => Cow::Borrowed(tangents),
            None => Cow::Owned(compute_tangents(
                &self.positions,
                &normals,
                &uvs,
                &indices,
            )),
        };

        let groups = if self.groups.is_empty() {
            Cow::Owned(vec![MeshGroup {
                start: 0,
                count: indices.len() as u32,
                material_index: Some(0),
            }])
        } else {
            Cow::Borrowed(self.groups.as_slice())
        };

        ResolvedMesh {
            positions: &self.positions,
            normals,
            uvs,
            tangents,
            indices,
            groups,
        }
    }

    fn attribute<'a, T>(
        &self,
        name: &str,
        values: Option<&'a [T]>,
    ) -> Option<&'a [T]> {
        let values = values?;

        if values.len() == self.vertex_count() {
            Some(values)
        } else {
            log::warn!(
                "Mesh has {} {name} for {} vertices; recomputing them",
                values.len(),
                self.vertex_count(),
            );

            None
        }
    }
}

/// Mesh with all of its attributes present.
#[derive(Clone, Debug)]
pub struct ResolvedMesh<'a> {
    pub positions: &'a [Vec3],
    pub normals: Cow<'a, [Vec3]>,
    pub uvs: Cow<'a, [Vec2]>,
    pub tangents: Cow<'a, [Vec4]>,
    pub indices: Cow<'a, [u32]>,
    pub groups: Cow<'a, [MeshGroup]>,
}

/// Yields vertex indices of triangles that don't reach out of the mesh.
fn triangles<'a>(
    indices: &'a [u32],
    vertex_count: usize,
) -> impl Iterator<Item = [usize; 3]> + 'a {
    indices.chunks_exact(3).filter_map(move |tri| {
        let tri = [tri[0] as usize, tri[1] as usize, tri[2] as usize];

        tri.iter().all(|&idx| idx < vertex_count).then_some(tri)
    })
}

fn compute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for [a, b, c] in triangles(indices, positions.len()) {
        let pa = positions[a];
        let pb = positions[b];
        let pc = positions[c];

        // Not normalized, so that larger faces weigh more
        let normal = (pc - pb).cross(pa - pb);

        normals[a] += normal;
        normals[b] += normal;
        normals[c] += normal;
    }

    for normal in &mut normals {
        *normal = normal.normalize_or_zero();
    }

    normals
}

fn compute_tangents(
    positions: &[Vec3],
    normals: &[Vec3],
    uvs: &[Vec2],
    indices: &[u32],
) -> Vec<Vec4> {
    let mut tan1 = vec![Vec3::ZERO; positions.len()];
    let mut tan2 = vec![Vec3::ZERO; positions.len()];

    for [a, b, c] in triangles(indices, positions.len()) {
        let e1 = positions[b] - positions[a];
        let e2 = positions[c] - positions[a];
        let d1 = uvs[b] - uvs[a];
        let d2 = uvs[c] - uvs[a];
        let r = 1.0 / (d1.x * d2.y - d2.x * d1.y);

        // Degenerated UVs (e.g. the all-zero fallback)
        if !r.is_finite() {
            continue;
        }

        let sdir = (e1 * d2.y - e2 * d1.y) * r;
        let tdir = (e2 * d1.x - e1 * d2.x) * r;

        for idx in [a, b, c] {
            tan1[idx] += sdir;
            tan2[idx] += tdir;
        }
    }

    normals
        .iter()
        .zip(tan1)
        .zip(tan2)
        .map(|((&normal, t), t2)| {
            let normal = if normal == Vec3::ZERO { Vec3::Y } else { normal };

            // Gram-Schmidt
            let tangent = (t - normal * normal.dot(t)).normalize_or_zero();

            if tangent == Vec3::ZERO {
                return normal.any_orthonormal_vector().extend(1.0);
            }

            let handedness = if normal.cross(t).dot(t2) < 0.0 {
                -1.0
            } else {
                1.0
            };

            tangent.extend(handedness)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{vec2, vec3, Vec4Swizzles};

    use super::*;

    fn quad() -> Mesh {
        Mesh::new(vec![
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(1.0, 1.0, 0.0),
            vec3(0.0, 1.0, 0.0),
        ])
        .with_indices(vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn resolve_borrows_present_attributes() {
        let mesh = quad()
            .with_normals(vec![Vec3::Z; 4])
            .with_uvs(vec![Vec2::ONE; 4])
            .with_tangents(vec![Vec4::X; 4]);

        let resolved = mesh.resolve();

        assert!(matches!(resolved.indices, Cow::Borrowed(_)));
        assert!(matches!(resolved.normals, Cow::Borrowed(_)));
        assert!(matches!(resolved.uvs, Cow::Borrowed(_)));
        assert!(matches!(resolved.tangents, Cow::Borrowed(_)));
    }

    #[test]
    fn missing_indices() {
        let mesh = Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        let resolved = mesh.resolve();

        assert_eq!(&[0, 1, 2], resolved.indices.as_ref());

        assert_eq!(
            &[MeshGroup {
                start: 0,
                count: 3,
                material_index: Some(0),
            }],
            resolved.groups.as_ref(),
        );
    }

    #[test]
    fn missing_normals() {
        let mesh = quad();
        let resolved = mesh.resolve();

        for normal in resolved.normals.iter() {
            assert_relative_eq!(1.0, normal.z);
        }

        // Source mesh stays untouched
        assert!(mesh.normals().is_none());
    }

    #[test]
    fn missing_uvs() {
        let mesh = quad();

        assert_eq!(&[Vec2::ZERO; 4], mesh.resolve().uvs.as_ref());
    }

    #[test]
    fn missing_tangents() {
        let mesh = quad().with_uvs(vec![
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 1.0),
        ]);

        for tangent in mesh.resolve().tangents.iter() {
            assert!(tangent.xyz().abs_diff_eq(Vec3::X, 1e-5), "{tangent}");
            assert_eq!(1.0, tangent.w);
        }
    }

    #[test]
    fn missing_tangents_with_degenerated_uvs() {
        let mesh = quad();

        for tangent in mesh.resolve().tangents.iter() {
            assert_relative_eq!(1.0, tangent.xyz().length(), epsilon = 1e-5);
            assert_relative_eq!(0.0, tangent.xyz().dot(Vec3::Z), epsilon = 1e-5);
        }
    }

    #[test]
    fn mismatched_attribute_gets_recomputed() {
        let mesh = quad().with_normals(vec![Vec3::X]);
        let resolved = mesh.resolve();

        assert_eq!(4, resolved.normals.len());
        assert_relative_eq!(1.0, resolved.normals[0].z);
    }
}
