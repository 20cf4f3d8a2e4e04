//! Geometry buffer handed to the rendering backend

use nalgebra::{Point2, Point3, Vector3};
use std::str::FromStr;

use crate::error::ColorParseError;

pub type Vertex = Point3<f32>;
pub type Normal = Vector3<f32>;
pub type TexCoord = Point2<f32>;

pub const DEFAULT_MATERIAL_COLOR: MaterialColor = MaterialColor {
    r: 0.8,
    g: 0.8,
    b: 0.8,
    a: 1.0,
};

/// Edge length of the cube spanning -1..1 on every axis
pub const DEFAULT_CUBE_SIZE: f32 = 2.0;

/// Floats per corner in [`GeometryBuffer::interleaved`]: position then normal
pub const INTERLEAVED_STRIDE: usize = 6;

/// Flat diffuse color, RGBA in 0..1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl MaterialColor {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for MaterialColor {
    fn default() -> Self {
        DEFAULT_MATERIAL_COLOR
    }
}

/// Parses `r,g,b` or `r,g,b,a`; alpha defaults to opaque
impl FromStr for MaterialColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<f32>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| ColorParseError::InvalidComponent(part.to_string()))
            })
            .collect::<Result<Vec<f32>, _>>()?;

        match components.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b, 1.0)),
            [r, g, b, a] => Ok(Self::new(*r, *g, *b, *a)),
            other => Err(ColorParseError::ComponentCount(other.len())),
        }
    }
}

/// One polygon corner with 0-based references into the attribute arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCorner {
    pub position: u32,
    pub texcoord: Option<u32>,
    pub normal: Option<u32>,
}

impl FaceCorner {
    pub fn new(position: u32, texcoord: Option<u32>, normal: Option<u32>) -> Self {
        Self {
            position,
            texcoord,
            normal,
        }
    }
}

/// A polygon of three or more corners
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub corners: Vec<FaceCorner>,
}

impl Face {
    pub fn new(corners: Vec<FaceCorner>) -> Self {
        Self { corners }
    }

    /// Fan triangulation around the first corner:
    /// (c0, c1, c2), (c0, c2, c3), ..., (c0, cn-2, cn-1).
    /// Yields nothing for fewer than three corners.
    pub fn triangulate(&self) -> impl Iterator<Item = [FaceCorner; 3]> + '_ {
        self.corners
            .windows(2)
            .skip(1)
            .map(move |pair| [self.corners[0], pair[0], pair[1]])
    }
}

/// The three positions of one indexed triangle
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices.
    /// Degenerate triangles get a zero vector.
    pub fn calculate_normal(&self) -> Normal {
        let v0 = self.vertices[0];
        let v1 = self.vertices[1];
        let v2 = self.vertices[2];

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// Renderer-facing mesh: attribute arrays plus a triangle list indexed by position.
///
/// `normal_indices` and `texcoord_indices`, when present, run parallel to
/// `indices` and name the normal/texcoord used at each triangle corner.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBuffer {
    pub positions: Vec<Vertex>,
    pub normals: Vec<Normal>,
    pub texcoords: Vec<TexCoord>,
    pub indices: Vec<u32>,
    pub normal_indices: Option<Vec<u32>>,
    pub texcoord_indices: Option<Vec<u32>>,
    pub material_color: MaterialColor,
}

impl GeometryBuffer {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            texcoords: Vec::new(),
            indices: Vec::new(),
            normal_indices: None,
            texcoord_indices: None,
            material_color: MaterialColor::default(),
        }
    }

    /// Build a buffer from attribute arrays and already-triangulated corners.
    ///
    /// A per-corner normal or texcoord stream is kept only when every corner
    /// carries that reference.
    pub fn from_corners(
        positions: Vec<Vertex>,
        normals: Vec<Normal>,
        texcoords: Vec<TexCoord>,
        corners: &[FaceCorner],
    ) -> Self {
        Self {
            positions,
            normals,
            texcoords,
            indices: corners.iter().map(|corner| corner.position).collect(),
            normal_indices: corner_stream(corners, |corner| corner.normal, "normal"),
            texcoord_indices: corner_stream(corners, |corner| corner.texcoord, "texcoord"),
            material_color: MaterialColor::default(),
        }
    }

    /// Flat-shaded cube centred on the origin.
    ///
    /// Every face owns its 4 corners so it can carry its own outward normal;
    /// triangles wind counter-clockwise seen from outside. Corners get a
    /// unit-square texture mapping.
    pub fn cube(size: f32) -> Self {
        if size <= 0.0 {
            log::warn!("Generating cube with non-positive size {}", size);
        }

        // Mirroring through the origin would turn every face inward
        let half = size.abs() / 2.0;
        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut texcoords = Vec::with_capacity(24);
        let mut corners = Vec::with_capacity(36);

        for (normal, face_corners) in CUBE_FACES.iter() {
            let base = positions.len() as u32;
            for (corner, uv) in face_corners.iter().zip(UNIT_SQUARE.iter()) {
                positions.push(Point3::new(corner[0] * half, corner[1] * half, corner[2] * half));
                normals.push(Vector3::new(normal[0], normal[1], normal[2]));
                texcoords.push(Point2::new(uv[0], uv[1]));
            }

            let face = Face::new(
                (base..base + 4)
                    .map(|i| FaceCorner::new(i, Some(i), Some(i)))
                    .collect(),
            );
            corners.extend(face.triangulate().flatten());
        }

        Self::from_corners(positions, normals, texcoords, &corners)
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position indices of each triangle
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    pub fn triangle_vertices(&self, triangle: [u32; 3]) -> Triangle {
        Triangle::new(
            self.positions[triangle[0] as usize],
            self.positions[triangle[1] as usize],
            self.positions[triangle[2] as usize],
        )
    }

    /// Axis-aligned (min, max) corners, `None` for a buffer without positions
    pub fn bounds(&self) -> Option<(Vertex, Vertex)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(min, max), p| (min.inf(p), max.sup(p))),
        )
    }

    pub fn set_material_color(&mut self, color: MaterialColor) {
        self.material_color = color;
    }

    /// Replace the normals with one face normal per triangle
    pub fn compute_flat_normals(&mut self) {
        if self.indices.is_empty() {
            return;
        }

        let normals: Vec<Normal> = self
            .triangles()
            .map(|tri| self.triangle_vertices(tri).calculate_normal())
            .collect();

        self.normal_indices = Some(
            (0..normals.len() as u32)
                .flat_map(|i| [i, i, i])
                .collect(),
        );
        self.normals = normals;
    }

    /// Expand every triangle corner into position followed by normal.
    /// Corners without a normal stream get a zero normal.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.indices.len() * INTERLEAVED_STRIDE);

        for (corner, &index) in self.indices.iter().enumerate() {
            let position = self.positions[index as usize];
            let normal = self
                .normal_indices
                .as_ref()
                .and_then(|stream| stream.get(corner))
                .and_then(|&normal| self.normals.get(normal as usize))
                .copied()
                .unwrap_or_else(Vector3::zeros);

            data.extend_from_slice(&[
                position.x, position.y, position.z, normal.x, normal.y, normal.z,
            ]);
        }

        data
    }
}

impl Default for GeometryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn corner_stream(
    corners: &[FaceCorner],
    pick: impl Fn(&FaceCorner) -> Option<u32>,
    attribute: &str,
) -> Option<Vec<u32>> {
    if corners.is_empty() {
        return None;
    }

    let stream: Option<Vec<u32>> = corners.iter().map(&pick).collect();
    if stream.is_none() && corners.iter().any(|corner| pick(corner).is_some()) {
        log::warn!(
            "Only some face corners reference a {}, dropping {} indices",
            attribute,
            attribute
        );
    }
    stream
}

/// Outward normal and corners (counter-clockwise seen from outside) of each unit-cube face
const CUBE_FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    // Front
    (
        [0.0, 0.0, 1.0],
        [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
    ),
    // Back
    (
        [0.0, 0.0, -1.0],
        [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]],
    ),
    // Right
    (
        [1.0, 0.0, 0.0],
        [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
    ),
    // Left
    (
        [-1.0, 0.0, 0.0],
        [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
    ),
    // Top
    (
        [0.0, 1.0, 0.0],
        [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]],
    ),
    // Bottom
    (
        [0.0, -1.0, 0.0],
        [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
    ),
];

const UNIT_SQUARE: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(position: u32) -> FaceCorner {
        FaceCorner::new(position, None, None)
    }

    #[test]
    fn test_fan_triangulation() {
        let face = Face::new((0..5).map(corner).collect());
        let triangles: Vec<[u32; 3]> = face
            .triangulate()
            .map(|tri| [tri[0].position, tri[1].position, tri[2].position])
            .collect();
        assert_eq!(triangles, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
    }

    #[test]
    fn test_triangulate_too_few_corners() {
        assert_eq!(Face::new(vec![]).triangulate().count(), 0);
        assert_eq!(Face::new(vec![corner(0), corner(1)]).triangulate().count(), 0);
    }

    #[test]
    fn test_cube_counts() {
        let cube = GeometryBuffer::cube(DEFAULT_CUBE_SIZE);
        assert_eq!(cube.positions.len(), 24);
        assert_eq!(cube.normals.len(), 24);
        assert_eq!(cube.texcoords.len(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.indices.len() % 3, 0);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.positions.len()));
        assert_eq!(cube.normal_indices.as_ref().map(Vec::len), Some(36));
        assert_eq!(cube.texcoord_indices.as_ref().map(Vec::len), Some(36));
        assert_eq!(cube.material_color, DEFAULT_MATERIAL_COLOR);
    }

    #[test]
    fn test_cube_normals_shared_by_four_corners() {
        let cube = GeometryBuffer::cube(1.0);
        let mut directions: Vec<(Normal, usize)> = Vec::new();
        for normal in &cube.normals {
            match directions.iter_mut().find(|(n, _)| (n - normal).norm() < 1e-6) {
                Some((_, count)) => *count += 1,
                None => directions.push((*normal, 1)),
            }
        }
        assert_eq!(directions.len(), 6);
        assert!(directions.iter().all(|(_, count)| *count == 4));
    }

    #[test]
    fn test_cube_winding_faces_outward() {
        let cube = GeometryBuffer::cube(3.0);
        let normal_indices = cube.normal_indices.clone().unwrap();
        for (i, tri) in cube.triangles().enumerate() {
            let geometric = cube.triangle_vertices(tri).calculate_normal();
            let declared = cube.normals[normal_indices[i * 3] as usize];
            assert!((geometric - declared).norm() < 1e-6);
        }
    }

    #[test]
    fn test_negative_size_still_faces_outward() {
        let cube = GeometryBuffer::cube(-2.0);
        assert_eq!(cube, GeometryBuffer::cube(2.0));
        let normal_indices = cube.normal_indices.clone().unwrap();
        for (i, tri) in cube.triangles().enumerate() {
            let triangle = cube.triangle_vertices(tri);
            let centroid = (triangle.vertices[0].coords
                + triangle.vertices[1].coords
                + triangle.vertices[2].coords)
                / 3.0;
            let declared = cube.normals[normal_indices[i * 3] as usize];
            assert!(declared.dot(&centroid) > 0.0);
            assert!((triangle.calculate_normal() - declared).norm() < 1e-6);
        }
    }

    #[test]
    fn test_cube_size() {
        let cube = GeometryBuffer::cube(3.0);
        let (min, max) = cube.bounds().unwrap();
        assert!((min.x + 1.5).abs() < 1e-6);
        assert!((max.z - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_cube_is_deterministic() {
        assert_eq!(GeometryBuffer::cube(2.0), GeometryBuffer::cube(2.0));
    }

    #[test]
    fn test_partial_normals_dropped() {
        let corners = [
            FaceCorner::new(0, None, Some(0)),
            FaceCorner::new(1, None, None),
            FaceCorner::new(2, None, Some(0)),
        ];
        let positions = vec![Point3::origin(); 3];
        let buffer = GeometryBuffer::from_corners(positions, vec![Vector3::z()], vec![], &corners);
        assert_eq!(buffer.indices, vec![0, 1, 2]);
        assert!(buffer.normal_indices.is_none());
        assert!(buffer.texcoord_indices.is_none());
        assert_eq!(buffer.normals.len(), 1);
    }

    #[test]
    fn test_material_color_does_not_touch_geometry() {
        let mut cube = GeometryBuffer::cube(2.0);
        let before = cube.clone();
        cube.set_material_color(MaterialColor::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(cube.material_color.to_array(), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(cube.positions, before.positions);
        assert_eq!(cube.normals, before.normals);
        assert_eq!(cube.texcoords, before.texcoords);
        assert_eq!(cube.indices, before.indices);
    }

    #[test]
    fn test_flat_normals() {
        let mut buffer = GeometryBuffer::from_corners(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![],
            vec![],
            &[corner(0), corner(1), corner(2)],
        );
        buffer.compute_flat_normals();
        assert_eq!(buffer.normals.len(), 1);
        assert!((buffer.normals[0] - Vector3::z()).norm() < 1e-6);
        assert_eq!(buffer.normal_indices, Some(vec![0, 0, 0]));
    }

    #[test]
    fn test_interleaved_layout() {
        let cube = GeometryBuffer::cube(2.0);
        let data = cube.interleaved();
        assert_eq!(data.len(), 36 * INTERLEAVED_STRIDE);
        // first corner of the front face
        assert_eq!(&data[..6], &[-1.0, -1.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_interleaved_short_normal_stream() {
        let mut cube = GeometryBuffer::cube(2.0);
        cube.normal_indices = Some(vec![0; 3]);
        let data = cube.interleaved();
        assert_eq!(data.len(), 36 * INTERLEAVED_STRIDE);
        assert_eq!(&data[..6], &[-1.0, -1.0, 1.0, 0.0, 0.0, 1.0]);
        // corners past the end of the stream fall back to a zero normal
        assert_eq!(&data[3 * INTERLEAVED_STRIDE + 3..4 * INTERLEAVED_STRIDE], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_flat_normals_on_empty_buffer() {
        let mut buffer = GeometryBuffer::new();
        buffer.compute_flat_normals();
        assert!(buffer.normals.is_empty());
        assert!(buffer.normal_indices.is_none());
    }

    #[test]
    fn test_interleaved_without_normals() {
        let buffer = GeometryBuffer::from_corners(
            vec![Point3::new(1.0, 2.0, 3.0); 3],
            vec![],
            vec![],
            &[corner(0), corner(1), corner(2)],
        );
        assert_eq!(&buffer.interleaved()[..6], &[1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = GeometryBuffer::default();
        assert!(buffer.is_empty());
        assert!(buffer.bounds().is_none());
        assert!(buffer.interleaved().is_empty());
    }

    #[test]
    fn test_parse_material_color() {
        let color: MaterialColor = "1, 0.5, 0".parse().unwrap();
        assert_eq!(color.to_array(), [1.0, 0.5, 0.0, 1.0]);

        let color: MaterialColor = "2,0,0,0.25".parse().unwrap();
        assert_eq!(color.to_array(), [1.0, 0.0, 0.0, 0.25]);

        assert_eq!(
            "1,0".parse::<MaterialColor>(),
            Err(ColorParseError::ComponentCount(2))
        );
        assert_eq!(
            "1,red,0".parse::<MaterialColor>(),
            Err(ColorParseError::InvalidComponent("red".to_string()))
        );
        assert_eq!(
            "nan,0,0".parse::<MaterialColor>(),
            Err(ColorParseError::InvalidComponent("nan".to_string()))
        );
        assert_eq!(
            "1,inf,0".parse::<MaterialColor>(),
            Err(ColorParseError::InvalidComponent("inf".to_string()))
        );
    }
}
