//! Model that contains one or more triangles.

use std::{fs, path::Path};

use crate::{error::Error, geometry::Triangle, matrix::Matrix4x4, transform::Transform, vec3::Vec3};

const STL_HEADER_LEN: usize = 80;
const STL_FACET_LEN: usize = 50;

/// Ordered triangle list. A triangle's position is its pick index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Loads a binary or ASCII STL file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mesh = Self::from_stl(&bytes)?;

        log::info!("loaded {} triangles from {}", mesh.len(), path.display());
        Ok(mesh)
    }

    /// Parses STL data.
    ///
    /// Input that starts with `solid` is tried as ASCII first; binary files
    /// are allowed to start with `solid` too, so a failed ASCII parse falls
    /// back to binary.
    pub fn from_stl(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.starts_with(b"solid") {
            if let Ok(text) = std::str::from_utf8(bytes) {
                match parse_ascii(text) {
                    Ok(triangles) => return Ok(Self::new(triangles)),
                    Err(err) => {
                        return parse_binary(bytes).map(Self::new).map_err(|_| err);
                    }
                }
            }
        }

        parse_binary(bytes).map(Self::new)
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Axis-aligned `(min, max)` corners, `None` when empty.
    pub fn bounds(&self) -> Option<(Vec3<f64>, Vec3<f64>)> {
        let mut vertices = self.triangles.iter().flat_map(|t| t.vertices().iter().copied());
        let first = vertices.next()?;

        Some(vertices.fold((first, first), |(lo, hi), v| (lo.min(&v), hi.max(&v))))
    }

    /// Moves the mesh so its bounding box is centered on the origin.
    pub fn centered(mut self) -> Self {
        if let Some((lo, hi)) = self.bounds() {
            let center = (lo + hi).scale(0.5);
            self.transform(&Matrix4x4::translation(center.inverse()));
        }

        self
    }

    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }
}

impl Transform<f64> for Mesh {
    fn transform(&mut self, transformation: &Matrix4x4<f64>) {
        for triangle in &mut self.triangles {
            triangle.transform(transformation);
        }
    }
}

fn parse_ascii(text: &str) -> Result<Vec<Triangle>, Error> {
    let mut tokens = text.split_whitespace();
    let mut triangles = Vec::new();
    let mut corners = Vec::with_capacity(3);

    while let Some(token) = tokens.next() {
        match token {
            "vertex" => {
                if corners.len() == 3 {
                    return Err(Error::Stl(format!("facet {} has more than 3 vertices", triangles.len())));
                }
                let x = coordinate(&mut tokens)?;
                let y = coordinate(&mut tokens)?;
                let z = coordinate(&mut tokens)?;
                corners.push(Vec3::new(x, y, z));
            }
            "endfacet" => {
                if corners.len() != 3 {
                    return Err(Error::Stl(format!(
                        "facet {} has {} vertices, expected 3",
                        triangles.len(),
                        corners.len()
                    )));
                }
                triangles.push(Triangle::new(corners[0], corners[1], corners[2]));
                corners.clear();
            }
            "endsolid" => return Ok(triangles),
            _ => {}
        }
    }

    Err(Error::Stl("missing endsolid".to_string()))
}

fn coordinate<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<f64, Error> {
    let token = tokens.next().ok_or_else(|| Error::Stl("unexpected end of vertex".to_string()))?;
    token
        .parse()
        .map_err(|_| Error::Stl(format!("invalid coordinate {:?}", token)))
}

fn parse_binary(bytes: &[u8]) -> Result<Vec<Triangle>, Error> {
    if bytes.len() < STL_HEADER_LEN + 4 {
        return Err(Error::Stl(format!("{} bytes is too short for a binary STL header", bytes.len())));
    }

    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[STL_HEADER_LEN..STL_HEADER_LEN + 4]);
    let count = u32::from_le_bytes(raw) as usize;

    let body = &bytes[STL_HEADER_LEN + 4..];
    let expected = count.checked_mul(STL_FACET_LEN).unwrap_or(usize::MAX);
    if body.len() < expected {
        return Err(Error::Stl(format!(
            "truncated: header declares {} facets, found {} bytes of facet data",
            count,
            body.len()
        )));
    }

    let triangles = body
        .chunks_exact(STL_FACET_LEN)
        .take(count)
        .map(|facet| {
            // Bytes 0..12 hold the stored normal, which is recomputed on demand.
            let vertex = |i: usize| {
                let at = 12 + i * 12;
                Vec3::new(read_f32(facet, at), read_f32(facet, at + 4), read_f32(facet, at + 8))
            };
            Triangle::new(vertex(0), vertex(1), vertex(2))
        })
        .collect();

    Ok(triangles)
}

fn read_f32(bytes: &[u8], offset: usize) -> f64 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    f64::from(f32::from_le_bytes(raw))
}

#[cfg(test)]
fn binary_stl(triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
    let mut bytes = vec![0u8; STL_HEADER_LEN];
    bytes.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for triangle in triangles {
        bytes.extend_from_slice(&[0u8; 12]);
        for vertex in triangle {
            for c in vertex {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
        }
        bytes.extend_from_slice(&[0u8; 2]);
    }

    bytes
}

#[cfg(test)]
const ASCII_STL: &str = "solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 1 1 2
      vertex 2 1 2
      vertex 1 2 2
    endloop
  endfacet
endsolid test
";

#[test]
fn binary_and_ascii_agree() {
    let binary = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], [
        [1.0, 1.0, 2.0],
        [2.0, 1.0, 2.0],
        [1.0, 2.0, 2.0],
    ]]);

    let a = Mesh::from_stl(ASCII_STL.as_bytes()).unwrap();
    let b = Mesh::from_stl(&binary).unwrap();

    assert_eq!(2, a.len());
    assert_eq!(a, b);
}

#[test]
fn binary_header_may_start_with_solid() {
    let mut binary = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
    binary[..5].copy_from_slice(b"solid");

    assert_eq!(1, Mesh::from_stl(&binary).unwrap().len());
}

#[test]
fn truncated_binary_is_an_error() {
    let mut binary = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
    binary.truncate(binary.len() - 10);

    match Mesh::from_stl(&binary) {
        Err(Error::Stl(..)) => {}
        other => panic!("expected an STL error, got {:?}", other),
    }
}

#[test]
fn ascii_with_missing_vertex_is_an_error() {
    let text = "solid x\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nendloop\nendfacet\nendsolid x\n";

    assert!(matches!(Mesh::from_stl(text.as_bytes()), Err(Error::Stl(..))));
}

#[test]
fn centered_moves_bounds_to_origin() {
    let mesh = Mesh::from_stl(ASCII_STL.as_bytes()).unwrap().centered();
    let (lo, hi) = mesh.bounds().unwrap();

    assert_eq!(Vec3::new(-1.0, -1.0, -1.0), lo);
    assert_eq!(Vec3::new(1.0, 1.0, 1.0), hi);
}
