//! STL mesh reader covering both the binary and ASCII dialects.
//!
//! Stored facet normals are discarded in both dialects; the viewer derives
//! its own flat normals from vertex positions so shading never depends on
//! whatever the exporting tool wrote.

use std::path::Path;

use glam::Vec3;

use super::Triangle;
use crate::error::DriftError;

/// Read an STL file from disk and return its triangle list.
pub fn load_stl(path: &Path) -> Result<Vec<Triangle>, DriftError> {
    let data = std::fs::read(path).map_err(DriftError::Io)?;
    parse_stl(&data).map_err(|e| match e {
        DriftError::MeshLoad(msg) => {
            DriftError::MeshLoad(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

/// Parse STL bytes, auto-detecting binary versus ASCII.
///
/// Binary detection goes first and is based on the declared record count
/// matching the input length, since binary exports sometimes open with the
/// literal text `solid` too.
pub fn parse_stl(data: &[u8]) -> Result<Vec<Triangle>, DriftError> {
    if let Some(count) = binary_triangle_count(data) {
        return Ok(parse_binary(data, count));
    }
    let text = std::str::from_utf8(data).map_err(|_| {
        DriftError::MeshLoad("neither a binary nor an ASCII STL".to_owned())
    })?;
    if text.trim_start().starts_with("solid") {
        parse_ascii(text)
    } else {
        Err(DriftError::MeshLoad("unrecognized STL header".to_owned()))
    }
}

/// Binary STL layout: 80-byte header, little-endian `u32` triangle count,
/// then fifty bytes per triangle (normal, three corners, attribute count).
fn binary_triangle_count(data: &[u8]) -> Option<usize> {
    if data.len() < 84 {
        return None;
    }
    let count =
        u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
    (data.len() == 84 + count * 50).then_some(count)
}

fn parse_binary(data: &[u8], count: usize) -> Vec<Triangle> {
    let mut triangles = Vec::with_capacity(count);
    for record in data[84..84 + count * 50].chunks_exact(50) {
        // Skip the 12-byte stored normal; the trailing 2-byte attribute
        // count is ignored as well.
        let mut corners = [Vec3::ZERO; 3];
        for (i, corner) in corners.iter_mut().enumerate() {
            let base = 12 + i * 12;
            *corner = Vec3::new(
                read_f32(record, base),
                read_f32(record, base + 4),
                read_f32(record, base + 8),
            );
        }
        triangles.push(corners);
    }
    triangles
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn parse_ascii(text: &str) -> Result<Vec<Triangle>, DriftError> {
    let mut triangles = Vec::new();
    let mut corners: Vec<Vec3> = Vec::with_capacity(3);
    for (line_no, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("vertex") => {
                let mut axes = [0.0f32; 3];
                for axis in &mut axes {
                    *axis =
                        tokens.next().and_then(|t| t.parse().ok()).ok_or_else(
                            || malformed(line_no, "vertex needs three numbers"),
                        )?;
                }
                corners.push(Vec3::from_array(axes));
            }
            Some("endfacet") => {
                if corners.len() != 3 {
                    return Err(malformed(
                        line_no,
                        "facet does not have exactly three vertices",
                    ));
                }
                triangles.push([corners[0], corners[1], corners[2]]);
                corners.clear();
            }
            // solid/endsolid/facet/outer/endloop lines carry no geometry.
            _ => {}
        }
    }
    if !corners.is_empty() {
        return Err(DriftError::MeshLoad(
            "unterminated facet at end of file".to_owned(),
        ));
    }
    Ok(triangles)
}

fn malformed(line_no: usize, what: &str) -> DriftError {
    DriftError::MeshLoad(format!("line {}: {what}", line_no + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_stl(triangles: &[Triangle]) -> Vec<u8> {
        let mut data = vec![0u8; 80];
        data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for tri in triangles {
            // Stored normal, deliberately bogus to prove it is ignored.
            for _ in 0..3 {
                data.extend_from_slice(&7.5f32.to_le_bytes());
            }
            for corner in tri {
                for axis in corner.to_array() {
                    data.extend_from_slice(&axis.to_le_bytes());
                }
            }
            data.extend_from_slice(&0u16.to_le_bytes());
        }
        data
    }

    #[test]
    fn binary_round_trip() {
        let triangles = vec![
            [Vec3::ZERO, Vec3::X, Vec3::Y],
            [Vec3::new(-1.0, 2.0, 0.5), Vec3::Z, Vec3::ONE],
        ];
        let parsed = parse_stl(&binary_stl(&triangles)).unwrap();
        assert_eq!(parsed, triangles);
    }

    #[test]
    fn binary_with_solid_header_still_parses_as_binary() {
        let triangles = vec![[Vec3::ZERO, Vec3::X, Vec3::Y]];
        let mut data = binary_stl(&triangles);
        data[..5].copy_from_slice(b"solid");
        let parsed = parse_stl(&data).unwrap();
        assert_eq!(parsed, triangles);
    }

    #[test]
    fn empty_binary_mesh_is_valid() {
        let parsed = parse_stl(&binary_stl(&[])).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn ascii_round_trip() {
        let text = "\
solid demo
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid demo
";
        let parsed = parse_stl(text.as_bytes()).unwrap();
        assert_eq!(parsed, vec![[Vec3::ZERO, Vec3::X, Vec3::Y]]);
    }

    #[test]
    fn ascii_with_bad_vertex_reports_line() {
        let text = "solid demo\nfacet normal 0 0 1\nvertex 0 oops 0\n";
        let err = parse_stl(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn ascii_facet_with_two_vertices_is_rejected() {
        let text = "\
solid demo
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
    endloop
  endfacet
endsolid demo
";
        assert!(parse_stl(text.as_bytes()).is_err());
    }

    #[test]
    fn truncated_binary_is_rejected() {
        let triangles = vec![[Vec3::ZERO, Vec3::X, Vec3::Y]];
        let mut data = binary_stl(&triangles);
        data.truncate(data.len() - 4);
        assert!(parse_stl(&data).is_err());
    }
}
