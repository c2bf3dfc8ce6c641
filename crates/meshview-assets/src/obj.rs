//! Wavefront OBJ Parser
//!
//! Reads the ASCII vertex/face-list format into a [`MeshScene`]. Every `o`/`g`
//! statement starts a new sub-mesh, and each sub-mesh gets its own compacted
//! vertex buffer so shared corners stay shared. Polygons are fanned into
//! triangles; `l` and `p` elements become line and point sub-meshes.
//! Texture coordinates and material libraries are skipped.

use ahash::AHashMap;
use glam::Vec3;
use meshview_core::scene::{Geometry, MeshScene, SceneNode, Topology};
use smallvec::SmallVec;

use crate::{AssetError, AssetResult};

const DEFAULT_OBJECT_NAME: &str = "default";

/// Parse OBJ text
pub fn parse_obj(text: &str) -> AssetResult<MeshScene> {
    let mut parser = ObjParser::default();
    for (index, raw) in text.lines().enumerate() {
        parser.parse_line(index + 1, raw)?;
    }
    Ok(parser.finish())
}

/// Parse a downloaded OBJ payload, replacing invalid UTF-8
pub fn parse_obj_bytes(bytes: &[u8]) -> AssetResult<MeshScene> {
    parse_obj(&String::from_utf8_lossy(bytes))
}

fn parse_error(line: usize, message: impl Into<String>) -> AssetError {
    AssetError::Parse {
        line,
        message: message.into(),
    }
}

#[derive(Debug, Clone, Copy)]
struct Corner {
    position: usize,
    normal: Option<usize>,
}

/// Buffers of one topology inside an object
#[derive(Default)]
struct PartBuilder {
    remap: AHashMap<usize, u32>,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    has_normals: bool,
    indices: Vec<u32>,
}

impl PartBuilder {
    fn push(&mut self, corner: Corner, positions: &[Vec3], normals: &[Vec3]) {
        let local = match self.remap.get(&corner.position) {
            Some(&local) => local,
            None => {
                let local = self.positions.len() as u32;
                self.positions.push(positions[corner.position]);
                let normal = corner.normal.map(|n| normals[n]);
                self.has_normals |= normal.is_some();
                self.normals.push(normal.unwrap_or(Vec3::ZERO));
                self.remap.insert(corner.position, local);
                local
            }
        };
        self.indices.push(local);
    }

    fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn into_geometry(self, topology: Topology) -> Geometry {
        let mut geometry = Geometry::new(topology, self.positions, Some(self.indices));
        if self.has_normals {
            geometry.normals = self.normals;
        }
        geometry
    }
}

struct ObjectBuilder {
    name: String,
    faces: PartBuilder,
    lines: PartBuilder,
    points: PartBuilder,
}

impl ObjectBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            faces: PartBuilder::default(),
            lines: PartBuilder::default(),
            points: PartBuilder::default(),
        }
    }

    fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.lines.is_empty() && self.points.is_empty()
    }

    fn finish_into(self, root: &mut SceneNode) {
        let parts = [
            (self.faces, Topology::Triangles, ""),
            (self.lines, Topology::Lines, "_lines"),
            (self.points, Topology::Points, "_points"),
        ];
        for (part, topology, suffix) in parts {
            if !part.is_empty() {
                let name = format!("{}{suffix}", self.name);
                root.add_child(SceneNode::mesh(name, part.into_geometry(topology)));
            }
        }
    }
}

struct ObjParser {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    finished: Vec<ObjectBuilder>,
    current: ObjectBuilder,
}

impl Default for ObjParser {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            finished: Vec::new(),
            current: ObjectBuilder::new(DEFAULT_OBJECT_NAME.to_string()),
        }
    }
}

impl ObjParser {
    fn parse_line(&mut self, line: usize, raw: &str) -> AssetResult<()> {
        let content = raw.split('#').next().unwrap_or_default().trim();
        let mut tokens = content.split_whitespace();
        let Some(keyword) = tokens.next() else {
            return Ok(());
        };

        match keyword {
            "v" => {
                let position = parse_vec3(&mut tokens, line, "vertex")?;
                self.positions.push(position);
            }
            "vn" => {
                let normal = parse_vec3(&mut tokens, line, "normal")?;
                self.normals.push(normal);
            }
            "f" => {
                let corners = self.corners(tokens, line)?;
                if corners.len() < 3 {
                    return Err(parse_error(line, "face needs at least 3 vertices"));
                }
                for i in 1..corners.len() - 1 {
                    for corner in [corners[0], corners[i], corners[i + 1]] {
                        self.current.faces.push(corner, &self.positions, &self.normals);
                    }
                }
            }
            "l" => {
                let corners = self.corners(tokens, line)?;
                if corners.len() < 2 {
                    return Err(parse_error(line, "line needs at least 2 vertices"));
                }
                for pair in corners.windows(2) {
                    self.current.lines.push(pair[0], &self.positions, &self.normals);
                    self.current.lines.push(pair[1], &self.positions, &self.normals);
                }
            }
            "p" => {
                let corners = self.corners(tokens, line)?;
                if corners.is_empty() {
                    return Err(parse_error(line, "point needs a vertex"));
                }
                for corner in corners {
                    self.current.points.push(corner, &self.positions, &self.normals);
                }
            }
            "o" | "g" => {
                let name = tokens.collect::<Vec<_>>().join(" ");
                self.start_object(name);
            }
            "vt" | "vp" | "mtllib" | "usemtl" | "s" => {}
            other => log::debug!("Ignoring OBJ statement '{other}' at line {line}"),
        }
        Ok(())
    }

    fn corners<'a>(
        &self,
        tokens: impl Iterator<Item = &'a str>,
        line: usize,
    ) -> AssetResult<SmallVec<[Corner; 8]>> {
        tokens.map(|token| self.corner(token, line)).collect()
    }

    /// `v`, `v/t`, `v//n` or `v/t/n`
    fn corner(&self, token: &str, line: usize) -> AssetResult<Corner> {
        let mut fields = token.split('/');
        let position = fields.next().unwrap_or_default();
        let position = resolve_index(position, self.positions.len(), line, "vertex")?;
        let _texcoord = fields.next();
        let normal = match fields.next() {
            Some(field) if !field.is_empty() => {
                Some(resolve_index(field, self.normals.len(), line, "normal")?)
            }
            _ => None,
        };
        Ok(Corner { position, normal })
    }

    fn start_object(&mut self, name: String) {
        let name = if name.is_empty() {
            DEFAULT_OBJECT_NAME.to_string()
        } else {
            name
        };
        if self.current.is_empty() {
            self.current.name = name;
        } else {
            let previous = std::mem::replace(&mut self.current, ObjectBuilder::new(name));
            self.finished.push(previous);
        }
    }

    fn finish(mut self) -> MeshScene {
        if !self.current.is_empty() {
            self.finished.push(self.current);
        }

        let mut root = SceneNode::group("obj");
        if self.finished.is_empty() && !self.positions.is_empty() {
            // Vertex-only files are shown as a point cloud
            root.add_child(SceneNode::mesh(
                "points",
                Geometry::new(Topology::Points, self.positions, None),
            ));
        }
        for object in self.finished {
            object.finish_into(&mut root);
        }
        MeshScene::new(root)
    }
}

fn parse_vec3<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    what: &str,
) -> AssetResult<Vec3> {
    let mut coords = [0.0f32; 3];
    for coord in &mut coords {
        let token = tokens
            .next()
            .ok_or_else(|| parse_error(line, format!("{what} needs 3 coordinates")))?;
        let value: f32 = token
            .parse()
            .map_err(|_| parse_error(line, format!("invalid {what} coordinate '{token}'")))?;
        if !value.is_finite() {
            return Err(parse_error(line, format!("non-finite {what} coordinate '{token}'")));
        }
        *coord = value;
    }
    Ok(Vec3::from_array(coords))
}

/// 1-based or negative (relative to the end) reference into `count` items
fn resolve_index(field: &str, count: usize, line: usize, what: &str) -> AssetResult<usize> {
    let raw: i64 = field
        .parse()
        .map_err(|_| parse_error(line, format!("invalid {what} index '{field}'")))?;
    let resolved = match raw {
        r if r > 0 => r - 1,
        r if r < 0 => count as i64 + r,
        _ => -1,
    };
    if resolved < 0 || resolved as usize >= count {
        return Err(parse_error(line, format!("{what} index {raw} out of range")));
    }
    Ok(resolved as usize)
}
