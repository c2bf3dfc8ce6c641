//! Mesh Scene
//!
//! Typed scene tree produced by the mesh loader:
//! - Group nodes carry only a transform and children
//! - Mesh nodes carry geometry buffers, a material slot and shadow flags
//! - World matrices are accumulated during an explicit worklist traversal

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use smallvec::SmallVec;

use crate::material::Material;

/// Local transform of a scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Local position
    pub position: Vec3,
    /// Local rotation
    pub rotation: Quat,
    /// Local scale
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Uniform scale followed by a translation
    pub fn from_scale_translation(scale: f32, position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(scale),
        }
    }

    /// Get the local transformation matrix
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Primitive assembly of a geometry buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    #[default]
    Triangles,
    Lines,
    Points,
}

/// Vertex attribute buffers of one sub-mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub topology: Topology,
    pub positions: Vec<Vec3>,
    /// Per-vertex normals, empty until computed or supplied
    pub normals: Vec<Vec3>,
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    pub fn new(topology: Topology, positions: Vec<Vec3>, indices: Option<Vec<u32>>) -> Self {
        Self {
            topology,
            positions,
            normals: Vec::new(),
            indices,
        }
    }

    /// Indexed triangle list
    pub fn triangles(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self::new(Topology::Triangles, positions, Some(indices))
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> Option<usize> {
        self.indices.as_ref().map(Vec::len)
    }

    /// `index_count / 3` when indexed, otherwise `vertex_count / 3`.
    ///
    /// This is a summary statistic: line and point topologies and
    /// non-indexed buffers whose length is not a multiple of three are
    /// counted by the same rule.
    pub fn triangle_count(&self) -> usize {
        self.index_count().unwrap_or(self.positions.len()) / 3
    }

    /// Regenerate smooth per-vertex normals from triangle faces.
    ///
    /// Indexed geometry accumulates area-weighted face normals on shared
    /// vertices; non-indexed geometry gets flat normals. Line and point
    /// buffers are left untouched.
    pub fn compute_vertex_normals(&mut self) {
        if self.topology != Topology::Triangles {
            return;
        }

        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        match &self.indices {
            Some(indices) => {
                for tri in indices.chunks_exact(3) {
                    let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
                    if a >= vertex_count || b >= vertex_count || c >= vertex_count {
                        continue;
                    }
                    let face = face_normal(self.positions[a], self.positions[b], self.positions[c]);
                    normals[a] += face;
                    normals[b] += face;
                    normals[c] += face;
                }
            }
            None => {
                for (tri, out) in self
                    .positions
                    .chunks_exact(3)
                    .zip(normals.chunks_exact_mut(3))
                {
                    let face = face_normal(tri[0], tri[1], tri[2]);
                    out.fill(face);
                }
            }
        }

        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }
        self.normals = normals;
    }

    /// Drop all buffers and return their memory
    pub fn release(&mut self) {
        self.positions = Vec::new();
        self.normals = Vec::new();
        self.indices = None;
    }
}

fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (c - b).cross(a - b)
}

/// Drawable payload of a mesh node
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub geometry: Geometry,
    /// Shared material handle, `None` until one is applied
    pub material: Option<Arc<Material>>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshData {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            material: None,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

/// What a node holds besides its children
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Group,
    Mesh(MeshData),
}

/// Scene tree node
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Node name for identification
    pub name: String,
    /// Local transform
    pub transform: Transform,
    pub content: NodeContent,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Create an empty group
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            content: NodeContent::Group,
            children: Vec::new(),
        }
    }

    /// Create a mesh node
    pub fn mesh(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            content: NodeContent::Mesh(MeshData::new(geometry)),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// Whether this node draws anything itself
    pub fn is_renderable(&self) -> bool {
        matches!(self.content, NodeContent::Mesh(_))
    }

    pub fn mesh_data(&self) -> Option<&MeshData> {
        match &self.content {
            NodeContent::Mesh(mesh) => Some(mesh),
            NodeContent::Group => None,
        }
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.mesh_data().map(|mesh| &mesh.geometry)
    }
}

/// A mesh node reached during traversal, with its accumulated world matrix
#[derive(Debug, Clone, Copy)]
pub struct Renderable<'a> {
    pub name: &'a str,
    pub mesh: &'a MeshData,
    pub world: Mat4,
}

impl Renderable<'_> {
    pub fn geometry(&self) -> &Geometry {
        &self.mesh.geometry
    }
}

/// A loaded mesh hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct MeshScene {
    root: SceneNode,
}

impl MeshScene {
    pub fn new(root: SceneNode) -> Self {
        Self { root }
    }

    /// Scene with a root group and nothing under it
    pub fn empty() -> Self {
        Self::new(SceneNode::group("root"))
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    /// Every mesh node in depth-first order, with world matrices
    pub fn renderables(&self) -> Vec<Renderable<'_>> {
        let mut result = Vec::new();
        let mut stack: SmallVec<[(&SceneNode, Mat4); 16]> = SmallVec::new();
        stack.push((&self.root, Mat4::IDENTITY));

        while let Some((node, parent_world)) = stack.pop() {
            let world = parent_world * node.transform.local_matrix();
            if let NodeContent::Mesh(mesh) = &node.content {
                result.push(Renderable {
                    name: &node.name,
                    mesh,
                    world,
                });
            }
            for child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }

        result
    }

    /// Visit every mesh payload mutably
    pub fn for_each_mesh_mut(&mut self, mut f: impl FnMut(&mut MeshData)) {
        let mut stack: Vec<&mut SceneNode> = vec![&mut self.root];
        while let Some(node) = stack.pop() {
            let SceneNode {
                content, children, ..
            } = node;
            if let NodeContent::Mesh(mesh) = content {
                f(mesh);
            }
            stack.extend(children.iter_mut());
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.renderables().len()
    }

    /// True when no mesh node holds a vertex
    pub fn is_empty(&self) -> bool {
        self.renderables()
            .iter()
            .all(|r| r.geometry().positions.is_empty())
    }

    /// Put the same material on every sub-mesh
    pub fn apply_material(&mut self, material: &Arc<Material>) {
        self.for_each_mesh_mut(|mesh| mesh.material = Some(Arc::clone(material)));
    }

    pub fn set_shadows(&mut self, cast: bool, receive: bool) {
        self.for_each_mesh_mut(|mesh| {
            mesh.cast_shadow = cast;
            mesh.receive_shadow = receive;
        });
    }

    pub fn compute_vertex_normals(&mut self) {
        self.for_each_mesh_mut(|mesh| mesh.geometry.compute_vertex_normals());
    }

    /// Parent the whole scene under a new root with the given transform
    pub fn wrapped(self, name: impl Into<String>, transform: Transform) -> Self {
        Self::new(
            SceneNode::group(name)
                .with_transform(transform)
                .with_child(self.root),
        )
    }

    /// Release every geometry buffer and detach all children
    pub fn release(&mut self) {
        self.for_each_mesh_mut(|mesh| mesh.geometry.release());
        self.root.children.clear();
    }
}

impl Default for MeshScene {
    fn default() -> Self {
        Self::empty()
    }
}
