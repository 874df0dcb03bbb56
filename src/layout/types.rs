//! Core types for the layout: pieces, connections and the layout aggregate

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{Connector, GeometryCatalog};

use super::error::LayoutError;
use super::transform::{Point, Pose};

/// Parameter key for the extra angle of a parametric connection
pub const BRANCH_ANGLE: &str = "branchAngle";

/// How a child's pose is derived from its parent across a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    /// Position and heading match, connectors face each other
    #[default]
    Rigid,
    /// Position matches, orientation is governed elsewhere (turntables)
    Rotational,
    /// Heading alignment offset by the `branchAngle` parameter
    Parametric,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Rigid => write!(f, "rigid"),
            ConstraintKind::Rotational => write!(f, "rotational"),
            ConstraintKind::Parametric => write!(f, "parametric"),
        }
    }
}

/// Numeric parameters attached to a connection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintParams(BTreeMap<String, f64>);

impl ConstraintParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// The `branchAngle` parameter, defaulting to 0
    pub fn branch_angle(&self) -> f64 {
        self.get(BRANCH_ANGLE).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A placed track segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: String,
    /// Key into the geometry catalog
    pub article: String,
    /// Selected route for turnouts, e.g. "straight" or "diverging"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_state: Option<String>,
    /// Solved world pose; never read from input
    #[serde(skip)]
    pub pose: Option<Pose>,
    /// Where the root of this piece's component was placed by the last solve
    #[serde(skip)]
    pub component_origin: Option<Point>,
}

impl Piece {
    pub fn new(id: impl Into<String>, article: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            article: article.into(),
            switch_state: None,
            pose: None,
            component_origin: None,
        }
    }

    /// Set the turnout state
    pub fn with_switch_state(mut self, state: impl Into<String>) -> Self {
        self.switch_state = Some(state.into());
        self
    }
}

/// One side of a connection: a piece and one of its connectors
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub piece: String,
    pub connector: usize,
}

impl Endpoint {
    pub fn new(piece: impl Into<String>, connector: usize) -> Self {
        Self {
            piece: piece.into(),
            connector,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.piece, self.connector)
    }
}

/// An unordered joint between two connectors.
///
/// Which side is listed first carries no meaning; the traversal treats the
/// already-placed side as the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub a: Endpoint,
    pub b: Endpoint,
    #[serde(default)]
    pub kind: ConstraintKind,
    /// Only active while the parent's switch state equals this tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_when: Option<String>,
    #[serde(default, skip_serializing_if = "ConstraintParams::is_empty")]
    pub params: ConstraintParams,
}

impl Connection {
    /// A rigid joint between `a[a_connector]` and `b[b_connector]`
    pub fn rigid(
        a: impl Into<String>,
        a_connector: usize,
        b: impl Into<String>,
        b_connector: usize,
    ) -> Self {
        Self {
            a: Endpoint::new(a, a_connector),
            b: Endpoint::new(b, b_connector),
            kind: ConstraintKind::Rigid,
            active_when: None,
            params: ConstraintParams::default(),
        }
    }

    /// Change the constraint kind
    pub fn with_kind(mut self, kind: ConstraintKind) -> Self {
        self.kind = kind;
        self
    }

    /// Gate the connection on a switch state
    pub fn active_when(mut self, state: impl Into<String>) -> Self {
        self.active_when = Some(state.into());
        self
    }

    /// Make the connection parametric with the given branch angle
    pub fn with_branch_angle(mut self, degrees: f64) -> Self {
        self.kind = ConstraintKind::Parametric;
        self.params = self.params.with(BRANCH_ANGLE, degrees);
        self
    }

    pub fn is_gated(&self) -> bool {
        self.active_when.is_some()
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.a, self.b)
    }
}

/// TOML structure for deserializing layouts
#[derive(Deserialize)]
struct LayoutFile {
    #[serde(default)]
    pieces: Vec<Piece>,
    #[serde(default)]
    connections: Vec<Connection>,
}

/// Pieces plus the connections between them.
///
/// Pieces and connections reference each other only by id. Piece ids are
/// unique; this is checked whenever a piece is added.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Layout {
    pieces: Vec<Piece>,
    connections: Vec<Connection>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Layout {
    /// Create an empty layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layout from pieces and connections
    pub fn from_parts(
        pieces: Vec<Piece>,
        connections: Vec<Connection>,
    ) -> Result<Self, LayoutError> {
        let mut layout = Self::new();
        for piece in pieces {
            layout.add_piece(piece)?;
        }
        layout.connections = connections;
        Ok(layout)
    }

    /// Load a layout from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, LayoutError> {
        let parsed: LayoutFile = toml::from_str(content)?;
        Self::from_parts(parsed.pieces, parsed.connections)
    }

    /// Load a layout from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, LayoutError> {
        let content = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Add a piece, rejecting duplicate ids
    pub fn add_piece(&mut self, piece: Piece) -> Result<(), LayoutError> {
        if self.index.contains_key(&piece.id) {
            return Err(LayoutError::duplicate(piece.id));
        }
        self.index.insert(piece.id.clone(), self.pieces.len());
        self.pieces.push(piece);
        Ok(())
    }

    /// Add a connection. Dangling references are tolerated and reported
    /// by the validator and the traversal.
    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Get a piece by id
    pub fn piece(&self, id: &str) -> Option<&Piece> {
        self.index.get(id).map(|&i| &self.pieces[i])
    }

    /// Get a mutable piece by id (for switch state changes)
    pub(crate) fn piece_mut(&mut self, id: &str) -> Option<&mut Piece> {
        match self.index.get(id) {
            Some(&i) => Some(&mut self.pieces[i]),
            None => None,
        }
    }

    /// Position of a piece in input order
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Set a turnout's state; returns false if the piece does not exist
    pub fn set_switch_state(&mut self, id: &str, state: Option<String>) -> bool {
        match self.piece_mut(id) {
            Some(piece) => {
                piece.switch_state = state;
                true
            }
            None => false,
        }
    }

    /// Solved pose of a piece, if it has one
    pub fn pose_of(&self, id: &str) -> Option<Pose> {
        self.piece(id).and_then(|p| p.pose)
    }

    /// World position and heading of a solved piece's connector
    pub fn world_connector(
        &self,
        id: &str,
        connector: usize,
        catalog: &GeometryCatalog,
    ) -> Option<Connector> {
        let piece = self.piece(id)?;
        let pose = piece.pose?;
        let local = catalog.lookup(&piece.article)?.connector(connector)?;
        Some(Connector {
            position: pose.transform_point(local.position),
            heading_deg: pose.transform_heading(local.heading_deg),
        })
    }

    pub(crate) fn pieces_mut(&mut self) -> &mut [Piece] {
        &mut self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}
