//! Layout traversal: walk the connection graph and pose every reachable piece
//!
//! Each component of the layout is solved from one root. The root is placed
//! at `((component - 1) * spacing, 0)` with no rotation, then a depth-first
//! walk hands each unvisited neighbour to the constraint solver. A piece's
//! pose is set exactly once; the first parent to reach it wins.
//!
//! Connections with an `active_when` tag only exist while the parent's
//! switch state equals the tag. Pieces that can only be reached through
//! inactive connections are left without a pose and reported.

use std::fmt;

use tracing::{debug, info, warn};

use crate::catalog::GeometryCatalog;

use super::config::SolverConfig;
use super::solver::solve_child_pose;
use super::transform::{Point, Pose};
use super::types::{Connection, Layout, Piece};

/// Category of solve warning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A piece's article is not in the catalog; the child copied its parent's pose
    MissingGeometry,
    /// A connector index is out of range; the child copied its parent's pose
    InvalidConnector,
    /// A connection names a piece that is not in the layout
    DanglingConnection,
    /// A piece received no pose under the current switch states
    Unreachable,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::MissingGeometry => write!(f, "missing-geometry"),
            WarningKind::InvalidConnector => write!(f, "invalid-connector"),
            WarningKind::DanglingConnection => write!(f, "dangling-connection"),
            WarningKind::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// A non-fatal anomaly found while solving
#[derive(Debug, Clone, PartialEq)]
pub struct SolveWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl SolveWarning {
    fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Outcome of one solve: poses are written onto the layout, this carries
/// everything else
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveReport {
    pub warnings: Vec<SolveWarning>,
    /// Number of components (roots) that were walked
    pub components: usize,
    /// Number of pieces that received a pose
    pub posed: usize,
}

impl SolveReport {
    /// Warnings rendered as human-readable strings
    pub fn messages(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.to_string()).collect()
    }

    /// Warnings of one kind
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &SolveWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn warn(&mut self, kind: WarningKind, message: String) {
        warn!(%kind, "{}", message);
        self.warnings.push(SolveWarning::new(kind, message));
    }
}

/// One direction of a connection, seen from the parent piece
#[derive(Debug, Clone, Copy)]
struct Edge {
    connection: usize,
    parent_connector: usize,
    child: usize,
    child_connector: usize,
}

/// Adjacency lists by piece index, each in connection input order
struct Graph {
    adjacency: Vec<Vec<Edge>>,
}

impl Graph {
    fn build(layout: &Layout, report: &mut SolveReport) -> Self {
        let mut adjacency = vec![Vec::new(); layout.len()];

        for (i, conn) in layout.connections().iter().enumerate() {
            let (Some(a), Some(b)) = (layout.index_of(&conn.a.piece), layout.index_of(&conn.b.piece))
            else {
                let missing = if layout.index_of(&conn.a.piece).is_none() {
                    &conn.a.piece
                } else {
                    &conn.b.piece
                };
                report.warn(
                    WarningKind::DanglingConnection,
                    format!("connection {} references unknown piece '{}'", conn, missing),
                );
                continue;
            };

            adjacency[a].push(Edge {
                connection: i,
                parent_connector: conn.a.connector,
                child: b,
                child_connector: conn.b.connector,
            });
            // Connections are symmetric; the reverse direction swaps roles
            adjacency[b].push(Edge {
                connection: i,
                parent_connector: conn.b.connector,
                child: a,
                child_connector: conn.a.connector,
            });
        }

        Self { adjacency }
    }
}

/// Union-find over piece indices
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Keep the lower index as representative for stable results
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

/// Decide which pieces may start a component.
///
/// Pieces joined by ungated connections form groups. A group that holds no
/// turnout (no piece with a switch state) but is entered through a gated
/// connection from a turnout is a branch: it is only placed when that
/// turnout's route selects it. A gate whose ends both lack a state leads
/// nowhere and marks neither group.
fn root_eligibility(layout: &Layout) -> Vec<bool> {
    let n = layout.len();
    let mut groups = DisjointSet::new(n);
    let ends = |conn: &Connection| {
        Some((
            layout.index_of(&conn.a.piece)?,
            layout.index_of(&conn.b.piece)?,
        ))
    };

    for conn in layout.connections().iter().filter(|c| !c.is_gated()) {
        if let Some((a, b)) = ends(conn) {
            groups.union(a, b);
        }
    }

    let mut has_switch = vec![false; n];
    for (i, piece) in layout.pieces().iter().enumerate() {
        if piece.switch_state.is_some() {
            let g = groups.find(i);
            has_switch[g] = true;
        }
    }

    let pieces = layout.pieces();
    let mut gated_entry = vec![false; n];
    for conn in layout.connections().iter().filter(|c| c.is_gated()) {
        if let Some((a, b)) = ends(conn) {
            let (ga, gb) = (groups.find(a), groups.find(b));
            if ga == gb {
                continue;
            }
            // The gate leads into the group opposite the turnout that owns it
            if pieces[a].switch_state.is_some() {
                gated_entry[gb] = true;
            }
            if pieces[b].switch_state.is_some() {
                gated_entry[ga] = true;
            }
        }
    }

    (0..n)
        .map(|i| {
            let g = groups.find(i);
            has_switch[g] || !gated_entry[g]
        })
        .collect()
}

/// Whether a connection currently takes part in the layout, seen from `parent`
fn is_active(conn: &Connection, parent: &Piece) -> bool {
    match conn.active_when.as_deref() {
        Some(tag) => parent.switch_state.as_deref() == Some(tag),
        None => true,
    }
}

/// Solve every piece's pose in place.
///
/// All poses are cleared first, so the result depends only on the layout,
/// its switch states and the catalog. Nothing here fails: anomalies are
/// collected as warnings in the returned report.
pub fn solve_layout(
    layout: &mut Layout,
    catalog: &GeometryCatalog,
    config: &SolverConfig,
) -> SolveReport {
    let mut report = SolveReport::default();
    for piece in layout.pieces_mut() {
        piece.pose = None;
        piece.component_origin = None;
    }
    if layout.is_empty() {
        return report;
    }

    let graph = Graph::build(layout, &mut report);
    let mut eligible = root_eligibility(layout);
    let mut poses: Vec<Option<Pose>> = vec![None; layout.len()];
    let mut origins: Vec<Option<Point>> = vec![None; layout.len()];

    let mut roots: Vec<usize> = (0..layout.len()).collect();
    if let Some(preferred) = config.preferred_root.as_deref() {
        match layout.index_of(preferred) {
            Some(i) => {
                eligible[i] = true;
                roots.retain(|&r| r != i);
                roots.insert(0, i);
            }
            None => warn!(root = preferred, "preferred root is not in the layout"),
        }
    }

    for root in roots {
        if poses[root].is_some() || !eligible[root] {
            continue;
        }
        report.components += 1;
        let offset_x = (report.components - 1) as f64 * config.component_spacing;
        poses[root] = Some(Pose::new(offset_x, 0.0, 0.0));
        origins[root] = Some(Point::new(offset_x, 0.0));

        let piece = &layout.pieces()[root];
        debug!(
            component = report.components,
            root = %piece.id,
            article = %piece.article,
            offset_x,
            "starting component"
        );

        let placed = walk_component(root, layout, &graph, catalog, &mut poses, &mut report);
        for &i in &placed {
            origins[i] = origins[root];
        }
        debug!(component = report.components, placed = placed.len(), "component solved");
    }

    for (piece, pose) in layout.pieces().iter().zip(&poses) {
        if pose.is_none() {
            report.warn(
                WarningKind::Unreachable,
                format!(
                    "piece '{}' ({}) is not reachable under the current switch states",
                    piece.id, piece.article
                ),
            );
        }
    }

    report.posed = poses.iter().filter(|p| p.is_some()).count();
    for ((piece, pose), origin) in layout.pieces_mut().iter_mut().zip(poses).zip(origins) {
        piece.pose = pose;
        piece.component_origin = origin;
    }

    info!(
        posed = report.posed,
        total = layout.len(),
        components = report.components,
        warnings = report.warnings.len(),
        "layout solved"
    );
    report
}

/// Depth-first walk from an already-posed root. Returns the pieces placed,
/// root included.
fn walk_component(
    root: usize,
    layout: &Layout,
    graph: &Graph,
    catalog: &GeometryCatalog,
    poses: &mut [Option<Pose>],
    report: &mut SolveReport,
) -> Vec<usize> {
    let pieces = layout.pieces();
    let mut placed = vec![root];
    // (piece, next edge to examine)
    let mut stack = vec![(root, 0usize)];

    while let Some(top) = stack.last_mut() {
        let current = top.0;
        let Some(&edge) = graph.adjacency[current].get(top.1) else {
            stack.pop();
            continue;
        };
        top.1 += 1;

        let conn = &layout.connections()[edge.connection];
        let parent = &pieces[current];
        if !is_active(conn, parent) {
            debug!(
                connection = %conn,
                requires = conn.active_when.as_deref().unwrap_or(""),
                current = parent.switch_state.as_deref().unwrap_or("none"),
                "skipping inactive connection"
            );
            continue;
        }
        if poses[edge.child].is_some() {
            continue;
        }
        let Some(parent_pose) = poses[current] else {
            continue;
        };

        let child = &pieces[edge.child];
        let pose = place_child(parent_pose, parent, child, conn, edge, catalog, report);
        debug!(
            kind = %conn.kind,
            parent = %parent.id,
            child = %child.id,
            x = pose.x,
            y = pose.y,
            rotation = pose.rotation_deg,
            "placed piece"
        );

        poses[edge.child] = Some(pose);
        placed.push(edge.child);
        stack.push((edge.child, 0));
    }

    placed
}

fn place_child(
    parent_pose: Pose,
    parent: &Piece,
    child: &Piece,
    conn: &Connection,
    edge: Edge,
    catalog: &GeometryCatalog,
    report: &mut SolveReport,
) -> Pose {
    let (Some(parent_geom), Some(child_geom)) =
        (catalog.lookup(&parent.article), catalog.lookup(&child.article))
    else {
        let missing: Vec<&str> = [parent, child]
            .into_iter()
            .filter(|p| !catalog.contains(&p.article))
            .map(|p| p.article.as_str())
            .collect();
        report.warn(
            WarningKind::MissingGeometry,
            format!(
                "no geometry for {} placing '{}' from '{}'; copied parent pose",
                missing.join(", "),
                child.id,
                parent.id
            ),
        );
        return parent_pose;
    };

    if edge.parent_connector >= parent_geom.connector_count()
        || edge.child_connector >= child_geom.connector_count()
    {
        report.warn(
            WarningKind::InvalidConnector,
            format!(
                "connection {} is out of range ({} has {} connectors, {} has {}); copied parent pose",
                conn,
                parent.article,
                parent_geom.connector_count(),
                child.article,
                child_geom.connector_count()
            ),
        );
        return parent_pose;
    }

    solve_child_pose(
        parent_pose,
        parent_geom,
        edge.parent_connector,
        child_geom,
        edge.child_connector,
        conn.kind,
        Some(&conn.params),
    )
}
