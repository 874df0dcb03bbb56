//! Fluent construction of layouts in code
//!
//! ```rust
//! use track_layout::layout::LayoutBuilder;
//!
//! let oval = LayoutBuilder::new()
//!     .chain("r", "R1", 12)
//!     .connect("r12", 1, "r1", 0)
//!     .build()
//!     .unwrap();
//! assert_eq!(oval.len(), 12);
//! assert_eq!(oval.connections().len(), 12);
//! ```

use super::error::LayoutError;
use super::types::{Connection, Layout, Piece};

/// Builder for [`Layout`].
///
/// Unlike [`Layout::add_connection`], `build` rejects connections that
/// name pieces which were never added.
#[derive(Debug, Default)]
pub struct LayoutBuilder {
    pieces: Vec<Piece>,
    connections: Vec<Connection>,
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a piece
    pub fn piece(mut self, id: impl Into<String>, article: impl Into<String>) -> Self {
        self.pieces.push(Piece::new(id, article));
        self
    }

    /// Add a turnout with its current switch state
    pub fn switch_piece(
        mut self,
        id: impl Into<String>,
        article: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        self.pieces
            .push(Piece::new(id, article).with_switch_state(state));
        self
    }

    /// Join `a[a_connector]` to `b[b_connector]` rigidly
    pub fn connect(
        self,
        a: impl Into<String>,
        a_connector: usize,
        b: impl Into<String>,
        b_connector: usize,
    ) -> Self {
        self.connection(Connection::rigid(a, a_connector, b, b_connector))
    }

    /// Add a fully specified connection (gated, parametric, ...)
    pub fn connection(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    /// Add `count` pieces named `{prefix}1..={prefix}{count}`, each joined
    /// from connector 1 to the next piece's connector 0
    pub fn chain(mut self, prefix: &str, article: &str, count: usize) -> Self {
        for i in 1..=count {
            let id = format!("{}{}", prefix, i);
            if i > 1 {
                self.connections
                    .push(Connection::rigid(format!("{}{}", prefix, i - 1), 1, id.clone(), 0));
            }
            self.pieces.push(Piece::new(id, article));
        }
        self
    }

    /// Finish the layout
    pub fn build(self) -> Result<Layout, LayoutError> {
        let mut layout = Layout::new();
        for piece in self.pieces {
            layout.add_piece(piece)?;
        }
        for connection in self.connections {
            for end in [&connection.a, &connection.b] {
                if layout.piece(&end.piece).is_none() {
                    return Err(LayoutError::unknown(end.piece.as_str()));
                }
            }
            layout.add_connection(connection);
        }
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::ConstraintKind;

    #[test]
    fn test_chain_links_consecutive_pieces() {
        let layout = LayoutBuilder::new().chain("s", "G231", 3).build().unwrap();
        let ids: Vec<&str> = layout.pieces().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
        let joints: Vec<String> = layout.connections().iter().map(|c| c.to_string()).collect();
        assert_eq!(joints, vec!["s1[1] <-> s2[0]", "s2[1] <-> s3[0]"]);
    }

    #[test]
    fn test_switch_piece_and_gated_connection() {
        let layout = LayoutBuilder::new()
            .switch_piece("t", "WL", "diverging")
            .piece("b", "R1")
            .connection(
                Connection::rigid("t", 2, "b", 0)
                    .active_when("diverging")
                    .with_branch_angle(180.0),
            )
            .build()
            .unwrap();

        assert_eq!(
            layout.piece("t").unwrap().switch_state.as_deref(),
            Some("diverging")
        );
        assert_eq!(layout.connections()[0].kind, ConstraintKind::Parametric);
        assert!(layout.connections()[0].is_gated());
    }

    #[test]
    fn test_unknown_piece_rejected() {
        let err = LayoutBuilder::new()
            .piece("a", "G231")
            .connect("a", 1, "ghost", 0)
            .build()
            .unwrap_err();
        assert!(matches!(err, LayoutError::UnknownPiece { ref id } if id == "ghost"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = LayoutBuilder::new()
            .piece("a", "G231")
            .piece("a", "R1")
            .build()
            .unwrap_err();
        assert!(matches!(err, LayoutError::DuplicatePiece { .. }));
    }
}
