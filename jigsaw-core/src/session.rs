use crate::drag::{DEFAULT_SNAP_STEP, DragOutcome};
use crate::error::PuzzleError;
use crate::location::{Dimensions, Location};
use crate::piece::Piece;
use crate::shuffle::{ShuffleConfig, ShuffleRng};

/// In-memory state for one play session: every piece of the active
/// puzzle, keyed by `local_id`, plus the grid it lives on.
///
/// Pieces are fixed at load time; only `current_location` changes
/// afterwards, through [`set_current_location`](Self::set_current_location)
/// and the drag/shuffle operations built on it.
#[derive(Clone, Debug)]
pub struct PuzzleSession {
    pieces: Vec<Piece>,
    cols: u32,
    rows: u32,
    step: i32,
}

impl PuzzleSession {
    /// Build a session from fetched records. Records arrive in whatever
    /// order the store returns them and are sorted by ascending
    /// `local_id` so rendering order is deterministic.
    pub fn new(mut pieces: Vec<Piece>, cols: u32, rows: u32) -> Result<Self, PuzzleError> {
        if cols == 0 || rows == 0 {
            return Err(PuzzleError::InvalidGridDimension { cols, rows });
        }
        pieces.sort_by_key(|piece| piece.local_id);
        Ok(Self {
            pieces,
            cols,
            rows,
            step: DEFAULT_SNAP_STEP,
        })
    }

    /// Override the snap step (shared by drag and shuffle).
    pub fn with_step(mut self, step: i32) -> Self {
        self.step = step;
        self
    }

    pub fn step(&self) -> i32 {
        self.step
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, local_id: u32) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.local_id == local_id)
    }

    fn piece_mut(&mut self, local_id: u32) -> Result<&mut Piece, PuzzleError> {
        self.pieces
            .iter_mut()
            .find(|piece| piece.local_id == local_id)
            .ok_or(PuzzleError::UnknownPiece { local_id })
    }

    /// Overall puzzle pixel size: the grid times the shared piece size.
    pub fn dimensions(&self) -> Dimensions {
        match self.pieces.first() {
            Some(first) => Dimensions::new(
                self.cols * first.dimensions.x,
                self.rows * first.dimensions.y,
            ),
            None => Dimensions::default(),
        }
    }

    /// Mutate one piece's current location; everything else is untouched.
    pub fn set_current_location(
        &mut self,
        local_id: u32,
        location: Location,
    ) -> Result<(), PuzzleError> {
        self.piece_mut(local_id)?.current_location = location;
        Ok(())
    }

    /// Apply a finished drag to its piece. Returns the committed location
    /// so the caller can persist it.
    pub fn apply_drag(&mut self, outcome: DragOutcome) -> Result<Location, PuzzleError> {
        let piece = self.piece_mut(outcome.piece)?;
        piece.current_location = piece
            .current_location
            .offset(outcome.delta.0, outcome.delta.1);
        Ok(piece.current_location)
    }

    /// Scatter every piece around its true location by bounded multiples
    /// of the snap step.
    pub fn shuffle(&mut self, config: &ShuffleConfig, rng: &mut ShuffleRng) {
        for piece in &mut self.pieces {
            let (mx, my) = config.draw(rng);
            piece.current_location = piece
                .true_location
                .offset(mx * self.step, my * self.step);
        }
        if config.displace_at_least_one
            && self.pieces.iter().all(Piece::is_home)
            && let Some(first) = self.pieces.first_mut()
        {
            first.current_location = first.true_location.offset(self.step, 0);
        }
    }

    /// Ids of pieces away from their true location. Read-only; calling it
    /// twice without an intervening mutation gives the same answer.
    pub fn wrong_pieces(&self) -> Vec<u32> {
        self.pieces
            .iter()
            .filter(|piece| !piece.is_home())
            .map(|piece| piece.local_id)
            .collect()
    }

    pub fn is_solved(&self) -> bool {
        self.pieces.iter().all(Piece::is_home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{DisplayBudget, PieceGeometry};

    fn test_piece(local_id: u32, geometry: &PieceGeometry) -> Piece {
        let home = geometry.true_location(local_id);
        Piece {
            local_id,
            img_src: format!("data:image/png;base64,piece{local_id}"),
            img_src_extra: None,
            dimensions: geometry.scaled_piece_size(),
            current_location: home,
            true_location: home,
        }
    }

    fn session(cols: u32, rows: u32) -> PuzzleSession {
        let geometry = PieceGeometry::new(
            (cols * 100) as f64,
            (rows * 100) as f64,
            cols,
            rows,
            DisplayBudget {
                max_width: 1000.0,
                max_height: 1000.0,
            },
        )
        .unwrap();
        let pieces = (0..geometry.piece_count())
            .map(|id| test_piece(id, &geometry))
            .collect();
        PuzzleSession::new(pieces, cols, rows).unwrap()
    }

    #[test]
    fn load_sorts_pieces_by_local_id() {
        let mut pieces: Vec<Piece> = session(2, 2).pieces().to_vec();
        pieces.reverse();
        pieces.swap(1, 2);
        let loaded = PuzzleSession::new(pieces, 2, 2).unwrap();
        let ids: Vec<u32> = loaded.pieces().iter().map(|p| p.local_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn rejects_zero_grid() {
        assert!(matches!(
            PuzzleSession::new(Vec::new(), 0, 1),
            Err(PuzzleError::InvalidGridDimension { .. })
        ));
    }

    #[test]
    fn dimensions_cover_the_whole_grid() {
        assert_eq!(session(3, 2).dimensions(), Dimensions::new(300, 200));
    }

    #[test]
    fn set_current_location_touches_one_piece() {
        let mut s = session(2, 2);
        s.set_current_location(2, Location::new(500, 500)).unwrap();
        assert_eq!(s.piece(2).unwrap().current_location, Location::new(500, 500));
        assert_eq!(s.piece(2).unwrap().true_location, Location::new(0, 100));
        for id in [0, 1, 3] {
            assert!(s.piece(id).unwrap().is_home());
        }
    }

    #[test]
    fn unknown_piece_is_an_error() {
        let mut s = session(2, 2);
        assert_eq!(
            s.set_current_location(9, Location::new(0, 0)),
            Err(PuzzleError::UnknownPiece { local_id: 9 })
        );
    }

    #[test]
    fn verify_is_exact_and_idempotent() {
        let mut s = session(2, 2);
        assert!(s.is_solved());
        assert!(s.wrong_pieces().is_empty());

        s.set_current_location(1, Location::new(150, 0)).unwrap();
        assert!(!s.is_solved());
        assert_eq!(s.wrong_pieces(), vec![1]);
        // No mutation in between: same answer.
        assert_eq!(s.wrong_pieces(), vec![1]);

        s.set_current_location(1, Location::new(100, 0)).unwrap();
        assert!(s.is_solved());
    }

    #[test]
    fn shuffle_stays_on_the_snap_grid() {
        let mut s = session(3, 3).with_step(50);
        let mut rng = ShuffleRng::new(99);
        s.shuffle(&ShuffleConfig::default(), &mut rng);
        for piece in s.pieces() {
            let dx = piece.current_location.x - piece.true_location.x;
            let dy = piece.current_location.y - piece.true_location.y;
            assert_eq!(dx % 50, 0);
            assert_eq!(dy % 50, 0);
            assert!((-100..=100).contains(&dx));
            assert!((-50..=100).contains(&dy));
        }
    }

    #[test]
    fn shuffle_with_displacement_guarantee_never_leaves_solved() {
        // A span of (0, 0) on both axes always shuffles in place; the
        // guarantee flag must still displace something.
        let config = ShuffleConfig {
            horizontal: (0, 0),
            vertical: (0, 0),
            displace_at_least_one: true,
        };
        let mut s = session(2, 2);
        let mut rng = ShuffleRng::new(1);
        s.shuffle(&config, &mut rng);
        assert!(!s.is_solved());
        assert_eq!(s.wrong_pieces(), vec![0]);
    }

    #[test]
    fn apply_drag_offsets_the_current_location() {
        let mut s = session(2, 2);
        let committed = s
            .apply_drag(DragOutcome {
                piece: 3,
                delta: (50, -50),
            })
            .unwrap();
        assert_eq!(committed, Location::new(150, 50));
        assert_eq!(s.piece(3).unwrap().current_location, committed);
    }
}
