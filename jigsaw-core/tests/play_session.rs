use jigsaw_core::{
    Dimensions, DragState, Location, Piece, PuzzleSession, ShuffleConfig, ShuffleRng,
};

fn build_session(cols: u32, rows: u32) -> PuzzleSession {
    let piece_w = 100u32;
    let piece_h = 100u32;
    let mut pieces = Vec::with_capacity((cols * rows) as usize);
    for id in 0..cols * rows {
        let home = Location::new(
            (piece_w * (id % cols)) as i32,
            (piece_h * (id / cols)) as i32,
        );
        pieces.push(Piece {
            local_id: id,
            img_src: format!("data:image/png;base64,p{id}"),
            img_src_extra: None,
            dimensions: Dimensions::new(piece_w, piece_h),
            current_location: home,
            true_location: home,
        });
    }
    // Deliberately feed the session out-of-order records.
    pieces.rotate_left(1);
    PuzzleSession::new(pieces, cols, rows).unwrap()
}

#[test]
fn four_piece_puzzle_solves_and_unsolves() {
    let mut session = build_session(2, 2);
    assert!(session.is_solved());

    // Any single piece one snap step away breaks completion.
    for id in 0..4 {
        let home = session.piece(id).unwrap().true_location;
        session
            .set_current_location(id, home.offset(50, 0))
            .unwrap();
        assert!(!session.is_solved());
        assert_eq!(session.wrong_pieces(), vec![id]);
        session.set_current_location(id, home).unwrap();
        assert!(session.is_solved());
    }
}

#[test]
fn shuffle_then_grid_drags_resolve_the_puzzle() {
    let mut session = build_session(2, 2);
    let mut rng = ShuffleRng::new(2024);
    session.shuffle(&ShuffleConfig::default(), &mut rng);

    // Drag each displaced piece home through the drag state machine,
    // simulating pointer travel equal to the displacement.
    for id in session.wrong_pieces() {
        let piece = session.piece(id).unwrap();
        let away = piece.current_location;
        let home = piece.true_location;

        let mut drag = DragState::default();
        let anchor = Location::new(away.x + 10, away.y + 10);
        drag.begin(id, anchor);
        // Pointer lands within snap range of the exact travel.
        let end = Location::new(anchor.x + (home.x - away.x) + 12, anchor.y + (home.y - away.y) - 12);
        let outcome = drag.finish(end, session.step()).unwrap();
        session.apply_drag(outcome).unwrap();
    }

    assert!(session.is_solved());
    assert!(session.wrong_pieces().is_empty());
}

#[test]
fn pieces_load_sorted_regardless_of_fetch_order() {
    let session = build_session(3, 2);
    let ids: Vec<u32> = session.pieces().iter().map(|p| p.local_id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
}
