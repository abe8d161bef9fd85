use chrono::prelude::*;
use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::notify::NotifierHandle;
use crate::*;

/// Lifecycle of one game.
///
/// Valid transitions:
/// - Play -> Win
/// - Play -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameStatus {
    Play,
    Win,
    Lost,
}

impl GameStatus {
    /// Indicates the game has ended and no moves are accepted anymore.
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Win | Self::Lost)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::Play
    }
}

/// Owns one game from reset to finish.
///
/// The mine layout does not exist until the first reveal; it is generated at
/// that point with the whole 3×3 neighborhood of the revealed cell kept
/// mine-free. All state handed out is a snapshot; callers never hold
/// references into the grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEngine {
    config: GameConfig,
    layout: Option<MineLayout>,
    board: Array2<CellState>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    status: GameStatus,
    triggered_mine: Option<Coord2>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    seed: u64,
    #[serde(skip)]
    notifier: NotifierHandle,
}

impl GameEngine {
    /// Starts a game with a random per-game seed.
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_seed(config, rand::random())
    }

    /// Starts a game whose lazy mine placement is fully determined by `seed`
    /// and the first revealed cell.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            layout: None,
            board: Array2::default(config.size.to_nd_index()),
            revealed_count: 0,
            flagged_count: 0,
            status: GameStatus::Play,
            triggered_mine: None,
            started_at: Utc::now(),
            ended_at: None,
            seed,
            notifier: NotifierHandle::default(),
        })
    }

    /// Starts a game on a prebuilt layout, skipping lazy generation; the
    /// first reveal carries no safety guarantee.
    pub fn with_layout(layout: MineLayout) -> Self {
        let config = layout.game_config();
        Self {
            config,
            board: Array2::default(config.size.to_nd_index()),
            layout: Some(layout),
            revealed_count: 0,
            flagged_count: 0,
            status: GameStatus::Play,
            triggered_mine: None,
            started_at: Utc::now(),
            ended_at: None,
            seed: 0,
            notifier: NotifierHandle::default(),
        }
    }

    /// Reinitializes for a new game, drawing a fresh seed. An attached
    /// notifier survives the reset.
    pub fn reset(&mut self, config: GameConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        self.layout = None;
        self.board = Array2::default(config.size.to_nd_index());
        self.revealed_count = 0;
        self.flagged_count = 0;
        self.status = GameStatus::Play;
        self.triggered_mine = None;
        self.started_at = Utc::now();
        self.ended_at = None;
        self.seed = rand::random();
        log::debug!(
            "reset to {}x{} with {} mines",
            config.size.0,
            config.size.1,
            config.mines
        );
        Ok(())
    }

    /// Restarts with the current configuration.
    pub fn restart(&mut self) -> Result<()> {
        self.reset(self.config)
    }

    pub fn set_notifier(&mut self, notifier: Arc<dyn GameNotifier>) {
        self.notifier.set(notifier);
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn width(&self) -> Coord {
        self.config.size.0
    }

    pub fn height(&self) -> Coord {
        self.config.size.1
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_final()
    }

    pub fn mine_generated(&self) -> bool {
        self.layout.is_some()
    }

    /// The mine that ended the game, if it ended by explosion.
    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Seconds since the game was (re)started; frozen once the game ends.
    pub fn elapsed_secs(&self) -> u32 {
        (self.ended_at.unwrap_or_else(Utc::now) - self.started_at)
            .num_seconds()
            .max(0) as u32
    }

    /// How many mines have not been flagged yet; negative with overflagging.
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.flagged_count as isize)
    }

    pub fn revealed_cells(&self) -> CellCount {
        self.revealed_count
    }

    /// Snapshot of one cell.
    pub fn cell_at(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(self.snapshot_cell(coords))
    }

    /// Row-major snapshot of the whole board.
    pub fn cells(&self) -> Vec<Cell> {
        let (size_x, size_y) = self.config.size;
        let mut cells = Vec::with_capacity(usize::from(size_x) * usize::from(size_y));
        for y in 0..size_y {
            for x in 0..size_x {
                cells.push(self.snapshot_cell((x, y)));
            }
        }
        cells
    }

    /// Primary click. A flag on the cell does not block a direct reveal.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        if self.status.is_final() {
            return Ok(RevealOutcome::NoChange);
        }
        if self.board[coords.to_nd_index()].is_revealed() {
            return Ok(RevealOutcome::NoChange);
        }

        self.ensure_layout(coords);
        let mut outcome = self.reveal_single(coords);
        if !self.status.is_final() && self.is_win_reached() {
            self.finish(true);
            outcome = outcome | RevealOutcome::Won;
        }
        Ok(outcome)
    }

    /// Secondary click. Never participates in the win check.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        use CellState::*;

        let coords = self.validate_coords(coords)?;
        if self.status.is_final() {
            return Ok(FlagOutcome::NoChange);
        }

        Ok(match self.board[coords.to_nd_index()] {
            Hidden => {
                self.board[coords.to_nd_index()] = Flagged;
                self.flagged_count += 1;
                FlagOutcome::Changed
            }
            Flagged => {
                self.board[coords.to_nd_index()] = Hidden;
                self.flagged_count -= 1;
                FlagOutcome::Changed
            }
            Revealed(_) => FlagOutcome::NoChange,
        })
    }

    /// Double-click on a revealed numbered cell. Both effects are judged
    /// against the neighbor states captured before anything mutates:
    /// matching flag count opens the remaining neighbors, and a hidden count
    /// that matches the missing flags marks those neighbors instead.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<ChordOutcome> {
        let coords = self.validate_coords(coords)?;
        if self.status.is_final() {
            return Ok(ChordOutcome::NO_CHANGE);
        }
        let CellState::Revealed(adjacent) = self.board[coords.to_nd_index()] else {
            return Ok(ChordOutcome::NO_CHANGE);
        };

        let snapshot: SmallVec<[(Coord2, CellState); 8]> = self
            .iter_neighbors(coords)
            .map(|pos| (pos, self.board[pos.to_nd_index()]))
            .collect();
        let flagged = snapshot
            .iter()
            .filter(|(_, state)| state.is_flagged())
            .count() as i16;
        let hidden = snapshot
            .iter()
            .filter(|(_, state)| matches!(state, CellState::Hidden))
            .count() as i16;

        let mut reveal_outcome = RevealOutcome::NoChange;
        if flagged == i16::from(adjacent) {
            for &(pos, state) in &snapshot {
                if matches!(state, CellState::Hidden) {
                    reveal_outcome = reveal_outcome | self.reveal_single(pos);
                }
            }
        }

        let mut flag_outcome = FlagOutcome::NoChange;
        if hidden == i16::from(adjacent) - flagged {
            for &(pos, state) in &snapshot {
                if matches!(state, CellState::Hidden)
                    && matches!(self.board[pos.to_nd_index()], CellState::Hidden)
                {
                    self.board[pos.to_nd_index()] = CellState::Flagged;
                    self.flagged_count += 1;
                    flag_outcome = FlagOutcome::Changed;
                }
            }
        }

        if !self.status.is_final() && self.is_win_reached() {
            self.finish(true);
            reveal_outcome = reveal_outcome | RevealOutcome::Won;
        }

        Ok(ChordOutcome {
            reveal: reveal_outcome,
            flags: flag_outcome,
        })
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (size_x, size_y) = self.config.size;
        if coords.0 < size_x && coords.1 < size_y {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    fn snapshot_cell(&self, coords: Coord2) -> Cell {
        let state = self.board[coords.to_nd_index()];
        let (is_mine, adjacent_mines) = match &self.layout {
            Some(layout) => (layout.is_mine(coords), layout.adjacent_mines(coords)),
            None => (false, 0),
        };
        Cell {
            x: coords.0,
            y: coords.1,
            is_mine,
            adjacent_mines,
            revealed: state.is_revealed(),
            flagged: state.is_flagged(),
        }
    }

    fn ensure_layout(&mut self, initial: Coord2) {
        if self.layout.is_some() {
            return;
        }

        let layout =
            RandomLayoutGenerator::new(self.seed, initial, FirstMovePolicy::SafeNeighborhood)
                .generate(self.config);
        log::debug!(
            "generated {} mines on first reveal at {:?}",
            layout.mine_count(),
            initial
        );
        self.layout = Some(layout);
    }

    fn iter_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + use<> {
        neighbors(coords, self.config.size)
    }

    fn has_mine_at(&self, coords: Coord2) -> bool {
        self.layout
            .as_ref()
            .is_some_and(|layout| layout.is_mine(coords))
    }

    fn adjacent_mines_at(&self, coords: Coord2) -> u8 {
        self.layout
            .as_ref()
            .map_or(0, |layout| layout.adjacent_mines(coords))
    }

    /// Opens one cell unconditionally, consuming any flag on it.
    fn set_revealed(&mut self, coords: Coord2) -> u8 {
        if self.board[coords.to_nd_index()].is_flagged() {
            self.flagged_count -= 1;
        }
        let adjacent = self.adjacent_mines_at(coords);
        self.board[coords.to_nd_index()] = CellState::Revealed(adjacent);
        self.revealed_count += 1;
        adjacent
    }

    fn reveal_single(&mut self, coords: Coord2) -> RevealOutcome {
        if self.board[coords.to_nd_index()].is_revealed() {
            return RevealOutcome::NoChange;
        }

        if self.has_mine_at(coords) {
            self.set_revealed(coords);
            self.triggered_mine.get_or_insert(coords);
            log::debug!("hit mine at {:?}", coords);
            self.finish(false);
            return RevealOutcome::Exploded;
        }

        let adjacent = self.set_revealed(coords);
        log::debug!("revealed {:?}, adjacent mines: {}", coords, adjacent);
        if adjacent == 0 {
            self.flood_reveal(coords);
        }
        RevealOutcome::Revealed
    }

    /// Opens the connected zero region around `start` plus its numbered
    /// border. Flags do not stop the cascade; they are consumed.
    fn flood_reveal(&mut self, start: Coord2) {
        let mut visited: HashSet<Coord2> = HashSet::from_iter([start]);
        let mut to_visit: VecDeque<Coord2> = self
            .iter_neighbors(start)
            .filter(|&pos| self.board[pos.to_nd_index()].is_unrevealed())
            .collect();
        log::trace!(
            "flood reveal from {:?}, initial neighbors: {:?}",
            start,
            to_visit
        );

        while let Some(coords) = to_visit.pop_front() {
            if !visited.insert(coords) {
                continue;
            }
            if self.board[coords.to_nd_index()].is_revealed() {
                continue;
            }

            let adjacent = self.set_revealed(coords);
            log::trace!("flood revealed {:?}, adjacent mines: {}", coords, adjacent);

            if adjacent == 0 {
                let next: Vec<Coord2> = self
                    .iter_neighbors(coords)
                    .filter(|&pos| self.board[pos.to_nd_index()].is_unrevealed())
                    .filter(|pos| !visited.contains(pos))
                    .collect();
                to_visit.extend(next);
            }
        }
    }

    /// Won when every cell is revealed, flagged, or a mine. Misplaced flags
    /// do not change the outcome.
    fn is_win_reached(&self) -> bool {
        let Some(layout) = &self.layout else {
            return false;
        };
        self.board.indexed_iter().all(|((x, y), state)| match state {
            CellState::Revealed(_) | CellState::Flagged => true,
            CellState::Hidden => layout.is_mine((x as Coord, y as Coord)),
        })
    }

    fn finish(&mut self, won: bool) {
        if self.status.is_final() {
            return;
        }

        self.status = if won { GameStatus::Win } else { GameStatus::Lost };
        self.ended_at = Some(Utc::now());
        log::debug!("game over: {:?}", self.status);

        if won {
            self.triggered_mine = None;
            self.notifier.notify_won();
        } else {
            self.reveal_all_mines();
            self.notifier.notify_lost();
        }
    }

    /// Shows every mine once the game is lost.
    fn reveal_all_mines(&mut self) {
        let (size_x, size_y) = self.config.size;
        for x in 0..size_x {
            for y in 0..size_y {
                let coords = (x, y);
                if self.has_mine_at(coords) && !self.board[coords.to_nd_index()].is_revealed() {
                    self.set_revealed(coords);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    fn layout(size: Coord2, mines: &[Coord2]) -> MineLayout {
        MineLayout::with_mines(size, mines).unwrap()
    }

    fn mine_coords(engine: &GameEngine) -> Vec<Coord2> {
        engine
            .cells()
            .iter()
            .filter(|cell| cell.is_mine)
            .map(|cell| cell.coords())
            .collect()
    }

    #[test]
    fn mines_are_generated_on_first_reveal_only() {
        let mut engine = GameEngine::with_seed(GameConfig::new((8, 8), 10), 7).unwrap();
        assert!(!engine.mine_generated());

        engine.toggle_flag((0, 0)).unwrap();
        assert!(!engine.mine_generated());

        engine.reveal((4, 4)).unwrap();
        assert!(engine.mine_generated());

        let mines = mine_coords(&engine);
        assert_eq!(mines.len(), 10);
        assert!(mines.iter().all(|&pos| !in_neighborhood((4, 4), pos)));
    }

    #[test]
    fn first_revealed_cell_opens_a_zero_region() {
        let mut engine = GameEngine::with_seed(GameConfig::new((8, 8), 10), 99).unwrap();

        engine.reveal((4, 4)).unwrap();

        let first = engine.cell_at((4, 4)).unwrap();
        assert!(first.revealed);
        assert_eq!(first.adjacent_mines, 0);
    }

    #[test]
    fn adjacency_counts_match_the_neighborhood() {
        let mut engine = GameEngine::with_seed(GameConfig::new((8, 8), 12), 21).unwrap();
        engine.reveal((0, 0)).unwrap();

        for cell in engine.cells() {
            if cell.is_mine {
                continue;
            }
            let expected = neighbors(cell.coords(), engine.size())
                .filter(|&pos| engine.cell_at(pos).unwrap().is_mine)
                .count() as u8;
            assert_eq!(cell.adjacent_mines, expected, "at {:?}", cell.coords());
        }
    }

    #[test]
    fn same_seed_and_first_move_reproduce_the_game() {
        let config = GameConfig::new((8, 8), 10);
        let mut a = GameEngine::with_seed(config, 1234).unwrap();
        let mut b = GameEngine::with_seed(config, 1234).unwrap();

        a.reveal((3, 3)).unwrap();
        b.reveal((3, 3)).unwrap();

        assert_eq!(mine_coords(&a), mine_coords(&b));
    }

    #[test]
    fn zero_mine_board_wins_on_the_first_reveal() {
        let mut engine = GameEngine::with_seed(GameConfig::new((2, 1), 0), 5).unwrap();

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(engine.status(), GameStatus::Win);
        assert!(engine.mine_generated());
        assert!(engine.cell_at((1, 0)).unwrap().revealed);
    }

    #[test]
    fn corner_mine_board_wins_in_one_cascade() {
        let mut engine = GameEngine::with_layout(layout((3, 3), &[(2, 2)]));

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(engine.status(), GameStatus::Win);
        for cell in engine.cells() {
            if cell.is_mine {
                assert!(!cell.revealed);
            } else {
                assert!(cell.revealed, "at {:?}", cell.coords());
            }
        }
    }

    #[test]
    fn revealing_a_mine_loses_and_shows_all_mines() {
        let mut engine = GameEngine::with_layout(layout((3, 3), &[(1, 1), (2, 2)]));

        let outcome = engine.reveal((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::Exploded);
        assert_eq!(engine.status(), GameStatus::Lost);
        assert_eq!(engine.triggered_mine(), Some((1, 1)));
        assert!(engine.ended_at().is_some());
        assert!(engine.cell_at((2, 2)).unwrap().revealed);
    }

    #[test]
    fn cascade_stops_at_the_numbered_border() {
        let mut engine = GameEngine::with_layout(layout((7, 1), &[(4, 0)]));

        engine.reveal((0, 0)).unwrap();

        assert_eq!(engine.status(), GameStatus::Play);
        for x in 0..=3 {
            assert!(engine.cell_at((x, 0)).unwrap().revealed);
        }
        assert!(!engine.cell_at((4, 0)).unwrap().revealed);
        assert!(!engine.cell_at((5, 0)).unwrap().revealed);
        assert!(!engine.cell_at((6, 0)).unwrap().revealed);
    }

    #[test]
    fn cascade_consumes_flags_in_its_path() {
        let mut engine = GameEngine::with_layout(layout((7, 1), &[(6, 0)]));
        engine.toggle_flag((2, 0)).unwrap();
        assert_eq!(engine.mines_left(), 0);

        engine.reveal((0, 0)).unwrap();

        let flagged = engine.cell_at((2, 0)).unwrap();
        assert!(flagged.revealed);
        assert!(!flagged.flagged);
        assert_eq!(engine.mines_left(), 1);
    }

    #[test]
    fn direct_reveal_ignores_a_flag() {
        let mut engine = GameEngine::with_layout(layout((2, 2), &[(0, 0)]));
        engine.toggle_flag((1, 1)).unwrap();

        let outcome = engine.reveal((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::Revealed);
        let cell = engine.cell_at((1, 1)).unwrap();
        assert!(cell.revealed);
        assert!(!cell.flagged);
        assert_eq!(engine.mines_left(), 1);
    }

    #[test]
    fn flag_toggles_and_ignores_revealed_cells() {
        let mut engine = GameEngine::with_layout(layout((2, 2), &[(0, 0)]));

        assert_eq!(engine.toggle_flag((0, 1)).unwrap(), FlagOutcome::Changed);
        assert!(engine.cell_at((0, 1)).unwrap().flagged);
        assert_eq!(engine.toggle_flag((0, 1)).unwrap(), FlagOutcome::Changed);
        assert!(!engine.cell_at((0, 1)).unwrap().flagged);

        engine.reveal((1, 1)).unwrap();
        assert_eq!(engine.toggle_flag((1, 1)).unwrap(), FlagOutcome::NoChange);
        assert!(engine.cell_at((1, 1)).unwrap().revealed);
    }

    #[test]
    fn finished_game_accepts_no_more_moves() {
        let mut engine = GameEngine::with_layout(layout((3, 3), &[(1, 1)]));
        engine.reveal((1, 1)).unwrap();
        assert_eq!(engine.status(), GameStatus::Lost);

        let frozen = engine.cells();
        let ended_at = engine.ended_at();

        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine.toggle_flag((0, 0)).unwrap(), FlagOutcome::NoChange);
        assert_eq!(
            engine.chord_reveal((1, 1)).unwrap(),
            ChordOutcome::NO_CHANGE
        );

        assert_eq!(engine.cells(), frozen);
        assert_eq!(engine.status(), GameStatus::Lost);
        assert_eq!(engine.ended_at(), ended_at);
    }

    #[test]
    fn chord_with_matching_flags_opens_the_rest() {
        let mut engine = GameEngine::with_layout(layout((3, 3), &[(0, 0)]));
        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 0)).unwrap();

        let outcome = engine.chord_reveal((1, 1)).unwrap();

        assert_eq!(outcome.reveal, RevealOutcome::Won);
        assert_eq!(engine.status(), GameStatus::Win);
        assert!(!engine.cell_at((0, 0)).unwrap().revealed);
        assert!(engine.cell_at((2, 2)).unwrap().revealed);
    }

    #[test]
    fn chord_with_a_misplaced_flag_explodes() {
        let mut engine = GameEngine::with_layout(layout((3, 3), &[(0, 0)]));
        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((1, 0)).unwrap();

        let outcome = engine.chord_reveal((1, 1)).unwrap();

        assert_eq!(outcome.reveal, RevealOutcome::Exploded);
        assert_eq!(engine.status(), GameStatus::Lost);
        assert_eq!(engine.triggered_mine(), Some((0, 0)));
        // the misjudged neighbors still open, matching single-reveal behavior
        assert!(engine.cell_at((2, 2)).unwrap().revealed);
    }

    #[test]
    fn chord_flags_the_neighbors_that_must_be_mines() {
        let mut engine = GameEngine::with_layout(layout((4, 1), &[(0, 0), (2, 0)]));
        assert_eq!(engine.reveal((1, 0)).unwrap(), RevealOutcome::Revealed);

        let outcome = engine.chord_reveal((1, 0)).unwrap();

        assert_eq!(outcome.flags, FlagOutcome::Changed);
        assert_eq!(outcome.reveal, RevealOutcome::NoChange);
        assert!(engine.cell_at((0, 0)).unwrap().flagged);
        assert!(engine.cell_at((2, 0)).unwrap().flagged);
        assert_eq!(engine.status(), GameStatus::Play);

        assert_eq!(engine.reveal((3, 0)).unwrap(), RevealOutcome::Won);
    }

    #[test]
    fn chord_without_a_match_changes_nothing() {
        let mut engine = GameEngine::with_layout(layout((3, 3), &[(0, 0)]));
        engine.reveal((1, 1)).unwrap();

        let outcome = engine.chord_reveal((1, 1)).unwrap();

        assert_eq!(outcome, ChordOutcome::NO_CHANGE);
        assert!(!engine.cell_at((0, 1)).unwrap().revealed);
    }

    #[test]
    fn chord_on_an_unrevealed_cell_is_a_noop() {
        let mut engine = GameEngine::with_layout(layout((3, 3), &[(0, 0)]));

        assert_eq!(
            engine.chord_reveal((1, 1)).unwrap(),
            ChordOutcome::NO_CHANGE
        );
    }

    #[test]
    fn win_tolerates_a_misplaced_flag() {
        let mut engine = GameEngine::with_layout(layout((2, 2), &[(0, 0)]));
        engine.toggle_flag((0, 1)).unwrap();
        engine.reveal((1, 0)).unwrap();

        let outcome = engine.reveal((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(engine.status(), GameStatus::Win);
        assert!(engine.cell_at((0, 1)).unwrap().flagged);
    }

    #[test]
    fn out_of_bounds_coordinates_are_an_error() {
        let mut engine = GameEngine::with_layout(layout((3, 3), &[(0, 0)]));

        assert_eq!(engine.reveal((5, 5)), Err(GameError::InvalidCoords));
        assert_eq!(engine.toggle_flag((3, 0)), Err(GameError::InvalidCoords));
        assert_eq!(engine.cell_at((0, 3)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn invalid_configurations_are_rejected_up_front() {
        assert_eq!(
            GameEngine::new(GameConfig::new((3, 3), 9)).err(),
            Some(GameError::TooManyMines)
        );
        assert_eq!(
            GameEngine::new(GameConfig::new((0, 3), 1)).err(),
            Some(GameError::EmptyBoard)
        );
    }

    #[test]
    fn reset_starts_a_fresh_game() {
        let mut engine = GameEngine::with_layout(layout((3, 3), &[(1, 1)]));
        engine.reveal((1, 1)).unwrap();
        assert_eq!(engine.status(), GameStatus::Lost);

        engine.reset(GameConfig::new((4, 4), 3)).unwrap();

        assert_eq!(engine.status(), GameStatus::Play);
        assert!(!engine.mine_generated());
        assert!(engine.ended_at().is_none());
        assert_eq!(engine.triggered_mine(), None);
        assert_eq!(engine.revealed_cells(), 0);
        assert!(engine.cells().iter().all(|cell| !cell.revealed));
    }

    #[derive(Default)]
    struct RecordingNotifier {
        won: AtomicUsize,
        lost: AtomicUsize,
    }

    impl GameNotifier for RecordingNotifier {
        fn on_won(&self) {
            self.won.fetch_add(1, Ordering::SeqCst);
        }

        fn on_lost(&self) {
            self.lost.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn won_notification_fires_synchronously() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut engine = GameEngine::with_layout(layout((2, 1), &[(0, 0)]));
        engine.set_notifier(notifier.clone());

        assert_eq!(engine.reveal((1, 0)).unwrap(), RevealOutcome::Won);

        assert_eq!(notifier.won.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.lost.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn lost_notification_arrives_after_the_delay() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut engine = GameEngine::with_layout(layout((2, 1), &[(0, 0)]));
        engine.set_notifier(notifier.clone());

        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Exploded);

        let deadline = Instant::now() + Duration::from_secs(1);
        while notifier.lost.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(notifier.lost.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.won.load(Ordering::SeqCst), 0);
    }
}
