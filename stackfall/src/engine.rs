//! Engine module - the per-tick state machine
//!
//! Each [`Engine::tick`] runs, in order: spawn (when no piece is active),
//! input (shift, soft drop, rotate), gravity, and when the lock delay runs
//! out, lock followed by line clearing.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::grid::Grid;
use crate::input::InputIntents;
use crate::kinds::{KindSource, RandomKinds};
use crate::piece::{FallSpeed, Piece, PieceKind};
use crate::state::{PieceView, RenderState};

/// Whether the caller should keep ticking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Flow {
    Continue,
    Quit,
}

/// What happened during a tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickEvents {
    /// Kind of the piece spawned at the start of the tick
    pub spawned: Option<PieceKind>,
    /// Kind of the piece merged into the grid
    pub locked: Option<PieceKind>,
    /// Rows removed after the lock, as found before clearing
    pub cleared_rows: Vec<usize>,
    /// Locked cells discarded because they were above the ceiling
    pub clipped_cells: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickOutcome {
    pub flow: Flow,
    pub state: RenderState,
    pub events: TickEvents,
}

/// Owner of the grid, the active piece and the lock timer
#[derive(Debug)]
pub struct Engine<K: KindSource = RandomKinds> {
    config: EngineConfig,
    grid: Grid,
    current: Option<Piece>,
    lock_timer: f64,
    kinds: K,
}

impl Engine<RandomKinds> {
    /// Engine drawing kinds from an OS-seeded generator
    pub fn random(config: EngineConfig) -> Result<Self> {
        Engine::new(config, RandomKinds::new())
    }

    /// Engine drawing kinds from a seeded generator
    pub fn seeded(config: EngineConfig, seed: u64) -> Result<Self> {
        Engine::new(config, RandomKinds::seeded(seed))
    }
}

impl<K: KindSource> Engine<K> {
    /// Create an engine with an empty grid and no active piece
    pub fn new(config: EngineConfig, kinds: K) -> Result<Self> {
        config.validate()?;
        let grid = Grid::new(config.width, config.height);
        let lock_timer = config.lock_delay_ticks;
        tracing::debug!("Engine created with {}x{} grid", config.width, config.height);
        Ok(Engine {
            config,
            grid,
            current: None,
            lock_timer,
            kinds,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid access for setting up positions
    ///
    /// Cells written under the active piece break the no-overlap invariant.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn piece(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    /// Remaining grounded ticks before the active piece locks
    pub fn lock_timer(&self) -> f64 {
        self.lock_timer
    }

    /// Snapshot for renderers
    pub fn state(&self) -> RenderState {
        RenderState {
            grid: self.grid.clone(),
            piece: self.current.as_ref().map(PieceView::from),
        }
    }

    /// Advance the simulation by one step
    ///
    /// A quit intent does not cut the tick short: the step is fully simulated
    /// and the returned flow tells the caller to stop.
    pub fn tick(&mut self, input: InputIntents) -> TickOutcome {
        let mut events = TickEvents::default();

        let piece = self.current.get_or_insert_with(|| {
            let piece = Piece::spawn(&mut self.kinds, &self.config);
            tracing::debug!("Spawned {:?} at {:?}", piece.kind(), piece.position());
            events.spawned = Some(piece.kind());
            self.lock_timer = self.config.lock_delay_ticks;
            piece
        });

        if input.move_left && !piece.try_shift(&self.grid, -1) {
            tracing::trace!("Move left rejected at {:?}", piece.position());
        }
        if input.move_right && !piece.try_shift(&self.grid, 1) {
            tracing::trace!("Move right rejected at {:?}", piece.position());
        }
        // Only a new spawn goes back to normal speed
        if input.soft_drop {
            piece.set_fall_speed(FallSpeed::SoftDrop);
        }
        if input.rotate && !piece.try_rotate(&self.grid) {
            tracing::trace!("Rotation rejected at {:?}", piece.position());
        }

        let dy = piece.fall_speed().rows_per_tick(&self.config);
        let lock_now = if piece.try_descend(&self.grid, dy) {
            self.lock_timer = self.config.lock_delay_ticks;
            false
        } else {
            self.lock_timer -= 1.0;
            self.lock_timer <= 0.0
        };

        if lock_now {
            self.lock_current(&mut events);
            self.clear_full_rows(&mut events);
        }

        let flow = if input.quit { Flow::Quit } else { Flow::Continue };
        TickOutcome {
            flow,
            state: self.state(),
            events,
        }
    }

    fn lock_current(&mut self, events: &mut TickEvents) {
        let Some(piece) = self.current.take() else {
            return;
        };
        let color = piece.color();
        for (x, y) in piece.lock_cells() {
            if y < 0 {
                events.clipped_cells += 1;
                continue;
            }
            assert!(x >= 0, "locked cell at column {} left of the grid", x);
            self.grid.place(x as usize, y as usize, color);
        }
        if events.clipped_cells > 0 {
            tracing::warn!(
                "Stack reached the ceiling: {} cells of {:?} locked above the grid were dropped",
                events.clipped_cells,
                piece.kind()
            );
        }
        tracing::debug!("Locked {:?} at {:?}", piece.kind(), piece.position());
        events.locked = Some(piece.kind());
    }

    fn clear_full_rows(&mut self, events: &mut TickEvents) {
        let rows = self.grid.find_full_rows();
        if rows.is_empty() {
            return;
        }
        self.grid.clear_and_collapse(&rows);
        tracing::debug!("Cleared rows {:?}", rows);
        events.cleared_rows = rows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellType;
    use crate::kinds::SequenceKinds;
    use crate::piece::{rotate, Position};

    fn engine_with(kinds: Vec<PieceKind>) -> Engine<SequenceKinds> {
        Engine::new(EngineConfig::default(), SequenceKinds::new(kinds)).unwrap()
    }

    /// Tick with `input` until a piece locks, panicking after `limit` ticks
    fn run_until_lock<K: KindSource>(engine: &mut Engine<K>, input: InputIntents, limit: usize) -> TickOutcome {
        for _ in 0..limit {
            let outcome = engine.tick(input);
            if outcome.events.locked.is_some() {
                return outcome;
            }
        }
        panic!("no lock within {} ticks", limit);
    }

    #[test]
    fn test_engine_creation() {
        let engine = engine_with(vec![PieceKind::I]);
        assert_eq!(engine.grid().width(), 10);
        assert_eq!(engine.grid().height(), 20);
        assert!(engine.piece().is_none());
        assert!(format!("{:?}", engine).starts_with("Engine"));
        assert!(Engine::new(EngineConfig::new().with_size(2, 2), SequenceKinds::repeat(PieceKind::O)).is_err());
    }

    #[test]
    fn test_first_tick_spawns_and_falls() {
        let mut engine = engine_with(vec![PieceKind::T, PieceKind::O]);
        let outcome = engine.tick(InputIntents::none());

        assert_eq!(outcome.flow, Flow::Continue);
        assert_eq!(outcome.events.spawned, Some(PieceKind::T));
        let piece = outcome.state.piece.expect("active piece");
        assert_eq!(piece.color, CellType::T);
        assert_eq!(piece.position.x, 4);
        assert!((piece.position.y - -1.9).abs() < 1e-9);
        assert_eq!(engine.lock_timer(), 30.0);

        let outcome = engine.tick(InputIntents::none());
        assert_eq!(outcome.events.spawned, None);
    }

    #[test]
    fn test_quit_still_simulates() {
        let mut engine = engine_with(vec![PieceKind::O]);
        let outcome = engine.tick(InputIntents::quit());
        assert_eq!(outcome.flow, Flow::Quit);
        assert_eq!(outcome.events.spawned, Some(PieceKind::O));
    }

    #[test]
    fn test_move_left_against_wall_is_rejected() {
        let mut engine = engine_with(vec![PieceKind::O]);
        for _ in 0..10 {
            engine.tick(InputIntents::left());
        }
        let x = engine.piece().unwrap().position().x;
        assert_eq!(x, 0);

        let outcome = engine.tick(InputIntents::left());
        assert_eq!(outcome.state.piece.unwrap().position.x, 0);
    }

    #[test]
    fn test_move_right_and_rotate() {
        let mut engine = engine_with(vec![PieceKind::T]);
        engine.tick(InputIntents::right());
        assert_eq!(engine.piece().unwrap().position().x, 5);

        engine.tick(InputIntents::rotate());
        let piece = engine.piece().unwrap();
        assert_eq!(*piece.shape(), rotate(&PieceKind::T.shape()));
        assert_eq!(piece.position().x, 5);
        assert_eq!(piece.color(), CellType::T);
    }

    #[test]
    fn test_soft_drop_falls_faster_and_sticks() {
        let mut normal = engine_with(vec![PieceKind::L]);
        let mut fast = engine_with(vec![PieceKind::L]);

        let slow_y = normal.tick(InputIntents::none()).state.piece.unwrap().position.y;
        let fast_y = fast.tick(InputIntents::soft_drop()).state.piece.unwrap().position.y;
        assert!(fast_y - -2.0 > slow_y - -2.0);

        // Releasing the key does not restore normal speed mid-fall
        let before = fast.piece().unwrap().position().y;
        let after = fast.tick(InputIntents::none()).state.piece.unwrap().position.y;
        assert!((after - before - 0.2).abs() < 1e-9);
        assert_eq!(fast.piece().unwrap().fall_speed(), FallSpeed::SoftDrop);
    }

    #[test]
    fn test_soft_drop_resets_on_next_spawn() {
        let mut engine = engine_with(vec![PieceKind::O, PieceKind::T]);
        engine.tick(InputIntents::soft_drop());
        run_until_lock(&mut engine, InputIntents::none(), 1000);

        let outcome = engine.tick(InputIntents::none());
        assert_eq!(outcome.events.spawned, Some(PieceKind::T));
        assert_eq!(engine.piece().unwrap().fall_speed(), FallSpeed::Normal);
    }

    #[test]
    fn test_lock_after_delay_ticks() {
        let config = EngineConfig::new()
            .with_size(4, 2)
            .with_normal_speed(1.0)
            .with_soft_drop_speed(2.0)
            .with_lock_delay_ticks(3.0)
            .with_spawn_y(0.0);
        let mut engine = Engine::new(config, SequenceKinds::repeat(PieceKind::O)).unwrap();

        let first = engine.tick(InputIntents::none());
        assert_eq!(first.events.locked, None);
        assert_eq!(engine.lock_timer(), 2.0);
        assert_eq!(engine.tick(InputIntents::none()).events.locked, None);

        let third = engine.tick(InputIntents::none());
        assert_eq!(third.events.locked, Some(PieceKind::O));
        assert!(third.state.piece.is_none());
        assert_eq!(engine.grid().filled_count(), 4);
        assert_eq!(engine.grid().get_cell(1, 0), Some(CellType::O));
        assert_eq!(engine.grid().get_cell(2, 1), Some(CellType::O));
    }

    #[test]
    fn test_descending_resets_lock_timer() {
        let config = EngineConfig::new()
            .with_size(5, 3)
            .with_normal_speed(1.0)
            .with_soft_drop_speed(2.0)
            .with_lock_delay_ticks(5.0)
            .with_spawn_y(0.0);
        let mut engine = Engine::new(config, SequenceKinds::repeat(PieceKind::O)).unwrap();
        // Ledge under the spawn columns, two-wide hole on the right
        engine.grid_mut().place(1, 2, CellType::Z);
        engine.grid_mut().place(2, 2, CellType::Z);

        engine.tick(InputIntents::none());
        engine.tick(InputIntents::none());
        assert_eq!(engine.lock_timer(), 3.0);

        // Still resting on the ledge after one step right
        engine.tick(InputIntents::right());
        assert_eq!(engine.lock_timer(), 2.0);

        // Over the hole it falls again and the delay starts over
        engine.tick(InputIntents::right());
        assert_eq!(engine.piece().unwrap().position(), Position::new(3, 1.0));
        assert_eq!(engine.lock_timer(), 5.0);

        engine.tick(InputIntents::none());
        assert_eq!(engine.lock_timer(), 4.0);
    }

    #[test]
    fn test_horizontal_bar_locks_on_floor() {
        let mut engine = engine_with(vec![PieceKind::I]);
        let outcome = run_until_lock(&mut engine, InputIntents::none(), 1000);

        assert!(outcome.events.cleared_rows.is_empty());
        let grid = engine.grid();
        assert_eq!(grid.filled_count(), 4);
        for x in 3..7 {
            assert_eq!(grid.get_cell(x, 19), Some(CellType::I));
        }
        assert_eq!(outcome.state.grid, *grid);
    }

    #[test]
    fn test_filling_gap_clears_row() {
        let mut engine = engine_with(vec![PieceKind::I]);
        for x in 0..10 {
            if x != 4 {
                engine.grid_mut().place(x, 19, CellType::J);
            }
        }
        engine.grid_mut().place(0, 10, CellType::S);

        // Stand the bar up in column 4 on the first tick
        engine.tick(InputIntents::rotate());
        let outcome = run_until_lock(&mut engine, InputIntents::none(), 1000);

        assert_eq!(outcome.events.cleared_rows, vec![19]);
        let grid = engine.grid();
        assert_eq!(grid.get_cell(0, 10), Some(CellType::Empty));
        assert_eq!(grid.get_cell(0, 11), Some(CellType::S));
        // Three bar cells remain above the cleared row, now one lower
        for y in 17..20 {
            assert_eq!(grid.get_cell(4, y), Some(CellType::I), "row {}", y);
        }
        assert_eq!(grid.filled_count(), 4);
        assert!(grid.find_full_rows().is_empty());
    }

    #[test]
    fn test_lock_above_ceiling_drops_cells() {
        let config = EngineConfig::new()
            .with_size(4, 2)
            .with_normal_speed(1.0)
            .with_soft_drop_speed(2.0)
            .with_lock_delay_ticks(1.0)
            .with_spawn_y(-1.0);
        let mut engine = Engine::new(config, SequenceKinds::repeat(PieceKind::O)).unwrap();
        engine.grid_mut().place(1, 1, CellType::L);

        let outcome = engine.tick(InputIntents::none());
        assert_eq!(outcome.events.locked, Some(PieceKind::O));
        assert_eq!(outcome.events.clipped_cells, 2);
        assert_eq!(engine.grid().get_cell(1, 0), Some(CellType::O));
        assert_eq!(engine.grid().get_cell(2, 0), Some(CellType::O));
        assert_eq!(engine.grid().get_cell(1, 1), Some(CellType::L));
    }

    #[test]
    fn test_lock_between_ceiling_and_first_row() {
        let config = EngineConfig::new()
            .with_size(10, 4)
            .with_normal_speed(0.25)
            .with_soft_drop_speed(0.5)
            .with_lock_delay_ticks(1.0);
        let mut engine = Engine::new(config, SequenceKinds::repeat(PieceKind::O)).unwrap();
        engine.grid_mut().place(4, 1, CellType::Z);
        engine.grid_mut().place(5, 1, CellType::Z);

        // The O falls from -2.0 until it rests at -0.25: its top row still
        // tests as row 0, but locking floors the origin to -1.
        let outcome = run_until_lock(&mut engine, InputIntents::none(), 20);
        assert_eq!(outcome.events.locked, Some(PieceKind::O));
        assert_eq!(outcome.events.clipped_cells, 2);
        assert_eq!(engine.grid().get_cell(4, 0), Some(CellType::O));
        assert_eq!(engine.grid().get_cell(5, 0), Some(CellType::O));
        assert_eq!(engine.grid().filled_count(), 4);
    }

    #[test]
    fn test_fast_fall_lands_on_ledge() {
        let config = EngineConfig::new()
            .with_size(4, 6)
            .with_normal_speed(3.0)
            .with_soft_drop_speed(4.0)
            .with_lock_delay_ticks(1.0)
            .with_spawn_y(0.0);
        let mut engine = Engine::new(config, SequenceKinds::repeat(PieceKind::O)).unwrap();
        engine.grid_mut().place(1, 2, CellType::Z);
        engine.grid_mut().place(2, 2, CellType::Z);

        let outcome = engine.tick(InputIntents::none());
        assert_eq!(outcome.events.locked, Some(PieceKind::O));
        for (x, y) in [(1, 0), (2, 0), (1, 1), (2, 1)] {
            assert_eq!(engine.grid().get_cell(x, y), Some(CellType::O));
        }
        assert!(engine.grid().row(5).iter().all(|cell| cell.is_empty()));
    }

    #[test]
    fn test_seeded_engines_agree() {
        let mut a = Engine::seeded(EngineConfig::default(), 99).unwrap();
        let mut b = Engine::seeded(EngineConfig::default(), 99).unwrap();
        for _ in 0..600 {
            let left = a.tick(InputIntents::none());
            let right = b.tick(InputIntents::none());
            assert_eq!(left, right);
        }
        assert_eq!(a.piece().map(|p| p.position()), b.piece().map(|p| p.position()));
    }
}
