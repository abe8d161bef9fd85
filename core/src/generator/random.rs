use super::*;
use ndarray::Array2;

/// Uniformly random layout for a fixed seed, sampling mine positions without
/// replacement from the cells the first-move policy leaves eligible.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    seed: u64,
    first_move: Coord2,
    policy: FirstMovePolicy,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64, first_move: Coord2, policy: FirstMovePolicy) -> Self {
        Self {
            seed,
            first_move,
            policy,
        }
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        use rand::prelude::*;
        use FirstMovePolicy::*;

        let total = config.total_cells();
        let (size_x, size_y) = config.size;

        // saturated boards skip sampling entirely
        if config.mines >= total {
            if config.mines > total {
                log::warn!(
                    "layout already full, requested {} mines but only {} cells",
                    config.mines,
                    total
                );
            }
            return MineLayout {
                mines: Array2::from_elem(config.size.to_nd_index(), true),
                count: total,
            };
        }

        let neighborhood = 1 + neighbors(self.first_move, config.size).count() as CellCount;
        let policy = match self.policy {
            SafeNeighborhood if config.mines > total - neighborhood => {
                log::warn!("cannot keep the first-move neighborhood clear, falling back to a safe cell");
                SafeCell
            }
            other => other,
        };

        let eligible: Vec<Coord2> = (0..size_x)
            .flat_map(|x| (0..size_y).map(move |y| (x, y)))
            .filter(|&pos| match policy {
                Anywhere => true,
                SafeCell => pos != self.first_move,
                SafeNeighborhood => !in_neighborhood(self.first_move, pos),
            })
            .collect();

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mines: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut count: CellCount = 0;
        for &pos in eligible.choose_multiple(&mut rng, config.mines as usize) {
            mines[pos.to_nd_index()] = true;
            count += 1;
        }

        // double check mine count
        if count != config.mines {
            log::warn!(
                "generated layout count mismatch, actual: {}, requested: {}",
                count,
                config.mines
            );
        }
        MineLayout { mines, count }
    }
}
