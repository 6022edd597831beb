use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use crate::components::{Dir, Enemy, Pos};
use crate::config::Tuning;
use crate::level::Grid;
use crate::pathfind;

/// Steps every enemy that is neither frozen nor cooling down. Mostly chases
/// `target` via the path finder, otherwise wanders to a random open neighbor.
pub fn move_enemies(
    enemies: &mut [Enemy],
    grid: &Grid,
    target: Pos,
    now: Duration,
    tuning: &Tuning,
    rng: &mut impl Rng,
) {
    for enemy in enemies.iter_mut() {
        if !enemy.ready(now) {
            continue;
        }

        let chase = if rng.gen_bool(tuning.chase_chance()) {
            pathfind::next_step(grid, enemy.pos, target, tuning.path_budget)
        } else {
            None
        };
        match chase {
            Some(next) => enemy.pos = next,
            None => {
                if let Some(next) = wander(grid, enemy.pos, rng) {
                    enemy.pos = next;
                }
            }
        }
        trace!(x = enemy.pos.x, y = enemy.pos.y, "enemy stepped");

        enemy.move_cooldown = now + tuning.enemy_step_interval;
    }
}

fn wander(grid: &Grid, pos: Pos, rng: &mut impl Rng) -> Option<Pos> {
    let mut dirs = Dir::ALL;
    dirs.shuffle(rng);
    dirs.iter().find_map(|dir| grid.open_step(pos, *dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn always_chasing_enemy_closes_in() {
        let grid = Grid::parse(&[
            "##########",
            "#........#",
            "##########",
        ]);
        let tuning = Tuning {
            chase_probability: 1.0,
            ..Tuning::default()
        };
        let mut enemies = vec![Enemy::new(Pos::new(8, 1))];
        let mut rng = StdRng::seed_from_u64(5);

        move_enemies(&mut enemies, &grid, Pos::new(1, 1), secs(1), &tuning, &mut rng);
        assert_eq!(enemies[0].pos, Pos::new(7, 1));
        assert_eq!(enemies[0].move_cooldown, secs(1) + tuning.enemy_step_interval);

        // Still cooling down.
        move_enemies(&mut enemies, &grid, Pos::new(1, 1), secs(1), &tuning, &mut rng);
        assert_eq!(enemies[0].pos, Pos::new(7, 1));
    }

    #[test]
    fn frozen_enemy_stays_put() {
        let grid = Grid::room(8, 8);
        let tuning = Tuning::default();
        let mut enemies = vec![Enemy::new(Pos::new(2, 2))];
        enemies[0].freeze_until = secs(10);
        let mut rng = StdRng::seed_from_u64(5);

        for t in 0..10 {
            move_enemies(&mut enemies, &grid, Pos::new(5, 5), secs(t), &tuning, &mut rng);
            assert_eq!(enemies[0].pos, Pos::new(2, 2));
        }
        move_enemies(&mut enemies, &grid, Pos::new(5, 5), secs(10), &tuning, &mut rng);
        assert_ne!(enemies[0].pos, Pos::new(2, 2));
    }

    #[test]
    fn boxed_in_enemy_still_resets_cooldown() {
        let grid = Grid::parse(&[
            "###",
            "#.#",
            "###",
        ]);
        let tuning = Tuning::default();
        let mut enemies = vec![Enemy::new(Pos::new(1, 1))];
        let mut rng = StdRng::seed_from_u64(2);

        move_enemies(&mut enemies, &grid, Pos::new(5, 5), secs(3), &tuning, &mut rng);
        assert_eq!(enemies[0].pos, Pos::new(1, 1));
        assert_eq!(enemies[0].move_cooldown, secs(3) + tuning.enemy_step_interval);
    }

    #[test]
    fn out_of_range_chase_probability_does_not_panic() {
        let grid = Grid::room(6, 6);
        let mut rng = StdRng::seed_from_u64(9);
        for (t, p) in [(0, 2.5), (1, -1.0), (2, f64::NAN)] {
            let tuning = Tuning {
                chase_probability: p,
                ..Tuning::default()
            };
            let mut enemies = vec![Enemy::new(Pos::new(1, 1))];
            move_enemies(&mut enemies, &grid, Pos::new(4, 4), secs(t), &tuning, &mut rng);
            assert!(grid.is_floor(enemies[0].pos));
            assert_ne!(enemies[0].pos, Pos::new(1, 1));
        }
    }

    #[test]
    fn wandering_enemy_stays_on_floor() {
        let grid = Grid::room(6, 6);
        let tuning = Tuning {
            chase_probability: 0.0,
            ..Tuning::default()
        };
        let mut enemies = vec![Enemy::new(Pos::new(1, 1))];
        let mut rng = StdRng::seed_from_u64(8);
        for t in 0..50 {
            move_enemies(&mut enemies, &grid, Pos::new(4, 4), secs(t), &tuning, &mut rng);
            assert!(grid.is_floor(enemies[0].pos));
        }
    }
}
