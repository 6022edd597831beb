use std::collections::{HashMap, VecDeque};

use crate::components::{Dir, Pos};
use crate::level::Grid;

/// First step of a shortest floor path from `src` to `dst`.
///
/// Breadth-first, expanding at most `max_nodes` cells. When the budget runs
/// out or `dst` is unreachable, falls back to the floor neighbor of `src`
/// strictly closer to `dst` by Manhattan distance; `None` if there is none.
pub fn next_step(grid: &Grid, src: Pos, dst: Pos, max_nodes: usize) -> Option<Pos> {
    if src == dst {
        return Some(src);
    }

    let mut parent: HashMap<Pos, Pos> = HashMap::new();
    let mut queue = VecDeque::from([src]);
    let mut expanded = 0;

    while expanded < max_nodes {
        let Some(pos) = queue.pop_front() else {
            break;
        };
        expanded += 1;
        for dir in Dir::ALL {
            let Some(next) = grid.open_step(pos, dir) else {
                continue;
            };
            if next == src || parent.contains_key(&next) {
                continue;
            }
            parent.insert(next, pos);
            if next == dst {
                return Some(first_step(&parent, src, dst));
            }
            queue.push_back(next);
        }
    }

    greedy_step(grid, src, dst)
}

fn first_step(parent: &HashMap<Pos, Pos>, src: Pos, dst: Pos) -> Pos {
    let mut cur = dst;
    while let Some(&prev) = parent.get(&cur) {
        if prev == src {
            break;
        }
        cur = prev;
    }
    cur
}

fn greedy_step(grid: &Grid, src: Pos, dst: Pos) -> Option<Pos> {
    let mut best = None;
    let mut best_dist = src.manhattan(dst);
    for dir in Dir::ALL {
        if let Some(next) = grid.open_step(src, dir) {
            let d = next.manhattan(dst);
            if d < best_dist {
                best_dist = d;
                best = Some(next);
            }
        }
    }
    best
}
