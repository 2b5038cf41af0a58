//! Ordering helpers shared by the education timeline and the portfolio.
//!
//! Both collections keep an explicit `order` integer next to a numeric `id`.
//! Display order is `order` ascending with `id` as the tie breaker.

use serde::Deserialize;
use std::collections::HashSet;

use crate::types::{AppError, AppResult};

/// An entry with a stable id and a display position.
pub trait Ordered {
    fn id(&self) -> u32;
    fn set_id(&mut self, id: u32);
    fn order(&self) -> i32;
    fn set_order(&mut self, order: i32);
    fn is_active(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// `max(id) + 1`, or 1 for an empty list.
pub fn next_id<T: Ordered>(items: &[T]) -> AppResult<u32> {
    match items.iter().map(Ordered::id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or_else(|| {
            AppError::InvalidRequest(format!("no id is left above {}", max))
        }),
    }
}

/// `max(order) + 1`, or 1 for an empty list.
pub fn next_order<T: Ordered>(items: &[T]) -> AppResult<i32> {
    match items.iter().map(Ordered::order).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or_else(|| {
            AppError::InvalidRequest(format!("no display position is left after {}", max))
        }),
    }
}

/// Appends `item` with a fresh id at the end of the display order.
pub fn insert<T: Ordered + Clone>(items: &mut Vec<T>, mut item: T) -> AppResult<T> {
    item.set_id(next_id(items)?);
    item.set_order(next_order(items)?);
    items.push(item.clone());
    Ok(item)
}

/// Positions of `items` in display order.
fn display_positions<T: Ordered>(items: &[T]) -> Vec<usize> {
    let mut positions: Vec<usize> = (0..items.len()).collect();
    positions.sort_by_key(|&i| (items[i].order(), items[i].id()));
    positions
}

/// Swaps the `order` of the entry `id` with its neighbour in display order.
///
/// Returns `Ok(false)` when the entry already sits at that end of the list.
pub fn move_entry<T: Ordered>(items: &mut [T], id: u32, direction: Direction) -> AppResult<bool> {
    let positions = display_positions(items);
    let current = positions
        .iter()
        .position(|&i| items[i].id() == id)
        .ok_or_else(|| AppError::NotFound(format!("entry {} does not exist", id)))?;

    let neighbour = match direction {
        Direction::Up if current > 0 => current - 1,
        Direction::Down if current + 1 < positions.len() => current + 1,
        _ => return Ok(false),
    };

    let (a, b) = (positions[current], positions[neighbour]);
    if items[a].order() == items[b].order() {
        renumber(items, &positions)?;
    }
    let (order_a, order_b) = (items[a].order(), items[b].order());
    items[a].set_order(order_b);
    items[b].set_order(order_a);
    Ok(true)
}

/// Gives every entry a distinct order `1..=n`, keeping the display sequence.
fn renumber<T: Ordered>(items: &mut [T], positions: &[usize]) -> AppResult<()> {
    for (rank, &i) in positions.iter().enumerate() {
        let order = i32::try_from(rank + 1)
            .map_err(|_| AppError::InvalidRequest("too many entries to reorder".to_string()))?;
        items[i].set_order(order);
    }
    Ok(())
}

/// Drops the entry `id`.
pub fn remove<T: Ordered>(items: &mut Vec<T>, id: u32) -> AppResult<()> {
    let before = items.len();
    items.retain(|item| item.id() != id);
    if items.len() == before {
        return Err(AppError::NotFound(format!("entry {} does not exist", id)));
    }
    Ok(())
}

/// Copies of `items` in display order.
pub fn sorted<T: Ordered + Clone>(items: &[T]) -> Vec<T> {
    display_positions(items)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}

/// Active entries in display order.
pub fn published<T: Ordered + Clone>(items: &[T]) -> Vec<T> {
    sorted(items).into_iter().filter(Ordered::is_active).collect()
}

pub fn ensure_unique_ids<T: Ordered>(items: &[T]) -> AppResult<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id()) {
            return Err(AppError::InvalidRequest(format!(
                "duplicate id {}",
                item.id()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        order: i32,
        active: bool,
    }

    impl Ordered for Item {
        fn id(&self) -> u32 {
            self.id
        }
        fn set_id(&mut self, id: u32) {
            self.id = id;
        }
        fn order(&self) -> i32 {
            self.order
        }
        fn set_order(&mut self, order: i32) {
            self.order = order;
        }
        fn is_active(&self) -> bool {
            self.active
        }
    }

    fn item(id: u32, order: i32) -> Item {
        Item { id, order, active: true }
    }

    fn orders(items: &[Item]) -> Vec<(u32, i32)> {
        items.iter().map(|i| (i.id, i.order)).collect()
    }

    fn display_ids(items: &[Item]) -> Vec<u32> {
        sorted(items).iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_next_id_is_above_every_id() {
        let items = vec![item(3, 1), item(9, 2), item(1, 3)];
        assert_eq!(next_id(&items).unwrap(), 10);
        assert_eq!(next_id::<Item>(&[]).unwrap(), 1);
    }

    #[test]
    fn test_exhausted_ids_and_orders_are_rejected() {
        let mut items = vec![item(u32::MAX, 1)];
        assert!(matches!(next_id(&items), Err(AppError::InvalidRequest(_))));
        assert!(matches!(
            insert(&mut items, item(0, 0)),
            Err(AppError::InvalidRequest(_))
        ));
        assert_eq!(items.len(), 1);

        let mut items = vec![item(1, i32::MAX)];
        assert!(matches!(next_order(&items), Err(AppError::InvalidRequest(_))));
        assert!(insert(&mut items, item(0, 0)).is_err());
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_insert_appends_at_end() {
        let mut items = vec![item(2, 5), item(4, 1)];
        let added = insert(&mut items, item(0, 0)).unwrap();
        assert_eq!(added.id, 5);
        assert_eq!(added.order, 6);
        assert_eq!(items.len(), 3);
        assert_eq!(sorted(&items).last().unwrap().id, 5);
    }

    #[test]
    fn test_move_swaps_only_neighbours() {
        let mut items = vec![item(1, 1), item(2, 2), item(3, 3), item(4, 4)];
        assert!(move_entry(&mut items, 3, Direction::Up).unwrap());
        assert_eq!(orders(&items), vec![(1, 1), (2, 3), (3, 2), (4, 4)]);

        assert!(move_entry(&mut items, 1, Direction::Down).unwrap());
        assert_eq!(orders(&items), vec![(1, 2), (2, 3), (3, 1), (4, 4)]);
    }

    #[test]
    fn test_move_at_edges_is_noop() {
        let mut items = vec![item(1, 1), item(2, 2)];
        assert!(!move_entry(&mut items, 1, Direction::Up).unwrap());
        assert!(!move_entry(&mut items, 2, Direction::Down).unwrap());
        assert_eq!(orders(&items), vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn test_move_follows_display_order_not_vec_order() {
        let mut items = vec![item(1, 30), item(2, 10), item(3, 20)];
        assert!(move_entry(&mut items, 1, Direction::Up).unwrap());
        assert_eq!(orders(&items), vec![(1, 20), (2, 10), (3, 30)]);
    }

    #[test]
    fn test_move_with_equal_orders_separates_them() {
        let mut items = vec![item(1, 1), item(2, 1)];
        assert!(move_entry(&mut items, 2, Direction::Up).unwrap());
        assert_eq!(display_ids(&items), vec![2, 1]);

        // 5 and 6 tie on order 1; 2 follows at order 2.
        let mut items = vec![item(5, 1), item(6, 1), item(2, 2)];
        assert_eq!(display_ids(&items), vec![5, 6, 2]);
        assert!(move_entry(&mut items, 5, Direction::Down).unwrap());
        assert_eq!(display_ids(&items), vec![6, 5, 2]);

        assert!(move_entry(&mut items, 2, Direction::Up).unwrap());
        assert_eq!(display_ids(&items), vec![6, 2, 5]);
    }

    #[test]
    fn test_move_at_maximum_order_does_not_overflow() {
        let mut items = vec![item(1, i32::MAX), item(2, i32::MAX)];
        assert!(move_entry(&mut items, 1, Direction::Down).unwrap());
        assert_eq!(display_ids(&items), vec![2, 1]);

        let mut items = vec![item(1, i32::MAX - 1), item(2, i32::MAX)];
        assert!(move_entry(&mut items, 2, Direction::Up).unwrap());
        assert_eq!(orders(&items), vec![(1, i32::MAX), (2, i32::MAX - 1)]);
    }

    #[test]
    fn test_move_unknown_id() {
        let mut items = vec![item(1, 1)];
        assert!(matches!(
            move_entry(&mut items, 7, Direction::Up),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove() {
        let mut items = vec![item(1, 1), item(2, 2)];
        remove(&mut items, 1).unwrap();
        assert_eq!(orders(&items), vec![(2, 2)]);
        assert!(matches!(remove(&mut items, 1), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_published_skips_inactive() {
        let mut hidden = item(2, 1);
        hidden.active = false;
        let items = vec![item(1, 2), hidden, item(3, 0)];
        let ids: Vec<u32> = published(&items).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        assert!(ensure_unique_ids(&[item(1, 1), item(2, 2)]).is_ok());
        assert!(ensure_unique_ids(&[item(1, 1), item(1, 2)]).is_err());
    }
}
