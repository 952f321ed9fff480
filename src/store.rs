use std::collections::HashMap;

use crate::types::{ProductId, StockSnapshot};

/// Last-known stock per product for the current release week.
///
/// Only the catalog loader writes here, and always wholesale via
/// [`SnapshotStore::replace_all`]. Diff polls read snapshots but never write
/// them back, so repeated cycles compare against the bootstrap snapshot until
/// the next reload.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: HashMap<ProductId, StockSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every snapshot and repopulate from `snapshots`.
    pub fn replace_all(&mut self, snapshots: impl IntoIterator<Item = StockSnapshot>) {
        self.snapshots.clear();
        for snapshot in snapshots {
            self.snapshots.insert(snapshot.product.id.clone(), snapshot);
        }
    }

    pub fn get(&self, id: &ProductId) -> Option<&StockSnapshot> {
        self.snapshots.get(id)
    }

    /// Known product identifiers, sorted for stable log output.
    pub fn ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self.snapshots.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Total number of tracked (style, size) cells.
    pub fn cell_count(&self) -> usize {
        self.snapshots
            .values()
            .flat_map(|s| s.styles.iter())
            .map(|style| style.sizes.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CatalogEntry, SizeRecord, StyleRecord};

    fn snapshot(id: &str, sizes: &[i64]) -> StockSnapshot {
        StockSnapshot {
            product: CatalogEntry {
                id: ProductId::from(id),
                name: format!("Product {id}"),
                image_url_hi: String::new(),
            },
            styles: vec![StyleRecord {
                name: "Black".to_string(),
                sizes: sizes
                    .iter()
                    .enumerate()
                    .map(|(i, level)| SizeRecord {
                        name: format!("S{i}"),
                        stock_level: *level,
                    })
                    .collect(),
            }],
        }
    }

    #[test]
    fn new_store_is_empty() {
        let store = SnapshotStore::new();
        assert!(store.is_empty());
        assert_eq!(store.cell_count(), 0);
    }

    #[test]
    fn replace_all_discards_previous_week() {
        let mut store = SnapshotStore::new();
        store.replace_all(vec![snapshot("A1", &[0, 0]), snapshot("B2", &[1])]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.cell_count(), 3);

        store.replace_all(vec![snapshot("C3", &[0])]);
        assert_eq!(store.ids(), vec![ProductId::from("C3")]);
        assert!(store.get(&ProductId::from("A1")).is_none());
    }

    #[test]
    fn duplicate_ids_keep_last_snapshot() {
        let mut store = SnapshotStore::new();
        store.replace_all(vec![snapshot("A1", &[0]), snapshot("A1", &[1])]);
        assert_eq!(store.len(), 1);
        let stored = store.get(&ProductId::from("A1")).unwrap();
        assert_eq!(stored.styles[0].sizes[0].stock_level, 1);
    }

    #[test]
    fn ids_are_sorted() {
        let mut store = SnapshotStore::new();
        store.replace_all(vec![snapshot("B", &[]), snapshot("A", &[]), snapshot("C", &[])]);
        assert_eq!(
            store.ids(),
            vec![ProductId::from("A"), ProductId::from("B"), ProductId::from("C")]
        );
    }
}
