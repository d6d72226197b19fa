use crate::filter::Filter;
use crate::item::{Item, ItemId};
use crate::{Error, Result};
use ahash::AHashMap;
use serde::Serialize;
use sha2::digest::Output;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

/// Listings shown per page when the caller does not say otherwise
pub const DEFAULT_PAGE_SIZE: usize = 8;

/// An immutable, ordered snapshot of listings
///
/// Positions run 0..N-1 but callers address listings by [`ItemId`].
/// Filtering never mutates a catalog, it produces a new snapshot that
/// keeps the original ids.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
    index: AHashMap<ItemId, usize>,
}

impl Catalog {
    /// Build a snapshot from listings, sanitizing each one
    pub fn new(items: Vec<Item>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(items.len());
        let mut items = items;
        for (position, item) in items.iter_mut().enumerate() {
            item.sanitize();
            if index.insert(item.id, position).is_some() {
                return Err(Error::DuplicateId(item.id));
            }
        }
        Ok(Self { items, index })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Look up a listing by id
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.position(id).map(|pos| &self.items[pos])
    }

    /// Row position of a listing in this snapshot
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.index.contains_key(&id)
    }

    /// Produce a new snapshot holding only the matching listings, in order
    pub fn filter(&self, filter: &dyn Filter) -> Catalog {
        let items: Vec<Item> = self
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        let index = items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id, pos))
            .collect();
        Catalog { items, index }
    }

    /// Distinct brands, sorted
    pub fn brands(&self) -> Vec<String> {
        distinct(self.items.iter().map(|item| item.brand.as_str()))
    }

    /// Distinct styles, sorted
    pub fn styles(&self) -> Vec<String> {
        distinct(self.items.iter().map(|item| item.style.as_str()))
    }

    /// Content fingerprint of the snapshot
    ///
    /// Covers every field of every listing in catalog order. Strings are
    /// length-prefixed so adjacent fields cannot run into each other.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update((self.items.len() as u64).to_le_bytes());
        for item in &self.items {
            hasher.update(item.id.0.to_le_bytes());
            hasher.update(item.price.to_bits().to_le_bytes());
            for field in [
                &item.brand,
                &item.style,
                &item.model,
                &item.image_url,
                &item.shop_link,
                &item.store,
            ] {
                hasher.update((field.len() as u64).to_le_bytes());
                hasher.update(field.as_bytes());
            }
        }
        Fingerprint(hasher.finalize())
    }

    /// Slice out one page of listings
    ///
    /// Pages are 1-based. Out-of-range page numbers are clamped to the
    /// nearest valid page; an empty catalog still reports one page.
    pub fn page(&self, page: usize, per_page: usize) -> Page<'_> {
        let per_page = per_page.max(1);
        let total_pages = self.items.len().div_ceil(per_page).max(1);
        let page = page.clamp(1, total_pages);
        let start = ((page - 1) * per_page).min(self.items.len());
        let end = (start + per_page).min(self.items.len());

        Page {
            items: &self.items[start..end],
            page,
            per_page,
            total_items: self.items.len(),
            total_pages,
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// SHA-256 digest identifying a catalog snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(Output<Sha256>);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// One page of a catalog listing
#[derive(Debug, Clone, Serialize)]
pub struct Page<'a> {
    pub items: &'a [Item],
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ItemFilter;

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            Item::new(0, "JET SL 125", 50000.0, "SYM", "通勤"),
            Item::new(1, "勁戰六代", 52000.0, "YAMAHA", "運動"),
            Item::new(2, "DRG 158", 98000.0, "SYM", "運動"),
            Item::new(3, "Many 110", 25000.0, "KYMCO", "通勤"),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get(ItemId(2)).unwrap().model, "DRG 158");
        assert_eq!(catalog.position(ItemId(3)), Some(3));
        assert!(catalog.get(ItemId(9)).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = Catalog::new(vec![
            Item::new(7, "A", 1.0, "X", "Y"),
            Item::new(7, "B", 2.0, "X", "Y"),
        ]);
        assert!(matches!(result, Err(Error::DuplicateId(ItemId(7)))));
    }

    #[test]
    fn test_filter_keeps_ids() {
        let catalog = sample_catalog();
        let sym = catalog.filter(&ItemFilter::new().with_brands(["SYM"]));

        assert_eq!(sym.len(), 2);
        assert_eq!(sym.position(ItemId(2)), Some(1));
        assert!(!sym.contains(ItemId(1)));
        // The source snapshot is untouched
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_facets_sorted() {
        let catalog = sample_catalog();
        assert_eq!(catalog.brands(), vec!["KYMCO", "SYM", "YAMAHA"]);
        assert_eq!(catalog.styles(), vec!["通勤", "運動"]);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = sample_catalog();
        let b = sample_catalog();
        assert_eq!(a.fingerprint(), b.fingerprint());

        // Display fields count too
        let relabeled = Catalog::new(
            a.items()
                .iter()
                .cloned()
                .map(|item| item.with_store("高雄店"))
                .collect(),
        )
        .unwrap();
        assert_ne!(a.fingerprint(), relabeled.fingerprint());

        let mut relinked = a.items().to_vec();
        relinked[0] = relinked[0].clone().with_shop_link("https://shop.example/new");
        let relinked = Catalog::new(relinked).unwrap();
        assert_ne!(a.fingerprint(), relinked.fingerprint());

        let mut renamed = a.items().to_vec();
        renamed[1].model = "JET SL+".to_string();
        let renamed = Catalog::new(renamed).unwrap();
        assert_ne!(a.fingerprint(), renamed.fingerprint());

        // Filtering changes the snapshot
        let filtered = a.filter(&ItemFilter::new().with_max_price(60000.0));
        assert_ne!(a.fingerprint(), filtered.fingerprint());

        // Reordering changes the snapshot
        let mut reversed = a.items().to_vec();
        reversed.reverse();
        let reversed = Catalog::new(reversed).unwrap();
        assert_ne!(a.fingerprint(), reversed.fingerprint());
    }

    #[test]
    fn test_fingerprint_hex() {
        let hex = sample_catalog().fingerprint().to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(sample_catalog().fingerprint().as_bytes().len(), 32);

        let empty = Catalog::empty().fingerprint();
        assert_eq!(empty.to_hex(), format!("{:x}", Sha256::digest(0u64.to_le_bytes())));
    }

    #[test]
    fn test_pagination() {
        let catalog = sample_catalog();

        let first = catalog.page(1, 3);
        assert_eq!(first.items.len(), 3);
        assert_eq!(first.total_pages, 2);

        let second = catalog.page(2, 3);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id, ItemId(3));

        // Clamped past the end
        let clamped = catalog.page(10, 3);
        assert_eq!(clamped.page, 2);

        // Page 0 behaves as page 1
        assert_eq!(catalog.page(0, 3).page, 1);
    }

    #[test]
    fn test_empty_catalog_has_one_page() {
        let catalog = Catalog::empty();
        let page = catalog.page(1, DEFAULT_PAGE_SIZE);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }
}
