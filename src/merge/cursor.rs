//! Insertion cursor for a sibling collection being rebuilt.
//!
//! While a collection is merged, a Modify leaves two elements occupying
//! sibling slots (the fresh clone and its not-yet-removed source), so new
//! and copied elements cannot simply be appended. The cursor tracks how
//! many slots the processed declarations occupy and where the next
//! physical insertion belongs; once the deletion pass removes the queued
//! sources, remaining siblings sit in declaration order.

use crate::xml::{NodeId, XmlTree};

pub struct InsertionCursor {
    /// Sibling slots occupied by declarations processed so far.
    count: usize,
    /// Child to insert the next element before; `None` appends.
    insert_before: Option<NodeId>,
}

impl InsertionCursor {
    /// Cursor positioned before the collection's current first child.
    pub fn new(tree: &XmlTree, collection: NodeId) -> Self {
        Self {
            count: 0,
            insert_before: tree.children(collection).first().copied(),
        }
    }

    /// Physically insert a created or copied element at the cursor.
    pub fn insert(&mut self, tree: &mut XmlTree, collection: NodeId, element: NodeId) {
        match self.insert_before {
            Some(anchor) => tree.insert_before(anchor, element),
            None => tree.append_child(collection, element),
        }
        self.count += 1;
        self.refresh(tree, collection);
    }

    /// Account for an in-place Modify: clone and source both hold slots
    /// until the deletion pass runs.
    pub fn skip_modified(&mut self, tree: &XmlTree, collection: NodeId) {
        self.count += 2;
        self.refresh(tree, collection);
    }

    fn refresh(&mut self, tree: &XmlTree, collection: NodeId) {
        self.insert_before = tree.children(collection).get(self.count).copied();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(tree: &XmlTree, collection: NodeId) -> Vec<String> {
        tree.children(collection)
            .iter()
            .map(|&c| tree.tag(c).unwrap_or("#text").to_string())
            .collect()
    }

    #[test]
    fn test_insert_into_empty_collection_appends() {
        let mut tree = XmlTree::new();
        let collection = tree.new_element("ELEMENTS");
        let mut cursor = InsertionCursor::new(&tree, collection);

        let a = tree.new_element("A");
        let b = tree.new_element("B");
        cursor.insert(&mut tree, collection, a);
        cursor.insert(&mut tree, collection, b);
        assert_eq!(tags(&tree, collection), vec!["A", "B"]);
    }

    #[test]
    fn test_new_element_lands_before_existing_siblings() {
        let mut tree = XmlTree::new();
        let collection = tree.new_element("ELEMENTS");
        let old = tree.new_element("OLD");
        tree.append_child(collection, old);

        let mut cursor = InsertionCursor::new(&tree, collection);
        let fresh = tree.new_element("NEW");
        cursor.insert(&mut tree, collection, fresh);
        assert_eq!(tags(&tree, collection), vec!["NEW", "OLD"]);
    }

    #[test]
    fn test_modify_reserves_two_slots() {
        // Collection [A]; declaration order: modify A, then insert X.
        let mut tree = XmlTree::new();
        let collection = tree.new_element("ELEMENTS");
        let a = tree.new_element("A");
        tree.append_child(collection, a);

        let mut cursor = InsertionCursor::new(&tree, collection);
        // Simulate the engine: clone spliced before the original.
        let a_clone = tree.new_element("A2");
        tree.insert_before(a, a_clone);
        cursor.skip_modified(&tree, collection);

        let x = tree.new_element("X");
        cursor.insert(&mut tree, collection, x);
        assert_eq!(tags(&tree, collection), vec!["A2", "A", "X"]);

        // After the deletion pass removes the source, declaration order holds.
        tree.detach(a);
        assert_eq!(tags(&tree, collection), vec!["A2", "X"]);
    }

    #[test]
    fn test_insert_between_modified_siblings() {
        // Collection [A, B]; declared order: A (modify), X (new), B (modify).
        let mut tree = XmlTree::new();
        let collection = tree.new_element("ELEMENTS");
        let a = tree.new_element("A");
        let b = tree.new_element("B");
        tree.append_child(collection, a);
        tree.append_child(collection, b);

        let mut cursor = InsertionCursor::new(&tree, collection);
        let a_clone = tree.new_element("A2");
        tree.insert_before(a, a_clone);
        cursor.skip_modified(&tree, collection);

        let x = tree.new_element("X");
        cursor.insert(&mut tree, collection, x);

        let b_clone = tree.new_element("B2");
        tree.insert_before(b, b_clone);
        cursor.skip_modified(&tree, collection);

        tree.detach(a);
        tree.detach(b);
        assert_eq!(tags(&tree, collection), vec!["A2", "X", "B2"]);
    }
}
