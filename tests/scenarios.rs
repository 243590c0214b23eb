//! The literal end-to-end scenarios from spec.md §8, run against the
//! `VecTree` test double.

mod common;

use common::VecTree;
use mutation_ledger::error::Error;
use mutation_ledger::filter::DiffFilter;
use mutation_ledger::handle::Sibling;
use mutation_ledger::position::Position;
use mutation_ledger::property::OldValue;
use mutation_ledger::Ledger;

const ROOT: u32 = 100;
const A: u32 = 1;
const B: u32 = 2;
const C: u32 = 3;
const D: u32 = 4;

/// Scenario 1: simple rearrangement (§8 #1, "Caveat #1").
#[test]
fn simple_rearrangement() {
    let mut tree = VecTree::new();
    tree.seed(ROOT, &[A, B, C, D]);
    let mut ledger = Ledger::new(tree);

    ledger.record_children(ROOT, vec![A], vec![], None, Some(B));
    ledger.tree_mut().remove(&A);

    ledger.record_children(ROOT, vec![], vec![A], Some(D), None);
    ledger.tree_mut().append(&ROOT, &[A]);

    let diff = ledger.diff(DiffFilter::ALL);
    assert_eq!(diff.len(), 1, "only A should carry a record");
    let delta = diff.get(&A).expect("A is tracked");
    let children = delta.children.as_ref().expect("CHILDREN bit was requested");
    assert_eq!(
        children.original,
        Some(Position::known(ROOT, Sibling::None, Sibling::Node(B)))
    );
    assert_eq!(
        children.mutated,
        Some(Position::known(ROOT, Sibling::Node(D), Sibling::None))
    );

    assert!(ledger.mutated(Some(&ROOT)));
    let range = ledger.range(Some(&ROOT)).unwrap().expect("something moved");
    // A itself is floating; the exclusive-normalized range must not land an
    // endpoint directly on it (P7(b)) even though A currently sits at the
    // end of ROOT's child list.
    assert_ne!(range.end().unwrap().node, A);
    assert_eq!(range.end().unwrap().node, ROOT);

    ledger.revert(None);
    assert_eq!(ledger.tree().children_of(ROOT), vec![A, B, C, D]);
    assert!(ledger.is_empty());
}

/// Scenario 2: an add immediately canceled by a remove leaves no trace.
#[test]
fn add_then_remove_cancels() {
    let root = 200u32;
    let a = 201u32;
    let tree = VecTree::new();
    let mut ledger = Ledger::new(tree);

    ledger.record_children(root, vec![], vec![a], None, None);
    ledger.tree_mut().append(&root, &[a]);

    ledger.record_children(root, vec![a], vec![], None, None);
    ledger.tree_mut().remove(&a);

    assert!(ledger.is_empty());
    assert!(!ledger.mutated(None));
}

/// Adapted rendition of §8 scenario 3 ("untracked-origin add + synchronize").
/// The literal prose's numeric boundary values for the second report are
/// inconsistent with the first report already having moved the node (see
/// DESIGN.md); this keeps the same shape (two untracked-origin adds, one
/// nested inside the other) without relying on that inconsistent detail.
#[test]
fn untracked_origin_add_settles_after_synchronize() {
    let root = 300u32;
    let a = 301u32;
    let b = 302u32; // never previously watched
    let t = 303u32;

    let mut tree = VecTree::new();
    tree.seed(root, &[a]);
    let mut ledger = Ledger::new(tree);

    // root.append(b): the first time the engine ever hears of b.
    ledger.record_children(root, vec![], vec![b], Some(a), None);
    ledger.tree_mut().append(&root, &[b]);

    // b.append(t): again, the first time the engine hears of t.
    ledger.record_children(b, vec![], vec![t], None, None);
    ledger.tree_mut().append(&b, &[t]);

    let before = ledger.diff(DiffFilter::CHILDREN | DiffFilter::ORIGINAL | DiffFilter::MUTATED);
    assert_eq!(before.get(&b).unwrap().children.as_ref().unwrap().original, Some(Position::Absent));
    assert_eq!(before.get(&t).unwrap().children.as_ref().unwrap().original, Some(Position::Absent));

    ledger.synchronize();
    let after = ledger.diff(DiffFilter::CHILDREN | DiffFilter::MUTATED);
    assert!(after
        .get(&b)
        .unwrap()
        .children
        .as_ref()
        .unwrap()
        .mutated
        .as_ref()
        .unwrap()
        .is_fully_known());

    ledger.revert(None);
    assert_eq!(ledger.tree().children_of(root), vec![a]);
    assert!(ledger.tree().children_of(b).is_empty());
    assert!(ledger.is_empty());
}

/// Scenario 4: reversion through an intermediary (§8 #4). C never moves;
/// A and B each end up floating despite C coincidentally sitting between
/// the stale and live views of their neighborhoods.
#[test]
fn reversion_through_intermediary() {
    let root = 400u32;
    let a = 10u32;
    let b = 20u32;
    let c = 30u32;

    let mut tree = VecTree::new();
    tree.seed(root, &[a, b, c]);
    let mut ledger = Ledger::new(tree);

    ledger.record_children(root, vec![b], vec![], Some(a), Some(c));
    ledger.tree_mut().remove(&b);

    ledger.record_children(root, vec![a], vec![], None, Some(c));
    ledger.tree_mut().remove(&a);

    ledger.record_children(root, vec![], vec![a], Some(c), None);
    ledger.tree_mut().append(&root, &[a]);

    ledger.record_children(root, vec![], vec![b], None, Some(c));
    ledger.tree_mut().prepend(&root, &[b]);

    let diff = ledger.diff(DiffFilter::ALL);
    assert_eq!(diff.len(), 2, "only A and B should carry records; C is fixed");
    assert!(diff.contains_key(&a));
    assert!(diff.contains_key(&b));
    assert!(!diff.contains_key(&c));

    assert_eq!(ledger.tree().children_of(root), vec![b, c, a]);

    ledger.revert(None);
    assert_eq!(ledger.tree().children_of(root), vec![a, b, c]);
    assert!(ledger.is_empty());
}

/// Scenario 5: an attribute that round-trips back to its original value
/// is no longer dirty, even though the engine only ever sees old values.
#[test]
fn property_reverted_through_two_reports() {
    let x = 501u32;
    let mut tree = VecTree::new();
    tree.set_attr(x, "id", "B_modified");
    let mut ledger = Ledger::new(tree);

    ledger.record_attribute(x, "id", OldValue::Present("B".into()));
    assert!(ledger.mutated(None));

    ledger.tree_mut().set_attr(x, "id", "B");
    ledger.record_attribute(x, "id", OldValue::Present("B_modified".into()));
    assert!(!ledger.mutated(None));

    ledger.synchronize();
    assert!(ledger.is_empty());
}

/// Scenario 6: `range()` with no root throws once changes span more than
/// one disconnected tree; with an explicit root it scopes correctly.
#[test]
fn ambiguous_range_across_disconnected_trees() {
    let r1 = 600u32;
    let n1 = 601u32;
    let r2 = 700u32;
    let n2 = 701u32;

    let mut tree = VecTree::new();
    tree.seed(r1, &[n1]);
    tree.seed(r2, &[n2]);
    let mut ledger = Ledger::new(tree);

    ledger.record_attribute(n1, "id", OldValue::Present("orig1".into()));
    ledger.tree_mut().set_attr(n1, "id", "orig1");
    // force dirty: the "current" value read back above equals the old
    // value, so flip it after recording to make the entry dirty.
    ledger.tree_mut().set_attr(n1, "id", "changed1");
    ledger.record_attribute(n1, "id", OldValue::Present("orig1".into()));

    ledger.tree_mut().set_attr(n2, "id", "changed2");
    ledger.record_attribute(n2, "id", OldValue::Present("orig2".into()));

    assert!(matches!(ledger.range(None), Err(Error::AmbiguousRange)));

    let r = ledger.range(Some(&r1)).unwrap().expect("r1 has a dirty property");
    assert_eq!(r.start().unwrap().node, n1);
    assert_eq!(r.end().unwrap().node, n1);
}
