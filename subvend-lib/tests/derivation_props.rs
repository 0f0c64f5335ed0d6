//! Property tests for node derivation.

use proptest::prelude::*;
use subvend_lib::{label_hash, namehash, subnode_of, Node};

proptest! {
    // Dotted names decompose into per-label subnode steps.
    #[test]
    fn namehash_agrees_with_subnode_chain(
        label in "[a-z0-9]{1,16}",
        parent in "[a-z0-9]{1,16}\\.[a-z]{2,6}",
    ) {
        let full = format!("{}.{}", label, parent);
        prop_assert_eq!(namehash(&full), subnode_of(namehash(&parent), &label));
    }

    #[test]
    fn distinct_labels_never_collide(
        a in "[a-z0-9]{1,24}",
        b in "[a-z0-9]{1,24}",
        parent in "[a-z0-9]{1,16}\\.[a-z]{2,6}",
    ) {
        prop_assume!(a != b);
        let node = namehash(&parent);
        prop_assert_ne!(subnode_of(node, &a), subnode_of(node, &b));
    }

    #[test]
    fn same_label_under_distinct_parents_never_collides(
        label in "[a-z0-9]{1,16}",
        p in "[a-z0-9]{1,16}\\.[a-z]{2,6}",
        q in "[a-z0-9]{1,16}\\.[a-z]{2,6}",
    ) {
        prop_assume!(p != q);
        prop_assert_ne!(subnode_of(namehash(&p), &label), subnode_of(namehash(&q), &label));
    }

    #[test]
    fn derivation_is_deterministic(label in ".{0,32}") {
        prop_assert_eq!(label_hash(&label), label_hash(&label));
        let parent = namehash("example.rsk");
        prop_assert_eq!(subnode_of(parent, &label), subnode_of(parent, &label));
    }

    #[test]
    fn node_string_round_trips(bytes in prop::array::uniform32(any::<u8>())) {
        let node = Node::new(bytes);
        let parsed: Node = node.to_string().parse().unwrap();
        prop_assert_eq!(parsed, node);
    }
}
