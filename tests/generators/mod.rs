//! Synthetic conversation mappings for tests.
//!
//! Mappings are built in memory, deterministic, and sized by parameters so
//! the same shapes serve unit-scale assertions and property tests.

#![allow(dead_code)]

use chain_viewer::model::{Mapping, Message, Node};

/// A linear conversation of `messages` alternating user and assistant turns,
/// hanging below a structural root and system node.
pub fn chain(messages: usize) -> Mapping {
    let mut mapping = Mapping::new().with_node("root", Node::root().with_children(["sys"]));
    let first = if messages > 0 { vec!["m0".to_string()] } else { Vec::new() };
    mapping.insert("sys", Node::child_of("root").with_children(first));

    let mut parent = "sys".to_string();
    for i in 0..messages {
        let id = format!("m{i}");
        let role = if i % 2 == 0 { "user" } else { "assistant" };
        let children = if i + 1 < messages {
            vec![format!("m{}", i + 1)]
        } else {
            Vec::new()
        };
        let message = Message::new(role, format!("message number {i}")).at(1_000.0 + i as f64);
        mapping.insert(
            id.clone(),
            Node::child_of(parent)
                .with_children(children)
                .with_message(message),
        );
        parent = id;
    }
    mapping
}

/// A tree in which every message node has `fanout` children, `depth` levels deep.
///
/// Timestamps decrease with creation order so the chronological sort has
/// real work to do.
pub fn bushy(depth: usize, fanout: usize) -> Mapping {
    let mut mapping = Mapping::new();
    let mut counter = 0usize;
    let mut pending: Vec<(String, Node)> = vec![("root".to_string(), Node::root())];

    for d in 0..depth {
        let mut next = Vec::new();
        for (parent_id, parent_node) in &mut pending {
            let mut kids = Vec::with_capacity(fanout);
            for _ in 0..fanout {
                let id = format!("n{counter}");
                counter += 1;
                kids.push(id.clone());
                let role = if d % 2 == 0 { "user" } else { "assistant" };
                let message = Message::new(role, format!("depth {d} node {id}"))
                    .at(1_000_000.0 - counter as f64);
                next.push((id, Node::child_of(parent_id.clone()).with_message(message)));
            }
            parent_node.children = kids;
        }
        for (id, node) in pending.drain(..) {
            mapping.insert(id, node);
        }
        pending = next;
    }
    for (id, node) in pending {
        mapping.insert(id, node);
    }
    mapping
}
