//! Reduction of a [`Trie`] into a DAWG by pruning duplicate subtrees.
//!
//! Nodes are grouped by `max_child_depth`, since only nodes with the same
//! longest suffix can be structurally identical. Buckets are processed from
//! the deepest down. Only nodes that head a sibling list are ever pruned, and
//! only child links are redirected: sibling chains stay intact so that the
//! encoded form can keep siblings in consecutive slots.

use std::collections::VecDeque;

use hashbrown::HashMap;
use log::debug;

use super::builder::CompileError;
use super::trie::{self, Trie, TrieNode, ROOT};

/// A reduced automaton, ready for index assignment and encoding.
///
/// Surviving nodes keep their trie arena indices. Pruned nodes stay in the
/// arena but are no longer referenced by any child link.
#[derive(Clone, Debug)]
pub struct Dawg {
    pub(crate) nodes: Vec<TrieNode>,
    pub(crate) alphabet: Vec<char>,
    pub(crate) buckets: Vec<Vec<usize>>,
    pub(crate) order: Vec<usize>,
    merged: usize,
}

impl Trie {
    /// Reduces the trie into a DAWG.
    ///
    /// # Errors
    ///
    /// Returns `MergeTargetMissing` or `MergeTargetPruned` if a pruned node
    /// cannot be redirected to a surviving equivalent. Both indicate a bug in
    /// the reducer rather than bad input.
    pub fn reduce(self) -> Result<Dawg, CompileError> {
        let mut nodes = self.nodes;
        let buckets = depth_buckets(&nodes);
        let merged = find_duplicates(&mut nodes, &buckets);
        redirect_children(&mut nodes, &buckets)?;

        let dawg = Dawg {
            nodes,
            alphabet: self.alphabet.into_iter().collect(),
            buckets,
            order: Vec::new(),
            merged,
        };
        debug!(
            "reduced to {} nodes, {} subtrees merged",
            dawg.node_count(),
            merged
        );
        Ok(dawg)
    }
}

impl Dawg {
    /// Number of surviving letter nodes.
    pub fn node_count(&self) -> usize {
        self.nodes
            .iter()
            .skip(1)
            .filter(|node| !node.is_pruned)
            .count()
    }

    /// Number of subtrees that were found to duplicate a surviving one.
    pub fn merged_count(&self) -> usize {
        self.merged
    }

    /// True if the automaton accepts `word`.
    pub fn contains(&self, word: &str) -> bool {
        trie::contains(&self.nodes, word)
    }

    /// Distinct letters used by the words, in ascending order.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Arena indices grouped by `max_child_depth`.
    pub fn depth_buckets(&self) -> &[Vec<usize>] {
        &self.buckets
    }

    /// Returns the node stored at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not an index of this automaton.
    pub fn node(&self, id: usize) -> &TrieNode {
        &self.nodes[id]
    }
}

/// Groups every node by `max_child_depth`, in breadth-first order.
fn depth_buckets(nodes: &[TrieNode]) -> Vec<Vec<usize>> {
    let mut buckets: Vec<Vec<usize>> = Vec::new();
    let mut queue: VecDeque<usize> = nodes[ROOT].child.into_iter().collect();
    while let Some(head) = queue.pop_front() {
        let mut cursor = Some(head);
        while let Some(id) = cursor {
            let node = &nodes[id];
            if buckets.len() <= node.max_child_depth {
                buckets.resize_with(node.max_child_depth + 1, Vec::new);
            }
            buckets[node.max_child_depth].push(id);
            queue.extend(node.child);
            cursor = node.next;
        }
    }
    buckets
}

/// Compares the subtrees at `a` and `b`, including the siblings that follow them.
fn same_subtrie(nodes: &[TrieNode], a: Option<usize>, b: Option<usize>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) if a == b => true,
        (Some(a), Some(b)) => {
            let (x, y) = (&nodes[a], &nodes[b]);
            x.letter == y.letter
                && x.is_end_of_word == y.is_end_of_word
                && x.child_count == y.child_count
                && same_subtrie(nodes, x.child, y.child)
                && same_subtrie(nodes, x.next, y.next)
        }
        _ => false,
    }
}

/// Marks `start` and everything reachable from it as pruned.
fn prune_reachable(nodes: &mut [TrieNode], start: usize) {
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        let node = &mut nodes[id];
        node.is_pruned = true;
        stack.extend(node.child);
        stack.extend(node.next);
    }
}

fn find_duplicates(nodes: &mut [TrieNode], buckets: &[Vec<usize>]) -> usize {
    let mut merged = 0;
    for (depth, bucket) in buckets.iter().enumerate().rev() {
        let before = merged;
        for (i, &w) in bucket.iter().enumerate() {
            if nodes[w].is_pruned {
                continue;
            }
            for &x in &bucket[i + 1..] {
                if nodes[x].is_pruned || !nodes[x].is_first_child {
                    continue;
                }
                if same_subtrie(nodes, Some(w), Some(x)) {
                    prune_reachable(nodes, x);
                    merged += 1;
                }
            }
        }
        debug!(
            "depth {}: {} nodes, {} merged",
            depth,
            bucket.len(),
            merged - before
        );
    }
    merged
}

/// Points every child link that targets a pruned node at its first surviving equivalent.
fn redirect_children(nodes: &mut [TrieNode], buckets: &[Vec<usize>]) -> Result<(), CompileError> {
    let mut redirects: HashMap<usize, usize> = HashMap::new();
    let mut visited = vec![false; nodes.len()];
    let mut stack = vec![ROOT];
    while let Some(id) = stack.pop() {
        if std::mem::replace(&mut visited[id], true) {
            continue;
        }
        if let Some(child) = nodes[id].child {
            if nodes[child].is_pruned {
                let target = match redirects.get(&child) {
                    Some(&target) => target,
                    None => {
                        let target = surviving_equivalent(nodes, buckets, child)?;
                        redirects.insert(child, target);
                        target
                    }
                };
                if nodes[target].is_pruned {
                    return Err(CompileError::MergeTargetPruned {
                        node: child,
                        target,
                    });
                }
                nodes[id].child = Some(target);
            }
        }
        stack.extend(nodes[id].child);
        stack.extend(nodes[id].next);
    }
    Ok(())
}

fn surviving_equivalent(
    nodes: &[TrieNode],
    buckets: &[Vec<usize>],
    pruned: usize,
) -> Result<usize, CompileError> {
    buckets[nodes[pruned].max_child_depth]
        .iter()
        .copied()
        .find(|&candidate| {
            !nodes[candidate].is_pruned && same_subtrie(nodes, Some(candidate), Some(pruned))
        })
        .ok_or(CompileError::MergeTargetMissing { node: pruned })
}
