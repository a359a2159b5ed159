//! # Tanner graph representation
//!
//! This module implements the Tanner graph used by the belief propagation
//! decoder. The graph is a bipartite graph formed by variable nodes (one per
//! codeword bit) and check nodes (one per parity check equation). Some of the
//! variable nodes can be frozen, meaning that they are known to carry a zero
//! bit.
//!
//! The graph owns the state of all its nodes. This state can only be modified
//! by the message passing engine in [`decoder`](crate::decoder).

use std::borrow::Borrow;
use thiserror::Error;

mod node;

pub(crate) use node::{CheckNode, VariableNode};

/// Tanner graph error.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// An edge references a variable node that does not exist.
    #[error("edge references variable node {0}, which is out of range")]
    VariableOutOfRange(usize),
    /// An edge references a check node that does not exist.
    #[error("edge references check node {0}, which is out of range")]
    CheckOutOfRange(usize),
    /// A frozen bit index is not smaller than the code length.
    #[error("frozen bit {0} is out of range")]
    FrozenBitOutOfRange(usize),
    /// A frozen bit index appears more than once.
    #[error("frozen bit {0} is repeated")]
    DuplicateFrozenBit(usize),
    /// The alist description could not be parsed.
    #[error("invalid alist: {0}")]
    Alist(String),
}

/// Result type used by the Tanner graph functions.
pub type Result<T> = std::result::Result<T, Error>;

/// Edge of a Tanner graph.
///
/// An edge joins a variable node and a check node. The identity of the edge
/// is its position in [`TannerGraph::edges`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Edge {
    /// Index of the variable node.
    pub variable: usize,
    /// Index of the check node.
    pub check: usize,
}

// Position of an edge inside the message arrays of its two nodes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct EdgeSlots {
    pub(crate) variable: usize,
    pub(crate) check: usize,
}

/// Tanner graph.
///
/// The graph holds the variable and check nodes, the list of edges joining
/// them, and the partition of the bit positions into information bits and
/// frozen bits.
#[derive(Debug, Clone, PartialEq)]
pub struct TannerGraph {
    code_length: usize,
    edges: Vec<Edge>,
    slots: Vec<EdgeSlots>,
    information_bits: Vec<usize>,
    frozen_bits: Vec<usize>,
    variable_nodes: Vec<VariableNode>,
    check_nodes: Vec<CheckNode>,
}

// Mutable view of the node state used by the message passing engine.
pub(crate) struct NodesMut<'a> {
    pub(crate) edges: &'a [Edge],
    pub(crate) slots: &'a [EdgeSlots],
    pub(crate) variable_nodes: &'a mut [VariableNode],
    pub(crate) check_nodes: &'a mut [CheckNode],
}

impl TannerGraph {
    /// Creates a Tanner graph from a list of edges.
    ///
    /// The graph has `code_length` variable nodes and `num_checks` check
    /// nodes. The variable nodes listed in `frozen_bits` are frozen, and all
    /// the remaining variable nodes are information bits, listed in
    /// increasing order.
    ///
    /// # Errors
    /// An error is returned if an edge or frozen bit references a node that
    /// does not exist, or if a frozen bit is repeated.
    ///
    /// # Examples
    /// ```
    /// # use ldpc_list_decoder::graph::{Edge, TannerGraph};
    /// let edges = (0..4).map(|variable| Edge { variable, check: 0 });
    /// let graph = TannerGraph::new(4, 1, edges, [3].iter()).unwrap();
    /// assert_eq!(graph.information_bits(), &[0, 1, 2]);
    /// assert_eq!(graph.frozen_bits(), &[3]);
    /// ```
    pub fn new<E, F, B>(
        code_length: usize,
        num_checks: usize,
        edges: E,
        frozen_bits: F,
    ) -> Result<TannerGraph>
    where
        E: IntoIterator<Item = Edge>,
        F: Iterator<Item = B>,
        B: Borrow<usize>,
    {
        let frozen_bits = frozen_bits.map(|b| *b.borrow()).collect::<Vec<_>>();
        let mut is_frozen = vec![false; code_length];
        for &bit in &frozen_bits {
            match is_frozen.get_mut(bit) {
                None => return Err(Error::FrozenBitOutOfRange(bit)),
                Some(true) => return Err(Error::DuplicateFrozenBit(bit)),
                Some(f) => *f = true,
            }
        }
        let information_bits = (0..code_length).filter(|&b| !is_frozen[b]).collect();
        Self::with_partition(
            code_length,
            num_checks,
            edges.into_iter().collect(),
            information_bits,
            frozen_bits,
        )
    }

    // Builds the graph with an arbitrary partition. The partition must be
    // disjoint and in range, but it does not need to cover all the bits.
    pub(crate) fn with_partition(
        code_length: usize,
        num_checks: usize,
        edges: Vec<Edge>,
        information_bits: Vec<usize>,
        frozen_bits: Vec<usize>,
    ) -> Result<TannerGraph> {
        let mut variable_degrees = vec![0; code_length];
        let mut check_degrees = vec![0; num_checks];
        let mut slots = Vec::with_capacity(edges.len());
        for edge in &edges {
            let variable = variable_degrees
                .get_mut(edge.variable)
                .ok_or(Error::VariableOutOfRange(edge.variable))?;
            let check = check_degrees
                .get_mut(edge.check)
                .ok_or(Error::CheckOutOfRange(edge.check))?;
            slots.push(EdgeSlots {
                variable: *variable,
                check: *check,
            });
            *variable += 1;
            *check += 1;
        }
        let mut variable_nodes = variable_degrees
            .into_iter()
            .map(VariableNode::new)
            .collect::<Vec<_>>();
        for &bit in &frozen_bits {
            variable_nodes
                .get_mut(bit)
                .ok_or(Error::FrozenBitOutOfRange(bit))?
                .set_frozen(true);
        }
        let check_nodes = check_degrees.into_iter().map(CheckNode::new).collect();
        Ok(TannerGraph {
            code_length,
            edges,
            slots,
            information_bits,
            frozen_bits,
            variable_nodes,
            check_nodes,
        })
    }

    /// Constructs a Tanner graph from its alist representation.
    ///
    /// The columns of the alist are the variable nodes and the rows are the
    /// check nodes. The frozen bits are not part of the alist format, so they
    /// are given separately.
    ///
    /// # Errors
    /// `alist` should hold a valid alist representation. If an error is found
    /// while parsing `alist`, an [`Error::Alist`] describing it is returned.
    pub fn from_alist<F, B>(alist: &str, frozen_bits: F) -> Result<TannerGraph>
    where
        F: Iterator<Item = B>,
        B: Borrow<usize>,
    {
        let err = |s: &str| Error::Alist(String::from(s));
        let mut alist = alist.split('\n');
        let sizes = alist.next().ok_or_else(|| err("first line not found"))?;
        let mut sizes = sizes.split_whitespace();
        let ncols: usize = sizes
            .next()
            .ok_or_else(|| err("first line does not contain enough elements"))?
            .parse()
            .map_err(|_| err("ncols is not a number"))?;
        let nrows: usize = sizes
            .next()
            .ok_or_else(|| err("first line does not contain enough elements"))?
            .parse()
            .map_err(|_| err("nrows is not a number"))?;
        alist.next(); // skip max weights
        alist.next();
        alist.next(); // skip weights
        let mut edges = Vec::new();
        for variable in 0..ncols {
            let col_data = alist
                .next()
                .ok_or_else(|| err("alist does not contain expected number of lines"))?;
            for row in col_data.split_whitespace() {
                let row: usize = row.parse().map_err(|_| err("row value is not a number"))?;
                if row == 0 {
                    return Err(err("row values are 1-based"));
                }
                edges.push(Edge {
                    variable,
                    check: row - 1,
                });
            }
        }
        // the rows of the alist repeat the same information
        TannerGraph::new(ncols, nrows, edges, frozen_bits)
    }

    /// Writes the graph in alist format to a writer.
    ///
    /// # Errors
    /// If a call to `write!()` returns an error, this function returns
    /// such an error.
    pub fn write_alist<W: std::fmt::Write>(&self, w: &mut W) -> std::fmt::Result {
        let mut cols = vec![Vec::new(); self.code_length];
        let mut rows = vec![Vec::new(); self.num_checks()];
        for edge in &self.edges {
            cols[edge.variable].push(edge.check);
            rows[edge.check].push(edge.variable);
        }
        writeln!(w, "{} {}", cols.len(), rows.len())?;
        let directions = [&cols, &rows];
        for dir in directions.iter() {
            write!(w, "{} ", dir.iter().map(|el| el.len()).max().unwrap_or(0))?;
        }
        writeln!(w)?;
        for dir in directions.iter() {
            for el in dir.iter() {
                write!(w, "{} ", el.len())?;
            }
            writeln!(w)?;
        }
        for dir in directions.iter() {
            for el in dir.iter() {
                let mut v = el.clone();
                v.sort_unstable();
                for x in &v {
                    write!(w, "{} ", x + 1)?;
                }
                writeln!(w)?;
            }
        }
        Ok(())
    }

    /// Returns a [`String`] with the alist representation of the graph.
    pub fn alist(&self) -> String {
        let mut s = String::new();
        // writing to a String never fails
        let _ = self.write_alist(&mut s);
        s
    }

    /// Returns the code length.
    ///
    /// This is the number of variable nodes, including frozen bits.
    pub fn code_length(&self) -> usize {
        self.code_length
    }

    /// Returns the number of check nodes.
    pub fn num_checks(&self) -> usize {
        self.check_nodes.len()
    }

    /// Returns the edges of the graph.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn nodes_mut(&mut self) -> NodesMut<'_> {
        NodesMut {
            edges: &self.edges,
            slots: &self.slots,
            variable_nodes: &mut self.variable_nodes,
            check_nodes: &mut self.check_nodes,
        }
    }

    /// Returns the indices of the information bits.
    pub fn information_bits(&self) -> &[usize] {
        &self.information_bits
    }

    /// Returns the indices of the frozen bits.
    pub fn frozen_bits(&self) -> &[usize] {
        &self.frozen_bits
    }

    /// Returns `true` if the variable node `variable` is frozen.
    pub fn is_frozen(&self, variable: usize) -> bool {
        self.variable_nodes[variable].is_frozen()
    }

    /// Returns the marginal LLR of a variable node.
    ///
    /// This is the channel LLR plus all the messages received from the check
    /// nodes. Frozen bits always have a marginal LLR of `+inf`.
    pub fn marginal_llr(&self, variable: usize) -> f64 {
        self.variable_nodes[variable].marginalize()
    }

    /// Returns the number of edges incident to a variable node.
    pub fn variable_degree(&self, variable: usize) -> usize {
        self.variable_nodes[variable].degree()
    }

    /// Returns the number of edges incident to a check node.
    pub fn check_degree(&self, check: usize) -> usize {
        self.check_nodes[check].degree()
    }

    /// Returns the code length excluding the frozen bits.
    pub fn real_code_length(&self) -> usize {
        self.code_length - self.frozen_bits.len()
    }

    /// Returns the rate of the code.
    ///
    /// This is the number of information bits divided by
    /// [`real_code_length`](Self::real_code_length).
    pub fn rate(&self) -> f64 {
        self.information_bits.len() as f64 / self.real_code_length() as f64
    }

    /// Returns the effective rate of the code when list decoding is used.
    ///
    /// Each doubling of the list size costs one information bit, so the rate
    /// is `(k - floor(log2(list_size))) / real_code_length`. A `list_size` of
    /// zero is treated as one.
    pub fn list_rate(&self, list_size: usize) -> f64 {
        let ambiguous = list_size.checked_ilog2().unwrap_or(0);
        (self.information_bits.len() as f64 - f64::from(ambiguous))
            / self.real_code_length() as f64
    }

    /// Resets the channel LLRs and all the messages to zero.
    pub fn clear(&mut self) {
        for node in self.variable_nodes.iter_mut() {
            node.clear();
        }
        for node in self.check_nodes.iter_mut() {
            node.clear();
        }
    }
}
