//! Message passing with flooding schedule.
//!
//! This module implements the sum-product belief propagation algorithm on a
//! [`TannerGraph`] using a flooding schedule: in each iteration all the check
//! nodes send their messages, and only then all the variable nodes send
//! theirs. The graph node state is updated in place.

use super::Error;
use crate::graph::{NodesMut, TannerGraph};

/// Maximum number of message passing iterations.
pub const MAX_ITERATIONS: usize = 40;

/// Outcome of running the message passing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Convergence {
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the hard decisions satisfied all the parity checks.
    ///
    /// When this is `false`, the message passing stopped after
    /// [`MAX_ITERATIONS`] and the graph holds the beliefs of the last
    /// iteration.
    pub converged: bool,
}

/// Runs belief propagation on a Tanner graph.
///
/// The channel LLRs are loaded into the variable nodes and messages are
/// exchanged until the hard decisions on the marginal LLRs satisfy all the
/// parity checks or [`MAX_ITERATIONS`] iterations are done. Not converging is
/// not an error: the graph is left with the beliefs of the last iteration in
/// both cases.
///
/// # Errors
/// [`Error::InputSizeMismatch`] is returned if the number of LLRs is not
/// equal to the code length. The graph is not modified in this case.
pub fn execute_message_passing(
    graph: &mut TannerGraph,
    channel_llrs: &[f64],
) -> Result<Convergence, Error> {
    if channel_llrs.len() != graph.code_length() {
        return Err(Error::InputSizeMismatch {
            expected: graph.code_length(),
            got: channel_llrs.len(),
        });
    }
    let mut nodes = graph.nodes_mut();
    initialize(&mut nodes, channel_llrs);
    for iteration in 1..=MAX_ITERATIONS {
        process_check_nodes(&mut nodes);
        process_variable_nodes(&mut nodes);
        if satisfies_all_checks(&nodes) {
            tracing::debug!(iteration, "message passing converged");
            return Ok(Convergence {
                iterations: iteration,
                converged: true,
            });
        }
    }
    tracing::debug!(
        iterations = MAX_ITERATIONS,
        "message passing did not converge"
    );
    Ok(Convergence {
        iterations: MAX_ITERATIONS,
        converged: false,
    })
}

fn initialize(nodes: &mut NodesMut<'_>, channel_llrs: &[f64]) {
    for (node, &llr) in nodes.variable_nodes.iter_mut().zip(channel_llrs.iter()) {
        node.set_channel_llr(llr);
    }

    // First variable messages use only the channel LLRs
    for (edge, slots) in nodes.edges.iter().zip(nodes.slots.iter()) {
        let message = nodes.variable_nodes[edge.variable].initial_message();
        nodes.check_nodes[edge.check].receive_message(slots.check, message);
    }
}

fn process_check_nodes(nodes: &mut NodesMut<'_>) {
    for (edge, slots) in nodes.edges.iter().zip(nodes.slots.iter()) {
        let message = nodes.check_nodes[edge.check].message(slots.check);
        nodes.variable_nodes[edge.variable].receive_message(slots.variable, message);
    }
}

fn process_variable_nodes(nodes: &mut NodesMut<'_>) {
    for (edge, slots) in nodes.edges.iter().zip(nodes.slots.iter()) {
        let message = nodes.variable_nodes[edge.variable].message(Some(slots.variable));
        nodes.check_nodes[edge.check].receive_message(slots.check, message);
    }
}

fn satisfies_all_checks(nodes: &NodesMut<'_>) -> bool {
    let mut estimates = Vec::with_capacity(nodes.variable_nodes.len());
    for node in nodes.variable_nodes.iter() {
        let llr = node.marginalize();
        // A zero LLR gives no decision, so the checks cannot be verified
        if llr == 0.0 {
            return false;
        }
        estimates.push(llr < 0.0);
    }
    let mut parities = vec![false; nodes.check_nodes.len()];
    for edge in nodes.edges.iter() {
        parities[edge.check] ^= estimates[edge.variable];
    }
    !parities.iter().any(|&p| p)
}
