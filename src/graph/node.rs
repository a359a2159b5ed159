//! Tanner graph nodes.
//!
//! Each node stores the messages it has received in a fixed-size array. The
//! position of a message in that array is the local slot of the edge it
//! arrived through, which is resolved once when the graph is built.

/// Variable node.
///
/// Represents one position of the codeword.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VariableNode {
    channel_llr: f64,
    frozen: bool,
    received: Box<[f64]>,
}

impl VariableNode {
    pub(crate) fn new(degree: usize) -> VariableNode {
        VariableNode {
            channel_llr: 0.0,
            frozen: false,
            received: vec![0.0; degree].into_boxed_slice(),
        }
    }

    pub(crate) fn degree(&self) -> usize {
        self.received.len()
    }

    pub(crate) fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub(crate) fn set_channel_llr(&mut self, llr: f64) {
        self.channel_llr = llr;
    }

    pub(crate) fn receive_message(&mut self, slot: usize, message: f64) {
        self.received[slot] = message;
    }

    /// Message sent before any check message has been received.
    pub(crate) fn initial_message(&self) -> f64 {
        if self.frozen {
            f64::INFINITY
        } else {
            self.channel_llr
        }
    }

    /// Computes the message for the edge in `exclude`.
    ///
    /// The message is the channel LLR plus all the received messages except
    /// the one that arrived through `exclude`. An infinite received message
    /// dominates and is returned as is. With `exclude` set to `None` this
    /// gives the marginal LLR of the node.
    pub(crate) fn message(&self, exclude: Option<usize>) -> f64 {
        if self.frozen {
            return f64::INFINITY;
        }
        let mut sum = self.channel_llr;
        for (slot, &message) in self.received.iter().enumerate() {
            if Some(slot) == exclude {
                continue;
            }
            if message.is_infinite() {
                return message;
            }
            sum += message;
        }
        sum
    }

    pub(crate) fn marginalize(&self) -> f64 {
        self.message(None)
    }

    pub(crate) fn clear(&mut self) {
        self.channel_llr = 0.0;
        self.received.fill(0.0);
    }
}

/// Check node.
///
/// Represents one parity check equation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CheckNode {
    received: Box<[f64]>,
}

impl CheckNode {
    pub(crate) fn new(degree: usize) -> CheckNode {
        CheckNode {
            received: vec![0.0; degree].into_boxed_slice(),
        }
    }

    pub(crate) fn degree(&self) -> usize {
        self.received.len()
    }

    pub(crate) fn receive_message(&mut self, slot: usize, message: f64) {
        self.received[slot] = message;
    }

    /// Computes the message for the edge in slot `exclude`.
    ///
    /// Uses the tanh rule `2 * atanh(prod tanh(m / 2))`. Infinite messages
    /// only contribute their sign, since `tanh(±inf / 2) = ±1`.
    pub(crate) fn message(&self, exclude: usize) -> f64 {
        let mut product = 1.0;
        for (slot, &message) in self.received.iter().enumerate() {
            if slot == exclude {
                continue;
            }
            if message.is_infinite() {
                if message < 0.0 {
                    product = -product;
                }
                continue;
            }
            product *= (0.5 * message).tanh();
        }
        2.0 * product.atanh()
    }

    pub(crate) fn clear(&mut self) {
        self.received.fill(0.0);
    }
}
