use std::{
    collections::{HashMap, HashSet},
    fmt, mem,
};

use crate::error::{LoadError, StructuralError};

/// A single-bit wire. Yosys numbers nets from 2 and writes constant drivers as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Signal {
    Net(u64),
    Const(bool),
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Net(n) => write!(f, "{}", n),
            Signal::Const(v) => write!(f, "1'b{}", *v as u8),
        }
    }
}

/// Index of a node in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// Externally driven bit, or a wire nothing drives.
    Primary,
    Const(bool),
    Not {
        a: NodeId,
    },
    /// Operands keep the order of the cell's `A` and `B` pins.
    And {
        a: NodeId,
        b: NodeId,
    },
    /// Exposes the value committed at the end of the previous cycle.
    Register {
        d: NodeId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Primary,
    Const,
    Not,
    And,
    Register,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Primary => "PRIMARY",
            NodeKind::Const => "CONST",
            NodeKind::Not => "NOT",
            NodeKind::And => "AND",
            NodeKind::Register => "DFF",
        };
        f.write_str(name)
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Primary => NodeKind::Primary,
            Node::Const(_) => NodeKind::Const,
            Node::Not { .. } => NodeKind::Not,
            Node::And { .. } => NodeKind::And,
            Node::Register { .. } => NodeKind::Register,
        }
    }

    pub fn is_combinational(&self) -> bool {
        matches!(self, Node::Not { .. } | Node::And { .. })
    }

    /// Operand nodes in pin order, including a register's data input.
    pub fn operands(&self) -> impl Iterator<Item = NodeId> {
        let (a, b) = match *self {
            Node::Primary | Node::Const(_) => (None, None),
            Node::Not { a } | Node::Register { d: a } => (Some(a), None),
            Node::And { a, b } => (Some(a), Some(b)),
        };
        a.into_iter().chain(b)
    }
}

/// Accumulates cells into a graph arena. Signals get a node on first reference,
/// as a primary value until a cell claims to drive them.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    signals: Vec<Signal>,
    nodes: Vec<Node>,
    driven: Vec<bool>,
    index: HashMap<Signal, NodeId>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, signal: Signal) -> NodeId {
        if let Some(id) = self.index.get(&signal) {
            return *id;
        }
        let id = NodeId(self.nodes.len());
        let node = match signal {
            Signal::Const(v) => Node::Const(v),
            Signal::Net(_) => Node::Primary,
        };
        self.signals.push(signal);
        self.nodes.push(node);
        self.driven.push(false);
        self.index.insert(signal, id);
        id
    }

    fn drive(&mut self, y: Signal, node: Node) -> Result<NodeId, LoadError> {
        if let Signal::Const(_) = y {
            return Err(LoadError::DrivenConstant(y));
        }
        let id = self.intern(y);
        if self.driven[id.0] {
            return Err(LoadError::MultipleDrivers(y));
        }
        self.driven[id.0] = true;
        self.nodes[id.0] = node;
        Ok(id)
    }

    pub fn add_not(&mut self, a: Signal, y: Signal) -> Result<NodeId, LoadError> {
        let a = self.intern(a);
        self.drive(y, Node::Not { a })
    }

    pub fn add_and(&mut self, a: Signal, b: Signal, y: Signal) -> Result<NodeId, LoadError> {
        let a = self.intern(a);
        let b = self.intern(b);
        self.drive(y, Node::And { a, b })
    }

    pub fn add_register(&mut self, d: Signal, q: Signal) -> Result<NodeId, LoadError> {
        let d = self.intern(d);
        self.drive(q, Node::Register { d })
    }

    /// Nets referenced somewhere but driven by no cell.
    pub fn undriven(&self) -> impl Iterator<Item = Signal> + '_ {
        self.signals
            .iter()
            .zip(&self.driven)
            .filter(|(signal, driven)| !**driven && matches!(signal, Signal::Net(_)))
            .map(|(signal, _)| *signal)
    }

    /// Validates the structure and freezes it. The combinational order is computed once here.
    pub fn build(self, clock: Signal) -> Result<CircuitGraph, StructuralError> {
        if self.nodes.is_empty() {
            return Err(StructuralError::Empty);
        }

        let components = count_components(&self.nodes);
        if components > 1 {
            return Err(StructuralError::Disconnected { components });
        }

        let levels = rank_combinational(&self.nodes).map_err(|id| {
            StructuralError::CombinationalCycle {
                signal: self.signals[id.0],
            }
        })?;
        let order = levels.iter().flatten().copied().collect();

        let registers = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| match node {
                Node::Register { d } => Some((NodeId(i), *d)),
                _ => None,
            })
            .collect();

        Ok(CircuitGraph {
            signals: self.signals,
            nodes: self.nodes,
            index: self.index,
            order,
            levels,
            registers,
            clock,
        })
    }
}

/// Weakly connected components, register feedback edges included. A constant
/// nothing reads (one only seen on an output port) does not count.
fn count_components(nodes: &[Node]) -> usize {
    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    let mut parent: Vec<usize> = (0..nodes.len()).collect();
    let mut read = vec![false; nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        for op in node.operands() {
            read[op.0] = true;
            let (ra, rb) = (find(&mut parent, i), find(&mut parent, op.0));
            if ra != rb {
                parent[ra] = rb;
            }
        }
    }

    let roots: HashSet<usize> = (0..nodes.len())
        .filter(|&i| read[i] || !matches!(nodes[i], Node::Const(_)))
        .map(|i| find(&mut parent, i))
        .collect();
    roots.len()
}

/// Groups NOT/AND nodes by rank so that each one follows every gate feeding it.
/// Primary values, constants and registers are sources.
/// On failure returns a node sitting on a combinational loop.
fn rank_combinational(nodes: &[Node]) -> Result<Vec<Vec<NodeId>>, NodeId> {
    let mut pending = vec![0usize; nodes.len()];
    let mut consumers = vec![Vec::new(); nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        if !node.is_combinational() {
            continue;
        }
        for op in node.operands() {
            if nodes[op.0].is_combinational() {
                pending[i] += 1;
                consumers[op.0].push(NodeId(i));
            }
        }
    }

    let mut frontier: Vec<NodeId> = (0..nodes.len())
        .filter(|&i| nodes[i].is_combinational() && pending[i] == 0)
        .map(NodeId)
        .collect();
    let mut levels = Vec::new();
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for id in &frontier {
            for consumer in &consumers[id.0] {
                pending[consumer.0] -= 1;
                if pending[consumer.0] == 0 {
                    next.push(*consumer);
                }
            }
        }
        next.sort_unstable();
        levels.push(mem::replace(&mut frontier, next));
    }

    match (0..nodes.len()).find(|&i| nodes[i].is_combinational() && pending[i] > 0) {
        Some(i) => Err(NodeId(i)),
        None => Ok(levels),
    }
}

/// Immutable gate-level circuit stored as an arena indexed by [`NodeId`].
#[derive(Debug, Clone)]
pub struct CircuitGraph {
    signals: Vec<Signal>,
    nodes: Vec<Node>,
    index: HashMap<Signal, NodeId>,
    order: Vec<NodeId>,
    levels: Vec<Vec<NodeId>>,
    registers: Vec<(NodeId, NodeId)>,
    clock: Signal,
}

impl CircuitGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn signal(&self, id: NodeId) -> Signal {
        self.signals[id.0]
    }

    pub fn lookup(&self, signal: Signal) -> Option<NodeId> {
        self.index.get(&signal).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Signal, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(move |(i, node)| (NodeId(i), self.signals[i], node))
    }

    /// Combinational nodes only, every gate after its operands.
    pub fn topological_order(&self) -> &[NodeId] {
        &self.order
    }

    /// The topological order split into ranks; gates of one rank are independent.
    pub fn levels(&self) -> &[Vec<NodeId>] {
        &self.levels
    }

    /// `(q, d)` pairs: register node and the node feeding its data input.
    pub fn registers(&self) -> &[(NodeId, NodeId)] {
        &self.registers
    }

    pub fn clock(&self) -> Signal {
        self.clock
    }

    /// Operand to consumer edges.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(i, node)| node.operands().map(move |op| (op, NodeId(i))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLK: Signal = Signal::Net(1);

    fn net(n: u64) -> Signal {
        Signal::Net(n)
    }

    #[test]
    fn order_follows_dependencies() {
        let mut b = GraphBuilder::new();
        // declared consumer-first on purpose
        b.add_and(net(4), net(2), net(5)).unwrap();
        b.add_not(net(3), net(4)).unwrap();
        b.add_not(net(2), net(3)).unwrap();
        let g = b.build(CLK).unwrap();

        let pos = |s: Signal| {
            let id = g.lookup(s).unwrap();
            g.topological_order().iter().position(|n| *n == id).unwrap()
        };
        assert!(pos(net(3)) < pos(net(4)));
        assert!(pos(net(4)) < pos(net(5)));
        assert_eq!(g.topological_order().len(), 3);
        assert_eq!(g.levels().len(), 3);
    }

    #[test]
    fn and_operands_keep_pin_order() {
        let mut b = GraphBuilder::new();
        b.add_not(net(7), net(3)).unwrap();
        b.add_and(net(7), net(3), net(9)).unwrap();
        let g = b.build(CLK).unwrap();

        let y = g.lookup(net(9)).unwrap();
        let a = g.lookup(net(7)).unwrap();
        let b = g.lookup(net(3)).unwrap();
        assert_eq!(*g.node(y), Node::And { a, b });
        assert_eq!(g.node(y).operands().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn register_breaks_loops() {
        // toggle flip-flop: q <= !q
        let mut b = GraphBuilder::new();
        b.add_not(net(3), net(4)).unwrap();
        b.add_register(net(4), net(3)).unwrap();
        let g = b.build(CLK).unwrap();

        assert_eq!(g.topological_order().len(), 1);
        let q = g.lookup(net(3)).unwrap();
        let d = g.lookup(net(4)).unwrap();
        assert_eq!(g.registers(), &[(q, d)]);
        assert_eq!(g.edges().count(), 2);
    }

    #[test]
    fn combinational_loop_rejected() {
        let mut b = GraphBuilder::new();
        b.add_not(net(3), net(4)).unwrap();
        b.add_and(net(4), net(2), net(3)).unwrap();
        let err = b.build(CLK).unwrap_err();
        assert!(matches!(err, StructuralError::CombinationalCycle { .. }));
    }

    #[test]
    fn disconnected_rejected() {
        let mut b = GraphBuilder::new();
        b.add_not(net(2), net(3)).unwrap();
        b.add_not(net(4), net(5)).unwrap();
        assert_eq!(
            b.build(CLK).unwrap_err(),
            StructuralError::Disconnected { components: 2 }
        );
    }

    #[test]
    fn empty_rejected() {
        assert_eq!(
            GraphBuilder::new().build(CLK).unwrap_err(),
            StructuralError::Empty
        );
    }

    #[test]
    fn second_driver_rejected() {
        let mut b = GraphBuilder::new();
        b.add_not(net(2), net(3)).unwrap();
        let err = b.add_register(net(2), net(3)).unwrap_err();
        assert!(matches!(err, LoadError::MultipleDrivers(Signal::Net(3))));

        let err = b.add_not(net(2), Signal::Const(true)).unwrap_err();
        assert!(matches!(err, LoadError::DrivenConstant(_)));
    }

    #[test]
    fn undriven_nets_listed() {
        let mut b = GraphBuilder::new();
        b.add_and(net(2), Signal::Const(true), net(3)).unwrap();
        assert_eq!(b.undriven().collect::<Vec<_>>(), vec![net(2)]);
    }

    #[test]
    fn unread_constant_is_not_a_component() {
        let mut b = GraphBuilder::new();
        b.add_not(net(3), net(4)).unwrap();
        b.add_register(net(4), net(3)).unwrap();
        b.intern(Signal::Const(false));
        let g = b.build(CLK).unwrap();
        assert_eq!(g.len(), 3);
        assert!(g.lookup(Signal::Const(false)).is_some());

        // read by a gate, a constant joins that gate's component
        let mut b = GraphBuilder::new();
        b.add_and(net(2), Signal::Const(true), net(3)).unwrap();
        b.intern(Signal::Const(false));
        assert!(b.build(CLK).is_ok());
    }
}
