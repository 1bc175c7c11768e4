use std::collections::{BTreeMap, BTreeSet};

use log::trace;

use crate::model::{Assignment, Cell, GridShape, Role};

use super::goal::Goal;

/// Cells whose role is identical across every solution.
pub type Certainty = BTreeMap<Cell, Role>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Truth {
    True,
    False,
    Unknown,
}

/// A [`Goal`] with cells replaced by flat indices.
#[derive(Debug, Clone)]
enum Node {
    Equals(usize, Role),
    And(Vec<Node>),
    Or(Vec<Node>),
    ExactlyK {
        vars: Vec<usize>,
        count: usize,
        role: Role,
    },
}

impl Node {
    fn truth() -> Node {
        Node::And(vec![])
    }

    fn falsity() -> Node {
        Node::Or(vec![])
    }

    fn is_truth(&self) -> bool {
        matches!(self, Node::And(nodes) if nodes.is_empty())
    }

    fn is_falsity(&self) -> bool {
        matches!(self, Node::Or(nodes) if nodes.is_empty())
    }

    /// Compiles and folds constants. `Or(v = Good, v = Bad)` is recognised as
    /// always true so that it constrains nothing.
    fn compile(shape: &GridShape, goal: &Goal) -> Node {
        match goal {
            Goal::Equals { cell, role } => {
                if shape.contains(cell) {
                    Node::Equals(shape.index(cell), *role)
                } else {
                    Node::falsity()
                }
            }
            Goal::And(goals) => {
                let mut nodes = Vec::new();
                for node in goals.iter().map(|g| Node::compile(shape, g)) {
                    if node.is_falsity() {
                        return Node::falsity();
                    }
                    match node {
                        Node::And(inner) => nodes.extend(inner),
                        other => nodes.push(other),
                    }
                }
                Node::And(nodes)
            }
            Goal::Or(goals) => {
                let mut nodes = Vec::new();
                for node in goals.iter().map(|g| Node::compile(shape, g)) {
                    if node.is_truth() {
                        return Node::truth();
                    }
                    match node {
                        Node::Or(inner) => nodes.extend(inner),
                        other => nodes.push(other),
                    }
                }
                let covers_both = nodes.iter().any(|a| {
                    nodes.iter().any(|b| match (a, b) {
                        (Node::Equals(x, r), Node::Equals(y, s)) => x == y && r != s,
                        _ => false,
                    })
                });
                if covers_both {
                    Node::truth()
                } else {
                    Node::Or(nodes)
                }
            }
            Goal::ExactlyK { cells, count, role } => {
                if cells.iter().all(|cell| shape.contains(cell)) {
                    Node::ExactlyK {
                        vars: cells.iter().map(|cell| shape.index(cell)).collect(),
                        count: *count,
                        role: *role,
                    }
                } else {
                    Node::falsity()
                }
            }
        }
    }

    /// Variables in order of first mention.
    fn collect_vars(&self, vars: &mut Vec<usize>) {
        match self {
            Node::Equals(var, _) => {
                if !vars.contains(var) {
                    vars.push(*var);
                }
            }
            Node::And(nodes) | Node::Or(nodes) => {
                for node in nodes {
                    node.collect_vars(vars);
                }
            }
            Node::ExactlyK { vars: v, .. } => {
                for var in v {
                    if !vars.contains(var) {
                        vars.push(*var);
                    }
                }
            }
        }
    }

    /// Three-valued evaluation over a partial assignment.
    fn evaluate(&self, values: &[Option<Role>]) -> Truth {
        match self {
            Node::Equals(var, role) => match values[*var] {
                Some(value) if value == *role => Truth::True,
                Some(_) => Truth::False,
                None => Truth::Unknown,
            },
            Node::And(nodes) => {
                let mut result = Truth::True;
                for node in nodes {
                    match node.evaluate(values) {
                        Truth::False => return Truth::False,
                        Truth::Unknown => result = Truth::Unknown,
                        Truth::True => {}
                    }
                }
                result
            }
            Node::Or(nodes) => {
                let mut result = Truth::False;
                for node in nodes {
                    match node.evaluate(values) {
                        Truth::True => return Truth::True,
                        Truth::Unknown => result = Truth::Unknown,
                        Truth::False => {}
                    }
                }
                result
            }
            Node::ExactlyK { vars, count, role } => {
                let mut matching = 0;
                let mut unassigned = 0;
                for var in vars {
                    match values[*var] {
                        Some(value) if value == *role => matching += 1,
                        Some(_) => {}
                        None => unassigned += 1,
                    }
                }
                if matching > *count || matching + unassigned < *count {
                    Truth::False
                } else if unassigned == 0 {
                    Truth::True
                } else {
                    Truth::Unknown
                }
            }
        }
    }
}

/// In-grid cells mentioned anywhere in `goal`.
fn mentioned_cells(shape: &GridShape, goal: &Goal, cells: &mut BTreeSet<usize>) {
    match goal {
        Goal::Equals { cell, .. } => {
            if shape.contains(cell) {
                cells.insert(shape.index(cell));
            }
        }
        Goal::And(goals) | Goal::Or(goals) => {
            for goal in goals {
                mentioned_cells(shape, goal, cells);
            }
        }
        Goal::ExactlyK { cells: c, .. } => {
            cells.extend(c.iter().filter(|cell| shape.contains(cell)).map(|cell| shape.index(cell)))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Continue,
    Stop,
}

/// Every full instantiation of the touched variables that satisfies a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionSet {
    pub variables: Vec<Cell>,
    pub solutions: Vec<Vec<Role>>,
}

impl SolutionSet {
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// True when some solution agrees with `assignment` on every variable.
    pub fn contains(&self, assignment: &Assignment) -> bool {
        self.solutions.iter().any(|solution| {
            self.variables
                .iter()
                .zip(solution)
                .all(|(cell, role)| assignment.get(cell) == *role)
        })
    }

    /// Cells with the same role in every solution. Empty for an empty set.
    pub fn deduced(&self) -> Certainty {
        let Some((first, rest)) = self.solutions.split_first() else {
            return Certainty::new();
        };
        self.variables
            .iter()
            .enumerate()
            .filter(|(i, _)| rest.iter().all(|solution| solution[*i] == first[*i]))
            .map(|(i, cell)| (*cell, first[i]))
            .collect()
    }
}

/// Exhaustive search over the two-valued domain of every variable a goal
/// touches. Variables pinned by top-level `Equals` conjuncts are fixed up
/// front, variables nothing actually constrains are counted rather than
/// enumerated, and the rest are searched with three-valued pruning, most
/// recently constrained first.
pub struct Solver {
    shape: GridShape,
    root: Node,
    variables: Vec<usize>,
    pinned: Vec<Option<Role>>,
    free: Vec<usize>,
    loose: Vec<usize>,
    consistent: bool,
}

impl Solver {
    pub fn new(shape: GridShape, goal: &Goal) -> Self {
        let root = Node::compile(&shape, goal);
        let mut mentioned = BTreeSet::new();
        mentioned_cells(&shape, goal, &mut mentioned);

        let mut pinned = vec![None; shape.len()];
        let mut consistent = !root.is_falsity();
        let conjuncts: &[Node] = match &root {
            Node::And(nodes) => nodes,
            other => std::slice::from_ref(other),
        };
        for node in conjuncts {
            if let Node::Equals(var, role) = node {
                match pinned[*var] {
                    Some(existing) if existing != *role => consistent = false,
                    _ => pinned[*var] = Some(*role),
                }
            }
        }

        let mut constrained = Vec::new();
        for node in conjuncts.iter().rev() {
            node.collect_vars(&mut constrained);
        }
        let free: Vec<usize> = constrained
            .iter()
            .copied()
            .filter(|var| pinned[*var].is_none())
            .collect();
        let loose: Vec<usize> = mentioned
            .iter()
            .copied()
            .filter(|var| pinned[*var].is_none() && !constrained.contains(var))
            .collect();
        let variables: Vec<usize> = mentioned.into_iter().collect();
        trace!(
            target: "solver",
            "Solver over {} variables ({} free, {} unconstrained), consistent: {}",
            variables.len(),
            free.len(),
            loose.len(),
            consistent
        );

        Self {
            shape,
            root,
            variables,
            pinned,
            free,
            loose,
            consistent,
        }
    }

    fn search<F>(&self, values: &mut [Option<Role>], free: &[usize], on_solution: &mut F) -> Visit
    where
        F: FnMut(&[Option<Role>], &[usize]) -> Visit,
    {
        match self.root.evaluate(values) {
            Truth::False => return Visit::Continue,
            Truth::True => return on_solution(values, free),
            Truth::Unknown => {}
        }
        let Some((&var, rest)) = free.split_first() else {
            return Visit::Continue;
        };
        for role in Role::ALL {
            values[var] = Some(role);
            let visit = self.search(values, rest, on_solution);
            values[var] = None;
            if visit == Visit::Stop {
                return Visit::Stop;
            }
        }
        Visit::Continue
    }

    /// Any one solution, with every variable left open set to `Good`.
    fn witness(&self, values: &mut [Option<Role>], free: &[usize]) -> Option<Vec<Option<Role>>> {
        if !self.consistent {
            return None;
        }
        let mut found = None;
        self.search(values, free, &mut |values, remaining| {
            let mut solution = values.to_vec();
            for var in remaining.iter().chain(&self.loose) {
                solution[*var] = Some(Role::Good);
            }
            found = Some(solution);
            Visit::Stop
        });
        found
    }

    pub fn is_satisfiable(&self) -> bool {
        let mut values = self.pinned.clone();
        self.witness(&mut values, &self.free).is_some()
    }

    /// Lists every solution. Exponential in the free variables; meant for
    /// small goals and verification.
    pub fn solve(&self) -> SolutionSet {
        let variables: Vec<Cell> = self.variables.iter().map(|v| self.shape.cell_at(*v)).collect();
        let mut solutions = Vec::new();
        if self.consistent {
            let mut values = self.pinned.clone();
            self.search(&mut values, &self.free, &mut |values, remaining| {
                let open: Vec<usize> = remaining.iter().chain(&self.loose).copied().collect();
                expand(values.to_vec(), &open, &mut |full| {
                    solutions.push(
                        self.variables
                            .iter()
                            .map(|v| full[*v].unwrap_or(Role::Good))
                            .collect(),
                    )
                });
                Visit::Continue
            });
        }
        SolutionSet {
            variables,
            solutions,
        }
    }

    /// Number of solutions over the touched variables.
    pub fn count(&self) -> u64 {
        if !self.consistent {
            return 0;
        }
        let mut total = 0u64;
        let mut values = self.pinned.clone();
        self.search(&mut values, &self.free, &mut |_, remaining| {
            let open = (remaining.len() + self.loose.len()) as u32;
            total = total.saturating_add(1u64.checked_shl(open).unwrap_or(u64::MAX));
            Visit::Continue
        });
        total
    }

    /// Cells fixed across all solutions, or `None` when there are none.
    ///
    /// Finds one witness, then for each still-undecided variable looks for a
    /// solution with the opposite role. Every such solution also rules out
    /// the other variables on which it differs from the witness.
    pub fn certainty(&self) -> Option<Certainty> {
        let mut values = self.pinned.clone();
        let witness = self.witness(&mut values, &self.free)?;

        let mut ambiguous: BTreeSet<usize> = self.loose.iter().copied().collect();
        let mut certain = Certainty::new();
        for var in &self.variables {
            let Some(role) = witness[*var] else { continue };
            if self.pinned[*var].is_some() {
                certain.insert(self.shape.cell_at(*var), role);
                continue;
            }
            if ambiguous.contains(var) {
                continue;
            }
            let mut probe = self.pinned.clone();
            probe[*var] = Some(role.complement());
            let free: Vec<usize> = self.free.iter().copied().filter(|v| v != var).collect();
            match self.witness(&mut probe, &free) {
                Some(other) => {
                    for v in &self.free {
                        if other[*v] != witness[*v] {
                            ambiguous.insert(*v);
                        }
                    }
                }
                None => {
                    certain.insert(self.shape.cell_at(*var), role);
                }
            }
        }
        trace!(target: "solver", "Certain cells: {:?}", certain);
        Some(certain)
    }
}

fn expand<F>(mut values: Vec<Option<Role>>, remaining: &[usize], emit: &mut F)
where
    F: FnMut(&[Option<Role>]),
{
    match remaining.split_first() {
        None => emit(&values),
        Some((&var, rest)) => {
            for role in Role::ALL {
                values[var] = Some(role);
                expand(values.clone(), rest, emit);
            }
        }
    }
}

/// Convenience wrapper: solve `goal` over `shape`.
pub fn solve(shape: GridShape, goal: &Goal) -> SolutionSet {
    Solver::new(shape, goal).solve()
}
