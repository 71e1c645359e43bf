//! Foreign key dependency ordering.
//!
//! A table has to be created after every table it references. The graph is
//! built per call as index adjacency lists over the caller's slice, so the
//! schema model itself never holds links between tables.

use std::collections::HashMap;

use crate::error::CycleError;
use crate::schema::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Directed graph with an edge `a -> b` when table `a` references table `b`.
#[derive(Debug)]
pub struct DependencyGraph<'a> {
    tables: &'a [Table],
    edges: Vec<Vec<usize>>,
}

impl<'a> DependencyGraph<'a> {
    /// Builds the graph. Self-references and references to unknown tables
    /// add no edge.
    #[must_use]
    pub fn new(tables: &'a [Table]) -> Self {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(tables.len());
        for (i, table) in tables.iter().enumerate() {
            index.entry(table.name.as_str()).or_insert(i);
        }

        let edges = tables
            .iter()
            .map(|table| {
                let mut targets: Vec<usize> = Vec::new();
                for name in table.dependencies() {
                    if let Some(&target) = index.get(name) {
                        if !targets.contains(&target) {
                            targets.push(target);
                        }
                    }
                }
                targets
            })
            .collect();

        Self { tables, edges }
    }

    /// Indices of the tables `table` depends on, in declaration order.
    #[must_use]
    pub fn dependencies_of(&self, table: usize) -> &[usize] {
        &self.edges[table]
    }

    /// Returns table indices so that each table follows its dependencies.
    ///
    /// Depth-first postorder, starting from tables in authoring order and
    /// following foreign keys in declaration order, so the result is
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] if two or more distinct tables reference each
    /// other in a loop.
    pub fn topological_order(&self) -> Result<Vec<usize>, CycleError> {
        let mut marks = vec![Mark::Unvisited; self.tables.len()];
        let mut path = Vec::new();
        let mut sorted = Vec::with_capacity(self.tables.len());
        for node in 0..self.tables.len() {
            self.visit(node, &mut marks, &mut path, &mut sorted)?;
        }
        Ok(sorted)
    }

    fn visit(
        &self,
        node: usize,
        marks: &mut [Mark],
        path: &mut Vec<usize>,
        sorted: &mut Vec<usize>,
    ) -> Result<(), CycleError> {
        match marks[node] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                let start = path.iter().position(|&n| n == node).unwrap_or(0);
                return Err(CycleError {
                    tables: path[start..]
                        .iter()
                        .map(|&n| self.tables[n].name.clone())
                        .collect(),
                });
            }
            Mark::Unvisited => {}
        }

        marks[node] = Mark::InProgress;
        path.push(node);
        for &dep in &self.edges[node] {
            self.visit(dep, marks, path, sorted)?;
        }
        path.pop();
        marks[node] = Mark::Done;
        sorted.push(node);
        Ok(())
    }
}

/// Orders `tables` for emission.
///
/// # Errors
///
/// Returns [`CycleError`] when the foreign keys form a cycle through two or
/// more distinct tables. A table referencing itself is allowed.
pub fn order(tables: &[Table]) -> Result<Vec<&Table>, CycleError> {
    let sorted = DependencyGraph::new(tables).topological_order()?;
    Ok(sorted.into_iter().map(|i| &tables[i]).collect())
}
