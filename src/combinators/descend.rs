//! Tree descent over a pending frontier.

use std::collections::VecDeque;
use std::fmt;

use crate::control::{Finish, Proceed};
use crate::engine::Engine;
use crate::error::Outcome;

/// The order in which a descent visits nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Order {
    /// Children go to the front of the frontier: a whole subtree is visited
    /// before its next sibling.
    #[default]
    DepthFirst,
    /// Children go to the back of the frontier: every node at one depth is
    /// visited before any node at the next.
    BreadthFirst,
}

/// Reports the children of the node being visited.
pub struct Expand<N> {
    order: Order,
    frontier: VecDeque<N>,
    proceed: Proceed<VecDeque<N>>,
    finish: Finish<()>,
}

impl<N> Expand<N> {
    /// Adds `children` to the frontier and visits the next pending node.
    ///
    /// Children keep their given order among themselves in both orders.
    /// The descent finishes once the frontier is empty.
    ///
    /// # Errors
    ///
    /// Returns any protocol violation raised by steps run inside this call.
    pub fn expand<C>(mut self, children: C) -> Outcome
    where
        C: IntoIterator<Item = N>,
    {
        match self.order {
            Order::DepthFirst => {
                let children: Vec<N> = children.into_iter().collect();
                for child in children.into_iter().rev() {
                    self.frontier.push_front(child);
                }
            }
            Order::BreadthFirst => self.frontier.extend(children),
        }
        if self.frontier.is_empty() {
            self.finish.finish(())
        } else {
            self.proceed.next(self.frontier)
        }
    }

    /// Visits the next pending node without adding children.
    ///
    /// # Errors
    ///
    /// See [`expand`](Self::expand).
    pub fn leaf(self) -> Outcome {
        self.expand(std::iter::empty())
    }

    /// Returns the number of nodes waiting to be visited.
    #[inline]
    pub fn pending(&self) -> usize {
        self.frontier.len()
    }
}

impl<N> fmt::Debug for Expand<N> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Expand")
            .field("order", &self.order)
            .field("pending", &self.frontier.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Visits every node reachable from `roots` in the given order.
    ///
    /// The body receives each node and an [`Expand`] through which it
    /// reports the node's children. `done` runs once the frontier is empty.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation raised by a step that ran on this call.
    pub fn descend<R, F, D>(&self, order: Order, roots: R, mut body: F, done: D) -> Outcome
    where
        R: IntoIterator,
        R::Item: 'static,
        F: FnMut(R::Item, Expand<R::Item>) -> Outcome + 'static,
        D: FnOnce() + 'static,
    {
        let frontier: VecDeque<R::Item> = roots.into_iter().collect();
        self.iterate(
            frontier,
            move |mut frontier: VecDeque<R::Item>, proceed, finish: Finish<()>| {
                match frontier.pop_front() {
                    Some(node) => body(
                        node,
                        Expand {
                            order,
                            frontier,
                            proceed,
                            finish,
                        },
                    ),
                    None => finish.finish(()),
                }
            },
            move |()| done(),
        )
    }

    /// Depth-first [`descend`](Self::descend) from a single root.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation raised by a step that ran on this call.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    /// use kiter::engine::Engine;
    ///
    /// // Node n has children 2n and 2n+1 up to 7.
    /// let visited = Rc::new(RefCell::new(Vec::new()));
    /// let log = Rc::clone(&visited);
    ///
    /// Engine::new()
    ///     .descend_depth_first(
    ///         1_u32,
    ///         move |node, expand| {
    ///             log.borrow_mut().push(node);
    ///             expand.expand([2 * node, 2 * node + 1].into_iter().filter(|child| *child <= 7))
    ///         },
    ///         || {},
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(*visited.borrow(), vec![1, 2, 4, 5, 3, 6, 7]);
    /// ```
    pub fn descend_depth_first<N, F, D>(&self, root: N, body: F, done: D) -> Outcome
    where
        N: 'static,
        F: FnMut(N, Expand<N>) -> Outcome + 'static,
        D: FnOnce() + 'static,
    {
        self.descend(Order::DepthFirst, [root], body, done)
    }

    /// Breadth-first [`descend`](Self::descend) from a single root.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation raised by a step that ran on this call.
    pub fn descend_breadth_first<N, F, D>(&self, root: N, body: F, done: D) -> Outcome
    where
        N: 'static,
        F: FnMut(N, Expand<N>) -> Outcome + 'static,
        D: FnOnce() + 'static,
    {
        self.descend(Order::BreadthFirst, [root], body, done)
    }
}
