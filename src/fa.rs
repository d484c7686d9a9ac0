use std::fmt;
use std::ops::Range;

use log::{debug, trace, warn};

use crate::bitset::{self, BitSet128};

/// A state ID in the automaton.
pub type StateId = usize;

/// The error state. Every automaton has it, it never has outgoing
/// transitions and no transition ever leads to it explicitly: the absence of
/// a transition *is* the transition to the error state.
pub const ERROR_STATE: StateId = 0;

/// Maximum number of states of an automaton, including the error state.
pub const MAX_STATES: usize = bitset::CAPACITY;

/// The character that labels epsilon transitions in non-deterministic
/// automata. As a consequence NUL can't be matched literally.
pub const EPSILON: u8 = 0x00;

const INITIAL_TRANSITIONS_CAPACITY: usize = 10;
const TRANSITIONS_GROWTH_FACTOR: usize = 2;

/// A transition from some state to `next` when reading `byte`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub byte: u8,
    pub next: StateId,
}

/// A finite automaton over the ASCII alphabet with at most 128 states.
///
/// Transitions are stored sparsely: a single array of [`Transition`]s sorted
/// by the state owning them, plus, for every state, the index of its first
/// transition in that array (or `None` if it has no transitions). A state's
/// transitions end where the next state that owns transitions begins, or at
/// the end of the array.
///
/// ```text
/// starts:       | None | Some(0) | Some(3) | None | Some(4) |
///                          |         |______________|
///                          |                 |      |
///                          v                 v      v
/// transitions:  | t0 | t1 | t2 | t3 | t4 | t5 | ...
/// ```
///
/// Here state 1 owns `t0..t3`, state 2 owns `t3` and state 4 owns `t4..`.
///
/// Starts are plain indices, so growing the transition array never
/// invalidates them. They only change when a transition is inserted in front
/// of them.
///
/// The automaton may be non-deterministic: a state can have several
/// transitions for the same byte, and [`EPSILON`] labels epsilon transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    initial: StateId,
    accepting: BitSet128,
    transitions: Vec<Transition>,
    starts: Vec<Option<usize>>,
}

impl Automaton {
    /// Creates an automaton with the error state as its only state.
    pub fn new() -> Self {
        Self {
            initial: ERROR_STATE,
            accepting: BitSet128::empty(),
            transitions: Vec::with_capacity(INITIAL_TRANSITIONS_CAPACITY),
            starts: vec![None],
        }
    }

    /// Number of states, including the error state.
    pub fn n_states(&self) -> usize {
        self.starts.len()
    }

    pub fn n_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// Number of transitions that fit in the transition array before it
    /// needs to grow.
    pub fn transition_capacity(&self) -> usize {
        self.transitions.capacity()
    }

    pub fn initial_state(&self) -> StateId {
        self.initial
    }

    pub fn set_initial_state(&mut self, state: StateId) {
        self.check_state(state);
        self.initial = state;
    }

    /// The set of accepting states.
    pub fn accepting(&self) -> BitSet128 {
        self.accepting
    }

    /// Adds `n` states without transitions and returns the ID of the first
    /// one.
    ///
    /// # Panics
    ///
    /// If the automaton would end up with more than [`MAX_STATES`] states.
    pub fn add_states(&mut self, n: usize) -> StateId {
        let first = self.n_states();
        assert!(
            first + n <= MAX_STATES,
            "can't add {} states to an automaton with {} states, the limit is {}",
            n,
            first,
            MAX_STATES
        );
        self.starts.resize(first + n, None);
        first
    }

    /// Makes `state` accepting or non-accepting.
    ///
    /// # Panics
    ///
    /// If `state` is not a state of the automaton.
    pub fn set_accepting(&mut self, state: StateId, accepting: bool) {
        self.check_state(state);
        let set = BitSet128::new(state as u8);
        self.accepting = if accepting {
            self.accepting | set
        } else {
            self.accepting & !set
        };
    }

    /// # Panics
    ///
    /// If `state` is not a state of the automaton.
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.check_state(state);
        self.accepting.contains(state as u8)
    }

    /// Adds a transition from `state` to `next` on `byte`.
    ///
    /// Transitions from or to the error state are ignored with a warning. If
    /// `state` already has a transition on `byte` to a different state the
    /// new one is added anyway, making the automaton non-deterministic.
    ///
    /// # Panics
    ///
    /// If `state` or `next` are not states of the automaton.
    pub fn add_transition(&mut self, state: StateId, byte: u8, next: StateId) {
        self.check_state(state);
        self.check_state(next);

        if state == ERROR_STATE {
            warn!(
                "ignoring transition out of the error state on {:?}: the \
                 error state can't have transitions",
                byte as char
            );
            return;
        }

        if next == ERROR_STATE {
            warn!(
                "ignoring transition from state {} to the error state on \
                 {:?}: undefined transitions already lead to the error state",
                state, byte as char
            );
            return;
        }

        let existing = self.transitions_of(state);
        if existing.contains(&Transition { byte, next }) {
            debug!("transition {} --{:?}--> {} already exists", state, byte as char, next);
            return;
        }
        if existing.iter().any(|t| t.byte == byte) {
            if byte == EPSILON {
                trace!("state {} gets another epsilon transition", state);
            } else {
                warn!(
                    "state {} already has a transition on {:?}, the automaton \
                     is now non-deterministic",
                    state, byte as char
                );
            }
        }

        // The new transition goes right before the transitions of the
        // closest state on the right that has any, or at the very end.
        let right = (state + 1..self.n_states())
            .find(|&s| self.starts[s].is_some());

        let index = match right.and_then(|s| self.starts[s]) {
            Some(index) => index,
            None => self.transitions.len(),
        };

        self.grow_if_full();
        self.transitions.insert(index, Transition { byte, next });

        if let Some(right) = right {
            for start in self.starts[right..].iter_mut().flatten() {
                *start += 1;
            }
        }

        if self.starts[state].is_none() {
            self.starts[state] = Some(index);
        }
    }

    /// Returns the transitions of `state`, in insertion order.
    pub fn transitions_of(&self, state: StateId) -> &[Transition] {
        self.check_state(state);
        &self.transitions[self.range_of(state)]
    }

    /// Iterates all the transitions as `(state, transition)` pairs, sorted by
    /// state.
    pub fn transitions(
        &self,
    ) -> impl Iterator<Item = (StateId, &Transition)> + '_ {
        (0..self.n_states())
            .flat_map(move |s| self.transitions_of(s).iter().map(move |t| (s, t)))
    }

    /// Returns the state reached from `state` on `byte`, or [`ERROR_STATE`]
    /// if there's no such transition.
    ///
    /// If the automaton is non-deterministic the first matching transition
    /// wins.
    pub fn next_state_dfa(&self, state: StateId, byte: u8) -> StateId {
        self.transitions_of(state)
            .iter()
            .find(|t| t.byte == byte)
            .map_or(ERROR_STATE, |t| t.next)
    }

    /// Clears `next` and fills it with every state reached from `state` on
    /// `byte`. Use [`EPSILON`] as `byte` for getting the epsilon successors.
    ///
    /// An empty `next` means that the only successor is the error state.
    pub fn next_state_nfa(
        &self,
        state: StateId,
        byte: u8,
        next: &mut Vec<StateId>,
    ) {
        next.clear();
        next.extend(
            self.transitions_of(state)
                .iter()
                .filter(|t| t.byte == byte)
                .map(|t| t.next),
        );
    }

    /// Returns true if the automaton has no epsilon transitions and no state
    /// has two transitions on the same byte.
    pub fn is_deterministic(&self) -> bool {
        (0..self.n_states()).all(|s| {
            let transitions = self.transitions_of(s);
            transitions.iter().enumerate().all(|(i, t)| {
                t.byte != EPSILON
                    && transitions[i + 1..].iter().all(|u| u.byte != t.byte)
            })
        })
    }

    /// Appends the states of `other` to this automaton.
    ///
    /// The error state of `other` is folded into this automaton's error
    /// state, and every other state `s` of `other` becomes
    /// `s + self.n_states() - 1`. Transitions and accepting states are
    /// copied along. The initial state of this automaton is not modified.
    ///
    /// Returns the offset added to the IDs of `other`'s states.
    ///
    /// # Panics
    ///
    /// If the resulting automaton would have more than [`MAX_STATES`]
    /// states. Neither automaton is modified in that case.
    pub fn merge(&mut self, other: &Automaton) -> usize {
        assert!(
            self.n_states() + other.n_states() - 1 <= MAX_STATES,
            "merging automata with {} and {} states exceeds the limit of {} states",
            self.n_states(),
            other.n_states(),
            MAX_STATES
        );

        let bias = self.n_states() - 1;
        let base = self.transitions.len();

        self.transitions.reserve(other.transitions.len());
        self.transitions.extend(
            other
                .transitions
                .iter()
                .map(|t| Transition { byte: t.byte, next: t.next + bias }),
        );

        self.starts.extend(
            other.starts[1..].iter().map(|start| start.map(|i| i + base)),
        );

        self.accepting = other
            .accepting
            .iter()
            .filter(|&s| s as StateId != ERROR_STATE)
            .fold(self.accepting, |acc, s| {
                acc | BitSet128::new(s + bias as u8)
            });

        bias
    }

    fn range_of(&self, state: StateId) -> Range<usize> {
        let start = match self.starts[state] {
            Some(start) => start,
            None => return 0..0,
        };
        let end = self.starts[state + 1..]
            .iter()
            .flatten()
            .next()
            .copied()
            .unwrap_or(self.transitions.len());
        start..end
    }

    fn grow_if_full(&mut self) {
        let capacity = self.transitions.capacity();
        if self.transitions.len() == capacity {
            let additional = (capacity * (TRANSITIONS_GROWTH_FACTOR - 1))
                .max(INITIAL_TRANSITIONS_CAPACITY);
            self.transitions.reserve_exact(additional);
        }
    }

    fn check_state(&self, state: StateId) {
        assert!(
            state < self.n_states(),
            "state {} doesn't exist, the automaton has {} states",
            state,
            self.n_states()
        );
    }
}

impl Default for Automaton {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "initial state: {}", self.initial)?;
        writeln!(f, "accepting states: {:?}", self.accepting)?;
        for state in 1..self.n_states() {
            let marker = if self.is_accepting(state) { "*" } else { " " };
            writeln!(f, "{}{:>3}:", marker, state)?;
            for t in self.transitions_of(state) {
                if t.byte == EPSILON {
                    writeln!(f, "       ε -> {}", t.next)?;
                } else {
                    writeln!(f, "    {:>4} -> {}", format!("{:?}", t.byte as char), t.next)?;
                }
            }
        }
        Ok(())
    }
}
